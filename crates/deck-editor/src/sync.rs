//! Canvas session: the editing core for one slide layout.
//!
//! The session owns the [`Document`] and is the only thing that writes to
//! it. Every pointer, keyboard and popup event flows through here, is turned
//! into patches, applied to the document, and reported back to the host as
//! [`Effect::Update`]. The host re-renders from the document and the view
//! models; it never keeps its own copy of element content.

use deck_core::element::ElementRef;
use deck_core::model::{SelectionState, TransformPatch};
use deck_core::patch::{Change, Patch};
use deck_core::style::StyleChange;
use deck_core::surface::{PointerTarget, SurfaceTree};
use deck_core::{Document, Point, Rect};
use deck_render::hit::hit_test;
use serde::Serialize;

use crate::config::EditorConfig;
use crate::gesture::{InteractionController, Signal, Signals};
use crate::input::{InputEvent, Modifiers};
use crate::popup::{PopupCoordinator, PopupScope, PopupState};
use crate::primitives::{EditableImage, EditableText};
use crate::selection::SelectionArbiter;
use crate::shortcuts::{EditorAction, ShortcutMap};
use crate::text_edit::TextEditSession;
use crate::upload::{UploadError, UploadOutcome, UploadTicket, UploadTracker};

/// Something the host has to do after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Effect {
    /// Persist this single-field change (`onUpdate`).
    Update(Patch),
    /// Install page-level pointer listeners for the element's gesture.
    CapturePointer(ElementRef),
    /// Remove them.
    ReleasePointer(ElementRef),
    /// Open the file picker to replace the element's image.
    OpenImagePicker(ElementRef),
    /// Show a user-facing error.
    Alert(String),
    RenderNeeded,
}

pub type Effects = Vec<Effect>;

pub struct CanvasSession {
    document: Document,
    surfaces: SurfaceTree,
    arbiter: SelectionArbiter,
    controller: InteractionController,
    popups: PopupCoordinator,
    uploads: UploadTracker,
    editing: Option<TextEditSession>,
    config: EditorConfig,
}

impl CanvasSession {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut arbiter = SelectionArbiter::new(config.floor());
        let mut surfaces = SurfaceTree::new();
        for element in document.element_refs() {
            if let Some(entry) = document.get(element) {
                arbiter.register(element, entry.transform);
                surfaces.add_element(element);
            }
        }
        let popups = PopupCoordinator::new(
            config.popup_policy_for(document.layout),
            config.popup_offset,
        );
        log::debug!(
            "canvas session for {:?} layout with {} element(s), popups {:?}",
            document.layout,
            arbiter.len(),
            popups.policy()
        );
        Self {
            document,
            surfaces,
            arbiter,
            controller: InteractionController::new(config.drag_threshold),
            popups,
            uploads: UploadTracker::new(),
            editing: None,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn surfaces(&self) -> &SurfaceTree {
        &self.surfaces
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self, element: ElementRef) -> Option<&SelectionState> {
        self.arbiter.store(element).map(|s| s.state())
    }

    pub fn selected(&self) -> Option<ElementRef> {
        self.arbiter.selected()
    }

    /// Number of elements with page-level listeners installed.
    pub fn active_gestures(&self) -> usize {
        self.arbiter.active_gestures()
    }

    pub fn popups(&self) -> &PopupCoordinator {
        &self.popups
    }

    pub fn popup(&self, scope: PopupScope) -> Option<&PopupState> {
        self.popups.state(scope)
    }

    pub fn popup_scope(&self, element: ElementRef) -> PopupScope {
        self.popups.scope_for(element)
    }

    pub fn editing(&self) -> Option<&TextEditSession> {
        self.editing.as_ref()
    }

    pub fn is_uploading(&self, element: ElementRef) -> bool {
        self.uploads.is_busy(element)
    }

    pub fn text_view(&self, element: ElementRef) -> Option<EditableText> {
        let entry = self.document.get(element).filter(|e| !e.deleted)?;
        let state = self.selection(element)?;
        EditableText::build(element, entry, state, self.editing.as_ref())
    }

    pub fn image_view(&self, element: ElementRef) -> Option<EditableImage> {
        let entry = self.document.get(element).filter(|e| !e.deleted)?;
        let state = self.selection(element)?;
        EditableImage::build(element, entry, state, self.uploads.is_busy(element))
    }

    // ─── Measurement ─────────────────────────────────────────────────────

    pub fn set_root_bounds(&mut self, bounds: Rect) {
        self.surfaces.set_root_bounds(bounds);
    }

    pub fn set_element_bounds(&mut self, element: ElementRef, bounds: Rect) -> bool {
        self.surfaces.set_element_bounds(element, bounds)
    }

    /// Report the live text input's content height.
    pub fn measure_text(&mut self, scroll_height: f64) {
        if let Some(session) = &mut self.editing {
            session.measure(scroll_height);
        }
    }

    /// Classify a layout-space point against the measured surfaces.
    pub fn hit(&self, point: Point) -> PointerTarget {
        let target = hit_test(
            &self.surfaces,
            self.arbiter.selected(),
            point,
            self.config.handle_radius,
        );
        match (target, &self.editing) {
            (PointerTarget::Element(el), Some(session)) if session.element() == el => {
                PointerTarget::TextInput(el)
            }
            _ => target,
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Effects {
        match event {
            InputEvent::PointerDown { x, y, target, .. } => {
                self.pointer_down(*target, Point::new(*x, *y))
            }
            InputEvent::PointerMove { x, y, .. } => {
                let signals = self
                    .controller
                    .pointer_move(&mut self.arbiter, Point::new(*x, *y));
                self.absorb(signals)
            }
            InputEvent::PointerUp { x, y, .. } => {
                let signals = self
                    .controller
                    .pointer_up(&mut self.arbiter, Point::new(*x, *y));
                self.absorb(signals)
            }
            InputEvent::DoubleClick { target } => {
                let signals = self.controller.double_click(&mut self.arbiter, *target);
                self.absorb(signals)
            }
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    fn pointer_down(&mut self, target: PointerTarget, at: Point) -> Effects {
        let mut effects = Effects::new();
        if let Some(session) = &self.editing
            && target != PointerTarget::TextInput(session.element())
            && target != PointerTarget::Popup
        {
            effects.extend(self.blur());
        }
        let element = target.element();
        let measured = element
            .and_then(|el| self.surfaces.element_bounds(el))
            .map(|r| r.size());
        let busy = element.is_some_and(|el| self.uploads.is_busy(el));
        let signals = self
            .controller
            .pointer_down(&mut self.arbiter, target, at, measured, busy);
        effects.extend(self.absorb(signals));
        effects
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> Effects {
        match ShortcutMap::resolve(key, modifiers, self.editing.is_some()) {
            Some(EditorAction::CommitText) => self.blur(),
            Some(EditorAction::InsertNewline) => match &mut self.editing {
                Some(session) => {
                    session.insert_newline();
                    vec![Effect::RenderNeeded]
                }
                None => Effects::new(),
            },
            Some(EditorAction::RevertText) => self.revert(),
            Some(EditorAction::DeleteSelected) => self.delete_selected(),
            Some(EditorAction::Deselect) => self.deselect_all(),
            None => Effects::new(),
        }
    }

    /// Turn controller signals into host effects.
    fn absorb(&mut self, signals: Signals) -> Effects {
        let mut effects = Effects::new();
        let mut render = false;
        for signal in signals {
            match signal {
                Signal::Selected(element) => {
                    self.popups.close_except(element);
                    render = true;
                }
                Signal::SelectionCleared => {
                    self.popups.close_all();
                    render = true;
                }
                Signal::Capture(element) => effects.push(Effect::CapturePointer(element)),
                Signal::Release(element) => effects.push(Effect::ReleasePointer(element)),
                Signal::Moved(element) => {
                    self.follow(element);
                    render = true;
                }
                Signal::Committed(patch) => {
                    let element = patch.target;
                    self.commit(patch, &mut effects);
                    self.follow(element);
                    render = true;
                }
                Signal::Clicked {
                    element,
                    was_selected,
                } => {
                    if was_selected && !element.is_text() && !self.uploads.is_busy(element) {
                        effects.push(Effect::OpenImagePicker(element));
                    }
                }
                Signal::EditRequested(element) => {
                    effects.extend(self.begin_edit(element));
                    render = true;
                }
            }
        }
        if render {
            effects.push(Effect::RenderNeeded);
        }
        effects
    }

    fn follow(&mut self, element: ElementRef) {
        if let Some(store) = self.arbiter.store(element) {
            self.popups.follow(element, store.state());
        }
    }

    /// Apply `patch` to the document and report it.
    fn commit(&mut self, patch: Patch, effects: &mut Effects) {
        if self.document.apply(&patch) {
            log::info!("commit {}", patch.field_name());
            effects.push(Effect::Update(patch));
        }
    }

    // ─── Text editing ────────────────────────────────────────────────────

    fn begin_edit(&mut self, element: ElementRef) -> Effects {
        let mut effects = Effects::new();
        match &self.editing {
            Some(session) if session.element() == element => return effects,
            Some(_) => effects.extend(self.blur()),
            None => {}
        }
        let Some(text) = self
            .document
            .get(element)
            .and_then(|e| e.content.as_text())
        else {
            return effects;
        };
        self.editing = Some(TextEditSession::new(element, text));
        self.surfaces.attach_text_input(element);
        log::debug!("{element}: editing");
        effects
    }

    /// Replace the draft with the input's current value.
    pub fn text_input(&mut self, text: &str) -> Effects {
        match &mut self.editing {
            Some(session) => {
                session.input(text);
                vec![Effect::RenderNeeded]
            }
            None => Effects::new(),
        }
    }

    /// End text editing, committing the draft.
    pub fn blur(&mut self) -> Effects {
        let mut effects = Effects::new();
        let Some(session) = self.editing.take() else {
            return effects;
        };
        self.surfaces.detach_text_input(session.element());
        if let Some(patch) = session.commit() {
            self.commit(patch, &mut effects);
        }
        effects.push(Effect::RenderNeeded);
        effects
    }

    /// End text editing, discarding the draft.
    pub fn revert(&mut self) -> Effects {
        let Some(session) = self.editing.take() else {
            return Effects::new();
        };
        let element = session.element();
        self.surfaces.detach_text_input(element);
        log::debug!("{element}: edit reverted");
        session.revert();
        vec![Effect::RenderNeeded]
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Deselect everything and close every popup.
    pub fn deselect_all(&mut self) -> Effects {
        if self.controller.active_element().is_some() {
            log::debug!("deselect ignored while the pointer is down");
            return Effects::new();
        }
        let mut effects: Effects = self
            .arbiter
            .deselect_all_except(None)
            .into_iter()
            .map(Effect::ReleasePointer)
            .collect();
        self.popups.close_all();
        effects.push(Effect::RenderNeeded);
        effects
    }

    pub fn delete_selected(&mut self) -> Effects {
        if self.editing.is_some() {
            return Effects::new();
        }
        match self.arbiter.selected() {
            Some(element) => self.delete_element(element),
            None => Effects::new(),
        }
    }

    fn delete_element(&mut self, element: ElementRef) -> Effects {
        let mut effects = Effects::new();
        self.commit(Patch::delete(element), &mut effects);
        effects.extend(self.forget(element));
        effects
    }

    /// Drop every piece of editing state tied to a deleted element.
    fn forget(&mut self, element: ElementRef) -> Effects {
        let mut effects = Effects::new();
        if self.controller.active_element() == Some(element) {
            effects.extend(
                self.controller
                    .cancel(&mut self.arbiter)
                    .into_iter()
                    .filter_map(|s| match s {
                        Signal::Release(el) => Some(Effect::ReleasePointer(el)),
                        _ => None,
                    }),
            );
        }
        self.arbiter.unregister(element);
        self.surfaces.remove_element(element);
        self.uploads.abandon(element);
        if self.editing.as_ref().is_some_and(|s| s.element() == element) {
            self.editing = None;
        }
        let scope = self.popups.scope_for(element);
        if self
            .popups
            .state(scope)
            .is_some_and(|p| p.target_element == Some(element))
        {
            self.popups.close(scope);
        }
        effects.push(Effect::RenderNeeded);
        effects
    }

    /// Programmatic transform change (e.g. resize-to-fit).
    pub fn set_transform(&mut self, element: ElementRef, patch: &TransformPatch) -> Effects {
        let mut effects = Effects::new();
        let Some(store) = self.arbiter.store_mut(element) else {
            return effects;
        };
        let patch = store.set_transform(patch);
        self.commit(patch, &mut effects);
        self.follow(element);
        effects.push(Effect::RenderNeeded);
        effects
    }

    // ─── Popup ───────────────────────────────────────────────────────────

    /// Open the style popup for `element` at its measured position.
    pub fn open_popup(&mut self, element: ElementRef) -> Option<PopupScope> {
        let entry = self.document.get(element).filter(|e| !e.deleted)?;
        let style = entry.effective_style();
        let offset = self.arbiter.store(element)?.transform().offset();
        let element_rect = self.surfaces.element_bounds(element).unwrap_or(Rect::ZERO);
        let root_rect = self.surfaces.root_bounds().unwrap_or(Rect::ZERO);
        Some(self.popups.open(
            element,
            element_rect,
            root_rect,
            offset,
            style.font_size,
            &style.font_family,
        ))
    }

    pub fn popup_style(&mut self, scope: PopupScope, change: StyleChange) -> Effects {
        let mut effects = Effects::new();
        if let Some(patch) = self.popups.dispatch(scope, change) {
            self.commit(patch, &mut effects);
            effects.push(Effect::RenderNeeded);
        }
        effects
    }

    pub fn popup_delete(&mut self, scope: PopupScope) -> Effects {
        match self.popups.delete(scope) {
            Some(patch) => self.delete_element(patch.target),
            None => Effects::new(),
        }
    }

    pub fn close_popup(&mut self, scope: PopupScope) -> Effects {
        self.popups.close(scope);
        vec![Effect::RenderNeeded]
    }

    // ─── Uploads ─────────────────────────────────────────────────────────

    /// Start replacing the image of `element`. `None` if it is not a live
    /// image or already uploading.
    pub fn begin_upload(&mut self, element: ElementRef) -> Option<UploadTicket> {
        if element.is_text() || !self.document.is_live(element) {
            return None;
        }
        self.uploads.begin(element)
    }

    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<String, UploadError>,
    ) -> Effects {
        let mut effects = Effects::new();
        match self.uploads.finish(ticket, result) {
            UploadOutcome::Applied(patch) => {
                self.commit(patch, &mut effects);
                effects.push(Effect::RenderNeeded);
            }
            UploadOutcome::Failed { alert, .. } => {
                effects.push(Effect::Alert(alert));
                effects.push(Effect::RenderNeeded);
            }
            UploadOutcome::Stale => {}
        }
        effects
    }

    // ─── External changes ────────────────────────────────────────────────

    /// Apply a change that originated outside the canvas (another panel,
    /// collaborative sync). Not echoed back as an update.
    pub fn apply_external(&mut self, patch: &Patch) -> Effects {
        if !self.document.apply(patch) {
            return Effects::new();
        }
        match &patch.change {
            Change::Delete => return self.forget(patch.target),
            Change::Transform(t) => {
                if let Some(store) = self.arbiter.store_mut(patch.target) {
                    store.sync_transform(*t);
                }
            }
            Change::Text(_) | Change::ImageUrl(_) | Change::Style(_) => {}
        }
        vec![Effect::RenderNeeded]
    }

    /// The canvas is going away: cancel gestures, drop the edit, ignore
    /// any upload that resolves later.
    pub fn teardown(&mut self) -> Effects {
        let mut effects: Effects = self
            .controller
            .cancel(&mut self.arbiter)
            .into_iter()
            .filter_map(|s| match s {
                Signal::Release(el) => Some(Effect::ReleasePointer(el)),
                _ => None,
            })
            .collect();
        self.uploads.teardown();
        if let Some(session) = self.editing.take() {
            self.surfaces.detach_text_input(session.element());
        }
        self.arbiter.deselect_all_except(None);
        self.popups.close_all();
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::document::{ElementEntry, LayoutKind};
    use deck_core::model::ElementTransform;
    use pretty_assertions::assert_eq;

    fn session() -> CanvasSession {
        let mut doc = Document::new(LayoutKind::Cover);
        doc.insert(ElementRef::Title, ElementEntry::text("Acme")).unwrap();
        doc.insert(ElementRef::Image(0), ElementEntry::image("https://cdn.test/hero.png"))
            .unwrap();
        let mut session = CanvasSession::new(doc, EditorConfig::default());
        session.set_root_bounds(Rect::new(0.0, 0.0, 960.0, 540.0));
        session.set_element_bounds(ElementRef::Title, Rect::new(100.0, 100.0, 400.0, 160.0));
        session.set_element_bounds(ElementRef::Image(0), Rect::new(500.0, 100.0, 800.0, 400.0));
        session
    }

    fn click(session: &mut CanvasSession, x: f64, y: f64) -> Effects {
        let target = session.hit(Point::new(x, y));
        let mut effects = session.handle(&InputEvent::pointer_down(x, y, target));
        effects.extend(session.handle(&InputEvent::pointer_up(x, y)));
        effects
    }

    #[test]
    fn second_click_on_image_opens_picker() {
        let mut s = session();
        let first = click(&mut s, 600.0, 200.0);
        assert!(!first.contains(&Effect::OpenImagePicker(ElementRef::Image(0))));
        let second = click(&mut s, 600.0, 200.0);
        assert!(second.contains(&Effect::OpenImagePicker(ElementRef::Image(0))));
    }

    #[test]
    fn double_click_edits_and_enter_commits() {
        let mut s = session();
        s.handle(&InputEvent::DoubleClick {
            target: s.hit(Point::new(150.0, 120.0)),
        });
        assert_eq!(s.hit(Point::new(150.0, 120.0)), PointerTarget::TextInput(ElementRef::Title));
        s.text_input("Acme Corp");
        let effects = s.handle(&InputEvent::key("Enter"));
        assert_eq!(effects[0], Effect::Update(Patch::text(ElementRef::Title, "Acme Corp")));
        assert!(s.editing().is_none());
    }

    #[test]
    fn clicking_elsewhere_blurs_the_edit() {
        let mut s = session();
        s.handle(&InputEvent::DoubleClick {
            target: PointerTarget::Element(ElementRef::Title),
        });
        s.text_input("Acme Inc");
        let effects = click(&mut s, 600.0, 200.0);
        assert!(effects.contains(&Effect::Update(Patch::text(ElementRef::Title, "Acme Inc"))));
        assert_eq!(s.selected(), Some(ElementRef::Image(0)));
    }

    #[test]
    fn delete_key_removes_selected_element() {
        let mut s = session();
        click(&mut s, 150.0, 120.0);
        let effects = s.handle(&InputEvent::key("Delete"));
        assert_eq!(effects[0], Effect::Update(Patch::delete(ElementRef::Title)));
        assert!(!s.document().is_live(ElementRef::Title));
        assert_eq!(s.selection(ElementRef::Title), None);
        assert_eq!(s.hit(Point::new(150.0, 120.0)), PointerTarget::Canvas);
    }

    #[test]
    fn external_transform_reseeds_store_without_echo() {
        let mut s = session();
        let effects = s.apply_external(&Patch::transform(
            ElementRef::Title,
            ElementTransform::at(40.0, 0.0),
        ));
        assert_eq!(effects, vec![Effect::RenderNeeded]);
        assert_eq!(
            s.selection(ElementRef::Title).unwrap().transform,
            ElementTransform::at(40.0, 0.0)
        );
    }
}
