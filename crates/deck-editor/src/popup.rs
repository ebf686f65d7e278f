//! Floating style popup anchored to the selected element.
//!
//! One coordinator per layout. How many popups may be open at once is an
//! explicit [`PopupPolicy`]: a single slot for the whole layout, or one slot
//! per [`Region`] so e.g. the main-text popup and a table-cell popup can be
//! open side by side.
//!
//! While the target is being dragged the popup position is recomputed from
//! its anchor on every frame:
//!
//! ```text
//! position = original_position + (offset - anchor_offset)
//! ```
//!
//! and on the frame the drag ends the anchor is moved to where the popup
//! is, so the next drag starts from zero.

use deck_core::element::{ElementRef, Region};
use deck_core::model::SelectionState;
use deck_core::patch::Patch;
use deck_core::style::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, StyleChange};
use deck_core::{LayoutKind, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many popups a layout may have open at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopupPolicy {
    /// One popup per layout; opening another replaces it.
    Exclusive,
    /// One popup per region.
    PerRegion,
}

impl PopupPolicy {
    /// Layouts with a table region next to their main text get a popup each.
    pub fn default_for(layout: LayoutKind) -> Self {
        match layout {
            LayoutKind::Competition | LayoutKind::Pricing => Self::PerRegion,
            LayoutKind::Cover
            | LayoutKind::Index
            | LayoutKind::Quote
            | LayoutKind::Team
            | LayoutKind::Logos
            | LayoutKind::Generic => Self::Exclusive,
        }
    }
}

/// Popup slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopupScope {
    Layout,
    Region(Region),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupState {
    pub is_open: bool,
    pub position: Point,
    /// Rebase anchor; `position` while the target is idle.
    pub original_position: Point,
    pub current_font_size: f64,
    pub current_font_family: String,
    pub target_element: Option<ElementRef>,
    /// Survives `close` so late control events still resolve.
    pub last_target_element: Option<ElementRef>,
    #[serde(skip)]
    anchor_offset: Vec2,
    #[serde(skip)]
    was_dragging: bool,
}

impl Default for PopupState {
    fn default() -> Self {
        Self {
            is_open: false,
            position: Point::ZERO,
            original_position: Point::ZERO,
            current_font_size: DEFAULT_FONT_SIZE,
            current_font_family: DEFAULT_FONT_FAMILY.to_string(),
            target_element: None,
            last_target_element: None,
            anchor_offset: Vec2::ZERO,
            was_dragging: false,
        }
    }
}

impl PopupState {
    /// Element the popup's controls act on.
    pub fn resolved_target(&self) -> Option<ElementRef> {
        self.target_element.or(self.last_target_element)
    }

    fn close(&mut self) {
        self.is_open = false;
        self.target_element = None;
        self.was_dragging = false;
    }
}

#[derive(Debug)]
pub struct PopupCoordinator {
    policy: PopupPolicy,
    /// Anchor distance left of and above the element's corner.
    offset: Vec2,
    slots: HashMap<PopupScope, PopupState>,
}

impl PopupCoordinator {
    pub fn new(policy: PopupPolicy, offset: Vec2) -> Self {
        Self {
            policy,
            offset,
            slots: HashMap::new(),
        }
    }

    pub fn policy(&self) -> PopupPolicy {
        self.policy
    }

    pub fn scope_for(&self, element: ElementRef) -> PopupScope {
        match self.policy {
            PopupPolicy::Exclusive => PopupScope::Layout,
            PopupPolicy::PerRegion => PopupScope::Region(element.region()),
        }
    }

    /// Open the popup for `target`.
    ///
    /// `element_rect` and `root_rect` are the measured boxes of the element
    /// (with its current transform applied) and of the layout root;
    /// `offset` is the element's current transform offset.
    pub fn open(
        &mut self,
        target: ElementRef,
        element_rect: Rect,
        root_rect: Rect,
        offset: Vec2,
        font_size: f64,
        font_family: &str,
    ) -> PopupScope {
        let scope = self.scope_for(target);
        let anchor = Point::ZERO + (element_rect.origin() - root_rect.origin()) - self.offset;
        let popup = self.slots.entry(scope).or_default();
        *popup = PopupState {
            is_open: true,
            position: anchor,
            original_position: anchor,
            current_font_size: font_size,
            current_font_family: font_family.to_string(),
            target_element: Some(target),
            last_target_element: Some(target),
            anchor_offset: offset,
            was_dragging: false,
        };
        log::debug!("popup {scope:?} opened for {target} at ({}, {})", anchor.x, anchor.y);
        scope
    }

    pub fn state(&self, scope: PopupScope) -> Option<&PopupState> {
        self.slots.get(&scope)
    }

    /// Open popup currently targeting `element`.
    pub fn state_for(&self, element: ElementRef) -> Option<&PopupState> {
        self.state(self.scope_for(element))
            .filter(|p| p.is_open && p.target_element == Some(element))
    }

    pub fn open_scopes(&self) -> impl Iterator<Item = PopupScope> + '_ {
        self.slots
            .iter()
            .filter(|(_, p)| p.is_open)
            .map(|(scope, _)| *scope)
    }

    pub fn any_open(&self) -> bool {
        self.slots.values().any(|p| p.is_open)
    }

    /// Track the target's latest selection state. Returns `true` if the
    /// popup moved.
    pub fn follow(&mut self, element: ElementRef, state: &SelectionState) -> bool {
        let scope = self.scope_for(element);
        let Some(popup) = self.slots.get_mut(&scope) else {
            return false;
        };
        if !popup.is_open || popup.target_element != Some(element) {
            return false;
        }
        let offset = state.transform.offset();
        let before = popup.position;
        if state.is_dragging {
            popup.position = popup.original_position + (offset - popup.anchor_offset);
            popup.was_dragging = true;
        } else if popup.was_dragging {
            popup.position = popup.original_position + (offset - popup.anchor_offset);
            popup.original_position = popup.position;
            popup.anchor_offset = offset;
            popup.was_dragging = false;
            log::trace!("popup {scope:?} rebased to ({}, {})", popup.position.x, popup.position.y);
        }
        popup.position != before
    }

    pub fn close(&mut self, scope: PopupScope) {
        if let Some(popup) = self.slots.get_mut(&scope) {
            popup.close();
        }
    }

    pub fn close_all(&mut self) {
        self.slots.values_mut().for_each(PopupState::close);
    }

    /// Close the popup in `keep`'s scope if it targets another element.
    /// Popups in other regions stay open under [`PopupPolicy::PerRegion`].
    pub fn close_except(&mut self, keep: ElementRef) {
        let scope = self.scope_for(keep);
        if let Some(popup) = self.slots.get_mut(&scope)
            && popup.target_element.is_some_and(|t| t != keep)
        {
            popup.close();
        }
    }

    /// Route a style control to the popup's target.
    pub fn dispatch(&mut self, scope: PopupScope, change: StyleChange) -> Option<Patch> {
        let popup = self.slots.get_mut(&scope)?;
        let Some(target) = popup.resolved_target() else {
            log::warn!("style change {change:?} with no popup target dropped");
            return None;
        };
        if !target.is_text() {
            log::warn!("style change {change:?} on image {target} dropped");
            return None;
        }
        if let Err(err) = change.validate() {
            log::warn!("style change for {target} dropped: {err}");
            return None;
        }
        match &change {
            StyleChange::FontSize(size) => popup.current_font_size = *size,
            StyleChange::FontFamily(family) => popup.current_font_family.clone_from(family),
            StyleChange::Color(_) | StyleChange::Alignment(_) => {}
        }
        Some(Patch::style(target, change))
    }

    /// Delete the popup's target and close the popup.
    pub fn delete(&mut self, scope: PopupScope) -> Option<Patch> {
        let popup = self.slots.get_mut(&scope)?;
        let target = popup.resolved_target()?;
        popup.close();
        Some(Patch::delete(target))
    }
}
