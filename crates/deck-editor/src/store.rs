//! Selection/transform store for a single editable element.
//!
//! A store knows nothing about its siblings; cross-element exclusivity
//! lives in [`crate::selection::SelectionArbiter`].
//!
//! Out-of-order calls (dragging or resizing an unselected element, moving
//! without an active gesture) are ignored rather than reported.

use deck_core::element::{ElementRef, ResizeHandle};
use deck_core::model::{ElementTransform, SelectionState, TransformPatch};
use deck_core::patch::Patch;
use deck_core::{Point, Size};

/// Minimum box a resize may produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeFloor {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for ResizeFloor {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            min_height: 50.0,
        }
    }
}

/// Context captured at gesture start; present exactly while page-level
/// move/up listeners are installed.
#[derive(Debug, Clone, Copy)]
enum ActiveGesture {
    Drag {
        start_pointer: Point,
        start: ElementTransform,
    },
    Resize {
        handle: ResizeHandle,
        start_pointer: Point,
        start: ElementTransform,
        start_size: Size,
    },
}

#[derive(Debug, Clone)]
pub struct SelectionStore {
    element: ElementRef,
    state: SelectionState,
    gesture: Option<ActiveGesture>,
    floor: ResizeFloor,
}

impl SelectionStore {
    pub fn new(element: ElementRef, initial: ElementTransform, floor: ResizeFloor) -> Self {
        Self {
            element,
            state: SelectionState::new(initial),
            gesture: None,
            floor,
        }
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn transform(&self) -> ElementTransform {
        self.state.transform
    }

    /// Page-level listeners are installed for an in-flight gesture.
    pub fn is_listening(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn select(&mut self) {
        self.state.is_selected = true;
    }

    /// Clear selection and any gesture flags. Returns `true` if a gesture
    /// was in flight; it is dropped without committing.
    pub fn deselect(&mut self) -> bool {
        let was_listening = self.gesture.take().is_some();
        if was_listening {
            log::debug!("{}: gesture cancelled by deselect", self.element);
        }
        self.state.is_selected = false;
        self.state.is_dragging = false;
        self.state.is_resizing = false;
        was_listening
    }

    /// Start moving the element from `pointer`. Ignored unless selected and idle.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.state.is_selected || self.gesture.is_some() {
            log::debug!("{}: begin_drag ignored", self.element);
            return false;
        }
        self.gesture = Some(ActiveGesture::Drag {
            start_pointer: pointer,
            start: self.state.transform,
        });
        self.state.is_dragging = true;
        true
    }

    /// Start resizing from `handle`. `measured` is the rendered box, used
    /// for any axis without an explicit size yet.
    pub fn begin_resize(&mut self, pointer: Point, handle: ResizeHandle, measured: Size) -> bool {
        if !self.state.is_selected || self.gesture.is_some() {
            log::debug!("{}: begin_resize ignored", self.element);
            return false;
        }
        let t = self.state.transform;
        self.gesture = Some(ActiveGesture::Resize {
            handle,
            start_pointer: pointer,
            start: t,
            start_size: Size::new(
                t.width.unwrap_or(measured.width),
                t.height.unwrap_or(measured.height),
            ),
        });
        self.state.is_resizing = true;
        true
    }

    /// Apply pointer movement to the active gesture. Returns `true` if the
    /// transform changed.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };
        let next = match gesture {
            ActiveGesture::Drag {
                start_pointer,
                start,
            } => {
                let mut t = start;
                t.set_offset(start.offset() + (pointer - start_pointer));
                t
            }
            ActiveGesture::Resize {
                handle,
                start_pointer,
                start,
                start_size,
            } => resized(start, start_size, handle, pointer - start_pointer, self.floor),
        };
        let changed = next != self.state.transform;
        self.state.transform = next;
        changed
    }

    /// Finish the active gesture at `pointer` and commit the final
    /// transform. A gesture with no movement still commits.
    pub fn pointer_up(&mut self, pointer: Point) -> Option<Patch> {
        self.gesture?;
        self.pointer_move(pointer);
        self.gesture = None;
        self.state.is_dragging = false;
        self.state.is_resizing = false;
        Some(Patch::transform(self.element, self.state.transform))
    }

    /// Programmatic transform change; always commits.
    pub fn set_transform(&mut self, patch: &TransformPatch) -> Patch {
        self.state.transform.merge(patch);
        Patch::transform(self.element, self.state.transform)
    }

    /// Re-seed from persisted data. Ignored mid-gesture.
    pub fn sync_transform(&mut self, transform: ElementTransform) {
        if self.gesture.is_none() {
            self.state.transform = transform;
        }
    }
}

/// Transform after dragging `handle` by `delta` from the starting box.
/// West/north handles move the origin so the opposite edge stays put.
fn resized(
    start: ElementTransform,
    start_size: Size,
    handle: ResizeHandle,
    delta: deck_core::Vec2,
    floor: ResizeFloor,
) -> ElementTransform {
    let mut t = start;
    if handle.affects_width() {
        let raw = if handle.grows_left() {
            start_size.width - delta.x
        } else {
            start_size.width + delta.x
        };
        let width = raw.max(floor.min_width);
        if handle.grows_left() {
            t.offset_x = start.offset_x + (start_size.width - width);
        }
        t.width = Some(width);
    }
    if handle.affects_height() {
        let raw = if handle.grows_up() {
            start_size.height - delta.y
        } else {
            start_size.height + delta.y
        };
        let height = raw.max(floor.min_height);
        if handle.grows_up() {
            t.offset_y = start.offset_y + (start_size.height - height);
        }
        t.height = Some(height);
    }
    t
}
