//! Pointer gesture disambiguation.
//!
//! Classifies each pointer-down as click-to-select, drag-to-move or resize
//! and drives the matching [`SelectionStore`](crate::store::SelectionStore)
//! through the arbiter. Only one gesture is in flight at a time; pointer
//! capture is single-pointer, so a pointer-down that arrives mid-gesture is
//! ignored rather than allowed to interrupt it.
//!
//! ```text
//! Idle ──down(el)──▶ Armed ──move > threshold──▶ Dragging ──up──▶ Idle (commit)
//!                      └────────────up─────────▶ Idle (click)
//! Idle ──down(handle)──▶ Resizing ──up──▶ Idle (commit)
//! ```

use deck_core::element::ElementRef;
use deck_core::patch::Patch;
use deck_core::surface::PointerTarget;
use deck_core::{Point, Size};
use smallvec::SmallVec;

use crate::selection::SelectionArbiter;

/// Outcome of feeding one pointer event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// `element` became the selected element.
    Selected(ElementRef),
    /// Canvas click cleared every selection.
    SelectionCleared,
    /// Page-level move/up listeners are needed for `element`.
    Capture(ElementRef),
    /// Page-level listeners for `element` can be removed.
    Release(ElementRef),
    /// The transform of `element` changed this frame.
    Moved(ElementRef),
    /// A drag or resize ended with this transform.
    Committed(Patch),
    /// Pointer went down and up on `element` without dragging.
    Clicked {
        element: ElementRef,
        was_selected: bool,
    },
    /// Text editing was requested for `element`.
    EditRequested(ElementRef),
}

pub type Signals = SmallVec<[Signal; 4]>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Pointer is down on an element but has not yet moved far enough to
    /// count as a drag.
    Armed {
        element: ElementRef,
        origin: Point,
        was_selected: bool,
    },
    Dragging(ElementRef),
    Resizing(ElementRef),
}

#[derive(Debug)]
pub struct InteractionController {
    phase: Phase,
    drag_threshold: f64,
}

impl InteractionController {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            phase: Phase::Idle,
            drag_threshold,
        }
    }

    /// Element the pointer is currently down on, if any.
    pub fn active_element(&self) -> Option<ElementRef> {
        match self.phase {
            Phase::Idle => None,
            Phase::Armed { element, .. } => Some(element),
            Phase::Dragging(el) | Phase::Resizing(el) => Some(el),
        }
    }

    /// A drag or resize is mutating a transform.
    pub fn in_gesture(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_) | Phase::Resizing(_))
    }

    /// Handle a pointer-down on `target` at `at`.
    ///
    /// `measured` is the rendered box of the target element (resize start
    /// size fallback). `busy` marks an element that is not interactive right
    /// now (e.g. an upload is in flight).
    pub fn pointer_down(
        &mut self,
        arbiter: &mut SelectionArbiter,
        target: PointerTarget,
        at: Point,
        measured: Option<Size>,
        busy: bool,
    ) -> Signals {
        let mut out = Signals::new();
        if self.in_gesture() {
            log::debug!("pointer-down on {target:?} during an active gesture ignored");
            return out;
        }
        // A lost pointer-up leaves us armed; start over.
        if let Phase::Armed { element, .. } = self.phase {
            self.phase = Phase::Idle;
            out.push(Signal::Release(element));
        }

        match target {
            PointerTarget::TextInput(_) | PointerTarget::Popup | PointerTarget::Outside => {}
            PointerTarget::Canvas => {
                out.extend(
                    arbiter
                        .deselect_all_except(None)
                        .into_iter()
                        .map(Signal::Release),
                );
                out.push(Signal::SelectionCleared);
            }
            PointerTarget::Handle(element, handle) => {
                if busy {
                    log::debug!("{element} is busy; resize ignored");
                    return out;
                }
                if !select(arbiter, element, &mut out) {
                    return out;
                }
                let started = arbiter.store_mut(element).is_some_and(|store| {
                    store.begin_resize(at, handle, measured.unwrap_or(Size::ZERO))
                });
                if started {
                    self.phase = Phase::Resizing(element);
                    out.push(Signal::Capture(element));
                }
            }
            PointerTarget::Element(element) => {
                if busy {
                    log::debug!("{element} is busy; pointer-down ignored");
                    return out;
                }
                let was_selected = arbiter.is_selected(element);
                if !select(arbiter, element, &mut out) {
                    return out;
                }
                self.phase = Phase::Armed {
                    element,
                    origin: at,
                    was_selected,
                };
                out.push(Signal::Capture(element));
            }
        }
        out
    }

    /// Page-level pointer-move.
    pub fn pointer_move(&mut self, arbiter: &mut SelectionArbiter, at: Point) -> Signals {
        let mut out = Signals::new();
        match self.phase {
            Phase::Idle => {}
            Phase::Armed {
                element, origin, ..
            } => {
                if (at - origin).hypot() <= self.drag_threshold {
                    return out;
                }
                let Some(store) = arbiter.store_mut(element) else {
                    self.phase = Phase::Idle;
                    out.push(Signal::Release(element));
                    return out;
                };
                // Measured from the pointer-down so the threshold travel is
                // not lost.
                if !store.begin_drag(origin) {
                    self.phase = Phase::Idle;
                    out.push(Signal::Release(element));
                    return out;
                }
                self.phase = Phase::Dragging(element);
                store.pointer_move(at);
                log::trace!("{element}: drag started at ({}, {})", at.x, at.y);
                out.push(Signal::Moved(element));
            }
            Phase::Dragging(element) | Phase::Resizing(element) => {
                match arbiter.store_mut(element) {
                    Some(store) if store.is_listening() => {
                        if store.pointer_move(at) {
                            log::trace!("{element}: pointer ({}, {})", at.x, at.y);
                            out.push(Signal::Moved(element));
                        }
                    }
                    _ => {
                        // Store was dropped or cancelled underneath us.
                        self.phase = Phase::Idle;
                        out.push(Signal::Release(element));
                    }
                }
            }
        }
        out
    }

    /// Page-level pointer-up.
    pub fn pointer_up(&mut self, arbiter: &mut SelectionArbiter, at: Point) -> Signals {
        let mut out = Signals::new();
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Armed {
                element,
                was_selected,
                ..
            } => {
                out.push(Signal::Release(element));
                out.push(Signal::Clicked {
                    element,
                    was_selected,
                });
            }
            Phase::Dragging(element) | Phase::Resizing(element) => {
                if let Some(patch) = arbiter.store_mut(element).and_then(|s| s.pointer_up(at)) {
                    out.push(Signal::Committed(patch));
                }
                out.push(Signal::Release(element));
            }
        }
        out
    }

    /// Double-click on `target`. Text elements enter edit mode.
    pub fn double_click(
        &mut self,
        arbiter: &mut SelectionArbiter,
        target: PointerTarget,
    ) -> Signals {
        let mut out = Signals::new();
        let PointerTarget::Element(element) = target else {
            return out;
        };
        if !element.is_text() || self.in_gesture() {
            return out;
        }
        if !arbiter.is_selected(element) && !select(arbiter, element, &mut out) {
            return out;
        }
        out.push(Signal::EditRequested(element));
        out
    }

    /// Abandon whatever is in flight without committing.
    pub fn cancel(&mut self, arbiter: &mut SelectionArbiter) -> Signals {
        let mut out = Signals::new();
        if let Some(element) = self.active_element() {
            if let Some(store) = arbiter.store_mut(element) {
                store.deselect();
            }
            out.push(Signal::Release(element));
        }
        self.phase = Phase::Idle;
        out
    }
}

/// Select `element` through the arbiter, recording the signals.
fn select(arbiter: &mut SelectionArbiter, element: ElementRef, out: &mut Signals) -> bool {
    if arbiter.store(element).is_none() {
        log::debug!("pointer-down on unregistered {element} ignored");
        return false;
    }
    out.extend(arbiter.select(element).into_iter().map(Signal::Release));
    out.push(Signal::Selected(element));
    true
}
