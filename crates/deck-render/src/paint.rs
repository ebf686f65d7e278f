//! Selection state → presentation box for an editable primitive.
//!
//! The host renders elements in normal document flow; the transform is
//! applied on top as a CSS translate/scale and optional explicit size, so
//! unedited elements keep their natural layout.

use deck_core::element::ResizeHandle;
use deck_core::model::SelectionState;
use deck_core::style::TextStyle;
use kurbo::Vec2;
use serde::Serialize;
use std::fmt::Write;

/// Handle placement as percentages of the element box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlePlacement {
    pub handle: &'static str,
    pub left_pct: f64,
    pub top_pct: f64,
}

/// How an element is drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub translate: Vec2,
    pub scale: Vec2,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Selection outline.
    pub outlined: bool,
    pub handles: Vec<HandlePlacement>,
    /// Pointer cursor to show over the element.
    pub cursor: &'static str,
}

/// Build the presentation for one element.
///
/// `show_handles` is false for elements that cannot be resized right now
/// (e.g. while their text is being edited).
pub fn present(state: &SelectionState, show_handles: bool) -> Presentation {
    let t = &state.transform;
    let handles = if state.is_selected && show_handles {
        ResizeHandle::ALL
            .iter()
            .map(|h| {
                let (ux, uy) = h.unit_position();
                HandlePlacement {
                    handle: h.as_str(),
                    left_pct: ux * 100.0,
                    top_pct: uy * 100.0,
                }
            })
            .collect()
    } else {
        Vec::new()
    };
    let cursor = if state.is_dragging {
        "grabbing"
    } else if state.is_selected {
        "move"
    } else {
        "pointer"
    };

    log::trace!(
        "PRESENT offset=({}, {}) selected={} dragging={} resizing={}",
        t.offset_x,
        t.offset_y,
        state.is_selected,
        state.is_dragging,
        state.is_resizing
    );

    Presentation {
        translate: t.offset(),
        scale: t.effective_scale(),
        width: t.width,
        height: t.height,
        outlined: state.is_selected,
        handles,
        cursor,
    }
}

impl Presentation {
    /// Inline CSS declarations for the element's wrapper.
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "transform: translate({}px, {}px) scale({}, {}); transform-origin: top left;",
            self.translate.x, self.translate.y, self.scale.x, self.scale.y
        );
        if let Some(w) = self.width {
            let _ = write!(css, " width: {w}px;");
        }
        if let Some(h) = self.height {
            let _ = write!(css, " height: {h}px;");
        }
        if self.outlined {
            css.push_str(" outline: 2px solid #3B82F6;");
        }
        let _ = write!(css, " cursor: {};", self.cursor);
        css
    }
}

/// Inline CSS for a text element's typography.
pub fn text_css(style: &TextStyle) -> String {
    format!(
        "font-size: {}px; font-family: {}; color: {}; text-align: {};",
        style.font_size,
        css_string(&style.font_family),
        style.color.to_hex(),
        style.alignment.as_css()
    )
}

/// Double-quoted CSS string literal. Control characters are dropped.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars().filter(|c| !c.is_control()) {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
