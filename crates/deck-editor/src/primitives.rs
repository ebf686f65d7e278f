//! View models for the editable text and image primitives.
//!
//! Built fresh from the document on every render; nothing here is kept
//! between frames.

use deck_core::document::ElementEntry;
use deck_core::element::ElementRef;
use deck_core::model::SelectionState;
use deck_core::style::TextStyle;
use deck_render::paint::{Presentation, present, text_css};
use serde::Serialize;

use crate::text_edit::TextEditSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum TextMode {
    Static,
    /// The live input replaces the static text.
    Editing { draft: String, height: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableText {
    pub element: ElementRef,
    pub text: String,
    pub style: TextStyle,
    pub presentation: Presentation,
    /// Wrapper transform plus typography, ready for a `style` attribute.
    pub css: String,
    #[serde(flatten)]
    pub mode: TextMode,
}

impl EditableText {
    /// `None` if the entry does not hold text.
    pub fn build(
        element: ElementRef,
        entry: &ElementEntry,
        state: &SelectionState,
        editing: Option<&TextEditSession>,
    ) -> Option<Self> {
        let text = entry.content.as_text()?;
        let style = entry.effective_style();
        let editing = editing.filter(|s| s.element() == element);
        let presentation = present(state, editing.is_none());
        let css = format!("{} {}", presentation.to_css(), text_css(&style));
        let mode = match editing {
            Some(session) => TextMode::Editing {
                draft: session.draft().to_string(),
                height: session.auto_height(style.font_size),
            },
            None => TextMode::Static,
        };
        Some(Self {
            element,
            text: text.to_string(),
            style,
            presentation,
            css,
            mode,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageMode {
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableImage {
    pub element: ElementRef,
    pub url: String,
    pub presentation: Presentation,
    pub css: String,
    pub mode: ImageMode,
    /// Pointer events are accepted.
    pub interactive: bool,
    /// Show the upload/replace affordance.
    pub show_replace: bool,
}

impl EditableImage {
    /// `None` if the entry does not hold an image.
    pub fn build(
        element: ElementRef,
        entry: &ElementEntry,
        state: &SelectionState,
        loading: bool,
    ) -> Option<Self> {
        let url = entry.content.as_image_url()?;
        let presentation = present(state, !loading);
        let css = presentation.to_css();
        Some(Self {
            element,
            url: url.to_string(),
            presentation,
            css,
            mode: if loading {
                ImageMode::Loading
            } else {
                ImageMode::Idle
            },
            interactive: !loading,
            show_replace: state.is_selected && !loading,
        })
    }
}
