//! The slide document: single source of truth for element content,
//! transforms and style overrides.
//!
//! The editing core never keeps a private copy of content. It reads the
//! current value from here on every render and only ever writes through
//! [`Document::apply`].

use crate::element::{ElementKind, ElementRef};
use crate::model::ElementTransform;
use crate::patch::{Change, Patch};
use crate::style::TextStyle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode document snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode document snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("element `{element}` holds {found:?} content but its id names {expected:?} content")]
    ContentMismatch {
        element: ElementRef,
        expected: ElementKind,
        found: ElementKind,
    },
}

/// Slide template hosting the elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Cover,
    Index,
    Competition,
    Pricing,
    Quote,
    Team,
    Logos,
    #[default]
    Generic,
}

/// Content of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Content {
    Text(String),
    Image { url: String },
}

impl Content {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Image { .. } => ElementKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image { .. } => None,
        }
    }

    pub fn as_image_url(&self) -> Option<&str> {
        match self {
            Self::Image { url } => Some(url),
            Self::Text(_) => None,
        }
    }
}

/// Persisted state of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementEntry {
    pub content: Content,
    #[serde(default)]
    pub transform: ElementTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl ElementEntry {
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(Content::Text(text.into()))
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::with_content(Content::Image { url: url.into() })
    }

    fn with_content(content: Content) -> Self {
        Self {
            content,
            transform: ElementTransform::IDENTITY,
            style: None,
            deleted: false,
        }
    }

    pub fn with_transform(mut self, transform: ElementTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Style override, or the default style when none is stored.
    pub fn effective_style(&self) -> TextStyle {
        self.style.clone().unwrap_or_default()
    }
}

/// The editable content of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub layout: LayoutKind,
    #[serde(default)]
    elements: HashMap<ElementRef, ElementEntry>,
}

impl Document {
    pub fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            elements: HashMap::new(),
        }
    }

    /// Insert or replace an element, rejecting content that does not match
    /// what the element id addresses (e.g. text under `logo-0`).
    pub fn insert(
        &mut self,
        element: ElementRef,
        entry: ElementEntry,
    ) -> Result<(), DocumentError> {
        let found = entry.content.kind();
        if found != element.kind() {
            return Err(DocumentError::ContentMismatch {
                element,
                expected: element.kind(),
                found,
            });
        }
        self.elements.insert(element, entry);
        Ok(())
    }

    pub fn get(&self, element: ElementRef) -> Option<&ElementEntry> {
        self.elements.get(&element)
    }

    /// Element exists and has not been deleted.
    pub fn is_live(&self, element: ElementRef) -> bool {
        self.get(element).is_some_and(|e| !e.deleted)
    }

    /// Live element ids in a stable order.
    pub fn element_refs(&self) -> Vec<ElementRef> {
        let mut refs: Vec<ElementRef> = self
            .elements
            .iter()
            .filter(|(_, entry)| !entry.deleted)
            .map(|(element, _)| *element)
            .collect();
        refs.sort();
        refs
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Apply a patch. Returns `false` when the patch did not fit the
    /// document: unknown or already deleted element, content of the wrong
    /// kind, or an invalid style value.
    pub fn apply(&mut self, patch: &Patch) -> bool {
        let Some(entry) = self.elements.get_mut(&patch.target) else {
            log::warn!("patch for unknown element {} dropped", patch.target);
            return false;
        };
        if entry.deleted {
            log::debug!("patch for deleted element {} dropped", patch.target);
            return false;
        }

        match (&patch.change, &mut entry.content) {
            (Change::Text(text), Content::Text(current)) => current.clone_from(text),
            (Change::ImageUrl(url), Content::Image { url: current }) => current.clone_from(url),
            (Change::Transform(transform), _) => entry.transform = *transform,
            (Change::Style(change), Content::Text(_)) => {
                if let Err(err) = change.validate() {
                    log::warn!("style change for {} dropped: {err}", patch.target);
                    return false;
                }
                change.apply(entry.style.get_or_insert_with(TextStyle::default));
            }
            (Change::Delete, _) => entry.deleted = true,
            (change, content) => {
                log::warn!(
                    "{:?} change does not fit {:?} content of {}",
                    change.kind(),
                    content.kind(),
                    patch.target
                );
                return false;
            }
        }
        true
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compact MessagePack snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc: Self = rmp_serde::from_slice(bytes)?;
        doc.validate()?;
        Ok(doc)
    }

    fn validate(&self) -> Result<(), DocumentError> {
        for (element, entry) in &self.elements {
            let found = entry.content.kind();
            if found != element.kind() {
                return Err(DocumentError::ContentMismatch {
                    element: *element,
                    expected: element.kind(),
                    found,
                });
            }
        }
        Ok(())
    }
}
