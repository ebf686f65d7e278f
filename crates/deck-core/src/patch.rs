//! Single-field partial updates emitted by the editing core.

use crate::element::{ChangeKind, ElementRef};
use crate::model::ElementTransform;
use crate::style::StyleChange;
use serde::{Deserialize, Serialize};

/// What a patch changes on its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Change {
    Text(String),
    ImageUrl(String),
    Transform(ElementTransform),
    Style(StyleChange),
    Delete,
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Text(_) | Self::ImageUrl(_) => ChangeKind::Content,
            Self::Transform(_) => ChangeKind::Transform,
            Self::Style(_) => ChangeKind::Style,
            Self::Delete => ChangeKind::Delete,
        }
    }
}

/// A committed edit on one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub target: ElementRef,
    pub change: Change,
}

impl Patch {
    pub fn new(target: ElementRef, change: Change) -> Self {
        Self { target, change }
    }

    pub fn text(target: ElementRef, text: impl Into<String>) -> Self {
        Self::new(target, Change::Text(text.into()))
    }

    pub fn image_url(target: ElementRef, url: impl Into<String>) -> Self {
        Self::new(target, Change::ImageUrl(url.into()))
    }

    pub fn transform(target: ElementRef, transform: ElementTransform) -> Self {
        Self::new(target, Change::Transform(transform))
    }

    pub fn style(target: ElementRef, change: StyleChange) -> Self {
        Self::new(target, Change::Style(change))
    }

    pub fn delete(target: ElementRef) -> Self {
        Self::new(target, Change::Delete)
    }

    /// Host-facing key this patch writes.
    pub fn field_name(&self) -> String {
        self.target.field_name(self.change.kind())
    }

    /// Render as the single-key partial object handed to the host's
    /// `onUpdate`, e.g. `{"titleTransform": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        let value = match &self.change {
            Change::Text(text) | Change::ImageUrl(text) => serde_json::Value::String(text.clone()),
            Change::Transform(t) => serde_json::to_value(t).unwrap_or(serde_json::Value::Null),
            Change::Style(s) => serde_json::to_value(s).unwrap_or(serde_json::Value::Null),
            Change::Delete => serde_json::Value::Bool(true),
        };
        let mut object = serde_json::Map::with_capacity(1);
        object.insert(self.field_name(), value);
        serde_json::Value::Object(object)
    }
}
