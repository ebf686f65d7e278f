//! Editor configuration.
//!
//! Every field has a default, so hosts only send what they override:
//!
//! ```json
//! { "minWidth": 120, "popupPolicy": "perRegion" }
//! ```

use crate::popup::PopupPolicy;
use crate::store::ResizeFloor;
use deck_core::{LayoutKind, Vec2};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid editor config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Smallest width a resize may produce, in px.
    pub min_width: f64,
    /// Smallest height a resize may produce, in px.
    pub min_height: f64,
    /// Pointer travel before an armed drag starts moving the element.
    pub drag_threshold: f64,
    /// Popup anchor distance left of and above the element's top-left corner.
    pub popup_offset: Vec2,
    /// Half-size of a resize handle's hit square.
    pub handle_radius: f64,
    /// Overrides the layout's own popup policy when set.
    pub popup_policy: Option<PopupPolicy>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            min_height: 50.0,
            drag_threshold: 3.0,
            popup_offset: Vec2::new(10.0, 50.0),
            handle_radius: 8.0,
            popup_policy: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("dragThreshold", self.drag_threshold),
            ("handleRadius", self.handle_radius),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn floor(&self) -> ResizeFloor {
        ResizeFloor {
            min_width: self.min_width,
            min_height: self.min_height,
        }
    }

    pub fn popup_policy_for(&self, layout: LayoutKind) -> PopupPolicy {
        self.popup_policy
            .unwrap_or_else(|| PopupPolicy::default_for(layout))
    }
}
