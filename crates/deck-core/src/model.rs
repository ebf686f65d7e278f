//! Per-element geometry and selection state.
//!
//! An [`ElementTransform`] is an override applied on top of an element's
//! natural layout box: a translation, independent axis scales, a uniform
//! scale, and optional explicit dimensions. Natural flow is only replaced
//! along an axis that carries an explicit dimension.

use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry override for one editable element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ElementTransform {
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        scale: 1.0,
        width: None,
        height: None,
    };

    /// Identity transform translated to `(x, y)`.
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            offset_x: x,
            offset_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset_x = offset.x;
        self.offset_y = offset.y;
    }

    /// Explicit size if both axes carry one.
    pub fn explicit_size(&self) -> Option<Size> {
        Some(Size::new(self.width?, self.height?))
    }

    /// Effective scale factors per axis (axis scale times uniform scale).
    pub fn effective_scale(&self) -> Vec2 {
        Vec2::new(self.scale_x * self.scale, self.scale_y * self.scale)
    }

    /// Merge a partial update into this transform.
    pub fn merge(&mut self, patch: &TransformPatch) {
        if let Some(x) = patch.offset_x {
            self.offset_x = x;
        }
        if let Some(y) = patch.offset_y {
            self.offset_y = y;
        }
        if let Some(sx) = patch.scale_x {
            self.scale_x = sx;
        }
        if let Some(sy) = patch.scale_y {
            self.scale_y = sy;
        }
        if let Some(s) = patch.scale {
            self.scale = s;
        }
        if patch.clear_size {
            self.width = None;
            self.height = None;
        }
        if let Some(w) = patch.width {
            self.width = Some(w);
        }
        if let Some(h) = patch.height {
            self.height = Some(h);
        }
    }

    /// The box the element occupies once this transform is applied to its
    /// natural box. Scaling is anchored at the top-left corner.
    pub fn apply_to(&self, natural: Rect) -> Rect {
        let scale = self.effective_scale();
        let width = self.width.unwrap_or(natural.width()) * scale.x;
        let height = self.height.unwrap_or(natural.height()) * scale.y;
        Rect::from_origin_size(natural.origin() + self.offset(), Size::new(width, height))
    }
}

/// Partial transform update used by non-pointer style actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformPatch {
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub scale: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Drop explicit dimensions before applying `width`/`height`.
    pub clear_size: bool,
}

/// Selection and gesture flags for one element plus its live transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub is_selected: bool,
    pub is_dragging: bool,
    pub is_resizing: bool,
    pub transform: ElementTransform,
}

impl SelectionState {
    pub fn new(transform: ElementTransform) -> Self {
        Self {
            is_selected: false,
            is_dragging: false,
            is_resizing: false,
            transform,
        }
    }
}
