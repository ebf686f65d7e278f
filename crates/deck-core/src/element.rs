//! Typed addressing for editable elements on a slide layout.
//!
//! Every text block or image a layout exposes for direct manipulation is
//! named by an [`ElementRef`]. The string form (`"plan-0-feature-2"`,
//! `"member-1-role"`, …) is what hosts put on DOM nodes; it is parsed back
//! by [`crate::parser`] and never matched on as a raw string.

use crate::parser::{ParseElementRefError, parse_element_ref};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Which per-member field of a team layout an element edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberField {
    Name,
    Role,
    Photo,
}

impl MemberField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Role => "role",
            Self::Photo => "photo",
        }
    }
}

/// An editable element of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRef {
    Title,
    Subtitle,
    Description,
    /// Free-standing image slot (`image-{i}`).
    Image(usize),
    /// Logo in a logo strip or competition grid (`logo-{i}`).
    Logo(usize),
    /// Cell of a comparison table (`cell-{row}-{col}`).
    TableCell { row: usize, col: usize },
    /// Feature line of a pricing plan (`plan-{plan}-feature-{feature}`).
    PlanFeature { plan: usize, feature: usize },
    /// Field of a team member card (`member-{member}-{field}`).
    MemberField { member: usize, field: MemberField },
}

/// Content category of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Image,
}

/// Sub-region of a layout. Popups may be scoped per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Main,
    Table,
    Members,
    Media,
}

/// Which property of an element a patch touches; selects the patch key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Content,
    Transform,
    Style,
    Delete,
}

impl ElementRef {
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Title
            | Self::Subtitle
            | Self::Description
            | Self::TableCell { .. }
            | Self::PlanFeature { .. } => ElementKind::Text,
            Self::MemberField { field, .. } => match field {
                MemberField::Name | MemberField::Role => ElementKind::Text,
                MemberField::Photo => ElementKind::Image,
            },
            Self::Image(_) | Self::Logo(_) => ElementKind::Image,
        }
    }

    pub fn is_text(self) -> bool {
        self.kind() == ElementKind::Text
    }

    pub fn region(self) -> Region {
        match self {
            Self::Title | Self::Subtitle | Self::Description => Region::Main,
            Self::TableCell { .. } | Self::PlanFeature { .. } => Region::Table,
            Self::MemberField { .. } => Region::Members,
            Self::Image(_) | Self::Logo(_) => Region::Media,
        }
    }

    /// Host-facing key for a single-field patch on this element,
    /// e.g. `title`, `titleTransform`, `planFeature_0_2Style`.
    pub fn field_name(self, change: ChangeKind) -> String {
        let base = match self {
            Self::Title => "title".to_string(),
            Self::Subtitle => "subtitle".to_string(),
            Self::Description => "description".to_string(),
            Self::Image(i) => format!("image_{i}"),
            Self::Logo(i) => format!("logo_{i}"),
            Self::TableCell { row, col } => format!("tableCell_{row}_{col}"),
            Self::PlanFeature { plan, feature } => format!("planFeature_{plan}_{feature}"),
            Self::MemberField { member, field } => format!("member_{member}_{}", field.as_str()),
        };
        let suffix = match change {
            ChangeKind::Content => "",
            ChangeKind::Transform => "Transform",
            ChangeKind::Style => "Style",
            ChangeKind::Delete => "Deleted",
        };
        format!("{base}{suffix}")
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Subtitle => f.write_str("subtitle"),
            Self::Description => f.write_str("description"),
            Self::Image(i) => write!(f, "image-{i}"),
            Self::Logo(i) => write!(f, "logo-{i}"),
            Self::TableCell { row, col } => write!(f, "cell-{row}-{col}"),
            Self::PlanFeature { plan, feature } => write!(f, "plan-{plan}-feature-{feature}"),
            Self::MemberField { member, field } => write!(f, "member-{member}-{}", field.as_str()),
        }
    }
}

impl FromStr for ElementRef {
    type Err = ParseElementRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_element_ref(s)
    }
}

impl Serialize for ElementRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Resize handles ──────────────────────────────────────────────────────

/// One of the eight resize handles drawn around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::NW,
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
    ];

    pub fn affects_width(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }

    pub fn affects_height(self) -> bool {
        !matches!(self, Self::E | Self::W)
    }

    /// Dragging this handle moves the left edge.
    pub fn grows_left(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Dragging this handle moves the top edge.
    pub fn grows_up(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    /// Marker string carried on handle DOM nodes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::NE => "ne",
            Self::NW => "nw",
            Self::SE => "se",
            Self::SW => "sw",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == marker)
    }

    /// Position of the handle on a unit box, `(0,0)` top-left to `(1,1)` bottom-right.
    pub fn unit_position(self) -> (f64, f64) {
        match self {
            Self::NW => (0.0, 0.0),
            Self::N => (0.5, 0.0),
            Self::NE => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::SE => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::SW => (0.0, 1.0),
            Self::W => (0.0, 0.5),
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
