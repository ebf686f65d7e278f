pub mod document;
pub mod element;
pub mod model;
pub mod parser;
pub mod patch;
pub mod style;
pub mod surface;

pub use document::{Content, Document, DocumentError, ElementEntry, LayoutKind};
pub use element::{ChangeKind, ElementKind, ElementRef, MemberField, Region, ResizeHandle};
pub use model::{ElementTransform, SelectionState, TransformPatch};
pub use parser::{ParseElementRefError, parse_element_ref};
pub use patch::{Change, Patch};
pub use style::{Alignment, Color, InvalidStyle, StyleChange, TextStyle};
pub use surface::{PointerTarget, SurfaceKind, SurfaceTree};

// Re-export geometry and graph types so downstream crates share one version
pub use kurbo::{Point, Rect, Size, Vec2};
pub use petgraph::graph::NodeIndex;
