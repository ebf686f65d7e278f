//! Hit testing: point → pointer target.
//!
//! Reverse-walks the surface tree (front-to-back) to find which surface is
//! under a layout-space point. Resize handles are only live around the
//! selected element and are tested first, since they straddle its edge.

use deck_core::NodeIndex;
use deck_core::element::{ElementRef, ResizeHandle};
use deck_core::surface::{PointerTarget, SurfaceKind, SurfaceTree};
use kurbo::{Point, Rect};

/// Classify the point `(px, py)`.
///
/// Returns [`PointerTarget::Outside`] when the root has measured bounds and
/// the point lies beyond them.
pub fn hit_test(
    tree: &SurfaceTree,
    selected: Option<ElementRef>,
    point: Point,
    handle_radius: f64,
) -> PointerTarget {
    if let Some(root) = tree.root_bounds()
        && !root.contains(point)
    {
        return PointerTarget::Outside;
    }

    if let Some(element) = selected
        && let Some(bounds) = tree.element_bounds(element)
        && let Some(handle) = handle_at(bounds, point, handle_radius)
    {
        return PointerTarget::Handle(element, handle);
    }

    match hit_test_node(tree, tree.root, point) {
        Some(idx) => tree.target_of(idx),
        None => PointerTarget::Canvas,
    }
}

fn hit_test_node(tree: &SurfaceTree, idx: NodeIndex, point: Point) -> Option<NodeIndex> {
    // Children in reverse (topmost first)
    for child in tree.children(idx).into_iter().rev() {
        if let Some(hit) = hit_test_node(tree, child, point) {
            return Some(hit);
        }
    }

    let surface = tree.graph.node_weight(idx)?;
    if matches!(surface.kind, SurfaceKind::Root | SurfaceKind::Handle(..)) {
        return None;
    }

    surface
        .bounds
        .filter(|b| b.contains(point))
        .map(|_| idx)
}

/// Centers of the eight handles around `bounds`.
pub fn handle_points(bounds: Rect) -> [(ResizeHandle, Point); 8] {
    ResizeHandle::ALL.map(|handle| {
        let (ux, uy) = handle.unit_position();
        (
            handle,
            Point::new(
                bounds.x0 + bounds.width() * ux,
                bounds.y0 + bounds.height() * uy,
            ),
        )
    })
}

/// The handle whose square of half-size `radius` contains `point`.
/// Corners win over edges when both are within reach.
pub fn handle_at(bounds: Rect, point: Point, radius: f64) -> Option<ResizeHandle> {
    let mut best: Option<(ResizeHandle, f64)> = None;
    for (handle, center) in handle_points(bounds) {
        let d = point - center;
        if d.x.abs() > radius || d.y.abs() > radius {
            continue;
        }
        let corner = handle.affects_width() && handle.affects_height();
        let score = d.hypot() - if corner { radius } else { 0.0 };
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((handle, score));
        }
    }
    best.map(|(handle, _)| handle)
}
