//! Surface tree: which rendered node belongs to which editable element.
//!
//! Mirrors the containment of the hosted DOM: the canvas root, one
//! subtree per editable element (its hit area, resize handles, and the
//! live text input while editing), the floating style popup, and any
//! non-editable chrome. Pointer targets are classified by walking up to
//! the nearest element ancestor.

use crate::element::{ElementRef, ResizeHandle};
use kurbo::Rect;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Root,
    Element(ElementRef),
    Handle(ElementRef, ResizeHandle),
    TextInput(ElementRef),
    Popup,
    Chrome,
}

/// A rendered node and its last measured box (layout-root coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub bounds: Option<Rect>,
}

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// Canvas root or chrome: inside the layout but outside every element.
    Canvas,
    Element(ElementRef),
    Handle(ElementRef, ResizeHandle),
    /// The live text input of an element being edited.
    TextInput(ElementRef),
    Popup,
    /// Outside the layout entirely.
    Outside,
}

impl PointerTarget {
    /// Element whose subtree the target is in.
    pub fn element(self) -> Option<ElementRef> {
        match self {
            Self::Element(el) | Self::Handle(el, _) | Self::TextInput(el) => Some(el),
            Self::Canvas | Self::Popup | Self::Outside => None,
        }
    }

    /// Build a target from DOM marker attributes: the element id found on
    /// the nearest marked ancestor, the handle marker on the node itself,
    /// and whether the node is the live text input.
    pub fn from_markers(
        element: Option<ElementRef>,
        handle: Option<&str>,
        text_input: bool,
    ) -> Self {
        match element {
            None => Self::Canvas,
            Some(el) if text_input => Self::TextInput(el),
            Some(el) => match handle.and_then(ResizeHandle::from_marker) {
                Some(h) => Self::Handle(el, h),
                None => Self::Element(el),
            },
        }
    }
}

pub struct SurfaceTree {
    pub graph: StableDiGraph<Surface, ()>,
    pub root: NodeIndex,
    elements: HashMap<ElementRef, NodeIndex>,
}

impl Default for SurfaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceTree {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(Surface {
            kind: SurfaceKind::Root,
            bounds: None,
        });
        Self {
            graph,
            root,
            elements: HashMap::new(),
        }
    }

    /// Add a node under `parent`.
    pub fn add(&mut self, parent: NodeIndex, kind: SurfaceKind) -> NodeIndex {
        let idx = self.graph.add_node(Surface { kind, bounds: None });
        self.graph.add_edge(parent, idx, ());
        idx
    }

    /// Add an element subtree (hit area plus its eight handles) under the
    /// root. Re-adding an element returns the existing node.
    pub fn add_element(&mut self, element: ElementRef) -> NodeIndex {
        if let Some(&idx) = self.elements.get(&element) {
            return idx;
        }
        let idx = self.add(self.root, SurfaceKind::Element(element));
        for handle in ResizeHandle::ALL {
            self.add(idx, SurfaceKind::Handle(element, handle));
        }
        self.elements.insert(element, idx);
        idx
    }

    /// Remove an element and everything under it.
    pub fn remove_element(&mut self, element: ElementRef) {
        let Some(idx) = self.elements.remove(&element) else {
            return;
        };
        let mut stack = vec![idx];
        while let Some(node) = stack.pop() {
            stack.extend(self.children(node));
            self.graph.remove_node(node);
        }
    }

    pub fn index_of(&self, element: ElementRef) -> Option<NodeIndex> {
        self.elements.get(&element).copied()
    }

    /// Show the live text input inside an element's subtree.
    pub fn attach_text_input(&mut self, element: ElementRef) -> Option<NodeIndex> {
        let idx = self.index_of(element)?;
        if let Some(existing) = self.find_child(idx, SurfaceKind::TextInput(element)) {
            return Some(existing);
        }
        let input = self.add(idx, SurfaceKind::TextInput(element));
        // The input overlays the element's own box until the host re-measures.
        self.graph[input].bounds = self.graph[idx].bounds;
        Some(input)
    }

    pub fn detach_text_input(&mut self, element: ElementRef) {
        if let Some(idx) = self.index_of(element)
            && let Some(input) = self.find_child(idx, SurfaceKind::TextInput(element))
        {
            self.graph.remove_node(input);
        }
    }

    fn find_child(&self, parent: NodeIndex, kind: SurfaceKind) -> Option<NodeIndex> {
        self.children(parent)
            .into_iter()
            .find(|&child| self.graph[child].kind == kind)
    }

    pub fn set_bounds(&mut self, idx: NodeIndex, bounds: Rect) {
        if let Some(surface) = self.graph.node_weight_mut(idx) {
            surface.bounds = Some(bounds);
        }
    }

    pub fn set_root_bounds(&mut self, bounds: Rect) {
        self.set_bounds(self.root, bounds);
    }

    pub fn root_bounds(&self) -> Option<Rect> {
        self.graph[self.root].bounds
    }

    pub fn set_element_bounds(&mut self, element: ElementRef, bounds: Rect) -> bool {
        match self.index_of(element) {
            Some(idx) => {
                self.set_bounds(idx, bounds);
                true
            }
            None => false,
        }
    }

    pub fn element_bounds(&self, element: ElementRef) -> Option<Rect> {
        self.index_of(element).and_then(|idx| self.graph[idx].bounds)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in insertion (paint) order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Nearest element whose subtree contains `idx`.
    pub fn owning_element(&self, idx: NodeIndex) -> Option<ElementRef> {
        let mut current = Some(idx);
        while let Some(node) = current {
            if let SurfaceKind::Element(element) = self.graph.node_weight(node)?.kind {
                return Some(element);
            }
            current = self.parent(node);
        }
        None
    }

    /// Classify a node as a pointer target.
    pub fn target_of(&self, idx: NodeIndex) -> PointerTarget {
        let Some(surface) = self.graph.node_weight(idx) else {
            return PointerTarget::Outside;
        };
        match surface.kind {
            SurfaceKind::Element(el) => PointerTarget::Element(el),
            SurfaceKind::Handle(el, h) => PointerTarget::Handle(el, h),
            SurfaceKind::TextInput(el) => PointerTarget::TextInput(el),
            SurfaceKind::Popup => PointerTarget::Popup,
            SurfaceKind::Root | SurfaceKind::Chrome => match self.owning_element(idx) {
                Some(el) => PointerTarget::Element(el),
                None => PointerTarget::Canvas,
            },
        }
    }
}
