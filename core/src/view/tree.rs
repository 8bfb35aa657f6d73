//! Arena-backed view tree
//!
//! A `ViewTree` is the headless stand-in for one editable root and its
//! rendered children:
//!
//! ```text
//! Root
//! ├── Line
//! │   ├── Text "Hello "
//! │   └── Element <a href>
//! │       └── Text "world"
//! └── Line
//!     └── Text "\u{200B}" (sentinel)
//! ```
//!
//! Nodes live in a `Vec` and are appended depth-first, so arena order is
//! document order. Every rebuild bumps the tree's epoch; a [`NodeRef`] taken
//! from an earlier epoch no longer resolves, which is how stale view
//! positions are rejected instead of silently pointing at new nodes.

use crate::model::TextStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identity of one editable root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a node in one snapshot of one view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub view: ViewId,
    pub epoch: u64,
    pub index: usize,
}

/// Node plus local offset, the platform's notion of a selection endpoint
///
/// For a text node the offset counts UTF-16 code units into its text; for
/// any other node it counts children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewPoint {
    pub node: NodeRef,
    pub offset: usize,
}

impl ViewPoint {
    pub fn new(node: NodeRef, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Start/end pair produced by the model→view mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub start: ViewPoint,
    pub end: ViewPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x && point.x <= self.right() && self.y <= point.y && point.y <= self.bottom()
    }

    /// Euclidean distance from `point` to the nearest point of the rect
    pub fn distance_to(&self, point: Point) -> f32 {
        let dx = (self.x - point.x).max(0.0).max(point.x - self.right());
        let dy = (self.y - point.y).max(0.0).max(point.y - self.bottom());
        (dx * dx + dy * dy).sqrt()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Text-bearing leaf
#[derive(Debug, Clone, PartialEq)]
pub struct TextLeaf {
    pub text: String,
    /// Length in UTF-16 code units; 0 for the sentinel
    pub len: usize,
    pub sentinel: bool,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Line,
    Element {
        tag: String,
        props: BTreeMap<String, String>,
    },
    Text(TextLeaf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub kind: NodeKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub rect: Rect,
}

impl ViewNode {
    pub fn as_text(&self) -> Option<&TextLeaf> {
        match &self.kind {
            NodeKind::Text(leaf) => Some(leaf),
            _ => None,
        }
    }
}

const ROOT: usize = 0;

/// One editable root and its rendered subtree
#[derive(Debug, Clone)]
pub struct ViewTree {
    view: ViewId,
    epoch: u64,
    origin: Point,
    nodes: Vec<ViewNode>,
}

impl ViewTree {
    /// Empty root at `origin` with a fresh identity
    pub fn new(origin: Point) -> Self {
        Self::with_id(ViewId::new(), origin)
    }

    pub fn with_id(view: ViewId, origin: Point) -> Self {
        Self {
            view,
            epoch: 0,
            origin,
            nodes: vec![ViewNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                rect: Rect::new(origin.x, origin.y, 0.0, 0.0),
            }],
        }
    }

    pub fn view_id(&self) -> ViewId {
        self.view
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn root(&self) -> usize {
        ROOT
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&ViewNode> {
        self.nodes.get(index)
    }

    /// Reference to `index` valid for the current epoch
    pub fn node_ref(&self, index: usize) -> NodeRef {
        NodeRef {
            view: self.view,
            epoch: self.epoch,
            index,
        }
    }

    /// Arena index of `node`, if it belongs to this view's current snapshot
    pub fn resolve(&self, node: &NodeRef) -> Option<usize> {
        if node.view != self.view || node.epoch != self.epoch || node.index >= self.nodes.len() {
            return None;
        }
        Some(node.index)
    }

    /// Line containers in order
    pub fn lines(&self) -> &[usize] {
        &self.nodes[ROOT].children
    }

    pub fn leaf(&self, index: usize) -> Option<&TextLeaf> {
        self.nodes.get(index).and_then(ViewNode::as_text)
    }

    /// Text leaves below `index` in document order
    pub fn leaves_under(&self, index: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.as_text().is_some() {
                leaves.push(current);
            }
            stack.extend(node.children.iter().rev());
        }
        leaves
    }

    /// Every text leaf in document order
    pub fn leaves(&self) -> Vec<usize> {
        self.leaves_under(ROOT)
    }

    /// Line container holding `index`
    pub fn line_of(&self, index: usize) -> Option<usize> {
        let mut current = index;
        loop {
            let node = self.nodes.get(current)?;
            match node.kind {
                NodeKind::Line => return Some(current),
                NodeKind::Root => return None,
                _ => current = node.parent?,
            }
        }
    }

    /// Rendered text: lines joined by `\n`, sentinels omitted
    pub fn text_content(&self) -> String {
        self.lines()
            .iter()
            .map(|&line| {
                self.leaves_under(line)
                    .into_iter()
                    .filter_map(|leaf| self.leaf(leaf))
                    .filter(|leaf| !leaf.sentinel)
                    .map(|leaf| leaf.text.as_str())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop every child of the root and start a new epoch
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.nodes.truncate(1);
        let root = &mut self.nodes[ROOT];
        root.children.clear();
        root.rect = Rect::new(self.origin.x, self.origin.y, 0.0, 0.0);
    }

    /// Append a node as last child of `parent`; returns its index
    pub fn append(&mut self, parent: usize, kind: NodeKind, rect: Rect) -> usize {
        let index = self.nodes.len();
        self.nodes.push(ViewNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            rect,
        });
        self.nodes[parent].children.push(index);
        index
    }

    pub fn set_rect(&mut self, index: usize, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.rect = rect;
        }
    }
}
