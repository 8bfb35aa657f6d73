//! Headless editable surface: view trees and their builder

pub mod builder;
mod tree;

pub use tree::{
    NodeKind, NodeRef, Point, Rect, TextLeaf, ViewId, ViewNode, ViewPoint, ViewRange, ViewTree,
};
