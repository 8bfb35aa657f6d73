//! Position Mapper: StaticRange ⇄ view positions
//!
//! The model addresses text by flat UTF-16 offsets in which every line break
//! counts as one unit. A view addresses it by (node, offset) pairs inside one
//! snapshot of its tree. Both directions walk lines and leaves in document
//! order with a running flat index:
//!
//! - a leaf covers `[start, start + len]`, boundaries inclusive so a caret can
//!   sit at either edge of a run
//! - a line contributes the sum of its leaf lengths plus one for its break
//! - a sentinel leaf has length 0
//!
//! When two leaves share a boundary, model→view picks the later one.
//!
//! View→model resolves each selection endpoint independently. An endpoint on
//! a text leaf maps directly. An endpoint on any other node of this view falls
//! back to the geometrically nearest leaf. An endpoint in another view does
//! not resolve, and the selection is then interpreted as one piece of a
//! selection spanning several stacked views.

use crate::range::StaticRange;
use crate::surface::NativeSelection;
use crate::view::{Point, ViewPoint, ViewRange, ViewTree};

/// How the platform sees a selection relative to one view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionContext {
    /// Focus precedes anchor in document order
    pub backward: bool,
    /// The selection fully contains this view's root
    pub contains_root: bool,
    /// Document length in UTF-16 code units
    pub doc_len: usize,
}

/// View position of the flat `index`, or `None` if it is outside this view
pub fn to_view_point(tree: &ViewTree, index: usize) -> Option<ViewPoint> {
    let mut line_start = 0;
    let mut found = None;

    for &line in tree.lines() {
        if line_start > index {
            break;
        }
        let mut cursor = line_start;
        for leaf_index in tree.leaves_under(line) {
            let Some(leaf) = tree.leaf(leaf_index) else {
                continue;
            };
            if cursor <= index && index <= cursor + leaf.len {
                found = Some(ViewPoint::new(tree.node_ref(leaf_index), index - cursor));
            }
            cursor += leaf.len;
        }
        line_start = cursor + 1;
    }

    found
}

/// View range covering `range`
///
/// `None` means the range is not representable in this view; callers treat
/// that as "nothing to show", never as an error.
pub fn to_view_range(tree: &ViewTree, range: StaticRange) -> Option<ViewRange> {
    let start = to_view_point(tree, range.index)?;
    let end = to_view_point(tree, range.end())?;
    Some(ViewRange { start, end })
}

/// Flat index of `offset` inside the text leaf at arena index `leaf`
///
/// The offset is clamped to the leaf; inside a sentinel it is ignored.
pub fn point_to_index(tree: &ViewTree, leaf: usize, offset: usize) -> Option<usize> {
    let mut line_start = 0;

    for &line in tree.lines() {
        let mut cursor = line_start;
        for leaf_index in tree.leaves_under(line) {
            let Some(text) = tree.leaf(leaf_index) else {
                continue;
            };
            if leaf_index == leaf {
                let local = if text.sentinel { 0 } else { offset.min(text.len) };
                return Some(cursor + local);
            }
            cursor += text.len;
        }
        line_start = cursor + 1;
    }

    None
}

/// Text leaf and local offset addressed by `point`
///
/// Returns `None` for points in other views or in an older snapshot of this
/// one.
pub fn resolve_endpoint(tree: &ViewTree, point: &ViewPoint) -> Option<(usize, usize)> {
    let index = tree.resolve(&point.node)?;
    let node = tree.node(index)?;
    if node.as_text().is_some() {
        return Some((index, point.offset));
    }

    // Non-text container: probe just before child `offset`, or past the
    // last child, and snap to the nearest leaf.
    let (probe, at_end) = match node.children.get(point.offset) {
        Some(&child) => {
            let rect = tree.node(child)?.rect;
            (Point::new(rect.x, rect.y + rect.height / 2.0), false)
        }
        None => {
            let rect = match node.children.last() {
                Some(&last) => tree.node(last)?.rect,
                None => node.rect,
            };
            (Point::new(rect.right(), rect.y + rect.height / 2.0), true)
        }
    };

    let leaf = nearest_leaf(tree, probe, !at_end)?;
    let offset = if at_end { tree.leaf(leaf)?.len } else { 0 };
    tracing::trace!(node = index, leaf, offset, "endpoint snapped to nearest leaf");
    Some((leaf, offset))
}

/// Text leaf closest to `probe`, if the probe lies within the root's bounds
///
/// Ties go to the later leaf when `prefer_later` is set, the earlier one
/// otherwise.
pub fn nearest_leaf(tree: &ViewTree, probe: Point, prefer_later: bool) -> Option<usize> {
    let root = tree.node(tree.root())?;
    if !root.rect.contains(probe) {
        return None;
    }

    let mut best: Option<(usize, f32)> = None;
    for leaf in tree.leaves() {
        let distance = tree.node(leaf)?.rect.distance_to(probe);
        let better = match best {
            None => true,
            Some((_, current)) if prefer_later => distance <= current,
            Some((_, current)) => distance < current,
        };
        if better {
            best = Some((leaf, distance));
        }
    }
    best.map(|(leaf, _)| leaf)
}

fn endpoint_index(tree: &ViewTree, point: &ViewPoint) -> Option<usize> {
    let (leaf, offset) = resolve_endpoint(tree, point)?;
    point_to_index(tree, leaf, offset)
}

/// StaticRange covered by `selection` within this view
///
/// 1. Both endpoints resolve: the range between them.
/// 2. One endpoint resolves: the selection continues into another view, so
///    the range runs from the resolved index to the edge of this view that
///    faces the other endpoint.
/// 3. Neither resolves: the whole view if the selection contains its root.
///
/// An endpoint that names this view but an older snapshot makes the whole
/// selection unmappable.
pub fn to_static_range(
    tree: &ViewTree,
    selection: &NativeSelection,
    context: SelectionContext,
) -> Option<StaticRange> {
    let stale = |point: &ViewPoint| {
        point.node.view == tree.view_id() && tree.resolve(&point.node).is_none()
    };
    if stale(&selection.anchor) || stale(&selection.focus) {
        tracing::trace!(view = %tree.view_id(), "selection refers to a stale snapshot");
        return None;
    }

    let doc_len = context.doc_len;
    let anchor = endpoint_index(tree, &selection.anchor);
    let focus = endpoint_index(tree, &selection.focus);

    let range = match (anchor, focus) {
        (Some(anchor), Some(focus)) => StaticRange::between(anchor, focus),
        // Anchor here, focus in an earlier view
        (Some(anchor), None) if context.backward => StaticRange::new(0, anchor),
        // Anchor here, focus in a later view
        (Some(anchor), None) => StaticRange::new(anchor, doc_len.saturating_sub(anchor)),
        // Focus here, anchor in a later view
        (None, Some(focus)) if context.backward => {
            StaticRange::new(focus, doc_len.saturating_sub(focus))
        }
        // Focus here, anchor in an earlier view
        (None, Some(focus)) => StaticRange::new(0, focus),
        (None, None) if context.contains_root => StaticRange::new(0, doc_len),
        (None, None) => return None,
    };

    Some(range.clamp_to(doc_len))
}
