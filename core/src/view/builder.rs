//! View Builder: full rebuild of a view tree from chunked lines
//!
//! There is no diffing. Every model notification re-chunks the delta,
//! re-renders every line and replaces the root's children wholesale. Edits are
//! local and documents small, so correctness wins over render cost here.
//!
//! The builder also lays the tree out on a monospace grid: each leaf advances
//! by its display width in cells, and lines stack downwards from the root's
//! origin. The geometry only feeds the proximity fallback of the view→model
//! mapping.

use super::tree::{NodeKind, Rect, TextLeaf, ViewTree};
use crate::chunk::Line;
use crate::config::LayoutMetrics;
use crate::error::Result;
use crate::model::utf16_len;
use crate::render::RendererRegistry;
use unicode_width::UnicodeWidthStr;

/// Replace the children of `tree` with a rendering of `lines`
///
/// Fails on the first run no renderer understands; the tree is then left
/// cleared, and the error is the caller's to surface.
pub fn build(
    tree: &mut ViewTree,
    lines: &[Line],
    renderers: &RendererRegistry,
    metrics: &LayoutMetrics,
) -> Result<()> {
    tree.clear();
    let origin = tree.origin();
    let root = tree.root();
    let mut bounds = Rect::new(origin.x, origin.y, 0.0, 0.0);

    for (row, line) in lines.iter().enumerate() {
        let y = origin.y + row as f32 * metrics.line_height;
        let line_node = tree.append(
            root,
            NodeKind::Line,
            Rect::new(origin.x, y, 0.0, metrics.line_height),
        );

        let mut x = origin.x;
        for run in line.runs() {
            let inline = renderers.render(run)?;
            let (len, width) = if line.is_blank() {
                (0, 0.0)
            } else {
                (
                    utf16_len(&inline.text),
                    UnicodeWidthStr::width(inline.text.as_str()) as f32 * metrics.cell_width,
                )
            };
            let rect = Rect::new(x, y, width, metrics.line_height);

            let parent = match inline.element {
                Some(tag) => tree.append(
                    line_node,
                    NodeKind::Element {
                        tag,
                        props: inline.props,
                    },
                    rect,
                ),
                None => line_node,
            };
            tree.append(
                parent,
                NodeKind::Text(TextLeaf {
                    text: inline.text,
                    len,
                    sentinel: line.is_blank(),
                    style: inline.style,
                }),
                rect,
            );
            x += width;
        }

        let line_rect = Rect::new(origin.x, y, x - origin.x, metrics.line_height);
        tree.set_rect(line_node, line_rect);
        bounds = bounds.union(&line_rect);
    }

    tree.set_rect(root, bounds);
    tracing::debug!(
        view = %tree.view_id(),
        epoch = tree.epoch(),
        lines = lines.len(),
        nodes = tree.len(),
        "view rebuilt"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk_lines;
    use crate::error::EditorError;
    use crate::model::{AttributedRun, TextAttributes, TextStyle};
    use crate::view::{Point, ViewTree};

    fn render(runs: &[AttributedRun]) -> ViewTree {
        let mut tree = ViewTree::new(Point::new(0.0, 100.0));
        build(
            &mut tree,
            &chunk_lines(runs),
            &RendererRegistry::with_defaults(),
            &LayoutMetrics::default(),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_one_line_per_chunk() {
        let tree = render(&[
            AttributedRun::plain("aaaa"),
            AttributedRun::line_break(),
            AttributedRun::plain("bbbb"),
        ]);
        assert_eq!(tree.lines().len(), 2);
        assert_eq!(tree.text_content(), "aaaa\nbbbb");
    }

    #[test]
    fn test_blank_line_gets_sentinel_leaf() {
        let tree = render(&[]);
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        let leaf = tree.leaf(leaves[0]).unwrap();
        assert!(leaf.sentinel);
        assert_eq!(leaf.len, 0);
        assert_eq!(tree.text_content(), "");
    }

    #[test]
    fn test_one_leaf_per_run() {
        let tree = render(&[
            AttributedRun::new("ab", TextAttributes::styled(TextStyle::bold())),
            AttributedRun::new("cd", TextAttributes::InlineCode),
            AttributedRun::new("ef", TextAttributes::link("https://a.b")),
        ]);
        assert_eq!(tree.leaves().len(), 3);
        // Line + bare text + (code + text) + (a + text)
        assert_eq!(tree.len(), 1 + 1 + 1 + 2 + 2);
    }

    #[test]
    fn test_layout() {
        let tree = render(&[
            AttributedRun::plain("ab"),
            AttributedRun::plain("你"),
            AttributedRun::line_break(),
        ]);
        let metrics = LayoutMetrics::default();
        let lines = tree.lines().to_vec();
        let first = tree.node(lines[0]).unwrap().rect;
        let second = tree.node(lines[1]).unwrap().rect;

        assert_eq!(first.y, 100.0);
        assert_eq!(first.width, 4.0 * metrics.cell_width);
        assert_eq!(second.y, 100.0 + metrics.line_height);
        assert_eq!(second.width, 0.0);
    }

    #[test]
    fn test_unknown_tag_aborts_build() {
        let mut tree = ViewTree::new(Point::default());
        let result = build(
            &mut tree,
            &chunk_lines(&[AttributedRun::new("x", TextAttributes::custom("poll"))]),
            &RendererRegistry::with_defaults(),
            &LayoutMetrics::default(),
        );
        assert!(matches!(result, Err(EditorError::UnknownAttributeTag(_))));
    }
}
