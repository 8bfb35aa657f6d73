//! Headless collaboration playground
//!
//! Two editors share one document and mirror each other's typing, then three
//! stacked single-line views share a selection spanning all of them.
//!
//! ```text
//! RUST_LOG=synckit_editor=debug cargo run --features playground --bin playground
//! ```

use synckit_editor::model::FormatMode;
use synckit_editor::surface::SelectionChange;
use synckit_editor::view::Point;
use synckit_editor::{
    AttributedRun, EditIntent, Editor, EditorEvent, ModelHandle, Result, SharedText,
    StaticRange, Surface, TextAttributes, TextModel, TextStyle,
};

/// Deliver pending selection changes to every editor on the surface
fn pump(surface: &mut Surface, editors: &mut [&mut Editor]) {
    loop {
        let changes: Vec<SelectionChange> = surface.take_changes();
        if changes.is_empty() {
            break;
        }
        for change in &changes {
            for editor in editors.iter_mut() {
                editor.handle_selection_change(change, surface);
            }
        }
    }
}

fn collaboration() -> Result<()> {
    let text = SharedText::new();
    let model: ModelHandle = text.clone();
    let mut surface = Surface::new();

    let mut alice = Editor::new(surface.create_view(Point::new(0.0, 0.0)), model.clone())?;
    let mut bob = Editor::new(surface.create_view(Point::new(0.0, 200.0)), model)?;

    alice.subscribe(Box::new(|event: &EditorEvent| {
        if let EditorEvent::RangeChanged(update) = event {
            tracing::info!(range = ?update.range, origin = ?update.origin, "alice range");
        }
    }));

    alice.focus();
    alice.set_range(Some(StaticRange::caret(0)), &mut surface)?;
    for ch in "Hello world".chars() {
        alice.handle_intent(EditIntent::InsertText(ch.to_string()), &mut surface)?;
        bob.refresh(&mut surface)?;
    }
    pump(&mut surface, &mut [&mut alice, &mut bob]);

    alice.set_range(Some(StaticRange::new(0, 5)), &mut surface)?;
    alice.format_text(
        TextAttributes::styled(TextStyle::bold()),
        FormatMode::Merge,
        &mut surface,
    )?;
    bob.refresh(&mut surface)?;

    alice.blur(&mut surface);
    bob.focus();
    bob.set_range(Some(StaticRange::caret(text.len())), &mut surface)?;
    bob.handle_intent(EditIntent::InsertParagraph, &mut surface)?;
    for ch in "from bob".chars() {
        bob.handle_intent(EditIntent::InsertText(ch.to_string()), &mut surface)?;
        alice.refresh(&mut surface)?;
    }
    pump(&mut surface, &mut [&mut alice, &mut bob]);

    tracing::info!(
        alice = %alice.view().text_content(),
        bob = %bob.view().text_content(),
        rebuilds = alice.rebuild_count(),
        "documents mirrored"
    );
    println!("alice: {:?}", alice.view().text_content());
    println!("bob:   {:?}", bob.view().text_content());
    Ok(())
}

fn stacked_selection() -> Result<()> {
    let mut surface = Surface::new();
    let mut editors = Vec::new();
    for (row, line) in ["aaaaaa", "bbbbbb", "cccccc"].iter().enumerate() {
        let model: ModelHandle = SharedText::from_delta(&[AttributedRun::plain(*line)])?;
        let tree = surface.create_view(Point::new(0.0, row as f32 * 40.0));
        editors.push(Editor::new(tree, model)?);
    }

    let anchor = editors[0]
        .to_view_range(StaticRange::caret(2))
        .map(|range| range.start);
    let focus = editors[2]
        .to_view_range(StaticRange::caret(4))
        .map(|range| range.start);
    if let (Some(anchor), Some(focus)) = (anchor, focus) {
        surface.select(anchor, focus);
    }

    let mut refs: Vec<&mut Editor> = editors.iter_mut().collect();
    pump(&mut surface, &mut refs);

    for (row, editor) in editors.iter().enumerate() {
        let range = editor.range().map(|range| range.to_string());
        println!("view {row}: {}", range.as_deref().unwrap_or("none"));
    }
    Ok(())
}

fn main() -> Result<()> {
    synckit_editor::logging::init();
    collaboration()?;
    stacked_selection()?;
    Ok(())
}
