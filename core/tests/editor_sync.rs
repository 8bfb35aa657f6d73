//! End-to-end scenarios: editors, a shared model and a headless surface

use std::cell::RefCell;
use std::rc::Rc;
use synckit_editor::config::{BackspaceUnit, RemoteCaretPolicy};
use synckit_editor::model::FormatMode;
use synckit_editor::render::RendererRegistry;
use synckit_editor::view::Point;
use synckit_editor::{
    AttributedRun, EditIntent, Editor, EditorConfig, EditorEvent, ModelHandle, RangeOrigin,
    SelectionHost, SharedText, StaticRange, Surface, TextAttributes, TextModel, TextStyle,
};

fn document(runs: &[AttributedRun]) -> (Rc<SharedText>, ModelHandle) {
    let text = SharedText::from_delta(runs).unwrap();
    let model: ModelHandle = text.clone();
    (text, model)
}

fn editor_with(surface: &mut Surface, model: &ModelHandle, config: EditorConfig) -> Editor {
    let row = surface.views().len() as f32;
    Editor::bind(
        surface.create_view(Point::new(0.0, row * 100.0)),
        model.clone(),
        Rc::new(RendererRegistry::with_defaults()),
        config,
    )
    .unwrap()
}

fn editor(surface: &mut Surface, model: &ModelHandle) -> Editor {
    editor_with(surface, model, EditorConfig::default())
}

fn type_text(editor: &mut Editor, surface: &mut Surface, text: &str) {
    for ch in text.chars() {
        editor
            .handle_intent(EditIntent::InsertText(ch.to_string()), surface)
            .unwrap();
    }
}

fn pump(surface: &mut Surface, editors: &mut [&mut Editor]) {
    loop {
        let changes = surface.take_changes();
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

#[test]
fn test_insert_updates_length_and_caret() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("ab")]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::caret(1)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::InsertText("🧐x".into()), &mut surface)
        .unwrap();

    assert_eq!(text.text(), "a🧐xb");
    assert_eq!(text.len(), 5);
    assert_eq!(ed.range(), Some(StaticRange::caret(4)));
}

#[test]
fn test_backspace_boundaries() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("a🧐")]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
    let rebuilds = ed.rebuild_count();
    ed.handle_intent(EditIntent::DeleteBackward, &mut surface).unwrap();
    assert_eq!(text.text(), "a🧐");
    assert_eq!(ed.rebuild_count(), rebuilds);

    ed.set_range(Some(StaticRange::caret(3)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::DeleteBackward, &mut surface).unwrap();
    assert_eq!(text.text(), "a");
    assert_eq!(ed.range(), Some(StaticRange::caret(1)));
}

#[test]
fn test_grapheme_backspace_config() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("ne\u{301}")]);
    let config = EditorConfig {
        backspace: BackspaceUnit::Grapheme,
        ..EditorConfig::default()
    };
    let mut ed = editor_with(&mut surface, &model, config);

    ed.set_range(Some(StaticRange::caret(3)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::DeleteBackward, &mut surface).unwrap();
    assert_eq!(text.text(), "n");
}

#[test]
fn test_split_and_join_lines() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("aaaabbbb")]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::caret(4)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::InsertParagraph, &mut surface).unwrap();

    assert_eq!(text.text(), "aaaa\nbbbb");
    assert_eq!(ed.view().lines().len(), 2);
    assert_eq!(ed.range(), Some(StaticRange::caret(5)));

    ed.set_range(Some(StaticRange::caret(9)), &mut surface).unwrap();
    for _ in 0..5 {
        ed.handle_intent(EditIntent::DeleteBackward, &mut surface).unwrap();
    }

    assert_eq!(text.text(), "aaaa");
    assert_eq!(ed.view().lines().len(), 1);
    assert_eq!(ed.range(), Some(StaticRange::caret(4)));
}

#[test]
fn test_blank_lines_keep_one_index_each() {
    let mut surface = Surface::new();
    let (text, model) = document(&[]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::InsertParagraph, &mut surface).unwrap();
    ed.handle_intent(EditIntent::InsertParagraph, &mut surface).unwrap();

    assert_eq!(text.len(), 2);
    assert_eq!(ed.view().lines().len(), 3);
    assert_eq!(ed.view().text_content(), "\n\n");

    let caret = ed.to_view_range(StaticRange::caret(1)).unwrap();
    let leaf = ed.view().leaf(caret.start.node.index).unwrap();
    assert!(leaf.sentinel);
}

#[test]
fn test_format_merge_and_reset() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::new(1, 4)), &mut surface).unwrap();
    ed.format_text(
        TextAttributes::styled(TextStyle::bold()),
        FormatMode::Merge,
        &mut surface,
    )
    .unwrap();

    ed.set_range(Some(StaticRange::new(2, 2)), &mut surface).unwrap();
    ed.format_text(
        TextAttributes::styled(TextStyle::italic()),
        FormatMode::Merge,
        &mut surface,
    )
    .unwrap();

    let both = TextStyle {
        bold: Some(true),
        italic: Some(true),
        ..TextStyle::default()
    };
    assert_eq!(
        text.to_delta(),
        vec![
            AttributedRun::plain("a"),
            AttributedRun::new("b", TextAttributes::styled(TextStyle::bold())),
            AttributedRun::new("cd", TextAttributes::styled(both)),
            AttributedRun::new("e", TextAttributes::styled(TextStyle::bold())),
            AttributedRun::plain("f"),
        ]
    );

    ed.set_range(Some(StaticRange::new(0, 6)), &mut surface).unwrap();
    ed.reset_text(&mut surface).unwrap();
    assert_eq!(text.to_delta(), vec![AttributedRun::plain("abcdef")]);

    // The platform selection still points into the rebuilt view
    let selection = surface.selection().unwrap();
    assert_eq!(selection.anchor.node.epoch, ed.view().epoch());
}

#[test]
fn test_reset_keeps_line_breaks() {
    let mut surface = Surface::new();
    let (text, model) = document(&[
        AttributedRun::new("ab", TextAttributes::InlineCode),
        AttributedRun::line_break(),
        AttributedRun::new("cd", TextAttributes::link("https://example.com")),
    ]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::new(0, 5)), &mut surface).unwrap();
    ed.reset_text(&mut surface).unwrap();

    assert_eq!(
        text.to_delta(),
        vec![
            AttributedRun::plain("ab"),
            AttributedRun::line_break(),
            AttributedRun::plain("cd"),
        ]
    );
}

#[test]
fn test_cross_view_selection() {
    let mut surface = Surface::new();
    let mut editors: Vec<Editor> = ["aaaaaa", "bbbbbb", "cccccc"]
        .iter()
        .map(|line| {
            let (_, model) = document(&[AttributedRun::plain(*line)]);
            editor(&mut surface, &model)
        })
        .collect();

    let anchor = editors[0].to_view_range(StaticRange::caret(2)).unwrap().start;
    let focus = editors[2].to_view_range(StaticRange::caret(4)).unwrap().start;
    surface.select(anchor, focus);

    let mut refs: Vec<&mut Editor> = editors.iter_mut().collect();
    pump(&mut surface, &mut refs);

    let ranges: Vec<_> = editors.iter().map(Editor::range).collect();
    assert_eq!(
        ranges,
        vec![
            Some(StaticRange::new(2, 4)),
            Some(StaticRange::new(0, 6)),
            Some(StaticRange::new(0, 4)),
        ]
    );
}

#[test]
fn test_programmatic_push_does_not_loop() {
    let mut surface = Surface::new();
    let (_, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut ed = editor(&mut surface, &model);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    ed.subscribe(Box::new(move |event: &EditorEvent| {
        sink.borrow_mut().push(*event);
    }));

    ed.set_range(Some(StaticRange::new(2, 3)), &mut surface).unwrap();
    pump(&mut surface, &mut [&mut ed]);

    assert_eq!(events.borrow().len(), 1);
    assert_eq!(surface.pending_changes(), 0);

    // A user gesture landing on the same range is not re-announced
    let view = ed.to_view_range(StaticRange::new(2, 3)).unwrap();
    surface.select(view.start, view.end);
    pump(&mut surface, &mut [&mut ed]);
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_one_rebuild_per_user_action() {
    let mut surface = Surface::new();
    let (_, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut a = editor(&mut surface, &model);
    let mut b = editor(&mut surface, &model);

    a.set_range(Some(StaticRange::new(1, 3)), &mut surface).unwrap();
    let (before_a, before_b) = (a.rebuild_count(), b.rebuild_count());

    // Replace selection: delete + insert
    a.handle_intent(EditIntent::InsertText("Z".into()), &mut surface)
        .unwrap();
    b.refresh(&mut surface).unwrap();

    assert_eq!(a.rebuild_count(), before_a + 1);
    assert_eq!(b.rebuild_count(), before_b + 1);

    // Nothing queued, nothing rebuilt
    b.refresh(&mut surface).unwrap();
    assert_eq!(b.rebuild_count(), before_b + 1);
}

#[test]
fn test_remote_caret_policies() {
    let mut surface = Surface::new();
    let (_, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut writer = editor(&mut surface, &model);
    let mut keep = editor(&mut surface, &model);
    let mut shift = editor_with(
        &mut surface,
        &model,
        EditorConfig {
            remote_caret: RemoteCaretPolicy::Shift,
            ..EditorConfig::default()
        },
    );

    keep.set_range(Some(StaticRange::caret(3)), &mut surface).unwrap();
    shift.set_range(Some(StaticRange::caret(3)), &mut surface).unwrap();

    writer.insert_text(StaticRange::caret(0), "XY", &mut surface).unwrap();
    keep.refresh(&mut surface).unwrap();
    shift.refresh(&mut surface).unwrap();

    assert_eq!(keep.range(), Some(StaticRange::caret(3)));
    assert_eq!(shift.range(), Some(StaticRange::caret(5)));

    // Both clamp when the document shrinks under them
    writer.delete_text(StaticRange::new(0, 7), &mut surface).unwrap();
    keep.refresh(&mut surface).unwrap();
    shift.refresh(&mut surface).unwrap();

    assert_eq!(keep.range(), Some(StaticRange::caret(1)));
    assert_eq!(shift.range(), Some(StaticRange::caret(0)));
}

#[test]
fn test_remote_refresh_leaves_foreign_selection() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut alice = editor_with(
        &mut surface,
        &model,
        EditorConfig {
            remote_caret: RemoteCaretPolicy::Shift,
            ..EditorConfig::default()
        },
    );
    let mut bob = editor(&mut surface, &model);

    alice.set_range(Some(StaticRange::caret(2)), &mut surface).unwrap();
    bob.focus();
    bob.set_range(Some(StaticRange::caret(6)), &mut surface).unwrap();
    surface.take_changes();

    // Rebuild without a range change
    type_text(&mut bob, &mut surface, "x");
    alice.refresh(&mut surface).unwrap();
    assert_eq!(alice.range(), Some(StaticRange::caret(2)));
    assert_eq!(surface.selection().unwrap().anchor.node.view, bob.id());
    assert_eq!(alice.view().text_content(), "abcdefx");

    // Rebuild that shifts alice's caret
    bob.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
    type_text(&mut bob, &mut surface, "y");
    alice.refresh(&mut surface).unwrap();
    assert_eq!(text.text(), "yabcdefx");
    assert_eq!(alice.range(), Some(StaticRange::caret(3)));
    let selection = surface.selection().unwrap();
    assert_eq!(selection.anchor.node.view, bob.id());
    assert_eq!(selection.focus.node.view, bob.id());
    assert_eq!(bob.range(), Some(StaticRange::caret(1)));
}

#[test]
fn test_pasted_newline_splits_lines() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("ab")]);
    let mut ed = editor(&mut surface, &model);

    ed.set_range(Some(StaticRange::caret(1)), &mut surface).unwrap();
    ed.handle_intent(EditIntent::InsertText("x\ny".into()), &mut surface)
        .unwrap();

    assert_eq!(text.text(), "ax\nyb");
    assert_eq!(ed.view().lines().len(), 2);
    assert_eq!(ed.range(), Some(StaticRange::caret(4)));
}

#[test]
fn test_overflowing_range_is_an_error() {
    let mut surface = Surface::new();
    let (_, model) = document(&[AttributedRun::plain("abc")]);
    let mut ed = editor(&mut surface, &model);

    assert!(ed
        .set_range(Some(StaticRange::new(usize::MAX, 1)), &mut surface)
        .is_err());
    assert!(ed
        .delete_text(StaticRange::new(usize::MAX, 2), &mut surface)
        .is_err());
    assert_eq!(model.len(), 3);
}

#[test]
fn test_remote_adjustment_is_announced() {
    let mut surface = Surface::new();
    let (_, model) = document(&[AttributedRun::plain("abcdef")]);
    let mut writer = editor(&mut surface, &model);
    let mut reader = editor_with(
        &mut surface,
        &model,
        EditorConfig {
            remote_caret: RemoteCaretPolicy::Shift,
            ..EditorConfig::default()
        },
    );
    reader.set_range(Some(StaticRange::caret(6)), &mut surface).unwrap();

    let origins = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&origins);
    reader.subscribe(Box::new(move |event: &EditorEvent| {
        if let EditorEvent::RangeChanged(update) = event {
            sink.borrow_mut().push(update.origin);
        }
    }));

    writer.insert_text(StaticRange::caret(0), "!", &mut surface).unwrap();
    reader.refresh(&mut surface).unwrap();

    assert_eq!(*origins.borrow(), vec![RangeOrigin::Remote]);
    let selection = surface.selection().unwrap();
    assert_eq!(
        reader.to_static_range(&selection, &surface),
        Some(StaticRange::caret(7))
    );
}

#[test]
fn test_composition_is_buffered() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("ab")]);
    let mut ed = editor(&mut surface, &model);
    ed.set_range(Some(StaticRange::caret(2)), &mut surface).unwrap();
    surface.take_changes();

    ed.handle_intent(EditIntent::CompositionStart, &mut surface).unwrap();
    assert!(ed.is_composing());

    ed.handle_intent(EditIntent::InsertText("n".into()), &mut surface)
        .unwrap();
    ed.handle_intent(EditIntent::DeleteBackward, &mut surface).unwrap();
    assert_eq!(text.text(), "ab");

    // Selection churn from the IME is ignored
    let start = ed.to_view_range(StaticRange::caret(0)).unwrap().start;
    surface.place_caret(start);
    pump(&mut surface, &mut [&mut ed]);
    assert_eq!(ed.range(), Some(StaticRange::caret(2)));

    ed.handle_intent(EditIntent::CompositionEnd("你好".into()), &mut surface)
        .unwrap();
    assert!(!ed.is_composing());
    assert_eq!(text.text(), "ab你好");
    assert_eq!(ed.range(), Some(StaticRange::caret(4)));
}

#[test]
fn test_teardown_unsubscribes() {
    let mut surface = Surface::new();
    let (text, model) = document(&[AttributedRun::plain("x")]);
    let a = editor(&mut surface, &model);
    let b = editor(&mut surface, &model);
    assert_eq!(text.observer_count(), 2);

    let tree = a.unbind();
    surface.remove_view(tree.view_id());
    assert_eq!(text.observer_count(), 1);

    drop(b);
    assert_eq!(text.observer_count(), 0);

    // Edits after teardown reach nobody
    model
        .insert("remote", 0, "y", TextAttributes::base())
        .unwrap();
    assert_eq!(text.text(), "yx");
}

#[test]
fn test_two_editors_mirror_text() {
    let mut surface = Surface::new();
    let (text, model) = document(&[]);
    let mut alice = editor(&mut surface, &model);
    let mut bob = editor(&mut surface, &model);

    alice.set_range(Some(StaticRange::caret(0)), &mut surface).unwrap();
    type_text(&mut alice, &mut surface, "hi bob");
    bob.refresh(&mut surface).unwrap();
    assert_eq!(bob.view().text_content(), "hi bob");

    bob.set_range(Some(StaticRange::caret(6)), &mut surface).unwrap();
    bob.handle_intent(EditIntent::InsertParagraph, &mut surface)
        .unwrap();
    type_text(&mut bob, &mut surface, "hi alice");
    alice.refresh(&mut surface).unwrap();

    assert_eq!(text.text(), "hi bob\nhi alice");
    assert_eq!(alice.view().text_content(), bob.view().text_content());
    // Default policy keeps alice's caret where it was
    assert_eq!(alice.range(), Some(StaticRange::caret(6)));
}
