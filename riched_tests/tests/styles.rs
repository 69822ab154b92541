// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styling ranges of text.

use crate::test_name;
use crate::util::{pt, TestEnv};
use riched::{Changed, Color, DocInitArg, Effect, ErrorKind, FlagSet, FontFlags, RichData};

const RED: Color = Color::from_rgb8(0xFF, 0, 0);

#[test]
fn styles_color_splits_cells() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abcdef");
    env.layout();
    env.events();
    env.doc
        .set_font_color(pt(0, 2), pt(0, 4), RED)
        .expect("valid range");
    assert_eq!(env.cell_texts(), ["ab", "cd", "ef"]);
    let colors: Vec<Color> = env.doc.cells().map(|cell| cell.riched().color).collect();
    assert_eq!(colors, [Color::BLACK, RED, Color::BLACK]);

    assert_eq!(env.doc.visual_lines().len(), 2, "color changes keep the layout");
    let positions: Vec<f32> = env.doc.cells().map(|cell| cell.metrics.pos).collect();
    assert_eq!(positions, [0.0, 16.0, 32.0], "split pieces are placed in line");
    assert!(env.events().contains(&Changed::View), "a redraw is requested");
}

#[test]
fn styles_font_size_relayouts() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    env.layout();
    env.doc
        .set_font_size(pt(0, 0), pt(0, 3), 40.0)
        .expect("valid range");
    assert_eq!(env.doc.visual_lines().len(), 1, "only the pending line is left");
    env.layout();
    let line = env.doc.visual_lines()[0];
    assert!((line.height() - 40.0).abs() < 1e-3, "line is as tall as the new size");
    assert_eq!(line.width, 60.0);
}

#[test]
fn styles_toggle_underline() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    let underlined = |env: &TestEnv| -> Vec<bool> {
        env.doc
            .cells()
            .map(|cell| cell.riched().effect.contains(Effect::UNDERLINE))
            .collect()
    };

    env.doc
        .set_underline(pt(0, 0), pt(0, 1), FlagSet::True)
        .expect("valid range");
    assert_eq!(underlined(&env), [true, false]);

    // Only the first end is underlined, so toggling sets it everywhere.
    env.doc
        .set_underline(pt(0, 0), pt(0, 3), FlagSet::Toggle)
        .expect("valid range");
    assert_eq!(underlined(&env), [true, true]);

    env.doc
        .set_underline(pt(0, 0), pt(0, 3), FlagSet::Toggle)
        .expect("valid range");
    assert_eq!(underlined(&env), [false, false]);
}

#[test]
fn styles_italic_and_font_name() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef");
    env.doc
        .set_italic(pt(0, 1), pt(1, 2), FlagSet::True)
        .expect("valid range");
    env.doc
        .set_font_name(pt(1, 0), pt(1, 3), 2)
        .expect("valid range");
    let styles: Vec<(String, bool, u16)> = env
        .doc
        .cells()
        .map(|cell| {
            (
                String::from_utf16_lossy(cell.text()),
                cell.riched().flags.contains(FontFlags::ITALIC),
                cell.riched().font,
            )
        })
        .collect();
    assert_eq!(
        styles,
        [
            ("a".into(), false, 0),
            ("bc".into(), true, 0),
            ("de".into(), true, 2),
            ("f".into(), false, 2),
        ]
    );
}

#[test]
fn styles_rich_data_replaces_everything() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    let style = RichData {
        size: 24.0,
        font: 1,
        color: RED,
        effect: Effect::STRIKETHROUGH,
        flags: FontFlags::BOLD,
    };
    env.doc
        .set_rich_data(pt(0, 0), pt(0, 3), style)
        .expect("valid range");
    assert_eq!(env.doc.cells().map(|cell| *cell.riched()).collect::<Vec<_>>(), [style]);
}

#[test]
fn styles_plain_text_unsupported() {
    let mut env = TestEnv::with_arg(
        test_name!(),
        DocInitArg {
            rich_text: false,
            ..DocInitArg::default()
        },
    );
    env.insert(pt(0, 0), "abc");
    let err = env
        .doc
        .set_font_size(pt(0, 0), pt(0, 3), 30.0)
        .expect_err("plain text documents have one style");
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(env.cell_texts(), ["abc"]);
}

#[test]
fn styles_empty_range() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    let err = env
        .doc
        .set_font_color(pt(0, 1), pt(0, 1), RED)
        .expect_err("nothing to style");
    assert_eq!(err.kind(), ErrorKind::EmptyRange);
}
