// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental layout, geometry and hit testing.

use crate::test_name;
use crate::util::{pt, TestEnv};
use riched::{Changed, DocInitArg, ErrorKind, Point, VAlign};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn layout_is_idempotent() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef\nghi");
    env.layout();
    let first = env.doc.visual_lines().to_vec();
    let recreated = env.doc.platform().recreated;
    env.layout();
    assert_eq!(env.doc.visual_lines(), first.as_slice());
    assert_eq!(
        env.doc.platform().recreated,
        recreated,
        "clean cells are not measured again"
    );
}

#[test]
fn layout_edit_truncates_from_dirty_line() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "a\nb\nc");
    env.layout();
    assert_eq!(env.doc.visual_lines().len(), 4, "three lines and the pending one");
    env.insert(pt(1, 1), "x");
    let lines = env.doc.visual_lines();
    assert_eq!(lines.len(), 2, "line 0 survives");
    assert_eq!((lines[1].line, lines[1].char_offset), (1, 0));
    env.layout();
    assert_eq!(env.visual_texts(), ["a", "bx", "c"]);
}

#[test]
fn layout_stops_below_viewport() {
    let mut env = TestEnv::new(test_name!());
    env.resize(1000.0, 100.0);
    let text = vec!["x"; 100].join("\n");
    env.insert(pt(0, 0), &text);
    env.layout();
    let lines = env.doc.visual_lines();
    assert!(lines.len() < 10, "only the visible lines are laid out");
    assert!(lines[lines.len() - 1].offset >= 100.0, "layout reached the bottom");
    assert_eq!(env.doc.estimated_size().height, 0.0, "the end wasn't reached");

    env.doc.set_pos(Point { x: 0.0, y: 400.0 });
    env.layout();
    let pending = env.doc.visual_lines()[env.doc.visual_lines().len() - 1];
    assert!(pending.offset >= 500.0, "layout follows the viewport");
}

#[test]
fn layout_estimated_size() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\nde");
    env.events();
    env.layout();
    let size = env.doc.estimated_size();
    assert_eq!(size.width, 24.0);
    assert!(approx(size.height, 32.0), "two lines of 16");
    let events = env.events();
    assert!(events.contains(&Changed::EstimatedWidth));
    assert!(events.contains(&Changed::EstimatedHeight));

    env.insert(pt(1, 2), "fgh");
    env.events();
    env.layout();
    assert_eq!(env.doc.estimated_size().width, 40.0);
    let events = env.events();
    assert!(events.contains(&Changed::EstimatedWidth), "wider content");
    assert!(!events.contains(&Changed::EstimatedHeight), "same number of lines");
}

#[test]
fn layout_fixed_line_height() {
    let mut env = TestEnv::with_arg(
        test_name!(),
        DocInitArg {
            fixed_line_height: Some(30.0),
            ..DocInitArg::default()
        },
    );
    env.insert(pt(0, 0), "a\nb\nc");
    env.layout();
    let offsets: Vec<f32> = env.doc.visual_lines().iter().map(|line| line.offset).collect();
    assert_eq!(offsets, [0.0, 30.0, 60.0, 90.0]);
    let err = env
        .doc
        .hit_test(Point { x: 0.0, y: 40.0 })
        .expect_err("no hit testing with a fixed line height");
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn layout_hit_test() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef");
    let hit = |env: &mut TestEnv, x: f32, y: f32| {
        env.doc.hit_test(Point { x, y }).expect("hit testing is supported")
    };
    assert_eq!(hit(&mut env, 13.0, 20.0), pt(1, 2), "trailing half of 'e'");
    assert_eq!(hit(&mut env, 11.0, 20.0), pt(1, 1), "leading half of 'e'");
    assert_eq!(hit(&mut env, 100.0, 20.0), pt(1, 3), "past the line end");
    assert_eq!(hit(&mut env, 0.0, 5.0), pt(0, 0));
    assert_eq!(hit(&mut env, 4.0, 500.0), pt(1, 1), "below the content");
}

#[test]
fn layout_hit_test_surrogate_pair() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "a😀b");
    let point = env
        .doc
        .hit_test(Point { x: 14.0, y: 5.0 })
        .expect("hit testing is supported");
    assert_eq!(point, pt(0, 1), "leading half of the pair");
    let point = env
        .doc
        .hit_test(Point { x: 18.0, y: 5.0 })
        .expect("hit testing is supported");
    assert_eq!(point, pt(0, 3), "trailing half of the pair");
}

#[test]
fn layout_caret_rect() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef");
    env.doc.set_anchor_caret(pt(1, 2), pt(1, 2));
    env.layout();
    let rect = env.doc.caret_rect();
    assert_eq!(rect.x, 16.0);
    assert!(approx(rect.y, 16.0), "second line");
    assert!(approx(rect.height, 16.0), "as tall as the line");
}

#[test]
fn layout_render_draws_complete_lines() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef");
    env.layout();
    env.doc.render();
    let drawn = &env.doc.platform().drawn;
    let texts: Vec<&str> = drawn.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, ["abc", "def"]);
    assert!(approx(drawn[0].baseline, 12.8), "first baseline");
    assert!(approx(drawn[1].baseline, 28.8), "second baseline");
}

#[test]
fn layout_valign_middle() {
    let mut env = TestEnv::with_arg(
        test_name!(),
        DocInitArg {
            valign: VAlign::Middle,
            ..DocInitArg::default()
        },
    );
    env.insert(pt(0, 0), "abc");
    env.layout();
    let line = env.doc.visual_lines()[0];
    assert_eq!((line.ascent, line.descent), (8.0, 8.0));
}
