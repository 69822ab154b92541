// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ruby annotations.

use crate::test_name;
use crate::util::{pt, TestEnv};
use riched::{CellKind, ErrorKind, Point, RichData};

#[test]
fn ruby_insert() {
    let mut env = TestEnv::new(test_name!());
    let end = env
        .doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    assert_eq!(end, pt(0, 4));
    assert_eq!(env.text(), "漢kan");
    assert_eq!(env.cell_kinds(), [CellKind::UnderRuby, CellKind::Ruby]);
    let sizes: Vec<f32> = env.doc.cells().map(|cell| cell.riched().size).collect();
    assert_eq!(sizes, [16.0, 8.0], "annotation is half the base size");
}

#[test]
fn ruby_custom_style() {
    let mut env = TestEnv::new(test_name!());
    let style = RichData {
        size: 30.0,
        ..RichData::default()
    };
    env.insert(pt(0, 0), "ab");
    env.doc
        .insert_ruby(pt(0, 1), '字', "ji", Some(style))
        .expect("valid position");
    assert_eq!(env.text(), "a字jib");
    let sizes: Vec<f32> = env.doc.cells().map(|cell| cell.riched().size).collect();
    assert_eq!(sizes, [16.0, 30.0, 15.0, 16.0]);
}

#[test]
fn ruby_rejects_line_feed_and_empty_text() {
    let mut env = TestEnv::new(test_name!());
    let err = env
        .doc
        .insert_ruby(pt(0, 0), '漢', "a\nb", None)
        .expect_err("annotations are single-line");
    assert_eq!(err.kind(), ErrorKind::LineFeedInRuby);
    let err = env
        .doc
        .insert_ruby(pt(0, 0), '漢', "", None)
        .expect_err("annotations can't be empty");
    assert_eq!(err.kind(), ErrorKind::EmptyText);
    assert_eq!(env.text(), "");
    assert!(!env.doc.can_undo(), "nothing was recorded");
}

#[test]
fn ruby_typing_continues_annotation() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    env.insert(pt(0, 4), "a");
    assert_eq!(env.cell_texts(), ["漢", "kana"]);
    assert_eq!(env.cell_kinds(), [CellKind::UnderRuby, CellKind::Ruby]);

    assert_eq!(env.doc.insert_str(pt(0, 5), "x", true), Ok(pt(0, 6)));
    assert_eq!(
        env.cell_kinds(),
        [CellKind::UnderRuby, CellKind::Ruby, CellKind::Normal],
        "inserting behind leaves the annotation"
    );
    assert_eq!(env.doc.cells().nth(2).map(|cell| cell.riched().size), Some(16.0));
}

#[test]
fn ruby_line_feed_ends_annotation() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    env.insert(pt(0, 4), "\nx");
    assert_eq!(env.text(), "漢kan\nx");
    assert_eq!(
        env.cell_kinds(),
        [CellKind::UnderRuby, CellKind::Ruby, CellKind::Normal]
    );
}

#[test]
fn ruby_layout_centers_group() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    env.layout();
    let line = env.doc.visual_lines()[0];
    assert_eq!(line.width, 12.0, "the wider annotation sets the width");
    assert!((line.ascent - 20.8).abs() < 1e-3, "annotation sits on top");

    let under = env.doc.cells().next().expect("under cell").metrics;
    assert_eq!(under.width, 12.0);
    assert_eq!(under.offset.x, 2.0, "base is centered");
    let ruby = env.doc.cells().nth(1).expect("ruby cell").metrics;
    assert_eq!(ruby.width, 0.0, "annotation takes no room of its own");
}

#[test]
fn ruby_undo_is_one_step() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    assert_eq!(env.doc.undo(), Ok(true));
    assert_eq!(env.text(), "");
    assert_eq!(env.cell_kinds(), [CellKind::Normal], "the emptied line is plain again");
    assert!(!env.doc.can_undo(), "both records were one step");

    assert_eq!(env.doc.redo(), Ok(true));
    assert_eq!(env.text(), "漢kan");
    assert_eq!(env.cell_kinds(), [CellKind::UnderRuby, CellKind::Ruby]);
}

#[test]
fn ruby_annotation_without_base_is_measured_as_text() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_ruby(pt(0, 0), '漢', "kan", None)
        .expect("valid position");
    env.layout();
    env.doc.remove_text(pt(0, 0), pt(0, 1)).expect("valid range");
    env.layout();
    assert_eq!(env.text(), "kan");

    let ruby = env.doc.cells().next().expect("annotation cell").metrics;
    assert_eq!(ruby.width, 12.0, "the annotation takes its own room");
    assert_eq!(ruby.offset, Point::default(), "no longer raised over a base");
    assert_eq!(env.doc.visual_lines()[0].width, 12.0);
    assert_eq!(env.doc.hit_test(Point { x: 5.0, y: 2.0 }), Ok(pt(0, 1)));

    assert_eq!(env.doc.undo(), Ok(true));
    env.layout();
    assert_eq!(env.cell_kinds(), [CellKind::UnderRuby, CellKind::Ruby]);
    let ruby = env.doc.cells().nth(1).expect("annotation cell").metrics;
    assert_eq!(ruby.width, 0.0, "the restored group is laid out again");
    assert_eq!(env.doc.visual_lines()[0].width, 12.0);
}
