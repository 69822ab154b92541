// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal and inline objects.

use std::iter;

use crate::test_name;
use crate::util::{fail_large_allocations, pt, TestEnv};
use riched::{Cell, CellKind, Changed, ErrorKind, InlineInfo, RichData};

fn image(width: f32, height: f32, len: usize) -> Cell {
    Cell::inline_object(
        InlineInfo {
            width,
            height,
            locator: "img.png",
        },
        len,
        CellKind::Image,
        RichData::default(),
    )
}

#[test]
fn edit_remove_across_lines() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "ab\ncd");
    env.doc.remove_text(pt(0, 1), pt(1, 1)).expect("valid range");
    assert_eq!(env.text(), "ad");
    assert_eq!(env.doc.logic_line_count(), 1, "lines were joined");
    assert_eq!(env.doc.line_length(0), Some(2));
}

#[test]
fn edit_remove_everything() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "ab\ncd\nef");
    let end = env.doc.end_point();
    assert_eq!(end, pt(2, 2));
    env.doc.remove_text(pt(0, 0), end).expect("valid range");
    assert_eq!(env.text(), "");
    assert_eq!(env.cell_texts(), [""], "one empty cell is left");
    assert_eq!(env.doc.logic_line_count(), 1);
}

#[test]
fn edit_remove_empty_range() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    let err = env
        .doc
        .remove_text(pt(0, 1), pt(0, 1))
        .expect_err("nothing to remove");
    assert_eq!(err.kind(), ErrorKind::EmptyRange);
    let err = env
        .doc
        .remove_text(pt(0, 2), pt(0, 1))
        .expect_err("end before begin");
    assert_eq!(err.kind(), ErrorKind::EmptyRange);
    assert_eq!(err.begin(), Some(pt(0, 2)));
    assert_eq!(err.end(), Some(pt(0, 1)));
    assert_eq!(env.text(), "abc");
}

#[test]
fn edit_remove_clamps_end() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc\ndef");
    env.doc.remove_text(pt(0, 1), pt(0, 50)).expect("end clamps to the line end");
    assert_eq!(env.text(), "a\ndef");
}

#[test]
fn edit_remove_clamps_selection() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "ab\ncd");
    env.doc.set_anchor_caret(pt(1, 2), pt(1, 2));
    env.events();
    env.doc.remove_text(pt(0, 1), pt(1, 2)).expect("valid range");
    assert_eq!(env.doc.caret(), pt(0, 1), "caret follows the removed line");
    assert_eq!(env.doc.anchor(), pt(0, 1));
    let events = env.events();
    assert!(events.contains(&Changed::Caret), "caret move is reported");
    assert!(events.contains(&Changed::Text), "text change is reported");
}

#[test]
fn edit_insert_inline_object() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abcd");
    let end = env
        .doc
        .insert_inline(pt(0, 2), image(30.0, 20.0, 1))
        .expect("valid position");
    assert_eq!(end, pt(0, 3));
    assert_eq!(env.text(), "ab\u{FFFC}cd");
    assert_eq!(
        env.cell_kinds(),
        [CellKind::Normal, CellKind::Image, CellKind::Normal]
    );
    let object = env.doc.cells().nth(1).expect("three cells");
    assert_eq!(object.payload().map(|p| p.locator.as_str()), Some("img.png"));
}

#[test]
fn edit_inside_object_rejected() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_inline(pt(0, 0), image(30.0, 20.0, 3))
        .expect("valid position");
    assert_eq!(env.doc.line_length(0), Some(3));
    assert_eq!(env.cell_kinds(), [CellKind::Image], "the empty cell was dropped");

    let err = env
        .doc
        .insert_str(pt(0, 1), "x", false)
        .expect_err("inside the object");
    assert_eq!(err.kind(), ErrorKind::InsideInlineObject);
    let err = env
        .doc
        .remove_text(pt(0, 1), pt(0, 3))
        .expect_err("range starts inside the object");
    assert_eq!(err.kind(), ErrorKind::InsideInlineObject);

    env.doc.remove_text(pt(0, 0), pt(0, 3)).expect("whole object");
    assert_eq!(env.text(), "");
}

#[test]
fn edit_insert_behind_object() {
    let mut env = TestEnv::new(test_name!());
    env.doc
        .insert_inline(pt(0, 0), image(30.0, 20.0, 1))
        .expect("valid position");
    assert_eq!(env.doc.insert_str(pt(0, 1), "x", true), Ok(pt(0, 2)));
    assert_eq!(env.cell_kinds(), [CellKind::Image, CellKind::Normal]);
    assert_eq!(env.cell_texts(), ["\u{FFFC}", "x"]);
}

#[test]
fn edit_insert_inline_out_of_range() {
    let mut env = TestEnv::new(test_name!());
    let err = env
        .doc
        .insert_inline(pt(2, 0), image(30.0, 20.0, 1))
        .expect_err("line 2 doesn't exist");
    assert_eq!(err.kind(), ErrorKind::LineOutOfRange);
    assert_eq!(env.cell_texts(), [""]);
}

#[test]
fn edit_joins_surrogate_halves_across_cells() {
    let mut env = TestEnv::new(test_name!());
    let mut units = vec![u16::from(b'a'); 31];
    units.push(0xD83D);
    env.doc.insert_text(pt(0, 0), &units, false).expect("fills one cell");
    assert_eq!(env.doc.insert_text(pt(0, 32), &[0xDE00], false), Ok(pt(0, 33)));
    assert_eq!(env.text(), format!("{}😀", "a".repeat(31)));
    assert_eq!(env.cell_texts(), ["a".repeat(31), "😀".into()], "the pair shares a cell");
}

#[test]
fn edit_joins_surrogate_halves_between_full_cells() {
    let mut env = TestEnv::new(test_name!());
    let mut units = vec![u16::from(b'a'); 31];
    units.push(0xD83D);
    env.doc.insert_text(pt(0, 0), &units, false).expect("fills one cell");
    let mut tail = vec![0xDE00];
    tail.extend(iter::repeat_n(u16::from(b'b'), 31));
    env.doc.insert_text(pt(0, 32), &tail, false).expect("fills another cell");
    assert_eq!(
        env.cell_texts(),
        ["a".repeat(31), "😀".into(), "b".repeat(31)],
        "the pair moves into a cell of its own"
    );
    assert_eq!(env.doc.line_length(0), Some(64));
}

#[test]
fn edit_removal_joins_surrogate_halves() {
    let mut env = TestEnv::new(test_name!());
    let mut units = vec![u16::from(b'a'); 31];
    units.push(0xD83D);
    env.doc.insert_text(pt(0, 0), &units, false).expect("fills one cell");
    env.doc
        .insert_text(pt(0, 32), &[u16::from(b'x'), 0xDE00], false)
        .expect("valid position");
    assert_eq!(env.cell_texts()[1], "x\u{FFFD}");
    env.doc.remove_text(pt(0, 32), pt(0, 33)).expect("valid range");
    assert_eq!(env.text(), format!("{}😀", "a".repeat(31)));
    assert_eq!(env.cell_texts(), ["a".repeat(31), "😀".into()]);
}

#[test]
fn edit_out_of_memory_fails_cleanly() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "ab");
    let units = vec![u16::from(b'x'); 100_000];
    fail_large_allocations(1);
    let result = env.doc.insert_text(pt(0, 1), &units, false);
    fail_large_allocations(0);
    let err = result.expect_err("the cell arena can't grow");
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    assert_eq!(env.doc.platform().oom_reports, [0], "the policy was asked once");
    assert_eq!(env.text(), "ab", "nothing changed");
    assert_eq!(env.cell_texts(), ["ab"]);
}

#[test]
fn edit_out_of_memory_retries() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "ab");
    env.doc.platform_mut().oom_retries = 1;
    let units = vec![u16::from(b'x'); 100_000];
    fail_large_allocations(1);
    let result = env.doc.insert_text(pt(0, 1), &units, false);
    fail_large_allocations(0);
    assert_eq!(result, Ok(pt(0, 100_001)), "the second attempt succeeds");
    assert_eq!(env.doc.platform().oom_reports, [0]);
    assert_eq!(env.doc.line_length(0), Some(100_002));
}
