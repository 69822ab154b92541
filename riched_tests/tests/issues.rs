// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regression tests for specific issues.

use crate::test_name;
use crate::util::{pt, TestEnv};
use riched::{Cell, CellKind, InlineInfo, RichData};

fn image() -> Cell {
    Cell::inline_object(
        InlineInfo {
            width: 20.0,
            height: 20.0,
            locator: "img.png",
        },
        1,
        CellKind::Image,
        RichData::default(),
    )
}

/// A line emptied of its only object must accept plain text again.
#[test]
fn issue_emptied_object_line_is_plain() {
    let mut env = TestEnv::new(test_name!());
    env.doc.insert_inline(pt(0, 0), image()).expect("valid position");
    env.doc.remove_text(pt(0, 0), pt(0, 1)).expect("valid range");
    assert_eq!(env.cell_kinds(), [CellKind::Normal]);
    env.insert(pt(0, 0), "abc");
    assert_eq!(env.cell_kinds(), [CellKind::Normal]);
    assert_eq!(env.cell_texts(), ["abc"]);
}

/// The pending visual line must follow edits at the start of its logical line,
/// otherwise the complete line before it claims the new cells.
#[test]
fn issue_pending_line_follows_edit() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "a\nbc");
    env.layout();
    env.doc.insert_inline(pt(1, 0), image()).expect("valid position");
    assert_eq!(env.visual_texts(), ["a"]);
    env.layout();
    assert_eq!(env.visual_texts(), ["a", "\u{FFFC}bc"]);
}

/// Selecting everything used to report the caret twice.
#[test]
fn issue_select_all_single_notification() {
    let mut env = TestEnv::new(test_name!());
    env.insert(pt(0, 0), "abc");
    env.events();
    assert!(env.doc.gui_select_all());
    let events = env.events();
    assert_eq!(
        events.iter().filter(|&&e| e == riched::Changed::Caret).count(),
        1,
        "one caret notification"
    );
}
