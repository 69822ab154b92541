// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walking the cells that make up a document range.

use core::ops::Range;

use super::LogicLine;
use crate::cell::{CellId, CellStore};
use crate::{Cell, DocPoint};

/// Calls `f` for every cell overlapping `begin..end` with the covered code unit range of
/// that cell and whether a line break inside the range follows it.
///
/// Cells whose covered range is empty are only reported when a line break follows them.
/// Stops early when `f` returns `false`. Both points must be clamped.
pub(crate) fn walk(
    cells: &CellStore,
    lines: &[LogicLine],
    begin: DocPoint,
    end: DocPoint,
    mut f: impl FnMut(&Cell, Range<usize>, bool) -> bool,
) {
    let mut id = lines[begin.line].first;
    let mut line = begin.line;
    // Offset of the current cell inside its line.
    let mut start = 0;
    while id != CellId::TAIL {
        let cell = &cells[id];
        let len = cell.len();
        let lo = if line == begin.line {
            begin.pos.saturating_sub(start).min(len)
        } else {
            0
        };
        let hi = if line == end.line {
            end.pos.saturating_sub(start).min(len)
        } else {
            len
        };
        let brk = cell.is_eol() && line < end.line;
        if (hi > lo || brk) && !f(cell, lo..hi, brk) {
            return;
        }
        if line == end.line && (cell.is_eol() || start + len >= end.pos) {
            return;
        }
        if cell.is_eol() {
            line += 1;
            start = 0;
        } else {
            start += len;
        }
        id = cells.next(id);
    }
}
