// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text and style mutation, and the undo records they produce.
//!
//! Every mutation follows the same shape: remember the cell before the first edited
//! logical line, mutate the cells, drop the empty cells the mutation left behind, then
//! recompute the affected logical line entries by walking forward from the remembered cell.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::iter;

use super::{walk, DocPoint, LogicLine, TextDocument};
use crate::buffer::retry_alloc;
use crate::cell::{CellId, CELL_CAPACITY};
use crate::undo::{Run, Snapshot, StyleSpan, UndoOp, UndoRecord};
use crate::util::{
    is_high_surrogate, is_low_surrogate, prefix_len, split_lines, splits_pair, suffix_len,
    to_utf16, CARRIAGE_RETURN, LINE_FEED,
};
use crate::{
    Cell, CellKind, Changed, Color, DocFlags, Error, ErrorKind, FlagSet, Platform, RichData,
    StyleProperty,
};

impl<P: Platform> TextDocument<P> {
    // --- MARK: Locating ---

    /// Finds the cell holding offset `pos` of `line`, and the offset inside that cell.
    ///
    /// On a boundary between two cells the earlier one wins.
    pub(crate) fn locate(&self, line: usize, pos: usize) -> (CellId, usize) {
        let mut id = self.lines[line].first;
        let mut pos = pos;
        loop {
            let cell = &self.cells[id];
            if pos <= cell.len() || cell.is_eol() {
                return (id, pos.min(cell.len()));
            }
            pos -= cell.len();
            id = self.cells.next(id);
        }
    }

    /// Like [`locate`](Self::locate), but on a boundary the later cell wins.
    fn locate_after(&self, line: usize, pos: usize) -> (CellId, usize) {
        let mut id = self.lines[line].first;
        let mut pos = pos;
        loop {
            let cell = &self.cells[id];
            if pos < cell.len() || cell.is_eol() {
                return (id, pos.min(cell.len()));
            }
            pos -= cell.len();
            id = self.cells.next(id);
        }
    }

    /// Rejects offsets inside a surrogate pair or strictly inside an object.
    fn check_position(&self, id: CellId, offset: usize, point: DocPoint) -> Result<(), Error> {
        let cell = &self.cells[id];
        if splits_pair(cell.text(), offset) {
            return Err(Error::at(ErrorKind::SurrogateSplit, point));
        }
        if cell.kind().is_object() && offset > 0 && offset < cell.len() {
            return Err(Error::at(ErrorKind::InsideInlineObject, point));
        }
        Ok(())
    }

    fn check_line(&self, point: DocPoint) -> Result<DocPoint, Error> {
        if point.line >= self.lines.len() {
            return Err(Error::at(ErrorKind::LineOutOfRange, point));
        }
        Ok(self.clamp_point(point))
    }

    /// Clamps both ends of a range and checks that it is non-empty and well placed.
    pub(crate) fn check_range(
        &self,
        begin: DocPoint,
        end: DocPoint,
    ) -> Result<(DocPoint, DocPoint), Error> {
        let b = self.check_line(begin)?;
        let e = self.check_line(end)?;
        if e <= b {
            return Err(Error::range(ErrorKind::EmptyRange, begin, end));
        }
        let (id, offset) = self.locate_after(b.line, b.pos);
        self.check_position(id, offset, b)?;
        let (id, offset) = self.locate(e.line, e.pos);
        self.check_position(id, offset, e)?;
        Ok((b, e))
    }

    // --- MARK: Line maintenance ---

    fn reserve_cells(&mut self, additional: usize) -> Result<(), Error> {
        if !self.cells.has_handles_for(additional) {
            tracing::warn!(additional, "cell handles exhausted");
            return Err(Error::out_of_memory());
        }
        let cells = &mut self.cells;
        retry_alloc(&mut self.platform, || cells.try_reserve(additional))
    }

    /// Drops empty cells from the `count` logical lines after `anchor`.
    ///
    /// An empty cell survives only as the sole cell of its line, and then as plain text.
    /// When an empty end-of-line cell goes away, its predecessor takes over the flag.
    /// Annotation cells that lost their base cell are remeasured on their own.
    fn compact(&mut self, anchor: CellId, count: usize) {
        self.join_pairs(anchor, count);
        let mut id = self.cells.next(anchor);
        let mut at_start = true;
        let mut in_group = false;
        let mut left = count;
        while left > 0 && id != CellId::TAIL {
            let next = self.cells.next(id);
            let cell = &self.cells[id];
            let eol = cell.is_eol();
            if cell.is_empty() && !(at_start && eol) {
                if eol {
                    let prev = self.cells.prev(id);
                    self.cells[prev].set_eol(true);
                }
                let cell = self.cells.remove(id);
                self.dispose(cell);
            } else {
                let kind = cell.kind();
                if cell.is_empty() && kind != CellKind::Normal {
                    let cell = &mut self.cells[id];
                    self.platform.delete_context(cell);
                    cell.make_plain();
                } else if kind == CellKind::Ruby && !in_group {
                    self.cells[id].mark_dirty();
                }
                in_group = match kind {
                    CellKind::UnderRuby => true,
                    CellKind::Ruby => in_group,
                    _ => false,
                };
                at_start = false;
            }
            if eol {
                left -= 1;
                at_start = true;
                in_group = false;
            }
            id = next;
        }
    }

    /// Reunites surrogate halves that an edit left on both sides of a cell boundary.
    ///
    /// The half moves into whichever cell has room. When both are full, the high half is
    /// split off into a cell of its own first, which needs one reserved slot.
    fn join_pairs(&mut self, anchor: CellId, count: usize) {
        let mut id = self.cells.next(anchor);
        let mut left = count;
        while left > 0 && id != CellId::TAIL {
            let next = self.cells.next(id);
            let cell = &self.cells[id];
            if cell.is_eol() {
                left -= 1;
                id = next;
                continue;
            }
            let after = &self.cells[next];
            let (Some(&high), Some(&low)) = (cell.text().last(), after.text().first()) else {
                id = next;
                continue;
            };
            if !is_high_surrogate(high)
                || !is_low_surrogate(low)
                || cell.kind().is_object()
                || after.kind().is_object()
            {
                id = next;
                continue;
            }
            let len = cell.len();
            if after.remaining() > 0 {
                let removed = self.cells[id].remove_text(len - 1..len);
                let inserted = self.cells[next].insert_text(0, &[high]);
                debug_assert!(removed && inserted, "a lone high surrogate moves freely");
            } else {
                let mut target = id;
                if cell.remaining() == 0 {
                    match self.cells.split(id, len - 1) {
                        Some(half) => target = half,
                        None => {
                            id = next;
                            continue;
                        }
                    }
                }
                let removed = self.cells[next].remove_text(0..1);
                let end = self.cells[target].len();
                let inserted = self.cells[target].insert_text(end, &[low]);
                debug_assert!(removed && inserted, "a lone low surrogate moves freely");
            }
            tracing::trace!("joined surrogate pair across cells");
            id = next;
        }
    }

    /// Recomputes `first` and `length` of `count` logical lines starting at `line`,
    /// whose cells begin right after `anchor`.
    fn refresh_lines(&mut self, line: usize, anchor: CellId, count: usize) {
        let mut id = self.cells.next(anchor);
        for index in line..line + count {
            let mut length = 0;
            self.lines[index].first = id;
            loop {
                let cell = &self.cells[id];
                length += cell.len();
                id = self.cells.next(id);
                if cell.is_eol() {
                    break;
                }
            }
            self.lines[index].length = length;
        }
        self.sync_pending();
    }

    /// Points a pending visual line that starts a logical line at that line's current first cell.
    fn sync_pending(&mut self) {
        let last = self.visual.len() - 1;
        let pending = &mut self.visual[last];
        if pending.char_offset == 0 {
            pending.first = self
                .lines
                .get(pending.line)
                .map_or(CellId::TAIL, |line| line.first);
        }
    }

    // --- MARK: Insertion ---

    /// Inserts UTF-16 text at a point and returns the point after it.
    ///
    /// Line feeds (optionally preceded by a carriage return) start new logical lines.
    /// With `behind`, a point at the end of a cell inserts into the following cell instead;
    /// at the end of a line a fresh cell in the default style is created for it.
    fn insert_units(
        &mut self,
        at: DocPoint,
        text: &[u16],
        behind: bool,
        style: Option<RichData>,
    ) -> Result<DocPoint, Error> {
        let at = self.check_line(at)?;
        if text.is_empty() {
            return Ok(at);
        }
        let segments = split_lines(text);
        let feeds = segments.len() - 1;
        let (mut id, mut offset) = self.locate(at.line, at.pos);
        self.check_position(id, offset, at)?;

        let chunks: usize = segments
            .iter()
            .map(|segment| segment.len().div_ceil(CELL_CAPACITY - 1))
            .sum();
        self.reserve_cells(chunks + feeds + 3)?;
        self.lines.reserve(&mut self.platform, feeds)?;
        self.invalidate_from(at.line);
        let anchor = self.cells.prev(self.lines[at.line].first);

        if behind && offset == self.cells[id].len() {
            let cell = &mut self.cells[id];
            if cell.is_eol() {
                cell.set_eol(false);
                let mut fresh = Cell::new(self.default_style, CellKind::Normal);
                fresh.set_eol(true);
                id = self.cells.insert_after(id, fresh);
            } else {
                id = self.cells.next(id);
            }
            offset = 0;
        }

        let cell = &self.cells[id];
        let kind = match cell.kind() {
            CellKind::Ruby => CellKind::Ruby,
            CellKind::UnderRuby if offset == cell.len() => CellKind::Ruby,
            _ => CellKind::Normal,
        };
        // Ruby text never continues past a line break.
        let line_kind = if kind == CellKind::Ruby {
            CellKind::Normal
        } else {
            kind
        };
        let riched = style.unwrap_or(*cell.riched());
        let fits = |cell: &Cell, kind: CellKind| {
            cell.kind() == kind && !kind.is_object() && *cell.riched() == riched
        };

        if feeds == 0 && fits(cell, kind) && text.len() <= cell.remaining() {
            if !self.cells[id].insert_text(offset, text) {
                return Err(Error::at(ErrorKind::SurrogateSplit, at));
            }
            self.compact(anchor, 1);
            self.refresh_lines(at.line, anchor, 1);
            return Ok(DocPoint::new(at.line, at.pos + text.len()));
        }

        let (head, tail) = if offset == 0 {
            (self.cells.insert_before(id, Cell::new(riched, kind)), id)
        } else {
            let tail = self
                .cells
                .split_ex(id, offset)
                .ok_or(Error::at(ErrorKind::SurrogateSplit, at))?;
            (id, tail)
        };
        if feeds > 0 && self.cells[tail].is_empty() {
            self.cells[tail].set_kind(line_kind);
        }

        let mut cursor = head;
        let mut end = at;
        for (index, segment) in segments.iter().enumerate() {
            let first = index == 0;
            let last = index == feeds;
            let kind = if first { kind } else { line_kind };
            let mut rest: &[u16] = segment;
            if first && fits(&self.cells[head], kind) {
                let cell = &mut self.cells[head];
                let n = prefix_len(rest, cell.remaining());
                let len = cell.len();
                let inserted = cell.insert_text(len, &rest[..n]);
                debug_assert!(inserted, "prefix must fit the head cell");
                rest = &rest[n..];
            }
            let mut suffix: &[u16] = &[];
            if last && fits(&self.cells[tail], kind) {
                let n = suffix_len(rest, self.cells[tail].remaining());
                (rest, suffix) = rest.split_at(rest.len() - n);
            }
            while !rest.is_empty() {
                let n = prefix_len(rest, CELL_CAPACITY);
                let mut cell = Cell::new(riched, kind);
                cell.insert_text(0, &rest[..n]);
                cursor = self.cells.insert_after(cursor, cell);
                rest = &rest[n..];
            }
            if !suffix.is_empty() {
                let inserted = self.cells[tail].insert_text(0, suffix);
                debug_assert!(inserted, "suffix must fit the tail cell");
            }
            if !last {
                if self.cells[cursor].is_eol() {
                    let mut empty = Cell::new(riched, line_kind);
                    empty.set_eol(true);
                    cursor = self.cells.insert_after(cursor, empty);
                } else {
                    self.cells[cursor].set_eol(true);
                }
            }
            end = if first {
                DocPoint::new(at.line, at.pos + segment.len())
            } else {
                DocPoint::new(at.line + index, segment.len())
            };
        }

        self.compact(anchor, feeds + 1);
        let placeholder = LogicLine {
            first: CellId::TAIL,
            length: 0,
        };
        self.lines.insert_many(
            &mut self.platform,
            at.line + 1,
            iter::repeat_n(placeholder, feeds),
        )?;
        self.refresh_lines(at.line, anchor, feeds + 1);
        tracing::trace!(%at, %end, feeds, "inserted text");
        Ok(end)
    }

    /// Reinserts captured runs exactly as they were.
    fn insert_runs(&mut self, at: DocPoint, runs: &[Run]) -> Result<DocPoint, Error> {
        let at = self.check_line(at)?;
        if runs.is_empty() {
            return Ok(at);
        }
        let feeds = runs.iter().filter(|run| run.eol).count();
        let (id, offset) = self.locate(at.line, at.pos);
        self.check_position(id, offset, at)?;
        self.reserve_cells(runs.len() + 2)?;
        self.lines.reserve(&mut self.platform, feeds)?;
        self.invalidate_from(at.line);
        let anchor = self.cells.prev(self.lines[at.line].first);

        let tail = if offset == 0 {
            id
        } else {
            self.cells
                .split_ex(id, offset)
                .ok_or(Error::at(ErrorKind::SurrogateSplit, at))?
        };
        let mut end = at;
        for run in runs {
            let mut cell = Cell::restore(run.kind, run.riched, &run.text, run.payload.clone());
            cell.set_eol(run.eol);
            self.cells.insert_before(tail, cell);
            end = if run.eol {
                DocPoint::new(end.line + 1, 0)
            } else {
                DocPoint::new(end.line, end.pos + run.text.len())
            };
        }

        self.compact(anchor, feeds + 1);
        let placeholder = LogicLine {
            first: CellId::TAIL,
            length: 0,
        };
        self.lines.insert_many(
            &mut self.platform,
            at.line + 1,
            iter::repeat_n(placeholder, feeds),
        )?;
        self.refresh_lines(at.line, anchor, feeds + 1);
        Ok(end)
    }

    /// Links a prepared object cell in at a point. The cell is disposed on failure.
    fn insert_object(&mut self, at: DocPoint, object: Cell) -> Result<DocPoint, Error> {
        let slot = self.check_line(at).and_then(|at| {
            let (id, offset) = self.locate(at.line, at.pos);
            self.check_position(id, offset, at)?;
            self.reserve_cells(2)?;
            Ok((at, id, offset))
        });
        let (at, id, offset) = match slot {
            Ok(slot) => slot,
            Err(err) => {
                self.dispose(object);
                return Err(err);
            }
        };
        self.invalidate_from(at.line);
        let anchor = self.cells.prev(self.lines[at.line].first);
        let len = object.len();
        let mut object = object;

        if offset == 0 {
            self.cells.insert_before(id, object);
        } else if offset == self.cells[id].len() {
            let eol = self.cells[id].is_eol();
            self.cells[id].set_eol(false);
            object.set_eol(eol);
            self.cells.insert_after(id, object);
        } else {
            let Some(tail) = self.cells.split(id, offset) else {
                self.dispose(object);
                return Err(Error::at(ErrorKind::SurrogateSplit, at));
            };
            self.cells.insert_before(tail, object);
        }
        self.compact(anchor, 1);
        self.refresh_lines(at.line, anchor, 1);
        Ok(DocPoint::new(at.line, at.pos + len))
    }

    // --- MARK: Removal ---

    /// Removes a range already validated by [`check_range`](Self::check_range).
    fn remove_range(&mut self, begin: DocPoint, end: DocPoint) -> Result<(), Error> {
        self.reserve_cells(1)?;
        let (first, p1) = self.locate_after(begin.line, begin.pos);
        let (last, p2) = self.locate(end.line, end.pos);
        self.invalidate_from(begin.line);
        let anchor = self.cells.prev(self.lines[begin.line].first);

        if first == last {
            if let Some(cell) = self.cells.remove_text_ex(first, p1..p2)? {
                self.dispose(cell);
            }
        } else {
            let mut id = self.cells.next(first);
            while id != last {
                let next = self.cells.next(id);
                let cell = self.cells.remove(id);
                self.dispose(cell);
                id = next;
            }
            let head = &mut self.cells[first];
            let len = head.len();
            let removed = head.remove_text(p1..len);
            debug_assert!(removed, "range start was checked");
            head.set_eol(false);
            let removed = self.cells[last].remove_text(0..p2);
            debug_assert!(removed, "range end was checked");
        }

        self.compact(anchor, 1);
        self.lines.remove_range(begin.line + 1..end.line + 1);
        self.refresh_lines(begin.line, anchor, 1);
        tracing::trace!(%begin, %end, "removed text");
        Ok(())
    }

    // --- MARK: Styling ---

    /// Applies a style property over a range already validated by [`check_range`](Self::check_range).
    fn restyle(&mut self, begin: DocPoint, end: DocPoint, prop: StyleProperty) -> Result<(), Error> {
        let (first, p1) = self.locate_after(begin.line, begin.pos);
        let (last, p2) = self.locate(end.line, end.pos);
        let prop = prop.resolve_toggle(self.cells[first].riched(), self.cells[last].riched());
        let mut ruby = self.cells[first].kind().is_ruby() || self.cells[last].kind().is_ruby();

        // The end is split first so `first` stays valid when both ends share a cell.
        let split_end = p2 > 0 && p2 < self.cells[last].len();
        let stop = self
            .cells
            .split(last, p2)
            .ok_or(Error::at(ErrorKind::SurrogateSplit, end))?;
        let split_begin = p1 > 0 && p1 < self.cells[first].len();
        let start = self
            .cells
            .split(first, p1)
            .ok_or(Error::at(ErrorKind::SurrogateSplit, begin))?;

        let metrics = prop.affects_metrics();
        let mut id = start;
        while id != stop && id != CellId::TAIL {
            let cell = &mut self.cells[id];
            ruby |= cell.kind().is_ruby();
            if prop.apply(cell.riched_mut()) && metrics {
                cell.mark_dirty();
            }
            id = self.cells.next(id);
        }

        if metrics || ruby {
            let mut id = start;
            while id != stop && id != CellId::TAIL {
                self.cells[id].mark_dirty();
                id = self.cells.next(id);
            }
            self.invalidate_from(begin.line);
        } else {
            // Colors don't move anything: remeasure in place and place the split pieces.
            let mut id = start;
            while id != stop && id != CellId::TAIL {
                self.recreate_one(id);
                id = self.cells.next(id);
            }
            if split_begin {
                self.recreate_one(first);
                let head = self.cells[first].metrics;
                self.cells[start].metrics.pos = head.pos + head.width;
            }
            if split_end {
                self.recreate_one(stop);
                let prev = self.cells[self.cells.prev(stop)].metrics;
                self.cells[stop].metrics.pos = prev.pos + prev.width;
            }
        }
        self.platform.value_changed(Changed::View);
        Ok(())
    }

    fn apply_spans(&mut self, spans: &[StyleSpan]) -> Result<(), Error> {
        for span in spans.iter().filter(|span| span.begin < span.end) {
            self.restyle(span.begin, span.end, StyleProperty::RichData(span.riched))?;
        }
        Ok(())
    }

    // --- MARK: Capture ---

    fn capture(&self, begin: DocPoint, end: DocPoint) -> Vec<Run> {
        let mut runs = Vec::new();
        walk::walk(&self.cells, &self.lines, begin, end, |cell, range, brk| {
            runs.push(Run {
                kind: cell.kind(),
                riched: *cell.riched(),
                text: cell.text()[range].to_vec(),
                payload: cell.payload().cloned().map(Box::new),
                eol: brk,
            });
            true
        });
        runs
    }

    fn capture_styles(&self, begin: DocPoint, end: DocPoint) -> Vec<StyleSpan> {
        let mut spans = Vec::new();
        let mut point = begin;
        walk::walk(&self.cells, &self.lines, begin, end, |cell, range, brk| {
            let next = DocPoint::new(point.line, point.pos + range.len());
            if !range.is_empty() {
                spans.push(StyleSpan {
                    begin: point,
                    end: next,
                    riched: *cell.riched(),
                });
            }
            point = if brk {
                DocPoint::new(point.line + 1, 0)
            } else {
                next
            };
            true
        });
        spans
    }

    // --- MARK: Recording ---

    fn record(&mut self, before: Snapshot, op: UndoOp) {
        if !self.undo.is_enabled() {
            return;
        }
        let continues = self.op_depth > 0 && self.op_chained;
        self.undo.push(UndoRecord {
            continues,
            before,
            after: self.snapshot(),
            op,
        });
        if self.op_depth > 0 {
            self.op_chained = true;
        }
    }

    pub(crate) fn insert_recorded(
        &mut self,
        at: DocPoint,
        text: &[u16],
        behind: bool,
        style: Option<RichData>,
    ) -> Result<DocPoint, Error> {
        let before = self.snapshot();
        let begin = self.check_line(at)?;
        let end = self.insert_units(begin, text, behind, style)?;
        if end != begin && self.undo.is_enabled() {
            let content = self.capture(begin, end);
            self.record(before, UndoOp::InsertText {
                begin,
                end,
                content,
            });
        }
        Ok(end)
    }

    fn insert_object_recorded(&mut self, at: DocPoint, object: Cell) -> Result<DocPoint, Error> {
        let before = self.snapshot();
        let begin = match self.check_line(at) {
            Ok(begin) => begin,
            Err(err) => {
                self.dispose(object);
                return Err(err);
            }
        };
        let end = self.insert_object(begin, object)?;
        if self.undo.is_enabled() {
            let content = self.capture(begin, end);
            self.record(before, UndoOp::InsertText {
                begin,
                end,
                content,
            });
        }
        Ok(end)
    }

    pub(crate) fn remove_recorded(&mut self, begin: DocPoint, end: DocPoint) -> Result<(), Error> {
        let before = self.snapshot();
        let (begin, end) = self.check_range(begin, end)?;
        let content = if self.undo.is_enabled() {
            self.capture(begin, end)
        } else {
            Vec::new()
        };
        self.remove_range(begin, end)?;
        self.record(before, UndoOp::RemoveText {
            begin,
            end,
            content,
        });
        Ok(())
    }

    fn restyle_recorded(
        &mut self,
        begin: DocPoint,
        end: DocPoint,
        prop: StyleProperty,
    ) -> Result<(), Error> {
        if !self.info.flags.contains(DocFlags::RICH_TEXT) {
            return Err(Error::new(ErrorKind::Unsupported));
        }
        let before = self.snapshot();
        let (begin, end) = self.check_range(begin, end)?;
        let enabled = self.undo.is_enabled();
        let old = if enabled {
            self.capture_styles(begin, end)
        } else {
            Vec::new()
        };
        self.restyle(begin, end, prop)?;
        if enabled {
            let new = self.capture_styles(begin, end);
            self.record(before, UndoOp::RestyleRange {
                before: old,
                after: new,
            });
        }
        Ok(())
    }

    /// Clamps the selection after an edit, raises [`Changed::Text`] and runs the debug checks.
    pub(crate) fn finish_edit<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if result.is_ok() {
            let anchor = self.clamp_point(self.anchor);
            let caret = self.clamp_point(self.caret);
            if (anchor, caret) != (self.anchor, self.caret) {
                self.set_selection(anchor, caret);
            }
            self.platform.value_changed(Changed::Text);
        }
        self.debug_check();
        result
    }

    // --- MARK: Public editing API ---

    /// Inserts UTF-16 text and returns the point right after it.
    ///
    /// `"\n"` and `"\r\n"` start new logical lines. With `behind`, inserting at the end of a
    /// cell goes into the following cell, so text typed after a ruby run or inline object
    /// doesn't inherit its style.
    pub fn insert_text(
        &mut self,
        at: DocPoint,
        text: &[u16],
        behind: bool,
    ) -> Result<DocPoint, Error> {
        let result = self.insert_recorded(at, text, behind, None);
        self.finish_edit(result)
    }

    /// Like [`insert_text`](Self::insert_text), for a `&str`.
    pub fn insert_str(&mut self, at: DocPoint, text: &str, behind: bool) -> Result<DocPoint, Error> {
        self.insert_text(at, &to_utf16(text), behind)
    }

    /// Inserts an object cell, usually made with [`Cell::inline_object`].
    ///
    /// The cell is disposed through the platform if it can't be inserted.
    pub fn insert_inline(&mut self, at: DocPoint, object: Cell) -> Result<DocPoint, Error> {
        let result = self.insert_object_recorded(at, object);
        self.finish_edit(result)
    }

    /// Annotates `base` with `ruby` text and inserts both at a point.
    ///
    /// The base character gets `style`, or the default style; the annotation gets half its size.
    /// Undoes as one step.
    pub fn insert_ruby(
        &mut self,
        at: DocPoint,
        base: char,
        ruby: &str,
        style: Option<RichData>,
    ) -> Result<DocPoint, Error> {
        let ruby = to_utf16(ruby);
        if ruby.iter().any(|&unit| unit == LINE_FEED || unit == CARRIAGE_RETURN) {
            return Err(Error::at(ErrorKind::LineFeedInRuby, at));
        }
        if ruby.is_empty() {
            return Err(Error::at(ErrorKind::EmptyText, at));
        }
        let base_style = style.unwrap_or(self.default_style);
        let mut ruby_style = base_style;
        ruby_style.size *= 0.5;

        self.begin_op();
        let result = self
            .insert_object_recorded(at, Cell::under_ruby(base, base_style))
            .and_then(|under| self.insert_recorded(under, &ruby, false, Some(ruby_style)));
        self.end_op();
        self.finish_edit(result)
    }

    /// Removes `begin..end`.
    pub fn remove_text(&mut self, begin: DocPoint, end: DocPoint) -> Result<(), Error> {
        let result = self.remove_recorded(begin, end);
        self.finish_edit(result)
    }

    /// Applies one style property over `begin..end`.
    ///
    /// Fails with [`ErrorKind::Unsupported`] in plain text documents.
    pub fn set_style(
        &mut self,
        begin: DocPoint,
        end: DocPoint,
        prop: StyleProperty,
    ) -> Result<(), Error> {
        let result = self.restyle_recorded(begin, end, prop);
        self.debug_check();
        result
    }

    /// Replaces the whole style over a range.
    pub fn set_rich_data(
        &mut self,
        begin: DocPoint,
        end: DocPoint,
        riched: RichData,
    ) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::RichData(riched))
    }

    /// Sets the font size over a range.
    pub fn set_font_size(&mut self, begin: DocPoint, end: DocPoint, size: f32) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::FontSize(size))
    }

    /// Sets the text color over a range.
    pub fn set_font_color(
        &mut self,
        begin: DocPoint,
        end: DocPoint,
        color: Color,
    ) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::Color(color))
    }

    /// Sets the font family index over a range.
    pub fn set_font_name(&mut self, begin: DocPoint, end: DocPoint, font: u16) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::FontName(font))
    }

    /// Sets, clears or toggles underlining over a range.
    pub fn set_underline(
        &mut self,
        begin: DocPoint,
        end: DocPoint,
        set: FlagSet,
    ) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::Underline(set))
    }

    /// Sets, clears or toggles italics over a range.
    pub fn set_italic(&mut self, begin: DocPoint, end: DocPoint, set: FlagSet) -> Result<(), Error> {
        self.set_style(begin, end, StyleProperty::Italic(set))
    }

    // --- MARK: Undo ---

    fn revert(&mut self, op: &UndoOp) -> Result<(), Error> {
        match op {
            UndoOp::InsertText { begin, end, .. } => self.remove_range(*begin, *end),
            UndoOp::RemoveText { begin, content, .. } => self.insert_runs(*begin, content).map(drop),
            UndoOp::RestyleRange { before, .. } => self.apply_spans(before),
        }
    }

    fn replay(&mut self, op: &UndoOp) -> Result<(), Error> {
        match op {
            UndoOp::InsertText { begin, content, .. } => self.insert_runs(*begin, content).map(drop),
            UndoOp::RemoveText { begin, end, .. } => self.remove_range(*begin, *end),
            UndoOp::RestyleRange { after, .. } => self.apply_spans(after),
        }
    }

    /// Reverts the latest step and restores the selection from before it.
    ///
    /// Returns `Ok(false)` if there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, Error> {
        let Some(steps) = self.undo.undo_step() else {
            return Ok(false);
        };
        let snapshot = self.undo.get(steps.start).before;
        let mut result = Ok(());
        for index in steps.rev() {
            let op = self.undo.get(index).op.clone();
            result = self.revert(&op);
            if result.is_err() {
                break;
            }
        }
        self.finish_history(result, snapshot)
    }

    /// Reapplies the latest undone step and restores the selection from after it.
    ///
    /// Returns `Ok(false)` if there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, Error> {
        let Some(steps) = self.undo.redo_step() else {
            return Ok(false);
        };
        let snapshot = self.undo.get(steps.end - 1).after;
        let mut result = Ok(());
        for index in steps {
            let op = self.undo.get(index).op.clone();
            result = self.replay(&op);
            if result.is_err() {
                break;
            }
        }
        self.finish_history(result, snapshot)
    }

    fn finish_history(&mut self, result: Result<(), Error>, snapshot: Snapshot) -> Result<bool, Error> {
        if result.is_ok() {
            let anchor = self.clamp_point(snapshot.anchor);
            let caret = self.clamp_point(snapshot.caret);
            self.set_selection(anchor, caret);
            self.platform.value_changed(Changed::Text);
        }
        self.debug_check();
        result.map(|()| true)
    }
}
