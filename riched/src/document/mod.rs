// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document facade.

mod edit;
mod gui;
mod layout;
mod walk;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::buffer::LineBuffer;
use crate::cell::{CellId, CellStore};
use crate::undo::{Snapshot, UndoStack};
use crate::{Cell, CellKind, Changed, DocInfo, DocInitArg, Error, LineFeed, Platform, RichData};

/// A position in the document: a logical line and a UTF-16 offset inside it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPoint {
    /// Logical line index.
    pub line: usize,
    /// Code unit offset inside the line, line terminator excluded.
    pub pos: usize,
}

impl DocPoint {
    /// Creates a point.
    pub const fn new(line: usize, pos: usize) -> Self {
        Self { line, pos }
    }
}

impl fmt::Display for DocPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.pos)
    }
}

/// A half-open range of document points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocRange {
    /// First point of the range.
    pub begin: DocPoint,
    /// End of the range.
    pub end: DocPoint,
}

impl DocRange {
    /// Whether the range covers nothing.
    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}

/// A point in document space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// A size in document space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

/// An axis-aligned rectangle in document space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// A paragraph: the cells from `first` up to and including the next end-of-line cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct LogicLine {
    pub(crate) first: CellId,
    /// Length in code units, terminator excluded.
    pub(crate) length: usize,
}

/// One wrapped line.
///
/// The last entry of the visual line cache is never complete: it is where the next
/// layout pass resumes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisualLine {
    pub(crate) first: CellId,
    /// Owning logical line.
    pub line: usize,
    /// Code units of the logical line laid out on earlier visual lines.
    pub char_offset: usize,
    /// Top of this line in document space.
    pub offset: f32,
    /// Largest ascent of the line's cells.
    pub ascent: f32,
    /// Largest descent of the line's cells.
    pub descent: f32,
    /// Sum of the advances of the line's cells.
    pub width: f32,
}

impl VisualLine {
    fn start(first: CellId) -> Self {
        Self {
            first,
            line: 0,
            char_offset: 0,
            offset: 0.0,
            ascent: 0.0,
            descent: 0.0,
            width: 0.0,
        }
    }

    /// Height of the line.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// A multi-line rich text document.
///
/// All measurement and drawing goes through the [`Platform`] it owns.
pub struct TextDocument<P: Platform> {
    platform: P,
    info: DocInfo,
    default_style: RichData,
    line_feed: LineFeed,
    cells: CellStore,
    lines: LineBuffer<LogicLine>,
    visual: LineBuffer<VisualLine>,
    undo: UndoStack,
    viewport: Rect,
    caret_rect: Rect,
    estimated: Size,
    anchor: DocPoint,
    caret: DocPoint,
    // Nesting of `begin_op`/`end_op`.
    op_depth: u32,
    // A record was already added in the current group.
    op_chained: bool,
    dragging: bool,
}

impl<P: Platform> fmt::Debug for TextDocument<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDocument")
            .field("info", &self.info)
            .field("lines", &self.lines.len())
            .field("cells", &self.cells.len())
            .field("visual_lines", &self.visual.len())
            .field("anchor", &self.anchor)
            .field("caret", &self.caret)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> TextDocument<P> {
    /// Creates an empty document: one logical line holding one empty cell.
    ///
    /// The platform's out-of-memory policy is not consulted here.
    pub fn new(platform: P, arg: DocInitArg) -> Result<Self, Error> {
        let info = DocInfo::from(&arg);
        let mut cells = CellStore::new();
        cells.try_reserve(1).map_err(|_| Error::out_of_memory())?;
        let mut first = Cell::new(arg.default_style, CellKind::Normal);
        first.set_eol(true);
        let first = cells.insert_after(CellId::HEAD, first);

        let mut lines = LineBuffer::default();
        let mut visual = LineBuffer::default();
        lines.try_push(LogicLine { first, length: 0 })?;
        visual.try_push(VisualLine::start(first))?;

        tracing::debug!(?info, "document created");
        Ok(Self {
            platform,
            info,
            default_style: arg.default_style,
            line_feed: arg.line_feed,
            cells,
            lines,
            visual,
            undo: UndoStack::new(arg.undo_depth),
            viewport: Rect::default(),
            caret_rect: Rect {
                width: 1.0,
                height: arg.default_style.size,
                ..Rect::default()
            },
            estimated: Size::default(),
            anchor: DocPoint::default(),
            caret: DocPoint::default(),
            op_depth: 0,
            op_chained: false,
            dragging: false,
        })
    }

    // --- MARK: Accessors ---

    /// The platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Options fixed at construction.
    pub fn info(&self) -> &DocInfo {
        &self.info
    }

    /// Style of newly created text.
    pub fn default_style(&self) -> &RichData {
        &self.default_style
    }

    /// Terminator used by text extraction.
    pub fn line_feed(&self) -> LineFeed {
        self.line_feed
    }

    /// Number of logical lines; never zero.
    pub fn logic_line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of a logical line in code units, if it exists.
    pub fn line_length(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.length)
    }

    /// The end of the document.
    pub fn end_point(&self) -> DocPoint {
        let line = self.lines.len() - 1;
        DocPoint::new(line, self.lines[line].length)
    }

    /// All cells in document order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// The cells of one logical line.
    pub fn line_cells(&self, line: usize) -> impl Iterator<Item = &Cell> + '_ {
        let (from, to) = match self.lines.get(line) {
            Some(data) => (data.first, self.line_end(line)),
            None => (CellId::TAIL, CellId::TAIL),
        };
        self.cells.ids(from, to).map(|id| &self.cells[id])
    }

    /// The visual line cache; the last entry is the pending resume point.
    pub fn visual_lines(&self) -> &[VisualLine] {
        &self.visual
    }

    /// The cells of a complete visual line.
    pub fn visual_line_cells(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        let (from, to) = if index + 1 < self.visual.len() {
            (self.visual[index].first, self.visual[index + 1].first)
        } else {
            (CellId::TAIL, CellId::TAIL)
        };
        self.cells.ids(from, to).map(|id| &self.cells[id])
    }

    /// The anchor of the selection.
    pub fn anchor(&self) -> DocPoint {
        self.anchor
    }

    /// The caret position.
    pub fn caret(&self) -> DocPoint {
        self.caret
    }

    /// The selection, ordered.
    pub fn selection_range(&self) -> DocRange {
        DocRange {
            begin: self.anchor.min(self.caret),
            end: self.anchor.max(self.caret),
        }
    }

    /// Caret rectangle in document space.
    pub fn caret_rect(&self) -> Rect {
        self.caret_rect
    }

    /// Content size known from the last layout pass that reached the end of the document.
    pub fn estimated_size(&self) -> Size {
        self.estimated
    }

    /// The viewport in document space.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Whether there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Whether there is a step to redo.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    // --- MARK: View ---

    /// Moves the viewport.
    pub fn set_pos(&mut self, pos: Point) {
        self.viewport.x = pos.x;
        self.viewport.y = pos.y;
        self.platform.value_changed(Changed::View);
    }

    /// Resizes the viewport, dropping every visual line.
    pub fn resize(&mut self, size: Size) {
        self.viewport.width = size.width;
        self.viewport.height = size.height;
        self.reset_visual();
        tracing::debug!(size.width, size.height, "viewport resized");
        self.platform.value_changed(Changed::View);
    }

    /// Lays out everything down to the bottom of the viewport.
    pub fn before_render(&mut self) -> Result<(), Error> {
        let bottom = self.viewport.y + self.viewport.height;
        self.layout_until(bottom)?;
        self.update_caret_rect();
        Ok(())
    }

    /// Draws every complete visual line.
    pub fn render(&mut self) {
        for index in 0..self.visual.len().saturating_sub(1) {
            let line = self.visual[index];
            let next = self.visual[index + 1].first;
            let baseline = line.offset + line.ascent;
            let mut id = line.first;
            while id != next && id != CellId::TAIL {
                self.platform.draw_context(&self.cells[id], baseline);
                id = self.cells.next(id);
            }
        }
    }

    /// Changes the terminator used by text extraction.
    pub fn set_line_feed(&mut self, line_feed: LineFeed) {
        self.line_feed = line_feed;
        self.platform.value_changed(Changed::Text);
    }

    // --- MARK: Text extraction ---

    /// Appends the text of `begin..end` to `sink` through [`Platform::append_text`].
    ///
    /// Logical lines are separated by the document's [`LineFeed`].
    pub fn gen_text(&mut self, begin: DocPoint, end: DocPoint, sink: &mut Vec<u16>) -> Result<(), Error> {
        let (begin, end) = self.clamp_range(begin, end)?;
        let line_feed = self.line_feed.as_utf16();
        let Self {
            platform, cells, lines, ..
        } = self;
        walk::walk(cells, lines, begin, end, |cell, range, brk| {
            if !range.is_empty() && !platform.append_text(sink, &cell.text()[range]) {
                return false;
            }
            !brk || platform.append_text(sink, line_feed)
        });
        Ok(())
    }

    /// The whole document as a string, lines separated by `'\n'`.
    pub fn text(&self) -> String {
        let mut units = Vec::new();
        walk::walk(&self.cells, &self.lines, DocPoint::default(), self.end_point(), |cell, range, brk| {
            units.extend_from_slice(&cell.text()[range]);
            if brk {
                units.push(u16::from(b'\n'));
            }
            true
        });
        String::from_utf16_lossy(&units)
    }

    // --- MARK: Transactions ---

    /// Opens an undo group; every edit until the matching [`end_op`](Self::end_op) undoes as one step.
    pub fn begin_op(&mut self) {
        if self.op_depth == 0 {
            self.op_chained = false;
        }
        self.op_depth += 1;
    }

    /// Closes an undo group.
    ///
    /// A group that recorded nothing leaves the log untouched.
    pub fn end_op(&mut self) {
        debug_assert!(self.op_depth > 0, "unbalanced end_op");
        self.op_depth = self.op_depth.saturating_sub(1);
        if self.op_depth == 0 && self.op_chained {
            self.undo.seal(self.snapshot());
        }
    }

    /// Sets anchor and caret, clamping both into the document.
    pub fn set_anchor_caret(&mut self, anchor: DocPoint, caret: DocPoint) {
        let anchor = self.clamp_point(anchor);
        let caret = self.clamp_point(caret);
        self.set_selection(anchor, caret);
    }

    // --- MARK: Internal helpers ---

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            anchor: self.anchor,
            caret: self.caret,
        }
    }

    /// The cell after the end-of-line cell of `line`.
    fn line_end(&self, line: usize) -> CellId {
        match self.lines.get(line + 1) {
            Some(next) => next.first,
            None => CellId::TAIL,
        }
    }

    pub(crate) fn clamp_point(&self, point: DocPoint) -> DocPoint {
        let line = point.line.min(self.lines.len() - 1);
        let pos = if line == point.line {
            point.pos.min(self.lines[line].length)
        } else {
            self.lines[line].length
        };
        DocPoint::new(line, pos)
    }

    fn clamp_range(&self, begin: DocPoint, end: DocPoint) -> Result<(DocPoint, DocPoint), Error> {
        for point in [begin, end] {
            if point.line >= self.lines.len() {
                return Err(Error::at(crate::ErrorKind::LineOutOfRange, point));
            }
        }
        let begin = self.clamp_point(begin);
        let end = self.clamp_point(end);
        Ok((begin.min(end), begin.max(end)))
    }

    fn set_selection(&mut self, anchor: DocPoint, caret: DocPoint) {
        let old = self.selection_range();
        let caret_moved = caret != self.caret;
        self.anchor = anchor;
        self.caret = caret;
        self.update_caret_rect();
        if caret_moved {
            self.platform.value_changed(Changed::Caret);
        }
        if self.selection_range() != old {
            self.platform.value_changed(Changed::Selection);
        }
    }

    /// Releases a cell's platform context.
    fn dispose(&mut self, mut cell: Cell) {
        self.platform.delete_context(&mut cell);
    }

    /// Runs the consistency checks in debug builds, reporting failures to the platform.
    fn debug_check(&mut self) {
        #[cfg(debug_assertions)]
        if let Err(msg) = self.check_invariants() {
            self.platform.debug_output(&msg);
            panic!("document invariant violated: {msg}");
        }
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) -> Result<(), String> {
        use crate::util::{is_high_surrogate, is_low_surrogate};
        use alloc::format;

        if self.lines.is_empty() {
            return Err("no logical lines".into());
        }
        if self.visual.is_empty() {
            return Err("empty visual line cache".into());
        }
        let mut id = self.cells.first();
        for (index, line) in self.lines.iter().enumerate() {
            if line.first != id {
                return Err(format!("line {index} does not start at its first cell"));
            }
            let mut prev_last: Option<u16> = None;
            let mut length = 0;
            let mut count = 0;
            loop {
                if id == CellId::TAIL {
                    return Err(format!("line {index} has no end-of-line cell"));
                }
                let cell = &self.cells[id];
                length += cell.len();
                count += 1;
                if let (Some(last), Some(&first)) = (prev_last, cell.text().first()) {
                    if is_high_surrogate(last) && is_low_surrogate(first) {
                        return Err(format!("cell boundary splits a surrogate pair in line {index}"));
                    }
                }
                prev_last = cell.text().last().copied();
                let eol = cell.is_eol();
                if cell.is_empty() && !(eol && count == 1) {
                    return Err(format!("empty cell in line {index}"));
                }
                id = self.cells.next(id);
                if eol {
                    break;
                }
            }
            if length != line.length {
                return Err(format!(
                    "line {index} records length {} but holds {length}",
                    line.length
                ));
            }
        }
        if id != CellId::TAIL {
            return Err("cells after the last logical line".into());
        }
        Ok(())
    }

    fn reset_visual(&mut self) {
        let first = self.cells.first();
        self.visual.truncate(0);
        // Capacity never shrinks, so this can't fail.
        let _ = self.visual.try_push(VisualLine::start(first));
    }
}

impl<P: Platform> Drop for TextDocument<P> {
    fn drop(&mut self) {
        let mut id = self.cells.first();
        while id != CellId::TAIL {
            self.platform.delete_context(&mut self.cells[id]);
            id = self.cells.next(id);
        }
        self.undo.clear();
    }
}
