// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input-level operations.
//!
//! Each returns `false` when nothing happened, so the host can give its usual error cue.

use alloc::vec::Vec;

use super::{DocPoint, TextDocument};
use crate::cell::CellId;
use crate::util::{splits_pair, CARRIAGE_RETURN, LINE_FEED, SPACE};
use crate::{DocFlags, Error, ErrorKind, Platform, Point};

const TAB: u16 = b'\t' as u16;

fn is_blank(unit: u16) -> bool {
    unit == SPACE || unit == TAB
}

impl<P: Platform> TextDocument<P> {
    // --- MARK: Positions ---

    fn line_units(&self, line: usize) -> Vec<u16> {
        self.line_cells(line)
            .flat_map(|cell| cell.text().iter().copied())
            .collect()
    }

    /// The previous caret stop: one code point back, or the end of the previous line.
    fn step_back(&self, point: DocPoint) -> DocPoint {
        if point.pos == 0 {
            return match point.line {
                0 => point,
                line => DocPoint::new(line - 1, self.lines[line - 1].length),
            };
        }
        let pos = point.pos - 1;
        let (id, offset) = self.locate(point.line, pos);
        let cell = &self.cells[id];
        let start = pos - offset;
        let offset = if splits_pair(cell.text(), offset) {
            offset - 1
        } else if cell.kind().is_object() && offset < cell.len() {
            0
        } else {
            offset
        };
        DocPoint::new(point.line, start + offset)
    }

    /// The next caret stop: one code point on, or the start of the next line.
    fn step_forward(&self, point: DocPoint) -> DocPoint {
        if point.pos >= self.lines[point.line].length {
            return if point.line + 1 < self.lines.len() {
                DocPoint::new(point.line + 1, 0)
            } else {
                point
            };
        }
        let pos = point.pos + 1;
        let (id, offset) = self.locate(point.line, pos);
        let cell = &self.cells[id];
        let start = pos - offset;
        let offset = if splits_pair(cell.text(), offset) {
            offset + 1
        } else if cell.kind().is_object() && offset > 0 {
            cell.len()
        } else {
            offset
        };
        DocPoint::new(point.line, start + offset)
    }

    /// The start of the word before `point`, or the end of the previous line.
    fn word_back(&self, point: DocPoint) -> DocPoint {
        if point.pos == 0 {
            return self.step_back(point);
        }
        let units = self.line_units(point.line);
        let mut pos = point.pos;
        while pos > 0 && is_blank(units[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !is_blank(units[pos - 1]) {
            pos -= 1;
        }
        DocPoint::new(point.line, pos)
    }

    /// The start of the word after `point`, or the start of the next line.
    fn word_forward(&self, point: DocPoint) -> DocPoint {
        let units = self.line_units(point.line);
        if point.pos >= units.len() {
            return self.step_forward(point);
        }
        let mut pos = point.pos;
        while pos < units.len() && !is_blank(units[pos]) {
            pos += 1;
        }
        while pos < units.len() && is_blank(units[pos]) {
            pos += 1;
        }
        DocPoint::new(point.line, pos)
    }

    fn move_to(&mut self, target: DocPoint, extend: bool) -> bool {
        let anchor = if extend { self.anchor } else { target };
        self.set_selection(anchor, target);
        true
    }

    fn writable(&self) -> Result<(), Error> {
        if self.info.flags.contains(DocFlags::READ_ONLY) {
            tracing::debug!("edit rejected by read-only document");
            return Err(Error::new(ErrorKind::ReadOnly));
        }
        Ok(())
    }

    // --- MARK: Text input ---

    /// Types a character over the selection.
    pub fn gui_char(&mut self, ch: char) -> bool {
        let mut buf = [0_u16; 2];
        self.gui_text(ch.encode_utf16(&mut buf))
    }

    /// Types text over the selection.
    ///
    /// Single-line documents keep only the text before the first line break. Password
    /// documents reject the whole input if any character isn't accepted by the platform.
    pub fn gui_text(&mut self, text: &[u16]) -> bool {
        if self.writable().is_err() {
            return false;
        }
        let mut text = text;
        if !self.info.flags.contains(DocFlags::MULTI_LINE) {
            if let Some(cut) = text
                .iter()
                .position(|&unit| unit == LINE_FEED || unit == CARRIAGE_RETURN)
            {
                text = &text[..cut];
            }
        }
        if text.is_empty() {
            return false;
        }
        if self.info.flags.contains(DocFlags::PASSWORD) {
            let platform = &mut self.platform;
            let valid = char::decode_utf16(text.iter().copied())
                .all(|ch| ch.is_ok_and(|ch| platform.is_valid_password(ch)));
            if !valid {
                return false;
            }
        }

        self.begin_op();
        let range = self.selection_range();
        let result = if range.is_empty() {
            Ok(())
        } else {
            self.remove_recorded(range.begin, range.end)
        }
        .and_then(|()| self.insert_recorded(range.begin, text, false, None))
        .map(|end| self.set_selection(end, end));
        self.end_op();
        self.finish_edit(result).is_ok()
    }

    /// Starts a new line.
    pub fn gui_return(&mut self) -> bool {
        if !self.info.flags.contains(DocFlags::MULTI_LINE) {
            return false;
        }
        self.gui_text(&[LINE_FEED])
    }

    fn delete_towards(&mut self, target: DocPoint) -> bool {
        if self.writable().is_err() {
            return false;
        }
        let range = self.selection_range();
        let (begin, end) = if range.is_empty() {
            (self.caret.min(target), self.caret.max(target))
        } else {
            (range.begin, range.end)
        };
        if begin == end {
            return false;
        }
        self.begin_op();
        let result = self
            .remove_recorded(begin, end)
            .map(|()| self.set_selection(begin, begin));
        self.end_op();
        self.finish_edit(result).is_ok()
    }

    /// Deletes the selection, or the code point (`ctrl`: word) before the caret.
    pub fn gui_backspace(&mut self, ctrl: bool) -> bool {
        let target = if ctrl {
            self.word_back(self.caret)
        } else {
            self.step_back(self.caret)
        };
        self.delete_towards(target)
    }

    /// Deletes the selection, or the code point (`ctrl`: word) after the caret.
    pub fn gui_delete(&mut self, ctrl: bool) -> bool {
        let target = if ctrl {
            self.word_forward(self.caret)
        } else {
            self.step_forward(self.caret)
        };
        self.delete_towards(target)
    }

    // --- MARK: Navigation ---

    /// Moves the caret one code point (`ctrl`: word) left; `shift` extends the selection.
    pub fn gui_left(&mut self, ctrl: bool, shift: bool) -> bool {
        if !shift && self.anchor != self.caret {
            let edge = self.anchor.min(self.caret);
            return self.move_to(edge, false);
        }
        let target = if ctrl {
            self.word_back(self.caret)
        } else {
            self.step_back(self.caret)
        };
        target != self.caret && self.move_to(target, shift)
    }

    /// Moves the caret one code point (`ctrl`: word) right; `shift` extends the selection.
    pub fn gui_right(&mut self, ctrl: bool, shift: bool) -> bool {
        if !shift && self.anchor != self.caret {
            let edge = self.anchor.max(self.caret);
            return self.move_to(edge, false);
        }
        let target = if ctrl {
            self.word_forward(self.caret)
        } else {
            self.step_forward(self.caret)
        };
        target != self.caret && self.move_to(target, shift)
    }

    fn move_vertically(&mut self, down: bool, shift: bool) -> bool {
        let caret = self.caret;
        if self.layout_to_point(caret).is_err() {
            return false;
        }
        let index = self.visual_index(caret);
        let x = self.x_of(index, caret);
        let target = if down {
            match self.layout_to_index(index + 1) {
                Ok(true) => index + 1,
                _ => return false,
            }
        } else if index == 0 {
            return false;
        } else {
            index - 1
        };
        let point = self.hit_visual(target, x);
        self.move_to(point, shift)
    }

    /// Moves the caret to the visual line above, keeping its horizontal position.
    pub fn gui_up(&mut self, shift: bool) -> bool {
        self.move_vertically(false, shift)
    }

    /// Moves the caret to the visual line below, keeping its horizontal position.
    pub fn gui_down(&mut self, shift: bool) -> bool {
        self.move_vertically(true, shift)
    }

    /// Moves the caret to the start of its visual line (`ctrl`: of the document).
    pub fn gui_home(&mut self, ctrl: bool, shift: bool) -> bool {
        let target = if ctrl {
            DocPoint::default()
        } else {
            if self.layout_to_point(self.caret).is_err() {
                return false;
            }
            let line = self.visual[self.visual_index(self.caret)];
            DocPoint::new(line.line, line.char_offset)
        };
        self.move_to(target, shift)
    }

    /// Moves the caret to the end of its visual line (`ctrl`: of the document).
    pub fn gui_end(&mut self, ctrl: bool, shift: bool) -> bool {
        let target = if ctrl {
            self.end_point()
        } else {
            if self.layout_to_point(self.caret).is_err() {
                return false;
            }
            let index = self.visual_index(self.caret);
            let (line, next) = (self.visual[index], self.visual[index + 1]);
            if next.line == line.line && next.first != CellId::TAIL {
                // Stop before the space the line was wrapped after.
                let units = self.line_units(line.line);
                let mut end = next.char_offset;
                if end > line.char_offset && units.get(end - 1) == Some(&SPACE) {
                    end -= 1;
                }
                DocPoint::new(line.line, end)
            } else {
                DocPoint::new(line.line, self.lines[line.line].length)
            }
        };
        self.move_to(target, shift)
    }

    fn move_page(&mut self, down: bool, shift: bool) -> bool {
        let caret = self.caret;
        if self.layout_to_point(caret).is_err() {
            return false;
        }
        let index = self.visual_index(caret);
        let x = self.x_of(index, caret);
        let page = self.viewport.height.max(1.0);
        let top = self.visual[index].offset;
        let y = if down { top + page } else { (top - page).max(0.0) };
        if down && self.layout_until(y + 1.0).is_err() {
            return false;
        }
        let complete = self.visual.len() - 1;
        let target = self.visual[..complete]
            .partition_point(|line| line.offset <= y)
            .saturating_sub(1);
        let point = self.hit_visual(target, x);
        point != caret && self.move_to(point, shift)
    }

    /// Moves the caret one viewport height up.
    pub fn gui_page_up(&mut self, shift: bool) -> bool {
        self.move_page(false, shift)
    }

    /// Moves the caret one viewport height down.
    pub fn gui_page_down(&mut self, shift: bool) -> bool {
        self.move_page(true, shift)
    }

    /// Selects the whole document.
    pub fn gui_select_all(&mut self) -> bool {
        let end = self.end_point();
        self.set_selection(DocPoint::default(), end);
        true
    }

    // --- MARK: History ---

    /// Undoes the latest step.
    pub fn gui_undo(&mut self) -> bool {
        self.writable().is_ok() && matches!(self.undo(), Ok(true))
    }

    /// Redoes the latest undone step.
    pub fn gui_redo(&mut self) -> bool {
        self.writable().is_ok() && matches!(self.redo(), Ok(true))
    }

    // --- MARK: Mouse ---

    fn hit_viewport(&mut self, pos: Point) -> Result<DocPoint, Error> {
        self.hit_test(Point {
            x: pos.x + self.viewport.x,
            y: pos.y + self.viewport.y,
        })
    }

    /// Places the caret under the pointer and starts a drag; `shift` keeps the anchor.
    ///
    /// `pos` is relative to the viewport.
    pub fn gui_lbutton_down(&mut self, pos: Point, shift: bool) -> bool {
        let Ok(point) = self.hit_viewport(pos) else {
            return false;
        };
        self.dragging = true;
        self.move_to(point, shift)
    }

    /// Extends the selection to the pointer while dragging.
    pub fn gui_lbutton_hold(&mut self, pos: Point) -> bool {
        if !self.dragging {
            return false;
        }
        let Ok(point) = self.hit_viewport(pos) else {
            return false;
        };
        self.move_to(point, true)
    }

    /// Ends a drag at the pointer.
    pub fn gui_lbutton_up(&mut self, pos: Point) -> bool {
        if !self.dragging {
            return false;
        }
        let moved = self.gui_lbutton_hold(pos);
        self.dragging = false;
        moved
    }
}
