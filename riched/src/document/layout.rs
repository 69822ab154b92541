// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental line wrapping over the cell sequence.

use super::{TextDocument, VisualLine};
use crate::cell::CellId;
use crate::util::{char_at, char_before, is_cjk, splits_pair, SPACE};
use crate::{CellKind, Changed, DocFlags, DocPoint, Error, ErrorKind, Platform, Point, Rect, WrapMode};

/// What the wrap check decided for the current cell.
enum Wrap {
    /// The cell stays on the current visual line.
    Keep,
    /// The cell starts a new visual line.
    Before,
    /// The current visual line ends after the cell.
    After,
}

impl<P: Platform> TextDocument<P> {
    /// Drops every visual line owned by logical line `line` or later, keeping the first
    /// of them as the pending resume point.
    pub(crate) fn invalidate_from(&mut self, line: usize) {
        let len = self.visual.len();
        if len < 2 {
            return;
        }
        let index = self.visual.partition_point(|vl| vl.line < line);
        if index < len {
            self.visual.truncate(index + 1);
        }
    }

    /// Extends the visual line cache until a line starts at or below `bottom`,
    /// or the content ends.
    pub(crate) fn layout_until(&mut self, bottom: f32) -> Result<(), Error> {
        let result = self.expand_visual(bottom);
        if result.is_err() {
            self.reset_visual();
        }
        self.debug_check();
        result
    }

    fn expand_visual(&mut self, bottom: f32) -> Result<(), Error> {
        self.visual[0].first = self.cells.first();
        let last = self.visual.len() - 1;
        let mut line = self.visual[last];
        if line.char_offset == 0 {
            line.first = match self.lines.get(line.line) {
                Some(data) => data.first,
                None => CellId::TAIL,
            };
            self.visual[last].first = line.first;
        }
        if line.first == CellId::TAIL || (last > 0 && line.offset >= bottom) {
            return Ok(());
        }
        self.visual.truncate(last);

        let viewport_w = self.viewport.width;
        let wrap = self.info.wrap_mode != WrapMode::NoWrap;
        let fixed = self
            .info
            .flags
            .contains(DocFlags::FIXED_LINE_HEIGHT)
            .then_some(self.info.fixed_line_height);
        let line_height = |vl: &VisualLine| fixed.unwrap_or(vl.ascent + vl.descent);

        line.ascent = 0.0;
        line.descent = 0.0;
        let mut inline = 0.0_f32;
        let mut chars = 0_usize;
        let mut at_start = true;
        let mut produced = 0_usize;
        let mut cell = line.first;
        while cell != CellId::TAIL {
            if self.should_merge(cell, viewport_w, inline) {
                if let Some(absorbed) = self.cells.merge_with_next(cell) {
                    tracing::trace!("merged adjacent cells");
                    self.dispose(absorbed);
                }
            }
            let mut new_line = self.cells[cell].is_eol();
            self.recreate(cell);

            let width = self.cells[cell].metrics.width;
            let wrap_now = if wrap && inline + width > viewport_w && width > 0.0 {
                self.check_wrap(cell, viewport_w, inline, at_start)
            } else {
                Wrap::Keep
            };
            match wrap_now {
                Wrap::Keep => {}
                Wrap::After => new_line = true,
                Wrap::Before => {
                    line.width = inline;
                    self.visual.push(&mut self.platform, line)?;
                    produced += 1;
                    line.char_offset += chars;
                    chars = 0;
                    inline = 0.0;
                    line.first = cell;
                    line.offset += line_height(&line);
                    line.ascent = 0.0;
                    line.descent = 0.0;
                }
            }

            let c = &mut self.cells[cell];
            c.metrics.pos = inline;
            inline += c.metrics.width;
            chars += c.len();
            line.ascent = line.ascent.max(c.metrics.ascent);
            line.descent = line.descent.max(c.metrics.descent);
            at_start = false;
            let eol = c.is_eol();
            let next = self.cells.next(cell);

            if new_line {
                line.width = inline;
                self.visual.push(&mut self.platform, line)?;
                produced += 1;
                line.char_offset += chars;
                chars = 0;
                if eol {
                    line.line += 1;
                    line.char_offset = 0;
                }
                line.first = next;
                line.offset += line_height(&line);
                line.ascent = 0.0;
                line.descent = 0.0;
                inline = 0.0;
                at_start = true;
                if line.offset >= bottom {
                    break;
                }
            }
            cell = next;
        }
        line.width = 0.0;
        self.visual.push(&mut self.platform, line)?;
        tracing::debug!(produced, bottom, "layout pass");

        if line.first == CellId::TAIL {
            self.update_estimated();
        }
        Ok(())
    }

    fn update_estimated(&mut self) {
        let complete = &self.visual[..self.visual.len() - 1];
        let height = self.visual[self.visual.len() - 1].offset;
        let width = complete.iter().map(|vl| vl.width).fold(0.0_f32, f32::max);
        if width != self.estimated.width {
            self.estimated.width = width;
            self.platform.value_changed(Changed::EstimatedWidth);
        }
        if height != self.estimated.height {
            self.estimated.height = height;
            self.platform.value_changed(Changed::EstimatedHeight);
        }
    }

    fn should_merge(&self, cell: CellId, viewport_w: f32, inline: f32) -> bool {
        let c = &self.cells[cell];
        if c.is_eol() {
            return false;
        }
        if self.info.wrap_mode == WrapMode::NoWrap {
            return true;
        }
        inline + c.metrics.width + c.riched().size < viewport_w
    }

    /// Decides how an overflowing cell wraps, splitting it when a break point is found.
    fn check_wrap(&mut self, cell: CellId, viewport_w: f32, inline: f32, at_start: bool) -> Wrap {
        let c = &self.cells[cell];
        let whole = c.kind().is_object()
            || c.metrics.width > viewport_w
            || inline + c.riched().size > viewport_w;
        if whole && !at_start {
            tracing::trace!(inline, "break before object or oversized cell");
            return Wrap::Before;
        }
        match self.find_break(cell, viewport_w - inline) {
            Some(at) if at < self.cells[cell].len() => {
                if self.cells.split(cell, at).is_none() {
                    return if at_start { Wrap::After } else { Wrap::Before };
                }
                tracing::trace!(at, "split cell at break point");
                self.recreate_one(cell);
                Wrap::After
            }
            Some(_) => Wrap::After,
            None if at_start => Wrap::After,
            None => Wrap::Before,
        }
    }

    /// Finds a break offset in `1..=len` inside a cell, given the horizontal room left.
    ///
    /// Breaks before the hit-tested position are preferred over later ones.
    fn find_break(&mut self, cell: CellId, room: f32) -> Option<usize> {
        let mode = self.info.wrap_mode;
        if mode == WrapMode::NoWrap {
            return None;
        }
        let c = &self.cells[cell];
        if c.kind().is_object() {
            return None;
        }
        let hit = self.platform.hit_test(c, room).pos as usize;
        let text = c.text();
        let len = text.len();
        if len == 0 {
            return None;
        }
        let hit = hit.min(len);
        if mode == WrapMode::Anywhere {
            let mut at = hit.max(1);
            if splits_pair(text, at) {
                at = if at > 1 { at - 1 } else { at + 1 };
            }
            return Some(at);
        }
        let is_break = |i: usize| {
            if splits_pair(text, i) {
                return false;
            }
            if text[i - 1] == SPACE {
                return true;
            }
            mode == WrapMode::SpaceOrCjk
                && (char_before(text, i).is_some_and(|(ch, _)| is_cjk(ch))
                    || char_at(text, i).is_some_and(|(ch, _)| is_cjk(ch)))
        };
        (1..=hit)
            .rev()
            .find(|&i| is_break(i))
            .or_else(|| (hit + 1..=len).find(|&i| is_break(i)))
    }

    /// Remeasures a cell, or a whole ruby group starting at an under-ruby cell.
    fn recreate(&mut self, cell: CellId) {
        if self.cells[cell].kind() != CellKind::UnderRuby {
            if self.cells[cell].is_dirty() {
                self.recreate_one(cell);
            }
            return;
        }
        // First pass: find the group and whether any member is dirty.
        let mut dirty = self.cells[cell].is_dirty();
        let mut end = self.cells.next(cell);
        let mut eol = self.cells[cell].is_eol();
        while !eol && end != CellId::TAIL && self.cells[end].kind() == CellKind::Ruby {
            dirty |= self.cells[end].is_dirty();
            eol = self.cells[end].is_eol();
            end = self.cells.next(end);
        }
        if !dirty {
            return;
        }
        // Second pass: measure every member.
        self.recreate_one(cell);
        let first_ruby = self.cells.next(cell);
        if first_ruby == end {
            return;
        }
        let mut ruby_width = 0.0;
        let mut id = first_ruby;
        while id != end {
            self.recreate_one(id);
            ruby_width += self.cells[id].metrics.width;
            id = self.cells.next(id);
        }
        // Third pass: center both runs over the wider one, ruby on top.
        let ruby = self.cells[first_ruby].metrics;
        let ruby_height = ruby.ascent + ruby.descent;
        let under = &mut self.cells[cell].metrics;
        let all = under.width.max(ruby_width);
        let raise = -under.ascent;
        under.offset = Point {
            x: (all - under.width) * 0.5,
            y: ruby_height,
        };
        under.ascent += ruby_height;
        under.width = all;
        let mut x = -(all + ruby_width) * 0.5;
        let mut id = first_ruby;
        while id != end {
            let m = &mut self.cells[id].metrics;
            m.offset = Point { x, y: raise };
            x += m.width;
            m.width = 0.0;
            id = self.cells.next(id);
        }
    }

    pub(crate) fn recreate_one(&mut self, cell: CellId) {
        let c = &mut self.cells[cell];
        c.metrics.offset = Point::default();
        self.platform.recreate_context(c, &self.info);
        c.mark_clean();
    }

    // --- MARK: Geometry ---

    /// Whether complete visual lines already cover `point`.
    pub(crate) fn is_laid_out(&self, point: DocPoint) -> bool {
        let pending = self.visual[self.visual.len() - 1];
        self.visual.len() > 1
            && (pending.first == CellId::TAIL
                || (pending.line, pending.char_offset) > (point.line, point.pos))
    }

    fn layout_step(&self) -> f32 {
        self.viewport.height.max(64.0)
    }

    /// Makes sure the visual lines covering `point` are complete.
    pub(crate) fn layout_to_point(&mut self, point: DocPoint) -> Result<(), Error> {
        while !self.is_laid_out(point) {
            let pending = self.visual[self.visual.len() - 1];
            self.layout_until(pending.offset + self.layout_step())?;
        }
        Ok(())
    }

    /// Makes sure visual line `index` is complete.
    ///
    /// Returns `false` if the document has fewer visual lines.
    pub(crate) fn layout_to_index(&mut self, index: usize) -> Result<bool, Error> {
        while index + 1 >= self.visual.len() {
            let pending = self.visual[self.visual.len() - 1];
            if self.visual.len() > 1 && pending.first == CellId::TAIL {
                return Ok(false);
            }
            self.layout_until(pending.offset + self.layout_step())?;
        }
        Ok(true)
    }

    /// Index of the complete visual line holding `point`.
    pub(crate) fn visual_index(&self, point: DocPoint) -> usize {
        let complete = &self.visual[..self.visual.len() - 1];
        complete
            .partition_point(|vl| (vl.line, vl.char_offset) <= (point.line, point.pos))
            .saturating_sub(1)
    }

    /// Horizontal position of `point` inside visual line `index`.
    pub(crate) fn x_of(&mut self, index: usize, point: DocPoint) -> f32 {
        let vl = self.visual[index];
        let end = self.visual[index + 1].first;
        let mut rest = point.pos.saturating_sub(vl.char_offset);
        let mut id = vl.first;
        let mut x = 0.0;
        while id != end && id != CellId::TAIL {
            let c = &self.cells[id];
            x = c.metrics.pos + c.metrics.width;
            if rest <= c.len() {
                if rest == c.len() {
                    return x;
                }
                let metrics = self.platform.char_metrics(c, rest as u32);
                return c.metrics.pos + metrics.offset;
            }
            rest -= c.len();
            id = self.cells.next(id);
        }
        x
    }

    /// Recomputes the caret rectangle if the caret's visual line is laid out.
    pub(crate) fn update_caret_rect(&mut self) {
        let caret = self.caret;
        if !self.is_laid_out(caret) {
            return;
        }
        let index = self.visual_index(caret);
        let vl = self.visual[index];
        let x = self.x_of(index, caret);
        let height = if self.info.flags.contains(DocFlags::FIXED_LINE_HEIGHT) {
            self.info.fixed_line_height
        } else {
            vl.height()
        };
        self.caret_rect = Rect {
            x,
            y: vl.offset,
            width: 1.0,
            height,
        };
    }

    /// Maps a horizontal position on a complete visual line to a document point.
    pub(crate) fn hit_visual(&mut self, index: usize, x: f32) -> DocPoint {
        let vl = self.visual[index];
        let end = self.visual[index + 1].first;
        let mut pos = vl.char_offset;
        let mut rest = x;
        let mut id = vl.first;
        while id != end && id != CellId::TAIL {
            let c = &self.cells[id];
            if rest < c.metrics.width {
                let hit = self.platform.hit_test(c, rest.max(0.0));
                let mut inner = hit.pos as usize;
                if hit.trailing {
                    inner += hit.length as usize;
                }
                let mut inner = inner.min(c.len());
                if c.kind().is_object() && inner > 0 && inner < c.len() {
                    inner = c.len();
                }
                if splits_pair(c.text(), inner) {
                    inner -= 1;
                }
                return DocPoint::new(vl.line, pos + inner);
            }
            rest -= c.metrics.width;
            pos += c.len();
            id = self.cells.next(id);
        }
        DocPoint::new(vl.line, pos)
    }

    /// Maps a point in document space to a document point.
    ///
    /// Not supported with a fixed line height.
    pub fn hit_test(&mut self, point: Point) -> Result<DocPoint, Error> {
        if self.info.flags.contains(DocFlags::FIXED_LINE_HEIGHT) {
            return Err(Error::new(ErrorKind::Unsupported));
        }
        self.layout_until(point.y.max(0.0) + 1.0)?;
        let complete = self.visual.len() - 1;
        if complete == 0 {
            return Ok(DocPoint::default());
        }
        let index = self.visual[..complete]
            .partition_point(|vl| vl.offset <= point.y)
            .saturating_sub(1);
        Ok(self.hit_visual(index, point.x))
    }
}
