// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cells: short runs of uniformly styled text, or a single inline object.

mod store;

pub(crate) use store::{CellId, CellStore};

use alloc::boxed::Box;
use alloc::string::String;
use core::ops::Range;

use smallvec::SmallVec;

use crate::util::splits_pair;
use crate::{Point, Rect, RichData};

/// Number of UTF-16 code units a normal text cell can hold.
pub const CELL_CAPACITY: usize = 32;

/// Placeholder code unit stored in inline object cells.
pub(crate) const OBJECT_REPLACEMENT: u16 = 0xFFFC;

/// What a cell holds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Plain styled text.
    #[default]
    Normal,
    /// Phonetic annotation text laid out above the preceding [`UnderRuby`](Self::UnderRuby) cell.
    Ruby,
    /// Annotated base text.
    UnderRuby,
    /// An image.
    Image,
    /// Any other host-defined inline object.
    Inline,
}

impl CellKind {
    /// Whether the cell is an atomic object that can't be split or broken.
    pub fn is_object(self) -> bool {
        matches!(self, Self::UnderRuby | Self::Image | Self::Inline)
    }

    /// Whether the cell belongs to a ruby group.
    pub fn is_ruby(self) -> bool {
        matches!(self, Self::Ruby | Self::UnderRuby)
    }
}

/// Cached layout metrics of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CellMetrics {
    /// Advance width.
    pub width: f32,
    /// Height above the baseline.
    pub ascent: f32,
    /// Height below the baseline.
    pub descent: f32,
    /// Ink bounds, relative to the cell origin.
    pub bounding: Rect,
    /// Horizontal position inside the visual line.
    pub pos: f32,
    /// Drawing offset from the cell's position.
    pub offset: Point,
}

/// Platform-owned layout handle of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellContext {
    /// Nothing has been created yet.
    #[default]
    None,
    /// A shaped text layout.
    TextLayout(u64),
    /// A decoded bitmap.
    Bitmap(u64),
}

/// Parameters for creating an inline object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InlineInfo<'a> {
    /// Width of the object.
    pub width: f32,
    /// Height of the object.
    pub height: f32,
    /// Host-defined resource locator, such as an image path.
    pub locator: &'a str,
}

/// Out-of-line data owned by an inline object cell.
#[derive(Clone, Debug, PartialEq)]
pub struct InlinePayload {
    /// Width of the object.
    pub width: f32,
    /// Height of the object.
    pub height: f32,
    /// Host-defined resource locator.
    pub locator: String,
}

/// A run of uniformly styled text, or a single inline object.
#[derive(Clone, Debug)]
pub struct Cell {
    text: SmallVec<[u16; CELL_CAPACITY]>,
    capacity: usize,
    riched: RichData,
    kind: CellKind,
    dirty: bool,
    eol: bool,
    payload: Option<Box<InlinePayload>>,
    /// Layout metrics, written by the platform and the layout engine.
    pub metrics: CellMetrics,
    /// Platform layout handle.
    pub context: CellContext,
}

impl Cell {
    pub(crate) fn new(riched: RichData, kind: CellKind) -> Self {
        Self {
            text: SmallVec::new(),
            capacity: CELL_CAPACITY,
            riched,
            kind,
            dirty: true,
            eol: false,
            payload: None,
            metrics: CellMetrics::default(),
            context: CellContext::None,
        }
    }

    /// Creates an inline object cell spanning `len` positions.
    ///
    /// The cell's capacity equals its length, so nothing can be inserted into it.
    pub fn inline_object(info: InlineInfo<'_>, len: usize, kind: CellKind, riched: RichData) -> Self {
        let len = len.max(1);
        let mut cell = Self::new(riched, kind);
        cell.text.extend(core::iter::repeat_n(OBJECT_REPLACEMENT, len));
        cell.capacity = len;
        cell.payload = Some(Box::new(InlinePayload {
            width: info.width,
            height: info.height,
            locator: info.locator.into(),
        }));
        cell
    }

    /// Creates an under-ruby cell holding a single base character.
    pub(crate) fn under_ruby(base: char, riched: RichData) -> Self {
        let mut cell = Self::new(riched, CellKind::UnderRuby);
        let mut buf = [0_u16; 2];
        cell.text.extend_from_slice(base.encode_utf16(&mut buf));
        cell.capacity = cell.text.len();
        cell
    }

    /// The cell's text in UTF-16 code units.
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the cell holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Maximum length of the cell.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Code units that can still be inserted in place.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.text.len())
    }

    /// The cell's style.
    pub fn riched(&self) -> &RichData {
        &self.riched
    }

    /// What the cell holds.
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Whether cached metrics are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether this is the last cell of its logical line.
    pub fn is_eol(&self) -> bool {
        self.eol
    }

    /// Inline object data, if any.
    pub fn payload(&self) -> Option<&InlinePayload> {
        self.payload.as_deref()
    }

    pub(crate) fn riched_mut(&mut self) -> &mut RichData {
        &mut self.riched
    }

    pub(crate) fn set_kind(&mut self, kind: CellKind) {
        self.kind = kind;
    }

    pub(crate) fn set_eol(&mut self, eol: bool) {
        self.eol = eol;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Turns an emptied cell back into plain text.
    pub(crate) fn make_plain(&mut self) {
        debug_assert!(self.text.is_empty(), "only empty cells become plain");
        self.kind = CellKind::Normal;
        self.capacity = CELL_CAPACITY;
        self.payload = None;
        self.dirty = true;
    }

    /// Rebuilds a cell captured by the undo log.
    pub(crate) fn restore(
        kind: CellKind,
        riched: RichData,
        text: &[u16],
        payload: Option<Box<InlinePayload>>,
    ) -> Self {
        let mut cell = Self::new(riched, kind);
        cell.text.extend_from_slice(text);
        if kind.is_object() {
            cell.capacity = text.len();
        }
        cell.payload = payload;
        cell
    }

    /// Inserts text in place.
    ///
    /// Fails without mutation if `pos` is out of range or inside a surrogate pair,
    /// or if the result would exceed the cell's capacity.
    pub(crate) fn insert_text(&mut self, pos: usize, text: &[u16]) -> bool {
        if pos > self.text.len() || splits_pair(&self.text, pos) || text.len() > self.remaining()
        {
            return false;
        }
        self.text.insert_from_slice(pos, text);
        self.dirty = true;
        true
    }

    /// Removes a range of code units in place.
    ///
    /// Fails without mutation if the range is out of bounds or either edge cuts a surrogate pair.
    pub(crate) fn remove_text(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end
            || range.end > self.text.len()
            || splits_pair(&self.text, range.start)
            || splits_pair(&self.text, range.end)
        {
            return false;
        }
        if range.is_empty() {
            return true;
        }
        self.text.drain(range);
        self.dirty = true;
        true
    }

    /// Moves the text from `pos` on into a new cell with the same style and kind.
    pub(crate) fn split_off(&mut self, pos: usize) -> Self {
        let mut tail = Self::new(self.riched, self.kind);
        tail.text.extend_from_slice(&self.text[pos..]);
        self.text.truncate(pos);
        self.dirty = true;
        tail
    }

    /// Whether `next` can be appended to this cell.
    pub(crate) fn can_merge(&self, next: &Self) -> bool {
        !self.eol
            && self.kind == CellKind::Normal
            && next.kind == CellKind::Normal
            && self.riched == next.riched
            && self.text.len() + next.text.len() <= self.capacity
    }

    pub(crate) fn append(&mut self, next: &Self) {
        self.text.extend_from_slice(&next.text);
        self.eol = next.eol;
        self.dirty = true;
    }
}
