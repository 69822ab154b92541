// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut, Range};

use super::{Cell, CellKind};
use crate::util::splits_pair;
use crate::{Error, ErrorKind};

/// Stable handle of a cell in a [`CellStore`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CellId(u32);

impl CellId {
    /// Sentinel before the first cell.
    pub(crate) const HEAD: Self = Self(0);
    /// Sentinel after the last cell.
    pub(crate) const TAIL: Self = Self(1);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Slot {
    prev: CellId,
    next: CellId,
    cell: Option<Cell>,
}

/// Arena of cells linked into one sequence between two sentinels.
#[derive(Clone, Debug)]
pub(crate) struct CellStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Default for CellStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CellStore {
    pub(crate) fn new() -> Self {
        let sentinel = Slot {
            prev: CellId::HEAD,
            next: CellId::TAIL,
            cell: None,
        };
        Self {
            slots: alloc::vec![sentinel.clone(), sentinel],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live cells.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Whether `additional` more cells still get handles of their own.
    pub(crate) fn has_handles_for(&self, additional: usize) -> bool {
        let fresh = additional.saturating_sub(self.free.len());
        self.slots.len().saturating_add(fresh) <= u32::MAX as usize
    }

    /// Makes room for `additional` more cells without reallocating.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = additional.saturating_sub(self.free.len());
        self.slots.try_reserve(needed)?;
        self.free.try_reserve(self.slots.len() + needed - self.free.len())
    }

    pub(crate) fn first(&self) -> CellId {
        self.next(CellId::HEAD)
    }

    pub(crate) fn next(&self, id: CellId) -> CellId {
        self.slots[id.index()].next
    }

    pub(crate) fn prev(&self, id: CellId) -> CellId {
        self.slots[id.index()].prev
    }

    pub(crate) fn is_sentinel(id: CellId) -> bool {
        id == CellId::HEAD || id == CellId::TAIL
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.index())?.cell.as_ref()
    }

    /// Links `cell` right after `at` and returns its handle.
    pub(crate) fn insert_after(&mut self, at: CellId, cell: Cell) -> CellId {
        debug_assert!(at != CellId::TAIL, "nothing goes after the tail");
        let next = self.next(at);
        let slot = Slot {
            prev: at,
            next,
            cell: Some(cell),
        };
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = slot;
                CellId(index)
            }
            None => {
                debug_assert!(self.has_handles_for(1), "cell handles exhausted");
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "edits check `has_handles_for` before growing the arena"
                )]
                let index = self.slots.len() as u32;
                self.slots.push(slot);
                CellId(index)
            }
        };
        self.slots[at.index()].next = id;
        self.slots[next.index()].prev = id;
        self.len += 1;
        id
    }

    pub(crate) fn insert_before(&mut self, at: CellId, cell: Cell) -> CellId {
        self.insert_after(self.prev(at), cell)
    }

    /// Unlinks a cell and hands it back so its platform context can be released.
    pub(crate) fn remove(&mut self, id: CellId) -> Cell {
        debug_assert!(!Self::is_sentinel(id), "sentinels are never removed");
        let Slot { prev, next, cell } = &mut self.slots[id.index()];
        let (prev, next) = (*prev, *next);
        let cell = cell.take().expect("cell was already removed");
        self.slots[prev.index()].next = next;
        self.slots[next.index()].prev = prev;
        self.free.push(id.0);
        self.len -= 1;
        cell
    }

    /// Splits a cell at a code unit offset.
    ///
    /// Returns the cell itself if `pos == 0` and the next cell if `pos` is at or past the end.
    /// Otherwise a new cell holding the tail is linked after it and returned; the tail inherits
    /// the end-of-line flag. Returns `None` for positions inside a surrogate pair or an object.
    pub(crate) fn split(&mut self, id: CellId, pos: usize) -> Option<CellId> {
        let cell = &mut self[id];
        if pos == 0 {
            return Some(id);
        }
        if pos >= cell.len() {
            return Some(self.next(id));
        }
        if cell.kind().is_object() || splits_pair(cell.text(), pos) {
            return None;
        }
        let mut tail = cell.split_off(pos);
        tail.set_eol(cell.is_eol());
        cell.set_eol(false);
        Some(self.insert_after(id, tail))
    }

    /// Like [`split`](Self::split), but at the end of the cell a new empty cell is created
    /// so the caller always gets a cell of its own after the split point.
    pub(crate) fn split_ex(&mut self, id: CellId, pos: usize) -> Option<CellId> {
        let cell = &mut self[id];
        if pos == 0 || pos < cell.len() {
            return self.split(id, pos);
        }
        let kind = if cell.kind() == CellKind::Ruby {
            CellKind::Ruby
        } else {
            CellKind::Normal
        };
        let mut tail = Cell::new(*cell.riched(), kind);
        tail.set_eol(cell.is_eol());
        cell.set_eol(false);
        Some(self.insert_after(id, tail))
    }

    /// Appends the next cell to this one if capacity, kind and style allow.
    ///
    /// Returns the absorbed cell.
    pub(crate) fn merge_with_next(&mut self, id: CellId) -> Option<Cell> {
        let next = self.next(id);
        if next == CellId::TAIL || !self[id].can_merge(&self[next]) {
            return None;
        }
        let absorbed = self.remove(next);
        self[id].append(&absorbed);
        Some(absorbed)
    }

    /// Removes text and unlinks the cell if it becomes empty.
    ///
    /// A cell ending its logical line is kept even when empty. Returns the unlinked cell, if any.
    pub(crate) fn remove_text_ex(
        &mut self,
        id: CellId,
        range: Range<usize>,
    ) -> Result<Option<Cell>, Error> {
        let cell = &mut self[id];
        if !cell.remove_text(range) {
            return Err(Error::new(ErrorKind::SurrogateSplit));
        }
        if cell.is_empty() && !cell.is_eol() {
            return Ok(Some(self.remove(id)));
        }
        Ok(None)
    }

    /// Iterates the handles in `from..to`.
    pub(crate) fn ids(&self, from: CellId, to: CellId) -> Ids<'_> {
        Ids {
            store: self,
            cur: from,
            end: to,
        }
    }

    /// Iterates all cells in document order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.ids(self.first(), CellId::TAIL).map(|id| &self[id])
    }
}

impl Index<CellId> for CellStore {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Cell {
        self.get(id).expect("no live cell for handle")
    }
}

impl IndexMut<CellId> for CellStore {
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        self.slots[id.index()]
            .cell
            .as_mut()
            .expect("no live cell for handle")
    }
}

/// Iterator over a half-open run of cell handles.
#[derive(Clone, Debug)]
pub(crate) struct Ids<'a> {
    store: &'a CellStore,
    cur: CellId,
    end: CellId,
}

impl Iterator for Ids<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<CellId> {
        if self.cur == self.end || self.cur == CellId::TAIL {
            return None;
        }
        let id = self.cur;
        self.cur = self.store.next(id);
        Some(id)
    }
}
