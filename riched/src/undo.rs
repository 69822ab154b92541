// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The undo/redo log.
//!
//! Records live in one deque split by a cursor: records before `top` have been applied,
//! records at or after it have been undone and can be redone. A record whose `continues`
//! flag is set belongs to the same user-visible step as the record before it.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{CellKind, DocPoint, InlinePayload, RichData};

/// A captured piece of one cell.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Run {
    pub(crate) kind: CellKind,
    pub(crate) riched: RichData,
    pub(crate) text: Vec<u16>,
    pub(crate) payload: Option<Box<InlinePayload>>,
    /// A line break follows this run.
    pub(crate) eol: bool,
}

/// The style of a single-line range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct StyleSpan {
    pub(crate) begin: DocPoint,
    pub(crate) end: DocPoint,
    pub(crate) riched: RichData,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum UndoOp {
    /// `content` was inserted at `begin`, ending at `end`.
    InsertText {
        begin: DocPoint,
        end: DocPoint,
        content: Vec<Run>,
    },
    /// `content` was removed from `begin..end`.
    RemoveText {
        begin: DocPoint,
        end: DocPoint,
        content: Vec<Run>,
    },
    /// Styles changed from `before` to `after`.
    RestyleRange {
        before: Vec<StyleSpan>,
        after: Vec<StyleSpan>,
    },
}

/// Anchor and caret at some point in time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) anchor: DocPoint,
    pub(crate) caret: DocPoint,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UndoRecord {
    pub(crate) continues: bool,
    pub(crate) before: Snapshot,
    pub(crate) after: Snapshot,
    pub(crate) op: UndoOp,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct UndoStack {
    records: VecDeque<UndoRecord>,
    top: usize,
    depth: usize,
}

impl UndoStack {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            records: VecDeque::new(),
            top: 0,
            depth,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.top > 0
    }

    pub(crate) fn can_redo(&self) -> bool {
        self.top < self.records.len()
    }

    /// Number of user-visible steps in the log.
    pub(crate) fn steps(&self) -> usize {
        self.records.iter().filter(|r| !r.continues).count()
    }

    /// Adds a record, discarding anything that was undone and evicting the oldest steps
    /// beyond the configured depth.
    pub(crate) fn push(&mut self, record: UndoRecord) {
        if !self.is_enabled() {
            return;
        }
        self.records.truncate(self.top);
        // A continuation can't attach to a step that was evicted or never existed.
        let continues = record.continues && !self.records.is_empty();
        self.records.push_back(UndoRecord { continues, ..record });
        while self.steps() > self.depth {
            self.records.pop_front();
            while self.records.front().is_some_and(|r| r.continues) {
                self.records.pop_front();
            }
        }
        self.top = self.records.len();
    }

    /// Sets the caret snapshot taken after the latest step completed.
    pub(crate) fn seal(&mut self, after: Snapshot) {
        if self.top == self.records.len() {
            if let Some(last) = self.records.back_mut() {
                last.after = after;
            }
        }
    }

    /// The records of the step to undo, in the order they were applied.
    ///
    /// Moves the cursor before the step.
    pub(crate) fn undo_step(&mut self) -> Option<Range<usize>> {
        if self.top == 0 {
            return None;
        }
        let end = self.top;
        let mut start = end - 1;
        while start > 0 && self.records[start].continues {
            start -= 1;
        }
        self.top = start;
        tracing::debug!(records = end - start, "undo step");
        Some(start..end)
    }

    /// The records of the step to redo, in the order they were applied.
    ///
    /// Moves the cursor past the step.
    pub(crate) fn redo_step(&mut self) -> Option<Range<usize>> {
        if self.top == self.records.len() {
            return None;
        }
        let start = self.top;
        let mut end = start + 1;
        while end < self.records.len() && self.records[end].continues {
            end += 1;
        }
        self.top = end;
        tracing::debug!(records = end - start, "redo step");
        Some(start..end)
    }

    pub(crate) fn get(&self, index: usize) -> &UndoRecord {
        &self.records[index]
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.top = 0;
    }
}
