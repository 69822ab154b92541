// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host interface consumed by the engine.

use alloc::vec::Vec;

use crate::{Cell, DocInfo};

/// What to do after an allocation failed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OomAction {
    /// Try the allocation again.
    Retry,
    /// Give up; the operation fails with [`ErrorKind::OutOfMemory`](crate::ErrorKind::OutOfMemory).
    #[default]
    Ignore,
}

/// Document state that changed during a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Changed {
    /// The view needs a redraw.
    View,
    /// The selection changed.
    Selection,
    /// The caret moved.
    Caret,
    /// The text content changed.
    Text,
    /// The estimated content width changed.
    EstimatedWidth,
    /// The estimated content height changed.
    EstimatedHeight,
}

/// Result of hit testing inside one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellHitTest {
    /// Code unit offset of the hit cluster.
    pub pos: u32,
    /// Whether the point is on the trailing half of the cluster.
    pub trailing: bool,
    /// Length of the hit cluster in code units.
    pub length: u32,
}

/// Geometry of one character inside a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CharMetrics {
    /// Advance of the character.
    pub width: f32,
    /// Distance from the cell's start to the character's leading edge.
    pub offset: f32,
}

/// Measurement, drawing and policy callbacks supplied by the host.
///
/// All callbacks run synchronously on the caller's stack. Implementations must not
/// call back into the document that invoked them.
pub trait Platform {
    /// Called after an allocation failed; `retry` counts previous attempts for the same allocation.
    fn on_out_of_memory(&mut self, retry: u32) -> OomAction {
        let _ = retry;
        OomAction::Ignore
    }

    /// Notification that some document state changed.
    fn value_changed(&mut self, changed: Changed);

    /// Whether `ch` may be typed into a password document.
    fn is_valid_password(&mut self, ch: char) -> bool {
        let _ = ch;
        true
    }

    /// Appends extracted text to `sink`; returning `false` stops the extraction.
    fn append_text(&mut self, sink: &mut Vec<u16>, text: &[u16]) -> bool {
        sink.extend_from_slice(text);
        true
    }

    /// Rebuilds the layout context of a dirty cell and fills in [`Cell::metrics`].
    ///
    /// Only `width`, `ascent`, `descent` and `bounding` need to be written; the engine
    /// owns the position fields.
    fn recreate_context(&mut self, cell: &mut Cell, info: &DocInfo);

    /// Releases the layout context of a cell that is going away or becoming dirty.
    fn delete_context(&mut self, cell: &mut Cell);

    /// Draws one cell with its baseline at `baseline` in document space.
    fn draw_context(&mut self, cell: &Cell, baseline: f32);

    /// Maps `offset`, measured from the cell's leading edge, to a position inside the cell.
    fn hit_test(&mut self, cell: &Cell, offset: f32) -> CellHitTest;

    /// Returns the geometry of the character at code unit `pos` of the cell.
    fn char_metrics(&mut self, cell: &Cell, pos: u32) -> CharMetrics;

    /// Diagnostic sink, only called in debug builds.
    fn debug_output(&mut self, text: &str) {
        let _ = text;
    }
}
