// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # RichED Dev
//!
//! This crate provides utilities for developing RichED: a deterministic [`TestPlatform`]
//! with fixed advances, a [`TestEnv`] wrapping a document over it, and [`init_logging`].

use riched::{
    Cell, CellContext, CellHitTest, CellKind, Changed, CharMetrics, DocInfo, DocInitArg,
    DocPoint, OomAction, Platform, Size, TextDocument,
};

/// Installs a `tracing` subscriber writing to the test output.
///
/// Filtering follows `RUST_LOG`. Calling it more than once is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Encodes a `&str` as UTF-16.
pub fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Shorthand for [`DocPoint::new`].
pub const fn pt(line: usize, pos: usize) -> DocPoint {
    DocPoint::new(line, pos)
}

/// One [`Platform::draw_context`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawn {
    /// Text of the drawn cell.
    pub text: String,
    /// Horizontal position of the cell inside its line.
    pub x: f32,
    /// Baseline the cell was drawn at.
    pub baseline: f32,
}

/// A platform where every code unit of text advances by half the font size.
///
/// Text cells are `size` tall with an ascent of `0.8 * size`; objects take their size from
/// their payload. Everything the engine reports is recorded for inspection.
#[derive(Debug, Default)]
pub struct TestPlatform {
    /// Every change notification, in order.
    pub events: Vec<Changed>,
    /// Every draw call, in order.
    pub drawn: Vec<Drawn>,
    /// Characters refused in password documents.
    pub rejected: Vec<char>,
    /// Stop text extraction once the sink would grow past this many code units.
    pub sink_limit: Option<usize>,
    /// Messages passed to [`Platform::debug_output`].
    pub debug: Vec<String>,
    /// Number of contexts created.
    pub recreated: usize,
    /// Number of contexts released.
    pub deleted: usize,
    /// Answer [`OomAction::Retry`] to this many out-of-memory reports, then give up.
    pub oom_retries: u32,
    /// The `retry` count of every out-of-memory report.
    pub oom_reports: Vec<u32>,
    next_handle: u64,
}

impl TestPlatform {
    /// Advance of one code unit of `cell`.
    pub fn advance(cell: &Cell) -> f32 {
        cell.riched().size * 0.5
    }

    /// Takes the recorded change notifications.
    pub fn take_events(&mut self) -> Vec<Changed> {
        core::mem::take(&mut self.events)
    }
}

impl Platform for TestPlatform {
    fn on_out_of_memory(&mut self, retry: u32) -> OomAction {
        self.oom_reports.push(retry);
        if self.oom_retries > 0 {
            self.oom_retries -= 1;
            OomAction::Retry
        } else {
            OomAction::Ignore
        }
    }

    fn value_changed(&mut self, changed: Changed) {
        self.events.push(changed);
    }

    fn is_valid_password(&mut self, ch: char) -> bool {
        !self.rejected.contains(&ch)
    }

    fn append_text(&mut self, sink: &mut Vec<u16>, text: &[u16]) -> bool {
        if self
            .sink_limit
            .is_some_and(|limit| sink.len() + text.len() > limit)
        {
            return false;
        }
        sink.extend_from_slice(text);
        true
    }

    fn recreate_context(&mut self, cell: &mut Cell, info: &DocInfo) {
        self.recreated += 1;
        self.next_handle += 1;
        match cell.payload() {
            Some(payload) => {
                let (width, height) = (payload.width, payload.height);
                cell.context = CellContext::Bitmap(self.next_handle);
                cell.metrics.width = width;
                info.valign.apply(height, height, &mut cell.metrics);
            }
            None => {
                let size = cell.riched().size;
                cell.context = CellContext::TextLayout(self.next_handle);
                cell.metrics.width = Self::advance(cell) * cell.len() as f32;
                info.valign.apply(size * 0.8, size, &mut cell.metrics);
            }
        }
        cell.metrics.bounding = riched::Rect {
            x: 0.0,
            y: -cell.metrics.ascent,
            width: cell.metrics.width,
            height: cell.metrics.ascent + cell.metrics.descent,
        };
    }

    fn delete_context(&mut self, cell: &mut Cell) {
        if cell.context != CellContext::None {
            self.deleted += 1;
            cell.context = CellContext::None;
        }
    }

    fn draw_context(&mut self, cell: &Cell, baseline: f32) {
        self.drawn.push(Drawn {
            text: String::from_utf16_lossy(cell.text()),
            x: cell.metrics.pos,
            baseline,
        });
    }

    fn hit_test(&mut self, cell: &Cell, offset: f32) -> CellHitTest {
        let len = cell.len();
        if len == 0 {
            return CellHitTest::default();
        }
        if cell.payload().is_some() {
            return CellHitTest {
                pos: 0,
                trailing: offset >= cell.metrics.width * 0.5,
                length: len as u32,
            };
        }
        let advance = Self::advance(cell);
        let text = cell.text();
        let mut pos = ((offset / advance).floor().max(0.0) as usize).min(len - 1);
        if pos > 0 && (0xDC00..0xE000).contains(&text[pos]) {
            pos -= 1;
        }
        let length = if (0xD800..0xDC00).contains(&text[pos]) && pos + 1 < len {
            2
        } else {
            1
        };
        CellHitTest {
            pos: pos as u32,
            trailing: offset - pos as f32 * advance >= advance * length as f32 * 0.5,
            length,
        }
    }

    fn char_metrics(&mut self, cell: &Cell, pos: u32) -> CharMetrics {
        if cell.payload().is_some() {
            let width = cell.metrics.width;
            return CharMetrics {
                width,
                offset: if pos == 0 { 0.0 } else { width },
            };
        }
        let advance = Self::advance(cell);
        CharMetrics {
            width: advance,
            offset: pos as f32 * advance,
        }
    }

    fn debug_output(&mut self, text: &str) {
        self.debug.push(text.into());
    }
}

/// A document over a [`TestPlatform`], with helpers for inspecting it.
#[derive(Debug)]
pub struct TestEnv {
    name: String,
    /// The document under test.
    pub doc: TextDocument<TestPlatform>,
}

impl TestEnv {
    /// A default document with a 1000 by 1000 viewport.
    pub fn new(name: &str) -> Self {
        Self::with_arg(name, DocInitArg::default())
    }

    /// A document with custom options and a 1000 by 1000 viewport.
    pub fn with_arg(name: &str, arg: DocInitArg) -> Self {
        init_logging();
        let mut doc = match TextDocument::new(TestPlatform::default(), arg) {
            Ok(doc) => doc,
            Err(err) => panic!("[{name}] document creation failed: {err}"),
        };
        doc.resize(Size {
            width: 1000.0,
            height: 1000.0,
        });
        doc.platform_mut().take_events();
        Self {
            name: name.into(),
            doc,
        }
    }

    /// The name the environment was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resizes the viewport.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.doc.resize(Size { width, height });
    }

    /// Inserts text at a point, panicking on failure.
    pub fn insert(&mut self, at: DocPoint, text: &str) -> DocPoint {
        match self.doc.insert_str(at, text, false) {
            Ok(end) => end,
            Err(err) => panic!("[{}] inserting {text:?} at {at} failed: {err}", self.name),
        }
    }

    /// Lays out down to the bottom of the viewport, panicking on failure.
    pub fn layout(&mut self) {
        if let Err(err) = self.doc.before_render() {
            panic!("[{}] layout failed: {err}", self.name);
        }
    }

    /// The whole text, lines separated by `'\n'`.
    pub fn text(&self) -> String {
        self.doc.text()
    }

    /// The text of every cell, in order.
    pub fn cell_texts(&self) -> Vec<String> {
        self.doc
            .cells()
            .map(|cell| String::from_utf16_lossy(cell.text()))
            .collect()
    }

    /// The kind of every cell, in order.
    pub fn cell_kinds(&self) -> Vec<CellKind> {
        self.doc.cells().map(|cell| cell.kind()).collect()
    }

    /// The text of every complete visual line.
    pub fn visual_texts(&self) -> Vec<String> {
        let complete = self.doc.visual_lines().len() - 1;
        (0..complete)
            .map(|index| {
                let units: Vec<u16> = self
                    .doc
                    .visual_line_cells(index)
                    .flat_map(|cell| cell.text().iter().copied())
                    .collect();
                String::from_utf16_lossy(&units)
            })
            .collect()
    }

    /// Takes the recorded change notifications.
    pub fn events(&mut self) -> Vec<Changed> {
        self.doc.platform_mut().take_events()
    }
}
