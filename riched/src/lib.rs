// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RichED is an embeddable rich text document engine.
//!
//! The engine owns the text content of a multi-line, per-character styled buffer together
//! with its paragraph structure, line wrapping, caret/selection addressing and undo history.
//! It never touches a screen, font rasterizer or input device: the host implements the narrow
//! [`Platform`] trait for glyph measurement, hit testing, drawing and text extraction.
//!
//! Content is stored as a sequence of [`Cell`]s, short runs of uniformly styled UTF-16 text
//! (or a single inline object), grouped into logical lines (paragraphs). Wrapped visual lines
//! are computed lazily on top of the logical lines.
//!
//! ## Example
//!
//! ```ignore
//! use riched::{DocInitArg, DocPoint, TextDocument};
//!
//! let mut doc = TextDocument::new(my_platform, DocInitArg::default())?;
//! doc.insert_str(DocPoint::new(0, 0), "Hello", false)?;
//! doc.insert_str(DocPoint::new(0, 2), "X", false)?;
//! assert_eq!(doc.text(), "HeXllo");
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): forwards `std` support to `tracing`.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

mod buffer;
mod document;
mod error;
mod undo;
mod util;

pub mod cell;
pub mod config;
pub mod platform;
pub mod style;

pub use cell::{Cell, CellContext, CellKind, CellMetrics, InlineInfo, InlinePayload, CELL_CAPACITY};
pub use config::{DocFlags, DocInfo, DocInitArg, LineFeed, VAlign, WrapMode};
pub use document::{DocPoint, DocRange, Point, Rect, Size, TextDocument, VisualLine};
pub use error::{Error, ErrorKind};
pub use platform::{CellHitTest, Changed, CharMetrics, OomAction, Platform};
pub use style::{Color, Effect, FlagSet, FontFlags, RichData, StyleProperty};
pub use util::{count_chars, is_cjk};
