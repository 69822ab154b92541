// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `riched`.
//!
//! - The `util` module contains shared utility functions that are needed by different
//!   test methods.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that shared helpers only need to be defined once.
//! - If you want to add new tests, try to follow these guidelines:
//!   - If your test can be classified to a clear "topic" (e.g. gui, undo, etc.), put
//!     it into the corresponding module, or create a new one in case it doesn't exist yet.
//!   - If it cannot be classified cleanly, for now you can just put it into `basic.rs`.
//!   - Tests for bugs should go into `issues.rs`.
//!   - For test naming, put the "topic" of the test at the start of the name instead of
//!     the end. For example, `gui_move_left` is better than `move_left_gui`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod edit;
mod issues;
mod layout;
mod ruby;
mod styles;
#[macro_use]
mod util;
