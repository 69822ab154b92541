// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document configuration.

use crate::{CellMetrics, RichData};

/// Vertical placement of a cell's content inside its measured height.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    /// Align on the font baseline.
    #[default]
    Baseline,
    /// Hang the content from the line's ascender.
    Ascender,
    /// Center the content.
    Middle,
    /// Stand the content on the line's descender.
    Descender,
}

impl VAlign {
    /// Splits a measured `height` with the given `ascent` into the cell's ascent and descent.
    ///
    /// Platforms call this from [`recreate_context`](crate::Platform::recreate_context).
    pub fn apply(self, ascent: f32, height: f32, metrics: &mut CellMetrics) {
        let (ascent, descent) = match self {
            Self::Baseline => (ascent, height - ascent),
            Self::Ascender => (0.0, height),
            Self::Middle => (height * 0.5, height * 0.5),
            Self::Descender => (height, 0.0),
        };
        metrics.ascent = ascent;
        metrics.descent = descent;
    }
}

/// Where a visual line may break.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Never wrap.
    NoWrap,
    /// Break at spaces only.
    SpaceOnly,
    /// Break at spaces or next to CJK characters.
    #[default]
    SpaceOrCjk,
    /// Break at any character.
    Anywhere,
}

/// Terminator emitted between logical lines when extracting text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineFeed {
    /// `"\n"`.
    #[default]
    Lf,
    /// `"\r\n"`.
    CrLf,
}

impl LineFeed {
    /// The terminator as UTF-16 code units.
    pub fn as_utf16(self) -> &'static [u16] {
        match self {
            Self::Lf => &[0x0A],
            Self::CrLf => &[0x0D, 0x0A],
        }
    }
}

bitflags::bitflags! {
    /// Boolean document options.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct DocFlags: u16 {
        /// Per-character styling is honored.
        const RICH_TEXT = 1 << 0;
        /// Line feeds create new logical lines.
        const MULTI_LINE = 1 << 1;
        /// GUI editing operations are rejected.
        const READ_ONLY = 1 << 2;
        /// Input is masked and filtered through the platform's password check.
        const PASSWORD = 1 << 3;
        /// Every visual line has the same height.
        const FIXED_LINE_HEIGHT = 1 << 4;
    }
}

/// Options for creating a [`TextDocument`](crate::TextDocument).
#[derive(Clone, Debug, PartialEq)]
pub struct DocInitArg {
    /// Honor per-character styling.
    pub rich_text: bool,
    /// Allow more than one logical line.
    pub multi_line: bool,
    /// Reject GUI editing operations.
    pub read_only: bool,
    /// Mask character for password documents.
    pub password: Option<char>,
    /// Line height used for every visual line, if fixed.
    pub fixed_line_height: Option<f32>,
    /// Vertical alignment passed on to the platform.
    pub valign: VAlign,
    /// Line breaking policy.
    pub wrap_mode: WrapMode,
    /// Terminator used by text extraction.
    pub line_feed: LineFeed,
    /// Style of newly created text.
    pub default_style: RichData,
    /// Maximum number of undo steps kept; `0` disables the undo log.
    pub undo_depth: usize,
}

impl Default for DocInitArg {
    fn default() -> Self {
        Self {
            rich_text: true,
            multi_line: true,
            read_only: false,
            password: None,
            fixed_line_height: None,
            valign: VAlign::Baseline,
            wrap_mode: WrapMode::SpaceOrCjk,
            line_feed: LineFeed::Lf,
            default_style: RichData::default(),
            undo_depth: 100,
        }
    }
}

/// Immutable document options, handed to the platform during measurement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DocInfo {
    /// Boolean options.
    pub flags: DocFlags,
    /// Mask character for password documents.
    pub password: char,
    /// Fixed line height, `0.0` if not fixed.
    pub fixed_line_height: f32,
    /// Vertical alignment.
    pub valign: VAlign,
    /// Line breaking policy.
    pub wrap_mode: WrapMode,
}

impl From<&DocInitArg> for DocInfo {
    fn from(arg: &DocInitArg) -> Self {
        let mut flags = DocFlags::empty();
        flags.set(DocFlags::RICH_TEXT, arg.rich_text);
        flags.set(DocFlags::MULTI_LINE, arg.multi_line);
        flags.set(DocFlags::READ_ONLY, arg.read_only);
        flags.set(DocFlags::PASSWORD, arg.password.is_some());
        flags.set(DocFlags::FIXED_LINE_HEIGHT, arg.fixed_line_height.is_some());
        Self {
            flags,
            password: arg.password.unwrap_or('*'),
            fixed_line_height: arg.fixed_line_height.unwrap_or(0.0),
            valign: arg.valign,
            wrap_mode: arg.wrap_mode,
        }
    }
}
