// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::DocPoint;

/// Error type for document operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus, when relevant, the document
/// points the caller passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The first point of the caller-provided position or range.
    begin: Option<DocPoint>,

    /// The end point of the caller-provided range.
    end: Option<DocPoint>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The position (or range start) the failing call was given, if any.
    pub fn begin(&self) -> Option<DocPoint> {
        self.begin
    }

    /// The range end the failing call was given, if any.
    pub fn end(&self) -> Option<DocPoint> {
        self.end
    }

    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            begin: None,
            end: None,
        }
    }

    pub(crate) fn at(kind: ErrorKind, point: DocPoint) -> Self {
        Self {
            kind,
            begin: Some(point),
            end: None,
        }
    }

    pub(crate) fn range(kind: ErrorKind, begin: DocPoint, end: DocPoint) -> Self {
        Self {
            kind,
            begin: Some(begin),
            end: Some(end),
        }
    }

    pub(crate) fn out_of_memory() -> Self {
        Self::new(ErrorKind::OutOfMemory)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::OutOfMemory => write!(f, "allocation failed and the platform gave up"),
            ErrorKind::LineOutOfRange => match self.begin {
                Some(p) => write!(f, "logical line {} does not exist", p.line),
                None => write!(f, "logical line out of range"),
            },
            ErrorKind::EmptyRange => match (self.begin, self.end) {
                (Some(b), Some(e)) => write!(f, "range {b}..{e} is empty or reversed"),
                _ => write!(f, "empty range"),
            },
            ErrorKind::SurrogateSplit => match self.begin {
                Some(p) => write!(f, "position {p} falls inside a UTF-16 surrogate pair"),
                None => write!(f, "operation would split a UTF-16 surrogate pair"),
            },
            ErrorKind::InsideInlineObject => match self.begin {
                Some(p) => write!(f, "position {p} falls inside an inline object"),
                None => write!(f, "operation would split an inline object"),
            },
            ErrorKind::LineFeedInRuby => write!(f, "ruby text must not contain line feeds"),
            ErrorKind::EmptyText => write!(f, "text must not be empty"),
            ErrorKind::ReadOnly => write!(f, "document is read-only"),
            ErrorKind::Unsupported => write!(f, "operation is not supported in this configuration"),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A table or cell could not be allocated and the platform's
    /// [`on_out_of_memory`](crate::Platform::on_out_of_memory) policy gave up.
    OutOfMemory,

    /// The logical line of a [`DocPoint`] does not exist.
    LineOutOfRange,

    /// After clamping, the range end was not after the range start.
    EmptyRange,

    /// A position would cut a UTF-16 surrogate pair in half.
    SurrogateSplit,

    /// A position falls strictly inside a multi-unit inline object.
    InsideInlineObject,

    /// Ruby annotation text contained a line feed.
    LineFeedInRuby,

    /// Ruby annotation text was empty.
    EmptyText,

    /// The document was created read-only.
    ReadOnly,

    /// The requested feature is not implemented for this configuration
    /// (for example hit testing with a fixed line height).
    Unsupported,
}
