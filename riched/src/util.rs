// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UTF-16 helpers and character classification.

use alloc::vec::Vec;

use smallvec::SmallVec;

/// One bit per 0x100-aligned block of the first four planes, set for blocks
/// of unified ideographs and their extensions.
#[rustfmt::skip]
const CJK_LUT: [u32; 32] = [
    0x0000_0000, 0xfffc_0000, 0xffff_ffff, 0xffff_ffff,
    0xffff_ffff, 0x0000_0000, 0x0000_0000, 0x0600_0000,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
    0xffff_ffff, 0xffff_ffff, 0xffff_ffff, 0xffff_ffff,
    0xffff_ffff, 0xffff_ffff, 0xffff_ffff, 0x0700_0fff,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
];

pub(crate) const LINE_FEED: u16 = b'\n' as u16;
pub(crate) const CARRIAGE_RETURN: u16 = b'\r' as u16;
pub(crate) const SPACE: u16 = b' ' as u16;

#[inline]
pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    unit & 0xFC00 == 0xD800
}

#[inline]
pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    unit & 0xFC00 == 0xDC00
}

/// Decodes a surrogate pair into its code point.
#[inline]
pub(crate) fn from_surrogates(high: u16, low: u16) -> u32 {
    debug_assert!(is_high_surrogate(high), "illegal leading surrogate");
    debug_assert!(is_low_surrogate(low), "illegal trailing surrogate");
    (((u32::from(high) - 0xD800) << 10) | (u32::from(low) - 0xDC00)) + 0x10000
}

/// Returns `true` if cutting `text` at `index` would separate a surrogate pair.
#[inline]
pub(crate) fn splits_pair(text: &[u16], index: usize) -> bool {
    index > 0
        && index < text.len()
        && is_high_surrogate(text[index - 1])
        && is_low_surrogate(text[index])
}

/// Returns whether a code point is classified as CJK for line breaking.
///
/// Classification is per 0x100-aligned block.
pub fn is_cjk(ch: u32) -> bool {
    let block = (ch & 0x3ffff) >> 8;
    let index = (block >> 5) as usize;
    let mask = 1_u32 << (block & 0x1f);
    CJK_LUT[index] & mask != 0
}

/// Counts the code points in a UTF-16 slice.
///
/// A well-formed surrogate pair counts once; an unpaired surrogate also counts once.
pub fn count_chars(text: &[u16]) -> usize {
    char::decode_utf16(text.iter().copied()).count()
}

/// Returns the code point ending just before `index`, together with its length in units.
pub(crate) fn char_before(text: &[u16], index: usize) -> Option<(u32, usize)> {
    if index == 0 || index > text.len() {
        return None;
    }
    let last = text[index - 1];
    if is_low_surrogate(last) && index >= 2 && is_high_surrogate(text[index - 2]) {
        Some((from_surrogates(text[index - 2], last), 2))
    } else {
        Some((u32::from(last), 1))
    }
}

/// Returns the code point starting at `index`, together with its length in units.
pub(crate) fn char_at(text: &[u16], index: usize) -> Option<(u32, usize)> {
    let first = *text.get(index)?;
    match text.get(index + 1) {
        Some(&next) if is_high_surrogate(first) && is_low_surrogate(next) => {
            Some((from_surrogates(first, next), 2))
        }
        _ => Some((u32::from(first), 1)),
    }
}

/// Splits text into the segments between line feeds.
///
/// A carriage return directly before a line feed belongs to the terminator and is dropped.
/// The result always has one more entry than `text` has line feeds.
pub(crate) fn split_lines(text: &[u16]) -> SmallVec<[&[u16]; 4]> {
    let mut lines = SmallVec::new();
    let mut rest = text;
    while let Some(lf) = rest.iter().position(|&unit| unit == LINE_FEED) {
        let mut line = &rest[..lf];
        if let [head @ .., CARRIAGE_RETURN] = line {
            line = head;
        }
        lines.push(line);
        rest = &rest[lf + 1..];
    }
    lines.push(rest);
    lines
}

/// The longest prefix of `text` no longer than `max` units that ends on a code point boundary.
pub(crate) fn prefix_len(text: &[u16], max: usize) -> usize {
    let len = max.min(text.len());
    if splits_pair(text, len) {
        len - 1
    } else {
        len
    }
}

/// The longest suffix of `text` no longer than `max` units that starts on a code point boundary.
pub(crate) fn suffix_len(text: &[u16], max: usize) -> usize {
    let len = max.min(text.len());
    if splits_pair(text, text.len() - len) {
        len - 1
    } else {
        len
    }
}

/// Encodes a `&str` as UTF-16.
pub(crate) fn to_utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}
