// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

bitflags::bitflags! {
    /// Decorations drawn on top of the glyphs.
    ///
    /// Toggling one still remeasures the cell, since the platform may bake it into the
    /// text layout it creates.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Effect: u16 {
        /// Underline decoration.
        const UNDERLINE = 1 << 0;
        /// Strikethrough decoration.
        const STRIKETHROUGH = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Font selection flags.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FontFlags: u16 {
        /// Italic or oblique face.
        const ITALIC = 1 << 0;
        /// Bold face.
        const BOLD = 1 << 1;
    }
}

/// A packed `0xAARRGGBB` color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);

    /// Creates an opaque color from its red, green and blue components.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 0xFF)
    }

    /// Creates a color from its components.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Returns `[r, g, b, a]`.
    pub const fn to_rgba8(self) -> [u8; 4] {
        let [a, r, g, b] = self.0.to_be_bytes();
        [r, g, b, a]
    }
}

/// Per-cell style.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RichData {
    /// Font size in document units.
    pub size: f32,
    /// Index into the host's font family table.
    pub font: u16,
    /// Text color.
    pub color: Color,
    /// Decorations.
    pub effect: Effect,
    /// Font selection flags.
    pub flags: FontFlags,
}

impl Default for RichData {
    fn default() -> Self {
        Self {
            size: 16.0,
            font: 0,
            color: Color::BLACK,
            effect: Effect::empty(),
            flags: FontFlags::empty(),
        }
    }
}

/// How a boolean style flag is assigned over a range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FlagSet {
    /// Clear the flag everywhere in range.
    False,
    /// Set the flag everywhere in range.
    True,
    /// Clear the flag if it is set at both ends of the range, otherwise set it.
    #[default]
    Toggle,
}

/// A single style change applied over a range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StyleProperty {
    /// Replace the whole style.
    RichData(RichData),
    /// Font size.
    FontSize(f32),
    /// Text color.
    Color(Color),
    /// Font family index.
    FontName(u16),
    /// Underline decoration.
    Underline(FlagSet),
    /// Italic face.
    Italic(FlagSet),
}

impl StyleProperty {
    /// Whether applying this property can change measured metrics.
    pub fn affects_metrics(&self) -> bool {
        !matches!(self, Self::Color(_))
    }

    /// Turns a [`FlagSet::Toggle`] into a concrete assignment, given the styles at both ends of the range.
    pub(crate) fn resolve_toggle(self, first: &RichData, last: &RichData) -> Self {
        match self {
            Self::Underline(FlagSet::Toggle) => {
                let on = first.effect.contains(Effect::UNDERLINE)
                    && last.effect.contains(Effect::UNDERLINE);
                Self::Underline(if on { FlagSet::False } else { FlagSet::True })
            }
            Self::Italic(FlagSet::Toggle) => {
                let on =
                    first.flags.contains(FontFlags::ITALIC) && last.flags.contains(FontFlags::ITALIC);
                Self::Italic(if on { FlagSet::False } else { FlagSet::True })
            }
            other => other,
        }
    }

    /// Applies a resolved property.
    ///
    /// Returns `true` if `data` changed.
    pub(crate) fn apply(&self, data: &mut RichData) -> bool {
        let before = *data;
        match *self {
            Self::RichData(rd) => *data = rd,
            Self::FontSize(size) => data.size = size,
            Self::Color(color) => data.color = color,
            Self::FontName(font) => data.font = font,
            Self::Underline(set) => {
                data.effect.set(Effect::UNDERLINE, set == FlagSet::True);
            }
            Self::Italic(set) => {
                data.flags.set(FontFlags::ITALIC, set == FlagSet::True);
            }
        }
        *data != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_components() {
        let c = Color::from_rgba8(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x7812_3456);
        assert_eq!(c.to_rgba8(), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn toggle_clears_only_when_set_on_both_ends() {
        let plain = RichData::default();
        let mut underlined = plain;
        underlined.effect |= Effect::UNDERLINE;

        let toggle = StyleProperty::Underline(FlagSet::Toggle);
        assert_eq!(
            toggle.resolve_toggle(&underlined, &underlined),
            StyleProperty::Underline(FlagSet::False)
        );
        assert_eq!(
            toggle.resolve_toggle(&underlined, &plain),
            StyleProperty::Underline(FlagSet::True)
        );

        let mut data = plain;
        assert!(StyleProperty::Underline(FlagSet::True).apply(&mut data));
        assert!(!StyleProperty::Underline(FlagSet::True).apply(&mut data));
        assert!(data.effect.contains(Effect::UNDERLINE));
    }

    #[test]
    fn only_color_keeps_metrics() {
        assert!(!StyleProperty::Color(Color::BLACK).affects_metrics());
        assert!(StyleProperty::FontSize(12.0).affects_metrics());
        assert!(StyleProperty::Italic(FlagSet::True).affects_metrics());
    }
}
