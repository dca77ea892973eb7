//! RTF document type definitions.

use crate::common::unit::{inch_to_pt, mm_to_pt};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// RTF color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub red: u8,
    /// Green component (0-255)
    pub green: u8,
    /// Blue component (0-255)
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_rgb(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Black color.
    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// White color.
    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }
}

/// Interned handle into a document's font table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontDescriptor(pub(crate) usize);

impl FontDescriptor {
    /// Index written after `\f`.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Interned handle into a document's color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorDescriptor(pub(crate) usize);

impl ColorDescriptor {
    /// Index written after `\cf`, `\cb`, `\clcbpat` and friends.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Left-aligned
    #[default]
    Left,
    /// Right-aligned
    Right,
    /// Centered
    Center,
    /// Justified
    FullyJustify,
    /// Distributed
    Distributed,
}

impl Alignment {
    /// Paragraph alignment control word.
    pub(crate) fn paragraph_word(self) -> &'static str {
        match self {
            Alignment::Left => "ql",
            Alignment::Right => "qr",
            Alignment::Center => "qc",
            Alignment::FullyJustify => "qj",
            Alignment::Distributed => "qd",
        }
    }

    /// Table row alignment control word.
    pub(crate) fn row_word(self) -> &'static str {
        match self {
            Alignment::Right => "trqr",
            Alignment::Center => "trqc",
            _ => "trql",
        }
    }
}

/// Vertical alignment of table cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub(crate) fn cell_word(self) -> &'static str {
        match self {
            VerticalAlignment::Top => "clvertalt",
            VerticalAlignment::Middle => "clvertalc",
            VerticalAlignment::Bottom => "clvertalb",
        }
    }
}

/// One edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// All edges in rendering order.
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];
}

/// Margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Same margin on every edge.
    #[inline]
    pub const fn uniform(pt: f32) -> Self {
        Self {
            top: pt,
            right: pt,
            bottom: pt,
            left: pt,
        }
    }

    #[inline]
    pub fn get(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    #[inline]
    pub fn set(&mut self, direction: Direction, pt: f32) {
        match direction {
            Direction::Top => self.top = pt,
            Direction::Right => self.right = pt,
            Direction::Bottom => self.bottom = pt,
            Direction::Left => self.left = pt,
        }
    }
}

/// Paper size of a document or section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    /// Arbitrary size, width and height in points
    Custom { width: f32, height: f32 },
}

impl PaperSize {
    /// Portrait width in points.
    pub fn width(self) -> f32 {
        match self {
            PaperSize::A4 => mm_to_pt(210.0),
            PaperSize::A3 => mm_to_pt(297.0),
            PaperSize::A5 => mm_to_pt(148.0),
            PaperSize::Letter | PaperSize::Legal => inch_to_pt(8.5),
            PaperSize::Custom { width, .. } => width,
        }
    }

    /// Portrait height in points.
    pub fn height(self) -> f32 {
        match self {
            PaperSize::A4 => mm_to_pt(297.0),
            PaperSize::A3 => mm_to_pt(420.0),
            PaperSize::A5 => mm_to_pt(210.0),
            PaperSize::Letter => inch_to_pt(11.0),
            PaperSize::Legal => inch_to_pt(14.0),
            PaperSize::Custom { height, .. } => height,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Windows language identifier written as `\deflang`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcid(pub u16);

impl Lcid {
    pub const ENGLISH_US: Lcid = Lcid(1033);
    pub const ENGLISH_UK: Lcid = Lcid(2057);
    pub const GERMAN: Lcid = Lcid(1031);
    pub const FRENCH: Lcid = Lcid(1036);
    pub const TRADITIONAL_CHINESE: Lcid = Lcid(1028);
    pub const SIMPLIFIED_CHINESE: Lcid = Lcid(2052);
    pub const JAPANESE: Lcid = Lcid(1041);
}

impl Default for Lcid {
    fn default() -> Self {
        Lcid::ENGLISH_US
    }
}

bitflags! {
    /// Character style flags.
    ///
    /// A [`crate::rtf::CharFormat`] keeps two of these sets, one for flags it
    /// turns on and one for flags it turns off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 0x01;
        const ITALIC = 0x02;
        const UNDERLINE = 0x04;
        const STRIKE = 0x08;
        const SUPER = 0x10;
        const SUB = 0x20;
        const SMALL_CAPS = 0x40;
    }
}

impl FontStyle {
    /// Control words that switch a single flag on and off, in emit order.
    pub(crate) fn control_words(self) -> Option<(&'static str, &'static str)> {
        let words = match self {
            s if s == FontStyle::BOLD => ("b", "b0"),
            s if s == FontStyle::ITALIC => ("i", "i0"),
            s if s == FontStyle::UNDERLINE => ("ul", "ulnone"),
            s if s == FontStyle::STRIKE => ("strike", "strike0"),
            s if s == FontStyle::SUPER => ("super", "nosupersub"),
            s if s == FontStyle::SUB => ("sub", "nosupersub"),
            s if s == FontStyle::SMALL_CAPS => ("scaps", "scaps0"),
            _ => return None,
        };
        Some(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgb() {
        assert_eq!(Color::from_rgb(0xFF8000), Color::new(255, 128, 0));
        assert_eq!(Color::from_rgb(0), Color::black());
    }

    #[test]
    fn test_paper_sizes() {
        assert!((PaperSize::Letter.width() - 612.0).abs() < 1e-3);
        assert!((PaperSize::Letter.height() - 792.0).abs() < 1e-3);
        assert!(PaperSize::A4.height() > PaperSize::A4.width());
        let custom = PaperSize::Custom {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(custom.width(), 100.0);
        assert_eq!(custom.height(), 50.0);
    }

    #[test]
    fn test_margins_by_direction() {
        let mut margins = Margins::uniform(10.0);
        margins.set(Direction::Left, 20.0);
        assert_eq!(margins.get(Direction::Left), 20.0);
        assert_eq!(margins.get(Direction::Top), 10.0);
    }

    #[test]
    fn test_style_control_words() {
        assert_eq!(FontStyle::BOLD.control_words(), Some(("b", "b0")));
        assert_eq!(FontStyle::UNDERLINE.control_words(), Some(("ul", "ulnone")));
        assert_eq!((FontStyle::BOLD | FontStyle::ITALIC).control_words(), None);
    }
}
