//! RTF border support for table cells and horizontal lines.

use super::types::{ColorDescriptor, Direction};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_twip;

/// Border style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    /// No border
    #[default]
    None,
    /// Single line border
    Single,
    /// Dotted border
    Dotted,
    /// Dashed border
    Dashed,
    /// Double line border
    Double,
}

impl BorderStyle {
    fn control_word(self) -> Option<&'static str> {
        match self {
            BorderStyle::None => None,
            BorderStyle::Single => Some("brdrs"),
            BorderStyle::Dotted => Some("brdrdot"),
            BorderStyle::Dashed => Some("brdrdash"),
            BorderStyle::Double => Some("brdrdb"),
        }
    }
}

/// Border definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Border {
    /// Border style
    pub style: BorderStyle,
    /// Border width (in twips)
    pub width: i32,
    /// Border color, `None` for the automatic color
    pub color: Option<ColorDescriptor>,
}

impl Border {
    /// Create a border with a width given in points.
    #[inline]
    pub fn new(style: BorderStyle, width_pt: f32, color: Option<ColorDescriptor>) -> Self {
        Self {
            style,
            width: pt_to_twip(width_pt),
            color,
        }
    }

    /// Single half-point black border.
    #[inline]
    pub fn single() -> Self {
        Self::new(BorderStyle::Single, 0.5, None)
    }

    /// Check if border is visible
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0
    }

    /// Whether two borders draw the same stroke. Color is not compared.
    #[inline]
    pub fn same_stroke(&self, other: &Border) -> bool {
        self.style == other.style && self.width == other.width
    }

    /// Write `\brdrw`, the style word and the color, after the edge word.
    pub(crate) fn write_properties(&self, out: &mut RtfWriter) {
        let Some(style_word) = self.style.control_word() else {
            return;
        };
        out.control_word("brdrw", Some(self.width as i64));
        out.control_word(style_word, None);
        if let Some(color) = self.color {
            out.control_word("brdrcf", Some(color.index() as i64));
        }
    }
}

/// Borders for a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    /// Top border
    pub top: Border,
    /// Right border
    pub right: Border,
    /// Bottom border
    pub bottom: Border,
    /// Left border
    pub left: Border,
}

impl Borders {
    /// Set all borders to the same style
    #[inline]
    pub fn all(border: Border) -> Self {
        Self {
            top: border,
            right: border,
            bottom: border,
            left: border,
        }
    }

    #[inline]
    pub fn get(&self, direction: Direction) -> &Border {
        match direction {
            Direction::Top => &self.top,
            Direction::Right => &self.right,
            Direction::Bottom => &self.bottom,
            Direction::Left => &self.left,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, direction: Direction) -> &mut Border {
        match direction {
            Direction::Top => &mut self.top,
            Direction::Right => &mut self.right,
            Direction::Bottom => &mut self.bottom,
            Direction::Left => &mut self.left,
        }
    }

    /// Check if any border is visible
    #[inline]
    pub fn has_any_border(&self) -> bool {
        Direction::ALL.iter().any(|&d| self.get(d).is_visible())
    }

    /// Write the visible edges using the given edge words (top, right, bottom, left).
    pub(crate) fn write_edges(&self, out: &mut RtfWriter, edge_words: [&str; 4]) {
        for (direction, word) in Direction::ALL.into_iter().zip(edge_words) {
            let border = self.get(direction);
            if border.is_visible() {
                out.control_word(word, None);
                border.write_properties(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_width_in_twips() {
        let border = Border::new(BorderStyle::Single, 1.5, None);
        assert_eq!(border.width, 30);
        assert!(border.is_visible());
        assert!(!Border::default().is_visible());
    }

    #[test]
    fn test_same_stroke_ignores_color() {
        let plain = Border::new(BorderStyle::Dotted, 1.0, None);
        let red = Border::new(BorderStyle::Dotted, 1.0, Some(ColorDescriptor(3)));
        let thick = Border::new(BorderStyle::Dotted, 2.0, None);
        assert!(plain.same_stroke(&red));
        assert_ne!(plain, red);
        assert!(!plain.same_stroke(&thick));
    }

    #[test]
    fn test_write_cell_edges() {
        let mut borders = Borders::default();
        borders.top = Border::new(BorderStyle::Single, 1.0, Some(ColorDescriptor(2)));
        borders.left = Border::new(BorderStyle::Double, 0.5, None);

        let mut out = RtfWriter::new();
        borders.write_edges(&mut out, ["clbrdrt", "clbrdrr", "clbrdrb", "clbrdrl"]);
        assert_eq!(
            out.finish(),
            "\\clbrdrt\\brdrw20\\brdrs\\brdrcf2\\clbrdrl\\brdrw10\\brdrdb"
        );
    }
}
