//! Character formatting.
//!
//! A [`CharFormat`] is a formatting intent: every property is optional, and
//! style flags are kept as two independent sets so a format can force a flag
//! on or off regardless of what it sits inside. A format optionally covers
//! an inclusive character range of its paragraph; an unranged format applies
//! to the whole paragraph.

use super::types::{ColorDescriptor, FontDescriptor, FontStyle};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_half_points;

/// Where a hyperlink points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperlinkTarget {
    /// External URL
    Url(String),
    /// Bookmark inside the same document
    Bookmark(String),
}

/// Hyperlink attached to a character format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub target: HyperlinkTarget,
    /// Tooltip shown by readers that support `\o`
    pub tip: Option<String>,
}

impl Hyperlink {
    /// Field instruction text, before escaping.
    ///
    /// Quotes inside a URL are percent-encoded; inside a bookmark name or
    /// tip they are backslash-escaped so the argument stays one token.
    fn instruction(&self) -> String {
        let mut inst = match &self.target {
            HyperlinkTarget::Url(url) => {
                format!("HYPERLINK \"{}\"", url.replace('"', "%22"))
            },
            HyperlinkTarget::Bookmark(name) => {
                format!("HYPERLINK \\l \"{}\"", quote_argument(name))
            },
        };
        if let Some(tip) = &self.tip {
            inst.push_str(" \\o \"");
            inst.push_str(&quote_argument(tip));
            inst.push('"');
        }
        inst
    }
}

fn quote_argument(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Character formatting intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharFormat {
    range: Option<(usize, usize)>,
    font: Option<FontDescriptor>,
    ansi_font: Option<FontDescriptor>,
    font_size: Option<f32>,
    fg_color: Option<ColorDescriptor>,
    bg_color: Option<ColorDescriptor>,
    style_add: FontStyle,
    style_remove: FontStyle,
    bookmark: Option<String>,
    hyperlink: Option<Hyperlink>,
}

impl CharFormat {
    /// Create an unranged format with nothing set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a format covering `begin..=end`.
    #[inline]
    pub(crate) fn ranged(begin: usize, end: usize) -> Self {
        Self {
            range: Some((begin, end)),
            ..Self::default()
        }
    }

    /// Inclusive character range, `None` for the whole paragraph.
    #[inline]
    pub fn range(&self) -> Option<(usize, usize)> {
        self.range
    }

    #[inline]
    pub fn font(&self) -> Option<FontDescriptor> {
        self.font
    }

    #[inline]
    pub fn ansi_font(&self) -> Option<FontDescriptor> {
        self.ansi_font
    }

    /// Font size in points.
    #[inline]
    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }

    #[inline]
    pub fn fg_color(&self) -> Option<ColorDescriptor> {
        self.fg_color
    }

    #[inline]
    pub fn bg_color(&self) -> Option<ColorDescriptor> {
        self.bg_color
    }

    #[inline]
    pub fn bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref()
    }

    #[inline]
    pub fn hyperlink(&self) -> Option<&Hyperlink> {
        self.hyperlink.as_ref()
    }

    /// Flags this format switches on.
    #[inline]
    pub fn added_styles(&self) -> FontStyle {
        self.style_add
    }

    /// Flags this format switches off.
    #[inline]
    pub fn removed_styles(&self) -> FontStyle {
        self.style_remove
    }

    pub fn set_font(&mut self, font: FontDescriptor) -> &mut Self {
        self.font = Some(font);
        self
    }

    /// Font used for ANSI characters when it differs from the main font.
    pub fn set_ansi_font(&mut self, font: FontDescriptor) -> &mut Self {
        self.ansi_font = Some(font);
        self
    }

    /// Font size in points.
    pub fn set_font_size(&mut self, size: f32) -> &mut Self {
        self.font_size = Some(size);
        self
    }

    pub fn set_fg_color(&mut self, color: ColorDescriptor) -> &mut Self {
        self.fg_color = Some(color);
        self
    }

    pub fn set_bg_color(&mut self, color: ColorDescriptor) -> &mut Self {
        self.bg_color = Some(color);
        self
    }

    /// Force `style` on. Clears a previous removal of the same flags.
    pub fn add_style(&mut self, style: FontStyle) -> &mut Self {
        self.style_add |= style;
        self.style_remove.remove(style);
        self
    }

    /// Force `style` off. Clears a previous addition of the same flags.
    pub fn remove_style(&mut self, style: FontStyle) -> &mut Self {
        self.style_remove |= style;
        self.style_add.remove(style);
        self
    }

    /// Shorthand for `add_style(FontStyle::BOLD)`.
    pub fn bold(&mut self) -> &mut Self {
        self.add_style(FontStyle::BOLD)
    }

    /// Shorthand for `add_style(FontStyle::ITALIC)`.
    pub fn italic(&mut self) -> &mut Self {
        self.add_style(FontStyle::ITALIC)
    }

    /// Shorthand for `add_style(FontStyle::UNDERLINE)`.
    pub fn underline(&mut self) -> &mut Self {
        self.add_style(FontStyle::UNDERLINE)
    }

    pub fn set_bookmark(&mut self, name: impl Into<String>) -> &mut Self {
        self.bookmark = Some(name.into());
        self
    }

    /// Link the covered text to an external URL.
    pub fn set_hyperlink(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_hyperlink_target(HyperlinkTarget::Url(url.into()))
    }

    /// Link the covered text to a bookmark in the same document.
    pub fn set_local_hyperlink(&mut self, bookmark: impl Into<String>) -> &mut Self {
        self.set_hyperlink_target(HyperlinkTarget::Bookmark(bookmark.into()))
    }

    fn set_hyperlink_target(&mut self, target: HyperlinkTarget) -> &mut Self {
        let tip = self.hyperlink.take().and_then(|link| link.tip);
        self.hyperlink = Some(Hyperlink { target, tip });
        self
    }

    /// Tooltip for the hyperlink. Ignored when no hyperlink is set.
    pub fn set_hyperlink_tip(&mut self, tip: impl Into<String>) -> &mut Self {
        if let Some(link) = self.hyperlink.as_mut() {
            link.tip = Some(tip.into());
        }
        self
    }

    /// Fill every formatting property this format leaves unset from `parent`.
    ///
    /// Properties already set here are never overwritten. Style flags are
    /// merged flag by flag: a flag this format neither adds nor removes takes
    /// the parent's decision. Range, bookmark and hyperlink are anchors, not
    /// formatting, and are not inherited.
    pub fn inherit_from(&mut self, parent: &CharFormat) {
        self.font = self.font.or(parent.font);
        self.ansi_font = self.ansi_font.or(parent.ansi_font);
        self.font_size = self.font_size.or(parent.font_size);
        self.fg_color = self.fg_color.or(parent.fg_color);
        self.bg_color = self.bg_color.or(parent.bg_color);
        let undecided = !(self.style_add | self.style_remove);
        self.style_add |= parent.style_add & undecided;
        self.style_remove |= parent.style_remove & undecided;
    }

    /// Whether rendering this format would produce nothing but an empty group.
    pub fn is_plain(&self) -> bool {
        self.font.is_none()
            && self.ansi_font.is_none()
            && self.font_size.is_none()
            && self.fg_color.is_none()
            && self.bg_color.is_none()
            && self.style_add.is_empty()
            && self.style_remove.is_empty()
            && self.bookmark.is_none()
            && self.hyperlink.is_none()
    }

    /// Write the opening markup. `display` is written as the visible text
    /// right after the properties (used for reserved hyperlink text).
    pub(crate) fn write_head(&self, out: &mut RtfWriter, display: Option<&str>) {
        out.open_group();
        if let Some(link) = &self.hyperlink {
            out.control_word("field", None);
            out.open_group().raw("\\*").control_word("fldinst", None);
            out.text(&link.instruction());
            out.close_group();
            out.open_group().control_word("fldrslt", None);
            out.open_group();
        }

        match (self.font, self.ansi_font) {
            (Some(font), None) | (None, Some(font)) => {
                out.control_word("f", Some(font.index() as i64));
            },
            (Some(font), Some(ansi)) => {
                out.control_word("loch", None)
                    .control_word("af", Some(ansi.index() as i64))
                    .control_word("hich", None)
                    .control_word("af", Some(ansi.index() as i64))
                    .control_word("dbch", None)
                    .control_word("af", Some(font.index() as i64));
            },
            (None, None) => {},
        }
        if let Some(size) = self.font_size {
            out.control_word("fs", Some(pt_to_half_points(size) as i64));
        }
        if let Some(color) = self.fg_color {
            out.control_word("cf", Some(color.index() as i64));
        }
        if let Some(color) = self.bg_color {
            out.control_word("chshdng", Some(0))
                .control_word("chcbpat", Some(color.index() as i64))
                .control_word("cb", Some(color.index() as i64));
        }
        for style in FontStyle::all().iter() {
            let Some((on, off)) = style.control_words() else {
                continue;
            };
            if self.style_add.contains(style) {
                out.control_word(on, None);
            } else if self.style_remove.contains(style) {
                out.control_word(off, None);
            }
        }
        if let Some(name) = &self.bookmark {
            out.open_group()
                .raw("\\*")
                .control_word("bkmkstart", None)
                .text(name)
                .close_group();
        }
        if let Some(text) = display {
            out.text(text);
        }
    }

    /// Write the closing markup matching [`CharFormat::write_head`].
    pub(crate) fn write_tail(&self, out: &mut RtfWriter) {
        if let Some(name) = &self.bookmark {
            out.open_group()
                .raw("\\*")
                .control_word("bkmkend", None)
                .text(name)
                .close_group();
        }
        if self.hyperlink.is_some() {
            out.close_group().close_group();
        }
        out.close_group();
    }

    pub(crate) fn render_head(&self, display: Option<&str>) -> String {
        let mut out = RtfWriter::new();
        self.write_head(&mut out, display);
        out.finish()
    }

    pub(crate) fn render_tail(&self) -> String {
        let mut out = RtfWriter::new();
        self.write_tail(&mut out);
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_style_add_and_remove() {
        let mut fmt = CharFormat::new();
        fmt.add_style(FontStyle::BOLD | FontStyle::SUPER)
            .remove_style(FontStyle::ITALIC);
        assert_eq!(fmt.render_head(None), "{\\b\\i0\\super");
        assert_eq!(fmt.render_tail(), "}");
    }

    #[test]
    fn test_add_then_remove_same_flag() {
        let mut fmt = CharFormat::new();
        fmt.bold().remove_style(FontStyle::BOLD);
        assert!(fmt.added_styles().is_empty());
        assert_eq!(fmt.removed_styles(), FontStyle::BOLD);
    }

    #[test]
    fn test_render_font_size_and_colors() {
        let mut fmt = CharFormat::new();
        fmt.set_font(FontDescriptor(1))
            .set_font_size(10.5)
            .set_fg_color(ColorDescriptor(2))
            .set_bg_color(ColorDescriptor(3));
        assert_eq!(
            fmt.render_head(None),
            "{\\f1\\fs21\\cf2\\chshdng0\\chcbpat3\\cb3"
        );
    }

    #[test]
    fn test_render_two_fonts() {
        let mut fmt = CharFormat::new();
        fmt.set_font(FontDescriptor(2)).set_ansi_font(FontDescriptor(1));
        assert_eq!(
            fmt.render_head(None),
            "{\\loch\\af1\\hich\\af1\\dbch\\af2"
        );
    }

    #[test]
    fn test_render_hyperlink_with_tip() {
        let mut fmt = CharFormat::new();
        fmt.set_hyperlink("https://example.com")
            .set_hyperlink_tip("Example")
            .underline();
        assert_eq!(
            fmt.render_head(Some("site")),
            "{\\field{\\*\\fldinst HYPERLINK \"https://example.com\" \\\\o \"Example\"}{\\fldrslt{\\ul site"
        );
        assert_eq!(fmt.render_tail(), "}}}");
    }

    #[test]
    fn test_hyperlink_quotes_stay_inside_arguments() {
        let mut fmt = CharFormat::new();
        fmt.set_hyperlink("https://x.y/?q=\"a\"")
            .set_hyperlink_tip("say \"hi\"");
        assert_eq!(
            fmt.render_head(None),
            "{\\field{\\*\\fldinst HYPERLINK \"https://x.y/?q=%22a%22\" \\\\o \"say \\\\\"hi\\\\\"\"}{\\fldrslt{"
        );

        let mut local = CharFormat::new();
        local.set_local_hyperlink("a\"b");
        assert!(local
            .render_head(None)
            .contains("HYPERLINK \\\\l \"a\\\\\"b\""));
    }

    #[test]
    fn test_render_local_hyperlink_and_bookmark() {
        let mut link = CharFormat::new();
        link.set_local_hyperlink("intro");
        assert!(link.render_head(None).contains("HYPERLINK \\\\l \"intro\""));

        let mut mark = CharFormat::new();
        mark.set_bookmark("intro");
        assert_eq!(mark.render_head(None), "{{\\*\\bkmkstart intro}");
        assert_eq!(mark.render_tail(), "{\\*\\bkmkend intro}}");
    }

    #[test]
    fn test_inherit_fills_only_unset_fields() {
        let mut parent = CharFormat::new();
        parent
            .set_font(FontDescriptor(1))
            .set_font_size(12.0)
            .add_style(FontStyle::BOLD | FontStyle::ITALIC);

        let mut child = CharFormat::new();
        child
            .set_font_size(9.0)
            .set_fg_color(ColorDescriptor(4))
            .remove_style(FontStyle::BOLD);
        child.inherit_from(&parent);

        assert_eq!(child.font(), Some(FontDescriptor(1)));
        assert_eq!(child.font_size(), Some(9.0));
        assert_eq!(child.fg_color(), Some(ColorDescriptor(4)));
        assert_eq!(child.added_styles(), FontStyle::ITALIC);
        assert_eq!(child.removed_styles(), FontStyle::BOLD);
    }

    #[test]
    fn test_plain_format() {
        assert!(CharFormat::new().is_plain());
        let mut fmt = CharFormat::new();
        fmt.italic();
        assert!(!fmt.is_plain());
    }
}
