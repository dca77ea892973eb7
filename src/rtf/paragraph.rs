//! Paragraphs.
//!
//! A paragraph owns a text buffer and everything anchored to it: character
//! format ranges in declaration order, footnotes, field markers and
//! hyperlink reservations. Nothing is resolved until the paragraph is
//! written; see [`super::merge`] for how overlapping ranges are untangled.

use super::block::{BlockFrame, ContentPolicy, write_margins};
use super::error::{RtfError, RtfResult};
use super::escape::escape;
use super::field::FieldKind;
use super::footnote::Footnote;
use super::format::{CharFormat, HyperlinkTarget};
use super::merge::{RangeMarkup, TokenStream, resolve_disjoint_ranges};
use super::types::{Alignment, Direction, Margins};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_twip;
use std::collections::BTreeMap;

/// Hanging indent used for bulleted paragraphs without explicit indents.
const BULLET_INDENT_TWIPS: i64 = 360;

/// Text reserved for a hyperlink. The reserved characters stay in the
/// paragraph text so offsets stay stable, but are written as the field
/// result instead of as ordinary text.
#[derive(Debug, Clone)]
struct HyperlinkReservation {
    display: String,
    format: CharFormat,
    /// Number of formats declared before this link
    declared_after: usize,
}

/// A paragraph of text.
#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    alignment: Alignment,
    margins: Margins,
    first_line_indent: f32,
    line_spacing: Option<f32>,
    start_new_page: bool,
    bullet: Option<char>,
    default_char_format: CharFormat,
    frame: BlockFrame,
    formats: Vec<CharFormat>,
    footnotes: Vec<Footnote>,
    fields: BTreeMap<usize, FieldKind>,
    hyperlinks: Vec<HyperlinkReservation>,
    policy: ContentPolicy,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new("")
    }
}

impl Paragraph {
    /// Create a paragraph that may hold footnotes and fields.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_policy(text, ContentPolicy::BODY)
    }

    pub(crate) fn with_policy(text: impl Into<String>, policy: ContentPolicy) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::default(),
            margins: Margins::default(),
            first_line_indent: 0.0,
            line_spacing: None,
            start_new_page: false,
            bullet: None,
            default_char_format: CharFormat::default(),
            frame: BlockFrame::paragraph(),
            formats: Vec::new(),
            footnotes: Vec::new(),
            fields: BTreeMap::new(),
            hyperlinks: Vec::new(),
            policy,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters, the unit all offsets use.
    #[inline]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Replace the text. Hyperlink reservations refer to the old text and
    /// are discarded; ranges and anchors are kept and clamped when written.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self.hyperlinks.clear();
        self
    }

    /// Append text.
    pub fn push_str(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    #[inline]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Left/right indents and space before/after, in points.
    pub fn set_margins(&mut self, margins: Margins) -> &mut Self {
        self.margins = margins;
        self
    }

    pub fn set_margin(&mut self, direction: Direction, pt: f32) -> &mut Self {
        self.margins.set(direction, pt);
        self
    }

    /// First line indent in points; negative for a hanging indent.
    pub fn set_first_line_indent(&mut self, pt: f32) -> &mut Self {
        self.first_line_indent = pt;
        self
    }

    /// Exact line spacing in points.
    pub fn set_line_spacing(&mut self, pt: f32) -> &mut Self {
        self.line_spacing = Some(pt);
        self
    }

    #[inline]
    pub fn start_new_page(&self) -> bool {
        self.start_new_page
    }

    pub fn set_start_new_page(&mut self, start: bool) -> &mut Self {
        self.start_new_page = start;
        self
    }

    /// Prefix the paragraph with a bullet symbol.
    pub fn set_bullet(&mut self, symbol: char) -> &mut Self {
        self.bullet = Some(symbol);
        self
    }

    #[inline]
    pub fn default_char_format(&self) -> &CharFormat {
        &self.default_char_format
    }

    #[inline]
    pub fn default_char_format_mut(&mut self) -> &mut CharFormat {
        &mut self.default_char_format
    }

    #[inline]
    pub fn frame(&self) -> &BlockFrame {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: BlockFrame) -> &mut Self {
        self.frame = frame;
        self
    }

    /// Switch to the policy of the list this paragraph is moved into.
    pub(crate) fn adopt_policy(&mut self, policy: ContentPolicy) -> RtfResult<()> {
        if !policy.allow_footnote && !self.footnotes.is_empty() {
            return Err(RtfError::NotAllowed(
                "footnotes are not allowed in this block list".into(),
            ));
        }
        if !policy.allow_field && !self.fields.is_empty() {
            return Err(RtfError::NotAllowed(
                "fields are not allowed in this block list".into(),
            ));
        }
        self.policy = policy;
        Ok(())
    }

    /// Declare a format over characters `begin..=end`.
    ///
    /// Formats declared later win wherever they overlap earlier ones,
    /// hyperlinks pushed with [`Paragraph::push_hyperlink`] included.
    pub fn add_char_format(&mut self, begin: usize, end: usize) -> RtfResult<&mut CharFormat> {
        let len = self.char_len();
        if begin > end || end >= len {
            return Err(RtfError::InvalidRange { begin, end, len });
        }
        let index = self.formats.len();
        self.formats.push(CharFormat::ranged(begin, end));
        Ok(&mut self.formats[index])
    }

    /// Declare a format over the whole paragraph.
    pub fn add_char_format_all(&mut self) -> &mut CharFormat {
        let index = self.formats.len();
        self.formats.push(CharFormat::new());
        &mut self.formats[index]
    }

    /// Declared formats in declaration order.
    #[inline]
    pub fn char_formats(&self) -> &[CharFormat] {
        &self.formats
    }

    /// Anchor a footnote after the character at `position`.
    pub fn add_footnote(&mut self, position: usize) -> RtfResult<&mut Footnote> {
        if !self.policy.allow_footnote {
            return Err(RtfError::NotAllowed(
                "footnotes are not allowed in this block list".into(),
            ));
        }
        self.check_anchor(position)?;
        let index = self.footnotes.len();
        self.footnotes.push(Footnote::new(position));
        Ok(&mut self.footnotes[index])
    }

    #[inline]
    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    /// Place a field marker after the character at `position`, replacing
    /// any marker already registered there.
    pub fn add_field(&mut self, position: usize, kind: FieldKind) -> RtfResult<&mut Self> {
        if !self.policy.allow_field {
            return Err(RtfError::NotAllowed(
                "fields are not allowed in this block list".into(),
            ));
        }
        self.check_anchor(position)?;
        self.fields.insert(position, kind);
        Ok(self)
    }

    /// Field marker registered at `position`, if any.
    #[inline]
    pub fn field_at(&self, position: usize) -> Option<FieldKind> {
        self.fields.get(&position).copied()
    }

    fn check_anchor(&self, position: usize) -> RtfResult<()> {
        let len = self.char_len();
        if position >= len {
            return Err(RtfError::InvalidRange {
                begin: position,
                end: position,
                len,
            });
        }
        Ok(())
    }

    /// Append `display` as a hyperlink to `url`.
    ///
    /// Returns the hyperlink's format so it can be styled further. An empty
    /// `display` shows the URL itself; if both are empty nothing is added.
    pub fn push_hyperlink(
        &mut self,
        display: &str,
        url: impl Into<String>,
    ) -> RtfResult<&mut CharFormat> {
        self.push_link(display, HyperlinkTarget::Url(url.into()))
    }

    /// Append `display` as a link to a bookmark in the same document.
    pub fn push_local_hyperlink(
        &mut self,
        display: &str,
        bookmark: impl Into<String>,
    ) -> RtfResult<&mut CharFormat> {
        self.push_link(display, HyperlinkTarget::Bookmark(bookmark.into()))
    }

    fn push_link(
        &mut self,
        display: &str,
        target: HyperlinkTarget,
    ) -> RtfResult<&mut CharFormat> {
        let display = if display.is_empty() {
            match &target {
                HyperlinkTarget::Url(url) | HyperlinkTarget::Bookmark(url) => url.clone(),
            }
        } else {
            display.to_owned()
        };
        if display.is_empty() {
            return Err(RtfError::EmptyHyperlink);
        }
        let begin = self.char_len();
        let end = begin + display.chars().count() - 1;
        self.text.push_str(&display);

        let mut format = CharFormat::ranged(begin, end);
        match target {
            HyperlinkTarget::Url(url) => format.set_hyperlink(url),
            HyperlinkTarget::Bookmark(name) => format.set_local_hyperlink(name),
        };
        let index = self.hyperlinks.len();
        self.hyperlinks.push(HyperlinkReservation {
            display,
            format,
            declared_after: self.formats.len(),
        });
        Ok(&mut self.hyperlinks[index].format)
    }

    /// Formats and hyperlink reservations in declaration order. Hyperlinks
    /// carry their display text.
    fn declared_formats(&self) -> Vec<(&CharFormat, Option<&str>)> {
        let mut declared = Vec::with_capacity(self.formats.len() + self.hyperlinks.len());
        let mut links = self.hyperlinks.iter().peekable();
        for (i, format) in self.formats.iter().enumerate() {
            while let Some(link) = links.next_if(|link| link.declared_after <= i) {
                declared.push((&link.format, Some(link.display.as_str())));
            }
            declared.push((format, None));
        }
        declared.extend(links.map(|link| (&link.format, Some(link.display.as_str()))));
        declared
    }

    /// Build the token stream: disjoint format ranges first, then footnote
    /// and field anchors.
    pub(crate) fn token_stream(&self) -> TokenStream {
        let mut stream = TokenStream::new(&self.text);
        let len = stream.text_len();
        let declared = self.declared_formats();

        for range in resolve_disjoint_ranges(declared.iter().map(|(f, _)| f.range()), len) {
            let (format, display) = declared[range.format];
            stream.splice_range(RangeMarkup {
                begin: range.begin,
                end: range.end,
                head: format.render_head(display),
                tail: format.render_tail(),
                placeholder: display.is_some(),
            });
        }

        for footnote in &self.footnotes {
            stream.splice_anchor(footnote.position(), footnote.render());
        }
        for (&position, kind) in &self.fields {
            stream.splice_anchor(position, kind.markup());
        }
        stream
    }

    /// Write the paragraph. `inherited` is the enclosing list's default
    /// format, `frame` overrides the paragraph's own frame.
    pub(crate) fn write(
        &self,
        out: &mut RtfWriter,
        inherited: Option<&CharFormat>,
        frame: Option<&BlockFrame>,
    ) {
        let frame = frame.unwrap_or(&self.frame);
        out.raw(&frame.head);

        if self.start_new_page {
            out.control_word("pagebb", None);
        }
        if let Some(spacing) = self.line_spacing {
            out.control_word("sl", Some(-(pt_to_twip(spacing) as i64)))
                .control_word("slmult", Some(0));
        }
        write_margins(out, &self.margins);
        let bullet_indent = self.bullet.is_some()
            && self.margins.left == 0.0
            && self.first_line_indent == 0.0;
        if bullet_indent {
            out.control_word("li", Some(BULLET_INDENT_TWIPS * 2))
                .control_word("fi", Some(-BULLET_INDENT_TWIPS));
        } else if self.first_line_indent != 0.0 {
            out.control_word("fi", Some(pt_to_twip(self.first_line_indent) as i64));
        }
        out.control_word(self.alignment.paragraph_word(), None);

        if let Some(symbol) = self.bullet {
            let symbol = symbol.to_string();
            out.open_group().control_word("pntext", None);
            write_symbol(out, &symbol);
            out.control_word("tab", None).close_group();
            out.open_group()
                .raw("\\*")
                .control_word("pn", None)
                .control_word("pnlvlblt", None)
                .control_word("pnindent", Some(BULLET_INDENT_TWIPS))
                .open_group()
                .control_word("pntxtb", None);
            write_symbol(out, &symbol);
            out.close_group().close_group();
        }

        let mut format = self.default_char_format.clone();
        if let Some(parent) = inherited {
            format.inherit_from(parent);
        }
        let wrap = !format.is_plain();
        if wrap {
            format.write_head(out, None);
        }
        self.token_stream().write(out);
        if wrap {
            format.write_tail(out);
        }
        out.raw(&frame.tail);
    }
}

/// Escaped symbols need no delimiter after a control word.
fn write_symbol(out: &mut RtfWriter, symbol: &str) {
    let escaped = escape(symbol);
    if escaped.starts_with('\\') {
        out.raw(&escaped);
    } else {
        out.text(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::types::{ColorDescriptor, FontStyle};

    fn render(para: &Paragraph) -> String {
        let mut out = RtfWriter::new();
        para.write(&mut out, None, None);
        out.finish()
    }

    #[test]
    fn test_plain_paragraph() {
        let para = Paragraph::new("Hello, World!");
        assert_eq!(render(&para), "{\\pard\\ql Hello, World!\\par}");
    }

    #[test]
    fn test_paragraph_properties() {
        let mut para = Paragraph::new("x");
        para.set_alignment(Alignment::Center)
            .set_margin(Direction::Left, 36.0)
            .set_margin(Direction::Top, 6.0)
            .set_first_line_indent(-18.0)
            .set_line_spacing(14.0)
            .set_start_new_page(true);
        assert_eq!(
            render(&para),
            "{\\pard\\pagebb\\sl-280\\slmult0\\sb120\\li720\\fi-360\\qc x\\par}"
        );
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut para = Paragraph::new("abc");
        assert_eq!(
            para.add_char_format(1, 3).unwrap_err(),
            RtfError::InvalidRange { begin: 1, end: 3, len: 3 }
        );
        assert!(para.add_char_format(2, 1).is_err());
        assert!(para.add_char_format(0, 2).is_ok());
    }

    #[test]
    fn test_overlapping_formats_nest() {
        let mut para = Paragraph::new("abcdef");
        para.add_char_format(0, 3).unwrap().bold();
        para.add_char_format(2, 5).unwrap().italic();
        assert_eq!(render(&para), "{\\pard\\ql{\\b ab}{\\i cdef}\\par}");
    }

    #[test]
    fn test_later_format_wins_inside() {
        let mut para = Paragraph::new("abcde");
        para.add_char_format_all().set_fg_color(ColorDescriptor(1));
        para.add_char_format(2, 2)
            .unwrap()
            .set_fg_color(ColorDescriptor(2));
        assert_eq!(
            render(&para),
            "{\\pard\\ql{\\cf1 ab}{\\cf2 c}{\\cf1 de}\\par}"
        );
    }

    #[test]
    fn test_default_format_wraps_content() {
        let mut para = Paragraph::new("x");
        para.default_char_format_mut().set_font_size(12.0);
        let mut parent = CharFormat::new();
        parent.add_style(FontStyle::BOLD).set_font_size(20.0);

        let mut out = RtfWriter::new();
        para.write(&mut out, Some(&parent), None);
        assert_eq!(out.finish(), "{\\pard\\ql{\\fs24\\b x}\\par}");
    }

    #[test]
    fn test_fields_replace_at_same_offset() {
        let mut para = Paragraph::new("Page  of ");
        para.add_field(4, FieldKind::Date).unwrap();
        para.add_field(4, FieldKind::Page).unwrap();
        para.add_field(8, FieldKind::NumPages).unwrap();
        assert_eq!(para.field_at(4), Some(FieldKind::Page));
        let rtf = render(&para);
        assert!(rtf.contains(
            "Page {\\field{\\*\\fldinst PAGE }{\\fldrslt }} of {\\field{\\*\\fldinst NUMPAGES }{\\fldrslt }}"
        ));
        assert!(!rtf.contains("DATE"));
    }

    #[test]
    fn test_anchor_beyond_text_is_rejected_then_dropped_when_stale() {
        let mut para = Paragraph::new("abc");
        assert!(para.add_footnote(3).is_err());
        para.add_footnote(2)
            .unwrap()
            .blocks_mut()
            .add_text_paragraph("note");
        para.add_field(1, FieldKind::Page).unwrap();
        para.set_text("a");

        let rtf = render(&para);
        assert!(!rtf.contains("footnote"));
        assert!(!rtf.contains("PAGE"));
        assert_eq!(rtf, "{\\pard\\ql a\\par}");
    }

    #[test]
    fn test_footnote_is_spliced_after_anchor() {
        let mut para = Paragraph::new("word.");
        para.add_footnote(3)
            .unwrap()
            .blocks_mut()
            .add_text_paragraph("Note");
        let rtf = render(&para);
        let mark = rtf.find("{\\super\\chftn}").unwrap();
        assert_eq!(&rtf[mark - 4..mark], "word");
        assert!(rtf.contains("Note"));
        assert!(rtf.ends_with(".\\par}"));
    }

    #[test]
    fn test_hyperlink_reservation() {
        let mut para = Paragraph::new("Visit ");
        para.push_hyperlink("our site", "https://example.com")
            .unwrap()
            .underline();
        para.push_str(" today.");
        assert_eq!(para.text(), "Visit our site today.");

        let rtf = render(&para);
        assert_eq!(
            rtf,
            "{\\pard\\ql Visit {\\field{\\*\\fldinst HYPERLINK \"https://example.com\"}{\\fldrslt{\\ul our site}}} today.\\par}"
        );
    }

    #[test]
    fn test_hyperlink_without_display_shows_url() {
        let mut para = Paragraph::new("");
        para.push_hyperlink("", "http://a.b").unwrap();
        assert_eq!(para.text(), "http://a.b");
        assert_eq!(para.char_len(), 10);
    }

    #[test]
    fn test_empty_hyperlink_keeps_following_text() {
        let mut para = Paragraph::new("x ");
        assert_eq!(
            para.push_hyperlink("", "").unwrap_err(),
            RtfError::EmptyHyperlink
        );
        assert!(para.push_local_hyperlink("", "").is_err());
        para.push_str("abc");
        assert_eq!(render(&para), "{\\pard\\ql x abc\\par}");
    }

    #[test]
    fn test_format_declared_after_hyperlink_wins() {
        let mut para = Paragraph::new("go ");
        para.add_char_format(0, 0).unwrap().italic();
        para.push_hyperlink("here", "https://example.com").unwrap();
        para.add_char_format(3, 6).unwrap().bold();
        let rtf = render(&para);
        assert_eq!(rtf, "{\\pard\\ql{\\i g}o {\\b here}\\par}");

        // a link pushed last covers an earlier format
        let mut para = Paragraph::new("ab");
        para.add_char_format_all().bold();
        para.push_hyperlink("cd", "u").unwrap();
        para.add_char_format_all();
        para.push_hyperlink("ef", "v").unwrap();
        let rtf = render(&para);
        assert!(rtf.ends_with("{\\field{\\*\\fldinst HYPERLINK \"v\"}{\\fldrslt{ef}}}\\par}"));
        assert!(!rtf.contains("HYPERLINK \"u\""));
    }

    #[test]
    fn test_bullet_prefix() {
        let mut para = Paragraph::new("item");
        para.set_bullet('\u{2022}');
        assert_eq!(
            render(&para),
            "{\\pard\\li720\\fi-360\\ql{\\pntext\\u8226?\\tab}{\\*\\pn\\pnlvlblt\\pnindent360{\\pntxtb\\u8226?}}item\\par}"
        );
    }

    #[test]
    fn test_fields_not_allowed() {
        let mut para = Paragraph::with_policy("abc", ContentPolicy::FOOTNOTE);
        assert!(para.add_field(0, FieldKind::Page).is_ok());
        assert!(matches!(para.add_footnote(0), Err(RtfError::NotAllowed(_))));
    }
}
