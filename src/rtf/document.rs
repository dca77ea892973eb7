//! Document composition and rendering.
//!
//! A [`Document`] owns the font and color tables, the page setup, and three
//! block lists: header, footer and body. Fonts and colors are interned: the
//! first use of a name or color appends it to its table and every later use
//! returns the same index. Index 0 of each table is reserved for the
//! document default font and for black.

use super::block::{BlockList, ContentPolicy, HorizontalLine};
use super::error::RtfResult;
use super::options::DocumentOptions;
use super::paragraph::Paragraph;
use super::picture::Image;
use super::section::Section;
use super::table::Table;
use super::types::{Color, ColorDescriptor, FontDescriptor, PaperOrientation};
use super::writer::RtfWriter;
use crate::common::Result;
use crate::common::unit::pt_to_twip;
use std::collections::HashMap;
use std::io::Write;

/// A document under composition.
///
/// # Examples
///
/// ```rust
/// use rtfcraft::rtf::{Color, Document};
///
/// let mut doc = Document::new();
/// let red = doc.color(Color::new(255, 0, 0));
/// let para = doc.add_text_paragraph("Hello, World!");
/// para.add_char_format(0, 4)?.set_fg_color(red).bold();
/// let rtf = doc.render()?;
/// assert!(rtf.starts_with("{\\rtf1"));
/// # Ok::<(), rtfcraft::rtf::RtfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    options: DocumentOptions,
    fonts: Vec<String>,
    font_index: HashMap<String, usize>,
    colors: Vec<Color>,
    color_index: HashMap<Color, usize>,
    header: BlockList,
    footer: BlockList,
    body: BlockList,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with default options.
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        let mut doc = Self {
            fonts: Vec::new(),
            font_index: HashMap::new(),
            colors: Vec::new(),
            color_index: HashMap::new(),
            header: BlockList::with_policy(ContentPolicy::HEADER_FOOTER),
            footer: BlockList::with_policy(ContentPolicy::HEADER_FOOTER),
            body: BlockList::with_policy(ContentPolicy::BODY),
            options,
        };
        let default_font = doc.options.default_font.clone();
        doc.font(&default_font);
        doc.color(Color::black());
        doc
    }

    #[inline]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Intern a font by name.
    pub fn font(&mut self, name: &str) -> FontDescriptor {
        if let Some(&index) = self.font_index.get(name) {
            return FontDescriptor(index);
        }
        let index = self.fonts.len();
        self.fonts.push(name.to_owned());
        self.font_index.insert(name.to_owned(), index);
        FontDescriptor(index)
    }

    /// Intern a color.
    pub fn color(&mut self, color: Color) -> ColorDescriptor {
        if let Some(&index) = self.color_index.get(&color) {
            return ColorDescriptor(index);
        }
        let index = self.colors.len();
        self.colors.push(color);
        self.color_index.insert(color, index);
        ColorDescriptor(index)
    }

    /// Font table in index order.
    #[inline]
    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    /// Color table in index order.
    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn body(&self) -> &BlockList {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut BlockList {
        &mut self.body
    }

    #[inline]
    pub fn header(&self) -> &BlockList {
        &self.header
    }

    /// Page header. Footnotes are not allowed here.
    #[inline]
    pub fn header_mut(&mut self) -> &mut BlockList {
        &mut self.header
    }

    #[inline]
    pub fn footer(&self) -> &BlockList {
        &self.footer
    }

    /// Page footer. Footnotes are not allowed here.
    #[inline]
    pub fn footer_mut(&mut self) -> &mut BlockList {
        &mut self.footer
    }

    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.body.add_paragraph()
    }

    pub fn add_text_paragraph(&mut self, text: &str) -> &mut Paragraph {
        self.body.add_text_paragraph(text)
    }

    pub fn add_table(&mut self, table: Table) -> RtfResult<&mut Table> {
        self.body.add_table(table)
    }

    pub fn add_image(&mut self, image: Image) -> &mut Image {
        self.body.add_image(image)
    }

    pub fn add_section(&mut self, section: Section) -> RtfResult<&mut Section> {
        self.body.add_section(section)
    }

    pub fn add_line(&mut self, line: HorizontalLine) -> &mut HorizontalLine {
        self.body.add_line(line)
    }

    fn write_prolog(&self, out: &mut RtfWriter) {
        let lcid = self.options.lcid.0 as i64;
        out.open_group()
            .control_word("rtf", Some(1))
            .control_word("ansi", None)
            .control_word("ansicpg", Some(1252))
            .control_word("deff", Some(0))
            .control_word("deflang", Some(lcid))
            .control_word("deflangfe", Some(lcid))
            .control_word("deftab", Some(self.options.default_tab_width as i64))
            .control_word("uc", Some(1))
            .newline();

        out.open_group().control_word("fonttbl", None);
        for (index, name) in self.fonts.iter().enumerate() {
            out.open_group()
                .control_word("f", Some(index as i64))
                .control_word("fnil", None)
                .text(name)
                .raw(";")
                .close_group();
        }
        out.close_group().newline();

        out.open_group().control_word("colortbl", None);
        for color in &self.colors {
            out.control_word("red", Some(color.red as i64))
                .control_word("green", Some(color.green as i64))
                .control_word("blue", Some(color.blue as i64))
                .raw(";");
        }
        out.close_group().newline();

        let (width, height) = self.options.page_size();
        let margins = self.options.margins;
        out.control_word("paperw", Some(pt_to_twip(width) as i64))
            .control_word("paperh", Some(pt_to_twip(height) as i64))
            .control_word("margl", Some(pt_to_twip(margins.left) as i64))
            .control_word("margr", Some(pt_to_twip(margins.right) as i64))
            .control_word("margt", Some(pt_to_twip(margins.top) as i64))
            .control_word("margb", Some(pt_to_twip(margins.bottom) as i64));
        if self.options.orientation == PaperOrientation::Landscape {
            out.control_word("landscape", None);
        }
        out.newline();
    }

    /// Render the document.
    ///
    /// Tables are frozen and their merged borders resolved first, so this
    /// needs `&mut self`; nothing else is changed and rendering again gives
    /// the same output.
    pub fn render(&mut self) -> RtfResult<String> {
        self.header.prepare();
        self.footer.prepare();
        self.body.prepare();

        let mut out = RtfWriter::with_capacity(4096);
        self.write_prolog(&mut out);
        for (word, blocks) in [("header", &self.header), ("footer", &self.footer)] {
            if blocks.is_empty() {
                continue;
            }
            out.open_group().control_word(word, None);
            blocks.write(&mut out, None);
            out.close_group().newline();
        }
        self.body.write(&mut out, None);
        out.close_group();
        Ok(out.finish())
    }

    /// Render the document into `writer`.
    pub fn write_to<W: Write>(&mut self, mut writer: W) -> Result<()> {
        let rtf = self.render()?;
        writer.write_all(rtf.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::border::Border;
    use crate::rtf::field::FieldKind;
    use crate::rtf::strip::strip_rtf;
    use crate::rtf::types::{Alignment, Margins, PaperSize};

    #[test]
    fn test_font_interning_is_stable() {
        let mut doc = Document::new();
        let arial = doc.font("Arial");
        let again = doc.font("Arial");
        let courier = doc.font("Courier New");
        assert_eq!(arial, again);
        assert_eq!(arial.index(), 1);
        assert_eq!(courier.index(), 2);
        assert_eq!(doc.font("Times New Roman").index(), 0);
        assert_eq!(doc.fonts(), ["Times New Roman", "Arial", "Courier New"]);
    }

    #[test]
    fn test_color_interning() {
        let mut doc = Document::new();
        assert_eq!(doc.color(Color::black()).index(), 0);
        let red = doc.color(Color::new(255, 0, 0));
        let blue = doc.color(Color::from_rgb(0x0000FF));
        assert_eq!(red.index(), 1);
        assert_eq!(blue.index(), 2);
        assert_eq!(doc.color(Color::new(255, 0, 0)), red);
        assert_eq!(doc.colors().len(), 3);
    }

    #[test]
    fn test_prolog_and_tables() {
        let mut doc = Document::new();
        doc.font("Arial");
        doc.color(Color::new(255, 0, 0));
        let rtf = doc.render().unwrap();
        assert!(rtf.starts_with(
            "{\\rtf1\\ansi\\ansicpg1252\\deff0\\deflang1033\\deflangfe1033\\deftab720\\uc1\r\n"
        ));
        assert!(rtf.contains("{\\fonttbl{\\f0\\fnil Times New Roman;}{\\f1\\fnil Arial;}}"));
        assert!(rtf.contains("{\\colortbl\\red0\\green0\\blue0;\\red255\\green0\\blue0;}"));
        assert!(rtf.contains("\\margl1440\\margr1440\\margt1440\\margb1440"));
        assert!(rtf.ends_with('}'));
    }

    #[test]
    fn test_landscape_page_setup() {
        let options = DocumentOptions::new()
            .with_paper_size(PaperSize::Letter)
            .with_orientation(PaperOrientation::Landscape)
            .with_margins(Margins::uniform(36.0));
        let mut doc = Document::with_options(options);
        let rtf = doc.render().unwrap();
        assert!(rtf.contains(
            "\\paperw15840\\paperh12240\\margl720\\margr720\\margt720\\margb720\\landscape"
        ));
    }

    #[test]
    fn test_round_trip_plain_text() {
        let mut doc = Document::new();
        doc.add_text_paragraph("Hello, World!");
        let rtf = doc.render().unwrap();
        let text = strip_rtf(&rtf).unwrap();
        // the closing paragraph mark decodes to a line break
        assert_eq!(text.trim_end_matches('\n'), "Hello, World!");
        assert!(!text.contains('\\'));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_header_and_footer() {
        let mut doc = Document::new();
        doc.header_mut()
            .add_text_paragraph("Title")
            .set_alignment(Alignment::Center);
        let footer = doc.footer_mut().add_text_paragraph("Page ");
        footer.push_str(" ");
        footer.add_field(4, FieldKind::Page).unwrap();
        assert!(doc.footer_mut().add_text_paragraph("x").add_footnote(0).is_err());
        doc.add_text_paragraph("Body");

        let rtf = doc.render().unwrap();
        assert!(rtf.contains("{\\header{\\pard\\qc Title\\par}}"));
        assert!(rtf.contains("{\\footer{\\pard\\ql Page {\\field{\\*\\fldinst PAGE }{\\fldrslt }} \\par}"));
        let body = rtf.find("Body").unwrap();
        assert!(rtf.find("\\footer").unwrap() < body);
        assert_eq!(strip_rtf(&rtf).unwrap().trim_end_matches('\n'), "Body");
    }

    #[test]
    fn test_render_freezes_tables_and_is_repeatable() {
        let mut doc = Document::new();
        let mut table = Table::new(200.0);
        table.stage_text_row(["a", "b"]).unwrap();
        table.stage_text_row(["c", "d"]).unwrap();
        doc.add_table(table).unwrap();
        doc.add_line(HorizontalLine::new(Border::single()));

        let first = doc.render().unwrap();
        assert!(doc.body().get(0).and_then(|b| b.as_table()).unwrap().is_frozen());
        assert_eq!(first.matches("\\row}").count(), 2);
        assert_eq!(doc.render().unwrap(), first);

        let text = strip_rtf(&first).unwrap();
        assert!(text.contains("a|b|"));
    }

    #[test]
    fn test_write_to() {
        let mut doc = Document::new();
        doc.add_text_paragraph("bytes");
        let mut buf = Vec::new();
        doc.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), doc.render().unwrap());
    }
}
