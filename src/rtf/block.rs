//! Block-level content.
//!
//! A document body, a header, a footer, a footnote and every table cell is a
//! [`BlockList`]: an ordered sequence of [`Block`]s sharing a default
//! character format. The list decides which kinds of content it accepts
//! through its [`ContentPolicy`].

use super::border::Border;
use super::error::{RtfError, RtfResult};
use super::format::CharFormat;
use super::paragraph::Paragraph;
use super::picture::Image;
use super::section::Section;
use super::table::Table;
use super::types::{Alignment, Direction, Margins};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_twip;
use log::debug;

/// Markup written around a paragraph-like block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub head: String,
    pub tail: String,
}

impl BlockFrame {
    pub fn new(head: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            tail: tail.into(),
        }
    }

    /// `{\pard` ... `\par}`
    pub fn paragraph() -> Self {
        Self::new("{\\pard", "\\par}")
    }

    /// Frame for a block inside a table cell that is not the cell's last.
    pub(crate) fn in_cell() -> Self {
        Self::new("{\\pard\\intbl", "\\par}")
    }

    /// Frame for the last block of a table cell; it closes the cell.
    pub(crate) fn last_in_cell() -> Self {
        Self::new("\\pard\\intbl", "\\cell")
    }
}

impl Default for BlockFrame {
    fn default() -> Self {
        Self::paragraph()
    }
}

/// What a block list may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPolicy {
    pub allow_footnote: bool,
    pub allow_field: bool,
    pub allow_table: bool,
    pub allow_section: bool,
}

impl ContentPolicy {
    /// Document body
    pub const BODY: ContentPolicy = ContentPolicy {
        allow_footnote: true,
        allow_field: true,
        allow_table: true,
        allow_section: true,
    };

    /// Page header or footer
    pub const HEADER_FOOTER: ContentPolicy = ContentPolicy {
        allow_footnote: false,
        allow_field: true,
        allow_table: true,
        allow_section: false,
    };

    /// Footnote body
    pub const FOOTNOTE: ContentPolicy = ContentPolicy {
        allow_footnote: false,
        allow_field: true,
        allow_table: false,
        allow_section: false,
    };

    /// Table cell
    pub const TABLE_CELL: ContentPolicy = ContentPolicy {
        allow_footnote: true,
        allow_field: true,
        allow_table: false,
        allow_section: false,
    };
}

/// Write `\sb \sa \li \ri` for every non-zero margin.
pub(crate) fn write_margins(out: &mut RtfWriter, margins: &Margins) {
    const WORDS: [(Direction, &str); 4] = [
        (Direction::Top, "sb"),
        (Direction::Bottom, "sa"),
        (Direction::Left, "li"),
        (Direction::Right, "ri"),
    ];
    for (direction, word) in WORDS {
        let margin = margins.get(direction);
        if margin > 0.0 {
            out.control_word(word, Some(pt_to_twip(margin) as i64));
        }
    }
}

/// A horizontal rule: an empty paragraph with a bottom border.
#[derive(Debug, Clone)]
pub struct HorizontalLine {
    border: Border,
    margins: Margins,
    start_new_page: bool,
    frame: BlockFrame,
}

impl Default for HorizontalLine {
    fn default() -> Self {
        Self::new(Border::single())
    }
}

impl HorizontalLine {
    pub fn new(border: Border) -> Self {
        Self {
            border,
            margins: Margins::default(),
            start_new_page: false,
            frame: BlockFrame::paragraph(),
        }
    }

    #[inline]
    pub fn border(&self) -> &Border {
        &self.border
    }

    pub fn set_border(&mut self, border: Border) -> &mut Self {
        self.border = border;
        self
    }

    pub(crate) fn write(&self, out: &mut RtfWriter, frame: Option<&BlockFrame>) {
        let frame = frame.unwrap_or(&self.frame);
        out.raw(&frame.head);
        if self.start_new_page {
            out.control_word("pagebb", None);
        }
        write_margins(out, &self.margins);
        out.control_word("brdrb", None);
        self.border.write_properties(out);
        out.control_word("brsp", Some(20));
        out.raw(&frame.tail);
    }
}

/// One block of content.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Image(Image),
    Section(Section),
    Line(HorizontalLine),
}

impl Block {
    fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Table(_) => "table",
            Block::Image(_) => "image",
            Block::Section(_) => "section",
            Block::Line(_) => "horizontal line",
        }
    }

    fn unsupported(&self, property: &str) -> RtfError {
        RtfError::Unsupported(format!("{} does not support {property}", self.kind()))
    }

    /// Alignment, for blocks that have one.
    pub fn alignment(&self) -> Option<Alignment> {
        match self {
            Block::Paragraph(p) => Some(p.alignment()),
            Block::Table(t) => Some(t.alignment()),
            Block::Image(i) => Some(i.alignment()),
            Block::Section(_) | Block::Line(_) => None,
        }
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> RtfResult<&mut Self> {
        match self {
            Block::Paragraph(p) => {
                p.set_alignment(alignment);
            },
            Block::Table(t) => {
                t.set_alignment(alignment);
            },
            Block::Image(i) => {
                i.set_alignment(alignment);
            },
            Block::Section(_) | Block::Line(_) => return Err(self.unsupported("alignment")),
        }
        Ok(self)
    }

    pub fn set_margins(&mut self, margins: Margins) -> RtfResult<&mut Self> {
        match self {
            Block::Paragraph(p) => {
                p.set_margins(margins);
            },
            Block::Line(l) => l.margins = margins,
            Block::Table(_) | Block::Image(_) | Block::Section(_) => {
                return Err(self.unsupported("margins"));
            },
        }
        Ok(self)
    }

    pub fn start_new_page(&self) -> bool {
        match self {
            Block::Paragraph(p) => p.start_new_page(),
            Block::Table(t) => t.start_new_page(),
            Block::Image(i) => i.start_new_page(),
            Block::Section(s) => s.start_new_page(),
            Block::Line(l) => l.start_new_page,
        }
    }

    /// Every block kind can start a new page.
    pub fn set_start_new_page(&mut self, start: bool) -> &mut Self {
        match self {
            Block::Paragraph(p) => {
                p.set_start_new_page(start);
            },
            Block::Table(t) => {
                t.set_start_new_page(start);
            },
            Block::Image(i) => {
                i.set_start_new_page(start);
            },
            Block::Section(s) => {
                s.set_start_new_page(start);
            },
            Block::Line(l) => l.start_new_page = start,
        }
        self
    }

    pub fn default_char_format(&self) -> Option<&CharFormat> {
        match self {
            Block::Paragraph(p) => Some(p.default_char_format()),
            _ => None,
        }
    }

    pub fn default_char_format_mut(&mut self) -> RtfResult<&mut CharFormat> {
        match self {
            Block::Paragraph(p) => Ok(p.default_char_format_mut()),
            _ => Err(self.unsupported("a default character format")),
        }
    }

    pub fn set_frame(&mut self, frame: BlockFrame) -> RtfResult<&mut Self> {
        match self {
            Block::Paragraph(p) => {
                p.set_frame(frame);
            },
            Block::Image(i) => {
                i.set_frame(frame);
            },
            Block::Line(l) => l.frame = frame,
            Block::Table(_) | Block::Section(_) => return Err(self.unsupported("frames")),
        }
        Ok(self)
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// An ordered list of blocks with a shared default character format.
#[derive(Debug, Clone)]
pub struct BlockList {
    blocks: Vec<Block>,
    default_char_format: CharFormat,
    policy: ContentPolicy,
}

impl Default for BlockList {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockList {
    /// A list accepting any content.
    pub fn new() -> Self {
        Self::with_policy(ContentPolicy::BODY)
    }

    pub(crate) fn with_policy(policy: ContentPolicy) -> Self {
        Self {
            blocks: Vec::new(),
            default_char_format: CharFormat::default(),
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> ContentPolicy {
        self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Iterate over the blocks mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.iter_mut()
    }

    #[inline]
    pub fn default_char_format(&self) -> &CharFormat {
        &self.default_char_format
    }

    /// Format every block of the list inherits for properties it leaves unset.
    #[inline]
    pub fn default_char_format_mut(&mut self) -> &mut CharFormat {
        &mut self.default_char_format
    }

    /// Append an empty paragraph.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.add_text_paragraph("")
    }

    /// Append a paragraph holding `text`.
    pub fn add_text_paragraph(&mut self, text: &str) -> &mut Paragraph {
        let index = self.blocks.len();
        self.blocks
            .push(Block::Paragraph(Paragraph::with_policy(text, self.policy)));
        match &mut self.blocks[index] {
            Block::Paragraph(p) => p,
            _ => unreachable!(),
        }
    }

    /// Append a table.
    pub fn add_table(&mut self, table: Table) -> RtfResult<&mut Table> {
        if !self.policy.allow_table {
            return Err(RtfError::NotAllowed(
                "tables are not allowed in this block list".into(),
            ));
        }
        let index = self.blocks.len();
        self.blocks.push(Block::Table(table));
        match &mut self.blocks[index] {
            Block::Table(t) => Ok(t),
            _ => unreachable!(),
        }
    }

    pub fn add_image(&mut self, image: Image) -> &mut Image {
        let index = self.blocks.len();
        self.blocks.push(Block::Image(image));
        match &mut self.blocks[index] {
            Block::Image(i) => i,
            _ => unreachable!(),
        }
    }

    /// Append a section break; what follows belongs to the new section.
    pub fn add_section(&mut self, section: Section) -> RtfResult<&mut Section> {
        if !self.policy.allow_section {
            return Err(RtfError::NotAllowed(
                "section breaks are not allowed in this block list".into(),
            ));
        }
        let index = self.blocks.len();
        self.blocks.push(Block::Section(section));
        match &mut self.blocks[index] {
            Block::Section(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    pub fn add_line(&mut self, line: HorizontalLine) -> &mut HorizontalLine {
        let index = self.blocks.len();
        self.blocks.push(Block::Line(line));
        match &mut self.blocks[index] {
            Block::Line(l) => l,
            _ => unreachable!(),
        }
    }

    /// Append an arbitrary block, checking it against this list's policy.
    pub fn push(&mut self, mut block: Block) -> RtfResult<&mut Block> {
        match &mut block {
            Block::Paragraph(p) => p.adopt_policy(self.policy)?,
            Block::Table(_) if !self.policy.allow_table => {
                return Err(RtfError::NotAllowed(
                    "tables are not allowed in this block list".into(),
                ));
            },
            Block::Section(_) if !self.policy.allow_section => {
                return Err(RtfError::NotAllowed(
                    "section breaks are not allowed in this block list".into(),
                ));
            },
            _ => {},
        }
        let index = self.blocks.len();
        self.blocks.push(block);
        Ok(&mut self.blocks[index])
    }

    /// Move every block out, leaving the list empty.
    pub(crate) fn take_blocks(&mut self) -> Vec<Block> {
        std::mem::take(&mut self.blocks)
    }

    /// Append blocks moved out of another list of the same kind.
    pub(crate) fn extend_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks.extend(blocks);
    }

    /// This list's default format completed from the enclosing one.
    pub(crate) fn effective_default(&self, inherited: Option<&CharFormat>) -> CharFormat {
        let mut format = self.default_char_format.clone();
        if let Some(parent) = inherited {
            format.inherit_from(parent);
        }
        format
    }

    /// Freeze table geometry and settle merged borders before writing.
    pub(crate) fn prepare(&mut self) {
        for block in &mut self.blocks {
            if let Block::Table(table) = block {
                table.freeze();
                table.resolve_merged_borders();
            }
        }
    }

    /// Write every block in order.
    pub(crate) fn write(&self, out: &mut RtfWriter, inherited: Option<&CharFormat>) {
        let format = self.effective_default(inherited);
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => p.write(out, Some(&format), None),
                Block::Table(t) => t.write(out, Some(&format)),
                Block::Image(i) => i.write(out, None),
                Block::Section(s) => s.write(out),
                Block::Line(l) => l.write(out, None),
            }
        }
    }

    /// Write the list as the content of a table cell. The last block closes
    /// the cell; an empty list still produces an empty cell.
    pub(crate) fn write_in_cell(&self, out: &mut RtfWriter, inherited: Option<&CharFormat>) {
        let format = self.effective_default(inherited);
        let inner = BlockFrame::in_cell();
        let last = BlockFrame::last_in_cell();
        let mut closed = false;
        for (i, block) in self.blocks.iter().enumerate() {
            let is_last = i + 1 == self.blocks.len();
            let frame = if is_last { &last } else { &inner };
            match block {
                Block::Paragraph(p) => p.write(out, Some(&format), Some(frame)),
                Block::Image(img) => img.write(out, Some(frame)),
                Block::Line(l) => l.write(out, Some(frame)),
                Block::Table(_) | Block::Section(_) => {
                    debug!("skipping {} inside a table cell", block.kind());
                    continue;
                },
            }
            closed = is_last;
        }
        if !closed {
            out.raw("\\pard\\intbl\\cell");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::border::BorderStyle;
    use crate::rtf::types::{ColorDescriptor, FontDescriptor, FontStyle};

    fn render(list: &BlockList) -> String {
        let mut out = RtfWriter::new();
        list.write(&mut out, None);
        out.finish()
    }

    #[test]
    fn test_default_format_inheritance_is_a_union() {
        let mut list = BlockList::new();
        list.default_char_format_mut()
            .set_font(FontDescriptor(1))
            .set_font_size(10.0);
        let para = list.add_text_paragraph("x");
        para.default_char_format_mut()
            .set_font_size(14.0)
            .add_style(FontStyle::ITALIC);

        assert_eq!(render(&list), "{\\pard\\ql{\\f1\\fs28\\i x}\\par}");
        // inheritance happens at render time only
        let block = list.get(0).unwrap();
        assert_eq!(block.default_char_format().unwrap().font(), None);
    }

    #[test]
    fn test_nested_inheritance() {
        let mut outer = CharFormat::new();
        outer.set_fg_color(ColorDescriptor(2)).bold();
        let mut list = BlockList::new();
        list.default_char_format_mut().remove_style(FontStyle::BOLD);
        list.add_text_paragraph("y");

        let mut out = RtfWriter::new();
        list.write(&mut out, Some(&outer));
        assert_eq!(out.finish(), "{\\pard\\ql{\\cf2\\b0 y}\\par}");
    }

    #[test]
    fn test_unsupported_properties() {
        let mut section = Block::Section(Section::new());
        assert!(matches!(
            section.set_alignment(Alignment::Center),
            Err(RtfError::Unsupported(_))
        ));
        assert!(section.set_margins(Margins::uniform(1.0)).is_err());
        assert!(section.default_char_format_mut().is_err());
        assert!(section.set_frame(BlockFrame::paragraph()).is_err());
        assert!(!section.set_start_new_page(false).start_new_page());

        let mut table = Block::Table(Table::new(100.0));
        assert!(table.set_alignment(Alignment::Right).is_ok());
        assert_eq!(table.alignment(), Some(Alignment::Right));
        assert!(table.set_margins(Margins::uniform(1.0)).is_err());
        assert!(table.default_char_format_mut().is_err());
        assert!(table.set_frame(BlockFrame::paragraph()).is_err());

        let mut para = Block::Paragraph(Paragraph::new("p"));
        assert!(para.set_margins(Margins::uniform(1.0)).is_ok());
        assert!(para.default_char_format_mut().is_ok());
    }

    #[test]
    fn test_policy_rejects_content() {
        let mut footnote = BlockList::with_policy(ContentPolicy::FOOTNOTE);
        assert!(matches!(
            footnote.add_table(Table::new(100.0)),
            Err(RtfError::NotAllowed(_))
        ));
        assert!(footnote.add_section(Section::new()).is_err());

        let mut cell = BlockList::with_policy(ContentPolicy::TABLE_CELL);
        assert!(cell.add_table(Table::new(100.0)).is_err());
        assert!(cell.add_text_paragraph("a").add_footnote(0).is_ok());

        let mut header = BlockList::with_policy(ContentPolicy::HEADER_FOOTER);
        assert!(header.add_table(Table::new(100.0)).is_ok());
        assert!(header.add_text_paragraph("b").add_footnote(0).is_err());

        let mut with_note = Paragraph::new("c");
        with_note.add_footnote(0).unwrap();
        assert!(header.push(Block::Paragraph(with_note)).is_err());
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_custom_frame() {
        let mut list = BlockList::new();
        list.add_text_paragraph("z")
            .set_frame(BlockFrame::new("{\\pard\\keepn", "\\par}"));
        assert_eq!(render(&list), "{\\pard\\keepn\\ql z\\par}");
    }

    #[test]
    fn test_horizontal_line() {
        let mut list = BlockList::new();
        list.add_line(HorizontalLine::default());
        list.add_line(HorizontalLine::new(Border::new(
            BorderStyle::Double,
            1.0,
            Some(ColorDescriptor(1)),
        )));
        assert_eq!(
            render(&list),
            "{\\pard\\brdrb\\brdrw10\\brdrs\\brsp20\\par}{\\pard\\brdrb\\brdrw20\\brdrdb\\brdrcf1\\brsp20\\par}"
        );
    }

    #[test]
    fn test_cell_content_frames() {
        let mut cell = BlockList::with_policy(ContentPolicy::TABLE_CELL);
        let mut out = RtfWriter::new();
        cell.write_in_cell(&mut out, None);
        assert_eq!(out.finish(), "\\pard\\intbl\\cell");

        cell.add_text_paragraph("a");
        cell.add_text_paragraph("b");
        let mut out = RtfWriter::new();
        cell.write_in_cell(&mut out, None);
        assert_eq!(
            out.finish(),
            "{\\pard\\intbl\\ql a\\par}\\pard\\intbl\\ql b\\cell"
        );

        cell.add_line(HorizontalLine::default());
        let mut out = RtfWriter::new();
        cell.write_in_cell(&mut out, None);
        assert!(out.finish().ends_with("\\brsp20\\cell"));
    }

    #[test]
    fn test_take_and_extend_blocks() {
        let mut a = BlockList::with_policy(ContentPolicy::TABLE_CELL);
        a.add_text_paragraph("one");
        let mut b = BlockList::with_policy(ContentPolicy::TABLE_CELL);
        b.add_text_paragraph("two");
        a.extend_blocks(b.take_blocks());
        assert!(b.is_empty());
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(1).and_then(Block::as_paragraph).unwrap().text(), "two");
    }
}
