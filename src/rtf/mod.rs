//! RTF (Rich Text Format) writer and plain-text stripper.
//!
//! The writer side builds a [`Document`] out of block lists (paragraphs,
//! tables, images, section breaks and horizontal lines) and renders it to
//! markup. Character formats may be declared over arbitrary, overlapping
//! character ranges of a paragraph; they are untangled into properly nested
//! groups when the paragraph is written, with later declarations winning.
//!
//! The reader side is a single function, [`strip_rtf`], which recovers the
//! visible text of any RTF markup.
//!
//! # Example
//!
//! ```rust
//! use rtfcraft::rtf::{Document, FieldKind, Table, strip_rtf};
//!
//! let mut doc = Document::new();
//! let para = doc.add_text_paragraph("Quarterly report");
//! para.add_char_format(0, 8)?.bold();
//!
//! let mut table = Table::new(400.0);
//! table.stage_text_row(["Region", "Sales"])?;
//! table.stage_text_row(["North", "120"])?;
//! doc.add_table(table)?;
//!
//! doc.footer_mut()
//!     .add_text_paragraph("Page ")
//!     .add_field(4, FieldKind::Page)?;
//!
//! let rtf = doc.render()?;
//! let text = strip_rtf(&rtf)?;
//! assert!(text.starts_with("Quarterly report\n"));
//! # Ok::<(), rtfcraft::rtf::RtfError>(())
//! ```

mod block;
mod border;
mod document;
mod error;
mod escape;
mod field;
mod footnote;
mod format;
mod merge;
mod options;
mod paragraph;
mod picture;
mod section;
mod strip;
mod table;
mod types;
mod writer;

// Re-exports
pub use block::{Block, BlockFrame, BlockList, ContentPolicy, HorizontalLine};
pub use border::{Border, BorderStyle, Borders};
pub use document::Document;
pub use error::{RtfError, RtfResult};
pub use escape::{escape, escape_into};
pub use field::FieldKind;
pub use footnote::Footnote;
pub use format::{CharFormat, Hyperlink, HyperlinkTarget};
pub use options::DocumentOptions;
pub use paragraph::Paragraph;
pub use picture::{Image, ImageType, detect_image_type};
pub use section::Section;
pub use strip::strip_rtf;
pub use table::{CellMergeInfo, MergeRegion, Table, TableCell};
pub use types::{
    Alignment, Color, ColorDescriptor, Direction, FontDescriptor, FontStyle, Lcid, Margins,
    PaperOrientation, PaperSize, VerticalAlignment,
};
pub use writer::RtfWriter;
