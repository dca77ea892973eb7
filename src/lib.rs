//! # rtfcraft
//!
//! A library for producing Rich Text Format documents and for recovering the
//! plain text of existing RTF markup.
//!
//! ## Features
//!
//! - **Overlapping character formats**: declare bold, italic, colors, fonts
//!   or hyperlinks over any character range; the writer untangles them into
//!   well-nested groups
//! - **Tables**: stage rows and columns, freeze the grid, merge rectangular
//!   regions and let neighboring borders resolve to a single stroke
//! - **Anchored content**: footnotes and page/date fields attached to a
//!   character offset
//! - **Sections, images, headers and footers**
//! - **Stripping**: [`rtf::strip_rtf`] turns any RTF into plain text
//!
//! ## Example
//!
//! ```rust
//! use rtfcraft::{Document, strip_rtf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! doc.add_text_paragraph("Hello, World!")
//!     .add_char_format(7, 11)?
//!     .italic();
//!
//! let rtf = doc.render()?;
//! assert!(rtf.starts_with("{\\rtf1"));
//! assert_eq!(strip_rtf(&rtf)?.trim_end(), "Hello, World!");
//! # Ok(())
//! # }
//! ```

/// Common types shared across the crate
///
/// Error wrapping and measurement unit conversions.
pub mod common;

/// RTF writer and stripper
pub mod rtf;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use rtf::{Document, DocumentOptions, RtfError, RtfResult, strip_rtf};
