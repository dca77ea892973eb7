//! Document configuration.

use super::types::{Lcid, Margins, PaperOrientation, PaperSize};
use serde::{Deserialize, Serialize};

/// Page setup and defaults applied to a whole document.
///
/// # Examples
///
/// ```rust
/// use rtfcraft::rtf::{DocumentOptions, PaperOrientation, PaperSize};
///
/// let options = DocumentOptions::new()
///     .with_paper_size(PaperSize::Letter)
///     .with_orientation(PaperOrientation::Landscape)
///     .with_default_font("Arial");
/// assert_eq!(options.default_font, "Arial");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub paper_size: PaperSize,
    pub orientation: PaperOrientation,
    /// Page margins in points
    pub margins: Margins,
    /// Font at index 0 of the font table
    pub default_font: String,
    /// Document language
    pub lcid: Lcid,
    /// Default tab stop width in twips
    pub default_tab_width: u32,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: PaperOrientation::Portrait,
            margins: Margins::uniform(72.0),
            default_font: "Times New Roman".to_owned(),
            lcid: Lcid::default(),
            default_tab_width: 720,
        }
    }
}

impl DocumentOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paper_size(mut self, size: PaperSize) -> Self {
        self.paper_size = size;
        self
    }

    pub fn with_orientation(mut self, orientation: PaperOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the page margins in points.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = name.into();
        self
    }

    pub fn with_lcid(mut self, lcid: Lcid) -> Self {
        self.lcid = lcid;
        self
    }

    /// Set the default tab stop width in twips.
    pub fn with_default_tab_width(mut self, twips: u32) -> Self {
        self.default_tab_width = twips;
        self
    }

    /// Page width and height in points, after applying the orientation.
    pub fn page_size(&self) -> (f32, f32) {
        let (width, height) = (self.paper_size.width(), self.paper_size.height());
        match self.orientation {
            PaperOrientation::Portrait => (width, height),
            PaperOrientation::Landscape => (height, width),
        }
    }
}
