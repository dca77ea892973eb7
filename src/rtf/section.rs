//! Section breaks.
//!
//! A [`Section`] block ends the current section. Blocks after it belong to
//! a new section, which may change page setup and restart page numbering.

use super::types::{Margins, PaperOrientation, PaperSize};
use super::writer::RtfWriter;
use crate::common::unit::pt_to_twip;

/// Section break block.
#[derive(Debug, Clone)]
pub struct Section {
    start_new_page: bool,
    orientation: Option<PaperOrientation>,
    paper_size: Option<PaperSize>,
    margins: Option<Margins>,
    restart_page_number: Option<u32>,
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    /// A section break that starts a new page and keeps the page setup.
    pub fn new() -> Self {
        Self {
            start_new_page: true,
            orientation: None,
            paper_size: None,
            margins: None,
            restart_page_number: None,
        }
    }

    /// Whether the new section begins on a new page (`\sbkpage`) or
    /// continues on the current one (`\sbknone`).
    #[inline]
    pub fn start_new_page(&self) -> bool {
        self.start_new_page
    }

    pub fn set_start_new_page(&mut self, start: bool) -> &mut Self {
        self.start_new_page = start;
        self
    }

    pub fn set_orientation(&mut self, orientation: PaperOrientation) -> &mut Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn set_paper_size(&mut self, size: PaperSize) -> &mut Self {
        self.paper_size = Some(size);
        self
    }

    /// Page margins of the new section, in points.
    pub fn set_margins(&mut self, margins: Margins) -> &mut Self {
        self.margins = Some(margins);
        self
    }

    /// Restart page numbering at `first` in the new section.
    pub fn restart_page_number(&mut self, first: u32) -> &mut Self {
        self.restart_page_number = Some(first);
        self
    }

    pub(crate) fn write(&self, out: &mut RtfWriter) {
        out.control_word("sect", None).control_word("sectd", None);
        out.control_word(if self.start_new_page { "sbkpage" } else { "sbknone" }, None);

        let landscape = self.orientation == Some(PaperOrientation::Landscape);
        if landscape {
            out.control_word("lndscpsxn", None);
        }
        if let Some(size) = self.paper_size {
            let (mut width, mut height) = (size.width(), size.height());
            if landscape {
                std::mem::swap(&mut width, &mut height);
            }
            out.control_word("pgwsxn", Some(pt_to_twip(width) as i64))
                .control_word("pghsxn", Some(pt_to_twip(height) as i64));
        }
        if let Some(margins) = self.margins {
            out.control_word("marglsxn", Some(pt_to_twip(margins.left) as i64))
                .control_word("margrsxn", Some(pt_to_twip(margins.right) as i64))
                .control_word("margtsxn", Some(pt_to_twip(margins.top) as i64))
                .control_word("margbsxn", Some(pt_to_twip(margins.bottom) as i64));
        }
        if let Some(first) = self.restart_page_number {
            out.control_word("pgnrestart", None)
                .control_word("pgnstarts", Some(first as i64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(section: &Section) -> String {
        let mut out = RtfWriter::new();
        section.write(&mut out);
        out.finish()
    }

    #[test]
    fn test_plain_section_break() {
        assert_eq!(render(&Section::new()), "\\sect\\sectd\\sbkpage");
        let mut continuous = Section::new();
        continuous.set_start_new_page(false);
        assert_eq!(render(&continuous), "\\sect\\sectd\\sbknone");
    }

    #[test]
    fn test_landscape_swaps_page_size() {
        let mut section = Section::new();
        section
            .set_orientation(PaperOrientation::Landscape)
            .set_paper_size(PaperSize::Custom {
                width: 100.0,
                height: 200.0,
            })
            .set_margins(Margins::uniform(36.0))
            .restart_page_number(1);
        assert_eq!(
            render(&section),
            "\\sect\\sectd\\sbkpage\\lndscpsxn\\pgwsxn4000\\pghsxn2000\\marglsxn720\\margrsxn720\\margtsxn720\\margbsxn720\\pgnrestart\\pgnstarts1"
        );
    }
}
