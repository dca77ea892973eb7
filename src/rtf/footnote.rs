//! Footnotes.

use super::block::{BlockList, ContentPolicy};
use super::writer::RtfWriter;

/// A footnote anchored after a character of its paragraph.
///
/// The footnote body is its own block list. It cannot hold further
/// footnotes or tables.
#[derive(Debug, Clone)]
pub struct Footnote {
    position: usize,
    blocks: BlockList,
}

impl Footnote {
    pub(crate) fn new(position: usize) -> Self {
        Self {
            position,
            blocks: BlockList::with_policy(ContentPolicy::FOOTNOTE),
        }
    }

    /// Offset of the character the reference mark follows.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut BlockList {
        &mut self.blocks
    }

    /// Reference mark followed by the footnote destination.
    pub(crate) fn render(&self) -> String {
        let mut out = RtfWriter::new();
        out.open_group()
            .control_word("super", None)
            .control_word("chftn", None)
            .close_group();
        out.open_group()
            .control_word("footnote", None)
            .control_word("pard", None)
            .control_word("plain", None)
            .control_word("chftn", None)
            .delimit();
        self.blocks.write(&mut out, None);
        out.close_group();
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footnote_markup() {
        let mut note = Footnote::new(3);
        note.blocks_mut().add_text_paragraph("See appendix.");
        let rtf = note.render();
        assert!(rtf.starts_with("{\\super\\chftn}{\\footnote\\pard\\plain\\chftn "));
        assert!(rtf.contains("See appendix."));
        assert!(rtf.ends_with('}'));
        assert_eq!(note.position(), 3);
    }

    #[test]
    fn test_footnote_rejects_nested_footnote() {
        let mut note = Footnote::new(0);
        let para = note.blocks_mut().add_text_paragraph("x");
        assert!(para.add_footnote(0).is_err());
    }
}
