//! RTF field markers (page numbers, dates).
//!
//! Fields are written as:
//! {\field{\*\fldinst INSTRUCTION }{\fldrslt }}
//!
//! The result group is left empty; readers compute it when the document is
//! laid out.

/// Field marker placed inside a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Current page number
    Page,
    /// Total number of pages
    NumPages,
    /// Current date
    Date,
    /// Current time
    Time,
}

impl FieldKind {
    /// Field instruction keyword.
    #[inline]
    pub fn instruction(self) -> &'static str {
        match self {
            FieldKind::Page => "PAGE",
            FieldKind::NumPages => "NUMPAGES",
            FieldKind::Date => "DATE",
            FieldKind::Time => "TIME",
        }
    }

    /// Complete field markup.
    pub(crate) fn markup(self) -> String {
        format!(
            "{{\\field{{\\*\\fldinst {} }}{{\\fldrslt }}}}",
            self.instruction()
        )
    }
}
