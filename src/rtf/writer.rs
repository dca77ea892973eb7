//! RTF markup builder.
//!
//! Every renderer in this crate writes through [`RtfWriter`], which takes
//! care of control word delimiting and literal-text escaping.

use super::escape::escape_into;

/// Append-only RTF markup buffer.
#[derive(Debug, Default)]
pub struct RtfWriter {
    buf: String,
    /// A control word was written last and still needs a delimiter
    /// before plain text can follow.
    pending_delimiter: bool,
}

impl RtfWriter {
    /// Create an empty writer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            pending_delimiter: false,
        }
    }

    /// Write a control word with an optional numeric parameter.
    pub fn control_word(&mut self, word: &str, param: Option<i64>) -> &mut Self {
        self.buf.push('\\');
        self.buf.push_str(word);
        if let Some(p) = param {
            let mut num = itoa::Buffer::new();
            self.buf.push_str(num.format(p));
        }
        self.pending_delimiter = true;
        self
    }

    /// Open a group.
    #[inline]
    pub fn open_group(&mut self) -> &mut Self {
        self.buf.push('{');
        self.pending_delimiter = false;
        self
    }

    /// Close a group.
    #[inline]
    pub fn close_group(&mut self) -> &mut Self {
        self.buf.push('}');
        self.pending_delimiter = false;
        self
    }

    /// Write plain text, escaping it and delimiting a preceding control word.
    pub fn text(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.delimit();
        escape_into(&mut self.buf, text);
        self
    }

    /// Write pre-rendered markup verbatim.
    pub fn raw(&mut self, markup: &str) -> &mut Self {
        if markup.is_empty() {
            return self;
        }
        self.buf.push_str(markup);
        self.pending_delimiter = ends_with_control_word(markup);
        self
    }

    /// Write the space that terminates a control word, if one is pending.
    #[inline]
    pub fn delimit(&mut self) -> &mut Self {
        if self.pending_delimiter {
            self.buf.push(' ');
            self.pending_delimiter = false;
        }
        self
    }

    /// Write a line break for readability. Line breaks are ignored by readers.
    #[inline]
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push_str("\r\n");
        self.pending_delimiter = false;
        self
    }

    /// Current length of the rendered markup.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the markup.
    #[inline]
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Whether `markup` ends in a control word that text must not run into.
fn ends_with_control_word(markup: &str) -> bool {
    let trimmed = markup.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-');
    let word = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    word.len() < trimmed.len() && word.ends_with('\\') && !word.ends_with("\\\\")
}
