//! Literal text escaping.
//!
//! Printable ASCII passes through unchanged. Backslash and braces are
//! escaped with a backslash, tabs and line breaks become `\tab` and `\line`,
//! the remaining control characters become `\'hh` hex escapes, and every
//! non-ASCII code point becomes one or two signed 16-bit `\uN?` escapes with
//! a single `?` fallback character (the document declares `\uc1`).

/// Append the escaped form of `text` to `out`.
pub fn escape_into(out: &mut String, text: &str) {
    let mut buf = itoa::Buffer::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\t' => out.push_str("\\tab "),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push_str("\\line ");
                }
            },
            '\n' => out.push_str("\\line "),
            c if (c as u32) < 0x20 => {
                out.push_str("\\'");
                push_hex_byte(out, c as u8);
            },
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for &unit in c.encode_utf16(&mut units).iter() {
                    out.push_str("\\u");
                    out.push_str(buf.format(unit as i16));
                    out.push('?');
                }
            },
        }
    }
}

/// Escape `text` into a new string.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

#[inline]
fn push_hex_byte(out: &mut String, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0F) as usize] as char);
}

/// Lowercase hex dump of `bytes`, broken into lines of `line_width` characters.
pub(crate) fn hex_dump(bytes: &[u8], line_width: usize) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / line_width.max(2) + 1);
    let per_line = (line_width / 2).max(1);
    for (i, &byte) in bytes.iter().enumerate() {
        if i > 0 && i % per_line == 0 {
            out.push('\n');
        }
        push_hex_byte(&mut out, byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(escape("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_structural_characters() {
        assert_eq!(escape(r"a\b{c}"), r"a\\b\{c\}");
        assert_eq!(escape("a\tb"), "a\\tab b");
        assert_eq!(escape("a\r\nb\rc\nd"), "a\\line b\\line c\\line d");
        assert_eq!(escape("\u{1}"), "\\'01");
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(escape("é"), "\\u233?");
        // Above 0x7FFF the parameter is written as a signed 16-bit value
        assert_eq!(escape("\u{FF01}"), "\\u-255?");
        // Astral plane characters use a surrogate pair
        assert_eq!(escape("😀"), "\\u-10179?\\u-8704?");
    }

    #[test]
    fn test_hex_dump_wraps() {
        assert_eq!(hex_dump(&[0x00, 0xAB, 0x10], 4), "00ab\n10");
        assert_eq!(hex_dump(&[], 128), "");
    }
}
