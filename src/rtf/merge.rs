//! Range merging and token splicing for paragraph text.
//!
//! Character formats are declared independently and may overlap freely.
//! Before a paragraph is written they are resolved into a set of disjoint
//! ranges in which the most recently declared format owns every character it
//! covers. The paragraph text is then cut into a token list and each disjoint
//! range is spliced in as a head/tail markup pair, so the output is always
//! properly nested no matter how the declarations overlapped.
//!
//! Offsets count Unicode scalar values, never bytes, and markup tokens never
//! count towards an offset.

use super::writer::RtfWriter;
use log::{debug, trace};

/// A resolved, non-overlapping range. `format` is the index of the declared
/// format that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DisjointRange {
    pub begin: usize,
    pub end: usize,
    pub format: usize,
}

/// Resolve declared ranges into disjoint ranges.
///
/// `declared` yields each format's inclusive range in declaration order,
/// `None` meaning the whole text. Tails past the text are clamped and ranges
/// left empty by clamping are discarded.
pub(crate) fn resolve_disjoint_ranges<I>(declared: I, len: usize) -> Vec<DisjointRange>
where
    I: IntoIterator<Item = Option<(usize, usize)>>,
{
    let mut disjoint: Vec<DisjointRange> = Vec::new();
    if len == 0 {
        return disjoint;
    }

    for (format, range) in declared.into_iter().enumerate() {
        let (begin, end) = range.unwrap_or((0, len - 1));
        let end = end.min(len - 1);
        if begin > end {
            trace!("discarding format {format}: range {begin}..={end} is empty after clamping");
            continue;
        }

        let mut next = Vec::with_capacity(disjoint.len() + 2);
        for existing in disjoint.drain(..) {
            if end < existing.begin || begin > existing.end {
                next.push(existing);
            } else if begin <= existing.begin && end >= existing.end {
                // fully covered, dropped
            } else if begin <= existing.begin {
                next.push(DisjointRange {
                    begin: end + 1,
                    ..existing
                });
            } else if end >= existing.end {
                next.push(DisjointRange {
                    end: begin - 1,
                    ..existing
                });
            } else {
                trace!(
                    "format {format} splits format {} at {begin}..={end}",
                    existing.format
                );
                next.push(DisjointRange {
                    end: begin - 1,
                    ..existing
                });
                next.push(DisjointRange {
                    begin: end + 1,
                    ..existing
                });
            }
        }
        next.push(DisjointRange { begin, end, format });
        disjoint = next;
    }

    disjoint
}

/// A paragraph token: a run of literal text or a fragment of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text(String),
    /// Opening markup of a disjoint range. Text inside a placeholder range
    /// is not written; the head carries the visible text itself.
    RangeHead { markup: String, placeholder: bool },
    RangeTail { markup: String, placeholder: bool },
    /// Footnote or field marker
    Anchor(String),
}

/// Markup for one disjoint range.
#[derive(Debug, Clone)]
pub(crate) struct RangeMarkup {
    pub begin: usize,
    pub end: usize,
    pub head: String,
    pub tail: String,
    pub placeholder: bool,
}

/// Token list of a paragraph.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    len: usize,
}

impl TokenStream {
    /// A stream holding `text` as a single text token.
    pub fn new(text: &str) -> Self {
        let len = text.chars().count();
        let tokens = if len == 0 {
            Vec::new()
        } else {
            vec![Token::Text(text.to_owned())]
        };
        Self { tokens, len }
    }

    /// Number of text characters in the stream.
    #[inline]
    pub fn text_len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Split so that text character `pos` starts a token; return that token's index.
    fn split_before(&mut self, pos: usize) -> Option<usize> {
        let mut seen = 0;
        for i in 0..self.tokens.len() {
            let Token::Text(text) = &self.tokens[i] else {
                continue;
            };
            let count = text.chars().count();
            if pos < seen + count {
                let local = pos - seen;
                if local == 0 {
                    return Some(i);
                }
                self.split_text_token(i, local);
                return Some(i + 1);
            }
            seen += count;
        }
        None
    }

    /// Split so that text character `pos` ends a token; return the index right after it.
    fn split_after(&mut self, pos: usize) -> Option<usize> {
        let mut seen = 0;
        for i in 0..self.tokens.len() {
            let Token::Text(text) = &self.tokens[i] else {
                continue;
            };
            let count = text.chars().count();
            if pos < seen + count {
                let local = pos - seen + 1;
                if local < count {
                    self.split_text_token(i, local);
                }
                return Some(i + 1);
            }
            seen += count;
        }
        None
    }

    fn split_text_token(&mut self, index: usize, at_char: usize) {
        let Token::Text(text) = &mut self.tokens[index] else {
            return;
        };
        let byte = text
            .char_indices()
            .nth(at_char)
            .map_or(text.len(), |(b, _)| b);
        let rest = text.split_off(byte);
        self.tokens.insert(index + 1, Token::Text(rest));
    }

    /// Splice a range's head before its first character and its tail after its last.
    pub fn splice_range(&mut self, range: RangeMarkup) {
        if range.begin > range.end || range.end >= self.len {
            return;
        }
        if let Some(at) = self.split_before(range.begin) {
            self.tokens.insert(
                at,
                Token::RangeHead {
                    markup: range.head,
                    placeholder: range.placeholder,
                },
            );
        }
        if let Some(at) = self.split_after(range.end) {
            self.tokens.insert(
                at,
                Token::RangeTail {
                    markup: range.tail,
                    placeholder: range.placeholder,
                },
            );
        }
    }

    /// Splice an anchor right after text character `offset`, behind any
    /// anchors already placed there. Stale offsets are dropped.
    pub fn splice_anchor(&mut self, offset: usize, markup: String) -> bool {
        if offset >= self.len {
            debug!(
                "dropping anchor at offset {offset}: text is only {} characters long",
                self.len
            );
            return false;
        }
        let Some(mut at) = self.split_after(offset) else {
            return false;
        };
        while matches!(self.tokens.get(at), Some(Token::Anchor(_))) {
            at += 1;
        }
        self.tokens.insert(at, Token::Anchor(markup));
        true
    }

    /// Write the stream: text is escaped, markup is written verbatim.
    pub fn write(&self, out: &mut RtfWriter) {
        let mut in_placeholder = false;
        for token in &self.tokens {
            match token {
                Token::Text(text) => {
                    if !in_placeholder {
                        out.text(text);
                    }
                },
                Token::RangeHead {
                    markup,
                    placeholder,
                } => {
                    out.raw(markup);
                    in_placeholder = *placeholder;
                },
                Token::RangeTail {
                    markup,
                    placeholder,
                } => {
                    if *placeholder {
                        in_placeholder = false;
                    }
                    out.raw(markup);
                },
                Token::Anchor(markup) => {
                    out.raw(markup);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(stream: &TokenStream) -> String {
        let mut out = RtfWriter::new();
        stream.write(&mut out);
        out.finish()
    }

    fn markup(begin: usize, end: usize, tag: &str) -> RangeMarkup {
        RangeMarkup {
            begin,
            end,
            head: format!("<{tag}>"),
            tail: format!("</{tag}>"),
            placeholder: false,
        }
    }

    #[test]
    fn test_later_range_splits_earlier() {
        let ranges = resolve_disjoint_ranges([Some((0, 9)), Some((3, 5))], 10);
        assert_eq!(
            ranges,
            vec![
                DisjointRange { begin: 0, end: 2, format: 0 },
                DisjointRange { begin: 6, end: 9, format: 0 },
                DisjointRange { begin: 3, end: 5, format: 1 },
            ]
        );
    }

    #[test]
    fn test_later_range_trims_head_and_tail() {
        let ranges = resolve_disjoint_ranges([Some((2, 6)), Some((0, 3)), Some((5, 8))], 10);
        assert_eq!(
            ranges,
            vec![
                DisjointRange { begin: 4, end: 4, format: 0 },
                DisjointRange { begin: 0, end: 3, format: 1 },
                DisjointRange { begin: 5, end: 8, format: 2 },
            ]
        );
    }

    #[test]
    fn test_covering_range_deletes_earlier() {
        let ranges = resolve_disjoint_ranges([Some((2, 3)), None], 5);
        assert_eq!(ranges, vec![DisjointRange { begin: 0, end: 4, format: 1 }]);
    }

    #[test]
    fn test_clamp_and_discard() {
        let ranges = resolve_disjoint_ranges([Some((1, 50)), Some((7, 9))], 5);
        assert_eq!(ranges, vec![DisjointRange { begin: 1, end: 4, format: 0 }]);
        assert!(resolve_disjoint_ranges([None], 0).is_empty());
    }

    #[test]
    fn test_splice_nested_output() {
        let mut stream = TokenStream::new("abcdef");
        stream.splice_range(markup(3, 5, "b"));
        stream.splice_range(markup(0, 2, "a"));
        assert_eq!(render(&stream), "<a>abc</a><b>def</b>");
    }

    #[test]
    fn test_splice_inner_range() {
        let mut stream = TokenStream::new("Hello World");
        stream.splice_range(markup(6, 10, "w"));
        stream.splice_range(markup(0, 0, "h"));
        assert_eq!(render(&stream), "<h>H</h>ello <w>World</w>");
    }

    #[test]
    fn test_markup_does_not_shift_offsets() {
        let mut stream = TokenStream::new("abc");
        stream.splice_range(markup(1, 1, "x"));
        assert!(stream.splice_anchor(1, "[fn]".into()));
        assert!(stream.splice_anchor(2, "[end]".into()));
        assert_eq!(render(&stream), "a<x>b[fn]</x>c[end]");
    }

    #[test]
    fn test_anchors_at_same_offset_keep_order() {
        let mut stream = TokenStream::new("ab");
        stream.splice_anchor(0, "[1]".into());
        stream.splice_anchor(0, "[2]".into());
        assert_eq!(render(&stream), "a[1][2]b");
    }

    #[test]
    fn test_stale_anchor_is_dropped() {
        let mut stream = TokenStream::new("abc");
        assert!(!stream.splice_anchor(3, "[x]".into()));
        assert!(!stream.splice_anchor(100, "[y]".into()));
        assert_eq!(stream.tokens(), &[Token::Text("abc".into())]);

        let mut empty = TokenStream::new("");
        assert!(!empty.splice_anchor(0, "[z]".into()));
        assert_eq!(render(&empty), "");
    }

    #[test]
    fn test_placeholder_text_is_not_written() {
        let mut stream = TokenStream::new("see link!");
        stream.splice_range(RangeMarkup {
            begin: 4,
            end: 7,
            head: "{\\field LINK".into(),
            tail: "}".into(),
            placeholder: true,
        });
        assert_eq!(render(&stream), "see {\\field LINK}!");
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut stream = TokenStream::new("héllo");
        stream.splice_range(markup(1, 1, "e"));
        assert_eq!(render(&stream), "h<e>\\u233?</e>llo");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_disjoint_ranges_cover_each_char_once(
            len in 0usize..40,
            declared in prop::collection::vec(
                prop::option::weighted(0.9, (0usize..45, 0usize..45)),
                0..8,
            ),
        ) {
            let declared: Vec<Option<(usize, usize)>> = declared
                .into_iter()
                .map(|r| r.map(|(a, b)| (a.min(b), a.max(b))))
                .collect();
            let ranges = resolve_disjoint_ranges(declared.iter().copied(), len);

            for pos in 0..len {
                let expected_owner = declared
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| match r {
                        None => true,
                        Some((b, e)) => *b <= pos && pos <= *e,
                    })
                    .map(|(i, _)| i)
                    .last();
                let covering: Vec<_> = ranges
                    .iter()
                    .filter(|r| r.begin <= pos && pos <= r.end)
                    .collect();
                prop_assert_eq!(covering.len(), usize::from(expected_owner.is_some()));
                if let Some(owner) = expected_owner {
                    prop_assert_eq!(covering[0].format, owner);
                }
            }
            for r in &ranges {
                prop_assert!(r.begin <= r.end && r.end < len);
            }
        }

        #[test]
        fn prop_splicing_preserves_text(
            text in "[a-z]{0,20}",
            declared in prop::collection::vec((0usize..25, 0usize..25), 0..6),
        ) {
            let len = text.chars().count();
            let declared: Vec<_> = declared
                .into_iter()
                .map(|(a, b)| Some((a.min(b), a.max(b))))
                .collect();
            let mut stream = TokenStream::new(&text);
            for r in resolve_disjoint_ranges(declared, len) {
                stream.splice_range(markup(r.begin, r.end, "x"));
            }
            let rendered = render(&stream);
            prop_assert_eq!(rendered.replace("<x>", "").replace("</x>", ""), text);
            prop_assert_eq!(rendered.matches("<x>").count(), rendered.matches("</x>").count());
        }
    }
}
