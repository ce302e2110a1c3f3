//! Conversion of platform formatting entities into HTML-like markup.
//!
//! Entity offsets and lengths count UTF-16 code units of the original text,
//! as chat platforms report them. Tags are spliced from right to left, so
//! every offset keeps referring to the unmodified text.

use serde::{Deserialize, Serialize};

/// Semantic style of a formatting span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpanStyle {
    Bold,
    Italic,
    Code,
    Pre,
    /// Any style without a markup equivalent (links, mentions, ...).
    Other(String),
}

impl SpanStyle {
    /// Opening and closing tag, or `None` for styles left unmarked.
    pub fn tags(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Bold => Some(("<b>", "</b>")),
            Self::Italic => Some(("<i>", "</i>")),
            Self::Code => Some(("<code>", "</code>")),
            Self::Pre => Some(("<pre>", "</pre>")),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for SpanStyle {
    fn from(value: &str) -> Self {
        match value {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "code" => Self::Code,
            "pre" => Self::Pre,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for SpanStyle {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SpanStyle> for String {
    fn from(value: SpanStyle) -> Self {
        value.as_str().to_string()
    }
}

/// A formatting run within a message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupSpan {
    /// Style of the run.
    #[serde(rename = "type")]
    pub style: SpanStyle,
    /// Start, in UTF-16 code units.
    pub offset: usize,
    /// Length, in UTF-16 code units.
    pub length: usize,
}

impl MarkupSpan {
    pub fn new(style: impl Into<SpanStyle>, offset: usize, length: usize) -> Self {
        Self {
            style: style.into(),
            offset,
            length,
        }
    }
}

/// A tag to splice in at a byte position of the original text.
struct Splice {
    at: usize,
    closing: bool,
    rank: usize,
    tag: &'static str,
}

/// Insert markup tags for every recognized span of `text`.
///
/// Unrecognized styles and empty spans are skipped. Spans nest by
/// containment: at a shared start the longer span encloses the shorter, and
/// equal spans nest in list order. Offsets past the end of the text are
/// clamped to it.
pub fn rewrite_entities(text: &str, spans: &[MarkupSpan]) -> String {
    let mut resolved: Vec<(usize, usize, usize, (&'static str, &'static str))> = spans
        .iter()
        .enumerate()
        .filter_map(|(position, span)| {
            let tags = span.style.tags()?;
            let start = utf16_to_byte(text, span.offset);
            let end = utf16_to_byte(text, span.offset.saturating_add(span.length));
            (end > start).then_some((start, end, position, tags))
        })
        .collect();

    if resolved.is_empty() {
        return text.to_string();
    }

    // Opening order: leftmost first, outer before inner.
    resolved.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

    let mut splices: Vec<Splice> = Vec::with_capacity(resolved.len() * 2);
    for (rank, (start, end, _, (open, close))) in resolved.iter().enumerate() {
        splices.push(Splice {
            at: *start,
            closing: false,
            rank,
            tag: *open,
        });
        splices.push(Splice {
            at: *end,
            closing: true,
            rank,
            tag: *close,
        });
    }

    // Output order at each position: closing tags (innermost first), then
    // opening tags (outermost first).
    splices.sort_by(|a, b| {
        a.at.cmp(&b.at)
            .then(b.closing.cmp(&a.closing))
            .then(if a.closing {
                b.rank.cmp(&a.rank)
            } else {
                a.rank.cmp(&b.rank)
            })
    });

    let extra: usize = splices.iter().map(|s| s.tag.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    out.push_str(text);

    // Rightmost first: each insertion lands at or after every pending one.
    for splice in splices.iter().rev() {
        out.insert_str(splice.at, splice.tag);
    }

    out
}

/// Byte index of the first char boundary at or after a UTF-16 offset.
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0usize;
    for (byte, c) in text.char_indices() {
        if units >= offset {
            return byte;
        }
        units += c.len_utf16();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spans_returns_text_unchanged() {
        let text = "Nice quote here";
        assert_eq!(rewrite_entities(text, &[]), text);
    }

    #[test]
    fn test_single_bold_span() {
        let spans = [MarkupSpan::new("bold", 0, 4)];
        assert_eq!(
            rewrite_entities("Nice quote here", &spans),
            "<b>Nice</b> quote here"
        );
    }

    #[test]
    fn test_two_disjoint_spans_in_any_order() {
        let expected = "<b>Nice</b> quote <i>here</i>.";

        let spans = [MarkupSpan::new("bold", 0, 4), MarkupSpan::new("italic", 11, 4)];
        assert_eq!(rewrite_entities("Nice quote here.", &spans), expected);

        let reversed = [MarkupSpan::new("italic", 11, 4), MarkupSpan::new("bold", 0, 4)];
        assert_eq!(rewrite_entities("Nice quote here.", &reversed), expected);
    }

    #[test]
    fn test_unknown_style_is_skipped() {
        let spans = [
            MarkupSpan::new("url", 0, 4),
            MarkupSpan::new("code", 5, 5),
        ];
        assert_eq!(
            rewrite_entities("Nice quote here", &spans),
            "Nice <code>quote</code> here"
        );
        assert_eq!(
            rewrite_entities("Nice quote here", &[MarkupSpan::new("mention", 0, 4)]),
            "Nice quote here"
        );
    }

    #[test]
    fn test_nested_spans_stay_well_formed() {
        let spans = [
            MarkupSpan::new("italic", 5, 5),
            MarkupSpan::new("bold", 0, 15),
        ];
        assert_eq!(
            rewrite_entities("Nice quote here", &spans),
            "<b>Nice <i>quote</i> here</b>"
        );
    }

    #[test]
    fn test_shared_start_longer_span_encloses() {
        let spans = [
            MarkupSpan::new("italic", 0, 4),
            MarkupSpan::new("bold", 0, 10),
        ];
        assert_eq!(
            rewrite_entities("Nice quote here", &spans),
            "<b><i>Nice</i> quote</b> here"
        );
    }

    #[test]
    fn test_identical_spans_nest_in_list_order() {
        let spans = [MarkupSpan::new("bold", 0, 4), MarkupSpan::new("italic", 0, 4)];
        assert_eq!(rewrite_entities("Nice", &spans), "<b><i>Nice</i></b>");
    }

    #[test]
    fn test_adjacent_spans_close_before_open() {
        let spans = [MarkupSpan::new("italic", 4, 3), MarkupSpan::new("bold", 0, 4)];
        assert_eq!(rewrite_entities("abcdefg", &spans), "<b>abcd</b><i>efg</i>");
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        // The emoji is one char but two UTF-16 code units.
        let text = "😀 wow ok";
        let spans = [MarkupSpan::new("bold", 3, 3)];
        assert_eq!(rewrite_entities(text, &spans), "😀 <b>wow</b> ok");

        let text = "café time";
        let spans = [MarkupSpan::new("pre", 5, 4)];
        assert_eq!(rewrite_entities(text, &spans), "café <pre>time</pre>");
    }

    #[test]
    fn test_out_of_range_spans_are_clamped() {
        let spans = [MarkupSpan::new("bold", 2, 100)];
        assert_eq!(rewrite_entities("abcd", &spans), "ab<b>cd</b>");

        let spans = [MarkupSpan::new("bold", 10, 2)];
        assert_eq!(rewrite_entities("abcd", &spans), "abcd");
    }

    #[test]
    fn test_span_deserializes_from_entity_json() {
        let json = r#"[{"type": "bold", "offset": 0, "length": 4},
                       {"type": "text_link", "offset": 5, "length": 2, "url": "https://x"}]"#;
        let spans: Vec<MarkupSpan> = serde_json::from_str(json).unwrap();
        assert_eq!(spans[0].style, SpanStyle::Bold);
        assert_eq!(spans[1].style, SpanStyle::Other("text_link".to_string()));
    }
}
