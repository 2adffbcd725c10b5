use std::ops::Range;

use tracing::{debug, trace};

use crate::model::document::{CharOffset, Token};

/// Error type for token model construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed offsets for token {index}: end {end} is before begin {begin}")]
    MalformedOffsets {
        index: usize,
        begin: usize,
        end: usize,
    },
    #[error("document has {texts} token texts but {offsets} character offsets")]
    LengthMismatch { texts: usize, offsets: usize },
}

/// Build the positional token model of a document.
///
/// Returns `Ok(None)` while the character offsets haven't been loaded yet;
/// callers show a loading state rather than an error.
pub fn build_tokens<S: AsRef<str>>(
    texts: &[S],
    offsets: Option<&[CharOffset]>,
) -> Result<Option<Vec<Token>>, TokenError> {
    let Some(offsets) = offsets else {
        trace!("token offsets not loaded yet");
        return Ok(None);
    };
    if texts.len() != offsets.len() {
        return Err(TokenError::LengthMismatch {
            texts: texts.len(),
            offsets: offsets.len(),
        });
    }

    let mut tokens = Vec::with_capacity(texts.len());
    for (index, (text, off)) in texts.iter().zip(offsets).enumerate() {
        if off.end() < off.begin() {
            return Err(TokenError::MalformedOffsets {
                index,
                begin: off.begin(),
                end: off.end(),
            });
        }
        let text = text.as_ref();
        let has_trailing_whitespace = offsets
            .get(index + 1)
            .is_some_and(|next| next.begin() > off.end());
        tokens.push(Token {
            index,
            begin_char: off.begin(),
            end_char: off.end(),
            text: text.to_string(),
            has_trailing_whitespace,
            newline_count: text.matches('\n').count(),
        });
    }

    debug!(tokens = tokens.len(), "built token model");
    Ok(Some(tokens))
}

/// Display text of a token range (`range.end` excluded).
///
/// Tokens are joined with a single space wherever the source had a gap.
/// Positions past the end of the document are ignored.
pub fn span_text(tokens: &[Token], range: Range<usize>) -> String {
    let end = range.end.min(tokens.len());
    let start = range.start.min(end);
    let span = &tokens[start..end];
    let mut out = String::new();
    for (i, token) in span.iter().enumerate() {
        out.push_str(&token.text);
        if token.has_trailing_whitespace && i + 1 < span.len() {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offsets(pairs: &[(usize, usize)]) -> Vec<CharOffset> {
        pairs.iter().map(|&(b, e)| CharOffset(b, e)).collect()
    }

    /// "The cat sat on mat"
    fn sentence() -> Vec<Token> {
        let texts = ["The", "cat", "sat", "on", "mat"];
        let offs = offsets(&[(0, 3), (4, 7), (8, 11), (12, 14), (15, 18)]);
        build_tokens(&texts, Some(offs.as_slice())).unwrap().unwrap()
    }

    #[test]
    fn test_pending_without_offsets() {
        let texts = ["a", "b"];
        assert_eq!(build_tokens(&texts, None), Ok(None));
    }

    #[test]
    fn test_positions_copied_from_offsets() {
        let tokens = sentence();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].index, 1);
        assert_eq!((tokens[1].begin_char, tokens[1].end_char), (4, 7));
        assert_eq!(tokens[1].text, "cat");
    }

    #[test]
    fn test_trailing_whitespace_from_gaps() {
        let texts = ["Hello", ",", "world", "!"];
        let offs = offsets(&[(0, 5), (5, 6), (7, 12), (12, 13)]);
        let tokens = build_tokens(&texts, Some(offs.as_slice())).unwrap().unwrap();
        let ws: Vec<bool> = tokens.iter().map(|t| t.has_trailing_whitespace).collect();
        assert_eq!(ws, vec![false, true, false, false]);
    }

    #[test]
    fn test_overlapping_offsets_have_no_whitespace() {
        let texts = ["ab", "b"];
        let offs = offsets(&[(0, 2), (1, 2)]);
        let tokens = build_tokens(&texts, Some(offs.as_slice())).unwrap().unwrap();
        assert!(!tokens[0].has_trailing_whitespace);
    }

    #[test]
    fn test_newline_count() {
        let texts = ["line", "\n\n", "next"];
        let offs = offsets(&[(0, 4), (4, 6), (6, 10)]);
        let tokens = build_tokens(&texts, Some(offs.as_slice())).unwrap().unwrap();
        let counts: Vec<usize> = tokens.iter().map(|t| t.newline_count).collect();
        assert_eq!(counts, vec![0, 2, 0]);
    }

    #[test]
    fn test_malformed_offsets_fail_fast() {
        let texts = ["ok", "bad"];
        let offs = offsets(&[(0, 2), (9, 4)]);
        assert_eq!(
            build_tokens(&texts, Some(offs.as_slice())),
            Err(TokenError::MalformedOffsets {
                index: 1,
                begin: 9,
                end: 4
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        let texts = ["a", "b", "c"];
        let offs = offsets(&[(0, 1), (2, 3)]);
        assert_eq!(
            build_tokens(&texts, Some(offs.as_slice())),
            Err(TokenError::LengthMismatch {
                texts: 3,
                offsets: 2
            })
        );
    }

    #[test]
    fn test_empty_document_is_ready() {
        let texts: [&str; 0] = [];
        assert_eq!(build_tokens(&texts, Some(&[] as &[CharOffset])), Ok(Some(Vec::new())));
    }

    #[test]
    fn test_span_text_excludes_end() {
        let tokens = sentence();
        assert_eq!(span_text(&tokens, 1..4), "cat sat on");
    }

    #[test]
    fn test_span_text_clamps() {
        let tokens = sentence();
        assert_eq!(span_text(&tokens, 3..99), "on mat");
        assert_eq!(span_text(&tokens, 7..9), "");
        assert_eq!(span_text(&tokens, 2..2), "");
    }
}
