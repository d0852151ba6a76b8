use crate::types::Token;
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>|[^\s<]+|<").unwrap());

/// Splits text into whitespace-separated words and whole tags.
///
/// Every token records the whitespace around it, so the output is invertible:
/// `invert::reconstruct_text(&tokenize(text)) == text`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let spans: Vec<(usize, usize)> = TOKEN_RE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut tokens = Vec::with_capacity(spans.len());
    let mut previous_end = 0;
    for (idx, &(begin, end)) in spans.iter().enumerate() {
        let next_begin = spans.get(idx + 1).map_or(text.len(), |&(next, _)| next);
        tokens.push(Token::invertible(
            &text[begin..end],
            begin,
            end,
            &text[previous_end..begin],
            &text[end..next_begin],
        ));
        previous_end = end;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_tags_whole() {
        let tokens = tokenize("<post author=\"A B\">Hi there</post>");
        let words: Vec<&str> = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["<post author=\"A B\">", "Hi", "there", "</post>"]);
        assert_eq!(tokens[1].begin, 19);
        assert_eq!(tokens[2].before.as_deref(), Some(" "));
    }

    #[test]
    fn stray_angle_bracket_is_a_token() {
        let tokens = tokenize("a < b");
        let words: Vec<&str> = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["a", "<", "b"]);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}
