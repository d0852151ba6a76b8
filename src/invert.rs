//! Keeps `before`/`after` raw text consistent when markup tokens are dropped.

use crate::types::Token;

/// Raw text of dropped tags waiting to be attached to a surviving token.
#[derive(Debug, Default)]
pub struct RemovedText {
    pending: String,
}

impl RemovedText {
    /// Records a dropped tag token.
    pub fn drop_tag(&mut self, token: &Token, is_last: bool) {
        if let Some(before) = &token.before {
            self.pending.push_str(before);
        }
        if let Some(original) = &token.original {
            self.pending.push_str(original);
        }
        if is_last {
            if let Some(after) = &token.after {
                self.pending.push_str(after);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Splices pending text around `current`, the newest surviving token.
    pub fn attach(&mut self, previous: Option<&mut Token>, current: &mut Token) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let Some(before) = current.before.as_mut() else {
            return;
        };
        before.insert_str(0, &pending);
        if let Some(previous) = previous {
            previous
                .after
                .get_or_insert_with(String::new)
                .push_str(&pending);
        }
    }

    /// Hands trailing removed text to the last surviving token, if that
    /// token tracks its raw text.
    pub fn finish(self, last: Option<&mut Token>) {
        if self.pending.is_empty() {
            return;
        }
        match last {
            Some(last) if last.original.is_some() => last.after = Some(self.pending),
            _ => tracing::trace!("dropping {} bytes of trailing markup", self.pending.len()),
        }
    }
}

/// Rebuilds the source text covered by `tokens`.
pub fn reconstruct_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for token in tokens {
        if let Some(before) = &token.before {
            text.push_str(before);
        }
        text.push_str(token.original.as_deref().unwrap_or(&token.word));
    }
    if let Some(after) = tokens.last().and_then(|t| t.after.as_deref()) {
        text.push_str(after);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn lexer_output_reconstructs_input() {
        let text = "  <doc id=\"1\">\n Hello,  world </doc>\n";
        assert_eq!(reconstruct_text(&tokenize(text)), text);
    }

    #[test]
    fn pending_text_moves_to_neighbours() {
        let mut removed = RemovedText::default();
        let mut previous = Token::invertible("a", 0, 1, "", " ");
        let tag = Token::invertible("<b>", 2, 5, " ", " ");
        let mut current = Token::invertible("c", 6, 7, " ", "");

        removed.drop_tag(&tag, false);
        removed.attach(Some(&mut previous), &mut current);

        assert!(removed.is_empty());
        assert_eq!(current.before.as_deref(), Some(" <b> "));
        assert_eq!(previous.after.as_deref(), Some("  <b>"));
        assert_eq!(reconstruct_text(&[previous, current]), "a <b> c");
    }

    #[test]
    fn trailing_text_needs_original() {
        let mut removed = RemovedText::default();
        removed.drop_tag(&Token::invertible("</p>", 5, 9, "", "\n"), true);
        let mut plain = Token::new("x", 0, 1);
        removed.finish(Some(&mut plain));
        assert_eq!(plain.after, None);

        let mut removed = RemovedText::default();
        removed.drop_tag(&Token::invertible("</p>", 5, 9, "", "\n"), true);
        let mut tracked = Token::invertible("x", 0, 1, "", "");
        removed.finish(Some(&mut tracked));
        assert_eq!(tracked.after.as_deref(), Some("</p>\n"));
    }
}
