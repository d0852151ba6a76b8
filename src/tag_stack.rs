use crate::error::TagError;
use crate::matchers::TagMatcher;
use std::sync::Arc;

/// Open tag names plus the number of open tags whose names match the
/// removal matcher.
#[derive(Debug)]
pub struct TagStack<'a> {
    removal: &'a TagMatcher,
    open: Vec<String>,
    match_depth: isize,
    /// Snapshot of `open` shared by consecutive tokens; dropped on every change.
    context: Option<Arc<[String]>>,
}

impl<'a> TagStack<'a> {
    pub fn new(removal: &'a TagMatcher) -> Self {
        Self {
            removal,
            open: Vec::new(),
            match_depth: 0,
            context: None,
        }
    }

    pub fn open(&mut self, name: &str) {
        self.context = None;
        if self.removal.matches(name) {
            self.match_depth += 1;
        }
        self.open.push(name.to_string());
    }

    /// Pops up to and including the innermost tag named `name`.
    ///
    /// In tolerant mode, tags left open inside it are closed implicitly.
    pub fn close(&mut self, name: &str, tolerant: bool) -> Result<(), TagError> {
        self.context = None;
        loop {
            let Some(last) = self.open.pop() else {
                return Err(TagError::Unbalanced {
                    tag: name.to_string(),
                });
            };
            if self.removal.matches(&last) {
                self.match_depth -= 1;
            }
            if last == name {
                break;
            }
            if !tolerant {
                return Err(TagError::Mismatched {
                    closing: name.to_string(),
                    open: last,
                });
            }
            tracing::debug!("closing unterminated <{}> at </{}>", last, name);
        }
        assert!(
            self.match_depth >= 0,
            "match depth went negative: more close tags than open tags were counted"
        );
        Ok(())
    }

    pub fn match_depth(&self) -> usize {
        self.match_depth as usize
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Current tag path, outermost first.
    pub fn context(&mut self) -> Arc<[String]> {
        self.context
            .get_or_insert_with(|| Arc::from(self.open.as_slice()))
            .clone()
    }

    pub fn finish(self, tolerant: bool) -> Result<(), TagError> {
        match self.open.last() {
            Some(last) if !tolerant => Err(TagError::Unclosed { tag: last.clone() }),
            Some(_) => {
                tracing::debug!("ignoring {} unclosed tags at end of input", self.open.len());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Whether plain text survives at the given depth.
pub fn keeps_text(removal: Option<&TagMatcher>, match_depth: usize) -> bool {
    match removal {
        None => true,
        Some(matcher) => match_depth == 0 || matcher.matches(""),
    }
}
