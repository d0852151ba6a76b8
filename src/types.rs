use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

/// A lexed token. Offsets are byte offsets into the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub begin: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default)]
    pub meta: TokenMeta,
}

impl Token {
    pub fn new(word: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            word: word.into(),
            begin,
            end,
            before: None,
            after: None,
            original: None,
            meta: TokenMeta::default(),
        }
    }

    /// A token that tracks its surrounding raw text.
    pub fn invertible(
        word: impl Into<String>,
        begin: usize,
        end: usize,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        let word = word.into();
        Self {
            original: Some(word.clone()),
            word,
            begin,
            end,
            before: Some(before.into()),
            after: Some(after.into()),
            meta: TokenMeta::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// Names of the tags enclosing this token, outermost first.
    #[serde(default)]
    pub xml_context: Arc<[String]>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced_sentence_end: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced_sentence_until_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterance: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<MentionTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_start: Option<SectionMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_end: Option<String>,
    #[serde(default, skip_serializing_if = "TokenAnnotations::is_empty")]
    pub annotations: TokenAnnotations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Speaker,
}

/// Position of a token inside a multi-token mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionTag {
    pub text: String,
    pub kind: MentionKind,
    pub length: usize,
    pub index: usize,
}

/// Values extracted from the tags enclosing a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TokenAnnotations {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.link.is_none()
            && self.date.is_none()
            && self.location.is_none()
    }

    /// Copies every value set in `self` into `target` where `target` has none yet.
    pub fn copy_unset_into(&self, target: &mut TokenAnnotations) {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }
        fill(&mut target.author, &self.author);
        fill(&mut target.link, &self.link);
        fill(&mut target.date, &self.date);
        fill(&mut target.location, &self.location);
    }
}

/// Metadata collected while a section is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMetadata {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDate {
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub tag: String,
    pub begin: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<SectionDate>,
    /// Token ranges of the section's sentences, filled in by sentence splitting.
    pub sentences: Vec<Range<usize>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleanWarning {
    UnparsedSectionDate {
        section: String,
        begin: usize,
        raw: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanedDocument {
    pub tokens: Vec<Token>,
    pub metadata: DocMetadata,
    pub warnings: Vec<CleanWarning>,
}
