//! Metadata keys that annotation rules can fill, one closed set per rule level.

use crate::types::{DocMetadata, SectionMetadata, TokenAnnotations};
use std::fmt::Debug;
use std::hash::Hash;

pub trait MetadataKey: Copy + Eq + Hash + Debug + 'static {
    fn all() -> &'static [Self];
    fn name(self) -> &'static str;
    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    /// Resolves a configured key name. Matching ignores case and an
    /// optional `Annotation` suffix, so `docID` and `DocIDAnnotation` agree.
    fn resolve(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let wanted = lowered.strip_suffix("annotation").unwrap_or(&lowered);
        Self::all().iter().copied().find(|key| {
            key.name() == wanted || key.aliases().iter().any(|alias| *alias == wanted)
        })
    }
}

/// Something annotation rules can write values into.
pub trait AnnotationTarget<K: MetadataKey> {
    fn set(&mut self, key: K, value: String);
    fn remove(&mut self, key: K);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKey {
    DocId,
    DocDate,
    DocType,
    DocSourceType,
    Author,
}

impl MetadataKey for DocKey {
    fn all() -> &'static [Self] {
        &[
            DocKey::DocId,
            DocKey::DocDate,
            DocKey::DocType,
            DocKey::DocSourceType,
            DocKey::Author,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            DocKey::DocId => "docid",
            DocKey::DocDate => "docdate",
            DocKey::DocType => "doctype",
            DocKey::DocSourceType => "docsourcetype",
            DocKey::Author => "author",
        }
    }
}

impl AnnotationTarget<DocKey> for DocMetadata {
    fn set(&mut self, key: DocKey, value: String) {
        *doc_slot(self, key) = Some(value);
    }

    fn remove(&mut self, key: DocKey) {
        *doc_slot(self, key) = None;
    }
}

fn doc_slot(meta: &mut DocMetadata, key: DocKey) -> &mut Option<String> {
    match key {
        DocKey::DocId => &mut meta.doc_id,
        DocKey::DocDate => &mut meta.doc_date,
        DocKey::DocType => &mut meta.doc_type,
        DocKey::DocSourceType => &mut meta.doc_source_type,
        DocKey::Author => &mut meta.author,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Author,
    Date,
    Id,
}

impl MetadataKey for SectionKey {
    fn all() -> &'static [Self] {
        &[SectionKey::Author, SectionKey::Date, SectionKey::Id]
    }

    fn name(self) -> &'static str {
        match self {
            SectionKey::Author => "author",
            SectionKey::Date => "date",
            SectionKey::Id => "id",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            SectionKey::Author => &[],
            SectionKey::Date => &["sectiondate"],
            SectionKey::Id => &["sectionid"],
        }
    }
}

impl AnnotationTarget<SectionKey> for SectionMetadata {
    fn set(&mut self, key: SectionKey, value: String) {
        *section_slot(self, key) = Some(value);
    }

    fn remove(&mut self, key: SectionKey) {
        *section_slot(self, key) = None;
    }
}

fn section_slot(meta: &mut SectionMetadata, key: SectionKey) -> &mut Option<String> {
    match key {
        SectionKey::Author => &mut meta.author,
        SectionKey::Date => &mut meta.date,
        SectionKey::Id => &mut meta.id,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Author,
    Link,
    Date,
    Location,
}

impl MetadataKey for TokenKey {
    fn all() -> &'static [Self] {
        &[
            TokenKey::Author,
            TokenKey::Link,
            TokenKey::Date,
            TokenKey::Location,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            TokenKey::Author => "author",
            TokenKey::Link => "link",
            TokenKey::Date => "date",
            TokenKey::Location => "location",
        }
    }
}

impl AnnotationTarget<TokenKey> for TokenAnnotations {
    fn set(&mut self, key: TokenKey, value: String) {
        *token_slot(self, key) = Some(value);
    }

    fn remove(&mut self, key: TokenKey) {
        *token_slot(self, key) = None;
    }
}

fn token_slot(meta: &mut TokenAnnotations, key: TokenKey) -> &mut Option<String> {
    match key {
        TokenKey::Author => &mut meta.author,
        TokenKey::Link => &mut meta.link,
        TokenKey::Date => &mut meta.date,
        TokenKey::Location => &mut meta.location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(DocKey::resolve("docID"), Some(DocKey::DocId));
        assert_eq!(DocKey::resolve("DocIDAnnotation"), Some(DocKey::DocId));
        assert_eq!(DocKey::resolve("docsourcetype"), Some(DocKey::DocSourceType));
        assert_eq!(SectionKey::resolve("SectionDate"), Some(SectionKey::Date));
        assert_eq!(TokenKey::resolve("link"), Some(TokenKey::Link));
        assert_eq!(TokenKey::resolve("speaker"), None);
    }

    #[test]
    fn targets_write_into_matching_fields() {
        let mut meta = DocMetadata::default();
        meta.set(DocKey::DocType, "story".to_string());
        assert_eq!(meta.doc_type.as_deref(), Some("story"));
        meta.remove(DocKey::DocType);
        assert_eq!(meta.doc_type, None);
    }
}
