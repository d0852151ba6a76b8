use crate::annotate::{apply_tag, tokens_to_string, AttributeStacks, Extraction};
use crate::config::CleanConfig;
use crate::dates::{ChronoDateNormalizer, DateNormalizer};
use crate::discourse::{force_sentence_end, Discourse, OpenSection};
use crate::error::{ConfigError, TagError};
use crate::invert::RemovedText;
use crate::keys::{DocKey, TokenKey};
use crate::markup::{parse_tag, unescape, Tag};
use crate::matchers::{matches, parse_rule_set, Matchers, TagMatcher};
use crate::tag_stack::{keeps_text, TagStack};
use crate::types::{CleanWarning, CleanedDocument, DocMetadata, Token, TokenAnnotations};
use std::borrow::Cow;
use std::sync::Arc;

/// Removes markup tokens from a token stream and collects the metadata the
/// markup carried.
///
/// Works on simple, typical XML or similar SGML as isolated by the lexer;
/// arbitrarily complicated markup is out of reach.
#[derive(Clone)]
pub struct XmlCleaner {
    matchers: Matchers,
    allow_flawed_xml: bool,
    normalizer: Arc<dyn DateNormalizer>,
}

impl XmlCleaner {
    pub fn new(config: &CleanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            matchers: Matchers::compile(config)?,
            allow_flawed_xml: config.allow_flawed_xml,
            normalizer: Arc::new(ChronoDateNormalizer),
        })
    }

    pub fn with_date_normalizer(mut self, normalizer: Arc<dyn DateNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn matchers(&self) -> &Matchers {
        &self.matchers
    }

    pub fn allows_flawed_xml(&self) -> bool {
        self.allow_flawed_xml
    }

    pub fn set_allow_flawed_xml(&mut self, allow: bool) {
        self.allow_flawed_xml = allow;
    }

    /// Sentence-ending tags stay configured while removal is disabled, but
    /// only take effect when it is enabled again.
    pub fn set_xml_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.removal = TagMatcher::optional(tags)?;
        Ok(())
    }

    /// An empty pattern disables sentence-ending tags.
    pub fn set_sentence_ending_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.sentence_ending = TagMatcher::non_empty(tags)?;
        Ok(())
    }

    pub fn set_date_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.date = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_ssplit_discard_tokens(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.discard_tokens = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_single_sentence_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.single_sentence = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_doc_id_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.doc_id = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_doc_type_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.doc_type = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_section_tags(&mut self, tags: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.section = TagMatcher::optional(tags)?;
        Ok(())
    }

    pub fn set_discourse_tags(
        &mut self,
        utterance_turn_tags: Option<&str>,
        speaker_tags: Option<&str>,
    ) -> Result<(), ConfigError> {
        let utterance_turn = TagMatcher::optional(utterance_turn_tags)?;
        let speaker = TagMatcher::optional(speaker_tags)?;
        self.matchers.utterance_turn = utterance_turn;
        self.matchers.speaker = speaker;
        Ok(())
    }

    pub fn set_doc_annotation_patterns(&mut self, conf: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.doc_rules = parse_rule_set(conf, true)?;
        Ok(())
    }

    pub fn set_token_annotation_patterns(&mut self, conf: Option<&str>) -> Result<(), ConfigError> {
        self.matchers.token_rules = parse_rule_set(conf, true)?;
        Ok(())
    }

    pub fn set_section_annotation_patterns(
        &mut self,
        conf: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.matchers.section_rules = parse_rule_set(conf, false)?;
        Ok(())
    }

    /// Cleans `tokens` in a single pass.
    ///
    /// `text` is the full document the token offsets point into; when given,
    /// extracted tag contents are verbatim slices of it instead of words
    /// joined by spaces.
    pub fn process(
        &self,
        tokens: Vec<Token>,
        text: Option<&str>,
    ) -> Result<CleanedDocument, TagError> {
        let mut pass = Pass::new(self, tokens, text);
        for idx in 0..pass.tokens.len() {
            match parse_tag(pass.tokens[idx].word.trim()) {
                Some(tag) => pass.on_tag(idx, &tag)?,
                None => pass.on_plain(idx),
            }
        }
        pass.finish()
    }
}

/// Tokens whose innermost enclosing tag names a document field.
#[derive(Debug, Default)]
struct DocFieldTokens {
    date: Vec<usize>,
    id: Vec<usize>,
    doc_type: Vec<usize>,
}

struct Pass<'a> {
    cleaner: &'a XmlCleaner,
    text: Option<&'a str>,
    tokens: Vec<Token>,
    kept: Vec<bool>,
    last_survivor: Option<usize>,
    stack: Option<TagStack<'a>>,
    empty_context: Arc<[String]>,
    removed: RemovedText,
    metadata: DocMetadata,
    pending_doc_keys: Vec<DocKey>,
    doc_fields: DocFieldTokens,
    token_annotations: Option<TokenAnnotations>,
    token_stacks: AttributeStacks<TokenKey>,
    discourse: Discourse,
    section: Option<OpenSection>,
    warnings: Vec<CleanWarning>,
}

impl<'a> Pass<'a> {
    fn new(cleaner: &'a XmlCleaner, tokens: Vec<Token>, text: Option<&'a str>) -> Self {
        let matchers = &cleaner.matchers;
        Self {
            cleaner,
            text,
            kept: vec![false; tokens.len()],
            tokens,
            last_survivor: None,
            stack: matchers.removal.as_ref().map(TagStack::new),
            empty_context: Arc::from(Vec::new()),
            removed: RemovedText::default(),
            metadata: DocMetadata::default(),
            pending_doc_keys: matchers.doc_rules.keys().collect(),
            doc_fields: DocFieldTokens::default(),
            token_annotations: (!matchers.token_rules.is_empty())
                .then(TokenAnnotations::default),
            token_stacks: AttributeStacks::default(),
            discourse: Discourse::default(),
            section: None,
            warnings: Vec::new(),
        }
    }

    fn matchers(&self) -> &'a Matchers {
        &self.cleaner.matchers
    }

    fn on_plain(&mut self, idx: usize) {
        let matchers = self.matchers();
        let unescaped = match unescape(&self.tokens[idx].word) {
            Cow::Owned(word) => Some(word),
            Cow::Borrowed(_) => None,
        };
        if let Some(word) = unescaped {
            self.tokens[idx].word = word;
        }

        let depth = self.stack.as_ref().map_or(0, TagStack::match_depth);
        if keeps_text(matchers.removal.as_ref(), depth) {
            self.keep(idx);
        }

        let context = match self.stack.as_mut() {
            Some(stack) => stack.context(),
            None => self.empty_context.clone(),
        };
        if let Some(innermost) = context.last() {
            if matches(&matchers.date, innermost) {
                self.doc_fields.date.push(idx);
            }
            if matches(&matchers.doc_id, innermost) {
                self.doc_fields.id.push(idx);
            }
            if matches(&matchers.doc_type, innermost) {
                self.doc_fields.doc_type.push(idx);
            }
        }
        self.tokens[idx].meta.xml_context = context;

        self.discourse.on_plain_token(idx);
        if let Some(section) = self.section.as_mut() {
            section.on_plain_token(
                idx,
                &self.tokens[idx].word,
                matchers.discard_tokens.as_ref(),
            );
        }
    }

    fn keep(&mut self, idx: usize) {
        let previous = self.last_survivor;
        self.kept[idx] = true;
        self.last_survivor = Some(idx);

        let token = &mut self.tokens[idx];
        self.discourse.on_kept_token(token);
        if let Some(current) = &self.token_annotations {
            current.copy_unset_into(&mut token.meta.annotations);
        }

        if self.removed.is_empty() {
            return;
        }
        match previous {
            Some(prev) => {
                let (left, right) = self.tokens.split_at_mut(idx);
                self.removed.attach(Some(&mut left[prev]), &mut right[0]);
            }
            None => self.removed.attach(None, &mut self.tokens[idx]),
        }
    }

    fn on_tag(&mut self, idx: usize, tag: &Tag) -> Result<(), TagError> {
        let matchers = self.matchers();
        let is_last = idx + 1 == self.tokens.len();
        self.removed.drop_tag(&self.tokens[idx], is_last);

        if !self.pending_doc_keys.is_empty() && tag.has_attributes() {
            let extraction = Extraction {
                keys: Some(self.pending_doc_keys.as_slice()),
                ..Extraction::attributes_only(&self.tokens)
            };
            let found = apply_tag(tag, &mut self.metadata, &matchers.doc_rules, extraction);
            self.pending_doc_keys.retain(|key| !found.contains(key));
        }

        self.on_section_tag(idx, tag);
        if let Some(section) = self.section.as_mut() {
            let extraction = Extraction {
                content: Some(&mut section.content),
                text: self.text,
                ..Extraction::attributes_only(&self.tokens)
            };
            apply_tag(tag, &mut section.meta, &matchers.section_rules, extraction);
        }

        if let Some(current) = self.token_annotations.as_mut() {
            let extraction = Extraction {
                stacks: Some(&mut self.token_stacks),
                ..Extraction::attributes_only(&self.tokens)
            };
            apply_tag(tag, current, &matchers.token_rules, extraction);
        }

        if matchers.ends_sentence(&tag.name) {
            force_sentence_end(&mut self.tokens, self.last_survivor);
        }
        if matches(&matchers.utterance_turn, &tag.name) {
            self.discourse
                .on_turn_tag(tag, &mut self.tokens, self.last_survivor);
        }
        if matches(&matchers.speaker, &tag.name) {
            self.discourse
                .on_speaker_tag(tag, &mut self.tokens, self.last_survivor, self.text);
        }
        if matches(&matchers.single_sentence, &tag.name) {
            self.discourse
                .on_single_sentence_tag(tag, &mut self.tokens, self.last_survivor);
        }

        if tag.is_single_tag {
            return Ok(());
        }
        let tolerant = self.cleaner.allow_flawed_xml;
        match self.stack.as_mut() {
            Some(stack) if tag.is_end_tag => stack.close(&tag.name, tolerant),
            Some(stack) => {
                stack.open(&tag.name);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn on_section_tag(&mut self, idx: usize, tag: &Tag) {
        let matchers = self.matchers();
        if !matches(&matchers.section, &tag.name) {
            return;
        }
        if tag.is_end_tag {
            let Some(mut section) = self.section.take() else {
                tracing::debug!("ignoring </{}> outside of a section", tag.name);
                return;
            };
            let extraction = Extraction {
                content: Some(&mut section.content),
                text: self.text,
                ..Extraction::attributes_only(&self.tokens)
            };
            apply_tag(tag, &mut section.meta, &matchers.section_rules, extraction);
            let record = section.finish(
                self.tokens[idx].end,
                &mut self.tokens,
                self.last_survivor,
                self.cleaner.normalizer.as_ref(),
                &mut self.warnings,
            );
            self.metadata.sections.push(record);
        } else if !tag.is_single_tag {
            if let Some(previous) = &self.section {
                tracing::debug!(
                    "<{}> opened before <{}> closed; discarding the open section",
                    tag.name,
                    previous.meta.tag
                );
            }
            self.section = Some(OpenSection::open(tag, self.tokens[idx].begin));
        }
    }

    fn finish(mut self) -> Result<CleanedDocument, TagError> {
        if let Some(stack) = self.stack.take() {
            stack.finish(self.cleaner.allow_flawed_xml)?;
        }

        let last = self.last_survivor.map(|idx| &mut self.tokens[idx]);
        std::mem::take(&mut self.removed).finish(last);

        let fields = [
            (&self.doc_fields.id, &mut self.metadata.doc_id),
            (&self.doc_fields.date, &mut self.metadata.doc_date),
            (&self.doc_fields.doc_type, &mut self.metadata.doc_type),
        ];
        for (indices, slot) in fields {
            if !indices.is_empty() {
                *slot = Some(
                    tokens_to_string(self.text, &self.tokens, indices)
                        .trim()
                        .to_string(),
                );
            }
        }

        let tokens = self
            .tokens
            .into_iter()
            .zip(self.kept)
            .filter_map(|(token, kept)| kept.then_some(token))
            .collect();

        Ok(CleanedDocument {
            tokens,
            metadata: self.metadata,
            warnings: self.warnings,
        })
    }
}
