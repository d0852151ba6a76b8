//! Sentence, utterance, speaker and section boundaries implied by markup.

use crate::annotate::{tokens_to_string, ContentBuffers};
use crate::dates::DateNormalizer;
use crate::keys::SectionKey;
use crate::markup::Tag;
use crate::matchers::TagMatcher;
use crate::types::{
    CleanWarning, MentionKind, MentionTag, Section, SectionDate, SectionMetadata, Token,
};

/// Marks the newest surviving token, if any, as ending a sentence.
pub fn force_sentence_end(tokens: &mut [Token], last_survivor: Option<usize>) {
    if let Some(idx) = last_survivor {
        tokens[idx].meta.forced_sentence_end = true;
    }
}

/// Utterance, speaker and single-sentence state for one pass.
#[derive(Debug, Default)]
pub struct Discourse {
    utterance_index: usize,
    inside_utterance: bool,
    inside_speaker: bool,
    current_speaker: Option<String>,
    speaker_tokens: Vec<usize>,
    mark_single_sentence: bool,
}

impl Discourse {
    /// Stamps a surviving plain token with the state it was seen in.
    pub fn on_kept_token(&mut self, token: &mut Token) {
        if self.inside_utterance {
            token.meta.utterance = Some(self.utterance_index);
            if let Some(speaker) = &self.current_speaker {
                token.meta.speaker = Some(speaker.clone());
            }
        }
        if self.mark_single_sentence {
            token.meta.forced_sentence_until_end = true;
            self.mark_single_sentence = false;
        }
    }

    pub fn on_plain_token(&mut self, idx: usize) {
        if self.inside_speaker {
            self.speaker_tokens.push(idx);
        }
    }

    pub fn on_turn_tag(&mut self, tag: &Tag, tokens: &mut [Token], last_survivor: Option<usize>) {
        force_sentence_end(tokens, last_survivor);
        self.inside_utterance = !(tag.is_end_tag || tag.is_single_tag);
        if self.inside_utterance {
            self.utterance_index += 1;
        } else {
            self.current_speaker = None;
        }
    }

    pub fn on_speaker_tag(
        &mut self,
        tag: &Tag,
        tokens: &mut [Token],
        last_survivor: Option<usize>,
        text: Option<&str>,
    ) {
        force_sentence_end(tokens, last_survivor);
        self.inside_speaker = !(tag.is_end_tag || tag.is_single_tag);
        if tag.is_end_tag {
            let speaker = tokens_to_string(text, tokens, &self.speaker_tokens);
            let length = self.speaker_tokens.len();
            for (index, &idx) in self.speaker_tokens.iter().enumerate() {
                let meta = &mut tokens[idx].meta;
                meta.speaker = Some(speaker.clone());
                meta.mention = Some(MentionTag {
                    text: speaker.clone(),
                    kind: MentionKind::Speaker,
                    length,
                    index,
                });
            }
            self.current_speaker = Some(speaker);
        } else {
            self.current_speaker = None;
        }
        self.speaker_tokens.clear();
    }

    pub fn on_single_sentence_tag(
        &mut self,
        tag: &Tag,
        tokens: &mut [Token],
        last_survivor: Option<usize>,
    ) {
        if tag.is_end_tag {
            force_sentence_end(tokens, last_survivor);
            self.mark_single_sentence = false;
        } else if !tag.is_single_tag {
            self.mark_single_sentence = true;
        }
    }
}

/// A section between its opening tag and its close.
#[derive(Debug)]
pub struct OpenSection {
    pub meta: SectionMetadata,
    pub content: ContentBuffers<SectionKey>,
    tag_begin: usize,
    start_token: Option<usize>,
}

impl OpenSection {
    pub fn open(tag: &Tag, tag_begin: usize) -> Self {
        Self {
            meta: SectionMetadata {
                tag: tag.name.clone(),
                ..SectionMetadata::default()
            },
            content: ContentBuffers::default(),
            tag_begin,
            start_token: None,
        }
    }

    /// Tokens matching the discard matcher are neither section starts nor content.
    pub fn on_plain_token(&mut self, idx: usize, word: &str, discard: Option<&TagMatcher>) {
        if discard.is_some_and(|m| m.matches(word)) {
            return;
        }
        self.start_token.get_or_insert(idx);
        self.content.push(idx);
    }

    pub fn finish(
        self,
        close_end: usize,
        tokens: &mut [Token],
        last_survivor: Option<usize>,
        normalizer: &dyn DateNormalizer,
        warnings: &mut Vec<CleanWarning>,
    ) -> Section {
        let begin = match self.start_token {
            Some(idx) => {
                tokens[idx].meta.section_start = Some(self.meta.clone());
                tokens[idx].begin
            }
            None => self.tag_begin,
        };
        if let Some(idx) = last_survivor {
            let meta = &mut tokens[idx].meta;
            meta.forced_sentence_end = true;
            meta.section_end = Some(self.meta.tag.clone());
        }

        let SectionMetadata {
            tag,
            author,
            date,
            id,
        } = self.meta;
        let date = date.map(|raw| match normalizer.normalize(&raw) {
            Ok(normalized) => SectionDate {
                raw,
                normalized: Some(normalized),
            },
            Err(err) => {
                warnings.push(CleanWarning::UnparsedSectionDate {
                    section: tag.clone(),
                    begin,
                    raw: raw.clone(),
                    reason: err.to_string(),
                });
                SectionDate {
                    raw,
                    normalized: None,
                }
            }
        });
        tracing::debug!("closed <{}> section at {}..{}", tag, begin, close_end);

        Section {
            tag,
            begin,
            end: close_end,
            id,
            author,
            date,
            sentences: Vec::new(),
        }
    }
}
