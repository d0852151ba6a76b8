//! Rule-driven extraction of metadata from tag attributes and tag contents.

use crate::keys::{AnnotationTarget, MetadataKey};
use crate::markup::Tag;
use crate::matchers::{AnnotationRule, RuleSet};
use crate::types::Token;
use std::collections::{HashMap, HashSet};

/// Token indices collected between a content rule's start and end tags.
#[derive(Debug)]
pub struct ContentBuffers<K> {
    buffers: HashMap<K, Vec<usize>>,
}

impl<K> Default for ContentBuffers<K> {
    fn default() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }
}

impl<K: MetadataKey> ContentBuffers<K> {
    pub fn open(&mut self, key: K) {
        self.buffers.insert(key, Vec::new());
    }

    /// Appends a token to every open buffer.
    pub fn push(&mut self, token: usize) {
        for buffer in self.buffers.values_mut() {
            buffer.push(token);
        }
    }

    pub fn take(&mut self, key: K) -> Option<Vec<usize>> {
        self.buffers.remove(&key)
    }
}

/// Per-key stacks of `(tag name, value)` so nested tags can shadow an
/// enclosing value and restore it when they close.
#[derive(Debug)]
pub struct AttributeStacks<K> {
    stacks: HashMap<K, Vec<(String, String)>>,
}

impl<K> Default for AttributeStacks<K> {
    fn default() -> Self {
        Self {
            stacks: HashMap::new(),
        }
    }
}

impl<K: MetadataKey> AttributeStacks<K> {
    fn push(&mut self, key: K, tag: &str, value: &str) {
        self.stacks
            .entry(key)
            .or_default()
            .push((tag.to_string(), value.to_string()));
    }

    /// Pops the key's top entry if it was pushed by a tag named `tag`, and
    /// returns the value that is now in effect.
    fn pop(&mut self, key: K, tag: &str) -> Option<Option<&str>> {
        let stack = self.stacks.get_mut(&key)?;
        let (top, _) = stack.last()?;
        if !top.eq_ignore_ascii_case(tag) {
            return None;
        }
        stack.pop();
        Some(stack.last().map(|(_, value)| value.as_str()))
    }
}

/// Joins tokens back into text, preferring the verbatim document slice.
pub fn tokens_to_string(text: Option<&str>, tokens: &[Token], indices: &[usize]) -> String {
    let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
        return String::new();
    };
    if let Some(slice) = text.and_then(|text| text.get(tokens[first].begin..tokens[last].end)) {
        return slice.to_string();
    }
    indices
        .iter()
        .map(|&idx| tokens[idx].word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything a single `apply_tag` call reads or updates besides the target.
pub struct Extraction<'a, K> {
    /// Restricts the keys considered; `None` means every key in the rule set.
    pub keys: Option<&'a [K]>,
    pub content: Option<&'a mut ContentBuffers<K>>,
    pub stacks: Option<&'a mut AttributeStacks<K>>,
    pub text: Option<&'a str>,
    pub tokens: &'a [Token],
}

impl<'a, K> Extraction<'a, K> {
    pub fn attributes_only(tokens: &'a [Token]) -> Self {
        Self {
            keys: None,
            content: None,
            stacks: None,
            text: None,
            tokens,
        }
    }
}

/// Offers `tag` to every candidate key's rules and returns the keys that
/// received a value. The first matching rule of a key wins.
pub fn apply_tag<K, T>(
    tag: &Tag,
    target: &mut T,
    rules: &RuleSet<K>,
    mut extraction: Extraction<'_, K>,
) -> HashSet<K>
where
    K: MetadataKey,
    T: AnnotationTarget<K>,
{
    let mut found = HashSet::new();
    let keys: Vec<K> = match extraction.keys {
        Some(keys) => keys.to_vec(),
        None => rules.keys().collect(),
    };

    for key in keys {
        let mut popped = false;
        for rule in rules.rules(key) {
            if !rule.tag.matches(&tag.name) {
                continue;
            }
            let matched = match &rule.attribute {
                Some(_) => apply_attribute_rule(tag, target, rule, &mut extraction, &mut popped),
                None => apply_content_rule(tag, target, key, &mut extraction),
            };
            if matched {
                found.insert(key);
                break;
            }
        }
    }
    found
}

fn apply_attribute_rule<K, T>(
    tag: &Tag,
    target: &mut T,
    rule: &AnnotationRule<K>,
    extraction: &mut Extraction<'_, K>,
    popped: &mut bool,
) -> bool
where
    K: MetadataKey,
    T: AnnotationTarget<K>,
{
    let Some(attribute) = &rule.attribute else {
        return false;
    };

    if let Some(stacks) = extraction.stacks.as_deref_mut() {
        if tag.is_end_tag {
            if !*popped {
                if let Some(current) = stacks.pop(rule.key, &tag.name) {
                    *popped = true;
                    match current {
                        Some(value) => target.set(rule.key, value.to_string()),
                        None => target.remove(rule.key),
                    }
                }
            }
            return false;
        }
    }

    let Some((_, value)) = tag
        .attributes
        .iter()
        .find(|(name, _)| attribute.matches(name))
    else {
        return false;
    };
    if let Some(stacks) = extraction.stacks.as_deref_mut() {
        stacks.push(rule.key, &tag.name, value);
    }
    target.set(rule.key, value.clone());
    true
}

fn apply_content_rule<K, T>(
    tag: &Tag,
    target: &mut T,
    key: K,
    extraction: &mut Extraction<'_, K>,
) -> bool
where
    K: MetadataKey,
    T: AnnotationTarget<K>,
{
    let Some(content) = extraction.content.as_deref_mut() else {
        return false;
    };
    if tag.is_single_tag {
        return false;
    }
    if !tag.is_end_tag {
        content.open(key);
        return false;
    }
    match content.take(key) {
        Some(saved) if !saved.is_empty() => {
            target.set(key, tokens_to_string(extraction.text, extraction.tokens, &saved));
            true
        }
        _ => false,
    }
}
