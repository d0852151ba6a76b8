use crate::config::CleanConfig;
use crate::error::ConfigError;
use crate::keys::{DocKey, MetadataKey, SectionKey, TokenKey};
use regex::Regex;
use std::sync::LazyLock;

static RULE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static KEY_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*=\s*").unwrap());
static TAG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^(.*)\[(.*)\]$").unwrap());

/// Case-insensitive pattern that must match a whole tag or attribute name.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    pattern: String,
    regex: Regex,
}

impl TagMatcher {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("(?i)^(?:{pattern})$")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// `None` disables the role.
    pub fn optional(pattern: Option<&str>) -> Result<Option<Self>, ConfigError> {
        pattern.map(Self::new).transpose()
    }

    /// Like [`TagMatcher::optional`], but an empty pattern also disables the role.
    pub fn non_empty(pattern: Option<&str>) -> Result<Option<Self>, ConfigError> {
        Self::optional(pattern.filter(|p| !p.is_empty()))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

pub(crate) fn matches(matcher: &Option<TagMatcher>, name: &str) -> bool {
    matcher.as_ref().is_some_and(|m| m.matches(name))
}

#[derive(Debug, Clone)]
pub struct AnnotationRule<K> {
    pub key: K,
    pub tag: TagMatcher,
    /// `None` extracts the text enclosed by the tag instead of an attribute.
    pub attribute: Option<TagMatcher>,
}

/// Rules grouped by key. Keys keep first-registration order and each key's
/// rules keep registration order.
#[derive(Debug, Clone)]
pub struct RuleSet<K> {
    entries: Vec<(K, Vec<AnnotationRule<K>>)>,
}

impl<K> Default for RuleSet<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: MetadataKey> RuleSet<K> {
    pub fn add(&mut self, rule: AnnotationRule<K>) {
        match self.entries.iter_mut().find(|(key, _)| *key == rule.key) {
            Some((_, rules)) => rules.push(rule),
            None => self.entries.push((rule.key, vec![rule])),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn rules(&self, key: K) -> &[AnnotationRule<K>] {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, rules)| rules.len()).sum()
    }
}

/// Compiles `key=tag[attr],key=tag,...` into a rule set.
///
/// When `attribute_required` is set every rule must carry a bracketed
/// attribute pattern.
pub fn parse_rule_set<K: MetadataKey>(
    conf: Option<&str>,
    attribute_required: bool,
) -> Result<RuleSet<K>, ConfigError> {
    let mut set = RuleSet::default();
    let Some(conf) = conf else {
        return Ok(set);
    };
    let conf = conf.trim();
    if conf.is_empty() {
        return Ok(set);
    }

    for rule in RULE_SEPARATOR_RE.split(conf) {
        let parts: Vec<&str> = KEY_SEPARATOR_RE.splitn(rule, 2).collect();
        let [key_name, pattern] = *parts.as_slice() else {
            return Err(ConfigError::InvalidRule {
                rule: rule.to_string(),
            });
        };
        let key = K::resolve(key_name).ok_or_else(|| ConfigError::UnknownKey {
            key: key_name.to_string(),
        })?;

        let rule = match TAG_ATTR_RE.captures(pattern) {
            Some(captures) => AnnotationRule {
                key,
                tag: TagMatcher::new(&captures[1])?,
                attribute: Some(TagMatcher::new(&captures[2])?),
            },
            None if attribute_required => {
                return Err(ConfigError::MissingAttribute {
                    key: key_name.to_string(),
                    pattern: pattern.to_string(),
                })
            }
            None => AnnotationRule {
                key,
                tag: TagMatcher::new(pattern)?,
                attribute: None,
            },
        };
        set.add(rule);
    }
    Ok(set)
}

/// Every compiled matcher and rule set a cleaner consults.
#[derive(Debug, Clone)]
pub struct Matchers {
    /// Tags whose enclosed text is dropped.
    pub removal: Option<TagMatcher>,
    /// Only consulted while `removal` is set.
    pub sentence_ending: Option<TagMatcher>,
    pub single_sentence: Option<TagMatcher>,
    pub date: Option<TagMatcher>,
    pub doc_id: Option<TagMatcher>,
    pub doc_type: Option<TagMatcher>,
    pub utterance_turn: Option<TagMatcher>,
    pub speaker: Option<TagMatcher>,
    pub section: Option<TagMatcher>,
    /// Tokens that sentence splitting discards; they never start a section.
    pub discard_tokens: Option<TagMatcher>,
    pub doc_rules: RuleSet<DocKey>,
    pub token_rules: RuleSet<TokenKey>,
    pub section_rules: RuleSet<SectionKey>,
}

impl Matchers {
    pub fn compile(config: &CleanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            removal: TagMatcher::optional(config.xml_tags.as_deref())?,
            sentence_ending: TagMatcher::non_empty(config.sentence_ending_tags.as_deref())?,
            single_sentence: TagMatcher::optional(config.single_sentence_tags.as_deref())?,
            date: TagMatcher::optional(config.date_tags.as_deref())?,
            doc_id: TagMatcher::optional(config.doc_id_tags.as_deref())?,
            doc_type: TagMatcher::optional(config.doc_type_tags.as_deref())?,
            utterance_turn: TagMatcher::optional(config.turn_tags.as_deref())?,
            speaker: TagMatcher::optional(config.speaker_tags.as_deref())?,
            section: TagMatcher::optional(config.section_tags.as_deref())?,
            discard_tokens: TagMatcher::optional(config.ssplit_discard_tokens.as_deref())?,
            doc_rules: parse_rule_set(config.doc_annotations.as_deref(), true)?,
            token_rules: parse_rule_set(config.token_annotations.as_deref(), true)?,
            section_rules: parse_rule_set(config.section_annotations.as_deref(), false)?,
        })
    }

    /// Whether `name` forces a sentence end. Sentence-ending tags need tag
    /// removal to be configured.
    pub fn ends_sentence(&self, name: &str) -> bool {
        self.removal.is_some() && matches(&self.sentence_ending, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_is_anchored_and_case_insensitive() {
        let m = TagMatcher::new("p|div").unwrap();
        assert!(m.matches("P"));
        assert!(m.matches("div"));
        assert!(!m.matches("span"));
        assert!(!m.matches("pre"));
        assert_eq!(m.pattern(), "p|div");
    }

    #[test]
    fn empty_pattern_disables_role() {
        assert!(TagMatcher::non_empty(Some("")).unwrap().is_none());
        assert!(TagMatcher::optional(Some("")).unwrap().is_some());
    }

    #[test]
    fn groups_rules_by_key_in_order() {
        let set: RuleSet<DocKey> =
            parse_rule_set(Some("docID=doc[id], doctype = doc[type],docid=article[ref]"), true)
                .unwrap();
        assert_eq!(set.keys().collect::<Vec<_>>(), vec![DocKey::DocId, DocKey::DocType]);
        assert_eq!(set.rules(DocKey::DocId).len(), 2);
        assert!(set.rules(DocKey::DocId)[1].tag.matches("ARTICLE"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn section_rules_accept_bare_tags() {
        let set: RuleSet<SectionKey> =
            parse_rule_set(Some("author=post[author],date=postdate"), false).unwrap();
        assert!(set.rules(SectionKey::Date)[0].attribute.is_none());
        assert!(set.rules(SectionKey::Author)[0].attribute.is_some());
    }

    #[test]
    fn sentence_enders_need_removal() {
        let config = CleanConfig {
            xml_tags: None,
            sentence_ending_tags: Some("p".to_string()),
            ..CleanConfig::default()
        };
        let mut matchers = Matchers::compile(&config).unwrap();
        assert!(matchers.removal.is_none());
        assert!(!matchers.ends_sentence("P"));

        matchers.removal = Some(TagMatcher::new(".*").unwrap());
        assert!(matchers.ends_sentence("P"));
        assert!(!matchers.ends_sentence("div"));

        let defaults = Matchers::compile(&CleanConfig::default()).unwrap();
        assert!(defaults.sentence_ending.is_none());
        assert_eq!(defaults.doc_rules.len(), 3);
        assert!(defaults.token_rules.is_empty());
    }
}
