use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_XML_TAGS: &str = ".*";
pub const DEFAULT_SENTENCE_ENDERS: &str = "";
pub const DEFAULT_DATE_TAGS: &str = "datetime|date";
pub const DEFAULT_DOCID_TAGS: &str = "docid";
pub const DEFAULT_DOCTYPE_TAGS: &str = "doctype";
pub const DEFAULT_UTTERANCE_TURN_TAGS: &str = "turn";
pub const DEFAULT_SPEAKER_TAGS: &str = "speaker";
pub const DEFAULT_DOC_ANNOTATIONS_PATTERNS: &str =
    "docID=doc[id],doctype=doc[type],docsourcetype=doctype[source]";
pub const DEFAULT_ALLOW_FLAWS: bool = true;

/// Environment variable naming a JSON config file for [`CleanConfig::load_default`].
pub const CONFIG_PATH_ENV: &str = "XMLCLEAN_CONFIG";

/// Pattern strings for every configurable role. `None` disables a role;
/// fields missing from a JSON document take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanConfig {
    pub xml_tags: Option<String>,
    pub sentence_ending_tags: Option<String>,
    pub single_sentence_tags: Option<String>,
    pub date_tags: Option<String>,
    pub doc_id_tags: Option<String>,
    pub doc_type_tags: Option<String>,
    pub turn_tags: Option<String>,
    pub speaker_tags: Option<String>,
    pub section_tags: Option<String>,
    pub ssplit_discard_tokens: Option<String>,
    pub doc_annotations: Option<String>,
    pub token_annotations: Option<String>,
    pub section_annotations: Option<String>,
    pub allow_flawed_xml: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            xml_tags: Some(DEFAULT_XML_TAGS.to_string()),
            sentence_ending_tags: Some(DEFAULT_SENTENCE_ENDERS.to_string()),
            single_sentence_tags: None,
            date_tags: Some(DEFAULT_DATE_TAGS.to_string()),
            doc_id_tags: Some(DEFAULT_DOCID_TAGS.to_string()),
            doc_type_tags: Some(DEFAULT_DOCTYPE_TAGS.to_string()),
            turn_tags: Some(DEFAULT_UTTERANCE_TURN_TAGS.to_string()),
            speaker_tags: Some(DEFAULT_SPEAKER_TAGS.to_string()),
            section_tags: None,
            ssplit_discard_tokens: None,
            doc_annotations: Some(DEFAULT_DOC_ANNOTATIONS_PATTERNS.to_string()),
            token_annotations: None,
            section_annotations: None,
            allow_flawed_xml: DEFAULT_ALLOW_FLAWS,
        }
    }
}

impl CleanConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads the file named by `XMLCLEAN_CONFIG`, or the defaults when unset.
    pub fn load_default() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reads `clean.*` properties; keys that are absent keep their defaults.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let slots: [(&str, &mut Option<String>); 13] = [
            ("clean.xmltags", &mut config.xml_tags),
            ("clean.sentenceendingtags", &mut config.sentence_ending_tags),
            ("clean.singlesentencetags", &mut config.single_sentence_tags),
            ("clean.datetags", &mut config.date_tags),
            ("clean.docIdtags", &mut config.doc_id_tags),
            ("clean.docTypetags", &mut config.doc_type_tags),
            ("clean.turntags", &mut config.turn_tags),
            ("clean.speakertags", &mut config.speaker_tags),
            ("clean.sectiontags", &mut config.section_tags),
            ("clean.ssplitDiscardTokens", &mut config.ssplit_discard_tokens),
            ("clean.docAnnotations", &mut config.doc_annotations),
            ("clean.tokenAnnotations", &mut config.token_annotations),
            ("clean.sectionAnnotations", &mut config.section_annotations),
        ];
        for (name, slot) in slots {
            if let Some(value) = props.get(name) {
                *slot = Some(value.clone());
            }
        }

        if let Some(value) = props.get("clean.allowflawedxml") {
            config.allow_flawed_xml = match value.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        name: "clean.allowflawedxml".to_string(),
                        value: value.clone(),
                    })
                }
            };
        }
        Ok(config)
    }
}
