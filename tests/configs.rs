use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use xmlclean::config::{CONFIG_PATH_ENV, DEFAULT_DOC_ANNOTATIONS_PATTERNS};
use xmlclean::keys::{DocKey, SectionKey, TokenKey};
use xmlclean::matchers::{parse_rule_set, Matchers, RuleSet};
use xmlclean::{CleanConfig, ConfigError, XmlCleaner};

#[test]
fn test_missing_json_fields_keep_defaults() {
    let json = r#"
    {
        "xmlTags": "script|style",
        "sectionTags": "post",
        "allowFlawedXml": false
    }
    "#;

    let config: CleanConfig = serde_json::from_str(json).expect("Failed to parse config");

    assert_eq!(config.xml_tags.as_deref(), Some("script|style"));
    assert_eq!(config.section_tags.as_deref(), Some("post"));
    assert!(!config.allow_flawed_xml);
    assert_eq!(config.turn_tags.as_deref(), Some("turn"));
    assert_eq!(
        config.doc_annotations.as_deref(),
        Some(DEFAULT_DOC_ANNOTATIONS_PATTERNS)
    );
}

#[test]
fn test_null_disables_a_role() {
    let config: CleanConfig =
        serde_json::from_str(r#"{ "xmlTags": null, "speakerTags": null }"#).unwrap();
    let matchers = Matchers::compile(&config).unwrap();
    assert!(matchers.removal.is_none());
    assert!(matchers.speaker.is_none());
    assert!(matchers.utterance_turn.is_some());
}

#[test]
fn test_load_from_file_and_env_var() {
    let json = r#"{ "singleSentenceTags": "headline", "dateTags": "when" }"#;
    let mut tmp_file = NamedTempFile::new().expect("Failed to create temp file");
    write!(tmp_file, "{}", json).expect("Failed to write to temp file");

    let config = CleanConfig::load_from_file(tmp_file.path()).expect("Failed to load config");
    assert_eq!(config.single_sentence_tags.as_deref(), Some("headline"));
    assert_eq!(config.date_tags.as_deref(), Some("when"));

    std::env::set_var(CONFIG_PATH_ENV, tmp_file.path());
    let from_env = CleanConfig::load_default().expect("Failed to load default config");
    std::env::remove_var(CONFIG_PATH_ENV);
    assert_eq!(from_env, config);
}

#[test]
fn test_load_errors_are_typed() {
    let err = CleanConfig::load_from_file("/nonexistent/xmlclean.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));

    let mut tmp_file = NamedTempFile::new().unwrap();
    write!(tmp_file, "{{ not json").unwrap();
    let err = CleanConfig::load_from_file(tmp_file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_properties_override_defaults() {
    let props: HashMap<String, String> = [
        ("clean.xmltags", "b|i"),
        ("clean.sectiontags", "post"),
        ("clean.sectionAnnotations", "date=postdate"),
        ("clean.allowflawedxml", "FALSE"),
        ("unrelated.key", "ignored"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = CleanConfig::from_properties(&props).unwrap();
    assert_eq!(config.xml_tags.as_deref(), Some("b|i"));
    assert_eq!(config.section_tags.as_deref(), Some("post"));
    assert_eq!(config.section_annotations.as_deref(), Some("date=postdate"));
    assert!(!config.allow_flawed_xml);
    assert_eq!(config.speaker_tags.as_deref(), Some("speaker"));
    assert!(XmlCleaner::new(&config).is_ok());
}

#[test]
fn test_bad_flag_value_is_rejected() {
    let props = HashMap::from([("clean.allowflawedxml".to_string(), "maybe".to_string())]);
    let err = CleanConfig::from_properties(&props).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidFlag { value, .. } if value == "maybe"));
}

#[test]
fn test_annotation_suffix_and_case_are_ignored() {
    let set: RuleSet<DocKey> =
        parse_rule_set(Some("DocIDAnnotation=doc[id], AUTHOR = doc[by]"), true).unwrap();
    assert_eq!(
        set.keys().collect::<Vec<_>>(),
        vec![DocKey::DocId, DocKey::Author]
    );

    let set: RuleSet<SectionKey> = parse_rule_set(Some("sectiondate=when"), false).unwrap();
    assert_eq!(set.keys().collect::<Vec<_>>(), vec![SectionKey::Date]);
}

#[test]
fn test_rule_string_errors() {
    let err = parse_rule_set::<DocKey>(Some("docid"), true).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRule { rule } if rule == "docid"));

    let err = parse_rule_set::<TokenKey>(Some("colour=font[color]"), true).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey { key } if key == "colour"));

    let err = parse_rule_set::<TokenKey>(Some("author=post"), true).unwrap_err();
    assert!(matches!(err, ConfigError::MissingAttribute { .. }));

    let err = parse_rule_set::<SectionKey>(Some("date=post[("), false).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { .. }));

    assert!(parse_rule_set::<DocKey>(Some("   "), true).unwrap().is_empty());
    assert!(parse_rule_set::<DocKey>(None, true).unwrap().is_empty());
}

#[test]
fn test_invalid_pattern_surfaces_from_cleaner() {
    let config = CleanConfig {
        speaker_tags: Some("speaker(".to_string()),
        ..CleanConfig::default()
    };
    match XmlCleaner::new(&config) {
        Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "speaker("),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("pattern should not compile"),
    }
}
