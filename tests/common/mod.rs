#![allow(dead_code)]
use std::path::Path;
use xmlclean::lexer::tokenize;
use xmlclean::{CleanConfig, CleanedDocument, TagError, Token, XmlCleaner};

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

pub fn load_config(filename: &str) -> CleanConfig {
    let path = Path::new(&fixtures_dir()).join(filename);
    CleanConfig::load_from_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load config {}: {}", path.display(), e))
}

pub fn cleaner(config: &CleanConfig) -> XmlCleaner {
    XmlCleaner::new(config).expect("config should compile")
}

/// Tokenizes `text` and cleans it with the document text attached.
pub fn try_clean(config: &CleanConfig, text: &str) -> Result<CleanedDocument, TagError> {
    cleaner(config).process(tokenize(text), Some(text))
}

pub fn clean(config: &CleanConfig, text: &str) -> CleanedDocument {
    try_clean(config, text).unwrap_or_else(|e| panic!("cleaning failed: {e}"))
}

pub fn words(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.word.as_str()).collect()
}

pub fn find<'a>(tokens: &'a [Token], word: &str) -> &'a Token {
    tokens
        .iter()
        .find(|t| t.word == word)
        .unwrap_or_else(|| panic!("no token {word:?} in {:?}", words(tokens)))
}
