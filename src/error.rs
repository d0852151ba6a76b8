/// Errors raised while compiling a cleaner configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid annotation to tag pattern: {rule}")]
    InvalidRule { rule: String },

    #[error("Cannot resolve annotation key {key}")]
    UnknownKey { key: String },

    #[error("Invalid tag pattern: {pattern} for annotation key {key}")]
    MissingAttribute { key: String, pattern: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid value '{value}' for flag {name}")]
    InvalidFlag { name: String, value: String },

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural markup errors raised during a cleaning pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Got a close tag {tag} which does not match any open tag")]
    Unbalanced { tag: String },

    #[error("Mismatched tags... {closing} closed a {open} tag")]
    Mismatched { closing: String, open: String },

    #[error("Unclosed tags, starting with {tag}")]
    Unclosed { tag: String },
}
