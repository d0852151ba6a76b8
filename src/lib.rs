pub mod annotate;
pub mod cleaner;
pub mod config;
pub mod dates;
pub mod discourse;
pub mod error;
pub mod invert;
pub mod keys;
pub mod lexer;
pub mod markup;
pub mod matchers;
pub mod tag_stack;
pub mod types;

pub use cleaner::XmlCleaner;
pub use config::CleanConfig;
pub use error::{ConfigError, TagError};
pub use types::{CleanWarning, CleanedDocument, DocMetadata, Section, Token};
