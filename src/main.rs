use xmlclean::lexer::tokenize;
use xmlclean::types::CleanWarning;
use xmlclean::{CleanConfig, XmlCleaner};

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn main() -> Result<(), DynError> {
    tracing_subscriber::fmt::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let (input_path, config_path) = match args.as_slice() {
        [input] => (input, None),
        [input, config] => (input, Some(config)),
        _ => {
            eprintln!("Usage: xmlclean <file> [config.json]");
            std::process::exit(2);
        }
    };

    let config = match config_path {
        Some(path) => CleanConfig::load_from_file(path)?,
        None => CleanConfig::load_default()?,
    };
    let cleaner = XmlCleaner::new(&config)?;

    let text = std::fs::read_to_string(input_path)?;
    let tokens = tokenize(&text);
    tracing::info!("{}: {} tokens", input_path, tokens.len());

    let cleaned = cleaner.process(tokens, Some(&text))?;
    for warning in &cleaned.warnings {
        match warning {
            CleanWarning::UnparsedSectionDate {
                section,
                begin,
                raw,
                reason,
            } => tracing::warn!(
                "<{}> section at {}: date '{}' kept raw ({})",
                section,
                begin,
                raw,
                reason
            ),
        }
    }
    tracing::info!(
        "kept {} tokens, {} sections",
        cleaned.tokens.len(),
        cleaned.metadata.sections.len()
    );

    println!("{}", serde_json::to_string_pretty(&cleaned)?);
    Ok(())
}
