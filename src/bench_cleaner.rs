use std::time::{Duration, Instant};
use xmlclean::lexer::tokenize;
use xmlclean::{CleanConfig, XmlCleaner};

fn summarize(label: &str, durations: &[Duration]) -> f64 {
    let avg = durations.iter().map(|d| d.as_secs_f64()).sum::<f64>() / durations.len() as f64;
    let min = durations
        .iter()
        .map(|d| d.as_secs_f64())
        .fold(f64::INFINITY, f64::min);
    println!("{} avg: {:.3}s, min: {:.3}s", label, avg, min);
    avg
}

fn main() {
    let path = std::env::args().nth(1).expect("Usage: bench_cleaner <xml_file>");
    let text = std::fs::read_to_string(&path).expect("Failed to read input file");
    let config = CleanConfig::load_default().expect("Failed to load config");
    let cleaner = XmlCleaner::new(&config).expect("Invalid cleaner config");

    let iterations = 5;

    // Baseline: tokenizing only
    let _ = tokenize(&text);
    let mut baseline_durations = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let tokens = tokenize(&text);
        let elapsed = start.elapsed();
        baseline_durations.push(elapsed);
        println!(
            "Baseline {}: {:.3}s ({} tokens)",
            i + 1,
            elapsed.as_secs_f64(),
            tokens.len(),
        );
    }
    let baseline_avg = summarize("Baseline", &baseline_durations);
    println!();

    let mut durations = Vec::new();
    for i in 0..iterations {
        let tokens = tokenize(&text);
        let start = Instant::now();
        let cleaned = cleaner
            .process(tokens, Some(&text))
            .expect("Cleaning failed");
        let elapsed = start.elapsed();
        durations.push(elapsed);
        println!(
            "Iteration {}: {:.3}s ({} tokens kept, {} sections)",
            i + 1,
            elapsed.as_secs_f64(),
            cleaned.tokens.len(),
            cleaned.metadata.sections.len(),
        );
    }

    println!();
    let avg = summarize("Cleaner", &durations);
    println!("Cleaning vs tokenizing: {:.1}x", avg / baseline_avg);
}
