//! xaitext CLI - score sentences with an ONNX text classifier.

mod cli;

use std::io::BufRead;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use xaitext_core::{Config, Result};
use xaitext_ml::{ModelRunner, Preprocessor};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("XAITEXT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = cli::Cli::parse();

    let result = Config::load(cli.config.as_deref())
        .map(|config| cli.apply(config))
        .and_then(|config| match &cli.command {
            cli::Command::Score { json, texts } => run_score(&config, texts, *json),
            cli::Command::Tokenize { json, texts } => run_tokenize(&config, texts, *json),
            cli::Command::Vocab => run_vocab(&config),
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!(%e, "command failed");
            eprintln!("xaitext: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Positional texts, or non-empty stdin lines when none were given.
fn read_texts(args: &[String]) -> Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args.to_vec());
    }
    debug!("reading sentences from stdin");
    let mut texts = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            texts.push(line);
        }
    }
    Ok(texts)
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    text: &'a str,
    probabilities: Vec<(&'a str, f32)>,
    predicted: &'a str,
}

fn run_score(config: &Config, args: &[String], json: bool) -> Result<()> {
    let texts = read_texts(args)?;
    let mut runner = ModelRunner::from_config(config)?;

    info!(sentences = texts.len(), "scoring");
    let scores = runner.score_batch(&texts)?;
    let labels = scores.labels();

    let rows: Vec<ScoreRow<'_>> = texts
        .iter()
        .zip(scores.probabilities().rows())
        .zip(scores.predicted())
        .map(|((text, row), best)| ScoreRow {
            text,
            probabilities: labels.iter().map(String::as_str).zip(row.iter().copied()).collect(),
            predicted: &labels[best],
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let header: Vec<&str> = labels.iter().map(String::as_str).collect();
    println!("{}\ttext", header.join("\t"));
    for row in &rows {
        let cells: Vec<String> = row
            .probabilities
            .iter()
            .map(|(_, p)| format!("{p:.4}"))
            .collect();
        println!("{}\t{}", cells.join("\t"), row.text);
    }
    Ok(())
}

#[derive(Serialize)]
struct TokenRow<'a> {
    token: &'a str,
    offset: usize,
    index: u32,
    padding: bool,
}

fn run_tokenize(config: &Config, args: &[String], json: bool) -> Result<()> {
    let texts = read_texts(args)?;
    let preprocessor = Preprocessor::from_config(config)?;

    let mut sentences = Vec::with_capacity(texts.len());
    for text in &texts {
        sentences.push(preprocessor.prepare(text)?);
    }

    let tables: Vec<Vec<TokenRow<'_>>> = sentences
        .iter()
        .map(|s| {
            let words = s.tokens.len() - s.padded;
            s.tokens
                .iter()
                .zip(&s.ids)
                .enumerate()
                .map(|(i, (t, &index))| TokenRow {
                    token: &t.text,
                    offset: t.offset,
                    index,
                    padding: i >= words,
                })
                .collect()
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    for (text, rows) in texts.iter().zip(&tables) {
        println!("# {text}");
        for row in rows {
            let marker = if row.padding { " (pad)" } else { "" };
            println!("{:>5}  {:>7}  {}{marker}", row.offset, row.index, row.token);
        }
    }
    Ok(())
}

fn run_vocab(config: &Config) -> Result<()> {
    let preprocessor = Preprocessor::from_config(config)?;
    let vocab = preprocessor.vocab();
    println!("tokens:     {}", vocab.len());
    println!("unk index:  {}", vocab.unk_index());
    println!("pad index:  {}", vocab.pad_index());
    println!("min length: {}", preprocessor.min_length());
    Ok(())
}
