//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `webgrab` library that handles:
//! - Command-line argument parsing
//! - Logger and TLS crypto-provider initialization
//! - User-facing output and interactive search-result selection
//!
//! All core functionality is implemented in the library crate.

use std::io::{self, BufRead, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use webgrab::initialization::{init_crypto_provider, init_logger_with};
use webgrab::{fetch_page, search, Config, TextCache};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    init_crypto_provider();

    if let Some(url) = config.url.clone() {
        run_url(&url, &config).await
    } else if !config.search.is_empty() {
        let query = config.search.join(" ");
        run_search(&query, &config).await
    } else {
        Config::command().print_help()?;
        Ok(())
    }
}

/// Fetches one URL and prints its extracted text.
async fn run_url(url: &str, config: &Config) -> Result<()> {
    let mut cache = match TextCache::load(&config.cache_path) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("webgrab error: {e:#}");
            process::exit(1);
        }
    };

    match fetch_page(url, config, &mut cache).await {
        Ok(outcome) => {
            if outcome.from_cache {
                println!("Cached response:");
            }
            println!("{}", outcome.text);
            Ok(())
        }
        Err(e) => {
            eprintln!("webgrab error: {e:#}");
            process::exit(1);
        }
    }
}

/// Runs a search, lists the results, and optionally opens one.
async fn run_search(query: &str, config: &Config) -> Result<()> {
    let results = match search(query, config).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("webgrab error: {e:#}");
            process::exit(1);
        }
    };

    if results.is_empty() {
        println!("No search results found. The search engine page may have changed its structure.");
        return Ok(());
    }

    println!("Search Results:");
    println!("===============");
    for (index, result) in results.iter().enumerate() {
        println!("{}. {}", index + 1, result.title);
        println!("   {}", result.url);
        println!();
    }

    print!(
        "Choose a result to open (1-{}), or press Enter to quit: ",
        results.len()
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let choice = line.trim();
    if choice.is_empty() {
        return Ok(());
    }

    match choice.parse::<usize>() {
        Ok(number) if (1..=results.len()).contains(&number) => {
            run_url(&results[number - 1].url, config).await
        }
        _ => {
            eprintln!("Error: no search result numbered '{choice}'");
            process::exit(1);
        }
    }
}
