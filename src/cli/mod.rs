//! CLI commands implementation.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use crate::config::Config;
use crate::crawler;
use crate::snapshot;

#[derive(Parser)]
#[command(name = "offersnap")]
#[command(about = "Headless-browser crawler for weekly retail offers")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = "OFFERSNAP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run one crawl and replace the snapshot
    Crawl {
        /// Snapshot output path (overrides config)
        #[arg(short, long, env = "OFFERSNAP_OUTPUT")]
        output: Option<PathBuf>,

        /// Maximum listing pages to visit (overrides config)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Run with a visible browser window
        #[arg(long)]
        headed: bool,
    },

    /// Summarize the current snapshot
    Show {
        /// Snapshot path (overrides config)
        #[arg(short, long, env = "OFFERSNAP_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl {
            output,
            max_pages,
            headed,
        } => {
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(max_pages) = max_pages {
                config.limits.max_pages = max_pages;
            }
            if headed {
                config.browser.headless = false;
            }
            cmd_crawl(&config).await
        }
        Commands::Show { output } => {
            if let Some(output) = output {
                config.output = output;
            }
            cmd_show(&config)
        }
        Commands::Config => cmd_config(&config),
    }
}

async fn cmd_crawl(config: &Config) -> anyhow::Result<()> {
    match crawler::run(config).await {
        Ok(outcome) => {
            println!(
                "{} {} products from {} page(s), offer period {}",
                style("Crawl complete:").green().bold(),
                outcome.result.products.len(),
                outcome.pages_visited,
                style(&outcome.result.offer_period).cyan(),
            );
            println!("Snapshot written to {}", config.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", style("Crawl failed:").red().bold(), e);
            Err(e.into())
        }
    }
}

fn cmd_show(config: &Config) -> anyhow::Result<()> {
    let result = snapshot::read_snapshot(&config.output)?;

    if result.products.is_empty() {
        println!(
            "No snapshot at {} (empty catalog)",
            config.output.display()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        style("Offer period:").bold(),
        if result.offer_period.is_empty() {
            "(unknown)"
        } else {
            result.offer_period.as_str()
        }
    );
    println!("{} {}", style("Last updated:").bold(), result.last_updated);
    println!("{} {}", style("Products:").bold(), result.products.len());

    for product in result.products.iter().take(10) {
        let title = product.title.as_deref().unwrap_or("(untitled)");
        let price = product.price.as_deref().unwrap_or("-");
        match product.original_price.as_deref() {
            Some(was) => println!("  {title}  {price} (was {was})"),
            None => println!("  {title}  {price}"),
        }
    }
    if result.products.len() > 10 {
        println!("  ... and {} more", result.products.len() - 10);
    }
    Ok(())
}

fn cmd_config(config: &Config) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render config")?;
    print!("{rendered}");
    Ok(())
}
