use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use slackdown::Config;

#[derive(Parser)]
#[command(name = "slackdown")]
#[command(about = "Convert Markdown into Slack Block Kit blocks")]
struct Cli {
    /// Input Markdown file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output JSON file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::compiled_default(),
    };

    // Read input
    let markdown = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut content = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut content) {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(1);
            }
            content
        }
    };

    let blocks = match slackdown::convert_with_config(&markdown, &config) {
        Ok(blocks) => blocks,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(blocks = blocks.len(), "converted");

    let json = match slackdown::to_json(&blocks, cli.pretty) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing blocks: {}", e);
            std::process::exit(1);
        }
    };

    match cli.output {
        Some(output) => {
            if let Err(e) = fs::write(&output, json) {
                eprintln!("Error writing {}: {}", output.display(), e);
                std::process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}
