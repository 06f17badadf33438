//! Topics CLI - Table Topics generator
//!
//! Streams Toastmasters Table Topics questions from the chat endpoint and
//! prints them as they are generated.

mod commands;
mod config;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topics_stream::ChatClient;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

/// Connection timeout for the chat endpoint
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "topics")]
#[command(author, version, about = "Table Topics generator")]
#[command(propagate_version = true)]
struct Cli {
    /// API base URL
    #[arg(short, long, env = "TOPICS_SERVER")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "TOPICS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate topics for a theme
    Generate {
        /// Theme the topics should be about
        #[arg(required = true)]
        theme: Vec<String>,

        /// Number of topics (1-20)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Print only the streamed reply, without the topic table
        #[arg(long)]
        raw: bool,
    },

    /// Interactive session; each theme is sent with the earlier turns
    Chat {
        /// Number of topics per turn (1-20)
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        cli.server.as_deref(),
        cli.output.map(Into::into),
        cli.no_color,
    );
    debug!("Resolved config: {:?}", merged);

    let format = match OutputFormat::parse(&merged.output) {
        Some(format) => format,
        None => anyhow::bail!("Unknown output format in config: {}", merged.output),
    };

    // Create output context
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);
    let client = create_client(&merged)?;

    // Execute command
    match &cli.command {
        Commands::Generate { theme, count, raw } => {
            let theme = theme.join(" ");
            commands::generate(&client, &theme, merged.topics(*count), *raw, &ctx).await?;
        }

        Commands::Chat { count } => {
            commands::chat(&client, merged.topics(*count), &ctx).await?;
        }
    }

    Ok(())
}

/// Create a chat client for the resolved server URL
fn create_client(config: &MergedConfig) -> Result<ChatClient> {
    ChatClient::with_config(&config.server, config.timeout, CONNECT_TIMEOUT)
        .context("Failed to create chat client")
}

// Implement conversion for OutputFormat to string (for config merge)
impl From<OutputFormat> for &str {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}
