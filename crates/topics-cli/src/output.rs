//! Output formatting for topics-cli (table, json, csv)

use std::io::Write;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Live text followed by a topic table (default)
    #[default]
    Table,
    /// One JSON document once the reply is complete
    Json,
    /// Topics as CSV once the reply is complete
    Csv,
}

impl OutputFormat {
    /// Parse a format name from the config file
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Whether tokens are echoed as they arrive
    pub fn is_live(&self) -> bool {
        self.format == OutputFormat::Table
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    ///
    /// Status lines go to stderr so stdout carries only the reply.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.dimmed());
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Echo a streamed token immediately
    pub fn token(&self, token: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(token.as_bytes());
        let _ = stdout.flush();
    }

    /// Print the interactive prompt
    pub fn prompt(&self) {
        if !self.quiet {
            eprint!("{} ", ">".bold());
            let _ = std::io::stderr().flush();
        }
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    let table = Table::new(data).to_string();
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => {
                print_csv(data);
            }
        }
    }

    /// Print a finished reply as a single JSON document
    pub fn print_reply(&self, reply: &ReplyDocument<'_>) {
        println!(
            "{}",
            serde_json::to_string_pretty(reply).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

/// Print data as CSV
fn print_csv<T: Serialize>(data: &[T]) {
    if let Some(csv) = to_csv(data) {
        print!("{}", csv);
    }
}

/// Render rows as CSV, header taken from the first row
fn to_csv<T: Serialize>(data: &[T]) -> Option<String> {
    let first = serde_json::to_value(data.first()?).ok()?;
    let serde_json::Value::Object(map) = &first else {
        return None;
    };

    let headers: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    let mut out = format!("{}\n", headers.join(","));

    for item in data {
        if let Ok(serde_json::Value::Object(row)) = serde_json::to_value(item) {
            let values: Vec<String> = headers
                .iter()
                .map(|h| {
                    row.get(*h)
                        .map(|v| match v {
                            serde_json::Value::String(s) => escape_csv(s),
                            other => escape_csv(&other.to_string()),
                        })
                        .unwrap_or_default()
                })
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
    }

    Some(out)
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types
// =============================================================================

/// One extracted topic
#[derive(Debug, Tabled, Serialize)]
pub struct TopicRow {
    #[tabled(rename = "#")]
    pub number: usize,
    #[tabled(rename = "Topic")]
    pub topic: String,
}

impl TopicRow {
    /// Number topics from 1
    pub fn from_topics(topics: &[String]) -> Vec<Self> {
        topics
            .iter()
            .enumerate()
            .map(|(i, t)| Self {
                number: i + 1,
                topic: t.clone(),
            })
            .collect()
    }
}

/// JSON document for a finished reply
#[derive(Debug, Serialize)]
pub struct ReplyDocument<'a> {
    pub theme: &'a str,
    pub reply: &'a str,
    pub topics: &'a [String],
}
