use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(author, version, about = "Bundle stored files into one zip archive", long_about = None)]
pub struct Cli {
    /// JSON array of file descriptors to export
    #[arg(long, short)]
    pub selection: Option<PathBuf>,
    /// Directory the finished archive is saved into
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,
    /// RON settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Request watermarked renders for fingerprinted images
    #[arg(long)]
    pub watermark: bool,
    /// Include the account licence text as LICENCE.txt
    #[arg(long)]
    pub licence: bool,
    /// Full-account data export (fixed archive name)
    #[arg(long)]
    pub account_data: bool,
    /// Extra local file to add to the archive, as NAME=PATH
    #[arg(long = "extra", value_parser = parse_extra)]
    pub extras: Vec<(String, PathBuf)>,
    #[arg(long)]
    pub api_url: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub max_concurrent: Option<usize>,
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,
    #[arg(long, short)]
    pub verbose: bool,
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Write to ./vault_export.log in current directory.
    File,
    /// Write to terminal (stderr for warnings, stdout otherwise).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

fn parse_extra(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected NAME=PATH, got `{raw}`")),
    }
}
