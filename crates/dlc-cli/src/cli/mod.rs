//! CLI for the DLC download coordinator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dlc_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_exists, run_fetch, run_key, FetchArgs};

/// Top-level CLI for the DLC download coordinator.
#[derive(Debug, Parser)]
#[command(name = "dlc")]
#[command(about = "DLC: concurrent downloads with one aggregate progress signal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more URLs concurrently, showing aggregate progress.
    Fetch {
        /// HTTP/HTTPS/file URLs. Duplicates share one transfer.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Directory to save into (default: config `download_dir`, else current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Download even if the destination file already exists.
        #[arg(long)]
        overwrite: bool,
        /// Print each aggregate state change as a JSON line.
        #[arg(long)]
        json: bool,
    },

    /// Check whether a finished download for URL is already present (exit 1 if not).
    Exists {
        url: String,
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// File name to use instead of the last URL path segment.
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the transfer key (canonical destination path) for URL.
    Key {
        url: String,
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Compute SHA-256 of a file, optionally comparing with an expected digest.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Expected hex digest; exit 1 on mismatch.
        #[arg(long, value_name = "HEX")]
        expect: Option<String>,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    /// Parse arguments and run; returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let resolve_dir = |dir: Option<PathBuf>| -> Result<PathBuf> {
            match dir.or_else(|| cfg.download_dir.clone()) {
                Some(d) => Ok(d),
                None => Ok(std::env::current_dir()?),
            }
        };

        let code = match cli.command {
            CliCommand::Fetch {
                urls,
                dir,
                overwrite,
                json,
            } => {
                let args = FetchArgs {
                    urls,
                    dir: resolve_dir(dir)?,
                    overwrite,
                    json,
                };
                run_fetch(&cfg, args).await?
            }
            CliCommand::Exists { url, dir, name } => run_exists(&url, resolve_dir(dir)?, name)?,
            CliCommand::Key { url, dir, name } => run_key(&url, resolve_dir(dir)?, name)?,
            CliCommand::Checksum { path, expect } => run_checksum(&path, expect.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
        };

        Ok(code)
    }
}

#[cfg(test)]
mod tests;
