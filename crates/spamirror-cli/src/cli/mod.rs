//! CLI for the spamirror offline app mirror.

mod commands;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use spamirror_core::config::{self, MirrorConfig};
use std::path::{Path, PathBuf};

use commands::{run_completions, run_forget_session, run_man, run_mirror_command, run_status, RunOverrides};

/// Top-level CLI for spamirror.
#[derive(Debug, Parser)]
#[command(name = "spamirror")]
#[command(about = "spamirror: offline, navigable mirror of an authenticated single-page app", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/spamirror/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Capture the pre-login screens, then crawl and mirror the app.
    Run {
        /// Output directory for pages and assets.
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,
        /// Restrict the crawl to this host and its subdomains.
        #[arg(long, value_name = "HOST")]
        domain: Option<String>,
        /// Stop after saving N pages.
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,
        /// Also crawl per-object routes like /0/<digits>.
        #[arg(long)]
        keep_numeric_ids: bool,
        /// Run the browser without a window.
        #[arg(long)]
        headless: bool,
    },

    /// List mirrored pages and flag files missing on disk.
    Status,

    /// Delete the stored login session.
    ForgetSession,

    /// Print shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff).
    Man,
}

fn load_config(path: Option<&Path>) -> Result<MirrorConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let config_path = cli.config.as_deref();

        match cli.command {
            CliCommand::Run {
                output,
                domain,
                max_pages,
                keep_numeric_ids,
                headless,
            } => {
                let cfg = load_config(config_path)?;
                let overrides = RunOverrides {
                    output,
                    domain,
                    max_pages,
                    keep_numeric_ids,
                    headless,
                };
                run_mirror_command(cfg, overrides).await?;
            }
            CliCommand::Status => run_status(&load_config(config_path)?)?,
            CliCommand::ForgetSession => run_forget_session(&load_config(config_path)?)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
