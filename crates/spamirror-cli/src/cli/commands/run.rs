//! `spamirror run` – bootstrap, then crawl and mirror.

use anyhow::{Context, Result};
use spamirror_core::config::MirrorConfig;
use spamirror_core::control::RunControl;
use spamirror_core::fetch::CurlFetcher;
use spamirror_core::render::{HttpBrowser, HttpBrowserOptions};
use spamirror_core::{run_mirror, MirrorSummary};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::cli::prompt::StdinPrompt;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub output: Option<PathBuf>,
    pub domain: Option<String>,
    pub max_pages: Option<usize>,
    pub keep_numeric_ids: bool,
    pub headless: bool,
}

impl RunOverrides {
    pub fn apply(self, cfg: &mut MirrorConfig) {
        if let Some(output) = self.output {
            cfg.output_dir = output;
        }
        if let Some(domain) = self.domain {
            cfg.allowed_domain = domain;
        }
        if let Some(n) = self.max_pages {
            cfg.max_pages = n;
        }
        if self.keep_numeric_ids {
            cfg.skip_numeric_ids = false;
        }
        if self.headless {
            cfg.headless = true;
        }
    }
}

pub async fn run_mirror_command(mut cfg: MirrorConfig, overrides: RunOverrides) -> Result<()> {
    overrides.apply(&mut cfg);
    cfg.validate()?;

    let mut control = RunControl::new();
    if let Some(secs) = cfg.max_run_secs {
        control = control.with_time_limit(Duration::from_secs(secs));
    }
    let token = control.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted; stopping after the current page.");
            token.store(true, Ordering::Relaxed);
        }
    });

    println!(
        "Mirroring {} into {} (up to {} pages)",
        cfg.allowed_domain,
        cfg.output_dir.display(),
        cfg.max_pages
    );
    let started = Instant::now();
    let output_dir = cfg.output_dir.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<MirrorSummary> {
        let mut browser = HttpBrowser::new(HttpBrowserOptions {
            headers: cfg.headers.clone(),
            user_agent: cfg.user_agent.clone(),
            headless: cfg.headless,
        })?;
        let fetcher = CurlFetcher::from_config(&cfg);
        run_mirror(&cfg, &mut browser, &fetcher, &mut StdinPrompt, &control)
    })
    .await
    .context("mirror task failed")?;
    ctrl_c.abort();
    let summary = result?;

    println!(
        "Session: {:?}; {} pre-login screen(s) captured",
        summary.bootstrap.state,
        summary.bootstrap.saved.len()
    );
    println!(
        "Saved {} page(s), {} failed, {} skipped ({}) in {:.1}s",
        summary.crawl.saved,
        summary.crawl.failed,
        summary.crawl.skipped,
        summary.crawl.stop,
        started.elapsed().as_secs_f64()
    );
    println!("{} page(s) mapped in {}", summary.mapped_pages, output_dir.display());
    tracing::info!(
        saved = summary.crawl.saved,
        mapped = summary.mapped_pages,
        "run completed"
    );
    Ok(())
}
