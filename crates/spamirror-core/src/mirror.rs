//! One full mirror run: bootstrap, then traversal.

use anyhow::{Context, Result};

use crate::bootstrap::{Bootstrap, BootstrapOutcome, ManualAuth};
use crate::config::MirrorConfig;
use crate::control::RunControl;
use crate::crawler::{CrawlSummary, Crawler};
use crate::fetch::AssetFetcher;
use crate::frontier::AdmissionPolicy;
use crate::mapping::{FlushOnDrop, MappingStore};
use crate::pages::PageSaver;
use crate::render::{Browser, RenderTiming};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct MirrorSummary {
    pub bootstrap: BootstrapOutcome,
    pub crawl: CrawlSummary,
    /// Entries in the mapping file after the final flush.
    pub mapped_pages: usize,
}

/// Runs bootstrap and traversal against `browser`, writing into
/// `cfg.output_dir`. The mapping is flushed on every exit path.
pub fn run_mirror(
    cfg: &MirrorConfig,
    browser: &mut dyn Browser,
    fetcher: &dyn AssetFetcher,
    auth: &mut dyn ManualAuth,
    control: &RunControl,
) -> Result<MirrorSummary> {
    cfg.validate()?;
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create output dir: {}", cfg.output_dir.display()))?;
    let mut store = MappingStore::load(&cfg.mapping_path(), &cfg.output_dir)?;
    let session = SessionStore::new(cfg.session_path()?);
    let timing = RenderTiming {
        navigation_timeout: cfg.navigation_timeout(),
        settle: cfg.render_wait(),
    };
    let mut pages = PageSaver::new(&cfg.output_dir, fetcher, cfg.asset_workers);

    let mut mapping = FlushOnDrop::new(&mut store);
    let bootstrap = Bootstrap {
        prelogin_seeds: &cfg.prelogin_seeds,
        login_url: cfg.login_url(),
        timing,
    }
    .run(browser, &mut pages, &mut mapping, &session, auth, control)?;
    tracing::info!(
        state = ?bootstrap.state,
        pages = bootstrap.saved.len(),
        misses = bootstrap.heuristic_misses,
        "bootstrap finished"
    );

    let mut crawler = Crawler::new(
        AdmissionPolicy::new(cfg.allowed_domain.clone(), cfg.skip_numeric_ids),
        cfg.max_pages,
        timing,
        control,
    );
    let seeded = crawler.seed(&cfg.post_login_seeds);
    tracing::info!(seeded, "starting traversal");
    let crawl = crawler.run(browser, &mut pages, &mut mapping);
    let mapped_pages = mapping.len();
    drop(mapping);

    Ok(MirrorSummary {
        bootstrap,
        crawl,
        mapped_pages,
    })
}
