//! Asset localization: download stylesheets, icons and images a page
//! references and point the page at the local copies.
//!
//! Per reference the order is: run cache hit, then a file already present in
//! the page's assets directory, then a fetch. A failed fetch leaves the
//! original reference in place; the page is still saved.

mod collect;
mod pool;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use url::Url;

use crate::fetch::AssetFetcher;
use crate::html::Document;
use crate::naming::local_asset_name;
use crate::route::resolve_reference;
use pool::FetchJob;

/// Remote asset URL → path of its local copy, relative to the output root.
///
/// Lives for one run so an asset shared by many pages is fetched once.
#[derive(Debug, Default)]
pub struct AssetCache {
    by_url: HashMap<String, String>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &Url) -> Option<&str> {
        self.by_url.get(url.as_str()).map(String::as_str)
    }

    pub fn insert(&mut self, url: &Url, local_href: String) {
        self.by_url.insert(url.to_string(), local_href);
    }
}

/// Counts for one localized page. `reused`, `fetched` and `failed` count
/// distinct assets; `rewritten` counts references changed in the markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalizeReport {
    pub rewritten: usize,
    pub reused: usize,
    pub fetched: usize,
    pub failed: usize,
}

pub struct AssetLocalizer<'f> {
    fetcher: &'f dyn AssetFetcher,
    workers: usize,
    cache: AssetCache,
}

impl<'f> AssetLocalizer<'f> {
    pub fn new(fetcher: &'f dyn AssetFetcher, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
            cache: AssetCache::new(),
        }
    }

    /// Downloads the assets `doc` references and rewrites the references in
    /// place to `<assets_href>/<local name>`.
    ///
    /// `origin` is the page's final URL, `assets_dir` where downloads land
    /// and `assets_href` the same directory relative to the output root.
    pub fn localize(
        &mut self,
        doc: &Document,
        origin: &Url,
        assets_dir: &Path,
        assets_href: &str,
    ) -> LocalizeReport {
        let assets_href = assets_href.trim_end_matches('/');
        let attr_sites = collect::attr_sites(doc);
        let styles: Vec<_> = collect::style_blocks(doc)
            .into_iter()
            .map(|el| {
                let css = el.raw_text();
                (el, css)
            })
            .collect();

        // Distinct remote URLs in first-seen order.
        let mut wanted: Vec<Url> = Vec::new();
        let mut push = |raw: &str| {
            if let Some(u) = resolve_reference(origin, raw) {
                if !wanted.contains(&u) {
                    wanted.push(u);
                }
            }
        };
        for site in &attr_sites {
            push(&site.value);
        }
        for (_, css) in &styles {
            for raw in collect::css_urls(css) {
                push(&raw);
            }
        }

        let mut report = LocalizeReport::default();
        let mut jobs: BTreeMap<String, FetchJob> = BTreeMap::new();
        let mut waiting: Vec<(Url, String)> = Vec::new();
        for url in wanted {
            if self.cache.get(&url).is_some() {
                report.reused += 1;
                continue;
            }
            let name = local_asset_name(&url);
            let dest = assets_dir.join(&name);
            if dest.exists() {
                tracing::debug!(asset = %url, path = %dest.display(), "asset already on disk");
                self.cache.insert(&url, format!("{}/{}", assets_href, name));
                report.reused += 1;
                continue;
            }
            jobs.entry(name.clone()).or_insert_with(|| FetchJob {
                local_name: name.clone(),
                url: url.clone(),
                dest,
            });
            waiting.push((url, name));
        }

        let outcomes = pool::fetch_all(self.fetcher, jobs.into_values().collect(), self.workers);
        let mut stored: HashMap<String, bool> = HashMap::new();
        for (job, res) in outcomes {
            match res {
                Ok(bytes) => {
                    tracing::debug!(page = %origin, asset = %job.url, bytes, "asset saved");
                    report.fetched += 1;
                    stored.insert(job.local_name, true);
                }
                Err(e) => {
                    tracing::warn!(page = %origin, asset = %job.url, error = %e, "asset fetch failed; keeping remote reference");
                    report.failed += 1;
                    stored.insert(job.local_name, false);
                }
            }
        }
        for (url, name) in waiting {
            if stored.get(&name).copied().unwrap_or(false) {
                self.cache.insert(&url, format!("{}/{}", assets_href, name));
            }
        }

        let local_for = |raw: &str| -> Option<String> {
            let url = resolve_reference(origin, raw)?;
            self.cache.get(&url).map(str::to_string)
        };
        for site in &attr_sites {
            if let Some(local) = local_for(&site.value) {
                site.element.set_attr(site.attr, &local);
                report.rewritten += 1;
            }
        }
        for (el, css) in &styles {
            let (new_css, n) = collect::rewrite_css_urls(css, local_for);
            if n > 0 {
                el.set_raw_text(&new_css);
                report.rewritten += n;
            }
        }
        report
    }
}
