//! Saving one rendered page: name it, localize its assets, write it, map it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

use crate::assets::{AssetLocalizer, LocalizeReport};
use crate::fetch::AssetFetcher;
use crate::html::Document;
use crate::mapping::{MappingStore, PageRecord};
use crate::naming::{file_stem, unique_filename};
use crate::storage::write_atomic;

/// Directory under each page's slug that holds its downloaded assets.
pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone)]
pub struct SavedPage {
    pub record: PageRecord,
    pub path: PathBuf,
    pub assets: LocalizeReport,
}

/// Writes pages into the output root. Owns the run's asset cache.
pub struct PageSaver<'f> {
    out_dir: PathBuf,
    localizer: AssetLocalizer<'f>,
}

impl<'f> PageSaver<'f> {
    pub fn new(out_dir: &Path, fetcher: &'f dyn AssetFetcher, asset_workers: usize) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            localizer: AssetLocalizer::new(fetcher, asset_workers),
        }
    }

    /// Saves `doc` (rendered at `final_url`) under a fresh filename derived
    /// from `base_slug` and records it as `url` in `mapping`.
    ///
    /// `doc` is rewritten in place; extract links before calling this.
    pub fn save(
        &mut self,
        doc: &Document,
        final_url: &str,
        base_slug: &str,
        url: &str,
        mapping: &mut MappingStore,
    ) -> Result<SavedPage> {
        let origin = Url::parse(final_url).with_context(|| format!("page URL: {}", final_url))?;
        let filename = unique_filename(&self.out_dir, base_slug, "html");
        let slug = file_stem(&filename).to_string();

        let assets_dir = self.out_dir.join(&slug).join(ASSETS_DIR);
        let assets_href = format!("{}/{}", slug, ASSETS_DIR);
        let assets = self.localizer.localize(doc, &origin, &assets_dir, &assets_href);

        let html = doc.to_html().context("serialize page")?;
        let path = self.out_dir.join(&filename);
        write_atomic(&path, html.as_bytes())?;

        let record = PageRecord {
            slug,
            url: url.to_string(),
            filename,
        };
        mapping.record(record.clone())?;
        tracing::info!(
            slug = %record.slug,
            url,
            fetched = assets.fetched,
            reused = assets.reused,
            failed = assets.failed,
            "saved page"
        );
        Ok(SavedPage { record, path, assets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    struct NoNetwork;

    impl AssetFetcher for NoNetwork {
        fn fetch(&self, _url: &Url, _dest: &Path) -> Result<u64, FetchError> {
            Err(FetchError::Http(503))
        }
    }

    #[test]
    fn colliding_slugs_get_distinct_files_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut mapping = MappingStore::load(&dir.path().join("pages_mapping.json"), dir.path()).unwrap();
        let mut saver = PageSaver::new(dir.path(), &NoNetwork, 1);

        let a = saver
            .save(
                &Document::parse("<title>Home</title><p>a</p>"),
                "https://app.example.com/0/home",
                "home",
                "https://app.example.com/0/home",
                &mut mapping,
            )
            .unwrap();
        let b = saver
            .save(
                &Document::parse("<title>Home</title><p>b</p>"),
                "https://app.example.com/0/home?tab=2",
                "home",
                "https://app.example.com/0/home?tab=2",
                &mut mapping,
            )
            .unwrap();

        assert_eq!(a.record.filename, "home.html");
        assert_eq!(b.record.filename, "home-2.html");
        assert_eq!(b.record.slug, "home-2");
        assert_eq!(mapping.len(), 2);
        assert!(std::fs::read_to_string(&b.path).unwrap().contains("<p>b</p>"));
    }

    #[test]
    fn failed_asset_keeps_remote_src_and_page_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut mapping = MappingStore::load(&dir.path().join("pages_mapping.json"), dir.path()).unwrap();
        let mut saver = PageSaver::new(dir.path(), &NoNetwork, 2);
        let saved = saver
            .save(
                &Document::parse(r#"<title>Inbox</title><img src="https://cdn.example.com/x.png">"#),
                "https://app.example.com/0/inbox",
                "inbox",
                "https://app.example.com/0/inbox",
                &mut mapping,
            )
            .unwrap();
        assert_eq!(saved.assets.failed, 1);
        let html = std::fs::read_to_string(dir.path().join("inbox.html")).unwrap();
        assert!(html.contains(r#"src="https://cdn.example.com/x.png""#));
    }
}
