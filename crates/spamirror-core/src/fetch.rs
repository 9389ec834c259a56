//! Asset fetch collaborator: stream one remote file to a local path.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::config::MirrorConfig;
use crate::error::FetchError;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::PartFile;

pub trait AssetFetcher: Send + Sync {
    /// Downloads `url` to `dest`, returning the number of bytes written.
    /// On error nothing is left at `dest`.
    fn fetch(&self, url: &Url, dest: &Path) -> Result<u64, FetchError>;
}

/// libcurl-backed fetcher: GET into `<dest>.part`, rename on success.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    headers: BTreeMap<String, String>,
    user_agent: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl CurlFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            headers: BTreeMap::new(),
            user_agent: None,
            timeout,
            retry,
        }
    }

    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self {
            headers: cfg.headers.clone(),
            user_agent: cfg.user_agent.clone(),
            timeout: cfg.asset_timeout(),
            retry: cfg.retry_policy(),
        }
    }

    fn fetch_once(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        let mut part = PartFile::create(dest)?;
        let mut write_error: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.timeout.min(Duration::from_secs(30)))?;
        easy.timeout(self.timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match part.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_error {
            return Err(FetchError::Storage(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(part.finalize()?)
    }
}

impl AssetFetcher for CurlFetcher {
    fn fetch(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        run_with_retry(&self.retry, || self.fetch_once(url, dest))
    }
}
