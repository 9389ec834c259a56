use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters for asset downloads (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per asset (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/spamirror/config.toml`.
///
/// Everything here is fixed at process start; the engine never mutates it.
/// Keys missing from the file take their values from [`MirrorConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Host the crawl is confined to (subdomains included).
    pub allowed_domain: String,
    /// Hard cap on pages saved by the main traversal.
    pub max_pages: usize,
    /// Reject routes containing `/0/<digits>` (per-object detail pages).
    pub skip_numeric_ids: bool,
    /// Routes captured before authentication (landing, signup, login).
    pub prelogin_seeds: Vec<String>,
    /// Entry routes for the authenticated traversal.
    pub post_login_seeds: Vec<String>,
    /// Where the manual login happens; defaults to the first pre-login seed.
    pub login_url: Option<String>,
    /// Settle delay after each navigation, in milliseconds.
    pub render_wait_ms: u64,
    /// Navigation timeout per attempt, in seconds.
    pub navigation_timeout_secs: u64,
    /// Run the browser without a visible window (ignored by the HTTP browser).
    pub headless: bool,
    /// Root output directory for pages and assets.
    pub output_dir: PathBuf,
    /// Mapping file; defaults to `<output_dir>/pages_mapping.json`.
    pub mapping_file: Option<PathBuf>,
    /// Session blob; defaults to `~/.local/state/spamirror/session.bin`.
    pub session_file: Option<PathBuf>,
    /// Concurrent asset downloads per page (1 = sequential).
    pub asset_workers: usize,
    /// Timeout per asset download, in seconds.
    pub asset_timeout_secs: u64,
    /// Optional wall-clock limit for the whole run, in seconds.
    pub max_run_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Extra request headers (e.g. a `Cookie` for the HTTP browser).
    pub headers: BTreeMap<String, String>,
    /// Optional retry policy for asset downloads; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            allowed_domain: "app.example.com".to_string(),
            max_pages: 400,
            skip_numeric_ids: true,
            prelogin_seeds: vec![
                "https://app.example.com/".to_string(),
                "https://app.example.com/-/signup".to_string(),
                "https://app.example.com/-/login".to_string(),
            ],
            post_login_seeds: vec![
                "https://app.example.com/0/home".to_string(),
                "https://app.example.com/0/inbox".to_string(),
                "https://app.example.com/0/projects".to_string(),
            ],
            login_url: None,
            render_wait_ms: 1200,
            navigation_timeout_secs: 60,
            headless: false,
            output_dir: PathBuf::from("rendered_pages"),
            mapping_file: None,
            session_file: None,
            asset_workers: 4,
            asset_timeout_secs: 30,
            max_run_secs: None,
            user_agent: None,
            headers: BTreeMap::new(),
            retry: None,
        }
    }
}

impl MirrorConfig {
    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("pages_mapping.json"))
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session_file {
            Some(p) => Ok(p.clone()),
            None => crate::session::default_session_path(),
        }
    }

    /// Login screen used for the manual-auth pause.
    pub fn login_url(&self) -> Option<&str> {
        self.login_url
            .as_deref()
            .or_else(|| self.prelogin_seeds.first().map(String::as_str))
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_domain.trim().is_empty() {
            anyhow::bail!("allowed_domain must not be empty");
        }
        if self.max_pages == 0 {
            anyhow::bail!("max_pages must be at least 1");
        }
        let login = self.login_url.iter();
        for seed in self
            .prelogin_seeds
            .iter()
            .chain(self.post_login_seeds.iter())
            .chain(login)
        {
            url::Url::parse(seed).with_context(|| format!("invalid seed URL: {}", seed))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("spamirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path (no default file is created).
pub fn load_from_path(path: &Path) -> Result<MirrorConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: MirrorConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MirrorConfig::default();
        assert_eq!(cfg.max_pages, 400);
        assert!(cfg.skip_numeric_ids);
        assert_eq!(cfg.render_wait_ms, 1200);
        assert_eq!(cfg.navigation_timeout_secs, 60);
        assert_eq!(cfg.login_url(), Some("https://app.example.com/"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MirrorConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.allowed_domain, cfg.allowed_domain);
        assert_eq!(parsed.prelogin_seeds, cfg.prelogin_seeds);
        assert_eq!(parsed.post_login_seeds, cfg.post_login_seeds);
        assert_eq!(parsed.output_dir, cfg.output_dir);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            allowed_domain = "app.asana.com"
            max_pages = 25
            skip_numeric_ids = false
            prelogin_seeds = ["https://app.asana.com/"]
            post_login_seeds = ["https://app.asana.com/0/my_tasks"]
            render_wait_ms = 0
            navigation_timeout_secs = 10
            headless = true
            output_dir = "/tmp/mirror"
            asset_workers = 1
            asset_timeout_secs = 5
            max_run_secs = 600

            [headers]
            Cookie = "sid=abc"

            [retry]
            max_attempts = 2
            base_delay_secs = 0.5
            max_delay_secs = 4
        "#;
        let cfg: MirrorConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_pages, 25);
        assert!(!cfg.skip_numeric_ids);
        assert!(cfg.headless);
        assert_eq!(cfg.max_run_secs, Some(600));
        assert_eq!(cfg.headers.get("Cookie").map(String::as_str), Some("sid=abc"));
        assert_eq!(
            cfg.mapping_path(),
            PathBuf::from("/tmp/mirror/pages_mapping.json")
        );
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.max_delay, Duration::from_secs(4));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let toml = r#"
            allowed_domain = "app.asana.com"
            max_pages = 10

            [retry]
            max_attempts = 5
        "#;
        let cfg: MirrorConfig = toml::from_str(toml).unwrap();
        let defaults = MirrorConfig::default();
        assert_eq!(cfg.allowed_domain, "app.asana.com");
        assert_eq!(cfg.max_pages, 10);
        assert_eq!(cfg.render_wait_ms, defaults.render_wait_ms);
        assert_eq!(cfg.output_dir, defaults.output_dir);
        assert_eq!(cfg.prelogin_seeds, defaults.prelogin_seeds);
        assert_eq!(cfg.asset_workers, defaults.asset_workers);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = MirrorConfig::default();
        cfg.allowed_domain = " ".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = MirrorConfig::default();
        cfg.max_pages = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = MirrorConfig::default();
        cfg.post_login_seeds.push("not a url".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = MirrorConfig::default();
        cfg.max_pages = 7;
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.max_pages, 7);
    }
}
