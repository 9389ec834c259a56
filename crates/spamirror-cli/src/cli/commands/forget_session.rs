//! `spamirror forget-session` – delete the stored login session.

use anyhow::Result;
use spamirror_core::config::MirrorConfig;
use spamirror_core::session::SessionStore;

pub fn run_forget_session(cfg: &MirrorConfig) -> Result<()> {
    let store = SessionStore::new(cfg.session_path()?);
    if store.forget()? {
        println!("Removed session {}", store.path().display());
    } else {
        println!("No stored session at {}", store.path().display());
    }
    Ok(())
}
