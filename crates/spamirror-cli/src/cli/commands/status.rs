//! `spamirror status` – list mirrored pages.

use anyhow::Result;
use spamirror_core::config::MirrorConfig;
use spamirror_core::mapping::read_entries;
use spamirror_core::session::SessionStore;

pub fn run_status(cfg: &MirrorConfig) -> Result<()> {
    let mapping_path = cfg.mapping_path();
    match read_entries(&mapping_path)? {
        None => println!("No pages mirrored yet ({} not found).", mapping_path.display()),
        Some(entries) if entries.is_empty() => println!("Mapping is empty."),
        Some(entries) => {
            println!("{:<28} {:<8} {}", "SLUG", "FILE", "URL");
            let mut missing = 0usize;
            for (slug, entry) in &entries {
                let present = cfg.output_dir.join(&entry.filename).is_file();
                if !present {
                    missing += 1;
                }
                println!(
                    "{:<28} {:<8} {}",
                    slug,
                    if present { "ok" } else { "missing" },
                    entry.url
                );
            }
            println!("{} page(s), {} missing", entries.len(), missing);
        }
    }

    let session = SessionStore::new(cfg.session_path()?);
    let stored = if session.path().exists() { "stored" } else { "none" };
    println!("Session: {} ({})", stored, session.path().display());
    Ok(())
}
