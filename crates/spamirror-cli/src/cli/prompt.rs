//! Manual login prompt on the terminal.

use anyhow::{Context, Result};
use spamirror_core::bootstrap::ManualAuth;
use std::io::{self, BufRead, Write};

/// Blocks on stdin until the operator presses Enter.
pub struct StdinPrompt;

impl ManualAuth for StdinPrompt {
    fn wait_for_login(&mut self, login_url: Option<&str>) -> Result<()> {
        let mut out = io::stdout().lock();
        match login_url {
            Some(url) => writeln!(out, "Log in at {} in the browser.", url)?,
            None => writeln!(out, "Log in using the browser.")?,
        }
        writeln!(out, "Without a browser window, add a session cookie under [headers] in the config instead.")?;
        write!(out, "Press Enter once you are logged in... ")?;
        out.flush()?;
        drop(out);

        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read confirmation from stdin")?;
        if n == 0 {
            anyhow::bail!("stdin closed before login was confirmed");
        }
        Ok(())
    }
}
