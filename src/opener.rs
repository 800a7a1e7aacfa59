//! Opener module.
//! Walks the persisted target list, opens the next batch of unopened URLs
//! in the configured browser and flips their `opened` flag. A failed open
//! is recorded per row and the row stays eligible for the next batch. The
//! full row set is written back afterwards so progress survives restarts.

use std::time::Duration;

use anyhow::Result;
use webbrowser::Browser;

use crate::config::Config;
use crate::store::{self, StoreError};

/// Capability to open one URL in a browser tab. The batch logic only sees
/// this trait; tests drive it with a recording fake.
pub trait TabOpener {
    fn open_tab(&self, url: &str) -> Result<()>;
}

/// Real opener backed by the `webbrowser` crate.
pub struct BrowserOpener {
    browser: Browser,
}

impl BrowserOpener {
    /// Maps the BROWSER setting onto a concrete browser. Unknown names fall
    /// back to the platform default instead of failing every row.
    pub fn from_name(name: &str) -> BrowserOpener {
        let browser = match name.to_ascii_lowercase().as_str() {
            "firefox" => Browser::Firefox,
            "chrome" | "chromium" => Browser::Chrome,
            "safari" => Browser::Safari,
            "opera" => Browser::Opera,
            _ => Browser::Default,
        };
        BrowserOpener { browser }
    }
}

impl TabOpener for BrowserOpener {
    fn open_tab(&self, url: &str) -> Result<()> {
        webbrowser::open_browser(self.browser, url)?;
        Ok(())
    }
}

/// Outcome of one batch run. Failures are data, not errors: the batch
/// keeps going and the affected rows stay unopened.
#[derive(Debug, Default, PartialEq)]
pub struct BatchReport {
    pub opened: usize,
    pub failures: Vec<OpenFailure>,
}

#[derive(Debug, PartialEq)]
pub struct OpenFailure {
    pub url: String,
    pub message: String,
}

/// Opens up to NUM_TO_OPEN unopened targets in persisted order (closest
/// first from the last fetch). An already exhausted store is a normal
/// zero-count result, not an error.
pub async fn open_next_batch(
    config: &Config,
    opener: &dyn TabOpener,
) -> Result<BatchReport, StoreError> {
    let mut targets = store::load(&config.csv_path)?;

    let batch: Vec<usize> = targets
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.opened)
        .map(|(i, _)| i)
        .take(config.num_to_open)
        .collect();

    let mut report = BatchReport::default();
    if batch.is_empty() {
        return Ok(report);
    }

    for &i in &batch {
        match opener.open_tab(&targets[i].url_to_open) {
            Ok(()) => {
                targets[i].opened = true;
                report.opened += 1;
                println!("[OPENED] {}", targets[i].url_to_open);
            }
            Err(e) => {
                report.failures.push(OpenFailure {
                    url: targets[i].url_to_open.clone(),
                    message: e.to_string(),
                });
            }
        }
        tokio::time::sleep(Duration::from_secs_f64(config.wait_between_tabs)).await;
    }

    // All rows go back to disk, not just the batch, so a kill mid-session
    // only loses the tabs that were never opened.
    store::save(&config.csv_path, &targets)?;
    Ok(report)
}
