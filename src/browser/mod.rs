//! Browser session management.
//!
//! Owns the lifecycle of one headless Chromium instance and one page over
//! the Chrome DevTools Protocol. A session is single-tenant: concurrent
//! crawls must each launch their own. Launch failure is fatal to the whole
//! invocation; retries belong to the caller.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::BrowserEngineConfig;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// One live browser process plus the single page the crawl drives.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch an isolated browser and open a blank page.
    pub async fn launch(config: &BrowserEngineConfig) -> Result<Self> {
        info!("Launching browser (headless={})", config.headless);

        let chrome_path = match &config.executable {
            Some(path) => path.clone(),
            None => find_chrome()?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(config.window_width, config.window_height);

        // with_head means NOT headless, confusingly
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-sandbox") // Needed for headless in containers/restricted environments
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu") // Recommended for headless
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        // Drain CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e).context("Failed to open page");
            }
        };

        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    /// The crawl's single page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Shut the browser down. Invoked on every exit path of the pipeline.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close returned error: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        debug!("Browser session released");
    }
}

/// Find a Chrome/Chromium executable.
fn find_chrome() -> Result<PathBuf> {
    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found Chrome in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium not found. Please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or download from: https://www.google.com/chrome/"
    ))
}
