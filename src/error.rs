//! Error taxonomy for the crawl pipeline.
//!
//! Only two classes of failure surface to the caller: the browser could not
//! be acquired, or the snapshot could not be written. Everything in between
//! (consent banner absent, show-all affordance missing, pagination ending
//! early, individual field misses) is a normal branch outcome and degrades
//! to a smaller result set instead of an error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The browser process could not be launched. Fatal; retries belong to
    /// the caller, not this layer.
    #[error("failed to launch browser: {0}")]
    Launch(#[source] anyhow::Error),

    /// The snapshot artifact could not be replaced.
    #[error("failed to write snapshot to {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
