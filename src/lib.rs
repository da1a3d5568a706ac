//! offersnap - weekly retail offer crawler.
//!
//! Drives a headless Chromium instance through a consent-gated, paginated,
//! JavaScript-rendered offer listing, extracts product records through
//! fallback cascades tolerant of unstable markup, and replaces a JSON
//! snapshot atomically.

pub mod browser;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod models;
pub mod period;
pub mod snapshot;

pub use error::CrawlError;
pub use models::{CrawlResult, ProductRecord};
