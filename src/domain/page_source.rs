//! Source of raw HTML documents
//!
//! Implemented by the HTTP client in the infrastructure layer and by in-memory
//! fakes in tests.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the complete document at `url`
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
