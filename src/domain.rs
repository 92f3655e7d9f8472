//! Domain module - scrape configuration, extracted records and page sources
//!
//! Plain value types shared by the parsing engine and the page orchestrator.
//! Nothing here performs I/O; the `PageSource` trait is implemented by the
//! infrastructure layer.

pub mod page_source;
pub mod record;
pub mod scrape_config;

// Re-export commonly used items for convenience
pub use page_source::PageSource;
pub use record::{ExtractionResult, Record};
pub use scrape_config::{
    AttrRequirement, ExtractionMode, FieldSpec, FieldSpecs, RegionLayout, RegionMatcher,
    ScrapeConfig, ScrapeTarget, UrlSpec,
};
