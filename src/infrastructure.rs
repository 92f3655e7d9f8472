//! Infrastructure layer for parsing, configuration, HTTP fetching and persistence
//!
//! The extraction engine lives in `parsing`; everything else is I/O around it.

pub mod config;
pub mod csv_export;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod report;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppSettings, ConfigError, ConfigProvider, CrawlPlan, LoggingConfig, OutputConfig};
pub use csv_export::{ExportError, read_table, write_table};
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{SessionRunner, collect_records, collect_urls};
pub use parsing_error::ScrapeConfigError;
pub use report::create_product_distribution_report;
pub use simple_http_client::{FetchError, HttpClient, HttpClientConfig};
