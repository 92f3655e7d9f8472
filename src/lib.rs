//! listing-scraper - configuration-driven extraction of links and product
//! records from HTML listing pages.
//!
//! The nested-region extraction engine lives in `infrastructure::parsing`.
//! The page orchestrator walks category and product pages over HTTP and
//! collects the records into a table for CSV export and reporting.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
