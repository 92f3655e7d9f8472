//! Application layer module
//!
//! Walks the configured pages and assembles the product table.

pub mod dto;
pub mod page_orchestrator;

pub use dto::{MAIN_CATEG_COL, ProductTable, SUB_CATEG_COL};
pub use page_orchestrator::{PageOrchestrator, ScrapeSections, category_label};
