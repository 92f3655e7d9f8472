//! Configuration-driven HTML extraction
//!
//! The tag event source turns one document into start/end/text events, the
//! region tracker follows container and sub-container nesting, and an
//! extraction strategy builds URLs or records while inside those regions.
//! The session runner wires the three together for one document.

pub mod extractors;
pub mod region_tracker;
pub mod session;
pub mod tag_events;

// Re-export public types
pub use extractors::{Extractor, FieldExtractor, UrlExtractor};
pub use region_tracker::{RegionSignal, RegionState, RegionTracker};
pub use session::{SessionRunner, collect_records, collect_urls};
pub use tag_events::{DocumentEvents, TagEvent};

/// Pluggable extraction behaviour driven by the region tracker.
///
/// Start tags are only delivered while inside the innermost configured
/// region; text and end tags are always delivered.
pub trait ExtractionStrategy {
    type Output;

    fn on_start_tag(&mut self, name: &str, attrs: &[(&str, &str)]);

    fn on_text(&mut self, _content: &str) {}

    fn on_end_tag(&mut self, _name: &str) {}

    /// The record boundary closed: the sub-container, or the container when
    /// no sub-container is configured
    fn on_sub_region_exit(&mut self) {}

    fn finish(self) -> Self::Output;
}
