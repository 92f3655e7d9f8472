//! Extraction strategies
//!
//! `Extractor` is the tagged union the session runner hands to the region
//! tracker; it dispatches each callback to the variant chosen by the
//! configured target.

pub mod field_extractor;
pub mod url_extractor;

pub use field_extractor::FieldExtractor;
pub use url_extractor::UrlExtractor;

use super::ExtractionStrategy;
use crate::domain::{ExtractionResult, ScrapeTarget};

pub enum Extractor<'c> {
    Urls(UrlExtractor<'c>),
    Fields(FieldExtractor<'c>),
}

impl<'c> Extractor<'c> {
    pub fn for_target(target: &'c ScrapeTarget) -> Self {
        match target {
            ScrapeTarget::Urls(spec) => Self::Urls(UrlExtractor::new(spec)),
            ScrapeTarget::Fields(specs) => Self::Fields(FieldExtractor::new(specs)),
        }
    }
}

impl ExtractionStrategy for Extractor<'_> {
    type Output = ExtractionResult;

    fn on_start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        match self {
            Self::Urls(extractor) => extractor.on_start_tag(name, attrs),
            Self::Fields(extractor) => extractor.on_start_tag(name, attrs),
        }
    }

    fn on_text(&mut self, content: &str) {
        match self {
            Self::Urls(extractor) => extractor.on_text(content),
            Self::Fields(extractor) => extractor.on_text(content),
        }
    }

    fn on_end_tag(&mut self, name: &str) {
        match self {
            Self::Urls(extractor) => extractor.on_end_tag(name),
            Self::Fields(extractor) => extractor.on_end_tag(name),
        }
    }

    fn on_sub_region_exit(&mut self) {
        match self {
            Self::Urls(extractor) => extractor.on_sub_region_exit(),
            Self::Fields(extractor) => extractor.on_sub_region_exit(),
        }
    }

    fn finish(self) -> Self::Output {
        match self {
            Self::Urls(extractor) => ExtractionResult::Urls(extractor.finish()),
            Self::Fields(extractor) => ExtractionResult::Records(extractor.finish()),
        }
    }
}
