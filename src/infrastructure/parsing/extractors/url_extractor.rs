use tracing::trace;

use crate::domain::UrlSpec;
use crate::infrastructure::parsing::ExtractionStrategy;

/// Collects hyperlink values from qualifying tags.
///
/// Output accumulates over the whole document; sub-region exits do not reset it.
pub struct UrlExtractor<'c> {
    spec: &'c UrlSpec,
    urls: Vec<String>,
}

impl<'c> UrlExtractor<'c> {
    pub fn new(spec: &'c UrlSpec) -> Self {
        Self {
            spec,
            urls: Vec::new(),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    fn qualifies(&self, name: &str, attrs: &[(&str, &str)]) -> bool {
        name == self.spec.search_tag
            && self
                .spec
                .filter
                .as_ref()
                .is_none_or(|filter| filter.is_met_by(attrs))
    }
}

impl ExtractionStrategy for UrlExtractor<'_> {
    type Output = Vec<String>;

    fn on_start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        if !self.qualifies(name, attrs) {
            return;
        }

        let source = attrs
            .iter()
            .find(|(attr, _)| *attr == self.spec.source_attr)
            .map(|(_, value)| value.trim());

        if let Some(url) = source {
            let wanted = self
                .spec
                .value_pattern
                .as_deref()
                .is_none_or(|pattern| url.contains(pattern));
            if wanted {
                trace!("Collected URL {}", url);
                self.urls.push(url.to_string());
            }
        }
    }

    fn finish(self) -> Self::Output {
        self.urls
    }
}
