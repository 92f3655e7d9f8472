use tracing::trace;

use crate::domain::{FieldSpecs, Record};
use crate::infrastructure::parsing::ExtractionStrategy;

/// Builds one record per completed record region.
///
/// A qualifying start tag arms its field; only the very next text event fills
/// it. Any other text or end tag disarms the field, and a later qualifying tag
/// replaces it.
pub struct FieldExtractor<'c> {
    specs: &'c FieldSpecs,
    current: Record,
    pending: Option<usize>,
    records: Vec<Record>,
}

impl<'c> FieldExtractor<'c> {
    pub fn new(specs: &'c FieldSpecs) -> Self {
        Self {
            specs,
            current: Record::empty(specs.names()),
            pending: None,
            records: Vec::new(),
        }
    }

    pub fn current(&self) -> &Record {
        &self.current
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl ExtractionStrategy for FieldExtractor<'_> {
    type Output = Vec<Record>;

    fn on_start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        if let Some(index) = self.specs.first_match(name, attrs) {
            self.pending = Some(index);
        }
    }

    fn on_text(&mut self, content: &str) {
        if let Some(index) = self.pending.take() {
            self.current.set_at(index, content.trim());
        }
    }

    fn on_end_tag(&mut self, _name: &str) {
        self.pending = None;
    }

    fn on_sub_region_exit(&mut self) {
        trace!(record = self.records.len(), "Record region closed");
        self.records.push(self.current.clone());
        self.current.clear_values();
        self.pending = None;
    }

    fn finish(self) -> Self::Output {
        self.records
    }
}
