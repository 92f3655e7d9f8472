//! Extracted records and per-session results

use super::scrape_config::ExtractionMode;

/// One extracted item: every configured field name mapped to its captured text.
///
/// Keys keep the configured field order and are always all present; a field
/// that never matched holds an empty string. Records are plain values, so a
/// clone taken at emission time never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Record with every field set to the empty string
    pub fn empty<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            fields: names
                .into_iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite a known field; returns false when the record has no such field
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_at(&mut self, index: usize, value: &str) {
        if let Some((_, slot)) = self.fields.get_mut(index) {
            value.clone_into(slot);
        }
    }

    /// Empty every value, keeping the keys
    pub fn clear_values(&mut self) {
        for (_, value) in &mut self.fields {
            value.clear();
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Output of one session over one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Collected URLs in document order, duplicates kept
    Urls(Vec<String>),
    /// One record per completed sub-container, in document order
    Records(Vec<Record>),
}

impl ExtractionResult {
    pub fn empty(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::Urls => Self::Urls(Vec::new()),
            ExtractionMode::Fields => Self::Records(Vec::new()),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        match self {
            Self::Urls(_) => ExtractionMode::Urls,
            Self::Records(_) => ExtractionMode::Fields,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Urls(urls) => urls.len(),
            Self::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_urls(self) -> Option<Vec<String>> {
        match self {
            Self::Urls(urls) => Some(urls),
            Self::Records(_) => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::Records(records) => Some(records),
            Self::Urls(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_every_key() {
        let record = Record::empty(["name", "price"]);

        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["name", "price"]);
        assert!(record.values().all(str::is_empty));
    }

    #[test]
    fn set_only_touches_known_fields() {
        let mut record = Record::empty(["price"]);

        assert!(record.set("price", "9.99"));
        assert!(!record.set("colour", "red"));
        assert_eq!(record.get("price"), Some("9.99"));
        assert_eq!(record.get("colour"), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn clones_are_independent() {
        let mut record = Record::empty(["price"]);
        record.set("price", "1.00");
        let snapshot = record.clone();

        record.clear_values();
        record.set("price", "2.00");

        assert_eq!(snapshot.get("price"), Some("1.00"));
    }

    #[test]
    fn record_iterates_in_field_order() {
        let record: Record = [("zeta", "1"), ("alpha", "2")].into_iter().collect();

        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("zeta", "1"), ("alpha", "2")]);
    }

    #[test]
    fn empty_result_matches_mode() {
        assert_eq!(
            ExtractionResult::empty(ExtractionMode::Urls),
            ExtractionResult::Urls(vec![])
        );
        assert_eq!(
            ExtractionResult::empty(ExtractionMode::Fields).mode(),
            ExtractionMode::Fields
        );
        assert!(ExtractionResult::empty(ExtractionMode::Fields).is_empty());
    }
}
