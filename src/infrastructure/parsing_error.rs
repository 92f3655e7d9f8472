//! Error types for turning raw configuration sections into scrape configs
//!
//! These errors never reach the session runner: the configuration provider
//! logs them and treats the section as absent.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeConfigError {
    #[error("Section '{section}' is missing required key '{key}'")]
    MissingKey { section: String, key: String },

    #[error("Section '{section}' sets '{name_key}' but not '{value_key}'")]
    AttrWithoutValue {
        section: String,
        name_key: String,
        value_key: String,
    },

    #[error("Section '{section}' has has_sub_container set but no sub_container_tag_name")]
    MissingSubContainerTag { section: String },

    #[error("Section '{section}' defines neither tag_name_to_search nor product_information")]
    NoTarget { section: String },

    #[error("Section '{section}' has an empty product_information mapping")]
    NoFields { section: String },

    #[error("Section '{section}' defines field '{field}' more than once")]
    DuplicateField { section: String, field: String },
}

impl ScrapeConfigError {
    pub fn missing_key(section: &str, key: &str) -> Self {
        Self::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn attr_without_value(section: &str, name_key: &str, value_key: &str) -> Self {
        Self::AttrWithoutValue {
            section: section.to_string(),
            name_key: name_key.to_string(),
            value_key: value_key.to_string(),
        }
    }

    /// Section the error was raised for
    pub fn section(&self) -> &str {
        match self {
            Self::MissingKey { section, .. }
            | Self::AttrWithoutValue { section, .. }
            | Self::MissingSubContainerTag { section }
            | Self::NoTarget { section }
            | Self::NoFields { section }
            | Self::DuplicateField { section, .. } => section,
        }
    }
}
