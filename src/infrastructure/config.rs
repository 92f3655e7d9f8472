//! Configuration infrastructure
//!
//! Loads the YAML configuration file through the `config` crate, layered with
//! `LISTING_SCRAPER_*` environment variables, and exposes it as scalars,
//! optional scalars and scrape sections.
//!
//! The `config` crate lowercases map keys, so scrape sections are read from the
//! file's own YAML document instead: field names are record keys and CSV
//! headers and must stay exactly as written.
//!
//! Scrape sections are converted into validated [`ScrapeConfig`] values. A
//! section that is missing or invalid is reported with `warn!` and treated as
//! absent, so the extraction core simply produces nothing for it.

#![allow(clippy::uninlined_format_args)]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    AttrRequirement, FieldSpecs, RegionLayout, RegionMatcher, ScrapeConfig, UrlSpec,
};
use crate::infrastructure::parsing_error::ScrapeConfigError;
use crate::infrastructure::simple_http_client::HttpClientConfig;

/// Configuration keys
pub mod keys {
    pub const MAIN_URL_COLLECTION_NEEDED: &str = "main_url_collection_needed";
    pub const MAIN_SOURCE_URL: &str = "main_source_url";
    pub const MAIN_URLS_TO_SCRAP: &str = "main_urls_to_scrap";
    pub const PRODUCT_SUB_URL_COLL_NEEDED: &str = "product_sub_url_coll_needed";
    pub const SUB_SOURCE_URL_BEGINNING: &str = "sub_source_url_beginning";
    pub const PRODUCT_SUB_URLS_TO_SCRAP: &str = "product_sub_urls_to_scrap";
    pub const PRODUCT_SCRAPING: &str = "product_scraping";

    pub const CONTAINER_TAG_ATTR_NAME: &str = "container_tag_attr_name";
    pub const CONTAINER_TAG_ATTR_VALUE: &str = "container_tag_attr_value";
    pub const SUB_CONTAINER_TAG_ATTR_NAME: &str = "sub_container_tag_attr_name";
    pub const SUB_CONTAINER_TAG_ATTR_VALUE: &str = "sub_container_tag_attr_value";
    pub const TAG_ATTR_TO_SEARCH: &str = "tag_attr_to_search";
    pub const TAG_FILTER_ATTR_NAME: &str = "tag_filter_attr_name";
    pub const TAG_FILTER_ATTR_VALUE: &str = "tag_filter_attr_value";

    pub const OUTPUT: &str = "output";
    pub const HTTP: &str = "http";
    pub const LOGGING: &str = "logging";
}

/// Default locations and values
pub mod defaults {
    pub const CONFIG_PATH: &str = "config/config.yml";
    pub const APP_DIR_NAME: &str = "listing-scraper";
    pub const CONFIG_FILE_NAME: &str = "config.yml";
    pub const ENV_PREFIX: &str = "LISTING_SCRAPER";
    pub const ENV_SEPARATOR: &str = "__";

    pub const RESULT_FILE: &str = "files/result.csv";
    pub const REPORT_FILE_MAIN: &str = "files/main_categ_dist_report.svg";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_DIR: &str = "logs";
    pub const LOG_FILE_NAME: &str = "listing-scraper.log";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No configuration file found (searched {searched:?})")]
    NotFound { searched: Vec<PathBuf> },
}

/// Which pages to visit, read from the top-level keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlPlan {
    pub main_url_collection_needed: bool,
    pub main_source_url: String,
    pub product_sub_url_coll_needed: bool,
    /// Prefix joined with every collected main and sub URL
    pub sub_source_url_beginning: String,
}

impl Default for CrawlPlan {
    fn default() -> Self {
        Self {
            main_url_collection_needed: true,
            main_source_url: String::new(),
            product_sub_url_coll_needed: true,
            sub_source_url_beginning: String::new(),
        }
    }
}

/// Where results and reports are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub result_file: PathBuf,
    pub report_file_main: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_file: PathBuf::from(defaults::RESULT_FILE),
            report_file_main: PathBuf::from(defaults::REPORT_FILE_MAIN),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files, relative to the working directory
    pub log_dir: PathBuf,

    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

/// Everything outside the scrape sections
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub crawl: CrawlPlan,
    pub output: OutputConfig,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
}

/// A scrape section exactly as written in the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScrapeSection {
    pub container_tag_name: Option<String>,
    pub container_tag_attr_name: Option<String>,
    pub container_tag_attr_value: Option<String>,
    #[serde(default)]
    pub has_sub_container: bool,
    pub sub_container_tag_name: Option<String>,
    pub sub_container_tag_attr_name: Option<String>,
    pub sub_container_tag_attr_value: Option<String>,
    pub tag_name_to_search: Option<String>,
    pub tag_attr_to_search: Option<String>,
    pub tag_attr_value_pattern: Option<String>,
    pub tag_filter_attr_name: Option<String>,
    pub tag_filter_attr_value: Option<String>,
    pub product_information: Option<FieldSpecs>,
}

impl RawScrapeSection {
    /// Validate the section; `product_information` selects field mode
    pub fn into_scrape_config(self, section: &str) -> Result<ScrapeConfig, ScrapeConfigError> {
        let container_tag = self
            .container_tag_name
            .ok_or_else(|| ScrapeConfigError::missing_key(section, "container_tag_name"))?;
        let container = region_matcher(
            section,
            container_tag,
            self.container_tag_attr_name,
            self.container_tag_attr_value,
            (keys::CONTAINER_TAG_ATTR_NAME, keys::CONTAINER_TAG_ATTR_VALUE),
        )?;

        let mut layout = RegionLayout::new(container);
        if self.has_sub_container {
            let sub_tag = self
                .sub_container_tag_name
                .ok_or_else(|| ScrapeConfigError::MissingSubContainerTag {
                    section: section.to_string(),
                })?;
            layout = layout.with_sub_container(region_matcher(
                section,
                sub_tag,
                self.sub_container_tag_attr_name,
                self.sub_container_tag_attr_value,
                (keys::SUB_CONTAINER_TAG_ATTR_NAME, keys::SUB_CONTAINER_TAG_ATTR_VALUE),
            )?);
        }

        if let Some(fields) = self.product_information {
            if fields.is_empty() {
                return Err(ScrapeConfigError::NoFields {
                    section: section.to_string(),
                });
            }
            if let Some(field) = fields.duplicate_name() {
                return Err(ScrapeConfigError::DuplicateField {
                    section: section.to_string(),
                    field: field.to_string(),
                });
            }
            return Ok(ScrapeConfig::fields(layout, fields));
        }

        let search_tag = self.tag_name_to_search.ok_or_else(|| ScrapeConfigError::NoTarget {
            section: section.to_string(),
        })?;
        let source_attr = self
            .tag_attr_to_search
            .ok_or_else(|| ScrapeConfigError::missing_key(section, keys::TAG_ATTR_TO_SEARCH))?;

        let mut spec = UrlSpec::new(search_tag, source_attr);
        spec.filter = attr_requirement(
            section,
            self.tag_filter_attr_name,
            self.tag_filter_attr_value,
            (keys::TAG_FILTER_ATTR_NAME, keys::TAG_FILTER_ATTR_VALUE),
        )?;
        spec.value_pattern = self.tag_attr_value_pattern;

        Ok(ScrapeConfig::urls(layout, spec))
    }
}

// A value without a name is ignored; a name without a value is an error.
fn attr_requirement(
    section: &str,
    name: Option<String>,
    value: Option<String>,
    (name_key, value_key): (&str, &str),
) -> Result<Option<AttrRequirement>, ScrapeConfigError> {
    match (name, value) {
        (Some(name), Some(value)) => Ok(Some(AttrRequirement::new(name, value))),
        (Some(_), None) => Err(ScrapeConfigError::attr_without_value(section, name_key, value_key)),
        (None, _) => Ok(None),
    }
}

fn region_matcher(
    section: &str,
    tag_name: String,
    attr_name: Option<String>,
    attr_value: Option<String>,
    keys: (&str, &str),
) -> Result<RegionMatcher, ScrapeConfigError> {
    Ok(RegionMatcher {
        tag_name,
        required_attr: attr_requirement(section, attr_name, attr_value, keys)?,
    })
}

/// Read-only view over the loaded configuration
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    settings: config::Config,
    /// The YAML document with key case preserved, for scrape sections
    document: serde_yaml::Value,
    source: Option<PathBuf>,
}

impl ConfigProvider {
    /// Load a YAML file, layered with `LISTING_SCRAPER_*` environment variables
    ///
    /// The environment layer applies to scalars and settings; scrape sections
    /// are taken from the file only.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(&yaml, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(defaults::ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        info!("Loaded configuration from {}", path.display());
        Ok(Self {
            settings,
            document: serde_yaml::from_str(&yaml)?,
            source: Some(path.to_path_buf()),
        })
    }

    /// Load configuration from YAML text; the environment is not consulted
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?;

        Ok(Self {
            settings,
            document: serde_yaml::from_str(yaml)?,
            source: None,
        })
    }

    /// Use `explicit` if given, otherwise the first existing default location
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let searched = Self::default_locations();
        match searched.iter().find(|candidate| candidate.is_file()) {
            Some(path) => Self::from_file(path),
            None => Err(ConfigError::NotFound { searched }),
        }
    }

    /// `config/config.yml`, then the per-user config directory
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(defaults::CONFIG_PATH)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join(defaults::APP_DIR_NAME).join(defaults::CONFIG_FILE_NAME));
        }
        locations
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Required value; a missing key is an error
    pub fn scalar<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        Ok(self.settings.get::<T>(key)?)
    }

    /// Missing keys and explicit nulls both read as `None`
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.settings.get::<Option<T>>(key) {
            Ok(value) => Ok(value),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Raw scrape section under top-level `key`; missing and null read as `None`
    pub fn section(&self, key: &str) -> Result<Option<RawScrapeSection>, ConfigError> {
        match self.document.get(key) {
            Some(value) => Ok(serde_yaml::from_value(value.clone())?),
            None => Ok(None),
        }
    }

    /// Validated scrape configuration, or `None` when the section is missing
    /// or unusable
    pub fn scrape_config(&self, key: &str) -> Option<ScrapeConfig> {
        let section = match self.section(key) {
            Ok(Some(section)) => section,
            Ok(None) => {
                warn!("Scrape section '{}' is not configured", key);
                return None;
            }
            Err(e) => {
                warn!("Scrape section '{}' could not be read: {}", key, e);
                return None;
            }
        };

        match section.into_scrape_config(key) {
            Ok(config) => {
                debug!("Scrape section '{}' loaded in {:?} mode", key, config.mode());
                Some(config)
            }
            Err(e) => {
                warn!(section = e.section(), "Ignoring scrape section: {}", e);
                None
            }
        }
    }

    /// Crawl plan, output, HTTP and logging settings with defaults filled in
    pub fn app_settings(&self) -> Result<AppSettings, ConfigError> {
        let crawl = self.settings.clone().try_deserialize::<CrawlPlan>()?;

        Ok(AppSettings {
            crawl,
            output: self.optional(keys::OUTPUT)?.unwrap_or_default(),
            http: self.optional(keys::HTTP)?.unwrap_or_default(),
            logging: self.optional(keys::LOGGING)?.unwrap_or_default(),
        })
    }
}
