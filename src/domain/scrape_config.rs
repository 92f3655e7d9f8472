//! Declarative description of the regions of a page and the values to pull out of them.
//!
//! A scrape configuration names a container tag (and optionally a sub-container
//! tag nested inside it) plus either a URL target or an ordered set of field
//! specs. Matching is always done on exact tag names and on trimmed attribute
//! values.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// An attribute a tag must carry, compared against the trimmed attribute value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttrRequirement {
    pub name: String,
    pub value: String,
}

impl AttrRequirement {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// True when some attribute called `name` has a trimmed value equal to `value`
    pub fn is_met_by(&self, attrs: &[(&str, &str)]) -> bool {
        attrs
            .iter()
            .any(|(name, value)| *name == self.name && value.trim() == self.value)
    }
}

/// Matcher for a container or sub-container start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatcher {
    pub tag_name: String,
    /// `None` accepts every tag with the right name
    pub required_attr: Option<AttrRequirement>,
}

impl RegionMatcher {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            required_attr: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_attr = Some(AttrRequirement::new(name, value));
        self
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.tag_name == name
    }

    /// Attribute half of the match; the tag name is checked separately
    pub fn accepts(&self, attrs: &[(&str, &str)]) -> bool {
        self.required_attr
            .as_ref()
            .is_none_or(|requirement| requirement.is_met_by(attrs))
    }

    pub fn matches(&self, name: &str, attrs: &[(&str, &str)]) -> bool {
        self.matches_name(name) && self.accepts(attrs)
    }
}

/// Container plus the optional sub-container nested inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLayout {
    pub container: RegionMatcher,
    pub sub_container: Option<RegionMatcher>,
}

impl RegionLayout {
    pub fn new(container: RegionMatcher) -> Self {
        Self {
            container,
            sub_container: None,
        }
    }

    pub fn with_sub_container(mut self, sub_container: RegionMatcher) -> Self {
        self.sub_container = Some(sub_container);
        self
    }

    pub fn has_sub_container(&self) -> bool {
        self.sub_container.is_some()
    }
}

/// Which hyperlinks to collect inside the innermost region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSpec {
    pub search_tag: String,
    pub filter: Option<AttrRequirement>,
    /// Attribute holding the URL, usually `href`
    pub source_attr: String,
    /// Substring the trimmed value must contain; `None` keeps every value
    pub value_pattern: Option<String>,
}

impl UrlSpec {
    pub fn new(search_tag: impl Into<String>, source_attr: impl Into<String>) -> Self {
        Self {
            search_tag: search_tag.into(),
            filter: None,
            source_attr: source_attr.into(),
            value_pattern: None,
        }
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(AttrRequirement::new(name, value));
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.value_pattern = Some(pattern.into());
        self
    }
}

/// Tag/attribute pattern whose following text supplies one record field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    pub tag_name: String,
    pub attr_name: String,
    pub attr_value: String,
}

impl FieldSpec {
    pub fn new(
        tag_name: impl Into<String>,
        attr_name: impl Into<String>,
        attr_value: impl Into<String>,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            attr_name: attr_name.into(),
            attr_value: attr_value.into(),
        }
    }

    pub fn matches(&self, name: &str, attrs: &[(&str, &str)]) -> bool {
        self.tag_name == name
            && attrs
                .iter()
                .any(|(attr, value)| *attr == self.attr_name && value.trim() == self.attr_value)
    }
}

/// Field specs in configured order. The order decides which spec wins when a
/// tag matches several, and the key order of every emitted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpecs(Vec<(String, FieldSpec)>);

impl FieldSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.0.push((name.into(), spec));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.0.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Index of the first spec matching the tag, in configured order
    pub fn first_match(&self, name: &str, attrs: &[(&str, &str)]) -> Option<usize> {
        self.0.iter().position(|(_, spec)| spec.matches(name, attrs))
    }

    /// First field name that appears more than once
    pub fn duplicate_name(&self) -> Option<&str> {
        self.0.iter().enumerate().find_map(|(i, (name, _))| {
            self.0[..i]
                .iter()
                .any(|(earlier, _)| earlier == name)
                .then_some(name.as_str())
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, FieldSpec)> for FieldSpecs {
    fn from_iter<T: IntoIterator<Item = (N, FieldSpec)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, spec)| (name.into(), spec)).collect())
    }
}

// Deserialized from a mapping so the file order of the keys is kept.
impl<'de> Deserialize<'de> for FieldSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldSpecsVisitor;

        impl<'de> Visitor<'de> for FieldSpecsVisitor {
            type Value = FieldSpecs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of field name to {tag_name, attr_name, attr_value}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, spec)) = map.next_entry::<String, FieldSpec>()? {
                    fields.push((name, spec));
                }
                Ok(FieldSpecs(fields))
            }
        }

        deserializer.deserialize_map(FieldSpecsVisitor)
    }
}

/// What a session produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Urls,
    Fields,
}

/// Mode-specific payload of a scrape configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeTarget {
    Urls(UrlSpec),
    Fields(FieldSpecs),
}

impl ScrapeTarget {
    pub fn mode(&self) -> ExtractionMode {
        match self {
            Self::Urls(_) => ExtractionMode::Urls,
            Self::Fields(_) => ExtractionMode::Fields,
        }
    }
}

/// Complete, validated configuration for one kind of page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub layout: RegionLayout,
    pub target: ScrapeTarget,
}

impl ScrapeConfig {
    pub fn urls(layout: RegionLayout, spec: UrlSpec) -> Self {
        Self {
            layout,
            target: ScrapeTarget::Urls(spec),
        }
    }

    pub fn fields(layout: RegionLayout, specs: FieldSpecs) -> Self {
        Self {
            layout,
            target: ScrapeTarget::Fields(specs),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.target.mode()
    }
}
