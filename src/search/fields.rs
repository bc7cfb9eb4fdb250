//! Whitelist of queryable fields

use super::config::{SearchConfig, WellKnownFields};
use super::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A field clients may filter on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "name")]
    pub logical_name: String,

    /// Analyzed text field; exact matches go to its non-analyzed sibling
    #[serde(default)]
    pub raw: bool,
}

impl FieldSpec {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            raw: false,
        }
    }

    pub fn raw(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            raw: true,
        }
    }

    /// Name to use in an exact-match clause
    pub fn exact_match_name(&self, raw_suffix: &str) -> String {
        if self.raw {
            format!("{}{}", self.logical_name, raw_suffix)
        } else {
            self.logical_name.clone()
        }
    }
}

/// Immutable registry of allowed filter fields. Built once at startup and
/// shared by reference.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldSpec>,
    raw_suffix: String,
    well_known: WellKnownFields,
}

impl FieldRegistry {
    pub fn new(
        fields: impl IntoIterator<Item = FieldSpec>,
        raw_suffix: impl Into<String>,
        well_known: WellKnownFields,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|spec| (spec.logical_name.clone(), spec))
            .collect();
        Self {
            fields,
            raw_suffix: raw_suffix.into(),
            well_known,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.fields.iter().cloned(),
            config.raw_suffix.as_str(),
            config.well_known.clone(),
        )
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Resolve a client-supplied field name to the physical name used for
    /// exact matching. Unknown names are rejected.
    pub fn exact_match_field(&self, name: &str) -> SearchResult<String> {
        self.fields
            .get(name)
            .map(|spec| spec.exact_match_name(&self.raw_suffix))
            .ok_or_else(|| SearchError::InvalidField(name.to_string()))
    }

    /// Exact-match name for a field the crate itself chose. Fields missing
    /// from the registry are used as-is.
    pub fn raw_variant(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|spec| spec.exact_match_name(&self.raw_suffix))
            .unwrap_or_else(|| name.to_string())
    }

    pub fn well_known(&self) -> &WellKnownFields {
        &self.well_known
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}
