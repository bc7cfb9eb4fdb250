//! PII masking of identity fields

use super::config::ProjectionConfig;
use serde_json::Value;
use std::collections::HashSet;

/// Keep the first `keep` characters of `value` and mask the rest.
///
/// `None` and empty input come back unchanged, as does everything when
/// masking is disabled.
pub fn mask_user_id(value: Option<&str>, enabled: bool, keep: usize) -> Option<String> {
    value.map(|v| {
        if enabled {
            mask_chars(v, keep, '*')
        } else {
            v.to_string()
        }
    })
}

fn mask_chars(value: &str, keep: usize, mask: char) -> String {
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < keep { c } else { mask })
        .collect()
}

/// Field-level masker applied after key translation
#[derive(Debug, Clone)]
pub struct PiiMasker {
    enabled: bool,
    keep: usize,
    mask_char: char,
    fields: HashSet<String>,
}

impl PiiMasker {
    pub fn new(
        enabled: bool,
        keep: usize,
        mask_char: char,
        fields: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            enabled,
            keep,
            mask_char,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(
            config.masking_enabled,
            config.mask_keep_prefix,
            config.mask_char,
            config.masked_fields.iter().cloned(),
        )
    }

    /// Masker that leaves every value untouched
    pub fn disabled() -> Self {
        Self::new(false, 0, '*', Vec::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether values under canonical key `field` get masked
    pub fn applies_to(&self, field: &str) -> bool {
        self.enabled && self.fields.contains(field)
    }

    pub fn mask_str(&self, value: &str) -> String {
        if !self.enabled {
            return value.to_string();
        }
        mask_chars(value, self.keep, self.mask_char)
    }

    /// Mask a JSON value stored under canonical key `field`.
    ///
    /// Strings and numbers are masked (numbers come back as strings); other
    /// values pass through.
    pub fn mask_value(&self, field: &str, value: Value) -> Value {
        if !self.applies_to(field) {
            return value;
        }
        match value {
            Value::String(s) => Value::String(self.mask_str(&s)),
            Value::Number(n) => Value::String(self.mask_str(&n.to_string())),
            other => other,
        }
    }
}
