//! Result projection configuration

use serde::{Deserialize, Serialize};

/// Masking settings consumed by the projector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Mask identity fields before results leave the service
    #[serde(default = "default_true")]
    pub masking_enabled: bool,

    /// Leading characters left visible
    #[serde(default = "default_mask_keep_prefix")]
    pub mask_keep_prefix: usize,

    #[serde(default = "default_mask_char")]
    pub mask_char: char,

    /// Canonical keys whose values are masked
    #[serde(default = "default_masked_fields")]
    pub masked_fields: Vec<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            masking_enabled: default_true(),
            mask_keep_prefix: default_mask_keep_prefix(),
            mask_char: default_mask_char(),
            masked_fields: default_masked_fields(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mask_keep_prefix() -> usize {
    2
}

fn default_mask_char() -> char {
    '*'
}

fn default_masked_fields() -> Vec<String> {
    vec!["user_id".to_string()]
}
