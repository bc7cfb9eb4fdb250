//! Per-document key translation, masking and lenient typed conversion

use super::alias::KeyAliasTable;
use super::mask::PiiMasker;
use crate::metrics::PROJECTION_FALLBACKS_TOTAL;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::type_name;
use std::sync::Arc;
use tracing::warn;

/// Document source as returned by the store
pub type RawDocument = Map<String, Value>;

/// Document after translation and masking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProjectedDoc {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Stateless projector shared across requests
#[derive(Debug, Clone)]
pub struct ResultProjector {
    aliases: Arc<KeyAliasTable>,
    masker: PiiMasker,
}

impl ResultProjector {
    pub fn new(aliases: Arc<KeyAliasTable>, masker: PiiMasker) -> Self {
        Self { aliases, masker }
    }

    pub fn aliases(&self) -> &KeyAliasTable {
        &self.aliases
    }

    pub fn masker(&self) -> &PiiMasker {
        &self.masker
    }

    /// Translate keys to canonical names, then mask identity fields.
    ///
    /// Several keys can land on one canonical name. The canonical key itself
    /// wins, then a current-schema alias, then a legacy alias.
    pub fn project(&self, raw: &RawDocument) -> ProjectedDoc {
        let mut fields = Map::new();

        for (key, value) in raw.iter().filter(|(k, _)| !self.aliases.has_alias(k)) {
            fields.insert(key.clone(), self.masker.mask_value(key, value.clone()));
        }

        let mut aliased: Vec<_> = raw
            .iter()
            .filter(|(k, _)| self.aliases.has_alias(k))
            .collect();
        aliased.sort_by_key(|(k, _)| !self.aliases.is_current(k));

        for (key, value) in aliased {
            let canonical = self.aliases.translate(key);
            if !fields.contains_key(canonical) {
                fields.insert(
                    canonical.to_string(),
                    self.masker.mask_value(canonical, value.clone()),
                );
            }
        }

        ProjectedDoc { id: None, fields }
    }

    pub fn project_hit(&self, id: &str, raw: &RawDocument) -> ProjectedDoc {
        let mut doc = self.project(raw);
        doc.id = Some(id.to_string());
        doc
    }

    /// Project and convert into a typed response model, never failing.
    pub fn project_as<T>(&self, raw: &RawDocument) -> T
    where
        T: DeserializeOwned + Default,
    {
        lenient_convert(&self.project(raw).fields)
    }
}

/// Convert `fields` into `T`, dropping fields that do not convert.
///
/// If the whole object converts, that result is returned. Otherwise fields are
/// added one at a time and kept only if the partial object still converts, so
/// the result carries every field that converted on its own. `T` should
/// default its missing fields (`#[serde(default)]`).
pub fn lenient_convert<T>(fields: &Map<String, Value>) -> T
where
    T: DeserializeOwned + Default,
{
    let err = match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(converted) => return converted,
        Err(err) => err,
    };

    PROJECTION_FALLBACKS_TOTAL
        .with_label_values(&[type_name::<T>()])
        .inc();

    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (key, value) in fields {
        let mut trial = kept.clone();
        trial.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(trial.clone())).is_ok() {
            kept = trial;
        } else {
            dropped.push(key.as_str());
        }
    }

    warn!(
        target_type = type_name::<T>(),
        error = %err,
        dropped_fields = ?dropped,
        "Falling back to partial conversion"
    );

    serde_json::from_value(Value::Object(kept)).unwrap_or_default()
}
