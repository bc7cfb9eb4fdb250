//! Search condition primitives
//!
//! Each primitive covers one optional filter dimension and contributes at most
//! one clause to a [`QueryBuilder`]. Absent input (None or blank) contributes
//! nothing. The only failures are a client naming a field outside the
//! [`FieldRegistry`] and a blank application identity.

use super::error::SearchResult;
use super::fields::FieldRegistry;
use super::query::{Clause, QueryBuilder};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Filter dimension; also the canonical clause order in a composed query
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    App,
    Document,
    Time,
    Value,
    Geo,
    FieldValue,
    FreeText,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Tenant/application scope. Required on every query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct AppIdentity {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub package_name: String,

    #[validate(custom(function = "not_blank"), length(max = 64))]
    pub server_type: String,
}

impl AppIdentity {
    pub fn new(package_name: impl Into<String>, server_type: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            server_type: server_type.into(),
        }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        self.validate()?;
        let fields = registry.well_known();
        builder.push(
            Dimension::App,
            Clause::term(fields.package_name.as_str(), self.package_name.as_str()),
        );
        builder.push(
            Dimension::App,
            Clause::term(fields.server_type.as_str(), self.server_type.as_str()),
        );
        Ok(())
    }
}

/// Event time window in UTC epoch milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl TimeRange {
    pub fn new(from: Option<i64>, to: Option<i64>) -> Self {
        Self { from, to }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from.timestamp_millis()),
            to: Some(to.timestamp_millis()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn from_utc(&self) -> Option<DateTime<Utc>> {
        self.from.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.to.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        if self.is_unbounded() {
            return Ok(());
        }
        builder.push(
            Dimension::Time,
            Clause::time_range(registry.well_known().timestamp.as_str(), self.from, self.to),
        );
        Ok(())
    }
}

/// Y-axis value window.
///
/// Only a complete, non-negative pair of bounds filters anything; a single
/// bound is ignored rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl ValueRange {
    pub fn new(from: Option<i64>, to: Option<i64>) -> Self {
        Self { from, to }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from >= 0 && to >= 0 => {
                builder.push(
                    Dimension::Value,
                    Clause::range(registry.well_known().value.as_str(), Some(from), Some(to)),
                );
            }
            _ => {}
        }
        Ok(())
    }
}

/// Region filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoFilter {
    pub location_code: Option<String>,
}

impl GeoFilter {
    pub fn new(location_code: impl Into<String>) -> Self {
        Self {
            location_code: Some(location_code.into()),
        }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        if let Some(code) = non_blank(&self.location_code) {
            builder.push(
                Dimension::Geo,
                Clause::term(registry.well_known().location.as_str(), code),
            );
        }
        Ok(())
    }
}

/// Free-form `field = value` filter, restricted to whitelisted fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldValueFilter {
    pub field_name: Option<String>,
    pub field_value: Option<String>,
}

impl FieldValueFilter {
    pub fn new(field_name: impl Into<String>, field_value: impl Into<String>) -> Self {
        Self {
            field_name: Some(field_name.into()),
            field_value: Some(field_value.into()),
        }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        let Some(name) = non_blank(&self.field_name) else {
            return Ok(());
        };
        // A supplied name is checked even without a value.
        let field = registry.exact_match_field(name)?;
        let Some(value) = non_blank(&self.field_value) else {
            return Ok(());
        };
        builder.push(Dimension::FieldValue, Clause::term(field, value));
        Ok(())
    }
}

/// Exact match on the raw variant of the message field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FreeTextFilter {
    pub text: Option<String>,
}

impl FreeTextFilter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        if let Some(text) = non_blank(&self.text) {
            let field = registry.raw_variant(&registry.well_known().message);
            builder.push(Dimension::FreeText, Clause::term(field, text));
        }
        Ok(())
    }
}

/// Single-document lookup for detail views
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId {
    pub id: Option<String>,
}

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }

    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        if let Some(id) = non_blank(&self.id) {
            builder.push(
                Dimension::Document,
                Clause::term(registry.well_known().document_id.as_str(), id),
            );
        }
        Ok(())
    }
}

/// Closed set of filter primitives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchCondition {
    App(AppIdentity),
    Document(DocumentId),
    Time(TimeRange),
    Value(ValueRange),
    Geo(GeoFilter),
    FieldValue(FieldValueFilter),
    FreeText(FreeTextFilter),
}

impl SearchCondition {
    pub fn dimension(&self) -> Dimension {
        match self {
            SearchCondition::App(_) => Dimension::App,
            SearchCondition::Document(_) => Dimension::Document,
            SearchCondition::Time(_) => Dimension::Time,
            SearchCondition::Value(_) => Dimension::Value,
            SearchCondition::Geo(_) => Dimension::Geo,
            SearchCondition::FieldValue(_) => Dimension::FieldValue,
            SearchCondition::FreeText(_) => Dimension::FreeText,
        }
    }

    /// Append this condition's clause, if any, to `builder`
    pub fn contribute(&self, builder: &mut QueryBuilder, registry: &FieldRegistry) -> SearchResult<()> {
        match self {
            SearchCondition::App(c) => c.contribute(builder, registry),
            SearchCondition::Document(c) => c.contribute(builder, registry),
            SearchCondition::Time(c) => c.contribute(builder, registry),
            SearchCondition::Value(c) => c.contribute(builder, registry),
            SearchCondition::Geo(c) => c.contribute(builder, registry),
            SearchCondition::FieldValue(c) => c.contribute(builder, registry),
            SearchCondition::FreeText(c) => c.contribute(builder, registry),
        }
    }
}

impl From<AppIdentity> for SearchCondition {
    fn from(c: AppIdentity) -> Self {
        SearchCondition::App(c)
    }
}

impl From<DocumentId> for SearchCondition {
    fn from(c: DocumentId) -> Self {
        SearchCondition::Document(c)
    }
}

impl From<TimeRange> for SearchCondition {
    fn from(c: TimeRange) -> Self {
        SearchCondition::Time(c)
    }
}

impl From<ValueRange> for SearchCondition {
    fn from(c: ValueRange) -> Self {
        SearchCondition::Value(c)
    }
}

impl From<GeoFilter> for SearchCondition {
    fn from(c: GeoFilter) -> Self {
        SearchCondition::Geo(c)
    }
}

impl From<FieldValueFilter> for SearchCondition {
    fn from(c: FieldValueFilter) -> Self {
        SearchCondition::FieldValue(c)
    }
}

impl From<FreeTextFilter> for SearchCondition {
    fn from(c: FreeTextFilter) -> Self {
        SearchCondition::FreeText(c)
    }
}
