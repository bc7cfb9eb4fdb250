//! Filter clauses and the conjunctive bool query they compose into

use super::condition::Dimension;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Sort order for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// A single must-match constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Clause {
    /// Exact equality against a keyword (or raw) field
    Term { field: String, value: String },

    /// Inclusive numeric range; a missing bound is open
    Range {
        field: String,
        gte: Option<i64>,
        lte: Option<i64>,
        /// Bounds are UTC epoch milliseconds
        epoch_millis: bool,
    },
}

impl Clause {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, gte: Option<i64>, lte: Option<i64>) -> Self {
        Clause::Range {
            field: field.into(),
            gte,
            lte,
            epoch_millis: false,
        }
    }

    pub fn time_range(field: impl Into<String>, gte: Option<i64>, lte: Option<i64>) -> Self {
        Clause::Range {
            field: field.into(),
            gte,
            lte,
            epoch_millis: true,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Clause::Term { field, .. } | Clause::Range { field, .. } => field,
        }
    }

    /// Render in the document store's query DSL
    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Clause::Range {
                field,
                gte,
                lte,
                epoch_millis,
            } => {
                let mut bounds = Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                if *epoch_millis {
                    bounds.insert("format".to_string(), json!("epoch_millis"));
                }
                json!({ "range": { field.as_str(): Value::Object(bounds) } })
            }
        }
    }
}

/// Conjunctive, non-scoring filter query
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolQuery {
    filter: Vec<Clause>,
}

impl BoolQuery {
    pub fn filter(&self) -> &[Clause] {
        &self.filter
    }

    /// True when no clause constrains the search
    pub fn is_match_all(&self) -> bool {
        self.filter.is_empty()
    }

    pub fn to_json(&self) -> Value {
        if self.filter.is_empty() {
            return json!({ "match_all": {} });
        }
        let filter: Vec<Value> = self.filter.iter().map(Clause::to_json).collect();
        json!({ "bool": { "filter": filter } })
    }
}

/// Append-only accumulator shared by the search conditions
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    clauses: Vec<(Dimension, Clause)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dimension: Dimension, clause: Clause) {
        self.clauses.push((dimension, clause));
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().map(|(_, clause)| clause)
    }

    /// Freeze into a query. Clauses are put in canonical order so the result
    /// does not depend on the order conditions were contributed in.
    pub fn build(mut self) -> BoolQuery {
        self.clauses.sort();
        BoolQuery {
            filter: self.clauses.into_iter().map(|(_, clause)| clause).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_clause_json() {
        let clause = Clause::term("os", "android");
        assert_eq!(clause.to_json(), json!({ "term": { "os": "android" } }));
    }

    #[test]
    fn test_time_range_clause_json() {
        let clause = Clause::time_range("timestamp", Some(1_000), None);
        assert_eq!(
            clause.to_json(),
            json!({ "range": { "timestamp": { "gte": 1000, "format": "epoch_millis" } } })
        );
    }

    #[test]
    fn test_build_is_order_independent() {
        let mut a = QueryBuilder::new();
        a.push(Dimension::Geo, Clause::term("region_code", "CN-31"));
        a.push(Dimension::App, Clause::term("package_name", "com.shop"));

        let mut b = QueryBuilder::new();
        b.push(Dimension::App, Clause::term("package_name", "com.shop"));
        b.push(Dimension::Geo, Clause::term("region_code", "CN-31"));

        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn test_empty_query_is_match_all() {
        let query = QueryBuilder::new().build();
        assert!(query.is_match_all());
        assert_eq!(query.to_json(), json!({ "match_all": {} }));
    }
}
