//! Versioned field-key alias table

use std::collections::{HashMap, HashSet};

/// Raw-key to canonical-key mapping across schema versions.
///
/// Built once from the legacy and current schema maps; read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyAliasTable {
    aliases: HashMap<String, String>,
    current: HashSet<String>,
}

impl KeyAliasTable {
    /// Merge the two schema maps. On conflict the current schema wins.
    pub fn merge<L, C>(legacy: L, current: C) -> Self
    where
        L: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = (String, String)>,
    {
        let mut aliases: HashMap<String, String> = legacy.into_iter().collect();
        let mut current_keys = HashSet::new();
        for (raw, canonical) in current {
            current_keys.insert(raw.clone());
            aliases.insert(raw, canonical);
        }
        Self {
            aliases,
            current: current_keys,
        }
    }

    /// Aliases for the telemetry document schemas shipped so far
    pub fn telemetry_schema() -> Self {
        Self::merge(pairs(LEGACY_SCHEMA), pairs(CURRENT_SCHEMA))
    }

    /// Canonical name for `key`, or `key` itself when it has no alias
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn has_alias(&self, key: &str) -> bool {
        self.aliases.contains_key(key)
    }

    /// Whether `key` is an alias from the current schema
    pub fn is_current(&self, key: &str) -> bool {
        self.current.contains(key)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
        .collect()
}

// v1 agents sent abbreviated keys.
const LEGACY_SCHEMA: &[(&str, &str)] = &[
    ("pn", "package_name"),
    ("st", "server_type"),
    ("uid", "user_id"),
    ("sid", "session_id"),
    ("ts", "timestamp"),
    ("ct", "duration"),
    ("lc", "region_code"),
    ("msg", "message"),
    ("av", "app_version"),
    ("dm", "device_model"),
    ("nt", "network_type"),
    ("sc", "http_status"),
];

const CURRENT_SCHEMA: &[(&str, &str)] = &[
    ("packageName", "package_name"),
    ("serverType", "server_type"),
    ("userId", "user_id"),
    ("sessionId", "session_id"),
    ("costTime", "duration"),
    ("locationCode", "region_code"),
    ("errorMessage", "message"),
    ("appVersion", "app_version"),
    ("deviceModel", "device_model"),
    ("networkType", "network_type"),
    ("statusCode", "http_status"),
    ("pageName", "page_name"),
    ("errorType", "error_type"),
    ("traceId", "trace_id"),
    // v2 reuses `ct` for the client timestamp.
    ("ct", "client_time"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_overrides_legacy() {
        let table = KeyAliasTable::merge(
            vec![("ct".to_string(), "duration".to_string())],
            vec![("ct".to_string(), "client_time".to_string())],
        );
        assert_eq!(table.translate("ct"), "client_time");
    }

    #[test]
    fn test_unaliased_key_passes_through() {
        let table = KeyAliasTable::telemetry_schema();
        assert_eq!(table.translate("browser"), "browser");
        assert_eq!(table.translate("uid"), "user_id");
        assert_eq!(table.translate("userId"), "user_id");
        assert!(!table.has_alias("browser"));
    }

    #[test]
    fn test_alias_schema_origin() {
        let table = KeyAliasTable::telemetry_schema();
        assert!(table.is_current("userId"));
        assert!(table.is_current("ct"));
        assert!(!table.is_current("uid"));
        assert!(!table.is_current("browser"));
    }

    #[test]
    fn test_schema_conflict_resolved_to_current() {
        let table = KeyAliasTable::telemetry_schema();
        assert_eq!(table.translate("ct"), "client_time");
    }
}
