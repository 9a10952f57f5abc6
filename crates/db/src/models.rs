//! Row structs that map 1-to-1 onto the `tgapp` tables.
//!
//! These are *persistence* models — they carry no domain behaviour.  Three
//! shapes exist per table: the full row (`…Row`), the writable fields for an
//! insert (`New…`, carrying the schema defaults), and a partial update
//! (`…Update`, one `Option` per settable column).
//!
//! Callers holding a loose JSON mapping (the UI posts one) go through
//! `from_map`, which enumerates the settable columns explicitly: unknown
//! keys are logged and skipped, known keys with values of the wrong type are
//! an error, and explicit `null` counts as "not provided".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::DbError;

fn parse_field<T: DeserializeOwned>(field: &str, value: Value) -> Result<Option<T>, DbError> {
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| DbError::InvalidFieldValue {
            field: field.to_string(),
            source,
        })
}

// ---------------------------------------------------------------------------
// connections
// ---------------------------------------------------------------------------

/// A persisted connection profile row.
///
/// `connection_id` is the database-assigned identity primary key; `id` is a
/// secondary informational UUID.  The three binary columns hold opaque
/// ciphertext owned by the crypto layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub project_code: Option<String>,
    pub connection_id: i64,
    pub sql_flavor: Option<String>,
    pub project_host: Option<String>,
    pub project_port: Option<String>,
    pub project_user: Option<String>,
    pub project_db: Option<String>,
    pub connection_name: Option<String>,
    pub connection_description: Option<String>,
    pub project_pw_encrypted: Option<Vec<u8>>,
    pub max_threads: i32,
    pub max_query_chars: Option<i32>,
    pub url: String,
    pub connect_by_url: bool,
    pub connect_by_key: bool,
    pub private_key: Option<Vec<u8>>,
    pub private_key_passphrase: Option<Vec<u8>>,
    pub http_path: Option<String>,
}

/// Writable fields for inserting a connection.  `Default` carries the schema
/// defaults, so omitted fields behave exactly like an insert that skips the
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConnection {
    pub project_code: Option<String>,
    pub sql_flavor: Option<String>,
    pub project_host: Option<String>,
    pub project_port: Option<String>,
    pub project_user: Option<String>,
    pub project_db: Option<String>,
    pub connection_name: Option<String>,
    pub connection_description: Option<String>,
    pub project_pw_encrypted: Option<Vec<u8>>,
    pub max_threads: i32,
    pub max_query_chars: Option<i32>,
    pub url: String,
    pub connect_by_url: bool,
    pub connect_by_key: bool,
    pub private_key: Option<Vec<u8>>,
    pub private_key_passphrase: Option<Vec<u8>>,
    pub http_path: Option<String>,
}

impl Default for NewConnection {
    fn default() -> Self {
        Self {
            project_code: None,
            sql_flavor: None,
            project_host: None,
            project_port: None,
            project_user: None,
            project_db: None,
            connection_name: None,
            connection_description: None,
            project_pw_encrypted: None,
            max_threads: 4,
            max_query_chars: None,
            url: String::new(),
            connect_by_url: false,
            connect_by_key: false,
            private_key: None,
            private_key_passphrase: None,
            http_path: None,
        }
    }
}

impl NewConnection {
    /// Build an insert from a loose field mapping, applying the schema
    /// defaults for anything the mapping omits.
    pub fn from_map(fields: serde_json::Map<String, Value>) -> Result<Self, DbError> {
        Ok(ConnectionUpdate::from_map(fields)?.apply_to(Self::default()))
    }
}

/// Partial update for a connection: one `Option` per settable column.
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    pub project_code: Option<String>,
    pub sql_flavor: Option<String>,
    pub project_host: Option<String>,
    pub project_port: Option<String>,
    pub project_user: Option<String>,
    pub project_db: Option<String>,
    pub connection_name: Option<String>,
    pub connection_description: Option<String>,
    pub project_pw_encrypted: Option<Vec<u8>>,
    pub max_threads: Option<i32>,
    pub max_query_chars: Option<i32>,
    pub url: Option<String>,
    pub connect_by_url: Option<bool>,
    pub connect_by_key: Option<bool>,
    pub private_key: Option<Vec<u8>>,
    pub private_key_passphrase: Option<Vec<u8>>,
    pub http_path: Option<String>,
}

impl ConnectionUpdate {
    /// Build a partial update from a loose field mapping.
    ///
    /// Keys that are not settable connection columns are logged at `warn`
    /// and skipped; the rest of the mapping still applies.
    pub fn from_map(fields: serde_json::Map<String, Value>) -> Result<Self, DbError> {
        let mut update = Self::default();
        for (key, value) in fields {
            if value.is_null() {
                debug!("null value for connection field '{key}' treated as not provided");
                continue;
            }
            match key.as_str() {
                "project_code" => update.project_code = parse_field(&key, value)?,
                "sql_flavor" => update.sql_flavor = parse_field(&key, value)?,
                "project_host" => update.project_host = parse_field(&key, value)?,
                "project_port" => update.project_port = parse_field(&key, value)?,
                "project_user" => update.project_user = parse_field(&key, value)?,
                "project_db" => update.project_db = parse_field(&key, value)?,
                "connection_name" => update.connection_name = parse_field(&key, value)?,
                "connection_description" => {
                    update.connection_description = parse_field(&key, value)?
                }
                "project_pw_encrypted" => update.project_pw_encrypted = parse_field(&key, value)?,
                "max_threads" => update.max_threads = parse_field(&key, value)?,
                "max_query_chars" => update.max_query_chars = parse_field(&key, value)?,
                "url" => update.url = parse_field(&key, value)?,
                "connect_by_url" => update.connect_by_url = parse_field(&key, value)?,
                "connect_by_key" => update.connect_by_key = parse_field(&key, value)?,
                "private_key" => update.private_key = parse_field(&key, value)?,
                "private_key_passphrase" => {
                    update.private_key_passphrase = parse_field(&key, value)?
                }
                "http_path" => update.http_path = parse_field(&key, value)?,
                other => warn!("ignoring unknown connection field '{other}'"),
            }
        }
        Ok(update)
    }

    fn apply_to(self, mut base: NewConnection) -> NewConnection {
        base.project_code = self.project_code.or(base.project_code);
        base.sql_flavor = self.sql_flavor.or(base.sql_flavor);
        base.project_host = self.project_host.or(base.project_host);
        base.project_port = self.project_port.or(base.project_port);
        base.project_user = self.project_user.or(base.project_user);
        base.project_db = self.project_db.or(base.project_db);
        base.connection_name = self.connection_name.or(base.connection_name);
        base.connection_description = self.connection_description.or(base.connection_description);
        base.project_pw_encrypted = self.project_pw_encrypted.or(base.project_pw_encrypted);
        if let Some(max_threads) = self.max_threads {
            base.max_threads = max_threads;
        }
        base.max_query_chars = self.max_query_chars.or(base.max_query_chars);
        if let Some(url) = self.url {
            base.url = url;
        }
        if let Some(connect_by_url) = self.connect_by_url {
            base.connect_by_url = connect_by_url;
        }
        if let Some(connect_by_key) = self.connect_by_key {
            base.connect_by_key = connect_by_key;
        }
        base.private_key = self.private_key.or(base.private_key);
        base.private_key_passphrase = self
            .private_key_passphrase
            .or(base.private_key_passphrase);
        base.http_path = self.http_path.or(base.http_path);
        base
    }
}

// ---------------------------------------------------------------------------
// table_groups
// ---------------------------------------------------------------------------

/// A persisted table group row.
///
/// The scope masks are free-text patterns interpreted by the profiler; the
/// last-run id and the two dq scores are written back by the test runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TableGroupRow {
    pub id: Uuid,
    pub project_code: Option<String>,
    pub connection_id: Option<i64>,
    pub table_groups_name: String,
    pub table_group_schema: Option<String>,
    pub profiling_table_set: Option<String>,
    pub profiling_include_mask: Option<String>,
    pub profiling_exclude_mask: Option<String>,
    pub profile_id_column_mask: String,
    pub profile_sk_column_mask: String,
    pub profile_use_sampling: String,
    pub profile_sample_percent: String,
    pub profile_sample_min_count: i64,
    pub profiling_delay_days: String,
    pub profile_flag_cdes: bool,
    pub profile_do_pair_rules: String,
    pub profile_pair_rule_pct: i32,
    pub description: Option<String>,
    pub data_source: Option<String>,
    pub source_system: Option<String>,
    pub source_process: Option<String>,
    pub data_location: Option<String>,
    pub business_domain: Option<String>,
    pub stakeholder_group: Option<String>,
    pub transform_level: Option<String>,
    pub data_product: Option<String>,
    pub last_complete_profile_run_id: Option<Uuid>,
    pub dq_score_profiling: Option<f64>,
    pub dq_score_testing: Option<f64>,
}

/// Writable fields for inserting a table group.  `Default` carries the
/// profiling configuration defaults from the schema; only the name has no
/// default and must be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTableGroup {
    pub project_code: Option<String>,
    pub connection_id: Option<i64>,
    pub table_groups_name: String,
    pub table_group_schema: Option<String>,
    pub profiling_table_set: Option<String>,
    pub profiling_include_mask: Option<String>,
    pub profiling_exclude_mask: Option<String>,
    pub profile_id_column_mask: String,
    pub profile_sk_column_mask: String,
    pub profile_use_sampling: String,
    pub profile_sample_percent: String,
    pub profile_sample_min_count: i64,
    pub profiling_delay_days: String,
    pub profile_flag_cdes: bool,
    pub profile_do_pair_rules: String,
    pub profile_pair_rule_pct: i32,
    pub description: Option<String>,
    pub data_source: Option<String>,
    pub source_system: Option<String>,
    pub source_process: Option<String>,
    pub data_location: Option<String>,
    pub business_domain: Option<String>,
    pub stakeholder_group: Option<String>,
    pub transform_level: Option<String>,
    pub data_product: Option<String>,
}

impl Default for NewTableGroup {
    fn default() -> Self {
        Self {
            project_code: None,
            connection_id: None,
            table_groups_name: String::new(),
            table_group_schema: None,
            profiling_table_set: None,
            profiling_include_mask: None,
            profiling_exclude_mask: None,
            profile_id_column_mask: "%id".to_string(),
            profile_sk_column_mask: "%_sk".to_string(),
            profile_use_sampling: "N".to_string(),
            profile_sample_percent: "30".to_string(),
            profile_sample_min_count: 100_000,
            profiling_delay_days: "0".to_string(),
            profile_flag_cdes: true,
            profile_do_pair_rules: "N".to_string(),
            profile_pair_rule_pct: 95,
            description: None,
            data_source: None,
            source_system: None,
            source_process: None,
            data_location: None,
            business_domain: None,
            stakeholder_group: None,
            transform_level: None,
            data_product: None,
        }
    }
}

/// Partial update for a table group.  Unlike [`NewTableGroup`] this also
/// covers the result columns (last completed run, dq scores) so the test
/// runner can write them back through the same path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableGroupUpdate {
    pub project_code: Option<String>,
    pub connection_id: Option<i64>,
    pub table_groups_name: Option<String>,
    pub table_group_schema: Option<String>,
    pub profiling_table_set: Option<String>,
    pub profiling_include_mask: Option<String>,
    pub profiling_exclude_mask: Option<String>,
    pub profile_id_column_mask: Option<String>,
    pub profile_sk_column_mask: Option<String>,
    pub profile_use_sampling: Option<String>,
    pub profile_sample_percent: Option<String>,
    pub profile_sample_min_count: Option<i64>,
    pub profiling_delay_days: Option<String>,
    pub profile_flag_cdes: Option<bool>,
    pub profile_do_pair_rules: Option<String>,
    pub profile_pair_rule_pct: Option<i32>,
    pub description: Option<String>,
    pub data_source: Option<String>,
    pub source_system: Option<String>,
    pub source_process: Option<String>,
    pub data_location: Option<String>,
    pub business_domain: Option<String>,
    pub stakeholder_group: Option<String>,
    pub transform_level: Option<String>,
    pub data_product: Option<String>,
    pub last_complete_profile_run_id: Option<Uuid>,
    pub dq_score_profiling: Option<f64>,
    pub dq_score_testing: Option<f64>,
}

impl TableGroupUpdate {
    /// Build a partial update from a loose field mapping, with the same
    /// unknown-key contract as [`ConnectionUpdate::from_map`].
    pub fn from_map(fields: serde_json::Map<String, Value>) -> Result<Self, DbError> {
        let mut update = Self::default();
        for (key, value) in fields {
            if value.is_null() {
                debug!("null value for table group field '{key}' treated as not provided");
                continue;
            }
            match key.as_str() {
                "project_code" => update.project_code = parse_field(&key, value)?,
                "connection_id" => update.connection_id = parse_field(&key, value)?,
                "table_groups_name" => update.table_groups_name = parse_field(&key, value)?,
                "table_group_schema" => update.table_group_schema = parse_field(&key, value)?,
                "profiling_table_set" => update.profiling_table_set = parse_field(&key, value)?,
                "profiling_include_mask" => {
                    update.profiling_include_mask = parse_field(&key, value)?
                }
                "profiling_exclude_mask" => {
                    update.profiling_exclude_mask = parse_field(&key, value)?
                }
                "profile_id_column_mask" => {
                    update.profile_id_column_mask = parse_field(&key, value)?
                }
                "profile_sk_column_mask" => {
                    update.profile_sk_column_mask = parse_field(&key, value)?
                }
                "profile_use_sampling" => update.profile_use_sampling = parse_field(&key, value)?,
                "profile_sample_percent" => {
                    update.profile_sample_percent = parse_field(&key, value)?
                }
                "profile_sample_min_count" => {
                    update.profile_sample_min_count = parse_field(&key, value)?
                }
                "profiling_delay_days" => update.profiling_delay_days = parse_field(&key, value)?,
                "profile_flag_cdes" => update.profile_flag_cdes = parse_field(&key, value)?,
                "profile_do_pair_rules" => {
                    update.profile_do_pair_rules = parse_field(&key, value)?
                }
                "profile_pair_rule_pct" => {
                    update.profile_pair_rule_pct = parse_field(&key, value)?
                }
                "description" => update.description = parse_field(&key, value)?,
                "data_source" => update.data_source = parse_field(&key, value)?,
                "source_system" => update.source_system = parse_field(&key, value)?,
                "source_process" => update.source_process = parse_field(&key, value)?,
                "data_location" => update.data_location = parse_field(&key, value)?,
                "business_domain" => update.business_domain = parse_field(&key, value)?,
                "stakeholder_group" => update.stakeholder_group = parse_field(&key, value)?,
                "transform_level" => update.transform_level = parse_field(&key, value)?,
                "data_product" => update.data_product = parse_field(&key, value)?,
                "last_complete_profile_run_id" => {
                    update.last_complete_profile_run_id = parse_field(&key, value)?
                }
                "dq_score_profiling" => update.dq_score_profiling = parse_field(&key, value)?,
                "dq_score_testing" => update.dq_score_testing = parse_field(&key, value)?,
                other => warn!("ignoring unknown table group field '{other}'"),
            }
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    #[test]
    fn new_connection_defaults_match_schema() {
        let new = NewConnection::default();
        assert_eq!(new.max_threads, 4);
        assert_eq!(new.url, "");
        assert!(!new.connect_by_url);
        assert!(!new.connect_by_key);
        assert_eq!(new.connection_name, None);
    }

    #[test]
    fn new_table_group_defaults_match_schema() {
        let new = NewTableGroup::default();
        assert_eq!(new.profile_id_column_mask, "%id");
        assert_eq!(new.profile_sk_column_mask, "%_sk");
        assert_eq!(new.profile_use_sampling, "N");
        assert_eq!(new.profile_sample_percent, "30");
        assert_eq!(new.profile_sample_min_count, 100_000);
        assert_eq!(new.profiling_delay_days, "0");
        assert!(new.profile_flag_cdes);
        assert_eq!(new.profile_do_pair_rules, "N");
        assert_eq!(new.profile_pair_rule_pct, 95);
    }

    #[test]
    fn connection_update_from_map_parses_known_fields() {
        let update = ConnectionUpdate::from_map(map(json!({
            "connection_name": "warehouse",
            "max_threads": 8,
            "connect_by_url": true,
        })))
        .unwrap();

        assert_eq!(update.connection_name.as_deref(), Some("warehouse"));
        assert_eq!(update.max_threads, Some(8));
        assert_eq!(update.connect_by_url, Some(true));
        assert_eq!(update.project_host, None);
    }

    #[test]
    fn connection_update_from_map_skips_unknown_fields() {
        let update = ConnectionUpdate::from_map(map(json!({
            "connection_name": "warehouse",
            "nonexistent_field": "Y",
        })))
        .unwrap();

        assert_eq!(update.connection_name.as_deref(), Some("warehouse"));
        // The rest of the struct is untouched.
        assert_eq!(
            ConnectionUpdate {
                connection_name: update.connection_name.clone(),
                ..ConnectionUpdate::default()
            },
            update
        );
    }

    #[test]
    fn connection_update_from_map_rejects_mistyped_value() {
        let err = ConnectionUpdate::from_map(map(json!({ "max_threads": "eight" }))).unwrap_err();
        match err {
            DbError::InvalidFieldValue { field, .. } => assert_eq!(field, "max_threads"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn connection_update_from_map_treats_null_as_absent() {
        let update = ConnectionUpdate::from_map(map(json!({
            "connection_name": null,
            "max_threads": 2,
        })))
        .unwrap();

        assert_eq!(update.connection_name, None);
        assert_eq!(update.max_threads, Some(2));
    }

    #[test]
    fn new_connection_from_map_keeps_defaults_for_omitted_fields() {
        let new = NewConnection::from_map(map(json!({
            "project_code": "P1",
            "connection_name": "conn1",
        })))
        .unwrap();

        assert_eq!(new.project_code.as_deref(), Some("P1"));
        assert_eq!(new.connection_name.as_deref(), Some("conn1"));
        assert_eq!(new.max_threads, 4);
        assert_eq!(new.url, "");
    }

    #[test]
    fn new_connection_from_map_overrides_defaults_when_supplied() {
        let new = NewConnection::from_map(map(json!({
            "max_threads": 16,
            "url": "snowflake://acct",
            "connect_by_key": true,
        })))
        .unwrap();

        assert_eq!(new.max_threads, 16);
        assert_eq!(new.url, "snowflake://acct");
        assert!(new.connect_by_key);
    }

    #[test]
    fn table_group_update_from_map_parses_result_columns() {
        let run_id = Uuid::new_v4();
        let update = TableGroupUpdate::from_map(map(json!({
            "last_complete_profile_run_id": run_id.to_string(),
            "dq_score_profiling": 0.92,
            "unknown_key": 1,
        })))
        .unwrap();

        assert_eq!(update.last_complete_profile_run_id, Some(run_id));
        assert_eq!(update.dq_score_profiling, Some(0.92));
        assert_eq!(update.dq_score_testing, None);
    }
}
