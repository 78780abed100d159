use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Query parameters accepted by `POST /contacts/cleanup-duplicates`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanupQuery {
    pub tenant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub dry_run: bool,
}

/// Reads `true/false`, `1/0`, `yes/no` and `on/off`, ignoring case.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean such as true, false, 1, 0, yes, no, on or off")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        match parse_flag(value) {
            Some(flag) => Ok(flag),
            None => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStatus {
    Success,
    /// At least one duplicate group could not be written.
    PartialSuccess,
}

/// What happened to a single duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GroupOutcome {
    WouldDelete,
    Deleted,
    /// Another writer changed the group first; nothing was deleted by this run.
    AlreadyResolved,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CleanupStatistics {
    pub total_contacts_scanned: usize,
    pub tenants_processed: usize,
    pub duplicates_found: usize,
    pub contacts_deleted: usize,
    pub contacts_kept: usize,
    pub phone_numbers_with_duplicates: usize,
    pub groups_already_resolved: usize,
    pub groups_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactSummary {
    pub id: i64,
    pub richness_score: u32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateGroupDetail {
    pub tenant_id: String,
    pub phone: String,
    pub total_duplicates: usize,
    pub outcome: GroupOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub kept_contact: ContactSummary,
    pub deleted_contacts: Vec<ContactSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CleanupReport {
    pub status: CleanupStatus,
    pub dry_run: bool,
    pub message: String,
    pub statistics: CleanupStatistics,
    pub execution_time_seconds: f64,
    pub deletion_details: Vec<DuplicateGroupDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_flag_forms() {
        for raw in ["true", "True", "TRUE", "1", "yes", "Yes", "on", " On "] {
            assert_eq!(parse_flag(raw), Some(true), "{raw}");
        }
        for raw in ["false", "False", "0", "no", "NO", "off"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_cleanup_query_dry_run() {
        let query: CleanupQuery = serde_json::from_value(json!({"dry_run": "True"})).unwrap();
        assert!(query.dry_run);

        let query: CleanupQuery = serde_json::from_value(json!({"dry_run": false})).unwrap();
        assert!(!query.dry_run);

        let query: CleanupQuery = serde_json::from_value(json!({"tenant_id": "T1"})).unwrap();
        assert!(!query.dry_run);
        assert_eq!(query.tenant_id.as_deref(), Some("T1"));

        let invalid = serde_json::from_value::<CleanupQuery>(json!({"dry_run": "maybe"}));
        assert!(invalid.is_err());
    }
}
