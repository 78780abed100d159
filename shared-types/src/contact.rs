use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contact {
    pub id: i64,
    pub tenant_id: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub bg_id: Option<String>,
    pub bg_name: Option<String>,
    pub template_key: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_delivered: Option<DateTime<Utc>>,
    pub last_replied: Option<DateTime<Utc>>,
    #[serde(rename = "customField")]
    pub custom_field: Option<serde_json::Value>,
    pub manual_mode: Option<bool>,
    #[serde(rename = "createdOn")]
    pub created_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
pub struct CreateContactRequest {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub bg_id: Option<String>,
    pub bg_name: Option<String>,
    pub template_key: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_delivered: Option<DateTime<Utc>>,
    pub last_replied: Option<DateTime<Utc>>,
    #[serde(rename = "customField")]
    pub custom_field: Option<serde_json::Value>,
    pub manual_mode: Option<bool>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct CreateContactResponse {
    pub contact: Contact,
}

/// Query string of the single-contact lookup.
#[derive(Debug, Deserialize)]
pub struct ContactLookupQuery {
    pub phone: String,
}
