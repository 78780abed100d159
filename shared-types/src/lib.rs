use serde::{Deserialize, Serialize};

pub mod cleanup;
pub mod contact;

pub use cleanup::{
    CleanupQuery, CleanupReport, CleanupStatistics, CleanupStatus, ContactSummary,
    DuplicateGroupDetail, GroupOutcome,
};
pub use contact::{Contact, ContactLookupQuery, CreateContactRequest, CreateContactResponse};

/// Error body returned by API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
