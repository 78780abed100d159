//! Duplicate contact cleanup.
//!
//! Contacts that share a tenant and phone number are grouped, each contact
//! gets a richness score, the richest (then oldest, then lowest id) contact
//! of every group is kept and the rest are deleted. A dry run computes the
//! same report without touching the store.

pub mod group;
pub mod score;
pub mod store;

use std::collections::HashSet;
use std::time::Instant;

use shared_types::{
    CleanupReport, CleanupStatistics, CleanupStatus, DuplicateGroupDetail, GroupOutcome,
};
use tracing::{debug, info, warn};

pub use group::{group_duplicates, DuplicateGroup, ScoredContact};
pub use score::richness_score;
pub use store::{ContactStore, StoreError};

pub const DEFAULT_DETAIL_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub tenant_id: Option<String>,
    pub dry_run: bool,
    /// Maximum number of groups listed in `deletion_details`.
    pub detail_limit: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            tenant_id: None,
            dry_run: false,
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Run one cleanup pass against `store`.
///
/// Each group is written in its own transaction, so groups finished before
/// a failure stay committed. Conflicts mark the group `already_resolved`;
/// other write errors mark it `failed`. Only an unreachable store aborts
/// the whole run.
pub async fn run_cleanup(
    store: &dyn ContactStore,
    options: &CleanupOptions,
) -> Result<CleanupReport, CleanupError> {
    let started = Instant::now();
    info!(
        tenant_id = ?options.tenant_id,
        dry_run = options.dry_run,
        "Starting duplicate contact cleanup"
    );

    let contacts = store.load_contacts(options.tenant_id.as_deref()).await?;

    let mut stats = CleanupStatistics {
        total_contacts_scanned: contacts.len(),
        tenants_processed: contacts
            .iter()
            .filter_map(|c| c.tenant_id.as_deref())
            .collect::<HashSet<_>>()
            .len(),
        ..Default::default()
    };

    let groups = group_duplicates(contacts);
    stats.phone_numbers_with_duplicates = groups.len();
    stats.contacts_kept = groups.len();
    stats.duplicates_found = groups.iter().map(|g| g.duplicates().len()).sum();

    let mut details = Vec::with_capacity(groups.len().min(options.detail_limit));

    for group in &groups {
        let (outcome, error) = if options.dry_run {
            stats.contacts_deleted += group.duplicates().len();
            (GroupOutcome::WouldDelete, None)
        } else {
            apply_group(store, group, &mut stats).await?
        };

        if details.len() < options.detail_limit {
            details.push(DuplicateGroupDetail {
                tenant_id: group.tenant_id.clone(),
                phone: group.phone.clone(),
                total_duplicates: group.size(),
                outcome,
                error,
                kept_contact: group.survivor().summary(),
                deleted_contacts: group.duplicates().iter().map(|m| m.summary()).collect(),
            });
        }
    }

    let note = (groups.len() > details.len()).then(|| {
        format!(
            "Showing first {} of {} duplicate groups; {} omitted",
            details.len(),
            groups.len(),
            groups.len() - details.len()
        )
    });

    let status = if stats.groups_failed > 0 {
        CleanupStatus::PartialSuccess
    } else {
        CleanupStatus::Success
    };

    let message = summary_message(options.dry_run, &stats);
    let execution_time_seconds = started.elapsed().as_secs_f64();

    info!(
        dry_run = options.dry_run,
        scanned = stats.total_contacts_scanned,
        groups = stats.phone_numbers_with_duplicates,
        deleted = stats.contacts_deleted,
        failed = stats.groups_failed,
        "Duplicate contact cleanup finished in {:.3}s",
        execution_time_seconds
    );

    Ok(CleanupReport {
        status,
        dry_run: options.dry_run,
        message,
        statistics: stats,
        execution_time_seconds,
        deletion_details: details,
        note,
    })
}

async fn apply_group(
    store: &dyn ContactStore,
    group: &DuplicateGroup,
    stats: &mut CleanupStatistics,
) -> Result<(GroupOutcome, Option<String>), CleanupError> {
    let survivor_id = group.survivor().contact.id;
    let duplicate_ids = group.duplicate_ids();

    match store.delete_duplicates(survivor_id, &duplicate_ids).await {
        Ok(deleted) => {
            debug!(
                tenant_id = %group.tenant_id,
                phone = %group.phone,
                survivor_id,
                deleted,
                "Removed duplicate contacts"
            );
            stats.contacts_deleted += deleted;
            Ok((GroupOutcome::Deleted, None))
        }
        Err(StoreError::Conflict(reason)) => {
            warn!(
                tenant_id = %group.tenant_id,
                phone = %group.phone,
                "Duplicate group changed concurrently, skipping: {}",
                reason
            );
            stats.groups_already_resolved += 1;
            Ok((GroupOutcome::AlreadyResolved, None))
        }
        Err(e @ StoreError::Query(_)) => {
            warn!(
                tenant_id = %group.tenant_id,
                phone = %group.phone,
                "Failed to remove duplicate contacts: {}",
                e
            );
            stats.groups_failed += 1;
            Ok((GroupOutcome::Failed, Some(e.to_string())))
        }
        Err(e @ StoreError::Unavailable(_)) => Err(e.into()),
    }
}

fn summary_message(dry_run: bool, stats: &CleanupStatistics) -> String {
    if stats.phone_numbers_with_duplicates == 0 {
        return "No duplicate contacts found".to_string();
    }

    if dry_run {
        format!(
            "Dry run complete: {} duplicate contacts would be deleted across {} phone numbers",
            stats.contacts_deleted, stats.phone_numbers_with_duplicates
        )
    } else {
        format!(
            "Cleanup complete: deleted {} duplicate contacts across {} phone numbers",
            stats.contacts_deleted, stats.phone_numbers_with_duplicates
        )
    }
}
