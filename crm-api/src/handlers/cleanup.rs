use actix_web::{web, HttpResponse};
use shared_types::{CleanupQuery, ErrorResponse};
use std::sync::Arc;
use tracing::error;

use crate::database::{Database, SqliteContactStore};
use crate::dedup::{self, CleanupOptions};
use crate::helpers::contact_cache::ContactCache;

#[derive(Clone)]
pub struct CleanupAppState {
    pub detail_limit: usize,
}

/// `POST /contacts/cleanup-duplicates?tenant_id=&dry_run=`
pub async fn cleanup_duplicates(
    db: web::Data<Arc<Database>>,
    cache: web::Data<Arc<ContactCache>>,
    state: web::Data<CleanupAppState>,
    query: web::Query<CleanupQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let options = CleanupOptions {
        tenant_id: query.tenant_id,
        dry_run: query.dry_run,
        detail_limit: state.detail_limit,
    };

    let store = SqliteContactStore::new(db.async_connection.clone());

    match dedup::run_cleanup(&store, &options).await {
        Ok(report) => {
            if !report.dry_run && report.statistics.contacts_deleted > 0 {
                match &options.tenant_id {
                    Some(tenant_id) => cache.invalidate(tenant_id).await,
                    None => cache.invalidate_all().await,
                }
            }
            HttpResponse::Ok().json(report)
        }
        Err(e) => {
            error!("Duplicate cleanup failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(format!(
                "Error during duplicate cleanup: {}",
                e
            )))
        }
    }
}
