pub mod cleanup;
pub mod contacts;
pub mod health;

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use shared_types::ErrorResponse;

/// Header carrying the caller's tenant. Header lookup is case-insensitive,
/// so `X-Tenant-ID` is accepted as well.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

pub(crate) fn tenant_from_request(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    let body = ErrorResponse::new(format!("Invalid query parameters: {}", err));
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Register every route of the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .service(health::hello)
        .service(health::health)
        .route(
            "/contacts/cleanup-duplicates",
            web::post().to(cleanup::cleanup_duplicates),
        )
        .route("/contacts", web::get().to(contacts::list_contacts))
        .route("/contacts/", web::post().to(contacts::create_contact))
        .route("/contacts/{id}/", web::delete().to(contacts::delete_contact))
        .route("/contact", web::get().to(contacts::get_contact_by_phone));
}
