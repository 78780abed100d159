use actix_web::{get, web, HttpResponse, Responder};
use std::sync::Arc;

use crate::database::Database;

#[get("/")]
pub async fn hello() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "WhatsApp CRM API"
    }))
}

#[get("/health")]
pub async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}
