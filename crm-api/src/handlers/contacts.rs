use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use shared_types::{ContactLookupQuery, CreateContactRequest, CreateContactResponse, ErrorResponse};
use std::sync::Arc;

use super::tenant_from_request;
use crate::database::contacts as contacts_db;
use crate::database::Database;
use crate::helpers::contact_cache::ContactCache;

const LIST_LIMIT: usize = 1000;

fn missing_tenant() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("Tenant ID missing in headers"))
}

pub async fn list_contacts(
    db: web::Data<Arc<Database>>,
    cache: web::Data<Arc<ContactCache>>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(tenant_id) = tenant_from_request(&req) else {
        return Ok(missing_tenant());
    };

    let contacts = match cache.get(&tenant_id).await {
        Some(contacts) => contacts,
        None => {
            let generation = cache.generation(&tenant_id).await;
            let contacts =
                contacts_db::list_contacts(db.async_connection.clone(), &tenant_id, LIST_LIMIT)
                    .await
                    .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;
            cache.store(&tenant_id, generation, contacts.clone()).await;
            contacts
        }
    };

    if contacts.is_empty() {
        return Ok(HttpResponse::NotFound()
            .json(ErrorResponse::new("No contacts found for this tenant")));
    }

    Ok(HttpResponse::Ok().json(contacts))
}

pub async fn get_contact_by_phone(
    db: web::Data<Arc<Database>>,
    query: web::Query<ContactLookupQuery>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(tenant_id) = tenant_from_request(&req) else {
        return Ok(missing_tenant());
    };

    let contact =
        contacts_db::find_contact_by_phone(db.async_connection.clone(), &tenant_id, &query.phone)
            .await
            .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    match contact {
        Some(contact) => Ok(HttpResponse::Ok().json(contact)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse::new("Contact not found"))),
    }
}

pub async fn create_contact(
    db: web::Data<Arc<Database>>,
    cache: web::Data<Arc<ContactCache>>,
    request: web::Json<CreateContactRequest>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(tenant_id) = tenant_from_request(&req) else {
        return Ok(missing_tenant());
    };

    let mut request = request.into_inner();
    let phone = match request.phone.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => phone.to_string(),
        _ => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new("Phone number is required")));
        }
    };
    request.phone = Some(phone.clone());

    let existing =
        contacts_db::find_contact_by_phone(db.async_connection.clone(), &tenant_id, &phone)
            .await
            .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;
    if existing.is_some() {
        return Ok(HttpResponse::Conflict().json(ErrorResponse::new(format!(
            "Contact with phone {} already exists for this tenant",
            phone
        ))));
    }

    let contact =
        contacts_db::insert_contact(db.async_connection.clone(), &tenant_id, &request, Utc::now())
            .await
            .map_err(|e| {
                actix_web::error::ErrorInternalServerError(format!(
                    "Error creating contact: {}",
                    e
                ))
            })?;

    cache.invalidate(&tenant_id).await;
    tracing::info!(tenant_id = %tenant_id, contact_id = contact.id, "Created contact");

    Ok(HttpResponse::Created().json(CreateContactResponse { contact }))
}

pub async fn delete_contact(
    db: web::Data<Arc<Database>>,
    cache: web::Data<Arc<ContactCache>>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(tenant_id) = tenant_from_request(&req) else {
        return Ok(missing_tenant());
    };
    let contact_id = path.into_inner();

    let deleted = contacts_db::delete_contact(db.async_connection.clone(), &tenant_id, contact_id)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    if !deleted {
        return Ok(HttpResponse::NotFound()
            .json(ErrorResponse::new("Contact not found for this tenant")));
    }

    cache.invalidate(&tenant_id).await;
    tracing::info!(tenant_id = %tenant_id, contact_id, "Deleted contact");

    Ok(HttpResponse::NoContent().finish())
}
