use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    dal::entity_db::{self, StoreError, PAGES},
    domain::entities::Page,
};

#[post("")]
async fn create_page(body: web::Json<Page>, pool: web::Data<PgPool>) -> HttpResponse {
    let page = body.into_inner();
    let document = match serde_json::to_value(&page) {
        Ok(document) => document,
        Err(e) => {
            log::error!("Failed to serialize page {}: {}", page.page_id, e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match entity_db::create(PAGES, &page.page_id, &document, &pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Page created successfully",
            "page": page,
        })),
        Err(StoreError::AlreadyExists) => HttpResponse::BadRequest().json(json!({
            "error": "Page with this ID already exists",
        })),
        Err(e) => entity_store_error(e),
    }
}

#[get("/{page_id}")]
async fn get_page(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::get(PAGES, &path, &pool).await {
        Ok(page) => HttpResponse::Ok().json(json!({ "page": page })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[put("/{page_id}")]
async fn update_page(
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let patch = body.into_inner();
    if !patch.is_object() {
        return HttpResponse::BadRequest().json(json!({ "error": "expected a json object" }));
    }

    match entity_db::update(PAGES, &path, &patch, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Page updated successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[delete("/{page_id}")]
async fn delete_page(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::delete(PAGES, &path, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Page deleted successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Page not found" }))
}

pub(super) fn entity_store_error(e: StoreError) -> HttpResponse {
    log::error!("Entity store operation failed: {}", e);
    HttpResponse::InternalServerError().json(json!({ "error": "entity store unavailable" }))
}
