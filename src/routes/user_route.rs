use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    dal::entity_db::{self, StoreError, USERS},
    domain::entities::User,
    routes::page_route::entity_store_error,
};

#[post("")]
async fn create_user(body: web::Json<User>, pool: web::Data<PgPool>) -> HttpResponse {
    let user = body.into_inner();
    let document = match serde_json::to_value(&user) {
        Ok(document) => document,
        Err(e) => {
            log::error!("Failed to serialize user {}: {}", user.linkedin_id, e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match entity_db::create(USERS, &user.linkedin_id, &document, &pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "User created successfully",
            "user": user,
        })),
        Err(StoreError::AlreadyExists) => HttpResponse::BadRequest().json(json!({
            "error": "User with this LinkedIn ID already exists",
        })),
        Err(e) => entity_store_error(e),
    }
}

#[get("/{linkedin_id}")]
async fn get_user(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::get(USERS, &path, &pool).await {
        Ok(user) => HttpResponse::Ok().json(json!({ "user": user })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[put("/{linkedin_id}")]
async fn update_user(
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let patch = body.into_inner();
    if !patch.is_object() {
        return HttpResponse::BadRequest().json(json!({ "error": "expected a json object" }));
    }

    match entity_db::update(USERS, &path, &patch, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "User updated successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[delete("/{linkedin_id}")]
async fn delete_user(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::delete(USERS, &path, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "User not found" }))
}
