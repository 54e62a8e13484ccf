use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    dal::entity_db::{self, StoreError, POSTS},
    domain::entities::Post,
    routes::{page_route::entity_store_error, Pagination},
};

#[post("")]
async fn create_post(body: web::Json<Post>, pool: web::Data<PgPool>) -> HttpResponse {
    let post = body.into_inner();
    let document = match serde_json::to_value(&post) {
        Ok(document) => document,
        Err(e) => {
            log::error!("Failed to serialize post {}: {}", post.post_id, e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match entity_db::create(POSTS, &post.post_id, &document, &pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Post created successfully",
            "post": post,
        })),
        Err(StoreError::AlreadyExists) => HttpResponse::BadRequest().json(json!({
            "error": "Post with this ID already exists",
        })),
        Err(e) => entity_store_error(e),
    }
}

#[get("")]
async fn list_posts(query: web::Query<Pagination>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::list(POSTS, query.limit, query.skip, &pool).await {
        Ok(posts) => HttpResponse::Ok().json(json!({ "posts": posts })),
        Err(e) => entity_store_error(e),
    }
}

#[get("/{post_id}")]
async fn get_post(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::get(POSTS, &path, &pool).await {
        Ok(post) => HttpResponse::Ok().json(json!({ "post": post })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[put("/{post_id}")]
async fn update_post(
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let patch = body.into_inner();
    if !patch.is_object() {
        return HttpResponse::BadRequest().json(json!({ "error": "expected a json object" }));
    }

    match entity_db::update(POSTS, &path, &patch, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Post updated successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

#[delete("/{post_id}")]
async fn delete_post(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    match entity_db::delete(POSTS, &path, &pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Post deleted successfully" })),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => entity_store_error(e),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Post not found" }))
}
