use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Welcome to the LinkedIn insights service!" }))
}
