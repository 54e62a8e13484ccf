use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dal::scrape_log_db::{self, RecordError},
    domain::scrape::PageKind,
    routes::Pagination,
    services::orchestrator::ScrapeOutcome,
    startup::AppOrchestrator,
};

#[derive(Deserialize)]
pub struct ScrapeBody {
    url: String,
    #[serde(rename = "type")]
    kind: String,
    page_id: Option<String>,
}

#[post("/scrape")]
async fn scrape(
    body: web::Json<ScrapeBody>,
    orchestrator: web::Data<AppOrchestrator>,
) -> HttpResponse {
    let body = body.into_inner();

    // Detached task: a client that hangs up mid-scrape must not cancel
    // the run before the attempt is recorded.
    let run = tokio::spawn(async move {
        orchestrator
            .handle(&body.url, &body.kind, body.page_id)
            .await
    });
    let result = match run.await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Scrape task panicked: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "scrape task failed" }));
        }
    };

    match result {
        Err(e) => HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
        Ok(ScrapeOutcome { log, log_id }) => match log_id {
            Ok(id) => HttpResponse::Ok().json(json!({ "log_id": id, "scrape": log })),
            // The scrape outcome is known; only recording it failed. Keep
            // the two apart in the response.
            Err(e) => HttpResponse::InternalServerError().json(json!({
                "scrape": log,
                "persistence_error": e.to_string(),
            })),
        },
    }
}

#[get("/logs")]
async fn logs(query: web::Query<Pagination>, pool: web::Data<PgPool>) -> HttpResponse {
    match scrape_log_db::list_logs(query.limit, query.skip, &pool).await {
        Ok(logs) => HttpResponse::Ok().json(json!({ "logs": logs })),
        Err(e) => log_store_error(e),
    }
}

#[get("/logs/{id}")]
async fn log_by_id(path: web::Path<String>, pool: web::Data<PgPool>) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&path) else {
        return HttpResponse::BadRequest().json(json!({ "error": "invalid log id" }));
    };

    match scrape_log_db::get_log(id, &pool).await {
        Ok(Some(log)) => HttpResponse::Ok().json(log),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "log not found" })),
        Err(e) => log_store_error(e),
    }
}

#[get("/data/{kind}")]
async fn data_by_kind(
    path: web::Path<String>,
    query: web::Query<Pagination>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let kind = match PageKind::parse(&path) {
        Ok(kind) => kind,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
    };

    match scrape_log_db::list_successful_by_kind(kind, query.limit, query.skip, &pool).await {
        Ok(found_logs) => HttpResponse::Ok().json(json!({ "data": found_logs })),
        Err(e) => log_store_error(e),
    }
}

fn log_store_error(e: RecordError) -> HttpResponse {
    log::error!("Log store query failed: {}", e);
    HttpResponse::InternalServerError().json(json!({ "error": "log store unavailable" }))
}
