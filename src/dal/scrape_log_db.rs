use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    record::ExtractedRecord,
    scrape::{FieldError, PageKind, ScrapeStatus, ScraperLog, StoredScraperLog},
};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("log store unreachable: {0}")]
    StoreUnreachable(#[source] sqlx::Error),
    #[error("log store rejected the write: {0}")]
    ConstraintViolation(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RecordError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.constraint().is_some() => {
                RecordError::ConstraintViolation(e)
            }
            _ => RecordError::StoreUnreachable(e),
        }
    }
}

/// The log is append-only. There is deliberately no update or upsert here;
/// replaying a request writes a fresh row every time.
pub async fn insert_log(log: &ScraperLog, pool: &PgPool) -> Result<Uuid, RecordError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        insert into scrape_log
            (id, url, page_kind, page_id, status, failure_reason, field_errors, record, attempted_at)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(&log.url)
    .bind(log.kind.as_str())
    .bind(&log.page_id)
    .bind(log.status.as_str())
    .bind(&log.failure_reason)
    .bind(Json(&log.field_errors))
    .bind(log.record.as_ref().map(Json))
    .bind(log.attempted_at)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn get_log(id: Uuid, pool: &PgPool) -> Result<Option<StoredScraperLog>, RecordError> {
    let row = sqlx::query_as::<_, StoredScraperLog>(
        r#"
        select id, url, page_kind, page_id, status, failure_reason, field_errors, record, attempted_at
        from scrape_log
        where id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list_logs(
    limit: i64,
    skip: i64,
    pool: &PgPool,
) -> Result<Vec<StoredScraperLog>, RecordError> {
    let rows = sqlx::query_as::<_, StoredScraperLog>(
        r#"
        select id, url, page_kind, page_id, status, failure_reason, field_errors, record, attempted_at
        from scrape_log
        order by attempted_at desc
        limit $1 offset $2
        "#,
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_successful_by_kind(
    kind: PageKind,
    limit: i64,
    skip: i64,
    pool: &PgPool,
) -> Result<Vec<StoredScraperLog>, RecordError> {
    let rows = sqlx::query_as::<_, StoredScraperLog>(
        r#"
        select id, url, page_kind, page_id, status, failure_reason, field_errors, record, attempted_at
        from scrape_log
        where status = 'success' and page_kind = $1
        order by attempted_at desc
        limit $2 offset $3
        "#,
    )
    .bind(kind.as_str())
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

impl sqlx::FromRow<'_, PgRow> for StoredScraperLog {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("page_kind")?;
        let kind = PageKind::parse(&kind).map_err(|e| sqlx::Error::ColumnDecode {
            index: "page_kind".into(),
            source: Box::new(e),
        })?;

        let status: String = row.try_get("status")?;
        let status = ScrapeStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown scrape status: {status}").into(),
        })?;

        let field_errors: Json<Vec<FieldError>> = row.try_get("field_errors")?;
        let record: Option<Json<ExtractedRecord>> = row.try_get("record")?;

        Ok(StoredScraperLog {
            id: row.try_get("id")?,
            log: ScraperLog {
                url: row.try_get("url")?,
                kind,
                page_id: row.try_get("page_id")?,
                status,
                failure_reason: row.try_get("failure_reason")?,
                field_errors: field_errors.0,
                record: record.map(|r| r.0),
                attempted_at: row.try_get("attempted_at")?,
            },
        })
    }
}
