use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a record with this identifier already exists")]
    AlreadyExists,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// One logical collection of keyed documents. The pair (collection,
/// external id) is unique in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCollection {
    pub name: &'static str,
    pub key_field: &'static str,
}

pub const PAGES: EntityCollection = EntityCollection {
    name: "pages",
    key_field: "page_id",
};
pub const USERS: EntityCollection = EntityCollection {
    name: "users",
    key_field: "linkedin_id",
};
pub const POSTS: EntityCollection = EntityCollection {
    name: "posts",
    key_field: "post_id",
};

pub async fn create(
    collection: EntityCollection,
    external_id: &str,
    document: &Value,
    pool: &PgPool,
) -> Result<Uuid, StoreError> {
    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        insert into entity
            (id, collection, external_id, document)
        values
            ($1, $2, $3, $4)
        on conflict (collection, external_id) do nothing
        "#,
    )
    .bind(id)
    .bind(collection.name)
    .bind(external_id)
    .bind(document)
    .execute(pool)
    .await?;

    match result.rows_affected() {
        0 => Err(StoreError::AlreadyExists),
        _ => Ok(id),
    }
}

pub async fn get(
    collection: EntityCollection,
    external_id: &str,
    pool: &PgPool,
) -> Result<Value, StoreError> {
    let document: Option<Value> = sqlx::query_scalar(
        r#"
        select document from entity
        where collection = $1 and external_id = $2
        "#,
    )
    .bind(collection.name)
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    document.ok_or(StoreError::NotFound)
}

/// Merges the patch over the stored document field by field, keeping
/// whatever the patch does not mention.
pub async fn update(
    collection: EntityCollection,
    external_id: &str,
    patch: &Value,
    pool: &PgPool,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        update entity
        set document = document || $3, updated_at = now()
        where collection = $1 and external_id = $2
        "#,
    )
    .bind(collection.name)
    .bind(external_id)
    .bind(patch)
    .execute(pool)
    .await?;

    match result.rows_affected() {
        0 => Err(StoreError::NotFound),
        _ => Ok(()),
    }
}

pub async fn delete(
    collection: EntityCollection,
    external_id: &str,
    pool: &PgPool,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        delete from entity
        where collection = $1 and external_id = $2
        "#,
    )
    .bind(collection.name)
    .bind(external_id)
    .execute(pool)
    .await?;

    match result.rows_affected() {
        0 => Err(StoreError::NotFound),
        _ => Ok(()),
    }
}

pub async fn list(
    collection: EntityCollection,
    limit: i64,
    skip: i64,
    pool: &PgPool,
) -> Result<Vec<Value>, StoreError> {
    let documents = sqlx::query_scalar(
        r#"
        select document from entity
        where collection = $1
        order by created_at
        limit $2 offset $3
        "#,
    )
    .bind(collection.name)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}
