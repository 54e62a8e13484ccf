use serde::{Deserialize, Serialize};

/// Entity documents served by the CRUD surface. Each carries the external
/// identifier the store enforces uniqueness on.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: String,
    pub name: String,
    pub url: String,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub followers: Option<i64>,
    pub head_count: Option<i64>,
    pub specialities: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub linkedin_id: String,
    pub name: String,
    pub profile_url: String,
    pub profile_picture: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub page_id: String,
    pub content: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub shares: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
