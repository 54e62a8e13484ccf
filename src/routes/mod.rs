use serde::Deserialize;

pub mod default_route;
pub mod page_route;
pub mod post_route;
pub mod scraper_route;
pub mod user_route;

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
}

fn default_limit() -> i64 {
    10
}
