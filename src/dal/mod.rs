pub mod entity_db;
pub mod scrape_log_db;
