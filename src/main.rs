use std::{net::TcpListener, time::Duration};

use env_logger::Env;
use insight::{
    configuration::get_configuration,
    services::{
        extractor::Extractor,
        fetcher::BrowserFetcher,
        orchestrator::{PgRecorder, ScrapeOrchestrator},
    },
    startup::run,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    if configuration.scraper.session_cookie.trim().is_empty() {
        panic!("Missing session cookie. Set APP_SCRAPER__SESSION_COOKIE before starting.");
    }

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);
    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());

    // Store trouble at boot is reported, not fatal; every scrape response
    // carries its own persistence status.
    if let Err(e) = sqlx::migrate!().run(&connection_pool).await {
        log::error!("Failed to run database migrations: {:?}", e);
    }

    let extractor = Extractor::new(&configuration.scraper.selectors)
        .expect("Invalid selector table in configuration.");
    let fetcher = BrowserFetcher::new(
        configuration.scraper.webdriver_url.clone(),
        configuration.scraper.session_cookie.clone(),
        configuration.scraper.page_load_timeout(),
    );
    let recorder = PgRecorder::new(connection_pool.clone());
    let orchestrator = ScrapeOrchestrator::new(fetcher, recorder, extractor);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    run(listener, connection_pool, orchestrator)?.await
}
