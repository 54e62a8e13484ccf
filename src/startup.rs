use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use crate::{
    routes::{default_route, page_route, post_route, scraper_route, user_route},
    services::{
        fetcher::BrowserFetcher,
        orchestrator::{PgRecorder, ScrapeOrchestrator},
    },
};

pub type AppOrchestrator = ScrapeOrchestrator<BrowserFetcher, PgRecorder>;

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    orchestrator: AppOrchestrator,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let orchestrator = web::Data::new(orchestrator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/scraper")
                    .service(scraper_route::scrape)
                    .service(scraper_route::logs)
                    .service(scraper_route::log_by_id)
                    .service(scraper_route::data_by_kind),
            )
            .service(
                web::scope("/pages")
                    .service(page_route::create_page)
                    .service(page_route::get_page)
                    .service(page_route::update_page)
                    .service(page_route::delete_page),
            )
            .service(
                web::scope("/posts")
                    .service(post_route::create_post)
                    .service(post_route::list_posts)
                    .service(post_route::get_post)
                    .service(post_route::update_post)
                    .service(post_route::delete_post),
            )
            .service(
                web::scope("/users")
                    .service(user_route::create_user)
                    .service(user_route::get_user)
                    .service(user_route::update_user)
                    .service(user_route::delete_user),
            )
            .app_data(db_pool.clone())
            .app_data(orchestrator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
