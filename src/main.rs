use std::io;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

mod config;
mod db;
mod error;
mod handlers;
mod income;
mod models;
mod occupancy;
mod stays;

#[cfg(test)]
mod test_support;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = config::Settings::from_env().map_err(io::Error::other)?;

    log::info!("Connecting to database...");
    let pool = db::get_db_pool(&settings)
        .await
        .map_err(io::Error::other)?;

    log::info!("Running migrations...");
    db::run_migrations(&pool).await.map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{}",
        settings.host,
        settings.port
    );

    let pool_data = web::Data::new(pool);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
