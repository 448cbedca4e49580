use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::{
    configs::{connect_database, connect_storage},
    middlewares::AuthConfig,
    modules::{
        media::probe::Ffprobe,
        video::{repository_pg::VideoRepositoryPg, route, service::VideoService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let storage = connect_storage(&ENV.storage)
        .map_err(|e| std::io::Error::other(format!("Storage configuration error: {e}")))?;
    std::fs::create_dir_all(&ENV.scratch_dir)?;

    let probe = Ffprobe::new(&ENV.ffprobe_path, Duration::from_secs(ENV.probe_timeout_secs));

    let video_service = web::Data::new(
        VideoService::with_dependencies(
            Arc::new(VideoRepositoryPg::new(db_pool)),
            Arc::new(storage),
            Arc::new(probe),
            ENV.scratch_dir.clone(),
        )
        .with_limits(modules::video::model::UploadLimits {
            thumbnail: ENV.max_thumbnail_bytes,
            video: ENV.max_video_bytes,
        }),
    );
    let auth_config = web::Data::new(AuthConfig::new(ENV.jwt_secret.as_str()));

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(video_service.clone())
            .app_data(auth_config.clone())
            .service(health_check)
            .service(web::scope("/api").configure(route::configure::<VideoRepositoryPg>))
            .configure(route::configure_assets::<VideoRepositoryPg>)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
