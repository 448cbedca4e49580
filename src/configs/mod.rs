use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    api::error,
    constants::StorageBackend,
    modules::media::storage::{ObjectStorage, StorageError},
    ENV,
};

pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let database_url = &ENV.database_url;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub fn connect_storage(backend: &StorageBackend) -> Result<ObjectStorage, StorageError> {
    match backend {
        StorageBackend::S3 { bucket, region, endpoint } => {
            log::info!("Using S3 storage: bucket {} in {}", bucket, region);
            ObjectStorage::s3(bucket, region, endpoint.as_deref())
        }
        StorageBackend::Local { root, base_url } => {
            log::info!("Using local storage at {} served from {}", root.display(), base_url);
            ObjectStorage::local(root, base_url.as_str())
        }
    }
}
