//! Asset storage backed by `object_store`.
//!
//! Thumbnails and videos go through the same [`Storage`] trait; the backend
//! is S3 in production and the local filesystem in development.

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{Attribute, Attributes, GetOptions, ObjectStore};
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

#[async_trait::async_trait]
pub trait Storage {
    /// Upload the file at `source` under `key`, replacing any existing object.
    /// Returns the public URL of the object.
    async fn put_file(&self, key: &str, source: &FsPath, content_type: &str)
        -> StorageResult<String>;

    /// Stream the object stored under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> StorageResult<Option<ByteStream>>;

    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`Storage::public_url`].
    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str>;
}

pub fn s3_base_url(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    base_url: String,
    // LocalFileSystem rejects object attributes
    with_content_type: bool,
}

impl ObjectStorage {
    pub fn new(store: Arc<dyn ObjectStore>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { store, base_url, with_content_type: false }
    }

    pub fn s3(bucket: &str, region: &str, endpoint: Option<&str>) -> StorageResult<Self> {
        let mut builder =
            AmazonS3Builder::from_env().with_region(region).with_bucket_name(bucket);

        if let Some(endpoint) = endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let mut storage = Self::new(Arc::new(store), s3_base_url(bucket, region, endpoint));
        storage.with_content_type = true;
        Ok(storage)
    }

    pub fn local(root: &FsPath, base_url: impl Into<String>) -> StorageResult<Self> {
        std::fs::create_dir_all(root)?;
        let store = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(Self::new(Arc::new(store), base_url))
    }
}

#[async_trait::async_trait]
impl Storage for ObjectStorage {
    async fn put_file(
        &self,
        key: &str,
        source: &FsPath,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = std::time::Instant::now();
        let location = Path::from(key);

        let mut writer = BufWriter::new(Arc::clone(&self.store), location);
        if self.with_content_type {
            let attributes =
                Attributes::from_iter([(Attribute::ContentType, content_type.to_string())]);
            writer = writer.with_attributes(attributes);
        }

        let mut file = tokio::fs::File::open(source).await?;
        let result = async {
            let size = tokio::io::copy(&mut file, &mut writer).await?;
            writer.shutdown().await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                writer.abort().await.ok();
                tracing::error!(
                    error = %e,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(self.public_url(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Option<ByteStream>> {
        let location = Path::from(key);

        match self.store.get_opts(&location, GetOptions::default()).await {
            Ok(result) => {
                let stream = result
                    .into_stream()
                    .map(|chunk| chunk.map_err(|e| StorageError::DownloadFailed(e.to_string())));
                Ok(Some(stream.boxed()))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Object download failed");
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }
}
