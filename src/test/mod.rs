#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::memory::InMemory;
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::{
    probe::{Dimensions, MediaProbe, ProbeError},
    storage::{ByteStream, ObjectStorage, Storage, StorageError, StorageResult},
    upload::UploadedFile,
};
use crate::modules::video::{
    model::{InsertVideo, UploadLimits},
    repository::VideoRepository,
    schema::VideoEntity,
    service::VideoService,
};
use crate::utils::Claims;

pub const BASE_URL: &str = "https://tubely-test.s3.us-east-1.amazonaws.com";
pub const SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "----videohost-test-boundary";

pub fn video_owned_by(user_id: Uuid) -> VideoEntity {
    let now = chrono::Utc::now();
    VideoEntity {
        id: Uuid::now_v7(),
        user_id,
        title: "Boots in the wild".to_string(),
        description: Some("A short clip".to_string()),
        thumbnail_url: None,
        video_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn token_for(user_id: &Uuid) -> String {
    Claims::new(user_id, 3600).encode(SECRET.as_bytes()).unwrap()
}

/// Builds a multipart body with a single file field. Returns the content type header and body.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Multipart body with a plain text field instead of a file.
pub fn multipart_text(field: &str, value: &str) -> (String, Vec<u8>) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    );
    (format!("multipart/form-data; boundary={BOUNDARY}"), body.into_bytes())
}

pub async fn collect(stream: ByteStream) -> Vec<u8> {
    let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
    chunks.concat()
}

#[derive(Default)]
pub struct MemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, VideoEntity>>,
    fail_updates: AtomicBool,
}

impl MemoryVideoRepository {
    pub fn insert(&self, video: VideoEntity) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: &Uuid) -> Option<VideoEntity> {
        self.videos.lock().unwrap().get(id).cloned()
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl VideoRepository for MemoryVideoRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::SystemError> {
        Ok(self.get(id))
    }

    async fn find_by_user(&self, user_id: &Uuid) -> Result<Vec<VideoEntity>, error::SystemError> {
        let mut videos: Vec<VideoEntity> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == *user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::SystemError> {
        let mut entity = video_owned_by(video.user_id);
        entity.title = video.title.clone();
        entity.description = video.description.clone();
        self.insert(entity.clone());
        Ok(entity)
    }

    async fn update(&self, video: &VideoEntity) -> Result<VideoEntity, error::SystemError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(error::SystemError::DatabaseError("connection reset".into()));
        }
        let mut saved = video.clone();
        saved.updated_at = chrono::Utc::now();
        self.insert(saved.clone());
        Ok(saved)
    }
}

pub struct FixedProbe(Result<Dimensions, ()>);

impl FixedProbe {
    pub fn ok(width: u32, height: u32) -> Self {
        Self(Ok(Dimensions { width, height }))
    }

    pub fn failing() -> Self {
        Self(Err(()))
    }
}

#[async_trait::async_trait]
impl MediaProbe for FixedProbe {
    async fn dimensions(&self, _path: &FsPath) -> Result<Dimensions, ProbeError> {
        self.0.map_err(|_| ProbeError::NoVideoStream)
    }
}

pub struct FailingStorage;

#[async_trait::async_trait]
impl Storage for FailingStorage {
    async fn put_file(&self, _key: &str, _source: &FsPath, _content_type: &str) -> StorageResult<String> {
        Err(StorageError::UploadFailed("access denied".into()))
    }

    async fn get(&self, _key: &str) -> StorageResult<Option<ByteStream>> {
        Err(StorageError::DownloadFailed("access denied".into()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{BASE_URL}/{key}")
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(BASE_URL).and_then(|rest| rest.strip_prefix('/'))
    }
}

pub struct TestContext {
    pub service: Arc<VideoService<MemoryVideoRepository>>,
    pub repo: Arc<MemoryVideoRepository>,
    pub storage: Arc<dyn Storage + Send + Sync>,
    pub scratch: tempfile::TempDir,
}

impl TestContext {
    pub fn new(probe: FixedProbe) -> Self {
        let storage = ObjectStorage::new(Arc::new(InMemory::new()), BASE_URL);
        Self::with_storage(probe, Arc::new(storage))
    }

    pub fn with_storage(probe: FixedProbe, storage: Arc<dyn Storage + Send + Sync>) -> Self {
        Self::build(probe, storage, UploadLimits::default())
    }

    pub fn with_limits(probe: FixedProbe, limits: UploadLimits) -> Self {
        let storage = ObjectStorage::new(Arc::new(InMemory::new()), BASE_URL);
        Self::build(probe, Arc::new(storage), limits)
    }

    fn build(
        probe: FixedProbe,
        storage: Arc<dyn Storage + Send + Sync>,
        limits: UploadLimits,
    ) -> Self {
        let repo = Arc::new(MemoryVideoRepository::default());
        let scratch = tempfile::tempdir().unwrap();
        let service = VideoService::with_dependencies(
            repo.clone(),
            storage.clone(),
            Arc::new(probe),
            scratch.path().to_path_buf(),
        )
        .with_limits(limits);
        Self { service: Arc::new(service), repo, storage, scratch }
    }

    pub fn insert_video(&self, user_id: Uuid) -> VideoEntity {
        let video = video_owned_by(user_id);
        self.repo.insert(video.clone());
        video
    }

    pub async fn upload(&self, data: &[u8], content_type: &str) -> UploadedFile {
        UploadedFile::from_bytes(self.scratch.path(), content_type, data).await.unwrap()
    }

    pub async fn stored(&self, key: &str) -> Option<Vec<u8>> {
        match self.storage.get(key).await.unwrap() {
            Some(stream) => Some(collect(stream).await),
            None => None,
        }
    }

    /// Files left behind in the scratch directory.
    pub fn scratch_files(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }
}
