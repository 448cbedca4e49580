use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::{
    keys::{self, AspectRatio},
    probe::MediaProbe,
    storage::{ByteStream, Storage},
    upload::{UploadPolicy, UploadedFile},
};
use crate::modules::video::{
    model::{CreateVideoModel, InsertVideo, UploadLimits},
    repository::VideoRepository,
    schema::VideoEntity,
};

/// A stored object ready to be streamed back.
pub struct StoredAsset {
    pub content_type: String,
    pub body: ByteStream,
}

/// Fails unless `user_id` owns `video`.
pub fn ensure_owner(video: &VideoEntity, user_id: &Uuid) -> Result<(), error::SystemError> {
    if video.user_id != *user_id {
        return Err(error::SystemError::forbidden("You don't have permission to modify this video"));
    }
    Ok(())
}

pub struct VideoService<R>
where
    R: VideoRepository + Send + Sync,
{
    video_repo: Arc<R>,
    storage: Arc<dyn Storage + Send + Sync>,
    probe: Arc<dyn MediaProbe + Send + Sync>,
    scratch_dir: PathBuf,
    limits: UploadLimits,
}

impl<R> VideoService<R>
where
    R: VideoRepository + Send + Sync,
{
    pub fn with_dependencies(
        video_repo: Arc<R>,
        storage: Arc<dyn Storage + Send + Sync>,
        probe: Arc<dyn MediaProbe + Send + Sync>,
        scratch_dir: PathBuf,
    ) -> Self {
        info!("VideoService initialized with dependencies");
        Self { video_repo, storage, probe, scratch_dir, limits: UploadLimits::default() }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn thumbnail_policy(&self) -> UploadPolicy {
        UploadPolicy::thumbnail(self.limits.thumbnail)
    }

    pub fn video_policy(&self) -> UploadPolicy {
        UploadPolicy::video(self.limits.video)
    }

    pub async fn create_video(
        &self,
        user_id: Uuid,
        video: CreateVideoModel,
    ) -> Result<VideoEntity, error::SystemError> {
        let new_video =
            InsertVideo { user_id, title: video.title, description: video.description };
        let entity = self.video_repo.create(&new_video).await?;
        info!("Video {} created by user {}", entity.id, user_id);
        Ok(entity)
    }

    pub async fn get_video(&self, video_id: &Uuid) -> Result<VideoEntity, error::SystemError> {
        self.video_repo
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Couldn't find video"))
    }

    pub async fn list_videos(&self, user_id: &Uuid) -> Result<Vec<VideoEntity>, error::SystemError> {
        self.video_repo.find_by_user(user_id).await
    }

    /// Looks up the video and checks that `user_id` may modify it.
    pub async fn find_owned(
        &self,
        video_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<VideoEntity, error::SystemError> {
        let video = self.get_video(video_id).await?;
        ensure_owner(&video, user_id)?;
        Ok(video)
    }

    /// Probes the upload, publishes it under its aspect bucket and records the URL.
    pub async fn publish_video(
        &self,
        mut video: VideoEntity,
        upload: UploadedFile,
    ) -> Result<VideoEntity, error::SystemError> {
        let dimensions = self.probe.dimensions(upload.path()).await.map_err(|e| {
            error!("Probe rejected upload for video {}: {}", video.id, e);
            e
        })?;
        let aspect = AspectRatio::from_dimensions(dimensions.width, dimensions.height);
        info!(
            "Video {} is {}x{} ({}), {} bytes",
            video.id,
            dimensions.width,
            dimensions.height,
            aspect,
            upload.size()
        );

        let key = keys::video_key(aspect, &video.id);
        let url = self.storage.put_file(&key, upload.path(), upload.content_type()).await?;

        video.video_url = Some(url);
        self.save(video, &key).await
    }

    pub async fn publish_thumbnail(
        &self,
        mut video: VideoEntity,
        upload: UploadedFile,
    ) -> Result<VideoEntity, error::SystemError> {
        let key = keys::thumbnail_key(&video.id, upload.content_type());
        let url = self.storage.put_file(&key, upload.path(), upload.content_type()).await?;

        video.thumbnail_url = Some(url);
        self.save(video, &key).await
    }

    pub async fn get_thumbnail(&self, video_id: &Uuid) -> Result<StoredAsset, error::SystemError> {
        let video = self.get_video(video_id).await?;
        let key = video
            .thumbnail_url
            .as_deref()
            .and_then(|url| self.storage.key_for_url(url))
            .ok_or_else(|| error::SystemError::not_found("Thumbnail not found"))?;

        let body = self
            .storage
            .get(key)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Thumbnail not found"))?;

        Ok(StoredAsset { content_type: content_type_for_key(key), body })
    }

    pub async fn get_asset(&self, key: &str) -> Result<StoredAsset, error::SystemError> {
        let body = self
            .storage
            .get(key)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))?;
        Ok(StoredAsset { content_type: content_type_for_key(key), body })
    }

    // The asset is already published when this runs. A failed write leaves it
    // orphaned until the next upload to the same key replaces it.
    async fn save(&self, video: VideoEntity, key: &str) -> Result<VideoEntity, error::SystemError> {
        match self.video_repo.update(&video).await {
            Ok(saved) => {
                info!("Video {} metadata updated with {}", saved.id, key);
                Ok(saved)
            }
            Err(e) => {
                error!("Metadata update failed for video {}, orphaned object {}: {}", video.id, key, e);
                Err(e)
            }
        }
    }
}

fn content_type_for_key(key: &str) -> String {
    mime_guess::from_path(key).first_or_octet_stream().essence_str().to_string()
}
