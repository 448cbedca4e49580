use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::video::schema::VideoEntity;

#[derive(Deserialize, Validate)]
pub struct CreateVideoModel {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description cannot exceed 5000 characters"))]
    pub description: Option<String>,
}

pub struct InsertVideo {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<VideoEntity> for VideoResponse {
    fn from(entity: VideoEntity) -> Self {
        VideoResponse {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title,
            description: entity.description,
            thumbnail_url: entity.thumbnail_url,
            video_url: entity.video_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Per-kind upload ceilings in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub thumbnail: u64,
    pub video: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            thumbnail: crate::constants::MAX_THUMBNAIL_BYTES,
            video: crate::constants::MAX_VIDEO_BYTES,
        }
    }
}
