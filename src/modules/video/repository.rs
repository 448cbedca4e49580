use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{model::InsertVideo, schema::VideoEntity},
};

#[async_trait::async_trait]
pub trait VideoRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::SystemError>;

    async fn find_by_user(&self, user_id: &Uuid) -> Result<Vec<VideoEntity>, error::SystemError>;

    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::SystemError>;

    /// Writes the whole record back, inserting it if absent.
    async fn update(&self, video: &VideoEntity) -> Result<VideoEntity, error::SystemError>;
}
