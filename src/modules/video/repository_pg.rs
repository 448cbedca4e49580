use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{model::InsertVideo, repository::VideoRepository, schema::VideoEntity},
};

#[derive(Clone)]
pub struct VideoRepositoryPg {
    pool: sqlx::PgPool,
}

impl VideoRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for VideoRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::SystemError> {
        let video = sqlx::query_as::<_, VideoEntity>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn find_by_user(&self, user_id: &Uuid) -> Result<Vec<VideoEntity>, error::SystemError> {
        let videos = sqlx::query_as::<_, VideoEntity>(
            "SELECT * FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }

    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let entity = sqlx::query_as::<_, VideoEntity>(
            r#"
            INSERT INTO videos (id, user_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn update(&self, video: &VideoEntity) -> Result<VideoEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, VideoEntity>(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                user_id       = EXCLUDED.user_id,
                title         = EXCLUDED.title,
                description   = EXCLUDED.description,
                thumbnail_url = EXCLUDED.thumbnail_url,
                video_url     = EXCLUDED.video_url,
                updated_at    = NOW()
            RETURNING *
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }
}
