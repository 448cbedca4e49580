use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse};

use crate::api::{error, success};
use crate::middlewares::AuthUser;
use crate::modules::media::upload::materialize;
use crate::modules::video::{
    model::{CreateVideoModel, VideoResponse},
    repository::VideoRepository,
    service::{StoredAsset, VideoService},
};
use crate::utils::{ResourceId, ValidatedJson};

fn stream_asset(asset: StoredAsset) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, asset.content_type))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .streaming(asset.body)
}

/// Create video draft handler
pub async fn create_video<R>(
    user: AuthUser,
    body: ValidatedJson<CreateVideoModel>,
    service: web::Data<VideoService<R>>,
) -> Result<success::Success<VideoResponse>, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    let video = service.create_video(user.id, body.0).await?;
    Ok(success::Success::created(Some(video.into())).message("Video created successfully"))
}

/// List the caller's videos handler
pub async fn list_videos<R>(
    user: AuthUser,
    service: web::Data<VideoService<R>>,
) -> Result<success::Success<Vec<VideoResponse>>, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    let videos = service.list_videos(&user.id).await?;
    let videos = videos.into_iter().map(VideoResponse::from).collect();
    Ok(success::Success::ok(Some(videos)))
}

/// Get video metadata handler
pub async fn get_video<R>(
    video_id: ResourceId,
    service: web::Data<VideoService<R>>,
) -> Result<success::Success<VideoResponse>, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    let video = service.get_video(&video_id.0).await?;
    Ok(success::Success::ok(Some(video.into())))
}

/// Upload thumbnail handler
pub async fn upload_thumbnail<R>(
    video_id: ResourceId,
    user: AuthUser,
    mut payload: Multipart,
    service: web::Data<VideoService<R>>,
) -> Result<success::Success<VideoResponse>, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    log::info!("Uploading thumbnail for video {} by user {}", video_id.0, user.id);

    let video = service.find_owned(&video_id.0, &user.id).await?;
    let upload = materialize(&mut payload, &service.thumbnail_policy(), service.scratch_dir()).await?;
    let video = service.publish_thumbnail(video, upload).await?;

    Ok(success::Success::ok(Some(video.into())).message("Thumbnail uploaded successfully"))
}

/// Fetch thumbnail handler
pub async fn get_thumbnail<R>(
    video_id: ResourceId,
    service: web::Data<VideoService<R>>,
) -> Result<HttpResponse, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    let thumbnail = service.get_thumbnail(&video_id.0).await?;
    Ok(stream_asset(thumbnail))
}

/// Upload video handler
pub async fn upload_video<R>(
    video_id: ResourceId,
    user: AuthUser,
    mut payload: Multipart,
    service: web::Data<VideoService<R>>,
) -> Result<success::Success<VideoResponse>, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    log::info!("Uploading video {} by user {}", video_id.0, user.id);

    let video = service.find_owned(&video_id.0, &user.id).await?;
    let upload = materialize(&mut payload, &service.video_policy(), service.scratch_dir()).await?;
    let video = service.publish_video(video, upload).await?;

    Ok(success::Success::ok(Some(video.into())).message("Video uploaded successfully"))
}

/// Serve a stored asset by key
pub async fn get_asset<R>(
    key: web::Path<String>,
    service: web::Data<VideoService<R>>,
) -> Result<HttpResponse, error::Error>
where
    R: VideoRepository + Send + Sync + 'static,
{
    let key = key.into_inner();
    if key.is_empty() || key.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(error::Error::bad_request("Invalid asset key"));
    }
    let asset = service.get_asset(&key).await?;
    Ok(stream_asset(asset))
}
