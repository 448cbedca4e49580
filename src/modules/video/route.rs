use actix_web::web;

use crate::modules::video::{handle, repository::VideoRepository};

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: VideoRepository + Send + Sync + 'static,
{
    cfg.service(
        web::resource("/videos")
            .route(web::get().to(handle::list_videos::<R>))
            .route(web::post().to(handle::create_video::<R>)),
    )
    .service(web::resource("/videos/{video_id}").route(web::get().to(handle::get_video::<R>)))
    .service(
        web::resource("/thumbnails/{video_id}").route(web::get().to(handle::get_thumbnail::<R>)),
    )
    .service(
        web::resource("/thumbnail_upload/{video_id}")
            .route(web::post().to(handle::upload_thumbnail::<R>)),
    )
    .service(
        web::resource("/video_upload/{video_id}").route(web::post().to(handle::upload_video::<R>)),
    );
}

pub fn configure_assets<R>(cfg: &mut web::ServiceConfig)
where
    R: VideoRepository + Send + Sync + 'static,
{
    cfg.service(web::resource("/assets/{key:.*}").route(web::get().to(handle::get_asset::<R>)));
}
