use std::path::PathBuf;

/// Hard ceiling for thumbnail uploads (10 MiB).
pub const MAX_THUMBNAIL_BYTES: u64 = 10 << 20;
/// Hard ceiling for video uploads (1 GiB).
pub const MAX_VIDEO_BYTES: u64 = 1 << 30;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    S3 { bucket: String, region: String, endpoint: Option<String> },
    Local { root: PathBuf, base_url: String },
}

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
    pub scratch_dir: PathBuf,
    pub max_thumbnail_bytes: u64,
    pub max_video_bytes: u64,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var::<u16>("PORT", 8080);

        let storage = match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("s3") => StorageBackend::S3 {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3"),
                region: std::env::var("S3_REGION")
                    .expect("S3_REGION must be set when STORAGE_BACKEND=s3"),
                endpoint: std::env::var("S3_ENDPOINT").ok(),
            },
            Ok("local") | Err(_) => StorageBackend::Local {
                root: std::env::var("ASSETS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./assets")),
                base_url: std::env::var("ASSETS_BASE_URL")
                    .unwrap_or_else(|_| format!("http://{ip}:{port}/assets")),
            },
            Ok(other) => panic!("STORAGE_BACKEND must be `s3` or `local`, got `{other}`"),
        };

        let ffprobe_path = std::env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string());
        let probe_timeout_secs = parse_var::<u64>("PROBE_TIMEOUT_SECS", 30);
        let scratch_dir = std::env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let max_thumbnail_bytes = parse_var::<u64>("MAX_THUMBNAIL_BYTES", MAX_THUMBNAIL_BYTES);
        let max_video_bytes = parse_var::<u64>("MAX_VIDEO_BYTES", MAX_VIDEO_BYTES);

        Env {
            jwt_secret,
            database_url,
            frontend_url,
            ip,
            port,
            storage,
            ffprobe_path,
            probe_timeout_secs,
            scratch_dir,
            max_thumbnail_bytes,
            max_video_bytes,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
