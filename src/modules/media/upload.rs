use std::path::Path;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::api::error;

/// Which multipart field to read and what it may contain.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub field: &'static str,
    pub max_size: u64,
    pub allowed_types: &'static [&'static str],
}

pub const THUMBNAIL_TYPES: &[&str] = &["image/jpeg", "image/png"];
pub const VIDEO_TYPES: &[&str] = &["video/mp4"];

impl UploadPolicy {
    pub fn thumbnail(max_size: u64) -> Self {
        Self { field: "thumbnail", max_size, allowed_types: THUMBNAIL_TYPES }
    }

    pub fn video(max_size: u64) -> Self {
        Self { field: "video", max_size, allowed_types: VIDEO_TYPES }
    }
}

/// An upload written to a scratch file. The file is removed when this is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    content_type: String,
    size: u64,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    #[cfg(test)]
    pub async fn from_bytes(
        scratch_dir: &Path,
        content_type: &str,
        data: &[u8],
    ) -> std::io::Result<Self> {
        let file = tempfile::Builder::new().prefix("upload-").tempfile_in(scratch_dir)?;
        tokio::fs::write(file.path(), data).await?;
        Ok(Self { file, content_type: content_type.to_string(), size: data.len() as u64 })
    }
}

/// Finds `policy.field` in the form and streams it into a temporary file in `scratch_dir`.
pub async fn materialize(
    payload: &mut Multipart,
    policy: &UploadPolicy,
    scratch_dir: &Path,
) -> Result<UploadedFile, error::SystemError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| error::SystemError::bad_request(format!("Malformed form data: {e}")))?
    {
        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        if content_disposition.get_name() != Some(policy.field) {
            continue;
        }
        if content_disposition.get_filename().is_none() {
            return Err(error::SystemError::bad_request(format!(
                "Field '{}' must be a file",
                policy.field
            )));
        }

        let content_type = field.content_type().map(|m| m.essence_str().to_string()).unwrap_or_default();
        if !policy.allowed_types.contains(&content_type.as_str()) {
            return Err(error::SystemError::bad_request(format!(
                "Unsupported file type '{}'",
                content_type
            )));
        }

        let temp = tempfile::Builder::new().prefix("upload-").tempfile_in(scratch_dir)?;
        let mut writer = tokio::fs::File::from_std(temp.reopen()?);
        let mut size: u64 = 0;

        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| error::SystemError::bad_request(format!("Malformed form data: {e}")))?
        {
            size += chunk.len() as u64;
            if size > policy.max_size {
                return Err(error::SystemError::bad_request(format!(
                    "File size exceeds maximum allowed size of {} bytes",
                    policy.max_size
                )));
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        log::info!("Materialized {} upload ({} bytes) at {}", policy.field, size, temp.path().display());

        return Ok(UploadedFile { file: temp, content_type, size });
    }

    Err(error::SystemError::bad_request(format!("Missing '{}' file in form data", policy.field)))
}
