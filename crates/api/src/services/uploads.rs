//! Local storage for donation photos and clips.
//!
//! Files are content-addressed: the stored name is the SHA-256 of the bytes
//! plus an extension derived from the media type, so re-uploading the same
//! photo reuses one file. Bytes go to a temporary name first and are renamed
//! into place, so a stored name never holds a partial file.

use std::path::{Path, PathBuf};

use domain::models::MediaKind;
use persistence::entities::MediaKindDb;
use persistence::repositories::NewMedia;
use shared::crypto::sha256_hex_bytes;
use thiserror::Error;

use crate::config::UploadsConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("이미지는 최대 {0}개까지 업로드할 수 있습니다.")]
    TooManyFiles(usize),

    #[error("파일 크기는 {0}MB를 넘을 수 없습니다.")]
    FileTooLarge(usize),

    #[error("이미지 또는 동영상 파일만 업로드할 수 있습니다.")]
    UnsupportedType,

    #[error("빈 파일은 업로드할 수 없습니다.")]
    Empty,

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooManyFiles(_) | UploadError::UnsupportedType | UploadError::Empty => {
                ApiError::Validation(err.to_string())
            }
            UploadError::FileTooLarge(_) => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::Io(e) => ApiError::Internal(format!("Upload storage error: {}", e)),
        }
    }
}

/// An upload read from the request, not yet written to disk.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub kind: MediaKind,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Media rows for a donation plus the files this request created.
#[derive(Debug, Default)]
pub struct StoredUploads {
    pub media: Vec<NewMedia>,
    written: Vec<PathBuf>,
}

/// Writes accepted uploads below the configured directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_prefix: String,
    max_files: usize,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_files: config.max_files,
            max_file_bytes: config.max_file_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Checks one multipart file part and classifies it.
    ///
    /// `already_accepted` is the number of files taken from the request so far.
    pub fn inspect(
        &self,
        already_accepted: usize,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<PendingUpload, UploadError> {
        if already_accepted >= self.max_files {
            return Err(UploadError::TooManyFiles(self.max_files));
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_file_bytes {
            return Err(UploadError::FileTooLarge(self.max_file_bytes / (1024 * 1024)));
        }

        let mime = content_type
            .and_then(|ct| ct.parse::<mime_guess::mime::Mime>().ok())
            .filter(|m| m.type_() != mime_guess::mime::APPLICATION)
            .or_else(|| file_name.and_then(|name| mime_guess::from_path(name).first()))
            .ok_or(UploadError::UnsupportedType)?;

        let kind = if mime.type_() == mime_guess::mime::IMAGE {
            MediaKind::Image
        } else if mime.type_() == mime_guess::mime::VIDEO {
            MediaKind::Video
        } else {
            return Err(UploadError::UnsupportedType);
        };

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .or_else(|| {
                mime_guess::get_mime_extensions(&mime)
                    .and_then(|exts| exts.first())
                    .map(|ext| ext.to_string())
            })
            .unwrap_or_else(|| "bin".to_string());

        Ok(PendingUpload {
            kind,
            extension,
            bytes,
        })
    }

    /// Writes the uploads and returns them in order, ready to attach to a donation.
    ///
    /// If a write fails, files created earlier in the same call are removed.
    pub async fn store(&self, uploads: &[PendingUpload]) -> Result<StoredUploads, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut stored = StoredUploads::default();
        for upload in uploads {
            let file_name = format!("{}.{}", sha256_hex_bytes(&upload.bytes), upload.extension);
            let path = self.dir.join(&file_name);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                if let Err(e) = self.write_atomic(&file_name, &upload.bytes).await {
                    self.discard(&stored).await;
                    return Err(e);
                }
                stored.written.push(path);
            }
            stored.media.push(NewMedia {
                kind: MediaKindDb::from(upload.kind),
                url: self.public_url(&file_name),
            });
        }

        tracing::debug!(
            count = stored.media.len(),
            new_files = stored.written.len(),
            "Stored donation media"
        );
        Ok(stored)
    }

    /// Removes the files a `store` call created. Used when the donation
    /// insert fails after the media was written.
    pub async fn discard(&self, stored: &StoredUploads) {
        for path in &stored.written {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
            }
        }
    }

    async fn write_atomic(&self, file_name: &str, bytes: &[u8]) -> Result<(), UploadError> {
        let temp = self
            .dir
            .join(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4().simple()));
        let result = async {
            tokio::fs::write(&temp, bytes).await?;
            tokio::fs::rename(&temp, self.dir.join(file_name)).await
        }
        .await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix, file_name)
    }
}
