// src/services/upload_validator.rs
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use image::ImageFormat;
use log::{debug, warn};
use tokio::io::AsyncReadExt;

use crate::config::MAX_UPLOAD_BYTES;
use crate::errors::ValidationError;
use crate::models::{SelectedFile, UploadedAsset};

const OCTET_STREAM: &str = "application/octet-stream";

pub struct UploadValidator {
    max_bytes: u64,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}

impl UploadValidator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Size and type gate; runs before anything is read from disk.
    pub fn check(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        if file.size_bytes > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes: file.size_bytes,
                limit: self.max_bytes,
            });
        }

        if !file.mime_type.starts_with("image/") {
            return Err(ValidationError::WrongType {
                mime_type: file.mime_type.clone(),
            });
        }

        Ok(())
    }

    /// Checks the selection, then reads it and builds the preview data URI.
    pub async fn validate(&self, file: &SelectedFile) -> Result<UploadedAsset, ValidationError> {
        if let Err(e) = self.check(file) {
            warn!("Rejected {}: {:?}", file.file_name, e);
            return Err(e);
        }

        let raw = tokio::fs::read(&file.path).await.map_err(|e| {
            ValidationError::Unreadable(format!("{}: {}", file.path.display(), e))
        })?;

        // The file may have changed since it was selected.
        let size_bytes = raw.len() as u64;
        if size_bytes > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes,
                limit: self.max_bytes,
            });
        }

        let preview_data_uri = data_uri(&file.mime_type, &raw);
        debug!("Staged {} ({} bytes)", file.file_name, size_bytes);

        Ok(UploadedAsset {
            file_name: file.file_name.clone(),
            raw: Bytes::from(raw),
            preview_data_uri,
            size_bytes,
            mime_type: file.mime_type.clone(),
        })
    }

    /// Describes a file on disk the way a file picker would: name, size and a
    /// content-sniffed MIME type.
    pub async fn select_path(&self, path: &Path) -> Result<SelectedFile, ValidationError> {
        let unreadable = |e: std::io::Error| {
            ValidationError::Unreadable(format!("{}: {}", path.display(), e))
        };

        let metadata = tokio::fs::metadata(path).await.map_err(unreadable)?;
        let mut file = tokio::fs::File::open(path).await.map_err(unreadable)?;
        let mut header = [0u8; 32];
        let read = file.read(&mut header).await.map_err(unreadable)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(SelectedFile {
            path: path.to_path_buf(),
            file_name,
            mime_type: sniff_mime_type(&header[..read]),
            size_bytes: metadata.len(),
        })
    }
}

pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(data)
    )
}

pub fn sniff_mime_type(header: &[u8]) -> String {
    let Ok(format) = image::guess_format(header) else {
        return OCTET_STREAM.to_string();
    };

    match format {
        ImageFormat::Png => "image/png".to_string(),
        ImageFormat::Jpeg => "image/jpeg".to_string(),
        ImageFormat::Gif => "image/gif".to_string(),
        ImageFormat::WebP => "image/webp".to_string(),
        ImageFormat::Bmp => "image/bmp".to_string(),
        ImageFormat::Tiff => "image/tiff".to_string(),
        ImageFormat::Ico => "image/x-icon".to_string(),
        ImageFormat::Avif => "image/avif".to_string(),
        other => format!("image/x-{}", format!("{:?}", other).to_lowercase()),
    }
}
