use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::common::GenerationKind;
use crate::error::Result;

pub const IMAGE_MIME: &str = "image/png";
pub const VIDEO_MIME: &str = "video/mp4";

/// Final binary media produced by a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: GenerationKind,
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(kind: GenerationKind, data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            kind,
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.split(';').next().unwrap_or_default().trim() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "video/mp4" => "mp4",
            "video/webm" => "webm",
            "video/quicktime" => "mov",
            _ => match self.kind {
                GenerationKind::Image => "png",
                GenerationKind::Video => "mp4",
            },
        }
    }

    pub async fn save_to(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.{}", stem, self.file_extension()));
        tokio::fs::write(&path, &self.data).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub kind: GenerationKind,
    pub artifact: Artifact,
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            kind: artifact.kind,
            artifact,
            created_at: Utc::now(),
        }
    }
}
