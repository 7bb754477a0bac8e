use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::common::{AspectRatio, GenerationKind};
use crate::error::{GenError, Result};

pub const DEFAULT_REFERENCE_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Accepts `data:<mime>;base64,<payload>` or a bare base64 payload.
    pub fn from_data_url(input: &str) -> Result<Self> {
        let input = input.trim();
        let (mime_type, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    GenError::InvalidRequest("malformed data URL for reference image".into())
                })?;
                let mime = header
                    .strip_suffix(";base64")
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or(DEFAULT_REFERENCE_MIME);
                (mime.to_string(), payload)
            }
            None => (DEFAULT_REFERENCE_MIME.to_string(), input),
        };

        let data = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| GenError::InvalidRequest(format!("reference image is not base64: {}", e)))?;

        Ok(Self { data, mime_type })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub kind: GenerationKind,
    pub aspect_ratio: AspectRatio,
    pub reference_image: Option<ReferenceImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, kind: GenerationKind) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
            aspect_ratio: kind.default_aspect_ratio(),
            reference_image: None,
        }
    }

    pub fn image(prompt: impl Into<String>) -> Self {
        Self::new(prompt, GenerationKind::Image)
    }

    pub fn video(prompt: impl Into<String>) -> Self {
        Self::new(prompt, GenerationKind::Video)
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_reference_image(mut self, image: ReferenceImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GenError::InvalidRequest("prompt must not be empty".into()));
        }
        if !self.aspect_ratio.is_allowed_for(self.kind) {
            return Err(GenError::UnsupportedAspectRatio {
                kind: self.kind,
                ratio: self.aspect_ratio,
            });
        }
        Ok(())
    }
}
