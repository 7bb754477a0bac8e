use super::common::GenerationKind;
use super::image::ImageGenerationPayload;
use super::video::VideoGenerationPayload;

/// Normalized payload ready to be sent to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportRequest {
    Image(ImageGenerationPayload),
    Video(VideoGenerationPayload),
}

impl TransportRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            TransportRequest::Image(_) => GenerationKind::Image,
            TransportRequest::Video(_) => GenerationKind::Video,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            TransportRequest::Image(payload) => &payload.model,
            TransportRequest::Video(payload) => &payload.model,
        }
    }
}
