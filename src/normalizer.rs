//! Turns user-facing [`GenerationRequest`]s into wire payloads.
//!
//! Normalization is pure: no clock, no randomness, no I/O. The same input
//! always yields an equal [`TransportRequest`].

use crate::config::{DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};
use crate::models::{
    Content, GenerationKind, GenerationRequest, ImageConfig, ImageGenerationConfig,
    ImageGenerationPayload, Part, SafetySetting, TransportRequest, VideoGenerationPayload,
    VideoImage, VideoInstance, VideoParameters, HARM_CATEGORIES, THRESHOLD_BLOCK_NONE,
};

pub const IMAGE_DIRECTIVE: &str =
    "Generate a high-fidelity image with maximum detail and sharp composition: ";
pub const VIDEO_DIRECTIVE: &str = "Produce a smooth, cinematic motion sequence: ";

pub const VIDEO_RESOLUTION: &str = "720p";
pub const VIDEO_COUNT: u32 = 1;

/// Normalizes against the default model identifiers.
pub fn normalize(request: &GenerationRequest) -> TransportRequest {
    normalize_with_models(request, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL)
}

/// Callers must have validated `request` first; an empty prompt is passed
/// through untouched.
pub fn normalize_with_models(
    request: &GenerationRequest,
    image_model: &str,
    video_model: &str,
) -> TransportRequest {
    match request.kind {
        GenerationKind::Image => TransportRequest::Image(image_payload(request, image_model)),
        GenerationKind::Video => TransportRequest::Video(video_payload(request, video_model)),
    }
}

fn image_payload(request: &GenerationRequest, model: &str) -> ImageGenerationPayload {
    let mut parts = Vec::with_capacity(2);

    if let Some(image) = &request.reference_image {
        parts.push(Part::inline(image.mime_type.clone(), image.to_base64()));
    }
    parts.push(Part::text(format!("{}{}", IMAGE_DIRECTIVE, request.prompt)));

    ImageGenerationPayload {
        model: model.to_string(),
        contents: vec![Content { parts }],
        generation_config: ImageGenerationConfig {
            image_config: ImageConfig {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
            },
        },
        safety_settings: permissive_safety_settings(),
    }
}

fn video_payload(request: &GenerationRequest, model: &str) -> VideoGenerationPayload {
    let image = request.reference_image.as_ref().map(|image| VideoImage {
        image_bytes: image.to_base64(),
        mime_type: image.mime_type.clone(),
    });

    VideoGenerationPayload {
        model: model.to_string(),
        instances: vec![VideoInstance {
            prompt: format!("{}{}", VIDEO_DIRECTIVE, request.prompt),
            image,
        }],
        parameters: VideoParameters {
            number_of_videos: VIDEO_COUNT,
            resolution: VIDEO_RESOLUTION.to_string(),
            aspect_ratio: request.aspect_ratio.coerce_for_video().as_str().to_string(),
        },
    }
}

fn permissive_safety_settings() -> Vec<SafetySetting> {
    HARM_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: THRESHOLD_BLOCK_NONE.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, ReferenceImage};

    fn reference() -> ReferenceImage {
        ReferenceImage::new(vec![0x89, 0x50, 0x4e, 0x47], "image/jpeg")
    }

    #[test]
    fn image_parts_put_reference_before_prompt() {
        for ratio in AspectRatio::allowed_for(GenerationKind::Image) {
            let request = GenerationRequest::image("a lighthouse at dusk")
                .with_aspect_ratio(*ratio)
                .with_reference_image(reference());

            let TransportRequest::Image(payload) = normalize(&request) else {
                panic!("expected image payload");
            };

            let parts = &payload.contents[0].parts;
            assert_eq!(parts.len(), 2);
            let inline = parts[0].inline_data.as_ref().expect("inline part first");
            assert_eq!(inline.mime_type, "image/jpeg");
            assert_eq!(inline.data, "iVBORw==");
            assert_eq!(
                parts[1].text.as_deref(),
                Some(format!("{}a lighthouse at dusk", IMAGE_DIRECTIVE).as_str())
            );
            assert_eq!(payload.generation_config.image_config.aspect_ratio, ratio.as_str());
        }
    }

    #[test]
    fn image_without_reference_has_only_text() {
        let TransportRequest::Image(payload) = normalize(&GenerationRequest::image("fog")) else {
            panic!("expected image payload");
        };
        assert_eq!(payload.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(payload.contents[0].parts.len(), 1);
        assert!(payload.contents[0].parts[0].inline_data.is_none());
    }

    #[test]
    fn safety_settings_disable_every_category() {
        let TransportRequest::Image(payload) = normalize(&GenerationRequest::image("fog")) else {
            panic!("expected image payload");
        };
        assert_eq!(payload.safety_settings.len(), HARM_CATEGORIES.len());
        assert!(payload
            .safety_settings
            .iter()
            .all(|setting| setting.threshold == THRESHOLD_BLOCK_NONE));
    }

    #[test]
    fn video_ratio_is_wide_or_tall() {
        for ratio in AspectRatio::allowed_for(GenerationKind::Image) {
            let request = GenerationRequest::video("waves").with_aspect_ratio(*ratio);
            let TransportRequest::Video(payload) = normalize(&request) else {
                panic!("expected video payload");
            };
            let expected = if *ratio == AspectRatio::Landscape { "16:9" } else { "9:16" };
            assert_eq!(payload.aspect_ratio(), expected);
        }
    }

    #[test]
    fn video_reference_is_separate_from_prompt() {
        let request = GenerationRequest::video("waves").with_reference_image(reference());
        let TransportRequest::Video(payload) = normalize(&request) else {
            panic!("expected video payload");
        };

        assert_eq!(payload.model, DEFAULT_VIDEO_MODEL);
        assert_eq!(payload.prompt(), Some(format!("{}waves", VIDEO_DIRECTIVE).as_str()));
        assert_eq!(payload.parameters.number_of_videos, 1);
        assert_eq!(payload.parameters.resolution, "720p");

        let image = payload.instances[0].image.as_ref().expect("image field");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.image_bytes, "iVBORw==");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["instances"][0]["image"]["imageBytes"], "iVBORw==");
        assert_eq!(json["parameters"]["numberOfVideos"], 1);
    }

    #[test]
    fn normalize_is_idempotent() {
        let request = GenerationRequest::image("glass forest")
            .with_aspect_ratio(AspectRatio::StandardPortrait)
            .with_reference_image(reference());
        assert_eq!(normalize(&request), normalize(&request));

        let video = GenerationRequest::video("glass forest");
        assert_eq!(normalize(&video), normalize(&video));
    }

    #[test]
    fn custom_models_are_used() {
        let request = GenerationRequest::video("x");
        let normalized = normalize_with_models(&request, "img-m", "vid-m");
        assert_eq!(normalized.model(), "vid-m");
        assert_eq!(normalized.kind(), GenerationKind::Video);
    }
}
