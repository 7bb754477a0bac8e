use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoGenerationPayload {
    #[serde(skip)]
    pub model: String,
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

impl VideoGenerationPayload {
    pub fn prompt(&self) -> Option<&str> {
        self.instances.first().map(|instance| instance.prompt.as_str())
    }

    pub fn aspect_ratio(&self) -> &str {
        &self.parameters.aspect_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    /// Base64 payload.
    pub image_bytes: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub number_of_videos: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

/// Handle to a long-running remote job. Only ever replaced by a fresh copy
/// fetched from the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_videos: Vec<GeneratedVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    /// URI of the first generated video. Accepts both the flattened
    /// `generatedVideos` shape and the raw `generateVideoResponse.generatedSamples`
    /// shape the REST API returns.
    pub fn first_video_uri(&self) -> Option<&str> {
        let response = self.response.as_ref()?;
        let first = response.generated_videos.first().or_else(|| {
            response
                .generate_video_response
                .as_ref()
                .and_then(|inner| inner.generated_samples.first())
        })?;

        first
            .video
            .as_ref()
            .and_then(|video| video.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_operation_defaults() {
        let op: Operation = serde_json::from_value(json!({"name": "models/veo/operations/1"})).unwrap();
        assert!(!op.done);
        assert!(op.first_video_uri().is_none());
    }

    #[test]
    fn reads_flattened_video_shape() {
        let op: Operation = serde_json::from_value(json!({
            "name": "op",
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": "https://files/v1?alt=media"}}]}
        }))
        .unwrap();
        assert_eq!(op.first_video_uri(), Some("https://files/v1?alt=media"));
    }

    #[test]
    fn reads_rest_video_shape() {
        let op: Operation = serde_json::from_value(json!({
            "name": "op",
            "done": true,
            "response": {
                "@type": "type.googleapis.com/google.ai.generativelanguage.v1beta.PredictLongRunningResponse",
                "generateVideoResponse": {"generatedSamples": [{"video": {"uri": "https://files/v2"}}]}
            }
        }))
        .unwrap();
        assert_eq!(op.first_video_uri(), Some("https://files/v2"));
    }

    #[test]
    fn empty_uri_is_absent() {
        let op: Operation = serde_json::from_value(json!({
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": ""}}]}
        }))
        .unwrap();
        assert!(op.first_video_uri().is_none());
    }
}
