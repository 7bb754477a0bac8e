use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{AspectRatio, GenerationKind};

pub const SHORT_ID_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub prompt: String,
    pub kind: GenerationKind,
    pub aspect_ratio: AspectRatio,
    pub artifact_reference: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        prompt: impl Into<String>,
        kind: GenerationKind,
        aspect_ratio: AspectRatio,
        artifact_reference: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: short_id(),
            prompt: prompt.into(),
            kind,
            aspect_ratio,
            artifact_reference: artifact_reference.into(),
            created_at,
        }
    }
}

/// Seven uppercase alphanumerics, drawn from a v4 uuid.
pub fn short_id() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .to_ascii_uppercase()
        .chars()
        .take(SHORT_ID_LEN)
        .collect()
}
