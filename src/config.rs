use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::access::{first_set_var, API_KEY_VARS};
use crate::executor::PollPolicy;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct GenConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: Option<u32>,
    pub poll_deadline: Option<Duration>,
    pub history_path: Option<PathBuf>,
    pub artifact_dir: Option<PathBuf>,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            poll_deadline: None,
            history_path: None,
            artifact_dir: None,
        }
    }
}

impl GenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = first_set_var(API_KEY_VARS);
        let base_url = env::var("GEN_BASE_URL").unwrap_or(defaults.base_url);
        let image_model = env::var("GEN_IMAGE_MODEL").unwrap_or(defaults.image_model);
        let video_model = env::var("GEN_VIDEO_MODEL").unwrap_or(defaults.video_model);
        let poll_interval = env::var("GEN_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|secs| *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(defaults.poll_interval);
        let max_poll_attempts = env::var("GEN_MAX_POLL_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok());
        let poll_deadline = env::var("GEN_POLL_DEADLINE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);
        let history_path = env::var("GEN_HISTORY_PATH").ok().map(PathBuf::from);
        let artifact_dir = env::var("GEN_ARTIFACT_DIR").ok().map(PathBuf::from);

        GenConfig {
            api_key,
            base_url,
            image_model,
            video_model,
            poll_interval,
            max_poll_attempts,
            poll_deadline,
            history_path,
            artifact_dir,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, image_model: impl Into<String>, video_model: impl Into<String>) -> Self {
        self.image_model = image_model.into();
        self.video_model = video_model.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = Some(attempts);
        self
    }

    pub fn with_poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }

    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
            deadline: self.poll_deadline,
        }
    }
}
