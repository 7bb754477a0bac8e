pub mod image_client;
pub mod video_client;

use crate::{
    access::Credential,
    error::{GenError, Result, TransportErrorKind},
    models::{ImageGenerationPayload, ImageGenerationResponse, Operation, VideoGenerationPayload},
};
use async_trait::async_trait;
use reqwest::Client;

pub use image_client::ImageClient;
pub use video_client::{FetchedArtifact, VideoClient};

pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Calls the executor makes against the generation service. The credential
/// travels with every call instead of living inside the transport.
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    async fn generate_content(
        &self,
        payload: &ImageGenerationPayload,
        credential: &Credential,
    ) -> Result<ImageGenerationResponse>;

    async fn submit_video(
        &self,
        payload: &VideoGenerationPayload,
        credential: &Credential,
    ) -> Result<Operation>;

    /// Fetches the current state of `operation`, identified by its name.
    async fn refresh_operation(
        &self,
        operation: &Operation,
        credential: &Credential,
    ) -> Result<Operation>;

    async fn fetch_artifact(&self, uri: &str, credential: &Credential) -> Result<FetchedArtifact>;
}

/// reqwest-backed transport. Cheap to build; the studio makes a new one for
/// every job.
#[derive(Clone)]
pub struct HttpTransport {
    image_client: ImageClient,
    video_client: VideoClient,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GenError::Config(format!("failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            image_client: ImageClient::new(client.clone(), base_url.clone()),
            video_client: VideoClient::new(client, base_url),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn video(&self) -> &VideoClient {
        &self.video_client
    }
}

#[async_trait]
impl GenerativeTransport for HttpTransport {
    async fn generate_content(
        &self,
        payload: &ImageGenerationPayload,
        credential: &Credential,
    ) -> Result<ImageGenerationResponse> {
        self.image_client.generate(payload, credential).await
    }

    async fn submit_video(
        &self,
        payload: &VideoGenerationPayload,
        credential: &Credential,
    ) -> Result<Operation> {
        self.video_client.submit(payload, credential).await
    }

    async fn refresh_operation(
        &self,
        operation: &Operation,
        credential: &Credential,
    ) -> Result<Operation> {
        self.video_client.refresh(operation, credential).await
    }

    async fn fetch_artifact(&self, uri: &str, credential: &Credential) -> Result<FetchedArtifact> {
        self.video_client.fetch(uri, credential).await
    }
}

pub(crate) fn network_error(e: reqwest::Error) -> GenError {
    let kind = if e.is_decode() {
        TransportErrorKind::Decode
    } else {
        TransportErrorKind::Network
    };
    GenError::transport(kind, e.status().map(|s| s.as_u16()), e.to_string())
}

/// Passes 2xx responses through; anything else becomes a classified
/// transport error carrying the upstream message.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = error_body(status.as_u16(), response.text().await);
    log::error!("Generation service returned {}: {}", status, body);
    Err(GenError::from_status(status.as_u16(), &body))
}

/// The error body text, or a note naming why it could not be read.
fn error_body<E: std::fmt::Display>(status: u16, body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| {
        log::warn!("Could not read body of HTTP {} response: {}", status, e);
        format!("HTTP {} (body unreadable: {})", status, e)
    })
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let body = response.text().await.map_err(network_error)?;
    log::debug!("Generation service response: {} bytes", body.len());
    serde_json::from_str(&body)
        .map_err(|e| GenError::transport(TransportErrorKind::Decode, None, e.to_string()))
}
