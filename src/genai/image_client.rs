use crate::{
    access::Credential,
    error::Result,
    models::{ImageGenerationPayload, ImageGenerationResponse},
};
use reqwest::Client;

use super::{check_status, network_error, read_json, API_KEY_HEADER};

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
}

impl ImageClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    pub async fn generate(
        &self,
        payload: &ImageGenerationPayload,
        credential: &Credential,
    ) -> Result<ImageGenerationResponse> {
        let url = self.endpoint(&payload.model);

        log::info!("Generating image with model: {}", payload.model);
        log::debug!(
            "Image request: {} part(s), aspect ratio {}",
            payload.contents.first().map(|c| c.parts.len()).unwrap_or(0),
            payload.generation_config.image_config.aspect_ratio
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credential.expose())
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response).await?;
        read_json(response).await
    }
}
