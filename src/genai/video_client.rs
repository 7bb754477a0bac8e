use crate::{
    access::Credential,
    error::{GenError, Result, TransportErrorKind},
    models::{Operation, VideoGenerationPayload},
};
use reqwest::{header::CONTENT_TYPE, Client, Url};

use super::{check_status, network_error, read_json, API_KEY_HEADER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct VideoClient {
    client: Client,
    base_url: String,
}

impl VideoClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn submit(
        &self,
        payload: &VideoGenerationPayload,
        credential: &Credential,
    ) -> Result<Operation> {
        let url = format!("{}/models/{}:predictLongRunning", self.base_url, payload.model);

        log::info!("Submitting video job to model: {}", payload.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credential.expose())
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response).await?;
        let operation: Operation = read_json(response).await?;
        log::info!("Video operation started: {}", operation.name);
        Ok(operation)
    }

    pub async fn refresh(&self, operation: &Operation, credential: &Credential) -> Result<Operation> {
        if operation.name.is_empty() {
            return Err(GenError::transport(
                TransportErrorKind::Decode,
                None,
                "operation has no name to poll",
            ));
        }

        let url = format!("{}/{}", self.base_url, operation.name.trim_start_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, credential.expose())
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response).await?;
        read_json(response).await
    }

    /// Downloads the finished video. The key goes in the `key` query parameter
    /// because the file host does not accept the header.
    pub async fn fetch(&self, uri: &str, credential: &Credential) -> Result<FetchedArtifact> {
        let mut url = Url::parse(uri).map_err(|e| {
            GenError::transport(
                TransportErrorKind::Decode,
                None,
                format!("invalid video URI {}: {}", uri, e),
            )
        })?;
        url.query_pairs_mut().append_pair("key", credential.expose());

        log::info!("Fetching video artifact");

        let response = self.client.get(url).send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Video fetch failed with status {}", status);
            return Err(GenError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let data = response.bytes().await.map_err(network_error)?.to_vec();

        Ok(FetchedArtifact { data, content_type })
    }
}
