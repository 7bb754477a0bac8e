use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::{
    access::{AccessGate, Credential},
    config::GenConfig,
    error::{GenError, Result},
    executor::{JobExecutor, JobState},
    genai::HttpTransport,
    history::{History, JsonFileHistory},
    logger,
    models::{
        short_id, Artifact, GenerationKind, GenerationRequest, GenerationResult, HistoryEntry,
    },
    normalizer::normalize_with_models,
};

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub result: GenerationResult,
    pub entry: HistoryEntry,
}

/// Front door for callers: validates, gates, runs one job and records it.
pub struct Studio {
    config: GenConfig,
    gate: Arc<dyn AccessGate>,
    history: Mutex<History>,
    state: watch::Sender<JobState>,
}

impl Studio {
    /// Opens the JSON history at `config.history_path`, or keeps history in
    /// memory when none is configured.
    pub async fn new(config: GenConfig, gate: Arc<dyn AccessGate>) -> Result<Self> {
        let history = match &config.history_path {
            Some(path) => History::open(Box::new(JsonFileHistory::new(path))).await?,
            None => History::in_memory(),
        };
        Ok(Self::with_history(config, gate, history))
    }

    pub fn with_history(config: GenConfig, gate: Arc<dyn AccessGate>, history: History) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self {
            config,
            gate,
            history: Mutex::new(history),
            state,
        }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn state(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.entries().to_vec()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome> {
        request.validate()?;
        let credential = self.acquire_credential(request.kind).await?;

        let _timer = logger::timer(&format!("{} generation", request.kind));

        // Built per job so a key granted since the last call takes effect.
        let transport = HttpTransport::new(&self.config.base_url)?;
        let executor = JobExecutor::with_policy(transport, self.config.poll_policy())
            .with_state_channel(self.state.clone());

        let transport_request =
            normalize_with_models(request, &self.config.image_model, &self.config.video_model);
        let artifact = executor
            .execute_with_cancel(&transport_request, &credential, cancel)
            .await?;

        let result = GenerationResult::new(artifact);
        let entry = self.build_entry(request, &result).await?;

        self.history.lock().await.record(entry.clone()).await?;
        log::info!("📝 Recorded {} as {}", request.kind, entry.id);

        Ok(GenerationOutcome { result, entry })
    }

    async fn acquire_credential(&self, kind: GenerationKind) -> Result<Credential> {
        if kind == GenerationKind::Video && !self.gate.has_selected_credential().await {
            self.gate.request_access().await;
            if !self.gate.has_selected_credential().await {
                return Err(GenError::AccessRequired);
            }
        }

        self.gate
            .credential()
            .await
            .or_else(|| self.config.api_key.clone().map(Credential::new))
            .filter(|credential| !credential.is_empty())
            .ok_or(GenError::AccessRequired)
    }

    async fn build_entry(
        &self,
        request: &GenerationRequest,
        result: &GenerationResult,
    ) -> Result<HistoryEntry> {
        let id = short_id();
        let artifact_reference = self.store_artifact(&id, &result.artifact).await?;

        Ok(HistoryEntry {
            id,
            prompt: request.prompt.clone(),
            kind: request.kind,
            aspect_ratio: request.aspect_ratio,
            artifact_reference,
            created_at: result.created_at,
        })
    }

    async fn store_artifact(&self, id: &str, artifact: &Artifact) -> Result<String> {
        match (&self.config.artifact_dir, artifact.kind) {
            (Some(dir), _) => {
                let path = artifact.save_to(dir, id).await?;
                log::info!("💾 Artifact saved to: {}", path.display());
                Ok(path.display().to_string())
            }
            (None, GenerationKind::Image) => Ok(artifact.to_data_url()),
            (None, GenerationKind::Video) => Ok(format!("memory:{}", id)),
        }
    }
}
