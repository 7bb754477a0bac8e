//! Runs a normalized request to completion.
//!
//! Images come back in the submit response. Videos come back as a
//! long-running [`Operation`] that is re-fetched every [`PollPolicy::interval`]
//! until it reports `done`, after which the video is downloaded from the URI
//! it names. Nothing is retried: the first error ends the job.

use std::future::Future;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    access::Credential,
    config::DEFAULT_POLL_INTERVAL,
    error::{GenError, Result, TransportErrorKind},
    genai::GenerativeTransport,
    models::{
        Artifact, GenerationKind, ImageGenerationPayload, Operation, TransportRequest,
        VideoGenerationPayload, IMAGE_MIME, VIDEO_MIME,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Submitting,
    Polling { attempt: u32 },
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// How the video poll loop waits. Unbounded unless `max_attempts` or
/// `deadline` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

pub struct JobExecutor<T> {
    transport: T,
    policy: PollPolicy,
    state: watch::Sender<JobState>,
}

impl<T: GenerativeTransport> JobExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, PollPolicy::default())
    }

    pub fn with_policy(transport: T, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self {
            transport,
            policy,
            state,
        }
    }

    /// Publishes transitions on an existing channel instead of a private one.
    pub fn with_state_channel(mut self, state: watch::Sender<JobState>) -> Self {
        self.state = state;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    pub async fn execute(&self, request: &TransportRequest, credential: &Credential) -> Result<Artifact> {
        self.execute_with_cancel(request, credential, &CancellationToken::new())
            .await
    }

    pub async fn execute_with_cancel(
        &self,
        request: &TransportRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<Artifact> {
        self.set_state(JobState::Submitting);

        let outcome = match request {
            TransportRequest::Image(payload) => self.run_image(payload, credential, cancel).await,
            TransportRequest::Video(payload) => self.run_video(payload, credential, cancel).await,
        };

        match &outcome {
            Ok(artifact) => {
                log::info!(
                    "✅ {} job completed ({} bytes, {})",
                    request.kind(),
                    artifact.len(),
                    artifact.mime_type
                );
                self.set_state(JobState::Completed);
            }
            Err(e) => {
                log::error!("❌ {} job failed: {}", request.kind(), e);
                self.set_state(JobState::Failed);
            }
        }

        outcome
    }

    async fn run_image(
        &self,
        payload: &ImageGenerationPayload,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<Artifact> {
        let response = guarded(cancel, self.transport.generate_content(payload, credential)).await?;

        let Some(inline) = response.first_inline_data() else {
            let finish_reason = response.finish_reason();
            log::warn!(
                "Image response carried no inline data (finish reason: {})",
                finish_reason.as_deref().unwrap_or("none")
            );
            return Err(GenError::EmptyResult { finish_reason });
        };

        let data = STANDARD.decode(inline.data.as_bytes()).map_err(|e| {
            GenError::transport(
                TransportErrorKind::Decode,
                None,
                format!("image payload is not base64: {}", e),
            )
        })?;

        Ok(Artifact::new(GenerationKind::Image, data, IMAGE_MIME))
    }

    async fn run_video(
        &self,
        payload: &VideoGenerationPayload,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<Artifact> {
        let operation = guarded(cancel, self.transport.submit_video(payload, credential)).await?;
        let operation = self.poll_until_done(operation, credential, cancel).await?;

        if let Some(error) = &operation.error {
            return Err(GenError::OperationFailed {
                code: error.code,
                message: error.message.clone(),
            });
        }

        let uri = operation.first_video_uri().ok_or(GenError::VoidResult)?;
        let fetched = guarded(cancel, self.transport.fetch_artifact(uri, credential)).await?;

        let mime_type = fetched
            .content_type
            .filter(|ct| ct.starts_with("video/"))
            .unwrap_or_else(|| VIDEO_MIME.to_string());

        Ok(Artifact::new(GenerationKind::Video, fetched.data, mime_type))
    }

    async fn poll_until_done(
        &self,
        mut operation: Operation,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<Operation> {
        let started = Instant::now();
        let deadline_at = self.policy.deadline.map(|deadline| started + deadline);
        let mut attempts: u32 = 0;

        while !operation.done {
            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    return Err(poll_timeout(attempts, started));
                }
            }
            if deadline_at.is_some_and(|at| Instant::now() >= at) {
                return Err(poll_timeout(attempts, started));
            }

            attempts += 1;
            self.set_state(JobState::Polling { attempt: attempts });
            log::debug!(
                "Operation {} pending; polling again in {:?} (attempt {})",
                operation.name,
                self.policy.interval,
                attempts
            );

            let wait = guarded(cancel, async {
                tokio::time::sleep(self.policy.interval).await;
                Ok::<(), GenError>(())
            });
            within(deadline_at, wait)
                .await
                .ok_or_else(|| poll_timeout(attempts, started))??;

            let refresh = guarded(cancel, self.transport.refresh_operation(&operation, credential));
            operation = within(deadline_at, refresh)
                .await
                .ok_or_else(|| poll_timeout(attempts, started))??;
        }

        log::info!(
            "Operation {} finished after {} poll(s) in {:.1}s",
            operation.name,
            attempts,
            started.elapsed().as_secs_f64()
        );
        Ok(operation)
    }

    fn set_state(&self, state: JobState) {
        self.state.send_replace(state);
    }
}

fn poll_timeout(attempts: u32, started: Instant) -> GenError {
    let elapsed = started.elapsed();
    log::warn!("Gave up polling after {} attempt(s) in {:.1}s", attempts, elapsed.as_secs_f64());
    GenError::PollTimeout { attempts, elapsed }
}

/// `None` once `deadline_at` passes with `call` still pending.
async fn within<F: Future>(deadline_at: Option<Instant>, call: F) -> Option<F::Output> {
    match deadline_at {
        Some(at) => tokio::time::timeout_at(at, call).await.ok(),
        None => Some(call.await),
    }
}

async fn guarded<F, R>(cancel: &CancellationToken, call: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(GenError::Cancelled),
        result = call => result,
    }
}
