pub mod access;
pub mod config;
pub mod error;
pub mod executor;
pub mod genai;
pub mod history;
pub mod logger;
pub mod models;
pub mod normalizer;
pub mod studio;

pub use access::{AccessGate, Credential, EnvAccessGate, StaticAccessGate};
pub use config::GenConfig;
pub use error::{GenError, Result, TransportErrorKind, UserAdvice};
pub use executor::{JobExecutor, JobState, PollPolicy};
pub use genai::{GenerativeTransport, HttpTransport};
pub use history::{History, HistoryStore, JsonFileHistory, MemoryHistory};
pub use models::*;
pub use normalizer::{normalize, normalize_with_models};
pub use studio::{GenerationOutcome, Studio};
pub use tokio_util::sync::CancellationToken;
