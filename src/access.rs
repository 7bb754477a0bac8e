use async_trait::async_trait;
use std::env;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// API key handed to every transport call. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

/// Decides whether a video submission may go ahead and supplies the key it
/// should use. Implementations are queried on every job so a freshly granted
/// key is picked up without rebuilding anything.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn has_selected_credential(&self) -> bool;

    /// Ask the user (or whatever sits behind the gate) to select a key.
    async fn request_access(&self);

    async fn credential(&self) -> Option<Credential>;
}

/// Holds a key in memory; `set` swaps it at runtime.
#[derive(Clone, Default)]
pub struct StaticAccessGate {
    key: Arc<RwLock<Option<Credential>>>,
}

impl StaticAccessGate {
    pub fn new(key: Option<Credential>) -> Self {
        Self {
            key: Arc::new(RwLock::new(key)),
        }
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self::new(Some(Credential::new(key)))
    }

    pub fn set(&self, key: Option<Credential>) {
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key;
    }

    fn current(&self) -> Option<Credential> {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|credential| !credential.is_empty())
    }
}

#[async_trait]
impl AccessGate for StaticAccessGate {
    async fn has_selected_credential(&self) -> bool {
        self.current().is_some()
    }

    async fn request_access(&self) {
        log::warn!("🔑 No API key selected; set one before generating video");
    }

    async fn credential(&self) -> Option<Credential> {
        self.current()
    }
}

/// Reads the key from the environment on every call.
#[derive(Debug, Clone)]
pub struct EnvAccessGate {
    vars: Vec<String>,
}

impl EnvAccessGate {
    pub fn new(vars: &[&str]) -> Self {
        Self {
            vars: vars.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Default for EnvAccessGate {
    fn default() -> Self {
        Self::new(API_KEY_VARS)
    }
}

/// Checked in order by [`EnvAccessGate::default`] and `GenConfig::from_env`.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// First variable in `vars` holding a non-blank value.
pub fn first_set_var<S: AsRef<str>>(vars: &[S]) -> Option<String> {
    vars.iter()
        .find_map(|var| env::var(var.as_ref()).ok().filter(|value| !value.trim().is_empty()))
}

#[async_trait]
impl AccessGate for EnvAccessGate {
    async fn has_selected_credential(&self) -> bool {
        self.credential().await.is_some()
    }

    async fn request_access(&self) {
        log::warn!(
            "🔑 No API key found; export one of {} and retry",
            self.vars.join(", ")
        );
    }

    async fn credential(&self) -> Option<Credential> {
        first_set_var(&self.vars).map(Credential::new)
    }
}
