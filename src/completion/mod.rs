//! Completion client for the remote farming-advice model.
//!
//! One stateless request per exchange: system prompt fixed per locale,
//! user text, optional photo as a data URI. A single attempt, no retry
//! policy and no timeout at this layer; retries are user-initiated by
//! repeating the action.

mod prompts;
mod wire;

pub use prompts::system_prompt;

use crate::locale::Locale;
use crate::{MazraError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::thread;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wire::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope};

pub const DEFAULT_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Ways a completion request can fail. Missing credentials are fatal
/// and detected before any request leaves the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionFailure {
    MissingCredential,
    /// Non-success response; carries the remote error message when the
    /// error payload had one.
    RemoteRejected(String),
    /// The request never produced a response.
    TransportError(String),
}

impl From<CompletionFailure> for MazraError {
    fn from(failure: CompletionFailure) -> Self {
        match failure {
            CompletionFailure::MissingCredential => MazraError::MissingCredential,
            CompletionFailure::RemoteRejected(msg) => MazraError::RemoteRejected(msg),
            CompletionFailure::TransportError(msg) => MazraError::TransportError(msg),
        }
    }
}

/// Connection settings for the completion endpoint.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    api_key: String,
}

// The credential must never leak into logs.
impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: api_key.into(),
        }
    }

    /// Read the credential from `MAZRA_API_KEY`, falling back to
    /// `OPENAI_API_KEY`. An absent key is not an error here; every
    /// request fails fast with `MissingCredential` instead.
    pub fn from_env() -> Self {
        let api_key = std::env::var("MAZRA_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("MAZRA_API_URL") {
            config.api_url = url;
        }
        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.api_url.trim_end_matches('/')
        )
    }
}

/// Encode a captured photo as an embeddable data URI, the opaque form
/// the completion service accepts.
pub fn image_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Perform one completion call.
///
/// Empty or missing content in a successful envelope is returned as
/// `Ok("")`, not an error.
pub async fn request_completion(
    client: &reqwest::Client,
    config: &CompletionConfig,
    prompt: &str,
    locale: Locale,
    image_data_uri: Option<String>,
) -> std::result::Result<String, CompletionFailure> {
    if !config.has_credential() {
        return Err(CompletionFailure::MissingCredential);
    }

    let body = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(system_prompt(locale, image_data_uri.is_some())),
            ChatMessage::user(prompt, image_data_uri),
        ],
        max_tokens: config.max_tokens,
    };

    let response = client
        .post(config.endpoint())
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| CompletionFailure::TransportError(e.to_string()))?;

    if !response.status().is_success() {
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Failed to get response from the completion service".to_string());
        return Err(CompletionFailure::RemoteRejected(message));
    }

    let envelope: ChatResponse = response
        .json()
        .await
        .map_err(|e| CompletionFailure::TransportError(e.to_string()))?;

    Ok(envelope.text())
}

/// Blocking form of the completion call, the seam the worker drives.
/// The HTTP implementation below is the production backend; tests
/// substitute scripted ones.
pub trait CompletionBackend: Send {
    fn complete(
        &mut self,
        prompt: &str,
        locale: Locale,
        image_data_uri: Option<String>,
    ) -> std::result::Result<String, CompletionFailure>;
}

/// Production backend: owns the async runtime and the HTTP client.
pub struct HttpCompletionBackend {
    config: CompletionConfig,
    runtime: Runtime,
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let runtime = Runtime::new()
            .map_err(|e| MazraError::ChannelError(format!("tokio runtime: {}", e)))?;
        Ok(Self {
            config,
            runtime,
            client: reqwest::Client::new(),
        })
    }
}

impl CompletionBackend for HttpCompletionBackend {
    fn complete(
        &mut self,
        prompt: &str,
        locale: Locale,
        image_data_uri: Option<String>,
    ) -> std::result::Result<String, CompletionFailure> {
        self.runtime.block_on(request_completion(
            &self.client,
            &self.config,
            prompt,
            locale,
            image_data_uri,
        ))
    }
}

#[derive(Debug)]
enum CompletionCommand {
    Complete {
        prompt: String,
        locale: Locale,
        image_data_uri: Option<String>,
        request_id: Uuid,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    Response { text: String, request_id: Uuid },
    Failed {
        error: CompletionFailure,
        request_id: Uuid,
    },
    Shutdown,
}

/// Orchestrator-side handle to the completion worker.
#[derive(Clone)]
pub struct CompletionHandle {
    command_tx: Sender<CompletionCommand>,
    event_rx: Receiver<CompletionEvent>,
}

impl CompletionHandle {
    pub fn complete(
        &self,
        prompt: String,
        locale: Locale,
        image_data_uri: Option<String>,
        request_id: Uuid,
    ) -> Result<()> {
        self.command_tx
            .send(CompletionCommand::Complete {
                prompt,
                locale,
                image_data_uri,
                request_id,
            })
            .map_err(|e| MazraError::ChannelError(format!("completion command: {}", e)))
    }

    pub fn try_recv_event(&self) -> Option<CompletionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(CompletionCommand::Shutdown);
    }
}

/// Completion client: a worker thread driving the backend.
pub struct CompletionClient {
    backend: Box<dyn CompletionBackend>,
    command_rx: Receiver<CompletionCommand>,
    event_tx: Sender<CompletionEvent>,
    handle: CompletionHandle,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let backend = HttpCompletionBackend::new(config)?;
        Ok(Self::with_backend(Box::new(backend)))
    }

    pub fn with_backend(backend: Box<dyn CompletionBackend>) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);

        let handle = CompletionHandle {
            command_tx,
            event_rx,
        };

        Self {
            backend,
            command_rx,
            event_tx,
            handle,
        }
    }

    pub fn handle(&self) -> CompletionHandle {
        self.handle.clone()
    }

    pub fn start_worker(self) -> Result<()> {
        let mut backend = self.backend;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        thread::Builder::new()
            .name("completion".into())
            .spawn(move || {
                info!("completion worker started");

                loop {
                    match command_rx.recv() {
                        Ok(CompletionCommand::Complete {
                            prompt,
                            locale,
                            image_data_uri,
                            request_id,
                        }) => {
                            debug!(%request_id, locale = locale.bcp47(), has_image = image_data_uri.is_some(), "completion request");

                            let result =
                                backend.complete(&prompt, locale, image_data_uri);

                            let event = match result {
                                Ok(text) => {
                                    debug!(%request_id, chars = text.len(), "completion response");
                                    CompletionEvent::Response { text, request_id }
                                }
                                Err(failure) => {
                                    warn!(%request_id, ?failure, "completion failed");
                                    CompletionEvent::Failed {
                                        error: failure,
                                        request_id,
                                    }
                                }
                            };
                            let _ = event_tx.send(event);
                        }
                        Ok(CompletionCommand::Shutdown) => {
                            info!("completion worker shutting down");
                            let _ = event_tx.send(CompletionEvent::Shutdown);
                            break;
                        }
                        Err(e) => {
                            warn!("completion command channel closed: {}", e);
                            break;
                        }
                    }
                }

                info!("completion worker stopped");
            })
            .map_err(|e| MazraError::ChannelError(format!("spawn completion worker: {}", e)))?;

        Ok(())
    }
}
