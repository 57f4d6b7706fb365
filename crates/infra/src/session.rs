//! Wiring of the HTTP adapters into a ready-to-use client
//!
//! [`ChatSession::connect`] builds one credential manager and one chat client
//! over a shared HTTP connection pool. [`ask`] does the same for a single
//! exchange and returns only the reply text.

use std::sync::Arc;

use parley_core::{ChatClient, Conversation, CredentialManager};
use parley_domain::{ChatMessage, ClientConfig, RequestEnvelope, ResponseEnvelope, Result};
use tracing::{debug, instrument};

use crate::api::{HttpChatTransport, HttpTokenIssuer};
use crate::http::HttpClient;

/// A connected client pair for one endpoint and subject.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: Arc<ChatClient>,
}

impl ChatSession {
    /// Validate `config` and build the adapters, credential manager and
    /// chat client. No network traffic happens until the first send.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` for an invalid configuration or base
    /// URL, or when the HTTP client cannot be built.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::builder().timeout(config.request_timeout).build()?;
        let issuer = HttpTokenIssuer::new(http.clone(), &config.base_url)?;
        let transport = HttpChatTransport::new(http, &config.base_url)?;
        debug!(tokens = issuer.endpoint(), chat = transport.endpoint(), "session endpoints");

        let credentials = CredentialManager::new(config, Arc::new(issuer));
        let client = ChatClient::new(config, Arc::new(transport), credentials);
        Ok(Self { client: Arc::new(client) })
    }

    pub fn client(&self) -> &Arc<ChatClient> {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialManager {
        self.client.credentials()
    }

    /// Start a new conversation sharing this session's credentials.
    pub fn conversation(&self) -> Conversation {
        Conversation::new(Arc::clone(&self.client))
    }

    /// Send `envelope` through the session's client.
    ///
    /// # Errors
    ///
    /// See [`ChatClient::send`].
    pub async fn send(&self, envelope: &RequestEnvelope) -> Result<ResponseEnvelope> {
        self.client.send(envelope).await
    }
}

/// One-shot call: connect, send `messages` (with an optional system
/// override) and return the reply text.
///
/// Uses [`ClientConfig::default`] (`http://localhost:3000`) when `config` is
/// `None`.
///
/// # Errors
///
/// Any error from [`ChatSession::connect`] or [`ChatClient::send`].
#[instrument(skip_all, fields(messages = messages.len()))]
pub async fn ask(
    config: Option<ClientConfig>,
    messages: Vec<ChatMessage>,
    system: Option<String>,
) -> Result<String> {
    let config = config.unwrap_or_default();
    let session = ChatSession::connect(&config)?;

    let mut envelope = RequestEnvelope::new(messages);
    if let Some(system) = system {
        envelope = envelope.with_system(system);
    }

    let response = session.send(&envelope).await?;
    Ok(response.content)
}
