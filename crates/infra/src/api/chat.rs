//! Chat endpoint adapter

use async_trait::async_trait;
use parley_core::{ChatTransport, TransportError, TransportReply};
use parley_domain::constants::CHAT_PATH;
use parley_domain::{Credential, RequestEnvelope};
use reqwest::Method;
use tracing::instrument;

use super::endpoint::endpoint_url;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// [`ChatTransport`] backed by `POST {base}/api/chat`.
///
/// Returns every status as a [`TransportReply`]; only failures before a
/// status arrives become [`TransportError`]s.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    http: HttpClient,
    endpoint: String,
}

impl HttpChatTransport {
    /// # Errors
    ///
    /// Returns [`InfraError::Config`] when `base_url` is not a usable URL.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, InfraError> {
        Ok(Self { http, endpoint: endpoint_url(base_url, CHAT_PATH)? })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn post_chat(
        &self,
        credential: &Credential,
        envelope: &RequestEnvelope,
    ) -> Result<TransportReply, TransportError> {
        let request = self
            .http
            .request(Method::POST, &self.endpoint)
            .bearer_auth(credential.token())
            .json(envelope);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        let status_text = status.canonical_reason().unwrap_or_default();
        Ok(TransportReply::new(status.as_u16(), status_text, body))
    }
}
