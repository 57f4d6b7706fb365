//! Token endpoint adapter

use async_trait::async_trait;
use parley_core::{IssueError, TokenIssuer};
use parley_domain::constants::TOKENS_PATH;
use parley_domain::{ErrorBody, TokenGrant, TokenRequest};
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use super::endpoint::endpoint_url;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// [`TokenIssuer`] backed by `POST {base}/api/tokens`.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    http: HttpClient,
    endpoint: String,
}

impl HttpTokenIssuer {
    /// # Errors
    ///
    /// Returns [`InfraError::Config`] when `base_url` is not a usable URL.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, InfraError> {
        Ok(Self { http, endpoint: endpoint_url(base_url, TOKENS_PATH)? })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn issue(&self, subject: &str) -> Result<TokenGrant, IssueError> {
        let request =
            self.http.request(Method::POST, &self.endpoint).json(&TokenRequest::new(subject));
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(IssueError::Unauthorized(failure_message(status, &body)));
        }
        if !status.is_success() {
            return Err(IssueError::Status {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }

        let grant: TokenGrant =
            serde_json::from_str(&body).map_err(|err| IssueError::Malformed(err.to_string()))?;
        debug!(token_type = %grant.token_type, expires_in = %grant.expires_in, "token issued");
        Ok(grant)
    }
}

/// Server-supplied `message`, else the canonical status text.
pub(crate) fn failure_message(status: StatusCode, body: &str) -> String {
    ErrorBody::message_from(body).unwrap_or_else(|| {
        status.canonical_reason().map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
    })
}
