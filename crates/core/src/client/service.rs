//! Resilient chat client
//!
//! Validates an envelope, then runs up to `max_attempts` attempts. Each
//! attempt obtains a credential, calls the transport under a per-attempt
//! deadline and classifies the outcome:
//!
//! | Outcome                     | Action                                   |
//! |-----------------------------|------------------------------------------|
//! | 2xx with a valid reply      | return it                                |
//! | 2xx with a malformed reply  | `Validation`, no retry                   |
//! | 401                         | invalidate credential, retry immediately |
//! | 5xx, timeout, network error | back off, retry                          |
//! | any other status            | `Request`, no retry                      |

use std::sync::Arc;
use std::time::Duration;

use parley_common::ExponentialBackoff;
use parley_domain::{
    ClientConfig, Credential, ParleyError, RequestEnvelope, ResponseEnvelope, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::ports::{ChatTransport, TransportError, TransportReply};
use crate::credentials::CredentialManager;

/// Classified result of a single attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success(ResponseEnvelope),
    /// Credential rejected; retry with a fresh one.
    Unauthorized(ParleyError),
    /// Retry after backing off.
    Transient(ParleyError),
    /// Give up immediately.
    Fatal(ParleyError),
}

/// Chat client with retries, per-attempt deadlines and 401 recovery
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
    credentials: CredentialManager,
    request_timeout: Duration,
    max_attempts: u32,
    backoff: ExponentialBackoff,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Arguments
    ///
    /// * `config` - supplies the request timeout, attempt count and retry
    ///   delay
    /// * `transport` - chat endpoint adapter
    /// * `credentials` - source of bearer credentials
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn ChatTransport>,
        credentials: CredentialManager,
    ) -> Self {
        Self {
            transport,
            credentials,
            request_timeout: config.request_timeout,
            max_attempts: config.max_attempts.max(1),
            backoff: ExponentialBackoff::new(config.retry_delay),
        }
    }

    /// Credential manager shared with this client.
    pub const fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Send `envelope` and return the decoded reply.
    ///
    /// # Errors
    ///
    /// - [`ParleyError::Validation`] for an invalid envelope (nothing is sent)
    ///   or a malformed reply
    /// - [`ParleyError::Credential`] when no credential can be obtained
    /// - [`ParleyError::Request`] for non-retryable statuses or once attempts
    ///   are exhausted
    pub async fn send(&self, envelope: &RequestEnvelope) -> Result<ResponseEnvelope> {
        self.send_with_cancel(envelope, &CancellationToken::new()).await
    }

    /// Like [`ChatClient::send`], abandoning the call as soon as `cancel`
    /// fires.
    ///
    /// Whatever is in flight at that moment (credential wait, HTTP call or
    /// backoff sleep) is dropped.
    ///
    /// # Errors
    ///
    /// As [`ChatClient::send`], plus [`ParleyError::Cancelled`].
    #[instrument(skip(self, envelope, cancel), fields(messages = envelope.messages().len()))]
    pub async fn send_with_cancel(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope> {
        envelope.validate()?;

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("chat request cancelled by caller");
                Err(ParleyError::Cancelled)
            }
            result = self.send_with_retries(envelope) => result,
        }
    }

    async fn send_with_retries(&self, envelope: &RequestEnvelope) -> Result<ResponseEnvelope> {
        let mut last_error: Option<ParleyError> = None;

        for attempt in 1..=self.max_attempts {
            // Fetch the credential inside the loop so a 401 can be recovered
            let credential = self.credentials.get_credential().await?;

            match self.attempt(&credential, envelope).await {
                AttemptOutcome::Success(response) => {
                    debug!(attempt, "chat request succeeded");
                    return Ok(response);
                }
                AttemptOutcome::Fatal(err) => {
                    warn!(attempt, category = err.category(), error = %err, "chat request failed");
                    return Err(err);
                }
                AttemptOutcome::Unauthorized(err) => {
                    warn!(attempt, "credential rejected by server");
                    self.credentials.invalidate_if_current(&credential);
                    last_error = Some(err);
                }
                AttemptOutcome::Transient(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "chat attempt failed"
                    );
                    if attempt < self.max_attempts {
                        self.backoff.wait(attempt).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(exhausted(self.max_attempts, last_error))
    }

    async fn attempt(&self, credential: &Credential, envelope: &RequestEnvelope) -> AttemptOutcome {
        let call = self.transport.post_chat(credential, envelope);

        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(reply)) => classify_reply(&reply),
            Ok(Err(TransportError::Network(message))) => {
                AttemptOutcome::Transient(ParleyError::network(message))
            }
            Ok(Err(TransportError::Timeout(message))) => {
                AttemptOutcome::Transient(ParleyError::timeout(message))
            }
            Ok(Err(TransportError::Config(message))) => {
                AttemptOutcome::Fatal(ParleyError::config(message))
            }
            Err(_) => AttemptOutcome::Transient(ParleyError::timeout(format!(
                "no response within {} ms",
                self.request_timeout.as_millis()
            ))),
        }
    }
}

fn classify_reply(reply: &TransportReply) -> AttemptOutcome {
    match reply.status {
        200..=299 => match serde_json::from_str::<ResponseEnvelope>(&reply.body) {
            Ok(response) => AttemptOutcome::Success(response),
            Err(err) => AttemptOutcome::Fatal(ParleyError::validation(format!(
                "malformed chat response: {err}"
            ))),
        },
        401 => AttemptOutcome::Unauthorized(ParleyError::status(401, reply.error_message())),
        500..=599 => {
            AttemptOutcome::Transient(ParleyError::status(reply.status, reply.error_message()))
        }
        status => AttemptOutcome::Fatal(ParleyError::status(status, reply.error_message())),
    }
}

/// Wrap the last failure once every attempt has been used, keeping its
/// status and reason.
fn exhausted(attempts: u32, last_error: Option<ParleyError>) -> ParleyError {
    match last_error {
        Some(ParleyError::Request { message, status, reason }) => ParleyError::Request {
            message: format!("chat request failed after {attempts} attempts: {message}"),
            status,
            reason,
        },
        Some(other) => other,
        None => ParleyError::network(format!("chat request failed after {attempts} attempts")),
    }
}

#[cfg(test)]
mod tests {
    use parley_domain::RequestFailureReason;

    use super::*;

    #[test]
    fn classify_success_and_malformed() {
        let ok = TransportReply::new(200, "OK", r#"{"content":"hello"}"#);
        assert!(matches!(classify_reply(&ok), AttemptOutcome::Success(r) if r.content == "hello"));

        let malformed = TransportReply::new(200, "OK", r#"{"content":null}"#);
        assert!(matches!(
            classify_reply(&malformed),
            AttemptOutcome::Fatal(ParleyError::Validation { .. })
        ));
    }

    #[test]
    fn classify_statuses() {
        let unauthorized = TransportReply::new(401, "Unauthorized", "");
        assert!(matches!(classify_reply(&unauthorized), AttemptOutcome::Unauthorized(_)));

        let unavailable = TransportReply::new(503, "Service Unavailable", "");
        assert!(matches!(classify_reply(&unavailable), AttemptOutcome::Transient(_)));

        let bad_request = TransportReply::new(400, "Bad Request", r#"{"message":"nope"}"#);
        match classify_reply(&bad_request) {
            AttemptOutcome::Fatal(err) => {
                assert_eq!(err.http_status(), Some(400));
                assert!(err.to_string().contains("nope"));
            }
            other => panic!("expected fatal outcome, got {other:?}"),
        }

        let redirect = TransportReply::new(302, "Found", "");
        assert!(matches!(classify_reply(&redirect), AttemptOutcome::Fatal(_)));
    }

    #[test]
    fn exhaustion_keeps_status_and_reason() {
        let err = exhausted(3, Some(ParleyError::status(503, "Service Unavailable")));
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.request_reason(), Some(RequestFailureReason::Status));
        assert!(err.to_string().contains("after 3 attempts: Service Unavailable"));

        let err = exhausted(2, Some(ParleyError::timeout("no response within 10 ms")));
        assert_eq!(err.request_reason(), Some(RequestFailureReason::Timeout));
    }
}
