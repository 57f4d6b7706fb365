//! Shared test helpers for `parley-core` integration tests.
//!
//! In-memory port doubles with scripted responses, so tests can focus on
//! retry and refresh behaviour instead of HTTP plumbing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use parley_common::time::MockClock;
use parley_core::{
    ChatClient, ChatTransport, CredentialManager, IssueError, TokenIssuer, TransportError,
    TransportReply,
};
use parley_domain::{ClientConfig, Credential, RequestEnvelope, TokenGrant};
use tokio::time::Instant;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

pub fn mock_clock() -> MockClock {
    MockClock::starting_at(epoch())
}

/// Defaults with a one second retry delay, matching the documented config.
pub fn test_config() -> ClientConfig {
    ClientConfig::new("http://chat.test")
        .with_request_timeout(Duration::from_secs(5))
        .with_retry_delay(Duration::from_secs(1))
}

pub fn grant(token: &str, expires_in: &str) -> Result<TokenGrant, IssueError> {
    Ok(TokenGrant {
        token: token.to_string(),
        expires_in: expires_in.to_string(),
        token_type: "Bearer".to_string(),
    })
}

/// Issuer that replays a script and counts calls.
pub struct ScriptedIssuer {
    script: Mutex<VecDeque<Result<TokenGrant, IssueError>>>,
    delay: Duration,
    calls: AtomicUsize,
    subjects: Mutex<Vec<String>>,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedIssuer {
    pub fn new(script: Vec<Result<TokenGrant, IssueError>>) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    /// Each call sleeps for `delay` before answering.
    pub fn with_delay(script: Vec<Result<TokenGrant, IssueError>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delay,
            calls: AtomicUsize::new(0),
            subjects: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn subjects(&self) -> Vec<String> {
        self.subjects.lock().clone()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().clone()
    }
}

#[async_trait]
impl TokenIssuer for ScriptedIssuer {
    async fn issue(&self, subject: &str) -> Result<TokenGrant, IssueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.subjects.lock().push(subject.to_string());
        self.call_times.lock().push(Instant::now());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(IssueError::Network("issuer script exhausted".into())))
    }
}

/// One scripted transport step.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(TransportReply),
    Fail(TransportError),
    /// Answer after sleeping.
    Delayed(Duration, TransportReply),
}

pub fn ok(body: &str) -> Step {
    Step::Reply(TransportReply::new(200, "OK", body))
}

pub fn status(code: u16, text: &str) -> Step {
    Step::Reply(TransportReply::new(code, text, ""))
}

/// A call the transport received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub token: String,
    pub envelope: RequestEnvelope,
    pub at: Instant,
}

/// Transport that replays a script and records every call.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.into()), calls: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn post_chat(
        &self,
        credential: &Credential,
        envelope: &RequestEnvelope,
    ) -> Result<TransportReply, TransportError> {
        self.calls.lock().push(RecordedCall {
            token: credential.token().to_string(),
            envelope: envelope.clone(),
            at: Instant::now(),
        });
        let step = self.script.lock().pop_front();
        match step {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Delayed(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            None => Err(TransportError::Network("transport script exhausted".into())),
        }
    }
}

/// Credential manager over `issuer` judged against `clock`.
pub fn manager_with(
    config: &ClientConfig,
    issuer: &Arc<ScriptedIssuer>,
    clock: MockClock,
) -> CredentialManager {
    let issuer: Arc<dyn TokenIssuer> = Arc::clone(issuer) as Arc<dyn TokenIssuer>;
    CredentialManager::with_clock(config, issuer, Arc::new(clock))
}

/// Wire a client over the given doubles with a mock clock.
pub fn client_with(
    config: &ClientConfig,
    issuer: Arc<ScriptedIssuer>,
    transport: Arc<ScriptedTransport>,
) -> ChatClient {
    let credentials = manager_with(config, &issuer, mock_clock());
    ChatClient::new(config, transport, credentials)
}
