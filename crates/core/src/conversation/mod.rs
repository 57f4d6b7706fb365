//! Conversation accumulator
//!
//! Keeps a transcript and sends the whole of it with every new user message.
//! The transcript is an immutable snapshot (`Arc<[ChatMessage]>`) replaced
//! wholesale on each change, so readers never observe a half-applied update.
//!
//! A send appends the user message optimistically. On success the assistant
//! reply is appended; on failure or cancellation the previous snapshot is
//! restored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use parley_domain::{ChatMessage, ParleyError, RequestEnvelope};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::client::ChatClient;

/// A send that did not go through. Carries the caller's input so it can be
/// offered for retry.
#[derive(Debug, Clone, Error)]
#[error("message could not be sent: {error}")]
pub struct SendFailure {
    pub input: String,
    #[source]
    pub error: ParleyError,
}

/// Multi-turn conversation over a [`ChatClient`]
///
/// Sends on one conversation are serialized.
pub struct Conversation {
    client: Arc<ChatClient>,
    system: Option<String>,
    transcript: RwLock<Arc<[ChatMessage]>>,
    gate: tokio::sync::Mutex<()>,
    pending: AtomicBool,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("system", &self.system)
            .field("messages", &self.transcript.read().len())
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self {
            client,
            system: None,
            transcript: RwLock::new(Arc::from(Vec::new())),
            gate: tokio::sync::Mutex::new(()),
            pending: AtomicBool::new(false),
        }
    }

    /// Forward `system` as the instruction override on every send.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Start from an existing transcript.
    #[must_use]
    pub fn with_history(self, history: impl Into<Vec<ChatMessage>>) -> Self {
        *self.transcript.write() = Arc::from(history.into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Current transcript snapshot.
    pub fn transcript(&self) -> Arc<[ChatMessage]> {
        Arc::clone(&self.transcript.read())
    }

    /// `true` while a send is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Empty the transcript. Waits for an in-flight send to settle first.
    pub async fn clear(&self) {
        let _gate = self.gate.lock().await;
        *self.transcript.write() = Arc::from(Vec::new());
    }

    /// Send `text` as the next user message and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`SendFailure`] with the original input; the transcript is
    /// left as it was before the call.
    pub async fn send(&self, text: impl Into<String>) -> Result<String, SendFailure> {
        self.exchange(text.into(), &CancellationToken::new()).await
    }

    /// Like [`Conversation::send`], but `Ok(None)` when `cancel` fires before
    /// the exchange completes. Cancellation is not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`SendFailure`] for every failure other than cancellation.
    pub async fn send_with_cancel(
        &self,
        text: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, SendFailure> {
        match self.exchange(text.into(), cancel).await {
            Ok(reply) => Ok(Some(reply)),
            Err(failure) if failure.error.is_cancelled() => Ok(None),
            Err(failure) => Err(failure),
        }
    }

    #[instrument(skip_all)]
    async fn exchange(
        &self,
        input: String,
        cancel: &CancellationToken,
    ) -> Result<String, SendFailure> {
        let _gate = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(SendFailure { input, error: ParleyError::Cancelled });
            }
            gate = self.gate.lock() => gate,
        };
        let _pending = PendingFlag::raise(&self.pending);

        let previous = self.transcript();
        let mut messages = previous.to_vec();
        messages.push(ChatMessage::user(input.clone()));
        *self.transcript.write() = Arc::from(messages.clone());
        let rollback = Rollback { slot: &self.transcript, previous: Some(previous) };

        let mut envelope = RequestEnvelope::new(messages);
        if let Some(system) = &self.system {
            envelope = envelope.with_system(system.clone());
        }

        match self.client.send_with_cancel(&envelope, cancel).await {
            Ok(response) => {
                let mut committed = envelope.messages().to_vec();
                // A blank assistant turn would make the next envelope invalid.
                if response.content.trim().is_empty() {
                    debug!("empty reply not added to transcript");
                } else {
                    committed.push(ChatMessage::assistant(response.content.clone()));
                }
                rollback.commit(Arc::from(committed));
                Ok(response.content)
            }
            Err(error) => {
                drop(rollback);
                if error.is_cancelled() {
                    debug!("send cancelled; transcript restored");
                } else {
                    warn!(
                        category = error.category(),
                        error = %error,
                        "send failed; transcript restored"
                    );
                }
                Err(SendFailure { input, error })
            }
        }
    }
}

/// Restores the pre-send transcript unless the send commits. Also covers a
/// send future dropped mid-flight.
struct Rollback<'a> {
    slot: &'a RwLock<Arc<[ChatMessage]>>,
    previous: Option<Arc<[ChatMessage]>>,
}

impl Rollback<'_> {
    fn commit(mut self, next: Arc<[ChatMessage]>) {
        self.previous = None;
        *self.slot.write() = next;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.slot.write() = previous;
        }
    }
}

/// Holds the pending flag up for the lifetime of a send.
struct PendingFlag<'a>(&'a AtomicBool);

impl<'a> PendingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for PendingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
