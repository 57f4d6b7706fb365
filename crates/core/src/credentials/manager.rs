//! Credential manager with deduplicated refresh
//!
//! Keeps one bearer credential alive for any number of concurrent callers.
//! When the held credential is missing or inside the safety buffer, the first
//! caller starts a refresh and every later caller joins it; the issuance port
//! is hit once per refresh no matter how many callers are waiting.
//!
//! The refresh runs as its own task, so a caller that gives up does not stall
//! the others. The task stores the new credential before it clears the
//! in-flight slot, which means a caller arriving after settlement always
//! finds either the new credential or an empty slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use parley_common::time::{parse_expiry, Clock, SystemClock};
use parley_common::ExponentialBackoff;
use parley_domain::{ClientConfig, Credential, CredentialInfo, ParleyError, Result, TokenGrant};
use tracing::{debug, info, instrument, warn};

use super::ports::{IssueError, TokenIssuer};

type SharedRefresh = Shared<BoxFuture<'static, Result<Arc<Credential>>>>;

/// The one refresh allowed in flight, tagged with the generation that
/// started it.
struct RefreshSlot {
    generation: u64,
    outcome: SharedRefresh,
}

struct Inner {
    issuer: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    subject: String,
    safety_buffer: chrono::Duration,
    max_attempts: u32,
    backoff: ExponentialBackoff,
    current: RwLock<Option<Arc<Credential>>>,
    refresh: Mutex<Option<RefreshSlot>>,
    generation: AtomicU64,
}

/// Manages a single bearer credential
///
/// Cheap to clone; clones share the held credential and the refresh slot.
#[derive(Clone)]
pub struct CredentialManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("subject", &self.inner.subject)
            .field("credential", &self.describe_credential())
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    /// Create a manager using the system clock.
    ///
    /// # Arguments
    /// * `config` - supplies the subject, safety buffer, attempt count and
    ///   retry delay
    /// * `issuer` - issuance port used for every refresh
    pub fn new(config: &ClientConfig, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self::with_clock(config, issuer, Arc::new(SystemClock))
    }

    /// Create a manager that judges freshness against `clock`.
    pub fn with_clock(
        config: &ClientConfig,
        issuer: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                issuer,
                clock,
                subject: config.subject.clone(),
                safety_buffer: config.safety_buffer_delta(),
                max_attempts: config.max_attempts.max(1),
                backoff: ExponentialBackoff::new(config.retry_delay),
                current: RwLock::new(None),
                refresh: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Return a credential valid for at least the safety buffer.
    ///
    /// Starts a refresh when needed, or joins the one already in flight.
    ///
    /// One exception: when the issuer grants a lifetime shorter than the
    /// safety buffer, that credential is still returned to the callers of
    /// the refresh that produced it. It is never reported as valid, so the
    /// next call refreshes again.
    ///
    /// # Errors
    ///
    /// Returns [`ParleyError::Credential`] when issuance fails terminally or
    /// every attempt fails.
    #[instrument(skip(self), fields(subject = %self.inner.subject))]
    pub async fn get_credential(&self) -> Result<Arc<Credential>> {
        if let Some(credential) = self.inner.usable_credential() {
            return Ok(credential);
        }

        let outcome = {
            let mut slot = self.inner.refresh.lock();

            // A refresh may have settled between the check above and taking
            // the lock.
            if let Some(credential) = self.inner.usable_credential() {
                return Ok(credential);
            }

            match slot.as_ref() {
                Some(active) => {
                    debug!(generation = active.generation, "joining in-flight credential refresh");
                    active.outcome.clone()
                }
                None => {
                    let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(generation, "starting credential refresh");
                    let outcome = Inner::spawn_refresh(Arc::clone(&self.inner), generation);
                    *slot = Some(RefreshSlot { generation, outcome: outcome.clone() });
                    outcome
                }
            }
        };

        outcome.await
    }

    /// Discard the held credential. An in-flight refresh is not affected.
    pub fn invalidate(&self) {
        if self.inner.current.write().take().is_some() {
            info!(subject = %self.inner.subject, "credential invalidated");
        }
    }

    /// Discard the held credential only if it is still `credential`.
    ///
    /// Used after the server rejects a token, so that a rejection of an old
    /// token cannot throw away a newer one obtained meanwhile. Returns `true`
    /// when something was discarded.
    pub fn invalidate_if_current(&self, credential: &Arc<Credential>) -> bool {
        let mut current = self.inner.current.write();
        let is_current = current.as_ref().is_some_and(|held| Arc::ptr_eq(held, credential));
        if is_current {
            *current = None;
            info!(subject = %self.inner.subject, "rejected credential invalidated");
        }
        is_current
    }

    /// `true` when a credential is held and outside the safety buffer.
    pub fn has_valid_credential(&self) -> bool {
        self.inner.usable_credential().is_some()
    }

    /// Diagnostic view of the held credential.
    pub fn describe_credential(&self) -> CredentialInfo {
        self.inner
            .current
            .read()
            .as_deref()
            .map_or_else(CredentialInfo::absent, CredentialInfo::from)
    }
}

impl Inner {
    fn usable_credential(&self) -> Option<Arc<Credential>> {
        let now = self.clock.now();
        self.current
            .read()
            .as_ref()
            .filter(|credential| credential.is_usable_at(now, self.safety_buffer))
            .cloned()
    }

    fn spawn_refresh(inner: Arc<Self>, generation: u64) -> SharedRefresh {
        let handle = tokio::spawn(Self::run_refresh(inner, generation));
        async move {
            handle.await.unwrap_or_else(|err| {
                Err(ParleyError::credential(format!("credential refresh task failed: {err}")))
            })
        }
        .boxed()
        .shared()
    }

    async fn run_refresh(inner: Arc<Self>, generation: u64) -> Result<Arc<Credential>> {
        let _settle = SettleGuard { inner: Arc::clone(&inner), generation };

        let result = inner.refresh_with_retries().await;
        if let Ok(credential) = &result {
            *inner.current.write() = Some(Arc::clone(credential));
        }
        result
    }

    async fn refresh_with_retries(&self) -> Result<Arc<Credential>> {
        let mut last_error: Option<IssueError> = None;

        for attempt in 1..=self.max_attempts {
            match self.issuer.issue(&self.subject).await {
                Ok(grant) => return self.build_credential(grant).map(Arc::new),
                Err(err) if err.is_terminal() => {
                    warn!(attempt, error = %err, "credential refresh failed terminally");
                    return Err(ParleyError::credential(err.to_string()));
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "credential refresh attempt failed"
                    );
                    if attempt < self.max_attempts {
                        self.backoff.wait(attempt).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        let cause =
            last_error.map_or_else(|| "no attempts made".to_string(), |err| err.to_string());
        Err(ParleyError::credential(format!(
            "credential refresh failed after {} attempts: {cause}",
            self.max_attempts
        )))
    }

    fn build_credential(&self, grant: TokenGrant) -> Result<Credential> {
        let now = self.clock.now();
        let expires_at = parse_expiry(&grant.expires_in, now).map_err(|err| {
            warn!(error = %err, "token grant carried an unparseable expiry");
            ParleyError::credential(format!("invalid expiration format: {err}"))
        })?;
        let credential = Credential::new(grant.token, expires_at, grant.token_type)?;

        if credential.is_usable_at(now, self.safety_buffer) {
            info!(
                expires_at = %credential.expires_at(),
                kind = credential.kind(),
                "credential refreshed"
            );
        } else {
            warn!(
                expires_at = %credential.expires_at(),
                remaining_secs = credential.remaining_at(now).num_seconds(),
                "issued credential is already inside the safety buffer"
            );
        }
        Ok(credential)
    }
}

/// Clears the refresh slot when the refresh task ends, however it ends.
struct SettleGuard {
    inner: Arc<Inner>,
    generation: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let mut slot = self.inner.refresh.lock();
        if slot.as_ref().is_some_and(|active| active.generation == self.generation) {
            *slot = None;
        }
    }
}
