//! Chat envelopes

use serde::{Deserialize, Serialize};

use crate::constants::MAX_MESSAGES;
use crate::errors::{ParleyError, Result};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

crate::impl_domain_label_conversions!(Role {
    User => "user",
    Assistant => "assistant",
    System => "system",
});

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Outbound chat payload.
///
/// Serializes directly to the wire body
/// `{"messages": [...], "system"?: "..."}`. Call [`RequestEnvelope::validate`]
/// before sending; the envelope is never modified by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEnvelope {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

impl RequestEnvelope {
    pub fn new(messages: impl Into<Vec<ChatMessage>>) -> Self {
        Self { messages: messages.into(), system: None }
    }

    /// Attach an instruction override sent alongside the messages.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Check the envelope invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ParleyError::Validation`] when there are no messages, more
    /// than [`MAX_MESSAGES`] messages, a message whose content is blank, or a
    /// blank system override.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(ParleyError::validation("messages must not be empty"));
        }
        if self.messages.len() > MAX_MESSAGES {
            return Err(ParleyError::validation(format!(
                "too many messages: {} (maximum is {MAX_MESSAGES})",
                self.messages.len()
            )));
        }
        if let Some(index) = self.messages.iter().position(|m| m.content.trim().is_empty()) {
            return Err(ParleyError::validation(format!(
                "message {index} has empty content"
            )));
        }
        if self.system.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ParleyError::validation("system instruction must not be blank"));
        }
        Ok(())
    }
}

/// Token accounting reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub total_tokens: u64,
}

/// Decoded chat reply.
///
/// Deserializing enforces the reply schema: `content` must be present and a
/// string (it may be empty), `usage` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub content: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}
