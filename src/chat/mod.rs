//! Chat relay
//!
//! Forwards a visitor message plus prior turns to a hosted model. The
//! gateway only sees the [`ChatCompletion`] trait.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{StoreError, StoreResult};

pub use gemini::GeminiChat;

/// Most recent turns forwarded upstream
pub const MAX_HISTORY_TURNS: usize = 50;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One prior message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Reply to `message` given the earlier turns, oldest first
    async fn reply(&self, message: &str, history: &[ChatTurn]) -> StoreResult<String>;
}

/// Validate the message and keep only the newest turns
pub fn prepare(message: &str, history: Vec<ChatTurn>) -> StoreResult<(String, Vec<ChatTurn>)> {
    let message = message.trim();
    if message.is_empty() {
        return Err(StoreError::validation("Message is required"));
    }

    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let history = history
        .into_iter()
        .skip(skip)
        .filter(|t| !t.text.trim().is_empty())
        .collect();
    Ok((message.to_string(), history))
}
