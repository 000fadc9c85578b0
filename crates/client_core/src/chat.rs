//! Conversation list and a single open conversation.

use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Duration, TimeZone};
use shared::{
    domain::{ChatId, UserId},
    protocol::{Chat, ChatMessage, Participant},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{error::ClientResult, ChatApi};

pub const CHATS_FAILURE_FALLBACK: &str = "Failed to fetch chats";
pub const MESSAGES_FAILURE_FALLBACK: &str = "Failed to fetch messages";
pub const SEND_FAILURE_FALLBACK: &str = "Failed to send message";

#[derive(Default)]
struct ChatListState {
    chats: Vec<Chat>,
    error: Option<String>,
}

pub struct ChatList {
    api: Arc<dyn ChatApi>,
    state: Mutex<ChatListState>,
}

impl ChatList {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ChatListState::default()),
        }
    }

    pub async fn refresh(&self) -> ClientResult<Vec<Chat>> {
        let result = self.api.list_chats().await;
        let mut state = self.state.lock().await;
        match result {
            Ok(chats) => {
                debug!(count = chats.len(), "chats loaded");
                state.chats = chats.clone();
                state.error = None;
                Ok(chats)
            }
            Err(err) => {
                warn!(kind = err.kind(), "error fetching chats: {err}");
                state.error = Some(err.display_message(CHATS_FAILURE_FALLBACK));
                Err(err)
            }
        }
    }

    pub async fn chats(&self) -> Vec<Chat> {
        self.state.lock().await.chats.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}

#[derive(Default)]
struct ChatWindowState {
    messages: Vec<ChatMessage>,
    draft: String,
    is_sending: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent(ChatMessage),
    /// Blank draft, or a previous send has not finished.
    Ignored,
}

pub struct ChatWindow {
    api: Arc<dyn ChatApi>,
    chat_id: ChatId,
    state: Mutex<ChatWindowState>,
}

impl ChatWindow {
    pub fn new(api: Arc<dyn ChatApi>, chat_id: ChatId) -> Self {
        Self {
            api,
            chat_id,
            state: Mutex::new(ChatWindowState::default()),
        }
    }

    pub async fn refresh(&self) -> ClientResult<Vec<ChatMessage>> {
        let result = self.api.list_messages(&self.chat_id).await;
        let mut state = self.state.lock().await;
        match result {
            Ok(messages) => {
                state.messages = messages.clone();
                state.error = None;
                Ok(messages)
            }
            Err(err) => {
                warn!(chat_id = %self.chat_id, kind = err.kind(), "error fetching messages: {err}");
                state.error = Some(err.display_message(MESSAGES_FAILURE_FALLBACK));
                Err(err)
            }
        }
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.lock().await.draft.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn is_sending(&self) -> bool {
        self.state.lock().await.is_sending
    }

    /// Sends the trimmed draft. The draft is cleared up front and put back if
    /// the send fails.
    pub async fn send(&self) -> ClientResult<SendOutcome> {
        let content = {
            let mut state = self.state.lock().await;
            let content = state.draft.trim().to_string();
            if content.is_empty() || state.is_sending {
                return Ok(SendOutcome::Ignored);
            }
            state.draft.clear();
            state.is_sending = true;
            content
        };

        let result = self.api.send_message(&self.chat_id, &content).await;

        let mut state = self.state.lock().await;
        state.is_sending = false;
        match result {
            Ok(message) => {
                state.messages.push(message.clone());
                Ok(SendOutcome::Sent(message))
            }
            Err(err) => {
                warn!(chat_id = %self.chat_id, kind = err.kind(), "error sending message: {err}");
                state.error = Some(err.display_message(SEND_FAILURE_FALLBACK));
                state.draft = content;
                Err(err)
            }
        }
    }
}

/// The first participant that is not the signed-in user.
pub fn other_participant<'a>(chat: &'a Chat, me: &UserId) -> Option<&'a Participant> {
    chat.participants
        .iter()
        .find(|participant| &participant.id != me)
}

pub fn participant_label(participant: Option<&Participant>) -> &str {
    participant
        .and_then(|participant| participant.username.as_deref())
        .unwrap_or("Unknown User")
}

pub fn is_own_message(message: &ChatMessage, me: &UserId) -> bool {
    &message.sender.id == me
}

/// Time of day within the last 24 hours, weekday within a week, and month
/// and day beyond that.
pub fn format_last_message_time<Tz>(at: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let age = now.clone().signed_duration_since(at.clone());
    if age < Duration::hours(24) {
        at.format("%I:%M %p").to_string()
    } else if age < Duration::days(7) {
        at.format("%a").to_string()
    } else {
        at.format("%b %-d").to_string()
    }
}

pub fn format_message_time<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%I:%M %p").to_string()
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
