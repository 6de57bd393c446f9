//! Wire and domain types shared by the client, renderer and session
//!
//! These types mirror the JSON the chat backend speaks and don't depend on
//! any specific UI framework.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChatEntry")]
pub struct Chat {
    pub name: String,
}

impl Chat {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// The backend has served chat list entries both as bare names and as
/// `{"name": ...}` objects; both decode to the same `Chat`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChatEntry {
    Name(String),
    Object { name: String },
}

impl From<ChatEntry> for Chat {
    fn from(entry: ChatEntry) -> Self {
        match entry {
            ChatEntry::Name(name) | ChatEntry::Object { name } => Chat { name },
        }
    }
}

/// Backend-assigned message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The author of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a chat.
///
/// `id` is only present once the backend has persisted the message, and
/// `liked` is only sent for assistant replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

impl Message {
    /// An unpersisted user message, as rendered optimistically
    pub fn user(content: &str) -> Self {
        Self {
            id: None,
            role: Role::User,
            content: content.to_string(),
            liked: None,
        }
    }
}

/// Body of `POST /api/chats/{chat}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub role: Role,
    pub content: String,
}

impl OutgoingMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

impl From<&OutgoingMessage> for Message {
    fn from(msg: &OutgoingMessage) -> Self {
        Self {
            id: None,
            role: msg.role.clone(),
            content: msg.content.clone(),
            liked: None,
        }
    }
}

/// Response of `POST /api/messages/{id}/like`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
}
