//! In-memory chat backend for driving a session without a server.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use storychat_core::{
    ChatBackend, Chat, LikeStatus, Message, MessageId, OutgoingMessage, Role, TransportError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListChats,
    FetchHistory(String),
    PostMessage(String, OutgoingMessage),
    ToggleLike(MessageId),
}

#[derive(Default)]
struct Inner {
    chats: Vec<Chat>,
    fail_list: bool,
    histories: HashMap<String, Vec<Message>>,
    failing_histories: HashSet<String>,
    fail_post: bool,
    next_id: i64,
    likes: HashMap<MessageId, bool>,
    fail_like: bool,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

pub fn server_error(path: &str) -> TransportError {
    TransportError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url: format!("http://fake{}", path),
    }
}

pub fn reply(id: i64, content: &str, liked: bool) -> Message {
    Message {
        id: Some(MessageId(id)),
        role: Role::Assistant,
        content: content.to_string(),
        liked: Some(liked),
    }
}

impl FakeBackend {
    pub fn with_chats(names: &[&str]) -> Self {
        let backend = Self::default();
        {
            let mut inner = backend.inner.lock().unwrap();
            inner.chats = names.iter().map(|name| Chat::new(name)).collect();
            inner.next_id = 100;
        }
        backend
    }

    pub fn with_history(self, chat: &str, history: Vec<Message>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            for msg in &history {
                if let (Some(id), Some(liked)) = (msg.id, msg.liked) {
                    inner.likes.insert(id, liked);
                }
            }
            inner.histories.insert(chat.to_string(), history);
        }
        self
    }

    pub fn fail_list(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }

    pub fn fail_history(&self, chat: &str) {
        self.inner.lock().unwrap().failing_histories.insert(chat.to_string());
    }

    pub fn fail_post(&self, fail: bool) {
        self.inner.lock().unwrap().fail_post = fail;
    }

    pub fn fail_like(&self, fail: bool) {
        self.inner.lock().unwrap().fail_like = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn post_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::PostMessage(..)))
            .count()
    }

    pub fn history_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::FetchHistory(chat) => Some(chat),
                _ => None,
            })
            .collect()
    }
}

impl ChatBackend for FakeBackend {
    async fn list_chats(&self) -> Result<Vec<Chat>, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListChats);
        if inner.fail_list {
            return Err(server_error("/api/chats"));
        }
        Ok(inner.chats.clone())
    }

    async fn fetch_history(&self, chat: &str) -> Result<Vec<Message>, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::FetchHistory(chat.to_string()));
        if inner.failing_histories.contains(chat) {
            return Err(server_error(&format!("/api/chats/{}", chat)));
        }
        Ok(inner.histories.get(chat).cloned().unwrap_or_default())
    }

    async fn post_message(
        &self,
        chat: &str,
        message: &OutgoingMessage,
    ) -> Result<Message, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(Call::PostMessage(chat.to_string(), message.clone()));
        if inner.fail_post {
            return Err(server_error(&format!("/api/chats/{}", chat)));
        }

        inner.next_id += 1;
        let id = MessageId(inner.next_id);
        inner.likes.insert(id, false);

        let answer = reply(id.0, "It began at dawn.###The end.", false);
        inner.histories.entry(chat.to_string()).or_default().extend([
            Message::from(message),
            answer.clone(),
        ]);
        Ok(answer)
    }

    async fn toggle_like(&self, id: MessageId) -> Result<LikeStatus, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ToggleLike(id));
        if inner.fail_like {
            return Err(server_error(&format!("/api/messages/{}/like", id)));
        }
        let liked = inner.likes.entry(id).or_insert(false);
        *liked = !*liked;
        Ok(LikeStatus { liked: *liked })
    }
}
