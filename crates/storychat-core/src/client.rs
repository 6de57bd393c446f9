use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::TransportError;
use crate::state::{Chat, LikeStatus, Message, MessageId, OutgoingMessage};

/// The four requests the chat backend answers.
///
/// The session only talks to the backend through this trait, so it can be
/// driven by an in-memory implementation in tests.
pub trait ChatBackend: Send + Sync {
    /// `GET /api/chats`, in server order
    fn list_chats(&self) -> impl Future<Output = Result<Vec<Chat>, TransportError>> + Send;

    /// `GET /api/chats/{chat}`, oldest message first
    fn fetch_history(
        &self,
        chat: &str,
    ) -> impl Future<Output = Result<Vec<Message>, TransportError>> + Send;

    /// `POST /api/chats/{chat}`, returns the persisted assistant reply
    fn post_message(
        &self,
        chat: &str,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<Message, TransportError>> + Send;

    /// `POST /api/messages/{id}/like`, flips the like flag server-side
    fn toggle_like(
        &self,
        id: MessageId,
    ) -> impl Future<Output = Result<LikeStatus, TransportError>> + Send;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Build a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one so a
    /// chat name can't escape its segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response)?;
        Ok(response.json().await?)
    }
}

fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status,
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

impl ChatBackend for ChatClient {
    async fn list_chats(&self) -> Result<Vec<Chat>, TransportError> {
        let url = self.endpoint(&["api", "chats"])?;
        self.get_json(url).await
    }

    async fn fetch_history(&self, chat: &str) -> Result<Vec<Message>, TransportError> {
        let url = self.endpoint(&["api", "chats", chat])?;
        self.get_json(url).await
    }

    async fn post_message(
        &self,
        chat: &str,
        message: &OutgoingMessage,
    ) -> Result<Message, TransportError> {
        let url = self.endpoint(&["api", "chats", chat])?;
        debug!(%url, "POST message");

        let response = self.client.post(url).json(message).send().await?;
        let response = ensure_success(response)?;
        Ok(response.json().await?)
    }

    async fn toggle_like(&self, id: MessageId) -> Result<LikeStatus, TransportError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "messages", &id, "like"])?;
        debug!(%url, "POST like");

        let response = self.client.post(url).send().await?;
        let response = ensure_success(response)?;
        Ok(response.json().await?)
    }
}
