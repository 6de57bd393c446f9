//! The stateful core of the client.
//!
//! A [`ChatSession`] owns the selected chat, the rendered transcript, and the
//! composer buffer. Every transition goes through a method here that checks
//! its preconditions first; the front-end never edits this state directly.
//!
//! Sending is split in two so a UI can keep drawing while the request is in
//! flight: [`ChatSession::begin_send`] locks input and appends the optimistic
//! message and pending indicator, and [`ChatSession::finish_send`] applies the
//! backend's answer. [`ChatSession::send`] runs both halves back to back.

use tracing::{debug, error, warn};

use crate::client::ChatBackend;
use crate::error::TransportError;
use crate::render::{render, MessageView};
use crate::state::{Chat, Message, MessageId, OutgoingMessage};

/// Framing applied to every outgoing message
pub const FRAMING_PREFIX: &str = "Tell a revenge story about ";

pub const CHATS_ERROR_NOTICE: &str = "Error loading chats.";

pub fn frame_outgoing(text: &str) -> String {
    format!("{}{}", FRAMING_PREFIX, text.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No chat loaded
    Idle,
    /// A chat is selected and input is open
    ChatSelected,
    /// A message is in flight and input is locked
    Sending,
}

/// Identity of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    /// Came from the backend; user turns in history carry no id
    Persisted(Option<MessageId>),
    /// Rendered optimistically before the backend saw it. Never reconciled.
    Provisional(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub key: EntryKey,
    pub view: MessageView,
}

/// One row of the transcript view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Message(TranscriptEntry),
    /// Shown only while a send is outstanding
    Pending,
    /// Plain-text error notice replacing the transcript
    Notice(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A precondition failed; nothing happened
    Rejected,
    /// The reply was appended
    Delivered,
    /// The request failed; the optimistic message stays unanswered
    Failed,
}

/// A send that has been applied locally and still needs its request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub chat: String,
    pub message: OutgoingMessage,
}

impl PendingSend {
    pub async fn dispatch<B: ChatBackend>(&self, backend: &B) -> Result<Message, TransportError> {
        backend.post_message(&self.chat, &self.message).await
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// The message input box. `cursor` counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
    cursor: usize,
}

impl Composer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

pub struct ChatSession<B> {
    backend: B,
    chats: Vec<Chat>,
    current_chat: Option<String>,
    phase: Phase,
    blocks: Vec<Block>,
    composer: Composer,
    input_focused: bool,
    next_provisional: u64,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            chats: Vec::new(),
            current_chat: None,
            phase: Phase::Idle,
            blocks: Vec::new(),
            composer: Composer::default(),
            input_focused: false,
            next_provisional: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn current_chat(&self) -> Option<&str> {
        self.current_chat.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn input_locked(&self) -> bool {
        self.phase == Phase::Sending
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn set_input_focused(&mut self, focused: bool) {
        self.input_focused = focused;
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The composer, or `None` while a send holds the input lock
    pub fn composer_mut(&mut self) -> Option<&mut Composer> {
        if self.input_locked() {
            None
        } else {
            Some(&mut self.composer)
        }
    }

    /// Transcript indices of entries that carry a like toggle
    pub fn likeable_indices(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| match block {
                Block::Message(entry) if entry.view.like().is_some() => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Load the chat list and open the first chat the backend lists.
    pub async fn initialize(&mut self) {
        if self.input_locked() {
            warn!("initialize ignored while a send is in flight");
            return;
        }

        match self.backend.list_chats().await {
            Ok(chats) => {
                debug!(count = chats.len(), "chats loaded");
                let first = chats.first().map(|chat| chat.name.clone());
                self.chats = chats;

                match first {
                    Some(name) => {
                        self.select_chat(&name).await;
                    }
                    None => {
                        self.current_chat = None;
                        self.blocks.clear();
                        self.phase = Phase::Idle;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "failed to load chats");
                self.chats.clear();
                self.current_chat = None;
                self.blocks = vec![Block::Notice(CHATS_ERROR_NOTICE.to_string())];
                self.phase = Phase::Idle;
            }
        }
    }

    /// Switch to `name` and replace the transcript with its history.
    ///
    /// Returns `false` without touching anything while a send is in flight.
    pub async fn select_chat(&mut self, name: &str) -> bool {
        if self.input_locked() {
            warn!(chat = name, "chat selection blocked while a send is in flight");
            return false;
        }

        self.current_chat = Some(name.to_string());
        self.phase = Phase::ChatSelected;

        match self.backend.fetch_history(name).await {
            Ok(history) => {
                debug!(chat = name, count = history.len(), "history loaded");
                self.blocks = history
                    .iter()
                    .map(|msg| {
                        Block::Message(TranscriptEntry {
                            key: EntryKey::Persisted(msg.id),
                            view: render(msg),
                        })
                    })
                    .collect();
            }
            Err(e) => {
                error!(chat = name, error = %e, "failed to load messages");
                self.blocks = vec![Block::Notice(format!("Error loading messages for {}.", name))];
            }
        }

        true
    }

    /// Apply the local half of a send: lock input, clear the composer, show
    /// the framed user message and the pending indicator.
    ///
    /// Returns `None` (a no-op) for blank text, with no chat selected, or
    /// while another send is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.input_locked() {
            return None;
        }
        let chat = self.current_chat.clone()?;

        self.phase = Phase::Sending;
        self.composer.clear();

        let message = OutgoingMessage::user(frame_outgoing(trimmed));
        let key = EntryKey::Provisional(self.next_provisional);
        self.next_provisional += 1;

        self.blocks.push(Block::Message(TranscriptEntry {
            key,
            view: render(&Message::from(&message)),
        }));
        self.blocks.push(Block::Pending);

        debug!(chat = %chat, "send started");
        Some(PendingSend { chat, message })
    }

    /// `begin_send` with whatever is in the composer
    pub fn submit(&mut self) -> Option<PendingSend> {
        let text = self.composer.text().to_string();
        self.begin_send(&text)
    }

    /// Apply the backend's answer to an outstanding send and unlock input.
    pub fn finish_send(&mut self, result: Result<Message, TransportError>) -> SendOutcome {
        if self.phase != Phase::Sending {
            warn!("send result arrived with no send in flight");
            return SendOutcome::Rejected;
        }

        self.blocks.retain(|block| !matches!(block, Block::Pending));
        self.phase = Phase::ChatSelected;

        match result {
            Ok(reply) => {
                debug!(message_id = ?reply.id, "reply received");
                self.blocks.push(Block::Message(TranscriptEntry {
                    key: EntryKey::Persisted(reply.id),
                    view: render(&reply),
                }));
                self.input_focused = true;
                SendOutcome::Delivered
            }
            Err(e) => {
                error!(chat = ?self.current_chat, error = %e, "failed to send message");
                SendOutcome::Failed
            }
        }
    }

    /// Run a complete send against the backend.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Rejected;
        };
        let result = pending.dispatch(&self.backend).await;
        self.finish_send(result)
    }

    /// Toggle the like flag of the entry at `index`.
    ///
    /// Returns the new state, or `None` when the entry has no toggle or the
    /// request failed.
    pub async fn toggle_like(&mut self, index: usize) -> Option<bool> {
        let Some(Block::Message(entry)) = self.blocks.get_mut(index) else {
            return None;
        };
        let toggle = entry.view.like_mut()?;
        toggle.toggle(&self.backend).await
    }
}
