pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod segment;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatBackend, ChatClient};
pub use config::Config;
pub use error::TransportError;
pub use render::{render, LikeAction, LikeToggle, MessageView};
pub use segment::{segment, DisplayBlock};
pub use session::{Block, ChatSession, Composer, EntryKey, PendingSend, Phase, SendOutcome, TranscriptEntry};
pub use state::{Chat, LikeStatus, Message, MessageId, OutgoingMessage, Role};
