//! Message rendering.
//!
//! [`render`] is pure: it turns a [`Message`] into a [`MessageView`] that
//! describes what to draw, including a declared like handler for persisted
//! replies. Running that handler against the backend is a separate step
//! ([`LikeToggle::toggle`]), so drawing never performs I/O.

use tracing::{debug, error};

use crate::client::ChatBackend;
use crate::error::TransportError;
use crate::segment::{segment, DisplayBlock};
use crate::state::{LikeStatus, Message, MessageId, Role};

pub const LIKED_ICON: &str = "❤️";
pub const UNLIKED_ICON: &str = "♡";

/// Display description of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageView {
    /// A single line, `role: content`, with the content shown verbatim
    User { role: Role, content: String },
    /// A header with the role and an optional like toggle, then the
    /// segmented body
    Reply {
        role: Role,
        like: Option<LikeToggle>,
        body: Vec<DisplayBlock>,
    },
}

/// The heart next to a persisted reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub message_id: MessageId,
    pub liked: bool,
}

/// What clicking a like toggle asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeAction {
    pub message_id: MessageId,
}

pub fn render(message: &Message) -> MessageView {
    match message.role {
        Role::User => MessageView::User {
            role: message.role.clone(),
            content: message.content.clone(),
        },
        _ => MessageView::Reply {
            role: message.role.clone(),
            // Optimistic copies have no id, so there is nothing to like
            like: message.id.map(|message_id| LikeToggle {
                message_id,
                liked: message.liked.unwrap_or(false),
            }),
            body: segment(&message.content),
        },
    }
}

impl MessageView {
    pub fn role(&self) -> &Role {
        match self {
            MessageView::User { role, .. } | MessageView::Reply { role, .. } => role,
        }
    }

    pub fn like(&self) -> Option<&LikeToggle> {
        match self {
            MessageView::Reply { like, .. } => like.as_ref(),
            MessageView::User { .. } => None,
        }
    }

    pub fn like_mut(&mut self) -> Option<&mut LikeToggle> {
        match self {
            MessageView::Reply { like, .. } => like.as_mut(),
            MessageView::User { .. } => None,
        }
    }

    pub fn like_action(&self) -> Option<LikeAction> {
        self.like().map(LikeToggle::action)
    }

    /// Plain-text rendering: the header line, then the body
    pub fn to_text(&self) -> String {
        match self {
            MessageView::User { role, content } => format!("{}: {}", role, content),
            MessageView::Reply { role, like, body } => {
                let header = match like {
                    Some(toggle) => format!("{}: {}", role, toggle.icon()),
                    None => format!("{}:", role),
                };
                format!("{}\n{}", header, body_text(body))
            }
        }
    }
}

/// Flatten display blocks into text. Runs join inline and each break ends
/// a line, so a pair of breaks leaves a blank line between paragraphs.
pub fn body_text(blocks: &[DisplayBlock]) -> String {
    let mut text = String::new();
    for block in blocks {
        match block {
            DisplayBlock::Text(run) => text.push_str(run),
            DisplayBlock::Break => text.push('\n'),
        }
    }
    text
}

impl LikeToggle {
    pub fn icon(&self) -> &'static str {
        if self.liked {
            LIKED_ICON
        } else {
            UNLIKED_ICON
        }
    }

    pub fn action(&self) -> LikeAction {
        LikeAction {
            message_id: self.message_id,
        }
    }

    /// Flip the like state on the backend and adopt the answer.
    ///
    /// Failures leave the toggle untouched and are only logged.
    pub async fn toggle<B: ChatBackend>(&mut self, backend: &B) -> Option<bool> {
        match self.action().run(backend).await {
            Ok(status) => {
                debug!(message_id = %self.message_id, liked = status.liked, "like toggled");
                self.liked = status.liked;
                Some(status.liked)
            }
            Err(e) => {
                error!(message_id = %self.message_id, error = %e, "error toggling like");
                None
            }
        }
    }
}

impl LikeAction {
    pub async fn run<B: ChatBackend>(self, backend: &B) -> Result<LikeStatus, TransportError> {
        backend.toggle_like(self.message_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(id: Option<i64>, liked: Option<bool>, content: &str) -> Message {
        Message {
            id: id.map(MessageId),
            role: Role::Assistant,
            content: content.to_string(),
            liked,
        }
    }

    #[test]
    fn test_user_message_is_literal() {
        let view = render(&Message::user("a###b###c"));
        assert_eq!(
            view,
            MessageView::User {
                role: Role::User,
                content: "a###b###c".to_string()
            }
        );
        assert_eq!(view.to_text(), "user: a###b###c");
        assert!(view.like_action().is_none());
    }

    #[test]
    fn test_reply_is_segmented() {
        let view = render(&reply(Some(4), Some(false), "a###b###c"));
        match &view {
            MessageView::Reply { body, .. } => assert_eq!(body, &segment("a###b###c")),
            other => panic!("expected reply, got {:?}", other),
        }
        assert_eq!(view.to_text(), "assistant: ♡\nab\n\nc");
    }

    #[test]
    fn test_reply_like_state() {
        let view = render(&reply(Some(9), Some(true), "done"));
        let like = view.like().unwrap();
        assert_eq!(like.message_id, MessageId(9));
        assert!(like.liked);
        assert_eq!(like.icon(), LIKED_ICON);
        assert_eq!(view.like_action(), Some(LikeAction { message_id: MessageId(9) }));
    }

    #[test]
    fn test_missing_liked_defaults_to_not_liked() {
        let view = render(&reply(Some(1), None, "done"));
        assert_eq!(view.like().map(|l| l.liked), Some(false));
    }

    #[test]
    fn test_reply_without_id_has_no_toggle() {
        let view = render(&reply(None, Some(true), "draft"));
        assert!(view.like().is_none());
        assert!(view.like_action().is_none());
        assert_eq!(view.to_text(), "assistant:\ndraft");
    }

    #[test]
    fn test_other_roles_render_as_replies() {
        let msg = Message {
            id: None,
            role: Role::Other("narrator".to_string()),
            content: "x".to_string(),
            liked: None,
        };
        let view = render(&msg);
        assert!(matches!(view, MessageView::Reply { .. }));
        assert_eq!(view.role().as_str(), "narrator");
    }

    #[test]
    fn test_body_text() {
        assert_eq!(body_text(&segment("")), "");
        assert_eq!(body_text(&segment("one###two###three")), "onetwo\n\nthree");
    }
}
