use ratatui::widgets::ListState;
use storychat_core::{ChatBackend, ChatClient, ChatSession, Message, SendOutcome, TransportError};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chats,
    Transcript,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App<B = ChatClient> {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub input_mode: InputMode,
    pub server_url: String,
    pub loaded: bool,
    pub status: Option<String>,

    // Chat state
    pub session: ChatSession<B>,
    pub chat_state: ListState,
    pub send_task: Option<JoinHandle<Result<Message, TransportError>>>,

    // Transcript view state
    pub selected_reply: Option<usize>, // transcript index of the highlighted reply
    pub transcript_scroll: u16,
    pub transcript_height: u16,
    pub max_scroll: u16,
    pub follow_bottom: bool,
    pub reveal_selection: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl<B: ChatBackend + Clone + 'static> App<B> {
    pub fn new(backend: B, server_url: &str) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Chats,
            input_mode: InputMode::Normal,
            server_url: server_url.to_string(),
            loaded: false,
            status: None,

            session: ChatSession::new(backend),
            chat_state: ListState::default(),
            send_task: None,

            selected_reply: None,
            transcript_scroll: 0,
            transcript_height: 0,
            max_scroll: 0,
            follow_bottom: true,
            reveal_selection: false,

            animation_frame: 0,
        }
    }

    /// Load the chat list and the first chat's history
    pub async fn init(&mut self) {
        self.session.initialize().await;
        self.loaded = true;
        self.sync_chat_selection();
        self.after_transcript_reload();
    }

    fn sync_chat_selection(&mut self) {
        let current = self.session.current_chat();
        let idx = current.and_then(|name| self.session.chats().iter().position(|c| c.name == name));
        self.chat_state.select(idx.or(if self.session.chats().is_empty() { None } else { Some(0) }));
    }

    fn after_transcript_reload(&mut self) {
        self.selected_reply = None;
        self.scroll_to_bottom();
    }

    // Chat list navigation
    pub fn chat_nav_down(&mut self) {
        let len = self.session.chats().len();
        if len > 0 {
            let i = self.chat_state.selected().unwrap_or(0);
            self.chat_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn chat_nav_up(&mut self) {
        let i = self.chat_state.selected().unwrap_or(0);
        self.chat_state.select(Some(i.saturating_sub(1)));
    }

    pub fn chat_nav_first(&mut self) {
        if !self.session.chats().is_empty() {
            self.chat_state.select(Some(0));
        }
    }

    pub fn chat_nav_last(&mut self) {
        let len = self.session.chats().len();
        if len > 0 {
            self.chat_state.select(Some(len - 1));
        }
    }

    /// Open the highlighted chat
    pub async fn open_selected_chat(&mut self) {
        let Some(name) = self
            .chat_state
            .selected()
            .and_then(|i| self.session.chats().get(i))
            .map(|chat| chat.name.clone())
        else {
            return;
        };

        if self.session.select_chat(&name).await {
            self.status = None;
            self.after_transcript_reload();
        } else {
            self.status = Some("Wait for the reply before switching chats".to_string());
            self.sync_chat_selection();
        }
    }

    /// Reload the current chat's history from the backend
    pub async fn reload_current_chat(&mut self) {
        let Some(name) = self.session.current_chat().map(str::to_string) else {
            return;
        };
        if self.session.select_chat(&name).await {
            self.after_transcript_reload();
        }
    }

    // Sending
    pub fn submit(&mut self) {
        let Some(pending) = self.session.submit() else {
            return;
        };

        self.status = None;
        self.scroll_to_bottom();

        let backend = self.session.backend().clone();
        self.send_task = Some(tokio::spawn(async move { pending.dispatch(&backend).await }));
    }

    /// Apply the result of a finished send task, if there is one
    pub async fn poll_send_task(&mut self) {
        if !self.send_task.as_ref().is_some_and(|task| task.is_finished()) {
            return;
        }
        let Some(task) = self.send_task.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(TransportError::Interrupted(e.to_string())),
        };

        if self.session.finish_send(result) == SendOutcome::Delivered {
            self.focus_input();
        }
        self.scroll_to_bottom();
    }

    // Focus
    pub fn focus_input(&mut self) {
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
        self.session.set_input_focused(true);
    }

    pub fn set_focus(&mut self, focus: FocusPane) {
        if focus == FocusPane::Input {
            self.focus_input();
            return;
        }
        self.focus = focus;
        self.input_mode = InputMode::Normal;
        self.session.set_input_focused(false);
        if focus == FocusPane::Transcript && self.selected_reply.is_none() {
            self.selected_reply = self.session.likeable_indices().last().copied();
            self.reveal_selection = true;
        }
    }

    /// Tab cycles: Chats -> Transcript -> Input -> Chats
    pub fn cycle_focus(&mut self) {
        let next = match self.focus {
            FocusPane::Chats => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::Input,
            FocusPane::Input => FocusPane::Chats,
        };
        self.set_focus(next);
    }

    // Reply selection (like targets)
    pub fn reply_nav_down(&mut self) {
        let likeable = self.session.likeable_indices();
        self.selected_reply = match self.selected_reply {
            Some(current) => likeable.iter().copied().find(|&i| i > current).or(Some(current)),
            None => likeable.first().copied(),
        };
        self.reveal_selection = true;
    }

    pub fn reply_nav_up(&mut self) {
        let likeable = self.session.likeable_indices();
        self.selected_reply = match self.selected_reply {
            Some(current) => likeable.iter().rev().copied().find(|&i| i < current).or(Some(current)),
            None => likeable.last().copied(),
        };
        self.reveal_selection = true;
    }

    pub async fn toggle_selected_like(&mut self) {
        if let Some(index) = self.selected_reply {
            self.session.toggle_like(index).await;
        }
    }

    // Scrolling
    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.transcript_scroll = 0;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(self.max_scroll);
        self.follow_bottom = self.transcript_scroll >= self.max_scroll;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.transcript_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.transcript_height / 2).max(1));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.input_locked() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
