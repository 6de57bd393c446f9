use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use storychat_core::ChatBackend;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event<B: ChatBackend + Clone + 'static>(app: &mut App<B>, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

async fn handle_key<B: ChatBackend + Clone + 'static>(app: &mut App<B>, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key).await,
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

async fn handle_normal_mode<B: ChatBackend + Clone + 'static>(app: &mut App<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Char('i') | KeyCode::Char('/') => app.set_focus(FocusPane::Input),
        KeyCode::Char('r') => app.reload_current_chat().await,
        _ => match app.focus {
            FocusPane::Chats => handle_chats_key(app, key).await,
            FocusPane::Transcript => handle_transcript_key(app, key).await,
            // Input focus always edits
            FocusPane::Input => {}
        },
    }
}

async fn handle_chats_key<B: ChatBackend + Clone + 'static>(app: &mut App<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.chat_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.chat_nav_up(),
        KeyCode::Char('g') => app.chat_nav_first(),
        KeyCode::Char('G') => app.chat_nav_last(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_chat().await,
        _ => {}
    }
}

async fn handle_transcript_key<B: ChatBackend + Clone + 'static>(app: &mut App<B>, key: KeyEvent) {
    match key.code {
        // Half-page scroll (must be before plain 'd'/'u' style keys)
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),

        // Move between replies that can be liked
        KeyCode::Char('j') | KeyCode::Down => app.reply_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.reply_nav_up(),

        KeyCode::Char('l') | KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_selected_like().await;
        }

        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => app.set_focus(FocusPane::Chats),
        _ => {}
    }
}

fn handle_editing_mode<B: ChatBackend + Clone + 'static>(app: &mut App<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.set_focus(FocusPane::Transcript),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => app.submit(),
        _ => {
            // Edits are dropped while a send holds the input lock
            let Some(composer) = app.session.composer_mut() else {
                return;
            };
            match key.code {
                KeyCode::Backspace => composer.backspace(),
                KeyCode::Delete => composer.delete(),
                KeyCode::Left => composer.left(),
                KeyCode::Right => composer.right(),
                KeyCode::Home => composer.home(),
                KeyCode::End => composer.end(),
                KeyCode::Char(c) => composer.insert(c),
                _ => {}
            }
        }
    }
}

fn handle_mouse<B: ChatBackend + Clone + 'static>(app: &mut App<B>, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}
