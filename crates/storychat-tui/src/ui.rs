use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block as Panel, Borders, List, ListItem, Paragraph, Wrap},
};
use storychat_core::render::body_text;
use storychat_core::{Block, ChatBackend, MessageView, Phase};
use unicode_width::UnicodeWidthStr;
use crate::app::{App, FocusPane, InputMode};

fn role_style(view: &MessageView) -> Style {
    match view {
        MessageView::User { .. } => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        MessageView::Reply { .. } => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}

/// Lines for one message. User content is shown verbatim; reply bodies are
/// laid out from their display blocks.
fn message_lines(view: &MessageView, selected: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let role = Span::styled(format!("{}:", view.role()), role_style(view));

    match view {
        MessageView::User { content, .. } => {
            let mut parts = content.split('\n');
            let first = parts.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![role, Span::raw(" "), Span::raw(first)]));
            lines.extend(parts.map(|part| Line::from(part.to_string())));
        }
        MessageView::Reply { like, body, .. } => {
            let mut header = Vec::new();
            if selected {
                header.push(Span::styled("▶ ", Style::default().fg(Color::Magenta)));
            }
            header.push(role);
            if let Some(toggle) = like {
                let heart_style = if toggle.liked {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                header.push(Span::raw(" "));
                header.push(Span::styled(toggle.icon(), heart_style));
            }
            lines.push(Line::from(header));

            // Reply text is shown exactly as the backend sent it
            lines.extend(body_text(body).split('\n').map(|line| Line::from(line.to_string())));
        }
    }

    lines.push(Line::default());
    lines
}

/// Rows a line takes once word-wrapped to `width` the way the transcript
/// paragraph wraps it
fn wrapped_height(line: &Line, width: u16) -> u16 {
    let rows = Paragraph::new(line.clone())
        .wrap(Wrap { trim: false })
        .line_count(width.max(1));
    u16::try_from(rows.max(1)).unwrap_or(u16::MAX)
}

/// Terminal column of the composer cursor, relative to the text start
fn cursor_column(text: &str, cursor: usize) -> u16 {
    let prefix: String = text.chars().take(cursor).collect();
    u16::try_from(prefix.width()).unwrap_or(u16::MAX)
}

pub fn render<B: ChatBackend>(app: &mut App<B>, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [chats_area, main_area] = Layout::horizontal([
        Constraint::Percentage(25),
        Constraint::Percentage(75),
    ])
    .areas(body_area);

    let [transcript_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(main_area);

    render_chat_list(app, frame, chats_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header<B: ChatBackend>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let chat = app
        .session
        .current_chat()
        .map(|name| format!(" {} ", name))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" storychat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(chat, Style::default().fg(Color::White)),
        Span::styled(format!(" {} ", app.server_url), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

fn render_chat_list<B: ChatBackend>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    let panel = Panel::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Chats)))
        .title(" Chats ");

    if app.session.chats().is_empty() {
        let text = if app.loaded { "No chats" } else { "Loading..." };
        let empty = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))).block(panel);
        frame.render_widget(empty, area);
        return;
    }

    let current = app.session.current_chat();
    let items: Vec<ListItem> = app
        .session
        .chats()
        .iter()
        .map(|chat| {
            let style = if Some(chat.name.as_str()) == current {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(chat.name.clone(), style))
        })
        .collect();

    let list = List::new(items)
        .block(panel)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.chat_state);
}

fn render_transcript<B: ChatBackend>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    let panel = Panel::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Transcript)))
        .title(" Transcript ");

    let inner_width = area.width.saturating_sub(2);
    app.transcript_height = area.height.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    let mut rows: u16 = 0;
    let mut selected_row: Option<u16> = None;

    for (i, block) in app.session.blocks().iter().enumerate() {
        let block_lines = match block {
            Block::Message(entry) => {
                let selected = app.focus == FocusPane::Transcript && app.selected_reply == Some(i);
                if selected {
                    selected_row = Some(rows);
                }
                message_lines(&entry.view, selected)
            }
            Block::Pending => {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                vec![
                    Line::from(Span::styled(
                        "assistant:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("Thinking{}", dots),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )),
                ]
            }
            Block::Notice(notice) => vec![Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Red),
            ))],
        };

        for line in block_lines {
            rows = rows.saturating_add(wrapped_height(&line, inner_width));
            lines.push(line);
        }
    }

    app.max_scroll = rows.saturating_sub(app.transcript_height);
    if app.reveal_selection {
        if let Some(row) = selected_row {
            let visible = app.transcript_scroll..app.transcript_scroll.saturating_add(app.transcript_height);
            if !visible.contains(&row) {
                app.transcript_scroll = row.min(app.max_scroll);
                app.follow_bottom = false;
            }
        }
        app.reveal_selection = false;
    }
    if app.follow_bottom {
        app.transcript_scroll = app.max_scroll;
    }
    app.transcript_scroll = app.transcript_scroll.min(app.max_scroll);

    let text = if lines.is_empty() {
        let hint = match app.session.phase() {
            Phase::Idle if !app.loaded => "Loading chats...",
            Phase::Idle => "No chat selected.",
            _ => "No messages yet. Type below to start a story.",
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(lines)
    };

    let transcript = Paragraph::new(text)
        .block(panel)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input<B: ChatBackend>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Input;
    let locked = app.session.input_locked();

    let title = if locked {
        " Waiting for reply... "
    } else if app.session.current_chat().is_none() {
        " Select a chat first "
    } else {
        " Message "
    };

    let panel = Panel::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(title);

    let composer = app.session.composer();
    let style = if locked {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Span::styled(composer.text().to_string(), style)).block(panel);
    frame.render_widget(input, area);

    if focused && !locked && app.input_mode == InputMode::Editing {
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(cursor_column(composer.text(), composer.cursor()));
        let max_x = area.x.saturating_add(area.width.saturating_sub(2));
        frame.set_cursor_position((x.min(max_x), area.y + 1));
    }
}

fn render_footer<B: ChatBackend>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];
    match app.focus {
        FocusPane::Chats => {
            spans.extend(hint(" j/k ", " nav "));
            spans.extend(hint(" Enter ", " open "));
        }
        FocusPane::Transcript => {
            spans.extend(hint(" j/k ", " reply "));
            spans.extend(hint(" l ", " like "));
            spans.extend(hint(" ^d/^u ", " scroll "));
        }
        FocusPane::Input => {
            spans.extend(hint(" Enter ", " send "));
            spans.extend(hint(" Esc ", " stop editing "));
        }
    }
    spans.extend(hint(" Tab ", " focus "));
    if app.input_mode == InputMode::Normal {
        spans.extend(hint(" r ", " reload "));
        spans.extend(hint(" q ", " quit "));
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {} ", status), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
