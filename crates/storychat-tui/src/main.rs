use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use storychat_core::session::frame_outgoing;
use storychat_core::{render, ChatBackend, ChatClient, Config, Message, MessageId, OutgoingMessage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "storychat", version)]
#[command(about = "Terminal client for browsing and writing revenge stories with a chat server")]
struct Cli {
    /// Chat server URL (overrides STORYCHAT_SERVER and the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Where the interactive client writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive client (default)
    Tui,
    /// List available chats
    Chats,
    /// Print a chat's messages
    History {
        /// Chat name
        chat: String,
    },
    /// Send one message to a chat and print the reply
    Send {
        /// Chat name
        chat: String,
        /// Story subject
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Toggle the like flag on a reply
    Like {
        /// Message id
        id: i64,
    },
    /// Remember a server URL in the config file
    SetServer {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(e)),
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    match &command {
        Commands::Tui => {
            let log_file = config.resolve_log_file(cli.log_file.as_deref())?;
            init_logging(Some(&log_file))?;
        }
        _ => init_logging(None)?,
    }
    if let Some(e) = config_error {
        warn!(error = %e, "could not read config file, using defaults");
    }

    let server_url = config.resolve_server_url(cli.server.as_deref());
    let client = ChatClient::with_timeout(&server_url, config.request_timeout())?;

    match command {
        Commands::Tui => run_tui(client, &server_url).await?,
        Commands::Chats => list_chats(&client).await?,
        Commands::History { chat } => print_history(&client, &chat).await?,
        Commands::Send { chat, text } => send_message(&client, &chat, &text.join(" ")).await?,
        Commands::Like { id } => toggle_like(&client, MessageId(id)).await?,
        Commands::SetServer { url } => {
            Config::save_server_url(&url)?;
            println!("Server set to {}", url);
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        // The terminal UI owns stderr, so interactive runs log to a file
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

async fn run_tui(client: ChatClient, server_url: &str) -> Result<()> {
    info!(server = server_url, "starting interactive client");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client, server_url);

    let result = async {
        // Draw once so the loading state shows while the chat list loads
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        app.init().await;

        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
            app.poll_send_task().await;
        }
        anyhow::Ok(())
    }
    .await;

    tui::restore()?;
    result
}

async fn list_chats(client: &ChatClient) -> Result<()> {
    let chats = client.list_chats().await?;

    if chats.is_empty() {
        println!("No chats found.");
        return Ok(());
    }
    for chat in chats {
        println!("{}", chat.name);
    }
    Ok(())
}

async fn print_history(client: &ChatClient, chat: &str) -> Result<()> {
    let history = client.fetch_history(chat).await?;

    if history.is_empty() {
        println!("No messages in {}.", chat);
        return Ok(());
    }
    for message in &history {
        println!("{}\n", render(message).to_text());
    }
    Ok(())
}

async fn send_message(client: &ChatClient, chat: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Nothing to send");
    }

    let message = OutgoingMessage::user(frame_outgoing(text));
    println!("{}\n", render(&Message::from(&message)).to_text());

    let reply = client.post_message(chat, &message).await?;
    println!("{}", render(&reply).to_text());
    if let Some(id) = reply.id {
        println!("\n(message id {})", id);
    }
    Ok(())
}

async fn toggle_like(client: &ChatClient, id: MessageId) -> Result<()> {
    let status = client.toggle_like(id).await?;
    let state = if status.liked { "liked" } else { "not liked" };
    println!("Message {} is now {}", id, state);
    Ok(())
}
