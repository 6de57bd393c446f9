use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use storychat_core::{
    Block, ChatBackend, ChatClient, ChatSession, Chat, MessageId, OutgoingMessage, Role,
    SendOutcome, TransportError,
};

#[derive(Default)]
struct ServerState {
    posted: Mutex<Vec<(String, Value)>>,
    likes: Mutex<HashMap<i64, bool>>,
}

type Shared = Arc<ServerState>;

async fn list_chats() -> Json<Value> {
    Json(json!(["alpha", {"name": "night shift"}]))
}

async fn chat_history(Path(chat): Path<String>) -> Result<Json<Value>, StatusCode> {
    match chat.as_str() {
        "alpha" => Ok(Json(json!([
            {"role": "user", "content": "Tell a revenge story about a crow"},
            {"role": "assistant", "content": "The crow###remembered.", "id": 1, "liked": false}
        ]))),
        "night shift" => Ok(Json(json!([]))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn add_message(
    State(state): State<Shared>,
    Path(chat): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.posted.lock().unwrap().push((chat, body));
    Json(json!({"role": "assistant", "content": "And so###it ended.", "id": 42, "liked": false}))
}

async fn like_message(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let mut likes = state.likes.lock().unwrap();
    let liked = likes.entry(id).or_insert(false);
    *liked = !*liked;
    Json(json!({"liked": *liked}))
}

fn story_router(state: Shared) -> Router {
    Router::new()
        .route("/api/chats", get(list_chats))
        .route("/api/chats/{chat}", get(chat_history).post(add_message))
        .route("/api/messages/{id}/like", post(like_message))
        .with_state(state)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn story_server() -> (ChatClient, Shared) {
    let state = Shared::default();
    let url = serve(story_router(state.clone())).await;
    (ChatClient::new(&url), state)
}

#[tokio::test]
async fn test_list_chats_mixed_shapes() {
    let (client, _) = story_server().await;
    let chats = client.list_chats().await.unwrap();
    assert_eq!(chats, vec![Chat::new("alpha"), Chat::new("night shift")]);
}

#[tokio::test]
async fn test_fetch_history() {
    let (client, _) = story_server().await;
    let history = client.fetch_history("alpha").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].id, Some(MessageId(1)));
    assert_eq!(history[1].liked, Some(false));
}

#[tokio::test]
async fn test_chat_name_is_encoded() {
    let (client, _) = story_server().await;
    let history = client.fetch_history("night shift").await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let (client, _) = story_server().await;
    match client.fetch_history("missing").await {
        Err(TransportError::Status { status, url }) => {
            assert_eq!(status.as_u16(), 404);
            assert!(url.ends_with("/api/chats/missing"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_message_body_and_reply() {
    let (client, state) = story_server().await;
    let outgoing = OutgoingMessage::user("Tell a revenge story about a crow".to_string());

    let reply = client.post_message("alpha", &outgoing).await.unwrap();

    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.id, Some(MessageId(42)));
    let posted = state.posted.lock().unwrap();
    assert_eq!(
        posted.as_slice(),
        &[(
            "alpha".to_string(),
            json!({"role": "user", "content": "Tell a revenge story about a crow"})
        )]
    );
}

#[tokio::test]
async fn test_toggle_like_flips() {
    let (client, _) = story_server().await;
    assert!(client.toggle_like(MessageId(1)).await.unwrap().liked);
    assert!(!client.toggle_like(MessageId(1)).await.unwrap().liked);
}

#[tokio::test]
async fn test_server_error_on_list() {
    let app = Router::new().route(
        "/api/chats",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let client = ChatClient::new(&serve(app).await);

    match client.list_chats().await {
        Err(TransportError::Status { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_request_error() {
    let app = Router::new().route("/api/chats", get(|| async { "not json" }));
    let client = ChatClient::new(&serve(app).await);

    assert!(matches!(
        client.list_chats().await,
        Err(TransportError::Request(_))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatClient::new(&format!("http://{}", addr));
    assert!(matches!(
        client.list_chats().await,
        Err(TransportError::Request(_))
    ));
}

#[tokio::test]
async fn test_session_against_server() {
    let (client, state) = story_server().await;
    let mut session = ChatSession::new(client);

    session.initialize().await;
    assert_eq!(session.current_chat(), Some("alpha"));
    assert_eq!(session.blocks().len(), 2);

    assert_eq!(session.send("a crow").await, SendOutcome::Delivered);
    assert_eq!(session.blocks().len(), 4);
    assert_eq!(state.posted.lock().unwrap().len(), 1);

    let index = *session.likeable_indices().last().unwrap();
    assert_eq!(session.toggle_like(index).await, Some(true));
    match &session.blocks()[index] {
        Block::Message(entry) => assert_eq!(entry.view.like().map(|l| l.liked), Some(true)),
        other => panic!("expected reply, got {:?}", other),
    }
}
