//! WebSocket relay tests: raw sockets and the reconnecting client.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use common::TestServer;
use freelance_hub::client::{ConnectionState, RelayClient, RelayClientConfig};
use freelance_hub::domain::UserRole;
use freelance_hub::ws::messages::ServerFrame;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn connect(server: &TestServer) -> Socket {
    let Ok((socket, _)) = connect_async(server.ws_url()).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn send(socket: &mut Socket, frame: Value) {
    if socket.send(Message::text(frame.to_string())).await.is_err() {
        panic!("ws send failed");
    }
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(WAIT, socket.next()).await else {
            panic!("no frame within {WAIT:?}");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                panic!("frame is not json: {text}");
            };
            return value;
        }
    }
}

async fn authenticate(socket: &mut Socket, token: &str) -> Value {
    send(socket, json!({ "type": "auth", "token": token })).await;
    next_json(socket).await
}

#[tokio::test]
async fn auth_frame_is_acknowledged() {
    let server = TestServer::start().await;
    let mut socket = connect(&server).await;
    let ack = authenticate(&mut socket, &server.token("alice", UserRole::User)).await;
    assert_eq!(ack["type"], "authenticated");
    assert_eq!(ack["data"]["userId"], "alice");
}

#[tokio::test]
async fn bad_token_and_garbage_get_error_frames() {
    let server = TestServer::start().await;
    let mut socket = connect(&server).await;

    let reply = authenticate(&mut socket, "not-a-jwt").await;
    assert_eq!(reply["type"], "error");

    send(&mut socket, json!({ "type": "subscribe" })).await;
    assert_eq!(next_json(&mut socket).await["type"], "error");

    send(&mut socket, json!({ "type": "ping" })).await;
    assert_eq!(next_json(&mut socket).await["type"], "pong");
}

#[tokio::test]
async fn new_message_reaches_only_the_receiver() {
    let server = TestServer::start().await;
    let seller_token = server.token("seller", UserRole::Seller);
    let buyer_token = server.token("buyer", UserRole::User);
    let service = server.listing(&seller_token, "Logo Design", "150.00").await;
    let order = server.order(&buyer_token, &service).await;

    let mut seller_socket = connect(&server).await;
    let mut buyer_socket = connect(&server).await;
    assert_eq!(authenticate(&mut seller_socket, &seller_token).await["type"], "authenticated");
    assert_eq!(authenticate(&mut buyer_socket, &buyer_token).await["type"], "authenticated");

    let (status, _) = server
        .post(
            &format!("/api/orders/{order}/messages"),
            &buyer_token,
            json!({ "message": "Can you start today?" }),
        )
        .await;
    assert_eq!(status, 201);

    let pushed = next_json(&mut seller_socket).await;
    assert_eq!(pushed["type"], "new_message");
    assert_eq!(pushed["data"]["message"], "Can you start today?");
    assert_eq!(pushed["data"]["orderId"], order.as_str());

    // The sender only sees the answer to its own ping.
    send(&mut buyer_socket, json!({ "type": "ping" })).await;
    assert_eq!(next_json(&mut buyer_socket).await["type"], "pong");
}

#[tokio::test]
async fn unauthenticated_socket_receives_nothing() {
    let server = TestServer::start().await;
    let seller_token = server.token("seller", UserRole::Seller);
    let buyer_token = server.token("buyer", UserRole::User);
    let service = server.listing(&seller_token, "Voice over", "60.00").await;
    let order = server.order(&buyer_token, &service).await;

    let mut anonymous = connect(&server).await;
    let (status, _) = server
        .post(
            &format!("/api/orders/{order}/messages"),
            &buyer_token,
            json!({ "message": "hello" }),
        )
        .await;
    assert_eq!(status, 201);

    send(&mut anonymous, json!({ "type": "ping" })).await;
    assert_eq!(next_json(&mut anonymous).await["type"], "pong");
}

#[tokio::test]
async fn relay_client_delivers_pushed_messages() {
    let server = TestServer::start().await;
    let seller_token = server.token("seller", UserRole::Seller);
    let buyer_token = server.token("buyer", UserRole::User);
    let service = server.listing(&seller_token, "Translation", "30.00").await;
    let order = server.order(&buyer_token, &service).await;

    let client = RelayClient::new(RelayClientConfig::new(server.ws_url(), seller_token));
    let mut state = client.state();
    let (frames_tx, mut frames) = mpsc::channel(16);
    let (stop_tx, stop_rx) = watch::channel(false);
    let runner = tokio::spawn(async move { client.run(frames_tx, stop_rx).await });

    let Ok(Some(ServerFrame::Authenticated(ack))) = tokio::time::timeout(WAIT, frames.recv()).await
    else {
        panic!("no auth ack");
    };
    assert_eq!(ack.user_id.as_str(), "seller");
    assert_eq!(*state.borrow_and_update(), ConnectionState::Connected);

    let (status, _) = server
        .post(
            &format!("/api/orders/{order}/messages"),
            &buyer_token,
            json!({ "message": "files attached" }),
        )
        .await;
    assert_eq!(status, 201);

    let Ok(Some(ServerFrame::NewMessage(message))) =
        tokio::time::timeout(WAIT, frames.recv()).await
    else {
        panic!("no pushed message");
    };
    assert_eq!(message.message, "files attached");

    let _ = stop_tx.send(true);
    let Ok(Ok(result)) = tokio::time::timeout(WAIT, runner).await else {
        panic!("client did not stop");
    };
    assert!(result.is_ok());
}
