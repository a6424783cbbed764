//! relay-listen: prints chat messages pushed to a user.
//!
//! Reads `RELAY_URL` (default `ws://127.0.0.1:5000/ws`) and `RELAY_TOKEN`
//! from the environment or a `.env` file, connects, and prints every frame
//! until Ctrl-C or until reconnects are exhausted.

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use freelance_hub::client::{RelayClient, RelayClientConfig};
use freelance_hub::ws::messages::ServerFrame;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url =
        std::env::var("RELAY_URL").unwrap_or_else(|_| "ws://127.0.0.1:5000/ws".to_string());
    let token = std::env::var("RELAY_TOKEN").context("RELAY_TOKEN must be set")?;

    let client = RelayClient::new(RelayClientConfig::new(url, token));
    let (frame_tx, mut frame_rx) = mpsc::channel(64);
    let (stop_tx, stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            match frame {
                ServerFrame::NewMessage(msg) => {
                    println!(
                        "[{}] order {} from {}: {}",
                        msg.created_at.format("%H:%M:%S"),
                        msg.order_id,
                        msg.sender_id,
                        msg.message
                    );
                }
                ServerFrame::Authenticated(ack) => {
                    println!("listening as {}", ack.user_id);
                }
                ServerFrame::Error(err) => eprintln!("relay error: {}", err.message),
                ServerFrame::Pong => {}
            }
        }
    });

    client
        .run(frame_tx, stop_rx)
        .await
        .context("relay connection lost")?;
    printer.await.context("printer task failed")?;
    Ok(())
}
