// =============================================================================
// WebSocket Handler — Push-based dashboard updates
// =============================================================================
//
// Clients connect to `/api/v1/ws` and receive:
//   1. An immediate full DashboardSnapshot on connect.
//   2. A new snapshot whenever the state_version has changed, checked every
//      `ws_push_interval_ms` (500 ms by default).
//
// The handler also:
//   - Responds to Ping frames with Pong frames.
//   - Tracks the number of open connections on the AppState.
//   - Ignores text and binary frames; the feed is one-way.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::app_state::AppState;

// =============================================================================
// WebSocket upgrade handler
// =============================================================================

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("WebSocket connection accepted — upgrading");
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

// =============================================================================
// Connection handler
// =============================================================================

/// Manages a single WebSocket connection lifecycle.
///
/// Runs two concurrent branches via `tokio::select!`:
///   1. **Push loop** — on every push interval, send a new snapshot if the
///      state version moved.
///   2. **Recv loop** — process incoming client frames (Ping, Close).
async fn handle_ws_connection(socket: WebSocket, state: Arc<AppState>) {
    let clients = state.ws_clients.fetch_add(1, Ordering::SeqCst) + 1;
    info!(clients, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut sequence: u64 = 0;

    // Send the initial full snapshot immediately.
    let mut last_sent_version = match send_snapshot(&mut sender, &state, &mut sequence).await {
        Ok(version) => version,
        Err(e) => {
            warn!(error = %e, "Failed to send initial WebSocket snapshot");
            cleanup(&state);
            return;
        }
    };

    let mut push_interval = interval(Duration::from_millis(state.config.ws_push_interval_ms));

    loop {
        tokio::select! {
            _ = push_interval.tick() => {
                if state.current_state_version() == last_sent_version {
                    continue;
                }
                match send_snapshot(&mut sender, &state, &mut sequence).await {
                    Ok(version) => last_sent_version = version,
                    Err(e) => {
                        debug!(error = %e, "WebSocket send failed — disconnecting");
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            debug!(error = %e, "Failed to send Pong — disconnecting");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket Close frame received — disconnecting");
                        break;
                    }
                    Some(Ok(_)) => {
                        debug!("WebSocket inbound frame ignored");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error — disconnecting");
                        break;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        break;
                    }
                }
            }
        }
    }

    cleanup(&state);
}

// =============================================================================
// Helpers
// =============================================================================

/// Serialize and send the current snapshot. Returns the state version that
/// was sent.
async fn send_snapshot<S>(
    sender: &mut S,
    state: &Arc<AppState>,
    sequence: &mut u64,
) -> Result<u64, axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let snapshot = state.build_snapshot();

    match serde_json::to_string(&snapshot) {
        Ok(json) => {
            sender.send(Message::Text(json)).await?;
            state.ws_sequence_number.fetch_add(1, Ordering::Relaxed);
            *sequence += 1;
            debug!(
                version = snapshot.state_version,
                seq = *sequence,
                "WebSocket snapshot sent"
            );
        }
        Err(e) => {
            // Serialisation errors are not network errors; don't disconnect.
            warn!(error = %e, "Failed to serialize snapshot");
        }
    }

    Ok(snapshot.state_version)
}

/// Release the connection slot when a WebSocket closes.
fn cleanup(state: &Arc<AppState>) {
    let remaining = state.ws_clients.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
    info!(clients = remaining, "WebSocket connection closed — cleanup complete");
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message as ClientMessage;

    use crate::market_data::series::tests::sample_at;
    use crate::runtime_config::DashboardConfig;

    fn state(ws_push_interval_ms: u64) -> Arc<AppState> {
        let config = DashboardConfig {
            ws_push_interval_ms,
            ..DashboardConfig::default()
        };
        Arc::new(AppState::new(
            config,
            vec![
                sample_at(0, 2050.0, 2049.0, 2048.0, 25.0),
                sample_at(1, 2052.0, 2051.0, 2049.0, 28.0),
            ],
        ))
    }

    fn frame_version(text: &str) -> u64 {
        let json: serde_json::Value = serde_json::from_str(text).unwrap();
        json["state_version"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn send_snapshot_writes_one_text_frame() {
        let state = state(500);
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let mut sink = std::pin::pin!(futures_util::sink::unfold(
            tx,
            |tx: mpsc::UnboundedSender<Message>, msg: Message| async move {
                let _ = tx.send(msg);
                Ok::<_, axum::Error>(tx)
            }
        ));
        let mut sequence = 0;

        let version = send_snapshot(&mut sink, &state, &mut sequence).await.unwrap();

        assert_eq!(version, state.current_state_version());
        assert_eq!(sequence, 1);
        assert_eq!(state.ws_sequence_number.load(Ordering::Relaxed), 1);
        match rx.try_recv().unwrap() {
            Message::Text(text) => {
                assert_eq!(frame_version(&text), version);
                assert!(text.contains("\"symbol\":\"XAU/USD\""));
            }
            other => panic!("expected a text frame, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn socket_pushes_only_on_version_change() {
        let state = state(20);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = crate::api::rest::router(state.clone());
        let server = tokio::spawn(async move { axum::serve(listener, app).await });

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws"))
            .await
            .unwrap();

        // Initial snapshot on connect.
        match ws.next().await.unwrap().unwrap() {
            ClientMessage::Text(text) => assert_eq!(frame_version(&text), 1),
            other => panic!("expected a text frame, got {other:?}"),
        }
        assert_eq!(state.ws_clients.load(Ordering::SeqCst), 1);

        // Unchanged version: nothing is pushed across several push intervals.
        assert!(timeout(Duration::from_millis(150), ws.next()).await.is_err());

        state.apply_sample(sample_at(2, 2049.0, 2050.0, 2051.0, 75.0));
        let next = timeout(Duration::from_secs(2), ws.next()).await.unwrap();
        match next.unwrap().unwrap() {
            ClientMessage::Text(text) => assert_eq!(frame_version(&text), 2),
            other => panic!("expected a text frame, got {other:?}"),
        }

        ws.send(ClientMessage::Ping(vec![1, 2, 3])).await.unwrap();
        let pong = timeout(Duration::from_secs(2), async {
            loop {
                match ws.next().await {
                    Some(Ok(ClientMessage::Pong(data))) => break data,
                    Some(Ok(_)) => continue,
                    other => panic!("socket ended before Pong: {other:?}"),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(pong, vec![1, 2, 3]);

        ws.close(None).await.unwrap();
        timeout(Duration::from_secs(2), async {
            while state.ws_clients.load(Ordering::SeqCst) != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        server.abort();
    }
}
