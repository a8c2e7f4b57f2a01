use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use registrar_types::events::{ChatCommand, ChatEvent};

use crate::rooms::RoomRegistry;

/// Heartbeat interval: server pings every 15 seconds. A failed send at any
/// point tears the connection down.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Cap on how much of an unparseable frame gets logged.
const MAX_LOGGED_FRAME: usize = 200;

/// Clamp a raw frame for logging, backing off to the nearest char boundary
/// so multi-byte text can never panic the slice.
fn clamp_for_log(text: &str) -> &str {
    if text.len() <= MAX_LOGGED_FRAME {
        return text;
    }
    let mut end = MAX_LOGGED_FRAME;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Drive one WebSocket connection against the room registry.
///
/// The HTTP upgrade already required a valid session of either role, but the
/// room-pairing rule is enforced only where the chat page is rendered: any
/// connection that presents a room key here participates fully. See
/// DESIGN.md decision 4.
pub async fn handle_socket(socket: WebSocket, registry: RoomRegistry, username: String) {
    let (mut sender, mut receiver) = socket.split();

    let (conn_id, mut events_rx) = registry.register().await;
    info!("{} connected to chat relay ({})", username, conn_id);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("{} ({}) unserializable event: {}", username, conn_id, e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            frame = receiver.next() => {
                let Some(Ok(msg)) = frame else { break };
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ChatCommand>(&text) {
                        Ok(cmd) => handle_command(&registry, conn_id, cmd).await,
                        Err(e) => {
                            warn!(
                                "{} ({}) bad command: {} -- raw: {}",
                                username,
                                conn_id,
                                e,
                                clamp_for_log(&text)
                            );
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            _ = heartbeat.tick() => {
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    registry.unregister(conn_id).await;
    info!("{} disconnected from chat relay ({})", username, conn_id);
}

async fn handle_command(registry: &RoomRegistry, conn_id: Uuid, cmd: ChatCommand) {
    match cmd {
        ChatCommand::JoinRoom { room } => {
            // History replay goes to the joining connection only.
            let log = registry.join(conn_id, &room).await;
            registry.send_to(conn_id, ChatEvent::History(log)).await;
        }
        ChatCommand::SendMessage { room, message, sender } => {
            registry.send(&room, sender, message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_are_logged_whole() {
        assert_eq!(clamp_for_log("hi"), "hi");
        let exact = "a".repeat(MAX_LOGGED_FRAME);
        assert_eq!(clamp_for_log(&exact), exact);
    }

    #[test]
    fn clamp_backs_off_to_a_char_boundary() {
        // 201 bytes with a two-byte char straddling the cap.
        let frame = format!("{}é", "a".repeat(MAX_LOGGED_FRAME - 1));
        let clamped = clamp_for_log(&frame);
        assert_eq!(clamped, "a".repeat(MAX_LOGGED_FRAME - 1));

        let ascii = "a".repeat(MAX_LOGGED_FRAME + 50);
        assert_eq!(clamp_for_log(&ascii).len(), MAX_LOGGED_FRAME);
    }
}
