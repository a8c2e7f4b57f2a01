use serde::{Deserialize, Serialize};

use crate::models::ChatMessage;

/// Commands sent FROM client TO server over the chat WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatCommand {
    /// Enter a room. The server replies with `history` to this connection
    /// only, creating the room's log lazily if it does not exist yet.
    JoinRoom { room: String },

    /// Append a line to a room's log and broadcast it room-wide.
    SendMessage {
        room: String,
        message: String,
        sender: String,
    },
}

/// Events sent FROM server TO client over the chat WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Full room log, delivered only to a connection that just joined.
    History(Vec<ChatMessage>),

    /// A freshly appended line, delivered to every room member including
    /// the sender.
    NewMessage { sender: String, message: String },
}
