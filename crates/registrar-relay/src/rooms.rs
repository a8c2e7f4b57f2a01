use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use registrar_types::events::ChatEvent;
use registrar_types::models::ChatMessage;

/// In-memory room log store: room id -> ordered message log.
///
/// Owned by the registry but constructed separately so tests (or a future
/// bounded/persistent variant) can hand in their own instance. Rooms are
/// created lazily on first join, never deleted, and lost on restart.
/// Logs are unbounded.
#[derive(Default)]
pub struct RoomHistory {
    rooms: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl RoomHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily create the room and return a snapshot of its current log.
    pub async fn join_snapshot(&self, room: &str) -> Vec<ChatMessage> {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room.to_string()).or_default().clone()
    }

    /// Append one line. The append is a single step under the write lock;
    /// relative delivery order of two concurrent sends is unspecified.
    pub async fn append(&self, room: &str, msg: ChatMessage) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room.to_string()).or_default().push(msg);
    }

    /// Current log for a room; empty if the room has never been joined.
    pub async fn log(&self, room: &str) -> Vec<ChatMessage> {
        self.rooms
            .read()
            .await
            .get(room)
            .cloned()
            .unwrap_or_default()
    }
}

/// Tracks live connections and per-room membership, and fans events out.
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    history: RoomHistory,
    /// room id -> connections currently joined
    members: RwLock<HashMap<String, HashSet<Uuid>>>,
    /// connection id -> outbound event channel
    connections: RwLock<HashMap<Uuid, mpsc::UnboundedSender<ChatEvent>>>,
}

impl RoomRegistry {
    pub fn new(history: RoomHistory) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                history,
                members: RwLock::new(HashMap::new()),
                connections: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn history(&self) -> &RoomHistory {
        &self.inner.history
    }

    /// Register a connection. Returns its id and the outbound event stream.
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<ChatEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.connections.write().await.insert(conn_id, tx);
        (conn_id, rx)
    }

    /// Drop a connection from every room and from the send table.
    /// Room history is untouched: rooms have no closed state.
    pub async fn unregister(&self, conn_id: Uuid) {
        self.inner.connections.write().await.remove(&conn_id);
        let mut members = self.inner.members.write().await;
        for room in members.values_mut() {
            room.remove(&conn_id);
        }
    }

    /// Add the connection to a room and return the log snapshot the caller
    /// should deliver back to that connection alone.
    pub async fn join(&self, conn_id: Uuid, room: &str) -> Vec<ChatMessage> {
        self.inner
            .members
            .write()
            .await
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);

        self.inner.history.join_snapshot(room).await
    }

    /// Deliver an event to one specific connection.
    pub async fn send_to(&self, conn_id: Uuid, event: ChatEvent) {
        let connections = self.inner.connections.read().await;
        if let Some(tx) = connections.get(&conn_id) {
            let _ = tx.send(event);
        }
    }

    /// Append to the room log, then broadcast the line to every current
    /// member — the sender's own connection included.
    pub async fn send(&self, room: &str, sender: String, message: String) {
        self.inner
            .history
            .append(
                room,
                ChatMessage {
                    sender: sender.clone(),
                    message: message.clone(),
                },
            )
            .await;

        let members = self.inner.members.read().await;
        let Some(room_members) = members.get(room) else {
            return;
        };

        let connections = self.inner.connections.read().await;
        for conn_id in room_members {
            if let Some(tx) = connections.get(conn_id) {
                let _ = tx.send(ChatEvent::NewMessage {
                    sender: sender.clone(),
                    message: message.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(RoomHistory::new())
    }

    #[tokio::test]
    async fn joining_a_fresh_room_yields_empty_history() {
        let registry = registry();
        let (conn, _rx) = registry.register().await;

        let history = registry.join(conn, "7").await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn second_connection_sees_prior_messages_on_join() {
        let registry = registry();
        let (first, _first_rx) = registry.register().await;
        registry.join(first, "7").await;
        registry.send("7", "admin".into(), "hi".into()).await;

        let (second, _second_rx) = registry.register().await;
        let history = registry.join(second, "7").await;
        assert_eq!(
            history,
            vec![ChatMessage {
                sender: "admin".into(),
                message: "hi".into()
            }]
        );
    }

    #[tokio::test]
    async fn sequential_sends_are_retained_in_order() {
        let registry = registry();
        let (conn, _rx) = registry.register().await;
        registry.join(conn, "3").await;

        registry.send("3", "admin".into(), "first".into()).await;
        registry.send("3", "alice".into(), "second".into()).await;

        let log = registry.history().log("3").await;
        let messages: Vec<&str> = log.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member_including_sender() {
        let registry = registry();
        let (admin, mut admin_rx) = registry.register().await;
        let (student, mut student_rx) = registry.register().await;
        registry.join(admin, "5").await;
        registry.join(student, "5").await;

        registry.send("5", "admin".into(), "hello".into()).await;

        for rx in [&mut admin_rx, &mut student_rx] {
            match rx.recv().await {
                Some(ChatEvent::NewMessage { sender, message }) => {
                    assert_eq!(sender, "admin");
                    assert_eq!(message, "hello");
                }
                other => panic!("expected NewMessage, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn messages_do_not_cross_rooms() {
        let registry = registry();
        let (in_room, mut in_rx) = registry.register().await;
        let (elsewhere, mut else_rx) = registry.register().await;
        registry.join(in_room, "1").await;
        registry.join(elsewhere, "2").await;

        registry.send("1", "admin".into(), "private".into()).await;

        assert!(matches!(in_rx.recv().await, Some(ChatEvent::NewMessage { .. })));
        assert!(else_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_keeps_room_history() {
        let registry = registry();
        let (conn, _rx) = registry.register().await;
        registry.join(conn, "9").await;
        registry.send("9", "alice".into(), "still here".into()).await;

        registry.unregister(conn).await;

        let (later, _later_rx) = registry.register().await;
        let history = registry.join(later, "9").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "still here");
    }
}
