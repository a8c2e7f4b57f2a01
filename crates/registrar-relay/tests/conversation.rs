//! End-to-end registry exercise: an admin/student conversation in one room,
//! with a late rejoin replaying the full log.

use registrar_relay::rooms::{RoomHistory, RoomRegistry};
use registrar_types::events::ChatEvent;

#[tokio::test]
async fn admin_student_conversation_round_trip() {
    let registry = RoomRegistry::new(RoomHistory::new());

    // Admin opens the chat with student 7 first.
    let (admin, mut admin_rx) = registry.register().await;
    let history = registry.join(admin, "7").await;
    assert!(history.is_empty(), "fresh room must start empty");

    registry.send("7", "Admin".into(), "hi".into()).await;

    // The student connects afterwards and receives the backlog.
    let (student, mut student_rx) = registry.register().await;
    let history = registry.join(student, "7").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender, "Admin");
    assert_eq!(history[0].message, "hi");

    // Student replies; both sides see it live.
    registry.send("7", "alice".into(), "hello".into()).await;

    // Admin got its own echo of "hi" first, then the reply.
    let first = admin_rx.recv().await.expect("admin echo");
    assert!(matches!(first, ChatEvent::NewMessage { ref message, .. } if message == "hi"));
    let second = admin_rx.recv().await.expect("student reply");
    assert!(matches!(second, ChatEvent::NewMessage { ref sender, .. } if sender == "alice"));

    let reply = student_rx.recv().await.expect("student echo");
    assert!(matches!(reply, ChatEvent::NewMessage { ref message, .. } if message == "hello"));

    // Both sides drop; the log survives for the next join.
    registry.unregister(admin).await;
    registry.unregister(student).await;

    let (rejoin, _rx) = registry.register().await;
    let log = registry.join(rejoin, "7").await;
    let lines: Vec<&str> = log.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(lines, vec!["hi", "hello"]);
}
