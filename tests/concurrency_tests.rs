
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sunny_says_server::protocol::{ClientMessage, ServerMessage, Symbol};
use sunny_says_server::server::{PlayerSession, SunnySaysServer};
use test_helpers::*;
use tokio::sync::{mpsc, Barrier};

type Inbox = mpsc::Receiver<Arc<ServerMessage>>;

async fn join(server: &Arc<SunnySaysServer>, user: String) -> (PlayerSession, Inbox) {
    let (tx, rx) = mpsc::channel(64);
    let session = server.join(user, tx).await.expect("join succeeds");
    (session, rx)
}

fn round_starts(inbox: &mut Inbox) -> Vec<u32> {
    let mut rounds = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        if let ServerMessage::RoundStart { round } = *message {
            rounds.push(round);
        }
    }
    rounds
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_fill_rooms_in_pairs() {
    const PLAYERS: usize = 40;

    let server = create_test_server(test_server_config(), scripted(&[]));
    let barrier = Arc::new(Barrier::new(PLAYERS));

    let mut handles = Vec::with_capacity(PLAYERS);
    for i in 0..PLAYERS {
        let server = server.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            join(&server, format!("user-{i}")).await
        }));
    }

    let mut seated = Vec::with_capacity(PLAYERS);
    for handle in handles {
        seated.push(handle.await.unwrap());
    }

    let mut per_room: HashMap<_, usize> = HashMap::new();
    for (session, _) in &seated {
        *per_room.entry(session.room_id()).or_default() += 1;
    }

    assert_eq!(per_room.len(), PLAYERS / 2);
    assert!(per_room.values().all(|&count| count == 2), "{per_room:?}");
    assert_eq!(server.registry().room_count().await, PLAYERS / 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_ready_starts_exactly_one_round() {
    let server = create_test_server(test_server_config(), scripted(&[Symbol::Heart]));
    let (first, mut first_inbox) = join(&server, "user-a".into()).await;
    let (second, mut second_inbox) = join(&server, "user-b".into()).await;
    let room = first.room.clone();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for mut session in [first, second] {
        let server = server.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            server
                .handle_client_message(&mut session, ClientMessage::Ready)
                .await;
            session
        }));
    }

    let mut sessions = Vec::new();
    for handle in handles {
        sessions.push(handle.await.unwrap());
    }

    // Well inside the anticipation pause, so only round 1 can have begun.
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(round_starts(&mut first_inbox), vec![1]);
    assert_eq!(round_starts(&mut second_inbox), vec![1]);
    assert_eq!(room.current_round().await, 1);
    assert!(room.is_round_active().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_disconnects_release_the_room_once() {
    let server = create_test_server(test_server_config(), scripted(&[]));
    let (first, _first_inbox) = join(&server, "user-a".into()).await;
    let (second, _second_inbox) = join(&server, "user-b".into()).await;
    assert_eq!(server.registry().room_count().await, 1);

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for session in [first, second] {
        let server = server.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            server.handle_disconnect(session).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(server.registry().room_count().await, 0);
}
