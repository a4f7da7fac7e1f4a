use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

use super::dice::ScriptedDice;
use super::player::Player;
use super::registry::RoomRegistry;
use super::room::{Admission, Room, RoomState};
use super::round::{run_game_loop, run_round};
use super::timing::{ANTICIPATION_MIN, COOLDOWN, MATCH_WINDOW};
use crate::protocol::{ServerMessage, Symbol};

type Inbox = mpsc::Receiver<Arc<ServerMessage>>;

fn make_player(name: &str) -> (Arc<Player>, Inbox) {
    let (tx, rx) = mpsc::channel(64);
    (Arc::new(Player::new(name, tx)), rx)
}

async fn seated_pair(room: &Room) -> ((Arc<Player>, Inbox), (Arc<Player>, Inbox)) {
    let a = make_player("a");
    let b = make_player("b");
    assert_eq!(room.add_player(Arc::clone(&a.0)).await, Admission::Waiting);
    assert_eq!(room.add_player(Arc::clone(&b.0)).await, Admission::Completed);
    (a, b)
}

async fn next(rx: &mut Inbox) -> ServerMessage {
    let message = timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed");
    (*message).clone()
}

fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(20),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push((*message).clone());
    }
    out
}

#[tokio::test(start_paused = true)]
async fn matching_player_scores_and_silent_player_is_eliminated() {
    let room = Arc::new(Room::new(Arc::new(ScriptedDice::new(vec![Symbol::Diamond]))));
    let ((a, mut a_rx), (b, mut b_rx)) = seated_pair(&room).await;

    let task = tokio::spawn(run_round(Arc::clone(&room)));

    assert_eq!(next(&mut a_rx).await, ServerMessage::RoundStart { round: 1 });
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::Diamond,
            display_duration_ms: 0
        }
    );
    a.set_frame(Symbol::Diamond).await;

    task.await.unwrap();

    assert_eq!(
        drain(&mut a_rx),
        vec![
            ServerMessage::RoundResult {
                score: 1,
                frame: Symbol::Diamond
            },
            ServerMessage::OpponentGameOver,
        ]
    );
    assert_eq!(
        drain(&mut b_rx),
        vec![
            ServerMessage::RoundStart { round: 1 },
            ServerMessage::SunnyFrame {
                frame: Symbol::Diamond,
                display_duration_ms: 0
            },
            ServerMessage::GameOver { score: 0 },
        ]
    );
    assert_eq!(a.score().await, 1);
    assert!(!a.is_game_over().await);
    assert!(b.is_game_over().await);
    assert!(!room.is_round_active().await);
}

#[tokio::test(start_paused = true)]
async fn plain_round_follows_contract_timing() {
    let room = Arc::new(Room::new(Arc::new(ScriptedDice::new(vec![Symbol::Heart]))));
    let ((a, mut a_rx), (b, _b_rx)) = seated_pair(&room).await;
    a.set_ready(true).await;
    b.set_ready(true).await;

    let started = Instant::now();
    let task = tokio::spawn(run_round(Arc::clone(&room)));

    next(&mut a_rx).await;
    next(&mut a_rx).await;
    assert_elapsed(started, ANTICIPATION_MIN);
    assert_eq!(room.sunny_frame().await, Symbol::Heart);

    task.await.unwrap();
    assert_elapsed(started, ANTICIPATION_MIN + MATCH_WINDOW + COOLDOWN);
    assert!(!a.is_ready().await);
    assert!(!b.is_ready().await);
}

#[tokio::test(start_paused = true)]
async fn confusion_round_flashes_decoys_before_target() {
    let dice = ScriptedDice::new(vec![Symbol::Heart, Symbol::Both, Symbol::Diamond])
        .with_confusion(2, Duration::from_millis(400));
    let room = Arc::new(Room::new(Arc::new(dice)));
    let ((a, mut a_rx), (_b, _b_rx)) = seated_pair(&room).await;
    for _ in 0..3 {
        a.award_point().await;
    }

    let started = Instant::now();
    let task = tokio::spawn(run_round(Arc::clone(&room)));

    assert_eq!(next(&mut a_rx).await, ServerMessage::RoundStart { round: 1 });
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::Heart,
            display_duration_ms: 300
        }
    );
    assert_elapsed(started, Duration::from_millis(500));
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::None,
            display_duration_ms: 500
        }
    );
    assert_elapsed(started, Duration::from_millis(800));
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::Both,
            display_duration_ms: 300
        }
    );
    assert_elapsed(started, Duration::from_millis(1300));
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::Diamond,
            display_duration_ms: 0
        }
    );
    assert_elapsed(started, Duration::from_millis(1600));
    a.set_frame(Symbol::Diamond).await;

    task.await.unwrap();
    assert_eq!(a.score().await, 4);
    assert!(room.confusion_enabled().await);
}

#[tokio::test(start_paused = true)]
async fn deactivated_round_still_scores_the_survivor() {
    let room = Arc::new(Room::new(Arc::new(ScriptedDice::new(vec![Symbol::Heart]))));
    let ((a, mut a_rx), (b, _b_rx)) = seated_pair(&room).await;

    let task = tokio::spawn(run_round(Arc::clone(&room)));
    assert_eq!(next(&mut a_rx).await, ServerMessage::RoundStart { round: 1 });
    assert_eq!(
        next(&mut a_rx).await,
        ServerMessage::SunnyFrame {
            frame: Symbol::Heart,
            display_duration_ms: 0
        }
    );
    a.set_frame(Symbol::Heart).await;

    room.remove_player(&b.id).await;
    room.set_round_active(false).await;

    task.await.unwrap();
    assert_eq!(
        drain(&mut a_rx),
        vec![ServerMessage::RoundResult {
            score: 1,
            frame: Symbol::Heart
        }]
    );
    assert_eq!(a.score().await, 1);
    assert!(!room.is_round_active().await);
    assert_eq!(room.try_begin_round().await, Some(2));
}

#[tokio::test(start_paused = true)]
async fn superseded_round_stops_without_scoring() {
    let room = Arc::new(Room::new(Arc::new(ScriptedDice::new(vec![Symbol::Heart]))));
    let ((a, mut a_rx), (b, _b_rx)) = seated_pair(&room).await;

    let task = tokio::spawn(run_round(Arc::clone(&room)));
    assert_eq!(next(&mut a_rx).await, ServerMessage::RoundStart { round: 1 });

    room.remove_player(&b.id).await;
    room.set_round_active(false).await;
    assert_eq!(room.try_begin_round().await, Some(2));

    task.await.unwrap();
    assert!(drain(&mut a_rx).is_empty());
    assert!(!a.is_game_over().await);
    assert_eq!(a.score().await, 0);
    assert!(room.is_round_active().await);
    assert_eq!(room.current_round().await, 2);
}

#[tokio::test(start_paused = true)]
async fn second_round_waits_for_the_first() {
    let room = Arc::new(Room::new(Arc::new(ScriptedDice::new(vec![Symbol::Heart]))));
    let ((_a, mut a_rx), (_b, _b_rx)) = seated_pair(&room).await;

    let first = tokio::spawn(run_round(Arc::clone(&room)));
    next(&mut a_rx).await;
    run_round(Arc::clone(&room)).await;
    first.await.unwrap();

    assert_eq!(room.current_round().await, 1);
}

#[tokio::test(start_paused = true)]
async fn game_loop_closes_match_when_everyone_is_out() {
    let registry = Arc::new(RoomRegistry::new(Duration::from_secs(300)));
    let a = make_player("a");
    let b = make_player("b");
    let (room, _) = registry.join_available_room(Arc::clone(&a.0)).await;
    let (_, admission) = registry.join_available_room(Arc::clone(&b.0)).await;
    assert_eq!(admission, Admission::Completed);
    let (a, mut a_rx) = a;
    let (b, mut b_rx) = b;

    let task = tokio::spawn(run_game_loop(Arc::clone(&room), Arc::clone(&registry)));
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(!task.is_finished());
    assert_eq!(registry.room_count().await, 1);

    a.award_point().await;
    a.mark_game_over().await;
    b.mark_game_over().await;
    task.await.unwrap();

    assert_eq!(drain(&mut a_rx), vec![ServerMessage::GameOver { score: 1 }]);
    assert_eq!(drain(&mut b_rx), vec![ServerMessage::GameOver { score: 0 }]);
    assert_eq!(room.state().await, RoomState::Ended);
    assert_eq!(registry.room_count().await, 0);
}
