//! Round orchestration: one reveal-and-match cycle, plus the per-room loop
//! that closes the match once every player is out.
//!
//! All waits run on the tokio clock without holding any lock. After every
//! wait the round re-checks that no newer round has been claimed. A round
//! deactivated by a disconnect runs on and resolves the survivor; only the
//! cooldown bookkeeping is skipped.

use std::sync::Arc;

use tokio::time::{interval, sleep, MissedTickBehavior};

use super::registry::RoomRegistry;
use super::room::Room;
use super::timing::{millis, COOLDOWN, FLASH_DISPLAY, GAME_LOOP_POLL, IDLE_SETTLE, MATCH_WINDOW};
use crate::protocol::{ServerMessage, Symbol};

async fn broadcast(room: &Room, message: ServerMessage) {
    for player in room.active_players().await {
        player.notify(message.clone());
    }
}

async fn show_frame(room: &Room, frame: Symbol, display_duration_ms: u64) {
    room.set_sunny_frame(frame).await;
    broadcast(
        room,
        ServerMessage::SunnyFrame {
            frame,
            display_duration_ms,
        },
    )
    .await;
}

/// Decoy flashes separated by idle gaps. Returns false if a newer round
/// took over part-way.
async fn run_confusion(room: &Room, round: u32) -> bool {
    let flashes = room.dice().flash_count();
    for flash in 1..=flashes {
        let decoy = room.choose_random_symbol();
        show_frame(room, decoy, millis(FLASH_DISPLAY)).await;
        sleep(FLASH_DISPLAY).await;
        if !room.round_is_current(round).await {
            return false;
        }

        if flash < flashes {
            let idle = room.dice().idle_wait() + IDLE_SETTLE;
            show_frame(room, Symbol::None, millis(idle)).await;
            sleep(idle).await;
            if !room.round_is_current(round).await {
                return false;
            }
        }
    }
    true
}

/// Score every surviving player against `target`.
async fn resolve_round(room: &Room, target: Symbol) {
    for player in room.active_players().await {
        let frame = player.frame().await;
        if frame.matches(target) {
            let score = player.award_point().await;
            player.notify(ServerMessage::RoundResult {
                score,
                frame: target,
            });
            continue;
        }

        player.mark_game_over().await;
        let score = player.score().await;
        tracing::info!(room_id = %room.id, player_id = %player.id, score, %frame, %target, "Player eliminated");
        player.notify(ServerMessage::GameOver { score });

        if let Some(opponent) = room.get_opponent(&player.id).await {
            if !opponent.is_game_over().await {
                opponent.notify(ServerMessage::OpponentGameOver);
            }
        }
    }
}

/// Run one full round if the room lets us claim it.
pub async fn run_round(room: Arc<Room>) {
    let Some(round) = room.try_begin_round().await else {
        tracing::debug!(room_id = %room.id, "Round not started");
        return;
    };

    for player in room.active_players().await {
        player.set_frame(Symbol::None).await;
        player.notify(ServerMessage::RoundStart { round });
    }
    tracing::debug!(room_id = %room.id, round, "Round started");

    sleep(room.dice().anticipation()).await;
    if !room.round_is_current(round).await {
        tracing::debug!(room_id = %room.id, round, "Round superseded");
        return;
    }

    if room.should_use_confusion().await && !run_confusion(&room, round).await {
        tracing::debug!(room_id = %room.id, round, "Round superseded");
        return;
    }

    let target = room.choose_random_symbol();
    show_frame(&room, target, 0).await;

    sleep(MATCH_WINDOW).await;
    if !room.begin_resolution(round).await {
        tracing::debug!(room_id = %room.id, round, "Round superseded");
        return;
    }
    resolve_round(&room, target).await;
    room.end_resolution().await;

    sleep(COOLDOWN).await;
    if room.finish_round(round).await {
        room.reset_ready().await;
    }
    tracing::debug!(room_id = %room.id, round, "Round finished");
}

/// Poll until every player is out, then close the match: final `game_over`
/// to whoever is still connected, room ended and deregistered.
pub async fn run_game_loop(room: Arc<Room>, registry: Arc<RoomRegistry>) {
    let mut ticker = interval(GAME_LOOP_POLL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !room.all_players_game_over().await {
            continue;
        }

        let remaining = room.end().await;
        for player in &remaining {
            let score = player.score().await;
            player.notify(ServerMessage::GameOver { score });
        }
        registry.remove_room(&room.id).await;
        tracing::info!(room_id = %room.id, players = remaining.len(), "Match over");
        return;
    }
}
