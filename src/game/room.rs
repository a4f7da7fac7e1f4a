use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::dice::RoundDice;
use super::player::Player;
use super::timing::{CONFUSION_SCORE_THRESHOLD, ROOM_CAPACITY};
use crate::protocol::{PlayerId, RoomId, Symbol};

/// Room lifecycle. `Waiting -> Playing` is the only forward edge before a
/// match; `Ended` is terminal from either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    Waiting,
    Playing,
    Ended,
}

/// Outcome of [`Room::add_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Seated; still waiting for an opponent.
    Waiting,
    /// Seated and the room just filled up. Returned exactly once per room.
    Completed,
    /// Not seated: the room is at capacity or no longer accepting players.
    Full,
}

#[derive(Debug)]
struct Membership {
    players: Vec<Arc<Player>>,
    state: RoomState,
}

#[derive(Debug, Default)]
struct RoundState {
    current_round: u32,
    sunny_frame: Symbol,
    round_active: bool,
    resolving: bool,
    confusion_enabled: bool,
}

impl RoundState {
    /// Bump the counter; eligibility for decoy flashes latches on for good.
    fn advance(&mut self, leading_score: u32) -> u32 {
        self.current_round += 1;
        if leading_score >= CONFUSION_SCORE_THRESHOLD {
            self.confusion_enabled = true;
        }
        self.current_round
    }
}

/// A two-seat match.
///
/// Membership and round state live behind independent locks so a round that
/// is sleeping through its timing never blocks joins or leaves. The round
/// lock is never acquired while the membership lock is held.
pub struct Room {
    pub id: RoomId,
    created_at: Instant,
    membership: RwLock<Membership>,
    round: RwLock<RoundState>,
    dice: Arc<dyn RoundDice>,
    game_loop_started: AtomicBool,
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Room {
    pub fn new(dice: Arc<dyn RoundDice>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Instant::now(),
            membership: RwLock::new(Membership {
                players: Vec::with_capacity(ROOM_CAPACITY),
                state: RoomState::Waiting,
            }),
            round: RwLock::new(RoundState::default()),
            dice,
            game_loop_started: AtomicBool::new(false),
        }
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub async fn add_player(&self, player: Arc<Player>) -> Admission {
        let mut membership = self.membership.write().await;
        if membership.state != RoomState::Waiting || membership.players.len() >= ROOM_CAPACITY {
            return Admission::Full;
        }
        membership.players.push(player);
        if membership.players.len() == ROOM_CAPACITY {
            membership.state = RoomState::Playing;
            Admission::Completed
        } else {
            Admission::Waiting
        }
    }

    /// Remove a player by id. An emptied room becomes `Ended`.
    pub async fn remove_player(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let mut membership = self.membership.write().await;
        let idx = membership.players.iter().position(|p| p.id == *player_id)?;
        let removed = membership.players.remove(idx);
        if membership.players.is_empty() {
            membership.state = RoomState::Ended;
        }
        Some(removed)
    }

    /// Close the room and hand back whoever was still seated.
    pub async fn end(&self) -> Vec<Arc<Player>> {
        let mut membership = self.membership.write().await;
        membership.state = RoomState::Ended;
        std::mem::take(&mut membership.players)
    }

    pub async fn get_player(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let membership = self.membership.read().await;
        membership.players.iter().find(|p| p.id == *player_id).cloned()
    }

    pub async fn get_opponent(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let membership = self.membership.read().await;
        membership.players.iter().find(|p| p.id != *player_id).cloned()
    }

    pub async fn contains(&self, player_id: &PlayerId) -> bool {
        let membership = self.membership.read().await;
        membership.players.iter().any(|p| p.id == *player_id)
    }

    /// Snapshot of the seated players in join order.
    pub async fn players(&self) -> Vec<Arc<Player>> {
        self.membership.read().await.players.clone()
    }

    /// Seated players that have not been eliminated.
    pub async fn active_players(&self) -> Vec<Arc<Player>> {
        let mut active = Vec::with_capacity(ROOM_CAPACITY);
        for player in self.players().await {
            if !player.is_game_over().await {
                active.push(player);
            }
        }
        active
    }

    pub async fn player_count(&self) -> usize {
        self.membership.read().await.players.len()
    }

    pub async fn is_full(&self) -> bool {
        self.player_count().await >= ROOM_CAPACITY
    }

    pub async fn state(&self) -> RoomState {
        self.membership.read().await.state
    }

    /// Non-blocking state read; `None` if a writer currently holds membership.
    pub fn try_state(&self) -> Option<RoomState> {
        self.membership.try_read().ok().map(|m| m.state)
    }

    /// Vacuously true for an empty room.
    pub async fn all_players_game_over(&self) -> bool {
        for player in self.players().await {
            if !player.is_game_over().await {
                return false;
            }
        }
        true
    }

    /// The readiness gate.
    ///
    /// Before the match: exactly two players, both ready. While playing: at
    /// least one survivor and every survivor ready; eliminated players are
    /// ignored so a lone survivor can keep advancing rounds.
    pub async fn all_players_ready(&self) -> bool {
        let (players, state) = {
            let membership = self.membership.read().await;
            (membership.players.clone(), membership.state)
        };

        match state {
            RoomState::Playing => {
                let mut survivors = 0usize;
                for player in &players {
                    if player.is_game_over().await {
                        continue;
                    }
                    if !player.is_ready().await {
                        return false;
                    }
                    survivors += 1;
                }
                survivors > 0
            }
            RoomState::Waiting | RoomState::Ended => {
                if players.len() != ROOM_CAPACITY {
                    return false;
                }
                for player in &players {
                    if !player.is_ready().await {
                        return false;
                    }
                }
                true
            }
        }
    }

    pub async fn reset_ready(&self) {
        for player in self.players().await {
            player.set_ready(false).await;
        }
    }

    async fn leading_score(&self) -> u32 {
        let mut best = 0;
        for player in self.players().await {
            best = best.max(player.score().await);
        }
        best
    }

    pub async fn current_round(&self) -> u32 {
        self.round.read().await.current_round
    }

    pub async fn sunny_frame(&self) -> Symbol {
        self.round.read().await.sunny_frame
    }

    pub async fn set_sunny_frame(&self, frame: Symbol) {
        self.round.write().await.sunny_frame = frame;
    }

    pub async fn is_round_active(&self) -> bool {
        self.round.read().await.round_active
    }

    pub async fn set_round_active(&self, active: bool) {
        self.round.write().await.round_active = active;
    }

    pub async fn confusion_enabled(&self) -> bool {
        self.round.read().await.confusion_enabled
    }

    /// Advance the round counter and latch confusion eligibility once any
    /// player has reached the threshold. Returns the new round number.
    pub async fn increment_round(&self) -> u32 {
        let leading = self.leading_score().await;
        self.round.write().await.advance(leading)
    }

    /// Atomically claim the next round.
    ///
    /// Returns `None` if a round is already running or nobody is left to
    /// play; otherwise marks the round active, bumps the counter and returns
    /// the new round number. Player snapshots are taken before the round lock
    /// so the check-and-set itself never waits on membership.
    pub async fn try_begin_round(&self) -> Option<u32> {
        if self.active_players().await.is_empty() {
            return None;
        }
        let leading = self.leading_score().await;

        let mut round = self.round.write().await;
        if round.round_active || round.resolving {
            return None;
        }
        round.round_active = true;
        Some(round.advance(leading))
    }

    /// True until a newer round has been claimed. A round deactivated by a
    /// disconnect stays current and still resolves for whoever is left; a
    /// superseded round must stop touching the room.
    pub async fn round_is_current(&self, round: u32) -> bool {
        self.round.read().await.current_round == round
    }

    /// Hold off new rounds while `round` scores its players. Fails if a newer
    /// round has already been claimed.
    pub async fn begin_resolution(&self, round: u32) -> bool {
        let mut state = self.round.write().await;
        if state.current_round != round {
            return false;
        }
        state.resolving = true;
        true
    }

    pub async fn end_resolution(&self) {
        self.round.write().await.resolving = false;
    }

    /// Clear the active flag if `round` still owns it.
    pub async fn finish_round(&self, round: u32) -> bool {
        let mut state = self.round.write().await;
        if state.round_active && state.current_round == round {
            state.round_active = false;
            true
        } else {
            false
        }
    }

    pub fn dice(&self) -> &dyn RoundDice {
        self.dice.as_ref()
    }

    /// Uniform pick from heart, diamond, both. Never idle.
    pub fn choose_random_symbol(&self) -> Symbol {
        self.dice.symbol()
    }

    /// Eligibility is sticky once latched (or a player is at the threshold);
    /// the coin is tossed afresh each round.
    pub async fn should_use_confusion(&self) -> bool {
        let eligible = self.confusion_enabled().await
            || self.leading_score().await >= CONFUSION_SCORE_THRESHOLD;
        eligible && self.dice.confusion_coin()
    }

    /// Returns true for the first caller only.
    pub fn claim_game_loop(&self) -> bool {
        !self.game_loop_started.swap(true, Ordering::AcqRel)
    }

    #[cfg(test)]
    pub(crate) async fn hold_membership_for_test<F: std::future::Future<Output = ()>>(&self, hold: F) {
        let _membership = self.membership.write().await;
        hold.await;
    }
}
