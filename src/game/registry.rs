use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::dice::{RoundDice, ThreadRngDice};
use super::player::Player;
use super::room::{Admission, Room, RoomState};
use crate::protocol::RoomId;

/// Process-wide matchmaker.
///
/// The room map sits behind a single lock that is held only for lookups,
/// inserts and removals, never across a round or a network write.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Arc<Room>>>,
    dice: Arc<dyn RoundDice>,
    stale_after: Duration,
}

impl RoomRegistry {
    pub fn new(stale_after: Duration) -> Self {
        Self::with_dice(stale_after, Arc::new(ThreadRngDice))
    }

    /// Every room created by this registry shares `dice`.
    pub fn with_dice(stale_after: Duration, dice: Arc<dyn RoundDice>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            dice,
            stale_after,
        }
    }

    /// Oldest waiting room with a free seat.
    async fn select_open_room(rooms: &HashMap<RoomId, Arc<Room>>) -> Option<Arc<Room>> {
        let mut best: Option<&Arc<Room>> = None;
        for room in rooms.values() {
            if room.state().await != RoomState::Waiting || room.is_full().await {
                continue;
            }
            if best.is_none_or(|current| room.age() > current.age()) {
                best = Some(room);
            }
        }
        best.cloned()
    }

    fn create_room(&self, rooms: &mut HashMap<RoomId, Arc<Room>>) -> Arc<Room> {
        let room = Arc::new(Room::new(Arc::clone(&self.dice)));
        rooms.insert(room.id, Arc::clone(&room));
        tracing::info!(room_id = %room.id, "Created room");
        room
    }

    /// Return a waiting room with a free seat, creating and registering one
    /// if none exists.
    pub async fn find_or_create_room(&self) -> Arc<Room> {
        let mut rooms = self.rooms.lock().await;
        match Self::select_open_room(&rooms).await {
            Some(room) => room,
            None => self.create_room(&mut rooms),
        }
    }

    /// Select a room and seat `player` in it without releasing the registry
    /// lock in between, so no other join can take the seat first.
    pub async fn join_available_room(&self, player: Arc<Player>) -> (Arc<Room>, Admission) {
        let mut rooms = self.rooms.lock().await;
        let room = match Self::select_open_room(&rooms).await {
            Some(room) => room,
            None => self.create_room(&mut rooms),
        };
        let admission = room.add_player(player).await;
        (room, admission)
    }

    /// Idempotent.
    pub async fn remove_room(&self, room_id: &RoomId) -> bool {
        let removed = self.rooms.lock().await.remove(room_id).is_some();
        if removed {
            tracing::info!(room_id = %room_id, "Removed room");
        }
        removed
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// One reclamation pass: drop ended rooms and waiting rooms older than
    /// the staleness threshold. Rooms whose membership is being written are
    /// left for the next pass.
    pub async fn sweep(&self) -> Vec<RoomId> {
        let mut rooms = self.rooms.lock().await;
        let mut removed = Vec::new();

        rooms.retain(|room_id, room| {
            let Some(state) = room.try_state() else {
                tracing::debug!(room_id = %room_id, "Room busy during sweep, skipping");
                return true;
            };
            let reclaim = match state {
                RoomState::Ended => true,
                RoomState::Waiting => room.age() > self.stale_after,
                RoomState::Playing => false,
            };
            if reclaim {
                removed.push(*room_id);
            }
            !reclaim
        });

        removed
    }
}
