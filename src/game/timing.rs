//! Fixed round pacing. These values are part of the client contract and are
//! not exposed through configuration.

use std::time::Duration;

/// Shortest pause between `round_start` and Sunny's first frame.
pub const ANTICIPATION_MIN: Duration = Duration::from_millis(500);
/// Exclusive upper bound of the pause before Sunny's first frame.
pub const ANTICIPATION_MAX: Duration = Duration::from_millis(3000);

/// How long each decoy flash stays on screen.
pub const FLASH_DISPLAY: Duration = Duration::from_millis(300);
/// Bounds of the idle gap between two decoy flashes, upper bound exclusive.
pub const IDLE_MIN: Duration = Duration::from_millis(300);
pub const IDLE_MAX: Duration = Duration::from_millis(1000);
/// Added to the advertised idle duration so the client never blanks early.
pub const IDLE_SETTLE: Duration = Duration::from_millis(100);

/// Time players have to hold up the final symbol.
pub const MATCH_WINDOW: Duration = Duration::from_millis(1000);
/// Pause after results before another round may begin.
pub const COOLDOWN: Duration = Duration::from_millis(500);

/// Game loop tick used to detect that every player is out.
pub const GAME_LOOP_POLL: Duration = Duration::from_millis(100);

/// Upper bound on decoy flashes in a confusion round (inclusive).
pub const MAX_FLASHES: u32 = 3;
/// Score at which confusion rounds unlock for the rest of the match.
pub const CONFUSION_SCORE_THRESHOLD: u32 = 3;
/// Seats per room.
pub const ROOM_CAPACITY: usize = 2;

/// Wire representation of a duration in milliseconds.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
