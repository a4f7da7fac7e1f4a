//! Sources of randomness for round orchestration.
//!
//! Rooms draw every random choice through [`RoundDice`] so tests can script a
//! whole match deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::RngExt;

use super::timing::{ANTICIPATION_MAX, ANTICIPATION_MIN, IDLE_MAX, IDLE_MIN, MAX_FLASHES};
use crate::protocol::Symbol;

pub trait RoundDice: Send + Sync {
    /// A round target or decoy, always one of [`Symbol::TARGETS`].
    fn symbol(&self) -> Symbol;
    /// Pause before Sunny's first frame, within the anticipation bounds.
    fn anticipation(&self) -> Duration;
    /// Fair coin deciding whether an eligible round uses decoy flashes.
    fn confusion_coin(&self) -> bool;
    /// Number of decoy flashes, `1..=MAX_FLASHES`.
    fn flash_count(&self) -> u32;
    /// Idle gap between two decoy flashes.
    fn idle_wait(&self) -> Duration;
}

fn random_duration(min: Duration, max: Duration) -> Duration {
    let mut rng = rand::rng();
    let ms = rng.random_range(min.as_millis()..max.as_millis());
    Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
}

/// Production dice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDice;

impl RoundDice for ThreadRngDice {
    fn symbol(&self) -> Symbol {
        let idx = rand::rng().random_range(0..Symbol::TARGETS.len());
        Symbol::TARGETS.get(idx).copied().unwrap_or(Symbol::Heart)
    }

    fn anticipation(&self) -> Duration {
        random_duration(ANTICIPATION_MIN, ANTICIPATION_MAX)
    }

    fn confusion_coin(&self) -> bool {
        rand::rng().random_range(0..2u8) == 1
    }

    fn flash_count(&self) -> u32 {
        rand::rng().random_range(1..=MAX_FLASHES)
    }

    fn idle_wait(&self) -> Duration {
        random_duration(IDLE_MIN, IDLE_MAX)
    }
}

/// Deterministic dice that replays a fixed symbol sequence.
///
/// Symbols are handed out in order and wrap around. An empty sequence yields
/// `Heart`.
#[derive(Debug)]
pub struct ScriptedDice {
    symbols: Vec<Symbol>,
    next: AtomicUsize,
    pub anticipation: Duration,
    pub confusion: bool,
    pub flash_count: u32,
    pub idle_wait: Duration,
}

impl ScriptedDice {
    /// Plain rounds with the shortest anticipation.
    pub fn new(symbols: impl Into<Vec<Symbol>>) -> Self {
        Self {
            symbols: symbols.into(),
            next: AtomicUsize::new(0),
            anticipation: ANTICIPATION_MIN,
            confusion: false,
            flash_count: 1,
            idle_wait: IDLE_MIN,
        }
    }

    /// Always win the coin toss once confusion is eligible.
    pub fn with_confusion(mut self, flash_count: u32, idle_wait: Duration) -> Self {
        self.confusion = true;
        self.flash_count = flash_count.clamp(1, MAX_FLASHES);
        self.idle_wait = idle_wait;
        self
    }

    pub fn with_anticipation(mut self, anticipation: Duration) -> Self {
        self.anticipation = anticipation;
        self
    }
}

impl RoundDice for ScriptedDice {
    fn symbol(&self) -> Symbol {
        if self.symbols.is_empty() {
            return Symbol::Heart;
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.symbols.len();
        self.symbols.get(idx).copied().unwrap_or(Symbol::Heart)
    }

    fn anticipation(&self) -> Duration {
        self.anticipation
    }

    fn confusion_coin(&self) -> bool {
        self.confusion
    }

    fn flash_count(&self) -> u32 {
        self.flash_count
    }

    fn idle_wait(&self) -> Duration {
        self.idle_wait
    }
}
