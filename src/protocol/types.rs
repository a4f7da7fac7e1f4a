use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for players (allocated per connection)
pub type PlayerId = Uuid;
/// Unique identifier for rooms
pub type RoomId = Uuid;

/// Symbol shown by Sunny or held up by a player.
///
/// Travels on the wire as its integer code. `None` means "no input yet" for a
/// player and "idle" for Sunny; it is never a genuine round target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Symbol {
    #[default]
    None = 0,
    Heart = 1,
    Diamond = 2,
    Both = 3,
}

/// Raised when a frame code falls outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid frame code {0} (expected 0..=3)")]
pub struct InvalidSymbol(pub u8);

impl Symbol {
    /// Symbols Sunny may pick as a round target or decoy flash.
    pub const TARGETS: [Symbol; 3] = [Symbol::Heart, Symbol::Diamond, Symbol::Both];

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// `None` is reserved for idle display and never counts as a target.
    pub const fn is_target(self) -> bool {
        !matches!(self, Symbol::None)
    }

    /// A player's frame matches only a genuine target of the same value.
    pub fn matches(self, target: Symbol) -> bool {
        target.is_target() && self == target
    }
}

impl TryFrom<u8> for Symbol {
    type Error = InvalidSymbol;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Symbol::None),
            1 => Ok(Symbol::Heart),
            2 => Ok(Symbol::Diamond),
            3 => Ok(Symbol::Both),
            other => Err(InvalidSymbol(other)),
        }
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> Self {
        symbol.code()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Symbol::None => "none",
            Symbol::Heart => "heart",
            Symbol::Diamond => "diamond",
            Symbol::Both => "both",
        };
        f.write_str(name)
    }
}

/// Answer to the waiting-timeout prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitChoice {
    /// Keep searching for an opponent for another timeout period
    Wait,
    /// Give up on matchmaking and play alone client-side
    Singleplayer,
}
