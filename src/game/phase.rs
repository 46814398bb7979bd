//! Game status, phases and the current turn

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Lobby,
    Active,
    Completed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameStatus::Lobby => "lobby",
            GameStatus::Active => "active",
            GameStatus::Completed => "completed",
        })
    }
}

/// Phase within an active game
///
/// `Action` and `ProductionAndCardDraw` alternate once per generation until
/// every global parameter is maxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    WaitingForGameStart,
    StartingCardSelection,
    Action,
    ProductionAndCardDraw,
    Complete,
}

impl GamePhase {
    /// Legal successor phases
    pub fn can_transition_to(&self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (WaitingForGameStart, StartingCardSelection)
                | (StartingCardSelection, Action)
                | (Action, ProductionAndCardDraw)
                | (ProductionAndCardDraw, Action)
                | (Action, Complete)
                | (ProductionAndCardDraw, Complete)
        )
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GamePhase::WaitingForGameStart => "waiting-for-game-start",
            GamePhase::StartingCardSelection => "starting-card-selection",
            GamePhase::Action => "action",
            GamePhase::ProductionAndCardDraw => "production-and-card-draw",
            GamePhase::Complete => "complete",
        })
    }
}

/// Actions left in the current turn
///
/// Serialized as an integer, `-1` for unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ActionCount {
    Limited(u32),
    Unlimited,
}

impl ActionCount {
    /// Actions a player gets at the start of a turn
    pub const PER_TURN: u32 = 2;

    pub fn full() -> Self {
        ActionCount::Limited(Self::PER_TURN)
    }

    pub fn has_remaining(&self) -> bool {
        match self {
            ActionCount::Limited(n) => *n > 0,
            ActionCount::Unlimited => true,
        }
    }

    /// Take one action; unlimited stays unlimited
    pub fn consume(&mut self) {
        if let ActionCount::Limited(n) = self {
            *n = n.saturating_sub(1);
        }
    }

    /// `None` for unlimited
    pub fn remaining(&self) -> Option<u32> {
        match self {
            ActionCount::Limited(n) => Some(*n),
            ActionCount::Unlimited => None,
        }
    }
}

impl From<i32> for ActionCount {
    fn from(value: i32) -> Self {
        if value < 0 {
            ActionCount::Unlimited
        } else {
            ActionCount::Limited(value as u32)
        }
    }
}

impl From<ActionCount> for i32 {
    fn from(value: ActionCount) -> Self {
        match value {
            ActionCount::Limited(n) => n as i32,
            ActionCount::Unlimited => -1,
        }
    }
}

impl fmt::Display for ActionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCount::Limited(n) => write!(f, "{n}"),
            ActionCount::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTurn {
    pub player: PlayerId,
    pub actions: ActionCount,
}

impl CurrentTurn {
    pub fn new(player: PlayerId, actions: ActionCount) -> Self {
        CurrentTurn { player, actions }
    }
}
