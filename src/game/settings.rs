//! Per-game configuration

use crate::game::VerbosityLevel;
use serde::{Deserialize, Serialize};

/// Options fixed when a game is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub max_players: usize,
    /// Starting temperature; the standard -30 when absent
    pub temperature: Option<i32>,
    pub oxygen: Option<i32>,
    pub oceans: Option<i32>,
    pub development_mode: bool,
    /// Card packs the deck is built from
    pub card_packs: Vec<String>,
    /// Deck shuffle seed; random when absent
    pub seed: Option<u64>,
    pub verbosity: VerbosityLevel,
}

impl GameSettings {
    pub const DEFAULT_MAX_PLAYERS: usize = 5;
    pub const BASE_PACK: &'static str = "base-game";

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether a card from `pack` belongs in this game's deck
    ///
    /// Cards without a pack are always included.
    pub fn includes_pack(&self, pack: &str) -> bool {
        pack.is_empty() || self.card_packs.iter().any(|p| p == pack)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            max_players: Self::DEFAULT_MAX_PLAYERS,
            temperature: None,
            oxygen: None,
            oceans: None,
            development_mode: false,
            card_packs: vec![Self::BASE_PACK.to_string()],
            seed: None,
            verbosity: VerbosityLevel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.max_players, 5);
        assert!(settings.includes_pack("base-game"));
        assert!(settings.includes_pack(""));
        assert!(!settings.includes_pack("prelude"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: GameSettings =
            serde_json::from_str(r#"{"maxPlayers": 2, "temperature": 0}"#).unwrap();
        assert_eq!(settings.max_players, 2);
        assert_eq!(settings.temperature, Some(0));
        assert_eq!(settings.card_packs, vec!["base-game".to_string()]);
    }
}
