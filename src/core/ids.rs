//! Identifier newtypes for games, players and cards
//!
//! Ids are opaque strings assigned by the repository (games, players) or by
//! the card catalog (cards). Wrapping them keeps a `PlayerId` from being
//! passed where a `CardId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of one game session
    GameId
);

string_id!(
    /// Identifier of a player within a game
    PlayerId
);

string_id!(
    /// Catalog identifier of a card (stable across games)
    CardId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_and_compare() {
        let a = PlayerId::new("player-1");
        let b: PlayerId = "player-1".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "player-1");
        assert_eq!(CardId::from("P12".to_string()).as_str(), "P12");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = GameId::new("game-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"game-7\"");
        let back: GameId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
