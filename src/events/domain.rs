//! Domain events published by game mutations

use crate::core::{
    CardId, CardType, GameId, HexPosition, PlayerId, ResourceType, StandardProject, TagList,
    TileType,
};
use crate::events::Event;
use crate::game::{GamePhase, GameStatus};
use serde::Serialize;

macro_rules! impl_event {
    ($($name:ident),* $(,)?) => {
        $(
            impl Event for $name {
                fn game_id(&self) -> &GameId {
                    &self.game_id
                }
            }
        )*
    };
}

/// A basic resource of one player changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcesChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resource: ResourceType,
    pub old: i32,
    pub new: i32,
}

/// A production level changed; `resource` is the basic resource produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resource: ResourceType,
    pub old: i32,
    pub new: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerraformRatingChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub old: i32,
    pub new: i32,
}

/// Resources held on a card changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceStorageChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub resource: ResourceType,
    pub old: i32,
    pub new: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemperatureChanged {
    pub game_id: GameId,
    pub old: i32,
    pub new: i32,
    pub changed_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OxygenChanged {
    pub game_id: GameId,
    pub old: i32,
    pub new: i32,
    pub changed_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OceansChanged {
    pub game_id: GameId,
    pub old: i32,
    pub new: i32,
    pub changed_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardPlayed {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub card_name: String,
    pub card_type: CardType,
    pub tags: TagList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAddedToHand {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRemovedFromHand {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerEffectAdded {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub behavior_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardProjectPlayed {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub project: StandardProject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TilePlaced {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub tile_type: TileType,
    pub position: HexPosition,
}

/// Resources awarded by the space a tile was placed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementBonusGained {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resources: Vec<(ResourceType, i32)>,
    pub position: HexPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamePhaseChanged {
    pub game_id: GameId,
    pub old: GamePhase,
    pub new: GamePhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatusChanged {
    pub game_id: GameId,
    pub old: GameStatus,
    pub new: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationAdvanced {
    pub game_id: GameId,
    pub old: u32,
    pub new: u32,
}

/// Turn passed to `player_id`; `actions` is `None` for unlimited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTurnChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub actions: Option<u32>,
}

/// Final scoring finished; `winner` is `None` only for an empty game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEnded {
    pub game_id: GameId,
    pub winner: Option<PlayerId>,
    pub is_tie: bool,
}

/// Coarse "something changed" notice a broadcaster can fan out on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateChanged {
    pub game_id: GameId,
}

impl_event!(
    ResourcesChanged,
    ProductionChanged,
    TerraformRatingChanged,
    ResourceStorageChanged,
    TemperatureChanged,
    OxygenChanged,
    OceansChanged,
    CardPlayed,
    CardAddedToHand,
    CardRemovedFromHand,
    PlayerEffectAdded,
    StandardProjectPlayed,
    TilePlaced,
    PlacementBonusGained,
    GamePhaseChanged,
    GameStatusChanged,
    GenerationAdvanced,
    CurrentTurnChanged,
    GameEnded,
    GameStateChanged,
);
