//! Core game types and entities

pub mod behavior;
pub mod card;
pub mod hex;
pub mod ids;
pub mod payment;
pub mod player;
pub mod projects;
pub mod resources;
pub mod selection;
pub mod tags;
pub mod tile;

pub use behavior::{
    ApplyLocation, CardAction, CardBehavior, CardEffect, Choice, MaxTrigger, PerCondition,
    ResourceCondition, Target, Trigger, TriggerCondition, TriggerConditionType, TriggerType,
};
pub use card::{
    Bound, BoundCheck, Card, CardType, Requirement, RequirementType, ResourceStorage,
    VictoryPointCondition, VpConditionType,
};
pub use hex::HexPosition;
pub use ids::{CardId, GameId, PlayerId};
pub use payment::{CardPayment, PaymentSubstitute, STEEL_VALUE, TITANIUM_VALUE};
pub use player::{Player, STARTING_TERRAFORM_RATING};
pub use projects::StandardProject;
pub use resources::{Production, ResourceType, Resources};
pub use selection::{
    PendingCardDrawSelection, PendingCardSelection, PendingTileQueue, PendingTileSelection,
    ProductionPhase, Selections, StartingSelection,
};
pub use tags::{Tag, TagList};
pub use tile::TileType;
