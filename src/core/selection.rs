//! Pending player decisions
//!
//! Each of these is created by one action and consumed by a follow-up
//! action. A player holds at most one of each kind at a time.

use crate::core::{CardId, HexPosition, Resources, TileType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Tiles a player still has to place, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTileQueue {
    pub items: VecDeque<TileType>,
    /// Card or project id the placements came from
    pub source: String,
}

impl PendingTileQueue {
    pub fn new(source: impl Into<String>) -> Self {
        PendingTileQueue {
            items: VecDeque::new(),
            source: source.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// The tile the player must place now and where it may go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTileSelection {
    pub tile_type: TileType,
    pub available_hexes: Vec<HexPosition>,
    pub source: String,
}

/// Choose cards out of an offered set (sell patents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCardSelection {
    pub available_cards: Vec<CardId>,
    /// Credits paid per selected card
    pub card_costs: FxHashMap<CardId, i32>,
    /// Credits received per selected card
    pub card_rewards: FxHashMap<CardId, i32>,
    pub source: String,
    pub min_cards: usize,
    pub max_cards: usize,
}

/// Cards revealed by a draw/peek effect; some free, some for purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCardDrawSelection {
    pub available_cards: Vec<CardId>,
    pub free_take_count: usize,
    pub max_buy_count: usize,
    pub card_buy_cost: i32,
    pub source: String,
    pub source_card: Option<CardId>,
    pub source_behavior_index: Option<usize>,
}

impl PendingCardDrawSelection {
    /// Plain draw: every revealed card must be taken
    pub fn is_pure_draw(&self) -> bool {
        self.max_buy_count == 0 && self.free_take_count == self.available_cards.len()
    }

    /// Fold a later draw into this one so both reveals stay on offer
    pub fn merge(&mut self, later: PendingCardDrawSelection) {
        self.available_cards.extend(later.available_cards);
        self.free_take_count += later.free_take_count;
        self.max_buy_count += later.max_buy_count;
        if self.source != later.source {
            self.source = format!("{}+{}", self.source, later.source);
        }
        if self.source_card != later.source_card {
            self.source_card = None;
            self.source_behavior_index = None;
        }
    }
}

/// Cards dealt at game start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingSelection {
    pub available_cards: Vec<CardId>,
    pub available_corporations: Vec<CardId>,
    pub complete: bool,
}

/// Per-player record of one production phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionPhase {
    /// Cards offered for purchase this generation
    pub available_cards: Vec<CardId>,
    pub selection_complete: bool,
    pub before_resources: Resources,
    pub after_resources: Resources,
    pub energy_converted: i32,
    pub credits_income: i32,
}

/// All decision state a player can have outstanding
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selections {
    pub tile_queue: Option<PendingTileQueue>,
    pub tile: Option<PendingTileSelection>,
    pub card: Option<PendingCardSelection>,
    pub card_draw: Option<PendingCardDrawSelection>,
    pub starting: Option<StartingSelection>,
    pub production: Option<ProductionPhase>,
}
