//! Resolving pending decisions: tiles, card draws, patents, production cards,
//! and ending a turn

use crate::actions::{require_no_pending, Action};
use crate::core::{CardId, HexPosition, PlayerId, ResourceType, StandardProject};
use crate::events::StandardProjectPlayed;
use crate::game::turn::validate_subset;
use crate::game::{
    confirm_production_cards, consume_action, end_turn_if_done, resolve_tile_selection,
    skip_action, validate_current_turn, GameStatus, Mutation, SourceType,
};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Credits per card sold through the sell-patents project
pub const PATENT_REWARD: i32 = 1;

/// Place the pending tile on a hex given as `"q,r,s"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectTile {
    pub hex: String,
}

impl SelectTile {
    pub fn new(hex: impl Into<String>) -> Self {
        SelectTile { hex: hex.into() }
    }

    pub fn at(position: HexPosition) -> Self {
        SelectTile {
            hex: position.to_string(),
        }
    }
}

impl Action for SelectTile {
    fn name(&self) -> &'static str {
        "select-tile"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        let position: HexPosition = self
            .hex
            .parse()
            .map_err(|e| EngineError::InvalidAction(format!("{e}")))?;
        resolve_tile_selection(m, player_id, position)?;
        end_turn_if_done(m, player_id)
    }
}

/// Pass or skip the rest of the turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipAction;

impl Action for SkipAction {
    fn name(&self) -> &'static str {
        "skip-action"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        require_no_pending(m, player_id)?;
        skip_action(m, player_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmProductionCards {
    #[serde(default)]
    pub card_ids: Vec<CardId>,
}

impl ConfirmProductionCards {
    pub fn new(card_ids: Vec<CardId>) -> Self {
        ConfirmProductionCards { card_ids }
    }
}

impl Action for ConfirmProductionCards {
    fn name(&self) -> &'static str {
        "confirm-production-cards"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        confirm_production_cards(m, player_id, &self.card_ids)
    }
}

/// Settle a pending card draw: free cards to take, others to buy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCardDraw {
    #[serde(default)]
    pub cards_to_take: Vec<CardId>,
    #[serde(default)]
    pub cards_to_buy: Vec<CardId>,
}

impl ConfirmCardDraw {
    pub fn new(cards_to_take: Vec<CardId>, cards_to_buy: Vec<CardId>) -> Self {
        ConfirmCardDraw {
            cards_to_take,
            cards_to_buy,
        }
    }
}

impl Action for ConfirmCardDraw {
    fn name(&self) -> &'static str {
        "confirm-card-draw"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        let player = m.player(player_id)?;
        let selection = player
            .selection()
            .card_draw
            .clone()
            .ok_or_else(|| EngineError::invalid_state("pending card draw selection", "none"))?;

        let (take, buy) = (self.cards_to_take.len(), self.cards_to_buy.len());
        if take > selection.free_take_count {
            return Err(EngineError::InvalidSelection(format!(
                "too many free cards: selected {take}, max {}",
                selection.free_take_count
            )));
        }
        if buy > selection.max_buy_count {
            return Err(EngineError::InvalidSelection(format!(
                "too many cards to buy: selected {buy}, max {}",
                selection.max_buy_count
            )));
        }
        if selection.is_pure_draw() && take != selection.free_take_count {
            return Err(EngineError::InvalidSelection(format!(
                "must take all {} drawn cards",
                selection.free_take_count
            )));
        }
        let chosen: Vec<CardId> = self
            .cards_to_take
            .iter()
            .chain(&self.cards_to_buy)
            .cloned()
            .collect();
        validate_subset(&chosen, &selection.available_cards)?;

        let cost = selection.card_buy_cost * buy as i32;
        let credits = player.resources().credits;
        if credits < cost {
            return Err(EngineError::insufficient(ResourceType::Credits, cost, credits));
        }

        // Validation done; write
        let player = m.state.get_player_mut(player_id)?;
        if cost > 0 {
            player.add_resources([(ResourceType::Credits, -cost)], &mut m.events);
        }
        for card in &chosen {
            player.add_to_hand(card.clone(), &mut m.events);
        }
        player.selection_mut().card_draw = None;
        let rejected: Vec<CardId> = selection
            .available_cards
            .iter()
            .filter(|c| !chosen.contains(c))
            .cloned()
            .collect();
        m.state.deck.discard(rejected);
        m.record(
            player_id,
            selection.source.as_str(),
            SourceType::Card,
            format!("took {take} and bought {buy} cards"),
        );
        Ok(())
    }
}

/// Sell the chosen cards from a pending sell-patents selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSellPatents {
    #[serde(default)]
    pub card_ids: Vec<CardId>,
}

impl ConfirmSellPatents {
    pub fn new(card_ids: Vec<CardId>) -> Self {
        ConfirmSellPatents { card_ids }
    }
}

impl Action for ConfirmSellPatents {
    fn name(&self) -> &'static str {
        "confirm-sell-patents"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        validate_current_turn(m.state, player_id)?;
        let source = StandardProject::SellPatents.to_string();
        let selection = m
            .player(player_id)?
            .selection()
            .card
            .clone()
            .filter(|s| s.source == source)
            .ok_or_else(|| EngineError::invalid_state("pending sell-patents selection", "none"))?;

        let count = self.card_ids.len();
        if count < selection.min_cards || count > selection.max_cards {
            return Err(EngineError::InvalidSelection(format!(
                "select between {} and {} cards, got {count}",
                selection.min_cards, selection.max_cards
            )));
        }
        validate_subset(&self.card_ids, &selection.available_cards)?;
        let reward: i32 = self
            .card_ids
            .iter()
            .map(|c| selection.card_rewards.get(c).copied().unwrap_or(0))
            .sum();

        // Validation done; write
        let player = m.state.get_player_mut(player_id)?;
        for card in &self.card_ids {
            player.remove_from_hand(card, &mut m.events);
        }
        player.add_resources([(ResourceType::Credits, reward)], &mut m.events);
        player.selection_mut().card = None;
        m.state.deck.discard(self.card_ids.iter().cloned());

        if count == 0 {
            m.logger.normal(&format!("{player_id} sold no patents"));
            return Ok(());
        }
        let game_id = m.game_id().clone();
        m.events.push(StandardProjectPlayed {
            game_id,
            player_id: player_id.clone(),
            project: StandardProject::SellPatents,
        });
        m.record(
            player_id,
            source,
            SourceType::StandardProject,
            format!("sold {count} patents for {reward} credits"),
        );
        consume_action(m, player_id)
    }
}
