//! Player state and the resource/production ledger
//!
//! Every mutating ledger call compares the old and new value and records a
//! change event only when the value actually moved, so repeated `set(x)` or
//! `add(0)` calls are silent.

use crate::core::{
    CardAction, CardEffect, CardId, PaymentSubstitute, PendingCardDrawSelection, PlayerId,
    Production, ResourceType, Resources, Selections,
};
use crate::events::{
    CardAddedToHand, CardRemovedFromHand, EventSink, PlayerEffectAdded, ProductionChanged,
    ResourceStorageChanged, ResourcesChanged, TerraformRatingChanged,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Terraform rating every player starts with
pub const STARTING_TERRAFORM_RATING: i32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub corporation: Option<CardId>,

    resources: Resources,
    production: Production,
    terraform_rating: i32,
    /// Resources held on cards, keyed by card
    storage: FxHashMap<CardId, i32>,

    hand: Vec<CardId>,
    played_cards: Vec<CardId>,
    effects: Vec<CardEffect>,
    actions: Vec<CardAction>,
    payment_substitutes: Vec<PaymentSubstitute>,

    /// Passed for the rest of the generation
    passed: bool,

    selection: Selections,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Player {
            id,
            name: name.into(),
            corporation: None,
            resources: Resources::default(),
            production: Production::default(),
            terraform_rating: STARTING_TERRAFORM_RATING,
            storage: FxHashMap::default(),
            hand: Vec::new(),
            played_cards: Vec::new(),
            effects: Vec::new(),
            actions: Vec::new(),
            payment_substitutes: Vec::new(),
            passed: false,
            selection: Selections::default(),
        }
    }

    // ---------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn production(&self) -> Production {
        self.production
    }

    pub fn terraform_rating(&self) -> i32 {
        self.terraform_rating
    }

    /// Replace the whole resource snapshot
    pub fn set_resources(&mut self, snapshot: Resources, events: &mut EventSink) {
        let old = self.resources;
        self.resources = snapshot;
        self.emit_resource_changes(old, events);
    }

    /// Apply deltas to basic resources
    ///
    /// Credits are not clamped: callers validate before spending. Every other
    /// basic resource bottoms out at zero. Non-basic types are ignored here;
    /// the behavior applier routes them elsewhere.
    pub fn add_resources(
        &mut self,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
        events: &mut EventSink,
    ) {
        let old = self.resources;
        for (resource, amount) in deltas {
            if let Some(slot) = self.resources.slot_mut(resource) {
                *slot += amount;
                if resource != ResourceType::Credits && *slot < 0 {
                    *slot = 0;
                }
            }
        }
        self.emit_resource_changes(old, events);
    }

    fn emit_resource_changes(&self, old: Resources, events: &mut EventSink) {
        for resource in ResourceType::BASIC {
            let (before, after) = (old.get(resource), self.resources.get(resource));
            if let (Some(before), Some(after)) = (before, after) {
                if before != after {
                    events.push(ResourcesChanged {
                        game_id: events.game_id().clone(),
                        player_id: self.id.clone(),
                        resource,
                        old: before,
                        new: after,
                    });
                }
            }
        }
    }

    pub fn set_production(&mut self, snapshot: Production, events: &mut EventSink) {
        let old = self.production;
        self.production = snapshot;
        self.emit_production_changes(old, events);
    }

    /// Apply production deltas; accepts `steel` or `steel-production` keys
    pub fn add_production(
        &mut self,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
        events: &mut EventSink,
    ) {
        let old = self.production;
        for (resource, amount) in deltas {
            let floor = Production::floor(resource);
            if let Some(slot) = self.production.slot_mut(resource) {
                *slot = (*slot + amount).max(floor);
            }
        }
        self.emit_production_changes(old, events);
    }

    fn emit_production_changes(&self, old: Production, events: &mut EventSink) {
        for resource in ResourceType::BASIC {
            let (before, after) = (old.get(resource), self.production.get(resource));
            if let (Some(before), Some(after)) = (before, after) {
                if before != after {
                    events.push(ProductionChanged {
                        game_id: events.game_id().clone(),
                        player_id: self.id.clone(),
                        resource,
                        old: before,
                        new: after,
                    });
                }
            }
        }
    }

    pub fn update_terraform_rating(&mut self, delta: i32, events: &mut EventSink) {
        self.set_terraform_rating(self.terraform_rating + delta, events);
    }

    pub fn set_terraform_rating(&mut self, rating: i32, events: &mut EventSink) {
        let old = self.terraform_rating;
        self.terraform_rating = rating;
        if old != rating {
            events.push(TerraformRatingChanged {
                game_id: events.game_id().clone(),
                player_id: self.id.clone(),
                old,
                new: rating,
            });
        }
    }

    // ---------------------------------------------------------------
    // Card storage
    // ---------------------------------------------------------------

    pub fn storage(&self, card: &CardId) -> i32 {
        self.storage.get(card).copied().unwrap_or(0)
    }

    pub fn storage_map(&self) -> &FxHashMap<CardId, i32> {
        &self.storage
    }

    /// Change the resources held on `card`, never below zero nor above `capacity`
    ///
    /// Returns the new amount.
    pub fn add_storage(
        &mut self,
        card: &CardId,
        resource: ResourceType,
        delta: i32,
        capacity: Option<i32>,
        events: &mut EventSink,
    ) -> i32 {
        let old = self.storage(card);
        let mut new = (old + delta).max(0);
        if let Some(cap) = capacity {
            new = new.min(cap);
        }
        if new != old {
            self.storage.insert(card.clone(), new);
            events.push(ResourceStorageChanged {
                game_id: events.game_id().clone(),
                player_id: self.id.clone(),
                card_id: card.clone(),
                resource,
                old,
                new,
            });
        }
        new
    }

    // ---------------------------------------------------------------
    // Hand and played cards
    // ---------------------------------------------------------------

    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    pub fn add_to_hand(&mut self, card: CardId, events: &mut EventSink) {
        events.push(CardAddedToHand {
            game_id: events.game_id().clone(),
            player_id: self.id.clone(),
            card_id: card.clone(),
        });
        self.hand.push(card);
    }

    /// Remove one copy of `card` from the hand
    pub fn remove_from_hand(&mut self, card: &CardId, events: &mut EventSink) -> bool {
        let Some(index) = self.hand.iter().position(|c| c == card) else {
            return false;
        };
        self.hand.remove(index);
        events.push(CardRemovedFromHand {
            game_id: events.game_id().clone(),
            player_id: self.id.clone(),
            card_id: card.clone(),
        });
        true
    }

    pub fn played_cards(&self) -> &[CardId] {
        &self.played_cards
    }

    pub fn add_played_card(&mut self, card: CardId) {
        self.played_cards.push(card);
    }

    // ---------------------------------------------------------------
    // Effects and actions
    // ---------------------------------------------------------------

    pub fn effects(&self) -> &[CardEffect] {
        &self.effects
    }

    pub fn add_effect(&mut self, effect: CardEffect, events: &mut EventSink) {
        events.push(PlayerEffectAdded {
            game_id: events.game_id().clone(),
            player_id: self.id.clone(),
            card_id: effect.card_id.clone(),
            behavior_index: effect.behavior_index,
        });
        self.effects.push(effect);
    }

    pub fn actions(&self) -> &[CardAction] {
        &self.actions
    }

    pub fn add_action(&mut self, action: CardAction) {
        self.actions.push(action);
    }

    pub fn find_action(&self, card: &CardId, behavior_index: usize) -> Option<&CardAction> {
        self.actions
            .iter()
            .find(|a| &a.card_id == card && a.behavior_index == behavior_index)
    }

    pub fn increment_play_count(&mut self, card: &CardId, behavior_index: usize) {
        if let Some(action) = self
            .actions
            .iter_mut()
            .find(|a| &a.card_id == card && a.behavior_index == behavior_index)
        {
            action.play_count += 1;
        }
    }

    /// New generation: every manual action becomes usable again
    pub fn reset_play_counts(&mut self) {
        for action in &mut self.actions {
            action.play_count = 0;
        }
    }

    pub fn payment_substitutes(&self) -> &[PaymentSubstitute] {
        &self.payment_substitutes
    }

    pub fn add_payment_substitute(&mut self, substitute: PaymentSubstitute) {
        self.payment_substitutes.push(substitute);
    }

    // ---------------------------------------------------------------
    // Turn flags and pending decisions
    // ---------------------------------------------------------------

    pub fn has_passed(&self) -> bool {
        self.passed
    }

    pub fn set_passed(&mut self, passed: bool) {
        self.passed = passed;
    }

    pub fn selection(&self) -> &Selections {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selections {
        &mut self.selection
    }

    /// Offer revealed cards; a draw still pending absorbs the new one
    pub fn offer_card_draw(&mut self, draw: PendingCardDrawSelection) {
        match self.selection.card_draw.as_mut() {
            Some(pending) => pending.merge(draw),
            None => self.selection.card_draw = Some(draw),
        }
    }
}
