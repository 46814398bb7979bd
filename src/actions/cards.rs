//! Playing cards from hand and activating card actions

use crate::actions::{rejection, require_turn, Action};
use crate::core::{
    Card, CardAction, CardBehavior, CardEffect, CardId, CardPayment, PlayerId, ResourceType,
};
use crate::events::CardPlayed;
use crate::game::logger::log_if_verbose;
use crate::game::{
    can_play_card, can_use_card_action, consume_action, effective_cost, process_tile_queue,
    BehaviorApplier, GameStatus, Mutation, SourceType, ValidationErrorKind,
};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Behaviors that resolve the moment their card enters play
fn resolves_on_play(card: &Card, behavior: &CardBehavior) -> bool {
    behavior.is_immediate() || (card.is_corporation() && behavior.is_corporation_start())
}

fn pick_choice(behavior: &CardBehavior, choice: Option<usize>, card: &str) -> Result<Option<usize>> {
    if behavior.choices.is_empty() {
        return Ok(None);
    }
    choice.map(Some).ok_or_else(|| {
        EngineError::InvalidAction(format!(
            "{card} needs a choice between {} options",
            behavior.choices.len()
        ))
    })
}

/// Reject anything [`install_behaviors`] would fail on
pub(crate) fn check_behaviors(
    m: &Mutation<'_>,
    applier: &BehaviorApplier,
    card: &Card,
    choice: Option<usize>,
) -> Result<()> {
    for (index, behavior) in card.behaviors.iter().enumerate() {
        if !resolves_on_play(card, behavior) {
            continue;
        }
        let chosen = pick_choice(behavior, choice, &card.name)?;
        applier
            .clone()
            .with_behavior_index(index)
            .check_behavior(m, behavior, chosen)?;
    }
    Ok(())
}

/// Put a card that just entered play to work
///
/// Immediate behaviors resolve now. Manual ones become card actions;
/// passive and static ones become effects, passive ones also subscribing
/// to the events they wait for.
pub(crate) fn install_behaviors(
    m: &mut Mutation<'_>,
    applier: &BehaviorApplier,
    card: &Card,
    choice: Option<usize>,
) -> Result<()> {
    let owner = applier.player().clone();
    if let Some(storage) = &card.resource_storage {
        if storage.starting > 0 {
            m.state.get_player_mut(&owner)?.add_storage(
                &card.id,
                storage.resource,
                storage.starting,
                storage.capacity,
                &mut m.events,
            );
        }
    }

    for (index, behavior) in card.behaviors.iter().enumerate() {
        if resolves_on_play(card, behavior) {
            let chosen = pick_choice(behavior, choice, &card.name)?;
            applier
                .clone()
                .with_behavior_index(index)
                .apply_behavior(m, behavior, chosen)?;
        }

        if behavior.is_manual() {
            m.state.get_player_mut(&owner)?.add_action(CardAction {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                behavior_index: index,
                behavior: behavior.clone(),
                play_count: 0,
            });
        }

        if behavior.is_passive() || behavior.is_static() {
            let effect = CardEffect {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                behavior_index: index,
                behavior: behavior.clone(),
            };
            let handles = m.register_effect(&owner, &effect);
            log_if_verbose!(
                m.logger,
                "{}: {} behavior {} installed ({} subscriptions)",
                owner,
                card.name,
                index,
                handles.len()
            );
            m.state
                .get_player_mut(&owner)?
                .add_effect(effect, &mut m.events);
        }
    }
    Ok(())
}

/// Play a card from hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCard {
    pub card_id: CardId,
    #[serde(default)]
    pub payment: CardPayment,
    /// Index into the choices of the card's immediate behavior
    #[serde(default)]
    pub choice: Option<usize>,
    #[serde(default)]
    pub target_card: Option<CardId>,
    #[serde(default)]
    pub target_player: Option<PlayerId>,
}

impl PlayCard {
    pub fn new(card_id: impl Into<CardId>, payment: CardPayment) -> Self {
        PlayCard {
            card_id: card_id.into(),
            payment,
            choice: None,
            target_card: None,
            target_player: None,
        }
    }

    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }

    pub fn with_target_player(mut self, player: PlayerId) -> Self {
        self.target_player = Some(player);
        self
    }

    pub fn with_target_card(mut self, card: CardId) -> Self {
        self.target_card = Some(card);
        self
    }
}

impl Action for PlayCard {
    fn name(&self) -> &'static str {
        "play-card"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        require_turn(m, player_id)?;

        let card = m.card(&self.card_id)?;
        let player = m.player(player_id)?;
        if !player.has_in_hand(&card.id) {
            return Err(EngineError::InvalidAction(format!(
                "card {} is not in {player_id}'s hand",
                card.id
            )));
        }
        if card.is_corporation() {
            return Err(EngineError::InvalidAction(format!(
                "{} is a corporation and cannot be played from hand",
                card.name
            )));
        }

        // The cost hint is optimistic; the payment itself is checked exactly below
        let playability = can_play_card(&card, m.state, player, m.registry);
        let blocking: Vec<_> = playability
            .errors
            .into_iter()
            .filter(|e| e.kind != ValidationErrorKind::Cost)
            .collect();
        if !blocking.is_empty() {
            return Err(rejection(&card.name, &blocking));
        }

        let cost = effective_cost(&card, player);
        self.payment
            .covers_cost(&card, cost, player.payment_substitutes())?;
        self.payment.can_afford(&player.resources())?;

        let applier = BehaviorApplier::new(player_id.clone(), card.id.as_str())
            .with_source_card(card.id.clone(), card.name.clone())
            .with_target_card(self.target_card.clone())
            .with_target_player(self.target_player.clone());
        check_behaviors(m, &applier, &card, self.choice)?;

        // Validation done; write
        let mut spent = vec![
            (ResourceType::Credits, -self.payment.credits),
            (ResourceType::Steel, -self.payment.steel),
            (ResourceType::Titanium, -self.payment.titanium),
        ];
        spent.extend(self.payment.substitutes.iter().map(|(r, a)| (*r, -*a)));
        m.add_resources(player_id, spent)?;

        let player = m.state.get_player_mut(player_id)?;
        player.remove_from_hand(&card.id, &mut m.events);
        player.add_played_card(card.id.clone());

        install_behaviors(m, &applier, &card, self.choice)?;

        let game_id = m.game_id().clone();
        m.events.push(CardPlayed {
            game_id,
            player_id: player_id.clone(),
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            card_type: card.card_type,
            tags: card.tags.clone(),
        });
        process_tile_queue(m, player_id)?;
        m.record(
            player_id,
            card.id.as_str(),
            SourceType::Card,
            format!("played {} (cost {cost})", card.name),
        );
        consume_action(m, player_id)
    }
}

/// Activate a manual behavior of a played card, once per generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCardAction {
    pub card_id: CardId,
    pub behavior_index: usize,
    #[serde(default)]
    pub choice: Option<usize>,
    #[serde(default)]
    pub target_card: Option<CardId>,
    #[serde(default)]
    pub target_player: Option<PlayerId>,
}

impl UseCardAction {
    pub fn new(card_id: impl Into<CardId>, behavior_index: usize) -> Self {
        UseCardAction {
            card_id: card_id.into(),
            behavior_index,
            choice: None,
            target_card: None,
            target_player: None,
        }
    }

    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }
}

impl Action for UseCardAction {
    fn name(&self) -> &'static str {
        "use-card-action"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        require_turn(m, player_id)?;

        let player = m.player(player_id)?;
        let action = player
            .find_action(&self.card_id, self.behavior_index)
            .cloned()
            .ok_or_else(|| {
                EngineError::not_found(
                    "card action",
                    format!("{}[{}]", self.card_id, self.behavior_index),
                )
            })?;
        if action.play_count > 0 {
            return Err(EngineError::invalid_state(
                format!("{} unused this generation", action.card_name),
                "already used",
            ));
        }

        let playability = can_use_card_action(&action, player);
        let chosen = pick_choice(&action.behavior, self.choice, &action.card_name)?;
        match chosen {
            Some(index) if index < playability.choices.len() => {
                let choice = &playability.choices[index];
                if !choice.affordable {
                    return Err(rejection(&action.card_name, &choice.errors));
                }
            }
            Some(_) => {}
            None if !playability.affordable => {
                return Err(rejection(&action.card_name, &playability.errors));
            }
            None => {}
        }

        // apply_behavior checks every input and target before writing
        BehaviorApplier::new(player_id.clone(), action.card_id.as_str())
            .with_source_card(action.card_id.clone(), action.card_name.clone())
            .with_behavior_index(action.behavior_index)
            .with_target_card(self.target_card.clone())
            .with_target_player(self.target_player.clone())
            .apply_behavior(m, &action.behavior, chosen)?;

        m.player_mut(player_id)?
            .increment_play_count(&action.card_id, action.behavior_index);
        process_tile_queue(m, player_id)?;
        m.record(
            player_id,
            action.card_id.as_str(),
            SourceType::CardAction,
            format!("used {} action {}", action.card_name, action.behavior_index),
        );
        consume_action(m, player_id)
    }
}
