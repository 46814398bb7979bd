//! Interpreter for declarative card behaviors
//!
//! [`BehaviorApplier`] turns a behavior's inputs and outputs into ledger,
//! board and selection changes for one acting player. Application happens
//! in two passes: first every output's target is resolved and its scaled
//! amount computed (and the deck checked for any draw), then everything is
//! written. A failure in the first pass leaves the game untouched.
//!
//! Resource types the engine does not implement are logged as warnings and
//! skipped.

use crate::core::{
    CardBehavior, CardId, PaymentSubstitute, PendingCardDrawSelection, PendingTileQueue,
    PerCondition, PlayerId, Production, ResourceCondition, ResourceType, Target, TileType,
};
use crate::game::logger::log_if_verbose;
use crate::game::{count_tags, GameState, Mutation, TriggeredEffect};
use crate::loader::CardRegistry;
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;

/// Credits paid per card bought from a card-draw selection
pub const CARD_BUY_COST: i32 = 3;

/// Who an output lands on, resolved once per output
#[derive(Debug, Clone, PartialEq, Eq)]
enum Recipient {
    Player(PlayerId),
    Card { owner: PlayerId, card: CardId },
    StealFromPlayer(PlayerId),
    StealFromCard { owner: PlayerId, card: CardId },
    Nobody,
}

/// An output ready to be written
#[derive(Debug, Clone)]
struct ResolvedOutput {
    condition: ResourceCondition,
    recipient: Recipient,
    amount: i32,
}

#[derive(Debug, Default, Clone, Copy)]
struct CardFlow {
    draw: i32,
    peek: i32,
    take: i32,
    buy: i32,
}

impl CardFlow {
    fn reveal(&self) -> i32 {
        self.draw + self.peek
    }
}

/// How many of the things `per` names `player` has
///
/// `card` is the card the condition belongs to (its own storage). Returns
/// `None` for kinds that cannot be counted.
pub fn count_per_condition(
    state: &GameState,
    registry: &dyn CardRegistry,
    player: &PlayerId,
    card: Option<&CardId>,
    per: &PerCondition,
) -> Option<i32> {
    let everyone = matches!(per.target, Some(Target::AnyPlayer));
    let holder = state.get_player(player).ok();

    if per.target == Some(Target::SelfCard) || per.resource.is_card_resource() {
        return Some(match (card, holder) {
            (Some(card), Some(p)) => p.storage(card),
            _ => 0,
        });
    }

    if let Some(tile_type) = TileType::from_count(per.resource) {
        // oceans belong to nobody in particular; count them all unless told otherwise
        let own_only = match per.target {
            Some(target) => target == Target::SelfPlayer,
            None => tile_type != TileType::Ocean,
        };
        return Some(state.board.count_tiles(tile_type, own_only.then_some(player)));
    }

    match per.resource {
        ResourceType::Tag => {
            let tag = per.tag?;
            Some(count_tags(state, registry, (!everyone).then_some(player), tag))
        }
        ResourceType::Temperature => Some(state.global_parameters.temperature()),
        ResourceType::Oxygen => Some(state.global_parameters.oxygen()),
        ResourceType::Oceans => Some(state.global_parameters.oceans()),
        ResourceType::Tr => Some(holder.map_or(0, |p| p.terraform_rating())),
        r if r.is_basic() => Some(holder.and_then(|p| p.resources().get(r)).unwrap_or(0)),
        r if r.is_production() => Some(holder.and_then(|p| p.production().get(r)).unwrap_or(0)),
        _ => None,
    }
}

/// Applies behaviors on behalf of one player
#[derive(Debug, Clone)]
pub struct BehaviorApplier {
    player: PlayerId,
    /// Card id, project name, or other attribution
    source: String,
    source_card: Option<CardId>,
    card_name: Option<String>,
    target_card: Option<CardId>,
    target_player: Option<PlayerId>,
    behavior_index: Option<usize>,
}

impl BehaviorApplier {
    pub fn new(player: PlayerId, source: impl Into<String>) -> Self {
        BehaviorApplier {
            player,
            source: source.into(),
            source_card: None,
            card_name: None,
            target_card: None,
            target_player: None,
            behavior_index: None,
        }
    }

    /// The card whose behavior is being applied (self-card storage)
    pub fn with_source_card(mut self, card: CardId, name: impl Into<String>) -> Self {
        self.source_card = Some(card);
        self.card_name = Some(name.into());
        self
    }

    pub fn with_target_card(mut self, card: Option<CardId>) -> Self {
        self.target_card = card;
        self
    }

    pub fn with_target_player(mut self, player: Option<PlayerId>) -> Self {
        self.target_player = player;
        self
    }

    pub fn with_behavior_index(mut self, index: usize) -> Self {
        self.behavior_index = Some(index);
        self
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Inputs, then outputs, of `behavior` with an optional choice
    pub fn apply_behavior(
        &self,
        m: &mut Mutation<'_>,
        behavior: &CardBehavior,
        choice: Option<usize>,
    ) -> Result<()> {
        let (inputs, outputs) = behavior.inputs_outputs(choice)?;
        self.check_inputs(m, &inputs)?;
        let resolved = self.resolve_outputs(m, &outputs)?;
        self.deduct_inputs(m, &inputs)?;
        self.write_outputs(m, resolved)
    }

    /// Everything [`apply_behavior`](Self::apply_behavior) would reject,
    /// without writing
    pub fn check_behavior(
        &self,
        m: &Mutation<'_>,
        behavior: &CardBehavior,
        choice: Option<usize>,
    ) -> Result<()> {
        let (inputs, outputs) = behavior.inputs_outputs(choice)?;
        self.check_inputs(m, &inputs)?;
        self.resolve_outputs(m, &outputs).map(|_| ())
    }

    // ---------------------------------------------------------------
    // Inputs
    // ---------------------------------------------------------------

    /// Pay `inputs`; nothing is deducted unless everything is affordable
    pub fn apply_inputs(&self, m: &mut Mutation<'_>, inputs: &[ResourceCondition]) -> Result<()> {
        self.check_inputs(m, inputs)?;
        self.deduct_inputs(m, inputs)
    }

    fn check_inputs(&self, m: &Mutation<'_>, inputs: &[ResourceCondition]) -> Result<()> {
        let player = m.player(&self.player)?;
        let resources = player.resources();
        let production = player.production();

        let mut totals: FxHashMap<ResourceType, i32> = FxHashMap::default();
        for input in inputs {
            *totals.entry(input.resource).or_default() += input.amount;
        }

        for (resource, required) in totals {
            if resource.is_basic() {
                let available = resources.get(resource).unwrap_or(0);
                if available < required {
                    return Err(EngineError::insufficient(resource, required, available));
                }
            } else if resource.is_production() {
                let current = production.get(resource).unwrap_or(0);
                let floor = Production::floor(resource);
                if current - required < floor {
                    return Err(EngineError::insufficient(resource, required, current - floor));
                }
            } else if resource.is_card_resource() {
                let card = self.source_card.as_ref().ok_or_else(|| {
                    EngineError::InvalidAction(format!("{resource} input needs a source card"))
                })?;
                let available = player.storage(card);
                if available < required {
                    return Err(EngineError::insufficient(resource, required, available));
                }
            }
        }
        Ok(())
    }

    fn deduct_inputs(&self, m: &mut Mutation<'_>, inputs: &[ResourceCondition]) -> Result<()> {
        for input in inputs {
            let resource = input.resource;
            if resource.is_basic() {
                m.add_resources(&self.player, [(resource, -input.amount)])?;
            } else if resource.is_production() {
                m.add_production(&self.player, [(resource, -input.amount)])?;
            } else if resource.is_card_resource() {
                if let Some(card) = &self.source_card {
                    let player = m.state.get_player_mut(&self.player)?;
                    player.add_storage(card, resource, -input.amount, None, &mut m.events);
                }
            } else {
                m.logger.warn(&format!(
                    "unrecognized input resource {resource} from {}, skipped",
                    self.source
                ));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Outputs
    // ---------------------------------------------------------------

    pub fn apply_outputs(&self, m: &mut Mutation<'_>, outputs: &[ResourceCondition]) -> Result<()> {
        let resolved = self.resolve_outputs(m, outputs)?;
        self.write_outputs(m, resolved)
    }

    fn resolve_outputs(
        &self,
        m: &Mutation<'_>,
        outputs: &[ResourceCondition],
    ) -> Result<Vec<ResolvedOutput>> {
        let mut resolved = Vec::with_capacity(outputs.len());
        let mut flow = CardFlow::default();

        for output in outputs {
            let recipient = self.resolve_target(m, output)?;
            let amount = self.scaled_amount(m, output);
            match output.resource {
                ResourceType::CardDraw => flow.draw += amount,
                ResourceType::CardPeek => flow.peek += amount,
                ResourceType::CardTake => flow.take += amount,
                ResourceType::CardBuy => flow.buy += amount,
                _ => {}
            }
            resolved.push(ResolvedOutput {
                condition: output.clone(),
                recipient,
                amount,
            });
        }

        let available = m.state.deck.available();
        if flow.reveal() > 0 && flow.reveal() as usize > available {
            return Err(EngineError::DeckExhausted {
                requested: flow.reveal() as usize,
                available,
            });
        }
        Ok(resolved)
    }

    fn resolve_target(&self, m: &Mutation<'_>, output: &ResourceCondition) -> Result<Recipient> {
        let explicit_player = || {
            self.target_player.clone().ok_or_else(|| {
                EngineError::InvalidAction(format!(
                    "{output} targets {:?} but no target player was given",
                    output.target
                ))
            })
        };
        let owner_of = |card: &CardId| -> Result<PlayerId> {
            m.state
                .players
                .iter()
                .find(|p| p.played_cards().contains(card) || p.corporation.as_ref() == Some(card))
                .map(|p| p.id.clone())
                .ok_or_else(|| EngineError::not_found("played card", card))
        };

        let recipient = match output.target {
            Target::SelfPlayer => Recipient::Player(self.player.clone()),
            Target::AnyPlayer => Recipient::Player(explicit_player()?),
            Target::Opponent => {
                let target = explicit_player()?;
                if target == self.player {
                    return Err(EngineError::InvalidSelection(
                        "opponent target cannot be yourself".to_string(),
                    ));
                }
                Recipient::Player(target)
            }
            Target::StealAnyPlayer => Recipient::StealFromPlayer(explicit_player()?),
            Target::SelfCard => match &self.source_card {
                Some(card) => Recipient::Card {
                    owner: self.player.clone(),
                    card: card.clone(),
                },
                None => Recipient::Player(self.player.clone()),
            },
            Target::AnyCard => {
                let card = self.target_card.clone().ok_or_else(|| {
                    EngineError::InvalidAction(format!("{output} needs a target card"))
                })?;
                Recipient::Card {
                    owner: owner_of(&card)?,
                    card,
                }
            }
            Target::StealFromAnyCard => {
                let card = self.target_card.clone().ok_or_else(|| {
                    EngineError::InvalidAction(format!("{output} needs a target card"))
                })?;
                Recipient::StealFromCard {
                    owner: owner_of(&card)?,
                    card,
                }
            }
            Target::None => Recipient::Nobody,
        };
        Ok(recipient)
    }

    /// `amount`, scaled by the per-condition if there is one
    ///
    /// multiplier = counted / per.amount (integer division), capped by
    /// max-trigger when declared.
    fn scaled_amount(&self, m: &Mutation<'_>, output: &ResourceCondition) -> i32 {
        let Some(per) = &output.per else {
            return output.amount;
        };
        let counted = self.count(m, per);
        let mut multiplier = if per.amount > 0 { counted / per.amount } else { 0 };
        if let Some(max) = output.max_trigger {
            multiplier = max.cap(multiplier);
        }
        log_if_verbose!(
            m.logger,
            "{}: {} x{} (counted {} {})",
            self.source,
            output,
            multiplier,
            counted,
            per.resource
        );
        output.amount * multiplier
    }

    fn count(&self, m: &Mutation<'_>, per: &PerCondition) -> i32 {
        let card = self.source_card.as_ref();
        count_per_condition(m.state, m.registry, &self.player, card, per).unwrap_or_else(|| {
            m.logger.warn(&format!(
                "cannot count per-condition {} in {}, counted as 0",
                per.resource, self.source
            ));
            0
        })
    }

    fn write_outputs(&self, m: &mut Mutation<'_>, resolved: Vec<ResolvedOutput>) -> Result<()> {
        let mut flow = CardFlow::default();
        let mut applied = Vec::with_capacity(resolved.len());

        for output in resolved {
            let resource = output.condition.resource;
            let amount = output.amount;

            match resource {
                ResourceType::CardDraw => flow.draw += amount,
                ResourceType::CardPeek => flow.peek += amount,
                ResourceType::CardTake => flow.take += amount,
                ResourceType::CardBuy => flow.buy += amount,
                r if r.is_basic() => self.write_basic(m, &output.recipient, r, amount)?,
                r if r.is_production() => match &output.recipient {
                    Recipient::Player(p) => m.add_production(p, [(r, amount)])?,
                    other => self.unsupported(m, r, other),
                },
                ResourceType::Tr => match &output.recipient {
                    Recipient::Player(p) => m.update_terraform_rating(p, amount)?,
                    other => self.unsupported(m, resource, other),
                },
                ResourceType::Temperature => {
                    m.raise_temperature(&self.player, amount)?;
                }
                ResourceType::Oxygen => {
                    m.raise_oxygen(&self.player, amount)?;
                }
                ResourceType::Oceans => {
                    m.raise_oceans(&self.player, amount)?;
                }
                ResourceType::CityPlacement
                | ResourceType::GreeneryPlacement
                | ResourceType::OceanPlacement => {
                    if let Some(tile) = TileType::from_placement(resource) {
                        self.queue_tiles(m, tile, amount)?;
                    }
                }
                r if r.is_card_resource() => self.write_card_resource(m, &output.recipient, r, amount)?,
                ResourceType::PaymentSubstitute => {
                    let player = m.state.get_player_mut(&self.player)?;
                    for substitute in &output.condition.affected_resources {
                        player.add_payment_substitute(PaymentSubstitute {
                            resource: *substitute,
                            conversion_rate: amount,
                        });
                    }
                }
                // Static modifiers are read from the player's effects when costs are computed
                ResourceType::Discount | ResourceType::ValueModifier | ResourceType::Tag => {
                    log_if_verbose!(m.logger, "{}: modifier {} registered", self.source, resource);
                }
                other => {
                    m.logger.warn(&format!(
                        "unrecognized output resource {other} from {}, skipped",
                        self.source
                    ));
                    continue;
                }
            }

            let mut condition = output.condition;
            condition.amount = amount;
            applied.push(condition);
        }

        if flow.reveal() > 0 {
            self.create_card_draw(m, flow)?;
        }

        if let Some(card_name) = &self.card_name {
            m.state.triggered_effects.push(TriggeredEffect {
                card_name: card_name.clone(),
                player: self.player.clone(),
                outputs: applied,
            });
        }
        Ok(())
    }

    fn write_basic(
        &self,
        m: &mut Mutation<'_>,
        recipient: &Recipient,
        resource: ResourceType,
        amount: i32,
    ) -> Result<()> {
        match recipient {
            Recipient::Player(p) if *p == self.player => m.add_resources(p, [(resource, amount)]),
            Recipient::Player(p) => {
                // Removal from another player is bounded by what they have
                let stock = m.player(p)?.resources().get(resource).unwrap_or(0).max(0);
                let amount = amount.max(-stock);
                m.add_resources(p, [(resource, amount)])
            }
            Recipient::StealFromPlayer(victim) => {
                let stock = m.player(victim)?.resources().get(resource).unwrap_or(0).max(0);
                let taken = amount.min(stock).max(0);
                m.add_resources(victim, [(resource, -taken)])?;
                m.add_resources(&self.player, [(resource, taken)])
            }
            Recipient::Nobody => Ok(()),
            other => {
                self.unsupported(m, resource, other);
                Ok(())
            }
        }
    }

    fn write_card_resource(
        &self,
        m: &mut Mutation<'_>,
        recipient: &Recipient,
        resource: ResourceType,
        amount: i32,
    ) -> Result<()> {
        match recipient {
            Recipient::Card { owner, card } => {
                let capacity = self.capacity(m, card);
                let owner = m.state.get_player_mut(owner)?;
                owner.add_storage(card, resource, amount, capacity, &mut m.events);
            }
            Recipient::StealFromCard { owner, card } => {
                let victim = m.state.get_player_mut(owner)?;
                let before = victim.storage(card);
                let after = victim.add_storage(card, resource, -amount.max(0), None, &mut m.events);
                let taken = before - after;
                if let Some(source_card) = self.source_card.clone() {
                    let capacity = self.capacity(m, &source_card);
                    let player = m.state.get_player_mut(&self.player)?;
                    player.add_storage(&source_card, resource, taken, capacity, &mut m.events);
                }
            }
            Recipient::Nobody => {}
            other => self.unsupported(m, resource, other),
        }
        Ok(())
    }

    fn capacity(&self, m: &Mutation<'_>, card: &CardId) -> Option<i32> {
        m.registry
            .get_by_id(card)
            .ok()
            .and_then(|c| c.resource_storage.as_ref().and_then(|s| s.capacity))
    }

    fn queue_tiles(&self, m: &mut Mutation<'_>, tile: TileType, count: i32) -> Result<()> {
        if count <= 0 {
            return Ok(());
        }
        let source = self.source.clone();
        let player = m.state.get_player_mut(&self.player)?;
        let queue = player
            .selection_mut()
            .tile_queue
            .get_or_insert_with(|| PendingTileQueue::new(source));
        for _ in 0..count {
            queue.items.push_back(tile);
        }
        log_if_verbose!(m.logger, "{}: queued {} x{}", self.player, tile, count);
        Ok(())
    }

    fn create_card_draw(&self, m: &mut Mutation<'_>, flow: CardFlow) -> Result<()> {
        let cards = m.state.deck.draw(flow.reveal() as usize)?;
        let selection = PendingCardDrawSelection {
            available_cards: cards,
            free_take_count: (flow.draw + flow.take).max(0) as usize,
            max_buy_count: flow.buy.max(0) as usize,
            card_buy_cost: CARD_BUY_COST,
            source: self.source.clone(),
            source_card: self.source_card.clone(),
            source_behavior_index: self.behavior_index,
        };
        m.logger.normal(&format!(
            "{} reveals {} cards from {}",
            self.player,
            selection.available_cards.len(),
            self.source
        ));
        let player = m.state.get_player_mut(&self.player)?;
        player.offer_card_draw(selection);
        Ok(())
    }

    fn unsupported(&self, m: &Mutation<'_>, resource: ResourceType, recipient: &Recipient) {
        m.logger.warn(&format!(
            "unrecognized target {recipient:?} for {resource} from {}, skipped",
            self.source
        ));
    }
}
