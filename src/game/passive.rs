//! Passive card effects
//!
//! Effects are kept in a registry of `(condition, owner) -> EffectHandle`
//! entries. [`PassiveEffects::install`] subscribes exactly one listener per
//! relevant event type on the game's bus; each listener converts its event
//! into an [`Occurrence`], collects the matching effects, releases the
//! registry lock and applies them through [`Game::update`].
//!
//! Effects may trigger further effects. Chains deeper than
//! [`MAX_CHAIN_DEPTH`] on one call stack are cut off with a warning.

use crate::core::{
    CardEffect, CardId, CardType, PlayerId, ResourceType, StandardProject, Tag, Target, TileType,
    TriggerCondition, TriggerConditionType,
};
use crate::events::{
    CardPlayed, Event, EventBus, OceansChanged, OxygenChanged, PlacementBonusGained,
    ProductionChanged, StandardProjectPlayed, SubscriptionId, TemperatureChanged, TilePlaced,
};
use crate::game::logger::log_if_verbose;
use crate::game::{process_tile_queue, BehaviorApplier, Game, Mutation, SourceType};
use crate::Result;
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, Weak};

/// Nested effect applications allowed on one call stack
pub const MAX_CHAIN_DEPTH: usize = 16;

thread_local! {
    static CHAIN_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Opaque id of one registered trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EffectHandle(u64);

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect-{}", self.0)
    }
}

/// Something that happened which passive effects may react to
#[derive(Debug, Clone, Copy)]
pub enum Occurrence<'a> {
    TilePlaced {
        player: &'a PlayerId,
        tile: TileType,
    },
    TemperatureRaised {
        player: Option<&'a PlayerId>,
    },
    OxygenRaised {
        player: Option<&'a PlayerId>,
    },
    OceansRaised {
        player: Option<&'a PlayerId>,
        count: i32,
    },
    PlacementBonus {
        player: &'a PlayerId,
        resources: &'a [(ResourceType, i32)],
    },
    CardPlayed {
        player: &'a PlayerId,
        card: &'a CardId,
        card_type: CardType,
        tags: &'a [Tag],
    },
    StandardProject {
        player: &'a PlayerId,
        project: StandardProject,
    },
    ProductionIncreased {
        player: &'a PlayerId,
        resource: ResourceType,
    },
}

impl<'a> Occurrence<'a> {
    pub fn player(&self) -> Option<&'a PlayerId> {
        match *self {
            Occurrence::TilePlaced { player, .. }
            | Occurrence::PlacementBonus { player, .. }
            | Occurrence::CardPlayed { player, .. }
            | Occurrence::StandardProject { player, .. }
            | Occurrence::ProductionIncreased { player, .. } => Some(player),
            Occurrence::TemperatureRaised { player }
            | Occurrence::OxygenRaised { player }
            | Occurrence::OceansRaised { player, .. } => player,
        }
    }
}

fn tile_placed(event: &TilePlaced) -> Option<Occurrence<'_>> {
    Some(Occurrence::TilePlaced {
        player: &event.player_id,
        tile: event.tile_type,
    })
}

fn temperature_raised(event: &TemperatureChanged) -> Option<Occurrence<'_>> {
    (event.new > event.old).then_some(Occurrence::TemperatureRaised {
        player: event.changed_by.as_ref(),
    })
}

fn oxygen_raised(event: &OxygenChanged) -> Option<Occurrence<'_>> {
    (event.new > event.old).then_some(Occurrence::OxygenRaised {
        player: event.changed_by.as_ref(),
    })
}

fn oceans_raised(event: &OceansChanged) -> Option<Occurrence<'_>> {
    (event.new > event.old).then_some(Occurrence::OceansRaised {
        player: event.changed_by.as_ref(),
        count: event.new - event.old,
    })
}

fn bonus_gained(event: &PlacementBonusGained) -> Option<Occurrence<'_>> {
    Some(Occurrence::PlacementBonus {
        player: &event.player_id,
        resources: &event.resources,
    })
}

fn card_played(event: &CardPlayed) -> Option<Occurrence<'_>> {
    Some(Occurrence::CardPlayed {
        player: &event.player_id,
        card: &event.card_id,
        card_type: event.card_type,
        tags: &event.tags,
    })
}

fn project_played(event: &StandardProjectPlayed) -> Option<Occurrence<'_>> {
    Some(Occurrence::StandardProject {
        player: &event.player_id,
        project: event.project,
    })
}

fn production_increased(event: &ProductionChanged) -> Option<Occurrence<'_>> {
    (event.new > event.old).then_some(Occurrence::ProductionIncreased {
        player: &event.player_id,
        resource: event.resource,
    })
}

/// How many times `condition` fires for `occurrence`, ignoring scope
fn times_matched(condition: &TriggerCondition, card: &CardId, occurrence: &Occurrence<'_>) -> u32 {
    use TriggerConditionType as Kind;

    let filter = |list_empty: bool, hit: bool| u32::from(list_empty || hit);

    match (condition.kind, *occurrence) {
        (Kind::CityPlaced, Occurrence::TilePlaced { tile, .. }) => u32::from(tile == TileType::City),
        (Kind::GreeneryPlaced, Occurrence::TilePlaced { tile, .. }) => {
            u32::from(tile == TileType::Greenery)
        }
        (Kind::TilePlaced, Occurrence::TilePlaced { .. }) => 1,
        (Kind::OceanPlaced, Occurrence::OceansRaised { count, .. }) => count.max(0) as u32,
        (Kind::TemperatureRaise, Occurrence::TemperatureRaised { .. }) => 1,
        (Kind::OxygenRaise, Occurrence::OxygenRaised { .. }) => 1,
        (Kind::PlacementBonusGained, Occurrence::PlacementBonus { resources, .. }) => filter(
            condition.affected_resources.is_empty(),
            resources
                .iter()
                .any(|(r, _)| condition.affected_resources.contains(r)),
        ),
        (Kind::CardPlayed | Kind::TagPlayed, Occurrence::CardPlayed { card: played, .. })
            if played == card =>
        {
            0
        }
        (Kind::CardPlayed, Occurrence::CardPlayed { card_type, tags, .. }) => {
            filter(
                condition.affected_card_types.is_empty(),
                condition.affected_card_types.contains(&card_type),
            ) * filter(
                condition.affected_tags.is_empty(),
                tags.iter().any(|t| condition.affected_tags.contains(t)),
            )
        }
        (Kind::TagPlayed, Occurrence::CardPlayed { card_type, tags, .. }) => {
            let type_ok = condition.affected_card_types.is_empty()
                || condition.affected_card_types.contains(&card_type);
            if !type_ok {
                return 0;
            }
            tags.iter()
                .filter(|t| condition.affected_tags.is_empty() || condition.affected_tags.contains(t))
                .count() as u32
        }
        (Kind::StandardProjectPlayed, Occurrence::StandardProject { project, .. }) => filter(
            condition.affected_standard_projects.is_empty(),
            condition.affected_standard_projects.contains(&project),
        ),
        (Kind::ProductionIncreased, Occurrence::ProductionIncreased { resource, .. }) => filter(
            condition.affected_resources.is_empty(),
            condition
                .affected_resources
                .iter()
                .any(|r| r.base_of_production().unwrap_or(*r) == resource),
        ),
        _ => 0,
    }
}

/// Whether an occurrence caused by `actor` is visible to `owner`'s effect
fn in_scope(condition: &TriggerCondition, owner: &PlayerId, actor: Option<&PlayerId>) -> bool {
    match condition.target() {
        Target::AnyPlayer => true,
        _ => actor.map_or(true, |actor| actor == owner),
    }
}

#[derive(Debug, Clone)]
struct Registered {
    handle: EffectHandle,
    owner: PlayerId,
    condition: TriggerCondition,
    effect: CardEffect,
}

/// An effect selected for application
#[derive(Debug, Clone)]
pub struct MatchedEffect {
    pub handle: EffectHandle,
    pub owner: PlayerId,
    pub effect: CardEffect,
    pub times: u32,
}

#[derive(Debug, Default)]
struct Inner {
    next_handle: u64,
    effects: Vec<Registered>,
    subscriptions: Vec<SubscriptionId>,
}

#[derive(Debug, Default)]
pub struct PassiveEffects {
    inner: Mutex<Inner>,
}

impl PassiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe the dispatching listeners on `bus`, once per game
    pub fn install(&self, bus: &EventBus, game: Weak<Game>) {
        let subscriptions = vec![
            listen(bus, &game, tile_placed),
            listen(bus, &game, temperature_raised),
            listen(bus, &game, oxygen_raised),
            listen(bus, &game, oceans_raised),
            listen(bus, &game, bonus_gained),
            listen(bus, &game, card_played),
            listen(bus, &game, project_played),
            listen(bus, &game, production_increased),
        ];
        self.lock().subscriptions.extend(subscriptions);
    }

    /// Bus subscriptions owned by this registry
    pub fn subscriptions(&self) -> Vec<SubscriptionId> {
        self.lock().subscriptions.clone()
    }

    /// Register every conditional auto trigger of `effect` for `owner`
    pub fn register(&self, owner: &PlayerId, effect: &CardEffect) -> Vec<EffectHandle> {
        let mut inner = self.lock();
        let mut handles = Vec::new();
        for trigger in effect.behavior.triggers.iter().filter(|t| t.is_passive()) {
            let Some(condition) = trigger.condition.clone() else {
                continue;
            };
            inner.next_handle += 1;
            let handle = EffectHandle(inner.next_handle);
            inner.effects.push(Registered {
                handle,
                owner: owner.clone(),
                condition,
                effect: effect.clone(),
            });
            handles.push(handle);
        }
        handles
    }

    /// Remove one registration; unknown handles are a no-op
    pub fn unregister(&self, handle: EffectHandle) -> bool {
        let mut inner = self.lock();
        let before = inner.effects.len();
        inner.effects.retain(|r| r.handle != handle);
        inner.effects.len() != before
    }

    /// Remove everything `owner` registered; returns how many were removed
    pub fn unregister_player(&self, owner: &PlayerId) -> usize {
        let mut inner = self.lock();
        let before = inner.effects.len();
        inner.effects.retain(|r| &r.owner != owner);
        before - inner.effects.len()
    }

    pub fn handles_for(&self, owner: &PlayerId) -> Vec<EffectHandle> {
        self.lock()
            .effects
            .iter()
            .filter(|r| &r.owner == owner)
            .map(|r| r.handle)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().effects.is_empty()
    }

    /// Effects that fire for `occurrence`, in registration order
    pub fn matching(&self, occurrence: &Occurrence<'_>) -> Vec<MatchedEffect> {
        let actor = occurrence.player();
        self.lock()
            .effects
            .iter()
            .filter(|r| in_scope(&r.condition, &r.owner, actor))
            .filter_map(|r| {
                let times = times_matched(&r.condition, &r.effect.card_id, occurrence);
                (times > 0).then(|| MatchedEffect {
                    handle: r.handle,
                    owner: r.owner.clone(),
                    effect: r.effect.clone(),
                    times,
                })
            })
            .collect()
    }
}

fn listen<E: Event>(
    bus: &EventBus,
    game: &Weak<Game>,
    convert: for<'a> fn(&'a E) -> Option<Occurrence<'a>>,
) -> SubscriptionId {
    let game = game.clone();
    bus.subscribe::<E, _>(move |event| {
        let Some(occurrence) = convert(event) else {
            return;
        };
        if let Some(game) = game.upgrade() {
            dispatch(&game, &occurrence);
        }
    })
}

fn dispatch(game: &Game, occurrence: &Occurrence<'_>) {
    let matched = game.passive().matching(occurrence);
    if matched.is_empty() {
        return;
    }

    let depth = CHAIN_DEPTH.with(Cell::get);
    if depth >= MAX_CHAIN_DEPTH {
        game.logger().warn(&format!(
            "passive effect chain deeper than {MAX_CHAIN_DEPTH}, dropping {} effects",
            matched.len()
        ));
        return;
    }

    CHAIN_DEPTH.with(|d| d.set(depth + 1));
    for effect in &matched {
        for _ in 0..effect.times {
            if let Err(e) = game.update(|m| fire(m, effect)) {
                game.logger().warn(&format!(
                    "{} ({}) failed for {}: {e}",
                    effect.effect.card_name, effect.handle, effect.owner
                ));
            }
        }
    }
    CHAIN_DEPTH.with(|d| d.set(depth));
}

fn fire(m: &mut Mutation<'_>, matched: &MatchedEffect) -> Result<()> {
    let effect = &matched.effect;
    log_if_verbose!(
        m.logger,
        "{} triggers {} for {}",
        matched.handle,
        effect.card_name,
        matched.owner
    );

    BehaviorApplier::new(matched.owner.clone(), effect.card_id.as_str())
        .with_source_card(effect.card_id.clone(), effect.card_name.clone())
        .with_behavior_index(effect.behavior_index)
        .apply_outputs(m, &effect.behavior.outputs)?;
    m.record(
        &matched.owner,
        effect.card_id.as_str(),
        SourceType::PassiveEffect,
        format!("{} triggered", effect.card_name),
    );
    process_tile_queue(m, &matched.owner)?;
    m.mark_changed();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardBehavior, ResourceCondition, Trigger};

    fn effect(card: &str, condition: TriggerCondition) -> CardEffect {
        CardEffect {
            card_id: CardId::new(card),
            card_name: card.to_string(),
            behavior_index: 0,
            behavior: CardBehavior {
                triggers: vec![Trigger::on(condition)],
                outputs: vec![ResourceCondition::own(ResourceType::Credits, 1)],
                ..Default::default()
            },
        }
    }

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::new("bob")
    }

    #[test]
    fn test_register_only_conditional_triggers() {
        let passive = PassiveEffects::new();
        let mut city = effect("P1", TriggerCondition::new(TriggerConditionType::CityPlaced));
        city.behavior.triggers.push(Trigger::auto());
        city.behavior.triggers.push(Trigger::manual());

        let handles = passive.register(&alice(), &city);
        assert_eq!(handles.len(), 1);
        assert_eq!(passive.len(), 1);
        assert_eq!(handles[0].to_string(), "effect-1");
    }

    #[test]
    fn test_self_scope_ignores_other_players() {
        let passive = PassiveEffects::new();
        passive.register(&alice(), &effect("P1", TriggerCondition::new(TriggerConditionType::CityPlaced)));

        let by_bob = Occurrence::TilePlaced {
            player: &bob(),
            tile: TileType::City,
        };
        assert!(passive.matching(&by_bob).is_empty());

        let by_alice = Occurrence::TilePlaced {
            player: &alice(),
            tile: TileType::City,
        };
        assert_eq!(passive.matching(&by_alice).len(), 1);

        let greenery = Occurrence::TilePlaced {
            player: &alice(),
            tile: TileType::Greenery,
        };
        assert!(passive.matching(&greenery).is_empty());
    }

    #[test]
    fn test_any_player_scope() {
        let passive = PassiveEffects::new();
        let mut condition = TriggerCondition::new(TriggerConditionType::CityPlaced);
        condition.target = Some(Target::AnyPlayer);
        passive.register(&alice(), &effect("P1", condition));

        let by_bob = Occurrence::TilePlaced {
            player: &bob(),
            tile: TileType::City,
        };
        let matched = passive.matching(&by_bob);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].owner, alice());
    }

    #[test]
    fn test_tag_played_counts_each_tag() {
        let passive = PassiveEffects::new();
        let mut condition = TriggerCondition::new(TriggerConditionType::TagPlayed);
        condition.affected_tags = vec![Tag::Space];
        passive.register(&alice(), &effect("P1", condition));

        let card = CardId::new("P9");
        let tags = [Tag::Space, Tag::Space, Tag::Earth];
        let played = Occurrence::CardPlayed {
            player: &alice(),
            card: &card,
            card_type: CardType::Event,
            tags: &tags,
        };
        assert_eq!(passive.matching(&played)[0].times, 2);
    }

    #[test]
    fn test_own_card_does_not_trigger_itself() {
        let passive = PassiveEffects::new();
        passive.register(&alice(), &effect("P1", TriggerCondition::new(TriggerConditionType::CardPlayed)));

        let own = CardId::new("P1");
        let played = Occurrence::CardPlayed {
            player: &alice(),
            card: &own,
            card_type: CardType::Active,
            tags: &[],
        };
        assert!(passive.matching(&played).is_empty());
    }

    #[test]
    fn test_placement_bonus_filter() {
        let passive = PassiveEffects::new();
        let mut condition = TriggerCondition::new(TriggerConditionType::PlacementBonusGained);
        condition.affected_resources = vec![ResourceType::Steel, ResourceType::Titanium];
        passive.register(&alice(), &effect("P1", condition));

        let plants = [(ResourceType::Plants, 1)];
        let steel = [(ResourceType::Steel, 2)];
        let by = alice();
        assert!(passive
            .matching(&Occurrence::PlacementBonus {
                player: &by,
                resources: &plants
            })
            .is_empty());
        assert_eq!(
            passive
                .matching(&Occurrence::PlacementBonus {
                    player: &by,
                    resources: &steel
                })
                .len(),
            1
        );
    }

    #[test]
    fn test_production_filter_accepts_production_names() {
        let passive = PassiveEffects::new();
        let mut condition = TriggerCondition::new(TriggerConditionType::ProductionIncreased);
        condition.affected_resources = vec![ResourceType::SteelProduction];
        passive.register(&alice(), &effect("P1", condition));

        let by = alice();
        let steel = Occurrence::ProductionIncreased {
            player: &by,
            resource: ResourceType::Steel,
        };
        let heat = Occurrence::ProductionIncreased {
            player: &by,
            resource: ResourceType::Heat,
        };
        assert_eq!(passive.matching(&steel).len(), 1);
        assert!(passive.matching(&heat).is_empty());
    }

    #[test]
    fn test_unregister() {
        let passive = PassiveEffects::new();
        let a = passive.register(&alice(), &effect("P1", TriggerCondition::new(TriggerConditionType::OxygenRaise)));
        passive.register(&alice(), &effect("P2", TriggerCondition::new(TriggerConditionType::OxygenRaise)));
        passive.register(&bob(), &effect("P3", TriggerCondition::new(TriggerConditionType::OxygenRaise)));

        assert!(passive.unregister(a[0]));
        assert!(!passive.unregister(a[0]));
        assert_eq!(passive.handles_for(&alice()).len(), 1);
        assert_eq!(passive.unregister_player(&alice()), 1);
        assert_eq!(passive.unregister_player(&alice()), 0);
        assert_eq!(passive.len(), 1);
    }

    #[test]
    fn test_parameter_raise_without_actor_reaches_everyone() {
        let passive = PassiveEffects::new();
        passive.register(&alice(), &effect("P1", TriggerCondition::new(TriggerConditionType::OceanPlaced)));
        passive.register(&bob(), &effect("P2", TriggerCondition::new(TriggerConditionType::OceanPlaced)));

        let matched = passive.matching(&Occurrence::OceansRaised {
            player: None,
            count: 2,
        });
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|m| m.times == 2));
    }
}
