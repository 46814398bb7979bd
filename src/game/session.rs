//! The per-game aggregate
//!
//! A [`Game`] owns its state behind a read/write lock, its event bus, its
//! logger and its passive-effect registry. Every mutation runs through
//! [`Game::update`]: the write lock is taken, the closure mutates state and
//! records events into a sink, the lock is released, and only then are the
//! events published. Handlers (passive effects in particular) are therefore
//! free to call back into the same game.

use crate::core::{
    Card, CardEffect, CardId, GameId, Player, PlayerId, Production, ResourceType, Resources,
};
use crate::events::{EventBus, EventSink, GameStateChanged};
use crate::game::{
    ActionRecord, Deck, EffectHandle, EngineLogger, GameSettings, GameState, PassiveEffects,
    SourceType,
};
use crate::loader::CardRegistry;
use crate::Result;
use std::sync::{Arc, PoisonError, RwLock};

pub struct Game {
    id: GameId,
    state: RwLock<GameState>,
    bus: EventBus,
    registry: Arc<dyn CardRegistry>,
    logger: EngineLogger,
    passive: PassiveEffects,
}

/// Mutable view handed to [`Game::update`] closures
pub struct Mutation<'a> {
    pub state: &'a mut GameState,
    pub events: EventSink,
    pub registry: &'a dyn CardRegistry,
    pub logger: &'a EngineLogger,
    pub passive: &'a PassiveEffects,
    /// Effects registered during this update, dropped again if it fails
    registered: Vec<EffectHandle>,
}

impl<'a> Mutation<'a> {
    pub fn new(
        state: &'a mut GameState,
        registry: &'a dyn CardRegistry,
        logger: &'a EngineLogger,
        passive: &'a PassiveEffects,
    ) -> Self {
        let events = EventSink::new(state.id.clone());
        Mutation {
            state,
            events,
            registry,
            logger,
            passive,
            registered: Vec::new(),
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.state.id
    }

    pub fn player(&self, id: &PlayerId) -> Result<&Player> {
        self.state.get_player(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Result<&mut Player> {
        self.state.get_player_mut(id)
    }

    pub fn card(&self, id: &CardId) -> Result<Arc<Card>> {
        self.registry.get_by_id(id)
    }

    pub fn add_resources(
        &mut self,
        player: &PlayerId,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
    ) -> Result<()> {
        let player = self.state.get_player_mut(player)?;
        player.add_resources(deltas, &mut self.events);
        Ok(())
    }

    pub fn add_production(
        &mut self,
        player: &PlayerId,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
    ) -> Result<()> {
        let player = self.state.get_player_mut(player)?;
        player.add_production(deltas, &mut self.events);
        Ok(())
    }

    pub fn update_terraform_rating(&mut self, player: &PlayerId, delta: i32) -> Result<()> {
        let player = self.state.get_player_mut(player)?;
        player.update_terraform_rating(delta, &mut self.events);
        Ok(())
    }

    /// Raise temperature and award 1 TR per step actually applied
    pub fn raise_temperature(&mut self, player: &PlayerId, steps: i32) -> Result<i32> {
        let applied = self
            .state
            .global_parameters
            .increase_temperature(steps, Some(player), &mut self.events);
        if applied > 0 {
            self.update_terraform_rating(player, applied)?;
        }
        Ok(applied)
    }

    /// Raise oxygen and award 1 TR per step actually applied
    pub fn raise_oxygen(&mut self, player: &PlayerId, steps: i32) -> Result<i32> {
        let applied = self
            .state
            .global_parameters
            .increase_oxygen(steps, Some(player), &mut self.events);
        if applied > 0 {
            self.update_terraform_rating(player, applied)?;
        }
        Ok(applied)
    }

    /// Count placed oceans and award 1 TR per ocean actually counted
    pub fn raise_oceans(&mut self, player: &PlayerId, count: i32) -> Result<i32> {
        let applied = self
            .state
            .global_parameters
            .increase_oceans(count, Some(player), &mut self.events);
        if applied > 0 {
            self.update_terraform_rating(player, applied)?;
        }
        Ok(applied)
    }

    pub fn record(
        &mut self,
        player: &PlayerId,
        source: impl Into<String>,
        source_type: SourceType,
        description: impl Into<String>,
    ) {
        let record = ActionRecord {
            generation: self.state.generation(),
            player: player.clone(),
            source: source.into(),
            source_type,
            description: description.into(),
        };
        self.logger.normal(&format!("{}: {}", record.player, record.description));
        self.state.history.log(record);
    }

    /// Subscribe `effect` for `owner`; undone if the update fails
    pub fn register_effect(&mut self, owner: &PlayerId, effect: &CardEffect) -> Vec<EffectHandle> {
        let handles = self.passive.register(owner, effect);
        self.registered.extend(handles.iter().copied());
        handles
    }

    /// Coarse change notice for broadcasters; pushed once per successful action
    pub fn mark_changed(&mut self) {
        self.events.push(GameStateChanged {
            game_id: self.state.id.clone(),
        });
    }
}

impl Game {
    /// Create a game whose deck is built from `registry`'s cards in the
    /// settings' packs
    pub fn new(
        id: GameId,
        settings: GameSettings,
        registry: Arc<dyn CardRegistry>,
        logger: EngineLogger,
    ) -> Arc<Game> {
        let cards = registry.get_all();
        let deck = Deck::from_cards(
            cards
                .iter()
                .filter(|c| settings.includes_pack(&c.pack))
                .map(|c| c.as_ref()),
            settings.seed,
        );
        let state = GameState::new(id.clone(), settings, deck);
        let logger = logger.for_game(&id);

        Arc::new_cyclic(|weak| {
            let bus = EventBus::new();
            let passive = PassiveEffects::new();
            passive.install(&bus, weak.clone());
            Game {
                id,
                state: RwLock::new(state),
                bus,
                registry,
                logger,
                passive,
            }
        })
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &Arc<dyn CardRegistry> {
        &self.registry
    }

    pub fn logger(&self) -> &EngineLogger {
        &self.logger
    }

    pub fn passive(&self) -> &PassiveEffects {
        &self.passive
    }

    /// Run `f` under the shared lock
    pub fn read<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn snapshot(&self) -> GameState {
        self.read(GameState::clone)
    }

    /// Mutate under the exclusive lock, then publish what happened
    ///
    /// Events are published only if `f` succeeds. On failure the state is
    /// put back as it was and the events are dropped.
    pub fn update<R>(&self, f: impl FnOnce(&mut Mutation<'_>) -> Result<R>) -> Result<R> {
        let (result, events) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let before = state.clone();
            let mut mutation = Mutation::new(
                &mut state,
                self.registry.as_ref(),
                &self.logger,
                &self.passive,
            );
            let result = f(&mut mutation);
            let Mutation {
                events, registered, ..
            } = mutation;
            if result.is_err() {
                for handle in registered {
                    self.passive.unregister(handle);
                }
                *state = before;
            }
            (result, events)
        };

        match result {
            Ok(value) => {
                events.publish_all(&self.bus);
                Ok(value)
            }
            Err(e) => {
                if !events.is_empty() {
                    self.logger
                        .warn(&format!("rolled back update, dropping {} events: {e}", events.len()));
                }
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------
    // Ledger facade
    // ---------------------------------------------------------------

    pub fn resources(&self, player: &PlayerId) -> Result<Resources> {
        self.read(|state| state.get_player(player).map(Player::resources))
    }

    pub fn production(&self, player: &PlayerId) -> Result<Production> {
        self.read(|state| state.get_player(player).map(Player::production))
    }

    pub fn terraform_rating(&self, player: &PlayerId) -> Result<i32> {
        self.read(|state| state.get_player(player).map(Player::terraform_rating))
    }

    pub fn set_resources(&self, player: &PlayerId, snapshot: Resources) -> Result<()> {
        self.update(|m| {
            let player = m.state.get_player_mut(player)?;
            player.set_resources(snapshot, &mut m.events);
            Ok(())
        })
    }

    pub fn add_resources(
        &self,
        player: &PlayerId,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
    ) -> Result<()> {
        self.update(|m| m.add_resources(player, deltas))
    }

    pub fn add_production(
        &self,
        player: &PlayerId,
        deltas: impl IntoIterator<Item = (ResourceType, i32)>,
    ) -> Result<()> {
        self.update(|m| m.add_production(player, deltas))
    }

    pub fn update_terraform_rating(&self, player: &PlayerId, delta: i32) -> Result<()> {
        self.update(|m| m.update_terraform_rating(player, delta))
    }

    /// Tracker only: no TR is awarded
    pub fn increase_temperature(&self, steps: i32, changed_by: Option<&PlayerId>) -> i32 {
        self.update(|m| {
            Ok(m.state
                .global_parameters
                .increase_temperature(steps, changed_by, &mut m.events))
        })
        .unwrap_or(0)
    }

    pub fn increase_oxygen(&self, steps: i32, changed_by: Option<&PlayerId>) -> i32 {
        self.update(|m| {
            Ok(m.state
                .global_parameters
                .increase_oxygen(steps, changed_by, &mut m.events))
        })
        .unwrap_or(0)
    }

    pub fn increase_oceans(&self, count: i32, changed_by: Option<&PlayerId>) -> i32 {
        self.update(|m| {
            Ok(m.state
                .global_parameters
                .increase_oceans(count, changed_by, &mut m.events))
        })
        .unwrap_or(0)
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("bus", &self.bus)
            .field("passive", &self.passive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ResourcesChanged;
    use crate::loader::InMemoryCardRegistry;
    use std::sync::Mutex;

    fn game() -> Arc<Game> {
        let registry: Arc<dyn CardRegistry> = Arc::new(InMemoryCardRegistry::default());
        let game = Game::new(
            GameId::new("g1"),
            GameSettings::default().with_seed(1),
            registry,
            EngineLogger::with_verbosity(crate::game::VerbosityLevel::Silent),
        );
        game.update(|m| {
            m.state.add_player(Player::new(PlayerId::new("p1"), "Alice"));
            Ok(())
        })
        .unwrap();
        game
    }

    #[test]
    fn test_set_twice_publishes_once() {
        let game = game();
        let seen = Arc::new(Mutex::new(0));
        let s = Arc::clone(&seen);
        game.bus().subscribe(move |_: &ResourcesChanged| *s.lock().unwrap() += 1);

        let p1 = PlayerId::new("p1");
        let snapshot = Resources {
            credits: 7,
            ..Default::default()
        };
        game.set_resources(&p1, snapshot).unwrap();
        game.set_resources(&p1, snapshot).unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(game.resources(&p1).unwrap().credits, 7);
    }

    #[test]
    fn test_handler_can_reenter_game() {
        let game = game();
        let weak = Arc::downgrade(&game);
        let p1 = PlayerId::new("p1");
        let p = p1.clone();
        // Heat gains trigger a plants gain through a nested update
        game.bus().subscribe(move |e: &ResourcesChanged| {
            if e.resource == ResourceType::Heat {
                if let Some(game) = weak.upgrade() {
                    game.add_resources(&p, [(ResourceType::Plants, 1)]).unwrap();
                }
            }
        });

        game.add_resources(&p1, [(ResourceType::Heat, 2)]).unwrap();
        let resources = game.resources(&p1).unwrap();
        assert_eq!(resources.heat, 2);
        assert_eq!(resources.plants, 1);
    }

    #[test]
    fn test_failed_update_publishes_nothing() {
        let game = game();
        let seen = Arc::new(Mutex::new(0));
        let s = Arc::clone(&seen);
        game.bus().subscribe(move |_: &ResourcesChanged| *s.lock().unwrap() += 1);

        let result = game.add_resources(&PlayerId::new("ghost"), [(ResourceType::Heat, 1)]);
        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn test_failed_update_is_rolled_back() {
        use crate::core::{
            CardBehavior, ResourceCondition, Trigger, TriggerCondition, TriggerConditionType,
        };
        use crate::EngineError;

        let game = game();
        let p1 = PlayerId::new("p1");
        let effect = CardEffect {
            card_id: CardId::new("P1"),
            card_name: "Mayor".to_string(),
            behavior_index: 0,
            behavior: CardBehavior {
                triggers: vec![Trigger::on(TriggerCondition::new(TriggerConditionType::CityPlaced))],
                outputs: vec![ResourceCondition::own(ResourceType::Credits, 2)],
                ..Default::default()
            },
        };

        let result: Result<()> = game.update(|m| {
            m.add_resources(&p1, [(ResourceType::Credits, 10)])?;
            m.update_terraform_rating(&p1, 3)?;
            m.register_effect(&p1, &effect);
            Err(EngineError::InvalidAction("late failure".into()))
        });

        assert!(result.is_err());
        assert_eq!(game.resources(&p1).unwrap().credits, 0);
        assert_eq!(game.terraform_rating(&p1).unwrap(), 20);
        assert!(game.passive().is_empty());
    }

    #[test]
    fn test_tracker_facade_awards_no_tr() {
        let game = game();
        let p1 = PlayerId::new("p1");
        assert_eq!(game.increase_temperature(2, Some(&p1)), 2);
        assert_eq!(game.terraform_rating(&p1).unwrap(), 20);
        assert_eq!(game.read(|s| s.global_parameters.temperature()), -26);
    }
}
