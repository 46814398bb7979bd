//! Seeded automatic players
//!
//! An [`AutoPlayer`] looks at a snapshot of the game and picks one of the
//! actions it could legally take, at random. [`run_game`] drives a whole
//! table of them through the repository, exactly as remote players would.

use crate::actions::{
    Action, ConfirmCardDraw, ConfirmProductionCards, ConfirmSellPatents, GameAction, PlayCard,
    SelectStartingCards, SelectTile, SkipAction, UseCardAction, DEFAULT_STARTING_CREDITS,
    HEAT_PER_TEMPERATURE, PLANTS_PER_GREENERY,
};
use crate::core::{CardPayment, GameId, Player, PlayerId, StandardProject};
use crate::game::logger::log_if_verbose;
use crate::game::{
    can_afford_standard_project, can_play_card, can_use_card_action, effective_cost, GamePhase,
    GameRepository, GameState, GameStatus, CARD_BUY_COST,
};
use crate::loader::CardRegistry;
use crate::{EngineError, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Upper bound on actions in one [`run_game`] call
pub const MAX_STEPS: usize = 10_000;

/// A player that answers every decision with a random legal choice
pub struct AutoPlayer {
    player_id: PlayerId,
    rng: ChaCha12Rng,
}

impl AutoPlayer {
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        AutoPlayer {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// The decision this player owes right now, if any
    pub fn choose(&mut self, state: &GameState, registry: &dyn CardRegistry) -> Option<GameAction> {
        if state.status() != GameStatus::Active {
            return None;
        }
        let player = state.get_player(&self.player_id).ok()?;
        match state.phase() {
            GamePhase::StartingCardSelection => self.choose_starting(player, registry),
            GamePhase::ProductionAndCardDraw => self.choose_production(player),
            GamePhase::Action => self.choose_action(state, player, registry),
            _ => None,
        }
    }

    fn choose_starting(&mut self, player: &Player, registry: &dyn CardRegistry) -> Option<GameAction> {
        let offer = player.selection().starting.as_ref().filter(|s| !s.complete)?;
        let corporation = offer.available_corporations.choose(&mut self.rng).cloned();
        let credits = corporation
            .as_ref()
            .and_then(|id| registry.get_by_id(id).ok())
            .and_then(|card| card.starting_resources)
            .map(|r| r.credits)
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_STARTING_CREDITS);

        let keep = self.keep_count(offer.available_cards.len(), credits);
        let cards = offer
            .available_cards
            .choose_multiple(&mut self.rng, keep)
            .cloned()
            .collect();
        Some(GameAction::SelectStartingCards(SelectStartingCards::new(
            cards,
            corporation,
        )))
    }

    fn choose_production(&mut self, player: &Player) -> Option<GameAction> {
        let production = player
            .selection()
            .production
            .as_ref()
            .filter(|p| !p.selection_complete)?;
        let keep = self.keep_count(production.available_cards.len(), player.resources().credits);
        let cards = production
            .available_cards
            .choose_multiple(&mut self.rng, keep)
            .cloned()
            .collect();
        Some(GameAction::ConfirmProductionCards(ConfirmProductionCards::new(cards)))
    }

    fn keep_count(&mut self, offered: usize, credits: i32) -> usize {
        let affordable = (credits.max(0) / CARD_BUY_COST) as usize;
        let max = offered.min(affordable).min(4);
        self.rng.gen_range(0..=max)
    }

    fn choose_action(
        &mut self,
        state: &GameState,
        player: &Player,
        registry: &dyn CardRegistry,
    ) -> Option<GameAction> {
        let selection = player.selection();
        // Tile placements are owed even outside the player's own turn
        if let Some(tile) = &selection.tile {
            let hex = tile.available_hexes.choose(&mut self.rng)?;
            return Some(GameAction::SelectTile(SelectTile::at(*hex)));
        }
        if state.current_turn().map(|t| &t.player) != Some(&player.id) {
            return None;
        }
        if let Some(draw) = &selection.card_draw {
            let take = draw
                .available_cards
                .iter()
                .take(draw.free_take_count)
                .cloned()
                .collect();
            return Some(GameAction::ConfirmCardDraw(ConfirmCardDraw::new(take, Vec::new())));
        }
        if let Some(sale) = &selection.card {
            let count = self.rng.gen_range(sale.min_cards..=sale.max_cards);
            let cards = sale
                .available_cards
                .choose_multiple(&mut self.rng, count)
                .cloned()
                .collect();
            return Some(GameAction::ConfirmSellPatents(ConfirmSellPatents::new(cards)));
        }

        let candidates = legal_actions(state, player, registry);
        Some(
            candidates
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or(GameAction::SkipAction),
        )
    }
}

/// Turn actions `player` can afford right now, sell patents aside
pub fn legal_actions(
    state: &GameState,
    player: &Player,
    registry: &dyn CardRegistry,
) -> Vec<GameAction> {
    let mut actions = Vec::new();
    let credits = player.resources().credits;

    for id in player.hand() {
        let Ok(card) = registry.get_by_id(id) else {
            continue;
        };
        let cost = effective_cost(&card, player);
        if cost > credits || !can_play_card(&card, state, player, registry).playable {
            continue;
        }
        let mut play = PlayCard::new(card.id.clone(), CardPayment::credits(cost));
        if card
            .behaviors
            .iter()
            .any(|b| b.is_immediate() && !b.choices.is_empty())
        {
            play = play.with_choice(0);
        }
        actions.push(GameAction::PlayCard(play));
    }

    for action in player.actions().iter().filter(|a| a.play_count == 0) {
        let playability = can_use_card_action(action, player);
        let mut use_action = UseCardAction::new(action.card_id.clone(), action.behavior_index);
        if action.behavior.choices.is_empty() {
            if !playability.affordable {
                continue;
            }
        } else {
            let Some(choice) = playability.playable_choices.first() else {
                continue;
            };
            use_action = use_action.with_choice(*choice);
        }
        actions.push(GameAction::UseCardAction(use_action));
    }

    for project in StandardProject::ALL {
        if project == StandardProject::SellPatents {
            continue;
        }
        if can_afford_standard_project(project, state, player).available {
            actions.push(GameAction::StandardProject { project });
        }
    }

    let resources = player.resources();
    if resources.heat >= HEAT_PER_TEMPERATURE
        && state.global_parameters.temperature_steps_remaining() > 0
    {
        actions.push(GameAction::ConvertHeatToTemperature);
    }
    if resources.plants >= PLANTS_PER_GREENERY {
        actions.push(GameAction::ConvertPlantsToGreenery);
    }
    actions
}

/// Play `game_id` with `players` until it completes or passes
/// `max_generations`
///
/// A rejected turn action is logged and replaced by a skip, so the game
/// always moves forward. Returns the number of actions executed.
pub fn run_game(
    repo: &GameRepository,
    game_id: &GameId,
    players: &mut [AutoPlayer],
    max_generations: u32,
) -> Result<usize> {
    let game = repo.get(game_id)?;
    let registry = game.registry().clone();

    for step in 0..MAX_STEPS {
        let state = game.snapshot();
        if state.status() == GameStatus::Completed || state.generation() > max_generations {
            return Ok(step);
        }

        let next = players.iter_mut().find_map(|p| {
            p.choose(&state, registry.as_ref())
                .map(|action| (p.player_id().clone(), action))
        });
        let Some((player, action)) = next else {
            return Err(EngineError::invalid_state(
                "a player with a decision to make",
                format!("nobody can act in {} phase", state.phase()),
            ));
        };

        log_if_verbose!(game.logger(), "{player} chooses {action:?}");
        if let Err(e) = action.execute(repo, game_id, &player) {
            let in_turn = state.current_turn().map(|t| &t.player) == Some(&player);
            if !in_turn || action == GameAction::SkipAction {
                return Err(e);
            }
            game.logger().warn(&format!("{player}: {e}; skipping instead"));
            SkipAction.execute(repo, game_id, &player)?;
        }
    }

    Err(EngineError::invalid_state(
        format!("game finished within {MAX_STEPS} actions"),
        "still running",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{CreateGame, JoinGame, StartGame};
    use crate::core::{Card, CardType};
    use crate::game::GameSettings;
    use crate::loader::InMemoryCardRegistry;
    use std::sync::Arc;

    fn repo() -> GameRepository {
        let mut cards: Vec<Card> = (0..60)
            .map(|i| Card::new(format!("P{i:02}"), format!("Project {i}"), CardType::Automated, 4))
            .collect();
        cards.extend(
            (0..6).map(|i| Card::new(format!("C{i}"), format!("Corp {i}"), CardType::Corporation, 0)),
        );
        GameRepository::new(Arc::new(InMemoryCardRegistry::new(cards).unwrap()))
    }

    #[test]
    fn test_auto_players_reach_later_generations() {
        let repo = repo();
        let game = CreateGame::new(GameSettings::default().with_seed(11)).execute(&repo);
        let ids: Vec<PlayerId> = ["Ann", "Bob"]
            .iter()
            .map(|n| JoinGame::new(*n).execute(&repo, game.id()).unwrap())
            .collect();
        StartGame.execute(&repo, game.id(), &ids[0]).unwrap();

        let mut players: Vec<AutoPlayer> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| AutoPlayer::with_seed(id.clone(), 100 + i as u64))
            .collect();
        let steps = run_game(&repo, game.id(), &mut players, 3).unwrap();

        assert!(steps > 0);
        game.read(|s| {
            assert!(s.generation() > 3 || s.status() == GameStatus::Completed);
            assert!(s.players.iter().all(|p| p.selection().starting.is_none()));
        });
    }

    #[test]
    fn test_nobody_acts_outside_active_games() {
        let repo = repo();
        let game = CreateGame::default().execute(&repo);
        let id = JoinGame::new("Ann").execute(&repo, game.id()).unwrap();
        let mut player = AutoPlayer::with_seed(id, 1);
        let choice = game.read(|s| player.choose(s, repo.registry().as_ref()));
        assert_eq!(choice, None);
    }
}
