//! Game setup: creating and joining games, dealing and keeping starting cards

use crate::actions::cards::{check_behaviors, install_behaviors};
use crate::actions::Action;
use crate::core::{CardId, GameId, Player, PlayerId, ResourceType, StartingSelection};
use crate::game::turn::validate_subset;
use crate::game::{
    begin_action_phase, process_tile_queue, BehaviorApplier, Game, GamePhase, GameRepository,
    GameSettings, GameStatus, Mutation, SourceType, CARD_BUY_COST,
};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Project cards dealt to each player at the start
pub const STARTING_HAND: usize = 10;
/// Corporations offered to each player at the start
pub const STARTING_CORPORATIONS: usize = 2;
/// Credits for a player whose corporation grants none
pub const DEFAULT_STARTING_CREDITS: i32 = 42;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGame {
    #[serde(default)]
    pub settings: GameSettings,
}

impl CreateGame {
    pub fn new(settings: GameSettings) -> Self {
        CreateGame { settings }
    }

    pub fn execute(&self, repo: &GameRepository) -> Arc<Game> {
        repo.create(self.settings.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGame {
    pub name: String,
}

impl JoinGame {
    pub fn new(name: impl Into<String>) -> Self {
        JoinGame { name: name.into() }
    }

    /// Add a player to a game still in the lobby; the first to join hosts
    pub fn execute(&self, repo: &GameRepository, game_id: &GameId) -> Result<PlayerId> {
        let game = repo.get(game_id)?;
        game.update(|m| {
            m.state.require_status(GameStatus::Lobby)?;
            let max = m.state.settings.max_players;
            if m.state.players.len() >= max {
                return Err(EngineError::InvalidAction(format!(
                    "game {game_id} is full ({max} players)"
                )));
            }
            let name = self.name.trim();
            if name.is_empty() {
                return Err(EngineError::InvalidAction("player name is empty".to_string()));
            }

            let id = PlayerId::new(format!("player-{}", m.state.players.len() + 1));
            m.state.add_player(Player::new(id.clone(), name));
            m.logger.normal(&format!("{name} joined as {id}"));
            m.mark_changed();
            Ok(id)
        })
    }
}

/// Host deals starting cards and moves the game out of the lobby
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartGame;

impl Action for StartGame {
    fn name(&self) -> &'static str {
        "start-game"
    }

    fn apply(&self, m: &mut Mutation<'_>, player: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Lobby)?;
        if m.state.host.as_ref() != Some(player) {
            return Err(EngineError::InvalidAction(format!(
                "only the host can start the game, not {player}"
            )));
        }
        let needed = STARTING_HAND * m.state.players.len();
        let available = m.state.deck.available();
        if needed > available {
            return Err(EngineError::DeckExhausted {
                requested: needed,
                available,
            });
        }

        // Validation done; write
        m.state.set_status(GameStatus::Active, &mut m.events);
        m.state
            .set_phase(GamePhase::StartingCardSelection, &mut m.events);

        let state = &mut *m.state;
        for player in state.players.iter_mut() {
            let cards = state.deck.draw(STARTING_HAND)?;
            let corporations = state.deck.draw_corporations(STARTING_CORPORATIONS);
            player.selection_mut().starting = Some(StartingSelection {
                available_cards: cards,
                available_corporations: corporations,
                complete: false,
            });
        }
        m.logger.minimal(&format!(
            "game started with {} players",
            m.state.players.len()
        ));
        Ok(())
    }
}

/// Keep some of the dealt project cards (3 credits each) and pick a
/// corporation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectStartingCards {
    #[serde(default)]
    pub card_ids: Vec<CardId>,
    /// Required whenever corporations were offered
    #[serde(default)]
    pub corporation_id: Option<CardId>,
}

impl SelectStartingCards {
    pub fn new(card_ids: Vec<CardId>, corporation_id: Option<CardId>) -> Self {
        SelectStartingCards {
            card_ids,
            corporation_id,
        }
    }
}

impl Action for SelectStartingCards {
    fn name(&self) -> &'static str {
        "select-starting-cards"
    }

    fn apply(&self, m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<()> {
        m.state.require_status(GameStatus::Active)?;
        m.state.require_phase(GamePhase::StartingCardSelection)?;

        let player = m.player(player_id)?;
        let selection = player
            .selection()
            .starting
            .clone()
            .ok_or_else(|| EngineError::invalid_state("starting card selection", "none"))?;
        if selection.complete {
            return Err(EngineError::invalid_state(
                "selection pending",
                "selection already complete",
            ));
        }
        validate_subset(&self.card_ids, &selection.available_cards)?;

        let corporation = match &self.corporation_id {
            Some(id) if selection.available_corporations.contains(id) => Some(m.card(id)?),
            Some(id) => {
                return Err(EngineError::InvalidSelection(format!(
                    "corporation {id} was not offered"
                )))
            }
            None if selection.available_corporations.is_empty() => None,
            None => {
                return Err(EngineError::InvalidAction(
                    "a corporation must be chosen".to_string(),
                ))
            }
        };

        let starting = corporation
            .as_ref()
            .and_then(|c| c.starting_resources)
            .unwrap_or_default();
        let starting_credits = if starting.credits > 0 {
            starting.credits
        } else {
            DEFAULT_STARTING_CREDITS
        };
        let cost = CARD_BUY_COST * self.card_ids.len() as i32;
        let credits = player.resources().credits + starting_credits;
        if credits < cost {
            return Err(EngineError::insufficient(ResourceType::Credits, cost, credits));
        }

        let applier = corporation.as_ref().map(|corp| {
            BehaviorApplier::new(player_id.clone(), corp.id.as_str())
                .with_source_card(corp.id.clone(), corp.name.clone())
        });
        if let (Some(corp), Some(applier)) = (&corporation, &applier) {
            check_behaviors(m, applier, corp, None)?;
        }

        // Validation done; write
        let player = m.state.get_player_mut(player_id)?;
        player.corporation = corporation.as_ref().map(|c| c.id.clone());
        player.add_resources(
            [
                (ResourceType::Credits, starting_credits - cost),
                (ResourceType::Steel, starting.steel),
                (ResourceType::Titanium, starting.titanium),
                (ResourceType::Plants, starting.plants),
                (ResourceType::Energy, starting.energy),
                (ResourceType::Heat, starting.heat),
            ],
            &mut m.events,
        );
        if let Some(production) = corporation.as_ref().and_then(|c| c.starting_production) {
            player.set_production(production, &mut m.events);
        }
        for card in &self.card_ids {
            player.add_to_hand(card.clone(), &mut m.events);
        }
        if let Some(starting) = player.selection_mut().starting.as_mut() {
            starting.complete = true;
        }
        let rejected: Vec<CardId> = selection
            .available_cards
            .iter()
            .filter(|c| !self.card_ids.contains(c))
            .cloned()
            .collect();
        m.state.deck.discard(rejected);

        if let (Some(corp), Some(applier)) = (&corporation, &applier) {
            install_behaviors(m, applier, corp, None)?;
            process_tile_queue(m, player_id)?;
        }
        m.record(
            player_id,
            "starting-selection",
            SourceType::Card,
            format!(
                "kept {} cards with {}",
                self.card_ids.len(),
                corporation.as_ref().map_or("no corporation", |c| c.name.as_str())
            ),
        );

        let all_done = m.state.players.iter().all(|p| {
            p.selection()
                .starting
                .as_ref()
                .map_or(true, |s| s.complete)
        });
        if all_done {
            for player in m.state.players.iter_mut() {
                player.selection_mut().starting = None;
            }
            begin_action_phase(m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardType, Resources};
    use crate::loader::InMemoryCardRegistry;

    fn registry() -> Arc<InMemoryCardRegistry> {
        let mut cards: Vec<Card> = (0..30)
            .map(|i| Card::new(format!("P{i:02}"), format!("Project {i}"), CardType::Automated, 8))
            .collect();
        for i in 0..4 {
            let mut corp = Card::new(format!("CORP{i}"), format!("Corp {i}"), CardType::Corporation, 0);
            corp.starting_resources = Some(Resources {
                credits: 50,
                steel: i,
                ..Default::default()
            });
            cards.push(corp);
        }
        Arc::new(InMemoryCardRegistry::new(cards).unwrap())
    }

    fn repo() -> GameRepository {
        GameRepository::new(registry())
    }

    #[test]
    fn test_join_until_full() {
        let repo = repo();
        let game = CreateGame::new(GameSettings {
            max_players: 2,
            ..Default::default()
        })
        .execute(&repo);

        let host = JoinGame::new("Ann").execute(&repo, game.id()).unwrap();
        JoinGame::new("Bob").execute(&repo, game.id()).unwrap();
        let err = JoinGame::new("Cy").execute(&repo, game.id()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));
        assert_eq!(game.read(|s| s.host.clone()), Some(host));
    }

    #[test]
    fn test_only_host_starts() {
        let repo = repo();
        let game = CreateGame::default().execute(&repo);
        let _host = JoinGame::new("Ann").execute(&repo, game.id()).unwrap();
        let guest = JoinGame::new("Bob").execute(&repo, game.id()).unwrap();
        let err = StartGame.execute(&repo, game.id(), &guest).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));
        assert_eq!(game.read(|s| s.status()), GameStatus::Lobby);
    }

    #[test]
    fn test_start_and_select() {
        let repo = repo();
        let game = CreateGame::new(GameSettings::default().with_seed(3)).execute(&repo);
        let host = JoinGame::new("Ann").execute(&repo, game.id()).unwrap();
        let guest = JoinGame::new("Bob").execute(&repo, game.id()).unwrap();
        StartGame.execute(&repo, game.id(), &host).unwrap();

        let offered = |id: &PlayerId| {
            game.read(|s| s.get_player(id).unwrap().selection().starting.clone().unwrap())
        };
        let ann = offered(&host);
        assert_eq!(ann.available_cards.len(), STARTING_HAND);
        assert_eq!(ann.available_corporations.len(), STARTING_CORPORATIONS);

        let corp = ann.available_corporations[0].clone();
        SelectStartingCards::new(ann.available_cards[..4].to_vec(), Some(corp.clone()))
            .execute(&repo, game.id(), &host)
            .unwrap();
        game.read(|s| {
            let p = s.get_player(&host).unwrap();
            assert_eq!(p.resources().credits, 50 - 12);
            assert_eq!(p.hand().len(), 4);
            assert_eq!(p.corporation, Some(corp.clone()));
            assert_eq!(s.phase(), GamePhase::StartingCardSelection);
        });

        let again = SelectStartingCards::new(vec![], Some(corp))
            .execute(&repo, game.id(), &host)
            .unwrap_err();
        assert!(matches!(again, EngineError::InvalidState { .. }));

        let bob = offered(&guest);
        let err = SelectStartingCards::new(vec![], None)
            .execute(&repo, game.id(), &guest)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));

        SelectStartingCards::new(vec![], Some(bob.available_corporations[1].clone()))
            .execute(&repo, game.id(), &guest)
            .unwrap();
        game.read(|s| {
            assert_eq!(s.phase(), GamePhase::Action);
            assert_eq!(s.current_turn().unwrap().player, host);
            assert!(s.players.iter().all(|p| p.selection().starting.is_none()));
        });
    }
}
