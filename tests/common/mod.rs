//! Shared setup for the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use tfm_engine::actions::{Action, CreateGame, JoinGame, SelectStartingCards, StartGame};
use tfm_engine::core::{Card, CardType, GameId, Player, PlayerId, ResourceType};
use tfm_engine::game::{Game, GameRepository, GameSettings, VerbosityLevel};
use tfm_engine::loader::InMemoryCardRegistry;
use tfm_engine::Result;

/// Plain automated projects `F00`, `F01`, ... with no behaviors
pub fn filler_cards(count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| Card::new(format!("F{i:02}"), format!("Filler {i}"), CardType::Automated, 5))
        .collect()
}

/// A game seated, started and past starting selection, first player to act
pub struct Table {
    pub repo: GameRepository,
    pub game: Arc<Game>,
    pub players: Vec<PlayerId>,
}

impl Table {
    /// `players` seated with `extra` cards added to a filler deck; nobody
    /// keeps a starting card and no corporations are offered
    pub fn new(players: usize, extra: Vec<Card>) -> Table {
        let mut cards = filler_cards(12 * players);
        cards.extend(extra);
        let registry = InMemoryCardRegistry::new(cards).expect("unique ids");
        let repo = GameRepository::new(Arc::new(registry)).with_log_capture();

        let settings = GameSettings {
            verbosity: VerbosityLevel::Silent,
            ..GameSettings::default().with_seed(17)
        };
        let game = CreateGame::new(settings).execute(&repo);
        let ids: Vec<PlayerId> = (0..players)
            .map(|i| {
                JoinGame::new(format!("Player {}", i + 1))
                    .execute(&repo, game.id())
                    .expect("join")
            })
            .collect();
        StartGame.execute(&repo, game.id(), &ids[0]).expect("start");
        for id in &ids {
            SelectStartingCards::new(Vec::new(), None)
                .execute(&repo, game.id(), id)
                .expect("starting selection");
        }

        Table {
            repo,
            game,
            players: ids,
        }
    }

    pub fn id(&self) -> &GameId {
        self.game.id()
    }

    pub fn pid(&self, seat: usize) -> &PlayerId {
        &self.players[seat]
    }

    pub fn act(&self, seat: usize, action: &impl Action) -> Result<()> {
        action.execute(&self.repo, self.game.id(), &self.players[seat])
    }

    pub fn player<R>(&self, seat: usize, f: impl FnOnce(&Player) -> R) -> R {
        self.game.read(|s| f(s.get_player(&self.players[seat]).expect("seated")))
    }

    /// Put registry cards straight into a hand
    pub fn give_cards(&self, seat: usize, cards: &[&str]) {
        self.game
            .update(|m| {
                let player = m.state.get_player_mut(&self.players[seat])?;
                for card in cards {
                    player.add_to_hand((*card).into(), &mut m.events);
                }
                Ok(())
            })
            .expect("hand update");
    }

    pub fn set(&self, seat: usize, resource: ResourceType, amount: i32) {
        let current = self.player(seat, |p| p.resources().get(resource).unwrap_or(0));
        self.game
            .add_resources(&self.players[seat], [(resource, amount - current)])
            .expect("ledger update");
    }
}
