//! Main game state structure
//!
//! `GameState` is plain data. It is only ever touched through
//! [`Game::update`](crate::game::Game::update), which holds the game's write
//! lock and publishes the collected events once the lock is dropped.

use crate::core::{GameId, Player, PlayerId};
use crate::events::{
    CurrentTurnChanged, EventSink, GamePhaseChanged, GameStatusChanged, GenerationAdvanced,
};
use crate::game::{
    ActionCount, ActionLog, Board, CurrentTurn, Deck, FinalScores, GamePhase, GameSettings,
    GameStatus, GlobalParameters, TriggeredEffect,
};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    status: GameStatus,
    phase: GamePhase,
    /// Starts at 1, advanced by each production phase
    generation: u32,
    pub settings: GameSettings,
    /// First player to join
    pub host: Option<PlayerId>,
    pub global_parameters: GlobalParameters,
    pub board: Board,
    pub deck: Deck,
    /// In turn order
    pub players: Vec<Player>,
    current_turn: Option<CurrentTurn>,
    pub triggered_effects: Vec<TriggeredEffect>,
    pub history: ActionLog,
    /// Set once the game completes
    #[serde(default)]
    pub final_scores: Option<FinalScores>,
}

impl GameState {
    pub fn new(id: GameId, settings: GameSettings, deck: Deck) -> Self {
        let global_parameters = GlobalParameters::new(
            settings.temperature.unwrap_or(crate::game::MIN_TEMPERATURE),
            settings.oxygen.unwrap_or(crate::game::MIN_OXYGEN),
            settings.oceans.unwrap_or(crate::game::MIN_OCEANS),
        );
        GameState {
            id,
            status: GameStatus::Lobby,
            phase: GamePhase::WaitingForGameStart,
            generation: 1,
            settings,
            host: None,
            global_parameters,
            board: Board::generate(),
            deck,
            players: Vec::new(),
            current_turn: None,
            triggered_effects: Vec::new(),
            history: ActionLog::new(),
            final_scores: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn current_turn(&self) -> Option<&CurrentTurn> {
        self.current_turn.as_ref()
    }

    pub fn is_solo(&self) -> bool {
        self.players.len() == 1
    }

    // ---------------------------------------------------------------
    // Players
    // ---------------------------------------------------------------

    pub fn get_player(&self, id: &PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| EngineError::not_found("player", id))
    }

    pub fn get_player_mut(&mut self, id: &PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| EngineError::not_found("player", id))
    }

    pub fn get_player_idx(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn add_player(&mut self, player: Player) {
        if self.host.is_none() {
            self.host = Some(player.id.clone());
        }
        self.players.push(player);
    }

    // ---------------------------------------------------------------
    // Phase, status, turn
    // ---------------------------------------------------------------

    pub fn set_phase(&mut self, phase: GamePhase, events: &mut EventSink) {
        let old = self.phase;
        self.phase = phase;
        if old != phase {
            events.push(GamePhaseChanged {
                game_id: self.id.clone(),
                old,
                new: phase,
            });
        }
    }

    pub fn set_status(&mut self, status: GameStatus, events: &mut EventSink) {
        let old = self.status;
        self.status = status;
        if old != status {
            events.push(GameStatusChanged {
                game_id: self.id.clone(),
                old,
                new: status,
            });
        }
    }

    pub fn set_current_turn(&mut self, turn: Option<CurrentTurn>, events: &mut EventSink) {
        if self.current_turn == turn {
            return;
        }
        if let Some(turn) = &turn {
            events.push(CurrentTurnChanged {
                game_id: self.id.clone(),
                player_id: turn.player.clone(),
                actions: turn.actions.remaining(),
            });
        }
        self.current_turn = turn;
    }

    /// Give `player` the turn with a fresh action allowance
    pub fn start_turn(&mut self, player: PlayerId, actions: ActionCount, events: &mut EventSink) {
        self.set_current_turn(Some(CurrentTurn::new(player, actions)), events);
    }

    pub(crate) fn current_turn_mut(&mut self) -> Option<&mut CurrentTurn> {
        self.current_turn.as_mut()
    }

    pub fn advance_generation(&mut self, events: &mut EventSink) {
        let old = self.generation;
        self.generation += 1;
        events.push(GenerationAdvanced {
            game_id: self.id.clone(),
            old,
            new: self.generation,
        });
    }

    // ---------------------------------------------------------------
    // Preconditions shared by actions
    // ---------------------------------------------------------------

    pub fn require_status(&self, status: GameStatus) -> Result<()> {
        if self.status != status {
            return Err(EngineError::invalid_state(
                format!("game {status}"),
                format!("game {}", self.status),
            ));
        }
        Ok(())
    }

    pub fn require_phase(&self, phase: GamePhase) -> Result<()> {
        if self.phase != phase {
            return Err(EngineError::invalid_state(
                format!("phase {phase}"),
                format!("phase {}", self.phase),
            ));
        }
        Ok(())
    }
}
