//! Player-facing operations
//!
//! Every action runs inside one [`Game::update`]: it checks the live state
//! first and writes only once all checks pass, so a failed action leaves the
//! game as it found it. Events are published after the lock is released.

pub mod autoplay;
pub mod cards;
pub mod lobby;
pub mod projects;
pub mod selection;

pub use autoplay::{legal_actions, run_game, AutoPlayer};
pub use cards::{PlayCard, UseCardAction};
pub use lobby::{
    CreateGame, JoinGame, SelectStartingCards, StartGame, DEFAULT_STARTING_CREDITS,
    STARTING_CORPORATIONS, STARTING_HAND,
};
pub use projects::{
    BuildAquifer, BuildCity, BuildPowerPlant, ConvertHeatToTemperature, ConvertPlantsToGreenery,
    LaunchAsteroid, PlantGreenery, SellPatents, HEAT_PER_TEMPERATURE, PLANTS_PER_GREENERY,
};
pub use selection::{
    ConfirmCardDraw, ConfirmProductionCards, ConfirmSellPatents, SelectTile, SkipAction,
    PATENT_REWARD,
};

use crate::core::{GameId, PlayerId, StandardProject};
use crate::game::logger::log_if_verbose;
use crate::game::{
    validate_current_turn, GameRepository, Mutation, ValidationError, ValidationErrorKind,
};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// An operation a player performs on a game they have joined
pub trait Action {
    fn name(&self) -> &'static str;

    /// Validate, then mutate
    fn apply(&self, m: &mut Mutation<'_>, player: &PlayerId) -> Result<()>;

    fn execute(&self, repo: &GameRepository, game_id: &GameId, player: &PlayerId) -> Result<()> {
        let game = repo.get(game_id)?;
        log_if_verbose!(game.logger(), "{}: {}", player, self.name());
        game.update(|m| {
            m.player(player)?;
            self.apply(m, player)?;
            m.mark_changed();
            Ok(())
        })
    }
}

/// Wire form of every in-game action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameAction {
    StartGame,
    SelectStartingCards(SelectStartingCards),
    PlayCard(PlayCard),
    UseCardAction(UseCardAction),
    SelectTile(SelectTile),
    SkipAction,
    ConfirmProductionCards(ConfirmProductionCards),
    ConfirmCardDraw(ConfirmCardDraw),
    StandardProject { project: StandardProject },
    ConfirmSellPatents(ConfirmSellPatents),
    ConvertHeatToTemperature,
    ConvertPlantsToGreenery,
}

impl GameAction {
    pub fn execute(&self, repo: &GameRepository, game_id: &GameId, player: &PlayerId) -> Result<()> {
        match self {
            GameAction::StartGame => StartGame.execute(repo, game_id, player),
            GameAction::SelectStartingCards(a) => a.execute(repo, game_id, player),
            GameAction::PlayCard(a) => a.execute(repo, game_id, player),
            GameAction::UseCardAction(a) => a.execute(repo, game_id, player),
            GameAction::SelectTile(a) => a.execute(repo, game_id, player),
            GameAction::SkipAction => SkipAction.execute(repo, game_id, player),
            GameAction::ConfirmProductionCards(a) => a.execute(repo, game_id, player),
            GameAction::ConfirmCardDraw(a) => a.execute(repo, game_id, player),
            GameAction::StandardProject { project } => match project {
                StandardProject::SellPatents => SellPatents.execute(repo, game_id, player),
                StandardProject::PowerPlant => BuildPowerPlant.execute(repo, game_id, player),
                StandardProject::Asteroid => LaunchAsteroid.execute(repo, game_id, player),
                StandardProject::Aquifer => BuildAquifer.execute(repo, game_id, player),
                StandardProject::Greenery => PlantGreenery.execute(repo, game_id, player),
                StandardProject::City => BuildCity.execute(repo, game_id, player),
            },
            GameAction::ConfirmSellPatents(a) => a.execute(repo, game_id, player),
            GameAction::ConvertHeatToTemperature => {
                ConvertHeatToTemperature.execute(repo, game_id, player)
            }
            GameAction::ConvertPlantsToGreenery => {
                ConvertPlantsToGreenery.execute(repo, game_id, player)
            }
        }
    }
}

/// The acting player holds the turn and owes no earlier decision
pub(crate) fn require_turn(m: &Mutation<'_>, player: &PlayerId) -> Result<()> {
    validate_current_turn(m.state, player)?;
    require_no_pending(m, player)
}

pub(crate) fn require_no_pending(m: &Mutation<'_>, player: &PlayerId) -> Result<()> {
    let selection = m.player(player)?.selection();
    let pending = if selection.tile.is_some() {
        Some("tile selection")
    } else if selection.card_draw.is_some() {
        Some("card draw selection")
    } else if selection.card.is_some() {
        Some("card selection")
    } else {
        None
    };
    match pending {
        Some(what) => Err(EngineError::invalid_state(
            "no pending selection",
            format!("{what} pending"),
        )),
        None => Ok(()),
    }
}

/// Turn the first validation failure into the matching engine error
pub(crate) fn rejection(subject: &str, errors: &[ValidationError]) -> EngineError {
    let Some(first) = errors.first() else {
        return EngineError::InvalidAction(format!("{subject} is not playable"));
    };
    match (first.kind, first.required, first.current) {
        (ValidationErrorKind::Cost | ValidationErrorKind::Resource, Some(required), Some(current)) => {
            let resource = first
                .message
                .strip_prefix("insufficient ")
                .unwrap_or(&first.message);
            EngineError::insufficient(resource, required, current)
        }
        (ValidationErrorKind::Phase | ValidationErrorKind::Turn | ValidationErrorKind::GameState, ..) => {
            EngineError::InvalidState {
                expected: format!("{subject} playable"),
                actual: first.message.clone(),
            }
        }
        _ => EngineError::InvalidAction(format!("{subject}: {}", first.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, CardPayment};

    #[test]
    fn test_wire_format() {
        let action: GameAction = serde_json::from_str(
            r#"{"type":"play-card","cardId":"C1","payment":{"credits":10},"choice":1}"#,
        )
        .unwrap();
        match action {
            GameAction::PlayCard(play) => {
                assert_eq!(play.card_id, CardId::new("C1"));
                assert_eq!(play.payment, CardPayment::credits(10));
                assert_eq!(play.choice, Some(1));
                assert_eq!(play.target_player, None);
            }
            other => panic!("unexpected {other:?}"),
        }

        let skip: GameAction = serde_json::from_str(r#"{"type":"skip-action"}"#).unwrap();
        assert_eq!(skip, GameAction::SkipAction);

        let project: GameAction =
            serde_json::from_str(r#"{"type":"standard-project","project":"aquifer"}"#).unwrap();
        assert_eq!(
            project,
            GameAction::StandardProject {
                project: StandardProject::Aquifer
            }
        );
    }

    #[test]
    fn test_rejection_maps_cost_to_insufficient() {
        let errors = vec![
            ValidationError::new(ValidationErrorKind::Cost, "insufficient credits")
                .with_values(12, 4),
        ];
        let err = rejection("Comet", &errors);
        assert_eq!(err.to_string(), "insufficient credits: need 12, have 4");
    }
}
