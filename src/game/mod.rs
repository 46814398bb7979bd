//! Per-game aggregate and the rules that mutate it

pub mod applier;
pub mod board;
pub mod deck;
pub mod global_params;
pub mod history;
pub mod logger;
pub mod passive;
pub mod phase;
pub mod playability;
pub mod repository;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod state;
pub mod tile_queue;
pub mod turn;

pub use applier::{count_per_condition, BehaviorApplier, CARD_BUY_COST};
pub use board::{Board, SpaceKind, Tile, TileBonus, TileOccupant};
pub use deck::Deck;
pub use global_params::{
    GlobalParameters, MAX_OCEANS, MAX_OXYGEN, MAX_TEMPERATURE, MIN_OCEANS, MIN_OXYGEN,
    MIN_TEMPERATURE, TEMPERATURE_STEP,
};
pub use history::{ActionLog, ActionRecord, SourceType, TriggeredEffect};
pub use logger::{EngineLogger, LogEntry, OutputMode, VerbosityLevel};
pub use passive::{EffectHandle, MatchedEffect, Occurrence, PassiveEffects, MAX_CHAIN_DEPTH};
pub use phase::{ActionCount, CurrentTurn, GamePhase, GameStatus};
pub use playability::{
    can_afford_standard_project, can_play_card, can_use_card_action, card_discount, count_tags,
    effective_cost, standard_project_cost, standard_projects, ActionPlayability,
    ChoicePlayability, PlayabilityResult, ProjectAvailability, ValidationError,
    ValidationErrorKind,
};
pub use repository::GameRepository;
pub use scoring::{
    condition_vp, final_scores, player_vp, CardScore, CityScore, FinalScore, FinalScores,
    VpBreakdown,
};
pub use session::{Game, Mutation};
pub use settings::GameSettings;
pub use state::GameState;
pub use tile_queue::{legal_hexes, process_tile_queue, resolve_tile_selection};
pub use turn::{
    advance_turn, begin_action_phase, complete_game, confirm_production_cards, consume_action,
    end_turn_if_done, finish_production, run_production, skip_action, validate_current_turn,
    PRODUCTION_DRAW,
};
