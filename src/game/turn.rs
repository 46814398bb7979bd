//! Turn rotation and the production phase
//!
//! Players act in join order. Each turn allows two actions; once only one
//! player has not passed, that player acts without limit. When every
//! player has passed, production runs and the generation advances.

use crate::core::{CardId, PlayerId, ProductionPhase, ResourceType, Resources};
use crate::events::GameEnded;
use crate::game::logger::log_if_verbose;
use crate::game::{
    final_scores, ActionCount, GamePhase, GameState, GameStatus, Mutation, SourceType,
    CARD_BUY_COST,
};
use crate::{EngineError, Result};

/// Cards dealt to each player at the start of the production phase
pub const PRODUCTION_DRAW: usize = 4;

/// Whether `player` may take an action right now
pub fn validate_current_turn(state: &GameState, player: &PlayerId) -> Result<()> {
    state.require_status(GameStatus::Active)?;
    state.require_phase(GamePhase::Action)?;
    let turn = state
        .current_turn()
        .ok_or_else(|| EngineError::invalid_state(format!("turn of {player}"), "no current turn"))?;
    if &turn.player != player {
        return Err(EngineError::invalid_state(
            format!("turn of {player}"),
            format!("turn of {}", turn.player),
        ));
    }
    if !turn.actions.has_remaining() {
        return Err(EngineError::invalid_state("remaining actions", "no actions left"));
    }
    Ok(())
}

/// Allowance for whoever gets the turn next
fn allowance(state: &GameState) -> ActionCount {
    let active = state.players.iter().filter(|p| !p.has_passed()).count();
    if state.is_solo() || active <= 1 {
        ActionCount::Unlimited
    } else {
        ActionCount::full()
    }
}

/// First non-passed player after `current` in turn order, wrapping around
fn next_active(state: &GameState, current: &PlayerId) -> Option<PlayerId> {
    let count = state.players.len();
    let start = state.get_player_idx(current).unwrap_or(0);
    (1..=count)
        .map(|offset| &state.players[(start + offset) % count])
        .find(|p| !p.has_passed())
        .map(|p| p.id.clone())
}

/// Use one of `player`'s actions; the turn moves on when none remain and no
/// tile placement is outstanding
pub fn consume_action(m: &mut Mutation<'_>, player: &PlayerId) -> Result<()> {
    match m.state.current_turn_mut() {
        Some(turn) if &turn.player == player => turn.actions.consume(),
        _ => return Ok(()),
    }
    end_turn_if_done(m, player)
}

/// Move the turn on once `player` has no actions left and no tile to place
pub fn end_turn_if_done(m: &mut Mutation<'_>, player: &PlayerId) -> Result<()> {
    let exhausted = matches!(
        m.state.current_turn(),
        Some(turn) if &turn.player == player && !turn.actions.has_remaining()
    );
    if exhausted && m.player(player)?.selection().tile.is_none() {
        advance_turn(m)?;
    }
    Ok(())
}

/// Hand the turn to the next player who has not passed, or run production
/// when everyone has
pub fn advance_turn(m: &mut Mutation<'_>) -> Result<()> {
    let current = m.state.current_turn().map(|t| t.player.clone());
    let next = match &current {
        Some(current) => next_active(m.state, current),
        None => m.state.players.iter().find(|p| !p.has_passed()).map(|p| p.id.clone()),
    };

    match next {
        Some(next) => {
            let actions = allowance(m.state);
            log_if_verbose!(m.logger, "turn passes to {} ({})", next, actions);
            m.state.start_turn(next, actions, &mut m.events);
            Ok(())
        }
        None => run_production(m),
    }
}

/// End `player`'s turn. Passing (out for the generation) happens when they
/// have not acted yet, have unlimited actions, or are alone; otherwise the
/// turn is merely skipped.
pub fn skip_action(m: &mut Mutation<'_>, player: &PlayerId) -> Result<()> {
    m.state.require_phase(GamePhase::Action)?;
    let turn = m
        .state
        .current_turn()
        .ok_or_else(|| EngineError::invalid_state(format!("turn of {player}"), "no current turn"))?;
    if &turn.player != player {
        return Err(EngineError::invalid_state(
            format!("turn of {player}"),
            format!("turn of {}", turn.player),
        ));
    }

    let passes = m.state.is_solo()
        || matches!(turn.actions, ActionCount::Unlimited)
        || turn.actions == ActionCount::full();

    if passes {
        m.player_mut(player)?.set_passed(true);
        m.record(player, "turn", SourceType::Turn, "passed");
        m.logger.minimal(&format!("{player} passes"));
    } else {
        m.record(player, "turn", SourceType::Turn, "skipped");
    }
    advance_turn(m)
}

/// Everyone has passed: pay income, deal cards, advance the generation
///
/// If the three global parameters are all at maximum the game completes
/// instead.
pub fn run_production(m: &mut Mutation<'_>) -> Result<()> {
    if m.state.global_parameters.is_maxed() {
        complete_game(m);
        return Ok(());
    }

    m.state.set_current_turn(None, &mut m.events);
    let state = &mut *m.state;
    for player in state.players.iter_mut() {
        let before = player.resources();
        let production = player.production();
        let income = production.credits + player.terraform_rating();

        let mut after = Resources {
            energy: 0,
            heat: before.heat + before.energy,
            ..before
        };
        for resource in ResourceType::BASIC {
            let gained = if resource == ResourceType::Credits {
                income
            } else {
                production.get(resource).unwrap_or(0)
            };
            if let Some(slot) = after.slot_mut(resource) {
                *slot += gained;
            }
        }
        player.set_resources(after, &mut m.events);

        let dealt = state.deck.draw_up_to(PRODUCTION_DRAW);
        if dealt.len() < PRODUCTION_DRAW {
            m.logger.warn(&format!(
                "deck ran short: {} gets {} of {PRODUCTION_DRAW} cards",
                player.id,
                dealt.len()
            ));
        }
        player.selection_mut().production = Some(ProductionPhase {
            available_cards: dealt,
            selection_complete: false,
            before_resources: before,
            after_resources: after,
            energy_converted: before.energy,
            credits_income: income,
        });
        player.set_passed(false);
        log_if_verbose!(m.logger, "{}: income {} credits", player.id, income);
    }

    m.state.advance_generation(&mut m.events);
    m.state.set_phase(GamePhase::ProductionAndCardDraw, &mut m.events);
    m.logger
        .minimal(&format!("production done, generation {}", m.state.generation()));
    Ok(())
}

/// Score the game, then mark it completed
pub fn complete_game(m: &mut Mutation<'_>) {
    let scores = final_scores(m.state, m.registry);
    m.state.set_current_turn(None, &mut m.events);
    m.state.set_status(GameStatus::Completed, &mut m.events);
    m.state.set_phase(GamePhase::Complete, &mut m.events);
    m.logger
        .minimal(&format!("game over after generation {}", m.state.generation()));
    for score in &scores.standings {
        m.logger.minimal(&format!(
            "#{} {} with {} VP ({} credits)",
            score.placement, score.player_name, score.breakdown.total, score.credits
        ));
    }
    m.events.push(GameEnded {
        game_id: m.state.id.clone(),
        winner: scores.winner.clone(),
        is_tie: scores.is_tie,
    });
    m.state.final_scores = Some(scores);
}

/// Keep `selected` of the cards dealt during production at 3 credits each
pub fn confirm_production_cards(
    m: &mut Mutation<'_>,
    player_id: &PlayerId,
    selected: &[CardId],
) -> Result<()> {
    m.state.require_phase(GamePhase::ProductionAndCardDraw)?;
    let player = m.player(player_id)?;
    let production = player
        .selection()
        .production
        .as_ref()
        .ok_or_else(|| EngineError::invalid_state("production card selection", "none"))?;
    if production.selection_complete {
        return Err(EngineError::invalid_state(
            "selection pending",
            "selection already complete",
        ));
    }
    validate_subset(selected, &production.available_cards)?;

    let cost = CARD_BUY_COST * selected.len() as i32;
    let credits = player.resources().credits;
    if credits < cost {
        return Err(EngineError::insufficient(ResourceType::Credits, cost, credits));
    }

    // Validation done; write
    let state = &mut *m.state;
    let player = state.get_player_mut(player_id)?;
    player.add_resources([(ResourceType::Credits, -cost)], &mut m.events);
    let mut rejected = Vec::new();
    if let Some(production) = player.selection_mut().production.as_mut() {
        production.selection_complete = true;
        rejected = production
            .available_cards
            .iter()
            .filter(|c| !selected.contains(c))
            .cloned()
            .collect();
    }
    for card in selected {
        player.add_to_hand(card.clone(), &mut m.events);
    }
    state.deck.discard(rejected);
    m.record(
        player_id,
        "production",
        SourceType::Turn,
        format!("kept {} production cards", selected.len()),
    );

    let all_done = m.state.players.iter().all(|p| {
        p.selection()
            .production
            .as_ref()
            .map_or(true, |s| s.selection_complete)
    });
    if all_done {
        finish_production(m)?;
    }
    Ok(())
}

/// `selected` must be distinct members of `offered`
pub(crate) fn validate_subset(selected: &[CardId], offered: &[CardId]) -> Result<()> {
    for (i, card) in selected.iter().enumerate() {
        if !offered.contains(card) {
            return Err(EngineError::InvalidSelection(format!("card {card} was not offered")));
        }
        if selected[..i].contains(card) {
            return Err(EngineError::InvalidSelection(format!("card {card} selected twice")));
        }
    }
    Ok(())
}

/// Every player finished production: clear production state and hand the
/// first player a fresh turn
pub fn finish_production(m: &mut Mutation<'_>) -> Result<()> {
    for player in m.state.players.iter_mut() {
        player.selection_mut().production = None;
        player.reset_play_counts();
    }
    begin_action_phase(m)
}

/// Enter the action phase with the first player to move
pub fn begin_action_phase(m: &mut Mutation<'_>) -> Result<()> {
    let first = m
        .state
        .players
        .first()
        .map(|p| p.id.clone())
        .ok_or_else(|| EngineError::invalid_state("at least one player", "no players"))?;
    let actions = if m.state.is_solo() {
        ActionCount::Unlimited
    } else {
        ActionCount::full()
    };
    m.state.set_phase(GamePhase::Action, &mut m.events);
    m.state.start_turn(first.clone(), actions, &mut m.events);
    m.logger.minimal(&format!(
        "generation {}: {first} to act",
        m.state.generation()
    ));
    Ok(())
}
