//! Generation turnover: passing, production, card selection, next action phase

mod common;

use common::Table;
use similar_asserts::assert_eq;
use tfm_engine::actions::{
    BuildPowerPlant, ConfirmProductionCards, DEFAULT_STARTING_CREDITS, SkipAction,
};
use tfm_engine::core::{CardId, ResourceType};
use tfm_engine::game::{ActionCount, GamePhase, GameStatus, CARD_BUY_COST, PRODUCTION_DRAW};
use tfm_engine::EngineError;

/// Both seats pass without acting
fn pass_both(table: &Table) {
    table.act(0, &SkipAction).unwrap();
    table.act(1, &SkipAction).unwrap();
}

#[test]
fn test_everyone_passing_runs_production() {
    let table = Table::new(2, Vec::new());
    table.game.add_production(table.pid(0), [(ResourceType::Heat, 2)]).unwrap();
    table.set(0, ResourceType::Energy, 3);
    let tr = table.player(0, |p| p.terraform_rating());

    pass_both(&table);

    table.game.read(|s| {
        assert_eq!(s.phase(), GamePhase::ProductionAndCardDraw);
        assert_eq!(s.generation(), 2);
        assert_eq!(s.current_turn(), None);
    });
    table.player(0, |p| {
        let r = p.resources();
        assert_eq!(r.credits, DEFAULT_STARTING_CREDITS + tr);
        assert_eq!(r.energy, 0);
        assert_eq!(r.heat, 3 + 2);
        let production = p.selection().production.as_ref().unwrap();
        assert_eq!(production.available_cards.len(), PRODUCTION_DRAW);
        assert_eq!(production.energy_converted, 3);
        assert!(!p.has_passed());
    });
}

#[test]
fn test_confirming_production_returns_to_action_phase() {
    let table = Table::new(2, Vec::new());
    pass_both(&table);

    let offered: Vec<CardId> =
        table.player(0, |p| p.selection().production.clone().unwrap().available_cards);
    let credits = table.player(0, |p| p.resources().credits);

    table
        .act(0, &ConfirmProductionCards::new(offered[..1].to_vec()))
        .unwrap();
    // Still waiting on the second player
    assert_eq!(table.game.read(|s| s.phase()), GamePhase::ProductionAndCardDraw);
    let again = table.act(0, &ConfirmProductionCards::new(Vec::new())).unwrap_err();
    assert!(matches!(again, EngineError::InvalidState { .. }));

    table.act(1, &ConfirmProductionCards::new(Vec::new())).unwrap();

    table.game.read(|s| {
        assert_eq!(s.phase(), GamePhase::Action);
        assert_eq!(s.status(), GameStatus::Active);
        let turn = s.current_turn().unwrap();
        assert_eq!(&turn.player, table.pid(0));
        assert_eq!(turn.actions, ActionCount::full());
        assert_eq!(turn.actions.remaining(), Some(2));
        assert!(s.players.iter().all(|p| p.selection().production.is_none()));
    });
    table.player(0, |p| {
        assert_eq!(p.hand().to_vec(), offered[..1].to_vec());
        assert_eq!(p.resources().credits, credits - CARD_BUY_COST);
    });
}

#[test]
fn test_production_cards_must_come_from_the_offer() {
    let table = Table::new(2, Vec::new());
    pass_both(&table);

    let offered = table.player(0, |p| p.selection().production.clone().unwrap().available_cards);
    let stranger = (0..24)
        .map(|i| CardId::new(format!("F{i:02}")))
        .find(|c| !offered.contains(c))
        .unwrap();

    let err = table
        .act(0, &ConfirmProductionCards::new(vec![stranger]))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSelection(_)));
    let err = table
        .act(0, &ConfirmProductionCards::new(vec![offered[0].clone(), offered[0].clone()]))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSelection(_)));
}

#[test]
fn test_turns_rotate_after_two_actions() {
    let table = Table::new(2, Vec::new());
    table.set(0, ResourceType::Credits, 30);

    table.act(0, &BuildPowerPlant).unwrap();
    table.act(0, &BuildPowerPlant).unwrap();

    let turn = table.game.read(|s| s.current_turn().cloned().unwrap());
    assert_eq!(&turn.player, table.pid(1));
    assert_eq!(turn.actions, ActionCount::full());
    assert_eq!(table.player(0, |p| p.production().energy), 2);
    assert_eq!(table.player(0, |p| p.resources().credits), 30 - 2 * 11);
}

#[test]
fn test_last_player_standing_acts_until_passing() {
    let table = Table::new(2, Vec::new());
    table.set(1, ResourceType::Credits, 40);

    table.act(0, &SkipAction).unwrap();
    let turn = table.game.read(|s| s.current_turn().cloned().unwrap());
    assert_eq!(&turn.player, table.pid(1));
    assert_eq!(turn.actions, ActionCount::Unlimited);

    for _ in 0..3 {
        table.act(1, &BuildPowerPlant).unwrap();
    }
    assert_eq!(table.game.read(|s| s.phase()), GamePhase::Action);

    table.act(1, &SkipAction).unwrap();
    assert_eq!(table.game.read(|s| s.phase()), GamePhase::ProductionAndCardDraw);
}
