//! Playing cards, card actions and passive effects through the action layer

mod common;

use common::Table;
use similar_asserts::assert_eq;
use tfm_engine::actions::{BuildAquifer, ConfirmCardDraw, PlayCard, SelectTile, UseCardAction};
use tfm_engine::core::{Card, CardId, CardPayment, ResourceType};
use tfm_engine::game::SourceType;
use tfm_engine::loader::parse_cards;
use tfm_engine::EngineError;

const CARDS: &str = r#"[
    {"id": "MINE", "name": "Mine", "type": "automated", "cost": 4, "tags": ["building"],
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "steel-production", "amount": 1}]}]},
    {"id": "ALGAE", "name": "Arctic Algae", "type": "active", "cost": 12,
     "requirements": [{"type": "temperature", "max": -12}],
     "behaviors": [{"triggers": [{"type": "auto",
                                  "condition": {"type": "ocean-placed", "target": "any-player"}}],
                    "outputs": [{"type": "plants", "amount": 2}]}]},
    {"id": "PUMP", "name": "Heat Pump", "type": "active", "cost": 6,
     "behaviors": [{"triggers": [{"type": "manual"}],
                    "inputs": [{"type": "energy", "amount": 1}],
                    "outputs": [{"type": "heat", "amount": 3}]}]},
    {"id": "LAB", "name": "Oxygen Lab", "type": "automated", "cost": 3,
     "requirements": [{"type": "oxygen", "min": 5}],
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "credits", "amount": 4}]}]},
    {"id": "ROVER", "name": "Rover", "type": "event", "cost": 2,
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "choices": [{"outputs": [{"type": "plants", "amount": 3}]},
                                {"outputs": [{"type": "heat", "amount": 2}]}]}]},
    {"id": "TOWN", "name": "Township", "type": "automated", "cost": 10, "tags": ["city", "building"],
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "city-placement", "amount": 1}]}]},
    {"id": "MAYOR", "name": "Mayor", "type": "active", "cost": 5,
     "behaviors": [{"triggers": [{"type": "auto", "condition": {"type": "city-placed"}}],
                    "outputs": [{"type": "credits", "amount": 2}]}]},
    {"id": "SPY", "name": "Informant", "type": "active", "cost": 3,
     "behaviors": [{"triggers": [{"type": "auto", "condition": {"type": "card-played"}}],
                    "outputs": [{"type": "card-draw", "amount": 1}]}]},
    {"id": "READ", "name": "Research Note", "type": "automated", "cost": 2,
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "card-draw", "amount": 1}]}]},
    {"id": "TWICE", "name": "Double Survey", "type": "automated", "cost": 5,
     "behaviors": [{"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "card-draw", "amount": 1}]},
                   {"triggers": [{"type": "auto"}],
                    "outputs": [{"type": "card-draw", "amount": 1}]}]}
]"#;

fn cards() -> Vec<Card> {
    parse_cards(CARDS).unwrap()
}

fn play(id: &str, credits: i32) -> PlayCard {
    PlayCard::new(id, CardPayment::credits(credits))
}

#[test]
fn test_building_card_paid_with_steel() {
    let table = Table::new(2, cards());
    table.give_cards(0, &["MINE"]);
    table.set(0, ResourceType::Steel, 2);
    let payment = CardPayment {
        steel: 2,
        ..Default::default()
    };

    table.act(0, &PlayCard::new("MINE", payment)).unwrap();

    table.player(0, |p| {
        assert_eq!(p.resources().steel, 0);
        assert_eq!(p.resources().credits, 42);
        assert_eq!(p.production().steel, 1);
        assert!(p.hand().is_empty());
        assert_eq!(p.played_cards().to_vec(), vec![CardId::new("MINE")]);
    });
}

#[test]
fn test_underpayment_changes_nothing() {
    let table = Table::new(2, cards());
    table.give_cards(0, &["MINE"]);
    let before = table.player(0, |p| p.resources());

    assert!(table.act(0, &play("MINE", 3)).is_err());

    table.player(0, |p| {
        assert_eq!(p.resources(), before);
        assert!(p.has_in_hand(&CardId::new("MINE")));
        assert!(p.played_cards().is_empty());
    });
}

#[test]
fn test_oxygen_requirement_is_inclusive() {
    let table = Table::new(2, cards());
    table.give_cards(0, &["LAB"]);
    table.game.increase_oxygen(4, None);

    let err = table.act(0, &play("LAB", 3)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction(_)), "unexpected {err}");

    table.game.increase_oxygen(1, None);
    table.act(0, &play("LAB", 3)).unwrap();
    assert_eq!(table.player(0, |p| p.resources().credits), 42 - 3 + 4);
}

#[test]
fn test_choice_must_be_made() {
    let table = Table::new(2, cards());
    table.give_cards(0, &["ROVER"]);

    let err = table.act(0, &play("ROVER", 2)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction(_)));
    let err = table.act(0, &play("ROVER", 2).with_choice(5)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction(_)));

    table.act(0, &play("ROVER", 2).with_choice(1)).unwrap();
    table.player(0, |p| {
        assert_eq!(p.resources().heat, 2);
        assert_eq!(p.resources().plants, 0);
    });
}

#[test]
fn test_card_action_once_per_generation() {
    let table = Table::new(1, cards());
    table.give_cards(0, &["PUMP"]);
    table.set(0, ResourceType::Energy, 2);

    table.act(0, &play("PUMP", 6)).unwrap();
    table.act(0, &UseCardAction::new("PUMP", 0)).unwrap();
    table.player(0, |p| {
        assert_eq!(p.resources().energy, 1);
        assert_eq!(p.resources().heat, 3);
        assert_eq!(p.actions()[0].play_count, 1);
    });

    let err = table.act(0, &UseCardAction::new("PUMP", 0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { .. }), "unexpected {err}");
    let err = table.act(0, &UseCardAction::new("PUMP", 3)).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert_eq!(table.player(0, |p| p.resources().energy), 1);
}

#[test]
fn test_passive_effect_fires_for_any_players_ocean() {
    let table = Table::new(2, cards());
    table.give_cards(0, &["ALGAE"]);
    table.act(0, &play("ALGAE", 12)).unwrap();
    assert_eq!(table.player(0, |p| p.effects().len()), 1);

    table.act(0, &BuildAquifer).unwrap();
    let hex = table.player(0, |p| p.selection().tile.clone().unwrap().available_hexes[0]);
    table.act(0, &SelectTile::at(hex)).unwrap();
    assert_eq!(table.player(0, |p| p.resources().plants), 2);

    // Turn has passed to the second player
    table.act(1, &BuildAquifer).unwrap();
    let hex = table.player(1, |p| p.selection().tile.clone().unwrap().available_hexes[0]);
    table.act(1, &SelectTile::at(hex)).unwrap();

    assert_eq!(table.player(0, |p| p.resources().plants), 4);
    assert_eq!(table.player(1, |p| p.resources().plants), 0);
}

#[test]
fn test_own_city_triggers_self_scoped_effect() {
    let table = Table::new(1, cards());
    table.give_cards(0, &["MAYOR", "TOWN"]);

    table.act(0, &play("MAYOR", 5)).unwrap();
    table.act(0, &play("TOWN", 10)).unwrap();
    let credits = table.player(0, |p| p.resources().credits);
    let pending = table.player(0, |p| p.selection().tile.clone().unwrap());
    table.act(0, &SelectTile::at(pending.available_hexes[0])).unwrap();

    assert_eq!(table.player(0, |p| p.resources().credits), credits + 2);
    let triggered = table.game.read(|s| {
        s.history
            .records()
            .iter()
            .filter(|r| r.source_type == SourceType::PassiveEffect)
            .count()
    });
    assert_eq!(triggered, 1);
}

/// Every project card in the game: deck, discards, hands, played and
/// revealed-but-unclaimed
fn cards_in_play(table: &Table) -> usize {
    table.game.read(|s| {
        s.deck.available()
            + s.players
                .iter()
                .map(|p| {
                    p.hand().len()
                        + p.played_cards().len()
                        + p.selection()
                            .card_draw
                            .as_ref()
                            .map_or(0, |d| d.available_cards.len())
                })
                .sum::<usize>()
    })
}

#[test]
fn test_draws_landing_together_keep_every_card() {
    let table = Table::new(1, cards());
    table.give_cards(0, &["SPY", "READ"]);
    let total = cards_in_play(&table);

    table.act(0, &play("SPY", 3)).unwrap();
    table.act(0, &play("READ", 2)).unwrap();
    assert_eq!(cards_in_play(&table), total);

    // The card's own draw and the effect it set off are one selection
    let pending = table.player(0, |p| p.selection().card_draw.clone().unwrap());
    assert_eq!(pending.available_cards.len(), 2);
    assert_eq!(pending.free_take_count, 2);

    table
        .act(0, &ConfirmCardDraw::new(pending.available_cards.clone(), Vec::new()))
        .unwrap();
    table.player(0, |p| {
        assert!(p.selection().card_draw.is_none());
        for card in &pending.available_cards {
            assert!(p.has_in_hand(card));
        }
    });
    assert_eq!(cards_in_play(&table), total);
}

#[test]
fn test_card_failing_midway_leaves_player_untouched() {
    let table = Table::new(1, cards());
    table.give_cards(0, &["TWICE"]);
    table.set(0, ResourceType::Credits, 5);
    table
        .game
        .update(|m| {
            let spare = m.state.deck.available() - 1;
            m.state.deck.draw(spare)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(table.game.read(|s| s.deck.available()), 1);
    let (hand, played) = table.player(0, |p| (p.hand().to_vec(), p.played_cards().to_vec()));

    // Each draw alone fits in the deck; the second one runs it dry
    let err = table.act(0, &play("TWICE", 5)).unwrap_err();
    assert!(matches!(err, EngineError::DeckExhausted { .. }), "unexpected {err}");

    table.player(0, |p| {
        assert_eq!(p.resources().credits, 5);
        assert_eq!(p.hand().to_vec(), hand);
        assert_eq!(p.played_cards().to_vec(), played);
        assert!(p.selection().card_draw.is_none());
    });
    assert_eq!(table.game.read(|s| s.deck.available()), 1);
}
