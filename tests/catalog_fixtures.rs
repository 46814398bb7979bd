//! Card catalog fixtures
//!
//! Every JSON file under tests/fixtures/cards/ must parse and validate;
//! dir-test generates one test per file.

use dir_test::{dir_test, Fixture};
use similar_asserts::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tfm_engine::core::{CardId, CardType};
use tfm_engine::game::{GameRepository, GameSettings};
use tfm_engine::loader::{load_catalog, parse_cards, CardRegistry};

fn fixtures(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(dir)
}

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/tests/fixtures/cards",
    glob: "**/*.json",
)]
fn test_card_fixture_is_valid(fixture: Fixture<&str>) {
    let cards = parse_cards(fixture.content())
        .unwrap_or_else(|e| panic!("{} does not parse: {e}", fixture.path()));
    assert!(!cards.is_empty(), "{} holds no cards", fixture.path());

    for card in &cards {
        card.validate()
            .unwrap_or_else(|e| panic!("{} in {}: {e}", card.id, fixture.path()));
        assert_eq!(card.pack, GameSettings::BASE_PACK, "{} pack", card.id);
    }
}

#[tokio::test]
async fn test_load_fixture_directory() {
    let catalog = load_catalog(fixtures("cards")).await.unwrap();

    assert_eq!(catalog.files, 3);
    assert_eq!(catalog.cards.len(), 10);
    assert!(catalog.rejected.is_empty(), "{:?}", catalog.rejected);

    let registry = catalog.into_registry().unwrap();
    let helion = registry.get_by_id(&CardId::new("C001")).unwrap();
    assert_eq!(helion.card_type, CardType::Corporation);
    assert_eq!(helion.starting_production.unwrap().heat, 3);
    assert_eq!(
        registry.get_by_name("arctic algae").map(|c| c.id.clone()),
        Some(CardId::new("B010"))
    );
}

#[tokio::test]
async fn test_invalid_definitions_are_reported_not_fatal() {
    let catalog = load_catalog(fixtures("invalid")).await.unwrap();

    assert!(catalog.cards.is_empty());
    assert_eq!(catalog.rejected.len(), 1);
    let rejected = &catalog.rejected[0];
    assert!(rejected.source.ends_with("paid_auto_effect.json"));
    assert!(rejected.reason.contains("may not declare inputs"), "{}", rejected.reason);
}

#[tokio::test]
async fn test_missing_path_is_an_error() {
    assert!(load_catalog(fixtures("no-such-dir")).await.is_err());
}

#[tokio::test]
async fn test_fixture_catalog_deals_a_game() {
    let catalog = load_catalog(fixtures("cards")).await.unwrap();
    let repo = GameRepository::new(Arc::new(catalog.into_registry().unwrap()));
    let game = repo.create(GameSettings::default().with_seed(5));

    game.read(|s| {
        // Eight projects in the deck, two corporations set aside
        assert_eq!(s.deck.available(), 8);
    });
}
