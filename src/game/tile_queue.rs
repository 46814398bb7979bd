//! Per-player FIFO of tile placements awaiting a hex choice
//!
//! Each pop revalidates the head entry against the live board and global
//! parameters. Infeasible entries are discarded silently; the first
//! feasible one becomes the player's single [`PendingTileSelection`].

use crate::core::{HexPosition, PendingTileSelection, PlayerId, ResourceType, TileType};
use crate::events::{PlacementBonusGained, TilePlaced};
use crate::game::logger::log_if_verbose;
use crate::game::{Board, GlobalParameters, Mutation, SourceType};
use crate::{EngineError, Result};

/// Hexes where `player` may put `tile_type` right now
///
/// Oceans go on empty ocean spaces while fewer than the maximum are placed.
/// Cities go on any empty land. Greenery must touch a tile the player owns,
/// falling back to any empty land when nothing adjacent is open.
pub fn legal_hexes(
    board: &Board,
    params: &GlobalParameters,
    tile_type: TileType,
    player: &PlayerId,
) -> Vec<HexPosition> {
    match tile_type {
        TileType::Ocean if params.oceans_remaining() == 0 => Vec::new(),
        TileType::Ocean => board.empty_ocean_spaces(),
        TileType::City => board.empty_land(),
        TileType::Greenery => {
            let adjacent = board.empty_land_adjacent_to(player);
            if adjacent.is_empty() {
                board.empty_land()
            } else {
                adjacent
            }
        }
    }
}

/// Turn the head of `player`'s queue into a pending tile selection
///
/// Returns the tile type now awaiting a choice, or `None` when the queue
/// drained without a feasible entry. Does nothing while a selection is
/// already outstanding.
pub fn process_tile_queue(m: &mut Mutation<'_>, player_id: &PlayerId) -> Result<Option<TileType>> {
    let state = &mut *m.state;
    let player = state
        .players
        .iter_mut()
        .find(|p| &p.id == player_id)
        .ok_or_else(|| EngineError::not_found("player", player_id))?;

    if player.selection().tile.is_some() {
        return Ok(None);
    }

    let Some(mut queue) = player.selection_mut().tile_queue.take() else {
        return Ok(None);
    };

    while let Some(tile_type) = queue.items.pop_front() {
        let hexes = legal_hexes(&state.board, &state.global_parameters, tile_type, player_id);
        if hexes.is_empty() {
            m.logger.normal(&format!(
                "{player_id}: no legal hex for {tile_type} from {}, discarded",
                queue.source
            ));
            continue;
        }

        log_if_verbose!(
            m.logger,
            "{}: {} placement pending ({} hexes, {} queued)",
            player_id,
            tile_type,
            hexes.len(),
            queue.len()
        );
        player.selection_mut().tile = Some(PendingTileSelection {
            tile_type,
            available_hexes: hexes,
            source: queue.source.clone(),
        });
        if !queue.is_empty() {
            player.selection_mut().tile_queue = Some(queue);
        }
        return Ok(Some(tile_type));
    }

    Ok(None)
}

/// Place the pending tile at `position`, pay board bonuses and raise the
/// matching global parameter, then move on to the next queued tile
pub fn resolve_tile_selection(
    m: &mut Mutation<'_>,
    player_id: &PlayerId,
    position: HexPosition,
) -> Result<()> {
    let pending = m
        .player(player_id)?
        .selection()
        .tile
        .clone()
        .ok_or_else(|| EngineError::invalid_state("pending tile selection", "none"))?;

    if !pending.available_hexes.contains(&position) {
        return Err(EngineError::InvalidSelection(format!(
            "hex {position} is not available for {}",
            pending.tile_type
        )));
    }

    let bonuses = m
        .state
        .board
        .tile(&position)
        .map(|t| t.bonuses.clone())
        .unwrap_or_default();
    let cards_owed: i32 = bonuses
        .iter()
        .filter(|b| b.resource == ResourceType::CardDraw)
        .map(|b| b.amount)
        .sum();
    if cards_owed > 0 && cards_owed as usize > m.state.deck.available() {
        return Err(EngineError::DeckExhausted {
            requested: cards_owed as usize,
            available: m.state.deck.available(),
        });
    }

    // Validation done; write
    let game_id = m.game_id().clone();
    let owner = (pending.tile_type != TileType::Ocean).then(|| player_id.clone());
    m.state.board.place(&position, pending.tile_type, owner)?;
    m.player_mut(player_id)?.selection_mut().tile = None;
    m.events.push(TilePlaced {
        game_id: game_id.clone(),
        player_id: player_id.clone(),
        tile_type: pending.tile_type,
        position,
    });
    m.record(
        player_id,
        &pending.source,
        SourceType::TileBonus,
        format!("placed {} at {position}", pending.tile_type),
    );

    let mut gained = Vec::new();
    for bonus in &bonuses {
        match bonus.resource {
            ResourceType::Steel | ResourceType::Titanium | ResourceType::Plants => {
                m.add_resources(player_id, [(bonus.resource, bonus.amount)])?;
            }
            ResourceType::CardDraw => {
                let cards = m.state.deck.draw(bonus.amount.max(0) as usize)?;
                let player = m.state.get_player_mut(player_id)?;
                for card in cards {
                    player.add_to_hand(card, &mut m.events);
                }
            }
            other => {
                m.logger
                    .warn(&format!("unrecognized tile bonus {other} at {position}, skipped"));
                continue;
            }
        }
        gained.push((bonus.resource, bonus.amount));
    }
    if !gained.is_empty() {
        m.events.push(PlacementBonusGained {
            game_id,
            player_id: player_id.clone(),
            resources: gained,
            position,
        });
    }

    match pending.tile_type {
        TileType::Greenery => {
            m.raise_oxygen(player_id, 1)?;
        }
        TileType::Ocean => {
            m.raise_oceans(player_id, 1)?;
        }
        TileType::City => {}
    }

    process_tile_queue(m, player_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, GameId, PendingTileQueue, Player};
    use crate::game::{Deck, EngineLogger, GameSettings, GameState, PassiveEffects, VerbosityLevel};
    use crate::loader::InMemoryCardRegistry;

    struct Fixture {
        state: GameState,
        registry: InMemoryCardRegistry,
        logger: EngineLogger,
        passive: PassiveEffects,
    }

    impl Fixture {
        fn new() -> Self {
            let deck = Deck::new((0..5).map(|i| CardId::new(format!("D{i}"))).collect(), vec![], Some(1));
            let mut state = GameState::new(GameId::new("g1"), GameSettings::default(), deck);
            state.add_player(Player::new(PlayerId::new("p1"), "Alice"));
            Fixture {
                state,
                registry: InMemoryCardRegistry::default(),
                logger: EngineLogger::with_verbosity(VerbosityLevel::Silent),
                passive: PassiveEffects::new(),
            }
        }

        fn run<R>(&mut self, f: impl FnOnce(&mut Mutation<'_>) -> Result<R>) -> Result<R> {
            let mut m = Mutation::new(&mut self.state, &self.registry, &self.logger, &self.passive);
            f(&mut m)
        }

        fn queue(&mut self, tiles: &[TileType]) {
            let player = self.state.get_player_mut(&p1()).unwrap();
            let mut queue = PendingTileQueue::new("test");
            queue.items.extend(tiles.iter().copied());
            player.selection_mut().tile_queue = Some(queue);
        }

        fn player(&self) -> &Player {
            self.state.get_player(&p1()).unwrap()
        }
    }

    fn p1() -> PlayerId {
        PlayerId::new("p1")
    }

    #[test]
    fn test_oceans_at_max_drain_queue() {
        let mut fixture = Fixture::new();
        fixture.state.global_parameters = GlobalParameters::new(-30, 0, 9);
        fixture.queue(&[TileType::Ocean, TileType::Ocean]);

        let pending = fixture.run(|m| process_tile_queue(m, &p1())).unwrap();
        assert_eq!(pending, None);
        assert!(fixture.player().selection().tile.is_none());
        assert!(fixture.player().selection().tile_queue.is_none());
    }

    #[test]
    fn test_head_becomes_pending_selection() {
        let mut fixture = Fixture::new();
        fixture.queue(&[TileType::City, TileType::Ocean]);

        let pending = fixture.run(|m| process_tile_queue(m, &p1())).unwrap();
        assert_eq!(pending, Some(TileType::City));
        let selection = fixture.player().selection().tile.clone().unwrap();
        assert_eq!(selection.available_hexes.len(), 33);
        assert_eq!(selection.source, "test");
        assert_eq!(fixture.player().selection().tile_queue.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_last_entry_clears_queue() {
        let mut fixture = Fixture::new();
        fixture.queue(&[TileType::Ocean]);
        fixture.run(|m| process_tile_queue(m, &p1())).unwrap();
        assert!(fixture.player().selection().tile_queue.is_none());
        assert_eq!(
            fixture.player().selection().tile.as_ref().unwrap().available_hexes.len(),
            9
        );
    }

    #[test]
    fn test_greenery_prefers_adjacent_hexes() {
        let mut fixture = Fixture::new();
        let board = &fixture.state.board;
        let all_land = legal_hexes(board, &fixture.state.global_parameters, TileType::Greenery, &p1());
        assert_eq!(all_land.len(), 33);

        let city = all_land[10];
        fixture.state.board.place(&city, TileType::City, Some(p1())).unwrap();
        let adjacent = legal_hexes(
            &fixture.state.board,
            &fixture.state.global_parameters,
            TileType::Greenery,
            &p1(),
        );
        assert!(!adjacent.is_empty());
        assert!(adjacent.iter().all(|h| h.is_adjacent(&city)));
    }

    #[test]
    fn test_select_greenery_raises_oxygen() {
        let mut fixture = Fixture::new();
        fixture.queue(&[TileType::Greenery, TileType::City]);
        fixture.run(|m| process_tile_queue(m, &p1())).unwrap();
        let hex = fixture.player().selection().tile.as_ref().unwrap().available_hexes[0];

        fixture.run(|m| resolve_tile_selection(m, &p1(), hex)).unwrap();
        assert_eq!(fixture.state.global_parameters.oxygen(), 1);
        assert_eq!(fixture.player().terraform_rating(), 21);
        assert!(fixture.state.board.tile(&hex).unwrap().is_owned_by(&p1()));
        // next queued tile is now pending
        assert_eq!(
            fixture.player().selection().tile.as_ref().map(|s| s.tile_type),
            Some(TileType::City)
        );
    }

    #[test]
    fn test_select_unoffered_hex_fails() {
        let mut fixture = Fixture::new();
        fixture.queue(&[TileType::Ocean]);
        fixture.run(|m| process_tile_queue(m, &p1())).unwrap();
        let land = fixture.state.board.empty_land()[0];
        let err = fixture.run(|m| resolve_tile_selection(m, &p1(), land)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelection(_)));
        assert!(fixture.player().selection().tile.is_some());
    }

    #[test]
    fn test_select_without_pending_is_invalid_state() {
        let mut fixture = Fixture::new();
        let land = fixture.state.board.empty_land()[0];
        let err = fixture.run(|m| resolve_tile_selection(m, &p1(), land)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
    }
}
