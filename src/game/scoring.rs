//! Victory points and final standings
//!
//! A player's score is their terraform rating, plus VP printed on played
//! cards, plus one per owned greenery, plus one per greenery next to each
//! owned city. Standings sort by total VP, then by credits left.

use crate::core::{
    Card, CardId, HexPosition, Player, PlayerId, TileType, VictoryPointCondition, VpConditionType,
};
use crate::game::{count_per_condition, Board, GameState};
use crate::loader::CardRegistry;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardScore {
    pub card_id: CardId,
    pub card_name: String,
    pub vp: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityScore {
    pub city: HexPosition,
    pub adjacent_greeneries: Vec<HexPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpBreakdown {
    pub terraform_rating: i32,
    pub card_vp: i32,
    pub cards: Vec<CardScore>,
    pub greenery_vp: i32,
    pub city_vp: i32,
    pub cities: Vec<CityScore>,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub player_id: PlayerId,
    pub player_name: String,
    pub breakdown: VpBreakdown,
    /// Tiebreaker
    pub credits: i32,
    /// 1-based
    pub placement: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScores {
    /// Best first
    pub standings: Vec<FinalScore>,
    pub winner: Option<PlayerId>,
    /// The top two share both VP and credits
    pub is_tie: bool,
}

/// VP one condition of `card` is worth to `player`
pub fn condition_vp(
    condition: &VictoryPointCondition,
    card: &Card,
    player: &Player,
    state: &GameState,
    registry: &dyn CardRegistry,
) -> i32 {
    match condition.condition {
        VpConditionType::Fixed | VpConditionType::Once => condition.amount,
        VpConditionType::Per => {
            let Some(per) = &condition.per else {
                return 0;
            };
            if per.amount <= 0 {
                return 0;
            }
            let counted =
                count_per_condition(state, registry, &player.id, Some(&card.id), per).unwrap_or(0);
            let mut triggers = counted / per.amount;
            if let Some(max) = condition.max_trigger {
                triggers = max.cap(triggers);
            }
            condition.amount * triggers
        }
    }
}

fn card_scores(player: &Player, state: &GameState, registry: &dyn CardRegistry) -> Vec<CardScore> {
    player
        .played_cards()
        .iter()
        .chain(player.corporation.as_ref())
        .filter_map(|id| registry.get_by_id(id).ok())
        .filter(|card| !card.vp_conditions.is_empty())
        .map(|card| CardScore {
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            vp: card
                .vp_conditions
                .iter()
                .map(|c| condition_vp(c, &card, player, state, registry))
                .sum(),
        })
        .collect()
}

fn city_scores(board: &Board, player: &PlayerId) -> Vec<CityScore> {
    board
        .owned_by(player)
        .filter(|tile| tile.holds(TileType::City))
        .map(|city| CityScore {
            city: city.position,
            adjacent_greeneries: city
                .position
                .neighbors()
                .into_iter()
                .filter(|n| board.tile(n).is_some_and(|t| t.holds(TileType::Greenery)))
                .collect(),
        })
        .collect()
}

pub fn player_vp(player: &Player, state: &GameState, registry: &dyn CardRegistry) -> VpBreakdown {
    let cards = card_scores(player, state, registry);
    let cities = city_scores(&state.board, &player.id);

    let terraform_rating = player.terraform_rating();
    let card_vp = cards.iter().map(|c| c.vp).sum();
    let greenery_vp = state.board.count_tiles(TileType::Greenery, Some(&player.id));
    let city_vp = cities.iter().map(|c| c.adjacent_greeneries.len() as i32).sum();

    VpBreakdown {
        terraform_rating,
        card_vp,
        cards,
        greenery_vp,
        city_vp,
        cities,
        total: terraform_rating + card_vp + greenery_vp + city_vp,
    }
}

/// Score everyone and rank them
pub fn final_scores(state: &GameState, registry: &dyn CardRegistry) -> FinalScores {
    let mut standings: Vec<FinalScore> = state
        .players
        .iter()
        .map(|player| FinalScore {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            breakdown: player_vp(player, state, registry),
            credits: player.resources().credits,
            placement: 0,
        })
        .collect();
    // Stable sort keeps turn order among exact ties
    standings.sort_by_key(|s| (Reverse(s.breakdown.total), Reverse(s.credits)));
    for (i, score) in standings.iter_mut().enumerate() {
        score.placement = i + 1;
    }

    let is_tie = match standings.as_slice() {
        [first, second, ..] => {
            first.breakdown.total == second.breakdown.total && first.credits == second.credits
        }
        _ => false,
    };
    FinalScores {
        winner: standings.first().map(|s| s.player_id.clone()),
        standings,
        is_tie,
    }
}
