//! The Mars board: 42 hexes in rows of 5-6-7-8-9-8-7-6-5
//!
//! Nine spaces are reserved for oceans. Some spaces pay a placement bonus to
//! whoever puts a tile on them.

use crate::core::{HexPosition, PlayerId, ResourceType, TileType};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};

const ROW_PATTERN: [i32; 9] = [5, 6, 7, 8, 9, 8, 7, 6, 5];

/// (row, column) of the ocean-reserved spaces
const OCEAN_SPACES: [(i32, i32); 9] = [
    (1, 2),
    (2, 1),
    (2, 5),
    (3, 3),
    (4, 1),
    (4, 7),
    (5, 4),
    (6, 2),
    (7, 3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpaceKind {
    Land,
    OceanSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBonus {
    #[serde(rename = "type")]
    pub resource: ResourceType,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileOccupant {
    pub tile_type: TileType,
    pub owner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub position: HexPosition,
    pub kind: SpaceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub bonuses: Vec<TileBonus>,
    pub occupant: Option<TileOccupant>,
}

impl Tile {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.occupant
            .as_ref()
            .and_then(|o| o.owner.as_ref())
            .is_some_and(|owner| owner == player)
    }

    pub fn holds(&self, tile_type: TileType) -> bool {
        self.occupant
            .as_ref()
            .is_some_and(|o| o.tile_type == tile_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Default for Board {
    fn default() -> Self {
        Self::generate()
    }
}

impl Board {
    /// The standard layout
    pub fn generate() -> Self {
        let center = ROW_PATTERN.len() as i32 / 2;
        let mut tiles = Vec::with_capacity(42);

        for (row, count) in ROW_PATTERN.iter().copied().enumerate() {
            let row = row as i32;
            let r = row - center;
            for col in 0..count {
                let mut q = col - count / 2;
                if r < 0 {
                    q -= (r - 1) / 2;
                } else {
                    q -= r / 2;
                }
                let position = HexPosition::from_axial(q, r);

                let kind = if OCEAN_SPACES.contains(&(row, col)) {
                    SpaceKind::OceanSpace
                } else {
                    SpaceKind::Land
                };
                let name = (position == HexPosition::new(-2, 0, 2)).then(|| "Noctis City".to_string());

                tiles.push(Tile {
                    position,
                    kind,
                    name,
                    bonuses: Self::bonuses_for(row, col),
                    occupant: None,
                });
            }
        }

        Board { tiles }
    }

    fn bonuses_for(row: i32, col: i32) -> Vec<TileBonus> {
        let index = row * 10 + col;
        [
            (8, ResourceType::Steel, 2),
            (9, ResourceType::Titanium, 1),
            (11, ResourceType::Plants, 1),
            (13, ResourceType::CardDraw, 1),
        ]
        .into_iter()
        .filter(|(modulus, _, _)| index % modulus == 0)
        .map(|(_, resource, amount)| TileBonus { resource, amount })
        .collect()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, position: &HexPosition) -> Option<&Tile> {
        self.tiles.iter().find(|t| &t.position == position)
    }

    /// Occupy `position`; the space must exist and be empty
    pub fn place(
        &mut self,
        position: &HexPosition,
        tile_type: TileType,
        owner: Option<PlayerId>,
    ) -> Result<&Tile> {
        let tile = self
            .tiles
            .iter_mut()
            .find(|t| &t.position == position)
            .ok_or_else(|| EngineError::not_found("tile", position))?;
        if let Some(occupant) = &tile.occupant {
            return Err(EngineError::InvalidSelection(format!(
                "hex {position} already holds a {}",
                occupant.tile_type
            )));
        }
        tile.occupant = Some(TileOccupant { tile_type, owner });
        Ok(tile)
    }

    /// Tiles of `tile_type` on the board, optionally only those `owner` owns
    pub fn count_tiles(&self, tile_type: TileType, owner: Option<&PlayerId>) -> i32 {
        self.tiles
            .iter()
            .filter(|t| t.holds(tile_type))
            .filter(|t| owner.map_or(true, |p| t.is_owned_by(p)))
            .count() as i32
    }

    pub fn owned_by<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = &'a Tile> + 'a {
        self.tiles.iter().filter(move |t| t.is_owned_by(player))
    }

    pub fn empty_ocean_spaces(&self) -> Vec<HexPosition> {
        self.tiles
            .iter()
            .filter(|t| t.kind == SpaceKind::OceanSpace && !t.is_occupied())
            .map(|t| t.position)
            .collect()
    }

    pub fn empty_land(&self) -> Vec<HexPosition> {
        self.tiles
            .iter()
            .filter(|t| t.kind == SpaceKind::Land && !t.is_occupied())
            .map(|t| t.position)
            .collect()
    }

    /// Empty land next to any tile `player` owns
    pub fn empty_land_adjacent_to(&self, player: &PlayerId) -> Vec<HexPosition> {
        let owned: Vec<HexPosition> = self.owned_by(player).map(|t| t.position).collect();
        self.tiles
            .iter()
            .filter(|t| t.kind == SpaceKind::Land && !t.is_occupied())
            .filter(|t| owned.iter().any(|o| o.is_adjacent(&t.position)))
            .map(|t| t.position)
            .collect()
    }
}
