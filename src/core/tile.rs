//! Tile kinds that can be placed on the board

use crate::core::ResourceType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileType {
    City,
    Greenery,
    Ocean,
}

impl TileType {
    /// Tile queued by a `*-placement` output
    pub fn from_placement(resource: ResourceType) -> Option<TileType> {
        match resource {
            ResourceType::CityPlacement => Some(TileType::City),
            ResourceType::GreeneryPlacement => Some(TileType::Greenery),
            ResourceType::OceanPlacement => Some(TileType::Ocean),
            _ => None,
        }
    }

    /// Tile counted by a `*-tile` per-condition
    pub fn from_count(resource: ResourceType) -> Option<TileType> {
        match resource {
            ResourceType::CityTile => Some(TileType::City),
            ResourceType::GreeneryTile => Some(TileType::Greenery),
            ResourceType::OceanTile => Some(TileType::Ocean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileType::City => "city",
            TileType::Greenery => "greenery",
            TileType::Ocean => "ocean",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
