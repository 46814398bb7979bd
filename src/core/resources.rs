//! Resource vocabulary and per-player resource/production snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every resource-like quantity a card behavior can name
///
/// The same vocabulary is used for basic resources, production, card
/// resources, card flow, tile placements, tile counts and global
/// parameters. Names the engine does not know deserialize to `Unknown`
/// and are skipped with a warning when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    // Basic resources
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,

    // Card resources
    Microbes,
    Animals,
    Floaters,
    Science,
    Asteroid,
    Disease,

    // Card flow
    CardDraw,
    CardTake,
    CardPeek,
    CardBuy,

    // Tile placements
    CityPlacement,
    OceanPlacement,
    GreeneryPlacement,

    // Tile counts (used by per-conditions)
    CityTile,
    OceanTile,
    GreeneryTile,

    // Global parameters
    Temperature,
    Oxygen,
    Oceans,
    Tr,

    // Production
    CreditsProduction,
    SteelProduction,
    TitaniumProduction,
    PlantsProduction,
    EnergyProduction,
    HeatProduction,

    // Modifiers
    Tag,
    Discount,
    PaymentSubstitute,
    ValueModifier,

    #[serde(other)]
    Unknown,
}

impl ResourceType {
    pub const BASIC: [ResourceType; 6] = [
        ResourceType::Credits,
        ResourceType::Steel,
        ResourceType::Titanium,
        ResourceType::Plants,
        ResourceType::Energy,
        ResourceType::Heat,
    ];

    pub fn is_basic(&self) -> bool {
        Self::BASIC.contains(self)
    }

    pub fn is_production(&self) -> bool {
        self.base_of_production().is_some()
    }

    /// Resources that live in a card's storage rather than the ledger
    pub fn is_card_resource(&self) -> bool {
        matches!(
            self,
            ResourceType::Microbes
                | ResourceType::Animals
                | ResourceType::Floaters
                | ResourceType::Science
                | ResourceType::Asteroid
                | ResourceType::Disease
        )
    }

    /// `steel-production` -> `steel`
    pub fn base_of_production(&self) -> Option<ResourceType> {
        match self {
            ResourceType::CreditsProduction => Some(ResourceType::Credits),
            ResourceType::SteelProduction => Some(ResourceType::Steel),
            ResourceType::TitaniumProduction => Some(ResourceType::Titanium),
            ResourceType::PlantsProduction => Some(ResourceType::Plants),
            ResourceType::EnergyProduction => Some(ResourceType::Energy),
            ResourceType::HeatProduction => Some(ResourceType::Heat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Credits => "credits",
            ResourceType::Steel => "steel",
            ResourceType::Titanium => "titanium",
            ResourceType::Plants => "plants",
            ResourceType::Energy => "energy",
            ResourceType::Heat => "heat",
            ResourceType::Microbes => "microbes",
            ResourceType::Animals => "animals",
            ResourceType::Floaters => "floaters",
            ResourceType::Science => "science",
            ResourceType::Asteroid => "asteroid",
            ResourceType::Disease => "disease",
            ResourceType::CardDraw => "card-draw",
            ResourceType::CardTake => "card-take",
            ResourceType::CardPeek => "card-peek",
            ResourceType::CardBuy => "card-buy",
            ResourceType::CityPlacement => "city-placement",
            ResourceType::OceanPlacement => "ocean-placement",
            ResourceType::GreeneryPlacement => "greenery-placement",
            ResourceType::CityTile => "city-tile",
            ResourceType::OceanTile => "ocean-tile",
            ResourceType::GreeneryTile => "greenery-tile",
            ResourceType::Temperature => "temperature",
            ResourceType::Oxygen => "oxygen",
            ResourceType::Oceans => "oceans",
            ResourceType::Tr => "tr",
            ResourceType::CreditsProduction => "credits-production",
            ResourceType::SteelProduction => "steel-production",
            ResourceType::TitaniumProduction => "titanium-production",
            ResourceType::PlantsProduction => "plants-production",
            ResourceType::EnergyProduction => "energy-production",
            ResourceType::HeatProduction => "heat-production",
            ResourceType::Tag => "tag",
            ResourceType::Discount => "discount",
            ResourceType::PaymentSubstitute => "payment-substitute",
            ResourceType::ValueModifier => "value-modifier",
            ResourceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's stock of basic resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl Resources {
    /// Amount of a basic resource, `None` for anything else
    pub fn get(&self, resource: ResourceType) -> Option<i32> {
        match resource {
            ResourceType::Credits => Some(self.credits),
            ResourceType::Steel => Some(self.steel),
            ResourceType::Titanium => Some(self.titanium),
            ResourceType::Plants => Some(self.plants),
            ResourceType::Energy => Some(self.energy),
            ResourceType::Heat => Some(self.heat),
            _ => None,
        }
    }

    pub(crate) fn slot_mut(&mut self, resource: ResourceType) -> Option<&mut i32> {
        match resource {
            ResourceType::Credits => Some(&mut self.credits),
            ResourceType::Steel => Some(&mut self.steel),
            ResourceType::Titanium => Some(&mut self.titanium),
            ResourceType::Plants => Some(&mut self.plants),
            ResourceType::Energy => Some(&mut self.energy),
            ResourceType::Heat => Some(&mut self.heat),
            _ => None,
        }
    }
}

/// Production levels, keyed by the basic resource they produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Production {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl Production {
    /// Lowest credits production a player may drop to
    pub const MIN_CREDITS: i32 = -5;

    /// Production of a basic resource (accepts either `steel` or `steel-production`)
    pub fn get(&self, resource: ResourceType) -> Option<i32> {
        match resource.base_of_production().unwrap_or(resource) {
            ResourceType::Credits => Some(self.credits),
            ResourceType::Steel => Some(self.steel),
            ResourceType::Titanium => Some(self.titanium),
            ResourceType::Plants => Some(self.plants),
            ResourceType::Energy => Some(self.energy),
            ResourceType::Heat => Some(self.heat),
            _ => None,
        }
    }

    pub(crate) fn slot_mut(&mut self, resource: ResourceType) -> Option<&mut i32> {
        match resource.base_of_production().unwrap_or(resource) {
            ResourceType::Credits => Some(&mut self.credits),
            ResourceType::Steel => Some(&mut self.steel),
            ResourceType::Titanium => Some(&mut self.titanium),
            ResourceType::Plants => Some(&mut self.plants),
            ResourceType::Energy => Some(&mut self.energy),
            ResourceType::Heat => Some(&mut self.heat),
            _ => None,
        }
    }

    pub fn floor(resource: ResourceType) -> i32 {
        if resource.base_of_production().unwrap_or(resource) == ResourceType::Credits {
            Self::MIN_CREDITS
        } else {
            0
        }
    }
}
