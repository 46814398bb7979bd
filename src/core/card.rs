//! Card catalog entries and play requirements

use crate::core::{CardBehavior, CardId, MaxTrigger, PerCondition, Production, ResourceType, Resources, Tag, TagList};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Automated,
    Active,
    Event,
    Corporation,
    Prelude,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Automated => "automated",
            CardType::Active => "active",
            CardType::Event => "event",
            CardType::Corporation => "corporation",
            CardType::Prelude => "prelude",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementType {
    Temperature,
    Oxygen,
    Oceans,
    Venus,
    Cities,
    Greeneries,
    Tags,
    Production,
    Tr,
    Resource,
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequirementType::Temperature => "Temperature",
            RequirementType::Oxygen => "Oxygen",
            RequirementType::Oceans => "Oceans",
            RequirementType::Venus => "Venus",
            RequirementType::Cities => "Cities",
            RequirementType::Greeneries => "Greeneries",
            RequirementType::Tags => "Tags",
            RequirementType::Production => "Production",
            RequirementType::Tr => "Terraform rating",
            RequirementType::Resource => "Resource",
        };
        f.write_str(name)
    }
}

/// Inclusive lower/upper limits; a missing side is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

/// Outcome of comparing a live value against a [`Bound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundCheck {
    Within,
    BelowMin(i32),
    AboveMax(i32),
}

impl Bound {
    pub fn unbounded() -> Self {
        Bound::default()
    }

    pub fn at_least(min: i32) -> Self {
        Bound {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: i32) -> Self {
        Bound {
            min: None,
            max: Some(max),
        }
    }

    pub fn check(&self, value: i32) -> BoundCheck {
        match (self.min, self.max) {
            (Some(min), _) if value < min => BoundCheck::BelowMin(min),
            (_, Some(max)) if value > max => BoundCheck::AboveMax(max),
            _ => BoundCheck::Within,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(rename = "type")]
    pub kind: RequirementType,
    #[serde(flatten)]
    pub bound: Bound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceType>,
}

impl Requirement {
    pub fn new(kind: RequirementType, bound: Bound) -> Self {
        Requirement {
            kind,
            bound,
            tag: None,
            resource: None,
        }
    }

    pub fn tags(tag: Tag, bound: Bound) -> Self {
        Requirement {
            kind: RequirementType::Tags,
            bound,
            tag: Some(tag),
            resource: None,
        }
    }
}

/// Resources a card can hold on itself (microbes, animals, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStorage {
    #[serde(rename = "type")]
    pub resource: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub starting: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VpConditionType {
    Fixed,
    Per,
    Once,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictoryPointCondition {
    pub amount: i32,
    pub condition: VpConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trigger: Option<MaxTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per: Option<PerCondition>,
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pack: String,
    #[serde(default)]
    pub tags: TagList,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub behaviors: Vec<CardBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_storage: Option<ResourceStorage>,
    #[serde(default)]
    pub vp_conditions: Vec<VictoryPointCondition>,
    /// Corporations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_resources: Option<Resources>,
    /// Corporations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_production: Option<Production>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, card_type: CardType, cost: i32) -> Self {
        Card {
            id: id.into(),
            name: name.into(),
            card_type,
            cost,
            description: String::new(),
            pack: String::new(),
            tags: TagList::new(),
            requirements: Vec::new(),
            behaviors: Vec::new(),
            resource_storage: None,
            vp_conditions: Vec::new(),
            starting_resources: None,
            starting_production: None,
        }
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn count_tag(&self, tag: Tag) -> i32 {
        self.tags.iter().filter(|t| **t == tag).count() as i32
    }

    pub fn is_corporation(&self) -> bool {
        self.card_type == CardType::Corporation
    }

    /// Structural checks run once when the catalog is loaded
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(EngineError::InvalidCardFormat(format!(
                "card '{}' has an empty id",
                self.name
            )));
        }
        if self.cost < 0 {
            return Err(EngineError::InvalidCardFormat(format!(
                "card {} has negative cost {}",
                self.id, self.cost
            )));
        }
        if let Some(storage) = &self.resource_storage {
            if storage.starting < 0 {
                return Err(EngineError::InvalidCardFormat(format!(
                    "card {} starts with negative {}",
                    self.id, storage.resource
                )));
            }
        }
        for behavior in &self.behaviors {
            behavior
                .validate()
                .map_err(|e| EngineError::InvalidCardFormat(format!("card {}: {e}", self.id)))?;
        }
        Ok(())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
