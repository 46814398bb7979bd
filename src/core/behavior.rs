//! Declarative card behavior model
//!
//! A card lists one or more [`CardBehavior`]s. Each behavior says *when* it
//! fires ([`Trigger`]), what the player pays ([`ResourceCondition`] inputs),
//! what they get (outputs) and, optionally, alternative input/output pairs
//! the player picks between ([`Choice`]).

use crate::core::{CardId, CardType, ResourceType, StandardProject, Tag};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a behavior fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    /// Player-activated card action
    Manual,
    /// Applied on play, or passively when its condition matches
    Auto,
    AutoCorporationFirstAction,
    AutoCorporationStart,
}

/// Domain occurrence an auto trigger listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerConditionType {
    OceanPlaced,
    TemperatureRaise,
    OxygenRaise,
    CityPlaced,
    GreeneryPlaced,
    TilePlaced,
    CardPlayed,
    StandardProjectPlayed,
    TagPlayed,
    ProductionIncreased,
    PlacementBonusGained,
    AlwaysActive,
    CardHandUpdated,
    PlayerEffectsChanged,
}

/// Whose resources/board an effect looks at or changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[default]
    SelfPlayer,
    SelfCard,
    AnyCard,
    AnyPlayer,
    Opponent,
    StealAnyPlayer,
    StealFromAnyCard,
    None,
}

/// Where a tile or effect applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyLocation {
    #[default]
    Anywhere,
    Mars,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCondition {
    #[serde(rename = "type")]
    pub kind: TriggerConditionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ApplyLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_resources: Vec<ResourceType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_card_types: Vec<CardType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_standard_projects: Vec<StandardProject>,
    /// Defaults to self-player when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

impl TriggerCondition {
    pub fn new(kind: TriggerConditionType) -> Self {
        TriggerCondition {
            kind,
            location: None,
            affected_tags: Vec::new(),
            affected_resources: Vec::new(),
            affected_card_types: Vec::new(),
            affected_standard_projects: Vec::new(),
            target: None,
        }
    }

    pub fn target(&self) -> Target {
        self.target.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<TriggerCondition>,
}

impl Trigger {
    pub fn manual() -> Self {
        Trigger {
            kind: TriggerType::Manual,
            condition: None,
        }
    }

    pub fn auto() -> Self {
        Trigger {
            kind: TriggerType::Auto,
            condition: None,
        }
    }

    pub fn on(condition: TriggerCondition) -> Self {
        Trigger {
            kind: TriggerType::Auto,
            condition: Some(condition),
        }
    }

    /// Auto trigger gated on a condition: a passive effect
    pub fn is_passive(&self) -> bool {
        self.kind == TriggerType::Auto && self.condition.is_some()
    }
}

/// Cap on how many times a per-condition may scale an output
///
/// Serialized as a plain integer: `-1` is unlimited, anything else a limit.
/// A missing field (`Option::None` on the owner) means no cap was declared,
/// which is distinct from an explicit unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum MaxTrigger {
    Unlimited,
    Limit(u32),
}

impl From<i32> for MaxTrigger {
    fn from(value: i32) -> Self {
        if value < 0 {
            MaxTrigger::Unlimited
        } else {
            MaxTrigger::Limit(value as u32)
        }
    }
}

impl From<MaxTrigger> for i32 {
    fn from(value: MaxTrigger) -> Self {
        match value {
            MaxTrigger::Unlimited => -1,
            MaxTrigger::Limit(n) => n as i32,
        }
    }
}

impl MaxTrigger {
    pub fn cap(&self, times: i32) -> i32 {
        match self {
            MaxTrigger::Unlimited => times,
            MaxTrigger::Limit(n) => times.min(*n as i32),
        }
    }
}

/// Scaling rule: "`amount` per `amount` counted things"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerCondition {
    #[serde(rename = "type")]
    pub resource: ResourceType,
    pub amount: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ApplyLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

impl PerCondition {
    pub fn new(resource: ResourceType, amount: i32) -> Self {
        PerCondition {
            resource,
            amount,
            location: None,
            target: None,
            tag: None,
        }
    }
}

/// One resource quantity paid or gained by a behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCondition {
    #[serde(rename = "type")]
    pub resource: ResourceType,
    pub amount: i32,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_resources: Vec<ResourceType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_card_types: Vec<CardType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_standard_projects: Vec<StandardProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trigger: Option<MaxTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per: Option<PerCondition>,
}

impl ResourceCondition {
    pub fn new(resource: ResourceType, amount: i32, target: Target) -> Self {
        ResourceCondition {
            resource,
            amount,
            target,
            affected_resources: Vec::new(),
            affected_tags: Vec::new(),
            affected_card_types: Vec::new(),
            affected_standard_projects: Vec::new(),
            max_trigger: None,
            per: None,
        }
    }

    /// Shorthand for the common self-player condition
    pub fn own(resource: ResourceType, amount: i32) -> Self {
        Self::new(resource, amount, Target::SelfPlayer)
    }

    pub fn with_per(mut self, per: PerCondition) -> Self {
        self.per = Some(per);
        self
    }

    pub fn with_max_trigger(mut self, max: MaxTrigger) -> Self {
        self.max_trigger = Some(max);
        self
    }
}

impl fmt::Display for ResourceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.resource)
    }
}

/// An alternative input/output pair of a behavior
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ResourceCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ResourceCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardBehavior {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ResourceCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ResourceCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl CardBehavior {
    pub fn is_manual(&self) -> bool {
        self.triggers.iter().any(|t| t.kind == TriggerType::Manual)
    }

    /// Auto trigger without a condition: resolved once when the card is played
    pub fn is_immediate(&self) -> bool {
        self.triggers
            .iter()
            .any(|t| t.kind == TriggerType::Auto && t.condition.is_none())
    }

    pub fn is_passive(&self) -> bool {
        self.triggers.iter().any(Trigger::is_passive)
    }

    pub fn is_corporation_start(&self) -> bool {
        self.triggers.iter().any(|t| {
            matches!(
                t.kind,
                TriggerType::AutoCorporationStart | TriggerType::AutoCorporationFirstAction
            )
        })
    }

    /// Standing modifier (discount, payment substitute) the player keeps
    /// after the card resolves
    pub fn is_static(&self) -> bool {
        !self.is_manual()
            && self.outputs.iter().any(|o| {
                matches!(
                    o.resource,
                    ResourceType::Discount
                        | ResourceType::PaymentSubstitute
                        | ResourceType::ValueModifier
                )
            })
    }

    /// Base inputs/outputs plus those of the selected choice
    ///
    /// An out-of-range choice index is an error; `None` selects no choice.
    pub fn inputs_outputs(
        &self,
        choice: Option<usize>,
    ) -> Result<(Vec<ResourceCondition>, Vec<ResourceCondition>)> {
        let mut inputs = self.inputs.clone();
        let mut outputs = self.outputs.clone();

        if let Some(index) = choice {
            let selected = self.choices.get(index).ok_or_else(|| {
                EngineError::InvalidAction(format!(
                    "choice index {index} out of range ({} choices)",
                    self.choices.len()
                ))
            })?;
            inputs.extend(selected.inputs.iter().cloned());
            outputs.extend(selected.outputs.iter().cloned());
        }

        Ok((inputs, outputs))
    }

    /// Auto effects are gifts: they may not ask the player to pay
    pub fn validate(&self) -> Result<()> {
        let auto = self.triggers.iter().any(|t| t.kind == TriggerType::Auto);
        let pays = !self.inputs.is_empty() || self.choices.iter().any(|c| !c.inputs.is_empty());
        if auto && pays {
            return Err(EngineError::InvalidCardFormat(
                "auto-triggered behavior may not declare inputs".to_string(),
            ));
        }
        Ok(())
    }
}

/// A passive behavior registered for a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEffect {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
}

/// A manual behavior the player may activate once per generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
    pub play_count: u32,
}
