//! Card payments: credits plus steel/titanium and player-specific substitutes

use crate::core::{Card, ResourceType, Resources, Tag};
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Credit value of one steel when paying for a building card
pub const STEEL_VALUE: i32 = 2;
/// Credit value of one titanium when paying for a space card
pub const TITANIUM_VALUE: i32 = 3;

/// An alternative resource a player may spend as credits (e.g. heat 1:1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubstitute {
    pub resource: ResourceType,
    pub conversion_rate: i32,
}

/// How a player is paying for a card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardPayment {
    #[serde(default)]
    pub credits: i32,
    #[serde(default)]
    pub steel: i32,
    #[serde(default)]
    pub titanium: i32,
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub substitutes: FxHashMap<ResourceType, i32>,
}

impl CardPayment {
    pub fn credits(amount: i32) -> Self {
        CardPayment {
            credits: amount,
            ..Default::default()
        }
    }

    /// No negative amounts anywhere
    pub fn validate(&self) -> Result<()> {
        let negative = [
            (ResourceType::Credits, self.credits),
            (ResourceType::Steel, self.steel),
            (ResourceType::Titanium, self.titanium),
        ]
        .into_iter()
        .chain(self.substitutes.iter().map(|(r, a)| (*r, *a)))
        .find(|(_, amount)| *amount < 0);

        if let Some((resource, amount)) = negative {
            return Err(EngineError::InvalidAction(format!(
                "payment {resource} cannot be negative: {amount}"
            )));
        }
        Ok(())
    }

    /// Credit value of the payment given the player's substitute rates
    pub fn total_value(&self, substitutes: &[PaymentSubstitute]) -> i32 {
        let base = self.credits + self.steel * STEEL_VALUE + self.titanium * TITANIUM_VALUE;
        let extra: i32 = self
            .substitutes
            .iter()
            .filter_map(|(resource, amount)| {
                substitutes
                    .iter()
                    .find(|s| s.resource == *resource)
                    .map(|s| amount * s.conversion_rate)
            })
            .sum();
        base + extra
    }

    /// Whether the player actually holds everything the payment spends
    pub fn can_afford(&self, resources: &Resources) -> Result<()> {
        self.validate()?;
        for (resource, amount) in [
            (ResourceType::Credits, self.credits),
            (ResourceType::Steel, self.steel),
            (ResourceType::Titanium, self.titanium),
        ] {
            let available = resources.get(resource).unwrap_or(0);
            if available < amount {
                return Err(EngineError::insufficient(resource, amount, available));
            }
        }
        for (resource, amount) in &self.substitutes {
            let available = resources.get(*resource).unwrap_or(0);
            if available < *amount {
                return Err(EngineError::insufficient(resource, *amount, available));
            }
        }
        Ok(())
    }

    /// Whether the payment covers `card`'s cost using only permitted methods
    ///
    /// Steel needs a building tag, titanium a space tag. Overpaying is
    /// allowed; the excess is lost.
    pub fn covers_cost(&self, card: &Card, cost: i32, substitutes: &[PaymentSubstitute]) -> Result<()> {
        self.validate()?;
        if self.steel > 0 && !card.has_tag(Tag::Building) {
            return Err(EngineError::InvalidAction(format!(
                "{} has no building tag, cannot pay with steel",
                card.name
            )));
        }
        if self.titanium > 0 && !card.has_tag(Tag::Space) {
            return Err(EngineError::InvalidAction(format!(
                "{} has no space tag, cannot pay with titanium",
                card.name
            )));
        }
        if let Some(resource) = self
            .substitutes
            .keys()
            .find(|r| !substitutes.iter().any(|s| s.resource == **r))
        {
            return Err(EngineError::InvalidAction(format!(
                "{resource} is not an allowed payment substitute"
            )));
        }

        let value = self.total_value(substitutes);
        if value < cost {
            return Err(EngineError::insufficient("payment", cost, value));
        }
        Ok(())
    }
}
