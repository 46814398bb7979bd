//! Action history and triggered-effect records
//!
//! The log is append-only. It exists for auditing and for clients that want
//! to show "what just happened"; nothing in the rules reads it back.

use crate::core::{PlayerId, ResourceCondition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Card,
    CardAction,
    StandardProject,
    Conversion,
    PassiveEffect,
    TileBonus,
    /// Passing, skipping and production choices
    Turn,
}

/// One completed player action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub generation: u32,
    pub player: PlayerId,
    /// Card id, project name or conversion name
    pub source: String,
    pub source_type: SourceType,
    pub description: String,
}

/// Outputs a card behavior produced, as applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredEffect {
    pub card_name: String,
    pub player: PlayerId,
    pub outputs: Vec<ResourceCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
    enabled: bool,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            records: Vec::new(),
            enabled: true,
        }
    }

    /// A log that drops everything (benchmarks)
    pub fn disabled() -> Self {
        ActionLog {
            records: Vec::new(),
            enabled: false,
        }
    }

    pub fn log(&mut self, record: ActionRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_player<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = &'a ActionRecord> {
        self.records.iter().filter(move |r| &r.player == player)
    }
}
