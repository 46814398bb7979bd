//! Read-only card lookup

use crate::core::{Card, CardId};
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Catalog access the engine needs; loaded once, never mutated
pub trait CardRegistry: Send + Sync {
    fn get_by_id(&self, id: &CardId) -> Result<Arc<Card>>;

    fn get_all(&self) -> Vec<Arc<Card>>;

    /// Case- and accent-insensitive name lookup
    fn get_by_name(&self, name: &str) -> Option<Arc<Card>>;
}

/// Lowercase ASCII form used for name lookups ("Ganymède" -> "ganymede")
pub fn normalize_name(name: &str) -> String {
    deunicode::deunicode(name.trim()).to_lowercase()
}

#[derive(Debug, Default)]
pub struct InMemoryCardRegistry {
    /// Catalog order
    cards: Vec<Arc<Card>>,
    by_id: FxHashMap<CardId, Arc<Card>>,
    by_name: FxHashMap<String, Arc<Card>>,
}

impl InMemoryCardRegistry {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Result<Self> {
        let mut registry = InMemoryCardRegistry::default();
        for card in cards {
            registry.insert(card)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, card: Card) -> Result<()> {
        if self.by_id.contains_key(&card.id) {
            return Err(EngineError::InvalidCardFormat(format!(
                "duplicate card id {}",
                card.id
            )));
        }
        let card = Arc::new(card);
        self.by_name
            .entry(normalize_name(&card.name))
            .or_insert_with(|| Arc::clone(&card));
        self.by_id.insert(card.id.clone(), Arc::clone(&card));
        self.cards.push(card);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardRegistry for InMemoryCardRegistry {
    fn get_by_id(&self, id: &CardId) -> Result<Arc<Card>> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("card", id))
    }

    fn get_all(&self) -> Vec<Arc<Card>> {
        self.cards.clone()
    }

    fn get_by_name(&self, name: &str) -> Option<Arc<Card>> {
        self.by_name.get(&normalize_name(name)).cloned()
    }
}
