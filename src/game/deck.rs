//! Project and corporation draw piles
//!
//! Shuffling uses a ChaCha12 generator so a seeded game deals the same
//! cards every time.

use crate::core::{Card, CardId};
use crate::{EngineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Top of the pile is the end of the vector
    project_cards: Vec<CardId>,
    corporations: Vec<CardId>,
    discard_pile: Vec<CardId>,
    drawn_count: usize,
    shuffle_count: usize,
    rng: ChaCha12Rng,
}

impl Deck {
    pub fn new(project_cards: Vec<CardId>, corporations: Vec<CardId>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_entropy(),
        };
        let mut deck = Deck {
            project_cards,
            corporations,
            discard_pile: Vec::new(),
            drawn_count: 0,
            shuffle_count: 0,
            rng,
        };
        deck.shuffle();
        deck
    }

    /// Build from catalog cards, corporations into their own pile
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>, seed: Option<u64>) -> Self {
        let (corporations, projects): (Vec<&Card>, Vec<&Card>) =
            cards.into_iter().partition(|c| c.is_corporation());
        Deck::new(
            projects.into_iter().map(|c| c.id.clone()).collect(),
            corporations.into_iter().map(|c| c.id.clone()).collect(),
            seed,
        )
    }

    pub fn empty() -> Self {
        Deck::new(Vec::new(), Vec::new(), Some(0))
    }

    pub fn shuffle(&mut self) {
        self.project_cards.shuffle(&mut self.rng);
        self.corporations.shuffle(&mut self.rng);
        self.shuffle_count += 1;
    }

    pub fn remaining(&self) -> usize {
        self.project_cards.len()
    }

    /// Cards that could still be drawn after a reshuffle
    pub fn available(&self) -> usize {
        self.project_cards.len() + self.discard_pile.len()
    }

    pub fn discard_pile(&self) -> &[CardId] {
        &self.discard_pile
    }

    pub fn drawn_count(&self) -> usize {
        self.drawn_count
    }

    pub fn shuffle_count(&self) -> usize {
        self.shuffle_count
    }

    /// Draw exactly `count` project cards
    ///
    /// The discard pile is shuffled back in when the draw pile runs short.
    /// Fails without drawing anything if even that is not enough.
    pub fn draw(&mut self, count: usize) -> Result<Vec<CardId>> {
        if count > self.available() {
            return Err(EngineError::DeckExhausted {
                requested: count,
                available: self.available(),
            });
        }
        if count > self.project_cards.len() {
            self.reshuffle_discards();
        }
        let split = self.project_cards.len() - count;
        let mut drawn = self.project_cards.split_off(split);
        drawn.reverse();
        self.drawn_count += drawn.len();
        Ok(drawn)
    }

    /// Draw as many as possible, up to `count`
    pub fn draw_up_to(&mut self, count: usize) -> Vec<CardId> {
        let count = count.min(self.available());
        // cannot fail: count is bounded by what is available
        self.draw(count).unwrap_or_default()
    }

    pub fn draw_corporations(&mut self, count: usize) -> Vec<CardId> {
        let split = self.corporations.len().saturating_sub(count);
        let mut drawn = self.corporations.split_off(split);
        drawn.reverse();
        drawn
    }

    pub fn discard(&mut self, cards: impl IntoIterator<Item = CardId>) {
        self.discard_pile.extend(cards);
    }

    fn reshuffle_discards(&mut self) {
        let mut discards = std::mem::take(&mut self.discard_pile);
        discards.shuffle(&mut self.rng);
        // discards go underneath what is left
        discards.append(&mut self.project_cards);
        self.project_cards = discards;
        self.shuffle_count += 1;
    }
}
