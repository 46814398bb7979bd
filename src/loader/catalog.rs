//! Card catalog loading
//!
//! A catalog is either one JSON file or a directory tree of them. Each file
//! holds a single card object or an array of cards. Files are discovered with
//! jwalk, read concurrently through tokio, and parsed in parallel on rayon.
//! Cards that parse but fail validation are reported, not fatal.

use crate::core::Card;
use crate::loader::InMemoryCardRegistry;
use crate::{EngineError, Result};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::time::Instant;

/// A card definition that was read but refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCard {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub cards: Vec<Card>,
    pub rejected: Vec<RejectedCard>,
    pub files: usize,
    pub duration: std::time::Duration,
}

impl Catalog {
    pub fn into_registry(self) -> Result<InMemoryCardRegistry> {
        InMemoryCardRegistry::new(self.cards)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CardFile {
    Many(Vec<Card>),
    One(Box<Card>),
}

/// Parse one file's contents (a card or an array of cards)
pub fn parse_cards(contents: &str) -> Result<Vec<Card>> {
    match serde_json::from_str::<CardFile>(contents)? {
        CardFile::Many(cards) => Ok(cards),
        CardFile::One(card) => Ok(vec![*card]),
    }
}

/// Load every card under `path`
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let start = Instant::now();
    let path = path.as_ref().to_path_buf();

    let metadata = tokio::fs::metadata(&path).await?;
    let paths = if metadata.is_dir() {
        discover(path).await?
    } else {
        vec![path]
    };

    // Read concurrently
    let mut tasks = Vec::with_capacity(paths.len());
    for path in paths {
        tasks.push(tokio::spawn(async move {
            let contents = tokio::fs::read_to_string(&path).await;
            (path, contents)
        }));
    }
    let mut files = Vec::with_capacity(tasks.len());
    for task in tasks {
        let (path, contents) = task.await?;
        files.push((path, contents?));
    }

    // Parse and validate in parallel
    let parsed: Vec<(PathBuf, Result<Vec<Card>>)> = files
        .par_iter()
        .map(|(path, contents)| {
            let cards = parse_cards(contents).map_err(|e| {
                EngineError::InvalidCardFormat(format!("{}: {e}", path.display()))
            });
            (path.clone(), cards)
        })
        .collect();

    let mut catalog = Catalog {
        files: files.len(),
        ..Default::default()
    };
    for (path, cards) in parsed {
        let cards = cards?;
        for card in cards {
            match card.validate() {
                Ok(()) => catalog.cards.push(card),
                Err(e) => catalog.rejected.push(RejectedCard {
                    source: path.clone(),
                    reason: e.to_string(),
                }),
            }
        }
    }

    catalog.duration = start.elapsed();
    Ok(catalog)
}

/// Every `.json` file under `root`, sorted for a stable catalog order
async fn discover(root: PathBuf) -> Result<Vec<PathBuf>> {
    let paths = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in jwalk::WalkDir::new(&root).sort(true) {
            let entry = entry.map_err(|e| EngineError::IoError(e.into()))?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "json")
            {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    })
    .await??;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_array() {
        let one = r#"{"id": "P01", "name": "Comet", "type": "event", "cost": 21}"#;
        assert_eq!(parse_cards(one).unwrap().len(), 1);

        let many = r#"[
            {"id": "P01", "name": "Comet", "type": "event", "cost": 21},
            {"id": "P02", "name": "Mine", "type": "automated", "cost": 4}
        ]"#;
        assert_eq!(parse_cards(many).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_cards("{\"id\": 3}").is_err());
    }
}
