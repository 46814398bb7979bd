//! Card catalog loading and lookup
//!
//! JSON card definitions are loaded once into an in-memory registry.

pub mod catalog;
pub mod registry;

pub use catalog::{load_catalog, parse_cards, Catalog, RejectedCard};
pub use registry::{normalize_name, CardRegistry, InMemoryCardRegistry};
