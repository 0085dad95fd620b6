//! Ratagraph: a collaborative-filtering recommendation engine backed by an
//! embedded key-value store.
//!
//! Given a population of users who express binary ratings (like or dislike)
//! on items, this crate persists the bipartite rating graph, maintains a
//! user-to-user similarity index derived from overlapping ratings, and
//! produces per-user ranked suggestions of unrated items based on the
//! opinions of similar users.
//!
//! # Example
//! ```no_run
//! use ratagraph::{Engine, EngineConfig, Item, User};
//!
//! let engine = Engine::open(EngineConfig::new("ratings.redb"))?;
//! let niko = User::new("niko");
//! let portland = Item::new("portland");
//! engine.like(&niko, &portland)?;
//! let suggestions = engine.get_suggestions(&niko)?;
//! # Ok::<(), ratagraph::Error>(())
//! ```

mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ids;
pub mod model;
mod store;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use ids::Id;
pub use model::{Item, Rating, Score, Similarity, Suggestion, User};
