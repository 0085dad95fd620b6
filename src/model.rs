//! Entity records for the rating graph.

use crate::ids::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A person who rates items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    /// Transient cache of this user's ratings, populated by graph queries
    /// that need it (e.g. [`crate::graph::queries::get_rating_neighbors`]).
    /// Never persisted as part of the user record itself.
    #[serde(skip)]
    pub ratings: HashMap<Id, Rating>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            ratings: HashMap::new(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A thing that can be rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Id,
    pub name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A user's binary opinion about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum Score {
    Like = 1,
    Dislike = -1,
}

/// An item paired with the score a user gave it. Ephemeral: not a primary
/// persisted record, assembled on read from the like/dislike keyspaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub item: Item,
    pub score: Score,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let score = match self.score {
            Score::Like => "like",
            Score::Dislike => "dislike",
        };
        write!(f, "{}: {}", self.item.name, score)
    }
}

/// The agreement-ratio similarity between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub user: User,
    pub index: f64,
}

/// A candidate item surfaced for a user, with its weighted suggestion index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub item: Item,
    pub index: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_display() {
        let item = Item::new("phoenix");
        let rating = Rating {
            item,
            score: Score::Dislike,
        };
        assert_eq!(rating.to_string(), "phoenix: dislike");
    }

    #[test]
    fn test_ratings_cache_not_serialized() {
        let mut user = User::new("niko");
        user.ratings.insert(
            Id::new(),
            Rating {
                item: Item::new("phoenix"),
                score: Score::Like,
            },
        );
        let encoded = serde_json::to_string(&user).unwrap();
        assert!(!encoded.contains("phoenix"));
        let decoded: User = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.ratings.is_empty());
    }
}
