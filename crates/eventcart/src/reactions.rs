//! # Reactions
//!
//! Every collaborator can leave one emoji on each catalog item. Reactions are
//! ranked through a fixed weight table and summed into an item's score, which
//! orders both the catalog and the cart.
//!
//! ## Toggle Semantics
//!
//! - No reaction yet: the emoji is recorded.
//! - Same emoji again: the user's reaction is removed (un-react).
//! - Different emoji: it replaces the previous one.
//!
//! A user therefore never has two reactions on the same item.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Emoji weights, best first. Emojis not listed weigh 0.
pub const REACTION_WEIGHTS: [(&str, i32); 8] = [
    ("😍", 4),
    ("🔥", 3),
    ("👍", 2),
    ("🙂", 1),
    ("🤔", 0),
    ("😐", -1),
    ("👎", -2),
    ("🚫", -3),
];

pub fn emoji_weight(emoji: &str) -> i32 {
    REACTION_WEIGHTS
        .iter()
        .find(|(e, _)| *e == emoji)
        .map(|(_, weight)| *weight)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Replaced,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: usize,
    pub users: Vec<String>,
}

/// Item id → (user → emoji).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reactions {
    by_item: HashMap<String, BTreeMap<String, String>>,
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate score of an item. Items without reactions score 0.
    pub fn score(&self, item_id: &str) -> i32 {
        self.by_item
            .get(item_id)
            .map(|users| users.values().map(|emoji| emoji_weight(emoji)).sum())
            .unwrap_or(0)
    }

    pub fn reaction_of(&self, item_id: &str, user: &str) -> Option<&str> {
        self.by_item
            .get(item_id)
            .and_then(|users| users.get(user))
            .map(String::as_str)
    }

    pub fn for_item(&self, item_id: &str) -> Option<&BTreeMap<String, String>> {
        self.by_item.get(item_id)
    }

    pub fn toggle(&mut self, item_id: &str, user: &str, emoji: &str) -> ReactionChange {
        let users = self.by_item.entry(item_id.to_string()).or_default();

        let change = match users.get(user) {
            Some(current) if current == emoji => {
                users.remove(user);
                ReactionChange::Removed
            }
            Some(_) => {
                users.insert(user.to_string(), emoji.to_string());
                ReactionChange::Replaced
            }
            None => {
                users.insert(user.to_string(), emoji.to_string());
                ReactionChange::Added
            }
        };

        if users.is_empty() {
            self.by_item.remove(item_id);
        }
        change
    }

    /// Per-emoji counts for an item: table emojis first in weight order,
    /// then any unknown emojis alphabetically.
    pub fn summary(&self, item_id: &str) -> Vec<ReactionCount> {
        let Some(users) = self.by_item.get(item_id) else {
            return Vec::new();
        };

        let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (user, emoji) in users {
            grouped.entry(emoji.as_str()).or_default().push(user.clone());
        }

        let mut counts = Vec::new();
        for (emoji, _) in REACTION_WEIGHTS.iter() {
            if let Some(users) = grouped.remove(emoji) {
                counts.push(ReactionCount {
                    emoji: emoji.to_string(),
                    count: users.len(),
                    users,
                });
            }
        }
        for (emoji, users) in grouped {
            counts.push(ReactionCount {
                emoji: emoji.to_string(),
                count: users.len(),
                users,
            });
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }
}
