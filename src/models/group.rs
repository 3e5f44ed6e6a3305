//! Player groups (school years, cohorts).

use serde::{Deserialize, Serialize};

use super::Player;

/// A named partition of the roster. Each player belongs to exactly one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Short id, also the default display label
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Group {
    pub fn new(id: impl Into<String>, title: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            players,
        }
    }

    /// Selector label: the id alone, or id and title when they differ.
    pub fn label(&self) -> String {
        if self.id == self.title {
            self.id.clone()
        } else {
            format!("{} · {}", self.id, self.title)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
