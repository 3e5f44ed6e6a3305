//! Player profiles.

use serde::{Deserialize, Serialize};

use super::StatBlock;

/// A player profile. Ids are unique across the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub stats: StatBlock,
    pub description: String,

    /// Free-form grip/style tag (e.g. "penhold")
    pub style: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<String>,

    /// Explicit specialty; when absent it is derived from the stats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,

    /// Skill names, resolved against the catalog's skill list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stats: StatBlock,
        description: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stats,
            description: description.into(),
            style: style.into(),
            weaknesses: Vec::new(),
            specialty: None,
            skills: Vec::new(),
        }
    }

    pub fn with_weaknesses(mut self, weaknesses: &[&str]) -> Self {
        self.weaknesses = weaknesses.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }
}
