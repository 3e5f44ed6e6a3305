//! Catalog store.
//!
//! The catalog is built once at startup, validated, and never mutated
//! afterwards. It is shared between the HTTP layer, the view controller and
//! the assistant through an `Arc<Catalog>`.

mod dataset;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Group, Player, Skill};

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("Player {player}: {field} = {value} is outside 0..=10")]
    StatOutOfRange {
        player: String,
        field: &'static str,
        value: u8,
    },

    #[error("Missing required field {field} on {kind} {context}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
        context: String,
    },
}

/// On-disk shape of an externalized catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// The immutable player and skill catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<Group>,
    skills: Vec<Skill>,
    skill_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(groups: Vec<Group>, skills: Vec<Skill>) -> Result<Self, CatalogError> {
        validate(&groups, &skills)?;

        let skill_index = skills
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        let catalog = Self {
            groups,
            skills,
            skill_index,
        };

        for (_, player) in catalog.players() {
            for name in &player.skills {
                if catalog.skill(name).is_none() {
                    debug!("Player {} references unknown skill '{}'", player.id, name);
                }
            }
        }

        Ok(catalog)
    }

    /// The compiled-in dataset.
    pub fn builtin() -> Self {
        let (groups, skills) = dataset::builtin();
        Self::new(groups, skills).unwrap_or_else(|e| panic!("built-in catalog is invalid: {}", e))
    }

    /// Load an externalized catalog. `.toml` files are parsed as TOML,
    /// anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let file: CatalogFile = if is_toml {
            toml::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?
        } else {
            serde_json::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?
        };

        let catalog = Self::new(file.groups, file.skills)?;
        info!(
            "Loaded catalog from {}: {} groups, {} players, {} skills",
            path.display(),
            catalog.groups.len(),
            catalog.player_count(),
            catalog.skills.len()
        );
        Ok(catalog)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Resolve a skill by name. Unknown names are not an error.
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skill_index.get(name).map(|&i| &self.skills[i])
    }

    /// Find a player and the group that owns it.
    pub fn player(&self, id: &str) -> Option<(&Group, &Player)> {
        self.players().find(|(_, p)| p.id == id)
    }

    /// Every player with its group, in dataset order.
    pub fn players(&self) -> impl Iterator<Item = (&Group, &Player)> {
        self.groups
            .iter()
            .flat_map(|g| g.players.iter().map(move |p| (g, p)))
    }

    pub fn player_count(&self) -> usize {
        self.groups.iter().map(|g| g.players.len()).sum()
    }

    /// Snapshot in the externalized file shape.
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            groups: self.groups.clone(),
            skills: self.skills.clone(),
        }
    }
}

fn require(
    value: &str,
    kind: &'static str,
    field: &'static str,
    context: &str,
) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::MissingField {
            kind,
            field,
            context: context.to_string(),
        });
    }
    Ok(())
}

fn validate(groups: &[Group], skills: &[Skill]) -> Result<(), CatalogError> {
    let mut group_ids = HashSet::new();
    let mut player_ids = HashSet::new();

    for (i, group) in groups.iter().enumerate() {
        let context = format!("#{}", i);
        require(&group.id, "group", "id", &context)?;
        require(&group.title, "group", "title", &group.id)?;
        if !group_ids.insert(group.id.as_str()) {
            return Err(CatalogError::Duplicate {
                kind: "group",
                id: group.id.clone(),
            });
        }

        for player in &group.players {
            require(&player.id, "player", "id", &group.id)?;
            require(&player.name, "player", "name", &player.id)?;
            if !player_ids.insert(player.id.as_str()) {
                return Err(CatalogError::Duplicate {
                    kind: "player",
                    id: player.id.clone(),
                });
            }
            if let Some((field, value)) = player.stats.out_of_range() {
                return Err(CatalogError::StatOutOfRange {
                    player: player.id.clone(),
                    field: field.label(),
                    value,
                });
            }
        }
    }

    let mut skill_names = HashSet::new();
    for (i, skill) in skills.iter().enumerate() {
        require(&skill.name, "skill", "name", &format!("#{}", i))?;
        if !skill_names.insert(skill.name.as_str()) {
            return Err(CatalogError::Duplicate {
                kind: "skill",
                id: skill.name.clone(),
            });
        }
    }

    Ok(())
}
