//! Named skills referenced by players.

use serde::{Deserialize, Serialize};

use super::Rank;

/// A catalog skill. The name is the key players use to reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
}

impl Skill {
    pub fn new(name: impl Into<String>, description: impl Into<String>, rank: Option<Rank>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_rank_optional() {
        let skill: Skill = serde_json::from_str(r#"{"name": "n", "description": "d"}"#).unwrap();
        assert!(skill.rank.is_none());

        let skill: Skill =
            serde_json::from_str(r#"{"name": "n", "description": "d", "rank": "A"}"#).unwrap();
        assert_eq!(skill.rank, Some(Rank::A));
    }

    #[test]
    fn test_skill_unknown_rank_rejected() {
        let json = r#"{"name": "n", "description": "d", "rank": "Z"}"#;
        assert!(serde_json::from_str::<Skill>(json).is_err());
    }
}
