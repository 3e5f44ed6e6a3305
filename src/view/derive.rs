//! Derived view data.
//!
//! Every function here is a pure projection of the catalog and is called
//! again on each render.

use serde::Serialize;

use crate::calculate::{self, RankedPlayer};
use crate::catalog::Catalog;
use crate::models::{Group, Rank, Skill, StatBlock};
use crate::radar::{RadarChart, RadarGeometry};

use super::ViewError;

pub const NO_GROUP_SELECTED: &str = "Select a group to see its players";
pub const EMPTY_GROUP: &str = "No players registered in this group";
pub const NO_WEAKNESSES: &str = "No critical weaknesses mapped";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub title: String,
    pub label: String,
    pub player_count: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            title: group.title.clone(),
            label: group.label(),
            player_count: group.players.len(),
        }
    }
}

/// Grid/table card for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCard {
    pub id: String,
    pub name: String,
    pub style: String,
    pub group_id: String,
    pub stats: StatBlock,
    pub average: f64,
    pub average_display: String,
    pub rank: Rank,
}

impl From<&RankedPlayer<'_>> for PlayerCard {
    fn from(ranked: &RankedPlayer<'_>) -> Self {
        Self {
            id: ranked.player.id.clone(),
            name: ranked.player.name.clone(),
            style: ranked.player.style.clone(),
            group_id: ranked.group.id.clone(),
            stats: ranked.player.stats,
            average: ranked.average,
            average_display: calculate::format_average(ranked.average),
            rank: ranked.rank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayersView {
    NoGroupSelected {
        message: String,
    },
    Empty {
        group: GroupSummary,
        message: String,
    },
    Players {
        group: GroupSummary,
        players: Vec<PlayerCard>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based position in the sorted table
    pub position: usize,
    /// Zero-padded display form, e.g. "01"
    pub position_label: String,
    #[serde(flatten)]
    pub player: PlayerCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSkill {
    pub name: String,
    /// `None` when the skill is unranked or not in the catalog
    pub rank: Option<Rank>,
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub card: PlayerCard,
    pub group_title: String,
    pub description: String,
    pub specialty: String,
    pub skills: Vec<ResolvedSkill>,
    pub radar: RadarChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Weaknesses {
    List { items: Vec<String> },
    NoneRecorded { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaknessesView {
    pub player_id: String,
    pub player_name: String,
    pub weaknesses: Weaknesses,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillPage {
    pub index: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub skill: Skill,
}

pub fn group_summaries(catalog: &Catalog) -> Vec<GroupSummary> {
    catalog.groups().iter().map(GroupSummary::from).collect()
}

/// Players of one group, weakest first.
pub fn players_view(catalog: &Catalog, group_id: Option<&str>) -> Result<PlayersView, ViewError> {
    let Some(id) = group_id else {
        return Ok(PlayersView::NoGroupSelected {
            message: NO_GROUP_SELECTED.to_string(),
        });
    };

    let group = catalog
        .group(id)
        .ok_or_else(|| ViewError::UnknownGroup(id.to_string()))?;

    if group.is_empty() {
        return Ok(PlayersView::Empty {
            group: GroupSummary::from(group),
            message: EMPTY_GROUP.to_string(),
        });
    }

    let mut ranked = calculate::rank_group(group);
    calculate::sort_ascending(&mut ranked);

    Ok(PlayersView::Players {
        group: GroupSummary::from(group),
        players: ranked.iter().map(PlayerCard::from).collect(),
    })
}

/// All players across all groups, strongest first.
pub fn ranking_view(catalog: &Catalog) -> Vec<RankingRow> {
    let mut ranked: Vec<RankedPlayer<'_>> = catalog
        .players()
        .map(|(g, p)| RankedPlayer::new(g, p))
        .collect();
    calculate::sort_descending(&mut ranked);

    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| RankingRow {
            position: i + 1,
            position_label: format!("{:02}", i + 1),
            player: PlayerCard::from(r),
        })
        .collect()
}

pub fn detail_view(
    catalog: &Catalog,
    geometry: &RadarGeometry,
    player_id: &str,
) -> Result<PlayerDetail, ViewError> {
    let (group, player) = catalog
        .player(player_id)
        .ok_or_else(|| ViewError::UnknownPlayer(player_id.to_string()))?;
    let ranked = RankedPlayer::new(group, player);

    let skills = player
        .skills
        .iter()
        .map(|name| {
            let found = catalog.skill(name);
            ResolvedSkill {
                name: name.clone(),
                rank: found.and_then(|s| s.rank),
                known: found.is_some(),
            }
        })
        .collect();

    Ok(PlayerDetail {
        card: PlayerCard::from(&ranked),
        group_title: group.title.clone(),
        description: player.description.clone(),
        specialty: calculate::specialty(player),
        skills,
        radar: geometry.chart(&player.stats),
    })
}

pub fn weaknesses_view(catalog: &Catalog, player_id: &str) -> Result<WeaknessesView, ViewError> {
    let (_, player) = catalog
        .player(player_id)
        .ok_or_else(|| ViewError::UnknownPlayer(player_id.to_string()))?;

    let weaknesses = if player.weaknesses.is_empty() {
        Weaknesses::NoneRecorded {
            message: NO_WEAKNESSES.to_string(),
        }
    } else {
        Weaknesses::List {
            items: player.weaknesses.clone(),
        }
    };

    Ok(WeaknessesView {
        player_id: player.id.clone(),
        player_name: player.name.clone(),
        weaknesses,
    })
}

/// Clamp a requested page into `0..count`. With no skills the page is 0.
pub fn clamp_skill_index(index: usize, count: usize) -> usize {
    index.min(count.saturating_sub(1))
}

/// One page of the skill book. `None` only when there are no skills.
pub fn skill_page(catalog: &Catalog, index: usize) -> Option<SkillPage> {
    let total = catalog.skills().len();
    let index = clamp_skill_index(index, total);
    let skill = catalog.skills().get(index)?.clone();

    Some(SkillPage {
        index,
        total,
        has_prev: index > 0,
        has_next: index + 1 < total,
        skill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Player;
    use pretty_assertions::assert_eq;

    fn scenario_catalog() -> Catalog {
        let dutra = Player::new("9-dutra", "Dutra", StatBlock::new(7, 9, 8, 6, 8), "d", "classic")
            .with_skills(&["Quick Learning", "Ghost Skill"]);
        let enzio = Player::new("9-enzio", "Enzio", StatBlock::new(4, 5, 2, 0, 3), "e", "horizontal");
        Catalog::new(
            vec![
                Group::new("6", "6th grade", vec![]),
                Group::new("9", "9th grade", vec![dutra, enzio]),
            ],
            vec![
                Skill::new("Quick Learning", "fast", Some(Rank::S)),
                Skill::new("Unranked", "none", None),
            ],
        )
        .unwrap()
    }

    fn ids(cards: &[PlayerCard]) -> Vec<&str> {
        cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_players_view_ascending() {
        let catalog = scenario_catalog();
        match players_view(&catalog, Some("9")).unwrap() {
            PlayersView::Players { group, players } => {
                assert_eq!(group.id, "9");
                assert_eq!(ids(&players), vec!["9-enzio", "9-dutra"]);
                assert_eq!(players[0].rank, Rank::D);
                assert_eq!(players[1].rank, Rank::A);
                assert_eq!(players[1].average_display, "7.6");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_players_view_empty_group() {
        let catalog = scenario_catalog();
        let view = players_view(&catalog, Some("6")).unwrap();
        assert!(matches!(view, PlayersView::Empty { ref message, .. } if message == EMPTY_GROUP));
    }

    #[test]
    fn test_players_view_no_selection() {
        let catalog = scenario_catalog();
        assert!(matches!(
            players_view(&catalog, None).unwrap(),
            PlayersView::NoGroupSelected { .. }
        ));
    }

    #[test]
    fn test_players_view_unknown_group() {
        let catalog = scenario_catalog();
        assert!(matches!(
            players_view(&catalog, Some("42")),
            Err(ViewError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_ranking_view_descending_with_labels() {
        let catalog = scenario_catalog();
        let rows = ranking_view(&catalog);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player.id, "9-dutra");
        assert_eq!(rows[0].position_label, "01");
        assert_eq!(rows[1].player.id, "9-enzio");
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].player.group_id, "9");
    }

    #[test]
    fn test_ranking_position_label_padding() {
        let rows = ranking_view(&Catalog::builtin());
        assert_eq!(rows[9].position_label, "10");
        assert_eq!(rows[0].position_label, "01");
    }

    #[test]
    fn test_detail_view_resolves_skills() {
        let catalog = scenario_catalog();
        let detail = detail_view(&catalog, &RadarGeometry::default(), "9-dutra").unwrap();

        assert_eq!(detail.specialty, "Defense");
        assert_eq!(detail.group_title, "9th grade");
        assert_eq!(
            detail.skills,
            vec![
                ResolvedSkill {
                    name: "Quick Learning".to_string(),
                    rank: Some(Rank::S),
                    known: true,
                },
                ResolvedSkill {
                    name: "Ghost Skill".to_string(),
                    rank: None,
                    known: false,
                },
            ]
        );
        assert_eq!(detail.radar.polygon.len(), 5);
    }

    #[test]
    fn test_detail_view_unknown_player() {
        let catalog = scenario_catalog();
        assert!(matches!(
            detail_view(&catalog, &RadarGeometry::default(), "nobody"),
            Err(ViewError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_weaknesses_view_empty_state() {
        let catalog = scenario_catalog();
        let view = weaknesses_view(&catalog, "9-enzio").unwrap();
        assert_eq!(
            view.weaknesses,
            Weaknesses::NoneRecorded {
                message: NO_WEAKNESSES.to_string()
            }
        );
    }

    #[test]
    fn test_weaknesses_view_list() {
        let catalog = Catalog::builtin();
        let view = weaknesses_view(&catalog, "9-catota").unwrap();
        match view.weaknesses {
            Weaknesses::List { items } => assert_eq!(items.len(), 3),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_skill_page_clamped() {
        let catalog = scenario_catalog();

        let first = skill_page(&catalog, 0).unwrap();
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = skill_page(&catalog, 99).unwrap();
        assert_eq!(last.index, 1);
        assert!(last.has_prev);
        assert!(!last.has_next);
        assert_eq!(last.skill.name, "Unranked");
    }

    #[test]
    fn test_skill_page_without_skills() {
        let catalog = Catalog::new(vec![], vec![]).unwrap();
        assert!(skill_page(&catalog, 0).is_none());
        assert_eq!(clamp_skill_index(5, 0), 0);
    }

    #[test]
    fn test_players_view_serialization_tag() {
        let catalog = scenario_catalog();
        let json = serde_json::to_value(players_view(&catalog, Some("6")).unwrap()).unwrap();
        assert_eq!(json["state"], "empty");
        assert_eq!(json["message"], EMPTY_GROUP);
    }
}
