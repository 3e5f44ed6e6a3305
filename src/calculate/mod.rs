//! Rating engine.
//!
//! Pure functions over the immutable catalog:
//! - Average of the five stats and its letter rank
//! - Stable ascending/descending orderings for the ranked views
//! - Specialty resolution (explicit label or strongest stat)
//!
//! Nothing here is cached; every value is recomputed from the source stats.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Group, Player, Rank, StatBlock, StatField};

/// Arithmetic mean of the five stats. No rounding, no validation.
pub fn average(stats: &StatBlock) -> f64 {
    let total = stats.attack as f64
        + stats.defense as f64
        + stats.serve as f64
        + stats.spin as f64
        + stats.vision as f64;
    total / 5.0
}

/// Calculate rank from an average.
pub fn calculate_rank(average: f64) -> Rank {
    Rank::from_average(average)
}

/// Average formatted for display (one decimal place).
pub fn format_average(average: f64) -> String {
    format!("{:.1}", average)
}

/// Strongest stat. The first field in declaration order wins ties.
pub fn best_stat(stats: &StatBlock) -> StatField {
    let mut entries = stats.entries().into_iter();
    let first = entries.next().unwrap_or((StatField::Attack, stats.attack));
    entries
        .fold(first, |best, curr| if curr.1 > best.1 { curr } else { best })
        .0
}

/// Explicit specialty if the player declares one, otherwise the label of
/// the strongest stat.
pub fn specialty(player: &Player) -> String {
    match &player.specialty {
        Some(s) => s.clone(),
        None => best_stat(&player.stats).label().to_string(),
    }
}

/// A player annotated with its computed average and rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlayer<'a> {
    #[serde(skip)]
    pub group: &'a Group,
    pub player: &'a Player,
    pub average: f64,
    pub rank: Rank,
}

impl<'a> RankedPlayer<'a> {
    pub fn new(group: &'a Group, player: &'a Player) -> Self {
        let average = average(&player.stats);
        Self {
            group,
            player,
            average,
            rank: calculate_rank(average),
        }
    }
}

fn by_average(a: &RankedPlayer<'_>, b: &RankedPlayer<'_>) -> Ordering {
    a.average.partial_cmp(&b.average).unwrap_or(Ordering::Equal)
}

/// Weakest first. Stable: equal averages keep dataset order.
pub fn sort_ascending(players: &mut [RankedPlayer<'_>]) {
    players.sort_by(by_average);
}

/// Strongest first. Stable: equal averages keep dataset order.
pub fn sort_descending(players: &mut [RankedPlayer<'_>]) {
    players.sort_by(|a, b| by_average(b, a));
}

/// Rank every player in a group.
pub fn rank_group(group: &Group) -> Vec<RankedPlayer<'_>> {
    group
        .players
        .iter()
        .map(|p| RankedPlayer::new(group, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, stats: StatBlock) -> Player {
        Player::new(id, id, stats, "d", "s")
    }

    #[test]
    fn test_average() {
        assert!((average(&StatBlock::new(7, 9, 8, 6, 8)) - 7.6).abs() < 1e-9);
        assert!((average(&StatBlock::new(4, 5, 2, 0, 3)) - 2.8).abs() < 1e-9);
        assert_eq!(average(&StatBlock::new(0, 0, 0, 0, 0)), 0.0);
        assert_eq!(average(&StatBlock::new(10, 10, 10, 10, 10)), 10.0);
    }

    #[test]
    fn test_average_within_range_for_all_valid_blocks() {
        for a in 0..=10u8 {
            for v in 0..=10u8 {
                let avg = average(&StatBlock::new(a, 10 - a, v, 10 - v, a));
                assert!((0.0..=10.0).contains(&avg), "average {} out of range", avg);
            }
        }
    }

    #[test]
    fn test_average_out_of_range_does_not_panic() {
        let avg = average(&StatBlock::new(255, 255, 255, 255, 255));
        assert_eq!(avg, 255.0);
        assert_eq!(calculate_rank(avg), Rank::S);
    }

    #[test]
    fn test_calculate_rank() {
        assert_eq!(calculate_rank(7.6), Rank::A);
        assert_eq!(calculate_rank(2.8), Rank::D);
        assert_eq!(calculate_rank(8.6), Rank::S);
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(7.6), "7.6");
        assert_eq!(format_average(2.8), "2.8");
        assert_eq!(format_average(7.0), "7.0");
    }

    #[test]
    fn test_best_stat_first_wins_ties() {
        // attack and vision tie at 8
        assert_eq!(best_stat(&StatBlock::new(8, 5, 6, 4, 8)), StatField::Attack);
        // spin and vision tie at 8
        assert_eq!(best_stat(&StatBlock::new(6, 6, 6, 8, 8)), StatField::Spin);
        assert_eq!(best_stat(&StatBlock::new(0, 0, 0, 0, 0)), StatField::Attack);
        assert_eq!(best_stat(&StatBlock::new(1, 2, 3, 4, 5)), StatField::Vision);
    }

    #[test]
    fn test_specialty_explicit_overrides() {
        let p = player("r", StatBlock::new(8, 9, 8, 9, 9)).with_specialty("Spin");
        assert_eq!(specialty(&p), "Spin");

        let p = player("d", StatBlock::new(7, 9, 8, 6, 8));
        assert_eq!(specialty(&p), "Defense");

        let p = player("v", StatBlock::new(1, 1, 1, 1, 2));
        assert_eq!(specialty(&p), "Game Vision");
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let group = Group::new(
            "g",
            "G",
            vec![
                player("first", StatBlock::new(5, 5, 5, 5, 5)),
                player("low", StatBlock::new(1, 1, 1, 1, 1)),
                player("second", StatBlock::new(5, 5, 5, 5, 5)),
            ],
        );
        let mut ranked = rank_group(&group);
        sort_ascending(&mut ranked);

        let ids: Vec<&str> = ranked.iter().map(|r| r.player.id.as_str()).collect();
        assert_eq!(ids, vec!["low", "first", "second"]);
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let group = Group::new(
            "g",
            "G",
            vec![
                player("first", StatBlock::new(5, 5, 5, 5, 5)),
                player("high", StatBlock::new(9, 9, 9, 9, 9)),
                player("second", StatBlock::new(5, 5, 5, 5, 5)),
            ],
        );
        let mut ranked = rank_group(&group);
        sort_descending(&mut ranked);

        let ids: Vec<&str> = ranked.iter().map(|r| r.player.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "first", "second"]);
    }

    #[test]
    fn test_ascending_reversed_matches_descending() {
        let group = Group::new(
            "9",
            "9th grade",
            vec![
                player("a", StatBlock::new(7, 9, 8, 6, 8)),
                player("b", StatBlock::new(4, 5, 4, 3, 4)),
                player("c", StatBlock::new(8, 9, 8, 9, 9)),
                player("d", StatBlock::new(4, 5, 2, 0, 3)),
                player("e", StatBlock::new(6, 7, 6, 7, 7)),
            ],
        );
        let mut asc = rank_group(&group);
        sort_ascending(&mut asc);
        let mut desc = rank_group(&group);
        sort_descending(&mut desc);

        let reversed: Vec<&str> = asc.iter().rev().map(|r| r.player.id.as_str()).collect();
        let descending: Vec<&str> = desc.iter().map(|r| r.player.id.as_str()).collect();
        assert_eq!(reversed, descending);
        assert_eq!(descending, vec!["c", "a", "e", "b", "d"]);
    }

    #[test]
    fn test_ranked_player_scenario() {
        let group = Group::new(
            "9",
            "9th grade",
            vec![
                player("9-dutra", StatBlock::new(7, 9, 8, 6, 8)),
                player("9-enzio", StatBlock::new(4, 5, 2, 0, 3)),
            ],
        );
        let ranked = rank_group(&group);
        assert_eq!(ranked[0].rank, Rank::A);
        assert_eq!(ranked[1].rank, Rank::D);
    }
}
