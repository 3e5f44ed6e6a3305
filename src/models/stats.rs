//! Stat blocks and rank grades.

use serde::{Deserialize, Serialize};

/// Highest value a single stat can take.
pub const STAT_MAX: u8 = 10;

/// The five skill scores describing a player, each in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: u8,
    pub defense: u8,
    pub serve: u8,
    pub spin: u8,
    pub vision: u8,
}

impl StatBlock {
    pub fn new(attack: u8, defense: u8, serve: u8, spin: u8, vision: u8) -> Self {
        Self {
            attack,
            defense,
            serve,
            spin,
            vision,
        }
    }

    /// Value of a single field.
    pub fn get(&self, field: StatField) -> u8 {
        match field {
            StatField::Attack => self.attack,
            StatField::Defense => self.defense,
            StatField::Serve => self.serve,
            StatField::Spin => self.spin,
            StatField::Vision => self.vision,
        }
    }

    /// Fields paired with their values, in declaration order.
    pub fn entries(&self) -> [(StatField, u8); 5] {
        StatField::ALL.map(|field| (field, self.get(field)))
    }

    /// First field found outside `0..=10`, if any.
    pub fn out_of_range(&self) -> Option<(StatField, u8)> {
        self.entries()
            .into_iter()
            .find(|(_, value)| *value > STAT_MAX)
    }
}

/// A stat dimension. Declaration order is the radar order and the
/// tie-break order for specialty resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Attack,
    Defense,
    Serve,
    Spin,
    Vision,
}

impl StatField {
    pub const ALL: [StatField; 5] = [
        StatField::Attack,
        StatField::Defense,
        StatField::Serve,
        StatField::Spin,
        StatField::Vision,
    ];

    /// Position in the fixed category order.
    pub fn index(&self) -> usize {
        match self {
            StatField::Attack => 0,
            StatField::Defense => 1,
            StatField::Serve => 2,
            StatField::Spin => 3,
            StatField::Vision => 4,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StatField::Attack => "Attack",
            StatField::Defense => "Defense",
            StatField::Serve => "Serve",
            StatField::Spin => "Spin",
            StatField::Vision => "Game Vision",
        }
    }
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Letter grade, `D` lowest and `S` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    D,
    C,
    B,
    A,
    S,
}

impl Rank {
    /// Map an average stat score to a rank.
    ///
    /// Each threshold is the inclusive lower bound of its band. NaN falls
    /// through to `D`.
    pub fn from_average(average: f64) -> Self {
        if average >= 8.5 {
            Rank::S
        } else if average >= 7.5 {
            Rank::A
        } else if average >= 6.5 {
            Rank::B
        } else if average >= 5.0 {
            Rank::C
        } else {
            Rank::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
