//! Radar chart geometry.
//!
//! Projects a stat block onto a pentagon: five categories spaced 72° apart,
//! starting at the top. A value of 10 lands on the outer ring, 0 on the
//! center. Values are never clamped.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::{StatBlock, StatField};

/// Reference levels for the background rings.
pub const GRID_LEVELS: [u8; 5] = [2, 4, 6, 8, 10];

/// Level at which category labels sit, just outside the outer ring.
pub const LABEL_LEVEL: f64 = 12.0;

const CATEGORY_COUNT: usize = 5;

/// A point in plotting coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Fixed chart geometry shared by every rendered player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarGeometry {
    pub size: f64,
    pub center: f64,
    pub radius: f64,
}

impl Default for RadarGeometry {
    fn default() -> Self {
        Self::new(180.0, 0.35)
    }
}

impl RadarGeometry {
    /// Square chart of `size` with a plot radius of `size * radius_ratio`.
    pub fn new(size: f64, radius_ratio: f64) -> Self {
        Self {
            size,
            center: size / 2.0,
            radius: size * radius_ratio,
        }
    }

    /// Angle of a category, in radians. Index 0 points straight up.
    pub fn angle(index: usize) -> f64 {
        (PI * 2.0 * index as f64) / CATEGORY_COUNT as f64 - PI / 2.0
    }

    pub fn center_point(&self) -> Point {
        Point {
            x: self.center,
            y: self.center,
        }
    }

    /// Project a value for category `index`.
    pub fn point(&self, index: usize, value: f64) -> Point {
        let angle = Self::angle(index);
        let r = (value / 10.0) * self.radius;
        Point {
            x: self.center + r * angle.cos(),
            y: self.center + r * angle.sin(),
        }
    }

    /// The five vertices of a player's shape, in category order.
    pub fn polygon(&self, stats: &StatBlock) -> Vec<Point> {
        stats
            .entries()
            .iter()
            .map(|(field, value)| self.point(field.index(), *value as f64))
            .collect()
    }

    /// Same as `polygon` with the first vertex repeated at the end.
    pub fn closed_polygon(&self, stats: &StatBlock) -> Vec<Point> {
        let mut points = self.polygon(stats);
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        points
    }

    /// A regular pentagon at a fixed level.
    pub fn ring(&self, level: f64) -> Vec<Point> {
        (0..CATEGORY_COUNT).map(|i| self.point(i, level)).collect()
    }

    pub fn grid(&self) -> Vec<GridRing> {
        GRID_LEVELS
            .iter()
            .map(|&level| GridRing {
                level,
                points: self.ring(level as f64),
            })
            .collect()
    }

    /// Spokes from the center to each outer vertex.
    pub fn axes(&self) -> Vec<Axis> {
        StatField::ALL
            .iter()
            .map(|field| Axis {
                field: *field,
                from: self.center_point(),
                to: self.point(field.index(), 10.0),
            })
            .collect()
    }

    pub fn label_positions(&self) -> Vec<AxisLabel> {
        StatField::ALL
            .iter()
            .map(|field| AxisLabel {
                field: *field,
                label: field.label().to_string(),
                position: self.point(field.index(), LABEL_LEVEL),
            })
            .collect()
    }

    /// Everything needed to draw one player's chart.
    pub fn chart(&self, stats: &StatBlock) -> RadarChart {
        let polygon = self.polygon(stats);
        RadarChart {
            geometry: *self,
            svg_points: svg_points(&polygon),
            polygon,
            grid: self.grid(),
            axes: self.axes(),
            labels: self.label_positions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRing {
    pub level: u8,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub field: StatField,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub field: StatField,
    pub label: String,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub geometry: RadarGeometry,
    pub polygon: Vec<Point>,
    pub svg_points: String,
    pub grid: Vec<GridRing>,
    pub axes: Vec<Axis>,
    pub labels: Vec<AxisLabel>,
}

/// `"x,y x,y ..."` as used by an SVG `<polygon points=...>` attribute.
pub fn svg_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}
