use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::roster::{Role, ROSTER};
use crate::rotation::{FormationState, ROTATION_COUNT};

/// Point on the half-court in percent (0..100 on both axes, net at y = 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 100.0),
            y: self.y.clamp(0.0, 100.0),
        }
    }

    fn in_range(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=100.0).contains(&self.x)
            && (0.0..=100.0).contains(&self.y)
    }
}

/// One coordinate per role, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Formation {
    pub positions: [Coord; 6],
}

impl Formation {
    pub fn get(&self, role: Role) -> Coord {
        self.positions[role.roster_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, Coord)> + '_ {
        ROSTER.iter().map(move |&role| (role, self.get(role)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RotationPositions {
    pub base: Formation,
    pub serve_receive: Formation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    pub units: String,
    pub attack_line_y: f64,
}

/// Rotation (1..6) x formation -> role -> coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PositionTable {
    pub meta: TableMeta,
    /// Index 0 holds rotation 1.
    pub rotations: Vec<RotationPositions>,
}

fn formation(positions: [(f64, f64); 6]) -> Formation {
    Formation {
        positions: positions.map(|(x, y)| Coord::new(x, y)),
    }
}

impl PositionTable {
    /// Standard 5-1 positions. Each row is S, OH1, OH2, MB1, MB2, OP.
    pub fn standard() -> Self {
        let rotations = vec![
            RotationPositions {
                base: formation([(80., 70.), (18., 15.), (18., 85.), (50., 22.), (50., 78.), (82., 22.)]),
                serve_receive: formation([(85., 60.), (20., 28.), (20., 72.), (48., 33.), (48., 67.), (75., 33.)]),
            },
            RotationPositions {
                base: formation([(65., 70.), (15., 20.), (30., 85.), (45., 22.), (58., 78.), (85., 22.)]),
                serve_receive: formation([(75., 60.), (22., 30.), (28., 74.), (46., 33.), (54., 67.), (72., 33.)]),
            },
            RotationPositions {
                base: formation([(52., 70.), (12., 22.), (35., 85.), (42., 22.), (60., 78.), (85., 22.)]),
                serve_receive: formation([(68., 60.), (22., 30.), (32., 74.), (45., 33.), (57., 67.), (72., 33.)]),
            },
            RotationPositions {
                base: formation([(35., 70.), (10., 25.), (42., 85.), (40., 22.), (62., 78.), (85., 22.)]),
                serve_receive: formation([(60., 60.), (20., 30.), (35., 74.), (45., 33.), (58., 67.), (70., 33.)]),
            },
            RotationPositions {
                base: formation([(22., 70.), (12., 28.), (48., 85.), (38., 22.), (65., 78.), (85., 22.)]),
                serve_receive: formation([(50., 60.), (20., 30.), (40., 74.), (44., 33.), (60., 67.), (70., 33.)]),
            },
            RotationPositions {
                base: formation([(10., 70.), (15., 30.), (52., 85.), (36., 22.), (66., 78.), (85., 22.)]),
                serve_receive: formation([(45., 60.), (22., 30.), (42., 74.), (43., 33.), (62., 67.), (70., 33.)]),
            },
        ];

        Self {
            meta: TableMeta {
                units: "percent-of-half-court".to_string(),
                attack_line_y: 33.0,
            },
            rotations,
        }
    }

    /// Check the table is total and every coordinate lies on the half-court.
    pub fn validate(&self) -> Result<(), String> {
        if self.rotations.len() != ROTATION_COUNT as usize {
            return Err(format!(
                "position table must have {} rotations, found {}",
                ROTATION_COUNT,
                self.rotations.len()
            ));
        }
        if !(0.0..=100.0).contains(&self.meta.attack_line_y) {
            return Err("attack_line_y must be within 0..=100".to_string());
        }
        for (i, rotation) in self.rotations.iter().enumerate() {
            for (state, formation) in [
                (FormationState::Base, &rotation.base),
                (FormationState::ServeReceive, &rotation.serve_receive),
            ] {
                for (role, coord) in formation.iter() {
                    if !coord.in_range() {
                        return Err(format!(
                            "rotation {} {} {}: ({}, {}) is outside 0..=100",
                            i + 1,
                            state,
                            role,
                            coord.x,
                            coord.y
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Formation for a rotation. Panics if the table has no such entry, which
    /// means the table was never validated.
    pub fn formation(&self, rotation_index: u8, state: FormationState) -> &Formation {
        let entry = (rotation_index as usize)
            .checked_sub(1)
            .and_then(|i| self.rotations.get(i))
            .unwrap_or_else(|| {
                panic!(
                    "position table has no entry for rotation {} ({})",
                    rotation_index, state
                )
            });
        match state {
            FormationState::Base => &entry.base,
            FormationState::ServeReceive => &entry.serve_receive,
        }
    }

    pub fn position(&self, rotation_index: u8, state: FormationState, role: Role) -> Coord {
        self.formation(rotation_index, state).get(role)
    }
}
