use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::AnimationConfig;
use crate::roster::Role;
use crate::rotation::{AnimationState, FormationState};
use crate::table::PositionTable;

/// Everything a renderer needs to place one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFrame {
    pub id: Role,
    pub group: String,
    pub x: f64,
    pub y: f64,
    pub stagger_ms: u64,
    pub label: String,
}

/// Target layout for the current state. Renderers animate towards it over
/// `transition_ms`, each player delayed by its stagger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub rotation: u8,
    pub formation: FormationState,
    pub playing: bool,
    pub transition_ms: u64,
    pub court_label: String,
    pub players: Vec<PlayerFrame>,
}

impl Frame {
    pub fn build(state: &AnimationState, table: &PositionTable, config: &AnimationConfig) -> Self {
        let formation = table.formation(state.rotation_index, state.formation_state);
        let players = formation
            .iter()
            .map(|(role, coord)| {
                let coord = coord.clamped();
                PlayerFrame {
                    id: role,
                    group: role.group().to_string(),
                    x: coord.x,
                    y: coord.y,
                    stagger_ms: role.stagger_ms(config.stagger_step_ms),
                    label: format!(
                        "{}, Rotation {}, {}",
                        role, state.rotation_index, state.formation_state
                    ),
                }
            })
            .collect();

        Self {
            rotation: state.rotation_index,
            formation: state.formation_state,
            playing: state.playing,
            transition_ms: config.transition_ms,
            court_label: format!(
                "Court, Rotation {}, {}",
                state.rotation_index, state.formation_state
            ),
            players,
        }
    }

    pub fn player(&self, role: Role) -> Option<&PlayerFrame> {
        self.players.iter().find(|p| p.id == role)
    }

    /// Play button text for front ends that mirror the play flag.
    pub fn play_label(&self) -> &'static str {
        if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }
}
