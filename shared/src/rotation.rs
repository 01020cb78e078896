use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::AnimationConfig;

pub const ROTATION_COUNT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FormationState {
    #[default]
    Base,
    ServeReceive,
}

impl FormationState {
    pub fn as_str(self) -> &'static str {
        match self {
            FormationState::Base => "base",
            FormationState::ServeReceive => "serve_receive",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FormationState::Base => FormationState::ServeReceive,
            FormationState::ServeReceive => FormationState::Base,
        }
    }
}

impl std::fmt::Display for FormationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    pub rotation_index: u8,
    pub formation_state: FormationState,
    pub playing: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            rotation_index: 1,
            formation_state: FormationState::Base,
            playing: false,
        }
    }
}

/// Wrap any integer onto 1..=6 (0 -> 6, 7 -> 1, -5 -> 1).
pub fn normalize_rotation(target: i64) -> u8 {
    // Reduce first so the offset cannot overflow at i64::MIN.
    let count = ROTATION_COUNT as i64;
    ((target.rem_euclid(count) + count - 1) % count + 1) as u8
}

pub fn go_to(state: AnimationState, target: i64, formation: FormationState) -> AnimationState {
    AnimationState {
        rotation_index: normalize_rotation(target),
        formation_state: formation,
        ..state
    }
}

pub fn next(state: AnimationState) -> AnimationState {
    go_to(state, state.rotation_index as i64 + 1, FormationState::Base)
}

pub fn prev(state: AnimationState) -> AnimationState {
    go_to(state, state.rotation_index as i64 - 1, FormationState::Base)
}

pub fn toggle_play(state: AnimationState) -> AnimationState {
    AnimationState {
        playing: !state.playing,
        ..state
    }
}

/// Result of one main-chain tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub state: AnimationState,
    /// Delay until the next main tick. `None` halts the chain.
    pub next_tick_ms: Option<u64>,
    /// Delay until the secondary overlap advance, if one is due.
    pub overlap_advance_ms: Option<u64>,
}

impl TickOutcome {
    pub fn changed(&self, before: AnimationState) -> bool {
        self.state != before
    }
}

/// Advance the auto-play loop by one main tick.
///
/// base -> serve_receive holds for `transition + serve_receive_hold`;
/// serve_receive -> base holds for `transition + base_hold` and also asks for
/// the overlap advance that bumps the rotation while the return to base is
/// still animating. A paused state is left untouched and halts the chain.
pub fn tick(state: AnimationState, config: &AnimationConfig) -> TickOutcome {
    if !state.playing {
        return TickOutcome {
            state,
            next_tick_ms: None,
            overlap_advance_ms: None,
        };
    }

    let formation = state.formation_state.toggled();
    let state = AnimationState {
        formation_state: formation,
        ..state
    };
    let overlap_advance_ms = match formation {
        FormationState::Base => Some(config.overlap_advance_ms),
        FormationState::ServeReceive => None,
    };

    TickOutcome {
        state,
        next_tick_ms: Some(config.hold_after_entering(formation)),
        overlap_advance_ms,
    }
}

/// Secondary overlap action: `next()` if still playing, otherwise nothing.
pub fn overlap_advance(state: AnimationState) -> Option<AnimationState> {
    if state.playing {
        Some(next(state))
    } else {
        None
    }
}
