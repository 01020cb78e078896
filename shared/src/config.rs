use crate::rotation::FormationState;

/// Upper bound for every duration in [`AnimationConfig`] (one hour).
pub const MAX_DURATION_MS: u64 = 3_600_000;

/// What a manual `next`/`prev`/`go_to` does to a running auto-play loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ManualNavigation {
    /// Cancel pending auto-play timers and restart the chain from the new state.
    #[default]
    RestartChain,
    /// Leave pending timers alone; a stale tick may land on the manual choice.
    KeepChain,
}

/// Animation timing configuration (milliseconds)
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Duration of one formation change animation
    pub transition_ms: u64,
    /// Delay before the first tick after play is switched on
    pub start_delay_ms: u64,
    /// Extra hold after entering serve-receive
    pub serve_receive_hold_ms: u64,
    /// Extra hold after returning to base
    pub base_hold_ms: u64,
    /// Delay of the rotation bump after returning to base
    pub overlap_advance_ms: u64,
    /// Per-role transition start offset
    pub stagger_step_ms: u64,
    pub manual_navigation: ManualNavigation,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition_ms: 800,
            start_delay_ms: 200,
            serve_receive_hold_ms: 250,
            base_hold_ms: 300,
            overlap_advance_ms: 120,
            stagger_step_ms: 70,
            manual_navigation: ManualNavigation::RestartChain,
        }
    }
}

impl AnimationConfig {
    /// Main-chain delay after a tick lands in `formation`.
    pub fn hold_after_entering(&self, formation: FormationState) -> u64 {
        match formation {
            FormationState::ServeReceive => self.transition_ms + self.serve_receive_hold_ms,
            FormationState::Base => self.transition_ms + self.base_hold_ms,
        }
    }

    /// Steady-state time between two rotation advances while playing.
    pub fn cycle_period_ms(&self) -> u64 {
        self.hold_after_entering(FormationState::ServeReceive)
            + self.hold_after_entering(FormationState::Base)
    }

    pub fn validate(&self) -> Result<(), String> {
        let durations = [
            ("transition_ms", self.transition_ms),
            ("start_delay_ms", self.start_delay_ms),
            ("serve_receive_hold_ms", self.serve_receive_hold_ms),
            ("base_hold_ms", self.base_hold_ms),
            ("overlap_advance_ms", self.overlap_advance_ms),
            ("stagger_step_ms", self.stagger_step_ms),
        ];
        // Bounded fields keep the hold and period sums below from overflowing.
        for (name, value) in durations {
            if value > MAX_DURATION_MS {
                return Err(format!("{} must be <= {} (got {})", name, MAX_DURATION_MS, value));
            }
        }
        if self.transition_ms == 0 {
            return Err("transition_ms must be > 0".to_string());
        }
        if self.overlap_advance_ms >= self.hold_after_entering(FormationState::Base) {
            return Err(
                "overlap_advance_ms must be shorter than transition_ms + base_hold_ms".to_string(),
            );
        }
        if self.stagger_step_ms * 5 > self.transition_ms {
            return Err("stagger_step_ms * 5 must not exceed transition_ms".to_string());
        }
        Ok(())
    }
}
