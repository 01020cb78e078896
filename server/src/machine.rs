use volley_shared::config::{AnimationConfig, ManualNavigation};
use volley_shared::frame::Frame;
use volley_shared::protocol::ClientMsg;
use volley_shared::rotation::{self, AnimationState, FormationState};
use volley_shared::table::PositionTable;

use crate::render::Renderer;
use crate::timers::{PendingTimer, Timer, TimerHandle, TimerQueue};

/// Sole owner of the rotation state and its auto-play timers.
///
/// Every operation leaves the view dirty; the driver decides when to render.
pub struct RotationStateMachine {
    state: AnimationState,
    table: PositionTable,
    config: AnimationConfig,
    timers: TimerQueue,
    main_tick: Option<TimerHandle>,
    overlap_advance: Option<TimerHandle>,
    dirty: bool,
}

impl RotationStateMachine {
    /// The table and config are expected to be validated already.
    pub fn new(table: PositionTable, config: AnimationConfig) -> Self {
        Self {
            state: AnimationState::default(),
            table,
            config,
            timers: TimerQueue::new(),
            main_tick: None,
            overlap_advance: None,
            dirty: true,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn table(&self) -> &PositionTable {
        &self.table
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn main_tick_pending(&self) -> bool {
        self.main_tick.is_some()
    }

    pub fn overlap_advance_pending(&self) -> bool {
        self.overlap_advance.is_some()
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    pub fn go_to(&mut self, target: i64, formation: FormationState) -> AnimationState {
        self.state = rotation::go_to(self.state, target, formation);
        self.dirty = true;
        tracing::debug!(
            rotation = self.state.rotation_index,
            formation = %self.state.formation_state,
            "go_to {}",
            target
        );
        self.restart_chain_after_manual_navigation();
        self.state
    }

    pub fn next(&mut self) -> AnimationState {
        self.go_to(self.state.rotation_index as i64 + 1, FormationState::Base)
    }

    pub fn prev(&mut self) -> AnimationState {
        self.go_to(self.state.rotation_index as i64 - 1, FormationState::Base)
    }

    pub fn toggle_play(&mut self) -> AnimationState {
        self.state = rotation::toggle_play(self.state);
        self.dirty = true;
        self.cancel_main_tick();
        if self.state.playing {
            self.main_tick = Some(self.timers.schedule(Timer::MainTick, self.config.start_delay_ms));
            tracing::info!(rotation = self.state.rotation_index, "Auto-play started");
        } else {
            tracing::info!(rotation = self.state.rotation_index, "Auto-play stopped");
        }
        self.state
    }

    /// Apply a control message from a client.
    pub fn apply(&mut self, msg: &ClientMsg) -> AnimationState {
        match *msg {
            ClientMsg::Next => self.next(),
            ClientMsg::Prev => self.prev(),
            ClientMsg::GoTo {
                rotation,
                formation,
            } => self.go_to(rotation, formation),
            ClientMsg::TogglePlay => self.toggle_play(),
        }
    }

    /// Fire the earliest timer due at or before `until_ms`, if any.
    pub fn fire_next_due(&mut self, until_ms: u64) -> Option<Timer> {
        let pending = self.timers.pop_due(until_ms)?;
        self.fire(pending);
        Some(pending.timer)
    }

    /// Fire everything due up to `until_ms` and move the clock there.
    pub fn advance_to(&mut self, until_ms: u64) -> usize {
        let mut fired = 0;
        while self.fire_next_due(until_ms).is_some() {
            fired += 1;
        }
        self.timers.advance_clock(until_ms);
        fired
    }

    /// Returns whether the view changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn frame(&self) -> Frame {
        Frame::build(&self.state, &self.table, &self.config)
    }

    pub fn render_if_dirty<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        if !self.take_dirty() {
            return false;
        }
        renderer.render(&self.frame());
        true
    }

    /// Stop playing and drop every pending timer.
    pub fn shutdown(&mut self) {
        self.timers.clear();
        self.main_tick = None;
        self.overlap_advance = None;
        if self.state.playing {
            self.state.playing = false;
            self.dirty = true;
        }
    }

    fn fire(&mut self, pending: PendingTimer) {
        match pending.timer {
            Timer::MainTick => {
                if self.main_tick == Some(pending.handle) {
                    self.main_tick = None;
                }
                self.on_main_tick();
            }
            Timer::OverlapAdvance => {
                if self.overlap_advance == Some(pending.handle) {
                    self.overlap_advance = None;
                }
                self.on_overlap_advance();
            }
        }
    }

    fn on_main_tick(&mut self) {
        let before = self.state;
        let outcome = rotation::tick(before, &self.config);
        if !outcome.changed(before) {
            tracing::debug!("Tick while paused, chain halted");
            return;
        }
        self.state = outcome.state;
        self.dirty = true;
        tracing::debug!(
            at_ms = self.timers.now_ms(),
            rotation = self.state.rotation_index,
            formation = %self.state.formation_state,
            "tick"
        );

        if let Some(delay) = outcome.next_tick_ms {
            self.main_tick = Some(self.timers.schedule(Timer::MainTick, delay));
        }
        if let Some(delay) = outcome.overlap_advance_ms {
            self.overlap_advance = Some(self.timers.schedule(Timer::OverlapAdvance, delay));
        }
    }

    fn on_overlap_advance(&mut self) {
        if let Some(state) = rotation::overlap_advance(self.state) {
            self.state = state;
            self.dirty = true;
            tracing::debug!(
                at_ms = self.timers.now_ms(),
                rotation = self.state.rotation_index,
                "overlap advance"
            );
        }
    }

    fn cancel_main_tick(&mut self) {
        if let Some(handle) = self.main_tick.take() {
            self.timers.cancel(handle);
        }
    }

    fn restart_chain_after_manual_navigation(&mut self) {
        if !self.state.playing || self.config.manual_navigation == ManualNavigation::KeepChain {
            return;
        }
        self.cancel_main_tick();
        if let Some(handle) = self.overlap_advance.take() {
            self.timers.cancel(handle);
        }
        let delay = self.config.hold_after_entering(self.state.formation_state);
        self.main_tick = Some(self.timers.schedule(Timer::MainTick, delay));
    }
}

/// Fire due timers one by one up to `until_ms`, rendering after each change.
pub fn run_until<R: Renderer + ?Sized>(
    machine: &mut RotationStateMachine,
    until_ms: u64,
    renderer: &mut R,
) -> usize {
    let mut fired = 0;
    machine.render_if_dirty(renderer);
    while machine.fire_next_due(until_ms).is_some() {
        fired += 1;
        machine.render_if_dirty(renderer);
    }
    machine.timers.advance_clock(until_ms);
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_shared::roster::ROSTER;

    fn machine() -> RotationStateMachine {
        RotationStateMachine::new(PositionTable::standard(), AnimationConfig::default())
    }

    fn machine_with(manual_navigation: ManualNavigation) -> RotationStateMachine {
        RotationStateMachine::new(
            PositionTable::standard(),
            AnimationConfig {
                manual_navigation,
                ..Default::default()
            },
        )
    }

    fn assert_frame_matches_table(frame: &Frame, rotation: u8, formation: FormationState) {
        let table = PositionTable::standard();
        assert_eq!(frame.rotation, rotation);
        assert_eq!(frame.formation, formation);
        for role in ROSTER {
            let expected = table.position(rotation, formation, role);
            let player = frame.player(role).unwrap();
            assert_eq!((player.x, player.y), (expected.x, expected.y), "{}", role);
        }
    }

    #[test]
    fn starts_at_rotation_one_base_paused() {
        let mut m = machine();
        assert_eq!(m.state(), AnimationState::default());
        assert!(m.take_dirty(), "initial view must be rendered");
        assert!(m.timers().is_empty());
    }

    #[test]
    fn go_to_wraps_and_marks_dirty() {
        let mut m = machine();
        m.take_dirty();
        assert_eq!(m.go_to(0, FormationState::Base).rotation_index, 6);
        assert!(m.take_dirty());
        assert_eq!(m.go_to(7, FormationState::Base).rotation_index, 1);
        assert_eq!(m.go_to(-5, FormationState::Base).rotation_index, 1);
    }

    #[test]
    fn go_to_same_state_still_invalidates_view() {
        let mut m = machine();
        m.take_dirty();
        m.go_to(1, FormationState::Base);
        assert!(m.take_dirty());
    }

    #[test]
    fn go_to_serve_receive_reads_back_table_entry() {
        let mut m = machine();
        let state = m.go_to(3, FormationState::ServeReceive);
        assert_eq!(state.rotation_index, 3);
        assert_eq!(state.formation_state, FormationState::ServeReceive);
        assert_frame_matches_table(&m.frame(), 3, FormationState::ServeReceive);
    }

    #[test]
    fn next_then_prev_returns_to_base() {
        let mut m = machine();
        m.go_to(4, FormationState::ServeReceive);
        m.next();
        let back = m.prev();
        assert_eq!(back.rotation_index, 4);
        assert_eq!(back.formation_state, FormationState::Base);
    }

    #[test]
    fn toggle_twice_leaves_nothing_pending() {
        let mut m = machine();
        assert!(m.toggle_play().playing);
        assert!(m.main_tick_pending());
        assert_eq!(m.next_deadline_ms(), Some(200));
        assert!(!m.toggle_play().playing);
        assert!(!m.main_tick_pending());
        assert!(m.timers().is_empty());
    }

    #[test]
    fn autoplay_sequence_follows_timing_contract() {
        let mut m = machine();
        m.toggle_play();
        let mut frames: Vec<Frame> = Vec::new();
        run_until(&mut m, 0, &mut frames);
        frames.clear();

        run_until(&mut m, 199, &mut frames);
        assert!(frames.is_empty());

        run_until(&mut m, 200, &mut frames);
        assert_eq!(frames.len(), 1);
        assert_frame_matches_table(&frames[0], 1, FormationState::ServeReceive);
        assert_eq!(m.next_deadline_ms(), Some(200 + 800 + 250));

        run_until(&mut m, 1250, &mut frames);
        assert_eq!(frames.len(), 2);
        assert_frame_matches_table(&frames[1], 1, FormationState::Base);
        assert!(m.overlap_advance_pending());
        assert_eq!(m.next_deadline_ms(), Some(1250 + 120));

        run_until(&mut m, 1370, &mut frames);
        assert_eq!(frames.len(), 3);
        assert_frame_matches_table(&frames[2], 2, FormationState::Base);
        assert_eq!(m.next_deadline_ms(), Some(1250 + 800 + 300));

        run_until(&mut m, 2350, &mut frames);
        assert_eq!(frames.len(), 4);
        assert_frame_matches_table(&frames[3], 2, FormationState::ServeReceive);
    }

    #[test]
    fn steady_state_period_is_two_transitions_plus_550() {
        let mut m = machine();
        m.toggle_play();
        let mut advances = Vec::new();
        let mut last_rotation = m.state().rotation_index;
        while advances.len() < 4 {
            let deadline = m.next_deadline_ms().unwrap();
            m.advance_to(deadline);
            if m.state().rotation_index != last_rotation {
                last_rotation = m.state().rotation_index;
                advances.push(m.now_ms());
            }
        }
        let period = m.config().cycle_period_ms();
        assert_eq!(period, 2 * 800 + 550);
        for pair in advances.windows(2) {
            assert_eq!(pair[1] - pair[0], period);
        }
    }

    #[test]
    fn autoplay_wraps_after_six_rotations() {
        let mut m = machine();
        m.toggle_play();
        let period = m.config().cycle_period_ms();
        m.advance_to(1370 + 5 * period);
        assert_eq!(m.state().rotation_index, 1);
        assert_eq!(m.state().formation_state, FormationState::Base);
        assert!(m.state().playing);
    }

    #[test]
    fn stopping_mid_sequence_freezes_state() {
        let mut m = machine();
        m.toggle_play();
        m.advance_to(1250);
        assert!(m.overlap_advance_pending());
        let stopped = m.toggle_play();
        m.take_dirty();

        let fired = m.advance_to(10_000);
        assert_eq!(fired, 1, "only the overlap timer was left");
        assert_eq!(m.state(), stopped);
        assert!(!m.take_dirty());
        assert!(m.timers().is_empty());
    }

    #[test]
    fn restart_within_overlap_window_still_advances() {
        let mut m = machine();
        m.toggle_play();
        m.advance_to(1250);
        m.toggle_play();
        m.toggle_play();
        m.advance_to(1370);
        assert_eq!(m.state().rotation_index, 2);
    }

    #[test]
    fn manual_navigation_restarts_chain_by_default() {
        let mut m = machine();
        m.toggle_play();
        m.advance_to(1250);
        assert!(m.overlap_advance_pending());

        let state = m.go_to(5, FormationState::Base);
        assert_eq!(state.rotation_index, 5);
        assert!(!m.overlap_advance_pending());
        assert_eq!(m.timers().pending().len(), 1);
        assert_eq!(m.next_deadline_ms(), Some(1250 + 800 + 300));

        m.advance_to(1370);
        assert_eq!(m.state().rotation_index, 5, "stale overlap must not bump");
        m.advance_to(2350);
        assert_eq!(m.state().formation_state, FormationState::ServeReceive);
        assert_eq!(m.state().rotation_index, 5);
    }

    #[test]
    fn manual_serve_receive_uses_serve_receive_hold() {
        let mut m = machine();
        m.toggle_play();
        m.go_to(2, FormationState::ServeReceive);
        assert_eq!(m.next_deadline_ms(), Some(800 + 250));
    }

    #[test]
    fn keep_chain_leaves_pending_timers() {
        let mut m = machine_with(ManualNavigation::KeepChain);
        m.toggle_play();
        m.advance_to(1250);
        m.go_to(5, FormationState::Base);
        assert!(m.overlap_advance_pending());
        m.advance_to(1370);
        assert_eq!(m.state().rotation_index, 6);
    }

    #[test]
    fn manual_navigation_while_paused_schedules_nothing() {
        let mut m = machine();
        m.next();
        m.prev();
        m.go_to(9, FormationState::ServeReceive);
        assert!(m.timers().is_empty());
    }

    #[test]
    fn apply_maps_client_messages() {
        let mut m = machine();
        assert_eq!(m.apply(&ClientMsg::Prev).rotation_index, 6);
        assert_eq!(m.apply(&ClientMsg::Next).rotation_index, 1);
        let s = m.apply(&ClientMsg::GoTo {
            rotation: 15,
            formation: FormationState::ServeReceive,
        });
        assert_eq!((s.rotation_index, s.formation_state), (3, FormationState::ServeReceive));
        assert!(m.apply(&ClientMsg::TogglePlay).playing);
    }

    #[test]
    fn shutdown_cancels_everything() {
        let mut m = machine();
        m.toggle_play();
        m.advance_to(1250);
        m.shutdown();
        assert!(!m.state().playing);
        assert!(m.timers().is_empty());
        assert_eq!(m.advance_to(100_000), 0);
    }

    #[test]
    fn render_if_dirty_renders_once_per_change() {
        let mut m = machine();
        let mut frames: Vec<Frame> = Vec::new();
        assert!(m.render_if_dirty(&mut frames));
        assert!(!m.render_if_dirty(&mut frames));
        m.next();
        assert!(m.render_if_dirty(&mut frames));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].rotation, 2);
    }
}
