use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Playing positions of a 5-1 lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    S,
    OH1,
    OH2,
    MB1,
    MB2,
    OP,
}

/// Fixed roster order. Only the stagger assignment depends on it.
pub const ROSTER: [Role; 6] = [Role::S, Role::OH1, Role::OH2, Role::MB1, Role::MB2, Role::OP];

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::S => "S",
            Role::OH1 => "OH1",
            Role::OH2 => "OH2",
            Role::MB1 => "MB1",
            Role::MB2 => "MB2",
            Role::OP => "OP",
        }
    }

    /// Position group shared by both players of a pair (OH1/OH2 -> OH).
    pub fn group(self) -> &'static str {
        match self {
            Role::S => "S",
            Role::OH1 | Role::OH2 => "OH",
            Role::MB1 | Role::MB2 => "MB",
            Role::OP => "OP",
        }
    }

    /// Index into [`ROSTER`].
    pub fn roster_index(self) -> usize {
        self as usize
    }

    /// Transition start delay for this role.
    pub fn stagger_ms(self, step_ms: u64) -> u64 {
        self.roster_index() as u64 * step_ms
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_index_matches_order() {
        for (i, role) in ROSTER.iter().enumerate() {
            assert_eq!(role.roster_index(), i);
        }
    }

    #[test]
    fn staggers_step_by_seventy_ms() {
        let staggers: Vec<u64> = ROSTER.iter().map(|r| r.stagger_ms(70)).collect();
        assert_eq!(staggers, vec![0, 70, 140, 210, 280, 350]);
    }

    #[test]
    fn pairs_share_a_group() {
        assert_eq!(Role::OH1.group(), Role::OH2.group());
        assert_eq!(Role::MB1.group(), Role::MB2.group());
        assert_eq!(Role::S.group(), "S");
        assert_eq!(Role::OP.group(), "OP");
    }

    #[test]
    fn role_serializes_as_label() {
        let json = serde_json::to_string(&Role::OH1).unwrap();
        assert_eq!(json, "\"OH1\"");
        assert_eq!(Role::MB2.to_string(), "MB2");
    }
}
