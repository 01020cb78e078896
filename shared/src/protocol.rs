use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::AnimationConfig;
use crate::frame::Frame;
use crate::roster::Role;
use crate::rotation::FormationState;
use crate::table::PositionTable;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "frame")]
    Frame(Frame),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub roster: Vec<Role>,
    pub table: PositionTable,
    pub config: AnimationConfig,
    pub frame: Frame,
}

// === Client -> Server ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "prev")]
    Prev,
    /// Jump to any rotation number; it is wrapped onto 1..6.
    #[serde(rename = "go_to")]
    GoTo {
        rotation: i64,
        #[serde(default)]
        formation: FormationState,
    },
    #[serde(rename = "toggle_play")]
    TogglePlay,
}
