//! Volleyball rotation server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod config;
pub mod game_loop;
pub mod machine;
pub mod render;
pub mod timers;
pub mod ws;
