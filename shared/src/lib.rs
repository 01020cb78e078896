//! Shared volleyball rotation data and logic.
//!
//! Pure, renderer-agnostic pieces used by the server and exported as
//! TypeScript types for the court front end.
//!
//! `cargo test -p volley-shared` writes the bindings to `shared/bindings/`
//! (one `<Type>.ts` per exported type). Set `TS_RS_EXPORT_DIR` to write them
//! into a front-end checkout instead.

pub mod config;
pub mod frame;
pub mod protocol;
pub mod roster;
pub mod rotation;
pub mod table;
