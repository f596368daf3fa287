//! cookitup: a personal recipe book with step-by-step cooking timers.
//!
//! * [`recipe`]: recipe and step records, the manual-entry draft and save flows.
//! * [`store`]: SQLite persistence with live recipe and step feeds.
//! * [`fetch`]: recipe generation over a remote text API.
//! * [`cooking`]: duration parsing and the cooking-mode state machine.
//! * [`config`]: TOML settings and platform paths.

pub mod config;
pub mod cooking;
pub mod fetch;
pub mod recipe;
pub mod store;
