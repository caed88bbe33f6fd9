#![warn(clippy::unwrap_used)]

pub mod roster;

pub use roster::{RosterCache, RosterCacheSettings, RosterSnapshot};
