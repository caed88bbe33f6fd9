#![warn(clippy::unwrap_used)]

pub mod groups_rest;
pub mod rest;
pub mod server;

pub use server::{router, ApiServer};
