//! Contacts API collaborator: the backend roster endpoint, record
//! normalization, and the paging loop that assembles a full roster.

#![warn(clippy::unwrap_used)]

pub mod http;
pub mod normalize;
pub mod roster;
pub mod source;

pub use http::HttpContactSource;
pub use normalize::{normalize, RawContact};
pub use roster::fetch_roster;
pub use source::{ContactPage, ContactSource, StaticContactSource};
