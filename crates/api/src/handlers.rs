//! HTTP endpoints.
//!
//! - **health** - Store reachability
//! - **articles** - Create, list and vote on articles; manage their groups
//! - **groups** - Group-filtered rankings

pub mod articles;
pub mod groups;
pub mod health;
