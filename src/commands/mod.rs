//! CLI command implementations.

pub mod migrate;
pub mod serve;
pub mod users;
