//! Shared helpers

pub mod keys;
pub mod rate_limit;
pub mod time;
