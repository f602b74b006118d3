//! Snapshot relay: routes connections into games and fans out play events

pub mod connection;
pub mod registry;

pub use connection::{Connection, Inbound, Opened};
pub use registry::{Attached, GameRegistry, GameSession, RelayError, Seat};
