//! Ship Duel - two-player canvas shooter
//!
//! Two halves share the wire protocol:
//! - `client`: the per-browser session core (local ship, peer reconstruction,
//!   frame rendering onto an abstract surface)
//! - `relay`: the WebSocket server that pairs players through join/watch keys
//!   and fans out their snapshots

pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod http;
pub mod relay;
pub mod util;
pub mod ws;
