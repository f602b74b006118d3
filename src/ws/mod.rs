//! WebSocket layer: wire protocol and the relay connection handler

pub mod handler;
pub mod protocol;
