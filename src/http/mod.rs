//! HTTP surface: health endpoint and WebSocket route

pub mod routes;

pub use routes::build_router;
