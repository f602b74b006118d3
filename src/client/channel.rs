//! Outbound side of the relay channel as seen by the session driver

/// Normal closure code
pub const CLOSE_NORMAL: u16 = 1000;

/// Bidirectional relay transport; inbound frames are pushed into the session
pub trait RelayChannel {
    fn send(&mut self, text: String) -> Result<(), ChannelError>;
    fn close(&mut self, code: u16);
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Relay channel closed")]
    Closed,
}
