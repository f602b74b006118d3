//! Browser-side session core: role selection, relay channel, session driver

pub mod channel;
pub mod hits;
pub mod mode;
pub mod session;

pub use channel::{ChannelError, RelayChannel, CLOSE_NORMAL};
pub use hits::HitLedger;
pub use mode::SessionMode;
pub use session::{ConnectionState, InviteLinks, Session, SessionContext, SessionError};
