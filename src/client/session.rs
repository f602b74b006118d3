//! Client session driver
//!
//! Owns the roster of ships for one client and reacts to the three inputs a
//! browser page would feed it: the channel opening, key events and inbound
//! relay messages. Every handler runs to completion on the caller's thread.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::game::scene::{render_frame, resolve_hits, Roster};
use crate::game::{Player, Role, Surface};
use crate::util::keys::generate_key;
use crate::ws::protocol::{Event, PlayerSnapshot, ProtocolError};

use super::channel::{ChannelError, RelayChannel, CLOSE_NORMAL};
use super::hits::HitLedger;
use super::mode::SessionMode;

/// Everything the driver touches, passed in explicitly
pub struct SessionContext<C, S> {
    pub channel: C,
    pub surface: S,
    pub mode: SessionMode,
}

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Links the relay hands back to the game creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLinks {
    pub join: String,
    pub watch: String,
}

pub struct Session<C, S> {
    ctx: SessionContext<C, S>,
    state: ConnectionState,
    roster: Roster,
    invite: Option<InviteLinks>,
    alerts: VecDeque<String>,
    hits: HitLedger,
}

impl<C: RelayChannel, S: Surface> Session<C, S> {
    pub fn new(ctx: SessionContext<C, S>) -> Self {
        let mut roster: Roster = [None, None];
        if let Some(role) = ctx.mode.local_role() {
            roster[role.index()] = Some(Player::spawn(role));
        }

        Self {
            ctx,
            state: ConnectionState::Connecting,
            roster,
            invite: None,
            alerts: VecDeque::new(),
            hits: HitLedger::new(),
        }
    }

    /// Announce ourselves to the relay and draw the first frame
    pub fn on_open(&mut self) -> Result<(), SessionError> {
        self.state = ConnectionState::Open;

        let player = self.local_player().map(Player::snapshot);
        let init = match &self.ctx.mode {
            SessionMode::Create => Event::Init {
                join: Some(generate_key()),
                watch: Some(generate_key()),
                player,
            },
            SessionMode::Join(key) => Event::Init {
                join: Some(key.clone()),
                watch: None,
                player,
            },
            SessionMode::Watch(key) => Event::Init {
                join: None,
                watch: Some(key.clone()),
                player: None,
            },
        };

        info!(mode = ?self.ctx.mode, "Relay channel open");
        self.send(&init)?;
        self.redraw();
        Ok(())
    }

    pub fn on_key_down(&mut self, code: &str) -> Result<(), SessionError> {
        self.on_key(code, true)
    }

    pub fn on_key_up(&mut self, code: &str) -> Result<(), SessionError> {
        self.on_key(code, false)
    }

    fn on_key(&mut self, code: &str, pressed: bool) -> Result<(), SessionError> {
        let Some(role) = self.ctx.mode.local_role() else {
            // spectators have no controls
            return Ok(());
        };
        let Some(player) = self.roster[role.index()].as_mut() else {
            return Ok(());
        };
        player.intent.apply(code, pressed);

        self.redraw();

        if self.state != ConnectionState::Open {
            debug!(state = ?self.state, "Channel not open, snapshot not sent");
            return Ok(());
        }
        if let Some(snapshot) = self.local_player().map(Player::snapshot) {
            self.send(&Event::Play { player: snapshot })?;
        }
        Ok(())
    }

    /// Handle one inbound text frame
    pub fn on_message(&mut self, text: &str) -> Result<(), SessionError> {
        if self.state == ConnectionState::Closed {
            debug!("Message after close, ignoring");
            return Ok(());
        }

        let event = Event::from_json(text)?;
        debug!(event = event.kind(), "Received event");

        match event {
            Event::Init { join, watch, .. } => {
                if let (Some(join), Some(watch)) = (join, watch) {
                    let links = InviteLinks {
                        join: format!("?join={join}"),
                        watch: format!("?watch={watch}"),
                    };
                    info!(join = %links.join, watch = %links.watch, "Invite links ready");
                    self.invite = Some(links);
                }
            }
            Event::Play { player } => self.apply_peer_snapshot(&player),
            Event::Win => {
                info!("Game won, closing channel");
                self.ctx.channel.close(CLOSE_NORMAL);
                self.state = ConnectionState::Closed;
            }
            Event::Error { message } => {
                warn!(message = %message, "Relay reported an error");
                self.alerts.push_back(message);
            }
        }
        Ok(())
    }

    /// Transport went away underneath us
    pub fn on_close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    /// Latest snapshot for a role replaces that ship wholesale, minus any
    /// bullets that already hit the local ship
    fn apply_peer_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        if Some(snapshot.color) == self.ctx.mode.local_role() {
            return;
        }
        let snapshot = self.hits.strip(snapshot);
        self.roster[snapshot.color.index()] = Some(Player::from_snapshot(&snapshot));
        self.hits.rebuilt();
        self.redraw();
    }

    /// Resolve hits against the local ship, then draw a full frame
    pub fn redraw(&mut self) {
        if let Some(role) = self.ctx.mode.local_role() {
            if let Some(bullet) = resolve_hits(&mut self.roster, role) {
                self.hits.record(&bullet, role.other());
            }
        }
        render_frame(&mut self.ctx.surface, &mut self.roster);
        self.hits.frame_drawn();
    }

    fn send(&mut self, event: &Event) -> Result<(), SessionError> {
        let text = event.to_json()?;
        self.ctx.channel.send(text)?;
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn mode(&self) -> &SessionMode {
        &self.ctx.mode
    }

    pub fn player(&self, role: Role) -> Option<&Player> {
        self.roster[role.index()].as_ref()
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.ctx.mode.local_role().and_then(|role| self.player(role))
    }

    pub fn invite_links(&self) -> Option<&InviteLinks> {
        self.invite.as_ref()
    }

    /// Drain pending user-visible messages
    pub fn take_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }

    pub fn channel(&self) -> &C {
        &self.ctx.channel
    }

    pub fn surface(&self) -> &S {
        &self.ctx.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.ctx.surface
    }
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unsupported event type: {0}")]
    UnsupportedEvent(String),

    #[error(transparent)]
    Protocol(ProtocolError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnsupportedType(kind) => Self::UnsupportedEvent(kind),
            other => Self::Protocol(other),
        }
    }
}
