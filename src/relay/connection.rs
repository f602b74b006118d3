//! Per-connection routing, independent of the socket it runs on

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::Event;

use super::registry::{Attached, GameRegistry, GameSession, Seat};

/// What became of one inbound frame after the first
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// Broadcast to this many subscribers
    Relayed(usize),
    /// Spectator traffic, dropped silently
    Ignored,
    /// Over the per-connection budget
    RateLimited,
    /// Not a usable play event; the error goes back to this connection only
    Rejected(Event),
}

/// An attached connection; `close` detaches it from the game
pub struct Connection {
    id: Uuid,
    games: Arc<GameRegistry>,
    game: Arc<GameSession>,
    seat: Seat,
    limiter: PlayerRateLimiter,
}

/// A freshly opened connection with what it must receive first
pub struct Opened {
    pub connection: Connection,
    pub rx: broadcast::Receiver<String>,
    pub replies: Vec<Event>,
}

impl Connection {
    /// Route the first frame. Anything but a valid `init` yields the error
    /// event to send before closing.
    pub fn open(id: Uuid, games: Arc<GameRegistry>, first_frame: &str) -> Result<Opened, Event> {
        Self::open_with_limiter(id, games, first_frame, PlayerRateLimiter::new())
    }

    pub fn open_with_limiter(
        id: Uuid,
        games: Arc<GameRegistry>,
        first_frame: &str,
        limiter: PlayerRateLimiter,
    ) -> Result<Opened, Event> {
        let attached = Event::from_json(first_frame)
            .map_err(|e| e.to_string())
            .and_then(|event| games.attach(event).map_err(|e| e.to_string()));

        let Attached {
            game,
            seat,
            rx,
            replies,
        } = match attached {
            Ok(attached) => attached,
            Err(message) => {
                warn!(conn_id = %id, error = %message, "Rejected init");
                return Err(Event::error(message));
            }
        };

        Ok(Opened {
            connection: Connection {
                id,
                games,
                game,
                seat,
                limiter,
            },
            rx,
            replies,
        })
    }

    pub fn game(&self) -> &Arc<GameSession> {
        &self.game
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Handle a frame received after `init`
    pub fn on_frame(&self, text: &str) -> Inbound {
        if !self.seat.can_play() {
            debug!(conn_id = %self.id, "Ignoring message from spectator");
            return Inbound::Ignored;
        }

        if !self.limiter.check_input() {
            warn!(conn_id = %self.id, "Rate limited play message");
            return Inbound::RateLimited;
        }

        let result = Event::from_json(text)
            .map_err(|e| e.to_string())
            .and_then(|event| {
                self.games
                    .relay(&self.game, self.seat, event)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(reached) => {
                debug!(conn_id = %self.id, game_id = %self.game.id, reached, "Relayed play event");
                Inbound::Relayed(reached)
            }
            Err(message) => {
                warn!(conn_id = %self.id, error = %message, "Rejected message");
                Inbound::Rejected(Event::error(message))
            }
        }
    }

    /// Connection ended; a departing creator takes the game's keys with it
    pub fn close(self) {
        self.games.detach(&self.game, self.seat);
    }
}
