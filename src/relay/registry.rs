//! Game registry: join/watch keys, latest snapshots and per-game broadcast

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::Role;
use crate::util::keys::generate_key;
use crate::ws::protocol::{Event, PlayerSnapshot};

/// Buffered frames per subscriber before it starts lagging
const BROADCAST_CAPACITY: usize = 64;

/// One running game: two player seats plus spectators
pub struct GameSession {
    pub id: Uuid,
    pub join_key: String,
    pub watch_key: String,
    tx: broadcast::Sender<String>,
    latest: Mutex<[Option<PlayerSnapshot>; 2]>,
}

impl GameSession {
    fn new(join_key: String, watch_key: String) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            join_key,
            watch_key,
            tx,
            latest: Mutex::new([None, None]),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Remember a snapshot as the newest state for its role
    pub fn record(&self, snapshot: PlayerSnapshot) {
        let index = snapshot.color.index();
        self.latest.lock()[index] = Some(snapshot);
    }

    pub fn latest(&self, role: Role) -> Option<PlayerSnapshot> {
        self.latest.lock()[role.index()].clone()
    }

    /// `play` events for every role seen so far, A first
    pub fn replay(&self) -> Vec<Event> {
        self.latest
            .lock()
            .iter()
            .flatten()
            .cloned()
            .map(|player| Event::Play { player })
            .collect()
    }

    /// Record and fan out to every connection of this game.
    /// Returns the number of subscribers reached.
    pub fn publish(&self, snapshot: PlayerSnapshot) -> usize {
        self.record(snapshot.clone());
        let frame = match (Event::Play { player: snapshot }).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(game_id = %self.id, error = %e, "Failed to encode play event");
                return 0;
            }
        };
        // no subscribers is not an error
        self.tx.send(frame).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Which part a connection plays in its game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Creator,
    Joiner,
    Spectator,
}

impl Seat {
    pub fn can_play(self) -> bool {
        !matches!(self, Seat::Spectator)
    }
}

/// Result of routing an `init` event
pub struct Attached {
    pub game: Arc<GameSession>,
    pub seat: Seat,
    /// Subscribed before any replay was captured
    pub rx: broadcast::Receiver<String>,
    /// Events to send to this connection only, in order
    pub replies: Vec<Event>,
}

/// Registry of all active games, indexed by both key kinds
pub struct GameRegistry {
    competitors: DashMap<String, Arc<GameSession>>,
    watchers: DashMap<String, Arc<GameSession>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            competitors: DashMap::new(),
            watchers: DashMap::new(),
        }
    }

    /// Route a connection's first event.
    ///
    /// Both keys or neither: create. Only `join`: join as the second
    /// player. Only `watch`: spectate.
    pub fn attach(&self, event: Event) -> Result<Attached, RelayError> {
        let Event::Init {
            join,
            watch,
            player,
        } = event
        else {
            return Err(RelayError::ExpectedInit);
        };

        match (join, watch) {
            (Some(join), None) => self.join(&join, player),
            (None, Some(watch)) => self.watch(&watch),
            (join, watch) => self.create(
                join.unwrap_or_else(generate_key),
                watch.unwrap_or_else(generate_key),
                player,
            ),
        }
    }

    fn create(
        &self,
        join_key: String,
        watch_key: String,
        player: Option<PlayerSnapshot>,
    ) -> Result<Attached, RelayError> {
        if join_key == watch_key {
            return Err(RelayError::KeyInUse);
        }
        let game = Arc::new(GameSession::new(join_key.clone(), watch_key.clone()));

        match self.competitors.entry(join_key.clone()) {
            Entry::Occupied(_) => return Err(RelayError::KeyInUse),
            Entry::Vacant(slot) => {
                slot.insert(game.clone());
            }
        }
        // Claim the watch key under its shard lock; release the join key if it is taken
        match self.watchers.entry(watch_key.clone()) {
            Entry::Occupied(_) => {
                self.competitors
                    .remove_if(&join_key, |_, existing| Arc::ptr_eq(existing, &game));
                return Err(RelayError::KeyInUse);
            }
            Entry::Vacant(slot) => {
                slot.insert(game.clone());
            }
        }

        if let Some(snapshot) = player {
            game.record(snapshot);
        }

        info!(game_id = %game.id, "Game created");

        Ok(Attached {
            rx: game.subscribe(),
            game,
            seat: Seat::Creator,
            replies: vec![Event::Init {
                join: Some(join_key),
                watch: Some(watch_key),
                player: None,
            }],
        })
    }

    fn join(&self, key: &str, player: Option<PlayerSnapshot>) -> Result<Attached, RelayError> {
        let game = self
            .competitors
            .get(key)
            .map(|g| g.value().clone())
            .ok_or(RelayError::GameNotFound)?;

        let rx = game.subscribe();
        let replies = game.replay();
        if let Some(snapshot) = player {
            game.publish(snapshot);
        }

        info!(game_id = %game.id, "Second player joined");

        Ok(Attached {
            game,
            seat: Seat::Joiner,
            rx,
            replies,
        })
    }

    fn watch(&self, key: &str) -> Result<Attached, RelayError> {
        let game = self
            .watchers
            .get(key)
            .map(|g| g.value().clone())
            .ok_or(RelayError::GameNotFound)?;

        let rx = game.subscribe();
        let replies = game.replay();

        debug!(game_id = %game.id, "Spectator attached");

        Ok(Attached {
            game,
            seat: Seat::Spectator,
            rx,
            replies,
        })
    }

    /// Forward a `play` event from a player connection
    pub fn relay(&self, game: &GameSession, seat: Seat, event: Event) -> Result<usize, RelayError> {
        if !seat.can_play() {
            return Err(RelayError::SpectatorsCannotPlay);
        }
        match event {
            Event::Play { player } => Ok(game.publish(player)),
            _ => Err(RelayError::ExpectedPlay),
        }
    }

    /// Connection ended; a departing creator takes the keys with it
    pub fn detach(&self, game: &GameSession, seat: Seat) {
        if seat == Seat::Creator {
            self.competitors.remove(&game.join_key);
            self.watchers.remove(&game.watch_key);
            info!(game_id = %game.id, "Game closed");
        }
    }

    pub fn active_games(&self) -> usize {
        self.competitors.len()
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay errors; the message text is what the client sees
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Game not found.")]
    GameNotFound,

    #[error("Game key already in use.")]
    KeyInUse,

    #[error("Expected an init event.")]
    ExpectedInit,

    #[error("Expected a play event.")]
    ExpectedPlay,

    #[error("Spectators cannot play.")]
    SpectatorsCannotPlay,
}
