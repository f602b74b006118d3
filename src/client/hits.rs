//! Memory of peer bullets that already damaged the local ship
//!
//! A peer snapshot rebuilds its bullets from scratch, so a bullet consumed
//! here comes back if the same snapshot is delivered twice. The ledger
//! remembers consumed bullets by the coordinates they had in the snapshot
//! that delivered them and strips them from later snapshots.

use std::collections::VecDeque;

use tracing::debug;

use crate::game::{Bullet, Role};
use crate::ws::protocol::PlayerSnapshot;

/// Consumed bullets remembered per peer
const LEDGER_CAPACITY: usize = 32;

/// Float slack when matching a rewound position against wire values
const POSITION_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
struct Consumed {
    x: f64,
    y: f64,
    speed: f64,
    damage: i32,
}

impl Consumed {
    fn matches(&self, x: f64, y: f64, speed: f64, damage: i32) -> bool {
        self.damage == damage
            && self.speed == speed
            && (self.x - x).abs() < POSITION_EPSILON
            && (self.y - y).abs() < POSITION_EPSILON
    }
}

#[derive(Debug, Default)]
pub struct HitLedger {
    consumed: VecDeque<Consumed>,
    /// Frames drawn since the peer was last rebuilt from a snapshot
    frames: u32,
}

impl HitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop bullets that already hit us from an incoming peer snapshot
    pub fn strip(&self, snapshot: &PlayerSnapshot) -> PlayerSnapshot {
        let mut stripped = snapshot.clone();
        stripped.bullet_controller.bullets.retain(|b| {
            !self
                .consumed
                .iter()
                .any(|c| c.matches(b.x, b.y, b.speed, b.damage))
        });

        let dropped =
            snapshot.bullet_controller.bullets.len() - stripped.bullet_controller.bullets.len();
        if dropped > 0 {
            debug!(role = ?snapshot.color, dropped, "Skipped bullets that already hit");
        }
        stripped
    }

    /// The peer was just rebuilt from a snapshot
    pub fn rebuilt(&mut self) {
        self.frames = 0;
    }

    /// One frame advanced every peer bullet by one step
    pub fn frame_drawn(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    /// Remember a peer bullet at the position it had on the wire
    pub fn record(&mut self, bullet: &Bullet, owner: Role) {
        let travelled = bullet.speed * owner.bullet_direction() * f64::from(self.frames);
        if self.consumed.len() == LEDGER_CAPACITY {
            self.consumed.pop_front();
        }
        self.consumed.push_back(Consumed {
            x: bullet.x,
            y: bullet.y - travelled,
            speed: bullet.speed,
            damage: bullet.damage,
        });
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}
