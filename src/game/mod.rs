//! Game simulation modules

pub mod bullet;
pub mod bullet_controller;
pub mod player;
pub mod scene;
mod snapshot;
pub mod surface;

pub use bullet::Bullet;
pub use bullet_controller::BulletController;
pub use player::Player;
pub use surface::{DrawCommand, RecordingSurface, Surface};

use serde::{Deserialize, Serialize};

/// Play field width in pixels
pub const WIDTH: f64 = 550.0;
/// Play field height in pixels
pub const HEIGHT: f64 = 600.0;

/// One of the two fixed player identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Creates the game, spawns near the bottom and fires upward
    A,
    /// Joins an existing game, spawns near the top and fires downward
    B,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::A, Role::B];

    /// Fill color used for the ship and its bullets
    pub fn color(self) -> &'static str {
        match self {
            Role::A => "yellow",
            Role::B => "lightgreen",
        }
    }

    /// Divisor applied to the field height to get the spawn row
    fn spawn_offset(self) -> f64 {
        match self {
            Role::A => 1.3,
            Role::B => 6.3,
        }
    }

    /// Fixed spawn point, also used when a ship leaves the field
    pub fn spawn_point(self) -> (f64, f64) {
        (WIDTH / 2.2, HEIGHT / self.spawn_offset())
    }

    /// Vertical direction of this role's bullets (-1 = up)
    pub fn bullet_direction(self) -> f64 {
        match self {
            Role::A => -1.0,
            Role::B => 1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Role::A => 0,
            Role::B => 1,
        }
    }

    pub fn other(self) -> Role {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Anything bullets can be tested against
pub trait Hitbox {
    fn bounds(&self) -> Rect;
}
