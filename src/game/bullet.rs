//! Projectile record

use super::{Hitbox, Rect, Surface, HEIGHT};

/// A single projectile travelling along a vertical line
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub damage: i32,
}

impl Bullet {
    pub const WIDTH: f64 = 5.0;
    pub const HEIGHT: f64 = 20.0;

    pub fn new(x: f64, y: f64, speed: f64, damage: i32) -> Self {
        Self { x, y, speed, damage }
    }

    /// Past the top edge, or past the bottom edge for downward shots
    pub fn is_off_screen(&self) -> bool {
        self.y <= -Self::HEIGHT || self.y >= HEIGHT
    }

    /// Move one step; `direction` is -1 for up, 1 for down
    pub fn advance(&mut self, direction: f64) {
        self.y += self.speed * direction;
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, color: &str) {
        surface.set_fill_style(color);
        surface.fill_rect(self.x, self.y, Self::WIDTH, Self::HEIGHT);
    }

    pub fn collides_with<T: Hitbox + ?Sized>(&self, target: &T) -> bool {
        self.bounds().intersects(&target.bounds())
    }
}

impl Hitbox for Bullet {
    fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: Self::WIDTH,
            height: Self::HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_screen_edges() {
        assert!(Bullet::new(10.0, -Bullet::HEIGHT, 2.0, 1).is_off_screen());
        assert!(!Bullet::new(10.0, -Bullet::HEIGHT + 0.5, 2.0, 1).is_off_screen());
        assert!(Bullet::new(10.0, HEIGHT, 2.0, 1).is_off_screen());
    }

    #[test]
    fn test_advance_follows_direction() {
        let mut bullet = Bullet::new(0.0, 100.0, 2.0, 1);
        bullet.advance(-1.0);
        assert_eq!(bullet.y, 98.0);
        bullet.advance(1.0);
        bullet.advance(1.0);
        assert_eq!(bullet.y, 102.0);
    }
}
