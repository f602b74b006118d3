//! Per-player bullet ownership: spawning on a cooldown, eviction, hit tests

use super::{Bullet, Hitbox, Role, Surface};

/// Live bullets of one player
#[derive(Debug, Clone, PartialEq)]
pub struct BulletController {
    owner: Role,
    bullets: Vec<Bullet>,
    timer_till_next_bullet: i32,
}

impl BulletController {
    pub fn new(owner: Role) -> Self {
        Self::with_state(owner, Vec::new(), 0)
    }

    pub fn with_state(owner: Role, bullets: Vec<Bullet>, timer_till_next_bullet: i32) -> Self {
        Self {
            owner,
            bullets,
            timer_till_next_bullet,
        }
    }

    pub fn owner(&self) -> Role {
        self.owner
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn timer_till_next_bullet(&self) -> i32 {
        self.timer_till_next_bullet
    }

    /// Spawn a bullet if the cooldown has run out.
    ///
    /// The timer ticks down on every call; after a shot it reads `delay`,
    /// so at most one bullet leaves every `delay` calls.
    pub fn shoot(&mut self, x: f64, y: f64, speed: f64, damage: i32, delay: i32) {
        self.timer_till_next_bullet -= 1;
        if self.timer_till_next_bullet <= 0 {
            self.bullets.push(Bullet::new(x, y, speed, damage));
            self.timer_till_next_bullet = delay;
        }
    }

    /// Evict off-screen bullets, then advance and render the rest
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.bullets.retain(|b| !b.is_off_screen());

        let direction = self.owner.bullet_direction();
        let color = self.owner.color();
        for bullet in &mut self.bullets {
            bullet.advance(direction);
            bullet.draw(surface, color);
        }
    }

    /// Remove and return the first bullet touching `target`
    pub fn take_hit<T: Hitbox + ?Sized>(&mut self, target: &T) -> Option<Bullet> {
        let pos = self.bullets.iter().position(|b| b.collides_with(target))?;
        Some(self.bullets.remove(pos))
    }

    /// True if a bullet hit `target`; at most one bullet is consumed per call
    pub fn collide_with<T: Hitbox + ?Sized>(&mut self, target: &T) -> bool {
        self.take_hit(target).is_some()
    }
}
