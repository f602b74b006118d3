//! Locally controllable ship

use super::{BulletController, Hitbox, Rect, Role, Surface, HEIGHT, WIDTH};

/// Weapon tuning shared by both roles
pub const BULLET_SPEED: f64 = 2.0;
pub const BULLET_DELAY: i32 = 7;
pub const BULLET_DAMAGE: i32 = 1;

/// Health every ship starts with
pub const STARTING_HEALTH: i32 = 100;

/// Keyboard intent, one flag per handled key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
}

impl Intent {
    /// Set or clear the flag bound to `code`; returns false for unbound keys
    pub fn apply(&mut self, code: &str, pressed: bool) -> bool {
        let flag = match code {
            "ArrowUp" => &mut self.up,
            "ArrowDown" => &mut self.down,
            "ArrowLeft" => &mut self.left,
            "ArrowRight" => &mut self.right,
            "Space" => &mut self.shoot,
            _ => return false,
        };
        *flag = pressed;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub role: Role,
    pub health: i32,
    pub bullet_controller: BulletController,
    pub intent: Intent,
}

impl Player {
    pub const WIDTH: f64 = 50.0;
    pub const HEIGHT: f64 = 50.0;
    pub const SPEED: f64 = 5.0;

    pub fn new(
        x: f64,
        y: f64,
        role: Role,
        health: i32,
        bullet_controller: BulletController,
    ) -> Self {
        Self {
            x,
            y,
            role,
            health,
            bullet_controller,
            intent: Intent::default(),
        }
    }

    /// Fresh ship at the role's spawn point
    pub fn spawn(role: Role) -> Self {
        let (x, y) = role.spawn_point();
        Self::new(x, y, role, STARTING_HEALTH, BulletController::new(role))
    }

    /// Move, render, then try to fire
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.move_step();

        if self.health > 1 {
            surface.set_stroke_style("white");
        } else {
            surface.set_stroke_style("red");
        }
        surface.stroke_rect(self.x, self.y, Self::WIDTH, Self::HEIGHT);
        surface.set_fill_style(self.role.color());
        surface.fill_rect(self.x, self.y, Self::WIDTH, Self::HEIGHT);

        self.shoot();
    }

    /// No floor and no death transition: health may go negative.
    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    /// Strictly inside the field on all four sides
    pub fn in_bounds(&self) -> bool {
        self.x > 0.0
            && self.y > 0.0
            && self.x + Self::WIDTH < WIDTH
            && self.y + Self::HEIGHT < HEIGHT
    }

    /// Apply intent while inside the field; once outside, snap back to spawn.
    pub fn move_step(&mut self) {
        if !self.in_bounds() {
            (self.x, self.y) = self.role.spawn_point();
            return;
        }

        if self.intent.down {
            self.y += Self::SPEED;
        }
        if self.intent.up {
            self.y -= Self::SPEED;
        }
        if self.intent.left {
            self.x -= Self::SPEED;
        }
        if self.intent.right {
            self.x += Self::SPEED;
        }
    }

    /// Where new bullets appear: the edge facing the opponent
    pub fn muzzle(&self) -> (f64, f64) {
        let y = match self.role {
            Role::A => self.y,
            Role::B => self.y + Self::HEIGHT,
        };
        (self.x + Self::WIDTH / 2.0, y)
    }

    pub fn shoot(&mut self) {
        if self.intent.shoot {
            let (x, y) = self.muzzle();
            self.bullet_controller
                .shoot(x, y, BULLET_SPEED, BULLET_DAMAGE, BULLET_DELAY);
        }
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.intent.apply(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.intent.apply(code, false)
    }
}

impl Hitbox for Player {
    fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: Self::WIDTH,
            height: Self::HEIGHT,
        }
    }
}
