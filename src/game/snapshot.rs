//! Conversions between live game state and wire snapshots

use crate::ws::protocol::{BulletControllerSnapshot, BulletSnapshot, PlayerSnapshot};

use super::{Bullet, BulletController, Player, Role};

impl From<&Bullet> for BulletSnapshot {
    fn from(b: &Bullet) -> Self {
        Self {
            x: b.x,
            y: b.y,
            speed: b.speed,
            damage: b.damage,
        }
    }
}

impl From<&BulletSnapshot> for Bullet {
    fn from(b: &BulletSnapshot) -> Self {
        Bullet::new(b.x, b.y, b.speed, b.damage)
    }
}

impl BulletController {
    pub fn snapshot(&self) -> BulletControllerSnapshot {
        BulletControllerSnapshot {
            bullets: self.bullets().iter().map(BulletSnapshot::from).collect(),
            timer_till_next_bullet: self.timer_till_next_bullet(),
        }
    }

    /// Rebuild a controller wholesale; nothing carries over from a previous one
    pub fn from_snapshot(owner: Role, snapshot: &BulletControllerSnapshot) -> Self {
        Self::with_state(
            owner,
            snapshot.bullets.iter().map(Bullet::from).collect(),
            snapshot.timer_till_next_bullet,
        )
    }
}

impl Player {
    /// Serializable state; intent flags stay local
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.x,
            y: self.y,
            color: self.role,
            health: self.health,
            bullet_controller: self.bullet_controller.snapshot(),
        }
    }

    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Player::new(
            snapshot.x,
            snapshot.y,
            snapshot.color,
            snapshot.health,
            BulletController::from_snapshot(snapshot.color, &snapshot.bullet_controller),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Event;

    #[test]
    fn test_player_survives_the_wire() {
        let mut player = Player::spawn(Role::B);
        player.health = 42;
        player.key_down("Space");
        player.shoot();
        player.x += 15.0;

        let json = Event::Play {
            player: player.snapshot(),
        }
        .to_json()
        .unwrap();
        let Event::Play { player: received } = Event::from_json(&json).unwrap() else {
            panic!("expected play event");
        };
        let rebuilt = Player::from_snapshot(&received);

        assert_eq!((rebuilt.x, rebuilt.y), (player.x, player.y));
        assert_eq!(rebuilt.role, Role::B);
        assert_eq!(rebuilt.health, 42);
        assert_eq!(rebuilt.bullet_controller, player.bullet_controller);
        // intent is never transmitted
        assert!(!rebuilt.intent.shoot);
    }
}
