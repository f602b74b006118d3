//! Frame composition and hit resolution between the two ships

use tracing::debug;

use super::{Bullet, Player, Role, Surface, HEIGHT, WIDTH};

/// Both ship slots, indexed by `Role::index`
pub type Roster = [Option<Player>; 2];

fn set_common_style<S: Surface + ?Sized>(surface: &mut S) {
    surface.set_shadow("#d53", 20.0);
    surface.set_line_join("bevel");
    surface.set_line_width(5.0);
    surface.set_fill_style("black");
    surface.fill_rect(0.0, 0.0, WIDTH, HEIGHT);
}

/// Clear the field, then draw bullets and ship for A and B in that order
pub fn render_frame<S: Surface + ?Sized>(surface: &mut S, roster: &mut Roster) {
    set_common_style(surface);
    for player in roster.iter_mut().flatten() {
        player.bullet_controller.draw(surface);
        player.draw(surface);
    }
}

/// Apply the peer's bullets to the local ship and retire local bullets
/// that reached the peer. Returns the peer bullet that hit, if any.
pub fn resolve_hits(roster: &mut Roster, local: Role) -> Option<Bullet> {
    let [a, b] = roster;
    let (mine, theirs) = match local {
        Role::A => (a, b),
        Role::B => (b, a),
    };
    let (Some(me), Some(peer)) = (mine.as_mut(), theirs.as_mut()) else {
        return None;
    };

    let hit = peer.bullet_controller.take_hit(&*me);
    if let Some(bullet) = &hit {
        me.take_damage(bullet.damage);
        debug!(role = ?local, damage = bullet.damage, health = me.health, "Local ship hit");
    }

    me.bullet_controller.collide_with(&*peer);
    hit
}
