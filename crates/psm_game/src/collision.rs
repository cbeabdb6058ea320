//! Combat resolution, once per tick after every group has updated.
//!
//! The checks run in a fixed order and the order decides which effect wins
//! when several apply in the same tick:
//!
//! 1. player against enemy hulls
//! 2. player shots against enemies
//! 3. shrapnel against the player
//! 4. enemy shots against the player
//! 5. powerups against the player
//!
//! A player and an enemy can destroy each other in step 1 even if a shot
//! would also have killed that enemy in step 2.

use psm_core::geom::Rect;

use crate::audio::{AudioSink, Sound};
use crate::bullet::Bullet;
use crate::enemy::Enemy;
use crate::sprites::SpriteGroups;

const SHOT_DAMAGE: u32 = 1;
const BEAM_DAMAGE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    pub player_died: bool,
    pub boss_destroyed: bool,
}

/// Which of `enemy`'s boxes `hitbox` touches: `None` for none, otherwise
/// whether any of them is a hurtbox.
fn touching(enemy: &Enemy, hitbox: &Rect) -> Option<bool> {
    enemy
        .hitboxes()
        .filter(|(rect, _)| rect.collides(hitbox))
        .fold(None, |hurt, (_, box_)| Some(hurt.unwrap_or(false) || box_.hurtbox))
}

fn damage(bullet: &Bullet, hurtbox: bool, boss_fight: bool) -> u32 {
    if boss_fight && !hurtbox {
        0
    } else if bullet.destroyable {
        SHOT_DAMAGE
    } else {
        BEAM_DAMAGE
    }
}

pub fn resolve(
    groups: &mut SpriteGroups,
    boss_fight: bool,
    now_ms: u64,
    audio: &mut dyn AudioSink,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    let SpriteGroups {
        player,
        enemies,
        player_shots,
        enemy_shots,
        powerups,
        explosions,
        ..
    } = groups;

    // 1. Ramming.
    if player.is_alive() && !player.is_protected() {
        let ship = player.hitbox();
        for enemy in enemies.iter_mut() {
            if !enemy.is_alive() || touching(enemy, &ship).is_none() {
                continue;
            }
            player_shots.kill_all();
            explosions.add(player.explode(now_ms, audio));
            outcome.player_died = true;
            if !boss_fight {
                enemy.kill();
                audio.play(Sound::EnemyExplosion);
                explosions.extend(enemy.explode());
            }
            break;
        }
    }

    // 2. Shots.
    for bullet in player_shots.iter_mut() {
        for enemy in enemies.iter_mut() {
            if !bullet.is_alive() {
                break;
            }
            if !enemy.is_alive() {
                continue;
            }
            let Some(hurtbox) = touching(enemy, &bullet.hitbox()) else {
                continue;
            };
            let dealt = damage(bullet, hurtbox, boss_fight);
            // A beam grazing armour keeps its strike for the hurtbox.
            if !bullet.destroyable && dealt == 0 {
                continue;
            }
            if !bullet.strike(enemy.id) {
                continue;
            }
            if bullet.destroyable {
                bullet.kill();
            }
            if dealt == 0 || !enemy.take_damage(dealt) {
                audio.play(Sound::Hit);
                continue;
            }
            enemy.kill();
            player.score += enemy.kind.points() as u64;
            audio.play(Sound::EnemyExplosion);
            explosions.extend(enemy.explode());
            if let Some(powerup) = enemy.drop_powerup() {
                powerups.add(powerup);
            }
            if enemy.kind.is_boss() {
                log::info!("Boss destroyed");
                outcome.boss_destroyed = true;
            }
        }
    }

    // 3. Shrapnel.
    if player.is_alive() && !player.is_protected() && !player.is_respawning() {
        let ship = player.hitbox();
        let struck = explosions
            .iter()
            .filter_map(|e| e.hitbox())
            .any(|rect| rect.collides(&ship));
        if struck {
            explosions.add(player.explode(now_ms, audio));
            outcome.player_died = true;
        }
    }

    // 4. Enemy fire.
    for shot in enemy_shots.iter_mut() {
        if !player.is_alive() || player.is_protected() {
            break;
        }
        if shot.is_alive() && shot.hitbox().collides(&player.hitbox()) {
            shot.kill();
            explosions.add(player.explode(now_ms, audio));
            outcome.player_died = true;
        }
    }

    // 5. Pickups.
    if player.is_alive() {
        for powerup in powerups.iter_mut() {
            if powerup.is_alive() && powerup.hitbox().collides(&player.hitbox()) {
                player.power_up(powerup.collect());
                audio.play(Sound::PowerUp);
            }
        }
    }

    outcome
}
