//! Combat resolution
//!
//! Player fire against enemies (with falloff, piercing, and re-hit windows),
//! enemy fire and body contact against the player (with invincibility, dash
//! and shield rules), kill payouts and loot rolls.

use crate::consts::*;
use crate::sim::det_hash;
use crate::sim::state::{
    EnemyKind, GameEvent, GamePhase, GameState, Item, ItemKind, Projectile, ProjectileKind,
    WeaponKind, FX_CYAN, FX_GREEN, FX_ORANGE, FX_RED, FX_YELLOW,
};

/// Spread falloff thresholds: damage drops with distance from the muzzle
const FALLOFF_NEAR: f32 = 150.0;
const FALLOFF_FAR: f32 = 300.0;

/// Resolve every player projectile against every targetable enemy.
pub fn resolve_player_hits(state: &mut GameState) {
    let frame = state.frame;

    // (impact x, impact y, was cannon) for deferred effects
    let mut impacts: Vec<(f32, f32, bool)> = Vec::new();
    let mut popups: Vec<(f32, f32, f32)> = Vec::new();

    {
        let (projectiles, enemies) = (&mut state.projectiles, &mut state.enemies);
        for proj in projectiles.iter_mut() {
            if !proj.from_player || proj.life == 0 {
                continue;
            }
            for enemy in enemies.iter_mut() {
                if !enemy.targetable() {
                    continue;
                }
                if !proj.rect().overlaps(&enemy.rect()) {
                    continue;
                }

                // Persistent area shots re-hit the same enemy on a cooldown
                let persistent = matches!(
                    proj.kind,
                    ProjectileKind::Cannon | ProjectileKind::Explosion
                );
                if persistent {
                    if let Some(last) = proj.last_hit(enemy.id) {
                        if frame.saturating_sub(last) < CANNON_REHIT_WINDOW {
                            continue;
                        }
                    }
                    proj.record_hit(enemy.id, frame);
                }

                let mut dmg = proj.damage;
                if proj.weapon == Some(WeaponKind::Spread) {
                    let traveled = (proj.x - proj.origin_x).abs();
                    if traveled > FALLOFF_FAR {
                        dmg *= 0.2;
                    } else if traveled > FALLOFF_NEAR {
                        dmg *= 0.5;
                    }
                }

                enemy.hp -= dmg;
                popups.push((enemy.x, enemy.y, dmg));
                impacts.push((proj.x, proj.y, proj.kind == ProjectileKind::Cannon));

                // Everything except cannon shells, blast areas and laser
                // bolts is spent on the first hit
                let pierces = persistent || proj.weapon == Some(WeaponKind::Laser);
                if !pierces {
                    proj.life = 0;
                    break;
                }
            }
        }
    }

    for (x, y, dmg) in popups {
        state.push_popup(x, y, format!("{}", dmg.floor() as i64), FX_CYAN);
    }
    for (x, y, cannon) in impacts {
        if cannon {
            state.spawn_burst(x, y, 20, FX_ORANGE);
            state.add_shake(5.0);
        } else {
            state.spawn_burst(x, y, 5, FX_GREEN);
        }
    }

    handle_kills(state);
}

/// Sweep enemies whose hp dropped to zero: bosses enter the scripted dying
/// state, everything else pays out immediately.
fn handle_kills(state: &mut GameState) {
    let frame = state.frame;
    let mut payouts: Vec<(f32, f32, EnemyKind, u32, u64)> = Vec::new();
    let mut boss_felled: Option<(f32, f32)> = None;

    for enemy in &mut state.enemies {
        if !enemy.targetable() || enemy.hp > 0.0 {
            continue;
        }
        if enemy.kind == EnemyKind::Boss {
            enemy.dying = Some(BOSS_DEATH_DURATION);
            boss_felled = Some((enemy.x, enemy.y - 50.0));
        } else {
            enemy.dead = true;
            payouts.push((
                enemy.center_x(),
                enemy.center_y(),
                enemy.kind,
                enemy.id,
                enemy.kind.score_value(),
            ));
        }
    }

    if let Some((x, y)) = boss_felled {
        state.time_scale = BOSS_DEATH_TIME_SCALE;
        state.push_popup(x, y, "FINISH HIM!", FX_RED);
    }

    for (cx, cy, kind, id, score) in payouts {
        if kind == EnemyKind::Barrel {
            detonate_barrel(state, cx, cy);
        } else {
            state.spawn_burst(cx, cy, 20, FX_GREEN);
        }
        let coins = score / 10;
        state.award(score, coins);
        state.push_popup(cx, cy - 30.0, format!("+{coins}$"), FX_YELLOW);
        roll_loot(state, frame, id, cx, cy);
    }
}

/// Barrels trade their score for a big transient blast area that damages
/// whatever stands in it.
fn detonate_barrel(state: &mut GameState, cx: f32, cy: f32) {
    state.add_shake(15.0);
    state.spawn_burst(cx, cy, 40, FX_ORANGE);
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        kind: ProjectileKind::Explosion,
        x: cx - 100.0,
        y: cy - 100.0,
        width: 200.0,
        height: 200.0,
        vx: 0.0,
        vy: 0.0,
        damage: 50.0,
        from_player: true,
        life: 2,
        weapon: None,
        origin_x: cx,
        has_gravity: false,
        hit_log: Vec::new(),
    });
}

/// 35% of kills drop something: mostly coins, sometimes health, sometimes a
/// weapon tier. Rolls hash off (frame, enemy id) so runs replay identically.
fn roll_loot(state: &mut GameState, frame: u64, enemy_id: u32, x: f32, y: f32) {
    let hash = det_hash(frame, enemy_id);
    if (hash % 1000) as f32 >= LOOT_CHANCE * 1000.0 {
        return;
    }
    let kind_roll = (hash >> 10) % 1000;
    let kind = if kind_roll > 800 {
        let weapon = match (hash >> 20) % 3 {
            0 => WeaponKind::Spread,
            1 => WeaponKind::Laser,
            _ => WeaponKind::RapidFire,
        };
        ItemKind::Weapon(weapon)
    } else if kind_roll > 600 {
        ItemKind::Health
    } else {
        ItemKind::Coin
    };
    let id = state.next_entity_id();
    state.items.push(Item {
        id,
        kind,
        x,
        y,
        vx: 0.0,
        vy: -8.0,
    });
}

/// Resolve enemy projectiles and enemy body contact against the player.
pub fn resolve_enemy_hits(state: &mut GameState) {
    if state.player.invincible_timer > 0 || state.player.dead {
        return;
    }

    // Enemy bullets
    let mut absorbed: Vec<(f32, f32)> = Vec::new();
    let mut hit = false;
    {
        let player_rect = state.player.rect();
        let shield = state.player.shield_active;
        for proj in &mut state.projectiles {
            if proj.from_player || proj.life == 0 {
                continue;
            }
            if !proj.rect().overlaps(&player_rect) {
                continue;
            }
            proj.life = 0;
            if shield {
                absorbed.push((proj.x, proj.y));
            } else {
                hit = true;
            }
        }
    }
    for (x, y) in absorbed {
        state.spawn_burst(x, y, 5, FX_CYAN);
    }
    if hit {
        damage_player(state, 1.0);
        return;
    }

    // Body contact; dashing phases through, shield knocks back
    if state.player.dash_timer > 0 {
        return;
    }
    let player_rect = state.player.rect();
    let mut contact = false;
    let mut shielded_contact = false;
    for enemy in &state.enemies {
        if !enemy.targetable() || !enemy.rect().overlaps(&player_rect) {
            continue;
        }
        if state.player.shield_active {
            shielded_contact = true;
        } else {
            contact = true;
        }
        break;
    }
    if shielded_contact {
        state.player.vx = -state.player.vx * 2.0;
        state.player.vy = -5.0;
        let (x, y) = (state.player.x, state.player.y);
        state.spawn_burst(x, y, 10, FX_CYAN);
    } else if contact {
        damage_player(state, 1.0);
    }
}

/// Apply damage to the player, respecting invincibility, and run the death
/// transition at most once per life.
pub fn damage_player(state: &mut GameState, amount: f32) {
    let player = &mut state.player;
    if player.invincible_timer > 0 || player.dead {
        return;
    }
    player.hp = (player.hp - amount).max(0.0);
    player.invincible_timer = HIT_INVINCIBILITY;
    let hp = player.hp;
    let (x, y) = (player.x, player.y);

    state.add_shake(10.0);
    state.spawn_burst(x, y, 10, FX_RED);
    state.push_popup(x, y, format!("-{}", amount.floor() as i64), FX_RED);
    state.push_event(GameEvent::PlayerDamaged { amount, hp });

    if hp <= 0.0 {
        handle_death(state);
    }
}

fn handle_death(state: &mut GameState) {
    state.player.dead = true;
    state.stats.lives -= 1;
    log::info!("player down, {} lives left", state.stats.lives);
    state.push_event(GameEvent::PlayerDied {
        lives_left: state.stats.lives,
    });

    if state.stats.lives < 0 {
        state.phase = GamePhase::GameOver;
        let summary = state.run_summary("");
        state.push_event(GameEvent::GameOver { summary });
    } else {
        state.respawn_timer = RESPAWN_DELAY;
    }
}
