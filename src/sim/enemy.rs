//! Enemy behavior and boss choreography
//!
//! Each kind is stateless across ticks beyond its stored timers: walkers and
//! jumpers pursue on the ground, flyers ease toward a hover point, turrets
//! hold position and shoot, the boss cycles three bullet patterns, barrels
//! just sit there waiting to be shot.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::consts::*;
use crate::normalize_angle;
use crate::sim::collision::platform_landing;
use crate::sim::det_hash;
use crate::sim::level::{FINAL_LEVEL, config_for};
use crate::sim::state::{
    EnemyKind, GameEvent, GamePhase, GameState, Projectile, ProjectileKind, FX_ORANGE, FX_RED,
};

/// Landing tolerance band for enemies (a little tighter than the player's)
const ENEMY_LANDING_TOLERANCE: f32 = 25.0;

/// A projectile request deferred until the enemy loop releases its borrows
struct Shot {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    vx: f32,
    vy: f32,
    damage: f32,
    life: u32,
    has_gravity: bool,
}

/// Advance every enemy by one tick: death sequences first, then movement and
/// attacks for the rest.
pub fn update_enemies(state: &mut GameState) {
    update_dying(state);

    let frame = state.frame;
    let aggro = config_for(state.stats.level)
        .map(|c| c.boss_aggro)
        .unwrap_or(1);
    let player_x = state.player.x;
    let player_cx = state.player.center_x();
    let player_cy = state.player.center_y();

    let mut shots: Vec<Shot> = Vec::new();
    let mut boss_firing = false;

    {
        let platforms = &state.platforms;
        for enemy in &mut state.enemies {
            if enemy.dead || enemy.dying.is_some() {
                continue;
            }
            if (enemy.x - player_x).abs() >= AGGRO_RADIUS {
                continue;
            }

            match enemy.kind {
                EnemyKind::Boss => {
                    let dir = if player_x > enemy.x { 1.0 } else { -1.0 };
                    enemy.x += dir * BOSS_SPEED;
                    if fire_boss_pattern(enemy, frame, aggro, player_cx, player_cy, &mut shots) {
                        boss_firing = true;
                    }
                }
                EnemyKind::Barrel => {}
                EnemyKind::Walker | EnemyKind::Jumper => {
                    let dir = if player_x > enemy.x { 1.0 } else { -1.0 };
                    let speed = if enemy.kind == EnemyKind::Walker {
                        WALKER_SPEED
                    } else {
                        JUMPER_SPEED
                    };
                    enemy.vx = dir * speed;
                    enemy.x += enemy.vx;
                    enemy.vy += GRAVITY;
                    enemy.y += enemy.vy;

                    let rect = enemy.rect();
                    for platform in platforms {
                        if let Some(landing) =
                            platform_landing(&rect, enemy.vy, &platform.rect(), ENEMY_LANDING_TOLERANCE)
                        {
                            enemy.vy = 0.0;
                            enemy.y = landing.snap_y;
                            // Jumpers occasionally spring off the ground
                            if enemy.kind == EnemyKind::Jumper
                                && det_hash(frame, enemy.id) % 1000 < 20
                            {
                                enemy.vy = -18.0;
                            }
                        }
                    }
                }
                EnemyKind::Flyer => {
                    let dir = if player_x > enemy.x { 1.0 } else { -1.0 };
                    enemy.x += dir * FLYER_SPEED;
                    let target_y = player_cy - 100.0;
                    let bob = (frame as f32 / 20.0 + enemy.anim_offset).sin() * 2.0;
                    enemy.y += (target_y - enemy.y) * 0.02 + bob;
                }
                EnemyKind::Turret => {}
            }

            // Periodic aimed fire for the ranged kinds
            if matches!(enemy.kind, EnemyKind::Turret | EnemyKind::Flyer) {
                if enemy.shoot_timer == 0 {
                    enemy.shoot_timer = ENEMY_SHOOT_INTERVAL;
                    let cx = enemy.center_x();
                    let cy = enemy.center_y();
                    let angle = (player_cy - cy).atan2(player_cx - cx);
                    shots.push(Shot {
                        x: cx,
                        y: cy,
                        width: 8.0,
                        height: 8.0,
                        vx: angle.cos() * ENEMY_SHOT_SPEED,
                        vy: angle.sin() * ENEMY_SHOT_SPEED,
                        damage: 1.0,
                        life: 100,
                        has_gravity: false,
                    });
                } else {
                    enemy.shoot_timer -= 1;
                }
            }
        }
    }

    if boss_firing {
        state.add_shake(2.0);
    }
    for shot in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            kind: ProjectileKind::Normal,
            x: shot.x,
            y: shot.y,
            width: shot.width,
            height: shot.height,
            vx: shot.vx,
            vy: shot.vy,
            damage: shot.damage,
            from_player: false,
            life: shot.life,
            weapon: None,
            origin_x: shot.x,
            has_gravity: shot.has_gravity,
            hit_log: Vec::new(),
        });
    }
}

/// Boss attack scheduler. The pattern phase and spiral rotation derive from
/// the global tick counter, so choreography is identical for a given frame
/// regardless of wall clock. Returns whether anything was fired.
fn fire_boss_pattern(
    boss: &mut crate::sim::state::Enemy,
    frame: u64,
    aggro: u32,
    player_cx: f32,
    player_cy: f32,
    shots: &mut Vec<Shot>,
) -> bool {
    let interval = (20u64).saturating_sub(aggro as u64 * 2).max(5);
    if frame % interval != 0 {
        return false;
    }

    let cx = boss.center_x();
    let cy = boss.center_y();
    let cycle = (frame / 120) % 3;

    match cycle {
        0 => {
            // Rotating radial burst; arm count scales with aggression
            let arms = 3 + aggro;
            let angle_offset = frame as f32 * 0.1;
            for i in 0..arms {
                let angle = angle_offset + TAU / arms as f32 * i as f32;
                shots.push(Shot {
                    x: cx,
                    y: cy,
                    width: 10.0,
                    height: 10.0,
                    vx: angle.cos() * BOSS_SHOT_SPEED,
                    vy: angle.sin() * BOSS_SHOT_SPEED,
                    damage: 1.0,
                    life: 200,
                    has_gravity: false,
                });
            }
        }
        1 => {
            // Aimed fan at the player
            let target = (player_cy - cy).atan2(player_cx - cx);
            let spread = (3 + aggro / 2) as i32;
            let half = spread / 2;
            for i in -half..=half {
                let angle = target + i as f32 * 0.2;
                let speed = BOSS_SHOT_SPEED * 1.5;
                shots.push(Shot {
                    x: cx,
                    y: cy,
                    width: 12.0,
                    height: 12.0,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    damage: 1.0,
                    life: 200,
                    has_gravity: false,
                });
            }
        }
        _ => {
            // Gravity rain lobbed from above the hull
            let hash = det_hash(frame, boss.id);
            let rx = (hash % 1000) as f32 / 1000.0 - 0.5;
            let ry = ((hash >> 10) % 1000) as f32 / 1000.0;
            shots.push(Shot {
                x: cx,
                y: cy - 50.0,
                width: 8.0,
                height: 8.0,
                vx: rx * BOSS_SHOT_SPEED * 2.5,
                vy: -5.0 - ry * 5.0,
                damage: 1.0,
                life: 300,
                has_gravity: true,
            });
        }
    }
    true
}

/// Advance boss death sequences. A dying boss takes no actions; when the
/// countdown expires it is removed, pays out, and completes the level.
fn update_dying(state: &mut GameState) {
    let frame = state.frame;
    let mut rumbles: Vec<(f32, f32)> = Vec::new();
    let mut finished: Option<(f32, f32, u64)> = None;

    for enemy in &mut state.enemies {
        if enemy.dead {
            continue;
        }
        let Some(timer) = enemy.dying.as_mut() else {
            continue;
        };
        *timer = timer.saturating_sub(1);
        if frame % 5 == 0 {
            let hash = det_hash(frame, enemy.id);
            let jx = (hash % 1000) as f32 / 1000.0 * enemy.width;
            let jy = ((hash >> 10) % 1000) as f32 / 1000.0 * enemy.height;
            rumbles.push((enemy.x + jx, enemy.y + jy));
        }
        if *timer == 0 {
            enemy.dead = true;
            finished = Some((enemy.center_x(), enemy.center_y(), enemy.kind.score_value()));
        }
    }

    for (x, y) in rumbles {
        state.add_shake(20.0);
        state.spawn_burst(x, y, 10, FX_ORANGE);
    }

    if let Some((x, y, score)) = finished {
        log::info!("boss destroyed on level {}", state.stats.level);
        state.time_scale = 1.0;
        state.add_shake(30.0);
        state.spawn_burst(x, y, 60, FX_RED);
        state.award(score * 2, 100);
        state.push_event(GameEvent::BossDefeated);

        if state.stats.level >= FINAL_LEVEL {
            state.boss_defeated = true;
        }
        state.phase = GamePhase::LevelComplete;
        state.transition_timer = LEVEL_TRANSITION_DELAY;
        state.push_event(GameEvent::LevelCompleted {
            level: state.stats.level,
        });
    }
}

/// Steer every homing missile toward the nearest valid target, bounded by
/// the configured turn rate so missiles arc instead of snapping.
pub fn steer_missiles(state: &mut GameState) {
    let player_cx = state.player.center_x();
    let player_cy = state.player.center_y();
    let player_alive = !state.player.dead;

    // Snapshot enemy target points first; the missile loop needs &mut projectiles
    let enemy_targets: Vec<(f32, f32)> = state
        .enemies
        .iter()
        .filter(|e| e.targetable())
        .map(|e| (e.center_x(), e.center_y()))
        .collect();

    for proj in &mut state.projectiles {
        if proj.kind != ProjectileKind::Missile {
            continue;
        }
        let pos = Vec2::new(proj.x, proj.y);

        let target = if proj.from_player {
            enemy_targets
                .iter()
                .map(|&(x, y)| Vec2::new(x, y))
                .filter(|t| t.distance(pos) < MISSILE_SEEK_RADIUS)
                .min_by(|a, b| {
                    a.distance(pos)
                        .partial_cmp(&b.distance(pos))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        } else if player_alive {
            let t = Vec2::new(player_cx, player_cy);
            (t.distance(pos) < MISSILE_SEEK_RADIUS).then_some(t)
        } else {
            None
        };

        let Some(target) = target else { continue };
        let desired = (target - pos).to_angle();
        let current = proj.vy.atan2(proj.vx);
        let delta = normalize_angle(desired - current);
        let turned = current + delta.clamp(-MISSILE_TURN_RATE, MISSILE_TURN_RATE);
        let speed = if proj.from_player { MISSILE_SPEED } else { 6.0 };
        proj.vx = turned.cos() * speed;
        proj.vy = turned.sin() * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::start_level;
    use crate::sim::state::{Enemy, GameState};

    fn test_state() -> GameState {
        let mut state = GameState::new(77);
        start_level(&mut state, 1).unwrap();
        state.enemies.clear();
        state
    }

    fn spawn(state: &mut GameState, kind: EnemyKind, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind,
            x,
            y,
            width: 40.0,
            height: 40.0,
            vx: 0.0,
            vy: 0.0,
            hp: 10.0,
            max_hp: 10.0,
            dead: false,
            shoot_timer: 10,
            anim_offset: 0.0,
            dying: None,
        });
        id
    }

    #[test]
    fn walker_moves_toward_player() {
        let mut state = test_state();
        state.player.x = 500.0;
        spawn(&mut state, EnemyKind::Walker, 300.0, 520.0);
        let before = state.enemies[0].x;
        update_enemies(&mut state);
        assert!(state.enemies[0].x > before);

        state.player.x = 0.0;
        let before = state.enemies[0].x;
        update_enemies(&mut state);
        assert!(state.enemies[0].x < before);
    }

    #[test]
    fn enemies_outside_aggro_radius_hold_still() {
        let mut state = test_state();
        state.player.x = 0.0;
        spawn(&mut state, EnemyKind::Walker, 5000.0, 520.0);
        let before = (state.enemies[0].x, state.enemies[0].y);
        update_enemies(&mut state);
        assert_eq!((state.enemies[0].x, state.enemies[0].y), before);
    }

    #[test]
    fn turret_fires_on_timer_expiry() {
        let mut state = test_state();
        state.player.x = 200.0;
        state.player.y = 400.0;
        spawn(&mut state, EnemyKind::Turret, 400.0, 400.0);
        state.enemies[0].shoot_timer = 0;
        update_enemies(&mut state);
        let shots: Vec<_> = state.projectiles.iter().filter(|p| !p.from_player).collect();
        assert_eq!(shots.len(), 1);
        // Aimed left toward the player
        assert!(shots[0].vx < 0.0);
        assert_eq!(state.enemies[0].shoot_timer, ENEMY_SHOOT_INTERVAL);
    }

    #[test]
    fn barrel_never_acts() {
        let mut state = test_state();
        state.player.x = 320.0;
        spawn(&mut state, EnemyKind::Barrel, 300.0, 515.0);
        update_enemies(&mut state);
        assert_eq!(state.enemies[0].x, 300.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn boss_pattern_emits_radial_burst_in_phase_zero() {
        let mut state = test_state();
        state.player.x = 100.0;
        spawn(&mut state, EnemyKind::Boss, 400.0, 420.0);
        // Aggro 1 on level 1 => fire gate every 18 ticks; frame 36 is in cycle 0
        state.frame = 36;
        update_enemies(&mut state);
        let shots: Vec<_> = state.projectiles.iter().filter(|p| !p.from_player).collect();
        assert_eq!(shots.len(), 4); // 3 + aggro arms
    }

    #[test]
    fn dying_boss_takes_no_actions_for_exactly_the_window() {
        let mut state = test_state();
        state.player.x = 100.0;
        spawn(&mut state, EnemyKind::Boss, 400.0, 420.0);
        state.enemies[0].dying = Some(BOSS_DEATH_DURATION);
        let frozen_x = state.enemies[0].x;

        for i in 0..BOSS_DEATH_DURATION {
            assert!(!state.enemies[0].dead, "died early at tick {i}");
            update_enemies(&mut state);
            assert_eq!(state.enemies[0].x, frozen_x, "moved while dying");
            assert!(state.projectiles.is_empty(), "fired while dying");
            state.frame += 1;
        }
        assert!(state.enemies[0].dead);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.time_scale, 1.0);
    }

    #[test]
    fn missile_turn_is_bounded() {
        let mut state = test_state();
        spawn(&mut state, EnemyKind::Walker, 300.0, 100.0);
        let id = state.next_entity_id();
        // Missile flying straight right; target is behind it
        state.projectiles.push(Projectile {
            id,
            kind: ProjectileKind::Missile,
            x: 400.0,
            y: 100.0,
            width: 10.0,
            height: 10.0,
            vx: MISSILE_SPEED,
            vy: 0.0,
            damage: 2.0,
            from_player: true,
            life: 100,
            weapon: None,
            origin_x: 400.0,
            has_gravity: false,
            hit_log: Vec::new(),
        });
        steer_missiles(&mut state);
        let p = &state.projectiles[0];
        let heading = p.vy.atan2(p.vx);
        assert!(heading.abs() <= MISSILE_TURN_RATE + 1e-5);
        assert!((p.vx.hypot(p.vy) - MISSILE_SPEED).abs() < 1e-4);
    }
}
