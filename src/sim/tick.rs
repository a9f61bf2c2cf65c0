//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one step. Order within a tick:
//! player physics, platform/trap resolution, projectile ballistics, combat
//! resolution, then enemy AI - so enemies always react to the player's
//! post-movement position of the current tick.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::collision::platform_landing;
use crate::sim::combat::{damage_player, resolve_enemy_hits, resolve_player_hits};
use crate::sim::det_hash;
use crate::sim::enemy::{steer_missiles, update_enemies};
use crate::sim::level::{FINAL_LEVEL, config_for, create_enemy};
use crate::sim::state::{
    EnemyKind, GameEvent, GamePhase, GameState, ItemKind, LevelMode, Projectile, ProjectileKind,
    Skill, TrapKind, WeaponKind, FX_CYAN, FX_GREEN, FX_PINK, FX_RED, FX_WHITE, FX_YELLOW,
    LASER_TRAP_ACTIVE, LASER_TRAP_PERIOD, PLAYER_CROUCH_HEIGHT, PLAYER_HEIGHT,
};

/// Landing tolerance band for the player
const PLAYER_LANDING_TOLERANCE: f32 = 30.0;

/// Input for a single tick.
///
/// Directions are level-triggered (held), actions are edge-triggered and
/// consumed once per tick they are raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump / double jump
    pub jump: bool,
    /// Fire the current weapon
    pub shoot: bool,
    pub dash: bool,
    /// Q skill: cannon shell
    pub cannon: bool,
    /// W skill: shield
    pub shield: bool,
    /// E skill: missile volley window
    pub missiles: bool,
    /// R skill: rage
    pub rage: bool,
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Pause toggles outside the normal flow
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver | GamePhase::Shop => return,
        GamePhase::Victory => {
            // Only the backdrop scrolls on the victory screen
            state.frame += 1;
            state.camera_x += 1.5;
            return;
        }
        GamePhase::LevelComplete => {
            state.frame += 1;
            decay_shake(state);
            decay_cosmetics(state);
            tick_level_transition(state);
            return;
        }
        GamePhase::Playing => {}
    }

    state.frame += 1;
    state.run_ticks += 1;
    decay_shake(state);

    // Recover from invalid numeric state rather than propagating it
    if !state.player.x.is_finite() || !state.player.y.is_finite() {
        log::warn!("player position went non-finite, resetting to safe spot");
        state.player.x = 100.0;
        state.player.y = 100.0;
        state.player.vx = 0.0;
        state.player.vy = 0.0;
    }

    if state.player.dead {
        handle_respawn(state);
    } else {
        update_player(state, input);
        update_arena(state);
        if state.player.y > VIEW_HEIGHT + 100.0 {
            // Safety net under the stage
            damage_player(state, 5.0);
        }
    }

    resolve_platforms(state);
    steer_missiles(state);
    advance_projectiles(state);
    resolve_player_hits(state);
    resolve_enemy_hits(state);
    update_enemies(state);
    update_items(state);

    state.enemies.retain(|e| !e.dead);
    state.projectiles.retain(|p| p.life > 0);
    decay_cosmetics(state);

    check_boss_spawn(state);
    check_lockdown_clear(state);
}

fn decay_shake(state: &mut GameState) {
    state.shake *= 0.9;
    if state.shake < 0.01 {
        state.shake = 0.0;
    }
}

/// Player movement, timers, and skill/weapon activation
fn update_player(state: &mut GameState, input: &TickInput) {
    let upgrades = state.upgrades;
    let frame = state.frame;
    let mut trail: Option<(f32, f32, u32)> = None;
    let mut shield_expired = false;

    {
        let player = &mut state.player;
        let mut speed_cap = BASE_MOVE_SPEED + upgrades.speed as f32 * 0.5;

        if player.dash_timer > 0 {
            // Dash pins horizontal velocity and cancels gravity
            player.vx = if player.facing_right {
                DASH_SPEED
            } else {
                -DASH_SPEED
            };
            player.vy = 0.0;
            player.dash_timer -= 1;
            if frame % 3 == 0 {
                trail = Some((player.x, player.y, FX_CYAN));
            }
        } else {
            if player.rage_timer > 0 {
                speed_cap *= 1.3;
            }

            if player.grounded && input.down {
                if !player.crouching {
                    // Shrink in place: feet stay planted
                    player.crouching = true;
                    player.height = PLAYER_CROUCH_HEIGHT;
                    player.y += PLAYER_HEIGHT - PLAYER_CROUCH_HEIGHT;
                }
                player.vx *= 0.1;
            } else {
                if player.crouching {
                    player.crouching = false;
                    player.height = PLAYER_HEIGHT;
                    player.y -= PLAYER_HEIGHT - PLAYER_CROUCH_HEIGHT;
                }

                if input.left {
                    player.vx -= 1.0;
                    player.facing_right = false;
                } else if input.right {
                    player.vx += 1.0;
                    player.facing_right = true;
                } else {
                    player.vx *= FRICTION;
                }
                player.vx = player.vx.clamp(-speed_cap, speed_cap);
            }

            player.vy = (player.vy + GRAVITY).min(MAX_FALL_SPEED);
        }

        player.x += player.vx;
        player.y += player.vy;

        // Every timer runs down once per tick, unconditionally
        player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
        player.cannon_cooldown = player.cannon_cooldown.saturating_sub(1);
        player.missile_timer = player.missile_timer.saturating_sub(1);
        player.missile_cooldown = player.missile_cooldown.saturating_sub(1);
        player.rage_timer = player.rage_timer.saturating_sub(1);
        player.rage_cooldown = player.rage_cooldown.saturating_sub(1);
        player.shield_timer = player.shield_timer.saturating_sub(1);
        player.shield_cooldown = player.shield_cooldown.saturating_sub(1);
        player.invincible_timer = player.invincible_timer.saturating_sub(1);
        player.shoot_cooldown = player.shoot_cooldown.saturating_sub(1);

        if player.shield_timer == 0 && player.shield_active {
            player.shield_active = false;
            shield_expired = true;
        }
    }

    if let Some((x, y, color)) = trail {
        state.spawn_burst(x, y, 1, color);
    }
    if state.player.missile_timer > 0 && frame % 4 == 0 {
        let (x, y) = (state.player.x, state.player.y);
        state.spawn_burst(x, y, 1, FX_CYAN);
    }
    if shield_expired {
        state.push_event(GameEvent::ShieldExpired);
    }

    activate_skills(state, input);

    if input.jump {
        try_jump(state);
    }
    if input.shoot {
        try_fire(state, input);
    }

    // Heat sheds only while the weapon is idle; sustained fire accumulates
    let player = &mut state.player;
    if player.weapon_heat > 0.0 && player.shoot_cooldown == 0 {
        player.weapon_heat -= HEAT_COOLDOWN_RATE;
        if player.weapon_heat <= 0.0 {
            player.weapon_heat = 0.0;
            player.overheated = false;
        }
    }
}

fn activate_skills(state: &mut GameState, input: &TickInput) {
    if input.dash && state.player.dash_cooldown == 0 {
        state.player.dash_timer = DASH_DURATION;
        state.player.dash_cooldown = DASH_COOLDOWN;
        // Dash grants a slightly longer grace window than the dash itself
        state.player.invincible_timer = DASH_DURATION + 10;
        let (x, y) = (state.player.x, state.player.y);
        state.spawn_burst(x, y, 10, FX_CYAN);
        state.push_event(GameEvent::DashStarted);
    }

    if input.cannon && state.player.cannon_cooldown == 0 {
        state.player.cannon_cooldown = CANNON_COOLDOWN;
        fire_cannon(state);
        state.push_event(GameEvent::SkillActivated {
            skill: Skill::Cannon,
        });
    }

    if input.shield && !state.player.shield_active && state.player.shield_cooldown == 0 {
        state.player.shield_active = true;
        state.player.shield_timer = SHIELD_DURATION;
        state.player.shield_cooldown = SHIELD_COOLDOWN;
        let (x, y) = (state.player.x, state.player.y);
        state.push_popup(x, y - 20.0, "SHIELD ON", FX_CYAN);
        state.push_event(GameEvent::SkillActivated {
            skill: Skill::Shield,
        });
    }

    if input.missiles && state.player.missile_cooldown == 0 {
        state.player.missile_cooldown = MISSILE_COOLDOWN;
        state.player.missile_timer = MISSILE_DURATION;
        let (x, y) = (state.player.x, state.player.y);
        state.push_popup(x, y - 20.0, "MISSILES UP", FX_CYAN);
        state.push_event(GameEvent::SkillActivated {
            skill: Skill::Missiles,
        });
    }

    if input.rage && state.player.rage_cooldown == 0 {
        state.player.rage_timer = RAGE_DURATION;
        state.player.rage_cooldown = RAGE_COOLDOWN;
        let (x, y) = (state.player.x, state.player.y);
        state.push_popup(x, y - 20.0, "RAGE MODE", FX_RED);
        state.push_event(GameEvent::SkillActivated { skill: Skill::Rage });
    }
}

fn try_jump(state: &mut GameState) {
    let player = &mut state.player;
    if player.grounded {
        player.vy = JUMP_FORCE;
        player.jump_count = 1;
        state.push_event(GameEvent::PlayerJumped);
    } else if player.jump_count < 2 {
        player.vy = DOUBLE_JUMP_FORCE;
        player.jump_count = 2;
        let (x, y) = (player.x + player.width / 2.0, player.y + player.height);
        state.spawn_burst(x, y, 5, FX_WHITE);
        state.push_event(GameEvent::PlayerJumped);
    }
}

/// Fire the current weapon if it is ready, then the missile volley if the
/// window is open. Consumes one shoot edge.
fn try_fire(state: &mut GameState, input: &TickInput) {
    let upgrades = state.upgrades;
    let frame = state.frame;

    {
        let player = &mut state.player;
        if player.shoot_cooldown > 0 {
            return;
        }
        if player.overheated {
            let (x, y) = (player.x, player.y - 30.0);
            state.push_popup(x, y, "OVERHEAT!", FX_RED);
            return;
        }

        let mut cooldown = (12i64 - upgrades.fire_rate as i64 * 2).max(2) as u32;
        if player.weapon == WeaponKind::RapidFire {
            cooldown = 4;
            player.weapon_heat += 5.0;
            if player.weapon_heat >= MAX_HEAT {
                player.weapon_heat = MAX_HEAT;
                player.overheated = true;
            }
        }
        if player.rage_timer > 0 {
            cooldown = (cooldown / 2).max(2);
        }
        player.shoot_cooldown = cooldown;
    }
    if state.player.overheated {
        state.push_event(GameEvent::Overheated);
    }

    // Aim from held directions: up is vertical, up+strafe is a 45 diagonal
    let speed = PLAYER_SHOT_SPEED;
    let facing = state.player.facing_right;
    let (vx, vy) = if input.up {
        if input.left {
            (-speed * 0.7, -speed * 0.7)
        } else if input.right {
            (speed * 0.7, -speed * 0.7)
        } else {
            (0.0, -speed)
        }
    } else if facing {
        (speed, 0.0)
    } else {
        (-speed, 0.0)
    };

    let base_damage = BASE_DAMAGE + upgrades.dmg as f32;
    let spawn_x = if facing {
        state.player.x + state.player.width
    } else {
        state.player.x - 10.0
    };
    let spawn_y = state.player.y + 25.0;
    let weapon = state.player.weapon;

    match weapon {
        WeaponKind::Blaster => {
            spawn_shot(state, spawn_x, spawn_y, vx, vy, base_damage, weapon, 12.0, 6.0);
        }
        WeaponKind::Spread => {
            let dmg = base_damage * 2.0;
            if vx == 0.0 && vy != 0.0 {
                // Straight up: a narrow three-way fan
                for off in [-2.0, 0.0, 2.0] {
                    spawn_shot(state, spawn_x, spawn_y, off, vy, dmg, weapon, 14.0, 8.0);
                }
            } else {
                for off in [-4.0, -2.0, 0.0, 2.0, 4.0] {
                    spawn_shot(state, spawn_x, spawn_y, vx, vy + off, dmg, weapon, 14.0, 8.0);
                }
            }
        }
        WeaponKind::Laser => {
            let mag = (vx * vx + vy * vy).sqrt();
            let (lvx, lvy) = if mag > 0.0 {
                (vx / mag * LASER_SPEED, vy / mag * LASER_SPEED)
            } else if facing {
                (LASER_SPEED, 0.0)
            } else {
                (-LASER_SPEED, 0.0)
            };
            let dmg = LASER_DAMAGE + upgrades.dmg as f32;
            spawn_shot(state, spawn_x, spawn_y, lvx, lvy, dmg, weapon, 60.0, 6.0);
        }
        WeaponKind::RapidFire => {
            state.add_shake(1.0);
            let hash = det_hash(frame, 0x9d);
            let jitter = ((hash % 1000) as f32 / 1000.0 - 0.5) * 5.0;
            spawn_shot(
                state,
                spawn_x,
                spawn_y + jitter,
                vx,
                vy + jitter,
                base_damage * 0.8,
                weapon,
                10.0,
                10.0,
            );
        }
    }

    // Homing volley rides along while the E window is open
    if state.player.missile_timer > 0 {
        let my = state.player.y + 10.0;
        for i in 0..3u32 {
            let hash = det_hash(frame, 0x300 + i);
            let mvx = ((hash % 1000) as f32 / 1000.0 - 0.5) * 10.0;
            let mvy = -5.0 - ((hash >> 10) % 1000) as f32 / 1000.0 * 5.0;
            let id = state.next_entity_id();
            state.projectiles.push(Projectile {
                id,
                kind: ProjectileKind::Missile,
                x: spawn_x,
                y: my,
                width: 10.0,
                height: 10.0,
                vx: mvx,
                vy: mvy,
                damage: MISSILE_DAMAGE + upgrades.dmg as f32,
                from_player: true,
                life: 100,
                weapon: None,
                origin_x: spawn_x,
                has_gravity: false,
                hit_log: Vec::new(),
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_shot(
    state: &mut GameState,
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    damage: f32,
    weapon: WeaponKind,
    width: f32,
    height: f32,
) {
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        kind: ProjectileKind::Normal,
        x,
        y,
        width,
        height,
        vx,
        vy,
        damage,
        from_player: true,
        life: 100,
        weapon: Some(weapon),
        origin_x: x,
        has_gravity: false,
        hit_log: Vec::new(),
    });
}

fn fire_cannon(state: &mut GameState) {
    state.add_shake(20.0);
    let facing = state.player.facing_right;
    let vx = if facing { CANNON_SPEED } else { -CANNON_SPEED };
    let x = if facing {
        state.player.x + state.player.width
    } else {
        state.player.x - 20.0
    };
    let y = state.player.y + 15.0;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        kind: ProjectileKind::Cannon,
        x,
        y,
        width: CANNON_SIZE,
        height: CANNON_SIZE,
        vx,
        vy: 0.0,
        damage: CANNON_DAMAGE,
        from_player: true,
        life: 80,
        weapon: None,
        origin_x: x,
        has_gravity: false,
        hit_log: Vec::new(),
    });
    // Recoil
    state.player.vx -= vx * 2.0;
}

/// Camera and arena-mode state machine
fn update_arena(state: &mut GameState) {
    // Lockdown trigger: crossing the midpoint arms the arena exactly once
    if state.mode == LevelMode::Lockdown && !state.lockdown_triggered {
        let trigger_x = state.level_length / 2.0;
        if state.player.x > trigger_x {
            state.lockdown_triggered = true;
            state.lockdown_bounds.min = trigger_x - 400.0;
            state.lockdown_bounds.max = trigger_x + 400.0;
            state.add_shake(10.0);
            let (px, py) = (state.player.x, state.player.y - 100.0);
            state.push_popup(px, py, "LOCKDOWN INITIATED!", FX_RED);
            let (min, max) = (state.lockdown_bounds.min, state.lockdown_bounds.max);
            state.push_event(GameEvent::LockdownTriggered { min, max });
            log::info!("lockdown armed at [{min}, {max}]");

            let mut rng = Pcg32::seed_from_u64(state.seed ^ state.frame);
            for _ in 0..6 {
                use rand::Rng;
                let x = rng.random_range(min..max);
                let flyer = create_enemy(state, &mut rng, x, EnemyKind::Flyer, 0.0);
                state.enemies.push(flyer);
                let walker = create_enemy(state, &mut rng, x, EnemyKind::Walker, 0.0);
                state.enemies.push(walker);
            }
        }
    }

    if state.lockdown_triggered && !state.lockdown_cleared {
        let (min, max) = (state.lockdown_bounds.min, state.lockdown_bounds.max);
        let player = &mut state.player;
        player.x = player.x.clamp(min + 20.0, max - 20.0 - player.width);
        let target = (min + max) / 2.0 - VIEW_WIDTH / 2.0;
        state.camera_x += (target - state.camera_x) * 0.1;
    } else if state.mode == LevelMode::Autoscroll {
        state.camera_x += 3.0;
        if state.player.x < state.camera_x {
            // The scroll edge caught up - effectively lethal
            damage_player(state, 100.0);
        }
    } else {
        let target = state.player.x - VIEW_WIDTH / 3.0;
        state.camera_x += (target - state.camera_x) * 0.1;
    }

    state.camera_x = state
        .camera_x
        .clamp(0.0, (state.level_length - VIEW_WIDTH + 200.0).max(0.0));
}

/// Platform grounding and trap effects. Trap timers advance even while the
/// player is dead so laser cycles stay in phase.
fn resolve_platforms(state: &mut GameState) {
    let mut spike_hit = false;
    let mut laser_hit = false;

    {
        let (player, platforms) = (&mut state.player, &mut state.platforms);
        player.grounded = false;
        let alive = !player.dead;

        for platform in platforms.iter_mut() {
            if platform.trap == TrapKind::Laser {
                platform.trap_timer += 1;
                if platform.trap_timer > LASER_TRAP_PERIOD {
                    platform.trap_timer = 0;
                }
                platform.trap_active = platform.trap_timer < LASER_TRAP_ACTIVE;

                if alive && platform.trap_active && player.rect().overlaps(&platform.beam_zone()) {
                    laser_hit = true;
                }
            }

            if !alive {
                continue;
            }
            if let Some(landing) = platform_landing(
                &player.rect(),
                player.vy,
                &platform.rect(),
                PLAYER_LANDING_TOLERANCE,
            ) {
                player.grounded = true;
                player.vy = 0.0;
                player.y = landing.snap_y;
                player.jump_count = 0;

                if platform.trap == TrapKind::Spike {
                    spike_hit = true;
                    player.vy = -10.0;
                }
            }
        }
    }

    if spike_hit {
        damage_player(state, 1.0);
    }
    if laser_hit {
        damage_player(state, 1.0);
    }
}

/// Projectile ballistics: gravity arcs, integration, lifetime
fn advance_projectiles(state: &mut GameState) {
    let frame = state.frame;
    let mut trails: Vec<(f32, f32, u32)> = Vec::new();

    for proj in &mut state.projectiles {
        if proj.has_gravity && proj.vy < 10.0 {
            proj.vy += 0.2;
        }
        proj.x += proj.vx;
        proj.y += proj.vy;
        proj.life = proj.life.saturating_sub(1);

        if proj.kind == ProjectileKind::Missile && frame % 3 == 0 {
            let color = if proj.from_player { FX_CYAN } else { FX_RED };
            trails.push((proj.x, proj.y, color));
        }
    }

    for (x, y, color) in trails {
        state.spawn_burst(x, y, 1, color);
    }
}

/// Item gravity, landings, and pickup
fn update_items(state: &mut GameState) {
    let mut collected: Vec<ItemKind> = Vec::new();

    {
        let (items, platforms, player) = (
            &mut state.items,
            &state.platforms,
            &state.player,
        );
        let player_rect = player.rect();
        let alive = !player.dead;

        items.retain_mut(|item| {
            item.vy += GRAVITY;
            item.y += item.vy;
            if item.y > VIEW_HEIGHT - 60.0 {
                item.y = VIEW_HEIGHT - 60.0;
                item.vy = 0.0;
            }
            for platform in platforms {
                if item.vy >= 0.0
                    && item.y + 10.0 > platform.y
                    && item.y < platform.y + platform.height
                    && item.x > platform.x
                    && item.x < platform.x + platform.width
                {
                    item.y = platform.y - 15.0;
                    item.vy = 0.0;
                }
            }

            if alive && player_rect.overlaps(&item.rect()) {
                collected.push(item.kind);
                return false;
            }
            item.y < 2000.0
        });
    }

    for kind in collected {
        collect_item(state, kind);
    }
}

fn collect_item(state: &mut GameState, kind: ItemKind) {
    let (x, y) = (state.player.x, state.player.y);
    match kind {
        ItemKind::Coin => {
            state.award(50, 5);
            state.spawn_burst(x, y, 8, FX_YELLOW);
            state.push_popup(x, y, "+5$", FX_YELLOW);
        }
        ItemKind::Health => {
            state.player.hp = (state.player.hp + 2.0).min(state.player.max_hp);
            state.spawn_burst(x, y, 8, FX_GREEN);
        }
        ItemKind::Weapon(weapon) => {
            state.player.weapon = weapon;
            state.award(200, 0);
            state.spawn_burst(x, y, 30, FX_PINK);
            let name = match weapon {
                WeaponKind::Spread => "SHOTGUN!",
                WeaponKind::Laser => "LASER!",
                WeaponKind::RapidFire => "MINIGUN!",
                WeaponKind::Blaster => "UPGRADE!",
            };
            state.push_popup(x, y, name, FX_PINK);
            state.push_event(GameEvent::WeaponChanged { weapon });
        }
    }
    state.push_event(GameEvent::ItemCollected { kind });
}

/// Particle and damage-number lifetimes
fn decay_cosmetics(state: &mut GameState) {
    for particle in &mut state.particles {
        particle.x += particle.vx;
        particle.y += particle.vy;
        particle.life -= 1.0;
    }
    state.particles.retain(|p| p.life > 0.0);

    for popup in &mut state.damage_numbers {
        popup.y -= 1.0;
        popup.life = popup.life.saturating_sub(1);
    }
    state.damage_numbers.retain(|d| d.life > 0);
}

/// Spawn the boss once the player approaches the level's end
fn check_boss_spawn(state: &mut GameState) {
    if state.boss_spawned || state.player.x <= state.level_length - 800.0 {
        return;
    }
    state.boss_spawned = true;
    let boss_hp = config_for(state.stats.level).map(|c| c.boss_hp).unwrap_or(300.0);
    let x = state.level_length - 200.0;
    let mut rng = Pcg32::seed_from_u64(state.seed ^ state.frame.wrapping_mul(3));
    let boss = create_enemy(state, &mut rng, x, EnemyKind::Boss, boss_hp);
    state.enemies.push(boss);
    state.push_event(GameEvent::BossSpawned);
    log::info!("boss spawned with {boss_hp} hp");
}

/// The arena unlocks only when no living enemy remains inside it
fn check_lockdown_clear(state: &mut GameState) {
    if !state.lockdown_triggered || state.lockdown_cleared {
        return;
    }
    let (min, max) = (state.lockdown_bounds.min, state.lockdown_bounds.max);
    let remaining = state
        .enemies
        .iter()
        .filter(|e| !e.dead && e.x > min - 100.0 && e.x < max + 100.0)
        .count();
    if remaining == 0 {
        state.lockdown_cleared = true;
        let (x, y) = (state.player.x, state.player.y - 50.0);
        state.push_popup(x, y, "LOCKDOWN CLEARED!", FX_GREEN);
        state.push_event(GameEvent::LockdownCleared);
        log::info!("lockdown cleared");
    }
}

/// Count down to respawn, then put the player back near the camera
fn handle_respawn(state: &mut GameState) {
    if state.respawn_timer > 1 {
        state.respawn_timer -= 1;
        return;
    }
    state.respawn_timer = 0;

    let player = &mut state.player;
    player.dead = false;
    player.hp = player.max_hp;
    player.x = state.camera_x + 100.0;
    player.y = 100.0;
    player.vx = 0.0;
    player.vy = 0.0;
    player.rage_timer = 0;
    player.missile_timer = 0;
    player.weapon = WeaponKind::Blaster;
    player.weapon_heat = 0.0;
    player.overheated = false;
    // A lockdown in progress re-arms so the wave can be retried
    state.lockdown_triggered = false;
    state.lockdown_cleared = false;
    state.push_event(GameEvent::PlayerRespawned);
}

/// LevelComplete resolves into Shop, or Victory after the final level
fn tick_level_transition(state: &mut GameState) {
    if state.transition_timer > 1 {
        state.transition_timer -= 1;
        return;
    }
    state.transition_timer = 0;
    if state.stats.level >= FINAL_LEVEL {
        state.phase = GamePhase::Victory;
        state.camera_x = 0.0;
        state.push_event(GameEvent::Victory);
        log::info!("campaign complete");
    } else {
        state.phase = GamePhase::Shop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::start_level;
    use crate::sim::state::GamePhase;

    fn playing_state() -> GameState {
        let mut state = GameState::new(2024);
        start_level(&mut state, 1).unwrap();
        // Clear the roster so tests control every combatant
        state.enemies.clear();
        state
    }

    fn settle(state: &mut GameState, ticks: u32) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    #[test]
    fn pause_freezes_and_resumes() {
        let mut state = playing_state();
        settle(&mut state, 5);
        let frame = state.frame;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);
        settle(&mut state, 10);
        assert_eq!(state.frame, frame);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn player_settles_onto_ground_and_runs_right() {
        let mut state = playing_state();
        settle(&mut state, 120);
        assert!(state.player.grounded);
        assert_eq!(state.player.vy, 0.0);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let x0 = state.player.x;
        for _ in 0..30 {
            tick(&mut state, &right);
        }
        assert!(state.player.x > x0 + 50.0);
        assert!(state.player.vx <= BASE_MOVE_SPEED);
    }

    #[test]
    fn hp_stays_within_bounds_under_fire() {
        let mut state = playing_state();
        settle(&mut state, 120);
        for _ in 0..600 {
            damage_player(&mut state, 1.0);
            settle(&mut state, 1);
            assert!(state.player.hp >= 0.0 && state.player.hp <= state.player.max_hp);
        }
    }

    #[test]
    fn invincibility_strictly_decreases_to_zero() {
        let mut state = playing_state();
        settle(&mut state, 120);
        damage_player(&mut state, 1.0);
        let mut last = state.player.invincible_timer;
        while last > 0 {
            settle(&mut state, 1);
            let now = state.player.invincible_timer;
            assert_eq!(now, last - 1);
            last = now;
        }
    }

    #[test]
    fn dash_pins_velocity_and_respects_cooldown() {
        let mut state = playing_state();
        settle(&mut state, 120);

        let dash = TickInput {
            dash: true,
            ..Default::default()
        };
        // Activation lands after the movement phase; the pin shows up on the
        // following ticks, for the whole window
        tick(&mut state, &dash);
        assert_eq!(state.player.dash_timer, DASH_DURATION);

        for _ in 0..DASH_DURATION {
            settle(&mut state, 1);
            if state.player.dash_timer > 0 {
                assert_eq!(state.player.vx.abs(), DASH_SPEED);
                assert_eq!(state.player.vy, 0.0);
            }
        }
        assert_eq!(state.player.dash_timer, 0);

        // Cooldown still running: a new dash edge is ignored
        tick(&mut state, &dash);
        assert_eq!(state.player.dash_timer, 0);
    }

    #[test]
    fn crouch_keeps_feet_planted() {
        let mut state = playing_state();
        settle(&mut state, 120);
        let feet = state.player.y + state.player.height;

        let down = TickInput {
            down: true,
            ..Default::default()
        };
        tick(&mut state, &down);
        assert!(state.player.crouching);
        assert_eq!(state.player.height, PLAYER_CROUCH_HEIGHT);
        let crouch_feet = state.player.y + state.player.height;
        assert!((crouch_feet - feet).abs() < 1.0);

        settle(&mut state, 2);
        assert!(!state.player.crouching);
        assert_eq!(state.player.height, PLAYER_HEIGHT);
    }

    #[test]
    fn double_jump_but_not_triple() {
        let mut state = playing_state();
        settle(&mut state, 120);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump);
        assert_eq!(state.player.jump_count, 1);
        assert_eq!(state.player.vy, JUMP_FORCE);

        settle(&mut state, 3);
        tick(&mut state, &jump);
        assert_eq!(state.player.jump_count, 2);

        settle(&mut state, 3);
        let vy = state.player.vy;
        tick(&mut state, &jump);
        // Third press while airborne does nothing
        assert!(state.player.vy >= vy);
        assert_eq!(state.player.jump_count, 2);
    }

    #[test]
    fn rapid_fire_overheats_after_twenty_shots() {
        let mut state = playing_state();
        settle(&mut state, 120);
        state.player.weapon = WeaponKind::RapidFire;
        state.player.weapon_heat = 0.0;

        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        let mut shots = 0;
        let mut ticks = 0;
        while !state.player.overheated && ticks < 1000 {
            let before = state.projectiles.len();
            tick(&mut state, &shoot);
            if state.projectiles.len() > before {
                shots += 1;
            }
            ticks += 1;
        }
        assert!(state.player.overheated);
        // 5 heat per shot, no shed between back-to-back shots: 20 to the cap
        assert_eq!(shots, 20, "overheated after {shots} shots");
        assert_eq!(state.player.weapon_heat, MAX_HEAT);

        // Locked out until heat decays
        let before = state.projectiles.len();
        tick(&mut state, &shoot);
        let fired: Vec<_> = state.projectiles[before..]
            .iter()
            .filter(|p| p.from_player)
            .collect();
        assert!(fired.is_empty());
    }

    #[test]
    fn lockdown_triggers_once_with_exact_bounds() {
        let mut state = GameState::new(31);
        start_level(&mut state, 4).unwrap();
        assert_eq!(state.mode, LevelMode::Lockdown);
        state.enemies.clear();

        let mid = state.level_length / 2.0;
        state.player.x = mid + 10.0;
        let before = state.enemies.len();
        settle(&mut state, 1);
        assert!(state.lockdown_triggered);
        assert_eq!(state.lockdown_bounds.min, mid - 400.0);
        assert_eq!(state.lockdown_bounds.max, mid + 400.0);
        assert_eq!(state.enemies.len(), before + 12);

        // Crossing again must not re-trigger or respawn the wave
        let roster = state.enemies.len();
        state.player.x = mid + 50.0;
        settle(&mut state, 1);
        assert_eq!(state.enemies.len(), roster);
    }

    #[test]
    fn lockdown_clamps_player_and_clears_when_zone_empty() {
        let mut state = GameState::new(32);
        start_level(&mut state, 4).unwrap();
        state.enemies.clear();
        let mid = state.level_length / 2.0;
        state.player.x = mid + 10.0;
        settle(&mut state, 1);

        // Push against the left wall: clamp holds
        state.player.x = state.lockdown_bounds.min - 500.0;
        settle(&mut state, 1);
        assert!(state.player.x >= state.lockdown_bounds.min + 20.0);

        // Clear the wave: zone unlocks exactly when it empties
        assert!(!state.lockdown_cleared);
        for enemy in &mut state.enemies {
            enemy.dead = true;
        }
        settle(&mut state, 1);
        assert!(state.lockdown_cleared);
    }

    #[test]
    fn autoscroll_punishes_falling_behind() {
        let mut state = GameState::new(33);
        start_level(&mut state, 3).unwrap();
        assert_eq!(state.mode, LevelMode::Autoscroll);
        state.enemies.clear();
        // Let the camera pass the player
        state.camera_x = 500.0;
        state.player.x = 100.0;
        let hp = state.player.hp;
        settle(&mut state, 1);
        assert!(state.player.hp < hp);
    }

    #[test]
    fn boss_spawns_once_near_level_end() {
        let mut state = playing_state();
        settle(&mut state, 120);
        state.player.x = state.level_length - 700.0;
        settle(&mut state, 1);
        let bosses = state
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Boss)
            .count();
        assert_eq!(bosses, 1);
        assert!(state.boss_spawned);

        settle(&mut state, 5);
        let bosses = state
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Boss)
            .count();
        assert_eq!(bosses, 1);
    }

    #[test]
    fn death_respawns_with_reset_loadout() {
        let mut state = playing_state();
        settle(&mut state, 120);
        state.player.weapon = WeaponKind::Laser;
        state.player.hp = 1.0;
        damage_player(&mut state, 1.0);
        assert!(state.player.dead);

        settle(&mut state, RESPAWN_DELAY + 1);
        assert!(!state.player.dead);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.player.weapon, WeaponKind::Blaster);
        assert!(state
            .take_events()
            .contains(&GameEvent::PlayerRespawned));
    }

    #[test]
    fn victory_after_final_level_completes() {
        let mut state = GameState::new(88);
        start_level(&mut state, 6).unwrap();
        state.enemies.clear();
        state.boss_defeated = true;
        state.phase = GamePhase::LevelComplete;
        state.transition_timer = 3;
        settle(&mut state, 5);
        assert_eq!(state.phase, GamePhase::Victory);

        // Victory only scrolls the backdrop
        let cam = state.camera_x;
        settle(&mut state, 2);
        assert!(state.camera_x > cam);
    }

    #[test]
    fn nonfinite_position_recovers() {
        let mut state = playing_state();
        state.player.x = f32::NAN;
        settle(&mut state, 1);
        assert!(state.player.x.is_finite());
        assert!(state.player.y.is_finite());
    }

    #[test]
    fn determinism_same_seed_same_world() {
        let script = |state: &mut GameState| {
            let mut inputs = Vec::new();
            for i in 0..240u32 {
                inputs.push(TickInput {
                    right: true,
                    jump: i % 60 == 0,
                    shoot: i % 7 == 0,
                    ..Default::default()
                });
            }
            for input in &inputs {
                tick(state, input);
            }
        };

        let mut a = GameState::new(555);
        start_level(&mut a, 2).unwrap();
        script(&mut a);

        let mut b = GameState::new(555);
        start_level(&mut b, 2).unwrap();
        script(&mut b);

        assert_eq!(a.frame, b.frame);
        assert_eq!(a.player.x, b.player.x);
        assert_eq!(a.player.y, b.player.y);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        assert_eq!(a.stats.score, b.stats.score);
    }
}
