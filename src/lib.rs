//! Neon Strider - a side-scrolling action game simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, combat, enemy AI, level state)
//! - `leaderboard`: Run summaries and the score board model
//! - `settings`: Simulation-relevant preferences

pub mod leaderboard;
pub mod settings;
pub mod sim;

pub use leaderboard::{Leaderboard, RunSummary};
pub use settings::Settings;

/// Game configuration constants
///
/// Units are pixels and ticks; the simulation runs at 60 ticks per second
/// and all speeds/accelerations are per-tick values.
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const STEP_MS: f32 = 1000.0 / 60.0;
    /// Maximum accumulated backlog before catch-up ticks are dropped
    pub const MAX_BACKLOG_MS: f32 = 65.0;

    /// Stage viewport dimensions
    pub const VIEW_WIDTH: f32 = 1024.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Gravity added to vy every tick
    pub const GRAVITY: f32 = 0.8;
    /// Terminal fall speed
    pub const MAX_FALL_SPEED: f32 = 15.0;
    /// Ground friction factor (vx multiplier when no input)
    pub const FRICTION: f32 = 0.2;
    /// Player base horizontal speed cap
    pub const BASE_MOVE_SPEED: f32 = 5.0;
    /// First jump impulse (up is negative)
    pub const JUMP_FORCE: f32 = -15.0;
    /// Double jump impulse
    pub const DOUBLE_JUMP_FORCE: f32 = -14.0;

    /// Dash speed while the dash window is active
    pub const DASH_SPEED: f32 = 15.0;
    /// Dash window in ticks
    pub const DASH_DURATION: u32 = 12;
    /// Dash cooldown in ticks
    pub const DASH_COOLDOWN: u32 = 300;
    /// Weapon heat ceiling; reaching it locks out firing
    pub const MAX_HEAT: f32 = 100.0;
    /// Heat shed per tick
    pub const HEAT_COOLDOWN_RATE: f32 = 1.5;
    /// Boss slow-motion death window in ticks
    pub const BOSS_DEATH_DURATION: u32 = 60;
    /// Time scale applied while a boss is dying
    pub const BOSS_DEATH_TIME_SCALE: f32 = 0.2;

    /// Post-hit invincibility window in ticks
    pub const HIT_INVINCIBILITY: u32 = 60;
    /// Delay between death and respawn in ticks
    pub const RESPAWN_DELAY: u32 = 60;
    /// Delay on level complete before the shop/victory transition
    pub const LEVEL_TRANSITION_DELAY: u32 = 120;

    /// Enemy movement speeds
    pub const WALKER_SPEED: f32 = 0.6;
    pub const FLYER_SPEED: f32 = 0.6;
    pub const JUMPER_SPEED: f32 = 0.5;
    pub const BOSS_SPEED: f32 = 0.3;
    /// Distance at which enemies engage the player
    pub const AGGRO_RADIUS: f32 = 1200.0;
    /// Ticks between turret/flyer shots
    pub const ENEMY_SHOOT_INTERVAL: u32 = 150;

    /// Skill cooldowns in ticks
    pub const CANNON_COOLDOWN: u32 = 600;
    pub const MISSILE_COOLDOWN: u32 = 2100;
    pub const RAGE_COOLDOWN: u32 = 2400;
    pub const SHIELD_COOLDOWN: u32 = 900;

    /// Skill durations in ticks
    pub const RAGE_DURATION: u32 = 600;
    pub const MISSILE_DURATION: u32 = 300;
    pub const SHIELD_DURATION: u32 = 180;

    /// Projectile stats
    pub const PLAYER_SHOT_SPEED: f32 = 8.0;
    pub const ENEMY_SHOT_SPEED: f32 = 2.5;
    pub const BASE_DAMAGE: f32 = 2.0;
    pub const CANNON_SPEED: f32 = 10.0;
    pub const CANNON_DAMAGE: f32 = 20.0;
    pub const CANNON_SIZE: f32 = 20.0;
    /// Re-hit window for persistent area shells, per enemy
    pub const CANNON_REHIT_WINDOW: u64 = 15;
    pub const MISSILE_SPEED: f32 = 7.0;
    /// Maximum missile heading change per tick, radians
    pub const MISSILE_TURN_RATE: f32 = 0.15;
    pub const MISSILE_DAMAGE: f32 = 2.0;
    /// Missile retarget radius
    pub const MISSILE_SEEK_RADIUS: f32 = 800.0;
    pub const LASER_SPEED: f32 = 40.0;
    pub const LASER_DAMAGE: f32 = 4.0;
    pub const BOSS_SHOT_SPEED: f32 = 3.0;

    /// Loot drop chance on a non-boss kill
    pub const LOOT_CHANCE: f32 = 0.35;
}

/// Normalize angle to [-pi, pi)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
