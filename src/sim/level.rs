//! Level configuration and procedural generation
//!
//! Layout is seeded by the run seed and level index, so a given run always
//! rebuilds the same stage. Difficulty scales through the config table and
//! through enemy hp keyed off the current level.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::state::{
    Enemy, EnemyKind, GamePhase, GameState, LevelMode, Platform, TrapKind,
};

/// Last level; beating its boss wins the run
pub const FINAL_LEVEL: u32 = 6;

/// Per-level tuning
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub enemies: u32,
    pub length: f32,
    pub boss_hp: f32,
    /// Boss attack aggression, 1..=6; scales pattern density and fire rate
    pub boss_aggro: u32,
    pub mode: LevelMode,
}

/// The campaign. Index 0 is level 1.
pub const LEVEL_CONFIGS: [LevelConfig; FINAL_LEVEL as usize] = [
    LevelConfig { enemies: 25, length: 5000.0, boss_hp: 300.0, boss_aggro: 1, mode: LevelMode::Standard },
    LevelConfig { enemies: 35, length: 6000.0, boss_hp: 800.0, boss_aggro: 1, mode: LevelMode::Standard },
    LevelConfig { enemies: 45, length: 6500.0, boss_hp: 1350.0, boss_aggro: 2, mode: LevelMode::Autoscroll },
    LevelConfig { enemies: 60, length: 7000.0, boss_hp: 2000.0, boss_aggro: 2, mode: LevelMode::Lockdown },
    LevelConfig { enemies: 80, length: 8000.0, boss_hp: 3000.0, boss_aggro: 3, mode: LevelMode::Lockdown },
    LevelConfig { enemies: 120, length: 10000.0, boss_hp: 5000.0, boss_aggro: 4, mode: LevelMode::Autoscroll },
];

/// Fatal level-initialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelError {
    /// Level index outside 1..=FINAL_LEVEL
    OutOfRange(u32),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::OutOfRange(level) => {
                write!(f, "level {level} is outside the campaign (1..={FINAL_LEVEL})")
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// Config for a validated level index
pub fn config_for(level: u32) -> Result<&'static LevelConfig, LevelError> {
    if level == 0 || level > FINAL_LEVEL {
        return Err(LevelError::OutOfRange(level));
    }
    Ok(&LEVEL_CONFIGS[(level - 1) as usize])
}

/// Initialize the given level: reset the player and arena flags, rebuild
/// platforms and the enemy roster. An out-of-range index aborts without
/// touching state.
pub fn start_level(state: &mut GameState, level: u32) -> Result<(), LevelError> {
    let config = *config_for(level)?;
    log::info!(
        "starting level {level}: {} enemies over {} px, mode {:?}",
        config.enemies,
        config.length,
        config.mode
    );

    state.stats.level = level;
    state.phase = GamePhase::Playing;
    state.mode = config.mode;
    state.level_length = config.length;
    state.camera_x = 0.0;
    state.shake = 0.0;
    state.time_scale = 1.0;
    state.boss_spawned = false;
    state.lockdown_triggered = false;
    state.lockdown_cleared = false;
    state.lockdown_bounds = Default::default();
    state.respawn_timer = 0;
    state.transition_timer = 0;

    state.player.reset_for_level();

    state.enemies.clear();
    state.projectiles.clear();
    state.items.clear();
    state.particles.clear();
    state.damage_numbers.clear();

    let mut rng = state.rng_state.level_rng(level);
    state.platforms = generate_platforms(&mut rng, level, config.length);

    let roster = generate_enemies(state, &mut rng, &config);
    state.enemies = roster;

    Ok(())
}

/// Leave the shop for the next level of the campaign
pub fn next_level(state: &mut GameState) -> Result<(), LevelError> {
    start_level(state, state.stats.level + 1)
}

/// Build the ground slab and the platform chain across the level
fn generate_platforms(rng: &mut Pcg32, level: u32, length: f32) -> Vec<Platform> {
    let mut platforms = Vec::new();

    // Ground runs past both ends so the camera clamp never shows a void
    platforms.push(Platform::new(-100.0, VIEW_HEIGHT - 40.0, length + 1000.0, 40.0));

    let mut x = 200.0;
    while x < length - 500.0 {
        let width = rng.random_range(100.0..300.0);
        let y = VIEW_HEIGHT - 150.0 - rng.random_range(0.0..250.0);
        let mut platform = Platform::new(x, y, width, 20.0);

        // Traps appear from level 2 on roughly a third of platforms
        if level > 1 && rng.random::<f32>() > 0.7 {
            platform.trap = if rng.random_bool(0.5) {
                TrapKind::Spike
            } else {
                TrapKind::Laser
            };
        }
        platforms.push(platform);

        // Half the time, an upper ledge over the same span
        if rng.random_bool(0.5) && width > 50.0 {
            platforms.push(Platform::new(x + 50.0, y - 120.0, width - 50.0, 20.0));
        }

        x += width + rng.random_range(80.0..230.0);
    }

    platforms
}

/// Roll the level's enemy roster
fn generate_enemies(state: &mut GameState, rng: &mut Pcg32, config: &LevelConfig) -> Vec<Enemy> {
    let mut enemies = Vec::with_capacity(config.enemies as usize);
    for _ in 0..config.enemies {
        let roll: f32 = rng.random();
        let kind = if roll > 0.9 {
            EnemyKind::Barrel
        } else if roll > 0.7 {
            EnemyKind::Flyer
        } else if roll > 0.5 {
            EnemyKind::Turret
        } else if roll > 0.4 {
            EnemyKind::Jumper
        } else {
            EnemyKind::Walker
        };
        let x = rng.random_range(600.0..config.length - 200.0);
        enemies.push(create_enemy(state, rng, x, kind, config.boss_hp));
    }
    enemies
}

/// Build one enemy with kind-specific stats. Hp scales with the current
/// level; `boss_hp` only applies to [`EnemyKind::Boss`].
pub fn create_enemy(
    state: &mut GameState,
    rng: &mut Pcg32,
    x: f32,
    kind: EnemyKind,
    boss_hp: f32,
) -> Enemy {
    let level = state.stats.level as f32;
    let mut x = x;
    let mut y = VIEW_HEIGHT - 80.0;
    let mut width = 40.0;
    let mut height = 40.0;
    let mut hp = 3.0 + level * 2.0;

    match kind {
        EnemyKind::Walker => {}
        EnemyKind::Jumper => {
            width = 35.0;
            height = 35.0;
        }
        EnemyKind::Flyer => {
            y = VIEW_HEIGHT - 250.0 - rng.random_range(0.0..150.0);
            width = 40.0;
            height = 30.0;
            hp = 2.0 + level;
        }
        EnemyKind::Turret => {
            y = VIEW_HEIGHT - 150.0 - rng.random_range(0.0..200.0);
            hp = 5.0 + level * 2.0;
        }
        EnemyKind::Boss => {
            width = 180.0;
            height = 140.0;
            y = VIEW_HEIGHT - 180.0;
            hp = boss_hp;
        }
        EnemyKind::Barrel => {
            width = 30.0;
            height = 45.0;
            hp = 1.0;
            y = VIEW_HEIGHT - 85.0;
            // Prefer a perch on a random platform once the stage has some
            if state.platforms.len() > 5 {
                let idx = rng.random_range(0..state.platforms.len());
                let p = &state.platforms[idx];
                y = p.y - height;
                x = p.x + p.width / 2.0;
            }
        }
    }

    Enemy {
        id: state.next_entity_id(),
        kind,
        x,
        y,
        width,
        height,
        vx: 0.0,
        vy: 0.0,
        hp,
        max_hp: hp,
        dead: false,
        shoot_timer: rng.random_range(0..100),
        anim_offset: rng.random_range(0.0..100.0),
        dying: None,
    }
}
