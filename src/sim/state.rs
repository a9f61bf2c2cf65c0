//! Game state and core simulation types
//!
//! Everything the simulation mutates lives here; the renderer only ever sees
//! a read-only [`Snapshot`] taken between tick batches.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::leaderboard::RunSummary;
use crate::sim::collision::Rect;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen, state retained
    Paused,
    /// Boss down, waiting out the transition delay
    LevelComplete,
    /// Between levels; the shop UI owns the screen
    Shop,
    /// Final boss down
    Victory,
    /// Out of lives
    GameOver,
}

/// Arena behavior for the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMode {
    /// Camera follows the player
    Standard,
    /// Camera advances on its own; falling behind is lethal
    Autoscroll,
    /// Mid-level arena that locks until cleared
    Lockdown,
}

/// Player weapon tiers, in pickup order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Blaster,
    Spread,
    Laser,
    RapidFire,
}

/// Enemy behavior archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker,
    Flyer,
    Jumper,
    Turret,
    Boss,
    Barrel,
}

impl EnemyKind {
    /// Score awarded for a kill
    pub fn score_value(self) -> u64 {
        let rank = match self {
            EnemyKind::Walker => 1,
            EnemyKind::Flyer => 2,
            EnemyKind::Jumper => 3,
            EnemyKind::Turret => 4,
            EnemyKind::Boss => 5,
            EnemyKind::Barrel => 6,
        };
        rank * 100
    }
}

/// Projectile flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Straight-flying bullet (player or enemy)
    Normal,
    /// Persistent area shell; pierces and re-hits on a cooldown
    Cannon,
    /// Homing missile
    Missile,
    /// Transient barrel blast area, no visual of its own
    Explosion,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Coin,
    Health,
    Weapon(WeaponKind),
}

/// Platform hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrapKind {
    #[default]
    None,
    /// Damages and bounces on landing
    Spike,
    /// Vertical beam above the platform, cycling on a timer
    Laser,
}

/// Player skills on the Q/W/E/R slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    Cannon,
    Shield,
    Missiles,
    Rage,
}

/// Player dimensions; crouching swaps height while keeping feet planted
pub const PLAYER_WIDTH: f32 = 32.0;
pub const PLAYER_HEIGHT: f32 = 48.0;
pub const PLAYER_CROUCH_HEIGHT: f32 = 28.0;
pub const PLAYER_MAX_HP: f32 = 5.0;

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,

    pub facing_right: bool,
    pub grounded: bool,
    /// 0 = can jump, 1 = airborne with double jump left, 2 = spent
    pub jump_count: u8,
    pub crouching: bool,
    pub invincible_timer: u32,

    pub weapon: WeaponKind,
    pub shoot_cooldown: u32,
    /// Weapon heat, 0..=MAX_HEAT; at max the weapon locks out
    pub weapon_heat: f32,
    pub overheated: bool,

    pub dash_timer: u32,
    pub dash_cooldown: u32,
    pub cannon_cooldown: u32,
    pub shield_active: bool,
    pub shield_timer: u32,
    pub shield_cooldown: u32,
    pub missile_timer: u32,
    pub missile_cooldown: u32,
    pub rage_timer: u32,
    pub rage_cooldown: u32,
}

impl Player {
    pub fn new() -> Self {
        Self {
            x: 50.0,
            y: 300.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            vx: 0.0,
            vy: 0.0,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            dead: false,
            facing_right: true,
            grounded: false,
            jump_count: 0,
            crouching: false,
            invincible_timer: 0,
            weapon: WeaponKind::Blaster,
            shoot_cooldown: 0,
            weapon_heat: 0.0,
            overheated: false,
            dash_timer: 0,
            dash_cooldown: 0,
            cannon_cooldown: 0,
            shield_active: false,
            shield_timer: 0,
            shield_cooldown: 0,
            missile_timer: 0,
            missile_cooldown: 0,
            rage_timer: 0,
            rage_cooldown: 0,
        }
    }

    /// Reset for a fresh level. The player is reused, never recreated.
    pub fn reset_for_level(&mut self) {
        self.x = 50.0;
        self.y = 100.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.hp = self.max_hp;
        self.dead = false;
        self.crouching = false;
        self.width = PLAYER_WIDTH;
        self.height = PLAYER_HEIGHT;
        self.invincible_timer = 0;
        self.weapon_heat = 0.0;
        self.overheated = false;
        self.shoot_cooldown = 0;
        self.dash_timer = 0;
        self.dash_cooldown = 0;
        self.cannon_cooldown = 0;
        self.shield_active = false;
        self.shield_timer = 0;
        self.shield_cooldown = 0;
        self.missile_timer = 0;
        self.missile_cooldown = 0;
        self.rage_timer = 0;
        self.rage_cooldown = 0;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    /// Ticks until the next shot (turret/flyer)
    pub shoot_timer: u32,
    /// Desynchronizes idle animation between enemies
    pub anim_offset: f32,
    /// Boss only: remaining ticks of the scripted death sequence
    pub dying: Option<u32>,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Alive and not in a death sequence - a valid combat target
    pub fn targetable(&self) -> bool {
        !self.dead && self.dying.is_none()
    }
}

/// A projectile fired by either side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: f32,
    pub from_player: bool,
    /// Remaining lifetime in ticks
    pub life: u32,
    /// Weapon tier that fired this, for piercing/falloff rules
    pub weapon: Option<WeaponKind>,
    /// Spawn x, for distance-based falloff
    pub origin_x: f32,
    /// Boss rain shots arc under gravity
    pub has_gravity: bool,
    /// (enemy id, frame of last hit) pairs for re-hit cooldowns
    #[serde(skip)]
    pub hit_log: Vec<(u32, u64)>,
}

impl Projectile {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Last frame this projectile hit the given enemy, if any
    pub fn last_hit(&self, enemy_id: u32) -> Option<u64> {
        self.hit_log
            .iter()
            .find(|(id, _)| *id == enemy_id)
            .map(|(_, frame)| *frame)
    }

    pub fn record_hit(&mut self, enemy_id: u32, frame: u64) {
        if let Some(entry) = self.hit_log.iter_mut().find(|(id, _)| *id == enemy_id) {
            entry.1 = frame;
        } else {
            self.hit_log.push((enemy_id, frame));
        }
    }
}

/// A static platform, possibly trapped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub trap: TrapKind,
    /// Laser cycle position, 0..LASER_TRAP_PERIOD
    pub trap_timer: u32,
    pub trap_active: bool,
}

/// Laser trap cycle: active for the first part of each period
pub const LASER_TRAP_PERIOD: u32 = 180;
pub const LASER_TRAP_ACTIVE: u32 = 120;
/// Height of the beam zone above a laser platform
pub const LASER_BEAM_HEIGHT: f32 = 100.0;

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            trap: TrapKind::None,
            trap_timer: 0,
            trap_active: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The damaging region above an active laser platform
    pub fn beam_zone(&self) -> Rect {
        Rect::new(self.x, self.y - LASER_BEAM_HEIGHT, self.width, LASER_BEAM_HEIGHT)
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Pickup collision box edge
pub const ITEM_SIZE: f32 = 20.0;

impl Item {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, ITEM_SIZE, ITEM_SIZE)
    }
}

/// A cosmetic particle; advanced by the tick for lifetime consistency only
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Remaining life in ticks
    pub life: f32,
    /// Color tag for the renderer's palette lookup
    pub color: u32,
    pub size: f32,
}

/// Maximum live particles; oldest are evicted beyond this
pub const MAX_PARTICLES: usize = 512;

/// Palette tags the renderer maps to actual colors
pub const FX_CYAN: u32 = 0;
pub const FX_RED: u32 = 1;
pub const FX_GREEN: u32 = 2;
pub const FX_YELLOW: u32 = 3;
pub const FX_ORANGE: u32 = 4;
pub const FX_PINK: u32 = 5;
pub const FX_WHITE: u32 = 6;

/// A floating combat text popup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageNumber {
    pub x: f32,
    pub y: f32,
    pub text: String,
    /// Remaining life in ticks
    pub life: u32,
    pub color: u32,
}

/// Run-wide counters surfaced to the HUD
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub coins: u64,
    pub lives: i32,
    pub level: u32,
}

/// Shop-purchased stat levels, set by the (external) shop between levels
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Upgrades {
    pub speed: u32,
    pub dmg: u32,
    pub fire_rate: u32,
}

/// Lockdown arena bounds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LockdownBounds {
    pub min: f32,
    pub max: f32,
}

/// Fire-and-forget notifications for the audio/score/HUD sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Scored { points: u64 },
    CoinsGained { coins: u64 },
    PlayerDamaged { amount: f32, hp: f32 },
    PlayerDied { lives_left: i32 },
    PlayerRespawned,
    PlayerJumped,
    ItemCollected { kind: ItemKind },
    WeaponChanged { weapon: WeaponKind },
    SkillActivated { skill: Skill },
    ShieldExpired,
    Overheated,
    DashStarted,
    LockdownTriggered { min: f32, max: f32 },
    LockdownCleared,
    BossSpawned,
    BossDefeated,
    LevelCompleted { level: u32 },
    Victory,
    GameOver { summary: RunSummary },
}

/// RNG seed wrapper; level generation derives a fresh stream from it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generator for a given level, decorrelated from other levels
    pub fn level_rng(&self, level: u32) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed.wrapping_add((level as u64).wrapping_mul(0x9E37_79B9)))
    }
}

/// Complete simulation state (deterministic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub phase: GamePhase,
    pub stats: GameStats,
    pub upgrades: Upgrades,

    /// Global tick counter
    pub frame: u64,
    /// Ticks spent in active play, for the time leaderboard
    pub run_ticks: u64,
    /// Simulation speed multiplier; < 1 during the boss death sequence
    pub time_scale: f32,

    pub mode: LevelMode,
    pub level_length: f32,
    pub camera_x: f32,
    /// Decaying screen shake magnitude
    pub shake: f32,
    pub boss_spawned: bool,
    pub lockdown_triggered: bool,
    pub lockdown_cleared: bool,
    pub lockdown_bounds: LockdownBounds,
    /// Final boss down this run
    pub boss_defeated: bool,

    /// Ticks until the dead player respawns
    pub respawn_timer: u32,
    /// Ticks until LevelComplete resolves into Shop/Victory
    pub transition_timer: u32,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub platforms: Vec<Platform>,
    pub items: Vec<Item>,
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,

    /// Events accumulated this tick batch, drained by the sinks
    #[serde(skip)]
    pub events: Vec<GameEvent>,

    next_id: u32,
}

impl GameState {
    /// Create a fresh run. The first level still needs [`start_level`].
    ///
    /// [`start_level`]: crate::sim::level::start_level
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            phase: GamePhase::Playing,
            stats: GameStats {
                score: 0,
                coins: 0,
                lives: 3,
                level: 1,
            },
            upgrades: Upgrades::default(),
            frame: 0,
            run_ticks: 0,
            time_scale: 1.0,
            mode: LevelMode::Standard,
            level_length: 2000.0,
            camera_x: 0.0,
            shake: 0.0,
            boss_spawned: false,
            lockdown_triggered: false,
            lockdown_cleared: false,
            lockdown_bounds: LockdownBounds::default(),
            boss_defeated: false,
            respawn_timer: 0,
            transition_timer: 0,
            player: Player::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            platforms: Vec::new(),
            items: Vec::new(),
            particles: Vec::new(),
            damage_numbers: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain the events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Award score and coins together, emitting both events
    pub fn award(&mut self, points: u64, coins: u64) {
        if points > 0 {
            self.stats.score += points;
            self.push_event(GameEvent::Scored { points });
        }
        if coins > 0 {
            self.stats.coins += coins;
            self.push_event(GameEvent::CoinsGained { coins });
        }
    }

    /// Raise screen shake, saturating at a sane ceiling
    pub fn add_shake(&mut self, magnitude: f32) {
        self.shake = self.shake.max(magnitude).min(30.0);
    }

    pub fn push_popup(&mut self, x: f32, y: f32, text: impl Into<String>, color: u32) {
        self.damage_numbers.push(DamageNumber {
            x,
            y,
            text: text.into(),
            life: 40,
            color,
        });
    }

    /// Scatter a burst of particles around a point. Spread is derived from a
    /// frame/index hash so results depend only on simulation state.
    pub fn spawn_burst(&mut self, x: f32, y: f32, count: u32, color: u32) {
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let hash = (self.frame as u32)
                .wrapping_mul(2654435761)
                .wrapping_add(i.wrapping_mul(7919));
            let rx = (hash % 1000) as f32 / 1000.0 - 0.5;
            let ry = ((hash >> 10) % 1000) as f32 / 1000.0 - 0.5;
            let rl = ((hash >> 20) % 1000) as f32 / 1000.0;
            self.particles.push(Particle {
                x,
                y,
                vx: rx * 8.0,
                vy: ry * 8.0,
                life: 20.0 + rl * 20.0,
                color,
                size: 1.0 + rl * 4.0,
            });
        }
    }

    /// Terminal payload for the persistence API
    pub fn run_summary(&self, name: &str) -> RunSummary {
        RunSummary {
            name: name.to_string(),
            score: self.stats.score,
            level: self.stats.level,
            coins: self.stats.coins,
            time_secs: self.run_ticks / 60,
            defeated_boss: self.boss_defeated,
        }
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            mode: self.mode,
            stats: self.stats,
            frame: self.frame,
            camera_x: self.camera_x,
            shake: self.shake,
            lockdown_active: self.lockdown_triggered && !self.lockdown_cleared,
            lockdown_bounds: self.lockdown_bounds,
            player: &self.player,
            enemies: &self.enemies,
            projectiles: &self.projectiles,
            platforms: &self.platforms,
            items: &self.items,
            particles: &self.particles,
            damage_numbers: &self.damage_numbers,
        }
    }
}

/// Read-only per-frame view handed to the presentation layer.
///
/// Borrows the live collections; the renderer cannot mutate them and must
/// drop the snapshot before the next tick batch.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub mode: LevelMode,
    pub stats: GameStats,
    pub frame: u64,
    pub camera_x: f32,
    pub shake: f32,
    pub lockdown_active: bool,
    pub lockdown_bounds: LockdownBounds,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub projectiles: &'a [Projectile],
    pub platforms: &'a [Platform],
    pub items: &'a [Item],
    pub particles: &'a [Particle],
    pub damage_numbers: &'a [DamageNumber],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_monotonic() {
        let mut state = GameState::new(7);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn award_emits_both_events() {
        let mut state = GameState::new(7);
        state.award(100, 10);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Scored { points: 100 }));
        assert!(events.contains(&GameEvent::CoinsGained { coins: 10 }));
        assert_eq!(state.stats.score, 100);
        assert_eq!(state.stats.coins, 10);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn projectile_hit_log_tracks_last_frame() {
        let mut p = Projectile {
            id: 1,
            kind: ProjectileKind::Cannon,
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            vx: 0.0,
            vy: 0.0,
            damage: 20.0,
            from_player: true,
            life: 80,
            weapon: None,
            origin_x: 0.0,
            has_gravity: false,
            hit_log: Vec::new(),
        };
        assert_eq!(p.last_hit(5), None);
        p.record_hit(5, 100);
        assert_eq!(p.last_hit(5), Some(100));
        p.record_hit(5, 130);
        assert_eq!(p.last_hit(5), Some(130));
        assert_eq!(p.hit_log.len(), 1);
    }

    #[test]
    fn burst_respects_particle_cap() {
        let mut state = GameState::new(7);
        state.spawn_burst(0.0, 0.0, MAX_PARTICLES as u32 + 100, 0);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }
}
