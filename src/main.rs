//! Neon Strider entry point
//!
//! Headless demo driver: runs the deterministic core for a scripted stretch
//! of play and logs what happens. Rendering, audio, and input mapping live
//! in external shells that consume [`GameState::snapshot`] and the event
//! stream the same way this loop does.
//!
//! [`GameState::snapshot`]: neon_strider::sim::GameState::snapshot

use neon_strider::consts::STEP_MS;
use neon_strider::sim::{FixedStep, GameEvent, GamePhase, GameState, TickInput, start_level, tick};

fn main() {
    env_logger::init();
    log::info!("Neon Strider (headless) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("run seed: {seed}");

    let mut state = GameState::new(seed);
    if let Err(e) = start_level(&mut state, 1) {
        log::error!("failed to initialize level: {e}");
        return;
    }

    let mut scheduler = FixedStep::new();
    let demo_frames = 30 * 60; // 30 seconds of host frames at 60 fps

    for host_frame in 0..demo_frames {
        let now_ms = host_frame as f64 * STEP_MS as f64;
        let steps = scheduler.advance(now_ms);

        for _ in 0..steps {
            let input = TickInput {
                right: true,
                jump: state.frame % 90 == 0,
                shoot: state.frame % 10 == 0,
                dash: state.frame % 400 == 0,
                ..Default::default()
            };
            tick(&mut state, &input);
            // Boss death slow-motion feeds back into the clock
            scheduler.set_time_scale(state.time_scale);

            for event in state.take_events() {
                match event {
                    GameEvent::Scored { .. } | GameEvent::CoinsGained { .. } => {}
                    GameEvent::GameOver { ref summary } => {
                        log::info!("run over: {summary:?}");
                    }
                    other => log::debug!("event: {other:?}"),
                }
            }
        }

        // A renderer would consume state.snapshot() here, once per host frame
        if host_frame % 300 == 0 {
            let snap = state.snapshot();
            log::info!(
                "t={:>5.1}s x={:>6.1} hp={} score={} enemies={} projectiles={}",
                host_frame as f64 * STEP_MS as f64 / 1000.0,
                snap.player.x,
                snap.player.hp,
                snap.stats.score,
                snap.enemies.len(),
                snap.projectiles.len(),
            );
        }

        if matches!(state.phase, GamePhase::GameOver | GamePhase::Victory) {
            break;
        }
    }

    scheduler.stop();

    let summary = state.run_summary("demo");
    match summary.to_payload() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("could not encode run summary: {e}"),
    }
}
