//! Nebula Strike entry point
//!
//! Native: headless runner that flies an autopilot through a seeded run and
//! prints the final stats. Web: the library's `WebGame` export is the entry.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use glam::Vec2;

    use nebula_strike::Game;
    use nebula_strike::audio::LogAudio;
    use nebula_strike::debrief::{TemplateDebrief, debrief_or_fallback};
    use nebula_strike::persistence::default_store;
    use nebula_strike::sim::{GameEvent, GameMode, Screen};

    #[derive(Parser)]
    #[command(name = "nebula-strike")]
    #[command(about = "Run a seeded Nebula Strike simulation headlessly")]
    struct Args {
        /// Seed for the gameplay RNG
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Frames to simulate (60 per second of play)
        #[arg(long, default_value_t = 3600)]
        frames: u32,
        /// Directory for the high score and settings files
        #[arg(long, default_value = ".nebula-strike")]
        store_dir: PathBuf,
    }

    /// Sweeps the ship side to side near the bottom of the screen
    fn autopilot(frame: u32, screen: &Screen) -> Vec2 {
        let t = frame as f32 / 40.0;
        Vec2::new(
            screen.width * 0.5 + t.sin() * screen.width * 0.4,
            screen.height - 120.0,
        )
    }

    pub fn run() -> anyhow::Result<()> {
        env_logger::init();
        let args = Args::parse();
        log::info!("Nebula Strike (headless) starting, seed {}", args.seed);

        let screen = Screen::default();
        let mut game = Game::new(
            args.seed,
            screen,
            default_store(&args.store_dir),
            Box::new(LogAudio::new()),
        );
        let previous_best = game.high_score();
        let pointer = game.pointer();
        game.set_mode(GameMode::Playing);

        let mut events: Vec<GameEvent> = Vec::new();
        let mut cues = 0u64;
        let mut frames_run = 0;
        for frame in 0..args.frames {
            pointer.set(Some(autopilot(frame, &screen)));
            game.frame(&mut events);
            cues += events
                .drain(..)
                .filter(|e| matches!(e, GameEvent::Sound(_)))
                .count() as u64;
            frames_run = frame + 1;
            if game.mode() == GameMode::GameOver {
                break;
            }
        }

        let stats = &game.state().stats;
        let json = serde_json::to_string_pretty(stats).context("failed to encode stats")?;
        println!("{json}");
        println!(
            "frames: {frames_run}, sound cues: {cues}, high score: {} (was {previous_best})",
            game.high_score()
        );

        let debrief = match game.debrief() {
            Some(text) => text.to_string(),
            None => debrief_or_fallback(&TemplateDebrief, stats),
        };
        println!("\n{debrief}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start function
}
