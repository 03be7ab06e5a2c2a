//! Frame driver
//!
//! Owns the simulation state plus everything around it (mode, settings,
//! high score, storage, audio) and runs one step per host frame. Pointer input
//! arrives through a shared cell that host event handlers write into; the
//! driver samples it once at the top of each frame.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use crate::audio::{AudioSink, SilentAudio};
use crate::debrief::{DebriefProvider, TemplateDebrief, debrief_or_fallback};
use crate::highscore::HighScore;
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::settings::Settings;
use crate::sim::events::{EventSink, GameEvent};
use crate::sim::mission::{MissionPhase, mission_phase};
use crate::sim::state::{
    Enemy, FloatingText, GameMode, GameState, GameStats, Loadout, Particle, Player, PowerUp,
    Projectile, Screen,
};
use crate::sim::tick::{TickInput, tick};

/// Latest pointer position, written by input handlers and taken by the driver
pub type PointerCell = Rc<Cell<Option<Vec2>>>;

/// Map a client-space point onto a canvas drawn at `displayed` CSS size from
/// `origin`, whose backing store is `backing` pixels. An axis with no layout
/// size is left unscaled.
pub fn client_to_canvas(client: Vec2, origin: Vec2, displayed: Vec2, backing: Vec2) -> Vec2 {
    let ratio = |b: f32, d: f32| if d > 0.0 && b > 0.0 { b / d } else { 1.0 };
    let scale = Vec2::new(ratio(backing.x, displayed.x), ratio(backing.y, displayed.y));
    (client - origin) * scale
}

/// Read-only view of one frame, for rendering or export
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub mode: GameMode,
    pub frame: u64,
    pub screen: Screen,
    /// Shake magnitude after settings (0 when disabled)
    pub shake: f32,
    pub phase: MissionPhase,
    /// Mission objective progress in [0, 1], for the HUD bar
    pub mission_progress: f32,
    pub high_score: u64,
    pub stats: &'a GameStats,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub projectiles: &'a [Projectile],
    pub powerups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub texts: &'a [FloatingText],
}

/// Routes sim events to audio, the high score and the host
struct Dispatch<'a> {
    audio: &'a mut dyn AudioSink,
    volume: f32,
    high_score: &'a mut HighScore,
    store: &'a mut dyn KeyValueStore,
    host: &'a mut dyn EventSink,
    game_over: Option<GameStats>,
}

impl EventSink for Dispatch<'_> {
    fn emit(&mut self, event: GameEvent) {
        match &event {
            GameEvent::Sound(effect) => {
                if self.volume > 0.0 {
                    self.audio.play(*effect, self.volume);
                }
            }
            GameEvent::ScoreChanged(score) => {
                if self.high_score.submit(*score)
                    && let Err(e) = self.high_score.save(self.store)
                {
                    log::warn!("Failed to save high score: {e}");
                }
            }
            GameEvent::GameOver(stats) => self.game_over = Some(stats.clone()),
            GameEvent::ComboChanged(_) | GameEvent::HealthChanged(_) => {}
        }
        self.host.emit(event);
    }
}

pub struct Game {
    state: GameState,
    mode: GameMode,
    pointer: PointerCell,
    settings: Settings,
    high_score: HighScore,
    store: Box<dyn KeyValueStore>,
    audio: Box<dyn AudioSink>,
    debrief_provider: Box<dyn DebriefProvider>,
    debrief: Option<String>,
}

impl Game {
    /// Load settings and high score from `store` and build a fresh run
    pub fn new(
        seed: u64,
        screen: Screen,
        store: Box<dyn KeyValueStore>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let high_score = HighScore::load(store.as_ref());
        let mut state = GameState::new(seed, screen, settings.loadout);
        state.particle_cap = settings.max_particles();

        log::info!(
            "Game created: seed={seed}, screen={}x{}, high score {}",
            screen.width,
            screen.height,
            high_score.best()
        );

        Self {
            state,
            mode: GameMode::Menu,
            pointer: Rc::new(Cell::new(None)),
            settings,
            high_score,
            store,
            audio,
            debrief_provider: Box::new(TemplateDebrief),
            debrief: None,
        }
    }

    /// In-memory storage, no audio
    pub fn headless(seed: u64, screen: Screen) -> Self {
        Self::new(
            seed,
            screen,
            Box::new(MemoryStore::new()),
            Box::new(SilentAudio),
        )
    }

    pub fn with_debrief_provider(mut self, provider: Box<dyn DebriefProvider>) -> Self {
        self.debrief_provider = provider;
        self
    }

    /// Handle for input callbacks
    pub fn pointer(&self) -> PointerCell {
        Rc::clone(&self.pointer)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    /// Debrief for the last finished run
    pub fn debrief(&self) -> Option<&str> {
        self.debrief.as_deref()
    }

    /// Switch screens. Entering the menu resets the run.
    pub fn set_mode(&mut self, mode: GameMode) {
        if mode == GameMode::Menu {
            self.reset();
        }
        if mode != self.mode {
            log::info!("Mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Fresh run. Calling it twice in a row is the same as calling it once.
    fn reset(&mut self) {
        self.state.reset();
        self.pointer.set(None);
        self.debrief = None;
    }

    /// Advance one frame, forwarding every sim event to `host`
    pub fn frame(&mut self, host: &mut dyn EventSink) {
        let input = TickInput {
            mode: self.mode,
            pointer: self.pointer.take(),
        };

        let mut dispatch = Dispatch {
            audio: self.audio.as_mut(),
            volume: self.settings.effective_volume(),
            high_score: &mut self.high_score,
            store: self.store.as_mut(),
            host,
            game_over: None,
        };
        tick(&mut self.state, &input, &mut dispatch);

        if let Some(stats) = dispatch.game_over {
            self.finish_run(&stats);
        }
    }

    fn finish_run(&mut self, stats: &GameStats) {
        log::info!(
            "Run over: score {} on wave {} ({} kills)",
            stats.score,
            stats.wave,
            stats.enemies_destroyed
        );
        self.debrief = Some(debrief_or_fallback(self.debrief_provider.as_ref(), stats));
        self.mode = GameMode::GameOver;
    }

    /// Apply a hangar choice and persist it
    pub fn set_loadout(&mut self, loadout: Loadout) {
        self.settings.loadout = loadout;
        self.state.set_loadout(loadout);
        self.persist_settings();
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.state.particle_cap = settings.max_particles();
        self.state.set_loadout(settings.loadout);
        self.settings = settings;
        self.persist_settings();
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {e}");
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.state.set_screen(screen);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        Snapshot {
            mode: self.mode,
            frame: state.timers.frame,
            screen: state.screen,
            shake: if self.settings.effective_screen_shake() {
                state.timers.shake
            } else {
                0.0
            },
            phase: mission_phase(&state.stats.mission, state.timers.transition),
            mission_progress: state.stats.mission.progress(),
            high_score: self.high_score.best(),
            stats: &state.stats,
            player: &state.player,
            enemies: &state.enemies,
            projectiles: &state.projectiles,
            powerups: &state.powerups,
            particles: &state.particles,
            texts: &state.texts,
        }
    }
}
