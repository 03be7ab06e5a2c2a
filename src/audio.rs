//! Sound cues and audio sinks
//!
//! The simulation only names cues. How they sound is up to the sink:
//! procedurally generated Web Audio tones in the browser, a log line natively.

use serde::{Deserialize, Serialize};

use crate::sim::state::WeaponType;

/// Explosion weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionSize {
    Small,
    Large,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player volley, voiced per weapon
    Shoot(WeaponType),
    /// Enemy destroyed (large for the boss)
    Explosion(ExplosionSize),
    /// Health pickup collected
    PowerUp,
    /// Weapon pickup collected
    WeaponUpgrade,
    /// Player died
    GameOver,
    /// Mission complete, next wave incoming
    WaveTransition,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot(WeaponType::Blaster) => "shoot_blaster",
            SoundEffect::Shoot(WeaponType::Spread) => "shoot_spread",
            SoundEffect::Shoot(WeaponType::Rapid) => "shoot_rapid",
            SoundEffect::Shoot(WeaponType::Plasma) => "shoot_plasma",
            SoundEffect::Explosion(ExplosionSize::Small) => "explosion_small",
            SoundEffect::Explosion(ExplosionSize::Large) => "explosion_large",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::WeaponUpgrade => "weapon_upgrade",
            SoundEffect::GameOver => "game_over",
            SoundEffect::WaveTransition => "wave_transition",
        }
    }
}

/// Plays sound cues. Fire-and-forget: failures are swallowed by the sink.
pub trait AudioSink {
    /// `volume` is the effective 0.0 - 1.0 level after settings are applied
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Logs cues at debug level; used by the headless runner
#[derive(Debug, Default, Clone)]
pub struct LogAudio {
    played: u64,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cues received so far
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played += 1;
        log::debug!("sfx {} @ {:.2}", effect.name(), volume);
    }
}

/// Records cues in order; handy in tests
impl AudioSink for Vec<(SoundEffect, f32)> {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.push((effect, volume));
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, ExplosionSize, SoundEffect};
    use crate::sim::state::WeaponType;

    /// Web Audio backed sink. Clones share one context.
    #[derive(Clone)]
    pub struct WebAudio {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single tone with an exponential decay and optional pitch sweep
        fn blip(
            ctx: &AudioContext,
            osc_type: OscillatorType,
            from: f32,
            to: f32,
            level: f32,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if (to - from).abs() > f32::EPSILON {
                osc.frequency().set_value_at_time(from, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to, t + length)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        fn play_shoot(ctx: &AudioContext, weapon: WeaponType, vol: f32) {
            match weapon {
                WeaponType::Blaster => {
                    Self::blip(ctx, OscillatorType::Square, 880.0, 220.0, vol * 0.15, 0.0, 0.08)
                }
                WeaponType::Spread => {
                    Self::blip(ctx, OscillatorType::Sawtooth, 660.0, 180.0, vol * 0.15, 0.0, 0.1)
                }
                WeaponType::Rapid => {
                    Self::blip(ctx, OscillatorType::Square, 1200.0, 600.0, vol * 0.1, 0.0, 0.05)
                }
                WeaponType::Plasma => {
                    Self::blip(ctx, OscillatorType::Sine, 300.0, 90.0, vol * 0.3, 0.0, 0.2);
                    Self::blip(ctx, OscillatorType::Triangle, 600.0, 200.0, vol * 0.1, 0.0, 0.15);
                }
            }
        }

        fn play_explosion(ctx: &AudioContext, size: ExplosionSize, vol: f32) {
            let (length, level) = match size {
                ExplosionSize::Small => (0.25, 0.35),
                ExplosionSize::Large => (0.8, 0.6),
            };
            Self::blip(ctx, OscillatorType::Sawtooth, 100.0, 30.0, vol * level, 0.0, length);
            // High frequency crack
            Self::blip(ctx, OscillatorType::Square, 1500.0, 1500.0, vol * 0.15, 0.0, 0.1);
        }

        fn play_arpeggio(ctx: &AudioContext, freqs: &[f32], step: f64, vol: f32) {
            for (i, freq) in freqs.iter().enumerate() {
                Self::blip(
                    ctx,
                    OscillatorType::Triangle,
                    *freq,
                    *freq,
                    vol * 0.25,
                    i as f64 * step,
                    0.25,
                );
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect, vol: f32) {
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Shoot(weapon) => Self::play_shoot(ctx, weapon, vol),
                SoundEffect::Explosion(size) => Self::play_explosion(ctx, size, vol),
                SoundEffect::PowerUp => Self::play_arpeggio(ctx, &[600.0, 900.0], 0.06, vol),
                SoundEffect::WeaponUpgrade => {
                    Self::play_arpeggio(ctx, &[500.0, 700.0, 1000.0], 0.06, vol)
                }
                SoundEffect::GameOver => {
                    for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                        Self::blip(
                            ctx,
                            OscillatorType::Sine,
                            *freq,
                            *freq,
                            vol * 0.3,
                            i as f64 * 0.2,
                            0.3,
                        );
                    }
                }
                SoundEffect::WaveTransition => {
                    Self::play_arpeggio(ctx, &[400.0, 500.0, 600.0, 800.0], 0.1, vol)
                }
            }
        }
    }
}
