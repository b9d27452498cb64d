//! Ambient background effects
//!
//! Two cosmetic emitters run for the life of the UI: a glitch roll every few
//! seconds that sometimes spawns a glitch flash, and a periodic refresh of the
//! orb pulse animation. Glitch flashes live far shorter than the roll
//! interval, so they never pile up.

use std::time::Duration;

use crate::effects::{EffectId, EffectKind, Feedback};
use crate::messages::{ConductorMessage, Outbox};
use crate::random::RandomSource;
use crate::scheduler::Deferred;

/// Ambient emitter settings
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientConfig {
    /// Whether the emitters run at all
    pub enabled: bool,
    /// Time between glitch rolls
    pub glitch_interval: Duration,
    /// Chance of a glitch per roll, `0.0..=1.0`
    pub glitch_probability: f64,
    /// Time between pulse refreshes
    pub pulse_interval: Duration,
    /// Gap between stopping and restarting the pulse
    pub pulse_restore: Duration,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glitch_interval: Duration::from_millis(5000),
            glitch_probability: 0.3,
            pulse_interval: Duration::from_millis(4000),
            pulse_restore: Duration::from_millis(10),
        }
    }
}

/// Periodic glitch and pulse emitter
pub struct AmbientEmitter {
    config: AmbientConfig,
    random: Box<dyn RandomSource>,
    started: bool,
    glitch_rolls: u64,
    glitches: u64,
}

impl AmbientEmitter {
    /// Emitter drawing from `random`
    #[must_use]
    pub fn new(config: AmbientConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            started: false,
            glitch_rolls: 0,
            glitches: 0,
        }
    }

    /// Schedule the first ticks (once)
    pub fn start(&mut self, fx: &mut Feedback<'_>) {
        if !self.config.enabled || self.started {
            return;
        }
        self.started = true;
        fx.schedule(self.config.glitch_interval, Deferred::AmbientGlitchTick);
        fx.schedule(self.config.pulse_interval, Deferred::AmbientPulseTick);
        tracing::debug!("Ambient emitters started");
    }

    /// Glitch roll; returns the spawned flash, if any
    pub fn on_glitch_tick(&mut self, fx: &mut Feedback<'_>) -> Option<EffectId> {
        fx.schedule(self.config.glitch_interval, Deferred::AmbientGlitchTick);
        self.glitch_rolls += 1;

        let roll = self.random.next_unit();
        if roll > 1.0 - self.config.glitch_probability {
            self.glitches += 1;
            Some(fx.flash(EffectKind::GlitchFlash))
        } else {
            None
        }
    }

    /// Pulse refresh: stop the animation, restart it shortly after
    pub fn on_pulse_tick(&mut self, fx: &mut Feedback<'_>) {
        fx.schedule(self.config.pulse_interval, Deferred::AmbientPulseTick);
        fx.send(ConductorMessage::OrbPulse { running: false });
        fx.schedule(self.config.pulse_restore, Deferred::AmbientPulseRestore);
    }

    /// Pulse animation restarts
    pub fn on_pulse_restore(&self, outbox: &Outbox) {
        outbox.send(ConductorMessage::OrbPulse { running: true });
    }

    /// Glitch rolls so far
    #[must_use]
    pub fn glitch_rolls(&self) -> u64 {
        self.glitch_rolls
    }

    /// Glitches emitted so far
    #[must_use]
    pub fn glitches(&self) -> u64 {
        self.glitches
    }

    /// Whether the emitters were started
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started
    }
}

impl std::fmt::Debug for AmbientEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientEmitter")
            .field("config", &self.config)
            .field("started", &self.started)
            .field("glitches", &self.glitches)
            .finish_non_exhaustive()
    }
}
