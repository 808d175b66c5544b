//! Per-driver ambient timers.

use puddle_core::{MsRange, PuddleConfig, RandomSource};

/// The timestamps and backlog one driver's ambient policies read and update.
///
/// All times are milliseconds on the caller's clock. Nothing here reads a
/// wall clock.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientClock {
    pub(crate) last_interaction_at: f64,
    pub(crate) last_ambient_at: f64,
    pub(crate) next_splash_at: f64,
    pub(crate) next_lightning_at: f64,
    pub(crate) rain_accumulator: f64,
    pub(crate) rain_enabled: bool,
    splash_interval: MsRange,
    lightning_interval: MsRange,
}

impl AmbientClock {
    /// Arms every schedule relative to `now_ms`, treating `now_ms` as the
    /// last interaction.
    pub fn new(
        now_ms: f64,
        config: &PuddleConfig,
        rain_enabled: bool,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let mut clock = Self {
            last_interaction_at: now_ms,
            last_ambient_at: now_ms,
            next_splash_at: now_ms,
            next_lightning_at: now_ms,
            rain_accumulator: 0.0,
            rain_enabled,
            splash_interval: config.splash.interval_ms,
            lightning_interval: config.lightning.interval_ms,
        };
        clock.rearm(now_ms, rng);
        clock
    }

    /// Re-bases every schedule on `now_ms` and drops the rain backlog.
    ///
    /// Used on resume so time spent stopped is never caught up. The last
    /// interaction is kept.
    pub fn rearm(&mut self, now_ms: f64, rng: &mut dyn RandomSource) {
        self.last_ambient_at = now_ms;
        self.next_splash_at = now_ms + self.splash_interval.sample(rng);
        self.next_lightning_at = now_ms + self.lightning_interval.sample(rng);
        self.rain_accumulator = 0.0;
    }

    /// Records user input, postponing idle ripples and splashes.
    pub fn note_interaction(&mut self, now_ms: f64) {
        self.last_interaction_at = now_ms;
    }

    /// Switches rain mode. Turning rain on re-arms lightning from `now_ms`;
    /// any change drops the backlog. Returns true if the mode changed.
    pub fn set_rain_enabled(
        &mut self,
        enabled: bool,
        now_ms: f64,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.rain_enabled == enabled {
            return false;
        }
        self.rain_enabled = enabled;
        self.rain_accumulator = 0.0;
        if enabled {
            self.next_lightning_at = now_ms + self.lightning_interval.sample(rng);
        }
        true
    }

    pub fn last_interaction_at(&self) -> f64 {
        self.last_interaction_at
    }

    pub fn last_ambient_at(&self) -> f64 {
        self.last_ambient_at
    }

    pub fn next_splash_at(&self) -> f64 {
        self.next_splash_at
    }

    pub fn next_lightning_at(&self) -> f64 {
        self.next_lightning_at
    }

    /// Fractional drops carried to the next tick.
    pub fn rain_accumulator(&self) -> f64 {
        self.rain_accumulator
    }

    pub fn rain_enabled(&self) -> bool {
        self.rain_enabled
    }
}
