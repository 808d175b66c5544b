//! The scheduler that runs every ambient policy once per tick.

use puddle_core::{
    ForceTarget, IdleConfig, LightningConfig, PuddleConfig, RainConfig, RandomSource,
    SplashConfig,
};

use crate::clock::AmbientClock;

/// What the driver knows about the tick being processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub now_ms: f64,
    /// Time since the previous processed tick.
    pub elapsed_ms: f64,
    /// Whether the previous field step had queued work.
    pub field_was_active: bool,
}

/// A lightning strike that fired this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightningStrike {
    pub surges: usize,
    pub at_ms: f64,
}

/// Everything the ambient policies injected in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmbientReport {
    pub idle_ripples: usize,
    pub splashes: usize,
    pub rain_drops: usize,
    pub lightning: Option<LightningStrike>,
}

impl AmbientReport {
    /// True if no policy fired.
    pub fn is_empty(&self) -> bool {
        self.idle_ripples == 0
            && self.splashes == 0
            && self.rain_drops == 0
            && self.lightning.is_none()
    }
}

/// Idle ripple, random splash, rain and lightning policies.
///
/// Holds only configuration; all mutable timing lives in the
/// [`AmbientClock`] passed to [`run`](Self::run), and every injection goes
/// through [`ForceTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientScheduler {
    pub(crate) idle: IdleConfig,
    pub(crate) splash: SplashConfig,
    pub(crate) rain: RainConfig,
    pub(crate) lightning: LightningConfig,
    pub(crate) max_strength: f64,
}

impl AmbientScheduler {
    pub fn new(config: &PuddleConfig) -> Self {
        Self {
            idle: config.idle,
            splash: config.splash,
            rain: config.rain,
            lightning: config.lightning,
            max_strength: config.field.max_ripple_strength,
        }
    }

    /// Runs the policies in order: idle ripple, random splash, rain,
    /// lightning.
    pub fn run(
        &self,
        clock: &mut AmbientClock,
        ctx: TickContext,
        target: &mut dyn ForceTarget,
        rng: &mut dyn RandomSource,
    ) -> AmbientReport {
        AmbientReport {
            idle_ripples: usize::from(self.idle_ripple(clock, ctx, target, rng)),
            splashes: usize::from(self.random_splash(clock, ctx, target, rng)),
            rain_drops: self.rain(clock, ctx, target, rng),
            lightning: self.lightning(clock, ctx, target, rng),
        }
    }

    /// True once `now_ms` is past the idle threshold since the last interaction.
    pub(crate) fn idle_by_interaction(&self, clock: &AmbientClock, now_ms: f64) -> bool {
        now_ms - clock.last_interaction_at > self.idle.idle_threshold_ms
    }
}

/// A random cell away from the border when the grid has an interior.
pub(crate) fn interior(rng: &mut dyn RandomSource, len: usize) -> isize {
    if len >= 3 {
        1 + rng.next_index(len - 2) as isize
    } else {
        rng.next_index(len) as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use puddle_core::{Field, FieldParams, ShadePalette, Xorshift64};

    fn quiet_config() -> PuddleConfig {
        let mut cfg = PuddleConfig::default();
        cfg.splash.enabled = false;
        cfg
    }

    #[test]
    fn empty_report_when_nothing_is_due() {
        let cfg = PuddleConfig::default();
        let scheduler = AmbientScheduler::new(&cfg);
        let mut rng = Xorshift64::new(1);
        let mut clock = AmbientClock::new(0.0, &cfg, false, &mut rng);
        let mut target = Recorder::new(20, 20);
        let ctx = TickContext {
            now_ms: 100.0,
            elapsed_ms: 100.0,
            field_was_active: false,
        };
        let report = scheduler.run(&mut clock, ctx, &mut target, &mut rng);
        assert!(report.is_empty());
        assert!(target.hits.is_empty());
    }

    #[test]
    fn run_injects_into_a_real_field() {
        let cfg = quiet_config();
        let scheduler = AmbientScheduler::new(&cfg);
        let mut rng = Xorshift64::new(5);
        let mut clock = AmbientClock::new(0.0, &cfg, false, &mut rng);
        let mut field =
            Field::new(12, 12, FieldParams::default(), ShadePalette::default()).unwrap();
        let ctx = TickContext {
            now_ms: 5_000.0,
            elapsed_ms: 100.0,
            field_was_active: false,
        };
        let report = scheduler.run(&mut clock, ctx, &mut field, &mut rng);
        assert_eq!(report.idle_ripples, 1);
        assert!(!field.is_quiescent());
    }

    #[test]
    fn interior_avoids_border_on_large_grids() {
        let mut rng = Xorshift64::new(3);
        for _ in 0..200 {
            let v = interior(&mut rng, 10);
            assert!((1..=8).contains(&v), "{v}");
        }
        assert_eq!(interior(&mut rng, 1), 0);
    }
}
