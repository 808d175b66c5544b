//! Idle ripple: a soft ripple when nothing has moved for a while.

use puddle_core::{ForceTarget, Impulse, RandomSource};

use crate::clock::AmbientClock;
use crate::scheduler::{AmbientScheduler, TickContext};

impl AmbientScheduler {
    /// Injects one low-strength ripple at a random cell when the last tick
    /// was quiet, the user has been away past the idle threshold, and the
    /// ambient interval has elapsed since the previous idle ripple.
    pub fn idle_ripple(
        &self,
        clock: &mut AmbientClock,
        ctx: TickContext,
        target: &mut dyn ForceTarget,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if !self.idle.enabled || ctx.field_was_active {
            return false;
        }
        if !self.idle_by_interaction(clock, ctx.now_ms) {
            return false;
        }
        if ctx.now_ms - clock.last_ambient_at <= self.idle.ambient_interval_ms {
            return false;
        }
        let x = rng.next_index(target.cols()) as isize;
        let y = rng.next_index(target.rows()) as isize;
        let strength = self.max_strength * self.idle.strength_ratio;
        target.apply_force_at(x, y, Impulse::point(strength));
        clock.last_ambient_at = ctx.now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::Recorder;
    use crate::{AmbientClock, AmbientScheduler, TickContext};
    use puddle_core::{PuddleConfig, Xorshift64};

    fn setup() -> (AmbientScheduler, AmbientClock, Xorshift64) {
        let mut cfg = PuddleConfig::default();
        cfg.splash.enabled = false;
        let mut rng = Xorshift64::new(21);
        let clock = AmbientClock::new(0.0, &cfg, false, &mut rng);
        (AmbientScheduler::new(&cfg), clock, rng)
    }

    fn quiet(now_ms: f64) -> TickContext {
        TickContext {
            now_ms,
            elapsed_ms: 100.0,
            field_was_active: false,
        }
    }

    #[test]
    fn first_eligible_tick_injects_exactly_one_ripple() {
        let (scheduler, mut clock, mut rng) = setup();
        let mut target = Recorder::new(16, 16);
        let mut fired_at = Vec::new();
        let mut now = 0.0;
        while now < 10_000.0 {
            now += 100.0;
            let report = scheduler.run(&mut clock, quiet(now), &mut target, &mut rng);
            if report.idle_ripples > 0 {
                fired_at.push(now);
            }
        }
        // Threshold 4000 and interval 2600: first at 4100, then every 2700.
        assert_eq!(fired_at, vec![4100.0, 6800.0, 9500.0]);
        assert_eq!(target.hits.len(), 3);
        let expected = 100.0 * 0.45;
        assert!(target.hits.iter().all(|h| h.impulse.radius == 0));
        assert!(target.hits.iter().all(|h| (h.impulse.strength - expected).abs() < 1e-12));
    }

    #[test]
    fn never_more_than_one_per_ambient_interval() {
        let (scheduler, mut clock, mut rng) = setup();
        let mut target = Recorder::new(8, 8);
        let mut last: Option<f64> = None;
        let mut now = 0.0;
        while now < 60_000.0 {
            now += 16.0;
            if scheduler.idle_ripple(&mut clock, quiet(now), &mut target, &mut rng) {
                if let Some(prev) = last {
                    assert!(now - prev > 2600.0, "ripples at {prev} and {now}");
                }
                last = Some(now);
            }
        }
        assert!(last.is_some());
    }

    #[test]
    fn active_field_suppresses_idle_ripple() {
        let (scheduler, mut clock, mut rng) = setup();
        let mut target = Recorder::new(8, 8);
        let ctx = TickContext {
            field_was_active: true,
            ..quiet(20_000.0)
        };
        assert!(!scheduler.idle_ripple(&mut clock, ctx, &mut target, &mut rng));
        assert!(target.hits.is_empty());
    }

    #[test]
    fn recent_interaction_suppresses_idle_ripple() {
        let (scheduler, mut clock, mut rng) = setup();
        let mut target = Recorder::new(8, 8);
        clock.note_interaction(18_000.0);
        assert!(!scheduler.idle_ripple(&mut clock, quiet(20_000.0), &mut target, &mut rng));
        assert!(scheduler.idle_ripple(&mut clock, quiet(22_100.0), &mut target, &mut rng));
    }

    #[test]
    fn disabled_idle_never_fires() {
        let mut cfg = PuddleConfig::default();
        cfg.idle.enabled = false;
        let mut rng = Xorshift64::new(2);
        let mut clock = AmbientClock::new(0.0, &cfg, false, &mut rng);
        let scheduler = AmbientScheduler::new(&cfg);
        let mut target = Recorder::new(8, 8);
        assert!(!scheduler.idle_ripple(&mut clock, quiet(50_000.0), &mut target, &mut rng));
    }

    #[test]
    fn ripple_lands_inside_grid() {
        let (scheduler, mut clock, mut rng) = setup();
        let mut target = Recorder::new(3, 2);
        scheduler.idle_ripple(&mut clock, quiet(5_000.0), &mut target, &mut rng);
        let hit = target.hits[0];
        assert!((0..3).contains(&hit.x) && (0..2).contains(&hit.y));
    }
}
