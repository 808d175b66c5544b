//! Random splash on a scheduled, jittered interval.

use puddle_core::{ForceTarget, Impulse, RandomSource};

use crate::clock::AmbientClock;
use crate::scheduler::{interior, AmbientScheduler, TickContext};

impl AmbientScheduler {
    /// Drops a radius-1 splash on a random interior cell once the scheduled
    /// time has passed, then draws the next time from the configured range.
    ///
    /// A due splash waits while the user is interacting and fires on the
    /// first tick after they have been idle past the threshold.
    pub fn random_splash(
        &self,
        clock: &mut AmbientClock,
        ctx: TickContext,
        target: &mut dyn ForceTarget,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if !self.splash.enabled || ctx.now_ms < clock.next_splash_at {
            return false;
        }
        if !self.idle_by_interaction(clock, ctx.now_ms) {
            return false;
        }
        let x = interior(rng, target.cols());
        let y = interior(rng, target.rows());
        let impulse = Impulse::splash(
            self.max_strength * self.splash.strength_ratio,
            1,
            self.splash.falloff_floor,
        );
        target.apply_force_at(x, y, impulse);
        clock.next_splash_at = ctx.now_ms + self.splash.interval_ms.sample(rng);
        true
    }
}
