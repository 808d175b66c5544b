//! Lightning surges while rain is on.

use puddle_core::{ForceTarget, Impulse, RandomSource};
use tracing::info;

use crate::clock::AmbientClock;
use crate::scheduler::{AmbientScheduler, LightningStrike, TickContext};

/// Surge strength is scaled by a draw from this band.
const SURGE_JITTER: (f64, f64) = (0.75, 1.0);

impl AmbientScheduler {
    /// While raining, strikes once `now_ms` reaches the scheduled time: a
    /// handful of strong splashes at random cells with random radii, scaled
    /// to grid area. Reschedules after every strike.
    ///
    /// The returned strike is the cue for a presentation-layer flash.
    pub fn lightning(
        &self,
        clock: &mut AmbientClock,
        ctx: TickContext,
        target: &mut dyn ForceTarget,
        rng: &mut dyn RandomSource,
    ) -> Option<LightningStrike> {
        if !self.lightning.enabled || !clock.rain_enabled || ctx.now_ms < clock.next_lightning_at {
            return None;
        }
        let surges = self.lightning.surges_for(target.cols() * target.rows());
        let base = self.max_strength * self.lightning.strength_ratio;
        for _ in 0..surges {
            let x = rng.next_index(target.cols()) as isize;
            let y = rng.next_index(target.rows()) as isize;
            let radius = 1 + rng.next_index(self.lightning.max_radius);
            let strength = base * rng.next_range(SURGE_JITTER.0, SURGE_JITTER.1);
            target.apply_force_at(
                x,
                y,
                Impulse::splash(strength, radius, self.splash.falloff_floor),
            );
        }
        clock.next_lightning_at = ctx.now_ms + self.lightning.interval_ms.sample(rng);
        info!(surges, at_ms = ctx.now_ms, "lightning strike");
        Some(LightningStrike {
            surges,
            at_ms: ctx.now_ms,
        })
    }
}
