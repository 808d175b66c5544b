//! Rain: a rate-banded drop accumulator and the three drop classes.

use puddle_core::{ForceTarget, Impulse, RandomSource};

use crate::clock::AmbientClock;
use crate::scheduler::{AmbientScheduler, TickContext};

/// The three outcomes a rain drop resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainDrop {
    /// Strong splash with the configured big-drop radius.
    Big,
    /// Medium radius-1 splash.
    Splash,
    /// Single-cell ripple.
    Plain,
}

impl AmbientScheduler {
    /// Classifies a uniform draw against the probability bands.
    pub fn classify_drop(&self, draw: f64) -> RainDrop {
        if draw < self.rain.big_drop_chance {
            RainDrop::Big
        } else if draw < self.rain.big_drop_chance + self.rain.splash_chance {
            RainDrop::Splash
        } else {
            RainDrop::Plain
        }
    }

    fn drop_impulse(&self, drop: RainDrop) -> Impulse {
        let floor = self.splash.falloff_floor;
        match drop {
            RainDrop::Big => Impulse::splash(
                self.max_strength * self.rain.big_strength_ratio,
                self.rain.big_drop_radius,
                floor,
            ),
            RainDrop::Splash => {
                Impulse::splash(self.max_strength * self.rain.splash_strength_ratio, 1, floor)
            }
            RainDrop::Plain => Impulse::point(self.max_strength * self.rain.plain_strength_ratio),
        }
    }

    /// Accumulates drops for the elapsed time and releases the whole ones.
    ///
    /// The backlog never exceeds `accumulator_cap` and at most
    /// `max_drops_per_tick` drops land per call. Returns the number released.
    pub fn rain(
        &self,
        clock: &mut AmbientClock,
        ctx: TickContext,
        target: &mut dyn ForceTarget,
        rng: &mut dyn RandomSource,
    ) -> usize {
        if !clock.rain_enabled {
            return 0;
        }
        let cells = target.cols() * target.rows();
        let rate = self.rain.drops_per_second(cells, ctx.now_ms);
        let gained = rate * ctx.elapsed_ms / 1000.0;
        if gained.is_finite() && gained > 0.0 {
            clock.rain_accumulator += gained;
        }
        clock.rain_accumulator = clock.rain_accumulator.min(self.rain.accumulator_cap);

        let drops = (clock.rain_accumulator.floor() as usize).min(self.rain.max_drops_per_tick);
        clock.rain_accumulator -= drops as f64;

        for _ in 0..drops {
            let x = rng.next_index(target.cols()) as isize;
            let y = rng.next_index(target.rows()) as isize;
            let drop = self.classify_drop(rng.next_f64());
            target.apply_force_at(x, y, self.drop_impulse(drop));
        }
        drops
    }
}
