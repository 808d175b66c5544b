//! Tunables for the whole simulation, grouped by the component that reads them.
//!
//! Every section has a `Default` carrying the stock constants and a lenient
//! `from_json` that falls back to those defaults key by key. Range checks live
//! in [`PuddleConfig::validate`]; [`PuddleConfig::schema`] describes every key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PuddleError;
use crate::field::{
    FieldParams, DEFAULT_DAMPENING_RATIO, DEFAULT_DIAGONAL_WEIGHT, DEFAULT_FORCE_CUTOFF,
    DEFAULT_MAX_RIPPLE_STRENGTH,
};
use crate::params::{param_bool, param_f64, param_range, param_string, param_usize, section};
use crate::prng::RandomSource;
use crate::shade::{ShadePalette, DEFAULT_SHADES, DEFAULT_SHADE_EXPONENT};
use crate::surface::{
    SurfaceConfig, DEFAULT_CELL_SIZE_RATIO, DEFAULT_MAX_CELL_SIZE, DEFAULT_MIN_CELL_SIZE,
};

/// A closed interval of milliseconds, sampled uniformly when scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsRange {
    pub min: f64,
    pub max: f64,
}

impl MsRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A uniformly drawn delay within the range.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        rng.next_range(self.min, self.max)
    }

    fn from_json(params: &Value, name: &str, default: MsRange) -> Self {
        let (min, max) = param_range(params, name, (default.min, default.max));
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<(), PuddleError> {
        if !(self.min >= 0.0 && self.max >= self.min && self.max.is_finite()) {
            return Err(PuddleError::config(
                name,
                format!("must satisfy 0 <= min <= max, got [{}, {}]", self.min, self.max),
            ));
        }
        Ok(())
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), PuddleError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PuddleError::config(name, format!("must be finite and > 0, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), PuddleError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PuddleError::config(name, format!("must be finite and >= 0, got {value}")))
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), PuddleError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PuddleError::config(name, format!("must be in [0, 1], got {value}")))
    }
}

// -- Pacing --

pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 100.0;
pub const DEFAULT_IDLE_INTERVAL_FACTOR: f64 = 2.5;

/// Frame throttle: the base tick interval and how far it widens when idle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    pub frame_interval_ms: f64,
    pub idle_interval_factor: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            idle_interval_factor: DEFAULT_IDLE_INTERVAL_FACTOR,
        }
    }
}

impl PacingConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            frame_interval_ms: param_f64(params, "frame_interval_ms", DEFAULT_FRAME_INTERVAL_MS),
            idle_interval_factor: param_f64(
                params,
                "idle_interval_factor",
                DEFAULT_IDLE_INTERVAL_FACTOR,
            ),
        }
    }

    /// Interval after a quiescent tick.
    pub fn idle_interval_ms(&self) -> f64 {
        self.frame_interval_ms * self.idle_interval_factor
    }
}

// -- Pointer --

pub const DEFAULT_REFRACTORY_MS: f64 = 500.0;
pub const DEFAULT_MOVE_INTERVAL_MS: f64 = 16.0;
pub const DEFAULT_HOVER_STRENGTH_RATIO: f64 = 0.9;

/// Pointer rate limits and hover strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Minimum time between hover injections into the same cell.
    pub refractory_ms: f64,
    /// Minimum time between forwarded hover events, across all surfaces.
    pub move_interval_ms: f64,
    /// Hover strength relative to `max_ripple_strength`.
    pub hover_strength_ratio: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            refractory_ms: DEFAULT_REFRACTORY_MS,
            move_interval_ms: DEFAULT_MOVE_INTERVAL_MS,
            hover_strength_ratio: DEFAULT_HOVER_STRENGTH_RATIO,
        }
    }
}

impl PointerConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            refractory_ms: param_f64(params, "refractory_ms", DEFAULT_REFRACTORY_MS),
            move_interval_ms: param_f64(params, "move_interval_ms", DEFAULT_MOVE_INTERVAL_MS),
            hover_strength_ratio: param_f64(
                params,
                "hover_strength_ratio",
                DEFAULT_HOVER_STRENGTH_RATIO,
            ),
        }
    }
}

// -- Idle ripple --

pub const DEFAULT_IDLE_THRESHOLD_MS: f64 = 4000.0;
pub const DEFAULT_AMBIENT_INTERVAL_MS: f64 = 2600.0;
pub const DEFAULT_IDLE_STRENGTH_RATIO: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleConfig {
    pub enabled: bool,
    pub idle_threshold_ms: f64,
    pub ambient_interval_ms: f64,
    pub strength_ratio: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_threshold_ms: DEFAULT_IDLE_THRESHOLD_MS,
            ambient_interval_ms: DEFAULT_AMBIENT_INTERVAL_MS,
            strength_ratio: DEFAULT_IDLE_STRENGTH_RATIO,
        }
    }
}

impl IdleConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            enabled: param_bool(params, "enabled", true),
            idle_threshold_ms: param_f64(params, "idle_threshold_ms", DEFAULT_IDLE_THRESHOLD_MS),
            ambient_interval_ms: param_f64(
                params,
                "ambient_interval_ms",
                DEFAULT_AMBIENT_INTERVAL_MS,
            ),
            strength_ratio: param_f64(params, "strength_ratio", DEFAULT_IDLE_STRENGTH_RATIO),
        }
    }
}

// -- Random splash --

pub const DEFAULT_SPLASH_INTERVAL_MS: MsRange = MsRange::new(3500.0, 9000.0);
pub const DEFAULT_SPLASH_STRENGTH_RATIO: f64 = 0.8;
pub const DEFAULT_SPLASH_FALLOFF_FLOOR: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplashConfig {
    pub enabled: bool,
    pub interval_ms: MsRange,
    pub strength_ratio: f64,
    /// Minimum fraction of the centre strength any covered cell receives.
    pub falloff_floor: f64,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_SPLASH_INTERVAL_MS,
            strength_ratio: DEFAULT_SPLASH_STRENGTH_RATIO,
            falloff_floor: DEFAULT_SPLASH_FALLOFF_FLOOR,
        }
    }
}

impl SplashConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            enabled: param_bool(params, "enabled", true),
            interval_ms: MsRange::from_json(params, "interval_ms", DEFAULT_SPLASH_INTERVAL_MS),
            strength_ratio: param_f64(params, "strength_ratio", DEFAULT_SPLASH_STRENGTH_RATIO),
            falloff_floor: param_f64(params, "falloff_floor", DEFAULT_SPLASH_FALLOFF_FLOOR),
        }
    }
}

// -- Rain --

pub const DEFAULT_DROPS_PER_CELL_PER_SECOND: f64 = 0.0025;
pub const DEFAULT_MIN_DROPS_PER_SECOND: f64 = 1.5;
pub const DEFAULT_MAX_DROPS_PER_SECOND: f64 = 14.0;
pub const DEFAULT_CADENCE_PERIOD_MS: f64 = 9000.0;
pub const DEFAULT_CADENCE_DEPTH: f64 = 0.25;
pub const DEFAULT_MAX_DROPS_PER_TICK: usize = 6;
pub const DEFAULT_ACCUMULATOR_CAP: f64 = 8.0;
pub const DEFAULT_BIG_DROP_CHANCE: f64 = 0.12;
pub const DEFAULT_SPLASH_DROP_CHANCE: f64 = 0.45;
pub const DEFAULT_BIG_DROP_RADIUS: usize = 2;
pub const DEFAULT_BIG_DROP_STRENGTH_RATIO: f64 = 0.95;
pub const DEFAULT_SPLASH_DROP_STRENGTH_RATIO: f64 = 0.6;
pub const DEFAULT_PLAIN_DROP_STRENGTH_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainConfig {
    /// Base rate per grid cell, before the min/max band is applied.
    pub drops_per_cell_per_second: f64,
    pub min_drops_per_second: f64,
    pub max_drops_per_second: f64,
    /// Period of the slow sinusoidal rate modulation.
    pub cadence_period_ms: f64,
    /// Amplitude of the modulation as a fraction of the base rate.
    pub cadence_depth: f64,
    pub max_drops_per_tick: usize,
    /// Upper bound on the fractional drop backlog.
    pub accumulator_cap: f64,
    pub big_drop_chance: f64,
    pub splash_chance: f64,
    pub big_drop_radius: usize,
    pub big_strength_ratio: f64,
    pub splash_strength_ratio: f64,
    pub plain_strength_ratio: f64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            drops_per_cell_per_second: DEFAULT_DROPS_PER_CELL_PER_SECOND,
            min_drops_per_second: DEFAULT_MIN_DROPS_PER_SECOND,
            max_drops_per_second: DEFAULT_MAX_DROPS_PER_SECOND,
            cadence_period_ms: DEFAULT_CADENCE_PERIOD_MS,
            cadence_depth: DEFAULT_CADENCE_DEPTH,
            max_drops_per_tick: DEFAULT_MAX_DROPS_PER_TICK,
            accumulator_cap: DEFAULT_ACCUMULATOR_CAP,
            big_drop_chance: DEFAULT_BIG_DROP_CHANCE,
            splash_chance: DEFAULT_SPLASH_DROP_CHANCE,
            big_drop_radius: DEFAULT_BIG_DROP_RADIUS,
            big_strength_ratio: DEFAULT_BIG_DROP_STRENGTH_RATIO,
            splash_strength_ratio: DEFAULT_SPLASH_DROP_STRENGTH_RATIO,
            plain_strength_ratio: DEFAULT_PLAIN_DROP_STRENGTH_RATIO,
        }
    }
}

impl RainConfig {
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            drops_per_cell_per_second: param_f64(
                params,
                "drops_per_cell_per_second",
                d.drops_per_cell_per_second,
            ),
            min_drops_per_second: param_f64(params, "min_drops_per_second", d.min_drops_per_second),
            max_drops_per_second: param_f64(params, "max_drops_per_second", d.max_drops_per_second),
            cadence_period_ms: param_f64(params, "cadence_period_ms", d.cadence_period_ms),
            cadence_depth: param_f64(params, "cadence_depth", d.cadence_depth),
            max_drops_per_tick: param_usize(params, "max_drops_per_tick", d.max_drops_per_tick),
            accumulator_cap: param_f64(params, "accumulator_cap", d.accumulator_cap),
            big_drop_chance: param_f64(params, "big_drop_chance", d.big_drop_chance),
            splash_chance: param_f64(params, "splash_chance", d.splash_chance),
            big_drop_radius: param_usize(params, "big_drop_radius", d.big_drop_radius),
            big_strength_ratio: param_f64(params, "big_strength_ratio", d.big_strength_ratio),
            splash_strength_ratio: param_f64(
                params,
                "splash_strength_ratio",
                d.splash_strength_ratio,
            ),
            plain_strength_ratio: param_f64(params, "plain_strength_ratio", d.plain_strength_ratio),
        }
    }

    /// Drops per second for a grid of `cells` cells at time `now_ms`.
    pub fn drops_per_second(&self, cells: usize, now_ms: f64) -> f64 {
        let base = (cells as f64 * self.drops_per_cell_per_second)
            .clamp(self.min_drops_per_second, self.max_drops_per_second);
        let phase = std::f64::consts::TAU * now_ms / self.cadence_period_ms;
        base * (1.0 + self.cadence_depth * phase.sin())
    }
}

// -- Lightning --

pub const DEFAULT_LIGHTNING_INTERVAL_MS: MsRange = MsRange::new(9000.0, 22000.0);
pub const DEFAULT_CELLS_PER_SURGE: usize = 400;
pub const DEFAULT_MIN_SURGES: usize = 2;
pub const DEFAULT_MAX_SURGES: usize = 6;
pub const DEFAULT_MAX_SURGE_RADIUS: usize = 3;
pub const DEFAULT_LIGHTNING_STRENGTH_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightningConfig {
    pub enabled: bool,
    pub interval_ms: MsRange,
    /// One surge per this many grid cells, within the min/max band.
    pub cells_per_surge: usize,
    pub min_surges: usize,
    pub max_surges: usize,
    pub max_radius: usize,
    pub strength_ratio: f64,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_LIGHTNING_INTERVAL_MS,
            cells_per_surge: DEFAULT_CELLS_PER_SURGE,
            min_surges: DEFAULT_MIN_SURGES,
            max_surges: DEFAULT_MAX_SURGES,
            max_radius: DEFAULT_MAX_SURGE_RADIUS,
            strength_ratio: DEFAULT_LIGHTNING_STRENGTH_RATIO,
        }
    }
}

impl LightningConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            enabled: param_bool(params, "enabled", true),
            interval_ms: MsRange::from_json(params, "interval_ms", DEFAULT_LIGHTNING_INTERVAL_MS),
            cells_per_surge: param_usize(params, "cells_per_surge", DEFAULT_CELLS_PER_SURGE),
            min_surges: param_usize(params, "min_surges", DEFAULT_MIN_SURGES),
            max_surges: param_usize(params, "max_surges", DEFAULT_MAX_SURGES),
            max_radius: param_usize(params, "max_radius", DEFAULT_MAX_SURGE_RADIUS),
            strength_ratio: param_f64(params, "strength_ratio", DEFAULT_LIGHTNING_STRENGTH_RATIO),
        }
    }

    /// Number of surges in one strike on a grid of `cells` cells.
    pub fn surges_for(&self, cells: usize) -> usize {
        (cells / self.cells_per_surge.max(1)).clamp(self.min_surges, self.max_surges)
    }
}

// -- Aggregate --

/// Every tunable the simulation reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuddleConfig {
    pub field: FieldParams,
    pub shades: String,
    pub shade_exponent: f64,
    pub surface: SurfaceConfig,
    pub pacing: PacingConfig,
    pub pointer: PointerConfig,
    pub idle: IdleConfig,
    pub splash: SplashConfig,
    pub rain: RainConfig,
    pub lightning: LightningConfig,
}

impl Default for PuddleConfig {
    fn default() -> Self {
        Self {
            field: FieldParams::default(),
            shades: DEFAULT_SHADES.to_owned(),
            shade_exponent: DEFAULT_SHADE_EXPONENT,
            surface: SurfaceConfig::default(),
            pacing: PacingConfig::default(),
            pointer: PointerConfig::default(),
            idle: IdleConfig::default(),
            splash: SplashConfig::default(),
            rain: RainConfig::default(),
            lightning: LightningConfig::default(),
        }
    }
}

impl PuddleConfig {
    /// Reads each section from the same-named key of `params`.
    ///
    /// Never fails; call [`validate`](Self::validate) afterwards.
    pub fn from_json(params: &Value) -> Self {
        Self {
            field: FieldParams::from_json(section(params, "field")),
            shades: param_string(params, "shades", DEFAULT_SHADES),
            shade_exponent: param_f64(params, "shade_exponent", DEFAULT_SHADE_EXPONENT),
            surface: SurfaceConfig::from_json(section(params, "surface")),
            pacing: PacingConfig::from_json(section(params, "pacing")),
            pointer: PointerConfig::from_json(section(params, "pointer")),
            idle: IdleConfig::from_json(section(params, "idle")),
            splash: SplashConfig::from_json(section(params, "splash")),
            rain: RainConfig::from_json(section(params, "rain")),
            lightning: LightningConfig::from_json(section(params, "lightning")),
        }
    }

    /// Builds the glyph palette described by `shades` and `shade_exponent`.
    pub fn palette(&self) -> Result<ShadePalette, PuddleError> {
        ShadePalette::new(&self.shades, self.shade_exponent)
    }

    /// Rejects values that would break decay, pacing or scheduling.
    pub fn validate(&self) -> Result<(), PuddleError> {
        self.field.validate()?;
        self.palette()?;
        self.surface.validate()?;

        check_positive("pacing.frame_interval_ms", self.pacing.frame_interval_ms)?;
        if !(self.pacing.idle_interval_factor >= 1.0 && self.pacing.idle_interval_factor.is_finite())
        {
            return Err(PuddleError::config(
                "pacing.idle_interval_factor",
                format!("must be finite and >= 1, got {}", self.pacing.idle_interval_factor),
            ));
        }

        check_non_negative("pointer.refractory_ms", self.pointer.refractory_ms)?;
        check_non_negative("pointer.move_interval_ms", self.pointer.move_interval_ms)?;
        check_non_negative("pointer.hover_strength_ratio", self.pointer.hover_strength_ratio)?;

        check_non_negative("idle.idle_threshold_ms", self.idle.idle_threshold_ms)?;
        check_non_negative("idle.ambient_interval_ms", self.idle.ambient_interval_ms)?;
        check_non_negative("idle.strength_ratio", self.idle.strength_ratio)?;

        self.splash.interval_ms.validate("splash.interval_ms")?;
        check_non_negative("splash.strength_ratio", self.splash.strength_ratio)?;
        check_unit("splash.falloff_floor", self.splash.falloff_floor)?;

        let rain = &self.rain;
        check_non_negative("rain.drops_per_cell_per_second", rain.drops_per_cell_per_second)?;
        check_non_negative("rain.min_drops_per_second", rain.min_drops_per_second)?;
        if !(rain.max_drops_per_second >= rain.min_drops_per_second
            && rain.max_drops_per_second.is_finite())
        {
            return Err(PuddleError::config(
                "rain.max_drops_per_second",
                format!(
                    "must be finite and >= min_drops_per_second ({}), got {}",
                    rain.min_drops_per_second, rain.max_drops_per_second
                ),
            ));
        }
        check_positive("rain.cadence_period_ms", rain.cadence_period_ms)?;
        if !(0.0..1.0).contains(&rain.cadence_depth) {
            return Err(PuddleError::config(
                "rain.cadence_depth",
                format!("must be in [0, 1), got {}", rain.cadence_depth),
            ));
        }
        check_positive("rain.accumulator_cap", rain.accumulator_cap)?;
        check_unit("rain.big_drop_chance", rain.big_drop_chance)?;
        check_unit("rain.splash_chance", rain.splash_chance)?;
        if rain.big_drop_chance + rain.splash_chance > 1.0 {
            return Err(PuddleError::config(
                "rain.splash_chance",
                format!(
                    "big_drop_chance + splash_chance must not exceed 1, got {}",
                    rain.big_drop_chance + rain.splash_chance
                ),
            ));
        }
        check_non_negative("rain.big_strength_ratio", rain.big_strength_ratio)?;
        check_non_negative("rain.splash_strength_ratio", rain.splash_strength_ratio)?;
        check_non_negative("rain.plain_strength_ratio", rain.plain_strength_ratio)?;

        let lightning = &self.lightning;
        lightning.interval_ms.validate("lightning.interval_ms")?;
        if lightning.cells_per_surge == 0 {
            return Err(PuddleError::config("lightning.cells_per_surge", "must be > 0"));
        }
        if lightning.max_surges < lightning.min_surges {
            return Err(PuddleError::config(
                "lightning.max_surges",
                format!(
                    "must be >= min_surges ({}), got {}",
                    lightning.min_surges, lightning.max_surges
                ),
            ));
        }
        if lightning.max_radius == 0 {
            return Err(PuddleError::config("lightning.max_radius", "must be > 0"));
        }
        check_non_negative("lightning.strength_ratio", lightning.strength_ratio)?;
        Ok(())
    }

    /// JSON description of every tunable: type, default and purpose.
    pub fn schema() -> Value {
        json!({
            "field": {
                "dampening_ratio": entry("number", DEFAULT_DAMPENING_RATIO, "Energy kept per tick; below 1 so ripples die out"),
                "force_cutoff": entry("number", DEFAULT_FORCE_CUTOFF, "Forces smaller than this snap to zero"),
                "diagonal_weight": entry("number", DEFAULT_DIAGONAL_WEIGHT, "Diagonal neighbour contribution relative to cardinal"),
                "max_ripple_strength": entry("number", DEFAULT_MAX_RIPPLE_STRENGTH, "Strength of a full pointer press")
            },
            "shades": entry("string", DEFAULT_SHADES, "Glyph ramp from rest to full crest"),
            "shade_exponent": entry("number", DEFAULT_SHADE_EXPONENT, "Easing applied to normalized force before picking a glyph"),
            "surface": {
                "cell_size_ratio": entry("number", DEFAULT_CELL_SIZE_RATIO, "Cell size as a fraction of the lesser surface dimension"),
                "min_cell_size": entry("number", DEFAULT_MIN_CELL_SIZE, "Smallest cell edge in pixels"),
                "max_cell_size": entry("number", DEFAULT_MAX_CELL_SIZE, "Largest cell edge in pixels")
            },
            "pacing": {
                "frame_interval_ms": entry("number", DEFAULT_FRAME_INTERVAL_MS, "Minimum time between processed ticks"),
                "idle_interval_factor": entry("number", DEFAULT_IDLE_INTERVAL_FACTOR, "Interval multiplier after a tick with no queued work")
            },
            "pointer": {
                "refractory_ms": entry("number", DEFAULT_REFRACTORY_MS, "Per-cell cooldown for hover ripples"),
                "move_interval_ms": entry("number", DEFAULT_MOVE_INTERVAL_MS, "Minimum time between forwarded hover events"),
                "hover_strength_ratio": entry("number", DEFAULT_HOVER_STRENGTH_RATIO, "Hover strength relative to a press")
            },
            "idle": Self::idle_schema(),
            "splash": Self::splash_schema(),
            "rain": Self::rain_schema(),
            "lightning": Self::lightning_schema()
        })
    }

    fn idle_schema() -> Value {
        json!({
            "enabled": entry("boolean", true, "Inject ripples while untouched"),
            "idle_threshold_ms": entry("number", DEFAULT_IDLE_THRESHOLD_MS, "Time without interaction before idle ripples start"),
            "ambient_interval_ms": entry("number", DEFAULT_AMBIENT_INTERVAL_MS, "Minimum time between idle ripples"),
            "strength_ratio": entry("number", DEFAULT_IDLE_STRENGTH_RATIO, "Idle ripple strength relative to a press")
        })
    }

    fn splash_schema() -> Value {
        json!({
            "enabled": entry("boolean", true, "Inject random splashes"),
            "interval_ms": entry("range", range_default(DEFAULT_SPLASH_INTERVAL_MS), "Delay between splashes, drawn uniformly"),
            "strength_ratio": entry("number", DEFAULT_SPLASH_STRENGTH_RATIO, "Centre strength relative to a press"),
            "falloff_floor": entry("number", DEFAULT_SPLASH_FALLOFF_FLOOR, "Minimum strength fraction at the splash rim")
        })
    }

    fn rain_schema() -> Value {
        json!({
            "drops_per_cell_per_second": entry("number", DEFAULT_DROPS_PER_CELL_PER_SECOND, "Base drop rate per grid cell"),
            "min_drops_per_second": entry("number", DEFAULT_MIN_DROPS_PER_SECOND, "Lower bound on the area-scaled rate"),
            "max_drops_per_second": entry("number", DEFAULT_MAX_DROPS_PER_SECOND, "Upper bound on the area-scaled rate"),
            "cadence_period_ms": entry("number", DEFAULT_CADENCE_PERIOD_MS, "Period of the slow rate swell"),
            "cadence_depth": entry("number", DEFAULT_CADENCE_DEPTH, "Amplitude of the rate swell, in [0, 1)"),
            "max_drops_per_tick": entry("integer", DEFAULT_MAX_DROPS_PER_TICK, "Most drops released in one tick"),
            "accumulator_cap": entry("number", DEFAULT_ACCUMULATOR_CAP, "Largest drop backlog carried between ticks"),
            "big_drop_chance": entry("number", DEFAULT_BIG_DROP_CHANCE, "Probability a drop is a big splash"),
            "splash_chance": entry("number", DEFAULT_SPLASH_DROP_CHANCE, "Probability a drop is a radius-1 splash"),
            "big_drop_radius": entry("integer", DEFAULT_BIG_DROP_RADIUS, "Radius of a big drop"),
            "big_strength_ratio": entry("number", DEFAULT_BIG_DROP_STRENGTH_RATIO, "Big drop strength relative to a press"),
            "splash_strength_ratio": entry("number", DEFAULT_SPLASH_DROP_STRENGTH_RATIO, "Splash drop strength relative to a press"),
            "plain_strength_ratio": entry("number", DEFAULT_PLAIN_DROP_STRENGTH_RATIO, "Single-cell drop strength relative to a press")
        })
    }

    fn lightning_schema() -> Value {
        json!({
            "enabled": entry("boolean", true, "Strike while raining"),
            "interval_ms": entry("range", range_default(DEFAULT_LIGHTNING_INTERVAL_MS), "Delay between strikes, drawn uniformly"),
            "cells_per_surge": entry("integer", DEFAULT_CELLS_PER_SURGE, "Grid cells per thunder surge"),
            "min_surges": entry("integer", DEFAULT_MIN_SURGES, "Fewest surges per strike"),
            "max_surges": entry("integer", DEFAULT_MAX_SURGES, "Most surges per strike"),
            "max_radius": entry("integer", DEFAULT_MAX_SURGE_RADIUS, "Largest surge radius"),
            "strength_ratio": entry("number", DEFAULT_LIGHTNING_STRENGTH_RATIO, "Surge strength relative to a press")
        })
    }
}

fn entry(kind: &str, default: impl Into<Value>, description: &str) -> Value {
    json!({ "type": kind, "default": default.into(), "description": description })
}

fn range_default(range: MsRange) -> Value {
    json!([range.min, range.max])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Xorshift64;

    // -- Defaults --

    #[test]
    fn defaults_validate() {
        assert!(PuddleConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(PuddleConfig::from_json(&json!({})), PuddleConfig::default());
        assert_eq!(PuddleConfig::from_json(&Value::Null), PuddleConfig::default());
    }

    #[test]
    fn serde_round_trip_preserves_config() {
        let cfg = PuddleConfig::default();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: PuddleConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn serialized_config_reads_back_through_from_json() {
        let cfg = PuddleConfig::default();
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(PuddleConfig::from_json(&value), cfg);
    }

    // -- from_json --

    #[test]
    fn from_json_reads_nested_sections() {
        let cfg = PuddleConfig::from_json(&json!({
            "field": {"dampening_ratio": 0.7},
            "shades": " .o@",
            "rain": {"max_drops_per_tick": 3},
            "splash": {"interval_ms": [1000, 2000]},
            "lightning": {"interval_ms": {"min": 500, "max": 800}}
        }));
        assert!((cfg.field.dampening_ratio - 0.7).abs() < f64::EPSILON);
        assert_eq!(cfg.shades, " .o@");
        assert_eq!(cfg.rain.max_drops_per_tick, 3);
        assert_eq!(cfg.splash.interval_ms, MsRange::new(1000.0, 2000.0));
        assert_eq!(cfg.lightning.interval_ms, MsRange::new(500.0, 800.0));
        assert_eq!(cfg.idle, IdleConfig::default());
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let cfg = PuddleConfig::from_json(&json!({
            "pacing": {"frame_interval_ms": "fast"},
            "idle": {"enabled": 1}
        }));
        assert_eq!(cfg.pacing.frame_interval_ms, DEFAULT_FRAME_INTERVAL_MS);
        assert!(cfg.idle.enabled);
    }

    // -- validate --

    #[test]
    fn validate_rejects_each_bad_section() {
        let cases: Vec<(&str, PuddleConfig)> = vec![
            ("field", PuddleConfig {
                field: FieldParams { dampening_ratio: 1.2, ..FieldParams::default() },
                ..PuddleConfig::default()
            }),
            ("palette", PuddleConfig { shades: String::new(), ..PuddleConfig::default() }),
            ("pacing", PuddleConfig {
                pacing: PacingConfig { frame_interval_ms: 0.0, ..PacingConfig::default() },
                ..PuddleConfig::default()
            }),
            ("splash", PuddleConfig {
                splash: SplashConfig {
                    interval_ms: MsRange::new(9000.0, 100.0),
                    ..SplashConfig::default()
                },
                ..PuddleConfig::default()
            }),
            ("rain bands", PuddleConfig {
                rain: RainConfig { big_drop_chance: 0.7, splash_chance: 0.5, ..RainConfig::default() },
                ..PuddleConfig::default()
            }),
            ("lightning", PuddleConfig {
                lightning: LightningConfig { min_surges: 8, ..LightningConfig::default() },
                ..PuddleConfig::default()
            }),
        ];
        for (label, cfg) in cases {
            assert!(
                matches!(cfg.validate(), Err(PuddleError::InvalidConfig { .. } | PuddleError::InvalidPalette(_))),
                "{label} accepted"
            );
        }
    }

    #[test]
    fn validation_error_names_the_key() {
        let cfg = PuddleConfig {
            rain: RainConfig { cadence_depth: 1.5, ..RainConfig::default() },
            ..PuddleConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("rain.cadence_depth"), "{err}");
    }

    // -- Derived values --

    #[test]
    fn rain_rate_is_banded_by_area() {
        let rain = RainConfig { cadence_depth: 0.0, ..RainConfig::default() };
        assert_eq!(rain.drops_per_second(10, 0.0), DEFAULT_MIN_DROPS_PER_SECOND);
        assert_eq!(rain.drops_per_second(1_000_000, 0.0), DEFAULT_MAX_DROPS_PER_SECOND);
        assert!((rain.drops_per_second(2000, 0.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rain_cadence_swells_around_base() {
        let rain = RainConfig::default();
        let quarter = DEFAULT_CADENCE_PERIOD_MS / 4.0;
        let peak = rain.drops_per_second(2000, quarter);
        assert!((peak - 5.0 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn surges_scale_with_area_within_band() {
        let l = LightningConfig::default();
        assert_eq!(l.surges_for(100), DEFAULT_MIN_SURGES);
        assert_eq!(l.surges_for(1600), 4);
        assert_eq!(l.surges_for(100_000), DEFAULT_MAX_SURGES);
    }

    #[test]
    fn ms_range_samples_inside() {
        let mut rng = Xorshift64::new(9);
        let r = MsRange::new(100.0, 200.0);
        for _ in 0..100 {
            let v = r.sample(&mut rng);
            assert!((100.0..=200.0).contains(&v));
        }
    }

    #[test]
    fn idle_interval_widens_base() {
        assert_eq!(PacingConfig::default().idle_interval_ms(), 250.0);
    }

    // -- Schema --

    #[test]
    fn schema_covers_every_serialized_key() {
        let schema = PuddleConfig::schema();
        let value = serde_json::to_value(PuddleConfig::default()).unwrap();
        for (key, entry) in value.as_object().unwrap() {
            let described = &schema[key];
            assert!(!described.is_null(), "schema missing {key}");
            if let Some(fields) = entry.as_object() {
                for field in fields.keys() {
                    let leaf = &described[field];
                    assert!(leaf.get("type").is_some(), "{key}.{field} missing 'type'");
                    assert!(leaf.get("default").is_some(), "{key}.{field} missing 'default'");
                    assert!(leaf.get("description").is_some(), "{key}.{field} missing 'description'");
                }
            }
        }
    }
}
