//! One simulation bound to one surface.
//!
//! A [`Driver`] owns its [`Field`], ambient timers and random stream. It is
//! stepped by an external frame source through [`Driver::step`] and paces
//! itself: a frame only does work once the current interval has elapsed
//! since the last processed frame, and the interval widens while the field
//! is quiescent.

use puddle_ambient::{AmbientClock, AmbientReport, AmbientScheduler, TickContext};
use puddle_core::{
    Command, Field, GridGeometry, PointerEvent, PointerKind, PuddleConfig, PuddleError,
    StepReport, SurfaceRect, SurfaceSize, Xorshift64,
};
use tracing::{debug, trace, warn};

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub ambient: AmbientReport,
    pub step: StepReport,
    /// Interval the next frame must wait.
    pub interval_ms: f64,
}

impl TickReport {
    /// True when the field had queued work this frame.
    pub fn is_active(&self) -> bool {
        self.step.is_active()
    }
}

/// Result of offering a frame to a driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The driver is stopped.
    Stopped,
    /// Less than the current interval has passed.
    Throttled,
    /// The frame time was non-finite or earlier than the last processed one.
    Skipped,
    Ran(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Ran(report) => Some(report),
            _ => None,
        }
    }
}

/// A field bound to a surface, with pacing, pointer mapping and ambient events.
#[derive(Debug, Clone)]
pub struct Driver {
    rect: SurfaceRect,
    geometry: GridGeometry,
    field: Field,
    config: PuddleConfig,
    scheduler: AmbientScheduler,
    clock: AmbientClock,
    rng: Xorshift64,
    running: bool,
    last_tick_at: Option<f64>,
    interval_ms: f64,
    last_tick_active: bool,
    hover_ready_at: Vec<f64>,
}

impl Driver {
    /// Measures `surface`, builds the field and starts the frame loop.
    ///
    /// Fails without creating anything if the surface has no positive size or
    /// `config` is invalid.
    pub fn bind(
        surface: &impl SurfaceSize,
        config: &PuddleConfig,
        rain_enabled: bool,
        mut rng: Xorshift64,
        now_ms: f64,
    ) -> Result<Self, PuddleError> {
        config.validate()?;
        let rect = SurfaceRect::of(surface);
        let (geometry, field) = build(&rect, config)?;
        let clock = AmbientClock::new(now_ms, config, rain_enabled, &mut rng);
        debug!(
            cols = geometry.cols,
            rows = geometry.rows,
            cell_size = geometry.cell_size,
            "bound surface"
        );
        let mut driver = Self {
            rect,
            hover_ready_at: vec![f64::NEG_INFINITY; field.len()],
            geometry,
            field,
            config: config.clone(),
            scheduler: AmbientScheduler::new(config),
            clock,
            rng,
            running: false,
            last_tick_at: None,
            interval_ms: config.pacing.frame_interval_ms,
            last_tick_active: false,
        };
        driver.start(now_ms);
        Ok(driver)
    }

    /// Rebuilds the grid for a new surface size, discarding every ripple.
    ///
    /// On error the driver keeps its previous grid.
    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) -> Result<(), PuddleError> {
        let rect = SurfaceRect {
            width,
            height,
            ..self.rect
        };
        let (geometry, field) = build(&rect, &self.config)?;
        debug!(
            cols = geometry.cols,
            rows = geometry.rows,
            cell_size = geometry.cell_size,
            "rebuilt grid"
        );
        self.rect = rect;
        self.geometry = geometry;
        self.hover_ready_at = vec![f64::NEG_INFINITY; field.len()];
        self.field = field;
        self.clock.rearm(now_ms, &mut self.rng);
        self.interval_ms = self.config.pacing.frame_interval_ms;
        self.last_tick_active = false;
        if self.running {
            self.last_tick_at = None;
        }
        Ok(())
    }

    /// Moves the surface origin pointer events are measured from.
    pub fn set_origin(&mut self, left: f64, top: f64) {
        self.rect.left = left;
        self.rect.top = top;
    }

    /// Starts the frame loop. Schedules are re-based on `now_ms` so time
    /// spent stopped is not caught up. Returns false if already running.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_tick_at = None;
        self.interval_ms = self.config.pacing.frame_interval_ms;
        self.clock.rearm(now_ms, &mut self.rng);
        debug!(now_ms, "driver started");
        true
    }

    /// Stops the frame loop and releases the per-cell hover gates. No frame
    /// does work until [`start`](Self::start). Returns false if already
    /// stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.last_tick_at = None;
        self.hover_ready_at.fill(f64::NEG_INFINITY);
        debug!("driver stopped");
        true
    }

    /// Injects `strength` at the cell under surface-local `(local_x, local_y)`.
    ///
    /// Points outside the surface are ignored. Continuous input is limited to
    /// one injection per cell per refractory window. An accepted injection
    /// resets pacing to the base interval. Returns whether force was applied.
    pub fn map_pointer(
        &mut self,
        local_x: f64,
        local_y: f64,
        strength: f64,
        continuous: bool,
        now_ms: f64,
    ) -> bool {
        let Some((x, y)) = self.geometry.locate(local_x, local_y) else {
            return false;
        };
        self.clock.note_interaction(now_ms);
        if continuous {
            let gate = &mut self.hover_ready_at[y * self.geometry.cols + x];
            if now_ms < *gate {
                return false;
            }
            *gate = now_ms + self.config.pointer.refractory_ms;
        }
        self.field.apply_force(x as isize, y as isize, strength);
        self.interval_ms = self.config.pacing.frame_interval_ms;
        true
    }

    /// Maps a page-space pointer event onto this surface.
    ///
    /// Presses default to full strength, hovers to the configured fraction.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now_ms: f64) -> bool {
        let max = self.config.field.max_ripple_strength;
        let strength = event.strength.unwrap_or(match event.kind {
            PointerKind::Press => max,
            PointerKind::Hover => max * self.config.pointer.hover_strength_ratio,
        });
        self.map_pointer(
            event.x - self.rect.left,
            event.y - self.rect.top,
            strength,
            event.kind.is_continuous(),
            now_ms,
        )
    }

    /// Applies a host command. Returns whether it changed anything.
    pub fn handle(&mut self, command: Command, now_ms: f64) -> Result<bool, PuddleError> {
        match command {
            Command::Resize { width, height } => {
                self.resize(width, height, now_ms)?;
                Ok(true)
            }
            Command::VisibilityChanged { visible: true } => Ok(self.start(now_ms)),
            Command::VisibilityChanged { visible: false } => Ok(self.stop()),
            Command::Pointer(event) => Ok(self.handle_pointer(&event, now_ms)),
        }
    }

    /// Offers a frame at `now_ms`: ambient policies, then one field step.
    pub fn step(&mut self, now_ms: f64) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if !now_ms.is_finite() || self.last_tick_at.is_some_and(|last| now_ms < last) {
            warn!(now_ms, last_tick_at = ?self.last_tick_at, "out-of-order frame skipped");
            return TickOutcome::Skipped;
        }
        let elapsed_ms = match self.last_tick_at {
            Some(last) => {
                let elapsed = now_ms - last;
                if elapsed < self.interval_ms {
                    return TickOutcome::Throttled;
                }
                elapsed
            }
            None => 0.0,
        };

        let ctx = TickContext {
            now_ms,
            elapsed_ms,
            field_was_active: self.last_tick_active,
        };
        let ambient = self
            .scheduler
            .run(&mut self.clock, ctx, &mut self.field, &mut self.rng);
        let step = self.field.step();

        let pacing = &self.config.pacing;
        self.last_tick_active = step.is_active();
        self.interval_ms = if self.last_tick_active {
            pacing.frame_interval_ms
        } else {
            pacing.idle_interval_ms()
        };
        self.last_tick_at = Some(now_ms);
        trace!(
            now_ms,
            recomputed = step.recomputed,
            redrawn = step.redrawn,
            interval_ms = self.interval_ms,
            "tick"
        );
        TickOutcome::Ran(TickReport {
            ambient,
            step,
            interval_ms: self.interval_ms,
        })
    }

    /// Switches rain mode for this surface. Returns true if it changed.
    pub fn set_rain_enabled(&mut self, enabled: bool, now_ms: f64) -> bool {
        self.clock.set_rain_enabled(enabled, now_ms, &mut self.rng)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn rect(&self) -> &SurfaceRect {
        &self.rect
    }

    pub fn clock(&self) -> &AmbientClock {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn rain_enabled(&self) -> bool {
        self.clock.rain_enabled()
    }

    /// Interval the next frame must wait.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

fn build(rect: &SurfaceRect, config: &PuddleConfig) -> Result<(GridGeometry, Field), PuddleError> {
    let geometry = GridGeometry::measure(rect.width, rect.height, &config.surface)?;
    let field = Field::new(geometry.cols, geometry.rows, config.field, config.palette()?)?;
    Ok((geometry, field))
}
