//! The process-level context that owns every driver.
//!
//! A [`Runtime`] is handed the set of surfaces by its host rather than
//! discovering them, fans pointer and visibility input out to each
//! [`Driver`], and owns the persisted rain preference. Hosts poll
//! [`Runtime::drain_notifications`] for UI-facing events.

use puddle_core::{
    Notification, PointerDevice, PointerEvent, PointerKind, PuddleConfig, PuddleError,
    SurfaceRect, Xorshift64,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::driver::{Driver, TickOutcome};
use crate::prefs::{read_rain_preference, write_rain_preference, PreferenceStore};

/// Notifications held for the host before the oldest are dropped.
pub const MAX_PENDING_NOTIFICATIONS: usize = 64;

/// Which drivers a pointer event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Surface(usize),
}

/// Outcome of (re)binding the surface set.
#[derive(Debug, Default)]
pub struct BindReport {
    pub bound: usize,
    /// Surfaces that could not be bound, by index. Other surfaces are unaffected.
    pub failures: Vec<(usize, PuddleError)>,
}

/// Every live driver plus the shared preference and input de-duplication.
pub struct Runtime<S: PreferenceStore> {
    config: PuddleConfig,
    store: S,
    surfaces: Vec<SurfaceRect>,
    drivers: Vec<Option<Driver>>,
    rain_enabled: bool,
    reduced_motion: bool,
    visible: bool,
    last_move_at: Option<f64>,
    outbox: VecDeque<Notification>,
    rng: Xorshift64,
}

impl<S: PreferenceStore> Runtime<S> {
    /// Creates an empty runtime. The rain mode is read from `store`.
    pub fn new(config: PuddleConfig, store: S, seed: u64) -> Result<Self, PuddleError> {
        config.validate()?;
        let rain_enabled = read_rain_preference(&store);
        Ok(Self {
            config,
            store,
            surfaces: Vec::new(),
            drivers: Vec::new(),
            rain_enabled,
            reduced_motion: false,
            visible: true,
            last_move_at: None,
            outbox: VecDeque::new(),
            rng: Xorshift64::new(seed),
        })
    }

    /// Replaces the bound surfaces and rebuilds every driver.
    pub fn set_surfaces(&mut self, surfaces: Vec<SurfaceRect>, now_ms: f64) -> BindReport {
        self.surfaces = surfaces;
        self.rebuild(now_ms)
    }

    fn rebuild(&mut self, now_ms: f64) -> BindReport {
        self.drivers.clear();
        let mut report = BindReport::default();
        if self.reduced_motion {
            debug!("reduced motion on; no drivers bound");
            return report;
        }
        for (index, rect) in self.surfaces.iter().enumerate() {
            let rng = self.rng.fork(index as u64);
            match Driver::bind(rect, &self.config, self.rain_enabled, rng, now_ms) {
                Ok(mut driver) => {
                    if !self.visible {
                        driver.stop();
                    }
                    self.drivers.push(Some(driver));
                    report.bound += 1;
                }
                Err(e) => {
                    warn!(surface = index, error = %e, "surface could not be bound");
                    self.drivers.push(None);
                    report.failures.push((index, e));
                }
            }
        }
        debug!(bound = report.bound, failed = report.failures.len(), "drivers rebuilt");
        report
    }

    /// Forwards a pointer event. Hovers are rate-limited across all surfaces
    /// and ignored for touch input. Returns how many drivers applied force.
    pub fn notify_pointer(&mut self, target: Target, event: PointerEvent, now_ms: f64) -> usize {
        if event.kind == PointerKind::Hover {
            if event.device == PointerDevice::Touch {
                return 0;
            }
            let interval = self.config.pointer.move_interval_ms;
            if self.last_move_at.is_some_and(|last| now_ms - last < interval) {
                return 0;
            }
            self.last_move_at = Some(now_ms);
        }
        let mut accepted = 0;
        for (index, driver) in self.drivers.iter_mut().enumerate() {
            let Some(driver) = driver else { continue };
            if matches!(target, Target::Surface(id) if id != index) {
                continue;
            }
            if driver.handle_pointer(&event, now_ms) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Stops every driver when hidden; restarts them, re-armed from
    /// `now_ms`, when shown again.
    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        for driver in self.drivers.iter_mut().flatten() {
            if visible {
                driver.start(now_ms);
            } else {
                driver.stop();
            }
        }
    }

    /// Tears every driver down while reduced motion is on and rebuilds them
    /// when it turns off.
    pub fn set_reduced_motion(&mut self, reduced: bool, now_ms: f64) -> BindReport {
        if self.reduced_motion == reduced {
            return BindReport::default();
        }
        self.reduced_motion = reduced;
        self.rebuild(now_ms)
    }

    /// Resizes one surface. A surface that previously failed to bind is
    /// bound afresh. Returns false for an unknown index.
    ///
    /// The stored rect only changes once the driver accepts it, so a
    /// rejected size leaves the surface as it was.
    pub fn resize_surface(
        &mut self,
        index: usize,
        rect: SurfaceRect,
        now_ms: f64,
    ) -> Result<bool, PuddleError> {
        if index >= self.surfaces.len() {
            return Ok(false);
        }
        match self.drivers.get_mut(index) {
            Some(Some(driver)) => {
                driver.resize(rect.width, rect.height, now_ms)?;
                driver.set_origin(rect.left, rect.top);
            }
            Some(empty) => {
                let rng = self.rng.fork(index as u64);
                let mut driver =
                    Driver::bind(&rect, &self.config, self.rain_enabled, rng, now_ms)?;
                if !self.visible {
                    driver.stop();
                }
                *empty = Some(driver);
            }
            None => {}
        }
        self.surfaces[index] = rect;
        Ok(true)
    }

    /// Offers a frame to every driver, queueing a flash for each lightning
    /// strike. Outcomes are indexed by surface.
    pub fn tick(&mut self, now_ms: f64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::with_capacity(self.drivers.len());
        for (index, driver) in self.drivers.iter_mut().enumerate() {
            let outcome = match driver {
                Some(driver) => driver.step(now_ms),
                None => TickOutcome::Stopped,
            };
            if let Some(strike) = outcome.report().and_then(|r| r.ambient.lightning) {
                push_bounded(
                    &mut self.outbox,
                    Notification::Flash {
                        surface: index,
                        at_ms: strike.at_ms,
                    },
                );
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Sets and persists rain mode for every surface. A store failure is
    /// logged and the in-memory mode still changes. Returns the new mode.
    pub fn set_rain_enabled(&mut self, enabled: bool, now_ms: f64) -> bool {
        if let Err(e) = write_rain_preference(&mut self.store, enabled) {
            warn!(error = %e, "could not persist rain preference");
        }
        if self.rain_enabled != enabled {
            self.rain_enabled = enabled;
            for driver in self.drivers.iter_mut().flatten() {
                driver.set_rain_enabled(enabled, now_ms);
            }
            push_bounded(&mut self.outbox, Notification::RainChanged { enabled });
            info!(enabled, "rain mode changed");
        }
        self.rain_enabled
    }

    /// Flips rain mode. Returns the new mode.
    pub fn toggle_rain(&mut self, now_ms: f64) -> bool {
        self.set_rain_enabled(!self.rain_enabled, now_ms)
    }

    /// Takes every notification queued since the last call, oldest first.
    ///
    /// At most [`MAX_PENDING_NOTIFICATIONS`] are held; a host that drains
    /// less often loses the oldest.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain(..).collect()
    }

    /// Stops and drops every driver and forgets the surfaces.
    pub fn dispose(&mut self) {
        for driver in self.drivers.iter_mut().flatten() {
            driver.stop();
        }
        self.drivers.clear();
        self.surfaces.clear();
        self.last_move_at = None;
        debug!("runtime disposed");
    }

    pub fn rain_enabled(&self) -> bool {
        self.rain_enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn config(&self) -> &PuddleConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The driver bound to surface `index`, if binding succeeded.
    pub fn driver(&self, index: usize) -> Option<&Driver> {
        self.drivers.get(index).and_then(Option::as_ref)
    }

    /// Number of live drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.iter().flatten().count()
    }
}

fn push_bounded(outbox: &mut VecDeque<Notification>, notification: Notification) {
    if outbox.len() >= MAX_PENDING_NOTIFICATIONS {
        outbox.pop_front();
    }
    outbox.push_back(notification);
}
