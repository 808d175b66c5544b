#![deny(unsafe_code)]
//! Drivers, runtime fan-out and persistence for the puddle simulation.
//!
//! A [`Driver`] binds one surface to one field and paces its frames. The
//! [`Runtime`] owns every driver, forwards host input to them and keeps the
//! rain preference in a [`PreferenceStore`]. [`frame`] turns a field into
//! text for terminal hosts.

pub mod driver;
pub mod frame;
pub mod prefs;
pub mod runtime;

pub use driver::{Driver, TickOutcome, TickReport};
pub use prefs::{
    read_rain_preference, write_rain_preference, JsonFileStore, MemoryStore, PreferenceStore,
    RAIN_PREFERENCE_KEY,
};
pub use runtime::{BindReport, Runtime, Target, MAX_PENDING_NOTIFICATIONS};
