#![deny(unsafe_code)]
//! Ambient events for the puddle simulation.
//!
//! An [`AmbientScheduler`] runs four policies each tick: idle ripples,
//! random splashes, rain and lightning. Each is a function of the tick time,
//! a per-driver [`AmbientClock`] and a random source, and injects only
//! through [`ForceTarget`](puddle_core::ForceTarget).

pub mod clock;
mod idle;
mod lightning;
pub mod rain;
pub mod scheduler;
mod splash;

pub use clock::AmbientClock;
pub use rain::RainDrop;
pub use scheduler::{AmbientReport, AmbientScheduler, LightningStrike, TickContext};
