#![deny(unsafe_code)]
//! Core types for the puddle ripple simulation.
//!
//! Provides the [`Cell`] arena and queue-stepped [`Field`], the
//! [`ShadePalette`] glyph ramp, [`Impulse`] shapes behind the
//! [`ForceTarget`] seam, surface [`GridGeometry`], the [`Command`] and
//! [`Notification`] message types, [`PuddleConfig`], the
//! [`Xorshift64`] PRNG and JSON parameter helpers.

pub mod cell;
pub mod config;
pub mod error;
pub mod event;
pub mod field;
pub mod impulse;
pub mod params;
pub mod prng;
pub mod shade;
pub mod surface;

pub use cell::Cell;
pub use config::{
    IdleConfig, LightningConfig, MsRange, PacingConfig, PointerConfig, PuddleConfig, RainConfig,
    SplashConfig,
};
pub use error::PuddleError;
pub use event::{Command, Notification, PointerDevice, PointerEvent, PointerKind};
pub use field::{Field, FieldParams, StepReport};
pub use impulse::{ForceTarget, Impulse};
pub use prng::{RandomSource, Xorshift64};
pub use shade::ShadePalette;
pub use surface::{GridGeometry, SurfaceConfig, SurfaceRect, SurfaceSize};
