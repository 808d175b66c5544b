//! Messages crossing the simulation boundary.
//!
//! Host adapters translate their own resize, visibility and pointer
//! callbacks into [`Command`]s; the runtime reports back through
//! [`Notification`]s. Nothing here depends on any event system.

use serde::{Deserialize, Serialize};

/// Whether a pointer event is a discrete press or continuous motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Click or tap: full strength, no refractory gating.
    Press,
    /// Movement over the surface: reduced strength, gated per cell.
    Hover,
}

impl PointerKind {
    /// True for input subject to the per-cell refractory window.
    pub fn is_continuous(self) -> bool {
        matches!(self, PointerKind::Hover)
    }
}

/// The physical device behind a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerDevice {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub kind: PointerKind,
    #[serde(default)]
    pub device: PointerDevice,
    /// Explicit injection strength; `None` uses the configured default.
    #[serde(default)]
    pub strength: Option<f64>,
}

impl PointerEvent {
    /// A mouse press at `(x, y)`.
    pub fn press(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            kind: PointerKind::Press,
            device: PointerDevice::Mouse,
            strength: None,
        }
    }

    /// Mouse motion over `(x, y)`.
    pub fn hover(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Hover,
            ..Self::press(x, y)
        }
    }

    pub fn with_device(self, device: PointerDevice) -> Self {
        Self { device, ..self }
    }

    pub fn with_strength(self, strength: f64) -> Self {
        Self {
            strength: Some(strength),
            ..self
        }
    }
}

/// Input a driver consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Resize { width: f64, height: f64 },
    VisibilityChanged { visible: bool },
    Pointer(PointerEvent),
}

/// Output for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// The rain preference changed; toggles should re-sync.
    RainChanged { enabled: bool },
    /// Lightning struck the given surface.
    Flash { surface: usize, at_ms: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_is_continuous_press_is_not() {
        assert!(PointerKind::Hover.is_continuous());
        assert!(!PointerKind::Press.is_continuous());
    }

    #[test]
    fn builders_compose() {
        let e = PointerEvent::hover(3.0, 4.0)
            .with_device(PointerDevice::Touch)
            .with_strength(20.0);
        assert_eq!(e.kind, PointerKind::Hover);
        assert_eq!(e.device, PointerDevice::Touch);
        assert_eq!(e.strength, Some(20.0));
    }

    #[test]
    fn command_json_is_tagged() {
        let cmd = Command::Resize {
            width: 640.0,
            height: 480.0,
        };
        let json = serde_json::to_value(cmd).unwrap();
        assert_eq!(json["type"], "resize");
        assert_eq!(json["width"], 640.0);
    }

    #[test]
    fn pointer_event_defaults_device_and_strength() {
        let e: PointerEvent =
            serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "kind": "press"}"#).unwrap();
        assert_eq!(e.device, PointerDevice::Mouse);
        assert_eq!(e.strength, None);
    }

    #[test]
    fn notification_round_trips() {
        let n = Notification::RainChanged { enabled: true };
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(serde_json::from_str::<Notification>(&json).unwrap(), n);
    }
}
