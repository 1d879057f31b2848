//! Core configuration for zscene-core.

use serde::{Deserialize, Serialize};

/// Authored stage size the editor exported the scene at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

/// Viewport size in host pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Landscape iff strictly wider than tall.
    #[inline]
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Configuration for scene sizing and playback defaults.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target tick rate of the update scheduler.
    pub fps: f64,
    /// When set, the stage root is uniformly scaled and centered to fit this
    /// resolution on every scene resize.
    pub design_resolution: Option<Resolution>,
    /// Looping flag given to newly created timelines.
    pub default_looping: bool,
    /// Viewport assumed until the host reports its first resize.
    pub initial_viewport: Viewport,
    /// Undrained events retained before the oldest are dropped.
    pub max_pending_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 60.0,
            design_resolution: None,
            default_looping: true,
            initial_viewport: Viewport::default(),
            max_pending_events: 1024,
        }
    }
}
