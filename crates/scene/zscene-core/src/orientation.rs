//! Orientation snapshots as exported by the scene editor.
//!
//! Every transform-bearing node carries one [`OrientationData`] per
//! [`Orientation`]. Field names follow the editor's JSON (`scaleX`, `pivotX`,
//! `isAnchored`, `anchorPercentage`, ...).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Viewport;
use crate::error::SceneError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    /// Landscape iff the viewport is strictly wider than tall.
    pub fn from_viewport(viewport: &Viewport) -> Self {
        if viewport.is_landscape() {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(SceneError::UnknownOrientation(other.to_string())),
        }
    }
}

/// Anchor position as fractions of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorPercentage {
    pub x: f64,
    pub y: f64,
}

/// One orientation's authored transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrientationData {
    pub x: f64,
    pub y: f64,
    /// Radians.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub alpha: f64,
    pub pivot_x: f64,
    pub pivot_y: f64,
    /// Missing means visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub is_anchored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_percentage: Option<AnchorPercentage>,
    /// Explicit size, used by nine-slice nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Default for OrientationData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            visible: None,
            is_anchored: false,
            anchor_percentage: None,
            width: None,
            height: None,
        }
    }
}

impl OrientationData {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    /// Editor exports write `0` for an unset scale.
    #[inline]
    pub fn effective_scale(&self) -> (f64, f64) {
        let or_one = |v: f64| if v == 0.0 || v.is_nan() { 1.0 } else { v };
        (or_one(self.scale_x), or_one(self.scale_y))
    }

    /// Anchor target in viewport pixels, when anchoring is on.
    pub fn anchor_point(&self, viewport: &Viewport) -> Option<(f64, f64)> {
        if !self.is_anchored {
            return None;
        }
        let pct = self.anchor_percentage.unwrap_or_default();
        Some((pct.x * viewport.width, pct.y * viewport.height))
    }
}

/// Optional per-instance attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_to_screen: Option<bool>,
}

/// Scene-assembly payload applied to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceData {
    pub portrait: OrientationData,
    pub landscape: OrientationData,
    pub instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<InstanceAttrs>,
}

impl InstanceData {
    pub fn fit_to_screen(&self) -> Option<bool> {
        self.attrs.as_ref().and_then(|a| a.fit_to_screen)
    }
}
