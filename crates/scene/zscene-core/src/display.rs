//! Live display properties of a node and the affine they produce.

use kurbo::{Affine, Rect};
use serde::{Deserialize, Serialize};

use crate::orientation::OrientationData;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProps {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub pivot_x: f64,
    pub pivot_y: f64,
    pub alpha: f64,
    pub visible: bool,
}

impl Default for DisplayProps {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            alpha: 1.0,
            visible: true,
        }
    }
}

impl DisplayProps {
    /// Parent-space transform: `translate * rotate * scale * translate(-pivot)`.
    pub fn local_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-self.pivot_x, -self.pivot_y))
    }
}

/// Scalar display property addressable by setters and frame entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Prop {
    X,
    Y,
    Rotation,
    ScaleX,
    ScaleY,
    PivotX,
    PivotY,
    Alpha,
}

impl Prop {
    pub fn get(self, props: &DisplayProps) -> f64 {
        match self {
            Self::X => props.x,
            Self::Y => props.y,
            Self::Rotation => props.rotation,
            Self::ScaleX => props.scale_x,
            Self::ScaleY => props.scale_y,
            Self::PivotX => props.pivot_x,
            Self::PivotY => props.pivot_y,
            Self::Alpha => props.alpha,
        }
    }

    pub fn set(self, props: &mut DisplayProps, value: f64) {
        match self {
            Self::X => props.x = value,
            Self::Y => props.y = value,
            Self::Rotation => props.rotation = value,
            Self::ScaleX => props.scale_x = value,
            Self::ScaleY => props.scale_y = value,
            Self::PivotX => props.pivot_x = value,
            Self::PivotY => props.pivot_y = value,
            Self::Alpha => props.alpha = value,
        }
    }

    /// Copy a value into the matching orientation snapshot field.
    pub fn mirror(self, snapshot: &mut OrientationData, value: f64) {
        match self {
            Self::X => snapshot.x = value,
            Self::Y => snapshot.y = value,
            Self::Rotation => snapshot.rotation = value,
            Self::ScaleX => snapshot.scale_x = value,
            Self::ScaleY => snapshot.scale_y = value,
            Self::PivotX => snapshot.pivot_x = value,
            Self::PivotY => snapshot.pivot_y = value,
            Self::Alpha => snapshot.alpha = value,
        }
    }
}

/// Intrinsic content size (sprite texture, nine-slice plane, measured text).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn pivot_maps_to_position() {
        let props = DisplayProps {
            x: 100.0,
            y: 50.0,
            scale_x: 2.0,
            scale_y: 2.0,
            pivot_x: 10.0,
            pivot_y: 5.0,
            ..DisplayProps::default()
        };
        let p = props.local_affine() * Point::new(10.0, 5.0);
        assert!(approx(p.x, 100.0, 1e-9) && approx(p.y, 50.0, 1e-9));
        let q = props.local_affine() * Point::new(20.0, 5.0);
        assert!(approx(q.x, 120.0, 1e-9));
    }

    #[test]
    fn rotation_is_about_the_origin_after_pivot() {
        let props = DisplayProps {
            rotation: std::f64::consts::FRAC_PI_2,
            ..DisplayProps::default()
        };
        let p = props.local_affine() * Point::new(1.0, 0.0);
        assert!(approx(p.x, 0.0, 1e-9) && approx(p.y, 1.0, 1e-9));
    }
}
