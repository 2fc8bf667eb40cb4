//! Geometry primitives.
//!
//! Area-tree geometry is integer millipoints (1/1000 pt) with Y growing down
//! from the top of the page. Vector graphics work in floating-point user
//! units and are combined through [`Matrix`].

use serde::{Deserialize, Serialize};

/// 1/1000 of a PDF point.
pub type Millipoints = i32;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: Millipoints,
    pub y: Millipoints,
    pub width: Millipoints,
    pub height: Millipoints,
}

impl Rect {
    pub fn new(x: Millipoints, y: Millipoints, width: Millipoints, height: Millipoints) -> Self {
        Self { x, y, width, height }
    }
}

/// Per-side values of a box, in CSS order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Sides<T> {
    pub fn uniform(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }
}

impl Sides<Millipoints> {
    pub fn horizontal(&self) -> Millipoints {
        self.left + self.right
    }

    pub fn vertical(&self) -> Millipoints {
        self.top + self.bottom
    }
}

/// A 2D affine transform.
///
/// Points map as `x' = xx*x + xy*y + x0`, `y' = yx*x + yy*y + y0`, which
/// matches the operand order `[xx yx xy yy x0 y0]` of a `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self { xx, yx, xy, yy, x0, y0 }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees`, counter-clockwise in a Y-up space.
    pub fn rotate(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// The transform that applies `t1` first and then `t2`.
    #[rustfmt::skip]
    pub fn multiply(t1: &Matrix, t2: &Matrix) -> Matrix {
        Matrix {
            xx: t1.xx * t2.xx + t1.yx * t2.xy,
            yx: t1.xx * t2.yx + t1.yx * t2.yy,
            xy: t1.xy * t2.xx + t1.yy * t2.xy,
            yy: t1.xy * t2.yx + t1.yy * t2.yy,
            x0: t1.x0 * t2.xx + t1.y0 * t2.xy + t2.x0,
            y0: t1.x0 * t2.yx + t1.y0 * t2.yy + t2.y0,
        }
    }

    /// `t` applied before `self`; the effect of concatenating `t` with `cm`
    /// while `self` is the current transformation matrix.
    pub fn pre_transform(&self, t: &Matrix) -> Matrix {
        Matrix::multiply(t, self)
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix::identity()
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0]
    }
}
