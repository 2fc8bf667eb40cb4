//! Elliptical arc flattening.
//!
//! Arcs are converted from endpoint form to center form and then walked in
//! fixed angular steps. The last point is always the requested end point, so
//! step rounding never leaves the path short of its target.

const STEP_DEGREES: f64 = 5.0;

/// One `A`/`a` segment in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub from: (f64, f64),
    pub rx: f64,
    pub ry: f64,
    /// X-axis rotation, degrees.
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub to: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CenterForm {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start_degrees: f64,
    extent_degrees: f64,
}

impl ArcSegment {
    fn center_form(&self) -> CenterForm {
        let (x0, y0) = self.from;
        let (x, y) = self.to;
        let mut rx = self.rx.abs();
        let mut ry = self.ry.abs();

        let angle = (self.rotation % 360.0).to_radians();
        let (sin, cos) = angle.sin_cos();

        // Half chord in the ellipse's own frame.
        let dx2 = (x0 - x) / 2.0;
        let dy2 = (y0 - y) / 2.0;
        let x1 = cos * dx2 + sin * dy2;
        let y1 = -sin * dx2 + cos * dy2;

        let mut prx = rx * rx;
        let mut pry = ry * ry;
        let px1 = x1 * x1;
        let py1 = y1 * y1;

        let radii_check = px1 / prx + py1 / pry;
        if radii_check > 1.0 {
            rx *= radii_check.sqrt();
            ry *= radii_check.sqrt();
            prx = rx * rx;
            pry = ry * ry;
        }

        let sign = if self.large_arc == self.sweep { -1.0 } else { 1.0 };
        let sq = ((prx * pry - prx * py1 - pry * px1) / (prx * py1 + pry * px1)).max(0.0);
        let coef = sign * sq.sqrt();
        let cx1 = coef * (rx * y1 / ry);
        let cy1 = coef * -(ry * x1 / rx);

        let cx = (x0 + x) / 2.0 + (cos * cx1 - sin * cy1);
        let cy = (y0 + y) / 2.0 + (sin * cx1 + cos * cy1);

        let ux = (x1 - cx1) / rx;
        let uy = (y1 - cy1) / ry;
        let vx = (-x1 - cx1) / rx;
        let vy = (-y1 - cy1) / ry;

        let n = (ux * ux + uy * uy).sqrt();
        let start_sign = if uy < 0.0 { -1.0 } else { 1.0 };
        let start = start_sign * (ux / n).clamp(-1.0, 1.0).acos().to_degrees();

        let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
        let p = ux * vx + uy * vy;
        let extent_sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
        let mut extent = extent_sign * (p / n).clamp(-1.0, 1.0).acos().to_degrees();
        if !self.sweep && extent > 0.0 {
            extent -= 360.0;
        } else if self.sweep && extent < 0.0 {
            extent += 360.0;
        }

        CenterForm {
            cx,
            cy,
            rx,
            ry,
            start_degrees: start % 360.0,
            extent_degrees: extent % 360.0,
        }
    }

    /// Points for successive line-to operators, ending exactly at `to`.
    ///
    /// Identical end points yield nothing; a zero radius yields a straight line.
    pub fn flatten(&self) -> Vec<(f64, f64)> {
        if self.from == self.to {
            return Vec::new();
        }
        if self.rx == 0.0 || self.ry == 0.0 {
            return vec![self.to];
        }

        let center = self.center_form();
        let (sin_phi, cos_phi) = (self.rotation % 360.0).to_radians().sin_cos();
        let step = if self.sweep { STEP_DEGREES } else { -STEP_DEGREES };
        let steps = (center.extent_degrees.abs() / STEP_DEGREES).ceil() as usize;

        let mut points: Vec<(f64, f64)> = (1..steps)
            .map(|k| {
                let theta = (center.start_degrees + k as f64 * step).to_radians();
                let (sin_t, cos_t) = theta.sin_cos();
                (
                    cos_phi * center.rx * cos_t - sin_phi * center.ry * sin_t + center.cx,
                    sin_phi * center.rx * cos_t + cos_phi * center.ry * sin_t + center.cy,
                )
            })
            .collect();
        points.push(self.to);
        points
    }
}
