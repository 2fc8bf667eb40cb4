//! Geometry of the basic shapes as path-construction operators.
//!
//! Circles and ellipses are four cubic quadrants with control points at 21/40
//! of the radius; rounded rectangle corners use 19/40. Both constants are kept
//! exactly so output stays comparable with existing documents.

use folio_render_core::utils::real;
use lopdf::content::Operation;

const QUADRANT: f64 = 21.0 / 40.0;
const CORNER: f64 = 19.0 / 40.0;

/// Axis-aligned bounds in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn of_points(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// Path-construction operators plus the bounds gradients map onto.
#[derive(Debug, Clone)]
pub struct Outline {
    pub ops: Vec<Operation>,
    pub bounds: Bounds,
}

pub(crate) fn move_to(x: f64, y: f64) -> Operation {
    Operation::new("m", vec![real(x), real(y)])
}

pub(crate) fn line_to(x: f64, y: f64) -> Operation {
    Operation::new("l", vec![real(x), real(y)])
}

pub(crate) fn curve_to(c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) -> Operation {
    Operation::new(
        "c",
        vec![real(c1.0), real(c1.1), real(c2.0), real(c2.1), real(end.0), real(end.1)],
    )
}

/// `None` when the rectangle has no area.
pub fn rect(x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) -> Option<Outline> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let bounds = Bounds { x, y, width: w, height: h };
    if rx <= 0.0 && ry <= 0.0 {
        return Some(Outline {
            ops: vec![Operation::new("re", vec![real(x), real(y), real(w), real(h)])],
            bounds,
        });
    }

    let ry = if ry <= 0.0 { rx } else { ry };
    let rx = if rx <= 0.0 { ry } else { rx };
    let rx = rx.min(w / 2.0);
    let ry = ry.min(h / 2.0);
    let kx = CORNER * rx;
    let ky = CORNER * ry;

    let ops = vec![
        move_to(x + rx, y),
        line_to(x + w - rx, y),
        curve_to((x + w - kx, y), (x + w, y + ky), (x + w, y + ry)),
        line_to(x + w, y + h - ry),
        curve_to((x + w, y + h - ky), (x + w - kx, y + h), (x + w - rx, y + h)),
        line_to(x + rx, y + h),
        curve_to((x + kx, y + h), (x, y + h - ky), (x, y + h - ry)),
        line_to(x, y + ry),
        curve_to((x, y + ky), (x + kx, y), (x + rx, y)),
    ];
    Some(Outline { ops, bounds })
}

/// Control points of the four quadrants, starting at the top and running
/// clockwise in Y-down space.
pub fn ellipse_curves(cx: f64, cy: f64, rx: f64, ry: f64) -> [[(f64, f64); 3]; 4] {
    let kx = QUADRANT * rx;
    let ky = QUADRANT * ry;
    [
        [(cx + kx, cy - ry), (cx + rx, cy - ky), (cx + rx, cy)],
        [(cx + rx, cy + ky), (cx + kx, cy + ry), (cx, cy + ry)],
        [(cx - kx, cy + ry), (cx - rx, cy + ky), (cx - rx, cy)],
        [(cx - rx, cy - ky), (cx - kx, cy - ry), (cx, cy - ry)],
    ]
}

pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<Outline> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let mut ops = vec![move_to(cx, cy - ry)];
    ops.extend(
        ellipse_curves(cx, cy, rx, ry)
            .iter()
            .map(|[c1, c2, end]| curve_to(*c1, *c2, *end)),
    );
    Some(Outline {
        ops,
        bounds: Bounds {
            x: cx - rx,
            y: cy - ry,
            width: 2.0 * rx,
            height: 2.0 * ry,
        },
    })
}

pub fn circle(cx: f64, cy: f64, r: f64) -> Option<Outline> {
    ellipse(cx, cy, r, r)
}

pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Outline {
    Outline {
        ops: vec![move_to(x1, y1), line_to(x2, y2)],
        bounds: Bounds::of_points(&[(x1, y1), (x2, y2)]).unwrap_or(Bounds {
            x: x1,
            y: y1,
            width: 0.0,
            height: 0.0,
        }),
    }
}

/// A polyline, closed with `h` for polygons. `None` without points.
pub fn poly(points: &[(f64, f64)], close: bool) -> Option<Outline> {
    let bounds = Bounds::of_points(points)?;
    let (first, rest) = points.split_first()?;
    let mut ops = vec![move_to(first.0, first.1)];
    ops.extend(rest.iter().map(|(x, y)| line_to(*x, *y)));
    if close {
        ops.push(Operation::new("h", vec![]));
    }
    Some(Outline { ops, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Object;

    fn operands(op: &Operation) -> Vec<f64> {
        op.operands
            .iter()
            .map(|o| match o {
                Object::Real(r) => *r as f64,
                other => panic!("unexpected operand {:?}", other),
            })
            .collect()
    }

    fn operators(outline: &Outline) -> Vec<&str> {
        outline.ops.iter().map(|o| o.operator.as_str()).collect()
    }

    #[test]
    fn square_rect_is_a_single_re() {
        let outline = rect(1.0, 2.0, 30.0, 40.0, 0.0, 0.0).unwrap();
        assert_eq!(operators(&outline), ["re"]);
        assert_eq!(operands(&outline.ops[0]), vec![1.0, 2.0, 30.0, 40.0]);
    }

    #[test]
    fn empty_rect_renders_nothing() {
        assert!(rect(0.0, 0.0, 0.0, 10.0, 0.0, 0.0).is_none());
        assert!(rect(0.0, 0.0, 10.0, -1.0, 2.0, 2.0).is_none());
    }

    #[test]
    fn rounded_rect_uses_corner_constant() {
        let outline = rect(0.0, 0.0, 100.0, 50.0, 40.0, 0.0).unwrap();
        assert_eq!(operators(&outline), ["m", "l", "c", "l", "c", "l", "c", "l", "c"]);
        // ry defaults to rx, then both clamp to half the box.
        assert_eq!(operands(&outline.ops[0]), vec![40.0, 0.0]);
        let first_corner = operands(&outline.ops[2]);
        assert!((first_corner[0] - (100.0 - 19.0)).abs() < 1e-4);
        assert!((first_corner[3] - 25.0 * 19.0 / 40.0).abs() < 1e-4);
        assert_eq!(first_corner[5], 25.0);
    }

    #[test]
    fn circle_has_four_quadrants() {
        let outline = circle(50.0, 50.0, 25.0).unwrap();
        assert_eq!(operators(&outline), ["m", "c", "c", "c", "c"]);
        assert_eq!(operands(&outline.ops[0]), vec![50.0, 25.0]);
        assert_eq!(operands(&outline.ops[4])[4..], [50.0, 25.0]);
        assert_eq!(
            outline.bounds,
            Bounds { x: 25.0, y: 25.0, width: 50.0, height: 50.0 }
        );
    }

    #[test]
    fn polygon_closes_polyline_does_not() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(operators(&poly(&points, true).unwrap()), ["m", "l", "l", "h"]);
        assert_eq!(operators(&poly(&points, false).unwrap()), ["m", "l", "l"]);
        assert!(poly(&[], false).is_none());
    }
}
