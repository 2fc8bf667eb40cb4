//! Lowering of parsed path data.

use crate::arc::ArcSegment;
use crate::error::Unsupported;
use crate::parsers::{PathSegment, parse_path_data};
use crate::shapes::{Bounds, Outline, curve_to, line_to, move_to};

/// Result of lowering one `d` attribute.
#[derive(Debug, Clone)]
pub struct LoweredPath {
    /// `None` when nothing drawable was produced.
    pub outline: Option<Outline>,
    pub diagnostics: Vec<Unsupported>,
}

/// Interprets path data against a running current point.
///
/// Relative coordinates are offsets from the current point. Lowering stops at
/// the first malformed command, keeping what came before it.
pub fn lower_path(data: &str) -> LoweredPath {
    let (segments, remainder) = parse_path_data(data);
    if let Some(rest) = remainder {
        log::warn!("Malformed path data, ignoring from '{}'", rest);
    }

    let mut ops = Vec::with_capacity(segments.len());
    let mut points = Vec::with_capacity(segments.len() * 3);
    let mut diagnostics = Vec::new();
    let mut current = (0.0, 0.0);

    let resolve = |abs: bool, (cx, cy): (f64, f64), x: f64, y: f64| {
        if abs { (x, y) } else { (cx + x, cy + y) }
    };

    for (index, segment) in segments.into_iter().enumerate() {
        if index == 0 && !matches!(segment, PathSegment::MoveTo { .. }) {
            log::warn!("Path data must begin with a moveto, ignoring the path");
            break;
        }
        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                // A leading relative moveto is relative to the origin.
                current = resolve(abs, current, x, y);
                ops.push(move_to(current.0, current.1));
                points.push(current);
            }
            PathSegment::LineTo { abs, x, y } => {
                current = resolve(abs, current, x, y);
                ops.push(line_to(current.0, current.1));
                points.push(current);
            }
            PathSegment::Horizontal { abs, x } => {
                current.0 = if abs { x } else { current.0 + x };
                ops.push(line_to(current.0, current.1));
                points.push(current);
            }
            PathSegment::Vertical { abs, y } => {
                current.1 = if abs { y } else { current.1 + y };
                ops.push(line_to(current.0, current.1));
                points.push(current);
            }
            PathSegment::CurveTo { abs, x1, y1, x2, y2, x, y } => {
                let c1 = resolve(abs, current, x1, y1);
                let c2 = resolve(abs, current, x2, y2);
                current = resolve(abs, current, x, y);
                ops.push(curve_to(c1, c2, current));
                points.extend([c1, c2, current]);
            }
            PathSegment::Arc { abs, rx, ry, rotation, large_arc, sweep, x, y } => {
                let to = resolve(abs, current, x, y);
                let arc = ArcSegment {
                    from: current,
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                };
                for (px, py) in arc.flatten() {
                    ops.push(line_to(px, py));
                    points.push((px, py));
                }
                current = to;
            }
            PathSegment::Unsupported(command) => {
                log::warn!("Unsupported path command '{}' ignored", command);
                diagnostics.push(Unsupported::PathCommand(command));
            }
        }
    }

    let outline = Bounds::of_points(&points).map(|bounds| Outline { ops, bounds });
    LoweredPath { outline, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Object;

    fn rendered(path: &LoweredPath) -> Vec<(String, Vec<f32>)> {
        path.outline
            .as_ref()
            .map(|o| {
                o.ops
                    .iter()
                    .map(|op| {
                        let values = op
                            .operands
                            .iter()
                            .map(|v| match v {
                                Object::Real(r) => *r,
                                other => panic!("unexpected operand {:?}", other),
                            })
                            .collect();
                        (op.operator.clone(), values)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn relative_commands_follow_the_current_point() {
        let path = lower_path("M10 10 l5 0 v5 h-5 c0 1 1 2 3 4 m1 1");
        assert_eq!(
            rendered(&path),
            vec![
                ("m".to_string(), vec![10.0, 10.0]),
                ("l".to_string(), vec![15.0, 10.0]),
                ("l".to_string(), vec![15.0, 15.0]),
                ("l".to_string(), vec![10.0, 15.0]),
                ("c".to_string(), vec![10.0, 16.0, 11.0, 17.0, 13.0, 19.0]),
                ("m".to_string(), vec![14.0, 20.0]),
            ]
        );
        assert!(path.diagnostics.is_empty());
    }

    #[test]
    fn arcs_are_flattened_to_lines() {
        let path = lower_path("M0 0 A5 5 0 0 1 10 0");
        let ops = rendered(&path);
        assert_eq!(ops[0].0, "m");
        assert!(ops[1..].iter().all(|(op, _)| op == "l"));
        assert_eq!(ops.last().unwrap().1, vec![10.0, 0.0]);
    }

    #[test]
    fn unsupported_commands_are_reported() {
        let path = lower_path("M0 0 L10 10 Q 20 20 30 30 Z");
        assert_eq!(
            path.diagnostics,
            vec![Unsupported::PathCommand('Q'), Unsupported::PathCommand('Z')]
        );
        assert_eq!(rendered(&path).len(), 2);
    }

    #[test]
    fn path_without_initial_moveto_is_ignored() {
        let path = lower_path("L10 10");
        assert!(path.outline.is_none());
    }

    #[test]
    fn bounds_cover_all_points() {
        let path = lower_path("M-5 0 L5 10");
        let bounds = path.outline.unwrap().bounds;
        assert_eq!(bounds, Bounds { x: -5.0, y: 0.0, width: 10.0, height: 10.0 });
    }
}
