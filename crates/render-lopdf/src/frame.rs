//! Backgrounds, borders, rules and decoration lines.

use crate::state::RenderState;
use folio_area::{Background, BoxStyle, InlineSpace, Leader, RuleStyle};
use folio_render_core::utils::points;
use folio_types::{Color, Millipoints};
use lopdf::Object;
use lopdf::content::Operation;

const SOLID: &[i64] = &[];
const DASHED: &[i64] = &[3, 3];
const DOTTED: &[i64] = &[1, 3];

/// A straight line in top-down page coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    pub from: (Millipoints, Millipoints),
    pub to: (Millipoints, Millipoints),
    pub thickness: Millipoints,
    pub color: Color,
}

fn dash_operation(pattern: &[i64]) -> Operation {
    Operation::new(
        "d",
        vec![
            Object::Array(pattern.iter().map(|v| Object::Integer(*v)).collect()),
            Object::Integer(0),
        ],
    )
}

/// Strokes `segment` outside the text block. The stroke color stays in
/// effect; width and dash are scoped to a `q`/`Q` pair.
pub(crate) fn stroke_segment(state: &mut RenderState, segment: Segment, dash: Option<&[i64]>) {
    state.leave_text();
    state.set_stroke(segment.color);
    let (x1, y1) = segment.from;
    let (x2, y2) = segment.to;
    let from_y = state.pdf_y(y1);
    let to_y = state.pdf_y(y2);
    state.push(Operation::new("q", vec![]));
    if let Some(pattern) = dash {
        state.push(dash_operation(pattern));
    }
    state.push(Operation::new("w", vec![points(segment.thickness)]));
    state.push(Operation::new("m", vec![points(x1), from_y]));
    state.push(Operation::new("l", vec![points(x2), to_y]));
    state.push(Operation::new("S", vec![]));
    state.push(Operation::new("Q", vec![]));
}

/// Fills the box at (`x`, `top`) when the background's alpha reads as zero.
pub(crate) fn draw_background(
    state: &mut RenderState,
    background: Option<&Background>,
    x: Millipoints,
    top: Millipoints,
    width: Millipoints,
    height: Millipoints,
) {
    let Some(background) = background else {
        return;
    };
    if background.alpha != 0 || width == 0 || height == 0 {
        return;
    }
    state.leave_text();
    state.set_fill(background.color);
    let bottom = state.pdf_y(top + height);
    state.push(Operation::new(
        "re",
        vec![points(x), bottom, points(width), points(height)],
    ));
    state.push(Operation::new("f", vec![]));
}

/// Background and borders around a content box whose top-left corner is
/// (`x`, `top`).
pub(crate) fn draw_frame(
    state: &mut RenderState,
    style: &BoxStyle,
    x: Millipoints,
    top: Millipoints,
    width: Millipoints,
    height: Millipoints,
) {
    let padding = &style.padding;
    let mut x = x - padding.left;
    let mut top = top - padding.top;
    let mut width = width + padding.horizontal();
    let mut height = height + padding.vertical();
    draw_background(state, style.background.as_ref(), x, top, width, height);

    let border = &style.border_width;
    let color = &style.border_color;
    x -= border.left;
    top -= border.top;
    width += border.horizontal();
    height += border.vertical();
    let right = x + width;
    let bottom = top + height;

    let sides = [
        (border.top, color.top, (x, top), (right, top)),
        (border.left, color.left, (x, top), (x, bottom)),
        (border.right, color.right, (right, top), (right, bottom)),
        (border.bottom, color.bottom, (x, bottom), (right, bottom)),
    ];
    for (thickness, color, from, to) in sides {
        if thickness != 0 {
            stroke_segment(state, Segment { from, to, thickness, color }, None);
        }
    }
}

/// Draws a leader rule at the cursor and advances past it. Like the second
/// line of a double rule, the cursor moves up by the rule thickness.
pub(crate) fn draw_leader(state: &mut RenderState, leader: &Leader) {
    let thickness = leader.thickness;
    if thickness == 0 {
        return;
    }
    let (x, y) = (state.x, state.y);
    let line = |y: Millipoints, thickness: Millipoints, color: Color| Segment {
        from: (x, y),
        to: (x + leader.width, y),
        thickness,
        color,
    };
    let dash = match leader.style {
        RuleStyle::Dashed => DASHED,
        RuleStyle::Dotted => DOTTED,
        _ => SOLID,
    };
    let segments = match leader.style {
        RuleStyle::Double => vec![
            line(y, thickness / 3, leader.color),
            line(y - 2 * thickness / 3, thickness / 3, leader.color),
        ],
        RuleStyle::Groove => vec![
            line(y, thickness / 2, leader.color),
            line(y - thickness / 2, thickness / 2, Color::WHITE),
        ],
        RuleStyle::Ridge => vec![
            line(y, thickness / 2, Color::WHITE),
            line(y - thickness / 2, thickness / 2, leader.color),
        ],
        RuleStyle::Solid | RuleStyle::Dashed | RuleStyle::Dotted => vec![line(y, thickness, leader.color)],
    };
    for segment in segments {
        stroke_segment(state, segment, Some(dash));
    }
    state.x += leader.width;
    state.y -= thickness;
}

/// Advances past an inline space, continuing the decorations of the word
/// before it.
pub(crate) fn inline_space(state: &mut RenderState, space: &InlineSpace) {
    state.x += space.size;
    let mut carries = state.decorations;
    for (flag, carry) in [
        (space.underline, &mut carries.underline),
        (space.overline, &mut carries.overline),
        (space.line_through, &mut carries.line_through),
    ] {
        let Some(previous) = carry.as_mut().filter(|_| flag) else {
            continue;
        };
        let segment = Segment {
            from: (previous.end_x, previous.y),
            to: (previous.end_x + space.size, previous.y),
            thickness: previous.thickness,
            color: previous.color,
        };
        stroke_segment(state, segment, None);
        previous.end_x += space.size;
    }
    state.decorations = carries;
}
