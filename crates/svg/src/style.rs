//! Style resolution and per-shape drawing instructions.

use crate::document::SvgNode;
use crate::error::SvgError;
use crate::parsers::{PaintSpec, parse_color, parse_length, parse_length_list, parse_number, parse_paint};
use folio_render_core::utils::real;
use folio_types::Color;
use lopdf::Object;
use lopdf::content::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Painting properties of one element after inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub fill: PaintSpec,
    pub fill_rule: FillRule,
    pub stroke: PaintSpec,
    pub stroke_width: f64,
    pub linecap: LineCap,
    pub linejoin: LineJoin,
    pub miterlimit: f64,
    pub dasharray: Option<Vec<f64>>,
    pub dashoffset: f64,
    /// Target of `currentColor`.
    pub color: Color,
    pub font_size: Option<f64>,
    pub preserve_space: bool,
    /// Not inherited.
    pub display_none: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            fill: PaintSpec::Color(Color::BLACK),
            fill_rule: FillRule::NonZero,
            stroke: PaintSpec::None,
            stroke_width: 1.0,
            linecap: LineCap::Butt,
            linejoin: LineJoin::Miter,
            miterlimit: DEFAULT_MITER_LIMIT,
            dasharray: None,
            dashoffset: 0.0,
            color: Color::BLACK,
            font_size: None,
            preserve_space: false,
            display_none: false,
        }
    }
}

impl ComputedStyle {
    /// The style of `node` given its parent's computed style.
    pub fn cascade(&self, node: &SvgNode) -> Result<ComputedStyle, SvgError> {
        let mut style = self.clone();
        style.display_none = false;

        let specified = |name: &str| node.attribute(name).filter(|v| *v != "inherit");

        if let Some(value) = specified("color") {
            style.color = parse_color("color", value)?;
        }
        if let Some(value) = specified("fill") {
            style.fill = parse_paint("fill", value)?;
        }
        if let Some(value) = specified("fill-rule") {
            style.fill_rule = match value {
                "evenodd" => FillRule::EvenOdd,
                "nonzero" => FillRule::NonZero,
                other => return Err(SvgError::attribute("fill-rule", other)),
            };
        }
        if let Some(value) = specified("stroke") {
            style.stroke = parse_paint("stroke", value)?;
        }
        if let Some(value) = specified("stroke-width") {
            style.stroke_width = parse_length("stroke-width", value)?.resolve(1.0).abs();
        }
        if let Some(value) = specified("stroke-linecap") {
            style.linecap = match value {
                "butt" => LineCap::Butt,
                "round" => LineCap::Round,
                "square" => LineCap::Square,
                other => return Err(SvgError::attribute("stroke-linecap", other)),
            };
        }
        if let Some(value) = specified("stroke-linejoin") {
            style.linejoin = match value {
                "miter" => LineJoin::Miter,
                "round" => LineJoin::Round,
                "bevel" => LineJoin::Bevel,
                other => return Err(SvgError::attribute("stroke-linejoin", other)),
            };
        }
        if let Some(value) = specified("stroke-miterlimit") {
            style.miterlimit = parse_number("stroke-miterlimit", value)?.max(1.0);
        }
        if let Some(value) = specified("stroke-dasharray") {
            style.dasharray = parse_dasharray(value)?;
        }
        if let Some(value) = specified("stroke-dashoffset") {
            style.dashoffset = parse_length("stroke-dashoffset", value)?.resolve(1.0);
        }
        if let Some(value) = specified("font-size") {
            style.font_size = Some(parse_length("font-size", value)?.resolve(self.font_size.unwrap_or(12.0)));
        }
        if let Some(value) = specified("xml:space") {
            style.preserve_space = value == "preserve";
        }
        if node.attribute("display") == Some("none") {
            style.display_none = true;
        }
        Ok(style)
    }
}

fn parse_dasharray(value: &str) -> Result<Option<Vec<f64>>, SvgError> {
    if value.trim() == "none" {
        return Ok(None);
    }
    let mut dashes: Vec<f64> = parse_length_list("stroke-dasharray", value)?
        .into_iter()
        .map(|l| l.resolve(1.0))
        .collect();
    if dashes.iter().any(|d| *d < 0.0) {
        return Err(SvgError::attribute("stroke-dasharray", value));
    }
    if dashes.iter().all(|d| *d == 0.0) {
        return Ok(None);
    }
    if dashes.len() % 2 == 1 {
        dashes.extend_from_within(..);
    }
    Ok(Some(dashes))
}

/// How one shape is painted, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingInstruction {
    pub fill: bool,
    pub fill_rule: FillRule,
    pub stroke: bool,
    pub stroke_width: f64,
    pub linecap: LineCap,
    pub linejoin: LineJoin,
    pub miterlimit: f64,
    pub dash: Option<(Vec<f64>, f64)>,
}

impl DrawingInstruction {
    pub fn new(style: &ComputedStyle, fill: bool, stroke: bool) -> Self {
        Self {
            fill,
            fill_rule: style.fill_rule,
            stroke,
            stroke_width: style.stroke_width,
            linecap: style.linecap,
            linejoin: style.linejoin,
            miterlimit: style.miterlimit,
            dash: style
                .dasharray
                .as_ref()
                .map(|dashes| (dashes.clone(), style.dashoffset)),
        }
    }

    pub fn painting_operator(&self) -> &'static str {
        match (self.fill, self.stroke, self.fill_rule) {
            (true, true, FillRule::NonZero) => "B",
            (true, true, FillRule::EvenOdd) => "B*",
            (true, false, FillRule::NonZero) => "f",
            (true, false, FillRule::EvenOdd) => "f*",
            (false, true, _) => "S",
            (false, false, _) => "n",
        }
    }

    /// Line parameters; only meaningful when stroking.
    pub fn line_style_operations(&self) -> Vec<Operation> {
        let mut ops = vec![Operation::new("w", vec![real(self.stroke_width)])];
        if self.linecap != LineCap::Butt {
            ops.push(Operation::new("J", vec![Object::Integer(self.linecap as i64)]));
        }
        if self.linejoin != LineJoin::Miter {
            ops.push(Operation::new("j", vec![Object::Integer(self.linejoin as i64)]));
        }
        if self.miterlimit != DEFAULT_MITER_LIMIT {
            ops.push(Operation::new("M", vec![real(self.miterlimit)]));
        }
        if let Some((dashes, phase)) = &self.dash {
            ops.push(Operation::new(
                "d",
                vec![
                    Object::Array(dashes.iter().map(|d| real(*d)).collect()),
                    real(*phase),
                ],
            ));
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SvgDocument;

    fn style_of(markup: &str, id: &str) -> ComputedStyle {
        let doc = SvgDocument::parse(markup).unwrap();
        let target = doc.lookup(id).unwrap();
        doc.path_from_root(target)
            .into_iter()
            .try_fold(ComputedStyle::default(), |style, node| style.cascade(doc.node(node)))
            .unwrap()
    }

    #[test]
    fn paint_properties_inherit() {
        let style = style_of(
            r#"<svg><g fill="red" stroke="blue" stroke-width="3"><rect id="r" style="stroke-linecap:round"/></g></svg>"#,
            "r",
        );
        assert_eq!(style.fill, PaintSpec::Color(Color::rgb(255, 0, 0)));
        assert_eq!(style.stroke, PaintSpec::Color(Color::rgb(0, 0, 255)));
        assert_eq!(style.stroke_width, 3.0);
        assert_eq!(style.linecap, LineCap::Round);
    }

    #[test]
    fn defaults_fill_black_without_stroke() {
        let style = style_of(r#"<svg><circle id="c"/></svg>"#, "c");
        let instruction = DrawingInstruction::new(&style, true, false);
        assert_eq!(instruction.painting_operator(), "f");
        assert_eq!(style.stroke, PaintSpec::None);
    }

    #[test]
    fn painting_operator_covers_rules() {
        let mut style = ComputedStyle::default();
        style.fill_rule = FillRule::EvenOdd;
        assert_eq!(DrawingInstruction::new(&style, true, true).painting_operator(), "B*");
        assert_eq!(DrawingInstruction::new(&style, true, false).painting_operator(), "f*");
        assert_eq!(DrawingInstruction::new(&style, false, true).painting_operator(), "S");
        assert_eq!(DrawingInstruction::new(&style, false, false).painting_operator(), "n");
    }

    #[test]
    fn odd_dash_arrays_repeat() {
        assert_eq!(parse_dasharray("5 2 1").unwrap(), Some(vec![5.0, 2.0, 1.0, 5.0, 2.0, 1.0]));
        assert_eq!(parse_dasharray("none").unwrap(), None);
        assert_eq!(parse_dasharray("0 0").unwrap(), None);
        assert!(parse_dasharray("-1").is_err());
    }

    #[test]
    fn line_style_skips_defaults() {
        let mut style = ComputedStyle::default();
        style.stroke_width = 2.0;
        let ops = DrawingInstruction::new(&style, false, true).line_style_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operator, "w");

        style.linejoin = LineJoin::Bevel;
        style.dasharray = Some(vec![3.0, 1.0]);
        let ops = DrawingInstruction::new(&style, false, true).line_style_operations();
        let names: Vec<_> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, ["w", "j", "d"]);
    }

    #[test]
    fn display_none_is_not_inherited() {
        let doc = SvgDocument::parse(r#"<svg><g id="g" display="none"><rect id="r"/></g></svg>"#).unwrap();
        let g = ComputedStyle::default().cascade(doc.node(doc.lookup("g").unwrap())).unwrap();
        assert!(g.display_none);
        let r = g.cascade(doc.node(doc.lookup("r").unwrap())).unwrap();
        assert!(!r.display_none);
    }
}
