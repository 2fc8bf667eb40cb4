//! Linear and radial gradients as shading patterns.
//!
//! A gradient may inherit attributes and stops from one other gradient via
//! `href`. Longer chains are reported and cut after the first level.

use crate::document::{DocumentArena, ElementKind, NodeRef, SvgNode};
use crate::error::{SvgError, Unsupported};
use crate::parsers::{Length, parse_color, parse_fraction, parse_length, parse_transform};
use crate::shapes::Bounds;
use folio_render_core::{
    DocumentBuilder, FunctionId, InterpolationFunction, PathPaint, ShadingGeometry, ShadingPattern,
};
use folio_types::{Color, Matrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    ObjectBoundingBox,
    UserSpaceOnUse,
}

impl Units {
    pub(crate) fn parse(name: &str, value: Option<&str>) -> Result<Self, SvgError> {
        match value {
            None | Some("objectBoundingBox") => Ok(Units::ObjectBoundingBox),
            Some("userSpaceOnUse") => Ok(Units::UserSpaceOnUse),
            Some(other) => Err(SvgError::attribute(name, other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientShape {
    Linear { x1: Length, y1: Length, x2: Length, y2: Length },
    Radial { cx: Length, cy: Length, r: Length, fx: Length, fy: Length },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// A gradient with its href inheritance already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub shape: GradientShape,
    pub units: Units,
    pub transform: Matrix,
    pub stops: Vec<GradientStop>,
}

fn is_gradient(node: &SvgNode) -> bool {
    matches!(
        node.kind(),
        Some(ElementKind::LinearGradient | ElementKind::RadialGradient)
    )
}

impl Gradient {
    /// Reads the gradient at `target`, which must be a gradient element.
    pub fn resolve(
        arena: &mut DocumentArena,
        target: NodeRef,
        diagnostics: &mut Vec<Unsupported>,
    ) -> Result<Self, SvgError> {
        let own_doc = arena.get(target.doc);
        let own = own_doc.node(target.node);

        let base_ref = match own.attribute("href") {
            Some(href) => match arena.resolve(target.doc, href) {
                Ok(found) => Some(found),
                Err(e) => {
                    log::warn!("Gradient reference '{}' not resolved: {}", href, e);
                    None
                }
            },
            None => None,
        };
        let base_doc = base_ref.map(|r| arena.get(r.doc));
        let base = base_ref
            .zip(base_doc.as_ref())
            .map(|(r, doc)| doc.node(r.node))
            .filter(|node| {
                let ok = is_gradient(node);
                if !ok {
                    log::warn!("Gradient href does not point to a gradient, ignoring it");
                }
                ok
            });
        if let Some(base) = base {
            if base.has_attribute("href") {
                let id = base.id().unwrap_or_default().to_string();
                log::warn!("Gradient href chain continues past '{}', ignoring the rest", id);
                diagnostics.push(Unsupported::HrefChain(id));
            }
        }

        let attr = |name: &str| own.attribute(name).or_else(|| base.and_then(|b| b.attribute(name)));
        let length = |name: &str, default: Length| -> Result<Length, SvgError> {
            attr(name).map_or(Ok(default), |v| parse_length(name, v))
        };

        if let Some(spread) = attr("spreadMethod") {
            if spread != "pad" {
                log::warn!("spreadMethod '{}' is rendered as pad", spread);
                diagnostics.push(Unsupported::SpreadMethod(spread.to_string()));
            }
        }

        let shape = match own.kind() {
            Some(ElementKind::RadialGradient) => {
                let cx = length("cx", Length::Percent(50.0))?;
                let cy = length("cy", Length::Percent(50.0))?;
                GradientShape::Radial {
                    cx,
                    cy,
                    r: length("r", Length::Percent(50.0))?,
                    fx: length("fx", cx)?,
                    fy: length("fy", cy)?,
                }
            }
            _ => GradientShape::Linear {
                x1: length("x1", Length::Percent(0.0))?,
                y1: length("y1", Length::Percent(0.0))?,
                x2: length("x2", Length::Percent(100.0))?,
                y2: length("y2", Length::Percent(0.0))?,
            },
        };

        let units = Units::parse("gradientUnits", attr("gradientUnits"))?;
        let transform = match attr("gradientTransform") {
            Some(value) => parse_transform("gradientTransform", value)?,
            None => Matrix::identity(),
        };

        let mut stops = read_stops(&own_doc, own)?;
        if stops.is_empty() {
            if let (Some(doc), Some(base)) = (base_doc.as_ref(), base) {
                stops = read_stops(doc, base)?;
            }
        }

        Ok(Gradient {
            shape,
            units,
            transform,
            stops,
        })
    }

    /// Registers the shading for a shape with `bounds` drawn under `ctm`.
    ///
    /// Zero stops give no paint, one stop a flat color.
    pub fn paint(
        &self,
        builder: &mut dyn DocumentBuilder,
        bounds: Bounds,
        ctm: &Matrix,
        viewport: (f64, f64),
    ) -> Result<Option<PathPaint>, SvgError> {
        match self.stops.as_slice() {
            [] => return Ok(None),
            [only] => return Ok(Some(PathPaint::Solid(only.color))),
            _ => {}
        }

        let space = match self.units {
            Units::ObjectBoundingBox => {
                if bounds.width <= 0.0 || bounds.height <= 0.0 {
                    log::debug!("Bounding-box gradient on a shape without area, not painted");
                    return Ok(None);
                }
                Matrix::new(bounds.width, 0.0, 0.0, bounds.height, bounds.x, bounds.y)
            }
            Units::UserSpaceOnUse => Matrix::identity(),
        };
        let (width, height) = match self.units {
            Units::ObjectBoundingBox => (1.0, 1.0),
            Units::UserSpaceOnUse => viewport,
        };
        let diagonal = ((width * width + height * height) / 2.0).sqrt();

        let geometry = match self.shape {
            GradientShape::Linear { x1, y1, x2, y2 } => ShadingGeometry::Axial([
                x1.resolve(width),
                y1.resolve(height),
                x2.resolve(width),
                y2.resolve(height),
            ]),
            GradientShape::Radial { cx, cy, r, fx, fy } => ShadingGeometry::Radial([
                fx.resolve(width),
                fy.resolve(height),
                0.0,
                cx.resolve(width),
                cy.resolve(height),
                r.resolve(diagonal),
            ]),
        };

        let function = register_stops(builder, &self.stops)?;
        let matrix = Matrix::multiply(&Matrix::multiply(&self.transform, &space), ctm);
        let name = builder.register_shading_pattern(&ShadingPattern {
            geometry,
            matrix,
            function,
            extend: [true, true],
        })?;
        Ok(Some(PathPaint::Pattern(name)))
    }
}

fn read_stops(doc: &crate::document::SvgDocument, gradient: &SvgNode) -> Result<Vec<GradientStop>, SvgError> {
    let mut stops: Vec<GradientStop> = Vec::new();
    for child in gradient.children() {
        let node = doc.node(*child);
        if node.kind() != Some(&ElementKind::Stop) {
            continue;
        }
        let offset = match node.attribute("offset") {
            Some(v) => parse_fraction("offset", v)?.clamp(0.0, 1.0),
            None => 0.0,
        };
        // Offsets never decrease.
        let offset = stops.last().map_or(offset, |prev| offset.max(prev.offset));
        let color = match node.attribute("stop-color") {
            Some(v) => parse_color("stop-color", v)?,
            None => Color::BLACK,
        };
        stops.push(GradientStop { offset, color });
    }
    Ok(stops)
}

/// One exponential function per stop interval, stitched when there are
/// several. The stop list is padded to cover `[0 1]`.
fn register_stops(
    builder: &mut dyn DocumentBuilder,
    stops: &[GradientStop],
) -> Result<FunctionId, SvgError> {
    let mut padded = stops.to_vec();
    if let Some(first) = stops.first().filter(|s| s.offset > 0.0) {
        padded.insert(0, GradientStop { offset: 0.0, ..*first });
    }
    if let Some(last) = stops.last().filter(|s| s.offset < 1.0) {
        padded.push(GradientStop { offset: 1.0, ..*last });
    }

    let segments = padded
        .windows(2)
        .map(|pair| {
            builder.register_function(&InterpolationFunction::Exponential {
                c0: pair[0].color.components(),
                c1: pair[1].color.components(),
                exponent: 1.0,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let [single] = segments[..] {
        return Ok(single);
    }
    let bounds = padded[1..padded.len() - 1]
        .iter()
        .map(|s| s.offset as f32)
        .collect();
    let encode = segments.iter().flat_map(|_| [0.0, 1.0]).collect();
    Ok(builder.register_function(&InterpolationFunction::Stitching {
        functions: segments,
        bounds,
        encode,
    })?)
}
