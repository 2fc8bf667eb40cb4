//! Lowers SVG element trees to content-stream operators.
//!
//! Every rendered element is bracketed by `q`/`Q`. The translator mirrors the
//! graphics state stack: each level records the current transformation
//! matrix (needed to place shadings and tiling patterns, whose space is the
//! page's default space) and the last fill and stroke paint emitted, so a
//! paint is only re-emitted when it changes.

use crate::cond;
use crate::document::{DocKey, DocumentArena, ElementKind, NodeId, NodeRef, SvgDocument, SvgNode};
use crate::error::{SvgError, Unsupported};
use crate::gradient::{Gradient, Units};
use crate::parsers::{Length, PaintSpec, ViewBox, parse_length, parse_points, parse_transform, parse_view_box};
use crate::path::lower_path;
use crate::shapes::{self, Bounds, Outline};
use crate::style::{ComputedStyle, DrawingInstruction};
use crate::text::{SvgTextRenderer, TextDefaults};
use folio_render_core::content::encode_operations;
use folio_render_core::image::decode_raster;
use folio_render_core::utils::{name, real};
use folio_render_core::{DocumentBuilder, PathPaint, TilingPattern};
use folio_types::Matrix;
use lopdf::Object;
use lopdf::content::Operation;
use std::sync::Arc;

/// `use`, pattern and nested image references deeper than this are cut.
const MAX_NESTING: usize = 32;

#[derive(Debug, Clone)]
struct PaintState {
    ctm: Matrix,
    fill: Option<PathPaint>,
    stroke: Option<PathPaint>,
    viewport: (f64, f64),
}

/// Translates SVG documents of one arena into operators.
pub struct GraphicsTranslator<'a> {
    arena: &'a mut DocumentArena,
    builder: &'a mut dyn DocumentBuilder,
    text: TextDefaults,
    states: Vec<PaintState>,
    diagnostics: Vec<Unsupported>,
    depth: usize,
}

fn cm(matrix: &Matrix) -> Operation {
    Operation::new("cm", matrix.to_array().iter().map(|v| real(*v)).collect())
}

fn clip_rect(x: f64, y: f64, width: f64, height: f64, out: &mut Vec<Operation>) {
    out.push(shapes::move_to(x, y));
    out.push(shapes::line_to(x + width, y));
    out.push(shapes::line_to(x + width, y + height));
    out.push(shapes::line_to(x, y + height));
    out.push(Operation::new("h", vec![]));
    out.push(Operation::new("W", vec![]));
    out.push(Operation::new("n", vec![]));
}

/// Maps `view_box` into a `width` x `height` viewport.
///
/// Only `none` and the default centered `meet` alignment are honored.
fn view_box_transform(view_box: &ViewBox, width: f64, height: f64, aspect: Option<&str>) -> Matrix {
    let sx = width / view_box.width;
    let sy = height / view_box.height;
    if aspect.map(str::trim) == Some("none") {
        return Matrix::new(sx, 0.0, 0.0, sy, -view_box.x * sx, -view_box.y * sy);
    }
    let scale = sx.min(sy);
    let tx = (width - view_box.width * scale) / 2.0 - view_box.x * scale;
    let ty = (height - view_box.height * scale) / 2.0 - view_box.y * scale;
    Matrix::new(scale, 0.0, 0.0, scale, tx, ty)
}

fn length_attr(node: &SvgNode, name: &str, reference: f64, default: Length) -> Result<f64, SvgError> {
    let length = match node.attribute(name) {
        Some(value) => parse_length(name, value)?,
        None => default,
    };
    Ok(length.resolve(reference))
}

fn zero() -> Length {
    Length::User(0.0)
}

fn full() -> Length {
    Length::Percent(100.0)
}

impl<'a> GraphicsTranslator<'a> {
    /// `ctm` is the matrix already in effect where the output is placed;
    /// `viewport` is what percentage lengths refer to.
    pub fn new(
        arena: &'a mut DocumentArena,
        builder: &'a mut dyn DocumentBuilder,
        text: TextDefaults,
        ctm: Matrix,
        viewport: (f64, f64),
    ) -> Self {
        Self {
            arena,
            builder,
            text,
            states: vec![PaintState {
                ctm,
                fill: None,
                stroke: None,
                viewport,
            }],
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Features met during translation that were not rendered.
    pub fn diagnostics(&self) -> &[Unsupported] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Unsupported> {
        self.diagnostics
    }

    fn state(&self) -> &PaintState {
        // The base state is never popped.
        &self.states[self.states.len() - 1]
    }

    fn state_mut(&mut self) -> &mut PaintState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    fn save(&mut self, out: &mut Vec<Operation>) {
        out.push(Operation::new("q", vec![]));
        let top = self.state().clone();
        self.states.push(top);
    }

    fn restore(&mut self, out: &mut Vec<Operation>) {
        out.push(Operation::new("Q", vec![]));
        if self.states.len() > 1 {
            self.states.pop();
        }
    }

    fn concat(&mut self, matrix: &Matrix, out: &mut Vec<Operation>) {
        if matrix.is_identity() {
            return;
        }
        out.push(cm(matrix));
        let state = self.state_mut();
        state.ctm = state.ctm.pre_transform(matrix);
    }

    fn unsupported(&mut self, what: Unsupported) {
        log::warn!("Unsupported SVG feature: {}", what);
        self.diagnostics.push(what);
    }

    /// Renders a whole document into a `width` x `height` box at the origin.
    pub fn render_document(
        &mut self,
        doc: DocKey,
        width: f64,
        height: f64,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let document = self.arena.get(doc);
        let root = document.root();
        let node = document.node(root);
        if node.kind() != Some(&ElementKind::Svg) {
            return Err(SvgError::Reference("document root is not an <svg> element".into()));
        }
        let style = ComputedStyle::default().cascade(node)?;
        if style.display_none {
            return Ok(());
        }
        self.save(out);
        if let Some(value) = node.attribute("transform") {
            let transform = parse_transform("transform", value)?;
            self.concat(&transform, out);
        }
        self.viewport(node, width, height, out)?;
        self.render_children(NodeRef { doc, node: root }, &document, &style, out)?;
        self.restore(out);
        Ok(())
    }

    /// Renders one element (and its subtree) translated by the origin.
    ///
    /// Inherited properties are taken from the element's ancestors.
    pub fn render_element(
        &mut self,
        node: NodeRef,
        origin_x: f64,
        origin_y: f64,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let document = self.arena.get(node.doc);
        let mut chain = document.path_from_root(node.node);
        chain.pop();
        let inherited = chain
            .into_iter()
            .try_fold(ComputedStyle::default(), |style, id| style.cascade(document.node(id)))?;

        self.save(out);
        self.concat(&Matrix::translate(origin_x, origin_y), out);
        let result = self.render_node(node, &inherited, out);
        self.restore(out);
        result
    }

    /// Sets up the coordinate system of an `svg` element drawn in a
    /// `width` x `height` box: clip to the box, then map the viewBox.
    fn viewport(
        &mut self,
        node: &SvgNode,
        width: f64,
        height: f64,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        clip_rect(0.0, 0.0, width, height, out);
        match node.attribute("viewBox") {
            Some(value) => {
                let view_box = parse_view_box("viewBox", value)?;
                let mapping = view_box_transform(&view_box, width, height, node.attribute("preserveAspectRatio"));
                self.concat(&mapping, out);
                self.state_mut().viewport = (view_box.width, view_box.height);
            }
            None => self.state_mut().viewport = (width, height),
        }
        Ok(())
    }

    fn render_children(
        &mut self,
        parent: NodeRef,
        document: &SvgDocument,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        for child in document.node(parent.node).children() {
            self.render_node(NodeRef { doc: parent.doc, node: *child }, style, out)?;
        }
        Ok(())
    }

    fn render_node(
        &mut self,
        node_ref: NodeRef,
        parent: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let document = self.arena.get(node_ref.doc);
        let node = document.node(node_ref.node);
        let Some(kind) = node.kind() else {
            return Ok(());
        };
        match kind {
            ElementKind::Defs
            | ElementKind::LinearGradient
            | ElementKind::RadialGradient
            | ElementKind::Stop
            | ElementKind::Pattern
            | ElementKind::Symbol
            | ElementKind::Descriptive => return Ok(()),
            ElementKind::Unknown(tag) => {
                self.unsupported(Unsupported::Element(tag.clone()));
                return Ok(());
            }
            _ => {}
        }

        let style = parent.cascade(node)?;
        if style.display_none {
            return Ok(());
        }
        if node.has_attribute("clip-path") {
            self.unsupported(Unsupported::ClipPath);
        }
        if node.has_attribute("mask") {
            self.unsupported(Unsupported::Mask);
        }
        let transform = match node.attribute("transform") {
            Some(value) => parse_transform("transform", value)?,
            None => Matrix::identity(),
        };

        self.depth += 1;
        self.save(out);
        self.concat(&transform, out);
        let result = self.render_kind(node_ref, &document, kind, &style, out);
        self.restore(out);
        self.depth -= 1;
        result
    }

    fn render_kind(
        &mut self,
        node_ref: NodeRef,
        document: &Arc<SvgDocument>,
        kind: &ElementKind,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let node = document.node(node_ref.node);
        let (vw, vh) = self.state().viewport;
        let diagonal = ((vw * vw + vh * vh) / 2.0).sqrt();

        match kind {
            ElementKind::Group | ElementKind::Anchor => {
                self.render_children(node_ref, document, style, out)
            }
            ElementKind::Switch => {
                let chosen = node.children().iter().copied().find(|child| {
                    let candidate = document.node(*child);
                    candidate.kind().is_some() && cond::passes(candidate)
                });
                match chosen {
                    Some(child) => self.render_node(NodeRef { doc: node_ref.doc, node: child }, style, out),
                    None => Ok(()),
                }
            }
            ElementKind::Svg => {
                let x = length_attr(node, "x", vw, zero())?;
                let y = length_attr(node, "y", vh, zero())?;
                let width = length_attr(node, "width", vw, full())?;
                let height = length_attr(node, "height", vh, full())?;
                if width <= 0.0 || height <= 0.0 {
                    return Ok(());
                }
                self.concat(&Matrix::translate(x, y), out);
                self.viewport(node, width, height, out)?;
                self.render_children(node_ref, document, style, out)
            }
            ElementKind::Rect => {
                let outline = shapes::rect(
                    length_attr(node, "x", vw, zero())?,
                    length_attr(node, "y", vh, zero())?,
                    length_attr(node, "width", vw, zero())?,
                    length_attr(node, "height", vh, zero())?,
                    length_attr(node, "rx", vw, zero())?,
                    length_attr(node, "ry", vh, zero())?,
                );
                self.draw_optional(node_ref.doc, outline, style, true, out)
            }
            ElementKind::Circle => {
                let outline = shapes::circle(
                    length_attr(node, "cx", vw, zero())?,
                    length_attr(node, "cy", vh, zero())?,
                    length_attr(node, "r", diagonal, zero())?,
                );
                self.draw_optional(node_ref.doc, outline, style, true, out)
            }
            ElementKind::Ellipse => {
                let outline = shapes::ellipse(
                    length_attr(node, "cx", vw, zero())?,
                    length_attr(node, "cy", vh, zero())?,
                    length_attr(node, "rx", vw, zero())?,
                    length_attr(node, "ry", vh, zero())?,
                );
                self.draw_optional(node_ref.doc, outline, style, true, out)
            }
            ElementKind::Line => {
                let outline = shapes::line(
                    length_attr(node, "x1", vw, zero())?,
                    length_attr(node, "y1", vh, zero())?,
                    length_attr(node, "x2", vw, zero())?,
                    length_attr(node, "y2", vh, zero())?,
                );
                // Lines are never filled.
                self.draw_shape(node_ref.doc, &outline, style, false, out)
            }
            ElementKind::Polyline | ElementKind::Polygon => {
                let points = match node.attribute("points") {
                    Some(value) => parse_points("points", value)?,
                    None => Vec::new(),
                };
                let outline = shapes::poly(&points, *kind == ElementKind::Polygon);
                self.draw_optional(node_ref.doc, outline, style, true, out)
            }
            ElementKind::Path => {
                let lowered = lower_path(node.attribute("d").unwrap_or_default());
                for diagnostic in lowered.diagnostics {
                    self.diagnostics.push(diagnostic);
                }
                self.draw_optional(node_ref.doc, lowered.outline, style, true, out)
            }
            ElementKind::Text => SvgTextRenderer::new(&self.text, (vw, vh)).render(
                self.arena,
                node_ref.doc,
                node_ref.node,
                style,
                out,
            ),
            ElementKind::Use => self.use_element(node_ref, node, style, out),
            ElementKind::Image => self.image(node_ref, node, style, out),
            ElementKind::TSpan | ElementKind::TRef => {
                log::debug!("{:?} outside of text ignored", kind);
                Ok(())
            }
            ElementKind::Defs
            | ElementKind::LinearGradient
            | ElementKind::RadialGradient
            | ElementKind::Stop
            | ElementKind::Pattern
            | ElementKind::Symbol
            | ElementKind::Descriptive
            | ElementKind::Unknown(_) => Ok(()),
        }
    }

    fn draw_optional(
        &mut self,
        doc: DocKey,
        outline: Option<Outline>,
        style: &ComputedStyle,
        fillable: bool,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        match outline {
            Some(outline) => self.draw_shape(doc, &outline, style, fillable, out),
            None => Ok(()),
        }
    }

    fn draw_shape(
        &mut self,
        doc: DocKey,
        outline: &Outline,
        style: &ComputedStyle,
        fillable: bool,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let fill = if fillable {
            self.resolve_paint(doc, &style.fill, style, outline.bounds)?
        } else {
            None
        };
        let stroke = self.resolve_paint(doc, &style.stroke, style, outline.bounds)?;
        if fill.is_none() && stroke.is_none() {
            return Ok(());
        }

        let instruction = DrawingInstruction::new(style, fill.is_some(), stroke.is_some());
        if let Some(paint) = fill {
            self.set_paint(paint, true, out);
        }
        if let Some(paint) = stroke {
            self.set_paint(paint, false, out);
            out.extend(instruction.line_style_operations());
        }
        out.extend(outline.ops.iter().cloned());
        out.push(Operation::new(instruction.painting_operator(), vec![]));
        Ok(())
    }

    /// Emits a paint operator unless the same paint is already current.
    fn set_paint(&mut self, paint: PathPaint, fill: bool, out: &mut Vec<Operation>) {
        let state = self.state_mut();
        let current = if fill { &mut state.fill } else { &mut state.stroke };
        if current.as_ref() == Some(&paint) {
            return;
        }
        match &paint {
            PathPaint::Solid(color) => {
                let [r, g, b] = color.components();
                let operator = if fill { "rg" } else { "RG" };
                out.push(Operation::new(
                    operator,
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ));
            }
            PathPaint::Pattern(pattern) => {
                let (space, select) = if fill { ("cs", "scn") } else { ("CS", "SCN") };
                out.push(Operation::new(space, vec![name("Pattern")]));
                out.push(Operation::new(select, vec![name(pattern.as_ref())]));
            }
        }
        *current = Some(paint);
    }

    fn resolve_paint(
        &mut self,
        doc: DocKey,
        spec: &PaintSpec,
        style: &ComputedStyle,
        bounds: Bounds,
    ) -> Result<Option<PathPaint>, SvgError> {
        match spec {
            PaintSpec::None => Ok(None),
            PaintSpec::Color(color) => Ok(Some(PathPaint::Solid(*color))),
            PaintSpec::CurrentColor => Ok(Some(PathPaint::Solid(style.color))),
            PaintSpec::Url(reference, fallback) => {
                let fallback = |translator: &mut Self| match fallback.as_deref() {
                    Some(spec) => translator.resolve_paint(doc, spec, style, bounds),
                    None => Ok(None),
                };
                let target = match self.arena.resolve(doc, reference) {
                    Ok(target) => target,
                    Err(e) => {
                        log::warn!("Paint server '{}' not resolved: {}", reference, e);
                        return fallback(self);
                    }
                };
                let target_doc = self.arena.get(target.doc);
                match target_doc.node(target.node).kind() {
                    Some(ElementKind::LinearGradient | ElementKind::RadialGradient) => {
                        let gradient = Gradient::resolve(self.arena, target, &mut self.diagnostics)?;
                        let state = self.state();
                        let (ctm, viewport) = (state.ctm, state.viewport);
                        gradient.paint(self.builder, bounds, &ctm, viewport)
                    }
                    Some(ElementKind::Pattern) => self.tiling_pattern(target, bounds),
                    _ => {
                        log::warn!("'{}' is not a paint server", reference);
                        fallback(self)
                    }
                }
            }
        }
    }

    /// Renders a `pattern` element into its own stream and registers it.
    fn tiling_pattern(&mut self, target: NodeRef, bounds: Bounds) -> Result<Option<PathPaint>, SvgError> {
        if self.depth >= MAX_NESTING {
            log::warn!("Pattern nesting too deep, pattern dropped");
            return Ok(None);
        }
        let document = self.arena.get(target.doc);
        let node = document.node(target.node);
        let (vw, vh) = self.state().viewport;

        if node.has_attribute("viewBox") {
            self.unsupported(Unsupported::PatternViewBox);
        }
        let units = Units::parse("patternUnits", node.attribute("patternUnits"))?;
        let content_units = match node.attribute("patternContentUnits") {
            None => Units::UserSpaceOnUse,
            value => Units::parse("patternContentUnits", value)?,
        };
        let (x, y, width, height) = match units {
            Units::ObjectBoundingBox => (
                bounds.x + length_attr(node, "x", 1.0, zero())? * bounds.width,
                bounds.y + length_attr(node, "y", 1.0, zero())? * bounds.height,
                length_attr(node, "width", 1.0, zero())? * bounds.width,
                length_attr(node, "height", 1.0, zero())? * bounds.height,
            ),
            Units::UserSpaceOnUse => (
                length_attr(node, "x", vw, zero())?,
                length_attr(node, "y", vh, zero())?,
                length_attr(node, "width", vw, zero())?,
                length_attr(node, "height", vh, zero())?,
            ),
        };
        if width <= 0.0 || height <= 0.0 {
            return Ok(None);
        }
        let pattern_transform = match node.attribute("patternTransform") {
            Some(value) => parse_transform("patternTransform", value)?,
            None => Matrix::identity(),
        };
        let matrix = Matrix::multiply(
            &Matrix::multiply(&Matrix::translate(x, y), &pattern_transform),
            &self.state().ctm,
        );

        // Children come from the pattern itself, or from one href level.
        let mut content_ref = target;
        if !node.children().iter().any(|c| document.node(*c).kind().is_some()) {
            if let Some(href) = node.attribute("href") {
                match self.arena.resolve(target.doc, href) {
                    Ok(base) => content_ref = base,
                    Err(e) => log::warn!("Pattern reference '{}' not resolved: {}", href, e),
                }
            }
        }
        let content_doc = self.arena.get(content_ref.doc);
        let style = self.inherited_style(&content_doc, content_ref.node)?;

        let mut cell = Vec::new();
        self.states.push(PaintState {
            ctm: Matrix::identity(),
            fill: None,
            stroke: None,
            viewport: (vw, vh),
        });
        self.depth += 1;
        if content_units == Units::ObjectBoundingBox {
            self.concat(&Matrix::scale(bounds.width, bounds.height), &mut cell);
        }
        let rendered = self.render_children(content_ref, &content_doc, &style, &mut cell);
        self.depth -= 1;
        self.states.pop();
        rendered?;

        let pattern = TilingPattern {
            bbox: [0.0, 0.0, width, height],
            x_step: width,
            y_step: height,
            matrix,
            content: encode_operations(&cell),
        };
        Ok(Some(PathPaint::Pattern(self.builder.register_tiling_pattern(pattern)?)))
    }

    /// The computed style of `node` including its own declarations.
    fn inherited_style(&self, document: &SvgDocument, node: NodeId) -> Result<ComputedStyle, SvgError> {
        document
            .path_from_root(node)
            .into_iter()
            .try_fold(ComputedStyle::default(), |style, id| style.cascade(document.node(id)))
    }

    fn use_element(
        &mut self,
        node_ref: NodeRef,
        node: &SvgNode,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let Some(href) = node.attribute("href") else {
            log::warn!("Use Element: no reference given");
            return Ok(());
        };
        if self.depth >= MAX_NESTING {
            log::warn!("Use Element: nesting too deep at '{}'", href);
            return Ok(());
        }
        let target = match self.arena.resolve(node_ref.doc, href) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("Use Element: ref not found '{}': {}", href, e);
                return Ok(());
            }
        };

        let (vw, vh) = self.state().viewport;
        let x = length_attr(node, "x", vw, zero())?;
        let y = length_attr(node, "y", vh, zero())?;
        let target_doc = self.arena.get(target.doc);
        let target_node = target_doc.node(target.node);

        if target_node.kind() != Some(&ElementKind::Symbol) {
            self.concat(&Matrix::translate(x, y), out);
            return self.render_node(target, style, out);
        }

        let view_box = match target_node.attribute("viewBox") {
            Some(value) => Some(parse_view_box("viewBox", value)?),
            None => None,
        };
        let width = length_attr(node, "width", vw, view_box.map_or(full(), |vb| Length::User(vb.width)))?;
        let height = length_attr(node, "height", vh, view_box.map_or(full(), |vb| Length::User(vb.height)))?;
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }

        clip_rect(x, y, width, height, out);
        match view_box {
            Some(vb) => {
                let sx = width / vb.width;
                let sy = height / vb.height;
                self.concat(&Matrix::new(sx, 0.0, 0.0, sy, x - vb.x * sx, y - vb.y * sy), out);
                self.state_mut().viewport = (vb.width, vb.height);
            }
            None => {
                self.concat(&Matrix::translate(x, y), out);
                self.state_mut().viewport = (width, height);
            }
        }
        let symbol_style = style.cascade(target_node)?;
        self.render_children(target, &target_doc, &symbol_style, out)
    }

    fn image(
        &mut self,
        node_ref: NodeRef,
        node: &SvgNode,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let (vw, vh) = self.state().viewport;
        let x = length_attr(node, "x", vw, zero())?;
        let y = length_attr(node, "y", vh, zero())?;
        let width = length_attr(node, "width", vw, zero())?;
        let height = length_attr(node, "height", vh, zero())?;
        let Some(href) = node.attribute("href") else {
            log::warn!("Image without href ignored");
            return Ok(());
        };
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }

        let locator = href.split('#').next().unwrap_or_default();
        if locator.to_ascii_lowercase().ends_with(".svg") {
            if self.depth >= MAX_NESTING {
                log::warn!("Image nesting too deep at '{}'", href);
                return Ok(());
            }
            let target = match self.arena.resolve(node_ref.doc, href) {
                Ok(target) => target,
                Err(e) => {
                    log::warn!("SVG image '{}' not loaded: {}", href, e);
                    return Ok(());
                }
            };
            let target_doc = self.arena.get(target.doc);
            let root = target_doc.node(target.node);
            self.concat(&Matrix::translate(x, y), out);
            self.viewport(root, width, height, out)?;
            let nested_style = style.cascade(root)?;
            return self.render_children(target, &target_doc, &nested_style, out);
        }

        let bytes = match self.arena.load_resource(href) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Image '{}' not loaded: {}", href, e);
                return Ok(());
            }
        };
        let raster = match decode_raster(&bytes) {
            Ok(raster) => raster,
            Err(e) => {
                log::warn!("Image '{}' not decoded: {}", href, e);
                return Ok(());
            }
        };
        let resource = self.builder.register_image(&raster)?;
        out.push(Operation::new("q", vec![]));
        out.push(cm(&Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 2.0 * y + height)));
        out.push(cm(&Matrix::new(width, 0.0, 0.0, height, x, y)));
        out.push(Operation::new("Do", vec![name(resource.as_ref())]));
        out.push(Operation::new("Q", vec![]));
        Ok(())
    }
}
