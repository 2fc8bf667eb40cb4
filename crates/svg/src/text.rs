//! SVG `text`, `tspan` and `tref`.
//!
//! Text is placed with a `1 0 0 -1 x y Tm` so glyphs stand upright in the
//! flipped SVG space. Glyph advances come from the viewer: absolute `x`
//! restarts the line with a new text matrix, `y` alone and `dy` become text
//! rise, and `dx` becomes a `TJ` adjustment.

use crate::document::{DocKey, DocumentArena, ElementKind, NodeId, SvgDocument, SvgNode};
use crate::error::SvgError;
use crate::parsers::{PaintSpec, parse_length_list};
use crate::style::ComputedStyle;
use folio_render_core::encoding::winansi_byte;
use folio_render_core::utils::{name, real};
use folio_types::Color;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Font used for SVG text when the document does not say otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefaults {
    /// Internal font resource name, e.g. `F1`.
    pub font: String,
    pub size: f64,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font: "F1".to_string(),
            size: 12.0,
        }
    }
}

fn text_color(style: &ComputedStyle) -> Option<Color> {
    match &style.fill {
        PaintSpec::None => None,
        PaintSpec::Color(c) => Some(*c),
        PaintSpec::CurrentColor => Some(style.color),
        PaintSpec::Url(reference, fallback) => {
            log::warn!("Paint server '{}' on text is not supported, using fallback", reference);
            match fallback.as_deref() {
                Some(PaintSpec::Color(c)) => Some(*c),
                Some(PaintSpec::None) => None,
                _ => Some(style.color),
            }
        }
    }
}

/// Maps text to single-byte codes; characters above U+00FF become `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match winansi_byte(c) {
            Some(byte) => byte,
            None => {
                log::warn!("Character {:?} cannot be shown in SVG text, replaced with '?'", c);
                b'?'
            }
        })
        .collect()
}

fn first_length(
    node: &SvgNode,
    attribute: &str,
    reference: f64,
) -> Result<Option<f64>, SvgError> {
    match node.attribute(attribute) {
        Some(value) => Ok(parse_length_list(attribute, value)?
            .first()
            .map(|l| l.resolve(reference))),
        None => Ok(None),
    }
}

pub(crate) struct SvgTextRenderer<'a> {
    defaults: &'a TextDefaults,
    viewport: (f64, f64),
    font_size: f64,
    fill: Option<Color>,
    line_x: f64,
    line_y: f64,
    rise: f64,
    /// Whether any glyph has been shown in this text element.
    shown: bool,
    pending_space: bool,
}

impl<'a> SvgTextRenderer<'a> {
    pub(crate) fn new(defaults: &'a TextDefaults, viewport: (f64, f64)) -> Self {
        Self {
            defaults,
            viewport,
            font_size: defaults.size,
            fill: None,
            line_x: 0.0,
            line_y: 0.0,
            rise: 0.0,
            shown: false,
            pending_space: false,
        }
    }

    /// Renders the `text` element `node`, whose style is already cascaded.
    pub(crate) fn render(
        mut self,
        arena: &mut DocumentArena,
        doc_key: DocKey,
        node: NodeId,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let doc = arena.get(doc_key);
        let element = doc.node(node);
        self.font_size = style.font_size.unwrap_or(self.defaults.size);
        self.fill = text_color(style);
        self.line_x = first_length(element, "x", self.viewport.0)?.unwrap_or(0.0);
        self.line_y = first_length(element, "y", self.viewport.1)?.unwrap_or(0.0);

        out.push(Operation::new("BT", vec![]));
        out.push(self.font_operation());
        out.push(Operation::new(
            "Tr",
            vec![Object::Integer(if self.fill.is_some() { 0 } else { 3 })],
        ));
        if let Some(color) = self.fill {
            out.push(fill_operation(color));
        }
        out.push(self.matrix_operation());
        self.render_children(arena, &doc, doc_key, node, style, out)?;
        out.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn font_operation(&self) -> Operation {
        Operation::new("Tf", vec![name(&self.defaults.font), real(self.font_size)])
    }

    fn matrix_operation(&self) -> Operation {
        Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(-1),
                real(self.line_x),
                real(self.line_y),
            ],
        )
    }

    fn render_children(
        &mut self,
        arena: &mut DocumentArena,
        doc: &SvgDocument,
        doc_key: DocKey,
        node: NodeId,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        for child in doc.node(node).children() {
            let child_node = doc.node(*child);
            match child_node.kind() {
                None => {
                    if let Some(text) = child_node.text() {
                        self.show(text, style.preserve_space, out);
                    }
                }
                Some(ElementKind::TSpan) => {
                    let span_style = style.cascade(child_node)?;
                    if span_style.display_none {
                        continue;
                    }
                    self.span(arena, doc, doc_key, *child, &span_style, out)?;
                }
                Some(ElementKind::TRef) => {
                    let span_style = style.cascade(child_node)?;
                    let Some(href) = child_node.attribute("href") else {
                        continue;
                    };
                    match arena.resolve(doc_key, href) {
                        Ok(target) => {
                            let target_doc = arena.get(target.doc);
                            let text = collect_text(&target_doc, target.node);
                            self.position(child_node, out)?;
                            self.show(&text, span_style.preserve_space, out);
                        }
                        Err(e) => log::warn!("tref target '{}' not resolved: {}", href, e),
                    }
                }
                Some(other) => log::debug!("Ignoring {:?} inside text", other),
            }
        }
        Ok(())
    }

    fn span(
        &mut self,
        arena: &mut DocumentArena,
        doc: &SvgDocument,
        doc_key: DocKey,
        node: NodeId,
        style: &ComputedStyle,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let parent_size = self.font_size;
        let parent_fill = self.fill;

        let size = style.font_size.unwrap_or(self.defaults.size);
        if size != self.font_size {
            self.font_size = size;
            out.push(self.font_operation());
        }
        let fill = text_color(style);
        if fill != self.fill {
            self.switch_fill(fill, out);
        }

        self.position(doc.node(node), out)?;
        self.render_children(arena, doc, doc_key, node, style, out)?;

        if self.font_size != parent_size {
            self.font_size = parent_size;
            out.push(self.font_operation());
        }
        if self.fill != parent_fill {
            self.switch_fill(parent_fill, out);
        }
        Ok(())
    }

    fn switch_fill(&mut self, fill: Option<Color>, out: &mut Vec<Operation>) {
        match fill {
            Some(color) => {
                if self.fill.is_none() {
                    out.push(Operation::new("Tr", vec![Object::Integer(0)]));
                }
                out.push(fill_operation(color));
            }
            None => out.push(Operation::new("Tr", vec![Object::Integer(3)])),
        }
        self.fill = fill;
    }

    /// Applies the `x`, `y`, `dx` and `dy` of a span.
    fn position(
        &mut self,
        node: &SvgNode,
        out: &mut Vec<Operation>,
    ) -> Result<(), SvgError> {
        let x = first_length(node, "x", self.viewport.0)?;
        let y = first_length(node, "y", self.viewport.1)?;
        let dx = first_length(node, "dx", self.viewport.0)?;
        let dy = first_length(node, "dy", self.viewport.1)?;

        match (x, y) {
            (Some(x), y) => {
                self.line_x = x;
                if let Some(y) = y {
                    self.line_y = y;
                    self.set_rise(0.0, out);
                }
                out.push(self.matrix_operation());
                self.pending_space = false;
            }
            (None, Some(y)) => self.set_rise(self.line_y - y, out),
            (None, None) => {}
        }
        if let Some(dx) = dx.filter(|dx| *dx != 0.0) {
            out.push(Operation::new(
                "TJ",
                vec![Object::Array(vec![real(-dx * 1000.0 / self.font_size)])],
            ));
        }
        if let Some(dy) = dy.filter(|dy| *dy != 0.0) {
            self.set_rise(self.rise - dy, out);
        }
        Ok(())
    }

    fn set_rise(&mut self, rise: f64, out: &mut Vec<Operation>) {
        if rise != self.rise {
            self.rise = rise;
            out.push(Operation::new("Ts", vec![real(rise)]));
        }
    }

    fn show(&mut self, text: &str, preserve: bool, out: &mut Vec<Operation>) {
        let shown = if preserve {
            text.replace(['\n', '\r', '\t'], " ")
        } else {
            self.collapse(text)
        };
        if shown.is_empty() {
            return;
        }
        self.shown = true;
        out.push(Operation::new(
            "Tj",
            vec![Object::String(encode(&shown), StringFormat::Literal)],
        ));
    }

    /// Default `xml:space` handling: newlines vanish, whitespace runs become
    /// one space, and leading or trailing space of the whole element is
    /// dropped. A space is only written once more text follows it.
    fn collapse(&mut self, text: &str) -> String {
        let mut collapsed = String::with_capacity(text.len());
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            if c == ' ' || c == '\t' {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && (self.shown || !collapsed.is_empty()) {
                collapsed.push(' ');
            }
            self.pending_space = false;
            collapsed.push(c);
        }
        collapsed
    }
}

fn fill_operation(color: Color) -> Operation {
    let [r, g, b] = color.components();
    Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

/// All character data below `node`, in document order.
fn collect_text(doc: &SvgDocument, node: NodeId) -> String {
    let mut text = String::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        let n = doc.node(current);
        if let Some(chunk) = n.text() {
            text.push_str(chunk);
        }
        stack.extend(n.children().iter().rev());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn render(markup: &str) -> Vec<Operation> {
        let mut arena = DocumentArena::new();
        let doc = Arc::new(SvgDocument::parse(markup).unwrap());
        let text = doc.lookup("t").unwrap();
        let style = doc
            .path_from_root(text)
            .into_iter()
            .try_fold(ComputedStyle::default(), |s, n| s.cascade(doc.node(n)))
            .unwrap();
        let key = arena.insert(doc);
        let defaults = TextDefaults::default();
        let mut out = Vec::new();
        SvgTextRenderer::new(&defaults, (100.0, 100.0))
            .render(&mut arena, key, text, &style, &mut out)
            .unwrap();
        out
    }

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operator.as_str()).collect()
    }

    fn strings(ops: &[Operation]) -> Vec<Vec<u8>> {
        ops.iter()
            .filter(|o| o.operator == "Tj")
            .map(|o| match &o.operands[0] {
                Object::String(bytes, _) => bytes.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn simple_text_is_bracketed_and_flipped() {
        let ops = render(r#"<svg><text id="t" x="10" y="20">Hi</text></svg>"#);
        assert_eq!(operators(&ops), ["BT", "Tf", "Tr", "rg", "Tm", "Tj", "ET"]);
        assert_eq!(
            ops[4].operands,
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(-1),
                Object::Real(10.0),
                Object::Real(20.0)
            ]
        );
        assert_eq!(ops[1].operands[1], Object::Real(12.0));
    }

    #[test]
    fn whitespace_collapses_across_spans() {
        let ops = render(
            "<svg><text id=\"t\">\n   Hello  <tspan> big </tspan>\n world  </text></svg>",
        );
        assert_eq!(
            strings(&ops),
            vec![b"Hello".to_vec(), b" big".to_vec(), b" world".to_vec()]
        );
    }

    #[test]
    fn preserve_keeps_spaces() {
        let ops = render(r#"<svg><text id="t" xml:space="preserve">  a  b </text></svg>"#);
        assert_eq!(strings(&ops), vec![b"  a  b ".to_vec()]);
    }

    #[test]
    fn span_positioning() {
        let ops = render(
            r#"<svg><text id="t" x="5" y="50">a<tspan x="30">b</tspan><tspan dx="6" dy="2" font-size="20">c</tspan>d</text></svg>"#,
        );
        assert_eq!(
            operators(&ops),
            ["BT", "Tf", "Tr", "rg", "Tm", "Tj", "Tm", "Tj", "Tf", "TJ", "Ts", "Tj", "Tf", "Tj", "ET"]
        );
        // dx in thousandths of the span's font size.
        assert_eq!(ops[9].operands[0], Object::Array(vec![Object::Real(-300.0)]));
        assert_eq!(ops[10].operands[0], Object::Real(-2.0));
    }

    #[test]
    fn characters_outside_winansi_are_replaced() {
        let ops = render("<svg><text id=\"t\">\u{e9}\u{4e2d}</text></svg>");
        assert_eq!(strings(&ops), vec![vec![0xe9, b'?']]);

        let ops = render("<svg><text id=\"t\">\u{201c}1\u{2013}2\u{20ac}\u{201d}</text></svg>");
        assert_eq!(strings(&ops), vec![vec![0x93, b'1', 0x96, b'2', 0x80, 0x94]]);
    }

    #[test]
    fn fill_none_is_invisible() {
        let ops = render(r#"<svg><text id="t" fill="none">x</text></svg>"#);
        assert_eq!(ops[2].operands[0], Object::Integer(3));
        assert!(!operators(&ops).contains(&"rg"));
    }

    #[test]
    fn tref_shows_target_text() {
        let ops = render(
            r##"<svg><defs><text id="src">Referenced</text></defs><text id="t"><tref href="#src"/></text></svg>"##,
        );
        assert_eq!(strings(&ops), vec![b"Referenced".to_vec()]);
    }
}
