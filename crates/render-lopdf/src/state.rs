//! Per-page cursor, paint and text-run state.
//!
//! All positions are top-down millipoints; they are flipped into PDF space
//! only when an operand is emitted.

use folio_render_core::utils::{name, points};
use folio_types::{Color, Millipoints};
use lopdf::Object;
use lopdf::content::Operation;

/// Where a decoration line ended, so a following space can continue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationCarry {
    pub end_x: Millipoints,
    pub y: Millipoints,
    pub thickness: Millipoints,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationCarries {
    pub underline: Option<DecorationCarry>,
    pub overline: Option<DecorationCarry>,
    pub line_through: Option<DecorationCarry>,
}

/// Glyph strings and gaps waiting to be shown with one `TJ`.
#[derive(Debug, Default)]
struct TextRun {
    items: Vec<Object>,
}

#[derive(Debug)]
pub struct RenderState {
    pub page_height: Millipoints,
    pub x: Millipoints,
    pub y: Millipoints,
    /// Left edge of the innermost area container.
    pub container_x: Millipoints,
    pub font: Option<(String, Millipoints)>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub last_baseline: Millipoints,
    pub last_right: Millipoints,
    pub last_width: Millipoints,
    pub decorations: DecorationCarries,
    run: Option<TextRun>,
    text_block: bool,
    ops: Vec<Operation>,
}

impl RenderState {
    /// Starts a page: the operator buffer opens with `BT`.
    pub fn new(page_height: Millipoints) -> Self {
        Self {
            page_height,
            x: 0,
            y: 0,
            container_x: 0,
            font: None,
            fill: None,
            stroke: None,
            last_baseline: 0,
            last_right: 0,
            last_width: 0,
            decorations: DecorationCarries::default(),
            run: None,
            text_block: true,
            ops: vec![Operation::new("BT", vec![])],
        }
    }

    /// A flipped Y operand in points.
    pub fn pdf_y(&self, y: Millipoints) -> Object {
        points(self.page_height - y)
    }

    pub fn push(&mut self, operation: Operation) {
        self.ops.push(operation);
    }

    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.ops.extend(operations);
    }

    pub fn run_open(&self) -> bool {
        self.run.is_some()
    }

    /// Closes the open run, if any, with a `TJ`.
    pub fn flush_run(&mut self) {
        if let Some(run) = self.run.take() {
            if !run.items.is_empty() {
                self.ops.push(Operation::new("TJ", vec![Object::Array(run.items)]));
            }
        }
    }

    /// Flushes the run and leaves the text block so graphics can be drawn.
    pub fn leave_text(&mut self) {
        self.flush_run();
        if self.text_block {
            self.ops.push(Operation::new("ET", vec![]));
            self.text_block = false;
        }
    }

    pub fn enter_text(&mut self) {
        if !self.text_block {
            self.ops.push(Operation::new("BT", vec![]));
            self.text_block = true;
        }
    }

    /// Positions a new run at `(x, baseline)`.
    pub fn open_run(&mut self, x: Millipoints, baseline: Millipoints) {
        self.flush_run();
        self.enter_text();
        self.ops.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), points(x), self.pdf_y(baseline)],
        ));
        self.run = Some(TextRun::default());
        self.last_baseline = baseline;
    }

    /// Appends a string or a gap to the open run.
    pub fn append_to_run(&mut self, item: Object) {
        if let Some(run) = self.run.as_mut() {
            run.items.push(item);
        }
    }

    pub fn set_font(&mut self, font: &str, size: Millipoints) {
        if self.font.as_ref().is_some_and(|(f, s)| f == font && *s == size) {
            return;
        }
        self.flush_run();
        self.enter_text();
        self.ops.push(Operation::new("Tf", vec![name(font), points(size)]));
        self.font = Some((font.to_string(), size));
    }

    pub fn set_fill(&mut self, color: Color) {
        if self.fill == Some(color) {
            return;
        }
        self.flush_run();
        let [r, g, b] = color.components();
        self.ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        self.fill = Some(color);
    }

    pub fn set_stroke(&mut self, color: Color) {
        if self.stroke == Some(color) {
            return;
        }
        self.flush_run();
        let [r, g, b] = color.components();
        self.ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
        self.stroke = Some(color);
    }

    /// Forgets font and paint after content that may have changed them
    /// outside this state's knowledge.
    pub fn forget_paint(&mut self) {
        self.font = None;
        self.fill = None;
        self.stroke = None;
    }

    /// Closes everything still open and returns the page's operators. The
    /// stream always ends with `ET`, even when graphics were drawn last.
    pub fn finish(mut self) -> Vec<Operation> {
        self.flush_run();
        self.enter_text();
        self.leave_text();
        self.ops
    }
}
