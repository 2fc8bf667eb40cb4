use folio_types::{Color, Millipoints, Sides};
use serde::{Deserialize, Serialize};

/// How a container's origin relates to the flow it sits in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Placed at its own `x`/`y`, independent of the flow.
    Absolute,
    /// Offset from the flow position, which is restored afterwards.
    Relative,
    #[default]
    Static,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Background {
    pub color: Color,
    /// Only a background whose alpha reads as zero is painted.
    #[serde(default)]
    pub alpha: u8,
}

/// Padding, borders and background of a box.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BoxStyle {
    pub padding: Sides<Millipoints>,
    pub border_width: Sides<Millipoints>,
    pub border_color: Sides<Color>,
    pub background: Option<Background>,
}

/// A positioned area container. `x`, `y`, `width` and `height` describe the
/// content rectangle.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Container {
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub x: Millipoints,
    #[serde(default)]
    pub y: Millipoints,
    #[serde(default)]
    pub width: Millipoints,
    #[serde(default)]
    pub height: Millipoints,
    #[serde(default)]
    pub style: BoxStyle,
    #[serde(default)]
    pub children: Vec<Area>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Block {
    #[serde(default)]
    pub start_indent: Millipoints,
    #[serde(default)]
    pub width: Millipoints,
    pub height: Millipoints,
    #[serde(default)]
    pub style: BoxStyle,
    #[serde(default)]
    pub children: Vec<Area>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Line {
    #[serde(default)]
    pub start_indent: Millipoints,
    pub height: Millipoints,
    /// Distance from the top of the line to its baseline.
    pub placement_offset: Millipoints,
    #[serde(default)]
    pub children: Vec<Area>,
}

/// A run of glyphs with its width already measured by layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    /// Internal font resource name (`F1`, `F2`, ...).
    pub font: String,
    pub size: Millipoints,
    #[serde(default)]
    pub color: Color,
    pub width: Millipoints,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub overline: bool,
    #[serde(default)]
    pub line_through: bool,
}

impl Word {
    pub fn new(text: impl Into<String>, font: impl Into<String>, size: Millipoints, width: Millipoints) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            size,
            color: Color::BLACK,
            width,
            underline: false,
            overline: false,
            line_through: false,
        }
    }

    pub fn has_decoration(&self) -> bool {
        self.underline || self.overline || self.line_through
    }
}

/// Space between words. The flags continue the matching decoration of the
/// word before it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InlineSpace {
    pub size: Millipoints,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub overline: bool,
    #[serde(default)]
    pub line_through: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageArea {
    #[serde(default)]
    pub x_offset: Millipoints,
    pub width: Millipoints,
    pub height: Millipoints,
    /// URI resolved through the resource provider.
    pub source: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GraphicSource {
    /// An inline SVG document.
    Markup(String),
    /// An SVG document loaded through the resource provider.
    Uri(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VectorGraphic {
    #[serde(default)]
    pub x_offset: Millipoints,
    pub width: Millipoints,
    pub height: Millipoints,
    pub document: GraphicSource,
}

/// Inline content rendered in its own graphics state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForeignObject {
    #[serde(default)]
    pub x_offset: Millipoints,
    pub effective_width: Millipoints,
    pub child: Box<Area>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Leader {
    pub width: Millipoints,
    pub thickness: Millipoints,
    #[serde(default)]
    pub style: RuleStyle,
    #[serde(default)]
    pub color: Color,
}

/// Everything that can appear below a page's regions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Area {
    Container(Container),
    Block(Block),
    Line(Line),
    Word(Word),
    InlineSpace(InlineSpace),
    /// Vertical space between blocks.
    DisplaySpace { size: Millipoints },
    Image(ImageArea),
    ForeignObject(ForeignObject),
    VectorGraphic(VectorGraphic),
    Leader(Leader),
}
