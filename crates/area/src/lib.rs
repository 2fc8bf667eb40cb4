//! The positioned area tree.
//!
//! Layout has already happened when a tree reaches the renderer: every area
//! carries its final geometry in millipoints, with Y growing down from the
//! top of the page. The model deserializes from JSON so trees can be produced
//! by any layout engine.

pub mod area;
pub mod page;

pub use area::{
    Area, Background, Block, BoxStyle, Container, ForeignObject, GraphicSource, ImageArea,
    InlineSpace, Leader, Line, Position, RuleStyle, VectorGraphic, Word,
};
pub use page::{Anchor, AreaTree, BodyArea, LinkSet, LinkType, OutlineEntry, Page};
