//! SVG to PDF operator translation.
//!
//! Documents are parsed into a [`DocumentArena`] and lowered by a
//! [`GraphicsTranslator`] into `lopdf` content operations. Shadings, tiling
//! patterns and images are registered with the caller's
//! [`folio_render_core::DocumentBuilder`].

pub mod arc;
pub mod cond;
pub mod document;
mod error;
pub mod gradient;
pub mod parsers;
pub mod path;
pub mod shapes;
pub mod style;
mod text;
mod translator;

pub use document::{DocKey, DocumentArena, ElementKind, NodeId, NodeRef, SvgDocument, SvgNode};
pub use error::{SvgError, Unsupported};
pub use text::TextDefaults;
pub use translator::GraphicsTranslator;
