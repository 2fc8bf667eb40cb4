//! PDF backend: turns positioned area trees into page content streams and
//! writes them with `lopdf`.
//!
//! [`PageRenderer`] walks the areas of each page, tracking the cursor and
//! the paint state in a [`RenderState`], and delegates embedded SVG to
//! `folio-svg`. [`LopdfBuilder`] is the streaming [`DocumentBuilder`]
//! the pages are handed to.
//!
//! [`DocumentBuilder`]: folio_render_core::DocumentBuilder

mod frame;
mod graphic;
mod links;
mod renderer;
mod state;
mod text;
mod writer;

pub use renderer::{PageRenderer, RenderOptions};
pub use state::{DecorationCarries, DecorationCarry, RenderState};
pub use writer::LopdfBuilder;
