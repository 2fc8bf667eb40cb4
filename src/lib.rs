//! Folio renders positioned area trees, with embedded SVG, to PDF.
//!
//! The work is split across the workspace crates; this crate ties them into
//! a [`DocumentPipeline`] driven by a [`RenderConfig`] and re-exports the
//! pieces most callers need.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::RenderConfig;
pub use error::FolioError;
pub use pipeline::{DocumentPipeline, PipelineBuilder, load_tree, resource_base};

pub use folio_area as area;
pub use folio_render_core::{DocumentBuilder, RenderError};
pub use folio_render_lopdf::{LopdfBuilder, PageRenderer, RenderOptions};
pub use folio_svg as svg;
pub use folio_traits::{FilesystemResourceProvider, FontDescriptor, InMemoryResourceProvider, ResourceProvider};
pub use folio_types as types;
