//! Core rendering abstractions for PDF generation.
//!
//! This crate provides the pieces shared by the page renderer, the SVG
//! translator and the PDF backend:
//! - `DocumentBuilder` trait for allocating pages, images, patterns and outlines
//! - Error types for rendering operations
//! - Unit conversion, raster image loading and content-stream serialization

pub mod content;
pub mod encoding;
mod error;
pub mod image;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use traits::DocumentBuilder;
pub use types::{
    Destination, FunctionId, ImageData, InterpolationFunction, LinkAnnotation, LinkTarget,
    OutlineHandle, PageContent, PageHandle, PathPaint, RasterImage, ShadingGeometry,
    ShadingPattern, TilingPattern,
};
