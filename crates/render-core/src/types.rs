use folio_types::{Color, Matrix, ResourceName};

/// Handle to an interpolation function registered with the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// Index of a finished page, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutlineHandle(pub usize);

/// How a path is painted: a flat color or a registered pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PathPaint {
    Solid(Color),
    Pattern(ResourceName),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// A baseline JPEG stream, embedded as-is.
    Jpeg(Vec<u8>),
    /// Raw 8-bit RGB samples, row major.
    Rgb(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

/// A color function over the unit domain `[0 1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationFunction {
    /// Blends `c0` into `c1`.
    Exponential { c0: [f32; 3], c1: [f32; 3], exponent: f32 },
    /// Splits the domain at `bounds` and delegates to `functions`.
    Stitching {
        functions: Vec<FunctionId>,
        bounds: Vec<f32>,
        encode: Vec<f32>,
    },
}

/// Shading coordinates in gradient space; the pattern matrix maps them to
/// the page's default space.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadingGeometry {
    /// `[x0 y0 x1 y1]`
    Axial([f64; 4]),
    /// `[x0 y0 r0 x1 y1 r1]`
    Radial([f64; 6]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadingPattern {
    pub geometry: ShadingGeometry,
    pub matrix: Matrix,
    pub function: FunctionId,
    pub extend: [bool; 2],
}

/// A colored tiling pattern whose cell content is a finished operator stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingPattern {
    pub bbox: [f64; 4],
    pub x_step: f64,
    pub y_step: f64,
    pub matrix: Matrix,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// A position on a page of this document; `y` is in PDF space, points.
    Internal { page: usize, y: f32 },
    External(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    /// `[llx lly urx ury]` in points.
    pub rect: [f32; 4],
    pub target: LinkTarget,
}

/// A complete page handed to the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub width: f32,
    pub height: f32,
    pub content: Vec<u8>,
    pub annotations: Vec<LinkAnnotation>,
}

/// An outline entry's target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub page: PageHandle,
    /// Y of the destination in PDF space, points.
    pub top: f32,
}
