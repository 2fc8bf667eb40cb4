use folio_render_core::RenderError;
use folio_traits::ResourceError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvgError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Invalid value for '{name}': {value}")]
    Attribute { name: String, value: String },
    #[error("Unresolved reference: {0}")]
    Reference(String),
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("Builder error: {0}")]
    Builder(#[from] RenderError),
}

impl SvgError {
    pub fn attribute(name: &str, value: &str) -> Self {
        SvgError::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// A builder I/O failure aborts the document; anything else only loses
    /// the graphic being translated.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SvgError::Builder(e) if e.is_fatal())
    }
}

impl From<SvgError> for RenderError {
    fn from(err: SvgError) -> Self {
        match err {
            SvgError::Builder(inner) => inner,
            other => RenderError::Graphic(other.to_string()),
        }
    }
}

/// Input the translator recognizes but does not render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    PathCommand(char),
    HrefChain(String),
    ClipPath,
    Mask,
    SpreadMethod(String),
    PatternViewBox,
    Element(String),
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::PathCommand(c) => write!(f, "path command '{}'", c),
            Unsupported::HrefChain(id) => write!(f, "href chain longer than one level at '{}'", id),
            Unsupported::ClipPath => write!(f, "clip-path"),
            Unsupported::Mask => write!(f, "mask"),
            Unsupported::SpreadMethod(m) => write!(f, "spreadMethod '{}' (rendered as pad)", m),
            Unsupported::PatternViewBox => write!(f, "viewBox on pattern"),
            Unsupported::Element(name) => write!(f, "element <{}>", name),
        }
    }
}
