use folio_traits::ResourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Character {character:?} cannot be encoded with font '{font}'")]
    Encoding { font: String, character: char },
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
    #[error("Vector graphic error: {0}")]
    Graphic(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl RenderError {
    /// Errors that must abort the whole document rather than one element.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Io(_) | RenderError::Pdf(_))
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}
