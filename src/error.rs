use folio_render_core::RenderError;
use thiserror::Error;

/// Everything that can stop a document from being produced.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid area tree or configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
