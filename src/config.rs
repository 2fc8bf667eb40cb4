use crate::error::FolioError;
use folio_render_lopdf::RenderOptions;
use folio_traits::{FontDescriptor, InMemoryFontMetrics};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings for one rendering run. Every field may be left out of a
/// configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Version written to the PDF header.
    pub pdf_version: String,
    /// When false every word gets its own `Tm` and `TJ`.
    pub coalesce_text: bool,
    /// Font used for SVG text met before any word has selected one.
    pub default_font: String,
    /// Fonts registered with the document, by resource name.
    pub fonts: Vec<FontDescriptor>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pdf_version: "1.7".to_string(),
            coalesce_text: true,
            default_font: "F1".to_string(),
            fonts: InMemoryFontMetrics::standard_descriptors(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FolioError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            FolioError::Config(format!("Failed to read configuration '{}': {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), FolioError> {
        if self.fonts.is_empty() {
            return Err(FolioError::Config("at least one font must be registered".into()));
        }
        if !self.fonts.iter().any(|f| f.name == self.default_font) {
            return Err(FolioError::Config(format!(
                "default font '{}' is not among the registered fonts",
                self.default_font
            )));
        }
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            coalesce_text: self.coalesce_text,
            default_font: self.default_font.clone(),
        }
    }
}
