//! Area tree in, PDF out.
//!
//! [`PipelineBuilder`] collects the configuration and the resource provider;
//! the resulting [`DocumentPipeline`] can render any number of trees.
//!
//! ```ignore
//! use folio::PipelineBuilder;
//!
//! let pipeline = PipelineBuilder::new().with_resource_dir("assets").build();
//! pipeline.generate_to_file("tree.json", "out.pdf")?;
//! ```

use crate::config::RenderConfig;
use crate::error::FolioError;
use folio_area::AreaTree;
use folio_render_lopdf::{LopdfBuilder, PageRenderer};
use folio_traits::{FilesystemResourceProvider, InMemoryFontMetrics, InMemoryResourceProvider, ResourceProvider};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: RenderConfig,
    resources: Option<Arc<dyn ResourceProvider>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves images and SVG documents referenced by URI against `path`.
    pub fn with_resource_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resources = Some(Arc::new(FilesystemResourceProvider::new(path)));
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Without a resource provider only inline SVG markup renders.
    pub fn build(self) -> DocumentPipeline {
        let resources = self
            .resources
            .unwrap_or_else(|| Arc::new(InMemoryResourceProvider::new()));
        let fonts = Arc::new(InMemoryFontMetrics::new(&self.config.fonts));
        DocumentPipeline {
            config: self.config,
            fonts,
            resources,
        }
    }
}

#[derive(Debug)]
pub struct DocumentPipeline {
    config: RenderConfig,
    fonts: Arc<InMemoryFontMetrics>,
    resources: Arc<dyn ResourceProvider>,
}

impl DocumentPipeline {
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Writes `tree` as a complete PDF into `writer` and hands it back.
    pub fn render<W: Write + Seek>(&self, tree: &AreaTree, writer: W) -> Result<W, FolioError> {
        let mut builder = LopdfBuilder::new(writer, &self.config.pdf_version, &self.config.fonts)?;
        let mut renderer = PageRenderer::with_options(
            self.fonts.clone(),
            Arc::clone(&self.resources),
            self.config.render_options(),
        );
        renderer.render_document(tree, &mut builder)?;
        Ok(builder.finish()?)
    }

    pub fn render_to_vec(&self, tree: &AreaTree) -> Result<Vec<u8>, FolioError> {
        Ok(self.render(tree, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Reads a JSON area tree from `tree_path` and writes the PDF to `output`.
    pub fn generate_to_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, tree_path: P, output: Q) -> Result<(), FolioError> {
        let tree = load_tree(tree_path)?;
        let output = output.as_ref();
        let file = BufWriter::new(File::create(output)?);
        let mut file = self.render(&tree, file)?;
        file.flush()?;
        log::info!("Wrote {}", output.display());
        Ok(())
    }
}

pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<AreaTree, FolioError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| {
        FolioError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read area tree from '{}': {}", path.display(), e),
        ))
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Directory that relative resource URIs in the tree at `path` refer to.
pub fn resource_base(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
