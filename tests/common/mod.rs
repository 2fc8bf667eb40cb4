pub mod fixtures;

use folio::area::AreaTree;
use folio::{PipelineBuilder, RenderConfig};
use lopdf::Document as LopdfDocument;
use lopdf::content::{Content, Operation};
use serde_json::Value;
use std::path::Path;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Decoded content operators of page `number` (1-based).
    pub fn operations(&self, number: u32) -> Result<Vec<Operation>, Box<dyn std::error::Error>> {
        let pages = self.doc.get_pages();
        let id = pages.get(&number).ok_or("no such page")?;
        let content = self.doc.get_page_content(*id)?;
        Ok(Content::decode(&content)?.operations)
    }

    pub fn operators(&self, number: u32) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        Ok(self.operations(number)?.into_iter().map(|o| o.operator).collect())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Render a JSON area tree with the default configuration
pub fn generate_pdf(tree: &Value) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    generate_pdf_with(tree, RenderConfig::default(), None)
}

/// Render a JSON area tree, resolving resources against `resource_dir`
pub fn generate_pdf_with(
    tree: &Value,
    config: RenderConfig,
    resource_dir: Option<&Path>,
) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    init_logging();
    let tree: AreaTree = serde_json::from_value(tree.clone())?;
    let mut builder = PipelineBuilder::new().with_config(config);
    if let Some(dir) = resource_dir {
        builder = builder.with_resource_dir(dir);
    }
    let bytes = builder.build().render_to_vec(&tree)?;
    GeneratedPdf::from_bytes(bytes)
}
