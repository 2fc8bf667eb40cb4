use folio_render_core::{
    Destination, DocumentBuilder, FunctionId, InterpolationFunction, OutlineHandle, PageContent,
    PageHandle, RasterImage, RenderError, ShadingPattern, TilingPattern,
};
use folio_svg::{DocumentArena, GraphicsTranslator, SvgDocument, TextDefaults, Unsupported};
use folio_types::{Matrix, ResourceName};
use lopdf::content::Operation;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Counts registrations; hands out sequential names.
#[derive(Debug, Default)]
pub struct CountingBuilder {
    pub functions: usize,
    pub shadings: usize,
    pub tilings: usize,
    pub images: usize,
}

impl DocumentBuilder for CountingBuilder {
    fn register_image(&mut self, _image: &RasterImage) -> Result<ResourceName, RenderError> {
        self.images += 1;
        Ok(format!("Im{}", self.images).into())
    }

    fn register_function(
        &mut self,
        _function: &InterpolationFunction,
    ) -> Result<FunctionId, RenderError> {
        self.functions += 1;
        Ok(FunctionId(self.functions as u32))
    }

    fn register_shading_pattern(
        &mut self,
        _pattern: &ShadingPattern,
    ) -> Result<ResourceName, RenderError> {
        self.shadings += 1;
        Ok(format!("Sh{}", self.shadings).into())
    }

    fn register_tiling_pattern(
        &mut self,
        _pattern: TilingPattern,
    ) -> Result<ResourceName, RenderError> {
        self.tilings += 1;
        Ok(format!("Tp{}", self.tilings).into())
    }

    fn finish_page(&mut self, _page: PageContent) -> Result<PageHandle, RenderError> {
        Err(RenderError::Other("pages are not rendered here".into()))
    }

    fn add_outline(
        &mut self,
        _parent: Option<OutlineHandle>,
        _label: &str,
        _destination: Destination,
    ) -> Result<OutlineHandle, RenderError> {
        Err(RenderError::Other("outlines are not rendered here".into()))
    }
}

pub struct Translated {
    pub ops: Vec<Operation>,
    pub diagnostics: Vec<Unsupported>,
    pub builder: CountingBuilder,
}

impl Translated {
    pub fn count(&self, operator: &str) -> usize {
        self.ops.iter().filter(|o| o.operator == operator).count()
    }
}

/// Translates a standalone document into a 200 x 200 box.
pub fn translate(markup: &str) -> Result<Translated, Box<dyn std::error::Error>> {
    let mut arena = DocumentArena::new();
    let doc = arena.insert(Arc::new(SvgDocument::parse(markup)?));
    let mut builder = CountingBuilder::default();
    let mut ops = Vec::new();
    let mut translator = GraphicsTranslator::new(
        &mut arena,
        &mut builder,
        TextDefaults::default(),
        Matrix::identity(),
        (200.0, 200.0),
    );
    translator.render_document(doc, 200.0, 200.0, &mut ops)?;
    let diagnostics = translator.into_diagnostics();
    Ok(Translated {
        ops,
        diagnostics,
        builder,
    })
}
