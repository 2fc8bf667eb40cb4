use crate::error::RenderError;
use crate::types::{
    Destination, FunctionId, InterpolationFunction, OutlineHandle, PageContent, PageHandle,
    RasterImage, ShadingPattern, TilingPattern,
};
use folio_types::ResourceName;

/// The allocation side of a PDF writer, as seen by the renderers.
///
/// Everything registered here becomes available to every page through the
/// shared resource dictionary under the returned name.
pub trait DocumentBuilder {
    fn register_image(&mut self, image: &RasterImage) -> Result<ResourceName, RenderError>;

    fn register_function(
        &mut self,
        function: &InterpolationFunction,
    ) -> Result<FunctionId, RenderError>;

    fn register_shading_pattern(
        &mut self,
        pattern: &ShadingPattern,
    ) -> Result<ResourceName, RenderError>;

    fn register_tiling_pattern(
        &mut self,
        pattern: TilingPattern,
    ) -> Result<ResourceName, RenderError>;

    /// Writes a finished page and returns its position in the document.
    fn finish_page(&mut self, page: PageContent) -> Result<PageHandle, RenderError>;

    /// Adds a bookmark below `parent`, or at the top level when `None`.
    fn add_outline(
        &mut self,
        parent: Option<OutlineHandle>,
        label: &str,
        destination: Destination,
    ) -> Result<OutlineHandle, RenderError>;
}
