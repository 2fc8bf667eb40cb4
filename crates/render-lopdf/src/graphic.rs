//! Raster images and embedded SVG documents.

use crate::state::RenderState;
use folio_area::{GraphicSource, ImageArea, VectorGraphic};
use folio_render_core::image::decode_raster;
use folio_render_core::utils::{name, points, real, to_points};
use folio_render_core::{DocumentBuilder, RenderError};
use folio_svg::{DocumentArena, GraphicsTranslator, SvgDocument, SvgError, TextDefaults};
use folio_types::{Matrix, Millipoints, ResourceName};
use lopdf::content::Operation;
use std::collections::HashMap;
use std::sync::Arc;

/// Images already registered with the builder, keyed by source URI.
pub(crate) type ImageCache = HashMap<String, ResourceName>;

fn load_image(
    source: &str,
    arena: &DocumentArena,
    cache: &mut ImageCache,
    builder: &mut dyn DocumentBuilder,
) -> Result<ResourceName, RenderError> {
    if let Some(name) = cache.get(source) {
        return Ok(name.clone());
    }
    let bytes = arena.load_resource(source)?;
    let raster = decode_raster(&bytes)?;
    let name = builder.register_image(&raster)?;
    log::debug!("Registered image {} as {} ({}x{})", source, name, raster.width, raster.height);
    cache.insert(source.to_string(), name.clone());
    Ok(name)
}

/// Draws `image` with its top-left corner at the cursor.
///
/// An image that cannot be loaded is logged and left out; the cursor moves
/// either way.
pub(crate) fn render_image(
    state: &mut RenderState,
    image: &ImageArea,
    arena: &DocumentArena,
    cache: &mut ImageCache,
    builder: &mut dyn DocumentBuilder,
) -> Result<(), RenderError> {
    let x = state.x + image.x_offset;
    let top = state.y;
    match load_image(&image.source, arena, cache, builder) {
        Ok(resource) => {
            state.leave_text();
            let bottom = state.pdf_y(top + image.height);
            state.push(Operation::new("q", vec![]));
            state.push(Operation::new(
                "cm",
                vec![
                    points(image.width),
                    0.into(),
                    0.into(),
                    points(image.height),
                    points(x),
                    bottom,
                ],
            ));
            state.push(Operation::new("Do", vec![name(resource.as_str())]));
            state.push(Operation::new("Q", vec![]));
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => log::error!("Image '{}' could not be rendered: {}", image.source, e),
    }
    state.x += image.width;
    state.y += image.height;
    Ok(())
}

fn graphic_document(source: &GraphicSource, arena: &mut DocumentArena) -> Result<folio_svg::DocKey, SvgError> {
    match source {
        GraphicSource::Markup(markup) => {
            let document = SvgDocument::parse(markup)?;
            Ok(arena.insert(Arc::new(document)))
        }
        GraphicSource::Uri(uri) => arena.load(uri),
    }
}

fn translate(
    graphic: &VectorGraphic,
    arena: &mut DocumentArena,
    builder: &mut dyn DocumentBuilder,
    text: TextDefaults,
    origin: (Millipoints, Millipoints),
) -> Result<Vec<Operation>, SvgError> {
    let doc = graphic_document(&graphic.document, arena)?;
    let (x, y) = origin;
    let ctm = Matrix::new(1.0, 0.0, 0.0, -1.0, f64::from(to_points(x)), f64::from(to_points(y)));
    let width = f64::from(to_points(graphic.width));
    let height = f64::from(to_points(graphic.height));
    let mut ops = Vec::new();
    let mut translator = GraphicsTranslator::new(arena, builder, text, ctm, (width, height));
    translator.render_document(doc, width, height, &mut ops)?;
    for skipped in translator.diagnostics() {
        log::debug!("Skipped in vector graphic: {}", skipped);
    }
    Ok(ops)
}

/// Draws an SVG document into the box whose top-left corner is at the
/// cursor. The translator clips to that box. The cursor does not move.
pub(crate) fn render_vector_graphic(
    state: &mut RenderState,
    graphic: &VectorGraphic,
    arena: &mut DocumentArena,
    builder: &mut dyn DocumentBuilder,
    default_font: &str,
) -> Result<(), RenderError> {
    let x = state.x + graphic.x_offset;
    let pdf_top = state.page_height - state.y;
    let text = match &state.font {
        Some((font, size)) => TextDefaults {
            font: font.clone(),
            size: f64::from(to_points(*size)),
        },
        None => TextDefaults {
            font: default_font.to_string(),
            ..TextDefaults::default()
        },
    };
    match translate(graphic, arena, builder, text, (x, pdf_top)) {
        Ok(ops) => {
            state.leave_text();
            state.push(Operation::new("q", vec![]));
            state.push(Operation::new(
                "cm",
                vec![1.into(), 0.into(), 0.into(), real(-1.0), points(x), points(pdf_top)],
            ));
            state.extend(ops);
            state.push(Operation::new("Q", vec![]));
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            log::error!("Vector graphic could not be rendered: {}", e);
            Ok(())
        }
    }
}
