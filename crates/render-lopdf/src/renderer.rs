use crate::frame;
use crate::graphic::{self, ImageCache};
use crate::links;
use crate::state::RenderState;
use crate::text;
use folio_area::{Area, AreaTree, Block, BodyArea, Container, ForeignObject, Line, Page, Position};
use folio_render_core::content::encode_operations;
use folio_render_core::utils::to_points;
use folio_render_core::{DocumentBuilder, PageContent, PageHandle, RenderError};
use folio_svg::DocumentArena;
use folio_traits::{FontMetrics, ResourceProvider};
use lopdf::content::Operation;
use std::sync::Arc;

/// Switches for [`PageRenderer`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Merge words on one baseline into a single `TJ`.
    pub coalesce_text: bool,
    /// Font for SVG text met before any word has selected one.
    pub default_font: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            coalesce_text: true,
            default_font: "F1".to_string(),
        }
    }
}

/// Walks positioned area trees and hands one content stream per page to a
/// [`DocumentBuilder`].
pub struct PageRenderer {
    fonts: Arc<dyn FontMetrics>,
    arena: DocumentArena,
    images: ImageCache,
    options: RenderOptions,
}

impl PageRenderer {
    pub fn new(fonts: Arc<dyn FontMetrics>, resources: Arc<dyn ResourceProvider>) -> Self {
        Self::with_options(fonts, resources, RenderOptions::default())
    }

    pub fn with_options(
        fonts: Arc<dyn FontMetrics>,
        resources: Arc<dyn ResourceProvider>,
        options: RenderOptions,
    ) -> Self {
        Self {
            fonts,
            arena: DocumentArena::with_resources(resources),
            images: ImageCache::new(),
            options,
        }
    }

    /// Renders every page of `tree`, then its outline.
    pub fn render_document(
        &mut self,
        tree: &AreaTree,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let mut pages = Vec::with_capacity(tree.pages.len());
        for (index, page) in tree.pages.iter().enumerate() {
            log::debug!("Rendering page {} ({}x{})", index + 1, page.width, page.height);
            pages.push(self.render_page(tree, page, builder)?);
        }
        links::add_outlines(tree, &tree.outlines, None, &pages, builder)?;
        log::info!("Rendered {} page(s)", pages.len());
        Ok(())
    }

    /// Renders one page and returns the handle the builder assigned to it.
    pub fn render_page(
        &mut self,
        tree: &AreaTree,
        page: &Page,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<PageHandle, RenderError> {
        let ops = self.page_operations(page, builder)?;
        builder.finish_page(PageContent {
            width: to_points(page.width),
            height: to_points(page.height),
            content: encode_operations(&ops),
            annotations: links::link_annotations(tree, page),
        })
    }

    /// The operators of one page, bracketed by `BT`/`ET`.
    pub fn page_operations(
        &mut self,
        page: &Page,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<Vec<Operation>, RenderError> {
        let mut state = RenderState::new(page.height);
        self.render_body(&mut state, &page.body, builder)?;
        for region in [&page.before, &page.after].into_iter().flatten() {
            self.render_container(&mut state, region, builder)?;
        }
        Ok(state.finish())
    }

    fn render_body(
        &mut self,
        state: &mut RenderState,
        body: &BodyArea,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let (saved_x, saved_y) = (state.x, state.y);
        match body.position {
            Position::Absolute => {
                state.x = body.x;
                state.y = body.y;
            }
            Position::Relative => {
                state.x += body.x;
                state.y += body.y;
            }
            Position::Static => {}
        }
        let (x, top) = (state.x, state.y);
        frame::draw_background(state, body.background.as_ref(), x, top, body.width, body.height);

        let saved_container = state.container_x;
        state.container_x = x;
        for region in [&body.before_float, &body.footnotes].into_iter().flatten() {
            self.render_container(state, region, builder)?;
        }
        for area in &body.main {
            self.render_area(state, area, builder)?;
        }
        state.container_x = saved_container;

        match body.position {
            Position::Static => {
                state.x = saved_x;
                state.y = top + body.height;
            }
            Position::Absolute | Position::Relative => {
                state.x = saved_x;
                state.y = saved_y;
            }
        }
        Ok(())
    }

    fn render_container(
        &mut self,
        state: &mut RenderState,
        container: &Container,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let style = &container.style;
        let inset_top = style.padding.top + style.border_width.top;
        let inset_left = style.padding.left + style.border_width.left;
        let (saved_x, saved_y) = (state.x, state.y);

        match container.position {
            Position::Absolute => {
                state.x = container.x;
                state.y = container.y + 2 * inset_top;
            }
            Position::Relative => {
                state.x += container.x;
                state.y += container.y;
            }
            Position::Static => {
                state.x += inset_left;
                state.y += inset_top;
            }
        }
        let (x, top) = (state.x, state.y);
        frame::draw_frame(state, style, x, top, container.width, container.height);

        let saved_container = state.container_x;
        state.container_x = x;
        for child in &container.children {
            self.render_area(state, child, builder)?;
        }
        state.container_x = saved_container;

        state.x = saved_x;
        match container.position {
            Position::Static => state.y += container.height,
            Position::Absolute | Position::Relative => state.y = saved_y,
        }
        Ok(())
    }

    fn render_block(
        &mut self,
        state: &mut RenderState,
        block: &Block,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let x = state.container_x + block.start_indent;
        let top = state.y;
        state.x = x;
        frame::draw_frame(state, &block.style, x, top, block.width, block.height);

        let saved_container = state.container_x;
        state.container_x = x;
        for child in &block.children {
            self.render_area(state, child, builder)?;
        }
        state.container_x = saved_container;

        state.x = saved_container;
        state.y = top + block.height;
        Ok(())
    }

    fn render_line(
        &mut self,
        state: &mut RenderState,
        line: &Line,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let x = state.container_x + line.start_indent;
        let top = state.y;
        state.x = x;
        for child in &line.children {
            state.y = top + line.placement_offset;
            self.render_area(state, child, builder)?;
        }
        state.x = state.container_x;
        state.y = top + line.height;
        Ok(())
    }

    fn render_foreign_object(
        &mut self,
        state: &mut RenderState,
        object: &ForeignObject,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        let (start_x, start_y) = (state.x, state.y);
        state.x += object.x_offset;
        state.leave_text();
        state.push(Operation::new("q", vec![]));
        self.render_area(state, &object.child, builder)?;
        state.leave_text();
        state.push(Operation::new("Q", vec![]));
        state.forget_paint();
        state.x = start_x + object.x_offset + object.effective_width;
        state.y = start_y;
        Ok(())
    }

    fn render_area(
        &mut self,
        state: &mut RenderState,
        area: &Area,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<(), RenderError> {
        match area {
            Area::Container(container) => self.render_container(state, container, builder),
            Area::Block(block) => self.render_block(state, block, builder),
            Area::Line(line) => self.render_line(state, line, builder),
            Area::Word(word) => {
                match text::render_word(state, word, self.fonts.as_ref(), self.options.coalesce_text) {
                    Err(e @ RenderError::Encoding { .. }) => {
                        log::error!("Word '{}' dropped: {}", word.text, e);
                        Ok(())
                    }
                    other => other,
                }
            }
            Area::InlineSpace(space) => {
                frame::inline_space(state, space);
                Ok(())
            }
            Area::DisplaySpace { size } => {
                state.y += size;
                Ok(())
            }
            Area::Image(image) => graphic::render_image(state, image, &self.arena, &mut self.images, builder),
            Area::ForeignObject(object) => self.render_foreign_object(state, object, builder),
            Area::VectorGraphic(graphic) => graphic::render_vector_graphic(
                state,
                graphic,
                &mut self.arena,
                builder,
                &self.options.default_font,
            ),
            Area::Leader(leader) => {
                frame::draw_leader(state, leader);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::LopdfBuilder;
    use folio_area::{Background, BoxStyle, Word};
    use folio_traits::{InMemoryFontMetrics, InMemoryResourceProvider};
    use folio_types::{Color, Millipoints, Sides};
    use std::io::Cursor;

    fn renderer() -> PageRenderer {
        PageRenderer::new(
            Arc::new(InMemoryFontMetrics::standard()),
            Arc::new(InMemoryResourceProvider::new()),
        )
    }

    fn builder() -> LopdfBuilder<Cursor<Vec<u8>>> {
        LopdfBuilder::new(Cursor::new(Vec::new()), "1.7", &InMemoryFontMetrics::standard_descriptors()).unwrap()
    }

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operator.as_str()).collect()
    }

    fn line(children: Vec<Area>) -> Area {
        Area::Line(Line {
            start_indent: 0,
            height: 12_000,
            placement_offset: 10_000,
            children,
        })
    }

    fn page_with(main: Vec<Area>) -> Page {
        let mut page = Page::new(200_000, 100_000);
        page.body = BodyArea {
            position: Position::Absolute,
            x: 10_000,
            y: 10_000,
            width: 180_000,
            height: 80_000,
            main,
            ..BodyArea::default()
        };
        page
    }

    #[test]
    fn words_on_a_line_share_one_show() {
        let page = page_with(vec![line(vec![
            Area::Word(Word::new("Hello", "F3", 10_000, 22_000)),
            Area::InlineSpace(folio_area::InlineSpace {
                size: 2_500,
                ..Default::default()
            }),
            Area::Word(Word::new("World", "F3", 10_000, 25_000)),
        ])]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        assert_eq!(operators(&ops), ["BT", "Tf", "rg", "Tm", "TJ", "ET"]);
        // baseline at 10 + 10 from the top
        assert_eq!(ops[3].operands[4], lopdf::Object::Real(10.0));
        assert_eq!(ops[3].operands[5], lopdf::Object::Real(80.0));
        let items = ops[4].operands[0].as_array().unwrap();
        assert_eq!(items[1], lopdf::Object::Real(-250.0));
    }

    #[test]
    fn lines_stack_downwards() {
        let page = page_with(vec![
            line(vec![Area::Word(Word::new("one", "F1", 10_000, 15_000))]),
            Area::DisplaySpace { size: 3_000 },
            line(vec![Area::Word(Word::new("two", "F1", 10_000, 15_000))]),
        ]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        let baselines: Vec<&lopdf::Object> = ops.iter().filter(|o| o.operator == "Tm").map(|o| &o.operands[5]).collect();
        assert_eq!(baselines, [&lopdf::Object::Real(80.0), &lopdf::Object::Real(65.0)]);
    }

    #[test]
    fn static_containers_frame_then_advance() {
        let container = Container {
            position: Position::Static,
            width: 100_000,
            height: 20_000,
            style: BoxStyle {
                padding: Sides::uniform(1_000),
                border_width: Sides::uniform(500),
                border_color: Sides::uniform(Color::BLACK),
                background: Some(Background {
                    color: Color::rgb(230, 230, 230),
                    alpha: 0,
                }),
            },
            ..Container::default()
        };
        let page = page_with(vec![
            Area::Container(container),
            line(vec![Area::Word(Word::new("after", "F1", 10_000, 20_000))]),
        ]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        let names = operators(&ops);
        assert_eq!(names[0], "BT");
        assert_eq!(names[1], "ET");
        assert_eq!(names.iter().filter(|o| **o == "S").count(), 4);
        let fill = names.iter().position(|o| *o == "f").unwrap();
        let first_stroke = names.iter().position(|o| *o == "S").unwrap();
        assert!(fill < first_stroke);

        // the line starts 1.5 below the container's end
        let tm = ops.iter().find(|o| o.operator == "Tm").unwrap();
        assert_eq!(tm.operands[5], lopdf::Object::Real(100.0 - (10.0 + 1.5 + 20.0 + 10.0)));
        assert_eq!(names.last(), Some(&"ET"));
    }

    fn framed(position: Position, x: Millipoints, y: Millipoints, children: Vec<Area>) -> Area {
        Area::Container(Container {
            position,
            x,
            y,
            width: 50_000,
            height: 20_000,
            style: BoxStyle {
                padding: Sides::uniform(1_000),
                border_width: Sides::uniform(500),
                border_color: Sides::uniform(Color::BLACK),
                background: None,
            },
            children,
        })
    }

    fn text_origins(ops: &[Operation]) -> Vec<(lopdf::Object, lopdf::Object)> {
        ops.iter()
            .filter(|o| o.operator == "Tm")
            .map(|o| (o.operands[4].clone(), o.operands[5].clone()))
            .collect()
    }

    #[test]
    fn absolute_containers_place_children_below_twice_the_top_inset() {
        let page = page_with(vec![
            framed(
                Position::Absolute,
                30_000,
                20_000,
                vec![line(vec![Area::Word(Word::new("inside", "F1", 10_000, 20_000))])],
            ),
            line(vec![Area::Word(Word::new("after", "F1", 10_000, 20_000))]),
        ]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();

        // content top at 20 + 2 * (1 + 0.5), the top border 1.5 above it
        let first_move = ops.iter().find(|o| o.operator == "m").unwrap();
        assert_eq!(first_move.operands, vec![lopdf::Object::Real(28.5), lopdf::Object::Real(78.5)]);
        assert_eq!(
            text_origins(&ops),
            [
                (lopdf::Object::Real(30.0), lopdf::Object::Real(67.0)),
                // the sibling ignores the container and starts at the body's origin
                (lopdf::Object::Real(10.0), lopdf::Object::Real(80.0)),
            ]
        );
    }

    #[test]
    fn relative_containers_offset_from_the_flow_and_restore_it() {
        let page = page_with(vec![
            line(vec![Area::Word(Word::new("before", "F1", 10_000, 20_000))]),
            framed(
                Position::Relative,
                5_000,
                3_000,
                vec![line(vec![Area::Word(Word::new("inside", "F1", 10_000, 20_000))])],
            ),
            line(vec![Area::Word(Word::new("after", "F1", 10_000, 20_000))]),
        ]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        assert_eq!(
            text_origins(&ops),
            [
                (lopdf::Object::Real(10.0), lopdf::Object::Real(80.0)),
                // flow position (10, 22) shifted by (5, 3)
                (lopdf::Object::Real(15.0), lopdf::Object::Real(65.0)),
                // back at (10, 22) once the container is done
                (lopdf::Object::Real(10.0), lopdf::Object::Real(68.0)),
            ]
        );
        let frame_top = ops.iter().find(|o| o.operator == "m").unwrap();
        assert_eq!(frame_top.operands, vec![lopdf::Object::Real(13.5), lopdf::Object::Real(76.5)]);
    }

    #[test]
    fn unencodable_words_are_dropped() {
        let page = page_with(vec![line(vec![
            Area::Word(Word::new("\u{4e2d}", "F1", 10_000, 10_000)),
            Area::Word(Word::new("ok", "F1", 10_000, 10_000)),
        ])]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        let shows: Vec<&Operation> = ops.iter().filter(|o| o.operator == "TJ").collect();
        assert_eq!(shows.len(), 1);
        // the dropped word still consumed its width
        let tm = ops.iter().find(|o| o.operator == "Tm").unwrap();
        assert_eq!(tm.operands[4], lopdf::Object::Real(20.0));
    }

    #[test]
    fn foreign_objects_reset_paint_memory() {
        let leader = folio_area::Leader {
            width: 10_000,
            thickness: 1_000,
            style: folio_area::RuleStyle::Solid,
            color: Color::rgb(255, 0, 0),
        };
        let object = ForeignObject {
            x_offset: 2_000,
            effective_width: 30_000,
            child: Box::new(Area::Leader(leader.clone())),
        };
        let page = page_with(vec![line(vec![
            Area::ForeignObject(object),
            Area::Leader(leader),
        ])]);
        let mut builder = builder();
        let ops = renderer().page_operations(&page, &mut builder).unwrap();
        assert_eq!(ops.iter().filter(|o| o.operator == "RG").count(), 2);
        let moves: Vec<&lopdf::Object> = ops.iter().filter(|o| o.operator == "m").map(|o| &o.operands[0]).collect();
        assert_eq!(moves, [&lopdf::Object::Real(12.0), &lopdf::Object::Real(42.0)]);
    }
}
