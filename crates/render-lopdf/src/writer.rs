//! A streaming PDF writer implementing [`DocumentBuilder`].
//!
//! Page contents, images, functions and patterns are written out as soon as
//! they are registered; only the shared resource dictionary, the page tree,
//! the outline tree and the catalog are held back until [`LopdfBuilder::finish`].
//! Page object ids are allocated on first use so that links can point at
//! pages that have not been written yet.

use folio_render_core::content::{write_dictionary, write_object};
use folio_render_core::{
    Destination, DocumentBuilder, FunctionId, ImageData, InterpolationFunction, LinkAnnotation,
    LinkTarget, OutlineHandle, PageContent, PageHandle, RasterImage, RenderError, ShadingGeometry,
    ShadingPattern, TilingPattern,
};
use folio_traits::FontDescriptor;
use folio_types::{Matrix, ResourceName};
use lopdf::xref::{Xref, XrefEntry, XrefType};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::HashMap;
use std::io::{self, Seek, Write};

#[derive(Debug)]
struct OutlineItem {
    id: ObjectId,
    parent: Option<usize>,
    title: String,
    destination: Destination,
    children: Vec<usize>,
}

pub struct LopdfBuilder<W: Write + Seek> {
    writer: W,
    xref: Xref,
    max_id: u32,
    catalog_id: ObjectId,
    pages_id: ObjectId,
    resources_id: ObjectId,
    fonts: Dictionary,
    x_objects: Dictionary,
    patterns: Dictionary,
    functions: HashMap<FunctionId, ObjectId>,
    page_ids: Vec<ObjectId>,
    pages_written: usize,
    outlines: Vec<OutlineItem>,
}

fn matrix_array(matrix: &Matrix) -> Vec<Object> {
    matrix.to_array().iter().map(|v| Object::Real(*v as f32)).collect()
}

fn reals<const N: usize>(values: [f32; N]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

/// PDF text strings outside ASCII are written as UTF-16BE with a BOM.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

impl<W: Write + Seek> LopdfBuilder<W> {
    /// Writes the header and registers `fonts` as base-14 Type1 fonts.
    pub fn new(mut writer: W, version: &str, fonts: &[FontDescriptor]) -> Result<Self, RenderError> {
        writer.write_all(format!("%PDF-{}\n%âãÏÓ\n", version).as_bytes())?;

        let mut font_dict = Dictionary::new();
        for font in fonts {
            let single_font_dict = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font.as_str(),
                "Encoding" => "WinAnsiEncoding",
            };
            font_dict.set(font.name.as_bytes(), Object::Dictionary(single_font_dict));
        }

        Ok(Self {
            writer,
            xref: Xref::new(0, XrefType::CrossReferenceTable),
            max_id: 3,
            resources_id: (1, 0),
            pages_id: (2, 0),
            catalog_id: (3, 0),
            fonts: font_dict,
            x_objects: Dictionary::new(),
            patterns: Dictionary::new(),
            functions: HashMap::new(),
            page_ids: Vec::new(),
            pages_written: 0,
            outlines: Vec::new(),
        })
    }

    fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    fn write_object(&mut self, object: Object) -> Result<ObjectId, RenderError> {
        let id = self.new_object_id();
        self.write_object_at_id(id, &object)?;
        Ok(id)
    }

    fn write_object_at_id(&mut self, id: ObjectId, object: &Object) -> Result<(), RenderError> {
        internal_writer::write_indirect_object(&mut self.writer, id, object, &mut self.xref)?;
        Ok(())
    }

    /// The object id of page `index`, allocating ids up to it if needed.
    fn page_id(&mut self, index: usize) -> ObjectId {
        while self.page_ids.len() <= index {
            let id = self.new_object_id();
            self.page_ids.push(id);
        }
        self.page_ids[index]
    }

    fn annotation(&mut self, link: &LinkAnnotation) -> Result<Object, RenderError> {
        let action = match &link.target {
            LinkTarget::Internal { page, y } => {
                let target = self.page_id(*page);
                let dest = vec![Object::Reference(target), "FitH".into(), Object::Real(*y)];
                dictionary! { "Type" => "Action", "S" => "GoTo", "D" => dest }
            }
            LinkTarget::External(uri) => dictionary! {
                "Type" => "Action",
                "S" => "URI",
                "URI" => Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
            },
        };
        let annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => reals(link.rect),
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => action,
        };
        Ok(Object::Reference(self.write_object(annot.into())?))
    }

    fn function_object(&self, function: &InterpolationFunction) -> Result<Object, RenderError> {
        let dict = match function {
            InterpolationFunction::Exponential { c0, c1, exponent } => dictionary! {
                "FunctionType" => 2,
                "Domain" => reals([0.0, 1.0]),
                "C0" => reals(*c0),
                "C1" => reals(*c1),
                "N" => Object::Real(*exponent),
            },
            InterpolationFunction::Stitching { functions, bounds, encode } => {
                let refs = functions
                    .iter()
                    .map(|f| {
                        self.functions
                            .get(f)
                            .map(|id| Object::Reference(*id))
                            .ok_or_else(|| RenderError::Pdf(format!("unknown function {:?}", f)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                dictionary! {
                    "FunctionType" => 3,
                    "Domain" => reals([0.0, 1.0]),
                    "Functions" => refs,
                    "Bounds" => bounds.iter().map(|b| Object::Real(*b)).collect::<Vec<_>>(),
                    "Encode" => encode.iter().map(|e| Object::Real(*e)).collect::<Vec<_>>(),
                }
            }
        };
        Ok(dict.into())
    }

    fn add_pattern(&mut self, id: ObjectId) -> ResourceName {
        let name = format!("P{}", self.patterns.len() + 1);
        self.patterns.set(name.as_bytes(), Object::Reference(id));
        ResourceName::from(name)
    }

    /// Writes the shared resources, the page tree, the outlines, the catalog
    /// and the cross-reference table, and hands the writer back.
    pub fn finish(mut self) -> Result<W, RenderError> {
        // Ids handed out for link targets past the last page stay unwritten.
        if self.page_ids.len() > self.pages_written {
            log::warn!(
                "{} link target page(s) were never written",
                self.page_ids.len() - self.pages_written
            );
            self.page_ids.truncate(self.pages_written);
        }

        let mut resources = dictionary! { "Font" => self.fonts.clone() };
        if !self.x_objects.is_empty() {
            resources.set("XObject", self.x_objects.clone());
        }
        if !self.patterns.is_empty() {
            resources.set("Pattern", self.patterns.clone());
        }
        self.write_object_at_id(self.resources_id, &resources.into())?;

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.write_object_at_id(self.pages_id, &pages_dict.into())?;

        let outline_root_id = self.write_outlines()?;
        let mut catalog_dict = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        if let Some(outline_id) = outline_root_id {
            catalog_dict.set("Outlines", outline_id);
            catalog_dict.set("PageMode", "UseOutlines");
        }
        self.write_object_at_id(self.catalog_id, &catalog_dict.into())?;

        let xref_start = self.writer.stream_position()?;
        self.xref.size = self.max_id + 1;
        internal_writer::write_xref(&mut self.writer, &self.xref)?;

        let trailer = dictionary! { "Size" => self.xref.size as i64, "Root" => self.catalog_id };
        writeln!(self.writer, "trailer")?;
        write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{}", xref_start)?;
        write!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_outlines(&mut self) -> Result<Option<ObjectId>, RenderError> {
        let roots: Vec<usize> = (0..self.outlines.len())
            .filter(|i| self.outlines[*i].parent.is_none())
            .collect();
        if roots.is_empty() {
            return Ok(None);
        }
        let outline_root_id = self.new_object_id();
        let root = dictionary! {
            "Type" => "Outlines",
            "First" => self.outlines[roots[0]].id,
            "Last" => self.outlines[roots[roots.len() - 1]].id,
            "Count" => roots.len() as i64,
        };
        self.write_object_at_id(outline_root_id, &root.into())?;
        self.write_outline_level(&roots, outline_root_id)?;
        Ok(Some(outline_root_id))
    }

    fn write_outline_level(&mut self, items: &[usize], parent_id: ObjectId) -> Result<(), RenderError> {
        for (i, &index) in items.iter().enumerate() {
            let page_id = self.page_id(self.outlines[index].destination.page.0);
            let item = &self.outlines[index];
            let dest = vec![Object::Reference(page_id), "FitH".into(), Object::Real(item.destination.top)];
            let mut dict = dictionary! {
                "Title" => text_string(&item.title),
                "Parent" => parent_id,
                "Dest" => dest,
            };
            if i > 0 {
                dict.set("Prev", self.outlines[items[i - 1]].id);
            }
            if i + 1 < items.len() {
                dict.set("Next", self.outlines[items[i + 1]].id);
            }
            let children = item.children.clone();
            let id = item.id;
            if let (Some(first), Some(last)) = (children.first(), children.last()) {
                dict.set("First", self.outlines[*first].id);
                dict.set("Last", self.outlines[*last].id);
                dict.set("Count", -(children.len() as i64));
                self.write_outline_level(&children, id)?;
            }
            self.write_object_at_id(id, &dict.into())?;
        }
        Ok(())
    }
}

impl<W: Write + Seek> DocumentBuilder for LopdfBuilder<W> {
    fn register_image(&mut self, image: &RasterImage) -> Result<ResourceName, RenderError> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        let content = match &image.data {
            ImageData::Jpeg(bytes) => {
                dict.set("Filter", "DCTDecode");
                bytes.clone()
            }
            ImageData::Rgb(samples) => samples.clone(),
        };
        let id = self.write_object(Object::Stream(Stream::new(dict, content)))?;
        let name = format!("Im{}", self.x_objects.len() + 1);
        self.x_objects.set(name.as_bytes(), Object::Reference(id));
        log::debug!("Registered image {} ({}x{})", name, image.width, image.height);
        Ok(ResourceName::from(name))
    }

    fn register_function(&mut self, function: &InterpolationFunction) -> Result<FunctionId, RenderError> {
        let object = self.function_object(function)?;
        let id = self.write_object(object)?;
        let handle = FunctionId(self.functions.len() as u32);
        self.functions.insert(handle, id);
        Ok(handle)
    }

    fn register_shading_pattern(&mut self, pattern: &ShadingPattern) -> Result<ResourceName, RenderError> {
        let function = *self
            .functions
            .get(&pattern.function)
            .ok_or_else(|| RenderError::Pdf(format!("unknown function {:?}", pattern.function)))?;
        let (shading_type, coords): (i64, Vec<Object>) = match &pattern.geometry {
            ShadingGeometry::Axial(c) => (2, c.iter().map(|v| Object::Real(*v as f32)).collect()),
            ShadingGeometry::Radial(c) => (3, c.iter().map(|v| Object::Real(*v as f32)).collect()),
        };
        let shading = dictionary! {
            "ShadingType" => shading_type,
            "ColorSpace" => "DeviceRGB",
            "Coords" => coords,
            "Function" => function,
            "Extend" => vec![pattern.extend[0].into(), pattern.extend[1].into()],
        };
        let dict = dictionary! {
            "Type" => "Pattern",
            "PatternType" => 2,
            "Matrix" => matrix_array(&pattern.matrix),
            "Shading" => shading,
        };
        let id = self.write_object(dict.into())?;
        Ok(self.add_pattern(id))
    }

    fn register_tiling_pattern(&mut self, pattern: TilingPattern) -> Result<ResourceName, RenderError> {
        let dict = dictionary! {
            "Type" => "Pattern",
            "PatternType" => 1,
            "PaintType" => 1,
            "TilingType" => 1,
            "BBox" => pattern.bbox.iter().map(|v| Object::Real(*v as f32)).collect::<Vec<_>>(),
            "XStep" => Object::Real(pattern.x_step as f32),
            "YStep" => Object::Real(pattern.y_step as f32),
            "Matrix" => matrix_array(&pattern.matrix),
            "Resources" => self.resources_id,
        };
        let id = self.write_object(Object::Stream(Stream::new(dict, pattern.content)))?;
        Ok(self.add_pattern(id))
    }

    fn finish_page(&mut self, page: PageContent) -> Result<PageHandle, RenderError> {
        let index = self.pages_written;
        let page_id = self.page_id(index);
        let content_id = self.write_object(Object::Stream(Stream::new(dictionary! {}, page.content)))?;

        let mut annots = Vec::new();
        for link in &page.annotations {
            annots.push(self.annotation(link)?);
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => reals([0.0, 0.0, page.width, page.height]),
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        self.write_object_at_id(page_id, &page_dict.into())?;
        self.pages_written += 1;
        Ok(PageHandle(index))
    }

    fn add_outline(
        &mut self,
        parent: Option<OutlineHandle>,
        label: &str,
        destination: Destination,
    ) -> Result<OutlineHandle, RenderError> {
        if let Some(p) = parent {
            if p.0 >= self.outlines.len() {
                return Err(RenderError::Other(format!("unknown outline parent {}", p.0)));
            }
        }
        let index = self.outlines.len();
        let id = self.new_object_id();
        self.outlines.push(OutlineItem {
            id,
            parent: parent.map(|p| p.0),
            title: label.to_string(),
            destination,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.outlines[p.0].children.push(index);
        }
        Ok(OutlineHandle(index))
    }
}

mod internal_writer {
    use super::*;

    pub fn write_indirect_object<W: Write + Seek>(
        writer: &mut W,
        id: ObjectId,
        object: &Object,
        xref: &mut Xref,
    ) -> io::Result<()> {
        let offset = writer.stream_position()?;
        xref.insert(id.0, XrefEntry::Normal { offset: offset as u32, generation: id.1 });
        writeln!(writer, "{} {} obj", id.0, id.1)?;
        write_object(writer, object)?;
        writeln!(writer, "\nendobj")?;
        Ok(())
    }

    /// Writes a classic cross-reference table, one subsection per run of
    /// consecutive object numbers.
    pub fn write_xref<W: Write>(writer: &mut W, xref: &Xref) -> io::Result<()> {
        writeln!(writer, "xref")?;
        writeln!(writer, "0 1")?;
        writeln!(writer, "0000000000 65535 f ")?;

        let mut sorted_entries: Vec<_> = xref.entries.iter().filter(|(id, _)| **id > 0).collect();
        sorted_entries.sort_by_key(|(id, _)| **id);

        let mut start_id = 0;
        let mut section: Vec<&XrefEntry> = Vec::new();
        for (&id, entry) in sorted_entries {
            if !section.is_empty() && id != start_id + section.len() as u32 {
                write_section(writer, start_id, &section)?;
                section.clear();
            }
            if section.is_empty() {
                start_id = id;
            }
            section.push(entry);
        }
        write_section(writer, start_id, &section)
    }

    fn write_section<W: Write>(writer: &mut W, start_id: u32, entries: &[&XrefEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{} {}", start_id, entries.len())?;
        for entry in entries {
            if let XrefEntry::Normal { offset, generation } = **entry {
                writeln!(writer, "{:010} {:05} n ", offset, generation)?;
            } else {
                writeln!(writer, "0000000000 65535 f ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_traits::InMemoryFontMetrics;
    use std::io::Cursor;

    fn builder() -> LopdfBuilder<Cursor<Vec<u8>>> {
        LopdfBuilder::new(Cursor::new(Vec::new()), "1.7", &InMemoryFontMetrics::standard_descriptors()).unwrap()
    }

    fn page(content: &str) -> PageContent {
        PageContent {
            width: 612.0,
            height: 792.0,
            content: content.as_bytes().to_vec(),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn writes_a_loadable_document() {
        let mut builder = builder();
        builder.finish_page(page("BT /F1 12 Tf 1 0 0 1 72 720 Tm [(Hi)] TJ ET\n")).unwrap();
        builder.finish_page(page("")).unwrap();
        let bytes = builder.finish().unwrap().into_inner();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let first = doc.get_pages()[&1];
        let content = doc.get_page_content(first).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("(Hi)"));
    }

    #[test]
    fn links_may_point_forward() {
        let mut builder = builder();
        let mut first = page("");
        first.annotations.push(LinkAnnotation {
            rect: [10.0, 10.0, 50.0, 20.0],
            target: LinkTarget::Internal { page: 1, y: 700.0 },
        });
        builder.finish_page(first).unwrap();
        builder.finish_page(page("")).unwrap();
        let bytes = builder.finish().unwrap().into_inner();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        let page_dict = doc.get_dictionary(pages[&1]).unwrap();
        let annots = page_dict.get(b"Annots").unwrap().as_array().unwrap();
        let annot = doc.get_dictionary(annots[0].as_reference().unwrap()).unwrap();
        let action = annot.get(b"A").unwrap().as_dict().unwrap();
        let dest = action.get(b"D").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), pages[&2]);
    }

    #[test]
    fn stitching_needs_registered_parts() {
        let mut builder = builder();
        let result = builder.register_function(&InterpolationFunction::Stitching {
            functions: vec![FunctionId(7)],
            bounds: vec![],
            encode: vec![0.0, 1.0],
        });
        assert!(matches!(result, Err(RenderError::Pdf(_))));
    }

    #[test]
    fn outlines_nest_under_their_parent() {
        let mut builder = builder();
        let handle = builder.finish_page(page("")).unwrap();
        let dest = Destination { page: handle, top: 700.0 };
        let chapter = builder.add_outline(None, "Chapter", dest).unwrap();
        builder.add_outline(Some(chapter), "Section", dest).unwrap();
        assert!(builder.add_outline(Some(OutlineHandle(9)), "Orphan", dest).is_err());
        let bytes = builder.finish().unwrap().into_inner();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let catalog = doc.get_dictionary(doc.trailer.get(b"Root").unwrap().as_reference().unwrap()).unwrap();
        let root = doc.get_dictionary(catalog.get(b"Outlines").unwrap().as_reference().unwrap()).unwrap();
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 1);
        let first = doc.get_dictionary(root.get(b"First").unwrap().as_reference().unwrap()).unwrap();
        assert_eq!(first.get(b"Count").unwrap().as_i64().unwrap(), -1);
    }
}
