//! Parsed SVG documents and the arena that resolves references between them.
//!
//! Documents are copied out of `roxmltree` into an owned node vector so they
//! can be shared (`Arc`) between the area tree and the translator. Each
//! document carries an id index built at parse time.

use crate::error::SvgError;
use folio_traits::{ResourceProvider, SharedResourceData};
use std::collections::HashMap;
use std::sync::Arc;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocKey(usize);

/// A node in a specific document of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub doc: DocKey,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Group,
    Defs,
    Rect,
    Line,
    Circle,
    Ellipse,
    Path,
    Polyline,
    Polygon,
    Text,
    TSpan,
    TRef,
    Use,
    Symbol,
    Image,
    Anchor,
    Switch,
    LinearGradient,
    RadialGradient,
    Stop,
    Pattern,
    /// title, desc and metadata
    Descriptive,
    Unknown(String),
}

impl ElementKind {
    fn from_tag(name: &str) -> Self {
        match name {
            "svg" => ElementKind::Svg,
            "g" => ElementKind::Group,
            "defs" => ElementKind::Defs,
            "rect" => ElementKind::Rect,
            "line" => ElementKind::Line,
            "circle" => ElementKind::Circle,
            "ellipse" => ElementKind::Ellipse,
            "path" => ElementKind::Path,
            "polyline" => ElementKind::Polyline,
            "polygon" => ElementKind::Polygon,
            "text" => ElementKind::Text,
            "tspan" => ElementKind::TSpan,
            "tref" => ElementKind::TRef,
            "use" => ElementKind::Use,
            "symbol" => ElementKind::Symbol,
            "image" => ElementKind::Image,
            "a" => ElementKind::Anchor,
            "switch" => ElementKind::Switch,
            "linearGradient" => ElementKind::LinearGradient,
            "radialGradient" => ElementKind::RadialGradient,
            "stop" => ElementKind::Stop,
            "pattern" => ElementKind::Pattern,
            "title" | "desc" | "metadata" => ElementKind::Descriptive,
            other => ElementKind::Unknown(other.to_string()),
        }
    }

    fn keeps_text(&self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::TSpan)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        kind: ElementKind,
        attributes: HashMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct SvgNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SvgNode {
    /// `None` for character data.
    pub fn kind(&self) -> Option<&ElementKind> {
        match &self.data {
            NodeData::Element { kind, .. } => Some(kind),
            NodeData::Text(_) => None,
        }
    }

    /// A presentation attribute or `style` declaration; declarations win.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.data {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<SvgNode>,
    ids: HashMap<String, NodeId>,
}

impl SvgDocument {
    pub fn parse(text: &str) -> Result<Self, SvgError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, options)?;
        let mut document = SvgDocument {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        document.copy_element(xml.root_element(), None);
        Ok(document)
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, SvgError> {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    fn copy_element(&mut self, element: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> NodeId {
        let kind = match element.tag_name().namespace() {
            None | Some(SVG_NS) => ElementKind::from_tag(element.tag_name().name()),
            Some(_) => ElementKind::Unknown(element.tag_name().name().to_string()),
        };

        let mut attributes = HashMap::new();
        for attr in element.attributes() {
            let key = match attr.namespace() {
                Some(XML_NS) => format!("xml:{}", attr.name()),
                _ => attr.name().to_string(),
            };
            attributes.insert(key, attr.value().to_string());
        }
        if let Some(style) = attributes.get("style").cloned() {
            for (name, value) in parse_style_declarations(&style) {
                attributes.insert(name, value);
            }
        }

        let keeps_text = kind.keeps_text();
        let id = self.push(NodeData::Element { kind, attributes }, parent);
        if let Some(name) = self.nodes[id.0].id() {
            self.ids.entry(name.to_string()).or_insert(id);
        }

        for child in element.children() {
            if child.is_element() {
                let child_id = self.copy_element(child, Some(id));
                self.nodes[id.0].children.push(child_id);
            } else if keeps_text && child.is_text() {
                let text = child.text().unwrap_or_default().to_string();
                let child_id = self.push(NodeData::Text(text), Some(id));
                self.nodes[id.0].children.push(child_id);
            }
        }
        id
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SvgNode {
            data,
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SvgNode {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// The chain from the root down to `id`, inclusive.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }
}

fn parse_style_declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let name = name.trim();
        let value = value.trim();
        (!name.is_empty() && !value.is_empty()).then(|| (name.to_string(), value.to_string()))
    })
}

/// Adds the `file:` scheme to scheme-less locators.
fn normalize_uri(uri: &str) -> String {
    if uri.contains(':') {
        uri.to_string()
    } else {
        format!("file:{}", uri)
    }
}

/// All documents visible to one translation, keyed by load URI.
#[derive(Debug, Default)]
pub struct DocumentArena {
    documents: Vec<Arc<SvgDocument>>,
    by_uri: HashMap<String, DocKey>,
    by_address: HashMap<usize, DocKey>,
    resources: Option<Arc<dyn ResourceProvider>>,
}

impl DocumentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            resources: Some(resources),
            ..Self::default()
        }
    }

    pub fn resources(&self) -> Option<&Arc<dyn ResourceProvider>> {
        self.resources.as_ref()
    }

    /// Adds an already parsed document. Inserting the same `Arc` twice
    /// returns the original key.
    pub fn insert(&mut self, document: Arc<SvgDocument>) -> DocKey {
        let address = Arc::as_ptr(&document) as usize;
        if let Some(key) = self.by_address.get(&address) {
            return *key;
        }
        let key = DocKey(self.documents.len());
        self.documents.push(document);
        self.by_address.insert(address, key);
        key
    }

    pub fn get(&self, key: DocKey) -> Arc<SvgDocument> {
        Arc::clone(&self.documents[key.0])
    }

    /// Raw bytes of a non-SVG resource such as a raster image.
    pub fn load_resource(&self, uri: &str) -> Result<SharedResourceData, SvgError> {
        let uri = normalize_uri(uri);
        let provider = self
            .resources
            .as_ref()
            .ok_or_else(|| SvgError::Reference(format!("{} (no resource provider)", uri)))?;
        Ok(provider.load(&uri)?)
    }

    /// Loads (once) the document at `uri` through the resource provider.
    pub fn load(&mut self, uri: &str) -> Result<DocKey, SvgError> {
        if let Some(key) = self.by_uri.get(&normalize_uri(uri)) {
            return Ok(*key);
        }
        let bytes = self.load_resource(uri)?;
        let uri = normalize_uri(uri);
        let document = SvgDocument::parse_bytes(&bytes)?;
        log::debug!("Loaded referenced SVG document {}", uri);
        let key = self.insert(Arc::new(document));
        self.by_uri.insert(uri, key);
        Ok(key)
    }

    /// Resolves `#id`, `doc.svg#id` or `doc.svg` relative to `from`.
    pub fn resolve(&mut self, from: DocKey, reference: &str) -> Result<NodeRef, SvgError> {
        let (locator, fragment) = match reference.split_once('#') {
            Some((locator, fragment)) => (locator, Some(fragment)),
            None => (reference, None),
        };
        let doc = if locator.is_empty() {
            from
        } else {
            self.load(locator)?
        };
        let node = match fragment {
            Some(id) => self.documents[doc.0]
                .lookup(id)
                .ok_or_else(|| SvgError::Reference(reference.to_string()))?,
            None => self.documents[doc.0].root(),
        };
        Ok(NodeRef { doc, node })
    }
}
