use crate::area::{Area, Background, Container, Position};
use folio_types::{AnchorId, Millipoints, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The body region: floats and footnotes above the main flow.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BodyArea {
    pub position: Position,
    pub x: Millipoints,
    pub y: Millipoints,
    pub width: Millipoints,
    pub height: Millipoints,
    pub background: Option<Background>,
    pub before_float: Option<Container>,
    pub footnotes: Option<Container>,
    pub main: Vec<Area>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// `destination` names an anchor of this document.
    #[default]
    Internal,
    /// `destination` is a URI.
    External,
}

/// One link and all the rectangles (one per line fragment) that activate it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkSet {
    pub destination: String,
    #[serde(default)]
    pub link_type: LinkType,
    pub rects: Vec<Rect>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub width: Millipoints,
    pub height: Millipoints,
    #[serde(default)]
    pub body: BodyArea,
    #[serde(default)]
    pub before: Option<Container>,
    #[serde(default)]
    pub after: Option<Container>,
    #[serde(default)]
    pub links: Vec<LinkSet>,
}

impl Page {
    pub fn new(width: Millipoints, height: Millipoints) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Where an id landed after layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Zero-based page index.
    pub page: usize,
    /// Top-down offset on that page.
    pub y: Millipoints,
}

/// A bookmark and its nested entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub label: String,
    pub destination: AnchorId,
    #[serde(default)]
    pub children: Vec<OutlineEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AreaTree {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub anchors: HashMap<AnchorId, Anchor>,
    #[serde(default)]
    pub outlines: Vec<OutlineEntry>,
}

impl AreaTree {
    /// Resolves an anchor to its page index and PDF-space Y in points.
    pub fn resolve_anchor(&self, id: &AnchorId) -> Option<(usize, f32)> {
        let anchor = self.anchors.get(id)?;
        let page = self.pages.get(anchor.page)?;
        Some((anchor.page, (page.height - anchor.y) as f32 / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "pages": [{
            "width": 612000, "height": 792000,
            "body": {
                "position": "absolute", "x": 72000, "y": 72000, "width": 468000, "height": 648000,
                "main": [{"kind": "display_space", "size": 1000}]
            },
            "links": [{"destination": "intro", "rects": [{"x": 72000, "y": 90000, "width": 30000, "height": 12000}]}]
        }],
        "anchors": {"intro": {"page": 0, "y": 92000}},
        "outlines": [{"label": "Intro", "destination": "intro", "children": [{"label": "Sub", "destination": "missing"}]}]
    }"#;

    #[test]
    fn deserializes_a_complete_tree() {
        let tree: AreaTree = serde_json::from_str(TREE).unwrap();
        let page = &tree.pages[0];
        assert_eq!(page.body.position, Position::Absolute);
        assert_eq!(page.body.main.len(), 1);
        assert!(page.before.is_none());
        assert_eq!(page.links[0].link_type, LinkType::Internal);
        assert_eq!(tree.outlines[0].children.len(), 1);
    }

    #[test]
    fn anchors_resolve_to_pdf_space() {
        let tree: AreaTree = serde_json::from_str(TREE).unwrap();
        assert_eq!(tree.resolve_anchor(&AnchorId::from("intro")), Some((0, 700.0)));
        assert_eq!(tree.resolve_anchor(&AnchorId::from("missing")), None);
    }
}
