//! Link annotations and the document outline.

use folio_area::{AreaTree, LinkType, OutlineEntry, Page};
use folio_render_core::utils::to_points;
use folio_render_core::{Destination, DocumentBuilder, LinkAnnotation, LinkTarget, OutlineHandle, PageHandle, RenderError};
use folio_types::AnchorId;

/// Annotations for every link rectangle on `page`. Internal links whose
/// anchor never landed on a page are dropped with a warning.
pub(crate) fn link_annotations(tree: &AreaTree, page: &Page) -> Vec<LinkAnnotation> {
    let mut annotations = Vec::new();
    for link in &page.links {
        let target = match link.link_type {
            LinkType::External => LinkTarget::External(link.destination.clone()),
            LinkType::Internal => {
                let id = AnchorId::from(link.destination.trim_start_matches('#'));
                match tree.resolve_anchor(&id) {
                    Some((page, y)) => LinkTarget::Internal { page, y },
                    None => {
                        log::warn!("Link target '{}' does not exist; link dropped", link.destination);
                        continue;
                    }
                }
            }
        };
        for rect in &link.rects {
            annotations.push(LinkAnnotation {
                rect: [
                    to_points(rect.x),
                    to_points(page.height - (rect.y + rect.height)),
                    to_points(rect.x + rect.width),
                    to_points(page.height - rect.y),
                ],
                target: target.clone(),
            });
        }
    }
    annotations
}

/// Adds the outline entries below `parent`.
///
/// An entry whose anchor is unknown is left out together with its subtree.
pub(crate) fn add_outlines(
    tree: &AreaTree,
    entries: &[OutlineEntry],
    parent: Option<OutlineHandle>,
    pages: &[PageHandle],
    builder: &mut dyn DocumentBuilder,
) -> Result<(), RenderError> {
    for entry in entries {
        let resolved = tree
            .resolve_anchor(&entry.destination)
            .and_then(|(index, top)| pages.get(index).map(|page| Destination { page: *page, top }));
        let Some(destination) = resolved else {
            log::warn!("Bookmark '{}' points at unknown anchor '{}'", entry.label, entry.destination);
            for orphan in &entry.children {
                log::error!("Bookmark '{}' has no registered parent; skipped", orphan.label);
            }
            continue;
        };
        let handle = builder.add_outline(parent, &entry.label, destination)?;
        add_outlines(tree, &entry.children, Some(handle), pages, builder)?;
    }
    Ok(())
}
