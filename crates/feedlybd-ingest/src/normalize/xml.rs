//! RSS and Atom item extraction.
//!
//! Both dialects go through the same element vocabulary: items are the union
//! of `<item>` and `<entry>`, and each field is looked up through a priority
//! list covering RSS, Atom, and common namespace extensions.

use super::document::{parse_document, Element};
use super::thumbnail::{is_image_type, ThumbnailCandidates};
use super::{ExtractedFeed, RawItem};
use crate::error::IngestError;
use crate::text::strip_html;

const ITEM_SELECTORS: &[&str] = &["item", "entry"];
const DATE_SELECTORS: &[&str] = &["pubDate", "published", "updated", "dc:date"];
const DESCRIPTION_SELECTORS: &[&str] = &["description", "summary"];
const CONTENT_SELECTORS: &[&str] = &["content:encoded", "content"];
const AUTHOR_SELECTORS: &[&str] = &["dc:creator", "author"];

/// Parse an RSS/Atom document into raw items in document order.
///
/// # Errors
///
/// Returns [`IngestError::Xml`] or [`IngestError::Malformed`] when the
/// document is not well-formed XML.
pub(super) fn extract(document: &str) -> Result<ExtractedFeed, IngestError> {
    let root = parse_document(document)?;

    let mut items = Vec::new();
    collect_items(&root, &mut items);

    Ok(ExtractedFeed {
        title: feed_title(&root),
        items: items.into_iter().map(read_item).collect(),
    })
}

fn collect_items<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        if ITEM_SELECTORS.iter().any(|selector| child.is(selector)) {
            out.push(child);
        } else {
            collect_items(child, out);
        }
    }
}

/// Channel (RSS, RDF) or feed (Atom) level title.
fn feed_title(root: &Element) -> Option<String> {
    let title = if root.is("feed") {
        root.child("title")
    } else {
        root.child("channel").and_then(|channel| channel.child("title"))
    }?;
    let text = strip_html(&title.text_content());
    (!text.is_empty()).then_some(text)
}

fn read_item(item: &Element) -> RawItem {
    let descendants = item.descendants();

    let title = item.find("title").map(Element::text_content);
    let published = item
        .find_by_priority(DATE_SELECTORS)
        .map(Element::text_content);
    let description = item
        .find_by_priority(DESCRIPTION_SELECTORS)
        .map(Element::inner_markup)
        .unwrap_or_default();
    let content = item
        .find_by_priority(CONTENT_SELECTORS)
        .map(Element::inner_markup)
        .unwrap_or_default();
    let author = item
        .find_by_priority(AUTHOR_SELECTORS)
        .map(|author| {
            author
                .child("name")
                .map_or_else(|| author.text_content(), Element::text_content)
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    RawItem {
        title,
        link: item_link(&descendants),
        published,
        description,
        content,
        author,
        thumbnails: thumbnail_candidates(&descendants),
    }
}

/// Link text, falling back to `href`. Atom entries can carry several links;
/// ones without `rel` or with `rel="alternate"` are preferred.
fn item_link(descendants: &[&Element]) -> Option<String> {
    let links: Vec<&Element> = descendants
        .iter()
        .copied()
        .filter(|el| el.is("link"))
        .collect();
    let chosen = links
        .iter()
        .copied()
        .find(|link| link.attr("rel").is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first().copied())?;

    let text = chosen.text_content().trim().to_string();
    if text.is_empty() {
        chosen.attr_non_empty("href").map(str::to_string)
    } else {
        Some(text)
    }
}

fn thumbnail_candidates(descendants: &[&Element]) -> ThumbnailCandidates {
    let explicit = descendants
        .iter()
        .find(|el| el.is("media:thumbnail") && el.attr_non_empty("url").is_some())
        .or_else(|| {
            descendants.iter().find(|el| {
                el.is("media:content")
                    && el.attr_non_empty("url").is_some()
                    && el.attr("type").is_none_or(|t| is_image_type(Some(t)))
                    && el.attr("medium").is_none_or(|m| is_image_type(Some(m)))
            })
        })
        .and_then(|el| el.attr_non_empty("url"))
        .map(str::to_string);

    let image_enclosure = descendants
        .iter()
        .find_map(|el| {
            if el.is("enclosure") && is_image_type(el.attr("type")) {
                el.attr_non_empty("url")
            } else if el.is("link")
                && el.attr("rel") == Some("enclosure")
                && is_image_type(el.attr("type"))
            {
                el.attr_non_empty("href")
            } else {
                None
            }
        })
        .map(str::to_string);

    ThumbnailCandidates {
        explicit,
        image_enclosure,
    }
}
