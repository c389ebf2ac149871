//! JSON envelope relays (`rss2json` shape).

use serde::Deserialize;

use super::thumbnail::{is_image_type, ThumbnailCandidates};
use super::{ExtractedFeed, RawItem};
use crate::error::IngestError;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    feed: Option<EnvelopeFeed>,
    #[serde(default)]
    items: Vec<EnvelopeItem>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeFeed {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    pub_date: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    guid: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    /// Relays emit an object, an empty array, or nothing at all here.
    #[serde(default)]
    enclosure: Option<serde_json::Value>,
}

impl EnvelopeItem {
    fn image_enclosure(&self) -> Option<String> {
        let enclosure = self.enclosure.as_ref()?.as_object()?;
        let mime = enclosure.get("type").and_then(serde_json::Value::as_str);
        if !is_image_type(mime) {
            return None;
        }
        ["link", "url"]
            .iter()
            .filter_map(|key| enclosure.get(*key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .find(|url| !url.is_empty())
            .map(str::to_string)
    }

    fn into_raw(self) -> RawItem {
        let image_enclosure = self.image_enclosure();
        let link = non_empty(self.link).or_else(|| non_empty(self.guid));
        RawItem {
            title: self.title,
            link,
            published: self.pub_date,
            description: self.description.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            author: non_empty(self.author),
            thumbnails: ThumbnailCandidates {
                explicit: non_empty(self.thumbnail),
                image_enclosure,
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Decode an envelope document into raw items.
///
/// # Errors
///
/// Returns [`IngestError::Json`] for undecodable JSON and
/// [`IngestError::RelayStatus`] when the relay reports anything but `ok`.
pub(super) fn extract(document: &str) -> Result<ExtractedFeed, IngestError> {
    let envelope: Envelope = serde_json::from_str(document)?;

    if let Some(status) = envelope.status.as_deref() {
        if !status.eq_ignore_ascii_case("ok") {
            return Err(IngestError::RelayStatus(status.to_string()));
        }
    }

    Ok(ExtractedFeed {
        title: envelope
            .feed
            .and_then(|feed| non_empty(feed.title)),
        items: envelope
            .items
            .into_iter()
            .map(EnvelopeItem::into_raw)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_items_and_feed_title() {
        let doc = r#"{
            "status": "ok",
            "feed": {"title": "bdnews24"},
            "items": [{
                "title": "Metro rail extended",
                "pubDate": "2024-05-01 04:00:00",
                "link": "https://bdnews24.test/a",
                "author": "Staff",
                "thumbnail": "https://cdn.test/a.jpg",
                "description": "<p>Body</p>",
                "content": "<p>Body</p>",
                "enclosure": []
            }]
        }"#;
        let feed = extract(doc).expect("valid envelope");
        assert_eq!(feed.title.as_deref(), Some("bdnews24"));
        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.link.as_deref(), Some("https://bdnews24.test/a"));
        assert_eq!(item.published.as_deref(), Some("2024-05-01 04:00:00"));
        assert_eq!(
            item.thumbnails.explicit.as_deref(),
            Some("https://cdn.test/a.jpg")
        );
        assert_eq!(item.thumbnails.image_enclosure, None);
    }

    #[test]
    fn image_enclosure_object_is_a_candidate() {
        let doc = r#"{"status":"ok","items":[{"title":"t","thumbnail":"",
            "enclosure":{"link":"https://cdn.test/e.png","type":"image/png"}}]}"#;
        let feed = extract(doc).expect("valid envelope");
        let thumbs = &feed.items[0].thumbnails;
        assert_eq!(thumbs.explicit, None);
        assert_eq!(
            thumbs.image_enclosure.as_deref(),
            Some("https://cdn.test/e.png")
        );
    }

    #[test]
    fn non_image_enclosure_is_ignored() {
        let doc = r#"{"status":"ok","items":[{"title":"t",
            "enclosure":{"link":"https://cdn.test/e.mp3","type":"audio/mpeg"}}]}"#;
        let feed = extract(doc).expect("valid envelope");
        assert_eq!(feed.items[0].thumbnails.image_enclosure, None);
    }

    #[test]
    fn error_status_is_rejected() {
        let doc = r#"{"status":"error","message":"Cannot download feed","items":[]}"#;
        assert!(matches!(extract(doc), Err(IngestError::RelayStatus(s)) if s == "error"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(extract("{\"items\": ["), Err(IngestError::Json(_))));
    }
}
