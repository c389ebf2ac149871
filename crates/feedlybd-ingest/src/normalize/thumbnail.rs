//! Thumbnail selection through an ordered fallback chain.

use crate::text::first_img_src;

/// Candidate thumbnail sources gathered from one item, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ThumbnailCandidates {
    /// Explicit thumbnail/media field carrying a URL attribute.
    pub(crate) explicit: Option<String>,
    /// Enclosure whose MIME type is an image.
    pub(crate) image_enclosure: Option<String>,
}

/// Pick a thumbnail: explicit field, then image enclosure, then the first
/// `<img>` in `html`.
///
/// The first strategy that produces a candidate wins. The winner is then
/// dropped unless it is an absolute `http`/`https` URL; later strategies are
/// not consulted in that case.
pub(crate) fn resolve_thumbnail(candidates: &ThumbnailCandidates, html: &str) -> Option<String> {
    let chosen = candidates
        .explicit
        .clone()
        .or_else(|| candidates.image_enclosure.clone())
        .or_else(|| first_img_src(html))?;

    if is_absolute_http_url(&chosen) {
        Some(chosen)
    } else {
        tracing::trace!(candidate = %chosen, "discarding non-http thumbnail");
        None
    }
}

/// Whether `value` is an absolute `http://` or `https://` URL with a host.
pub(crate) fn is_absolute_http_url(value: &str) -> bool {
    (value.starts_with("http://") || value.starts_with("https://"))
        && reqwest::Url::parse(value).is_ok_and(|url| url.host_str().is_some())
}

/// Whether a MIME type (or `media:content` medium) denotes an image.
pub(crate) fn is_image_type(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(explicit: Option<&str>, enclosure: Option<&str>) -> ThumbnailCandidates {
        ThumbnailCandidates {
            explicit: explicit.map(str::to_string),
            image_enclosure: enclosure.map(str::to_string),
        }
    }

    #[test]
    fn explicit_field_wins() {
        let c = candidates(
            Some("https://cdn.test/explicit.jpg"),
            Some("https://cdn.test/enclosure.jpg"),
        );
        assert_eq!(
            resolve_thumbnail(&c, r#"<img src="https://cdn.test/inline.jpg">"#).as_deref(),
            Some("https://cdn.test/explicit.jpg")
        );
    }

    #[test]
    fn enclosure_used_when_no_explicit_field() {
        let c = candidates(None, Some("http://cdn.test/enclosure.jpg"));
        assert_eq!(
            resolve_thumbnail(&c, "").as_deref(),
            Some("http://cdn.test/enclosure.jpg")
        );
    }

    #[test]
    fn inline_image_is_last_resort() {
        let c = candidates(None, None);
        assert_eq!(
            resolve_thumbnail(&c, r#"<p><img src="https://cdn.test/inline.jpg"></p>"#).as_deref(),
            Some("https://cdn.test/inline.jpg")
        );
    }

    #[test]
    fn relative_winner_is_discarded_without_falling_through() {
        let c = candidates(Some("/images/thumb.jpg"), Some("https://cdn.test/e.jpg"));
        assert_eq!(resolve_thumbnail(&c, ""), None);
    }

    #[test]
    fn relative_inline_image_is_discarded() {
        let c = candidates(None, None);
        assert_eq!(resolve_thumbnail(&c, r#"<img src="thumb.png">"#), None);
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        assert!(!is_absolute_http_url("data:image/png;base64,AAAA"));
        assert!(!is_absolute_http_url("ftp://cdn.test/a.jpg"));
        assert!(!is_absolute_http_url("//cdn.test/a.jpg"));
        assert!(!is_absolute_http_url("https://"));
        assert!(is_absolute_http_url("https://cdn.test/a.jpg"));
    }

    #[test]
    fn image_type_detection() {
        assert!(is_image_type(Some("image/jpeg")));
        assert!(is_image_type(Some("Image/PNG")));
        assert!(!is_image_type(Some("audio/mpeg")));
        assert!(!is_image_type(None));
    }
}
