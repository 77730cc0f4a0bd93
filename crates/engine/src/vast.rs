//! VAST tag validation, preview-field extraction, and wrapper synthesis.
//!
//! Unlike third-party display tags, a VAST tag must be well-formed XML, so
//! the streaming `quick-xml` reader does double duty: any reader error fails
//! validation, and a clean pass to EOF feeds the field extractor.

use intake_core::types::{ValidationOutcome, VastDocument};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::registry::VAST_TAG_MAX_BYTES;

/// Case-insensitive check for an opening or closing `VAST` element marker.
fn has_vast_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<vast") || lower.contains("</vast")
}

fn is_well_formed(text: &str) -> bool {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Validate pasted VAST tag text.
///
/// The byte-size ceiling is checked independently of structure and reported
/// alongside any structural error; a missing `VAST` marker and malformed XML
/// are distinct failures.
pub fn validate_vast(tag_text: &str) -> ValidationOutcome {
    let mut errors = Vec::new();
    if tag_text.len() as u64 > VAST_TAG_MAX_BYTES {
        errors.push("VAST tag must be at most 50 KB.".to_string());
    }
    let trimmed = tag_text.trim();
    if trimmed.is_empty() {
        errors.push("VAST tag content is required.".to_string());
    } else if !has_vast_marker(trimmed) {
        errors.push("VAST tag must include \"<VAST\".".to_string());
    } else if !is_well_formed(trimmed) {
        errors.push("VAST must be well-formed XML.".to_string());
    }
    ValidationOutcome::from_errors(errors, None)
}

/// Best-effort extraction of preview fields. Returns `None` when the text is
/// not parseable as structured markup at all — distinct from a parseable
/// document whose fields are simply absent.
pub fn parse_vast(tag_text: &str) -> Option<VastDocument> {
    let trimmed = tag_text.trim();
    if trimmed.is_empty() || !has_vast_marker(trimmed) {
        return None;
    }

    let mut reader = Reader::from_str(trimmed);
    let mut doc = VastDocument::default();
    let mut saw_vast_element = false;
    let mut saw_ad_element = false;

    // first-VASTAdTagURI capture
    let mut wrapper_text = String::new();
    let mut wrapper_active = false;
    let mut wrapper_done = false;
    let mut wrapper_depth = 0usize;

    // first-MediaFile capture: nested <URL> text takes priority over the
    // subtree's own text content
    let mut media_active = false;
    let mut media_done = false;
    let mut media_depth = 0usize;
    let mut media_text = String::new();
    let mut url_text = String::new();
    let mut url_active = false;
    let mut url_done = false;
    let mut url_depth = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => return None,
        };
        let is_empty = matches!(&event, Event::Empty(_));
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let name = name.as_ref();
                if name == b"VAST" && !saw_vast_element {
                    saw_vast_element = true;
                    doc.version = attr_value(e, b"version");
                }
                if name == b"Ad" && !saw_ad_element {
                    saw_ad_element = true;
                    doc.ad_id = attr_value(e, b"id");
                }
                if is_empty {
                    continue;
                }
                if wrapper_active {
                    wrapper_depth += 1;
                } else if name == b"VASTAdTagURI" && !wrapper_done {
                    wrapper_active = true;
                    wrapper_depth = 0;
                }
                if media_active {
                    media_depth += 1;
                    if url_active {
                        url_depth += 1;
                    } else if name == b"URL" && !url_done {
                        url_active = true;
                        url_depth = 0;
                    }
                } else if name == b"MediaFile" && !media_done {
                    media_active = true;
                    media_depth = 0;
                }
            }
            Event::End(_) => {
                if wrapper_active {
                    if wrapper_depth == 0 {
                        wrapper_active = false;
                        wrapper_done = true;
                    } else {
                        wrapper_depth -= 1;
                    }
                }
                if media_active {
                    if url_active {
                        if url_depth == 0 {
                            url_active = false;
                            url_done = true;
                        } else {
                            url_depth -= 1;
                        }
                    }
                    if media_depth == 0 {
                        media_active = false;
                        media_done = true;
                    } else {
                        media_depth -= 1;
                    }
                }
            }
            Event::Text(ref t) => {
                if let Ok(text) = t.unescape() {
                    if wrapper_active {
                        wrapper_text.push_str(&text);
                    }
                    if media_active {
                        media_text.push_str(&text);
                        if url_active {
                            url_text.push_str(&text);
                        }
                    }
                }
            }
            Event::CData(ref t) => {
                let text = String::from_utf8_lossy(t);
                if wrapper_active {
                    wrapper_text.push_str(&text);
                }
                if media_active {
                    media_text.push_str(&text);
                    if url_active {
                        url_text.push_str(&text);
                    }
                }
            }
            _ => {}
        }
    }

    if !saw_vast_element {
        return None;
    }

    let non_empty = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };
    doc.wrapper_uri = non_empty(wrapper_text);
    doc.media_file_uri = non_empty(url_text).or_else(|| non_empty(media_text));

    debug!(
        version = doc.version.as_deref().unwrap_or("-"),
        has_media = doc.media_file_uri.is_some(),
        "VAST parsed"
    );
    Some(doc)
}

/// Tracking events stubbed into every synthesized wrapper.
const WRAPPER_EVENTS: [&str; 8] = [
    "start",
    "firstQuartile",
    "midpoint",
    "thirdQuartile",
    "complete",
    "pause",
    "resume",
    "skip",
];

/// Synthesize the preview VAST wrapper for an uploaded video asset: inline
/// media file plus impression/click stubs, with one `progress` event per
/// supplied tracking tag.
pub fn build_wrapper(content_url: &str, tracking_tags: &[String]) -> String {
    let mut tracking_xml = String::new();
    for event in WRAPPER_EVENTS {
        tracking_xml.push_str(&format!(
            "              <Tracking event=\"{event}\"><![CDATA[https://track.example.com/{event}]]></Tracking>\n"
        ));
    }
    for tag in tracking_tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        tracking_xml.push_str(&format!(
            "              <Tracking event=\"progress\"><![CDATA[{tag}]]></Tracking>\n"
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<VAST version="3.0">
  <Ad id="generated">
    <InLine>
      <Impression><![CDATA[https://impression.example.com]]></Impression>
      <Creatives>
        <Creative>
          <Linear>
            <Duration>00:00:15</Duration>
            <MediaFiles>
              <MediaFile delivery="progressive" type="video/mp4" width="1920" height="1080"><![CDATA[{content_url}]]></MediaFile>
            </MediaFiles>
            <VideoClicks>
              <ClickThrough><![CDATA[https://click.example.com]]></ClickThrough>
            </VideoClicks>
            <TrackingEvents>
{tracking_xml}            </TrackingEvents>
          </Linear>
        </Creative>
      </Creatives>
    </InLine>
  </Ad>
</VAST>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const INLINE: &str = concat!(
        "<VAST version=\"4.0\"><Ad id=\"42\"><MediaFile>",
        "<URL>https://m.mp4</URL></MediaFile></Ad></VAST>"
    );

    #[test]
    fn test_parse_inline_fields() {
        let doc = parse_vast(INLINE).unwrap();
        assert_eq!(doc.version.as_deref(), Some("4.0"));
        assert_eq!(doc.ad_id.as_deref(), Some("42"));
        assert_eq!(doc.media_file_uri.as_deref(), Some("https://m.mp4"));
        assert_eq!(doc.wrapper_uri, None);
    }

    #[test]
    fn test_parse_media_file_text_content_fallback() {
        let xml = "<VAST version=\"3.0\"><Ad id=\"a\"><MediaFile><![CDATA[https://cdn.test/v.mp4]]></MediaFile></Ad></VAST>";
        let doc = parse_vast(xml).unwrap();
        assert_eq!(doc.media_file_uri.as_deref(), Some("https://cdn.test/v.mp4"));
    }

    #[test]
    fn test_parse_wrapper_uri() {
        let xml = concat!(
            "<VAST version=\"3.0\"><Ad id=\"w\"><Wrapper>",
            "<VASTAdTagURI><![CDATA[https://ads.test/vast.xml]]></VASTAdTagURI>",
            "</Wrapper></Ad></VAST>"
        );
        let doc = parse_vast(xml).unwrap();
        assert_eq!(doc.wrapper_uri.as_deref(), Some("https://ads.test/vast.xml"));
        assert_eq!(doc.media_file_uri, None);
    }

    #[test]
    fn test_parse_first_media_file_wins() {
        let xml = concat!(
            "<VAST version=\"3.0\"><Ad id=\"m\">",
            "<MediaFile><URL>https://first.mp4</URL></MediaFile>",
            "<MediaFile><URL>https://second.mp4</URL></MediaFile>",
            "</Ad></VAST>"
        );
        let doc = parse_vast(xml).unwrap();
        assert_eq!(doc.media_file_uri.as_deref(), Some("https://first.mp4"));
    }

    #[test]
    fn test_parse_absent_fields_are_none() {
        let doc = parse_vast("<VAST></VAST>").unwrap();
        assert_eq!(doc, VastDocument::default());
    }

    #[test]
    fn test_parse_rejects_unparseable_and_markerless() {
        assert_eq!(parse_vast("just text"), None);
        assert_eq!(parse_vast(""), None);
        // marker present but not well-formed
        assert_eq!(parse_vast("<VAST version=\"3.0\"><Ad></VAST>"), None);
        // marker but no exact-case VAST element
        assert_eq!(parse_vast("<vast version=\"3.0\"></vast>"), None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_vast(INLINE), parse_vast(INLINE));
    }

    #[test]
    fn test_validate_accepts_inline() {
        assert!(validate_vast(INLINE).valid);
    }

    #[test]
    fn test_validate_requires_content() {
        let outcome = validate_vast("  ");
        assert_eq!(outcome.errors, vec!["VAST tag content is required.".to_string()]);
    }

    #[test]
    fn test_validate_requires_marker() {
        let outcome = validate_vast("<video>not vast</video>");
        assert_eq!(outcome.errors, vec!["VAST tag must include \"<VAST\".".to_string()]);
    }

    #[test]
    fn test_validate_requires_well_formed_xml() {
        let outcome = validate_vast("<VAST version=\"3.0\"><Ad></VAST>");
        assert_eq!(outcome.errors, vec!["VAST must be well-formed XML.".to_string()]);
    }

    #[test]
    fn test_validate_size_ceiling_reported_with_structure() {
        let padding = "x".repeat(VAST_TAG_MAX_BYTES as usize);
        let big = format!("no marker here {padding}");
        let outcome = validate_vast(&big);
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors.contains(&"VAST tag must be at most 50 KB.".to_string()));
        assert!(outcome.errors.contains(&"VAST tag must include \"<VAST\".".to_string()));
    }

    #[test]
    fn test_wrapper_contains_media_and_progress_events() {
        let wrapper = build_wrapper("https://cdn.test/v.mp4", &["https://t.test/p".to_string()]);
        assert!(wrapper.contains("<![CDATA[https://cdn.test/v.mp4]]>"));
        assert!(wrapper.contains("event=\"firstQuartile\""));
        assert!(wrapper.contains("<Tracking event=\"progress\"><![CDATA[https://t.test/p]]>"));
        // the wrapper we emit must itself parse
        let doc = parse_vast(&wrapper).unwrap();
        assert_eq!(doc.version.as_deref(), Some("3.0"));
        assert_eq!(doc.ad_id.as_deref(), Some("generated"));
        assert_eq!(doc.media_file_uri.as_deref(), Some("https://cdn.test/v.mp4"));
    }
}
