//! Third-party display tag classification.
//!
//! Vendor tags arrive as arbitrary, frequently malformed HTML fragments, so
//! this module tokenizes them the tolerant way a browser would instead of
//! demanding well-formed XML: unclosed elements, stray text, attribute
//! quirks, and comments are all accepted. Classification only needs element
//! names and attributes, never a full DOM.

use intake_core::types::{TagClassification, TagKind, ValidationOutcome};
use tracing::debug;

/// Class-attribute token marking the composite vendor pattern.
const COMPOSITE_CLASS_TOKEN: &str = "dcmads";
/// Script `src` substring completing the composite vendor pattern.
const COMPOSITE_SCRIPT_SRC: &str = "dcm/dcmads.js";

/// One tokenized element: lowercased name plus attributes in source order.
#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    let start = from.min(bytes.len());
    bytes[start..]
        .iter()
        .position(|b| *b == needle)
        .map(|p| start + p)
}

fn find_sub(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let start = from.min(bytes.len());
    bytes[start..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| start + p)
}

fn find_sub_ignore_case(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let start = from.min(bytes.len());
    bytes[start..]
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|p| start + p)
}

/// Read an element's name and attributes starting just past its `<`.
/// Returns the element and the offset one past its closing `>` (or the end
/// of input when the tag never closes).
fn read_element(bytes: &[u8], mut i: usize) -> (Element, usize) {
    let name_start = i;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':')
    {
        i += 1;
    }
    let name = String::from_utf8_lossy(&bytes[name_start..i]).to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => i += 1,
            _ => {
                let key_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                if i == key_start {
                    // stray byte that is neither name nor delimiter
                    i += 1;
                    continue;
                }
                let key = String::from_utf8_lossy(&bytes[key_start..i]).to_ascii_lowercase();
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                let mut value = String::new();
                if i < bytes.len() && bytes[i] == b'=' {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                        let quote = bytes[i];
                        i += 1;
                        let value_start = i;
                        // an unterminated quote runs to the end of input
                        i = find_byte(bytes, i, quote).unwrap_or(bytes.len());
                        value = String::from_utf8_lossy(&bytes[value_start..i]).into_owned();
                        if i < bytes.len() {
                            i += 1;
                        }
                    } else {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        value = String::from_utf8_lossy(&bytes[value_start..i]).into_owned();
                    }
                }
                attrs.push((key, value));
            }
        }
    }
    (Element { name, attrs }, i)
}

/// Skip past the matching close tag of a raw-text element (`<script>`,
/// `<style>`), whose content must not be tokenized.
fn skip_raw_text(bytes: &[u8], from: usize, name: &str) -> usize {
    let close = format!("</{name}");
    match find_sub_ignore_case(bytes, from, close.as_bytes()) {
        Some(pos) => find_byte(bytes, pos, b'>').map_or(bytes.len(), |p| p + 1),
        None => bytes.len(),
    }
}

/// Tolerant single-pass tokenizer. Anything that does not look like a tag is
/// treated as text and skipped; a fragment with no recognizable element
/// yields an empty list.
fn tokenize(input: &str) -> Vec<Element> {
    let bytes = input.as_bytes();
    let mut elements = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(b"<!--") {
            i = find_sub(bytes, i + 4, b"-->").map_or(bytes.len(), |p| p + 3);
            continue;
        }
        if i + 1 < bytes.len() && (bytes[i + 1] == b'!' || bytes[i + 1] == b'?') {
            // doctype or processing instruction
            i = find_byte(bytes, i, b'>').map_or(bytes.len(), |p| p + 1);
            continue;
        }
        if i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            i = find_byte(bytes, i, b'>').map_or(bytes.len(), |p| p + 1);
            continue;
        }
        if i + 1 >= bytes.len() || !bytes[i + 1].is_ascii_alphabetic() {
            // bare '<' in text
            i += 1;
            continue;
        }
        let (element, next) = read_element(bytes, i + 1);
        i = if element.name == "script" || element.name == "style" {
            skip_raw_text(bytes, next, &element.name)
        } else {
            next
        };
        elements.push(element);
    }
    elements
}

/// Inner content of an explicit `<body>`, or the whole fragment when none.
fn body_inner(input: &str) -> &str {
    let bytes = input.as_bytes();
    let mut from = 0;
    while let Some(open) = find_sub_ignore_case(bytes, from, b"<body") {
        let tag_ends = matches!(
            bytes.get(open + 5).copied(),
            None | Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')
        );
        if !tag_ends {
            from = open + 5;
            continue;
        }
        let Some(start) = find_byte(bytes, open, b'>').map(|p| p + 1) else {
            return input;
        };
        let end = find_sub_ignore_case(bytes, start, b"</body").unwrap_or(bytes.len());
        return input[start..end].trim();
    }
    input
}

/// Composite vendor pattern: an element whose class contains `dcmads`,
/// co-occurring (either order) with a script whose `src` references
/// `dcm/dcmads.js`.
fn has_composite_pattern(elements: &[Element]) -> bool {
    let has_marker = elements
        .iter()
        .any(|e| e.attr("class").is_some_and(|c| c.contains(COMPOSITE_CLASS_TOKEN)));
    let has_vendor_script = elements.iter().any(|e| {
        e.name == "script" && e.attr("src").is_some_and(|s| s.contains(COMPOSITE_SCRIPT_SRC))
    });
    has_marker && has_vendor_script
}

fn classify_elements(trimmed: &str, elements: &[Element]) -> TagClassification {
    if has_composite_pattern(elements) {
        return TagClassification {
            kind: TagKind::CompositeInsScript,
            iframe_target: None,
            renderable_fragment: Some(body_inner(trimmed).to_string()),
        };
    }
    if let Some(frame) = elements.iter().find(|e| e.name == "iframe") {
        let target = frame
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        return TagClassification {
            kind: TagKind::Iframe,
            iframe_target: target,
            renderable_fragment: None,
        };
    }
    if elements.iter().any(|e| e.name == "script") {
        return TagClassification {
            kind: TagKind::ScriptOnly,
            iframe_target: None,
            renderable_fragment: None,
        };
    }
    TagClassification::unrecognized()
}

/// Classify arbitrary third-party tag text. Pure: identical input yields
/// identical output, and nothing here ever panics on malformed markup.
pub fn classify(tag_text: &str) -> TagClassification {
    let trimmed = tag_text.trim();
    if trimmed.is_empty() {
        return TagClassification::unrecognized();
    }
    let elements = tokenize(trimmed);
    let classification = classify_elements(trimmed, &elements);
    debug!(kind = ?classification.kind, elements = elements.len(), "tag classified");
    classification
}

/// Validation layer over [`classify`]: a tag is accepted only when it has a
/// recognized shape.
pub fn validate_third_party_tag(tag_text: &str) -> ValidationOutcome {
    let trimmed = tag_text.trim();
    if trimmed.is_empty() {
        return ValidationOutcome::failed("Tag content is required.");
    }
    if !trimmed.contains('<') || !trimmed.contains('>') {
        return ValidationOutcome::failed(
            "Third-party tag must contain HTML (iframe, script, or ins+script).",
        );
    }
    let elements = tokenize(trimmed);
    if elements.is_empty() {
        return ValidationOutcome::failed("Tag content must be valid HTML.");
    }
    match classify_elements(trimmed, &elements).kind {
        TagKind::Unrecognized => ValidationOutcome::failed(
            "Tag must contain an iframe, a script tag, or the ins+script pattern.",
        ),
        _ => ValidationOutcome::passed(None),
    }
}
