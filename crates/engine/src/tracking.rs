//! Auxiliary tracking-tag shape checks and macro-token scanning.
//!
//! Macro detection is informational only: it annotates the preview and never
//! blocks a submission.

use intake_core::types::{TrackingTagCheck, ValidationOutcome};

use crate::registry::TRACKING_TAGS_MAX;

/// Macros an ad server may substitute at serve time. Only these are reported
/// by the scanner; unlisted `%%...%%` tokens pass through silently.
pub const MACRO_ALLOWLIST: [&str; 10] = [
    "%%CLICK_URL_UNESC%%",
    "%%CLICK_URL_ESC%%",
    "%%CACHEBUSTER%%",
    "%%DEST_URL%%",
    "%%DEST_URL_ESC%%",
    "%%SESSION_ID%%",
    "%%SITE%%",
    "%%AD_ID%%",
    "%%CAMPAIGN_ID%%",
    "%%PLACEMENT_ID%%",
];

/// Validate a single tracking tag. Empty tags are valid (the field is
/// optional); a non-empty tag must look like a URL pixel or a script snippet.
pub fn validate_tracking_tag(tag: &str) -> TrackingTagCheck {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return TrackingTagCheck {
            valid: true,
            error: None,
        };
    }
    let lower = trimmed.to_ascii_lowercase();
    let is_url_pixel = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.contains("<img");
    let is_script = lower.contains("<script");
    if !is_url_pixel && !is_script {
        return TrackingTagCheck {
            valid: false,
            error: Some(
                "Tag must be a URL pixel (http(s):// or <img) or JavaScript (<script).".to_string(),
            ),
        };
    }
    TrackingTagCheck {
        valid: true,
        error: None,
    }
}

/// Validate a submission's tracking tags: per-tag shape plus the overall cap.
pub fn validate_tracking_tags(tags: &[String]) -> ValidationOutcome {
    let mut errors = Vec::new();
    if tags.len() > TRACKING_TAGS_MAX {
        errors.push(format!("Maximum {TRACKING_TAGS_MAX} tracking tags allowed."));
    }
    for (index, tag) in tags.iter().enumerate() {
        if let Some(error) = validate_tracking_tag(tag).error {
            errors.push(format!("Tag {}: {}", index + 1, error));
        }
    }
    ValidationOutcome::from_errors(errors, None)
}

/// Allow-listed macro tokens present in `text`, in order of first occurrence.
pub fn detect_macro_tokens(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = MACRO_ALLOWLIST
        .iter()
        .filter_map(|token| text.find(token).map(|pos| (pos, *token)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, token)| token.to_string()).collect()
}

/// Replace allow-listed macros with fixed preview values; unlisted tokens
/// pass through untouched.
pub fn substitute_macros(text: &str) -> String {
    let mut out = text.to_string();
    for token in MACRO_ALLOWLIST {
        let replacement = match token {
            "%%CACHEBUSTER%%" => "123456789",
            "%%CLICK_URL_ESC%%" => "https%3A%2F%2Fexample.com%2Fclick",
            "%%CLICK_URL_UNESC%%" => "https://example.com/click",
            _ => "demo_value",
        };
        out = out.replace(token, replacement);
    }
    out
}
