//! Submission evaluation: the registry supplies the rule set, the matching
//! validator or parser runs, and the structured result flows to the preview
//! renderer and, on success, to the persistence layer.

use chrono::Utc;
use intake_core::types::{
    AdType, CreativeAsset, InputType, IntakeReport, TagClassification, ValidationOutcome,
    VastDocument,
};
use intake_core::{IntakeError, IntakeResult};
use tracing::info;
use uuid::Uuid;

use crate::{file, registry, tag, tracking, vast};

/// Evaluate one submission attempt.
///
/// Validation failures come back inside the report; `Err` is reserved for
/// configuration errors (incompatible type pair, or an asset of the wrong
/// kind for the input type), which are programmer errors and fatal.
pub fn evaluate(
    ad_type: AdType,
    input_type: InputType,
    asset: &CreativeAsset,
    tracking_tags: &[String],
) -> IntakeResult<IntakeReport> {
    let spec = registry::lookup(ad_type, input_type)?;

    let mut classification: Option<TagClassification> = None;
    let mut vast_doc: Option<VastDocument> = None;
    let mut macro_tokens = Vec::new();

    let outcome = match input_type {
        InputType::DisplayImage | InputType::DisplayHtml5Zip | InputType::VideoFile => {
            let CreativeAsset::File(file_asset) = asset else {
                return Err(IntakeError::Config(format!(
                    "{input_type} submissions require an uploaded file"
                )));
            };
            file::validate(file_asset, spec)
        }
        InputType::DisplayThirdPartyTag => {
            let CreativeAsset::Tag(text) = asset else {
                return Err(IntakeError::Config(format!(
                    "{input_type} submissions require pasted tag text"
                )));
            };
            classification = Some(tag::classify(text));
            macro_tokens = tracking::detect_macro_tokens(text);
            tag::validate_third_party_tag(text)
        }
        InputType::VideoVastTag => {
            let CreativeAsset::Tag(text) = asset else {
                return Err(IntakeError::Config(format!(
                    "{input_type} submissions require pasted tag text"
                )));
            };
            vast_doc = vast::parse_vast(text);
            macro_tokens = tracking::detect_macro_tokens(text);
            vast::validate_vast(text)
        }
    };

    let tracking_outcome: Option<ValidationOutcome> = (!tracking_tags.is_empty())
        .then(|| tracking::validate_tracking_tags(tracking_tags));
    let can_submit =
        outcome.valid && tracking_outcome.as_ref().map_or(true, |t| t.valid);

    info!(
        ad_type = %ad_type,
        input_type = %input_type,
        can_submit,
        failures = outcome.errors.len(),
        "submission evaluated"
    );

    Ok(IntakeReport {
        id: Uuid::new_v4(),
        ad_type,
        input_type,
        outcome,
        classification,
        vast: vast_doc,
        macro_tokens,
        tracking: tracking_outcome,
        can_submit,
        checked_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::types::{FileAsset, PixelDimensions, TagKind};

    fn image_asset() -> CreativeAsset {
        CreativeAsset::File(FileAsset {
            filename: "banner.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 128 * 1024,
            dimensions: Some(PixelDimensions {
                width: 300,
                height: 250,
            }),
        })
    }

    #[test]
    fn test_display_image_flow() {
        let report = evaluate(
            AdType::Display,
            InputType::DisplayImage,
            &image_asset(),
            &[],
        )
        .unwrap();
        assert!(report.can_submit);
        assert!(report.classification.is_none());
        assert!(report.vast.is_none());
        assert!(report.tracking.is_none());
    }

    #[test]
    fn test_incompatible_pair_is_fatal() {
        let err = evaluate(AdType::Video, InputType::DisplayImage, &image_asset(), &[]);
        assert!(matches!(err, Err(IntakeError::Config(_))));
    }

    #[test]
    fn test_wrong_asset_kind_is_fatal() {
        let err = evaluate(
            AdType::Display,
            InputType::DisplayImage,
            &CreativeAsset::Tag("<iframe></iframe>".to_string()),
            &[],
        );
        assert!(matches!(err, Err(IntakeError::Config(_))));
    }

    #[test]
    fn test_third_party_tag_flow() {
        let tag_text = "<iframe src=\"https://x?cb=%%CACHEBUSTER%%\"></iframe>".to_string();
        let report = evaluate(
            AdType::Display,
            InputType::DisplayThirdPartyTag,
            &CreativeAsset::Tag(tag_text),
            &["https://pixel.test/1".to_string()],
        )
        .unwrap();
        assert!(report.can_submit);
        let classification = report.classification.unwrap();
        assert_eq!(classification.kind, TagKind::Iframe);
        assert_eq!(report.macro_tokens, vec!["%%CACHEBUSTER%%".to_string()]);
        assert!(report.tracking.unwrap().valid);
    }

    #[test]
    fn test_invalid_tracking_blocks_submission() {
        let report = evaluate(
            AdType::Display,
            InputType::DisplayThirdPartyTag,
            &CreativeAsset::Tag("<script src=\"https://y\"></script>".to_string()),
            &["bogus".to_string()],
        )
        .unwrap();
        assert!(report.outcome.valid);
        assert!(!report.can_submit);
    }

    #[test]
    fn test_vast_flow() {
        let xml = "<VAST version=\"4.0\"><Ad id=\"42\"><MediaFile><URL>https://m.mp4</URL></MediaFile></Ad></VAST>";
        let report = evaluate(
            AdType::Video,
            InputType::VideoVastTag,
            &CreativeAsset::Tag(xml.to_string()),
            &[],
        )
        .unwrap();
        assert!(report.can_submit);
        let doc = report.vast.unwrap();
        assert_eq!(doc.version.as_deref(), Some("4.0"));
        assert_eq!(doc.ad_id.as_deref(), Some("42"));
        assert_eq!(doc.media_file_uri.as_deref(), Some("https://m.mp4"));
    }

    #[test]
    fn test_unparseable_vast_reports_failure_and_no_document() {
        let report = evaluate(
            AdType::Video,
            InputType::VideoVastTag,
            &CreativeAsset::Tag("plain words".to_string()),
            &[],
        )
        .unwrap();
        assert!(!report.can_submit);
        assert!(report.vast.is_none());
    }
}
