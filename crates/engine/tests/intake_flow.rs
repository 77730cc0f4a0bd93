//! Integration test for the full intake flow: registry lookup through
//! validation, classification, and report assembly for every input type.

use intake_core::types::{
    AdType, CreativeAsset, FileAsset, InputType, PixelDimensions, TagKind,
};
use intake_engine::evaluate;

fn file_asset(filename: &str, mime: &str, size_bytes: u64, dims: Option<(u32, u32)>) -> CreativeAsset {
    CreativeAsset::File(FileAsset {
        filename: filename.to_string(),
        mime_type: mime.to_string(),
        size_bytes,
        dimensions: dims.map(|(width, height)| PixelDimensions { width, height }),
    })
}

#[test]
fn display_image_accepted_then_reclassified_once_dimensions_resolve() {
    // First pass: dimensions still decoding, dimension checks skipped.
    let pending = file_asset("hero.jpg", "image/jpeg", 4 * 1024 * 1024, None);
    let report = evaluate(AdType::Display, InputType::DisplayImage, &pending, &[]).unwrap();
    assert!(report.can_submit);

    // Decode resolved to an off-ratio size: re-validation now fails.
    let resolved = file_asset("hero.jpg", "image/jpeg", 4 * 1024 * 1024, Some((1000, 437)));
    let report = evaluate(AdType::Display, InputType::DisplayImage, &resolved, &[]).unwrap();
    assert!(!report.can_submit);
    assert!(report
        .outcome
        .errors
        .contains(&"Aspect ratio is not in the allowed list.".to_string()));
}

#[test]
fn video_file_passes_where_display_image_fails() {
    // The same gif is rejected as a display image but accepted as a video
    // upload, where content validation is disabled by policy.
    let gif = file_asset("loop.gif", "image/gif", 64 * 1024 * 1024, None);

    let display = evaluate(AdType::Display, InputType::DisplayImage, &gif, &[]).unwrap();
    assert!(!display.can_submit);

    let video = evaluate(AdType::Video, InputType::VideoFile, &gif, &[]).unwrap();
    assert!(video.can_submit);
    assert_eq!(
        video.outcome.metadata.unwrap().file_size_bytes,
        Some(64 * 1024 * 1024)
    );
}

#[test]
fn composite_tag_report_carries_renderable_fragment() {
    let tag = "<ins class=\"dcmads\"></ins>\
               <script src=\"https://www.googletagservices.com/dcm/dcmads.js\"></script>";
    let report = evaluate(
        AdType::Display,
        InputType::DisplayThirdPartyTag,
        &CreativeAsset::Tag(tag.to_string()),
        &[],
    )
    .unwrap();
    assert!(report.can_submit);
    let classification = report.classification.unwrap();
    assert_eq!(classification.kind, TagKind::CompositeInsScript);
    assert_eq!(classification.renderable_fragment.as_deref(), Some(tag));
}

#[test]
fn script_only_tag_is_valid_but_has_no_preview_fields() {
    let report = evaluate(
        AdType::Display,
        InputType::DisplayThirdPartyTag,
        &CreativeAsset::Tag("<script src=\"https://y\"></script>".to_string()),
        &[],
    )
    .unwrap();
    assert!(report.can_submit);
    let classification = report.classification.unwrap();
    assert_eq!(classification.kind, TagKind::ScriptOnly);
    assert_eq!(classification.iframe_target, None);
    assert_eq!(classification.renderable_fragment, None);
}

#[test]
fn vast_wrapper_tag_round_trip() {
    let wrapper = intake_engine::vast::build_wrapper(
        "https://cdn.test/spot.mp4",
        &["https://t.test/progress".to_string()],
    );
    let report = evaluate(
        AdType::Video,
        InputType::VideoVastTag,
        &CreativeAsset::Tag(wrapper),
        &[],
    )
    .unwrap();
    assert!(report.can_submit);
    let doc = report.vast.unwrap();
    assert_eq!(doc.media_file_uri.as_deref(), Some("https://cdn.test/spot.mp4"));
}

#[test]
fn reports_serialize_for_the_preview_renderer() {
    let report = evaluate(
        AdType::Display,
        InputType::DisplayThirdPartyTag,
        &CreativeAsset::Tag("<iframe src=\"https://x\"></iframe>".to_string()),
        &["https://pixel.test/1".to_string()],
    )
    .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["inputType"], "DISPLAY_THIRD_PARTY_TAG");
    assert_eq!(json["classification"]["kind"], "IFRAME");
}
