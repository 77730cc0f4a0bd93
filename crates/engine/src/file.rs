//! Constraint validation for uploaded binary assets.
//!
//! Every applicable check runs and every failure is collected; a check whose
//! precondition is unmet (pixel dimensions not yet decoded) is skipped, and
//! the caller re-validates once the decode resolves.

use intake_core::types::{AssetMetadata, FileAsset, ValidationOutcome};
use tracing::debug;

use crate::aspect;
use crate::registry::{ContentPolicy, InputTypeSpec};

/// Lowercased extension after the final dot, if any.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Validate an uploaded asset against its input type's rule set.
pub fn validate(asset: &FileAsset, spec: &InputTypeSpec) -> ValidationOutcome {
    if spec.policy == ContentPolicy::Exempt {
        // Video uploads: accept as-is, record only the byte count.
        debug!(filename = %asset.filename, "content validation exempt");
        return ValidationOutcome::passed(Some(AssetMetadata {
            file_size_bytes: Some(asset.size_bytes),
            ..Default::default()
        }));
    }

    let Some(rules) = spec.file.as_ref() else {
        // Pasted-tag input types carry no file rules; nothing to check here.
        return ValidationOutcome::passed(Some(AssetMetadata {
            file_size_bytes: Some(asset.size_bytes),
            ..Default::default()
        }));
    };

    let mut errors = Vec::new();

    let ext_ok = extension_of(&asset.filename)
        .is_some_and(|ext| rules.allowed_extensions.iter().any(|a| *a == ext));
    let mime = asset.mime_type.trim();
    let mime_ok = mime.is_empty()
        || (rules.allowed_mime_types.is_empty() && rules.allowed_mime_prefixes.is_empty())
        || rules
            .allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime))
        || rules
            .allowed_mime_prefixes
            .iter()
            .any(|p| mime.to_ascii_lowercase().starts_with(p));
    if !ext_ok || !mime_ok {
        errors.push(rules.format_error.to_string());
    }

    if let Some(max) = rules.max_size_bytes {
        // Boundary is inclusive: a file exactly at the ceiling passes.
        if asset.size_bytes > max {
            errors.push(rules.size_error.to_string());
        }
    }

    if let (Some(dims), Some(bounds)) = (asset.dimensions, rules.dimensions.as_ref()) {
        if dims.width < bounds.min_width || dims.height < bounds.min_height {
            errors.push(format!(
                "Minimum dimensions: {}x{} px.",
                bounds.min_width, bounds.min_height
            ));
        }
        if dims.width > bounds.max_width || dims.height > bounds.max_height {
            errors.push(format!(
                "Maximum dimensions: {}x{} px.",
                bounds.max_width, bounds.max_height
            ));
        }
        if dims.width > 0
            && dims.height > 0
            && !aspect::matches(
                dims.width,
                dims.height,
                bounds.aspect_ratios,
                bounds.aspect_tolerance,
            )
        {
            errors.push("Aspect ratio is not in the allowed list.".to_string());
        }
    }

    let metadata = AssetMetadata {
        width: asset.dimensions.map(|d| d.width),
        height: asset.dimensions.map(|d| d.height),
        file_type: (!mime.is_empty()).then(|| mime.to_string()),
        file_size_bytes: Some(asset.size_bytes),
    };

    debug!(
        filename = %asset.filename,
        failures = errors.len(),
        "file constraints evaluated"
    );
    ValidationOutcome::from_errors(errors, Some(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DISPLAY_HTML5_ZIP, DISPLAY_IMAGE, DISPLAY_IMAGE_MAX_BYTES, VIDEO_FILE};
    use intake_core::types::PixelDimensions;

    fn image(filename: &str, size_bytes: u64, dims: Option<(u32, u32)>) -> FileAsset {
        FileAsset {
            filename: filename.to_string(),
            mime_type: "image/png".to_string(),
            size_bytes,
            dimensions: dims.map(|(width, height)| PixelDimensions { width, height }),
        }
    }

    #[test]
    fn test_size_boundary_is_inclusive() {
        let at_limit = image("banner.png", DISPLAY_IMAGE_MAX_BYTES, Some((300, 250)));
        let outcome = validate(&at_limit, &DISPLAY_IMAGE);
        assert!(outcome.valid, "errors: {:?}", outcome.errors);

        let over = image("banner.png", DISPLAY_IMAGE_MAX_BYTES + 1, Some((300, 250)));
        let outcome = validate(&over, &DISPLAY_IMAGE);
        assert!(!outcome.valid);
        assert!(outcome.errors.contains(&"File size must be at most 5 MB.".to_string()));
    }

    #[test]
    fn test_gif_rejected_for_display_image() {
        let mut asset = image("spinner.gif", 1024, Some((300, 250)));
        asset.mime_type = "image/gif".to_string();
        let outcome = validate(&asset, &DISPLAY_IMAGE);
        assert!(!outcome.valid);
        assert_eq!(
            outcome.errors,
            vec!["Supported formats: jpeg, jpg, png, tiff.".to_string()]
        );
    }

    #[test]
    fn test_extension_comparison_is_case_insensitive() {
        let outcome = validate(&image("HERO.PNG", 1024, Some((300, 250))), &DISPLAY_IMAGE);
        assert!(outcome.valid, "errors: {:?}", outcome.errors);
    }

    #[test]
    fn test_unknown_dimensions_skip_dimension_checks() {
        let outcome = validate(&image("hero.png", 1024, None), &DISPLAY_IMAGE);
        assert!(outcome.valid);
        let meta = outcome.metadata.unwrap();
        assert_eq!(meta.width, None);
        assert_eq!(meta.file_size_bytes, Some(1024));
    }

    #[test]
    fn test_dimension_failures_all_collected() {
        // too small in both axes and off-ratio
        let outcome = validate(&image("tiny.png", 1024, Some((50, 10))), &DISPLAY_IMAGE);
        assert!(!outcome.valid);
        assert!(outcome.errors.contains(&"Minimum dimensions: 177x100 px.".to_string()));
        assert!(outcome
            .errors
            .contains(&"Aspect ratio is not in the allowed list.".to_string()));
    }

    #[test]
    fn test_zip_rules() {
        let mut bundle = image("ad.zip", 1024, None);
        bundle.mime_type = "application/zip".to_string();
        assert!(validate(&bundle, &DISPLAY_HTML5_ZIP).valid);

        let mut not_zip = image("ad.tar", 1024, None);
        not_zip.mime_type = String::new();
        let outcome = validate(&not_zip, &DISPLAY_HTML5_ZIP);
        assert_eq!(outcome.errors, vec!["HTML5 ad must be a .zip file.".to_string()]);
    }

    #[test]
    fn test_video_file_accepts_anything() {
        // Wrong extension, absurd size, no dimensions: still valid by policy.
        let asset = FileAsset {
            filename: "raw.webm".to_string(),
            mime_type: "application/octet-stream".to_string(),
            size_bytes: 900 * 1024 * 1024,
            dimensions: None,
        };
        let outcome = validate(&asset, &VIDEO_FILE);
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
        let meta = outcome.metadata.unwrap();
        assert_eq!(meta.file_size_bytes, Some(900 * 1024 * 1024));
        assert_eq!(meta.file_type, None);
        assert_eq!(meta.width, None);
    }
}
