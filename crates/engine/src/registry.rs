//! Static constraint tables, one per (ad type, input type) pair.
//!
//! The tables are compile-time constants; validators receive a
//! `&'static InputTypeSpec` from [`lookup`] and never read ambient state.
//! Requesting a type-incompatible pair is a configuration error, not a
//! validation failure.

use intake_core::types::{AdType, InputType};
use intake_core::{IntakeError, IntakeResult};

/// An allowed width:height ratio entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub w: f64,
    pub h: f64,
}

/// Whether the engine inspects file content for an input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPolicy {
    /// Run every applicable constraint check.
    Enforced,
    /// Accept any payload and record only its byte size. Video uploads are
    /// exempt from content validation; the browse-dialog extension hint is
    /// UI-level guidance and must not be enforced here.
    Exempt,
}

/// Pixel-dimension bounds and the allowed aspect-ratio table.
#[derive(Debug, Clone, Copy)]
pub struct DimensionRules {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratios: &'static [AspectRatio],
    pub aspect_tolerance: f64,
}

/// Constraints on an uploaded binary asset.
#[derive(Debug, Clone, Copy)]
pub struct FileRules {
    pub allowed_extensions: &'static [&'static str],
    pub allowed_mime_types: &'static [&'static str],
    pub allowed_mime_prefixes: &'static [&'static str],
    pub max_size_bytes: Option<u64>,
    pub dimensions: Option<DimensionRules>,
    pub format_error: &'static str,
    pub size_error: &'static str,
}

/// Immutable rule set for one input type. Built once into the binary.
#[derive(Debug, Clone, Copy)]
pub struct InputTypeSpec {
    pub input_type: InputType,
    pub policy: ContentPolicy,
    /// Present for file uploads; `None` for pasted-tag input types.
    pub file: Option<FileRules>,
    /// Byte ceiling on pasted tag text, where one applies.
    pub max_tag_bytes: Option<u64>,
}

pub const DISPLAY_IMAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DISPLAY_HTML5_ZIP_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const VIDEO_FILE_MAX_BYTES: u64 = 100 * 1024 * 1024;
pub const VAST_TAG_MAX_BYTES: u64 = 50 * 1024;
pub const TRACKING_TAGS_MAX: usize = 5;
pub const ASPECT_TOLERANCE: f64 = 0.05;

const DISPLAY_ASPECT_RATIOS: &[AspectRatio] = &[
    AspectRatio { w: 1.91, h: 1.0 },
    AspectRatio { w: 1.0, h: 1.0 },
    AspectRatio { w: 4.0, h: 5.0 },
    AspectRatio { w: 2.0, h: 3.0 },
    AspectRatio { w: 9.0, h: 16.0 },
    AspectRatio { w: 16.0, h: 9.0 },
    AspectRatio { w: 3.0, h: 2.0 },
    AspectRatio { w: 2.0, h: 1.0 },
    AspectRatio { w: 1200.0, h: 628.0 },
    AspectRatio { w: 300.0, h: 250.0 },
    AspectRatio { w: 336.0, h: 280.0 },
    AspectRatio { w: 728.0, h: 90.0 },
    AspectRatio { w: 160.0, h: 600.0 },
    AspectRatio { w: 320.0, h: 50.0 },
    AspectRatio { w: 300.0, h: 600.0 },
    AspectRatio { w: 320.0, h: 100.0 },
    AspectRatio { w: 300.0, h: 100.0 },
    AspectRatio { w: 468.0, h: 60.0 },
    AspectRatio { w: 250.0, h: 250.0 },
];

pub static DISPLAY_IMAGE: InputTypeSpec = InputTypeSpec {
    input_type: InputType::DisplayImage,
    policy: ContentPolicy::Enforced,
    file: Some(FileRules {
        allowed_extensions: &["jpeg", "jpg", "png", "tiff"],
        allowed_mime_types: &["image/jpeg", "image/png", "image/tiff"],
        allowed_mime_prefixes: &[],
        max_size_bytes: Some(DISPLAY_IMAGE_MAX_BYTES),
        dimensions: Some(DimensionRules {
            min_width: 177,
            min_height: 100,
            max_width: 38200,
            max_height: 20000,
            aspect_ratios: DISPLAY_ASPECT_RATIOS,
            aspect_tolerance: ASPECT_TOLERANCE,
        }),
        format_error: "Supported formats: jpeg, jpg, png, tiff.",
        size_error: "File size must be at most 5 MB.",
    }),
    max_tag_bytes: None,
};

pub static DISPLAY_HTML5_ZIP: InputTypeSpec = InputTypeSpec {
    input_type: InputType::DisplayHtml5Zip,
    policy: ContentPolicy::Enforced,
    file: Some(FileRules {
        allowed_extensions: &["zip"],
        allowed_mime_types: &["application/zip", "application/x-zip-compressed"],
        allowed_mime_prefixes: &[],
        max_size_bytes: Some(DISPLAY_HTML5_ZIP_MAX_BYTES),
        dimensions: None,
        format_error: "HTML5 ad must be a .zip file.",
        size_error: "ZIP size must be at most 10 MB.",
    }),
    max_tag_bytes: None,
};

pub static DISPLAY_THIRD_PARTY_TAG: InputTypeSpec = InputTypeSpec {
    input_type: InputType::DisplayThirdPartyTag,
    policy: ContentPolicy::Enforced,
    file: None,
    max_tag_bytes: None,
};

/// Video uploads skip content validation entirely. The extension list and
/// MIME prefix are browse-dialog hints surfaced to the UI, nothing more.
pub static VIDEO_FILE: InputTypeSpec = InputTypeSpec {
    input_type: InputType::VideoFile,
    policy: ContentPolicy::Exempt,
    file: Some(FileRules {
        allowed_extensions: &["mp4", "mov", "gif"],
        allowed_mime_types: &[],
        allowed_mime_prefixes: &["video/"],
        max_size_bytes: Some(VIDEO_FILE_MAX_BYTES),
        dimensions: None,
        format_error: "Video file must be .mp4, .mov, or .gif.",
        size_error: "File size must be at most 100 MB.",
    }),
    max_tag_bytes: None,
};

pub static VIDEO_VAST_TAG: InputTypeSpec = InputTypeSpec {
    input_type: InputType::VideoVastTag,
    policy: ContentPolicy::Enforced,
    file: None,
    max_tag_bytes: Some(VAST_TAG_MAX_BYTES),
};

/// Rule set for a declared (ad type, input type) pair.
///
/// Only type-compatible pairs exist in the registry; anything else is a
/// programmer error and fails fast with [`IntakeError::Config`].
pub fn lookup(ad_type: AdType, input_type: InputType) -> IntakeResult<&'static InputTypeSpec> {
    if input_type.ad_type() != ad_type {
        return Err(IntakeError::Config(format!(
            "input type {input_type} is not valid for ad type {ad_type}"
        )));
    }
    Ok(match input_type {
        InputType::DisplayImage => &DISPLAY_IMAGE,
        InputType::DisplayHtml5Zip => &DISPLAY_HTML5_ZIP,
        InputType::DisplayThirdPartyTag => &DISPLAY_THIRD_PARTY_TAG,
        InputType::VideoFile => &VIDEO_FILE,
        InputType::VideoVastTag => &VIDEO_VAST_TAG,
    })
}
