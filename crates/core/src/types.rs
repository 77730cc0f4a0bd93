use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level creative category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdType {
    Display,
    Video,
}

impl AdType {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Display => "DISPLAY",
            Self::Video => "VIDEO",
        }
    }
}

impl std::fmt::Display for AdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Concrete submission mechanism and media kind for a creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    DisplayImage,
    DisplayHtml5Zip,
    DisplayThirdPartyTag,
    VideoFile,
    VideoVastTag,
}

impl InputType {
    /// The ad type this input type belongs to.
    pub fn ad_type(self) -> AdType {
        match self {
            Self::DisplayImage | Self::DisplayHtml5Zip | Self::DisplayThirdPartyTag => {
                AdType::Display
            }
            Self::VideoFile | Self::VideoVastTag => AdType::Video,
        }
    }

    /// Whether submissions of this type arrive as pasted tag text rather
    /// than an uploaded file.
    pub fn is_tag(self) -> bool {
        matches!(self, Self::DisplayThirdPartyTag | Self::VideoVastTag)
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::DisplayImage => "DISPLAY_IMAGE",
            Self::DisplayHtml5Zip => "DISPLAY_HTML5_ZIP",
            Self::DisplayThirdPartyTag => "DISPLAY_THIRD_PARTY_TAG",
            Self::VideoFile => "VIDEO_FILE",
            Self::VideoVastTag => "VIDEO_VAST_TAG",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDimensions {
    pub width: u32,
    pub height: u32,
}

/// Descriptor for an uploaded binary asset. Dimension decoding happens
/// outside the engine; `dimensions` is `None` until the caller resolves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAsset {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub dimensions: Option<PixelDimensions>,
}

/// A submitted artifact. Constructed per submission attempt, consumed once,
/// never persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CreativeAsset {
    /// Binary upload (image, zipped bundle, or video file).
    File(FileAsset),
    /// Raw pasted tag text.
    Tag(String),
}

/// Derived facts about a validated asset, forwarded to the preview renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
}

/// Result of one validation call. All applicable checks run and every
/// failure is collected; `errors` is never a partial list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssetMetadata>,
}

impl ValidationOutcome {
    /// Outcome with no errors.
    pub fn passed(metadata: Option<AssetMetadata>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            metadata,
        }
    }

    /// Outcome carrying a single error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::from_errors(vec![message.into()], None)
    }

    /// Derive validity from the collected error list.
    pub fn from_errors(errors: Vec<String>, metadata: Option<AssetMetadata>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            metadata,
        }
    }
}

/// Recognized shape of a third-party display tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagKind {
    Iframe,
    ScriptOnly,
    CompositeInsScript,
    Unrecognized,
}

/// Classification of a third-party tag plus the pieces the preview
/// renderer needs. Pure function of the tag text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagClassification {
    pub kind: TagKind,
    /// `src` of the first iframe, for sandboxed iframe previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframe_target: Option<String>,
    /// Markup fragment a sandboxed preview may render (composite tags only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderable_fragment: Option<String>,
}

impl TagClassification {
    pub fn unrecognized() -> Self {
        Self {
            kind: TagKind::Unrecognized,
            iframe_target: None,
            renderable_fragment: None,
        }
    }
}

/// Preview fields extracted from a VAST document. An absent field means the
/// source markup did not carry it, which is not an error by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VastDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_file_uri: Option<String>,
}

/// Per-tag result from the tracking-tag scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingTagCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full evaluation of one submission attempt: the validation outcome plus
/// whatever structured description the input type yields for preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReport {
    pub id: Uuid,
    pub ad_type: AdType,
    pub input_type: InputType,
    pub outcome: ValidationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<TagClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vast: Option<VastDocument>,
    /// Allow-listed macro tokens found in tag content, for preview annotation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macro_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<ValidationOutcome>,
    pub can_submit: bool,
    pub checked_at: DateTime<Utc>,
}
