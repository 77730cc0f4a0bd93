//! Bulk creative bundles: a zip of assets plus an optional `manifest.csv`
//! carrying per-file tracking tags.
//!
//! Each archive member becomes one [`BundleItem`] validated on its own;
//! a corrupt archive is a single global error, never a panic.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use intake_core::types::{FileAsset, PixelDimensions, ValidationOutcome};
use serde::Serialize;
use tracing::debug;
use zip::ZipArchive;

use crate::registry::{DISPLAY_IMAGE, VIDEO_FILE};
use crate::{file, probe, tracking};

/// One entry recovered from a bulk upload bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItem {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<PixelDimensions>,
    pub tracking_tags: Vec<String>,
    pub outcome: ValidationOutcome,
}

/// A `manifest.csv` row: filename plus up to five tracking tags.
#[derive(Debug, Clone)]
struct ManifestRow {
    filename: String,
    tracking_tags: Vec<String>,
}

/// Parse `manifest.csv`: a header row with a `filename` column and any
/// number of `tracking*` columns (first five kept). Unusable manifests
/// yield no rows rather than an error.
fn parse_manifest_csv(bytes: &[u8]) -> Vec<ManifestRow> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let Some(header) = lines.first() else {
        return Vec::new();
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let Some(filename_idx) = columns.iter().position(|h| h == "filename") else {
        return Vec::new();
    };
    let tracking_cols: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != filename_idx && h.starts_with("tracking"))
        .map(|(i, _)| i)
        .take(5)
        .collect();

    let mut rows = Vec::new();
    for line in &lines[1..] {
        let parts: Vec<String> = line
            .split(',')
            .map(|p| p.trim().trim_matches('"').to_string())
            .collect();
        let Some(filename) = parts.get(filename_idx) else {
            continue;
        };
        let tracking_tags = tracking_cols
            .iter()
            .filter_map(|&i| parts.get(i))
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        rows.push(ManifestRow {
            filename: filename.clone(),
            tracking_tags,
        });
    }
    rows
}

fn manifest_lookup(rows: Vec<ManifestRow>) -> HashMap<String, Vec<String>> {
    rows.into_iter()
        .map(|row| {
            let key = row.filename.trim_start_matches("./").to_string();
            (key, row.tracking_tags)
        })
        .collect()
}

fn base_name(entry_name: &str) -> String {
    entry_name
        .rsplit('/')
        .next()
        .unwrap_or(entry_name)
        .to_string()
}

fn read_manifest<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Vec<ManifestRow> {
    for index in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(index) else {
            continue;
        };
        if !entry.name().to_ascii_lowercase().ends_with("manifest.csv") {
            continue;
        }
        let mut buf = Vec::new();
        if entry.read_to_end(&mut buf).is_ok() {
            return parse_manifest_csv(&buf);
        }
        break;
    }
    Vec::new()
}

fn skip_entry(name: &str) -> bool {
    name.ends_with('/') || name.to_ascii_lowercase().ends_with("manifest.csv")
}

/// Decompose a display bundle: every non-manifest member is probed for
/// dimensions and validated as a display image, with tracking tags joined
/// in from the manifest.
pub fn inspect_display_bundle(zip_bytes: &[u8]) -> (Vec<BundleItem>, Vec<String>) {
    let mut archive = match ZipArchive::new(Cursor::new(zip_bytes)) {
        Ok(archive) => archive,
        Err(_) => return (Vec::new(), vec!["Invalid ZIP file.".to_string()]),
    };
    let manifest = manifest_lookup(read_manifest(&mut archive));

    let mut items = Vec::new();
    for index in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(index) else {
            continue;
        };
        let entry_name = entry.name().to_string();
        if skip_entry(&entry_name) {
            continue;
        }
        let mut data = Vec::new();
        if entry.read_to_end(&mut data).is_err() {
            continue;
        }

        let filename = base_name(&entry_name);
        let content_type = match filename.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()) {
            Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
            Some(ext) if ext == "png" => "image/png",
            Some(ext) if ext == "gif" => "image/gif",
            Some(ext) if ext == "tiff" => "image/tiff",
            _ => "application/octet-stream",
        };
        let dimensions = probe::image_dimensions(&data)
            .map(|(width, height)| PixelDimensions { width, height });
        let tracking_tags: Vec<String> = manifest.get(&filename).cloned().unwrap_or_default();

        let asset = FileAsset {
            filename: filename.clone(),
            mime_type: content_type.to_string(),
            size_bytes: data.len() as u64,
            dimensions,
        };
        let mut outcome = file::validate(&asset, &DISPLAY_IMAGE);
        let tracking_outcome = tracking::validate_tracking_tags(&tracking_tags);
        if !tracking_outcome.valid {
            outcome.errors.extend(tracking_outcome.errors);
            outcome.valid = false;
        }

        items.push(BundleItem {
            filename,
            content_type: content_type.to_string(),
            size_bytes: data.len() as u64,
            dimensions,
            tracking_tags,
            outcome,
        });
    }
    debug!(items = items.len(), "display bundle decomposed");
    (items, Vec::new())
}

/// Decompose a video bundle: only `.mp4` members are accepted; validation
/// follows the video-file policy (size-only metadata).
pub fn inspect_video_bundle(zip_bytes: &[u8]) -> (Vec<BundleItem>, Vec<String>) {
    let mut archive = match ZipArchive::new(Cursor::new(zip_bytes)) {
        Ok(archive) => archive,
        Err(_) => return (Vec::new(), vec!["Invalid ZIP file.".to_string()]),
    };
    let manifest = manifest_lookup(read_manifest(&mut archive));

    let mut items = Vec::new();
    for index in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(index) else {
            continue;
        };
        let entry_name = entry.name().to_string();
        if skip_entry(&entry_name) {
            continue;
        }
        let mut data = Vec::new();
        if entry.read_to_end(&mut data).is_err() {
            continue;
        }

        let filename = base_name(&entry_name);
        if !filename.to_ascii_lowercase().ends_with(".mp4") {
            items.push(BundleItem {
                filename,
                content_type: "application/octet-stream".to_string(),
                size_bytes: data.len() as u64,
                dimensions: None,
                tracking_tags: Vec::new(),
                outcome: ValidationOutcome::failed(
                    "Only .mp4 files allowed in video bulk upload.",
                ),
            });
            continue;
        }
        let tracking_tags: Vec<String> = manifest.get(&filename).cloned().unwrap_or_default();

        let asset = FileAsset {
            filename: filename.clone(),
            mime_type: "video/mp4".to_string(),
            size_bytes: data.len() as u64,
            dimensions: None,
        };
        let mut outcome = file::validate(&asset, &VIDEO_FILE);
        let tracking_outcome = tracking::validate_tracking_tags(&tracking_tags);
        if !tracking_outcome.valid {
            outcome.errors.extend(tracking_outcome.errors);
            outcome.valid = false;
        }

        items.push(BundleItem {
            filename,
            content_type: "video/mp4".to_string(),
            size_bytes: data.len() as u64,
            dimensions: None,
            tracking_tags,
            outcome,
        });
    }
    debug!(items = items.len(), "video bundle decomposed");
    (items, Vec::new())
}
