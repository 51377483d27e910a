//! Image intake: files to inline data strings, the bounded preview list and
//! the logo slot.

use base64::Engine;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Most images one submission may carry
pub const MAX_IMAGES: usize = 5;

/// A file handed to intake, as a browser would see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            mime: guess_mime(path).to_string(),
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// MIME type for a path based on its extension
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Image files directly inside `dir`, sorted by file name
pub fn collect_image_paths(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| guess_mime(path).starts_with("image/"))
        .collect()
}

/// `data:<mime>;base64,<payload>`
pub fn encode_inline(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

/// Encode a file off the async workers
pub async fn read_as_inline(file: MediaFile) -> Result<String> {
    let inline = tokio::task::spawn_blocking(move || encode_inline(&file.mime, &file.bytes)).await?;
    Ok(inline)
}

/// An accepted image ready for the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub original_name: String,
    pub inline_data: String,
}

/// Outcome of one intake
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeReport {
    pub accepted: usize,
    /// Not images, dropped without telling the user
    pub skipped: Vec<String>,
    /// Images past the cap
    pub rejected: Vec<String>,
}

impl IntakeReport {
    pub fn hit_limit(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Ordered, bounded list of accepted images
#[derive(Debug, Clone)]
pub struct ImageList {
    images: Vec<UploadedImage>,
    max: usize,
}

impl Default for ImageList {
    fn default() -> Self {
        Self::with_limit(MAX_IMAGES)
    }
}

impl ImageList {
    pub fn with_limit(max: usize) -> Self {
        Self {
            images: Vec::new(),
            max,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.max
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    /// Accept a selection of files.
    ///
    /// Non-images are skipped, images past the cap are rejected, the rest are
    /// encoded concurrently and appended in selection order.
    pub async fn intake(&mut self, files: Vec<MediaFile>) -> Result<IntakeReport> {
        let mut report = IntakeReport::default();
        let mut pending = Vec::new();

        for file in files {
            if !file.is_image() {
                debug!("Skipping non-image file {} ({})", file.name, file.mime);
                report.skipped.push(file.name);
                continue;
            }
            if self.images.len() + pending.len() >= self.max {
                report.rejected.push(file.name);
                continue;
            }
            pending.push(file);
        }

        if report.hit_limit() {
            warn!(
                "Image limit of {} reached, rejected {} file(s)",
                self.max,
                report.rejected.len()
            );
        }

        let names: Vec<String> = pending.iter().map(|f| f.name.clone()).collect();
        let encoded = join_all(pending.into_iter().map(read_as_inline)).await;

        report.accepted = self.append_encoded(names, encoded)?;
        Ok(report)
    }

    /// Append a batch of encodes; nothing is appended unless all succeeded
    fn append_encoded(&mut self, names: Vec<String>, encoded: Vec<Result<String>>) -> Result<usize> {
        let encoded = encoded.into_iter().collect::<Result<Vec<_>>>()?;
        let count = encoded.len();

        self.images.extend(
            names
                .into_iter()
                .zip(encoded)
                .map(|(original_name, inline_data)| UploadedImage {
                    original_name,
                    inline_data,
                }),
        );
        Ok(count)
    }

    /// Remove the image at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<UploadedImage> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Inline strings for the `media` field
    pub fn inline_data(&self) -> Vec<String> {
        self.images.iter().map(|img| img.inline_data.clone()).collect()
    }
}

/// Corner the logo is placed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl LogoPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            LogoPosition::TopLeft => "top-left",
            LogoPosition::TopRight => "top-right",
            LogoPosition::BottomLeft => "bottom-left",
            LogoPosition::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for LogoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" => Ok(LogoPosition::TopLeft),
            "top-right" => Ok(LogoPosition::TopRight),
            "bottom-left" => Ok(LogoPosition::BottomLeft),
            "bottom-right" => Ok(LogoPosition::BottomRight),
            other => Err(format!("unknown logo position: {}", other)),
        }
    }
}

/// The single logo slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub original_name: String,
    pub inline_data: String,
    pub position: LogoPosition,
}

impl LogoImage {
    /// Encode a logo; `None` when the file is not an image
    pub async fn from_file(file: MediaFile, position: LogoPosition) -> Result<Option<Self>> {
        if !file.is_image() {
            debug!("Skipping non-image logo {} ({})", file.name, file.mime);
            return Ok(None);
        }
        let original_name = file.name.clone();
        let inline_data = read_as_inline(file).await?;
        Ok(Some(Self {
            original_name,
            inline_data,
            position,
        }))
    }
}
