// Media storage - uploaded post images kept as plain files under the media root

use once_cell::sync::Lazy;
use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Subdirectory of the media root holding post images.
pub const POST_IMAGE_DIR: &str = "posts";

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex"));

/// An image received with a post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dirs(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(self.root.join(POST_IMAGE_DIR)).await?;
        Ok(())
    }

    /// Absolute location of a media-relative path such as `posts/cat.png`.
    pub fn path_for(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write the image and return its media-relative path.
    ///
    /// An existing file with the same name gets a random suffix instead of
    /// being overwritten. The file is created exclusively, so concurrent
    /// uploads of one name never share a path.
    pub async fn save_post_image(&self, image: &UploadedImage) -> AppResult<String> {
        self.ensure_dirs().await?;

        let file_name = sanitize_file_name(&image.file_name);
        let mut relative = format!("{}/{}", POST_IMAGE_DIR, file_name);
        let mut file = loop {
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_for(&relative))
                .await;
            match opened {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    relative = format!("{}/{}", POST_IMAGE_DIR, with_suffix(&file_name, &random_suffix()));
                }
                Err(e) => {
                    return Err(AppError::Internal(format!("Failed to create image {}: {}", relative, e)));
                }
            }
        };

        let written = async {
            file.write_all(&image.bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            self.remove_post_image(&relative).await;
            return Err(AppError::Internal(format!("Failed to store image {}: {}", relative, e)));
        }

        info!("Stored post image {} ({} bytes)", relative, image.bytes.len());
        Ok(relative)
    }

    /// Delete a stored image whose post was never saved.
    pub async fn remove_post_image(&self, relative: &str) {
        match tokio::fs::remove_file(self.path_for(relative)).await {
            Ok(()) => debug!("Removed orphaned image {}", relative),
            Err(e) => warn!("Failed to remove orphaned image {}: {}", relative, e),
        }
    }
}

/// True when the bytes start with a GIF, PNG, JPEG, WebP or BMP signature.
pub fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(b"\xFF\xD8\xFF")
        || (bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
        || looks_like_bmp(bytes)
}

// "BM", a 14-byte file header, then a DIB header whose size is one of the known variants.
fn looks_like_bmp(bytes: &[u8]) -> bool {
    if bytes.len() < 18 || !bytes.starts_with(b"BM") {
        return false;
    }
    let dib_size = u32::from_le_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]);
    matches!(dib_size, 12 | 40 | 52 | 56 | 64 | 108 | 124)
}

fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_FILE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

fn with_suffix(file_name: &str, suffix: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", file_name, suffix),
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect()
}
