//! Photo file storage and derived image variants.
//!
//! Uploads are renamed to a random stem and written to the configured
//! uploads directory along with two width-capped variants (small and
//! medium). When the source image is already narrower than a variant's
//! target width, the variant shares the original file instead of storing
//! a byte-identical copy.

use crate::app_config;
use actix_web::web;
use image::imageops::FilterType;
use std::fs;
use std::path::PathBuf;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Suffix appended to the small variant's file stem.
pub const SMALL_SUFFIX: &str = "_s";
/// Suffix appended to the medium variant's file stem.
pub const MEDIUM_SUFFIX: &str = "_m";

#[derive(Debug)]
pub enum UploadError {
    /// Extension missing or not in the allow-list.
    InvalidExtension(String),
    /// The payload did not decode as an image.
    InvalidImage(String),
    Io(std::io::Error),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::InvalidExtension(ext) => write!(f, "Invalid file extension: {}", ext),
            UploadError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            UploadError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Io(e)
    }
}

impl From<image::ImageError> for UploadError {
    fn from(e: image::ImageError) -> Self {
        UploadError::InvalidImage(e.to_string())
    }
}

/// Filenames of a stored photo and its variants, as recorded in the
/// photos table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPhoto {
    pub filename: String,
    pub filename_s: String,
    pub filename_m: String,
}

/// Extract and validate the lowercased extension of an uploaded filename.
pub fn validate_extension(original_name: &str) -> Result<String, UploadError> {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UploadError::InvalidExtension(ext))
    }
}

fn variant_name(stem: &str, suffix: &str, ext: &str) -> String {
    format!("{}{}.{}", stem, suffix, ext)
}

/// Full path of a stored file inside the uploads directory.
pub fn upload_path(filename: &str) -> PathBuf {
    PathBuf::from(app_config::uploads().path).join(filename)
}

pub fn get_mime_type(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Decode, store and derive variants for an uploaded photo.
///
/// Runs the decode, resize and writes on the blocking thread pool.
pub async fn save_photo(data: Vec<u8>, original_name: &str) -> Result<SavedPhoto, UploadError> {
    let ext = validate_extension(original_name)?;
    let stem = uuid::Uuid::new_v4().simple().to_string();
    let uploads = app_config::uploads();

    let saved = web::block(move || -> Result<SavedPhoto, UploadError> {
        let dir = PathBuf::from(&uploads.path);
        fs::create_dir_all(&dir)?;

        let img = image::load_from_memory(&data)?;

        let filename = format!("{}.{}", stem, ext);
        fs::write(dir.join(&filename), &data)?;

        let mut variants = [filename.clone(), filename.clone()];
        for (slot, (suffix, width)) in variants.iter_mut().zip([
            (SMALL_SUFFIX, uploads.small_width),
            (MEDIUM_SUFFIX, uploads.medium_width),
        ]) {
            if img.width() > width {
                let height =
                    ((width as u64 * img.height() as u64) / img.width() as u64).max(1) as u32;
                let resized = img.resize(width, height, FilterType::Lanczos3);
                let name = variant_name(&stem, suffix, &ext);
                resized.save(dir.join(&name))?;
                *slot = name;
            }
        }

        let [filename_s, filename_m] = variants;
        Ok(SavedPhoto {
            filename,
            filename_s,
            filename_m,
        })
    })
    .await
    .map_err(|e| UploadError::Io(std::io::Error::other(e)))??;

    log::info!("Stored photo {} with variants", saved.filename);
    Ok(saved)
}

/// Remove a photo's files. Variant names equal to the original are
/// deduplicated; missing files are ignored.
pub async fn delete_photo_files(photo: SavedPhoto) -> Result<(), UploadError> {
    web::block(move || -> Result<(), UploadError> {
        let mut names = vec![photo.filename];
        for variant in [photo.filename_s, photo.filename_m] {
            if !names.contains(&variant) {
                names.push(variant);
            }
        }
        for name in names {
            match fs::remove_file(upload_path(&name)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("Failed to delete photo file {}: {}", name, e);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    })
    .await
    .map_err(|e| UploadError::Io(std::io::Error::other(e)))?
}
