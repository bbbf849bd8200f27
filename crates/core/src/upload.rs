//! Slide image upload rules.
//!
//! Uploads must declare an image content type, fit under the size limit,
//! and sniff as one of the accepted raster formats. Stored files are named
//! `slide-<unix millis>-<random>.<ext>` and served under [`UPLOAD_URL_PREFIX`].

use image::ImageFormat;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public URL prefix for stored uploads.
pub const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// Multipart field name carrying the file.
pub const UPLOAD_FIELD: &str = "image";

/// Check an upload and return the file extension to store it under.
pub fn validate_image(content_type: Option<&str>, bytes: &[u8], max_bytes: usize) -> Result<&'static str, CoreError> {
    let declared = content_type.unwrap_or_default();
    if !declared.starts_with("image/") {
        return Err(CoreError::Validation("Only image files are allowed".to_string()));
    }
    if bytes.is_empty() {
        return Err(CoreError::Validation("No image uploaded".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "Image exceeds the {max_bytes} byte limit"
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| CoreError::Validation("File content is not a recognised image".to_string()))?;
    extension_for(format).ok_or_else(|| {
        CoreError::Validation(format!("Unsupported image format: {format:?}"))
    })
}

/// Cheap pre-flight check run before any bytes leave the client.
pub fn precheck(content_type: &str, size: usize, max_bytes: usize) -> Result<(), CoreError> {
    if !content_type.starts_with("image/") {
        return Err(CoreError::Validation("Only image files are allowed".to_string()));
    }
    if size > max_bytes {
        return Err(CoreError::Validation(format!(
            "Image exceeds the {max_bytes} byte limit"
        )));
    }
    Ok(())
}

fn extension_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

/// Unique storage name for a new upload.
pub fn upload_file_name(ext: &str, now: Timestamp) -> String {
    format!(
        "slide-{}-{}.{ext}",
        now.timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Public URL for a stored file name.
pub fn upload_url(file_name: &str) -> String {
    format!("{UPLOAD_URL_PREFIX}{file_name}")
}

/// The local file name behind an upload URL.
///
/// Returns `None` for URLs that point elsewhere or would escape the upload
/// directory, so callers never delete outside it.
pub fn local_upload_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix(UPLOAD_URL_PREFIX)?;
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return None;
    }
    Some(name)
}
