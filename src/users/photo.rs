/**
 * User Photo Processing
 *
 * Uploaded profile photos are validated as images, resized to a fixed
 * 500x500 square, re-encoded as JPEG at quality 90, and stored under the
 * public images directory. The user record only keeps the filename.
 */

use std::path::Path;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use uuid::Uuid;

use crate::error::ApiError;

/// Output square dimension in pixels
pub const PHOTO_SIZE: u32 = 500;

/// JPEG re-encoding quality
pub const JPEG_QUALITY: u8 = 90;

/// Filename for a user's processed photo
///
/// The millisecond timestamp keeps successive uploads from colliding with
/// cached copies of the previous file.
pub fn photo_filename(user_id: Uuid) -> String {
    format!(
        "user-{}-{}.jpeg",
        user_id,
        chrono::Utc::now().timestamp_millis()
    )
}

/// Decode, resize, and re-encode an uploaded photo
///
/// CPU-bound; callers run this on the blocking pool. Any decode failure is
/// a validation error - the bytes were not an image we understand.
pub fn process_photo(bytes: &[u8]) -> Result<Vec<u8>, ApiError> {
    let img = image::load_from_memory(bytes)
        .map_err(|_| ApiError::validation("Not an image! Please upload only images."))?;

    // resize_to_fill crops to the square instead of distorting the aspect
    // ratio; to_rgb8 drops any alpha channel JPEG can not carry.
    let img = img
        .resize_to_fill(PHOTO_SIZE, PHOTO_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    img.write_with_encoder(encoder).map_err(|e| {
        tracing::error!("Failed to encode photo: {:?}", e);
        ApiError::internal("Failed to process photo")
    })?;

    Ok(out)
}

/// Write a processed photo into the upload directory
pub async fn store_photo(dir: &Path, filename: &str, data: Vec<u8>) -> Result<(), ApiError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory: {:?}", e);
        ApiError::internal("Failed to store photo")
    })?;

    tokio::fs::write(dir.join(filename), data).await.map_err(|e| {
        tracing::error!("Failed to write photo: {:?}", e);
        ApiError::internal("Failed to store photo")
    })
}

/// Best-effort removal of a replaced photo
///
/// Fire-and-forget relative to the response; failures are logged only.
/// The shared default image is never removed.
pub fn delete_old_photo(dir: &Path, photo: &str) {
    if photo.starts_with("default") {
        return;
    }

    let path = dir.join(photo);
    tokio::spawn(async move {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to delete old photo {:?}: {}", path, e);
        }
    });
}
