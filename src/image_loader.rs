use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use tracing::debug;

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::{SlideshowError, SlideshowResult};

// --- Helper: Load Image Paths ---
/// List the images of a folder whose extension is in the allow-list (case-insensitive).
/// Sorted by file name so runs are reproducible; callers shuffle anyway.
pub fn list_image_paths(dir_path: &Path) -> SlideshowResult<Vec<PathBuf>> {
    debug!("Looking for images in: {}", dir_path.display());
    if !dir_path.is_dir() {
        return Err(SlideshowError::FolderNotFound(dir_path.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} image files", paths.len());
    if paths.is_empty() {
        return Err(SlideshowError::empty_input("No images found in folder"));
    }
    Ok(paths)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

// --- Load Image, Apply EXIF Rotation ---
pub fn load_image_with_exif_rotation(image_path: &Path) -> SlideshowResult<DynamicImage> {
    let file_bytes = fs::read(image_path)?;

    // EXIF is only read reliably from JPEG containers
    let extension = image_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let orientation = if extension == "jpg" || extension == "jpeg" {
        read_orientation(image_path, &file_bytes)
    } else {
        1
    };

    // Decode from content, the extension may lie (e.g. webp served as .jpg)
    let image = image::load_from_memory(&file_bytes)?;
    Ok(apply_orientation(image, orientation))
}

fn read_orientation(image_path: &Path, file_bytes: &[u8]) -> u16 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Short(values) => values.first().copied(),
                _ => None,
            })
            .unwrap_or(1),
        Err(e) => {
            // Non-critical: proceed without rotation
            debug!(
                "Could not read EXIF data for {:?}: {}",
                image_path.file_name().unwrap_or(image_path.as_os_str()),
                e
            );
            1
        }
    }
}

/// Undo the camera orientation recorded in the EXIF `Orientation` tag.
// 1 = Top-left (Normal)
// 2 = Mirrored horizontally
// 3 = Bottom-right (180 deg)
// 4 = Mirrored vertically
// 5 = Mirrored, 90 deg clockwise
// 6 = Top-right (90 deg clockwise)
// 7 = Mirrored, 270 deg clockwise
// 8 = Bottom-left (270 deg clockwise / 90 deg counter-clockwise)
pub fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
