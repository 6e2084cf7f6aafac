use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::constants::*;
use crate::error::SlideshowResult;
use crate::image_loader::load_image_with_exif_rotation;

/// A normalized frame on disk. The file is removed when the guard is dropped,
/// whatever the outcome of the render.
#[derive(Debug)]
pub struct TempFrame {
    path: PathBuf,
}

impl TempFrame {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFrame {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("Could not remove temporary frame {}: {}", self.path.display(), e);
        }
    }
}

/// Create a fresh, uniquely named frame file next to `source`.
///
/// Names look like `.<file name>.<random>.frame.tmp`: an existing file is never
/// reused, and the extension keeps frames out of the folder listing.
fn create_frame_file(source: &Path) -> SlideshowResult<NamedTempFile> {
    let dir = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = source
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(FRAME_SUFFIX)
        .tempfile_in(dir)?;
    Ok(file)
}

/// Largest size with the same aspect ratio that fits in the box. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (new_width, new_height)
}

/// Drop the alpha channel by compositing over black, or convert to RGB.
pub fn flatten_on_black(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_black = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([over_black(r), over_black(g), over_black(b)])
    })
}

/// Fit the image in the render canvas and center it on black.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    let rgb = flatten_on_black(image);

    let (width, height) = fit_within(rgb.width(), rgb.height(), RENDER_WIDTH, RENDER_HEIGHT);
    let fitted = if (width, height) == rgb.dimensions() {
        rgb
    } else {
        imageops::resize(&rgb, width, height, FilterType::Lanczos3)
    };

    let mut canvas = RgbImage::from_pixel(RENDER_WIDTH, RENDER_HEIGHT, Rgb([0, 0, 0]));
    let offset_x = (RENDER_WIDTH - width) / 2;
    let offset_y = (RENDER_HEIGHT - height) / 2;
    imageops::replace(&mut canvas, &fitted, offset_x as i64, offset_y as i64);
    canvas
}

/// Decode `source`, normalize it and persist the result as a temporary JPEG.
pub fn normalize_to_temp(source: &Path) -> SlideshowResult<TempFrame> {
    let image = load_image_with_exif_rotation(source)?;
    let canvas = normalize(&image);

    // Until `keep`, the half-written file is deleted if encoding fails
    let mut file = create_frame_file(source)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        canvas.write_to(&mut writer, ImageFormat::Jpeg)?;
        writer.flush()?;
    }
    let path = file.into_temp_path().keep().map_err(|e| e.error)?;
    debug!("Wrote frame {}", path.display());
    Ok(TempFrame { path })
}
