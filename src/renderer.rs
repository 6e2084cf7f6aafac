//! Slideshow assembly: normalize every image, then encode them in order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::constants::DISPLAY_DURATION;
use crate::error::{SlideshowError, SlideshowResult};
use crate::ffmpeg::Ffmpeg;
use crate::frame::{TempFrame, normalize_to_temp};

/// How long each image stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTiming {
    /// Every image is shown for the same fixed duration
    PerImage(Duration),
    /// The total is split evenly over the images that could be decoded
    SpreadOver(Duration),
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::PerImage(DISPLAY_DURATION)
    }
}

impl FrameTiming {
    pub fn frame_duration(&self, frame_count: usize) -> SlideshowResult<Duration> {
        let duration = match *self {
            Self::PerImage(duration) => duration,
            Self::SpreadOver(total) => total / frame_count.max(1) as u32,
        };
        if duration.is_zero() {
            return Err(SlideshowError::invalid_parameter(
                "each image must be displayed for a positive duration",
            ));
        }
        Ok(duration)
    }
}

/// The normalized frames of one render, in display order.
///
/// Dropping the job deletes the temporary frame files.
#[derive(Debug)]
pub struct SlideshowJob {
    pub frames: Vec<TempFrame>,
    pub frame_duration: Duration,
    pub output_path: PathBuf,
}

impl SlideshowJob {
    pub fn total_duration(&self) -> Duration {
        self.frame_duration * self.frames.len() as u32
    }
}

/// Normalize every image; unreadable images are logged and skipped.
pub fn prepare_job(
    image_paths: &[PathBuf],
    output_path: &Path,
    timing: FrameTiming,
) -> SlideshowResult<SlideshowJob> {
    let mut frames = Vec::with_capacity(image_paths.len());
    for (i, image_path) in image_paths.iter().enumerate() {
        info!("Processing image {}/{}: {}", i + 1, image_paths.len(), image_path.display());
        match normalize_to_temp(image_path) {
            Ok(frame) => frames.push(frame),
            Err(e) => warn!("Skipping {}: {}", image_path.display(), e),
        }
    }

    if frames.is_empty() {
        return Err(SlideshowError::NoValidFrames);
    }

    let frame_duration = timing.frame_duration(frames.len())?;
    Ok(SlideshowJob {
        frames,
        frame_duration,
        output_path: output_path.to_path_buf(),
    })
}

/// Make room for the video: create parent folders and delete a previous file.
pub fn prepare_output(output_path: &Path) -> SlideshowResult<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if output_path.exists() {
        info!("Deleting old video: {}", output_path.display());
        fs::remove_file(output_path)?;
    }
    Ok(())
}

/// Encode the job's frames with hard cuts, no audio.
pub fn encode(job: &SlideshowJob) -> SlideshowResult<()> {
    prepare_output(&job.output_path)?;

    info!(
        "Concatenating {} frames of {:.1}s ({:.1}s total)...",
        job.frames.len(),
        job.frame_duration.as_secs_f64(),
        job.total_duration().as_secs_f64()
    );
    let mut ffmpeg = Ffmpeg::new(job.frame_duration, job.total_duration(), &job.output_path)?;
    let written = write_frames(&mut ffmpeg, &job.frames);

    // ffmpeg's own error explains a broken pipe better than the write failure
    ffmpeg.finish(&job.output_path)?;
    written
}

// The last frame goes in twice so it keeps its full display time; `-t` cuts the extra
fn write_frames(ffmpeg: &mut Ffmpeg, frames: &[TempFrame]) -> SlideshowResult<()> {
    let mut last = None;
    for frame in frames {
        let jpeg = fs::read(frame.path())?;
        ffmpeg.write(&jpeg)?;
        last = Some(jpeg);
    }
    if let Some(jpeg) = last {
        ffmpeg.write(&jpeg)?;
    }
    Ok(())
}

/// Render `image_paths` into a video at `output_path` and return its path.
pub fn render_slideshow(
    image_paths: &[PathBuf],
    output_path: &Path,
    timing: FrameTiming,
) -> SlideshowResult<PathBuf> {
    if image_paths.is_empty() {
        return Err(SlideshowError::empty_input("No images provided"));
    }

    // Temporary frames are removed when `job` drops, on success or error
    let job = prepare_job(image_paths, output_path, timing)?;
    encode(&job)?;
    Ok(job.output_path.clone())
}
