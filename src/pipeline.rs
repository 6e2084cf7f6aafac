//! The two entry pipelines: a local folder, or a Pinterest board.
//!
//! Both end in [`render_slideshow`] and report their milestones through a
//! [`ProgressReporter`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::config::PinterestConfig;
use crate::constants::DISPLAY_DURATION;
use crate::error::SlideshowResult;
use crate::image_loader::list_image_paths;
use crate::pinterest::{BoardApi, PinterestApi, download_pins, extract_board_id, fetch_board_pins};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::renderer::{FrameTiming, render_slideshow};
use crate::selection::{image_count, sample_with_replacement, shuffle_and_take, validate_recency_bias};

/// An explicit image count spreads the requested duration over the images;
/// otherwise the count was derived from the duration and each image gets the
/// fixed display time.
pub fn frame_timing(num_images: Option<i64>, duration_secs: u64) -> FrameTiming {
    match num_images {
        Some(_) => FrameTiming::SpreadOver(Duration::from_secs(duration_secs)),
        None => FrameTiming::PerImage(DISPLAY_DURATION),
    }
}

fn describe_timing(timing: FrameTiming, count: usize) -> String {
    let seconds = timing
        .frame_duration(count)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    format!("Using {count} images ({seconds:.1} seconds each)...")
}

#[derive(Debug, Clone)]
pub struct LocalOptions {
    pub input_folder: PathBuf,
    pub duration_secs: u64,
    pub num_images: Option<i64>,
    pub output: PathBuf,
}

/// Folder → shuffled subset → video.
pub fn run_local<P, R>(options: &LocalOptions, reporter: &mut P, rng: &mut R) -> SlideshowResult<PathBuf>
where
    P: ProgressReporter,
    R: Rng + ?Sized,
{
    reporter.status("Loading images from folder...");
    reporter.progress(10);

    let image_files = list_image_paths(&options.input_folder)?;
    reporter.status(format!("Found {} images", image_files.len()));
    reporter.progress(30);

    let count = image_count(options.num_images, Some(options.duration_secs), image_files.len())?;
    let selected = shuffle_and_take(image_files, count, rng);
    let timing = frame_timing(options.num_images, options.duration_secs);
    reporter.status(describe_timing(timing, selected.len()));
    reporter.progress(50);

    finish(&selected, &options.output, timing, reporter)
}

#[derive(Debug, Clone)]
pub struct PinterestOptions {
    /// Board URL or `owner/board-name` identifier
    pub board: String,
    pub duration_secs: u64,
    pub recency_weight: f64,
    pub num_images: Option<i64>,
    pub output: PathBuf,
}

/// Board → recency-weighted draw → downloaded files → video.
pub struct PinterestSlideshow<A: BoardApi> {
    api: A,
    cache_dir: PathBuf,
}

impl PinterestSlideshow<PinterestApi> {
    pub fn from_config(config: &PinterestConfig) -> SlideshowResult<Self> {
        Ok(Self::new(PinterestApi::new(config)?, config.cache_dir.clone()))
    }
}

impl<A: BoardApi> PinterestSlideshow<A> {
    pub fn new(api: A, cache_dir: PathBuf) -> Self {
        Self { api, cache_dir }
    }

    pub fn run<P, R>(&self, options: &PinterestOptions, reporter: &mut P, rng: &mut R) -> SlideshowResult<PathBuf>
    where
        P: ProgressReporter,
        R: Rng + ?Sized,
    {
        validate_recency_bias(options.recency_weight)?;

        reporter.status("Connecting to Pinterest...");
        reporter.progress(10);

        let board_id = extract_board_id(&options.board);
        info!("Resolved board {:?} to {}", options.board, board_id);
        reporter.status("Fetching pins from board...");
        reporter.progress(20);

        let pins = fetch_board_pins(&self.api, &board_id)?;
        reporter.status(format!("Found {} pins", pins.len()));
        reporter.progress(40);

        let count = image_count(options.num_images, Some(options.duration_secs), pins.len())?;
        let selected = sample_with_replacement(&pins, options.recency_weight, count, rng)?;
        reporter.status(format!("Downloading {} images...", selected.len()));
        let image_paths = download_pins(&self.api, &selected, &self.cache_dir)?;
        reporter.progress(60);

        let timing = frame_timing(options.num_images, options.duration_secs);
        finish(&image_paths, &options.output, timing, reporter)
    }
}

fn finish<P: ProgressReporter>(
    image_paths: &[PathBuf],
    output: &Path,
    timing: FrameTiming,
    reporter: &mut P,
) -> SlideshowResult<PathBuf> {
    reporter.status("Creating slideshow video...");
    let video_path = render_slideshow(image_paths, output, timing)?;
    reporter.progress(90);

    reporter.status("Slideshow complete!");
    reporter.progress(100);
    reporter.report(ProgressEvent::Output(video_path.clone()));
    Ok(video_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlideshowError;
    use crate::pinterest::{PinPage, RawPin};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct OnePageBoard {
        pins: usize,
        calls: Cell<usize>,
    }

    impl BoardApi for OnePageBoard {
        fn pins_page(&self, _board_id: &str, _bookmark: Option<&str>) -> SlideshowResult<PinPage> {
            self.calls.set(self.calls.get() + 1);
            let items = (0..self.pins)
                .map(|i| {
                    serde_json::from_value::<RawPin>(serde_json::json!({
                        "id": i.to_string(),
                        "media": { "images": { "originals": { "url": format!("https://x/{i}.png") } } }
                    }))
                    .unwrap()
                })
                .collect();
            Ok(PinPage { items, bookmark: None })
        }

        fn download(&self, _url: &str) -> SlideshowResult<Vec<u8>> {
            Err(SlideshowError::Io(std::io::Error::other("offline")))
        }
    }

    #[test]
    fn timing_depends_on_explicit_count() {
        assert_eq!(frame_timing(None, 60), FrameTiming::PerImage(Duration::from_secs(3)));
        assert_eq!(frame_timing(Some(4), 60), FrameTiming::SpreadOver(Duration::from_secs(60)));
    }

    #[test]
    fn missing_folder_fails_after_first_milestone() {
        let dir = TempDir::new().unwrap();
        let options = LocalOptions {
            input_folder: dir.path().join("nope"),
            duration_secs: 30,
            num_images: None,
            output: dir.path().join("out.mp4"),
        };
        let mut events = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = run_local(&options, &mut |e: ProgressEvent| events.push(e), &mut rng).unwrap_err();

        assert!(err.to_string().starts_with("Folder not found: "));
        assert_eq!(events.last(), Some(&ProgressEvent::Progress(10)));
        assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Output(_))));
    }

    #[test]
    fn local_rejects_zero_images() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let options = LocalOptions {
            input_folder: dir.path().to_path_buf(),
            duration_secs: 60,
            num_images: Some(0),
            output: dir.path().join("out.mp4"),
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = run_local(&options, &mut |_: ProgressEvent| {}, &mut rng).unwrap_err();
        assert!(matches!(err, SlideshowError::InvalidParameter(_)));
    }

    #[test]
    fn bad_recency_weight_fails_before_any_request() {
        let dir = TempDir::new().unwrap();
        let board = OnePageBoard { pins: 3, calls: Cell::new(0) };
        let slideshow = PinterestSlideshow::new(board, dir.path().join("cache"));
        let options = PinterestOptions {
            board: "jane/ideas".into(),
            duration_secs: 60,
            recency_weight: 1.5,
            num_images: None,
            output: dir.path().join("out.mp4"),
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = slideshow.run(&options, &mut |_: ProgressEvent| {}, &mut rng).unwrap_err();
        assert!(matches!(err, SlideshowError::InvalidParameter(_)));
        assert_eq!(slideshow.api.calls.get(), 0);
    }

    #[test]
    fn download_failure_aborts_remote_run() {
        let dir = TempDir::new().unwrap();
        let board = OnePageBoard { pins: 3, calls: Cell::new(0) };
        let slideshow = PinterestSlideshow::new(board, dir.path().join("cache"));
        let options = PinterestOptions {
            board: "https://www.pinterest.com/jane/ideas/".into(),
            duration_secs: 15,
            recency_weight: 0.7,
            num_images: None,
            output: dir.path().join("out.mp4"),
        };
        let mut events = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = slideshow
            .run(&options, &mut |e: ProgressEvent| events.push(e), &mut rng)
            .unwrap_err();

        assert!(matches!(err, SlideshowError::Io(_)));
        assert!(events.contains(&ProgressEvent::Status("Found 3 pins".into())));
        // 15s / 3s per image = 5 draws from 3 pins
        assert!(events.contains(&ProgressEvent::Status("Downloading 5 images...".into())));
        assert_eq!(events.last(), Some(&ProgressEvent::Status("Downloading 5 images...".into())));
    }
}
