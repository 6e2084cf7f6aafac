//! Turn a folder of images or a Pinterest board into a 1920x1080 slideshow video.

pub mod config;
pub mod constants;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod image_loader;
pub mod pinterest;
pub mod pipeline;
pub mod progress;
pub mod renderer;
pub mod selection;

pub use config::PinterestConfig;
pub use error::{SlideshowError, SlideshowResult};
pub use pipeline::{LocalOptions, PinterestOptions, PinterestSlideshow, run_local};
pub use progress::{LineReporter, Monotonic, ProgressEvent, ProgressReporter};
pub use renderer::{FrameTiming, render_slideshow};
