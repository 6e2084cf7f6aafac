use std::time::Duration;

pub const RENDER_WIDTH: u32 = 1920;           // Width of the output video
pub const RENDER_HEIGHT: u32 = 1080;          // Height of the output video
pub const FPS: u32 = 24;                      // Output frame rate

pub const SECONDS_PER_IMAGE: u64 = 3;         // Display time when the image count is derived from the duration
pub const DISPLAY_DURATION: Duration = Duration::from_secs(SECONDS_PER_IMAGE);
pub const DEFAULT_IMAGE_CAP: usize = 20;      // Image count when neither a count nor a duration is known

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const FRAME_SUFFIX: &str = ".frame.tmp";  // Temporary frames never carry an image extension
