use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::constants::FPS;
use crate::error::{SlideshowError, SlideshowResult};

/// An `ffmpeg` process fed with JPEG frames over stdin. Each frame stays on
/// screen for the same duration; output is H.264 at a fixed frame rate.
pub struct Ffmpeg {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
}

/// Locate the ffmpeg executable on `PATH`.
pub fn find_ffmpeg() -> SlideshowResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| SlideshowError::FfmpegNotFound)
}

/// Input frame rate giving each piped image `frame_duration` of screen time.
pub fn input_framerate(frame_duration: Duration) -> String {
    format!("1000/{}", frame_duration.as_millis().max(1))
}

/// Arguments for encoding piped frames into `video_path`, cut at `total_duration`.
pub fn encoder_args(
    frame_duration: Duration,
    total_duration: Duration,
    video_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostats".into(),
        "-loglevel".into(), "error".into(),
        "-y".into(),
        "-f".into(), "image2pipe".into(),
        "-c:v".into(), "mjpeg".into(),
        "-framerate".into(), input_framerate(frame_duration),
        "-i".into(), "-".into(),
        "-an".into(),
        "-c:v".into(), "libx264".into(),
        "-pix_fmt".into(), "yuv420p".into(),
        "-r".into(), FPS.to_string(),
        "-movflags".into(), "+faststart".into(),
        "-t".into(), format!("{:.3}", total_duration.as_secs_f64()),
    ];
    args.push(video_path.to_string_lossy().into_owned());
    args
}

impl Ffmpeg {
    pub fn new(
        frame_duration: Duration,
        total_duration: Duration,
        video_path: &Path,
    ) -> SlideshowResult<Ffmpeg> {
        let program = find_ffmpeg()?;
        let args = encoder_args(frame_duration, total_duration, video_path);
        debug!("Running {} {}", program.display(), args.join(" "));

        let mut process = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SlideshowError::ffmpeg_failed(format!("failed to start ffmpeg: {e}"), None))?;
        let stdin = process.stdin.take();
        Ok(Ffmpeg { process: Some(process), stdin })
    }

    /// Send one encoded JPEG frame.
    pub fn write(&mut self, jpeg: &[u8]) -> SlideshowResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SlideshowError::ffmpeg_failed("ffmpeg stdin is closed", None))?;
        stdin.write_all(jpeg).map_err(|e| {
            SlideshowError::ffmpeg_failed(format!("failed to write frame to ffmpeg: {e}"), None)
        })
    }

    /// Close stdin and wait for ffmpeg to finish writing the video.
    pub fn finish(mut self, video_path: &Path) -> SlideshowResult<()> {
        self.stdin = None; // EOF tells ffmpeg to flush
        let Some(process) = self.process.take() else {
            return Err(SlideshowError::ffmpeg_failed("ffmpeg already finished", None));
        };

        info!("Writing video to {}...", video_path.display());
        let output = process.wait_with_output()?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            error!("ffmpeg: {}", stderr);
        }
        Err(SlideshowError::ffmpeg_failed(
            format!("ffmpeg exited with {}", output.status),
            (!stderr.is_empty()).then_some(stderr),
        ))
    }
}

impl Drop for Ffmpeg {
    fn drop(&mut self) {
        // Close stdin pipe and wait for ffmpeg so no zombie is left behind
        self.stdin = None;
        if let Some(mut process) = self.process.take() {
            let _ = process.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framerate_matches_frame_duration() {
        assert_eq!(input_framerate(Duration::from_secs(3)), "1000/3000");
        assert_eq!(input_framerate(Duration::from_millis(8571)), "1000/8571");
        assert_eq!(input_framerate(Duration::ZERO), "1000/1");
    }

    #[test]
    fn args_encode_web_compatible_video_without_audio() {
        let args = encoder_args(
            Duration::from_secs(3),
            Duration::from_secs(30),
            Path::new("out/show.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-f image2pipe"));
        assert!(joined.contains("-framerate 1000/3000 -i -"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert!(joined.contains("-r 24"));
        assert!(joined.contains("-t 30.000 out/show.mp4"));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out/show.mp4"));
    }
}
