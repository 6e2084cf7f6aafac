//! Progress events emitted by the pipelines.

use std::io::Write;
use std::path::PathBuf;

/// A single observable step of a slideshow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Milestone percentage, 0 to 100
    Progress(u8),
    /// Human-readable phase description
    Status(String),
    /// Path of the finished video, emitted once on success
    Output(PathBuf),
}

impl ProgressEvent {
    /// Format as a line of the `PROGRESS:` / `STATUS:` / `OUTPUT:` protocol.
    pub fn to_line(&self) -> String {
        match self {
            Self::Progress(percent) => format!("PROGRESS:{percent}"),
            Self::Status(text) => format!("STATUS:{text}"),
            Self::Output(path) => format!("OUTPUT:{}", path.display()),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressReporter {
    fn report(&mut self, event: ProgressEvent);

    fn progress(&mut self, percent: u8) {
        self.report(ProgressEvent::Progress(percent.min(100)));
    }

    fn status(&mut self, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.report(ProgressEvent::Status(text.into()));
    }
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressEvent),
{
    fn report(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Keeps the reported percentage from ever going backwards.
pub struct Monotonic<R> {
    inner: R,
    last: u8,
}

impl<R: ProgressReporter> Monotonic<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, last: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: ProgressReporter> ProgressReporter for Monotonic<R> {
    fn report(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Progress(percent) => {
                self.last = self.last.max(percent.min(100));
                self.inner.report(ProgressEvent::Progress(self.last));
            }
            other => self.inner.report(other),
        }
    }
}

/// Writes every event as a protocol line and flushes, so a supervising
/// process sees it immediately.
pub struct LineReporter<W: Write> {
    out: W,
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for LineReporter<W> {
    fn report(&mut self, event: ProgressEvent) {
        // A closed stdout must not abort the run
        let _ = writeln!(self.out, "{}", event.to_line());
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_protocol_lines() {
        assert_eq!(ProgressEvent::Progress(40).to_line(), "PROGRESS:40");
        assert_eq!(
            ProgressEvent::Status("Found 3 pins".into()).to_line(),
            "STATUS:Found 3 pins"
        );
        assert_eq!(
            ProgressEvent::Output(PathBuf::from("output/slideshow.mp4")).to_line(),
            "OUTPUT:output/slideshow.mp4"
        );
    }

    #[test]
    fn monotonic_never_goes_backwards() {
        let mut seen = Vec::new();
        {
            let mut reporter = Monotonic::new(|event: ProgressEvent| seen.push(event));
            reporter.progress(30);
            reporter.progress(10);
            reporter.progress(250);
            reporter.status("done");
        }
        assert_eq!(
            seen,
            vec![
                ProgressEvent::Progress(30),
                ProgressEvent::Progress(30),
                ProgressEvent::Progress(100),
                ProgressEvent::Status("done".into()),
            ]
        );
    }

    #[test]
    fn line_reporter_writes_one_line_per_event() {
        let mut reporter = LineReporter::new(Vec::new());
        reporter.progress(10);
        reporter.status("Loading images from folder...");
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "PROGRESS:10\nSTATUS:Loading images from folder...\n");
    }
}
