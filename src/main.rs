use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use slideshow_gen::{
    LineReporter, LocalOptions, Monotonic, PinterestConfig, PinterestOptions, PinterestSlideshow,
    ProgressReporter, run_local,
};

/// Build a slideshow video from a local folder or a Pinterest board.
///
/// Progress goes to stdout as PROGRESS:/STATUS:/OUTPUT: lines; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "slideshow-gen", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a slideshow from images in a local folder
    Local {
        /// Folder containing images
        #[arg(long)]
        input_folder: PathBuf,

        /// Video duration in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Number of images to include
        #[arg(long, allow_negative_numbers = true)]
        num_images: Option<i64>,

        /// Output video path
        #[arg(long, default_value = "output/slideshow.mp4")]
        output: PathBuf,
    },

    /// Generate a slideshow from a Pinterest board
    Pinterest {
        /// Pinterest board URL or ID
        #[arg(long)]
        board_url: String,

        /// Video duration in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Weight for recent pins (0-1)
        #[arg(long, default_value_t = 0.7, allow_negative_numbers = true)]
        recency_weight: f64,

        /// Number of images to include
        #[arg(long, allow_negative_numbers = true)]
        num_images: Option<i64>,

        /// Output video path
        #[arg(long, default_value = "output/slideshow.mp4")]
        output: PathBuf,
    },
}

fn init_tracing() {
    // stdout carries the progress protocol, so every log line goes to stderr
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slideshow_gen=info"));
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_ansi(io::stderr().is_terminal()),
            )
            .with(env_filter)
            .init();
    }
}

fn run(command: Command, reporter: &mut impl ProgressReporter) -> Result<PathBuf> {
    let mut rng = rand::rng();
    let video_path = match command {
        Command::Local { input_folder, duration, num_images, output } => {
            let options = LocalOptions {
                input_folder,
                duration_secs: duration,
                num_images,
                output,
            };
            run_local(&options, reporter, &mut rng)?
        }
        Command::Pinterest { board_url, duration, recency_weight, num_images, output } => {
            let config = PinterestConfig::from_env()?;
            tracing::debug!("Pinterest config: {:?}", config);
            let options = PinterestOptions {
                board: board_url,
                duration_secs: duration,
                recency_weight,
                num_images,
                output,
            };
            PinterestSlideshow::from_config(&config)?.run(&options, reporter, &mut rng)?
        }
    };
    Ok(video_path)
}

fn main() -> ExitCode {
    // Credentials may live in a .env file next to the binary's working directory
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut reporter = Monotonic::new(LineReporter::new(io::stdout()));

    match run(cli.command, &mut reporter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.status(format!("Error: {e}"));
            eprintln!("ERROR:{e}");
            ExitCode::FAILURE
        }
    }
}
