//! Command-line arguments and their value parsers.

use clap::{Parser, Subcommand};
use vidgen_client::dto::{InterpolationMethod, UpscaleMethod};
use vidgen_core::filters::{OperationType, TimeRange};
use vidgen_core::history::parse_timestamp;
use vidgen_core::resolution::ResolutionPreset;
use vidgen_core::status::TaskStatus;
use vidgen_core::types::{DbId, Timestamp};

#[derive(Parser)]
#[command(name = "vidgen")]
#[command(about = "Submit video generation tasks and manage their history")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a generation request
    Generate {
        /// Text prompt
        prompt: String,

        /// Clip length in seconds
        #[arg(short, long, default_value = "5")]
        duration: u32,

        /// Resolution preset (720p, 1080p)
        #[arg(short, long, default_value = "720p")]
        resolution: ResolutionPreset,

        #[arg(long)]
        fps: Option<u32>,

        /// Explicit width (overrides the preset)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Explicit height (overrides the preset)
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// First reference frame (URL or base64)
        #[arg(long)]
        first_frame: Option<String>,

        /// Last reference frame (URL or base64)
        #[arg(long)]
        last_frame: Option<String>,

        #[arg(long)]
        seed: Option<i64>,

        #[arg(long)]
        negative_prompt: Option<String>,

        /// Model version tag
        #[arg(long = "model-version")]
        model_version: Option<String>,

        /// Poll until the task concludes and print the final state
        #[arg(long)]
        wait: bool,
    },

    /// Query the status of a task
    Status { task_id: String },

    /// List history with optional filters
    History {
        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,

        /// Server-side status filter (pending, processing, completed, failed)
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,

        /// all, week, month, quarter, custom
        #[arg(long, default_value = "all")]
        time_range: TimeRange,

        /// Lower bound for created_at (RFC 3339 or naive ISO-8601, UTC)
        #[arg(long, value_parser = parse_time, requires = "end")]
        start: Option<Timestamp>,

        /// Upper bound for created_at (RFC 3339 or naive ISO-8601, UTC)
        #[arg(long, value_parser = parse_time, requires = "start")]
        end: Option<Timestamp>,

        /// all, ultra_hd, fps_enhanced, favorite, liked
        #[arg(long, default_value = "all")]
        operation: OperationType,
    },

    /// Show the history record for a task
    Show { task_id: String },

    /// Toggle the favorite flag
    Favorite { id: DbId },

    /// Toggle the liked flag
    Like { id: DbId },

    /// Toggle the ultra-HD flag
    UltraHd { id: DbId },

    /// Delete a history record
    Delete { id: DbId },

    /// Upscale a video
    EnhanceResolution {
        id: DbId,

        /// real_esrgan, waifu2x
        #[arg(long, default_value = "real_esrgan", value_parser = parse_upscale)]
        method: UpscaleMethod,

        #[arg(long, default_value = "2")]
        scale: u32,
    },

    /// Interpolate frames to a higher frame rate
    EnhanceFps {
        id: DbId,

        #[arg(long, default_value = "60")]
        target_fps: u32,

        /// rife, film
        #[arg(long, default_value = "rife", value_parser = parse_interpolation)]
        method: InterpolationMethod,

        /// Keep the chosen model even on large motion
        #[arg(long)]
        no_auto_switch: bool,
    },

    /// Check that the backend is up
    Health,
}

/// Strict status parser; unlike the wire decoder it rejects unknown words.
pub fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    match raw.to_ascii_lowercase().as_str() {
        "pending" | "processing" | "running" | "done" | "completed" | "failed" | "error" => {
            Ok(TaskStatus::parse(raw))
        }
        other => Err(format!(
            "unknown status '{other}' (expected pending, processing, completed or failed)"
        )),
    }
}

pub fn parse_time(raw: &str) -> Result<Timestamp, String> {
    parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))
}

pub fn parse_upscale(raw: &str) -> Result<UpscaleMethod, String> {
    match raw {
        "real_esrgan" => Ok(UpscaleMethod::RealEsrgan),
        "waifu2x" => Ok(UpscaleMethod::Waifu2x),
        other => Err(format!("unknown upscale method '{other}'")),
    }
}

pub fn parse_interpolation(raw: &str) -> Result<InterpolationMethod, String> {
    match raw {
        "rife" => Ok(InterpolationMethod::Rife),
        "film" => Ok(InterpolationMethod::Film),
        other => Err(format!("unknown interpolation method '{other}'")),
    }
}
