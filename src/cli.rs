//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use elmocam_core::{BrightnessDirection, FocusDirection, ZoomDirection};

#[derive(Parser)]
#[command(name = "elmocam")]
#[command(author, version, about = "Elmo L-12 document camera control", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Run against the in-memory emulated camera instead of real hardware
    #[cfg(feature = "dummy")]
    #[arg(long, global = true)]
    pub dummy: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture one or more JPEG frames to disk
    Capture {
        /// Output file; a frame index is inserted before the extension
        /// when capturing more than one
        #[arg(short, long)]
        output: PathBuf,

        /// JPEG compression ratio, clamped to 10-100
        #[arg(long)]
        compression: Option<i32>,

        /// Number of frames to capture
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Pause between frames in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },

    /// Print the raw firmware version response
    Version,

    /// Start or stop zoom motion
    Zoom {
        direction: ZoomArg,

        /// Hold the motion for this long, then stop it
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Drive the focus motor or trigger autofocus
    Focus {
        direction: FocusArg,

        /// Hold the motion for this long, then stop it
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Adjust brightness or trigger auto-brightness
    Brightness {
        direction: BrightnessArg,

        /// Hold the motion for this long, then stop it
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Flush stale data from the image endpoint
    Drain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ZoomArg {
    In,
    Out,
    Stop,
}

impl From<ZoomArg> for ZoomDirection {
    fn from(arg: ZoomArg) -> Self {
        match arg {
            ZoomArg::In => ZoomDirection::In,
            ZoomArg::Out => ZoomDirection::Out,
            ZoomArg::Stop => ZoomDirection::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FocusArg {
    Near,
    Wide,
    Auto,
    Stop,
}

impl From<FocusArg> for FocusDirection {
    fn from(arg: FocusArg) -> Self {
        match arg {
            FocusArg::Near => FocusDirection::Near,
            FocusArg::Wide => FocusDirection::Wide,
            FocusArg::Auto => FocusDirection::Auto,
            FocusArg::Stop => FocusDirection::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BrightnessArg {
    Up,
    Down,
    Auto,
    Stop,
}

impl From<BrightnessArg> for BrightnessDirection {
    fn from(arg: BrightnessArg) -> Self {
        match arg {
            BrightnessArg::Up => BrightnessDirection::Lighten,
            BrightnessArg::Down => BrightnessDirection::Darken,
            BrightnessArg::Auto => BrightnessDirection::Auto,
            BrightnessArg::Stop => BrightnessDirection::Stop,
        }
    }
}
