//! elmocam - control an Elmo L-12 document camera from the command line
//!
//! Thin caller shell over the driver crates: opens the camera (or the
//! in-memory emulator with `--dummy`), runs one command and exits. The
//! toggle state of motion commands lives in this process, so `--hold-ms`
//! is the way to get a bounded motion out of a single invocation.

mod cli;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;

use cli::{Cli, Commands};
use elmocam_core::{BulkTransport, Camera, ZoomDirection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    #[cfg(feature = "dummy")]
    if cli.dummy {
        log::info!("using the in-memory emulated camera");
        let camera = Camera::new(elmocam_dummy::DummyCamera::new(placeholder_image()));
        return run(camera, cli.command);
    }

    let camera = elmocam_usb::open()?;
    run(camera, cli.command)
}

fn run<T: BulkTransport>(
    mut camera: Camera<T>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Capture {
            output,
            compression,
            count,
            interval_ms,
        } => {
            if let Some(value) = compression {
                camera.set_compression(value);
                log::debug!("compression set to {}", camera.compression());
            }
            for index in 0..count {
                let frame = camera.capture_image()?;
                let path = frame_path(&output, index, count);
                std::fs::write(&path, &frame)?;
                log::info!("wrote {} bytes to {}", frame.len(), path.display());
                if interval_ms > 0 && index + 1 < count {
                    thread::sleep(Duration::from_millis(interval_ms));
                }
            }
            Ok(())
        }

        Commands::Version => {
            let reply = camera.version()?;
            let hex: Vec<String> = reply.iter().map(|b| format!("{:02X}", b)).collect();
            println!("{}", hex.join(" "));
            Ok(())
        }

        Commands::Zoom { direction, hold_ms } => {
            camera.zoom(direction.into())?;
            if let Some(ms) = hold_ms {
                thread::sleep(Duration::from_millis(ms));
                camera.zoom(ZoomDirection::Stop)?;
            }
            Ok(())
        }

        Commands::Focus { direction, hold_ms } => {
            camera.focus(direction.into())?;
            if let Some(ms) = hold_ms {
                thread::sleep(Duration::from_millis(ms));
                camera.focus(elmocam_core::FocusDirection::Stop)?;
            }
            Ok(())
        }

        Commands::Brightness { direction, hold_ms } => {
            camera.brightness(direction.into())?;
            if let Some(ms) = hold_ms {
                thread::sleep(Duration::from_millis(ms));
                camera.brightness(elmocam_core::BrightnessDirection::Stop)?;
            }
            Ok(())
        }

        Commands::Drain => {
            camera.drain();
            Ok(())
        }
    }
}

/// Output path for frame `index`; multi-frame captures get a numbered suffix
fn frame_path(output: &Path, index: u32, count: u32) -> PathBuf {
    if count <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}-{:04}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}-{:04}", stem, index),
    };
    output.with_file_name(name)
}

/// JPEG-shaped placeholder served by the emulated camera: SOI marker,
/// deterministic body, EOI marker. Not a decodable image, but enough to
/// exercise the full capture path.
#[cfg(feature = "dummy")]
fn placeholder_image() -> Vec<u8> {
    let mut image = vec![0xFF, 0xD8];
    image.extend((0..70000u32).map(|i| (i % 251) as u8));
    image.extend([0xFF, 0xD9]);
    image
}
