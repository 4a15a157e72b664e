//! Kiln demo player.
//!
//! Runs a small scene exercising every built-in command: solid and textured
//! geometry, debug outlines, revealed text and a particle effect. Without a
//! window (`--headless N`) it runs N frames against the CPU back end and
//! prints the totals.

mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use kiln_engine::config::{EngineConfig, Threading};
use kiln_engine::coords::Vec2;
use kiln_engine::device::GpuInit;
use kiln_engine::frame::run_headless;
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::resources::Resources;
use kiln_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use demo::{Demo, DemoAssets};

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run this many frames without a window, then exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
    /// Execute command buffers on a dedicated render thread
    #[arg(long)]
    render_thread: bool,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Simulation ticks per second
    #[arg(long, default_value_t = 60.0, value_parser = parse_tick_rate)]
    tick_rate: f64,
    /// Disable vsync
    #[arg(long)]
    no_vsync: bool,
    /// Log filter, env_logger syntax (overrides RUST_LOG)
    #[arg(long, env = "KILN_LOG")]
    log: Option<String>,
    /// TrueType/OpenType font for the caption
    #[arg(long)]
    font: Option<PathBuf>,
    #[arg(long, default_value_t = 24)]
    font_size: u32,
    /// PNG/BMP sprite; a generated checkerboard is used otherwise
    #[arg(long)]
    texture: Option<PathBuf>,
}

fn parse_tick_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive number, got {s}"))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let engine = EngineConfig {
        tick_rate: args.tick_rate,
        threading: if args.render_thread { Threading::RenderThread } else { Threading::Inline },
        ..EngineConfig::default()
    };

    let resources = Arc::new(Resources::new());
    let assets = DemoAssets {
        font: args.font.clone().map(|path| (path, args.font_size)),
        texture: args.texture.clone(),
    };
    let mut game = Demo::new(assets);

    if let Some(frames) = args.headless {
        let viewport = Vec2::new(args.width as f32, args.height as f32);
        let summary = run_headless(&mut game, &engine, resources, viewport, frames)?;
        println!(
            "{} frames, {} ticks, {} commands, peak arena {} bytes{}",
            summary.frames,
            summary.ticks,
            summary.commands,
            summary.peak_bytes,
            if summary.exited { " (game exited)" } else { "" }
        );
        return Ok(());
    }

    let runtime = RuntimeConfig {
        title: "kiln".to_string(),
        logical_size: LogicalSize::new(f64::from(args.width), f64::from(args.height)),
    };
    Runtime::run(runtime, GpuInit::default().with_vsync(!args.no_vsync), engine, resources, game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_defaults_to_sixty() {
        let args = Args::try_parse_from(["kiln-player"]).unwrap();
        assert_eq!(args.tick_rate, 60.0);
    }

    #[test]
    fn positive_tick_rate_is_accepted() {
        let args = Args::try_parse_from(["kiln-player", "--tick-rate", "120"]).unwrap();
        assert_eq!(args.tick_rate, 120.0);
    }

    #[test]
    fn non_positive_tick_rate_is_rejected() {
        for bad in ["--tick-rate=0", "--tick-rate=-5", "--tick-rate=inf", "--tick-rate=NaN", "--tick-rate=fast"] {
            assert!(Args::try_parse_from(["kiln-player", bad]).is_err(), "{bad} was accepted");
        }
    }
}
