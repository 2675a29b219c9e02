use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod api;
mod config;
mod core;
mod render;
mod sink;
mod source;

use crate::api::AppState;
use crate::config::{OutputMode, PlayerConfig};
use crate::core::manager::DisplayManager;
use crate::source::fetch::MediaFetcher;
use crate::source::text::TextRenderer;

#[derive(Parser, Debug)]
#[command(name = "matrix-player", about = "Network-controlled LED matrix display service")]
struct Args {
    /// Display width in pixels
    #[arg(long, default_value_t = 64)]
    width: u32,

    /// Display height in pixels
    #[arg(long, default_value_t = 64)]
    height: u32,

    /// HTTP bind address
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// HTTP listen port
    #[arg(long, default_value_t = 9191)]
    port: u16,

    /// Output mode: png, raw, framebuffer, headless
    #[arg(long, default_value = "png")]
    output: OutputMode,

    /// Output file path (PNG file or framebuffer device)
    #[arg(long, default_value = "output.png")]
    output_path: PathBuf,

    /// Software brightness, 0-100
    #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
    brightness: u8,

    /// TrueType font used for text and weather
    #[arg(long, default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")]
    font: PathBuf,

    /// Seconds a job is shown when the request omits `duration`
    #[arg(long, default_value_t = 10.0)]
    default_duration: f64,

    /// Timeout for image downloads, in seconds
    #[arg(long, default_value_t = 10)]
    fetch_timeout: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> PlayerConfig {
        PlayerConfig {
            width: self.width,
            height: self.height,
            bind: self.bind,
            port: self.port,
            output_mode: self.output,
            output_path: self.output_path,
            brightness: self.brightness,
            font_path: self.font,
            default_duration: self.default_duration,
            fetch_timeout: Duration::from_secs(self.fetch_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Raw mode streams frames on stdout; logs must not interleave with them
    let log_writer = if args.output.uses_stdout() {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    tracing_subscriber::fmt()
        .with_writer(log_writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        "matrix-player v{} starting ({}x{}, {:?} output)",
        env!("CARGO_PKG_VERSION"),
        args.width,
        args.height,
        args.output
    );

    let config = args.into_config();
    if !(config.default_duration > 0.0 && config.default_duration.is_finite()) {
        anyhow::bail!("--default-duration must be a positive number of seconds");
    }

    // Without a sink there is nothing to serve
    let sink = sink::open_sink(&config).inspect_err(|e| error!("{:#}", e))?;

    let text = match TextRenderer::from_file(&config.font_path) {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            warn!("Text and weather rendering disabled: {}", e);
            None
        }
    };
    let fetcher = MediaFetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?;

    let manager = Arc::new(DisplayManager::start(sink));
    let state = AppState {
        manager: manager.clone(),
        fetcher,
        text,
        width: config.width,
        height: config.height,
        default_duration: config.default_duration,
    };

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    manager.shutdown().await;
    info!("matrix-player shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
