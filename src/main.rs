//! Swatchbooth kiosk - main entry point
//!
//! Headless event pump for the pigment catalogue kiosk: runs the sampler
//! backend against the real sensor and routes its events to the log and
//! the capture station. The full-screen kiosk UI is a separate frontend
//! consuming the same [`swatchbooth::backend::FrontendHandle`] API.

use swatchbooth::{
    backend::{KioskEvent, SamplerBackend},
    config::AppConfig,
    station::{CaptureStation, LogPrinter, MemoryStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code that tells the host process supervisor to relaunch us
const RESTART_EXIT_CODE: i32 = 75;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,swatchbooth=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting swatchbooth kiosk");

    // Optional config path argument; falls back to the platform data dir
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(),
    };

    let (backend, frontend) = SamplerBackend::new(config);
    let backend_handle = std::thread::spawn(move || backend.run());

    let mut station = CaptureStation::new(
        Box::new(LogPrinter),
        Box::new(MemoryStore::new()),
        "kiosk",
    );

    let mut restart_requested = false;
    while let Ok(event) = frontend.receiver.recv() {
        match event {
            KioskEvent::LinkStatus(state) => {
                tracing::info!("sensor link is {}", state);
            }
            KioskEvent::ColorUpdate(color) => {
                tracing::debug!("display {}", color);
            }
            KioskEvent::CaptureRequested(color) => {
                if let Err(e) = station.handle_capture(color) {
                    tracing::error!("capture flow failed: {}", e);
                }
            }
            KioskEvent::Stats(stats) => {
                tracing::debug!(
                    "decoded {} lines ({:.0}% clean), {} reconnects, {} overruns",
                    stats.lines_decoded,
                    stats.decode_ratio() * 100.0,
                    stats.reconnects,
                    stats.overruns
                );
            }
            KioskEvent::RestartRequested => {
                tracing::error!("backend requested a cold restart");
                restart_requested = true;
            }
            KioskEvent::Shutdown => break,
        }
    }

    tracing::info!("Shutting down...");
    frontend.shutdown();
    let _ = backend_handle.join();

    if restart_requested {
        std::process::exit(RESTART_EXIT_CODE);
    }
    Ok(())
}
