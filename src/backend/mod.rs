//! Sampler backend: the kiosk core on its own thread
//!
//! The backend runs the sample loop on a dedicated thread so the UI stays
//! responsive, communicating through bounded crossbeam channels:
//!
//! - [`KioskCommand`] - messages sent from the UI to the loop (shutdown,
//!   stats requests)
//! - [`KioskEvent`] - messages sent from the loop to the UI (colors,
//!   capture requests, link status, stats)
//! - [`FrontendHandle`] - UI-side handle for sending commands, receiving
//!   events, and reading the last observed color at any time
//! - [`SamplerBackend`] - entry point that owns the channels and runs the
//!   worker
//!
//! # Components
//!
//! - [`LinkSupervisor`] - open/closed lifecycle of the serial connection
//! - [`SamplerWorker`] - the per-tick sample loop
//!
//! # Example
//!
//! ```ignore
//! use swatchbooth::backend::{KioskEvent, SamplerBackend};
//! use swatchbooth::config::AppConfig;
//!
//! let (backend, frontend) = SamplerBackend::new(AppConfig::default());
//! std::thread::spawn(move || backend.run());
//!
//! for event in frontend.drain() {
//!     match event {
//!         KioskEvent::ColorUpdate(color) => println!("display {}", color),
//!         KioskEvent::CaptureRequested(color) => println!("print {}", color),
//!         _ => {}
//!     }
//! }
//! ```

pub mod supervisor;
pub mod worker;

pub use supervisor::{LinkSupervisor, OverrunOutcome};
pub use worker::SamplerWorker;

use crate::config::AppConfig;
use crate::link::{SensorLink, SerialLink};
use crate::types::{CurrentColor, LinkState, Rgb, SampleStats};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Message sent from the UI to the sample loop
#[derive(Debug, Clone)]
pub enum KioskCommand {
    /// Request an immediate stats event
    RequestStats,
    /// Stop the loop and close the link
    Shutdown,
}

/// Message sent from the sample loop to the UI
#[derive(Debug, Clone)]
pub enum KioskEvent {
    /// Link state changed
    LinkStatus(LinkState),
    /// A sample decoded; show this color full-screen
    ColorUpdate(Rgb),
    /// A flagged sample arrived; start the capture/print flow
    CaptureRequested(Rgb),
    /// Fatal overrun under the restart strategy: the host process
    /// supervisor should relaunch the kiosk
    RestartRequested,
    /// Periodic counters
    Stats(SampleStats),
    /// The loop has stopped
    Shutdown,
}

/// UI-side handle to the running backend
pub struct FrontendHandle {
    /// Receiver for kiosk events
    pub receiver: Receiver<KioskEvent>,
    /// Sender for commands to the loop
    pub command_sender: Sender<KioskCommand>,
    current_color: CurrentColor,
}

impl FrontendHandle {
    /// Try to receive one event without blocking
    pub fn try_recv(&self) -> Option<KioskEvent> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending events
    pub fn drain(&self) -> Vec<KioskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Send a command to the loop
    pub fn send_command(&self, cmd: KioskCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request an immediate stats event
    pub fn request_stats(&self) {
        let _ = self.command_sender.send(KioskCommand::RequestStats);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(KioskCommand::Shutdown);
    }

    /// The last observed color, readable at an arbitrary later instant
    /// (e.g. when the operator opens the catalogue form after scanning)
    pub fn current_color(&self) -> Option<Rgb> {
        self.current_color.get()
    }
}

/// The sampler backend that runs on a separate thread
pub struct SamplerBackend {
    config: AppConfig,
    command_receiver: Receiver<KioskCommand>,
    event_sender: Sender<KioskEvent>,
    running: Arc<AtomicBool>,
    current_color: CurrentColor,
}

impl SamplerBackend {
    /// Create a backend with its communication channels
    pub fn new(config: AppConfig) -> (Self, FrontendHandle) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Bounded for backpressure; the sensor emits at most a few events
        // per tick, so a full queue means the frontend stalled and dropping
        // display updates is the right call
        let (event_tx, event_rx) = bounded(1024);

        let current_color = CurrentColor::new();
        let backend = Self {
            config,
            command_receiver: cmd_rx,
            event_sender: event_tx,
            running: Arc::new(AtomicBool::new(true)),
            current_color: current_color.clone(),
        };

        let frontend = FrontendHandle {
            receiver: event_rx,
            command_sender: cmd_tx,
            current_color,
        };

        (backend, frontend)
    }

    /// Run the sample loop against the real serial sensor
    pub fn run(self) {
        let link = Box::new(SerialLink::new(&self.config.serial));
        self.run_with_link(link);
    }

    /// Run the sample loop against a caller-supplied link (used by tests
    /// with a scripted mock)
    pub fn run_with_link(self, link: Box<dyn SensorLink>) {
        let mut worker = SamplerWorker::new(
            &self.config,
            link,
            self.command_receiver,
            self.event_sender,
            self.running,
            self.current_color,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
