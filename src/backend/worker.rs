//! Sample loop worker
//!
//! One tick of the loop works through, in order: connection health,
//! overrun recovery, reading a line, decoding, normalizing, publishing.
//! Each tick returns the delay to observe before the next one, so the
//! schedule is data-driven: zero after productive work, the reconnect
//! backoff after a fault, the settle delay after a capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend::supervisor::{LinkSupervisor, OverrunOutcome};
use crate::backend::{KioskCommand, KioskEvent};
use crate::config::AppConfig;
use crate::link::SensorLink;
use crate::sensor;
use crate::types::{CurrentColor, LinkState, SampleStats};

/// Interval between unsolicited stats events
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// Sleep slice so a pending shutdown interrupts long delays promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Worker that owns the sensor link and drives the sample loop
pub struct SamplerWorker {
    command_rx: Receiver<KioskCommand>,
    event_tx: Sender<KioskEvent>,
    running: Arc<AtomicBool>,
    supervisor: LinkSupervisor<Box<dyn SensorLink>>,
    current_color: CurrentColor,
    stats: SampleStats,
    last_stats: Instant,
    last_published_state: LinkState,
    ever_connected: bool,
    reconnect_delay: Duration,
    settle_delay: Duration,
}

impl SamplerWorker {
    pub fn new(
        config: &AppConfig,
        link: Box<dyn SensorLink>,
        command_rx: Receiver<KioskCommand>,
        event_tx: Sender<KioskEvent>,
        running: Arc<AtomicBool>,
        current_color: CurrentColor,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            running,
            supervisor: LinkSupervisor::new(
                link,
                config.sampling.backlog_limit,
                config.recovery.overrun_strategy,
            ),
            current_color,
            stats: SampleStats::default(),
            last_stats: Instant::now(),
            last_published_state: LinkState::Disconnected,
            ever_connected: false,
            reconnect_delay: config.sampling.reconnect_delay(),
            settle_delay: config.sampling.settle_delay(),
        }
    }

    /// Main worker loop; returns when shutdown is requested or the loop
    /// gives up after a fatal overrun
    pub fn run(&mut self) {
        tracing::info!("sampler worker started");

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let delay = self.tick();
            self.maybe_publish_stats();
            if !delay.is_zero() {
                self.sleep(delay);
            }
        }

        self.supervisor.fault();
        let _ = self.event_tx.send(KioskEvent::Shutdown);
        tracing::info!("sampler worker stopped");
    }

    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(KioskCommand::RequestStats) => {
                    self.publish(KioskEvent::Stats(self.stats.clone()));
                }
                Ok(KioskCommand::Shutdown) => {
                    tracing::info!("shutdown requested");
                    self.running.store(false, Ordering::SeqCst);
                    return;
                }
                Err(crossbeam_channel::TryRecvError::Empty) => return,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    tracing::warn!("command channel disconnected, stopping");
                    self.running.store(false, Ordering::SeqCst);
                    return;
                }
            }
        }
    }

    /// One pass of the sample loop; the returned duration is the delay to
    /// observe before the next tick
    pub fn tick(&mut self) -> Duration {
        if !self.supervisor.is_connected() {
            match self.supervisor.ensure_open() {
                Ok(()) => {
                    if self.ever_connected {
                        self.stats.reconnects += 1;
                    }
                    self.ever_connected = true;
                    tracing::info!(
                        "sensor connected on {}",
                        self.supervisor.port_name().unwrap_or("<unknown>")
                    );
                    self.publish_state();
                }
                Err(e) => {
                    tracing::warn!(
                        "sensor unavailable ({}), retrying in {:?}",
                        e,
                        self.reconnect_delay
                    );
                    self.publish_state();
                    return self.reconnect_delay;
                }
            }
        }

        match self.supervisor.check_backlog() {
            Ok(None) => {}
            Ok(Some(OverrunOutcome::Discarded(bytes))) => {
                self.stats.overruns += 1;
                self.stats.bytes_discarded += u64::from(bytes);
            }
            Ok(Some(OverrunOutcome::RestartRequested(bytes))) => {
                self.stats.overruns += 1;
                self.stats.bytes_discarded += u64::from(bytes);
                tracing::error!("fatal overrun, requesting restart from host");
                self.publish(KioskEvent::RestartRequested);
                self.running.store(false, Ordering::SeqCst);
                return Duration::ZERO;
            }
            Err(e) => return self.link_fault(e),
        }

        let line = match self.supervisor.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Duration::ZERO,
            Err(e) => return self.link_fault(e),
        };

        let Some(sample) = sensor::decode(&line) else {
            self.stats.lines_rejected += 1;
            tracing::debug!("rejected line {:?}", line.trim_end());
            return Duration::ZERO;
        };
        self.stats.lines_decoded += 1;

        let color = sensor::normalize(sample);
        self.current_color.set(color);
        self.publish(KioskEvent::ColorUpdate(color));

        if sample.capture {
            self.stats.captures += 1;
            tracing::info!("capture requested for {}", color);
            self.publish(KioskEvent::CaptureRequested(color));
            // Hold the color on screen while the operator fills the form
            return self.settle_delay;
        }

        Duration::ZERO
    }

    fn link_fault(&mut self, e: crate::error::SwatchboothError) -> Duration {
        tracing::warn!(
            "serial link fault ({}), reconnecting in {:?}",
            e,
            self.reconnect_delay
        );
        self.supervisor.fault();
        self.publish_state();
        self.reconnect_delay
    }

    /// Emit a `LinkStatus` event only when the state actually changed
    fn publish_state(&mut self) {
        let state = self.supervisor.state();
        if state != self.last_published_state {
            self.last_published_state = state;
            self.publish(KioskEvent::LinkStatus(state));
        }
    }

    fn publish(&mut self, event: KioskEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.stats.dropped_events += 1;
            }
        }
    }

    fn maybe_publish_stats(&mut self) {
        if self.last_stats.elapsed() >= STATS_INTERVAL {
            self.last_stats = Instant::now();
            self.publish(KioskEvent::Stats(self.stats.clone()));
        }
    }

    /// Sleep in slices so shutdown is not delayed by a full settle period
    fn sleep(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while self.running.load(Ordering::SeqCst) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }

    #[cfg(test)]
    fn stats(&self) -> &SampleStats {
        &self.stats
    }
}
