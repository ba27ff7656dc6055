//! Connection supervisor: lifecycle of the serial link
//!
//! Owns the `SensorLink` handle exclusively and is the only place where
//! [`LinkState`] transitions happen:
//!
//! ```text
//! Disconnected -> Connecting   (tick begins with no open handle)
//! Connecting   -> Connected    (resolve + open succeeded)
//! Connecting   -> Disconnected (no device / open failed; retry after backoff)
//! Connected    -> Recovering   (backlog exceeded the overrun limit)
//! Recovering   -> Connected    (backlog discarded, reading resumes)
//! Connected    -> Disconnected (I/O fault during a read; handle closed)
//! ```
//!
//! Every fault is recoverable by retry. The supervisor never terminates
//! the process: with the `RequestRestart` strategy it only *signals* that
//! an external process supervisor should perform a cold restart.

use crate::config::OverrunStrategy;
use crate::error::Result;
use crate::link::SensorLink;
use crate::types::LinkState;

/// What an overrun recovery did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrunOutcome {
    /// Backlog dropped in place; reading resumes this tick
    Discarded(u32),
    /// Backlog dropped and a cold restart requested from the host
    RestartRequested(u32),
}

/// Owns the open/closed lifecycle of the sensor connection.
///
/// Generic over the link so tests can drive a concrete [`crate::link::MockLink`];
/// the sample loop uses `LinkSupervisor<Box<dyn SensorLink>>`.
pub struct LinkSupervisor<L: SensorLink> {
    link: L,
    state: LinkState,
    backlog_limit: u32,
    strategy: OverrunStrategy,
}

impl<L: SensorLink> LinkSupervisor<L> {
    pub fn new(link: L, backlog_limit: u32, strategy: OverrunStrategy) -> Self {
        Self {
            link,
            state: LinkState::Disconnected,
            backlog_limit,
            strategy,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected && self.link.is_open()
    }

    /// Open the link if it is not already open.
    ///
    /// On failure the supervisor is back in `Disconnected` and the caller
    /// schedules the next attempt after the reconnect backoff.
    pub fn ensure_open(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = LinkState::Connecting;
        match self.link.open() {
            Ok(()) => {
                self.state = LinkState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = LinkState::Disconnected;
                Err(e)
            }
        }
    }

    /// Check the unread backlog and recover if it exceeds the limit.
    ///
    /// `Ok(None)` means the backlog is within bounds and reading may
    /// proceed. With `RequestRestart` the supervisor stays in `Recovering`;
    /// nothing more is read until the host restarts the process.
    pub fn check_backlog(&mut self) -> Result<Option<OverrunOutcome>> {
        let backlog = self.link.backlog()?;
        if backlog <= self.backlog_limit {
            return Ok(None);
        }

        self.state = LinkState::Recovering;
        let dropped = self.link.discard_backlog()?;
        tracing::warn!(
            "backlog of {} bytes exceeded limit of {}, discarded {} bytes",
            backlog,
            self.backlog_limit,
            dropped
        );

        match self.strategy {
            OverrunStrategy::DiscardAndResume => {
                self.state = LinkState::Connected;
                Ok(Some(OverrunOutcome::Discarded(dropped)))
            }
            OverrunStrategy::RequestRestart => Ok(Some(OverrunOutcome::RestartRequested(dropped))),
        }
    }

    /// Read one line from the open link; `Ok(None)` on timeout
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.link.read_line()
    }

    /// Route an I/O fault: close the handle and drop to `Disconnected`
    pub fn fault(&mut self) {
        self.link.close();
        self.state = LinkState::Disconnected;
    }

    pub fn port_name(&self) -> Option<&str> {
        self.link.port_name()
    }

    /// Direct access to the underlying link, for test scripting
    #[cfg(any(test, feature = "mock-link"))]
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<T: SensorLink + ?Sized> SensorLink for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn backlog(&mut self) -> Result<u32> {
        (**self).backlog()
    }

    fn discard_backlog(&mut self) -> Result<u32> {
        (**self).discard_backlog()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        (**self).read_line()
    }

    fn port_name(&self) -> Option<&str> {
        (**self).port_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MockLink;

    const LIMIT: u32 = 14;

    fn supervisor(link: MockLink, strategy: OverrunStrategy) -> LinkSupervisor<MockLink> {
        LinkSupervisor::new(link, LIMIT, strategy)
    }

    #[test]
    fn test_open_success_reaches_connected() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        assert_eq!(sup.state(), LinkState::Disconnected);

        sup.ensure_open().unwrap();
        assert_eq!(sup.state(), LinkState::Connected);
        assert!(sup.is_connected());
        assert_eq!(sup.port_name(), Some("/dev/ttyACM0"));
    }

    #[test]
    fn test_open_failure_returns_to_disconnected() {
        let mut sup = supervisor(
            MockLink::new().failing_opens(1),
            OverrunStrategy::DiscardAndResume,
        );

        assert!(sup.ensure_open().is_err());
        assert_eq!(sup.state(), LinkState::Disconnected);

        // Device appears on the next attempt
        sup.ensure_open().unwrap();
        assert_eq!(sup.state(), LinkState::Connected);
    }

    #[test]
    fn test_ensure_open_is_idempotent_when_connected() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        sup.ensure_open().unwrap();
        sup.ensure_open().unwrap();
        assert_eq!(sup.link_mut().opens, 1);
    }

    #[test]
    fn test_backlog_within_limit_is_noop() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        sup.ensure_open().unwrap();
        sup.link_mut().set_backlog(LIMIT);

        assert_eq!(sup.check_backlog().unwrap(), None);
        assert_eq!(sup.state(), LinkState::Connected);
        assert_eq!(sup.link_mut().discards, 0);
    }

    #[test]
    fn test_overrun_discard_and_resume() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        sup.ensure_open().unwrap();
        sup.link_mut().set_backlog(LIMIT + 6);

        let outcome = sup.check_backlog().unwrap();
        assert_eq!(outcome, Some(OverrunOutcome::Discarded(LIMIT + 6)));
        assert_eq!(sup.state(), LinkState::Connected);
        assert_eq!(sup.link_mut().backlog().unwrap(), 0);
    }

    #[test]
    fn test_overrun_restart_request_stays_recovering() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::RequestRestart);
        sup.ensure_open().unwrap();
        sup.link_mut().set_backlog(100);

        let outcome = sup.check_backlog().unwrap();
        assert_eq!(outcome, Some(OverrunOutcome::RestartRequested(100)));
        assert_eq!(sup.state(), LinkState::Recovering);
        // The backlog was still discarded before requesting the restart
        assert_eq!(sup.link_mut().discards, 1);
    }

    #[test]
    fn test_fault_closes_and_disconnects() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        sup.ensure_open().unwrap();

        sup.fault();
        assert_eq!(sup.state(), LinkState::Disconnected);
        assert!(!sup.is_connected());
        // Reads on the closed link now fault
        assert!(sup.read_line().unwrap_err().is_link_fault());
    }

    #[test]
    fn test_reconnect_after_fault() {
        let mut sup = supervisor(MockLink::new(), OverrunStrategy::DiscardAndResume);
        sup.ensure_open().unwrap();
        sup.fault();

        sup.ensure_open().unwrap();
        assert!(sup.is_connected());
        assert_eq!(sup.link_mut().opens, 2);
    }
}
