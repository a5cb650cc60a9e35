use std::io;

use async_trait::async_trait;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::trace;

use crate::{PowerEvent, PowerMonitor};

/// Sleep/wake delivered as process signals: SIGUSR1 on sleep, SIGUSR2 on
/// wake. System sleep and resume hook scripts signal the running process.
pub struct SignalPowerMonitor {
    sleep: Signal,
    wake: Signal,
}

impl SignalPowerMonitor {
    pub fn new() -> io::Result<SignalPowerMonitor> {
        Ok(SignalPowerMonitor {
            sleep: signal(SignalKind::user_defined1())?,
            wake: signal(SignalKind::user_defined2())?,
        })
    }
}

#[async_trait]
impl PowerMonitor for SignalPowerMonitor {
    async fn next_event(&mut self) -> Option<PowerEvent> {
        let event = tokio::select! {
            received = self.sleep.recv() => received.map(|()| PowerEvent::Sleep),
            received = self.wake.recv() => received.map(|()| PowerEvent::Wake),
        };
        if let Some(event) = event {
            trace!("[SignalPowerMonitor] {event:?}");
        }
        event
    }
}
