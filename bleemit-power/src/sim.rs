use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{PowerEvent, PowerMonitor};

/// Channel-fed monitor for tests and scripted runs.
pub struct SimPowerMonitor {
    events: mpsc::Receiver<PowerEvent>,
}

impl SimPowerMonitor {
    pub fn new() -> (mpsc::Sender<PowerEvent>, SimPowerMonitor) {
        let (tx, rx) = mpsc::channel(4);
        (tx, SimPowerMonitor { events: rx })
    }
}

#[async_trait]
impl PowerMonitor for SimPowerMonitor {
    async fn next_event(&mut self) -> Option<PowerEvent> {
        self.events.recv().await
    }
}
