#[cfg(unix)]
pub mod signal;
pub mod sim;

use async_trait::async_trait;

/// System power-state notification delivered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    Sleep,
    Wake,
}

#[async_trait]
pub trait PowerMonitor: Send {
    /// Next sleep/wake notification; `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<PowerEvent>;
}
