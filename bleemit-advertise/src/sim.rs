use std::error::Error;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use bleemit_domain::radio::RadioState;
use bleemit_domain::region::BeaconRegion;

use crate::{Advertiser, AdvertiserEvent};

/// Hardware-free advertiser. Confirms starts and stops over the same event
/// channel the local backend uses, so the session loop is identical.
pub struct SimAdvertiser {
    advertising: bool,
    events: mpsc::Sender<AdvertiserEvent>,
}

impl SimAdvertiser {
    pub fn new() -> (SimAdvertiser, mpsc::Receiver<AdvertiserEvent>) {
        let (tx, rx) = mpsc::channel(16);
        // The simulated radio is available immediately.
        let _ = tx.try_send(AdvertiserEvent::Radio(RadioState::PoweredOn));
        (
            SimAdvertiser {
                advertising: false,
                events: tx,
            },
            rx,
        )
    }
}

#[async_trait]
impl Advertiser for SimAdvertiser {
    async fn start_advertising(&mut self, region: &BeaconRegion) -> Result<(), Box<dyn Error>> {
        trace!(
            "[SimAdvertiser] start: {} major={} minor={}",
            region.id, region.major, region.minor
        );
        self.advertising = true;
        self.events.send(AdvertiserEvent::AdvertisingStarted).await?;
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), Box<dyn Error>> {
        if self.advertising {
            trace!("[SimAdvertiser] stop");
            self.advertising = false;
            self.events.send(AdvertiserEvent::AdvertisingStopped).await?;
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.advertising
    }
}
