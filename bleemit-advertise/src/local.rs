use std::error::Error;

use async_trait::async_trait;
use bluer::adv::{Advertisement, AdvertisementHandle, Type};
use bluer::{AdapterEvent, AdapterProperty};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{error, info, trace};

use bleemit_domain::radio::RadioState;
use bleemit_domain::region::{APPLE_COMPANY_ID, BeaconRegion};

use crate::{Advertiser, AdvertiserEvent};

/// Advertises through the local BlueZ adapter. The advertisement stays
/// registered for as long as the handle is held; dropping it stops it.
pub struct LocalAdvertiser {
    _session: bluer::Session,
    adapter: bluer::Adapter,
    events: mpsc::Sender<AdvertiserEvent>,
    handle: Option<AdvertisementHandle>,
}

impl LocalAdvertiser {
    pub async fn new()
    -> Result<(LocalAdvertiser, mpsc::Receiver<AdvertiserEvent>), Box<dyn Error>> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        adapter.set_powered(true).await?;
        info!(
            "[LocalAdvertiser] using adapter {} with address {}",
            adapter.name(),
            adapter.address().await?
        );

        let (tx, rx) = mpsc::channel(16);

        let initial = if adapter.is_powered().await? {
            RadioState::PoweredOn
        } else {
            RadioState::PoweredOff
        };
        tx.send(AdvertiserEvent::Radio(initial)).await?;

        Self::monitor_radio(adapter.clone(), tx.clone());

        Ok((
            LocalAdvertiser {
                _session: session,
                adapter,
                events: tx,
                handle: None,
            },
            rx,
        ))
    }

    /// Forward adapter power changes as radio-state events until the
    /// receiving side goes away.
    fn monitor_radio(adapter: bluer::Adapter, tx: mpsc::Sender<AdvertiserEvent>) {
        tokio::spawn(async move {
            let events = match adapter.events().await {
                Ok(events) => events,
                Err(err) => {
                    error!("[LocalAdvertiser] adapter event stream failed: {err}");
                    return;
                }
            };
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                if let AdapterEvent::PropertyChanged(AdapterProperty::Powered(powered)) = event {
                    let state = if powered {
                        RadioState::PoweredOn
                    } else {
                        RadioState::PoweredOff
                    };
                    trace!("[LocalAdvertiser] radio changed: {state:?}");
                    if tx.send(AdvertiserEvent::Radio(state)).await.is_err() {
                        break;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl Advertiser for LocalAdvertiser {
    async fn start_advertising(&mut self, region: &BeaconRegion) -> Result<(), Box<dyn Error>> {
        if self.handle.is_some() {
            return Ok(());
        }
        let advertisement = Advertisement {
            advertisement_type: Type::Broadcast,
            manufacturer_data: [(APPLE_COMPANY_ID, region.manufacturer_frame())]
                .into_iter()
                .collect(),
            discoverable: Some(true),
            ..Default::default()
        };
        trace!("[LocalAdvertiser] registering advertisement for {}", region.id);
        let handle = self.adapter.advertise(advertisement).await?;
        self.handle = Some(handle);
        self.events.send(AdvertiserEvent::AdvertisingStarted).await?;
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), Box<dyn Error>> {
        if let Some(handle) = self.handle.take() {
            trace!("[LocalAdvertiser] dropping advertisement handle");
            drop(handle);
            self.events.send(AdvertiserEvent::AdvertisingStopped).await?;
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.handle.is_some()
    }
}
