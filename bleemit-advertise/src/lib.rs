pub mod local;
pub mod sim;

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tokio::sync::mpsc;

use bleemit_domain::radio::RadioState;
use bleemit_domain::region::BeaconRegion;

/// Asynchronous notifications the advertiser delivers to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvertiserEvent {
    Radio(RadioState),
    /// Confirmation that a requested advertisement is actually on air.
    AdvertisingStarted,
    AdvertisingStopped,
}

#[async_trait]
pub trait Advertiser: Send {
    async fn start_advertising(&mut self, region: &BeaconRegion) -> Result<(), Box<dyn Error>>;
    async fn stop_advertising(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_advertising(&self) -> bool;
}

/// Which advertiser backend a binary runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseMode {
    Local,
    Sim,
}

impl AdvertiseMode {
    pub async fn create_advertiser(
        &self,
    ) -> Result<(Box<dyn Advertiser>, mpsc::Receiver<AdvertiserEvent>), Box<dyn Error>> {
        match self {
            AdvertiseMode::Local => {
                let (advertiser, events) = local::LocalAdvertiser::new().await?;
                Ok((Box::new(advertiser), events))
            }
            AdvertiseMode::Sim => {
                let (advertiser, events) = sim::SimAdvertiser::new();
                Ok((Box::new(advertiser), events))
            }
        }
    }
}

impl FromStr for AdvertiseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(AdvertiseMode::Local),
            "sim" => Ok(AdvertiseMode::Sim),
            other => Err(format!("unknown advertise mode: {other}")),
        }
    }
}

impl fmt::Display for AdvertiseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvertiseMode::Local => write!(f, "local"),
            AdvertiseMode::Sim => write!(f, "sim"),
        }
    }
}
