pub mod json;
pub mod noop;

use std::error::Error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bleemit_domain::region::DEFAULT_MEASURED_POWER;

/// Preferences read at startup and written on teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub identifier: Option<String>,
    #[serde(default)]
    pub major: u16,
    #[serde(default)]
    pub minor: u16,
    #[serde(default = "default_measured_power")]
    pub measured_power: i8,
}

fn default_measured_power() -> i8 {
    DEFAULT_MEASURED_POWER
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            identifier: None,
            major: 0,
            minor: 0,
            measured_power: DEFAULT_MEASURED_POWER,
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send {
    async fn load(&mut self) -> Result<Settings, Box<dyn Error>>;
    async fn save(&mut self, settings: &Settings) -> Result<(), Box<dyn Error>>;
}
