use std::error::Error;

use async_trait::async_trait;

use super::{Settings, SettingsStore};

/// Store for runs that should not touch the filesystem.
#[derive(Default)]
pub struct NoopSettingsStore;

#[async_trait]
impl SettingsStore for NoopSettingsStore {
    async fn load(&mut self) -> Result<Settings, Box<dyn Error>> {
        Ok(Settings::default())
    }

    async fn save(&mut self, _: &Settings) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
