use std::error::Error;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{trace, warn};

use super::{Settings, SettingsStore};

/// Preferences persisted as a small JSON document.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: &Path) -> JsonSettingsStore {
        JsonSettingsStore {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    /// A missing or unreadable file yields defaults; preferences are never
    /// worth failing startup over.
    async fn load(&mut self) -> Result<Settings, Box<dyn Error>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    warn!(
                        "[JsonSettingsStore] ignoring malformed {}: {err}",
                        self.path.display()
                    );
                    Ok(Settings::default())
                }
            },
            Err(err) => {
                trace!(
                    "[JsonSettingsStore] no settings at {}: {err}",
                    self.path.display()
                );
                Ok(Settings::default())
            }
        }
    }

    async fn save(&mut self, settings: &Settings) -> Result<(), Box<dyn Error>> {
        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents).await?;
        trace!("[JsonSettingsStore] saved {}", self.path.display());
        Ok(())
    }
}
