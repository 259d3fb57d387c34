use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::record::DailyFocusRecord;

/// Name of the single document holding today's record.
pub const STATE_FILE_NAME: &str = "state.json";

/// Interface for abstracting storage of the current-day record. One key, read and overwritten
/// whole; there is no merging and no history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Reads the stored record. An absent or structurally invalid document is `Ok(None)`, never
    /// an error; only the I/O layer itself can fail.
    async fn load(&self) -> Result<Option<DailyFocusRecord>>;

    /// Replaces the stored record with `record`. Last writer wins.
    async fn save(&self, record: &DailyFocusRecord) -> Result<()>;
}

/// The main realization of [StateStore]: one JSON file in the application directory.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(state_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&state_dir)?;

        Ok(Self {
            path: state_dir.join(STATE_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn overwrite(file: &mut File, record: &DailyFocusRecord) -> Result<()> {
        let buffer = serde_json::to_vec(record)?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<Option<DailyFocusRecord>> {
        debug!("Reading state from {:?}", self.path);
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let mut contents = String::new();
        let read = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        read?;

        match serde_json::from_str::<DailyFocusRecord>(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // An old schema or a write cut off by shutdown. Either way the data is
                // unusable, so the day starts cold.
                warn!("Discarding malformed state in {:?}: {e}", self.path);
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &DailyFocusRecord) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for the file
        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, record).await;
        file.unlock_async().await?;
        result
    }
}
