//! Per-guild ledger of verified successes.
//!
//! One target id per line in `{dir}/{guild_id}.log`. Live runs truncate the file when they
//! start and append after every verified success; each append is synced before returning.
//! A live run also holds an advisory lock on `{dir}/{guild_id}.lock` so that runs in other
//! processes cannot truncate or interleave with its ledger.

use std::fs::TryLockError;
use std::io;
use std::path::{Path, PathBuf};

use rolecast_core::TargetId;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};

/// Write handle for one guild's ledger.
#[derive(Debug)]
pub struct RunLedger {
    path: PathBuf,
    file: Option<File>,
}

impl RunLedger {
    /// Ledger file location for `guild_id` under `dir`.
    #[must_use]
    pub fn path_for(dir: &Path, guild_id: &str) -> PathBuf {
        dir.join(format!("{guild_id}.log"))
    }

    /// Handle for `guild_id`'s ledger; no IO happens until the first write.
    #[must_use]
    pub fn new(dir: &Path, guild_id: &str) -> Self {
        Self {
            path: Self::path_for(dir, guild_id),
            file: None,
        }
    }

    /// Location of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the ledger, creating the directory when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub async fn reset(&mut self) -> LedgerResult<()> {
        self.file = None;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| LedgerError::io("create_dir", parent, source))?;
        }
        let file = File::create(&self.path)
            .await
            .map_err(|source| LedgerError::io("truncate", &self.path, source))?;
        self.file = Some(file);
        Ok(())
    }

    /// Append `target_id` and sync it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be written or synced.
    pub async fn record_success(&mut self, target_id: &TargetId) -> LedgerResult<()> {
        let line = format!("{target_id}\n");
        let Self { path, file } = self;
        if file.is_none() {
            *file = Some(open_append(path).await?);
        }
        let file = file
            .as_mut()
            .ok_or_else(|| LedgerError::io("open", path.as_path(), io::ErrorKind::NotFound.into()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| LedgerError::io("append", path.as_path(), source))?;
        file.flush()
            .await
            .map_err(|source| LedgerError::io("flush", path.as_path(), source))?;
        file.sync_data()
            .await
            .map_err(|source| LedgerError::io("sync", path.as_path(), source))
    }

    /// Read every entry of the ledger at `path`; a missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn read_entries(path: &Path) -> LedgerResult<Vec<String>> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LedgerError::io("read", path, source)),
        }
    }
}

/// Exclusive advisory lock on one guild's ledger, released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
    file: std::fs::File,
}

impl LedgerLock {
    /// Lock file location for `guild_id` under `dir`.
    #[must_use]
    pub fn path_for(dir: &Path, guild_id: &str) -> PathBuf {
        dir.join(format!("{guild_id}.lock"))
    }

    /// Take the lock for `guild_id`; `Ok(None)` while any other holder keeps it, including
    /// holders in other processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or the lock call itself fails.
    pub async fn try_acquire(dir: &Path, guild_id: &str) -> LedgerResult<Option<Self>> {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| LedgerError::io("create_dir", dir, source))?;
        let path = Self::path_for(dir, guild_id);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|source| LedgerError::io("open_lock", &path, source))?
            .into_std()
            .await;
        match file.try_lock() {
            Ok(()) => Ok(Some(Self { path, file })),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(source)) => Err(LedgerError::io("lock", path, source)),
        }
    }

    /// Location of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            debug!(path = %self.path.display(), error = %err, "failed to release ledger lock");
        }
    }
}

async fn open_append(path: &Path) -> LedgerResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| LedgerError::io("open", path, source))
}
