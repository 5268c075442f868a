//! Filesystem-backed result store
//!
//! Layout under the root directory:
//! - `logs/<key>__a<attempts>.log` — committed replicate logs
//! - `logs/.<key>.<uuid>.tmp` — staged logs of attempts still running
//! - `datasets/<setting>.json` — one aggregate per copy-number setting
//!
//! Commits and dataset writes go through a rename in the same directory, so
//! concurrent workers never observe half-written files.

use super::dataset::stem_for;
use super::{Dataset, ReplicateKey, ResultStore, StoreError, StoredReplicate};
use crate::analysis::MutationTable;
use crate::experiment::TransferProtocol;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const ATTEMPT_MARK: &str = "__a";
const LOG_EXT: &str = ".log";

#[derive(Debug, Clone)]
pub struct FsResultStore {
    root: PathBuf,
}

/// A log being written by a running attempt
#[derive(Debug)]
pub struct StagedLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Write for StagedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl FsResultStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("logs"))?;
        fs::create_dir_all(root.join("datasets"))?;
        Ok(Self { root })
    }

    fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn dataset_path(&self, protocol: &TransferProtocol) -> PathBuf {
        self.root.join("datasets").join(format!("{}.json", stem_for(protocol)))
    }

    fn committed_path(&self, key: &ReplicateKey, attempts: u32) -> PathBuf {
        self.logs_dir().join(format!("{key}{ATTEMPT_MARK}{attempts}{LOG_EXT}"))
    }

    /// Every committed attempt count recorded for `key`
    fn committed_attempts(&self, key: &ReplicateKey) -> Result<Vec<u32>, StoreError> {
        let prefix = format!("{key}{ATTEMPT_MARK}");
        let mut found = Vec::new();
        for entry in fs::read_dir(self.logs_dir())? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let attempts = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(LOG_EXT))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(attempts) = attempts {
                found.push(attempts);
            }
        }
        found.sort_unstable();
        Ok(found)
    }

    /// Remove staged logs left behind by interrupted runs
    pub fn clear_staged(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for entry in fs::read_dir(self.logs_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let stale = name
                .to_str()
                .is_some_and(|n| n.starts_with('.') && n.ends_with(".tmp"));
            if stale {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Removed {} stale staged logs from {}", removed, self.root.display());
        }
        Ok(removed)
    }

    fn write_atomically(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let dir = path.parent().unwrap_or(&self.root);
        let tmp = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl ResultStore for FsResultStore {
    type Staged = StagedLog;

    fn exists(&self, key: &ReplicateKey) -> Result<Option<u32>, StoreError> {
        // Two racing workers may both commit; the cheaper result wins
        Ok(self.committed_attempts(key)?.first().copied())
    }

    fn load(&self, key: &ReplicateKey) -> Result<StoredReplicate, StoreError> {
        let attempts = self.exists(key)?.ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let text = fs::read_to_string(self.committed_path(key, attempts))?;
        let sha256 = hex::encode(Sha256::digest(text.as_bytes()));
        let table = MutationTable::import_str(&text).map_err(|source| StoreError::MalformedLog {
            key: key.to_string(),
            source,
        })?;
        Ok(StoredReplicate {
            key: key.to_string(),
            attempts,
            sha256,
            table,
        })
    }

    fn stage(&self, key: &ReplicateKey) -> Result<StagedLog, StoreError> {
        let path = self.logs_dir().join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));
        let writer = BufWriter::new(File::create(&path)?);
        Ok(StagedLog { path, writer })
    }

    fn save(&self, key: &ReplicateKey, staged: StagedLog, attempts: u32) -> Result<(), StoreError> {
        let StagedLog { path, writer } = staged;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        let target = self.committed_path(key, attempts);
        fs::rename(&path, &target)?;
        debug!("Committed {}", target.display());
        Ok(())
    }

    fn discard(&self, staged: StagedLog) -> Result<(), StoreError> {
        let StagedLog { path, writer } = staged;
        drop(writer);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(dataset)?;
        let path = self.dataset_path(&dataset.protocol);
        self.write_atomically(&path, json.as_bytes())?;
        info!("Saved {} to {}", dataset.summary(), path.display());
        Ok(())
    }

    fn load_dataset(&self, protocol: &TransferProtocol) -> Result<Option<Dataset>, StoreError> {
        let path = self.dataset_path(protocol);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}
