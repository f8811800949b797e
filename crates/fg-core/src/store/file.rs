//! TOML-backed blocklist store

use super::{drain_category, in_category, insert_record, BlockedDomainRecord, BlocklistStore, RecordMap};
use crate::error::{Error, Result};
use crate::matcher::normalize;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct BlocklistDocument {
    version: u32,
    #[serde(default)]
    domains: Vec<BlockedDomainRecord>,
}

/// Blocklist persisted as a TOML document
///
/// The whole document is held in memory and rewritten on every mutation.
/// Writes go to a sibling temporary file which is then renamed over the
/// original, so a crash never leaves a half-written blocklist behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<RecordMap>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut map = RecordMap::new();

        if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| Error::store(&path, e.to_string()))?;
            let document: BlocklistDocument =
                toml::from_str(&content).map_err(|e| Error::store(&path, e.to_string()))?;

            if document.version != FORMAT_VERSION {
                return Err(Error::store(
                    &path,
                    format!("unsupported format version {}", document.version),
                ));
            }

            for record in document.domains {
                insert_record(&mut map, record);
            }
            info!(path = %path.display(), count = map.len(), "Opened blocklist store");
        } else {
            debug!(path = %path.display(), "Blocklist file does not exist yet");
        }

        Ok(Self {
            path,
            records: RwLock::new(map),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a change to a copy of the records, persist it, then publish it
    ///
    /// The in-memory state only changes if the write succeeded.
    fn mutate<R, F>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut RecordMap) -> R,
    {
        let mut records = self.records.write();
        let mut next = records.clone();
        let out = change(&mut next);
        self.persist(&next)?;
        *records = next;
        Ok(out)
    }

    fn persist(&self, map: &RecordMap) -> Result<()> {
        let document = BlocklistDocument {
            version: FORMAT_VERSION,
            domains: map.values().cloned().collect(),
        };
        let content =
            toml::to_string_pretty(&document).map_err(|e| Error::store(&self.path, e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::store(&self.path, e.to_string()))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, content).map_err(|e| Error::store(&tmp, e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::store(&self.path, e.to_string()))?;

        debug!(path = %self.path.display(), count = map.len(), "Blocklist written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "blocklist.toml".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BlocklistStore for FileStore {
    fn load_all(&self) -> Result<Vec<BlockedDomainRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn insert(&self, record: BlockedDomainRecord) -> Result<()> {
        self.mutate(|map| insert_record(map, record))
    }

    fn insert_many(&self, records: Vec<BlockedDomainRecord>) -> Result<()> {
        self.mutate(|map| {
            for record in records {
                insert_record(map, record);
            }
        })
    }

    fn remove(&self, domain: &str) -> Result<bool> {
        let key = normalize(domain);
        if !self.records.read().contains_key(&key) {
            return Ok(false);
        }
        self.mutate(|map| map.remove(&key).is_some())
    }

    fn remove_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>> {
        self.mutate(|map| drain_category(map, category))
    }

    fn clear(&self) -> Result<()> {
        self.mutate(RecordMap::clear)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<BlockedDomainRecord>> {
        Ok(in_category(&self.records.read(), category))
    }
}
