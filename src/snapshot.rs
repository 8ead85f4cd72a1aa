use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: io::Error },
    #[error("snapshot {path} is not valid JSON: {source}")]
    Json { path: PathBuf, #[source] source: serde_json::Error },
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

/// One complete, published record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub published_at: String,
    pub name: String,
    pub records: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub name: String,
    pub published_at: String,
    pub records: usize,
}

/// Full-replacement storage: `publish` is all-or-nothing and `latest`
/// only ever returns a completely written snapshot.
pub trait SnapshotStore<T> {
    fn publish(&self, records: &[T]) -> Result<SnapshotInfo, StoreError>;
    fn latest(&self) -> Result<Option<Snapshot<T>>, StoreError>;
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Snapshots as `{prefix}_{timestamp}.json` files in one directory.
#[derive(Debug, Clone)]
pub struct DirSnapshotStore {
    dir: PathBuf,
    prefix: String,
}

impl DirSnapshotStore {
    pub fn new(dir: impl AsRef<Path>, prefix: &str) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), prefix: prefix.to_string() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io { path: path.to_path_buf(), source }
    }

    /// Published file names, oldest first. Temp files never match.
    pub fn published(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(&self.dir)(e)),
        };
        let head = format!("{}_", self.prefix);
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Self::io_err(&self.dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&head) && name.ends_with(".json") {
                names.push(name);
            }
        }
        // timestamped names sort chronologically
        names.sort();
        Ok(names)
    }

    /// Remove all but the newest `keep` snapshots; returns how many were removed.
    /// The newest snapshot is always kept, even for `keep == 0`.
    pub fn prune(&self, keep: usize) -> Result<usize, StoreError> {
        let names = self.published()?;
        let excess = names.len().saturating_sub(keep.max(1));
        for name in &names[..excess] {
            let path = self.dir.join(name);
            fs::remove_file(&path).map_err(Self::io_err(&path))?;
        }
        if excess > 0 {
            tracing::info!(prefix = %self.prefix, removed = excess, "pruned old snapshots");
        }
        Ok(excess)
    }

    fn next_name(&self, now: DateTime<Utc>) -> String {
        let stamp = now.format("%Y%m%d_%H%M%S_%6f");
        let mut name = format!("{}_{stamp}.json", self.prefix);
        let mut n = 1;
        while self.dir.join(&name).exists() {
            // padded so `_010` still sorts after `_009`
            name = format!("{}_{stamp}_{n:03}.json", self.prefix);
            n += 1;
        }
        name
    }
}

impl<T: Serialize + DeserializeOwned> SnapshotStore<T> for DirSnapshotStore {
    fn publish(&self, records: &[T]) -> Result<SnapshotInfo, StoreError> {
        fs::create_dir_all(&self.dir).map_err(Self::io_err(&self.dir))?;
        let now = Utc::now();
        let name = self.next_name(now);
        let published_at = rfc3339(now);
        let snapshot = SnapshotRef { published_at: &published_at, name: &name, records };

        let final_path = self.dir.join(&name);
        let tmp_path = self.dir.join(format!(".{name}.tmp"));
        let write = || -> Result<(), StoreError> {
            let f = File::create(&tmp_path).map_err(Self::io_err(&tmp_path))?;
            let mut w = BufWriter::new(f);
            serde_json::to_writer(&mut w, &snapshot)
                .map_err(|source| StoreError::Json { path: tmp_path.clone(), source })?;
            w.flush().map_err(Self::io_err(&tmp_path))?;
            w.get_ref().sync_all().map_err(Self::io_err(&tmp_path))?;
            Ok(())
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, &final_path).map_err(Self::io_err(&final_path))?;

        tracing::info!(path = %final_path.display(), records = records.len(), "published snapshot");
        Ok(SnapshotInfo { name, published_at, records: records.len() })
    }

    fn latest(&self) -> Result<Option<Snapshot<T>>, StoreError> {
        let Some(name) = self.published()?.pop() else { return Ok(None) };
        let path = self.dir.join(&name);
        let f = File::open(&path).map_err(Self::io_err(&path))?;
        let snapshot = serde_json::from_reader(BufReader::new(f))
            .map_err(|source| StoreError::Json { path, source })?;
        Ok(Some(snapshot))
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    published_at: &'a str,
    name: &'a str,
    records: &'a [T],
}

/// Keeps only the latest snapshot in memory.
#[derive(Debug)]
pub struct MemorySnapshotStore<T> {
    current: Mutex<Option<Snapshot<T>>>,
}

impl<T> MemorySnapshotStore<T> {
    pub fn new() -> Self {
        Self { current: Mutex::new(None) }
    }
}

impl<T> Default for MemorySnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SnapshotStore<T> for MemorySnapshotStore<T> {
    fn publish(&self, records: &[T]) -> Result<SnapshotInfo, StoreError> {
        let now = Utc::now();
        let snapshot = Snapshot {
            published_at: rfc3339(now),
            name: format!("memory_{}", now.format("%Y%m%d_%H%M%S_%6f")),
            records: records.to_vec(),
        };
        let info = SnapshotInfo {
            name: snapshot.name.clone(),
            published_at: snapshot.published_at.clone(),
            records: records.len(),
        };
        *self.current.lock().map_err(|_| StoreError::Poisoned)? = Some(snapshot);
        Ok(info)
    }

    fn latest(&self) -> Result<Option<Snapshot<T>>, StoreError> {
        Ok(self.current.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }
}
