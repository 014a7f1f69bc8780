//! Size-bounded on-disk byte cache
//!
//! Entries are files named by the MD5 of their key. Reads refresh an
//! entry's modification time; when the total size exceeds the limit the
//! least recently modified entries are removed first.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use futures::future::try_join_all;
use tokio::fs;
use tracing::{debug, warn};

use crate::errors::{ImageError, ImageResult};

const TEMP_EXTENSION: &str = "tmp";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    max_bytes: u64,
}

impl DiskCache {
    /// Open (and create if needed) a cache in `dir`
    pub async fn open(dir: impl Into<PathBuf>, max_bytes: u64) -> ImageResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|source| ImageError::Io {
                path: dir.clone(),
                source,
            })?;
            debug!("Created disk cache directory: {}", dir.display());
        }
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// File name for a cache key
    pub fn key(input: &str) -> String {
        format!("{:x}", md5::compute(input.as_bytes()))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(Self::key(key))
    }

    /// Read an entry, refreshing its modification time
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let bytes = fs::read(&path).await.ok()?;
        touch(path).await;
        Some(bytes)
    }

    /// Write an entry, then trim the cache to its limit
    ///
    /// Each write goes to its own temporary file in the cache directory and
    /// is renamed into place, so concurrent writers of one key never share
    /// a partial file. The last rename wins.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> ImageResult<()> {
        let path = self.entry_path(key);
        let dir = self.dir.clone();
        let prefix = Self::key(key);
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut temp = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(TEMP_SUFFIX)
                .tempfile_in(&dir)
                .map_err(|source| ImageError::Io {
                    path: dir.clone(),
                    source,
                })?;
            temp.write_all(&bytes)
                .and_then(|()| temp.as_file().sync_data())
                .map_err(|source| ImageError::Io {
                    path: temp.path().to_path_buf(),
                    source,
                })?;
            // a failed persist drops the temp file, which deletes it
            temp.persist(&path).map_err(|e| ImageError::Io {
                path: path.clone(),
                source: e.error,
            })?;
            Ok::<_, ImageError>(())
        })
        .await??;

        self.trim().await?;
        Ok(())
    }

    /// Drop one entry, e.g. after it turned out to be unreadable
    ///
    /// Returns whether an entry was removed.
    pub async fn remove(&self, key: &str) -> bool {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed disk cache entry {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Total size of all entries in bytes
    pub async fn size_bytes(&self) -> ImageResult<u64> {
        Ok(self.entries().await?.iter().map(|e| e.len).sum())
    }

    /// Remove least recently modified entries until under the limit
    ///
    /// Returns the number of entries removed.
    pub async fn trim(&self) -> ImageResult<usize> {
        let mut entries = self.entries().await?;
        let mut total: u64 = entries.iter().map(|e| e.len).sum();
        if total <= self.max_bytes {
            return Ok(0);
        }

        entries.sort_by_key(|e| e.modified);
        let mut removed = 0;
        for entry in entries {
            if total <= self.max_bytes {
                break;
            }
            match fs::remove_file(&entry.path).await {
                Ok(()) => {
                    total = total.saturating_sub(entry.len);
                    removed += 1;
                }
                Err(e) => warn!("Failed to evict {}: {}", entry.path.display(), e),
            }
        }
        debug!(
            "Disk cache trimmed {} entries, {} of {} bytes used",
            removed, total, self.max_bytes
        );
        Ok(removed)
    }

    /// Remove every entry
    pub async fn clear(&self) -> ImageResult<()> {
        let removals = self.entries().await?.into_iter().map(|entry| async move {
            fs::remove_file(&entry.path)
                .await
                .map_err(|source| ImageError::Io {
                    path: entry.path,
                    source,
                })
        });
        let removed = try_join_all(removals).await?;
        debug!("Disk cache cleared, {} entries removed", removed.len());
        Ok(())
    }

    async fn entries(&self) -> ImageResult<Vec<Entry>> {
        let io_err = |source| ImageError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut read_dir = fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut entries = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await.map_err(io_err)? {
            let path = dir_entry.path();
            if path.extension().is_some_and(|ext| ext == TEMP_EXTENSION) {
                continue;
            }
            let Ok(metadata) = dir_entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            entries.push(Entry {
                path,
                len: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
        Ok(entries)
    }
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    len: u64,
    modified: SystemTime,
}

async fn touch(path: PathBuf) {
    let result = tokio::task::spawn_blocking(move || {
        std::fs::File::options()
            .write(true)
            .open(&path)?
            .set_modified(SystemTime::now())
    })
    .await;
    if let Ok(Err(e)) = result {
        debug!("Could not refresh cache entry time: {}", e);
    }
}
