use std::{
    ffi::OsString,
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::error::StoreError;

use super::entities::ProjectCollection;

/// Interface for persisting the project collection as one snapshot.
///
/// Writers first take [ProjectStore::lock] and keep the guard for the whole load, modify, save
/// cycle, so cycles from different handles or processes never interleave. Loading needs no lock:
/// a save replaces the snapshot in one step, so a reader sees either the old or the new one.
pub trait ProjectStore: Send + Sync {
    /// Proof of holding the write lock. Dropping it releases the lock.
    type Guard: Send + Sync;

    /// Waits until no other writer holds the lock.
    fn lock(&self) -> impl Future<Output = Result<Self::Guard, StoreError>> + Send;

    /// Reads the whole collection. A store that was never written yields an empty collection.
    fn load(&self) -> impl Future<Output = Result<ProjectCollection, StoreError>> + Send;

    /// Replaces the stored collection with `projects`.
    fn save(
        &self,
        lock: &Self::Guard,
        projects: &ProjectCollection,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: Deref + Send + Sync> ProjectStore for T
where
    T::Target: ProjectStore,
{
    type Guard = <T::Target as ProjectStore>::Guard;

    fn lock(&self) -> impl Future<Output = Result<Self::Guard, StoreError>> + Send {
        self.deref().lock()
    }

    fn load(&self) -> impl Future<Output = Result<ProjectCollection, StoreError>> + Send {
        self.deref().load()
    }

    fn save(
        &self,
        lock: &Self::Guard,
        projects: &ProjectCollection,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.deref().save(lock, projects)
    }
}

/// Exclusive `fs4` lock on the `.lock` sibling of the data file. Closing the file on drop
/// releases it.
pub struct StoreLock {
    _file: File,
}

/// The main realization of [ProjectStore]: a single pretty-printed JSON file.
///
/// Saving writes a sibling temporary file and renames it over the target, so a crash mid-write
/// leaves the previous snapshot intact. The lock lives on a third sibling that is never renamed,
/// so every handle contends on the same inode.
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, extension: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("projects"));
        name.push(extension);
        self.path.with_file_name(name)
    }

    fn temporary_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling_path(".lock")
    }

    async fn write_synced(path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await
    }
}

impl ProjectStore for JsonProjectStore {
    type Guard = StoreLock;

    async fn lock(&self) -> Result<StoreLock, StoreError> {
        if let Some(parent) = self.path.parent().filter(|v| !v.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::persistence(parent))?;
        }

        let path = self.lock_path();
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(StoreError::persistence(&path))?;
        file.lock_exclusive()
            .map_err(StoreError::persistence(&path))?;
        debug!("Locked {:?}", path);
        Ok(StoreLock { _file: file })
    }

    async fn load(&self) -> Result<ProjectCollection, StoreError> {
        debug!("Loading projects from {:?}", self.path);
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Data file {:?} doesn't exist yet, starting empty", self.path);
                return Ok(ProjectCollection::new());
            }
            Err(e) => return Err(StoreError::persistence(&self.path)(e)),
        };

        // A manually cleared file counts as an empty collection.
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(ProjectCollection::new());
        }

        serde_json::from_slice(&data).map_err(|source| StoreError::CorruptData {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, _lock: &StoreLock, projects: &ProjectCollection) -> Result<(), StoreError> {
        debug!("Saving {} projects to {:?}", projects.len(), self.path);
        let data = serde_json::to_vec_pretty(projects)
            .map_err(|e| StoreError::persistence(&self.path)(std::io::Error::other(e)))?;

        // Only the lock holder touches the temporary file.
        let temporary = self.temporary_path();
        Self::write_synced(&temporary, &data)
            .await
            .map_err(StoreError::persistence(&temporary))?;
        tokio::fs::rename(&temporary, &self.path)
            .await
            .map_err(StoreError::persistence(&self.path))?;
        Ok(())
    }
}
