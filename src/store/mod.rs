//! Filesystem-backed upload store
//!
//! Maps request file names onto paths below the uploads directory.
//! Reads and writes are plain single-shot filesystem operations: no locking,
//! so concurrent writers to one name race and the last write wins.

mod error;

pub use error::{StoreError, StoreResult};

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};

/// Upload store rooted at the uploads directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    create_parent_dirs: bool,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, create_parent_dirs: bool) -> Self {
        Self {
            root: root.into(),
            create_parent_dirs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a request file name to a path inside the uploads directory.
    ///
    /// Sub-path segments are allowed; `.`, `..` and absolute components are
    /// rejected so the result never leaves the root. NUL bytes are rejected
    /// too, since no file can carry one.
    pub fn resolve(&self, name: &str) -> StoreResult<PathBuf> {
        let relative = name.trim_start_matches('/');
        if relative.is_empty() || relative.contains('\0') {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Read the whole file.
    ///
    /// Handlers stream through [`FileStore::open`]; this is the buffered
    /// read used by tests to check what an upload stored.
    pub async fn get(&self, name: &str) -> StoreResult<Vec<u8>> {
        let (path, _) = self.stat(name).await?;
        fs::read(&path).await.map_err(|e| not_found_or_io(name, e))
    }

    /// Open the file for streaming reads, along with its metadata
    pub async fn open(&self, name: &str) -> StoreResult<(File, Metadata)> {
        let (path, metadata) = self.stat(name).await?;
        let file = File::open(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        Ok((file, metadata))
    }

    /// Create or truncate the target and write `data` in one operation.
    ///
    /// A missing uploads directory is an I/O error unless parent creation is
    /// enabled. Returns the number of bytes written.
    pub async fn put(&self, name: &str, data: &[u8]) -> StoreResult<u64> {
        let path = self.resolve(name)?;

        if self.create_parent_dirs {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&path, data).await?;
        Ok(data.len() as u64)
    }

    /// Resolve and check that the name points at a regular file
    async fn stat(&self, name: &str) -> StoreResult<(PathBuf, Metadata)> {
        let path = self.resolve(name)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok((path, metadata))
    }
}

fn not_found_or_io(name: &str, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(name.to_string())
    } else {
        StoreError::Io(err)
    }
}
