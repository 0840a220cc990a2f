/// Raw upload retention
///
/// The history store only keeps summaries; the uploaded bytes live in a
/// blob store and are referenced by a `StorageToken`. Evicting or deleting
/// a summary releases its token so no orphaned files are left behind.
use crate::error::Result;
use crate::types::{OwnerId, StorageToken, SummaryId};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Storage backend for raw upload bytes
pub trait BlobStore: Send + Sync {
    /// Retain `bytes` for the given summary and return a handle to them
    fn put(&self, owner: &OwnerId, id: &SummaryId, bytes: &[u8]) -> Result<StorageToken>;

    /// Release the bytes behind `token`. Releasing a missing blob is not an error.
    fn release(&self, token: &StorageToken) -> Result<()>;
}

/// Blob store backed by a directory: `<root>/<owner>/<id>.csv`
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a token to a path under the root, refusing anything that escapes it
    pub fn path_for(&self, token: &StorageToken) -> Result<PathBuf> {
        let relative = Path::new(token.as_str());
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid storage token: {}", token)).into());
        }
        Ok(self.root.join(relative))
    }
}

/// Make an owner name safe to use as a single path component
fn owner_dir_name(owner: &OwnerId) -> String {
    let name: String = owner
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() { "_".to_string() } else { name }
}

impl BlobStore for DirStore {
    fn put(&self, owner: &OwnerId, id: &SummaryId, bytes: &[u8]) -> Result<StorageToken> {
        let token = StorageToken::new(format!("{}/{}.csv", owner_dir_name(owner), id));
        let path = self.path_for(&token)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        debug!("stored {} bytes at {:?}", bytes.len(), path);
        Ok(token)
    }

    fn release(&self, token: &StorageToken) -> Result<()> {
        let path = self.path_for(token)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("released {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("blob {:?} already gone", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process blob store, handy for embedding and for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<StorageToken, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, token: &StorageToken) -> bool {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).contains_key(token)
    }

    pub fn get(&self, token: &StorageToken) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).get(token).cloned()
    }
}

impl BlobStore for MemoryStore {
    fn put(&self, owner: &OwnerId, id: &SummaryId, bytes: &[u8]) -> Result<StorageToken> {
        let token = StorageToken::new(format!("{}/{}", owner, id));
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).insert(token.clone(), bytes.to_vec());
        Ok(token)
    }

    fn release(&self, token: &StorageToken) -> Result<()> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).remove(token);
        Ok(())
    }
}
