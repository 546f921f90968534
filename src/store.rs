use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One entry returned by a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
    /// Size in bytes; 0 for directories.
    pub size: u64,
    /// Modification time in milliseconds since the epoch; 0 if unknown.
    pub modified: u64,
}

/// Metadata describing a whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub title: String,
    /// Declared content-type tags, free-form.
    pub type_tags: Vec<String>,
    pub size: u64,
    pub modified: u64,
    /// Whether the current user owns (can write to) this store.
    pub is_owner: bool,
    pub key: String,
}

/// Options for [`Storage::read_file`].
#[derive(Debug, Clone, Default)]
pub struct ReadFileOptions {
    /// Abort the read if it takes longer than this.
    pub timeout: Option<Duration>,
}

/// The storage collaborator: one handle per archive/store.
///
/// The tree never implements this; the host application supplies it. All
/// permission enforcement lives behind this trait — `is_editable` on nodes is
/// a display hint only.
#[async_trait]
pub trait Storage: Send + Sync {
    /// The stable URL identifying this store.
    fn url(&self) -> String;

    /// List the entries directly under `path`, with per-entry stats.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Read a file's full text content.
    async fn read_file(&self, path: &str, opts: ReadFileOptions) -> Result<String>;

    /// Write text content to a file, creating it if absent.
    async fn write_file(&self, path: &str, content: &str) -> Result<()>;

    /// Create a directory at `path`.
    async fn create_directory(&self, path: &str) -> Result<()>;

    /// Remove a single file.
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Remove a directory, recursively if requested.
    async fn remove_directory(&self, path: &str, recursive: bool) -> Result<()>;

    /// Rename/move an entry within this store.
    async fn rename(&self, old_path: &str, new_path: &str) -> Result<()>;

    /// Copy an entry (file or directory) within this store.
    async fn copy(&self, src_path: &str, dst_path: &str) -> Result<()>;

    /// Transfer content from `src_path` in this store to `dst_path` in
    /// another store. When `skip_unreplicated` is set, bytes not yet
    /// replicated locally are left out rather than awaited.
    async fn export_to(
        &self,
        dst: Arc<dyn Storage>,
        src_path: &str,
        dst_path: &str,
        skip_unreplicated: bool,
    ) -> Result<()>;

    /// Fetch this store's metadata.
    async fn metadata(&self) -> Result<StoreMetadata>;

    /// Delete the store identified by `store_url` entirely.
    async fn delete_store(&self, store_url: &str) -> Result<()>;
}

/// Opens storage handles by URL.
///
/// Injected wherever the tree discovers archives it has no handle for yet,
/// so adapters stay testable against in-memory fakes.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn open(&self, url: &str) -> Result<Arc<dyn Storage>>;
}
