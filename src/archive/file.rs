use std::any::Any;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::archive::sibling_path;
use crate::error::{Result, TreeError};
use crate::node::{display_name, FsNode, NodeKind};
use crate::store::{DirEntry, ReadFileOptions, Storage};

/// Extensions whose content is never fetched for previews.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "bmp", "webp", "tiff", "mp3", "mp4", "m4a", "ogg", "wav",
    "flac", "avi", "mov", "mkv", "webm", "zip", "gz", "tar", "bz2", "xz", "7z", "rar", "pdf",
    "exe", "dll", "so", "dylib", "wasm", "class", "o", "a", "woff", "woff2", "ttf", "otf", "eot",
    "db", "sqlite", "bin", "dat",
];

/// Truncation cap applied to previews by default.
const DEFAULT_PREVIEW_LENGTH: usize = 500;

/// Cached preview state of one file.
///
/// `Unavailable` records a failed best-effort fetch; it is distinct from
/// `NotLoaded` so a merge never mistakes a degraded preview for an untouched
/// one, and distinct from a hard error so callers can still render the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    NotLoaded,
    Unavailable,
    Text(String),
}

impl Preview {
    /// Whether a load was ever attempted and settled.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Preview::NotLoaded)
    }
}

/// Options for [`ArchiveFile::read_preview`].
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Refetch even when a preview is already cached.
    pub ignore_cache: bool,
    /// Cap on the stored preview length, in characters.
    pub max_length: usize,
    /// Abort the underlying fetch after this long.
    pub timeout: Option<Duration>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            ignore_cache: false,
            max_length: DEFAULT_PREVIEW_LENGTH,
            timeout: None,
        }
    }
}

struct FileState {
    name: String,
    size: u64,
    mtime: u64,
}

/// One file entry inside a backing store.
pub struct ArchiveFile {
    store: Arc<dyn Storage>,
    path: String,
    editable: bool,
    state: RwLock<FileState>,
    preview: RwLock<Preview>,
}

impl ArchiveFile {
    pub(crate) fn new(store: Arc<dyn Storage>, path: String, entry: DirEntry, editable: bool) -> Self {
        Self {
            store,
            path,
            editable,
            state: RwLock::new(FileState {
                name: entry.name,
                size: entry.size,
                mtime: entry.modified,
            }),
            preview: RwLock::new(Preview::NotLoaded),
        }
    }

    /// The path of this file within its store.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current preview state.
    pub fn preview(&self) -> Preview {
        self.preview.read().unwrap().clone()
    }

    /// Best-effort preview load. Never fails: binary formats are skipped
    /// outright, and a failed fetch leaves the preview `Unavailable`.
    pub async fn read_preview(&self, opts: PreviewOptions) {
        if !opts.ignore_cache && self.preview.read().unwrap().is_loaded() {
            return;
        }

        if let Some(ext) = self.extension() {
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                return;
            }
        }

        match self.read_with_timeout(opts.timeout).await {
            Ok(content) => {
                let text = truncate_preview(content, opts.max_length);
                *self.preview.write().unwrap() = Preview::Text(text);
            }
            Err(err) => {
                warn!(url = %FsNode::url(self), %err, "preview fetch failed");
                *self.preview.write().unwrap() = Preview::Unavailable;
            }
        }
    }

    /// Strict full-content read for editing. Collaborator failures and
    /// timeouts propagate.
    pub async fn fetch_content(&self, timeout: Option<Duration>) -> Result<String> {
        self.read_with_timeout(timeout).await
    }

    async fn read_with_timeout(&self, timeout: Option<Duration>) -> Result<String> {
        let opts = ReadFileOptions { timeout };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.read_file(&self.path, opts))
                .await
                .map_err(|_| TreeError::Timeout(limit))?,
            None => self.store.read_file(&self.path, opts).await,
        }
    }

    fn extension(&self) -> Option<String> {
        let name = self.state.read().unwrap().name.clone();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Cap `content` at `max_length` characters, marking the cut with `...`.
fn truncate_preview(content: String, max_length: usize) -> String {
    if content.chars().count() <= max_length {
        return content;
    }
    let keep = max_length.saturating_sub(3);
    let mut text: String = content.chars().take(keep).collect();
    text.push_str("...");
    text
}

#[async_trait]
impl FsNode for ArchiveFile {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::File
    }

    fn url(&self) -> String {
        format!("{}{}", self.store.url(), self.path)
    }

    fn name(&self) -> String {
        display_name(&self.state.read().unwrap().name)
    }

    fn size(&self) -> u64 {
        self.state.read().unwrap().size
    }

    fn mtime(&self) -> u64 {
        self.state.read().unwrap().mtime
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn is_empty(&self) -> bool {
        !self.preview.read().unwrap().is_loaded()
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<ArchiveFile>() else {
            return;
        };
        {
            let incoming = other.state.read().unwrap();
            let mut state = self.state.write().unwrap();
            state.name = incoming.name.clone();
            state.size = incoming.size;
            state.mtime = incoming.mtime;
        }
        // A loaded preview is never reverted by an unloaded counterpart.
        let incoming = other.preview();
        if incoming.is_loaded() {
            *self.preview.write().unwrap() = incoming;
        }
    }

    async fn read_data(&self) -> Result<()> {
        self.read_preview(PreviewOptions::default()).await;
        Ok(())
    }

    async fn rename(&self, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(TreeError::InvalidName(new_name.to_string()));
        }
        let new_path = sibling_path(&self.path, new_name.trim());
        self.store.rename(&self.path, &new_path).await
    }

    async fn copy_to(&self, dest_path: &str, target: Option<Arc<dyn Storage>>) -> Result<()> {
        match target {
            Some(target) => {
                self.store
                    .export_to(target, &self.path, dest_path, true)
                    .await
            }
            None => self.store.copy(&self.path, dest_path).await,
        }
    }

    async fn move_to(&self, dest_path: &str, target: Option<Arc<dyn Storage>>) -> Result<()> {
        match target {
            Some(target) => {
                self.store
                    .export_to(target, &self.path, dest_path, true)
                    .await?;
                self.store.remove_file(&self.path).await
            }
            None => self.store.rename(&self.path, dest_path).await,
        }
    }

    async fn delete(&self) -> Result<()> {
        self.store.remove_file(&self.path).await
    }
}
