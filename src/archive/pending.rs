use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::archive::join_path;
use crate::error::{Result, TreeError};
use crate::node::{display_name, FsNode, NodeKind};
use crate::store::Storage;

// Monotonic suffix keeping placeholder URLs sibling-unique.
static PENDING_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    PENDING_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// A folder that exists in the tree but not yet in the store. `rename` issues
/// the actual creation; the placeholder is dropped by the refresh that
/// discovers the real entry.
pub struct PendingFolder {
    store: Arc<dyn Storage>,
    parent_path: String,
    editable: bool,
    seq: u64,
    name: RwLock<String>,
}

impl PendingFolder {
    pub(crate) fn new(store: Arc<dyn Storage>, parent_path: String, editable: bool) -> Self {
        Self {
            store,
            parent_path,
            editable,
            seq: next_seq(),
            name: RwLock::new(String::new()),
        }
    }
}

#[async_trait]
impl FsNode for PendingFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::PendingFolder
    }

    fn url(&self) -> String {
        format!(
            "{}{}#pending-folder-{}",
            self.store.url(),
            self.parent_path,
            self.seq
        )
    }

    fn name(&self) -> String {
        display_name(&self.name.read().unwrap())
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    async fn rename(&self, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TreeError::InvalidName(new_name.to_string()));
        }
        let path = join_path(&self.parent_path, new_name);
        self.store.create_directory(&path).await?;
        *self.name.write().unwrap() = new_name.to_string();
        Ok(())
    }
}

/// A file counterpart of [`PendingFolder`]: `rename` commits a blank entry
/// under the chosen name.
pub struct PendingFile {
    store: Arc<dyn Storage>,
    parent_path: String,
    editable: bool,
    seq: u64,
    name: RwLock<String>,
}

impl PendingFile {
    pub(crate) fn new(store: Arc<dyn Storage>, parent_path: String, editable: bool) -> Self {
        Self {
            store,
            parent_path,
            editable,
            seq: next_seq(),
            name: RwLock::new(String::new()),
        }
    }
}

#[async_trait]
impl FsNode for PendingFile {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::PendingFile
    }

    fn url(&self) -> String {
        format!(
            "{}{}#pending-file-{}",
            self.store.url(),
            self.parent_path,
            self.seq
        )
    }

    fn name(&self) -> String {
        display_name(&self.name.read().unwrap())
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    async fn rename(&self, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TreeError::InvalidName(new_name.to_string()));
        }
        let path = join_path(&self.parent_path, new_name);
        self.store.write_file(&path, "").await?;
        *self.name.write().unwrap() = new_name.to_string();
        Ok(())
    }
}
