use std::any::Any;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::archive::pending::{PendingFile, PendingFolder};
use crate::archive::{list_dir_children, sibling_path};
use crate::error::{Result, TreeError};
use crate::node::{display_name, FsNode, NodeKind, NodeRef};
use crate::reconcile::diff_update;
use crate::sort::{sort_child_list, SortColumn, SortDirection};
use crate::store::{DirEntry, Storage};

struct FolderState {
    name: String,
    size: u64,
    mtime: u64,
}

/// A directory inside a backing store.
pub struct ArchiveFolder {
    store: Arc<dyn Storage>,
    path: String,
    editable: bool,
    state: RwLock<FolderState>,
    children: RwLock<Vec<NodeRef>>,
    /// Serializes refreshes so two reconciliation passes never interleave.
    refresh: Mutex<()>,
}

impl ArchiveFolder {
    pub(crate) fn new(
        store: Arc<dyn Storage>,
        path: String,
        entry: DirEntry,
        editable: bool,
    ) -> Self {
        Self {
            store,
            path,
            editable,
            state: RwLock::new(FolderState {
                name: entry.name,
                size: entry.size,
                mtime: entry.modified,
            }),
            children: RwLock::new(Vec::new()),
            refresh: Mutex::new(()),
        }
    }

    /// The path of this directory within its store.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Append a placeholder for a folder to be created. The placeholder's
    /// `rename` performs the actual creation; the entry appears as a real
    /// node on the refresh after that.
    pub fn new_folder(&self) -> NodeRef {
        let node: NodeRef = Arc::new(PendingFolder::new(
            self.store.clone(),
            self.path.clone(),
            self.editable,
        ));
        self.children.write().unwrap().push(node.clone());
        node
    }

    /// Append a placeholder for a file to be created. See [`Self::new_folder`].
    pub fn new_file(&self) -> NodeRef {
        let node: NodeRef = Arc::new(PendingFile::new(
            self.store.clone(),
            self.path.clone(),
            self.editable,
        ));
        self.children.write().unwrap().push(node.clone());
        node
    }
}

#[async_trait]
impl FsNode for ArchiveFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Folder
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
        self.children.read().unwrap().is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children.read().unwrap().clone()
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<ArchiveFolder>() else {
            return;
        };
        let incoming = other.state.read().unwrap();
        let mut state = self.state.write().unwrap();
        state.name = incoming.name.clone();
        state.size = incoming.size;
        state.mtime = incoming.mtime;
        // Children stay: a freshly mapped folder has loaded nothing yet.
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.refresh.lock().await;
        let fresh = list_dir_children(&self.store, &self.path, self.editable).await?;
        diff_update(&mut self.children.write().unwrap(), &fresh);
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
                self.store.remove_directory(&self.path, true).await
            }
            None => self.store.rename(&self.path, dest_path).await,
        }
    }

    async fn delete(&self) -> Result<()> {
        self.store.remove_directory(&self.path, true).await
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        let snapshot = self.children();
        for child in &snapshot {
            child.sort(column, direction);
        }
        sort_child_list(&mut self.children.write().unwrap(), column, direction);
    }
}
