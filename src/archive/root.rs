use std::any::Any;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};

use crate::archive::pending::{PendingFile, PendingFolder};
use crate::archive::{filtered_type_tag, list_dir_children};
use crate::error::Result;
use crate::node::{display_name, FsNode, NodeKind, NodeRef};
use crate::reconcile::diff_update;
use crate::registry::ArchiveInfo;
use crate::sort::{sort_child_list, SortColumn, SortDirection};
use crate::store::{Storage, StorageProvider};

/// The root of one archive.
///
/// Created from registry-reported info; the storage handle is opened lazily
/// on first use, and the info is re-synced from store metadata on every
/// refresh.
pub struct ArchiveRoot {
    provider: Arc<dyn StorageProvider>,
    info: RwLock<ArchiveInfo>,
    store: OnceCell<Arc<dyn Storage>>,
    children: RwLock<Vec<NodeRef>>,
    refresh: Mutex<()>,
}

impl ArchiveRoot {
    pub fn from_info(provider: Arc<dyn StorageProvider>, info: ArchiveInfo) -> Self {
        Self {
            provider,
            info: RwLock::new(info),
            store: OnceCell::new(),
            children: RwLock::new(Vec::new()),
            refresh: Mutex::new(()),
        }
    }

    /// Registry/metadata view of this archive.
    pub fn info(&self) -> ArchiveInfo {
        self.info.read().unwrap().clone()
    }

    /// Whether the archive declares the given content-type tag.
    pub fn declares_type(&self, tag: &str) -> bool {
        self.info
            .read()
            .unwrap()
            .type_tags
            .iter()
            .any(|t| t == tag)
    }

    async fn ensure_store(&self) -> Result<Arc<dyn Storage>> {
        let url = self.info.read().unwrap().url.clone();
        self.store
            .get_or_try_init(|| async { self.provider.open(&url).await })
            .await
            .cloned()
    }

    /// Append a pending folder placeholder at the archive root. See
    /// [`crate::archive::ArchiveFolder::new_folder`].
    pub async fn new_folder(&self) -> Result<NodeRef> {
        let store = self.ensure_store().await?;
        let editable = self.info.read().unwrap().is_owner;
        let node: NodeRef = Arc::new(PendingFolder::new(store, String::new(), editable));
        self.children.write().unwrap().push(node.clone());
        Ok(node)
    }

    /// Append a pending file placeholder at the archive root.
    pub async fn new_file(&self) -> Result<NodeRef> {
        let store = self.ensure_store().await?;
        let editable = self.info.read().unwrap().is_owner;
        let node: NodeRef = Arc::new(PendingFile::new(store, String::new(), editable));
        self.children.write().unwrap().push(node.clone());
        Ok(node)
    }
}

#[async_trait]
impl FsNode for ArchiveRoot {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Archive
    }

    fn url(&self) -> String {
        self.info.read().unwrap().url.clone()
    }

    fn name(&self) -> String {
        display_name(&self.info.read().unwrap().title)
    }

    fn size(&self) -> u64 {
        self.info.read().unwrap().size
    }

    fn mtime(&self) -> u64 {
        self.info.read().unwrap().modified
    }

    fn is_editable(&self) -> bool {
        self.info.read().unwrap().is_owner
    }

    fn is_empty(&self) -> bool {
        self.children.read().unwrap().is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children.read().unwrap().clone()
    }

    fn type_label(&self) -> String {
        filtered_type_tag(&self.info.read().unwrap().type_tags)
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<ArchiveRoot>() else {
            return;
        };
        // Store handle and loaded children are lazy state; only the
        // registry-visible attributes move over.
        *self.info.write().unwrap() = other.info();
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.refresh.lock().await;
        let store = self.ensure_store().await?;

        let meta = store.metadata().await?;
        let editable = meta.is_owner;
        {
            let mut info = self.info.write().unwrap();
            info.title = meta.title;
            info.type_tags = meta.type_tags;
            info.size = meta.size;
            info.modified = meta.modified;
            info.is_owner = meta.is_owner;
        }

        let fresh = list_dir_children(&store, "", editable).await?;
        diff_update(&mut self.children.write().unwrap(), &fresh);
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        let store = self.ensure_store().await?;
        let url = self.info.read().unwrap().url.clone();
        store.delete_store(&url).await
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        let snapshot = self.children();
        for child in &snapshot {
            child.sort(column, direction);
        }
        sort_child_list(&mut self.children.write().unwrap(), column, direction);
    }
}
