use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::sort::{SortColumn, SortDirection};
use crate::store::Storage;

/// Shared handle to a tree node.
///
/// The `Arc` is the node's identity: a refresh mutates the pointed-to node in
/// place rather than substituting a new one, so external holders (selection,
/// expansion state) stay valid across refreshes.
pub type NodeRef = Arc<dyn FsNode>;

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic top of the tree.
    Root,
    /// A directory inside an archive.
    Folder,
    /// The root of one archive.
    Archive,
    /// A file inside an archive.
    File,
    /// A not-yet-committed folder placeholder.
    PendingFolder,
    /// A not-yet-committed file placeholder.
    PendingFile,
    /// A synthetic grouping folder (library, network, trash, ...).
    Group,
}

impl NodeKind {
    /// Whether nodes of this kind own children.
    pub fn is_container(self) -> bool {
        !matches!(self, NodeKind::File | NodeKind::PendingFile)
    }

    /// The default type tag used for display and type-column sorting.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Folder | NodeKind::PendingFolder | NodeKind::Group => "folder",
            NodeKind::Archive => "archive",
            NodeKind::File | NodeKind::PendingFile => "file",
        }
    }
}

/// Trim a raw name for display, substituting a placeholder when nothing
/// printable remains.
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The capability set every tree node exposes.
///
/// Defaults are no-ops; adapters override only what applies to their kind.
/// Mutators never update the tree themselves — their effect becomes visible
/// on the next explicit `read_data` of the affected container.
#[async_trait]
pub trait FsNode: Send + Sync {
    /// Downcast hook for adapter-specific merging in `copy_data_from`.
    fn as_any(&self) -> &dyn Any;

    fn kind(&self) -> NodeKind;

    /// Stable identity, unique among siblings and across refreshes of the
    /// same logical entity.
    fn url(&self) -> String;

    /// Display name, already trimmed/defaulted.
    fn name(&self) -> String;

    /// Size in bytes; 0 for kinds without a meaningful size.
    fn size(&self) -> u64 {
        0
    }

    /// Modification time in milliseconds since the epoch; 0 if unknown.
    fn mtime(&self) -> u64 {
        0
    }

    /// Display hint only; the backing store is the authority on permissions.
    fn is_editable(&self) -> bool {
        false
    }

    fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// True when no children or derived content have been loaded.
    fn is_empty(&self) -> bool {
        true
    }

    /// Snapshot of the current child list. Leaves return an empty list.
    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    /// Type tag for display and type-column sorting. Archive roots override
    /// this with their declared content type.
    fn type_label(&self) -> String {
        self.kind().label().to_string()
    }

    /// Merge display attributes from a freshly fetched counterpart into this
    /// node. Lazy fields move forward only: loaded content on `self` is never
    /// reverted by unloaded content on `other`.
    fn copy_data_from(&self, _other: &dyn FsNode) {}

    /// Refresh this node from its collaborator. Idempotent: repeated calls
    /// with no backing change leave the node unchanged.
    async fn read_data(&self) -> Result<()> {
        Ok(())
    }

    async fn rename(&self, _new_name: &str) -> Result<()> {
        Ok(())
    }

    /// Copy the backing entry to `dest_path`, optionally into another store.
    async fn copy_to(&self, _dest_path: &str, _target: Option<Arc<dyn Storage>>) -> Result<()> {
        Ok(())
    }

    /// Move the backing entry to `dest_path`, optionally into another store.
    async fn move_to(&self, _dest_path: &str, _target: Option<Arc<dyn Storage>>) -> Result<()> {
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        Ok(())
    }

    /// Order this container's subtree for display. Containers sort their
    /// child containers' own children first, then their immediate list with
    /// containers before leaves. Leaves and fixed-order groups ignore the
    /// reorder of their own list.
    fn sort(&self, _column: SortColumn, _direction: SortDirection) {}
}
