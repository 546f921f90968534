//! Adapters backed by one storage collaborator: the leaf file node, the
//! folder node, the archive root, and the pending-creation placeholders.

mod file;
mod folder;
mod pending;
mod root;

pub use file::{ArchiveFile, Preview, PreviewOptions};
pub use folder::ArchiveFolder;
pub use pending::{PendingFile, PendingFolder};
pub use root::ArchiveRoot;

use std::sync::Arc;

use crate::error::Result;
use crate::node::NodeRef;
use crate::store::Storage;

/// Content-type tags an archive root may display directly. Anything else
/// falls back to the generic `archive` tag.
pub const STANDARD_TYPES: &[&str] = &[
    "application",
    "module",
    "dataset",
    "document",
    "music",
    "photo",
    "user-profile",
    "video",
    "website",
];

/// Pick the display type for an archive from its declared tags.
pub fn filtered_type_tag(tags: &[String]) -> String {
    tags.iter()
        .find(|t| STANDARD_TYPES.contains(&t.as_str()))
        .cloned()
        .unwrap_or_else(|| "archive".to_string())
}

/// Join a directory path and an entry name. The store root is `""`, so every
/// joined path starts with `/`.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}

/// The directory part of a path (`""` for entries at the store root).
pub(crate) fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Replace the final segment of `path` with `new_name`.
pub(crate) fn sibling_path(path: &str, new_name: &str) -> String {
    join_path(parent_of(path), new_name)
}

/// List one directory and map its entries to typed child nodes. The result is
/// unreconciled; callers merge it into their previous child list.
pub(crate) async fn list_dir_children(
    store: &Arc<dyn Storage>,
    path: &str,
    editable: bool,
) -> Result<Vec<NodeRef>> {
    let entries = store.list_directory(path).await?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let child_path = join_path(path, &entry.name);
            if entry.is_directory {
                Arc::new(ArchiveFolder::new(store.clone(), child_path, entry, editable)) as NodeRef
            } else {
                Arc::new(ArchiveFile::new(store.clone(), child_path, entry, editable)) as NodeRef
            }
        })
        .collect())
}
