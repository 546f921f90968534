//! In-memory fakes for the collaborator contracts, plus a stub node for
//! exercising the reconciler and sort engine without any adapter involved.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, TreeError};
use crate::node::{FsNode, NodeKind, NodeRef};
use crate::registry::{ArchiveFilter, ArchiveInfo, Profile, Registry};
use crate::store::{DirEntry, ReadFileOptions, Storage, StorageProvider, StoreMetadata};

// === StubNode ===

struct StubState {
    name: String,
    size: u64,
    mtime: u64,
    label: Option<String>,
}

/// Minimal node with settable attributes and one lazy cached field.
pub struct StubNode {
    url: String,
    container: bool,
    state: RwLock<StubState>,
    cached: RwLock<Option<String>>,
}

impl StubNode {
    fn new(url: &str, name: &str, container: bool) -> Self {
        Self {
            url: url.to_string(),
            container,
            state: RwLock::new(StubState {
                name: name.to_string(),
                size: 0,
                mtime: 0,
                label: None,
            }),
            cached: RwLock::new(None),
        }
    }

    pub fn leaf(url: &str, name: &str) -> Self {
        Self::new(url, name, false)
    }

    pub fn folder(url: &str, name: &str) -> Self {
        Self::new(url, name, true)
    }

    pub fn leaf_ref(url: &str, name: &str) -> NodeRef {
        Arc::new(Self::leaf(url, name))
    }

    pub fn folder_ref(url: &str, name: &str) -> NodeRef {
        Arc::new(Self::folder(url, name))
    }

    pub fn with_size(self, size: u64) -> Self {
        self.state.write().unwrap().size = size;
        self
    }

    pub fn with_mtime(self, mtime: u64) -> Self {
        self.state.write().unwrap().mtime = mtime;
        self
    }

    pub fn with_label(self, label: &str) -> Self {
        self.state.write().unwrap().label = Some(label.to_string());
        self
    }

    pub fn set_cached(&self, value: &str) {
        *self.cached.write().unwrap() = Some(value.to_string());
    }

    pub fn cached(&self) -> Option<String> {
        self.cached.read().unwrap().clone()
    }
}

impl FsNode for StubNode {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        if self.container {
            NodeKind::Folder
        } else {
            NodeKind::File
        }
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn name(&self) -> String {
        self.state.read().unwrap().name.clone()
    }

    fn size(&self) -> u64 {
        self.state.read().unwrap().size
    }

    fn mtime(&self) -> u64 {
        self.state.read().unwrap().mtime
    }

    fn type_label(&self) -> String {
        let state = self.state.read().unwrap();
        state
            .label
            .clone()
            .unwrap_or_else(|| self.kind().label().to_string())
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<StubNode>() else {
            return;
        };
        {
            let incoming = other.state.read().unwrap();
            let mut state = self.state.write().unwrap();
            state.name = incoming.name.clone();
            state.size = incoming.size;
            state.mtime = incoming.mtime;
            state.label = incoming.label.clone();
        }
        // Lazy field: only move forward, never back to unloaded.
        if let Some(value) = other.cached() {
            *self.cached.write().unwrap() = Some(value);
        }
    }
}

// === MemoryStore ===

#[derive(Debug, Clone)]
enum Entry {
    Dir,
    File { content: String, modified: u64 },
}

/// In-memory [`Storage`] fake. Paths are `/`-separated and rooted (`""` is
/// the store root, files look like `/docs/a.md`).
pub struct MemoryStore {
    url: String,
    meta: Mutex<StoreMetadata>,
    entries: Mutex<BTreeMap<String, Entry>>,
    /// Artificial latency for `read_file`, for exercising timeouts.
    pub read_delay: Mutex<Option<Duration>>,
    /// URLs passed to `delete_store`.
    pub deleted_stores: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(url: &str, title: &str) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            meta: Mutex::new(StoreMetadata {
                title: title.to_string(),
                type_tags: Vec::new(),
                size: 0,
                modified: 0,
                is_owner: true,
                key: url.to_string(),
            }),
            entries: Mutex::new(BTreeMap::new()),
            read_delay: Mutex::new(None),
            deleted_stores: Mutex::new(Vec::new()),
        })
    }

    pub fn set_meta(&self, meta: StoreMetadata) {
        *self.meta.lock().unwrap() = meta;
    }

    pub fn add_dir(&self, path: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_string(), Entry::Dir);
    }

    pub fn add_file(&self, path: &str, content: &str, modified: u64) {
        self.entries.lock().unwrap().insert(
            path.to_string(),
            Entry::File {
                content: content.to_string(),
                modified,
            },
        );
    }

    pub fn remove(&self, path: &str) {
        self.entries.lock().unwrap().remove(path);
    }

    pub fn has(&self, path: &str) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    pub fn file_content(&self, path: &str) -> Option<String> {
        match self.entries.lock().unwrap().get(path) {
            Some(Entry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    fn is_direct_child(parent: &str, candidate: &str) -> bool {
        let rest = match candidate.strip_prefix(parent) {
            Some(r) => r,
            None => return false,
        };
        rest.len() > 1 && rest.starts_with('/') && !rest[1..].contains('/')
    }
}

#[async_trait]
impl Storage for MemoryStore {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>> {
        if !path.is_empty() && !self.has(path) {
            return Err(TreeError::Storage(format!("no such directory: {path}")));
        }
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|(p, _)| Self::is_direct_child(path, p))
            .map(|(p, e)| {
                let name = p.rsplit('/').next().unwrap_or_default().to_string();
                match e {
                    Entry::Dir => DirEntry {
                        name,
                        is_directory: true,
                        size: 0,
                        modified: 0,
                    },
                    Entry::File { content, modified } => DirEntry {
                        name,
                        is_directory: false,
                        size: content.len() as u64,
                        modified: *modified,
                    },
                }
            })
            .collect())
    }

    async fn read_file(&self, path: &str, _opts: ReadFileOptions) -> Result<String> {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.file_content(path)
            .ok_or_else(|| TreeError::Storage(format!("no such file: {path}")))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        self.add_file(path, content, 0);
        Ok(())
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        if self.has(path) {
            return Err(TreeError::Storage(format!("already exists: {path}")));
        }
        self.add_dir(path);
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        match self.entries.lock().unwrap().remove(path) {
            Some(Entry::File { .. }) => Ok(()),
            _ => Err(TreeError::Storage(format!("no such file: {path}"))),
        }
    }

    async fn remove_directory(&self, path: &str, recursive: bool) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if !matches!(entries.get(path), Some(Entry::Dir)) {
            return Err(TreeError::Storage(format!("no such directory: {path}")));
        }
        let prefix = format!("{path}/");
        let has_children = entries.keys().any(|p| p.starts_with(&prefix));
        if has_children && !recursive {
            return Err(TreeError::Storage(format!("directory not empty: {path}")));
        }
        entries.retain(|p, _| p != path && !p.starts_with(&prefix));
        Ok(())
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(old_path) {
            return Err(TreeError::Storage(format!("no such entry: {old_path}")));
        }
        let prefix = format!("{old_path}/");
        let moved: Vec<(String, Entry)> = entries
            .iter()
            .filter(|(p, _)| *p == old_path || p.starts_with(&prefix))
            .map(|(p, e)| {
                let suffix = &p[old_path.len()..];
                (format!("{new_path}{suffix}"), e.clone())
            })
            .collect();
        entries.retain(|p, _| p != old_path && !p.starts_with(&prefix));
        entries.extend(moved);
        Ok(())
    }

    async fn copy(&self, src_path: &str, dst_path: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(src_path) {
            return Err(TreeError::Storage(format!("no such entry: {src_path}")));
        }
        let prefix = format!("{src_path}/");
        let copied: Vec<(String, Entry)> = entries
            .iter()
            .filter(|(p, _)| *p == src_path || p.starts_with(&prefix))
            .map(|(p, e)| {
                let suffix = &p[src_path.len()..];
                (format!("{dst_path}{suffix}"), e.clone())
            })
            .collect();
        entries.extend(copied);
        Ok(())
    }

    async fn export_to(
        &self,
        dst: Arc<dyn Storage>,
        src_path: &str,
        dst_path: &str,
        _skip_unreplicated: bool,
    ) -> Result<()> {
        let to_export: Vec<(String, Entry)> = {
            let entries = self.entries.lock().unwrap();
            if !entries.contains_key(src_path) {
                return Err(TreeError::Storage(format!("no such entry: {src_path}")));
            }
            let prefix = format!("{src_path}/");
            entries
                .iter()
                .filter(|(p, _)| *p == src_path || p.starts_with(&prefix))
                .map(|(p, e)| {
                    let suffix = &p[src_path.len()..];
                    (format!("{dst_path}{suffix}"), e.clone())
                })
                .collect()
        };
        // Directories before their contents; BTreeMap order guarantees it.
        for (path, entry) in to_export {
            match entry {
                Entry::Dir => dst.create_directory(&path).await?,
                Entry::File { content, .. } => dst.write_file(&path, &content).await?,
            }
        }
        Ok(())
    }

    async fn metadata(&self) -> Result<StoreMetadata> {
        Ok(self.meta.lock().unwrap().clone())
    }

    async fn delete_store(&self, store_url: &str) -> Result<()> {
        self.deleted_stores
            .lock()
            .unwrap()
            .push(store_url.to_string());
        Ok(())
    }
}

// === MemoryProvider ===

/// [`StorageProvider`] fake resolving URLs against registered stores.
#[derive(Default)]
pub struct MemoryProvider {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, store: Arc<MemoryStore>) {
        self.stores
            .lock()
            .unwrap()
            .insert(Storage::url(store.as_ref()), store);
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    async fn open(&self, url: &str) -> Result<Arc<dyn Storage>> {
        self.stores
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .map(|s| s as Arc<dyn Storage>)
            .ok_or_else(|| TreeError::Storage(format!("unknown store: {url}")))
    }
}

// === MemoryRegistry ===

/// One archive record as the fake registry tracks it.
pub struct RegisteredArchive {
    pub info: ArchiveInfo,
    pub is_saved: bool,
    pub networked: bool,
}

/// [`Registry`] fake backed by plain vectors.
pub struct MemoryRegistry {
    pub archives: Mutex<Vec<RegisteredArchive>>,
    pub published: Mutex<HashMap<String, Vec<ArchiveInfo>>>,
    pub profiles: Mutex<HashMap<String, Profile>>,
    pub current: Mutex<Profile>,
}

impl MemoryRegistry {
    pub fn new(current: Profile) -> Arc<Self> {
        Arc::new(Self {
            archives: Mutex::new(Vec::new()),
            published: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            current: Mutex::new(current),
        })
    }

    pub fn add_archive(&self, info: ArchiveInfo, is_saved: bool, networked: bool) {
        self.archives.lock().unwrap().push(RegisteredArchive {
            info,
            is_saved,
            networked,
        });
    }

    pub fn add_profile(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.origin.clone(), profile);
    }

    pub fn publish(&self, author: &str, info: ArchiveInfo) {
        self.published
            .lock()
            .unwrap()
            .entry(author.to_string())
            .or_default()
            .push(info);
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn list_archives(&self, filter: ArchiveFilter) -> Result<Vec<ArchiveInfo>> {
        Ok(self
            .archives
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                filter.is_saved.map_or(true, |v| a.is_saved == v)
                    && filter.is_owner.map_or(true, |v| a.info.is_owner == v)
                    && filter.networked.map_or(true, |v| a.networked == v)
            })
            .map(|a| a.info.clone())
            .collect())
    }

    async fn list_published(&self, author: &str) -> Result<Vec<ArchiveInfo>> {
        Ok(self
            .published
            .lock()
            .unwrap()
            .get(author)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_profile(&self) -> Result<Profile> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn profile(&self, origin: &str) -> Result<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .get(origin)
            .cloned()
            .ok_or_else(|| TreeError::Registry(format!("unknown profile: {origin}")))
    }
}

/// Convenience for building archive infos in tests.
pub fn archive_info(url: &str, title: &str, type_tags: &[&str], is_owner: bool) -> ArchiveInfo {
    ArchiveInfo {
        url: url.to_string(),
        title: title.to_string(),
        type_tags: type_tags.iter().map(|t| t.to_string()).collect(),
        is_owner,
        size: 0,
        modified: 0,
    }
}

/// Convenience for building profiles in tests.
pub fn profile(name: &str, origin: &str, followed: &[&str]) -> Profile {
    Profile {
        name: name.to_string(),
        origin: origin.to_string(),
        followed_origins: followed.iter().map(|f| f.to_string()).collect(),
    }
}
