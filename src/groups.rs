//! Synthetic grouping containers: the tree root, the user's library, the
//! network view with its buckets and followed-user folders, and the trash.
//! None of these have a backing-store path; they only answer "what are my
//! children" with registry queries wrapped in archive roots.

use std::any::Any;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::archive::ArchiveRoot;
use crate::error::Result;
use crate::node::{FsNode, NodeKind, NodeRef};
use crate::reconcile::diff_update;
use crate::registry::{ArchiveFilter, ArchiveInfo, Profile, Registry};
use crate::sort::{sort_child_list, SortColumn, SortDirection};
use crate::store::StorageProvider;

/// Labels for the type sub-filter folders, with the tag each one matches.
/// `All` matches everything.
const TYPE_FILTERS: &[(&str, Option<&str>)] = &[
    ("All", None),
    ("Applications", Some("application")),
    ("Code modules", Some("module")),
    ("Datasets", Some("dataset")),
    ("Documents", Some("document")),
    ("Music", Some("music")),
    ("Photos", Some("photo")),
    ("User profiles", Some("user-profile")),
    ("Videos", Some("video")),
    ("Websites", Some("website")),
];

fn profile_display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Child list plus refresh serialization, shared by every group container.
struct GroupChildren {
    children: RwLock<Vec<NodeRef>>,
    refresh: Mutex<()>,
}

impl GroupChildren {
    fn new() -> Self {
        Self {
            children: RwLock::new(Vec::new()),
            refresh: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Vec<NodeRef> {
        self.children.read().unwrap().clone()
    }

    fn is_empty(&self) -> bool {
        self.children.read().unwrap().is_empty()
    }

    /// Merge a fresh child set, optionally applying the default name order.
    /// Fixed-order groups pass `ordered = false` and keep fetch order.
    fn reconcile(&self, fresh: &[NodeRef], ordered: bool) {
        let mut children = self.children.write().unwrap();
        diff_update(&mut children, fresh);
        if ordered {
            sort_child_list(&mut children, SortColumn::Name, SortDirection::Desc);
        }
    }

    fn sort(&self, column: SortColumn, direction: SortDirection, reorder: bool) {
        let snapshot = self.snapshot();
        for child in &snapshot {
            child.sort(column, direction);
        }
        if reorder {
            sort_child_list(&mut self.children.write().unwrap(), column, direction);
        }
    }
}

fn wrap_archives(provider: &Arc<dyn StorageProvider>, infos: Vec<ArchiveInfo>) -> Vec<Arc<ArchiveRoot>> {
    infos
        .into_iter()
        .map(|info| Arc::new(ArchiveRoot::from_info(provider.clone(), info)))
        .collect()
}

fn type_filter_children(source: &[Arc<ArchiveRoot>]) -> Vec<NodeRef> {
    TYPE_FILTERS
        .iter()
        .map(|(label, tag)| {
            Arc::new(TypeFilterFolder::new(label, *tag, source.to_vec())) as NodeRef
        })
        .collect()
}

// === RootFolder ===

/// The synthetic top of the tree: library, network, trash, in that order.
pub struct RootFolder {
    registry: Arc<dyn Registry>,
    provider: Arc<dyn StorageProvider>,
    network: Arc<NetworkFolder>,
    inner: GroupChildren,
}

impl RootFolder {
    pub fn new(registry: Arc<dyn Registry>, provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            network: Arc::new(NetworkFolder::new(registry.clone(), provider.clone())),
            registry,
            provider,
            inner: GroupChildren::new(),
        }
    }

    /// The network section, stable across refreshes.
    pub fn network(&self) -> Arc<NetworkFolder> {
        self.network.clone()
    }
}

#[async_trait]
impl FsNode for RootFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Root
    }

    fn url(&self) -> String {
        "group://root".to_string()
    }

    fn name(&self) -> String {
        "Root".to_string()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.inner.refresh.lock().await;
        let profile = self.registry.current_profile().await?;
        let fresh: Vec<NodeRef> = vec![
            Arc::new(FilteredArchivesFolder::library(
                &profile,
                self.registry.clone(),
                self.provider.clone(),
            )),
            self.network.clone(),
            Arc::new(FilteredArchivesFolder::trash(
                self.registry.clone(),
                self.provider.clone(),
            )),
        ];
        // Top-level sections are order-significant; never alphabetized.
        self.inner.reconcile(&fresh, false);
        Ok(())
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, false);
    }
}

// === NetworkFolder ===

/// The network section: saved and rehosting buckets, the ad-hoc "other"
/// bucket, then one folder per followed user. Fixed order.
pub struct NetworkFolder {
    registry: Arc<dyn Registry>,
    provider: Arc<dyn StorageProvider>,
    other: Arc<OtherFolder>,
    inner: GroupChildren,
}

impl NetworkFolder {
    pub fn new(registry: Arc<dyn Registry>, provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            other: Arc::new(OtherFolder::new(provider.clone())),
            registry,
            provider,
            inner: GroupChildren::new(),
        }
    }

    /// The ad-hoc bucket, for out-of-band archive discovery.
    pub fn other(&self) -> Arc<OtherFolder> {
        self.other.clone()
    }
}

#[async_trait]
impl FsNode for NetworkFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn url(&self) -> String {
        "group://network".to_string()
    }

    fn name(&self) -> String {
        "Network".to_string()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.inner.refresh.lock().await;
        let profile = self.registry.current_profile().await?;

        let mut fresh: Vec<NodeRef> = vec![
            Arc::new(FilteredArchivesFolder::saved(
                self.registry.clone(),
                self.provider.clone(),
            )),
            Arc::new(FilteredArchivesFolder::rehosting(
                self.registry.clone(),
                self.provider.clone(),
            )),
            self.other.clone(),
        ];
        for origin in &profile.followed_origins {
            let followed = self.registry.profile(origin).await?;
            fresh.push(Arc::new(UserFolder::new(
                followed,
                self.registry.clone(),
                self.provider.clone(),
            )));
        }

        self.inner.reconcile(&fresh, false);
        Ok(())
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, false);
    }
}

// === FilteredArchivesFolder ===

/// A registry query presented through type sub-filter folders. Covers the
/// library, the saved and rehosting buckets, and the trash.
pub struct FilteredArchivesFolder {
    url: String,
    name: RwLock<String>,
    filter: ArchiveFilter,
    registry: Arc<dyn Registry>,
    provider: Arc<dyn StorageProvider>,
    inner: GroupChildren,
}

impl FilteredArchivesFolder {
    fn new(
        url: &str,
        name: String,
        filter: ArchiveFilter,
        registry: Arc<dyn Registry>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            url: url.to_string(),
            name: RwLock::new(name),
            filter,
            registry,
            provider,
            inner: GroupChildren::new(),
        }
    }

    /// Archives the current user owns and keeps.
    pub fn library(
        profile: &Profile,
        registry: Arc<dyn Registry>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        Self::new(
            "group://library",
            profile_display_name(&profile.name),
            ArchiveFilter {
                is_saved: Some(true),
                is_owner: Some(true),
                networked: None,
            },
            registry,
            provider,
        )
    }

    /// Saved archives the user does not own.
    pub fn saved(registry: Arc<dyn Registry>, provider: Arc<dyn StorageProvider>) -> Self {
        Self::new(
            "group://network/saved",
            "Saved".to_string(),
            ArchiveFilter {
                is_saved: Some(true),
                is_owner: Some(false),
                networked: None,
            },
            registry,
            provider,
        )
    }

    /// Archives the user is rehosting for the network.
    pub fn rehosting(registry: Arc<dyn Registry>, provider: Arc<dyn StorageProvider>) -> Self {
        Self::new(
            "group://network/rehosting",
            "Rehosting".to_string(),
            ArchiveFilter {
                is_saved: Some(true),
                is_owner: Some(false),
                networked: Some(true),
            },
            registry,
            provider,
        )
    }

    /// Known archives the user has not kept.
    pub fn trash(registry: Arc<dyn Registry>, provider: Arc<dyn StorageProvider>) -> Self {
        Self::new(
            "group://trash",
            "Trash".to_string(),
            ArchiveFilter {
                is_saved: Some(false),
                is_owner: None,
                networked: None,
            },
            registry,
            provider,
        )
    }
}

#[async_trait]
impl FsNode for FilteredArchivesFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn name(&self) -> String {
        self.name.read().unwrap().clone()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<FilteredArchivesFolder>() else {
            return;
        };
        *self.name.write().unwrap() = other.name();
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.inner.refresh.lock().await;
        let infos = self.registry.list_archives(self.filter).await?;
        let source = wrap_archives(&self.provider, infos);
        let fresh = type_filter_children(&source);
        self.inner.reconcile(&fresh, true);
        Ok(())
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, true);
    }
}

// === TypeFilterFolder ===

/// One slice of a shared archive set, filtered by declared content type.
pub struct TypeFilterFolder {
    label: String,
    tag: Option<String>,
    source: RwLock<Vec<Arc<ArchiveRoot>>>,
    inner: GroupChildren,
}

impl TypeFilterFolder {
    fn new(label: &str, tag: Option<&str>, source: Vec<Arc<ArchiveRoot>>) -> Self {
        Self {
            label: label.to_string(),
            tag: tag.map(|t| t.to_string()),
            source: RwLock::new(source),
            inner: GroupChildren::new(),
        }
    }
}

#[async_trait]
impl FsNode for TypeFilterFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn url(&self) -> String {
        format!("group://types/{}", self.label)
    }

    fn name(&self) -> String {
        self.label.clone()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<TypeFilterFolder>() else {
            return;
        };
        // Adopt the freshly queried source set; the filtered children are
        // re-derived on the next refresh.
        *self.source.write().unwrap() = other.source.read().unwrap().clone();
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.inner.refresh.lock().await;
        let source = self.source.read().unwrap().clone();
        let fresh: Vec<NodeRef> = source
            .into_iter()
            .filter(|root| match &self.tag {
                Some(tag) => root.declares_type(tag),
                None => true,
            })
            .map(|root| root as NodeRef)
            .collect();
        self.inner.reconcile(&fresh, true);
        Ok(())
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, true);
    }
}

// === UserFolder ===

/// A followed user's published archives, with the user's own profile archive
/// pinned first. Pin order is significant, so the list is never reordered.
pub struct UserFolder {
    profile: RwLock<Profile>,
    registry: Arc<dyn Registry>,
    provider: Arc<dyn StorageProvider>,
    inner: GroupChildren,
}

impl UserFolder {
    pub fn new(
        profile: Profile,
        registry: Arc<dyn Registry>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            profile: RwLock::new(profile),
            registry,
            provider,
            inner: GroupChildren::new(),
        }
    }
}

#[async_trait]
impl FsNode for UserFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn url(&self) -> String {
        format!("group://user/{}", self.profile.read().unwrap().origin)
    }

    fn name(&self) -> String {
        profile_display_name(&self.profile.read().unwrap().name)
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    fn copy_data_from(&self, other: &dyn FsNode) {
        let Some(other) = other.as_any().downcast_ref::<UserFolder>() else {
            return;
        };
        *self.profile.write().unwrap() = other.profile.read().unwrap().clone();
    }

    async fn read_data(&self) -> Result<()> {
        let _guard = self.inner.refresh.lock().await;
        let profile = self.profile.read().unwrap().clone();
        let published = self.registry.list_published(&profile.origin).await?;

        let pinned = ArchiveInfo {
            url: profile.origin.clone(),
            title: profile.name.clone(),
            type_tags: vec!["user-profile".to_string()],
            is_owner: false,
            size: 0,
            modified: 0,
        };
        let mut infos = vec![pinned];
        // The registry may also return the profile archive; keep the pin.
        infos.extend(published.into_iter().filter(|a| a.url != profile.origin));

        let fresh: Vec<NodeRef> = wrap_archives(&self.provider, infos)
            .into_iter()
            .map(|root| root as NodeRef)
            .collect();
        self.inner.reconcile(&fresh, false);
        Ok(())
    }

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, false);
    }
}

// === OtherFolder ===

/// The ad-hoc network bucket. It issues no query of its own; the host pushes
/// newly discovered archives in as it learns about them.
pub struct OtherFolder {
    provider: Arc<dyn StorageProvider>,
    inner: GroupChildren,
}

impl OtherFolder {
    fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            provider,
            inner: GroupChildren::new(),
        }
    }

    /// Insert a newly discovered archive without a full requery. Returns
    /// false when an entry with the same URL is already present.
    pub fn add_archive(&self, info: ArchiveInfo) -> bool {
        let mut children = self.inner.children.write().unwrap();
        if children.iter().any(|c| c.url() == info.url) {
            return false;
        }
        children.push(Arc::new(ArchiveRoot::from_info(self.provider.clone(), info)) as NodeRef);
        true
    }
}

#[async_trait]
impl FsNode for OtherFolder {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Group
    }

    fn url(&self) -> String {
        "group://network/other".to_string()
    }

    fn name(&self) -> String {
        "Other".to_string()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.inner.snapshot()
    }

    // The live set is authoritative; a refresh has nothing to fetch.

    fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.inner.sort(column, direction, true);
    }
}
