use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Summary of one known archive, as reported by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// Stable URL identifying the archive.
    pub url: String,
    pub title: String,
    /// Declared content-type tags, free-form.
    pub type_tags: Vec<String>,
    pub is_owner: bool,
    pub size: u64,
    /// Modification time in milliseconds since the epoch; 0 if unknown.
    pub modified: u64,
}

/// Filter for [`Registry::list_archives`]. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveFilter {
    pub is_saved: Option<bool>,
    pub is_owner: Option<bool>,
    pub networked: Option<bool>,
}

/// A user profile known to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// URL of the profile's own archive.
    pub origin: String,
    /// Origins of followed users.
    pub followed_origins: Vec<String>,
}

/// The registry collaborator: enumerates archives and profiles.
#[async_trait]
pub trait Registry: Send + Sync {
    /// List known archives matching `filter`.
    async fn list_archives(&self, filter: ArchiveFilter) -> Result<Vec<ArchiveInfo>>;

    /// List archives published by the given author origin.
    async fn list_published(&self, author: &str) -> Result<Vec<ArchiveInfo>>;

    /// The current user's profile.
    async fn current_profile(&self) -> Result<Profile>;

    /// Resolve another user's profile by origin URL.
    async fn profile(&self, origin: &str) -> Result<Profile>;
}
