//! Client-side tree model for browsing remote, versioned content archives.
//!
//! The tree is built from three reusable pieces: a node/container capability
//! trait ([`FsNode`]), an identity-preserving reconciler ([`diff_update`])
//! that refreshes a child list without replacing the node objects a UI may
//! be holding on to, and a column/direction-parameterized sort engine with
//! containers-first precedence. On top of those sit adapters backed by two
//! injected collaborators: a per-archive storage service ([`store::Storage`])
//! and an archive/profile registry ([`registry::Registry`]). Synthetic
//! groupings (library, network, trash, followed users) compose registry
//! queries into containers with no backing path of their own.
//!
//! Mutators never touch the tree directly; a change becomes visible on the
//! next explicit `read_data` of the affected container.

pub mod archive;
pub mod error;
pub mod groups;
pub mod node;
pub mod reconcile;
pub mod registry;
pub mod sort;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Result, TreeError};
pub use node::{display_name, FsNode, NodeKind, NodeRef};
pub use reconcile::diff_update;
pub use sort::{compare_children, sort_compare, SortColumn, SortDirection};
