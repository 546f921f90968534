use std::collections::HashSet;

use tracing::warn;

use crate::node::NodeRef;

/// Merge a freshly fetched child list into the existing one, preserving the
/// identity of every surviving node.
///
/// For each fresh entry whose URL already exists, the existing node is
/// updated in place via `copy_data_from`; unmatched fresh entries are
/// appended; existing entries absent from the fresh list are dropped. The
/// result keeps the surviving entries' original relative order followed by
/// the appended entries in fetch order — callers wanting a display order
/// sort afterwards.
///
/// Two fresh entries sharing a URL should be impossible given per-store path
/// uniqueness; if it happens, the later one wins and a warning is logged.
pub fn diff_update(existing: &mut Vec<NodeRef>, fresh: &[NodeRef]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(fresh.len());
    for fresh_node in fresh {
        let url = fresh_node.url();
        if !seen.insert(url.clone()) {
            warn!(url = %url, "duplicate url in fetched listing, keeping the later entry");
        }
        match existing.iter().find(|old| old.url() == url) {
            Some(old) => old.copy_data_from(fresh_node.as_ref()),
            None => existing.push(fresh_node.clone()),
        }
    }

    existing.retain(|old| {
        let url = old.url();
        fresh.iter().any(|f| f.url() == url)
    });
}
