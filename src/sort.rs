use std::cmp::Ordering;

use crate::node::{FsNode, NodeRef};

/// Column a child list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Display name; also the fallback for every other column.
    Name,
    /// Modification time, newest first by default.
    Updated,
    /// Size in bytes, largest first by default.
    Size,
    /// Type tag, lexicographic.
    Type,
}

/// Direction modifier. `Desc` keeps each column's native ordering; `Asc`
/// reverses whatever the column computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

fn name_cmp(a: &dyn FsNode, b: &dyn FsNode) -> Ordering {
    a.name().cmp(&b.name())
}

/// Pairwise ordering for one column, before container precedence is applied.
///
/// Natives: `Updated` and `Size` are descending, `Type` and `Name` ascending.
/// `Size` is meaningless for containers, so a comparison involving one falls
/// straight through to the name fallback. Ties on any column fall through to
/// the name fallback as well. `SortDirection::Asc` reverses the final result.
pub fn sort_compare(
    a: &dyn FsNode,
    b: &dyn FsNode,
    column: SortColumn,
    direction: SortDirection,
) -> Ordering {
    let native = match column {
        SortColumn::Updated => b.mtime().cmp(&a.mtime()).then_with(|| name_cmp(a, b)),
        SortColumn::Size => {
            if a.is_container() || b.is_container() {
                name_cmp(a, b)
            } else {
                b.size().cmp(&a.size()).then_with(|| name_cmp(a, b))
            }
        }
        SortColumn::Type => a
            .type_label()
            .cmp(&b.type_label())
            .then_with(|| name_cmp(a, b)),
        SortColumn::Name => name_cmp(a, b),
    };
    match direction {
        SortDirection::Asc => native.reverse(),
        SortDirection::Desc => native,
    }
}

/// The two-tier comparator used wherever children are ordered for display:
/// containers come before leaves unconditionally, and `sort_compare` decides
/// within each tier. The precedence tier is never affected by `direction`.
pub fn compare_children(
    a: &dyn FsNode,
    b: &dyn FsNode,
    column: SortColumn,
    direction: SortDirection,
) -> Ordering {
    match (a.is_container(), b.is_container()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => sort_compare(a, b, column, direction),
    }
}

/// Sort a child list in place with [`compare_children`].
pub fn sort_child_list(children: &mut [NodeRef], column: SortColumn, direction: SortDirection) {
    children.sort_by(|a, b| compare_children(a.as_ref(), b.as_ref(), column, direction));
}
