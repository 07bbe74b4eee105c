//! Rendered grid state.

use super::Density;
use super::Pagination;
use super::SortConfig;
use crate::model::Column;
use crate::model::GridRow;

/// One bucket of the displayed rows.
#[derive(Debug)]
pub struct GroupView<'a, R> {
    pub label: String,
    pub expanded: bool,
    pub rows: Vec<&'a R>,
}

impl<R> GroupView<'_, R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What a grid displays for its current state.
///
/// Without a group key there is exactly one group labelled
/// [`ALL_GROUP`](super::ALL_GROUP), which is always expanded. A column
/// value that happens to read `"all"` is an ordinary group.
#[derive(Debug)]
pub struct GridView<'a, R> {
    pub columns: Vec<&'a Column>,
    pub groups: Vec<GroupView<'a, R>>,
    /// `true` when rows are grouped by a column.
    pub grouped: bool,
    /// Page state with the total matching the displayed data.
    pub pagination: Pagination,
    /// `false` when an unpaged group policy shows every row.
    pub paginated: bool,
    /// Rows left after search and filters.
    pub filtered_count: usize,
    /// Rows held by the grid before filtering.
    pub total_rows: usize,
    pub density: Density,
    pub sort: SortConfig,
}

impl<'a, R: GridRow> GridView<'a, R> {
    /// Displayed rows in order, across every group.
    pub fn rows(&self) -> impl Iterator<Item = &'a R> + '_ {
        self.groups.iter().flat_map(|g| g.rows.iter().copied())
    }

    /// Rows in expanded groups only.
    pub fn expanded_rows(&self) -> impl Iterator<Item = &'a R> + '_ {
        self.groups
            .iter()
            .filter(|g| g.expanded)
            .flat_map(|g| g.rows.iter().copied())
    }

    /// Number of displayed rows.
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(GroupView::len).sum()
    }

    /// Returns `true` if the view is grouped by a column.
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Rendered cell text for `row` under `column`.
    pub fn cell(&self, row: &R, column: &Column) -> String {
        column.render(row.value(&column.key).as_deref())
    }
}
