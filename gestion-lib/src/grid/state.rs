//! The grid controller.

use log::debug;
use log::warn;

use super::ExpandedGroups;
use super::Filter;
use super::GridDefaults;
use super::GridOptions;
use super::GroupBy;
use super::GroupPaging;
use super::PageRequest;
use super::Pagination;
use super::PagingMode;
use super::SortConfig;
use super::filter;
use super::group;
use super::page;
use super::sort;
use super::view::GridView;
use super::view::GroupView;
use super::Density;
use crate::export::ExportScope;
use crate::export::ExportTable;
use crate::export::to_export_rows;
use crate::model::Column;
use crate::model::GridRow;
use crate::prefs::PreferenceSnapshot;
use crate::prefs::PreferenceStore;

/// A data grid: rows, columns and the user's view state.
///
/// State changes go through methods that enforce the paging rules: search,
/// filter and sort changes return to page 1, page-size changes return to
/// page 1, and the current page always stays in range. [`view`](Self::view)
/// runs the filter → sort → group/paginate pipeline on demand.
///
/// # Example
///
/// ```
/// use gestion_lib::grid::{DataGrid, Filter, GridOptions};
/// use gestion_lib::model::{Column, Row};
///
/// let mut grid = DataGrid::new(
///     vec![Column::new("nom", "Nom"), Column::new("ville", "Ville")],
///     GridOptions::default().page_size(2),
/// );
/// grid.set_rows(vec![
///     Row::new(1).set("nom", "Durand").set("ville", "Lyon"),
///     Row::new(2).set("nom", "Martin").set("ville", "Paris"),
///     Row::new(3).set("nom", "Bernard").set("ville", "Lyon"),
/// ]);
/// grid.toggle_sort("nom");
/// grid.add_filter(Filter::equals("ville", "Lyon"));
///
/// let view = grid.view();
/// assert_eq!(view.filtered_count, 2);
/// assert_eq!(view.rows().next().unwrap().id(), "3");
/// ```
pub struct DataGrid<R> {
    columns: Vec<Column>,
    rows: Vec<R>,
    defaults: GridDefaults,
    paging: PagingMode,
    group_paging: GroupPaging,
    page_sizes: Vec<usize>,
    memorize_key: Option<String>,

    search: String,
    filters: Vec<Filter>,
    sort: SortConfig,
    group_by: GroupBy,
    expanded: ExpandedGroups,
    visible_columns: Vec<String>,
    density: Density,
    pagination: Pagination,
}

impl<R: GridRow> DataGrid<R> {
    /// Creates an empty grid.
    pub fn new(columns: Vec<Column>, options: GridOptions) -> Self {
        let GridOptions {
            defaults,
            paging,
            group_paging,
            page_sizes,
            memorize_key,
        } = options;

        let mut grid = Self {
            columns,
            rows: Vec::new(),
            defaults: defaults.clone(),
            paging,
            group_paging,
            page_sizes,
            memorize_key,
            search: String::new(),
            filters: Vec::new(),
            sort: SortConfig::none(),
            group_by: GroupBy::None,
            expanded: ExpandedGroups::new(),
            visible_columns: Vec::new(),
            density: Density::Normal,
            pagination: Pagination::new(defaults.page_size),
        };
        grid.apply_defaults();
        grid
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Every declared column, in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Declared column by key.
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.visible_columns
            .iter()
            .filter_map(|key| self.column(key))
            .collect()
    }

    /// Visible column keys in display order.
    pub fn visible_keys(&self) -> &[String] {
        &self.visible_columns
    }

    /// All rows held by the grid.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    pub fn group_by(&self) -> &GroupBy {
        &self.group_by
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Page-size choices offered to the user.
    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    /// Preference key, if this grid memorizes its state.
    pub fn memorize_key(&self) -> Option<&str> {
        self.memorize_key.as_deref()
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the rows (client paging).
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.sync_total();
    }

    /// Replaces the rows with one server page and its total count.
    pub fn set_page_rows(&mut self, rows: Vec<R>, total_items: usize) {
        self.rows = rows;
        self.set_total_items(total_items);
    }

    /// Updates the externally supplied total (server paging only).
    pub fn set_total_items(&mut self, total_items: usize) {
        if !self.paging.is_server() {
            debug!("ignoring external total in client paging mode");
            return;
        }
        self.pagination.set_total_items(total_items);
    }

    // =========================================================================
    // Search and filters
    // =========================================================================

    /// Sets the free-text search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.search {
            return;
        }
        self.search = term;
        self.reset_page();
    }

    /// Adds a filter; it combines with the others by AND.
    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
        self.reset_page();
    }

    /// Removes every filter on `key`. Returns `true` if any was removed.
    pub fn remove_filter(&mut self, key: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.key != key);
        let removed = self.filters.len() != before;
        if removed {
            self.reset_page();
        }
        removed
    }

    /// Replaces the whole filter set.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
        self.reset_page();
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear();
        self.reset_page();
    }

    /// Filters that target filterable columns.
    fn active_filters(&self) -> Vec<Filter> {
        self.filters
            .iter()
            .filter(|f| self.column(&f.key).is_none_or(|c| c.filterable))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Sort
    // =========================================================================

    /// Header click on `key`: asc, then desc, then asc again.
    ///
    /// Unknown and non-sortable columns are ignored. Returns `true` if the
    /// sort changed.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        if !self.column(key).is_some_and(|c| c.sortable) {
            debug!("sort ignored on column {:?}", key);
            return false;
        }
        self.sort.toggle(key);
        self.reset_page();
        true
    }

    /// Sets the sort directly.
    pub fn set_sort(&mut self, sort: SortConfig) {
        if sort == self.sort {
            return;
        }
        self.sort = sort;
        self.reset_page();
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Changes the group column. Expanded state starts over.
    pub fn set_group_by(&mut self, group_by: GroupBy) {
        if group_by == self.group_by {
            return;
        }
        self.group_by = group_by;
        self.expanded.collapse_all();
        self.sync_total();
    }

    /// Expands or collapses one group. Returns the new state.
    pub fn toggle_group(&mut self, label: &str) -> bool {
        self.expanded.toggle(label)
    }

    /// Returns `true` if the group is expanded.
    pub fn is_group_expanded(&self, label: &str) -> bool {
        !self.group_by.is_active() || self.expanded.is_expanded(label)
    }

    /// Expands every group present in the current result.
    pub fn expand_all_groups(&mut self) {
        let labels: Vec<String> = match self.group_by.key() {
            Some(key) => {
                let mut labels: Vec<String> = self
                    .filtered_sorted()
                    .iter()
                    .map(|row| group::group_label(*row, key))
                    .collect();
                labels.sort();
                labels.dedup();
                labels
            }
            None => return,
        };
        self.expanded.expand_all(labels.iter().map(String::as_str));
    }

    /// Collapses every group.
    pub fn collapse_all_groups(&mut self) {
        self.expanded.collapse_all();
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Goes to a 1-based page; out-of-range pages are ignored.
    pub fn set_page(&mut self, page: usize) -> bool {
        let before = self.pagination.request();
        let changed = self.pagination.go_to(page);
        self.notify_paging(before);
        changed
    }

    pub fn next_page(&mut self) -> bool {
        let before = self.pagination.request();
        let changed = self.pagination.next();
        self.notify_paging(before);
        changed
    }

    pub fn previous_page(&mut self) -> bool {
        let before = self.pagination.request();
        let changed = self.pagination.previous();
        self.notify_paging(before);
        changed
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        let before = self.pagination.request();
        self.pagination.set_page_size(page_size);
        self.notify_paging(before);
    }

    fn reset_page(&mut self) {
        let before = self.pagination.request();
        self.pagination.reset();
        self.sync_total();
        self.notify_paging(before);
    }

    /// Recomputes the item count for client paging and clamps the page.
    fn sync_total(&mut self) {
        if self.paging.is_server() {
            return;
        }
        let count = self.filtered_sorted().len();
        self.pagination.set_total_items(count);
    }

    fn notify_paging(&self, before: PageRequest) {
        let after = self.pagination.request();
        if before == after {
            return;
        }
        if let PagingMode::Server {
            on_change: Some(handler),
        } = &self.paging
        {
            debug!("server page request {:?}", after);
            handler(after);
        }
    }

    /// Returns `true` when the current state slices rows into pages.
    pub fn is_paginated(&self) -> bool {
        !(self.group_by.is_active() && self.group_paging == GroupPaging::Unpaged)
    }

    // =========================================================================
    // Columns and density
    // =========================================================================

    /// Sets the visible columns in display order.
    ///
    /// Unknown keys and duplicates are dropped. An empty result keeps the
    /// current columns. Returns `true` if the list was accepted.
    pub fn set_visible_columns<S: AsRef<str>>(&mut self, keys: &[S]) -> bool {
        let mut accepted: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            if self.column(key).is_some() && !accepted.iter().any(|k| k == key) {
                accepted.push(key.to_string());
            }
        }
        if accepted.is_empty() {
            warn!("refusing to hide every column");
            return false;
        }
        self.visible_columns = accepted;
        self.sync_total();
        true
    }

    /// Shows or hides a column. The last visible column cannot be hidden.
    ///
    /// A column shown again takes its declared position among the visible
    /// ones. Returns `true` if visibility changed.
    pub fn toggle_column(&mut self, key: &str) -> bool {
        let Some(declared) = self.columns.iter().position(|c| c.key == key) else {
            return false;
        };

        if let Some(pos) = self.visible_columns.iter().position(|k| k == key) {
            if self.visible_columns.len() == 1 {
                return false;
            }
            self.visible_columns.remove(pos);
        } else {
            let insert_at = self
                .visible_columns
                .iter()
                .position(|k| self.declared_index(k).is_some_and(|i| i > declared))
                .unwrap_or(self.visible_columns.len());
            self.visible_columns.insert(insert_at, key.to_string());
        }
        self.sync_total();
        true
    }

    fn declared_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn filtered_sorted(&self) -> Vec<&R> {
        let filters = self.active_filters();
        let filtered = filter::apply(&self.rows, &self.search, &self.visible_columns, &filters);
        sort::apply(filtered, &self.sort)
    }

    /// Runs the pipeline for the current state.
    pub fn view(&self) -> GridView<'_, R> {
        let sorted = self.filtered_sorted();
        let filtered_count = sorted.len();

        let mut pagination = self.pagination.clone();
        if !self.paging.is_server() {
            pagination.set_total_items(filtered_count);
        }

        let groups = match (&self.paging, self.group_paging) {
            // Server rows are already the requested page
            (PagingMode::Server { .. }, _) => group::group_rows(&sorted, &self.group_by),
            _ if !self.group_by.is_active() => {
                let slice = self.slice(&sorted, &pagination);
                group::group_rows(slice, &self.group_by)
            }
            (_, GroupPaging::PageThenGroup) => {
                let slice = self.slice(&sorted, &pagination);
                group::group_rows(slice, &self.group_by)
            }
            (_, GroupPaging::GroupThenPage) => {
                let ordered: Vec<&R> = group::group_rows(&sorted, &self.group_by)
                    .into_iter()
                    .flat_map(|g| g.rows)
                    .collect();
                let slice = self.slice(&ordered, &pagination);
                group::group_rows(slice, &self.group_by)
            }
            (_, GroupPaging::Unpaged) => group::group_rows(&sorted, &self.group_by),
        };

        let grouped = self.group_by.is_active();
        let groups = groups
            .into_iter()
            .map(|g| GroupView {
                expanded: !grouped || self.expanded.is_expanded(&g.label),
                label: g.label,
                rows: g.rows,
            })
            .collect();

        GridView {
            columns: self.visible_columns(),
            groups,
            grouped,
            pagination,
            paginated: self.is_paginated(),
            filtered_count,
            total_rows: self.rows.len(),
            density: self.density,
            sort: self.sort.clone(),
        }
    }

    fn slice<'v, 'a>(&self, rows: &'v [&'a R], pagination: &Pagination) -> &'v [&'a R] {
        page::paginate(rows, pagination.current_page(), pagination.page_size())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Visible columns of the filtered, sorted rows (or the current page).
    pub fn export(&self, scope: ExportScope) -> ExportTable {
        let sorted = self.filtered_sorted();
        let columns = self.visible_columns();
        match scope {
            ExportScope::All => to_export_rows(&sorted, &columns),
            ExportScope::CurrentPage if self.paging.is_server() => {
                to_export_rows(&sorted, &columns)
            }
            ExportScope::CurrentPage => {
                let mut pagination = self.pagination.clone();
                pagination.set_total_items(sorted.len());
                to_export_rows(self.slice(&sorted, &pagination), &columns)
            }
        }
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Current persisted-state snapshot.
    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            visible_columns: self.visible_columns.clone(),
            sort: self.sort.clone(),
            group_by: self.group_by.clone(),
            page_size: self.pagination.page_size(),
            density: self.density,
        }
    }

    /// Applies a snapshot over the current state.
    ///
    /// Column keys that are no longer declared are dropped; if none remain
    /// the visible columns are left untouched.
    pub fn apply_snapshot(&mut self, snapshot: PreferenceSnapshot) {
        self.set_visible_columns(&snapshot.visible_columns);
        self.sort = snapshot.sort;
        self.group_by = snapshot.group_by;
        self.expanded.collapse_all();
        self.density = snapshot.density;
        let before = self.pagination.request();
        self.pagination.set_page_size(snapshot.page_size);
        self.sync_total();
        self.notify_paging(before);
    }

    fn apply_defaults(&mut self) {
        let visible: Vec<String> = match &self.defaults.visible_columns {
            Some(keys) => keys.clone(),
            None => self.columns.iter().map(|c| c.key.clone()).collect(),
        };
        if !self.set_visible_columns(&visible) {
            self.visible_columns = self.columns.iter().map(|c| c.key.clone()).collect();
        }
        self.sort = self.defaults.sort.clone();
        self.group_by = self.defaults.group_by.clone();
        self.expanded.collapse_all();
        self.density = self.defaults.density;
        self.pagination.set_page_size(self.defaults.page_size);
        self.sync_total();
    }

    /// Loads the stored snapshot, if this grid memorizes and one exists.
    ///
    /// Failures are logged and leave the current state in place. Returns
    /// `true` if a snapshot was applied.
    pub async fn restore(&mut self, store: &PreferenceStore) -> bool {
        let Some(key) = self.memorize_key.clone() else {
            return false;
        };
        match store.load(&key).await {
            Ok(Some(snapshot)) => {
                debug!("restoring preferences for grid {:?}", key);
                self.apply_snapshot(snapshot);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("failed to load preferences for grid {:?}: {}", key, e);
                false
            }
        }
    }

    /// Stores the current snapshot, if this grid memorizes.
    ///
    /// Failures are logged. Returns `true` if the snapshot was written.
    pub async fn save(&self, store: &PreferenceStore) -> bool {
        let Some(key) = self.memorize_key.as_deref() else {
            return false;
        };
        match store.save(key, &self.snapshot()).await {
            Ok(_) => true,
            Err(e) => {
                warn!("failed to save preferences for grid {:?}: {}", key, e);
                false
            }
        }
    }

    /// Deletes the stored snapshot and returns to the construction defaults.
    pub async fn reset_preferences(&mut self, store: &PreferenceStore) {
        if let Some(key) = self.memorize_key.as_deref() {
            if let Err(e) = store.reset(key).await {
                warn!("failed to reset preferences for grid {:?}: {}", key, e);
            }
        }
        let before = self.pagination.request();
        self.apply_defaults();
        self.notify_paging(before);
    }
}
