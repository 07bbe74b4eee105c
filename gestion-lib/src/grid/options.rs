//! Grid construction options.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::DEFAULT_PAGE_SIZE;
use super::DEFAULT_PAGE_SIZES;
use super::GroupBy;
use super::PagingMode;
use super::SortConfig;

/// Row spacing preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Density {
    Compact,
    #[default]
    Normal,
    Comfortable,
}

impl Density {
    /// Blank lines drawn between rows.
    pub fn row_spacing(&self) -> usize {
        match self {
            Density::Compact => 0,
            Density::Normal => 0,
            Density::Comfortable => 1,
        }
    }

    /// Horizontal padding on each side of a cell.
    pub fn cell_padding(&self) -> usize {
        match self {
            Density::Compact => 0,
            Density::Normal => 1,
            Density::Comfortable => 2,
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Density::Compact => "compact",
            Density::Normal => "normal",
            Density::Comfortable => "comfortable",
        };
        f.write_str(s)
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Density::Compact),
            "normal" | "standard" => Ok(Density::Normal),
            "comfortable" => Ok(Density::Comfortable),
            other => Err(format!("unknown density '{}'", other)),
        }
    }
}

/// Order of grouping and paging when both are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupPaging {
    /// Slice the sorted rows, then group the slice.
    #[default]
    PageThenGroup,
    /// Order rows by group, slice that list, then re-bucket the slice.
    GroupThenPage,
    /// Show every row while a group key is active.
    Unpaged,
}

/// User-adjustable state a grid starts from and returns to on reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDefaults {
    /// Visible column keys in display order. `None` shows every column.
    pub visible_columns: Option<Vec<String>>,
    pub sort: SortConfig,
    pub group_by: GroupBy,
    pub page_size: usize,
    pub density: Density,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            visible_columns: None,
            sort: SortConfig::none(),
            group_by: GroupBy::None,
            page_size: DEFAULT_PAGE_SIZE,
            density: Density::Normal,
        }
    }
}

/// Options for [`DataGrid::new`](super::DataGrid::new).
///
/// # Example
///
/// ```
/// use gestion_lib::grid::{GridOptions, GroupPaging, SortConfig};
///
/// let options = GridOptions::default()
///     .memorize("factures")
///     .sort(SortConfig::desc("date_emission"))
///     .page_size(25)
///     .group_paging(GroupPaging::Unpaged);
/// ```
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub defaults: GridDefaults,
    pub paging: PagingMode,
    pub group_paging: GroupPaging,
    /// Choices offered for the page size.
    pub page_sizes: Vec<usize>,
    /// Preference key; `None` keeps preferences in memory only.
    pub memorize_key: Option<String>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            defaults: GridDefaults::default(),
            paging: PagingMode::Client,
            group_paging: GroupPaging::default(),
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            memorize_key: None,
        }
    }
}

impl GridOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists preferences under `key`.
    pub fn memorize(mut self, key: impl Into<String>) -> Self {
        self.memorize_key = Some(key.into());
        self
    }

    /// Initially visible columns, in display order.
    pub fn visible_columns<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.defaults.visible_columns = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Initial sort.
    pub fn sort(mut self, sort: SortConfig) -> Self {
        self.defaults.sort = sort;
        self
    }

    /// Initial grouping.
    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.defaults.group_by = group_by;
        self
    }

    /// Initial page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.defaults.page_size = page_size.max(1);
        self
    }

    /// Initial density.
    pub fn density(mut self, density: Density) -> Self {
        self.defaults.density = density;
        self
    }

    /// Paging mode.
    pub fn paging(mut self, paging: PagingMode) -> Self {
        self.paging = paging;
        self
    }

    /// Grouping/paging order.
    pub fn group_paging(mut self, group_paging: GroupPaging) -> Self {
        self.group_paging = group_paging;
        self
    }

    /// Page-size choices.
    pub fn page_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.page_sizes = sizes.into();
        self
    }
}
