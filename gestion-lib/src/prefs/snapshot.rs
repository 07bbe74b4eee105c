//! Persisted grid state.

use serde::Deserialize;
use serde::Serialize;

use crate::grid::Density;
use crate::grid::GroupBy;
use crate::grid::SortConfig;

/// The subset of grid state restored across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    /// Visible column keys in display order.
    pub visible_columns: Vec<String>,
    pub sort: SortConfig,
    pub group_by: GroupBy,
    pub page_size: usize,
    pub density: Density,
}
