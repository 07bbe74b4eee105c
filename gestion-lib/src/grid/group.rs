//! Grouping rows into labelled buckets.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::GridRow;
use crate::model::Value;

/// Label of the single group produced when grouping is off.
pub const ALL_GROUP: &str = "all";

/// Label for rows whose group column is null or missing.
pub const UNDEFINED_GROUP: &str = "(Non défini)";

/// Which column rows are grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupBy {
    /// No grouping: everything lands in the `"all"` group.
    #[default]
    None,
    /// Group by the stringified value of a column.
    Column(String),
}

impl GroupBy {
    /// Groups by a column.
    pub fn column(key: impl Into<String>) -> Self {
        GroupBy::Column(key.into())
    }

    /// Parses the UI representation, where `"none"` disables grouping.
    pub fn parse(s: &str) -> Self {
        match s {
            "" | "none" => GroupBy::None,
            key => GroupBy::Column(key.to_string()),
        }
    }

    /// Returns the column key, if grouping is active.
    pub fn key(&self) -> Option<&str> {
        match self {
            GroupBy::None => None,
            GroupBy::Column(key) => Some(key),
        }
    }

    /// Returns `true` if grouping is active.
    pub fn is_active(&self) -> bool {
        matches!(self, GroupBy::Column(_))
    }
}

/// A labelled bucket of rows sharing one column value.
#[derive(Debug)]
pub struct Group<'a, R> {
    /// Stringified column value (or a sentinel label).
    pub label: String,
    /// Rows in their incoming order.
    pub rows: Vec<&'a R>,
}

impl<'a, R> Group<'a, R> {
    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the group has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group label for one row.
pub fn group_label<R: GridRow + ?Sized>(row: &R, key: &str) -> String {
    match row.value(key).as_deref() {
        None | Some(Value::Null) => UNDEFINED_GROUP.to_string(),
        Some(v) => v.to_display_string(),
    }
}

/// Partitions rows by the group column.
///
/// Every input row lands in exactly one group. Groups are ordered by label;
/// rows keep their incoming order inside a group. With [`GroupBy::None`] a
/// single `"all"` group holds every row.
pub fn group_rows<'a, R: GridRow>(rows: &[&'a R], group_by: &GroupBy) -> Vec<Group<'a, R>> {
    let Some(key) = group_by.key() else {
        return vec![Group {
            label: ALL_GROUP.to_string(),
            rows: rows.to_vec(),
        }];
    };

    let mut buckets: BTreeMap<String, Vec<&'a R>> = BTreeMap::new();
    for row in rows {
        buckets.entry(group_label(*row, key)).or_default().push(*row);
    }

    buckets
        .into_iter()
        .map(|(label, rows)| Group { label, rows })
        .collect()
}

/// Expanded/collapsed state of column groups, by label.
///
/// Groups start collapsed. The single group produced without grouping is
/// not tracked here; the grid always shows it expanded.
#[derive(Debug, Clone, Default)]
pub struct ExpandedGroups {
    expanded: HashSet<String>,
}

impl ExpandedGroups {
    /// Creates a state with every group collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group is shown expanded.
    pub fn is_expanded(&self, label: &str) -> bool {
        self.expanded.contains(label)
    }

    /// Flips one group. Returns the new state.
    pub fn toggle(&mut self, label: &str) -> bool {
        if self.expanded.remove(label) {
            false
        } else {
            self.expanded.insert(label.to_string());
            true
        }
    }

    /// Expands one group.
    pub fn expand(&mut self, label: &str) {
        self.expanded.insert(label.to_string());
    }

    /// Collapses one group.
    pub fn collapse(&mut self, label: &str) {
        self.expanded.remove(label);
    }

    /// Expands every listed group.
    pub fn expand_all<'l>(&mut self, labels: impl IntoIterator<Item = &'l str>) {
        self.expanded.extend(labels.into_iter().map(str::to_string));
    }

    /// Collapses everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Number of explicitly expanded groups.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Returns `true` if no group is explicitly expanded.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    #[test]
    fn test_none_yields_single_expanded_group() {
        let rows: Vec<Row> = (1..=5).map(Row::new).collect();
        let refs: Vec<&Row> = rows.iter().collect();
        let groups = group_rows(&refs, &GroupBy::None);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, ALL_GROUP);
        assert_eq!(groups[0].len(), 5);
    }

    #[test]
    fn test_groups_sorted_and_undefined_bucketed() {
        let rows = vec![
            Row::new(1).set("ville", "Paris"),
            Row::new(2).set("ville", "Lyon"),
            Row::new(3),
            Row::new(4).set("ville", "Paris"),
            Row::new(5).set("ville", Value::Null),
        ];
        let refs: Vec<&Row> = rows.iter().collect();
        let groups = group_rows(&refs, &GroupBy::column("ville"));

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, [UNDEFINED_GROUP, "Lyon", "Paris"]);

        let paris: Vec<_> = groups[2].rows.iter().map(|r| r.id()).collect();
        assert_eq!(paris, ["1", "4"]);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_numbers_group_by_display_text() {
        let rows = vec![Row::new(1).set("n", 2), Row::new(2).set("n", 2.0)];
        let refs: Vec<&Row> = rows.iter().collect();
        let groups = group_rows(&refs, &GroupBy::column("n"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "2");
    }

    #[test]
    fn test_expanded_state() {
        let mut state = ExpandedGroups::new();
        assert!(!state.is_expanded("Lyon"));
        assert!(state.toggle("Lyon"));
        assert!(state.is_expanded("Lyon"));
        assert!(!state.toggle("Lyon"));

        state.expand_all(["Lyon", "Paris"]);
        assert_eq!(state.len(), 2);
        state.collapse_all();
        assert!(state.is_empty());
    }

    #[test]
    fn test_value_named_all_is_an_ordinary_group() {
        let mut state = ExpandedGroups::new();
        assert!(!state.is_expanded(ALL_GROUP));
        assert!(state.toggle(ALL_GROUP));
        assert!(!state.toggle(ALL_GROUP));
        assert!(!state.is_expanded(ALL_GROUP));
    }

    #[test]
    fn test_parse_none_sentinel() {
        assert_eq!(GroupBy::parse("none"), GroupBy::None);
        assert_eq!(GroupBy::parse("ville"), GroupBy::column("ville"));
    }
}
