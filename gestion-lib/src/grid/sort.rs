//! Single-key, type-aware, stable sorting.

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::GridRow;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9, nulls first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, nulls last).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// Which column rows are ordered by, if any.
///
/// # Example
///
/// ```
/// use gestion_lib::grid::{Direction, SortConfig};
///
/// let mut sort = SortConfig::none();
/// sort.toggle("date_echeance");
/// assert_eq!(sort.direction, Direction::Asc);
/// sort.toggle("date_echeance");
/// assert_eq!(sort.direction, Direction::Desc);
/// sort.toggle("client");
/// assert_eq!(sort.key.as_deref(), Some("client"));
/// assert_eq!(sort.direction, Direction::Asc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    /// Column key, `None` keeps the incoming order.
    pub key: Option<String>,
    /// Direction applied when `key` is set.
    pub direction: Direction,
}

impl SortConfig {
    /// No ordering.
    pub fn none() -> Self {
        Self::default()
    }

    /// Ascending order on a column.
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: Direction::Asc,
        }
    }

    /// Descending order on a column.
    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: Direction::Desc,
        }
    }

    /// Header click: flips direction on the same column, otherwise starts
    /// ascending on the new one. Never returns to "no sort".
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flip();
        } else {
            self.key = Some(key.to_string());
            self.direction = Direction::Asc;
        }
    }

    /// Returns the direction if rows are sorted by `key`.
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        (self.key.as_deref() == Some(key)).then_some(self.direction)
    }
}

/// Comparable projection of a cell, computed once per row.
///
/// Variants are declared in class order: values of different classes
/// compare by class alone, so mixed columns still sort consistently.
#[derive(Debug)]
enum SortKey {
    Null,
    Number(f64),
    Date(i64),
    Text { folded: String, lower: String },
}

impl SortKey {
    fn new(value: Option<&Value>) -> Self {
        let Some(v) = value.filter(|v| !v.is_null()) else {
            return SortKey::Null;
        };
        if let Some(n) = v.as_f64() {
            return SortKey::Number(n);
        }
        if let Some(ts) = v.as_str().and_then(parse_timestamp) {
            return SortKey::Date(ts);
        }
        let lower = v.to_display_string().to_lowercase();
        SortKey::Text {
            folded: fold_accents(&lower),
            lower,
        }
    }

    fn class(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Number(_) => 1,
            SortKey::Date(_) => 2,
            SortKey::Text { .. } => 3,
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Null, SortKey::Null) => Ordering::Equal,
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(y),
        (
            SortKey::Text { folded: fa, lower: la },
            SortKey::Text { folded: fb, lower: lb },
        ) => fa.cmp(fb).then_with(|| la.cmp(lb)),
        _ => a.class().cmp(&b.class()),
    }
}

/// Strips diacritics so that `é` sorts with `e`, as French readers expect.
fn fold_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Parses the date formats the API emits, returning milliseconds since epoch.
///
/// Accepted: RFC 3339, `YYYY-MM-DD[THH:MM:SS[.fff]]` (also with a space
/// separator) and `DD/MM/YYYY`. Bare numbers are never dates.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Compares two cells the way the grid orders them in ascending order.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    compare_keys(&SortKey::new(a), &SortKey::new(b))
}

/// Sorts rows by the configured column.
///
/// Returns the input unchanged when no key is set. The sort is stable, so
/// rows with equal keys keep their relative order in both directions.
pub fn apply<'a, R: GridRow>(rows: Vec<&'a R>, config: &SortConfig) -> Vec<&'a R> {
    let Some(key) = config.key.as_deref() else {
        return rows;
    };

    let mut keyed: Vec<(SortKey, &'a R)> = rows
        .into_iter()
        .map(|row| (SortKey::new(row.value(key).as_deref()), row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_keys(a, b);
        match config.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_strings() {
        let rows = vec![Row::new(1).set("name", "Bravo"), Row::new(2).set("name", "alpha")];
        let sorted = apply(rows.iter().collect(), &SortConfig::asc("name"));
        assert_eq!(ids(&sorted), ["2", "1"]);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let rows = vec![
            Row::new(1).set("n", 10),
            Row::new(2).set("n", 9.5),
            Row::new(3).set("n", 100),
        ];
        let sorted = apply(rows.iter().collect(), &SortConfig::asc("n"));
        assert_eq!(ids(&sorted), ["2", "1", "3"]);
    }

    #[test]
    fn test_dates_compare_by_timestamp() {
        let rows = vec![
            Row::new(1).set("d", "15/03/2024"),
            Row::new(2).set("d", "2023-12-31"),
            Row::new(3).set("d", "2024-01-05T08:30:00Z"),
        ];
        let sorted = apply(rows.iter().collect(), &SortConfig::asc("d"));
        assert_eq!(ids(&sorted), ["2", "3", "1"]);
    }

    #[test]
    fn test_nulls_first_ascending_last_descending() {
        let rows = vec![
            Row::new(1).set("v", "b"),
            Row::new(2),
            Row::new(3).set("v", Value::Null),
            Row::new(4).set("v", "a"),
        ];
        let asc = apply(rows.iter().collect(), &SortConfig::asc("v"));
        assert_eq!(ids(&asc), ["2", "3", "4", "1"]);

        let desc = apply(rows.iter().collect(), &SortConfig::desc("v"));
        assert_eq!(ids(&desc), ["1", "4", "2", "3"]);
    }

    #[test]
    fn test_stable_for_ties_in_both_directions() {
        let rows = vec![
            Row::new(1).set("g", "x"),
            Row::new(2).set("g", "y"),
            Row::new(3).set("g", "X"),
            Row::new(4).set("g", "x"),
        ];
        let asc = apply(rows.iter().collect(), &SortConfig::asc("g"));
        assert_eq!(ids(&asc), ["1", "3", "4", "2"]);
        let desc = apply(rows.iter().collect(), &SortConfig::desc("g"));
        assert_eq!(ids(&desc), ["2", "1", "3", "4"]);
    }

    #[test]
    fn test_no_key_is_identity() {
        let rows = vec![Row::new(3), Row::new(1), Row::new(2)];
        let sorted = apply(rows.iter().collect(), &SortConfig::none());
        assert_eq!(ids(&sorted), ["3", "1", "2"]);
    }

    #[test]
    fn test_digit_strings_are_not_dates() {
        assert_eq!(parse_timestamp("2024"), None);
        assert!(parse_timestamp("2024-02-29").is_some());
        assert_eq!(parse_timestamp("31/02/2024"), None);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let rows = vec![
            Row::new(1).set("nom", "Zoé"),
            Row::new(2).set("nom", "Émilie"),
            Row::new(3).set("nom", "eric"),
            Row::new(4).set("nom", "Étienne"),
            Row::new(5).set("nom", "Denis"),
        ];
        let sorted = apply(rows.iter().collect(), &SortConfig::asc("nom"));
        assert_eq!(ids(&sorted), ["5", "2", "3", "4", "1"]);
    }

    #[test]
    fn test_mixed_classes_order_by_class() {
        let rows = vec![
            Row::new(1).set("v", "1x"),
            Row::new(2).set("v", 10),
            Row::new(3).set("v", "05/01/2024"),
            Row::new(4),
            Row::new(5).set("v", 2),
        ];
        let asc = apply(rows.iter().collect(), &SortConfig::asc("v"));
        assert_eq!(ids(&asc), ["4", "5", "2", "3", "1"]);
        let desc = apply(rows.iter().collect(), &SortConfig::desc("v"));
        assert_eq!(ids(&desc), ["1", "3", "2", "5", "4"]);
    }

    /// Deterministic mix of ints, floats, text, dates and nulls.
    fn mixed_column(len: usize) -> Vec<Row> {
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        (0..len)
            .map(|i| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                let n = (seed % 1000) as i64;
                let row = Row::new(i as i64);
                match seed % 6 {
                    0 => row.set("v", n),
                    1 => row.set("v", format!("{}x", n)),
                    2 => row.set("v", format!("{:02}/01/2024", n % 28 + 1)),
                    3 => row.set("v", n as f64 / 3.0),
                    4 => row.set("v", f64::NAN),
                    _ => row,
                }
            })
            .collect()
    }

    #[test]
    fn test_mixed_columns_sort_consistently() {
        for len in [57, 500, 3000] {
            let rows = mixed_column(len);
            for config in [SortConfig::asc("v"), SortConfig::desc("v")] {
                let sorted = apply(rows.iter().collect(), &config);
                assert_eq!(sorted.len(), len);
                let keys: Vec<SortKey> = sorted.iter().map(|r| SortKey::new(r.get("v"))).collect();
                for pair in keys.windows(2) {
                    let ord = compare_keys(&pair[0], &pair[1]);
                    match config.direction {
                        Direction::Asc => assert_ne!(ord, Ordering::Greater),
                        Direction::Desc => assert_ne!(ord, Ordering::Less),
                    }
                }
            }
        }
    }

    #[test]
    fn test_toggle_cycle() {
        let mut sort = SortConfig::none();
        sort.toggle("a");
        assert_eq!(sort, SortConfig::asc("a"));
        sort.toggle("a");
        assert_eq!(sort, SortConfig::desc("a"));
        sort.toggle("a");
        assert_eq!(sort, SortConfig::asc("a"));
        sort.toggle("b");
        assert_eq!(sort, SortConfig::asc("b"));
    }
}
