//! Free-text search and structured filters.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::model::GridRow;
use crate::model::Value;
use crate::model::NULL;

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Strict equality.
    Equals,
    /// Case-insensitive substring, string values only.
    Contains,
    /// Case-insensitive prefix, string values only.
    StartsWith,
    /// Case-insensitive suffix, string values only.
    EndsWith,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Numeric range, both bounds inclusive.
    Between,
    /// Membership in a value list.
    In,
}

impl FilterOperator {
    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.to_ascii_lowercase().as_str() {
            "equals" | "eq" => FilterOperator::Equals,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "greaterthan" | "gt" => FilterOperator::GreaterThan,
            "lessthan" | "lt" => FilterOperator::LessThan,
            "between" => FilterOperator::Between,
            "in" => FilterOperator::In,
            other => return Err(format!("unknown filter operator '{}'", other)),
        };
        Ok(op)
    }
}

/// A structured filter on one column.
///
/// A row passes a filter set only when it passes every filter; there is no
/// OR across filters.
///
/// # Example
///
/// ```
/// use gestion_lib::grid::Filter;
///
/// let filters = vec![
///     Filter::contains("ville", "lyon"),
///     Filter::between("montant_ht", 1000, 5000),
///     Filter::one_of("statut", ["envoyee", "relancee"]),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Column key.
    pub key: String,
    /// Comparison to apply.
    pub operator: FilterOperator,
    /// Operand (lower bound for `between`).
    #[serde(default)]
    pub value: Value,
    /// Upper bound for `between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_value: Option<Value>,
    /// Candidate list for `in`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl Filter {
    /// Creates a filter with a single operand.
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: value.into(),
            second_value: None,
            values: None,
        }
    }

    /// Creates an equality filter.
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::Equals, value)
    }

    /// Creates a contains filter.
    pub fn contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::Contains, value)
    }

    /// Creates a starts-with filter.
    pub fn starts_with(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::StartsWith, value)
    }

    /// Creates an ends-with filter.
    pub fn ends_with(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::EndsWith, value)
    }

    /// Creates a greater-than filter.
    pub fn greater_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::GreaterThan, value)
    }

    /// Creates a less-than filter.
    pub fn less_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, FilterOperator::LessThan, value)
    }

    /// Creates an inclusive range filter.
    pub fn between(key: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self {
            second_value: Some(high.into()),
            ..Self::new(key, FilterOperator::Between, low)
        }
    }

    /// Creates a membership filter.
    pub fn one_of<V: Into<Value>>(key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::new(key, FilterOperator::In, Value::Null)
        }
    }

    /// Returns `true` if the row passes this filter.
    pub fn matches<R: GridRow + ?Sized>(&self, row: &R) -> bool {
        let cell = row.value(&self.key);
        let cell = cell.as_deref().unwrap_or(&NULL);

        match self.operator {
            FilterOperator::Equals => cell.strict_eq(&self.value),
            FilterOperator::Contains => {
                string_match(cell, &self.value, |hay, needle| hay.contains(needle))
            }
            FilterOperator::StartsWith => {
                string_match(cell, &self.value, |hay, needle| hay.starts_with(needle))
            }
            FilterOperator::EndsWith => {
                string_match(cell, &self.value, |hay, needle| hay.ends_with(needle))
            }
            FilterOperator::GreaterThan => {
                numeric_pair(cell, &self.value).is_some_and(|(a, b)| a > b)
            }
            FilterOperator::LessThan => {
                numeric_pair(cell, &self.value).is_some_and(|(a, b)| a < b)
            }
            FilterOperator::Between => {
                let Some(high) = self.second_value.as_ref().and_then(Value::to_number) else {
                    return false;
                };
                numeric_pair(cell, &self.value).is_some_and(|(n, low)| n >= low && n <= high)
            }
            FilterOperator::In => self
                .values
                .as_ref()
                .is_some_and(|values| values.iter().any(|v| cell.strict_eq(v))),
        }
    }
}

/// String operators only apply to string-typed cells.
fn string_match(cell: &Value, operand: &Value, f: impl Fn(&str, &str) -> bool) -> bool {
    match cell {
        Value::String(s) => f(&s.to_lowercase(), &operand.to_string().to_lowercase()),
        _ => false,
    }
}

fn numeric_pair(cell: &Value, operand: &Value) -> Option<(f64, f64)> {
    Some((cell.to_number()?, operand.to_number()?))
}

/// Returns `true` if any of `columns` contains `term` (already lowercased).
fn matches_search<R: GridRow + ?Sized>(row: &R, term: &str, columns: &[String]) -> bool {
    columns.iter().any(|key| {
        row.value(key)
            .is_some_and(|v| v.to_display_string().to_lowercase().contains(term))
    })
}

/// Applies free-text search and structured filters.
///
/// The search term matches case-insensitively against the stringified
/// value of every column in `visible_columns`; a blank term matches all
/// rows. Every filter must pass. Input order is preserved.
pub fn apply<'a, R: GridRow>(
    rows: &'a [R],
    search_term: &str,
    visible_columns: &[String],
    filters: &[Filter],
) -> Vec<&'a R> {
    let blank = search_term.trim().is_empty();
    let term = search_term.to_lowercase();

    rows.iter()
        .filter(|row| blank || matches_search(*row, &term, visible_columns))
        .filter(|row| filters.iter().all(|f| f.matches(*row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn ages() -> Vec<Row> {
        [19, 20, 25, 30, 31]
            .into_iter()
            .map(|age| Row::new(age).set("age", age))
            .collect()
    }

    #[test]
    fn test_between_is_inclusive() {
        let rows = ages();
        let filter = Filter::between("age", 20, 30);
        let ids: Vec<_> = apply(&rows, "", &[], &[filter])
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, ["20", "25", "30"]);
    }

    #[test]
    fn test_between_without_upper_bound_matches_nothing() {
        let rows = ages();
        let filter = Filter::new("age", FilterOperator::Between, 20);
        assert!(apply(&rows, "", &[], &[filter]).is_empty());
    }

    #[test]
    fn test_string_operators_skip_non_strings() {
        let row = Row::new(1).set("code", 1234).set("nom", "Dupont");
        assert!(!Filter::contains("code", "23").matches(&row));
        assert!(Filter::contains("nom", "PON").matches(&row));
        assert!(Filter::starts_with("nom", "du").matches(&row));
        assert!(Filter::ends_with("nom", "NT").matches(&row));
        assert!(!Filter::ends_with("nom", "du").matches(&row));
    }

    #[test]
    fn test_numeric_coercion_on_strings() {
        let row = Row::new(1).set("montant", "1500.50");
        assert!(Filter::greater_than("montant", 1000).matches(&row));
        assert!(Filter::less_than("montant", "2000").matches(&row));
        assert!(!Filter::greater_than("montant", "abc").matches(&row));
    }

    #[test]
    fn test_missing_values_never_match_numeric_filters() {
        let row = Row::new(1);
        assert!(!Filter::greater_than("age", -1).matches(&row));
        assert!(!Filter::less_than("age", 100).matches(&row));
    }

    #[test]
    fn test_in_uses_strict_equality() {
        let row = Row::new(1).set("statut", "payee").set("niveau", 2);
        assert!(Filter::one_of("statut", ["payee", "annulee"]).matches(&row));
        assert!(!Filter::one_of("niveau", ["2"]).matches(&row));
        assert!(Filter::one_of("niveau", [2.0]).matches(&row));
    }

    #[test]
    fn test_search_only_looks_at_visible_columns() {
        let rows = vec![
            Row::new(1).set("nom", "Martin").set("note", "client lyonnais"),
            Row::new(2).set("nom", "Lyon Transports").set("note", ""),
        ];
        let visible = vec!["nom".to_string()];
        let found = apply(&rows, "LYON", &visible, &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "2");
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let rows = vec![
            Row::new(1).set("nom", "Jeanne Roux"),
            Row::new(2).set("nom", "Jean Dupont"),
        ];
        let visible = vec!["nom".to_string()];
        let found = apply(&rows, "Jean ", &visible, &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "2");

        assert_eq!(apply(&rows, "   ", &visible, &[]).len(), 2);
    }

    #[test]
    fn test_search_and_filters_compose() {
        let rows = vec![
            Row::new(1).set("nom", "Alpha").set("ca", 10),
            Row::new(2).set("nom", "Alpine").set("ca", 50),
            Row::new(3).set("nom", "Beta").set("ca", 90),
        ];
        let visible = vec!["nom".to_string()];
        let found = apply(&rows, "alp", &visible, &[Filter::greater_than("ca", 20)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "2");
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("startsWith".parse::<FilterOperator>(), Ok(FilterOperator::StartsWith));
        assert_eq!("GT".parse::<FilterOperator>(), Ok(FilterOperator::GreaterThan));
        assert!("near".parse::<FilterOperator>().is_err());
    }
}
