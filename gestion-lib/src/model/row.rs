//! Dynamic row record

use std::borrow::Cow;
use std::collections::HashMap;

use super::Value;
use crate::error::FieldError;

/// Default name of the identifier attribute.
pub const DEFAULT_ID_KEY: &str = "id";

/// Anything the grid pipeline can display.
///
/// The pipeline only needs a stable identifier and attribute lookup by
/// column key, so typed structs can implement this directly instead of
/// going through [`Row`].
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
/// use gestion_lib::model::{GridRow, Value};
///
/// struct Invoice {
///     number: String,
///     amount: f64,
/// }
///
/// impl GridRow for Invoice {
///     fn id(&self) -> Cow<'_, str> {
///         Cow::Borrowed(&self.number)
///     }
///
///     fn value(&self, key: &str) -> Option<Cow<'_, Value>> {
///         match key {
///             "number" => Some(Cow::Owned(Value::from(self.number.as_str()))),
///             "amount" => Some(Cow::Owned(Value::from(self.amount))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait GridRow {
    /// Stable unique identifier.
    fn id(&self) -> Cow<'_, str>;

    /// Attribute value for a column key, `None` when absent.
    fn value(&self, key: &str) -> Option<Cow<'_, Value>>;
}

/// A row as delivered by the REST API.
///
/// Rows hold attribute values as a `HashMap<String, Value>`. The identifier
/// is stringified and also kept as a regular attribute so it can be shown
/// in a column.
///
/// # Example
///
/// ```
/// use gestion_lib::model::Row;
///
/// let row = Row::new(1)
///     .set("raison_sociale", "Contoso")
///     .set("ca", 1_000_000i64);
///
/// assert_eq!(row.id(), "1");
/// assert_eq!(row.get_string("raison_sociale").unwrap(), Some("Contoso"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub(crate) id: String,
    pub(crate) fields: HashMap<String, Value>,
}

impl Row {
    /// Creates a row with the given identifier stored under `"id"`.
    pub fn new(id: impl Into<Value>) -> Self {
        let id = id.into();
        let mut fields = HashMap::new();
        let id_string = id.to_string();
        fields.insert(DEFAULT_ID_KEY.to_string(), id);
        Self {
            id: id_string,
            fields,
        }
    }

    /// Builds a row from a JSON object using `id_key` as identifier.
    pub fn from_json_object(
        object: serde_json::Map<String, serde_json::Value>,
        id_key: &str,
    ) -> Result<Self, FieldError> {
        let fields: HashMap<String, Value> = object
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect();

        let id = match fields.get(id_key) {
            Some(Value::Null) | None => return Err(FieldError::missing(id_key)),
            Some(Value::Json(v)) => {
                return Err(FieldError::type_mismatch(id_key, "scalar", json_kind(v)));
            }
            Some(v) => v.to_string(),
        };

        Ok(Self { id, fields })
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    // =========================================================================
    // Typed getters
    //
    // Ok(None) means the field is absent or null.
    // =========================================================================

    /// Gets a string field.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(FieldError::type_mismatch(field, "string", other.type_name())),
        }
    }

    /// Gets an integer field.
    pub fn get_i64(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }

    /// Gets a numeric field (int or float).
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| FieldError::type_mismatch(field, "number", v.type_name())),
        }
    }

    /// Gets a boolean field.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Converts the row back to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl GridRow for Row {
    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn value(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.fields.get(key).map(Cow::Borrowed)
    }
}

impl<T: GridRow + ?Sized> GridRow for &T {
    fn id(&self) -> Cow<'_, str> {
        (**self).id()
    }

    fn value(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).value(key)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
        _ => "scalar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object_stringifies_id() {
        let json = serde_json::json!({"id": 42, "nom": "Durand"});
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };
        let row = Row::from_json_object(map, "id").unwrap();
        assert_eq!(row.id(), "42");
        assert_eq!(row.get("id"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_from_json_object_requires_id() {
        let json = serde_json::json!({"nom": "Durand"});
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };
        let err = Row::from_json_object(map, "id").unwrap_err();
        assert!(matches!(err, FieldError::Missing { .. }));
    }

    #[test]
    fn test_typed_getters() {
        let row = Row::new("c1").set("nom", "Durand").set("age", 31);
        assert_eq!(row.get_string("nom").unwrap(), Some("Durand"));
        assert_eq!(row.get_i64("age").unwrap(), Some(31));
        assert_eq!(row.get_f64("age").unwrap(), Some(31.0));
        assert_eq!(row.get_string("absent").unwrap(), None);
        assert!(row.get_bool("nom").is_err());
    }
}
