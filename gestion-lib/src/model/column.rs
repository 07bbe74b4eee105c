//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use super::Value;
use super::value::NULL;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Turns a raw value into text, for display or for export.
pub type Formatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Column configuration.
///
/// Columns describe how one row attribute is labelled, rendered, sorted,
/// filtered and exported. Columns are sortable and filterable unless told
/// otherwise.
///
/// # Examples
///
/// ```
/// use gestion_lib::model::{Alignment, Column};
///
/// let columns = vec![
///     Column::new("numero", "N°").width(8),
///     Column::new("client", "Client"),
///     Column::new("montant_ttc", "Montant TTC")
///         .align(Alignment::Right)
///         .export_with(|v| format!("{} EUR", v)),
///     Column::new("actions", "").not_sortable().not_filterable(),
/// ];
/// ```
#[derive(Clone)]
pub struct Column {
    /// Attribute name in the row.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Horizontal alignment.
    pub align: Alignment,
    /// Preferred width in characters, if fixed.
    pub width: Option<u16>,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Whether structured filters may target this column.
    pub filterable: bool,
    renderer: Option<Formatter>,
    export_formatter: Option<Formatter>,
}

impl Column {
    /// Creates a column for `key` with the given header label.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            align: Alignment::Left,
            width: None,
            sortable: true,
            filterable: true,
            renderer: None,
            export_formatter: None,
        }
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Set a fixed width.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Disable sorting on this column.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Disable structured filters on this column.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Custom display renderer.
    pub fn render_with(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.renderer = Some(Arc::new(f));
        self
    }

    /// Custom export formatter.
    pub fn export_with(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.export_formatter = Some(Arc::new(f));
        self
    }

    /// Display text for a cell. Missing values render empty.
    pub fn render(&self, value: Option<&Value>) -> String {
        let value = value.unwrap_or(&NULL);
        match &self.renderer {
            Some(f) => f(value),
            None => value.to_display_string(),
        }
    }

    /// Export text for a cell. Missing values export empty.
    pub fn export(&self, value: Option<&Value>) -> String {
        let value = value.unwrap_or(&NULL);
        match &self.export_formatter {
            Some(f) => f(value),
            None => value.to_display_string(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("align", &self.align)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("renderer", &self.renderer.is_some())
            .field("export_formatter", &self.export_formatter.is_some())
            .finish()
    }
}
