//! REST resources and paged responses.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::model::Row;

/// A REST collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Clients,
    Contacts,
    Offres,
    Affaires,
    Factures,
    Formations,
    Courriers,
    /// Any other collection path, relative to the base URL.
    Custom(String),
}

impl Resource {
    /// Collection path relative to the base URL.
    pub fn path(&self) -> &str {
        match self {
            Resource::Clients => "clients",
            Resource::Contacts => "contacts",
            Resource::Offres => "offres",
            Resource::Affaires => "affaires",
            Resource::Factures => "factures",
            Resource::Formations => "formations",
            Resource::Courriers => "courriers",
            Resource::Custom(path) => path.trim_matches('/'),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim_matches('/').to_ascii_lowercase().as_str() {
            "clients" => Resource::Clients,
            "contacts" => Resource::Contacts,
            "offres" => Resource::Offres,
            "affaires" => Resource::Affaires,
            "factures" => Resource::Factures,
            "formations" => Resource::Formations,
            "courriers" => Resource::Courriers,
            _ => Resource::Custom(s.trim_matches('/').to_string()),
        })
    }
}

/// One page of rows plus the server's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
    /// Total rows across every page.
    pub total: usize,
}

/// Paged body shape `{ "data": [...], "total": n }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Either a bare array or an [`Envelope`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody {
    Array(Vec<serde_json::Value>),
    Envelope(Envelope),
}

impl ListBody {
    pub(crate) fn into_parts(self) -> (Vec<serde_json::Value>, Option<usize>) {
        match self {
            ListBody::Array(items) => (items, None),
            ListBody::Envelope(env) => (env.data, env.total),
        }
    }
}
