//! Back-office data grid library
//!
//! A generic in-memory data grid (search, filters, sort, grouping,
//! pagination, export) with persisted per-grid preferences, plus the REST
//! and WebSocket collaborators that feed it.
//!
//! # Example
//!
//! ```
//! use gestion_lib::grid::{DataGrid, GridOptions, GroupBy};
//! use gestion_lib::model::{Column, Row};
//!
//! let mut grid = DataGrid::new(
//!     vec![Column::new("numero", "N°"), Column::new("statut", "Statut")],
//!     GridOptions::default(),
//! );
//! grid.set_rows(vec![
//!     Row::new(1).set("numero", "F-001").set("statut", "payée"),
//!     Row::new(2).set("numero", "F-002").set("statut", "en retard"),
//! ]);
//! grid.set_group_by(GroupBy::column("statut"));
//!
//! let labels: Vec<_> = grid.view().groups.iter().map(|g| g.label.clone()).collect();
//! assert_eq!(labels, ["en retard", "payée"]);
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod model;
pub mod notify;
pub mod prefs;

mod client;

pub use client::*;
pub use error::Error;
