//! REST data source.
//!
//! Operations are methods on [`GestionClient`](crate::GestionClient); this
//! module holds the resource names and response shapes.

mod resource;
mod rest;

pub use resource::Page;
pub use resource::Resource;
pub use rest::TOTAL_COUNT_HEADER;
pub use rest::parse_rows;

pub(crate) use resource::ListBody;
