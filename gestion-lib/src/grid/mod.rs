//! Generic data grid.
//!
//! The grid runs a fixed pipeline over its rows every time a view is taken:
//!
//! 1. search and structured filters ([`filter`])
//! 2. stable sort ([`sort`])
//! 3. grouping and pagination ([`group`], [`page`]) in the order chosen by
//!    [`GroupPaging`]
//!
//! [`DataGrid`] owns the rows and the user's view state; [`GridView`] is the
//! borrowed result.

pub mod filter;
pub mod group;
pub mod page;
pub mod sort;

mod options;
mod state;
mod view;

pub use filter::Filter;
pub use filter::FilterOperator;
pub use group::ALL_GROUP;
pub use group::ExpandedGroups;
pub use group::Group;
pub use group::GroupBy;
pub use group::UNDEFINED_GROUP;
pub use options::Density;
pub use options::GridDefaults;
pub use options::GridOptions;
pub use options::GroupPaging;
pub use page::DEFAULT_PAGE_SIZE;
pub use page::DEFAULT_PAGE_SIZES;
pub use page::PageHandler;
pub use page::PageRequest;
pub use page::Pagination;
pub use page::PagingMode;
pub use sort::Direction;
pub use sort::SortConfig;
pub use state::DataGrid;
pub use view::GridView;
pub use view::GroupView;

pub use crate::export::ExportScope;
