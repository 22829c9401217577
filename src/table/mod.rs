//! Tabular view engine: search, stable sort, clamped pagination,
//! selection, and CSV export over any serializable row type.

pub mod export;
pub mod selection;
pub mod view;

pub use export::{export_filename, write_csv, Column};
pub use selection::{Selection, SelectionMode};
pub use view::{PageView, SortDirection, SortSpec, TableView, VisibleRow};
