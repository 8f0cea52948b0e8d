//! Requests page: table rows, filter/sort engine and page activation

pub mod activation;
pub mod row;
pub mod table;

pub use activation::ActivationObserver;
pub use row::{normalize_date, read_rows, RequestRow};
pub use table::{
    compare_rows, filter_and_sort, locale_compare, FilterField, FilterState, SortColumn, SortDirection, SortState,
    TableEngine, TableView,
};
