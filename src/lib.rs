/// tablepipe - Table Data Engine
///
/// Turns a raw, possibly tree-shaped record set plus a column specification
/// into the rows a table renders, keeping multi-column sorting, multi-column
/// filtering, pagination and row selection consistent as users interact and
/// as data or columns change.
///
/// The pipeline is strictly `paginate(filter(sort(raw)))`; the column tree
/// flows the other way through sort, filter, selection and title decoration.

pub mod record;
pub mod error;
pub mod diagnostics;
pub mod column;
pub mod config;
pub mod header;
pub mod sorter;
pub mod filter;
pub mod pagination;
pub mod lookup;
pub mod selection;
pub mod changeset;
pub mod table;

pub use record::{ColumnValue, Key, Record};
pub use error::TableError;
pub use diagnostics::{Diagnostics, Warning};
pub use column::{Column, ColumnGroup, ColumnKey, FilterItem, FilterMode, FilterSearch, LeafColumn, Sorter, Title, TitleContext};
pub use config::{TableConfig, TableLocale};
pub use header::HeaderColumn;
pub use sorter::{SortOrder, SortRequest, SortState, SorterInfo, SorterResult};
pub use filter::{FilterAffordance, FilterOption, FilterState, PublicFilters};
pub use pagination::{PaginationConfig, PaginationState};
pub use lookup::{KeyedLookupIndex, RowKey};
pub use selection::{CheckboxProps, SelectAllScope, SelectionChange, SelectionConfig, SelectionMethod, SelectionType};
pub use changeset::{ChangeEvent, ChangeEventInfo, TableAction};
pub use table::{Table, TableBuilder};
