/// tablepipe Column Specification
///
/// A column tree describes the displayed fields. Each node is either a leaf,
/// which may carry a sorter and filter configuration and points at a field via
/// its data index, or a group, which only nests other columns.
///
/// # Column keys
///
/// Every column resolves to a stable `ColumnKey`:
/// 1. the explicit `key`, if set
/// 2. otherwise the data index (path segments joined with `.`)
/// 3. otherwise the positional path from the root, e.g. `"0-2-1"`
///
/// # Examples
///
/// ```
/// use tablepipe::{Column, LeafColumn, Sorter};
///
/// let columns = vec![
///     LeafColumn::new("Name").data_index("name").into(),
///     Column::group(
///         "Stats",
///         vec![LeafColumn::new("Age").data_index("age").sorter(Sorter::by_field("age")).into()],
///     ),
/// ];
///
/// let keys = tablepipe::column::column_keys(&columns);
/// assert_eq!(keys, vec!["name", "1", "age"]);
/// ```

use crate::filter::PublicFilters;
use crate::record::{ColumnValue, Key, Record};
use crate::sorter::SortOrder;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Resolved identity of a column.
pub type ColumnKey = String;

/// Compares two records for one column. Receives the active order so a
/// comparator can keep e.g. empty cells at the bottom in both directions.
pub type CompareFn = Rc<dyn Fn(&Record, &Record, SortOrder) -> Ordering>;

/// Decides whether a record passes one selected filter value.
pub type FilterFn = Rc<dyn Fn(&Key, &Record) -> bool>;

/// Decides whether a filter option stays visible for a search input.
pub type SearchFn = Rc<dyn Fn(&str, &FilterItem) -> bool>;

/// Renders a header title from the current sort/filter context.
pub type TitleFn = Rc<dyn Fn(&TitleContext) -> String>;

/// Sort/filter context handed to dynamic titles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleContext {
    /// First active sort column
    pub sort_column: Option<ColumnKey>,
    /// Order of the first active sort column
    pub sort_order: Option<SortOrder>,
    /// All active sort columns in priority order
    pub sort_columns: Vec<(ColumnKey, SortOrder)>,
    pub filters: PublicFilters,
}

/// Header title: fixed text or a render function.
#[derive(Clone)]
pub enum Title {
    Text(String),
    Render(TitleFn),
}

impl Title {
    pub fn render<F>(f: F) -> Self
    where
        F: Fn(&TitleContext) -> String + 'static,
    {
        Title::Render(Rc::new(f))
    }

    pub fn resolve(&self, ctx: &TitleContext) -> String {
        match self {
            Title::Text(text) => text.clone(),
            Title::Render(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Title::Text(text) => write!(f, "{:?}", text),
            Title::Render(_) => f.write_str("<render>"),
        }
    }
}

impl From<&str> for Title {
    fn from(s: &str) -> Self {
        Title::Text(s.to_string())
    }
}

impl From<String> for Title {
    fn from(s: String) -> Self {
        Title::Text(s)
    }
}

/// Sort configuration of a leaf column.
#[derive(Clone)]
pub struct Sorter {
    compare: Option<CompareFn>,
    multiple: Option<i32>,
}

impl Sorter {
    /// Sort locally with a plain comparator.
    pub fn compare<F>(f: F) -> Self
    where
        F: Fn(&Record, &Record) -> Ordering + 'static,
    {
        Sorter {
            compare: Some(Rc::new(move |a, b, _| f(a, b))),
            multiple: None,
        }
    }

    /// Sort locally with a comparator that sees the active direction.
    pub fn compare_with_order<F>(f: F) -> Self
    where
        F: Fn(&Record, &Record, SortOrder) -> Ordering + 'static,
    {
        Sorter {
            compare: Some(Rc::new(f)),
            multiple: None,
        }
    }

    /// Compare on one field with `ColumnValue::compare`; missing fields count as null.
    pub fn by_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Sorter::compare(move |a, b| {
            let left = a.get(&field).unwrap_or(&ColumnValue::Null);
            let right = b.get(&field).unwrap_or(&ColumnValue::Null);
            left.compare(right)
        })
    }

    /// Sort state is tracked and reported, but ordering happens elsewhere.
    pub fn remote() -> Self {
        Sorter {
            compare: None,
            multiple: None,
        }
    }

    /// Opt into prioritised multi-column sorting. Higher priority sorts first.
    pub fn multiple(mut self, priority: i32) -> Self {
        self.multiple = Some(priority);
        self
    }

    pub fn compare_fn(&self) -> Option<&CompareFn> {
        self.compare.as_ref()
    }

    pub fn multiple_priority(&self) -> Option<i32> {
        self.multiple
    }
}

impl fmt::Debug for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorter")
            .field("local", &self.compare.is_some())
            .field("multiple", &self.multiple)
            .finish()
    }
}

/// One option in a column's filter menu. Options may nest.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterItem {
    pub text: String,
    pub value: Key,
    pub children: Vec<FilterItem>,
}

impl FilterItem {
    pub fn new(text: impl Into<String>, value: impl Into<Key>) -> Self {
        FilterItem {
            text: text.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FilterItem>) -> Self {
        self.children = children;
        self
    }
}

/// How the filter dropdown lays out its options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Menu,
    Tree,
}

/// Search box behaviour inside the filter dropdown.
#[derive(Clone, Default)]
pub enum FilterSearch {
    #[default]
    Off,
    /// Case-insensitive substring match on the option text
    Substring,
    Custom(SearchFn),
}

impl FilterSearch {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &FilterItem) -> bool + 'static,
    {
        FilterSearch::Custom(Rc::new(f))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, FilterSearch::Off)
    }

    pub(crate) fn matches(&self, input: &str, item: &FilterItem) -> bool {
        match self {
            FilterSearch::Off => true,
            FilterSearch::Substring => item.text.to_lowercase().contains(&input.to_lowercase()),
            FilterSearch::Custom(f) => f(input, item),
        }
    }
}

impl fmt::Debug for FilterSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSearch::Off => f.write_str("Off"),
            FilterSearch::Substring => f.write_str("Substring"),
            FilterSearch::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// A displayed field.
#[derive(Clone)]
pub struct LeafColumn {
    pub(crate) key: Option<String>,
    pub(crate) data_index: Option<Vec<String>>,
    pub(crate) title: Title,
    pub(crate) sorter: Option<Sorter>,
    /// `Some(_)` marks the sort order as controlled by the caller
    pub(crate) sort_order: Option<Option<SortOrder>>,
    pub(crate) default_sort_order: Option<SortOrder>,
    pub(crate) sort_directions: Option<Vec<SortOrder>>,
    pub(crate) show_sorter_tooltip: Option<bool>,
    pub(crate) filters: Option<Vec<FilterItem>>,
    pub(crate) on_filter: Option<FilterFn>,
    /// `Some(_)` marks the filter selection as controlled by the caller
    pub(crate) filtered_value: Option<Option<Vec<Key>>>,
    pub(crate) default_filtered_value: Option<Vec<Key>>,
    pub(crate) filtered: Option<bool>,
    pub(crate) filter_multiple: bool,
    pub(crate) filter_mode: FilterMode,
    pub(crate) filter_search: FilterSearch,
    pub(crate) filter_on_close: bool,
    pub(crate) filter_reset_to_default: bool,
    pub(crate) filter_dropdown_open: Option<bool>,
}

impl LeafColumn {
    pub fn new(title: impl Into<Title>) -> Self {
        LeafColumn {
            key: None,
            data_index: None,
            title: title.into(),
            sorter: None,
            sort_order: None,
            default_sort_order: None,
            sort_directions: None,
            show_sorter_tooltip: None,
            filters: None,
            on_filter: None,
            filtered_value: None,
            default_filtered_value: None,
            filtered: None,
            filter_multiple: true,
            filter_mode: FilterMode::Menu,
            filter_search: FilterSearch::Off,
            filter_on_close: false,
            filter_reset_to_default: false,
            filter_dropdown_open: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn data_index(mut self, field: impl Into<String>) -> Self {
        self.data_index = Some(vec![field.into()]);
        self
    }

    pub fn data_index_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_index = Some(path.into_iter().map(Into::into).collect());
        self
    }

    pub fn title(mut self, title: impl Into<Title>) -> Self {
        self.title = title.into();
        self
    }

    pub fn sorter(mut self, sorter: Sorter) -> Self {
        self.sorter = Some(sorter);
        self
    }

    /// Controlled sort order. `None` means controlled and unsorted.
    pub fn sort_order(mut self, order: Option<SortOrder>) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn default_sort_order(mut self, order: SortOrder) -> Self {
        self.default_sort_order = Some(order);
        self
    }

    pub fn sort_directions(mut self, directions: Vec<SortOrder>) -> Self {
        self.sort_directions = Some(directions);
        self
    }

    pub fn show_sorter_tooltip(mut self, show: bool) -> Self {
        self.show_sorter_tooltip = Some(show);
        self
    }

    pub fn filters(mut self, filters: Vec<FilterItem>) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn on_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Key, &Record) -> bool + 'static,
    {
        self.on_filter = Some(Rc::new(f));
        self
    }

    /// Controlled filter selection. `None` means controlled and unfiltered.
    pub fn filtered_value(mut self, keys: Option<Vec<Key>>) -> Self {
        self.filtered_value = Some(keys);
        self
    }

    pub fn default_filtered_value(mut self, keys: Vec<Key>) -> Self {
        self.default_filtered_value = Some(keys);
        self
    }

    /// Force the "filtered" header hook regardless of the selection.
    pub fn filtered(mut self, filtered: bool) -> Self {
        self.filtered = Some(filtered);
        self
    }

    pub fn filter_multiple(mut self, multiple: bool) -> Self {
        self.filter_multiple = multiple;
        self
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn filter_search(mut self, search: FilterSearch) -> Self {
        self.filter_search = search;
        self
    }

    pub fn filter_on_close(mut self, on_close: bool) -> Self {
        self.filter_on_close = on_close;
        self
    }

    pub fn filter_reset_to_default(mut self, reset_to_default: bool) -> Self {
        self.filter_reset_to_default = reset_to_default;
        self
    }

    /// Controlled dropdown visibility.
    pub fn filter_dropdown_open(mut self, open: bool) -> Self {
        self.filter_dropdown_open = Some(open);
        self
    }

    pub fn get_sorter(&self) -> Option<&Sorter> {
        self.sorter.as_ref()
    }

    pub fn get_filters(&self) -> Option<&[FilterItem]> {
        self.filters.as_deref()
    }

    pub fn get_data_index(&self) -> Option<&[String]> {
        self.data_index.as_deref()
    }

    pub fn get_title(&self) -> &Title {
        &self.title
    }

    /// True when the column takes part in filtering: it declares filter
    /// items, a predicate, or a controlled `filtered_value`.
    pub fn is_filterable(&self) -> bool {
        self.filters.is_some() || self.on_filter.is_some() || self.filtered_value.is_some()
    }

    /// Reads this column's cell from a record.
    pub fn value<'r>(&self, record: &'r Record) -> Option<&'r ColumnValue> {
        self.data_index.as_ref().and_then(|path| record.get_path(path))
    }
}

impl fmt::Debug for LeafColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafColumn")
            .field("key", &self.key)
            .field("data_index", &self.data_index)
            .field("title", &self.title)
            .field("sorter", &self.sorter)
            .field("sort_order", &self.sort_order)
            .field("filters", &self.filters)
            .field("filtered_value", &self.filtered_value)
            .finish()
    }
}

/// A header spanning nested columns.
#[derive(Debug, Clone)]
pub struct ColumnGroup {
    pub(crate) key: Option<String>,
    pub(crate) title: Title,
    pub(crate) children: Vec<Column>,
    pub(crate) sort_order: Option<Option<SortOrder>>,
}

impl ColumnGroup {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Controlled sort order carried by a group header.
    pub fn sort_order(mut self, order: Option<SortOrder>) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn children(&self) -> &[Column] {
        &self.children
    }
}

/// Column tree node.
#[derive(Debug, Clone)]
pub enum Column {
    Leaf(LeafColumn),
    Group(ColumnGroup),
}

impl Column {
    pub fn group(title: impl Into<Title>, children: Vec<Column>) -> Self {
        Column::Group(ColumnGroup {
            key: None,
            title: title.into(),
            children,
            sort_order: None,
        })
    }

    pub fn as_leaf(&self) -> Option<&LeafColumn> {
        match self {
            Column::Leaf(leaf) => Some(leaf),
            Column::Group(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Column]> {
        match self {
            Column::Leaf(_) => None,
            Column::Group(group) => Some(&group.children),
        }
    }

    pub fn title(&self) -> &Title {
        match self {
            Column::Leaf(leaf) => &leaf.title,
            Column::Group(group) => &group.title,
        }
    }

    /// Controlled sort order, if the column declares one.
    pub(crate) fn controlled_sort_order(&self) -> Option<Option<SortOrder>> {
        match self {
            Column::Leaf(leaf) => leaf.sort_order,
            Column::Group(group) => group.sort_order,
        }
    }

    pub(crate) fn sorter(&self) -> Option<&Sorter> {
        self.as_leaf().and_then(|leaf| leaf.sorter.as_ref())
    }

    /// Resolves this column's key given its positional path.
    pub fn resolve_key(&self, pos: &str) -> ColumnKey {
        let (key, data_index) = match self {
            Column::Leaf(leaf) => (leaf.key.as_ref(), leaf.data_index.as_ref()),
            Column::Group(group) => (group.key.as_ref(), None),
        };
        if let Some(key) = key {
            return key.clone();
        }
        match data_index {
            Some(path) if !path.is_empty() => path.join("."),
            _ => pos.to_string(),
        }
    }
}

impl From<LeafColumn> for Column {
    fn from(leaf: LeafColumn) -> Self {
        Column::Leaf(leaf)
    }
}

/// Positional path of the column at `index` under `parent`.
pub fn column_pos(index: usize, parent: Option<&str>) -> String {
    match parent {
        Some(pos) => format!("{}-{}", pos, index),
        None => index.to_string(),
    }
}

/// Depth-first walk over the column tree, parents before children.
///
/// The visitor receives each node with its resolved key and positional path.
pub fn walk_columns<'a, F>(columns: &'a [Column], mut visit: F)
where
    F: FnMut(&'a Column, ColumnKey, &str),
{
    walk_inner(columns, None, &mut visit);
}

fn walk_inner<'a, F>(columns: &'a [Column], parent: Option<&str>, visit: &mut F)
where
    F: FnMut(&'a Column, ColumnKey, &str),
{
    for (index, column) in columns.iter().enumerate() {
        let pos = column_pos(index, parent);
        let key = column.resolve_key(&pos);
        visit(column, key, &pos);
        if let Column::Group(group) = column {
            walk_inner(&group.children, Some(&pos), visit);
        }
    }
}

/// Keys of every node in the tree, in walk order.
pub fn column_keys(columns: &[Column]) -> Vec<ColumnKey> {
    let mut keys = Vec::new();
    walk_columns(columns, |_, key, _| keys.push(key));
    keys
}

/// Finds a node by its resolved key.
pub fn find_column<'a>(columns: &'a [Column], key: &str) -> Option<&'a Column> {
    let mut found = None;
    walk_columns(columns, |column, column_key, _| {
        if found.is_none() && column_key == key {
            found = Some(column);
        }
    });
    found
}
