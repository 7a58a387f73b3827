/// tablepipe Table
///
/// The façade a renderer talks to. A `Table` owns the column tree, the raw
/// records and the engines, and turns user intents into a single change
/// event each. The rows it renders are always `paginate(filter(sort(raw)))`.
///
/// # Examples
///
/// ```
/// use tablepipe::{Column, LeafColumn, PaginationConfig, Record, Sorter, Table};
///
/// let columns: Vec<Column> = vec![
///     LeafColumn::new("Name").data_index("name").into(),
///     LeafColumn::new("Age").data_index("age").sorter(Sorter::by_field("age")).into(),
/// ];
/// let data: Vec<Record> = (1..=12)
///     .map(|i| Record::new().with("key", i).with("name", format!("user {}", i)).with("age", 60 - i * 3))
///     .collect();
///
/// let mut table = Table::builder(columns)
///     .data(data)
///     .pagination(PaginationConfig::default().default_page_size(5))
///     .build();
///
/// let event = table.request_sort("age").unwrap();
/// assert_eq!(event.pagination.map(|p| p.current), Some(1));
///
/// table.request_page(2, None).unwrap();
/// let ages: Vec<i64> = table.page_data().iter().filter_map(|r| r.get("age").and_then(|v| v.as_i64())).collect();
/// assert_eq!(ages, vec![39, 42, 45, 48, 51]);
/// ```

use crate::changeset::{ChangeCoordinator, ChangeEvent, ChangeEventInfo, TableAction};
use crate::column::{Column, TitleContext};
use crate::config::TableConfig;
use crate::diagnostics::Diagnostics;
use crate::error::TableError;
use crate::filter::{self, to_public_filters, FilterCommit, FilterDropdown, FilterEngine, FilterState};
use crate::header::{self, HeaderColumn};
use crate::lookup::{KeyedLookupIndex, RowKey};
use crate::pagination::{self, PaginationConfig, PaginationEngine, PaginationState};
use crate::record::{Key, Record};
use crate::selection::{
    self, SelectAllScope, SelectionCell, SelectionChange, SelectionConfig, SelectionContext, SelectionEngine,
};
use crate::sorter::{self, request_for, SortEngine, SortRequest, SortState};
use std::fmt;
use std::rc::Rc;

pub type SelectionListener = Rc<dyn Fn(&SelectionChange)>;

/// Collects the inputs of a `Table` before the engines are initialised.
pub struct TableBuilder {
    columns: Vec<Column>,
    data: Rc<Vec<Record>>,
    row_key: RowKey,
    config: TableConfig,
    diagnostics: Diagnostics,
    pagination: Option<PaginationConfig>,
    selection: Option<SelectionConfig>,
}

impl TableBuilder {
    pub fn data(mut self, data: Vec<Record>) -> Self {
        self.data = Rc::new(data);
        self
    }

    pub fn shared_data(mut self, data: Rc<Vec<Record>>) -> Self {
        self.data = data;
        self
    }

    pub fn row_key(mut self, row_key: RowKey) -> Self {
        self.row_key = row_key;
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Render every row on one page.
    pub fn without_pagination(mut self) -> Self {
        self.pagination = None;
        self
    }

    pub fn selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn build(self) -> Table {
        let sort = SortEngine::new(&self.columns, &self.diagnostics);
        let filter = FilterEngine::new(&self.columns, &self.diagnostics);
        let pagination = PaginationEngine::new(self.pagination.as_ref().unwrap_or(&PaginationConfig::default()));

        let mut table = Table {
            sort_states: sort.states().to_vec(),
            filter_states: filter.states().to_vec(),
            columns: self.columns,
            data: self.data,
            row_key: self.row_key,
            config: self.config,
            diagnostics: self.diagnostics,
            sort,
            filter,
            pagination_config: self.pagination,
            pagination,
            selection: self.selection.map(SelectionEngine::new),
            index: KeyedLookupIndex::new(),
            coordinator: ChangeCoordinator::new(),
            selection_listener: None,
        };
        table.sync_pagination();
        table
    }
}

/// Sortable, filterable, paginated and selectable view over a record set.
pub struct Table {
    columns: Vec<Column>,
    data: Rc<Vec<Record>>,
    row_key: RowKey,
    config: TableConfig,
    diagnostics: Diagnostics,
    sort: SortEngine,
    /// Effective sort states (controlled or internal)
    sort_states: Vec<SortState>,
    filter: FilterEngine,
    /// Effective filter states (controlled or internal)
    filter_states: Vec<FilterState>,
    pagination_config: Option<PaginationConfig>,
    pagination: PaginationEngine,
    selection: Option<SelectionEngine>,
    index: KeyedLookupIndex,
    coordinator: ChangeCoordinator,
    selection_listener: Option<SelectionListener>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns.len())
            .field("rows", &self.data.len())
            .field("sort_states", &self.sort_states.len())
            .field("filter_states", &self.filter_states.len())
            .field("pagination", &self.pagination_config.is_some())
            .field("selection", &self.selection.is_some())
            .finish()
    }
}

impl Table {
    pub fn builder(columns: Vec<Column>) -> TableBuilder {
        TableBuilder {
            columns,
            data: Rc::new(Vec::new()),
            row_key: RowKey::default(),
            config: TableConfig::default(),
            diagnostics: Diagnostics::default(),
            pagination: Some(PaginationConfig::default()),
            selection: None,
        }
    }

    /// Table with default options over `data`.
    pub fn new(columns: Vec<Column>, data: Vec<Record>) -> Self {
        Table::builder(columns).data(data).build()
    }

    /// Table over records parsed from a JSON array of objects.
    pub fn from_json(columns: Vec<Column>, json: &str) -> Result<Self, TableError> {
        Ok(Table::new(columns, Record::list_from_json(json)?))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn data(&self) -> &Rc<Vec<Record>> {
        &self.data
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn sort_states(&self) -> &[SortState] {
        &self.sort_states
    }

    pub fn filter_states(&self) -> &[FilterState] {
        &self.filter_states
    }

    pub fn lookup_index(&self) -> &KeyedLookupIndex {
        &self.index
    }

    pub fn generation(&self) -> u64 {
        self.coordinator.generation()
    }

    fn children_field(&self) -> &str {
        &self.config.children_column_name
    }

    // ----- listeners -----

    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.coordinator.set_listener(listener);
    }

    /// Registers a side effect run when an action sends the table back to page 1.
    pub fn on_page_reset<F>(&mut self, hook: F)
    where
        F: Fn() + 'static,
    {
        self.coordinator.on_page_reset(hook);
    }

    pub fn set_selection_listener<F>(&mut self, listener: F)
    where
        F: Fn(&SelectionChange) + 'static,
    {
        self.selection_listener = Some(Rc::new(listener));
    }

    // ----- pipeline -----

    /// Every raw record, sorted.
    pub fn sorted_data(&self) -> Vec<Record> {
        sorter::apply_sort(&self.data, &self.sort_states, self.children_field())
    }

    /// Sorted records passing the filters: the data source across all pages.
    pub fn filtered_data(&self) -> Vec<Record> {
        filter::apply_filter(&self.sorted_data(), &self.filter_states, self.children_field())
    }

    /// `None` when pagination is disabled.
    pub fn pagination_state(&self) -> Option<PaginationState> {
        let config = self.pagination_config.as_ref()?;
        Some(self.pagination.state(self.filtered_data().len(), config))
    }

    /// The rows to render.
    pub fn page_data(&self) -> Vec<Record> {
        let filtered = self.filtered_data();
        self.paginate(filtered)
    }

    fn paginate(&self, filtered: Vec<Record>) -> Vec<Record> {
        match &self.pagination_config {
            Some(config) => {
                let state = self.pagination.state(filtered.len(), config);
                pagination::slice(&filtered, &state, config, &self.diagnostics)
            }
            None => filtered,
        }
    }

    /// Writes a clamped page back into the internal state.
    fn sync_pagination(&mut self) {
        if let Some(state) = self.pagination_state() {
            self.pagination.sync(&state);
        }
    }

    pub fn record_by_key(&self, key: &Key) -> Option<&Record> {
        self.index.get_by_key(
            &self.data,
            &self.row_key,
            &self.config.children_column_name,
            key,
            &self.diagnostics,
        )
    }

    // ----- decoration -----

    fn title_context(&self) -> TitleContext {
        let sort_columns: Vec<_> = self
            .sort_states
            .iter()
            .filter_map(|s| s.sort_order.map(|order| (s.column_key.clone(), order)))
            .collect();
        TitleContext {
            sort_column: sort_columns.first().map(|(key, _)| key.clone()),
            sort_order: sort_columns.first().map(|(_, order)| *order),
            sort_columns,
            filters: to_public_filters(&self.filter_states),
        }
    }

    /// Header tree with sort, filter and selection affordances attached.
    pub fn decorated_columns(&self) -> Vec<HeaderColumn> {
        let headers = header::from_columns(&self.columns);
        let headers = sorter::decorate_columns(headers, &self.sort_states, &self.config);
        let headers = filter::decorate_columns(headers, &self.filter_states, &self.filter, &self.config);
        let headers = match &self.selection {
            Some(engine) => {
                let scope = self.selection_scope(engine);
                let affordance = engine.affordance(&self.selection_ctx(&scope), &self.config);
                selection::decorate_columns(headers, affordance, &self.config)
            }
            None => headers,
        };
        header::resolve_titles(headers, &self.title_context())
    }

    // ----- change events -----

    fn snapshot(&self, sort_states: Vec<SortState>, filter_states: Vec<FilterState>) -> ChangeEventInfo {
        let mut info = ChangeEventInfo::from_sort(sort_states);
        info.merge(ChangeEventInfo::from_filter(filter_states));
        info
    }

    fn emit(&mut self, partial: ChangeEventInfo, action: TableAction, reset: bool) -> ChangeEvent {
        if reset {
            self.pagination.reset(None, None);
        }
        let pagination_config = self.pagination_config.as_ref();
        let engine = &self.pagination;
        let event = self.coordinator.trigger_on_change(
            partial,
            action,
            reset,
            &self.data,
            &self.config.children_column_name,
            |total| pagination_config.map(|config| engine.state(total, config)),
        );
        if let Some(state) = &event.pagination {
            self.pagination.sync(state);
        }
        event
    }

    // ----- sort intents -----

    /// Advances `column_key` to its next sort direction, as a header click does.
    pub fn request_sort(&mut self, column_key: &str) -> Option<ChangeEvent> {
        let request = request_for(&self.columns, &self.sort_states, column_key, &self.config)?;
        self.trigger_sorter(request)
    }

    /// Applies an explicit sort request. Returns `None` for unknown or unsortable columns.
    pub fn trigger_sorter(&mut self, request: SortRequest) -> Option<ChangeEvent> {
        let states = self.sort.trigger(&self.columns, &self.sort_states, &request)?;
        self.sort_states = self.sort.sync(&self.columns, &self.diagnostics);
        let partial = self.snapshot(states, self.filter_states.clone());
        let reset = self.config.reset_page_on_sort;
        Some(self.emit(partial, TableAction::Sort, reset))
    }

    // ----- filter intents -----

    /// Commits `keys` for one column directly, bypassing the dropdown.
    pub fn request_filter(&mut self, column_key: &str, keys: Option<Vec<Key>>) -> Option<ChangeEvent> {
        self.commit_filter(FilterCommit {
            column_key: column_key.to_string(),
            filtered_keys: keys,
        })
    }

    fn commit_filter(&mut self, commit: FilterCommit) -> Option<ChangeEvent> {
        let states = self.filter.trigger(&self.columns, &self.filter_states, commit)?;
        self.filter_states = self.filter.sync(&self.columns, &self.diagnostics);
        let partial = self.snapshot(self.sort_states.clone(), states);
        Some(self.emit(partial, TableAction::Filter, true))
    }

    pub fn filter_dropdown(&self, column_key: &str) -> Option<&FilterDropdown> {
        self.filter.dropdown(column_key)
    }

    pub fn open_filter_dropdown(&mut self, column_key: &str) {
        self.filter.open(column_key, &self.filter_states);
    }

    /// Closes the popup; commits staged keys when the column filters on close.
    pub fn close_filter_dropdown(&mut self, column_key: &str) -> Option<ChangeEvent> {
        let commit = self.filter.close(&self.columns, column_key, &self.filter_states)?;
        self.commit_filter(commit)
    }

    pub fn toggle_filter_key(&mut self, column_key: &str, key: impl Into<Key>) {
        self.filter.toggle_key(&self.columns, column_key, key.into());
    }

    pub fn set_filter_staged(&mut self, column_key: &str, keys: Vec<Key>) {
        self.filter.set_staged(column_key, keys);
    }

    pub fn set_filter_search(&mut self, column_key: &str, input: impl Into<String>) {
        self.filter.set_search(column_key, input);
    }

    pub fn check_all_filter(&mut self, column_key: &str) {
        self.filter.check_all(&self.columns, column_key);
    }

    pub fn reset_filter(&mut self, column_key: &str) {
        self.filter.reset(&self.columns, column_key);
    }

    /// Commits the staged keys. Returns `None` when they equal the current filter.
    pub fn confirm_filter(&mut self, column_key: &str) -> Option<ChangeEvent> {
        let commit = self.filter.confirm(column_key, &self.filter_states)?;
        self.commit_filter(commit)
    }

    // ----- pagination intents -----

    /// Moves to page `current`. Returns `None` when pagination is disabled.
    pub fn request_page(&mut self, current: usize, page_size: Option<usize>) -> Option<ChangeEvent> {
        self.pagination_config.as_ref()?;
        self.pagination.change(current, page_size);
        let partial = self.snapshot(self.sort_states.clone(), self.filter_states.clone());
        Some(self.emit(partial, TableAction::Paginate, false))
    }

    // ----- selection -----

    fn selection_scope(&self, engine: &SelectionEngine) -> Vec<Record> {
        match engine.config().scope {
            SelectAllScope::Page => self.page_data(),
            SelectAllScope::Filtered => self.filtered_data(),
        }
    }

    fn selection_ctx<'a>(&'a self, scope: &'a [Record]) -> SelectionContext<'a> {
        SelectionContext {
            data: &self.data,
            row_key: &self.row_key,
            children_field: &self.config.children_column_name,
            index: &self.index,
            diagnostics: &self.diagnostics,
            scope,
        }
    }

    fn with_selection<F>(&mut self, op: F) -> Option<SelectionChange>
    where
        F: FnOnce(&mut SelectionEngine, &SelectionContext<'_>) -> Option<SelectionChange>,
    {
        let scope = self.selection_scope(self.selection.as_ref()?);
        let Table {
            selection,
            data,
            row_key,
            config,
            index,
            diagnostics,
            selection_listener,
            ..
        } = self;
        let ctx = SelectionContext {
            data,
            row_key,
            children_field: &config.children_column_name,
            index,
            diagnostics,
            scope: &scope,
        };
        let change = op(selection.as_mut()?, &ctx)?;
        if let Some(listener) = selection_listener {
            listener(&change);
        }
        Some(change)
    }

    pub fn toggle_row(&mut self, key: impl Into<Key>) -> Option<SelectionChange> {
        let key = key.into();
        self.with_selection(|engine, ctx| engine.toggle(&key, ctx))
    }

    /// Shift-click selection from the last toggled row to `key`.
    pub fn select_range(&mut self, key: impl Into<Key>) -> Option<SelectionChange> {
        let key = key.into();
        self.with_selection(|engine, ctx| engine.select_range(&key, ctx))
    }

    pub fn select_all(&mut self) -> Option<SelectionChange> {
        self.with_selection(|engine, ctx| engine.select_all(ctx))
    }

    pub fn select_invert(&mut self) -> Option<SelectionChange> {
        self.with_selection(|engine, ctx| engine.select_invert(ctx))
    }

    pub fn select_none(&mut self) -> Option<SelectionChange> {
        self.with_selection(|engine, ctx| engine.select_none(ctx))
    }

    /// Replaces the selection; disabled rows keep their state.
    pub fn set_selected_keys(&mut self, keys: Vec<Key>) -> Option<SelectionChange> {
        self.with_selection(|engine, ctx| Some(engine.set_all(keys, ctx)))
    }

    pub fn is_selected(&self, key: &Key) -> bool {
        self.selection
            .as_ref()
            .map_or(false, |engine| engine.is_selected(key, &self.selection_ctx(&[])))
    }

    pub fn selected_keys(&self) -> Vec<Key> {
        self.selection
            .as_ref()
            .map(|engine| engine.selected_keys(&self.selection_ctx(&[])))
            .unwrap_or_default()
    }

    pub fn selection_cell(&self, key: &Key) -> Option<SelectionCell> {
        let engine = self.selection.as_ref()?;
        Some(engine.cell(key, &self.selection_ctx(&[])))
    }

    // ----- mutators -----

    /// Replaces the column tree, dropping state of columns that disappeared.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
        self.sort_states = self.sort.sync(&self.columns, &self.diagnostics);
        self.filter_states = self.filter.sync(&self.columns, &self.diagnostics);
        self.sync_pagination();
    }

    pub fn set_data(&mut self, data: Vec<Record>) {
        self.set_shared_data(Rc::new(data));
    }

    /// Replaces the records. Passing the same `Rc` again keeps the lookup index.
    pub fn set_shared_data(&mut self, data: Rc<Vec<Record>>) {
        self.data = data;
        self.sync_pagination();
    }

    pub fn set_row_key(&mut self, row_key: RowKey) {
        self.row_key = row_key;
    }

    /// Enables (`Some`) or disables (`None`) pagination. Enabling starts from
    /// the new config's default page and page size.
    pub fn set_pagination(&mut self, pagination: Option<PaginationConfig>) {
        if let (None, Some(config)) = (&self.pagination_config, &pagination) {
            self.pagination = PaginationEngine::new(config);
        }
        self.pagination_config = pagination;
        self.sync_pagination();
    }

    /// Switches the controlled selection on (`Some`) or off (`None`).
    pub fn set_selected_row_keys(&mut self, keys: Option<Vec<Key>>) {
        if let Some(engine) = self.selection.as_mut() {
            engine.set_controlled(keys);
        }
    }

    pub fn set_selection(&mut self, selection: Option<SelectionConfig>) {
        self.selection = selection.map(SelectionEngine::new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{FilterItem, LeafColumn, Sorter};
    use crate::diagnostics::Warning;
    use crate::sorter::{SortOrder, SorterInfo};
    use std::cell::RefCell;

    fn columns() -> Vec<Column> {
        vec![
            LeafColumn::new("Name").data_index("name").into(),
            LeafColumn::new("Age")
                .data_index("age")
                .sorter(Sorter::by_field("age"))
                .into(),
            LeafColumn::new("Status")
                .data_index("status")
                .filters(vec![FilterItem::new("Active", "A"), FilterItem::new("Blocked", "B")])
                .on_filter(|value, record| {
                    record.get("status").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
                })
                .into(),
        ]
    }

    fn people(n: i64) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new()
                    .with("key", i)
                    .with("name", format!("p{}", i))
                    .with("age", (i * 7) % 50)
                    .with("status", if i % 3 == 0 { "A" } else { "B" })
            })
            .collect()
    }

    fn keys(records: &[Record]) -> Vec<i64> {
        records.iter().filter_map(|r| r.get("key").and_then(|v| v.as_i64())).collect()
    }

    #[test]
    fn test_sort_cycle_through_header() {
        let mut table = Table::builder(columns()).data(people(5)).diagnostics(Diagnostics::silent()).build();

        let event = table.request_sort("age").unwrap();
        assert!(matches!(event.sorter, SorterInfo::Single(ref s) if s.order == Some(SortOrder::Ascend)));
        let event = table.request_sort("age").unwrap();
        assert!(matches!(event.sorter, SorterInfo::Single(ref s) if s.order == Some(SortOrder::Descend)));
        let event = table.request_sort("age").unwrap();
        assert!(matches!(event.sorter, SorterInfo::Single(ref s) if s.order.is_none()));
        assert_eq!(keys(&table.page_data()), vec![1, 2, 3, 4, 5]);

        assert!(table.request_sort("name").is_none());
        assert_eq!(table.generation(), 3);
    }

    #[test]
    fn test_sort_reset_is_configurable() {
        let config = TableConfig {
            reset_page_on_sort: false,
            ..TableConfig::default()
        };
        let mut table = Table::builder(columns())
            .data(people(30))
            .config(config)
            .diagnostics(Diagnostics::silent())
            .build();
        table.request_page(3, None).unwrap();
        let event = table.request_sort("age").unwrap();
        assert_eq!(event.pagination.map(|p| p.current), Some(3));
    }

    #[test]
    fn test_filter_resets_page_and_reports_source() {
        let resets = Rc::new(RefCell::new(0));
        let counter = resets.clone();
        let mut table = Table::builder(columns()).data(people(30)).diagnostics(Diagnostics::silent()).build();
        table.on_page_reset(move || *counter.borrow_mut() += 1);

        table.request_page(3, None).unwrap();
        let event = table.request_filter("status", Some(vec![Key::from("A")])).unwrap();
        assert_eq!(*resets.borrow(), 1);
        assert_eq!(event.extra.action, TableAction::Filter);
        assert_eq!(event.extra.current_data_source.len(), 10);
        assert_eq!(event.pagination, Some(PaginationState { current: 1, page_size: 10, total: 10 }));
        assert_eq!(table.pagination_state().map(|p| p.current), Some(1));
    }

    #[test]
    fn test_dropdown_flow() {
        let mut table = Table::builder(columns()).data(people(9)).diagnostics(Diagnostics::silent()).build();
        table.open_filter_dropdown("status");
        table.toggle_filter_key("status", "A");
        assert_eq!(table.filtered_data().len(), 9);

        let headers = table.decorated_columns();
        let affordance = HeaderColumn::find(&headers, "status").and_then(|h| h.filter.clone()).unwrap();
        assert!(affordance.open);
        assert!(affordance.options[0].checked);
        assert!(!affordance.filtered);

        let event = table.confirm_filter("status").unwrap();
        assert_eq!(keys(&event.extra.current_data_source), vec![3, 6, 9]);
        table.open_filter_dropdown("status");
        assert!(table.confirm_filter("status").is_none());
    }

    #[test]
    fn test_pagination_disabled() {
        let mut table = Table::builder(columns())
            .data(people(25))
            .without_pagination()
            .diagnostics(Diagnostics::silent())
            .build();
        assert_eq!(table.page_data().len(), 25);
        assert!(table.pagination_state().is_none());
        assert!(table.request_page(2, None).is_none());
        let event = table.request_sort("age").unwrap();
        assert!(event.pagination.is_none());
    }

    #[test]
    fn test_set_columns_drops_stale_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let mut table = Table::builder(columns())
            .data(people(6))
            .diagnostics(Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone())))
            .build();
        table.request_sort("age").unwrap();
        table.request_filter("status", Some(vec![Key::from("B")])).unwrap();
        assert_eq!(table.filtered_data().len(), 4);

        table.set_columns(vec![LeafColumn::new("Name").data_index("name").into()]);
        assert!(table.sort_states().is_empty());
        assert!(table.filter_states().is_empty());
        assert_eq!(keys(&table.page_data()), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow().contains(&Warning::StaleColumnState {
            engine: "sort",
            column: "age".to_string()
        }));
    }

    #[test]
    fn test_set_data_clamps_page() {
        let mut table = Table::builder(columns()).data(people(30)).diagnostics(Diagnostics::silent()).build();
        table.request_page(3, None).unwrap();
        table.set_data(people(12));
        assert_eq!(table.pagination_state().map(|p| p.current), Some(2));
        table.set_data(people(30));
        assert_eq!(table.pagination_state().map(|p| p.current), Some(2));
    }

    #[test]
    fn test_enabling_pagination_uses_new_defaults() {
        let mut table = Table::builder(columns())
            .data(people(12))
            .without_pagination()
            .diagnostics(Diagnostics::silent())
            .build();
        table.set_pagination(Some(PaginationConfig::default().default_page_size(4)));
        assert_eq!(table.pagination_state(), Some(PaginationState { current: 1, page_size: 4, total: 12 }));
        assert_eq!(keys(&table.page_data()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_selection_through_table() {
        let picked = Rc::new(RefCell::new(Vec::new()));
        let captured = picked.clone();
        let mut table = Table::builder(columns())
            .data(people(12))
            .selection(SelectionConfig::default())
            .diagnostics(Diagnostics::silent())
            .build();
        table.set_selection_listener(move |change| captured.borrow_mut().push(change.keys.len()));

        table.toggle_row(11).unwrap();
        let change = table.select_all().unwrap();
        // Page one plus the key selected on page two.
        assert_eq!(change.keys.len(), 11);
        assert!(table.is_selected(&Key::Int(11)));
        assert_eq!(picked.borrow().as_slice(), &[1, 11]);

        let headers = table.decorated_columns();
        let selection = headers[0].selection.as_ref().unwrap();
        assert!(selection.checked);
        assert_eq!(table.selection_cell(&Key::Int(12)), Some(SelectionCell::default()));
    }

    #[test]
    fn test_select_all_over_filtered_set() {
        let mut table = Table::builder(columns())
            .data(people(25))
            .selection(SelectionConfig::default().scope(SelectAllScope::Filtered))
            .diagnostics(Diagnostics::silent())
            .build();
        table.toggle_row(3).unwrap();
        table.request_filter("status", Some(vec![Key::from("B")])).unwrap();
        assert_eq!(table.filtered_data().len(), 17);
        assert_eq!(table.page_data().len(), 10);

        let change = table.select_all().unwrap();
        assert_eq!(change.method, crate::selection::SelectionMethod::All);
        // Both pages of the filtered set plus the key selected before filtering.
        assert_eq!(change.keys.len(), 18);
        assert!(table.is_selected(&Key::Int(25)));
        assert!(table.is_selected(&Key::Int(3)));
        assert!(!table.is_selected(&Key::Int(6)));

        let headers = table.decorated_columns();
        assert!(headers[0].selection.as_ref().unwrap().checked);
    }

    #[test]
    fn test_titles_see_sort_state() {
        let mut columns = columns();
        columns[1] = LeafColumn::new(crate::column::Title::render(|ctx| match ctx.sort_order {
            Some(SortOrder::Ascend) => "Age (asc)".to_string(),
            _ => "Age".to_string(),
        }))
        .data_index("age")
        .sorter(Sorter::by_field("age"))
        .into();
        let mut table = Table::builder(columns).data(people(3)).diagnostics(Diagnostics::silent()).build();
        assert_eq!(table.decorated_columns()[1].title, "Age");
        table.request_sort("age").unwrap();
        let headers = table.decorated_columns();
        assert_eq!(headers[1].title, "Age (asc)");
        assert!(headers[1].class_names.contains(&"table-column-sort".to_string()));
    }

    #[test]
    fn test_from_json() {
        let table = Table::from_json(columns(), r#"[{"key": 1, "name": "a", "status": "A"}]"#).unwrap();
        assert_eq!(table.record_by_key(&Key::Int(1)).and_then(|r| r.get("name")).and_then(|v| v.as_str()), Some("a"));
        assert!(matches!(Table::from_json(columns(), r#"{"key": 1}"#), Err(TableError::NotAnArray)));
    }
}
