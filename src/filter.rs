/// Filter engine
///
/// Tracks per-column filter selections and computes the filtered view of a
/// (possibly tree-shaped) record set.
///
/// # Semantics
///
/// - Within one column the selected values are OR-ed: a record passes if
///   `on_filter(value, record)` holds for any selected value.
/// - Across columns the results are AND-ed.
/// - Tree rows are kept when they pass themselves or when any descendant
///   passes; their children are replaced by the passing descendants only.
///
/// Selections made in a column's dropdown are staged and only committed by
/// `confirm` (or by closing the dropdown when `filter_on_close` is set).
///
/// # Examples
///
/// ```
/// use tablepipe::filter::{apply_filter, FilterEngine};
/// use tablepipe::{Column, Diagnostics, FilterItem, Key, LeafColumn, Record};
///
/// let columns: Vec<Column> = vec![LeafColumn::new("Status")
///     .data_index("status")
///     .filters(vec![FilterItem::new("Active", "A")])
///     .on_filter(|value, record| {
///         record.get("status").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
///     })
///     .default_filtered_value(vec![Key::from("A")])
///     .into()];
///
/// let engine = FilterEngine::new(&columns, &Diagnostics::silent());
/// let records = vec![Record::new().with("status", "A"), Record::new().with("status", "B")];
/// assert_eq!(apply_filter(&records, engine.states(), "children").len(), 1);
/// ```

use crate::column::{find_column, walk_columns, Column, ColumnKey, FilterFn, FilterItem, FilterMode, LeafColumn};
use crate::config::TableConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::header::HeaderColumn;
use crate::record::{Key, Record};
use std::collections::{BTreeMap, HashMap};

/// Public filter payload: column key to selected values (`None` = unfiltered).
pub type PublicFilters = BTreeMap<ColumnKey, Option<Vec<Key>>>;

/// Filter state of one column.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub column_key: ColumnKey,
    pub column: Column,
    /// `None` means no filter applied; an empty list is kept for display
    pub filtered_keys: Option<Vec<Key>>,
    pub force_filtered: bool,
}

impl FilterState {
    /// True when the header should show the filtered hook.
    pub fn is_filtered(&self) -> bool {
        self.force_filtered || self.filtered_keys.as_ref().map_or(false, |k| !k.is_empty())
    }
}

/// A committed selection for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCommit {
    pub column_key: ColumnKey,
    pub filtered_keys: Option<Vec<Key>>,
}

/// Every declared option value, parents before their children.
pub fn flatten_keys(items: &[FilterItem]) -> Vec<Key> {
    let mut keys = Vec::new();
    for item in items {
        keys.push(item.value.clone());
        keys.extend(flatten_keys(&item.children));
    }
    keys
}

fn filter_state(leaf: &LeafColumn, column: &Column, key: ColumnKey, keys: Option<Vec<Key>>) -> FilterState {
    FilterState {
        column_key: key,
        column: column.clone(),
        filtered_keys: keys,
        force_filtered: leaf.filtered.unwrap_or(false),
    }
}

/// Collects states paired with whether the column controls its own selection.
fn collect_with_control(columns: &[Column], init: bool) -> Vec<(FilterState, bool)> {
    let mut states = Vec::new();
    walk_columns(columns, |column, key, _| {
        let Column::Leaf(leaf) = column else {
            return;
        };
        if !leaf.is_filterable() {
            return;
        }
        match &leaf.filtered_value {
            Some(controlled) => {
                states.push((filter_state(leaf, column, key, controlled.clone()), true));
            }
            None => {
                let seeded = if init {
                    leaf.default_filtered_value.clone()
                } else {
                    None
                };
                states.push((filter_state(leaf, column, key, seeded), false));
            }
        }
    });
    states
}

/// Walks the column tree and collects filter states.
///
/// Controlled columns report their `filtered_value`; on `init`, uncontrolled
/// columns are seeded from `default_filtered_value`.
pub fn collect_filter_states(columns: &[Column], init: bool) -> Vec<FilterState> {
    collect_with_control(columns, init)
        .into_iter()
        .map(|(state, _)| state)
        .collect()
}

/// Rebuilds filter states from the column spec after it changed.
///
/// Controlled columns take their declared selection; uncontrolled columns
/// keep the selection from `prior` when they persist. Prior states for
/// columns that disappeared are dropped.
pub fn merge_filter_states(
    columns: &[Column],
    prior: &[FilterState],
    diagnostics: &Diagnostics,
) -> Vec<FilterState> {
    let collected = collect_with_control(columns, false);

    let controlled = collected.iter().filter(|(_, c)| *c).count();
    if controlled > 0 && controlled < collected.len() {
        diagnostics.warn(Warning::MixedFilterControl);
    }

    for state in prior {
        if !collected.iter().any(|(s, _)| s.column_key == state.column_key) {
            diagnostics.warn(Warning::StaleColumnState {
                engine: "filter",
                column: state.column_key.clone(),
            });
        }
    }

    collected
        .into_iter()
        .map(|(mut state, is_controlled)| {
            if !is_controlled {
                state.filtered_keys = prior
                    .iter()
                    .find(|p| p.column_key == state.column_key)
                    .and_then(|p| p.filtered_keys.clone());
            }
            state
        })
        .collect()
}

/// Maps states to the public `column key -> values` payload.
///
/// For columns with declared options, selected keys are mapped back to the
/// declared values so a selected `"1"` reports the declared `1`.
pub fn to_public_filters(states: &[FilterState]) -> PublicFilters {
    states
        .iter()
        .map(|state| {
            let declared = state.column.as_leaf().and_then(|leaf| leaf.get_filters());
            let value = match (&state.filtered_keys, declared) {
                (Some(keys), Some(items)) => Some(
                    flatten_keys(items)
                        .into_iter()
                        .filter(|declared| keys.iter().any(|k| k.loosely_eq(declared)))
                        .collect(),
                ),
                (Some(keys), None) => Some(keys.clone()),
                (None, _) => None,
            };
            (state.column_key.clone(), value)
        })
        .collect()
}

struct ActiveFilter<'a> {
    predicate: &'a FilterFn,
    keys: Vec<Key>,
}

impl ActiveFilter<'_> {
    fn passes(&self, record: &Record) -> bool {
        self.keys.iter().any(|key| (self.predicate)(key, record))
    }
}

fn active_filters(states: &[FilterState]) -> Vec<ActiveFilter<'_>> {
    states
        .iter()
        .filter_map(|state| {
            let leaf = state.column.as_leaf()?;
            let predicate = leaf.on_filter.as_ref()?;
            let selected = state.filtered_keys.as_ref().filter(|k| !k.is_empty())?;
            let declared = leaf.get_filters().map(flatten_keys).unwrap_or_default();
            // Hand the predicate the declared value when one matches loosely.
            let keys = selected
                .iter()
                .map(|key| {
                    declared
                        .iter()
                        .find(|d| d.loosely_eq(key))
                        .cloned()
                        .unwrap_or_else(|| key.clone())
                })
                .collect();
            Some(ActiveFilter { predicate, keys })
        })
        .collect()
}

/// Returns the records passing every active filter, preserving tree ancestors.
pub fn apply_filter(records: &[Record], states: &[FilterState], children_field: &str) -> Vec<Record> {
    let active = active_filters(states);
    if active.is_empty() {
        return records.to_vec();
    }
    filter_tree(records, &active, children_field)
}

fn filter_tree(records: &[Record], active: &[ActiveFilter<'_>], children_field: &str) -> Vec<Record> {
    records
        .iter()
        .filter_map(|record| {
            let passes = active.iter().all(|filter| filter.passes(record));
            match record.children(children_field) {
                Some(children) => {
                    let kept = filter_tree(children, active, children_field);
                    if kept.is_empty() {
                        passes.then(|| record.with_children(children_field, Vec::new()))
                    } else {
                        Some(record.with_children(children_field, kept))
                    }
                }
                None => passes.then(|| record.clone()),
            }
        })
        .collect()
}

/// Staged state of one column's filter popup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDropdown {
    pub open: bool,
    pub staged: Vec<Key>,
    pub search: String,
}

/// Owns the internal filter states and the per-column dropdown staging.
#[derive(Debug, Default)]
pub struct FilterEngine {
    states: Vec<FilterState>,
    dropdowns: HashMap<ColumnKey, FilterDropdown>,
}

fn committed_keys(states: &[FilterState], column_key: &str) -> Option<Vec<Key>> {
    states
        .iter()
        .find(|s| s.column_key == column_key)
        .and_then(|s| s.filtered_keys.clone())
}

fn filterable_leaf<'a>(columns: &'a [Column], column_key: &str) -> Option<&'a LeafColumn> {
    find_column(columns, column_key)
        .and_then(Column::as_leaf)
        .filter(|leaf| leaf.is_filterable())
}

impl FilterEngine {
    pub fn new(columns: &[Column], diagnostics: &Diagnostics) -> Self {
        let collected = collect_with_control(columns, true);
        let controlled = collected.iter().filter(|(_, c)| *c).count();
        if controlled > 0 && controlled < collected.len() {
            diagnostics.warn(Warning::MixedFilterControl);
        }
        FilterEngine {
            states: collected.into_iter().map(|(state, _)| state).collect(),
            dropdowns: HashMap::new(),
        }
    }

    /// Internal states as last written.
    pub fn states(&self) -> &[FilterState] {
        &self.states
    }

    pub fn dropdown(&self, column_key: &str) -> Option<&FilterDropdown> {
        self.dropdowns.get(column_key)
    }

    /// Reconciles with a changed column spec.
    pub fn sync(&mut self, columns: &[Column], diagnostics: &Diagnostics) -> Vec<FilterState> {
        let merged = merge_filter_states(columns, &self.states, diagnostics);
        self.dropdowns
            .retain(|key, _| merged.iter().any(|s| &s.column_key == key));
        self.states = merged.clone();
        merged
    }

    /// Commits a selection for one column and returns the new state list.
    pub fn trigger(
        &mut self,
        columns: &[Column],
        current: &[FilterState],
        commit: FilterCommit,
    ) -> Option<Vec<FilterState>> {
        let column = find_column(columns, &commit.column_key)?;
        let leaf = column.as_leaf().filter(|leaf| leaf.is_filterable())?;
        let state = filter_state(leaf, column, commit.column_key.clone(), commit.filtered_keys);

        let mut states = current.to_vec();
        match states.iter_mut().find(|s| s.column_key == commit.column_key) {
            Some(existing) => *existing = state,
            None => states.push(state),
        }
        log::debug!(
            "filter on '{}' -> {:?}",
            commit.column_key,
            committed_keys(&states, &commit.column_key)
        );
        self.states = states.clone();
        Some(states)
    }

    /// Opens the popup, re-seeding staged keys from the committed selection.
    pub fn open(&mut self, column_key: &str, current: &[FilterState]) {
        let dropdown = self.dropdowns.entry(column_key.to_string()).or_default();
        dropdown.open = true;
        dropdown.staged = committed_keys(current, column_key).unwrap_or_default();
        dropdown.search.clear();
    }

    /// Closes the popup; commits first when the column filters on close.
    pub fn close(
        &mut self,
        columns: &[Column],
        column_key: &str,
        current: &[FilterState],
    ) -> Option<FilterCommit> {
        let on_close = filterable_leaf(columns, column_key).map_or(false, |leaf| leaf.filter_on_close);
        let commit = if on_close {
            self.confirm(column_key, current)
        } else {
            None
        };
        if let Some(dropdown) = self.dropdowns.get_mut(column_key) {
            dropdown.open = false;
        }
        commit
    }

    /// Toggles one option. Single-select columns replace the selection.
    pub fn toggle_key(&mut self, columns: &[Column], column_key: &str, key: Key) {
        let Some(leaf) = filterable_leaf(columns, column_key) else {
            return;
        };
        let dropdown = self.dropdowns.entry(column_key.to_string()).or_default();
        if !leaf.filter_multiple {
            dropdown.staged = vec![key];
        } else if let Some(pos) = dropdown.staged.iter().position(|k| k.loosely_eq(&key)) {
            dropdown.staged.remove(pos);
        } else {
            dropdown.staged.push(key);
        }
    }

    pub fn set_staged(&mut self, column_key: &str, keys: Vec<Key>) {
        self.dropdowns.entry(column_key.to_string()).or_default().staged = keys;
    }

    /// Tree mode "select all": selects every option, or clears if all are selected.
    pub fn check_all(&mut self, columns: &[Column], column_key: &str) {
        let Some(leaf) = filterable_leaf(columns, column_key) else {
            return;
        };
        let all = leaf.get_filters().map(flatten_keys).unwrap_or_default();
        let dropdown = self.dropdowns.entry(column_key.to_string()).or_default();
        let everything = all
            .iter()
            .all(|k| dropdown.staged.iter().any(|s| s.loosely_eq(k)));
        dropdown.staged = if everything { Vec::new() } else { all };
    }

    pub fn set_search(&mut self, column_key: &str, input: impl Into<String>) {
        self.dropdowns.entry(column_key.to_string()).or_default().search = input.into();
    }

    /// Clears the staged selection, or restores the default when the column opts in.
    pub fn reset(&mut self, columns: &[Column], column_key: &str) {
        let Some(leaf) = filterable_leaf(columns, column_key) else {
            return;
        };
        let staged = if leaf.filter_reset_to_default {
            leaf.default_filtered_value.clone().unwrap_or_default()
        } else {
            Vec::new()
        };
        let dropdown = self.dropdowns.entry(column_key.to_string()).or_default();
        dropdown.staged = staged;
        dropdown.search.clear();
    }

    /// Closes the popup and returns the commit, or `None` when nothing changed.
    pub fn confirm(&mut self, column_key: &str, current: &[FilterState]) -> Option<FilterCommit> {
        let dropdown = self.dropdowns.entry(column_key.to_string()).or_default();
        dropdown.open = false;
        let staged = (!dropdown.staged.is_empty()).then(|| dropdown.staged.clone());
        let committed = committed_keys(current, column_key);

        let unchanged = match (&staged, &committed) {
            (None, None) => true,
            (None, Some(keys)) => keys.is_empty(),
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().all(|k| b.iter().any(|c| c.loosely_eq(k)))
            }
            (Some(_), None) => false,
        };
        if unchanged {
            return None;
        }
        Some(FilterCommit {
            column_key: column_key.to_string(),
            filtered_keys: staged,
        })
    }
}

/// One option as displayed in the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub text: String,
    pub value: Key,
    pub checked: bool,
    pub children: Vec<FilterOption>,
}

/// Filter affordance attached to a filterable header.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterAffordance {
    pub filtered: bool,
    pub open: bool,
    pub multiple: bool,
    pub mode: FilterMode,
    /// Current search input, when the column enables search
    pub search: Option<String>,
    pub options: Vec<FilterOption>,
    /// Tree-mode "select all" checkbox state
    pub check_all: Option<bool>,
    pub empty_text: Option<String>,
    pub confirm_text: String,
    pub reset_text: String,
}

fn visible_options(
    items: &[FilterItem],
    leaf: &LeafColumn,
    search: &str,
    staged: &[Key],
) -> Vec<FilterOption> {
    items
        .iter()
        .filter_map(|item| {
            let children = visible_options(&item.children, leaf, search, staged);
            let matches = search.is_empty() || leaf.filter_search.matches(search, item);
            (matches || !children.is_empty()).then(|| FilterOption {
                text: item.text.clone(),
                value: item.value.clone(),
                checked: staged.iter().any(|k| k.loosely_eq(&item.value)),
                children,
            })
        })
        .collect()
}

/// Narrows a column's options to those matching `input`; groups stay when a child matches.
pub fn search_options(leaf: &LeafColumn, input: &str) -> Vec<FilterItem> {
    fn narrow(items: &[FilterItem], leaf: &LeafColumn, input: &str) -> Vec<FilterItem> {
        items
            .iter()
            .filter_map(|item| {
                let children = narrow(&item.children, leaf, input);
                let matches = input.is_empty() || leaf.filter_search.matches(input, item);
                (matches || !children.is_empty()).then(|| FilterItem {
                    children,
                    ..item.clone()
                })
            })
            .collect()
    }
    narrow(leaf.get_filters().unwrap_or_default(), leaf, input)
}

/// Attaches filter affordances and CSS hooks to filterable leaf headers.
pub fn decorate_columns(
    headers: Vec<HeaderColumn>,
    states: &[FilterState],
    engine: &FilterEngine,
    config: &TableConfig,
) -> Vec<HeaderColumn> {
    headers
        .into_iter()
        .map(|mut header| {
            let children = std::mem::take(&mut header.children);
            header.children = decorate_columns(children, states, engine, config);

            let Some(leaf) = header.column.as_ref().and_then(Column::as_leaf) else {
                return header;
            };
            if !leaf.is_filterable() {
                return header;
            }

            let state = states.iter().find(|s| s.column_key == header.key);
            let filtered = state.map_or(false, FilterState::is_filtered);
            let dropdown = engine.dropdown(&header.key).cloned().unwrap_or_default();
            let open = leaf.filter_dropdown_open.unwrap_or(dropdown.open);
            let staged = if dropdown.open {
                dropdown.staged.clone()
            } else {
                state.and_then(|s| s.filtered_keys.clone()).unwrap_or_default()
            };
            let search_input = if leaf.filter_search.is_enabled() {
                dropdown.search.as_str()
            } else {
                ""
            };
            let items = leaf.get_filters().unwrap_or_default();
            let options = visible_options(items, leaf, search_input, &staged);
            let check_all = (leaf.filter_mode == FilterMode::Tree && leaf.filter_multiple).then(|| {
                let all = flatten_keys(items);
                !all.is_empty() && all.iter().all(|k| staged.iter().any(|s| s.loosely_eq(k)))
            });

            header.class_names.push(config.class("column-has-filters"));
            if filtered {
                header.class_names.push(config.class("column-filtered"));
            }
            header.filter = Some(FilterAffordance {
                filtered,
                open,
                multiple: leaf.filter_multiple,
                mode: leaf.filter_mode,
                search: leaf
                    .filter_search
                    .is_enabled()
                    .then(|| dropdown.search.clone()),
                empty_text: options
                    .is_empty()
                    .then(|| config.locale.filter_empty_text.clone()),
                options,
                check_all,
                confirm_text: config.locale.filter_confirm.clone(),
                reset_text: config.locale.filter_reset.clone(),
            });
            header
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::FilterSearch;
    use crate::header;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn status_column() -> LeafColumn {
        LeafColumn::new("Status")
            .data_index("status")
            .filters(vec![
                FilterItem::new("Active", "A"),
                FilterItem::new("Blocked", "B"),
            ])
            .on_filter(|value, record| {
                record.get("status").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
            })
    }

    fn name_column() -> LeafColumn {
        LeafColumn::new("Name")
            .data_index("name")
            .filters(vec![FilterItem::new("Starts with J", "J")])
            .on_filter(|value, record| {
                record
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map_or(false, |n| n.starts_with(&value.to_string()))
            })
    }

    fn names(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.get("name").and_then(|v| v.as_str()).map(String::from))
            .collect()
    }

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("name", "Jim").with("status", "A"),
            Record::new().with("name", "Ann").with("status", "A"),
            Record::new().with("name", "Joe").with("status", "B"),
            Record::new().with("name", "Kim").with("status", "C"),
        ]
    }

    fn commit(engine: &mut FilterEngine, columns: &[Column], key: &str, keys: Option<Vec<Key>>) -> Vec<FilterState> {
        let current = engine.states().to_vec();
        engine
            .trigger(
                columns,
                &current,
                FilterCommit {
                    column_key: key.to_string(),
                    filtered_keys: keys,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_or_within_and_across_columns() {
        let columns: Vec<Column> = vec![status_column().into(), name_column().into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());

        let states = commit(&mut engine, &columns, "status", Some(vec!["A".into(), "B".into()]));
        assert_eq!(names(&apply_filter(&people(), &states, "children")), vec!["Jim", "Ann", "Joe"]);

        let states = commit(&mut engine, &columns, "name", Some(vec!["J".into()]));
        assert_eq!(names(&apply_filter(&people(), &states, "children")), vec!["Jim", "Joe"]);
    }

    #[test]
    fn test_empty_selection_does_not_filter() {
        let columns: Vec<Column> = vec![status_column().into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = commit(&mut engine, &columns, "status", Some(vec![]));
        assert_eq!(apply_filter(&people(), &states, "children").len(), 4);
        assert_eq!(to_public_filters(&states).get("status"), Some(&Some(vec![])));
    }

    #[test]
    fn test_tree_keeps_ancestors_of_matches() {
        let tree = vec![
            Record::new().with("name", "Parent").with("status", "C").with(
                "children",
                vec![
                    Record::new().with("name", "Kid A").with("status", "A"),
                    Record::new().with("name", "Kid C").with("status", "C").with(
                        "children",
                        vec![Record::new().with("name", "Grandkid A").with("status", "A")],
                    ),
                    Record::new().with("name", "Kid B").with("status", "B"),
                ],
            ),
            Record::new().with("name", "Lonely").with("status", "C").with(
                "children",
                vec![Record::new().with("name", "Kid X").with("status", "C")],
            ),
            Record::new().with("name", "Leafy").with("status", "A").with(
                "children",
                vec![Record::new().with("name", "Kid Y").with("status", "C")],
            ),
        ];
        let columns: Vec<Column> = vec![status_column().into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = commit(&mut engine, &columns, "status", Some(vec!["A".into()]));

        let filtered = apply_filter(&tree, &states, "children");
        assert_eq!(names(&filtered), vec!["Parent", "Leafy"]);
        let kids = filtered[0].children("children").unwrap();
        assert_eq!(names(kids), vec!["Kid A", "Kid C"]);
        assert_eq!(names(kids[1].children("children").unwrap()), vec!["Grandkid A"]);
        // A passing parent with no passing children keeps an empty list.
        assert_eq!(filtered[1].children("children").map(<[Record]>::len), Some(0));
    }

    #[test]
    fn test_predicate_receives_declared_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let columns: Vec<Column> = vec![LeafColumn::new("Level")
            .data_index("level")
            .filters(vec![FilterItem::new("One", 1)])
            .on_filter(move |value, _| {
                captured.borrow_mut().push(value.clone());
                true
            })
            .into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = commit(&mut engine, &columns, "level", Some(vec!["1".into()]));

        apply_filter(&[Record::new()], &states, "children");
        assert_eq!(seen.borrow().as_slice(), &[Key::Int(1)]);
        assert_eq!(to_public_filters(&states).get("level"), Some(&Some(vec![Key::Int(1)])));
    }

    #[test]
    fn test_default_and_controlled_collection() {
        let columns: Vec<Column> = vec![
            status_column().default_filtered_value(vec!["A".into()]).into(),
            name_column().filtered_value(Some(vec!["J".into()])).into(),
        ];
        let init = collect_filter_states(&columns, true);
        assert_eq!(init[0].filtered_keys, Some(vec![Key::from("A")]));
        assert_eq!(init[1].filtered_keys, Some(vec![Key::from("J")]));

        let later = collect_filter_states(&columns, false);
        assert_eq!(later[0].filtered_keys, None);
    }

    #[test]
    fn test_controlled_value_alone_participates() {
        let columns: Vec<Column> = vec![
            LeafColumn::new("Tag").data_index("tag").filtered_value(Some(vec!["x".into()])).into(),
            LeafColumn::new("Plain").data_index("plain").into(),
        ];
        let states = collect_filter_states(&columns, false);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].column_key, "tag");
        assert_eq!(to_public_filters(&states).get("tag"), Some(&Some(vec![Key::from("x")])));
        // Without a predicate the rows pass through untouched.
        assert_eq!(apply_filter(&people(), &states, "children"), people());

        let engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let headers = decorate_columns(header::from_columns(&columns), &states, &engine, &TableConfig::default());
        let filter = headers[0].filter.as_ref().unwrap();
        assert!(filter.filtered);
        assert!(filter.options.is_empty());
        assert!(headers[1].filter.is_none());
    }

    #[test]
    fn test_merge_keeps_persisting_and_drops_removed() {
        let columns: Vec<Column> = vec![status_column().into(), name_column().into()];
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let captured = warnings.clone();
        let diagnostics = Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone()));
        let mut engine = FilterEngine::new(&columns, &diagnostics);
        commit(&mut engine, &columns, "status", Some(vec!["A".into()]));
        commit(&mut engine, &columns, "name", Some(vec!["J".into()]));

        let reduced: Vec<Column> = vec![status_column().into()];
        let merged = engine.sync(&reduced, &diagnostics);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].filtered_keys, Some(vec![Key::from("A")]));
        assert_eq!(
            warnings.borrow().as_slice(),
            &[Warning::StaleColumnState { engine: "filter", column: "name".to_string() }]
        );
    }

    #[test]
    fn test_mixed_control_warns() {
        let columns: Vec<Column> = vec![
            status_column().filtered_value(None).into(),
            name_column().into(),
        ];
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let captured = warnings.clone();
        let diagnostics = Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone()));
        merge_filter_states(&columns, &[], &diagnostics);
        assert_eq!(warnings.borrow().as_slice(), &[Warning::MixedFilterControl]);
    }

    #[test]
    fn test_dropdown_staging_and_confirm() {
        let columns: Vec<Column> = vec![status_column().into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());

        engine.open("status", &[]);
        engine.toggle_key(&columns, "status", "A".into());
        engine.toggle_key(&columns, "status", "B".into());
        engine.toggle_key(&columns, "status", "B".into());
        // Staged only: nothing committed yet.
        assert_eq!(engine.states()[0].filtered_keys, None);

        let current = engine.states().to_vec();
        let commit_a = engine.confirm("status", &current).unwrap();
        assert_eq!(commit_a.filtered_keys, Some(vec![Key::from("A")]));
        let states = engine.trigger(&columns, &current, commit_a).unwrap();
        assert!(!engine.dropdown("status").unwrap().open);

        // Re-opening re-seeds from the committed state; confirming again is a no-op.
        engine.open("status", &states);
        assert_eq!(engine.dropdown("status").unwrap().staged, vec![Key::from("A")]);
        assert!(engine.confirm("status", &states).is_none());
    }

    #[test]
    fn test_confirm_empty_clears() {
        let columns: Vec<Column> = vec![status_column().into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = commit(&mut engine, &columns, "status", Some(vec!["A".into()]));

        engine.open("status", &states);
        engine.reset(&columns, "status");
        let commit = engine.confirm("status", &states).unwrap();
        assert_eq!(commit.filtered_keys, None);
    }

    #[test]
    fn test_reset_to_default_and_single_select() {
        let columns: Vec<Column> = vec![status_column()
            .default_filtered_value(vec!["B".into()])
            .filter_reset_to_default(true)
            .filter_multiple(false)
            .into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = engine.states().to_vec();
        engine.open("status", &states);
        engine.toggle_key(&columns, "status", "A".into());
        assert_eq!(engine.dropdown("status").unwrap().staged, vec![Key::from("A")]);
        engine.reset(&columns, "status");
        assert_eq!(engine.dropdown("status").unwrap().staged, vec![Key::from("B")]);
    }

    #[test]
    fn test_filter_on_close_commits() {
        let columns: Vec<Column> = vec![status_column().filter_on_close(true).into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        engine.open("status", &[]);
        engine.toggle_key(&columns, "status", "B".into());
        let current = engine.states().to_vec();
        let commit = engine.close(&columns, "status", &current).unwrap();
        assert_eq!(commit.filtered_keys, Some(vec![Key::from("B")]));

        let plain: Vec<Column> = vec![status_column().into()];
        let mut engine = FilterEngine::new(&plain, &Diagnostics::silent());
        engine.open("status", &[]);
        engine.toggle_key(&plain, "status", "B".into());
        assert!(engine.close(&plain, "status", &[]).is_none());
    }

    #[test]
    fn test_search_narrows_options_only() {
        let leaf = LeafColumn::new("City")
            .filters(vec![
                FilterItem::new("Europe", "eu").with_children(vec![
                    FilterItem::new("Lisbon", "lis"),
                    FilterItem::new("Paris", "par"),
                ]),
                FilterItem::new("Lima", "lim"),
            ])
            .filter_search(FilterSearch::Substring)
            .on_filter(|_, _| true);

        let narrowed = search_options(&leaf, "li");
        let texts: Vec<&str> = narrowed.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["Europe", "Lima"]);
        assert_eq!(narrowed[0].children.len(), 1);
        assert_eq!(narrowed[0].children[0].text, "Lisbon");
        assert_eq!(search_options(&leaf, "").len(), 2);
    }

    #[test]
    fn test_check_all_in_tree_mode() {
        let columns: Vec<Column> = vec![status_column().filter_mode(FilterMode::Tree).into()];
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        engine.open("status", &[]);
        engine.check_all(&columns, "status");
        assert_eq!(engine.dropdown("status").unwrap().staged.len(), 2);

        let headers = decorate_columns(header::from_columns(&columns), &[], &engine, &TableConfig::default());
        assert_eq!(headers[0].filter.as_ref().unwrap().check_all, Some(true));

        engine.check_all(&columns, "status");
        assert!(engine.dropdown("status").unwrap().staged.is_empty());
    }

    #[test]
    fn test_decorate_filtered_header() {
        let columns: Vec<Column> = vec![
            status_column().filter_search(FilterSearch::Substring).into(),
            LeafColumn::new("Plain").into(),
        ];
        let config = TableConfig::default();
        let mut engine = FilterEngine::new(&columns, &Diagnostics::silent());
        let states = commit(&mut engine, &columns, "status", Some(vec!["A".into()]));
        engine.open("status", &states);
        engine.set_search("status", "block");

        let headers = decorate_columns(header::from_columns(&columns), &states, &engine, &config);
        let filter = headers[0].filter.as_ref().unwrap();
        assert!(filter.filtered);
        assert!(filter.open);
        assert_eq!(filter.search.as_deref(), Some("block"));
        assert_eq!(filter.options.len(), 1);
        assert_eq!(filter.options[0].text, "Blocked");
        assert!(!filter.options[0].checked);
        assert!(headers[0].class_names.contains(&"table-column-filtered".to_string()));
        assert!(headers[1].filter.is_none());
    }
}
