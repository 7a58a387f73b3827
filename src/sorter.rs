/// Sort engine
///
/// Tracks per-column sort state, validates multi-column configurations and
/// orders records with a stable, prioritised comparator.
///
/// # Modes
///
/// - **Single**: one column sorts at a time. Activating a column without a
///   `multiple` priority replaces every other sort state.
/// - **Multiple**: columns declaring `Sorter::multiple(priority)` may be
///   active together; the highest priority is compared first and ties fall
///   through to lower priorities.
///
/// The two modes never mix: the first active state decides the mode and any
/// later state that does not fit is coerced to "unsorted".
///
/// # Examples
///
/// ```
/// use tablepipe::sorter::{apply_sort, compute_sort_states};
/// use tablepipe::{Column, Diagnostics, LeafColumn, Record, SortOrder, Sorter};
///
/// let columns: Vec<Column> = vec![LeafColumn::new("Age")
///     .data_index("age")
///     .sorter(Sorter::by_field("age"))
///     .default_sort_order(SortOrder::Descend)
///     .into()];
/// let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());
///
/// let records = vec![Record::new().with("age", 20), Record::new().with("age", 40)];
/// let sorted = apply_sort(&records, &states, "children");
/// assert_eq!(sorted[0].get("age").and_then(|v| v.as_i64()), Some(40));
/// ```

use crate::column::{find_column, walk_columns, Column, ColumnKey};
use crate::config::TableConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::header::HeaderColumn;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Ascend,
    /// Largest first
    Descend,
}

/// Sort state of one column.
#[derive(Debug, Clone)]
pub struct SortState {
    pub column_key: ColumnKey,
    pub column: Column,
    pub sort_order: Option<SortOrder>,
    /// `None` means the column sorts alone
    pub multiple_priority: Option<i32>,
}

impl SortState {
    fn from_column(column: &Column, column_key: ColumnKey, sort_order: Option<SortOrder>) -> Self {
        SortState {
            column_key,
            multiple_priority: column.sorter().and_then(|s| s.multiple_priority()),
            column: column.clone(),
            sort_order,
        }
    }
}

/// A request to move one column to a new direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortRequest {
    pub column_key: ColumnKey,
    pub sort_order: Option<SortOrder>,
    pub multiple_priority: Option<i32>,
}

/// Public description of one sorted column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SorterResult {
    pub column_key: Option<ColumnKey>,
    pub field: Option<Vec<String>>,
    pub order: Option<SortOrder>,
}

/// Public sorter payload of a change event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SorterInfo {
    None,
    Single(SorterResult),
    Multiple(Vec<SorterResult>),
}

fn state_to_result(state: &SortState) -> SorterResult {
    SorterResult {
        column_key: Some(state.column_key.clone()),
        field: state
            .column
            .as_leaf()
            .and_then(|leaf| leaf.get_data_index())
            .map(|path| path.to_vec()),
        order: state.sort_order,
    }
}

/// Builds the public sorter payload from a state list.
///
/// With no active sorter but some tracked state, the last state is reported
/// with an empty order so callers can tell which column was just cleared.
pub fn sorter_info(states: &[SortState]) -> SorterInfo {
    let mut active: Vec<SorterResult> = states
        .iter()
        .filter(|s| s.sort_order.is_some())
        .map(state_to_result)
        .collect();

    match active.len() {
        0 => match states.last() {
            Some(last) => SorterInfo::Single(SorterResult {
                order: None,
                ..state_to_result(last)
            }),
            None => SorterInfo::None,
        },
        1 => SorterInfo::Single(active.remove(0)),
        _ => SorterInfo::Multiple(active),
    }
}

/// Next entry in the direction cycle; past the end means "unsorted".
pub fn next_direction(directions: &[SortOrder], current: Option<SortOrder>) -> Option<SortOrder> {
    match current {
        None => directions.first().copied(),
        Some(order) => directions
            .iter()
            .position(|d| *d == order)
            .and_then(|i| directions.get(i + 1).copied()),
    }
}

/// Walks the column tree and collects sort states.
///
/// Columns with a controlled `sort_order` are always included. On `init`,
/// sortable columns with a `default_sort_order` seed a state as well.
pub fn collect_sort_states(columns: &[Column], init: bool) -> Vec<SortState> {
    let mut states = Vec::new();
    walk_columns(columns, |column, key, _| {
        if let Some(order) = column.controlled_sort_order() {
            if column.sorter().is_some() || column.children().is_some() {
                states.push(SortState::from_column(column, key, order));
            }
            return;
        }
        if let Column::Leaf(leaf) = column {
            if init && leaf.sorter.is_some() {
                if let Some(order) = leaf.default_sort_order {
                    states.push(SortState::from_column(column, key, Some(order)));
                }
            }
        }
    });
    states
}

/// Enforces "one single sorter, or only prioritised sorters".
pub fn validate_sort_states(states: Vec<SortState>, diagnostics: &Diagnostics) -> Vec<SortState> {
    let mut valid = true;
    let mut multiple_mode = false;
    let mut mode_decided = false;
    let mut validated = Vec::with_capacity(states.len());

    for state in states {
        let keep = if !mode_decided {
            if state.sort_order.is_some() {
                mode_decided = true;
                match state.multiple_priority {
                    Some(_) => multiple_mode = true,
                    None => valid = false,
                }
            }
            true
        } else if valid && multiple_mode && state.multiple_priority.is_some() {
            true
        } else {
            valid = false;
            false
        };

        if keep {
            validated.push(state);
        } else {
            if state.sort_order.is_some() {
                diagnostics.warn(Warning::MixedMultipleSort {
                    column: state.column_key.clone(),
                });
            }
            validated.push(SortState {
                sort_order: None,
                ..state
            });
        }
    }
    validated
}

/// Resolves the effective sort states for a column spec.
///
/// On init the states come from controlled orders and defaults. Afterwards,
/// controlled orders win whenever any column declares one; otherwise the
/// previous (internal) states are kept for columns that still exist and are
/// still sortable, refreshed with the current column definition.
pub fn compute_sort_states(
    columns: &[Column],
    previous: &[SortState],
    is_init: bool,
    diagnostics: &Diagnostics,
) -> Vec<SortState> {
    if is_init {
        return validate_sort_states(collect_sort_states(columns, true), diagnostics);
    }

    let collected = collect_sort_states(columns, false);
    if !collected.is_empty() {
        return validate_sort_states(collected, diagnostics);
    }

    let mut kept = Vec::with_capacity(previous.len());
    for state in previous {
        match find_column(columns, &state.column_key) {
            Some(column) if column.sorter().is_some() => {
                kept.push(SortState::from_column(column, state.column_key.clone(), state.sort_order));
            }
            _ => diagnostics.warn(Warning::StaleColumnState {
                engine: "sort",
                column: state.column_key.clone(),
            }),
        }
    }
    validate_sort_states(kept, diagnostics)
}

/// Returns a sorted copy of `records`; nested children are sorted independently.
///
/// The sort is stable: records the comparators consider equal keep their
/// original relative order.
pub fn apply_sort(records: &[Record], states: &[SortState], children_field: &str) -> Vec<Record> {
    let mut running: Vec<_> = states
        .iter()
        .filter_map(|state| {
            let compare = state.column.sorter()?.compare_fn()?;
            let order = state.sort_order?;
            Some((compare, order, state.multiple_priority.unwrap_or(0)))
        })
        .collect();

    let mut data = records.to_vec();
    if running.is_empty() {
        return data;
    }
    running.sort_by(|a, b| b.2.cmp(&a.2));

    data.sort_by(|a, b| {
        for (compare, order, _) in &running {
            let result = compare(a, b, *order);
            if result != Ordering::Equal {
                return match order {
                    SortOrder::Ascend => result,
                    SortOrder::Descend => result.reverse(),
                };
            }
        }
        Ordering::Equal
    });

    data.into_iter()
        .map(|mut record| {
            let sorted_children = record
                .children(children_field)
                .map(|children| apply_sort(children, states, children_field));
            if let Some(children) = sorted_children {
                record.set(children_field, children);
            }
            record
        })
        .collect()
}

/// Owns the internal (uncontrolled) sort states.
#[derive(Debug, Default)]
pub struct SortEngine {
    states: Vec<SortState>,
}

impl SortEngine {
    pub fn new(columns: &[Column], diagnostics: &Diagnostics) -> Self {
        SortEngine {
            states: compute_sort_states(columns, &[], true, diagnostics),
        }
    }

    /// Internal states as last written.
    pub fn states(&self) -> &[SortState] {
        &self.states
    }

    /// Recomputes the effective states for `columns`, dropping stale internal entries.
    pub fn sync(&mut self, columns: &[Column], diagnostics: &Diagnostics) -> Vec<SortState> {
        let merged = compute_sort_states(columns, &self.states, false, diagnostics);
        if collect_sort_states(columns, false).is_empty() {
            self.states = merged.clone();
        }
        merged
    }

    /// Applies a sort request on top of the current effective states.
    ///
    /// Returns the new state list, or `None` when the column is unknown or
    /// not sortable.
    pub fn trigger(
        &mut self,
        columns: &[Column],
        current: &[SortState],
        request: &SortRequest,
    ) -> Option<Vec<SortState>> {
        let column = find_column(columns, &request.column_key)?;
        column.sorter()?;
        let state = SortState {
            column_key: request.column_key.clone(),
            column: column.clone(),
            sort_order: request.sort_order,
            multiple_priority: request.multiple_priority,
        };

        let single = state.multiple_priority.is_none()
            || current.first().map_or(true, |first| first.multiple_priority.is_none());
        let states = if single {
            vec![state]
        } else {
            let mut states: Vec<SortState> = current
                .iter()
                .filter(|s| s.column_key != request.column_key)
                .cloned()
                .collect();
            states.push(state);
            states
        };

        log::debug!(
            "sort on '{}' -> {:?} ({} state(s))",
            request.column_key,
            request.sort_order,
            states.len()
        );
        self.states = states.clone();
        Some(states)
    }
}

/// Builds the request a click on `column_key`'s header would make.
pub fn request_for(
    columns: &[Column],
    states: &[SortState],
    column_key: &str,
    config: &TableConfig,
) -> Option<SortRequest> {
    let leaf = find_column(columns, column_key)?.as_leaf()?;
    let sorter = leaf.get_sorter()?;
    let current = states
        .iter()
        .find(|s| s.column_key == column_key)
        .and_then(|s| s.sort_order);
    let directions = leaf
        .sort_directions
        .as_deref()
        .unwrap_or(&config.sort_directions);
    Some(SortRequest {
        column_key: column_key.to_string(),
        sort_order: next_direction(directions, current),
        multiple_priority: sorter.multiple_priority(),
    })
}

/// Sort affordance attached to a sortable header.
#[derive(Debug, Clone, PartialEq)]
pub struct SortAffordance {
    pub order: Option<SortOrder>,
    pub directions: Vec<SortOrder>,
    pub next: Option<SortOrder>,
    pub tooltip: Option<String>,
    /// What activating the header (click or Enter) requests
    pub request: SortRequest,
}

impl SortAffordance {
    pub fn shows_up(&self) -> bool {
        self.directions.contains(&SortOrder::Ascend)
    }

    pub fn shows_down(&self) -> bool {
        self.directions.contains(&SortOrder::Descend)
    }
}

/// Attaches sort affordances and CSS hooks to sortable leaf headers.
pub fn decorate_columns(
    headers: Vec<HeaderColumn>,
    states: &[SortState],
    config: &TableConfig,
) -> Vec<HeaderColumn> {
    headers
        .into_iter()
        .map(|mut header| {
            let children = std::mem::take(&mut header.children);
            header.children = decorate_columns(children, states, config);

            let Some(leaf) = header.column.as_ref().and_then(Column::as_leaf) else {
                return header;
            };
            let Some(sorter) = leaf.get_sorter() else {
                return header;
            };

            let order = states
                .iter()
                .find(|s| s.column_key == header.key)
                .and_then(|s| s.sort_order);
            let directions = leaf
                .sort_directions
                .clone()
                .unwrap_or_else(|| config.sort_directions.clone());
            let next = next_direction(&directions, order);
            let tooltip = leaf
                .show_sorter_tooltip
                .unwrap_or(config.show_sorter_tooltip)
                .then(|| match next {
                    Some(SortOrder::Ascend) => config.locale.trigger_asc.clone(),
                    Some(SortOrder::Descend) => config.locale.trigger_desc.clone(),
                    None => config.locale.cancel_sort.clone(),
                });
            let request = SortRequest {
                column_key: header.key.clone(),
                sort_order: next,
                multiple_priority: sorter.multiple_priority(),
            };

            header.class_names.push(config.class("column-has-sorters"));
            if order.is_some() {
                header.class_names.push(config.class("column-sort"));
            }
            header.sort = Some(SortAffordance {
                order,
                directions,
                next,
                tooltip,
                request,
            });
            header
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{LeafColumn, Sorter};
    use crate::record::ColumnValue;
    use crate::header;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ages(records: &[Record]) -> Vec<i64> {
        records.iter().filter_map(|r| r.get("age").and_then(|v| v.as_i64())).collect()
    }

    fn age_column() -> LeafColumn {
        LeafColumn::new("Age").data_index("age").sorter(Sorter::by_field("age"))
    }

    #[test]
    fn test_next_direction_cycle() {
        let dirs = [SortOrder::Ascend, SortOrder::Descend];
        assert_eq!(next_direction(&dirs, None), Some(SortOrder::Ascend));
        assert_eq!(next_direction(&dirs, Some(SortOrder::Ascend)), Some(SortOrder::Descend));
        assert_eq!(next_direction(&dirs, Some(SortOrder::Descend)), None);
        assert_eq!(next_direction(&[SortOrder::Descend], None), Some(SortOrder::Descend));
        assert_eq!(next_direction(&[], None), None);
    }

    #[test]
    fn test_collect_controlled_and_default() {
        let columns: Vec<Column> = vec![
            age_column().default_sort_order(SortOrder::Ascend).into(),
            LeafColumn::new("Name")
                .data_index("name")
                .sorter(Sorter::by_field("name"))
                .sort_order(None)
                .into(),
            LeafColumn::new("Plain").data_index("plain").default_sort_order(SortOrder::Ascend).into(),
        ];

        let init = collect_sort_states(&columns, true);
        assert_eq!(init.len(), 2);
        assert_eq!(init[0].column_key, "age");
        assert_eq!(init[0].sort_order, Some(SortOrder::Ascend));
        assert_eq!(init[1].column_key, "name");

        let later = collect_sort_states(&columns, false);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].column_key, "name");
    }

    #[test]
    fn test_validate_single_clears_rest() {
        let columns: Vec<Column> = vec![
            age_column().sort_order(Some(SortOrder::Ascend)).into(),
            LeafColumn::new("Score")
                .data_index("score")
                .sorter(Sorter::by_field("score").multiple(1))
                .sort_order(Some(SortOrder::Descend))
                .into(),
        ];
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let diagnostics = Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone()));

        let states = compute_sort_states(&columns, &[], false, &diagnostics);
        assert_eq!(states[0].sort_order, Some(SortOrder::Ascend));
        assert_eq!(states[1].sort_order, None);
        assert_eq!(
            seen.borrow().as_slice(),
            &[Warning::MixedMultipleSort { column: "score".to_string() }]
        );
    }

    #[test]
    fn test_multiple_priority_order() {
        // Priorities [2, 1] on A and B: ordered by A then B.
        let columns: Vec<Column> = vec![
            LeafColumn::new("A")
                .data_index("a")
                .sorter(Sorter::by_field("a").multiple(2))
                .sort_order(Some(SortOrder::Ascend))
                .into(),
            LeafColumn::new("B")
                .data_index("b")
                .sorter(Sorter::by_field("b").multiple(1))
                .sort_order(Some(SortOrder::Descend))
                .into(),
        ];
        let states = compute_sort_states(&columns, &[], false, &Diagnostics::silent());
        assert!(states.iter().all(|s| s.sort_order.is_some()));

        let records = vec![
            Record::new().with("a", 2).with("b", 1),
            Record::new().with("a", 1).with("b", 1),
            Record::new().with("a", 1).with("b", 3),
            Record::new().with("a", 2).with("b", 5),
        ];
        let sorted = apply_sort(&records, &states, "children");
        let pairs: Vec<(i64, i64)> = sorted
            .iter()
            .map(|r| {
                (
                    r.get("a").and_then(|v| v.as_i64()).unwrap(),
                    r.get("b").and_then(|v| v.as_i64()).unwrap(),
                )
            })
            .collect();
        assert_eq!(pairs, vec![(1, 3), (1, 1), (2, 5), (2, 1)]);
    }

    #[test]
    fn test_removing_priority_collapses_to_single() {
        let columns: Vec<Column> = vec![
            LeafColumn::new("A")
                .data_index("a")
                .sorter(Sorter::by_field("a"))
                .sort_order(Some(SortOrder::Ascend))
                .into(),
            LeafColumn::new("B")
                .data_index("b")
                .sorter(Sorter::by_field("b").multiple(1))
                .sort_order(Some(SortOrder::Ascend))
                .into(),
        ];
        let states = compute_sort_states(&columns, &[], false, &Diagnostics::silent());
        assert_eq!(states[0].sort_order, Some(SortOrder::Ascend));
        assert_eq!(states[1].sort_order, None);
    }

    #[test]
    fn test_sort_is_stable() {
        let records: Vec<Record> = [(1, 30), (2, 20), (3, 30), (4, 20), (5, 30)]
            .iter()
            .map(|(k, age)| Record::new().with("key", *k).with("age", *age))
            .collect();
        let columns: Vec<Column> = vec![age_column().default_sort_order(SortOrder::Descend).into()];
        let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());

        let sorted = apply_sort(&records, &states, "children");
        let keys: Vec<i64> = sorted.iter().map(|r| r.get("key").and_then(|v| v.as_i64()).unwrap()).collect();
        assert_eq!(keys, vec![1, 3, 5, 2, 4]);
    }

    #[test]
    fn test_sort_with_nan_cells() {
        let records: Vec<Record> = (0..200i64)
            .map(|i| {
                let age = if i % 7 == 0 {
                    ColumnValue::Float(f64::NAN)
                } else if i % 2 == 0 {
                    ColumnValue::Int((i * 37) % 101)
                } else {
                    ColumnValue::Float(((i * 53) % 97) as f64 + 0.5)
                };
                Record::new().with("key", i).with("age", age)
            })
            .collect();
        let columns: Vec<Column> = vec![age_column().default_sort_order(SortOrder::Ascend).into()];
        let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());

        let sorted = apply_sort(&records, &states, "children");
        let values: Vec<f64> = sorted.iter().filter_map(|r| r.get("age").and_then(|v| v.as_f64())).collect();
        let numbers = values.iter().take_while(|v| !v.is_nan()).count();
        assert_eq!(numbers, 200 - 29);
        assert!(values[..numbers].windows(2).all(|w| w[0] <= w[1]));
        assert!(values[numbers..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_sort_recurses_into_children() {
        let records = vec![
            Record::new().with("age", 50).with(
                "children",
                vec![Record::new().with("age", 9), Record::new().with("age", 3)],
            ),
            Record::new().with("age", 10),
        ];
        let columns: Vec<Column> = vec![age_column().default_sort_order(SortOrder::Ascend).into()];
        let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());

        let sorted = apply_sort(&records, &states, "children");
        assert_eq!(ages(&sorted), vec![10, 50]);
        assert_eq!(ages(sorted[1].children("children").unwrap()), vec![3, 9]);
        // Input is untouched.
        assert_eq!(ages(&records), vec![50, 10]);
    }

    #[test]
    fn test_remote_sorter_keeps_order() {
        let columns: Vec<Column> = vec![LeafColumn::new("Age")
            .data_index("age")
            .sorter(Sorter::remote())
            .default_sort_order(SortOrder::Ascend)
            .into()];
        let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());
        assert_eq!(states.len(), 1);
        let records = vec![Record::new().with("age", 3), Record::new().with("age", 1)];
        assert_eq!(ages(&apply_sort(&records, &states, "children")), vec![3, 1]);
    }

    #[test]
    fn test_trigger_single_replaces() {
        let columns: Vec<Column> = vec![
            age_column().into(),
            LeafColumn::new("Name").data_index("name").sorter(Sorter::by_field("name")).into(),
        ];
        let diagnostics = Diagnostics::silent();
        let mut engine = SortEngine::new(&columns, &diagnostics);
        let config = TableConfig::default();

        let req = request_for(&columns, &[], "age", &config).unwrap();
        let states = engine.trigger(&columns, &[], &req).unwrap();
        let req = request_for(&columns, &states, "name", &config).unwrap();
        let states = engine.trigger(&columns, &states, &req).unwrap();

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].column_key, "name");
        assert_eq!(engine.states().len(), 1);
    }

    #[test]
    fn test_trigger_multiple_appends() {
        let columns: Vec<Column> = vec![
            LeafColumn::new("A").data_index("a").sorter(Sorter::by_field("a").multiple(2)).into(),
            LeafColumn::new("B").data_index("b").sorter(Sorter::by_field("b").multiple(1)).into(),
        ];
        let diagnostics = Diagnostics::silent();
        let mut engine = SortEngine::new(&columns, &diagnostics);
        let config = TableConfig::default();

        let req = request_for(&columns, &[], "a", &config).unwrap();
        let states = engine.trigger(&columns, &[], &req).unwrap();
        let req = request_for(&columns, &states, "b", &config).unwrap();
        let states = engine.trigger(&columns, &states, &req).unwrap();
        let req = request_for(&columns, &states, "a", &config).unwrap();
        let states = engine.trigger(&columns, &states, &req).unwrap();

        let summary: Vec<_> = states.iter().map(|s| (s.column_key.as_str(), s.sort_order)).collect();
        assert_eq!(summary, vec![("b", Some(SortOrder::Ascend)), ("a", Some(SortOrder::Descend))]);
        assert!(matches!(sorter_info(&states), SorterInfo::Multiple(ref v) if v.len() == 2));
    }

    #[test]
    fn test_sync_drops_stale_states() {
        let columns: Vec<Column> = vec![age_column().default_sort_order(SortOrder::Ascend).into()];
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let diagnostics = Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone()));
        let mut engine = SortEngine::new(&columns, &diagnostics);
        assert_eq!(engine.states().len(), 1);

        let replaced: Vec<Column> = vec![LeafColumn::new("Name").data_index("name").into()];
        let merged = engine.sync(&replaced, &diagnostics);
        assert!(merged.is_empty());
        assert!(engine.states().is_empty());
        assert_eq!(
            seen.borrow().as_slice(),
            &[Warning::StaleColumnState { engine: "sort", column: "age".to_string() }]
        );
    }

    #[test]
    fn test_sorter_info_legacy_cleared() {
        let columns: Vec<Column> = vec![age_column().into()];
        let mut engine = SortEngine::new(&columns, &Diagnostics::silent());
        let request = SortRequest {
            column_key: "age".to_string(),
            sort_order: None,
            multiple_priority: None,
        };
        let states = engine.trigger(&columns, &[], &request).unwrap();
        assert_eq!(
            sorter_info(&states),
            SorterInfo::Single(SorterResult {
                column_key: Some("age".to_string()),
                field: Some(vec!["age".to_string()]),
                order: None,
            })
        );
        assert_eq!(sorter_info(&[]), SorterInfo::None);
    }

    #[test]
    fn test_decorate_sortable_header() {
        let columns: Vec<Column> = vec![
            age_column().default_sort_order(SortOrder::Ascend).into(),
            LeafColumn::new("Name").data_index("name").into(),
        ];
        let config = TableConfig::default();
        let states = compute_sort_states(&columns, &[], true, &Diagnostics::silent());

        let headers = decorate_columns(header::from_columns(&columns), &states, &config);
        let sort = headers[0].sort.as_ref().unwrap();
        assert_eq!(sort.order, Some(SortOrder::Ascend));
        assert_eq!(sort.next, Some(SortOrder::Descend));
        assert_eq!(sort.tooltip.as_deref(), Some("Click to sort descending"));
        assert!(headers[0].class_names.contains(&"table-column-sort".to_string()));
        assert!(headers[1].sort.is_none());
        assert!(headers[1].class_names.is_empty());
    }
}
