/// Change coordination for tablepipe
///
/// Every user intent (sort, filter, page change) ends in exactly one
/// `ChangeEvent`. The coordinator keeps the latest snapshot of the three
/// engines' public state, overlays the partial info an intent produced, and
/// flushes the result to the registered listener.
///
/// # Ordering
///
/// 1. The partial info is merged over the last snapshot
/// 2. On reset (filter and sort actions), page-reset hooks run and the
///    reported page is forced to 1
/// 3. `current_data_source` is recomputed as `filter(sort(raw))`, i.e. the
///    rows across all pages, before pagination slicing
/// 4. The listener fires

use crate::error::TableError;
use crate::filter::{apply_filter, to_public_filters, FilterState, PublicFilters};
use crate::pagination::PaginationState;
use crate::record::Record;
use crate::sorter::{apply_sort, sorter_info, SortState, SorterInfo};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// What kind of intent produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAction {
    Sort,
    Filter,
    Paginate,
}

/// Engine state accumulated between events. `None` fields keep their
/// previous value when merged.
#[derive(Debug, Clone, Default)]
pub struct ChangeEventInfo {
    pub pagination: Option<PaginationState>,
    pub filters: Option<PublicFilters>,
    pub sorter: Option<SorterInfo>,
    pub filter_states: Option<Vec<FilterState>>,
    pub sorter_states: Option<Vec<SortState>>,
    pub reset_pagination: bool,
}

impl ChangeEventInfo {
    /// Partial info carrying new sort states and their public payload.
    pub fn from_sort(states: Vec<SortState>) -> Self {
        ChangeEventInfo {
            sorter: Some(sorter_info(&states)),
            sorter_states: Some(states),
            ..ChangeEventInfo::default()
        }
    }

    /// Partial info carrying new filter states and their public payload.
    pub fn from_filter(states: Vec<FilterState>) -> Self {
        ChangeEventInfo {
            filters: Some(to_public_filters(&states)),
            filter_states: Some(states),
            ..ChangeEventInfo::default()
        }
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Overlays every field `other` sets.
    pub fn merge(&mut self, other: ChangeEventInfo) {
        if other.pagination.is_some() {
            self.pagination = other.pagination;
        }
        if other.filters.is_some() {
            self.filters = other.filters;
        }
        if other.sorter.is_some() {
            self.sorter = other.sorter;
        }
        if other.filter_states.is_some() {
            self.filter_states = other.filter_states;
        }
        if other.sorter_states.is_some() {
            self.sorter_states = other.sorter_states;
        }
        self.reset_pagination = other.reset_pagination;
    }
}

/// Extra context handed to the listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeExtra {
    /// Sorted and filtered rows across all pages
    pub current_data_source: Vec<Record>,
    pub action: TableAction,
}

/// The externally observable change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// `None` when pagination is disabled
    pub pagination: Option<PaginationState>,
    pub filters: PublicFilters,
    pub sorter: SorterInfo,
    pub extra: ChangeExtra,
}

impl ChangeEvent {
    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub type ChangeListener = Rc<dyn Fn(&ChangeEvent)>;
pub type PageResetHook = Rc<dyn Fn()>;

/// Aggregates engine state into change events.
#[derive(Default)]
pub struct ChangeCoordinator {
    info: ChangeEventInfo,
    listener: Option<ChangeListener>,
    page_reset_hooks: Vec<PageResetHook>,
    /// Incremented on every flushed event
    generation: u64,
}

impl fmt::Debug for ChangeCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeCoordinator")
            .field("listener", &self.listener.is_some())
            .field("page_reset_hooks", &self.page_reset_hooks.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl ChangeCoordinator {
    pub fn new() -> Self {
        ChangeCoordinator::default()
    }

    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.listener = Some(Rc::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Registers a side effect (e.g. scroll to top) run whenever an action
    /// resets the page, before the listener fires.
    pub fn on_page_reset<F>(&mut self, hook: F)
    where
        F: Fn() + 'static,
    {
        self.page_reset_hooks.push(Rc::new(hook));
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Latest accumulated snapshot.
    pub fn info(&self) -> &ChangeEventInfo {
        &self.info
    }

    /// Records engine state without emitting an event.
    pub fn update(&mut self, partial: ChangeEventInfo) {
        self.info.merge(partial);
    }

    /// Merges `partial`, applies the reset rule and flushes one event.
    ///
    /// `paginate` maps the size of the recomputed data source to the
    /// pagination state to report.
    pub fn trigger_on_change<P>(
        &mut self,
        partial: ChangeEventInfo,
        action: TableAction,
        reset: bool,
        raw: &[Record],
        children_field: &str,
        paginate: P,
    ) -> ChangeEvent
    where
        P: FnOnce(usize) -> Option<PaginationState>,
    {
        self.info.merge(partial);
        self.info.reset_pagination = reset;

        if reset {
            for hook in &self.page_reset_hooks {
                hook();
            }
        }

        let sorted = apply_sort(raw, self.info.sorter_states.as_deref().unwrap_or_default(), children_field);
        let current_data_source = apply_filter(
            &sorted,
            self.info.filter_states.as_deref().unwrap_or_default(),
            children_field,
        );

        let mut pagination = paginate(current_data_source.len());
        if reset {
            if let Some(state) = pagination.as_mut() {
                state.current = 1;
            }
        }
        self.info.pagination = pagination;

        let event = ChangeEvent {
            pagination,
            filters: self.info.filters.clone().unwrap_or_default(),
            sorter: self.info.sorter.clone().unwrap_or(SorterInfo::None),
            extra: ChangeExtra {
                current_data_source,
                action,
            },
        };
        self.generation += 1;
        log::debug!(
            "change #{} ({:?}): {} row(s) in data source",
            self.generation,
            action,
            event.extra.current_data_source.len()
        );

        if let Some(listener) = &self.listener {
            listener(&event);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, FilterItem, LeafColumn, Sorter};
    use crate::diagnostics::Diagnostics;
    use crate::filter::{FilterCommit, FilterEngine};
    use crate::record::Key;
    use crate::sorter::{compute_sort_states, SortOrder};
    use std::cell::RefCell;

    fn columns() -> Vec<Column> {
        vec![
            LeafColumn::new("Age")
                .data_index("age")
                .sorter(Sorter::by_field("age"))
                .default_sort_order(SortOrder::Descend)
                .into(),
            LeafColumn::new("Status")
                .data_index("status")
                .filters(vec![FilterItem::new("Active", "A")])
                .on_filter(|value, record| {
                    record.get("status").and_then(|v| v.as_str()) == Some(value.to_string().as_str())
                })
                .into(),
        ]
    }

    fn raw() -> Vec<Record> {
        vec![
            Record::new().with("age", 20).with("status", "A"),
            Record::new().with("age", 40).with("status", "B"),
            Record::new().with("age", 30).with("status", "A"),
        ]
    }

    fn page(total: usize) -> Option<PaginationState> {
        Some(PaginationState {
            current: 4,
            page_size: 10,
            total,
        })
    }

    #[test]
    fn test_event_uses_sorted_and_filtered_source() {
        let columns = columns();
        let diagnostics = Diagnostics::silent();
        let sort_states = compute_sort_states(&columns, &[], true, &diagnostics);
        let mut filters = FilterEngine::new(&columns, &diagnostics);
        let filter_states = filters
            .trigger(
                &columns,
                &[],
                FilterCommit {
                    column_key: "status".to_string(),
                    filtered_keys: Some(vec![Key::from("A")]),
                },
            )
            .unwrap();

        let mut coordinator = ChangeCoordinator::new();
        coordinator.update(ChangeEventInfo::from_sort(sort_states));
        let event = coordinator.trigger_on_change(
            ChangeEventInfo::from_filter(filter_states),
            TableAction::Filter,
            true,
            &raw(),
            "children",
            page,
        );

        let ages: Vec<i64> = event
            .extra
            .current_data_source
            .iter()
            .filter_map(|r| r.get("age").and_then(|v| v.as_i64()))
            .collect();
        assert_eq!(ages, vec![30, 20]);
        assert_eq!(event.pagination.map(|p| (p.current, p.total)), Some((1, 2)));
        assert_eq!(event.filters.get("status"), Some(&Some(vec![Key::from("A")])));
        assert_eq!(event.extra.action, TableAction::Filter);
        assert_eq!(coordinator.generation(), 1);
    }

    #[test]
    fn test_reset_hooks_run_before_listener() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = ChangeCoordinator::new();
        let hook_log = order.clone();
        coordinator.on_page_reset(move || hook_log.borrow_mut().push("reset"));
        let listener_log = order.clone();
        coordinator.set_listener(move |_| listener_log.borrow_mut().push("listener"));

        coordinator.trigger_on_change(ChangeEventInfo::default(), TableAction::Sort, true, &raw(), "children", page);
        assert_eq!(order.borrow().as_slice(), &["reset", "listener"]);

        order.borrow_mut().clear();
        let event = coordinator.trigger_on_change(
            ChangeEventInfo::default(),
            TableAction::Paginate,
            false,
            &raw(),
            "children",
            page,
        );
        assert_eq!(order.borrow().as_slice(), &["listener"]);
        assert_eq!(event.pagination.map(|p| p.current), Some(4));
        assert_eq!(event.sorter, SorterInfo::None);
    }

    #[test]
    fn test_event_serializes() {
        let mut coordinator = ChangeCoordinator::new();
        let event = coordinator.trigger_on_change(
            ChangeEventInfo::default(),
            TableAction::Paginate,
            false,
            &raw()[..1],
            "children",
            |_| None,
        );
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["extra"]["action"], "paginate");
        assert_eq!(json["pagination"], serde_json::Value::Null);
        assert_eq!(json["extra"]["current_data_source"][0]["age"], 20);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut info = ChangeEventInfo::from_sort(Vec::new());
        info.merge(ChangeEventInfo::default().with_pagination(PaginationState {
            current: 2,
            page_size: 5,
            total: 9,
        }));
        assert_eq!(info.sorter, Some(SorterInfo::None));
        assert_eq!(info.pagination.map(|p| p.current), Some(2));
    }
}
