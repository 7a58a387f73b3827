/// Selection engine
///
/// Tracks the set of selected row keys. Bulk operations act on a *scope*,
/// the rows currently on the page by default or the whole filtered set, and
/// never touch selected keys outside that scope, so a selection survives
/// paging and filtering.
///
/// Keys are resolved back to records through the `KeyedLookupIndex` over the
/// raw data. Rows whose checkbox is disabled keep whatever state they have:
/// neither single nor bulk operations change them.
///
/// With `check_strictly(false)` selection conducts through the record tree:
/// checking a parent checks its selectable descendants, a parent shows as
/// checked when all its selectable children are, and as indeterminate when
/// only some are.

use crate::config::TableConfig;
use crate::diagnostics::Diagnostics;
use crate::header::HeaderColumn;
use crate::lookup::{flatten_keyed, KeyedLookupIndex, KeyedRow, RowKey};
use crate::record::{Key, Record};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

pub const SELECTION_COLUMN_KEY: &str = "selection-column";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    #[default]
    Checkbox,
    Radio,
}

/// Rows that bulk operations act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllScope {
    /// Rows on the current page
    #[default]
    Page,
    /// Every row passing the filters, across pages
    Filtered,
}

/// What produced a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    Single,
    Multiple,
    All,
    Invert,
    None,
}

/// Per-record checkbox options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckboxProps {
    pub disabled: bool,
}

pub type CheckboxPropsFn = Rc<dyn Fn(&Record) -> CheckboxProps>;

#[derive(Clone)]
pub struct SelectionConfig {
    pub selection_type: SelectionType,
    /// Controlled selection
    pub selected_row_keys: Option<Vec<Key>>,
    pub default_selected_row_keys: Vec<Key>,
    /// Keep keys whose records left the data set
    pub preserve_selected_row_keys: bool,
    pub check_strictly: bool,
    pub scope: SelectAllScope,
    pub hide_select_all: bool,
    pub get_checkbox_props: Option<CheckboxPropsFn>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            selection_type: SelectionType::Checkbox,
            selected_row_keys: None,
            default_selected_row_keys: Vec::new(),
            preserve_selected_row_keys: false,
            check_strictly: true,
            scope: SelectAllScope::Page,
            hide_select_all: false,
            get_checkbox_props: None,
        }
    }
}

impl fmt::Debug for SelectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionConfig")
            .field("selection_type", &self.selection_type)
            .field("selected_row_keys", &self.selected_row_keys)
            .field("preserve_selected_row_keys", &self.preserve_selected_row_keys)
            .field("check_strictly", &self.check_strictly)
            .field("scope", &self.scope)
            .finish()
    }
}

impl SelectionConfig {
    pub fn radio() -> Self {
        SelectionConfig {
            selection_type: SelectionType::Radio,
            ..SelectionConfig::default()
        }
    }

    pub fn selected_row_keys(mut self, keys: Vec<Key>) -> Self {
        self.selected_row_keys = Some(keys);
        self
    }

    pub fn default_selected_row_keys(mut self, keys: Vec<Key>) -> Self {
        self.default_selected_row_keys = keys;
        self
    }

    pub fn preserve_selected_row_keys(mut self, preserve: bool) -> Self {
        self.preserve_selected_row_keys = preserve;
        self
    }

    pub fn check_strictly(mut self, strictly: bool) -> Self {
        self.check_strictly = strictly;
        self
    }

    pub fn scope(mut self, scope: SelectAllScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn hide_select_all(mut self, hide: bool) -> Self {
        self.hide_select_all = hide;
        self
    }

    pub fn get_checkbox_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> CheckboxProps + 'static,
    {
        self.get_checkbox_props = Some(Rc::new(f));
        self
    }

    fn is_disabled(&self, record: &Record) -> bool {
        self.get_checkbox_props
            .as_ref()
            .map_or(false, |props| props(record).disabled)
    }
}

/// Payload of every selection write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionChange {
    pub keys: Vec<Key>,
    pub rows: Vec<Record>,
    pub method: SelectionMethod,
    /// Keys whose state this operation flipped
    pub changed: Vec<Key>,
    pub selected: bool,
}

/// Everything a selection operation needs to resolve keys.
pub struct SelectionContext<'a> {
    pub data: &'a Rc<Vec<Record>>,
    pub row_key: &'a RowKey,
    pub children_field: &'a str,
    pub index: &'a KeyedLookupIndex,
    pub diagnostics: &'a Diagnostics,
    /// Rows bulk operations act on
    pub scope: &'a [Record],
}

impl<'a> SelectionContext<'a> {
    pub fn record(&self, key: &Key) -> Option<&'a Record> {
        self.index
            .get_by_key(self.data, self.row_key, self.children_field, key, self.diagnostics)
    }

    fn scope_rows(&self) -> Vec<KeyedRow> {
        flatten_keyed(self.scope, self.row_key, self.children_field, self.diagnostics)
    }

    fn all_rows(&self) -> Vec<KeyedRow> {
        flatten_keyed(self.data, self.row_key, self.children_field, self.diagnostics)
    }
}

struct Conduction {
    checked: Vec<Key>,
    half: HashSet<Key>,
}

/// Propagates `seed` down to selectable descendants and up to parents.
fn conduct(seed: &[Key], rows: &[KeyedRow], disabled: impl Fn(&Record) -> bool) -> Conduction {
    let mut checked: HashSet<Key> = seed.iter().cloned().collect();
    for row in rows {
        if let Some(parent) = &row.parent {
            if checked.contains(parent) && !disabled(&row.record) {
                checked.insert(row.key.clone());
            }
        }
    }

    let mut children: HashMap<&Key, Vec<&KeyedRow>> = HashMap::new();
    for row in rows {
        if let Some(parent) = &row.parent {
            children.entry(parent).or_default().push(row);
        }
    }

    let mut half = HashSet::new();
    for row in rows.iter().rev() {
        let Some(kids) = children.get(&row.key) else {
            continue;
        };
        let selectable: Vec<_> = kids.iter().filter(|k| !disabled(&k.record)).collect();
        if selectable.is_empty() {
            continue;
        }
        let all = selectable.iter().all(|k| checked.contains(&k.key));
        let any = kids
            .iter()
            .any(|k| checked.contains(&k.key) || half.contains(&k.key));
        if all && !disabled(&row.record) {
            checked.insert(row.key.clone());
        } else if any && !checked.contains(&row.key) {
            half.insert(row.key.clone());
        }
    }

    let mut ordered = Vec::with_capacity(checked.len());
    let mut seen = HashSet::new();
    for key in seed.iter().chain(rows.iter().map(|row| &row.key)) {
        if checked.contains(key) && seen.insert(key.clone()) {
            ordered.push(key.clone());
        }
    }
    Conduction {
        checked: ordered,
        half,
    }
}

/// Selectable descendants of `key` plus all its ancestors.
fn conduction_closure(key: &Key, rows: &[KeyedRow], disabled: impl Fn(&Record) -> bool) -> HashSet<Key> {
    let mut closure = HashSet::new();
    closure.insert(key.clone());
    if let Some(pos) = rows.iter().position(|row| &row.key == key) {
        let depth = rows[pos].depth;
        closure.extend(
            rows[pos + 1..]
                .iter()
                .take_while(|row| row.depth > depth)
                .filter(|row| !disabled(&row.record))
                .map(|row| row.key.clone()),
        );
        let parents: HashMap<&Key, &Key> = rows
            .iter()
            .filter_map(|row| row.parent.as_ref().map(|p| (&row.key, p)))
            .collect();
        let mut cursor = parents.get(key).copied();
        while let Some(parent) = cursor {
            closure.insert(parent.clone());
            cursor = parents.get(parent).copied();
        }
    }
    closure
}

/// Owns the internal selection and the last-toggled anchor for range selects.
#[derive(Debug)]
pub struct SelectionEngine {
    config: SelectionConfig,
    internal: Vec<Key>,
    preserved: HashMap<Key, Record>,
    anchor: Option<Key>,
}

impl SelectionEngine {
    pub fn new(config: SelectionConfig) -> Self {
        SelectionEngine {
            internal: config.default_selected_row_keys.clone(),
            config,
            preserved: HashMap::new(),
            anchor: None,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SelectionConfig) {
        self.config = config;
    }

    /// Switches the controlled selection on (`Some`) or off (`None`).
    pub fn set_controlled(&mut self, keys: Option<Vec<Key>>) {
        self.config.selected_row_keys = keys;
    }

    fn stored_keys(&self) -> &[Key] {
        self.config
            .selected_row_keys
            .as_deref()
            .unwrap_or(&self.internal)
    }

    fn conducted(&self, keys: &[Key], ctx: &SelectionContext<'_>) -> Conduction {
        conduct(keys, &ctx.all_rows(), |record| self.config.is_disabled(record))
    }

    /// Effective selection, conducted through the tree when not strict.
    pub fn selected_keys(&self, ctx: &SelectionContext<'_>) -> Vec<Key> {
        if self.config.check_strictly {
            self.stored_keys().to_vec()
        } else {
            self.conducted(self.stored_keys(), ctx).checked
        }
    }

    pub fn is_selected(&self, key: &Key, ctx: &SelectionContext<'_>) -> bool {
        if self.config.check_strictly {
            self.stored_keys().contains(key)
        } else {
            self.selected_keys(ctx).contains(key)
        }
    }

    fn key_disabled(&self, key: &Key, ctx: &SelectionContext<'_>) -> bool {
        ctx.record(key)
            .map_or(false, |record| self.config.is_disabled(record))
    }

    /// Selectable keys of the scope, in display order.
    fn scope_targets(&self, ctx: &SelectionContext<'_>) -> Vec<Key> {
        ctx.scope_rows()
            .into_iter()
            .filter(|row| !self.config.is_disabled(&row.record))
            .map(|row| row.key)
            .collect()
    }

    /// Writes a new selection and builds the change payload.
    ///
    /// Keys without a record in the data are dropped unless
    /// `preserve_selected_row_keys` is set, in which case their last-seen
    /// records are reported instead.
    fn commit(
        &mut self,
        keys: Vec<Key>,
        method: SelectionMethod,
        changed: Vec<Key>,
        selected: bool,
        ctx: &SelectionContext<'_>,
    ) -> SelectionChange {
        let keys: Vec<Key> = if self.config.preserve_selected_row_keys {
            for key in &keys {
                if let Some(record) = ctx.record(key) {
                    self.preserved.insert(key.clone(), record.clone());
                }
            }
            self.preserved.retain(|key, _| keys.contains(key));
            keys
        } else {
            keys.into_iter().filter(|key| ctx.record(key).is_some()).collect()
        };
        let rows = keys
            .iter()
            .filter_map(|key| ctx.record(key).or_else(|| self.preserved.get(key)).cloned())
            .collect();

        log::debug!("selection {:?}: {} key(s) selected", method, keys.len());
        self.internal = keys.clone();
        SelectionChange {
            keys,
            rows,
            method,
            changed,
            selected,
        }
    }

    /// Replaces the selection. Disabled rows keep their current state.
    pub fn set_all(&mut self, keys: Vec<Key>, ctx: &SelectionContext<'_>) -> SelectionChange {
        let current = self.selected_keys(ctx);
        let mut next: Vec<Key> = current
            .iter()
            .filter(|key| self.key_disabled(key, ctx))
            .cloned()
            .collect();
        for key in keys {
            let allowed = !self.key_disabled(&key, ctx);
            if allowed && !next.contains(&key) {
                next.push(key);
            }
        }
        let changed = next
            .iter()
            .filter(|k| !current.contains(k))
            .chain(current.iter().filter(|k| !next.contains(k)))
            .cloned()
            .collect();
        let next = self.normalize(next, ctx);
        let selected = !next.is_empty();
        self.commit(next, SelectionMethod::Multiple, changed, selected, ctx)
    }

    fn normalize(&self, keys: Vec<Key>, ctx: &SelectionContext<'_>) -> Vec<Key> {
        if self.config.check_strictly {
            keys
        } else {
            self.conducted(&keys, ctx).checked
        }
    }

    /// Flips one row. Radio selection replaces the set instead.
    ///
    /// Returns `None` for disabled rows.
    pub fn toggle(&mut self, key: &Key, ctx: &SelectionContext<'_>) -> Option<SelectionChange> {
        if self.key_disabled(key, ctx) {
            return None;
        }
        self.anchor = Some(key.clone());

        if self.config.selection_type == SelectionType::Radio {
            return Some(self.commit(vec![key.clone()], SelectionMethod::Single, vec![key.clone()], true, ctx));
        }

        let current = self.selected_keys(ctx);
        let selected = !current.contains(key);
        let next = if self.config.check_strictly {
            if selected {
                current.into_iter().chain(std::iter::once(key.clone())).collect()
            } else {
                current.into_iter().filter(|k| k != key).collect()
            }
        } else {
            let rows = ctx.all_rows();
            let disabled = |record: &Record| self.config.is_disabled(record);
            if selected {
                let mut seed = current;
                seed.push(key.clone());
                conduct(&seed, &rows, disabled).checked
            } else {
                let removed = conduction_closure(key, &rows, disabled);
                let seed: Vec<Key> = current.into_iter().filter(|k| !removed.contains(k)).collect();
                conduct(&seed, &rows, disabled).checked
            }
        };
        Some(self.commit(next, SelectionMethod::Single, vec![key.clone()], selected, ctx))
    }

    /// Header checkbox: selects every selectable scope row, or clears them
    /// when they are all selected already.
    pub fn select_all(&mut self, ctx: &SelectionContext<'_>) -> Option<SelectionChange> {
        if self.config.selection_type == SelectionType::Radio {
            return None;
        }
        let current = self.selected_keys(ctx);
        let targets = self.scope_targets(ctx);
        let all_checked = !targets.is_empty() && targets.iter().all(|k| current.contains(k));

        let (next, changed) = if all_checked {
            let next = current.into_iter().filter(|k| !targets.contains(k)).collect();
            (next, targets)
        } else {
            let changed: Vec<Key> = targets.into_iter().filter(|k| !current.contains(k)).collect();
            let next = current.into_iter().chain(changed.iter().cloned()).collect();
            (next, changed)
        };
        let next = self.normalize(next, ctx);
        Some(self.commit(next, SelectionMethod::All, changed, !all_checked, ctx))
    }

    /// Flips every selectable scope row.
    pub fn select_invert(&mut self, ctx: &SelectionContext<'_>) -> Option<SelectionChange> {
        if self.config.selection_type == SelectionType::Radio {
            return None;
        }
        let current = self.selected_keys(ctx);
        let targets = self.scope_targets(ctx);
        let mut next: Vec<Key> = current.iter().filter(|k| !targets.contains(k)).cloned().collect();
        next.extend(targets.iter().filter(|k| !current.contains(k)).cloned());
        let next = self.normalize(next, ctx);
        let selected = targets.iter().any(|k| next.contains(k));
        Some(self.commit(next, SelectionMethod::Invert, targets, selected, ctx))
    }

    /// Clears the selection except for disabled rows of the scope.
    pub fn select_none(&mut self, ctx: &SelectionContext<'_>) -> Option<SelectionChange> {
        if self.config.selection_type == SelectionType::Radio {
            return None;
        }
        let current = self.selected_keys(ctx);
        let locked: HashSet<Key> = ctx
            .scope_rows()
            .into_iter()
            .filter(|row| self.config.is_disabled(&row.record))
            .map(|row| row.key)
            .collect();
        let (kept, changed): (Vec<Key>, Vec<Key>) = current.into_iter().partition(|k| locked.contains(k));
        Some(self.commit(kept, SelectionMethod::None, changed, false, ctx))
    }

    /// Shift-click: sets every selectable row between the last toggled row
    /// and `key` to the new state of `key`.
    pub fn select_range(&mut self, key: &Key, ctx: &SelectionContext<'_>) -> Option<SelectionChange> {
        if self.key_disabled(key, ctx) {
            return None;
        }
        let rows = ctx.scope_rows();
        let target = rows.iter().position(|row| &row.key == key);
        let anchor = self
            .anchor
            .as_ref()
            .and_then(|anchor| rows.iter().position(|row| &row.key == anchor));
        let (Some(target), Some(anchor)) = (target, anchor) else {
            return self.toggle(key, ctx);
        };
        if self.config.selection_type == SelectionType::Radio {
            return self.toggle(key, ctx);
        }

        let (lo, hi) = if anchor <= target { (anchor, target) } else { (target, anchor) };
        let range: Vec<Key> = rows[lo..=hi]
            .iter()
            .filter(|row| !self.config.is_disabled(&row.record))
            .map(|row| row.key.clone())
            .collect();

        let current = self.selected_keys(ctx);
        let selected = !current.contains(key);
        let next = if selected {
            let added: Vec<Key> = range.iter().filter(|k| !current.contains(k)).cloned().collect();
            current.into_iter().chain(added).collect()
        } else {
            current.into_iter().filter(|k| !range.contains(k)).collect()
        };
        let next = self.normalize(next, ctx);
        self.anchor = Some(key.clone());
        Some(self.commit(next, SelectionMethod::Multiple, range, selected, ctx))
    }

    /// Checkbox state of one row.
    pub fn cell(&self, key: &Key, ctx: &SelectionContext<'_>) -> SelectionCell {
        let disabled = self.key_disabled(key, ctx);
        if self.config.check_strictly {
            return SelectionCell {
                checked: self.stored_keys().contains(key),
                indeterminate: false,
                disabled,
            };
        }
        let conduction = self.conducted(self.stored_keys(), ctx);
        SelectionCell {
            checked: conduction.checked.contains(key),
            indeterminate: conduction.half.contains(key),
            disabled,
        }
    }

    /// Header checkbox and menu state for the current scope.
    pub fn affordance(&self, ctx: &SelectionContext<'_>, config: &TableConfig) -> SelectionAffordance {
        let current = self.selected_keys(ctx);
        let targets = self.scope_targets(ctx);
        let checked = !targets.is_empty() && targets.iter().all(|k| current.contains(k));
        let indeterminate = !checked && targets.iter().any(|k| current.contains(k));
        let radio = self.config.selection_type == SelectionType::Radio;

        let menu = if radio {
            Vec::new()
        } else {
            vec![
                SelectionMenuItem {
                    method: SelectionMethod::All,
                    text: config.locale.select_all.clone(),
                },
                SelectionMenuItem {
                    method: SelectionMethod::Invert,
                    text: config.locale.select_invert.clone(),
                },
                SelectionMenuItem {
                    method: SelectionMethod::None,
                    text: config.locale.select_none.clone(),
                },
            ]
        };
        SelectionAffordance {
            selection_type: self.config.selection_type,
            checked,
            indeterminate,
            disabled: targets.is_empty(),
            hide_select_all: radio || self.config.hide_select_all,
            menu,
        }
    }
}

/// Checkbox state of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionCell {
    pub checked: bool,
    pub indeterminate: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMenuItem {
    pub method: SelectionMethod,
    pub text: String,
}

/// Header affordance of the selection column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionAffordance {
    pub selection_type: SelectionType,
    pub checked: bool,
    pub indeterminate: bool,
    /// No selectable rows in scope
    pub disabled: bool,
    pub hide_select_all: bool,
    pub menu: Vec<SelectionMenuItem>,
}

/// Prepends the selection column.
pub fn decorate_columns(
    headers: Vec<HeaderColumn>,
    affordance: SelectionAffordance,
    config: &TableConfig,
) -> Vec<HeaderColumn> {
    let mut column = HeaderColumn::synthetic(SELECTION_COLUMN_KEY);
    column.class_names.push(config.class("selection-column"));
    column.selection = Some(affordance);

    let mut decorated = Vec::with_capacity(headers.len() + 1);
    decorated.push(column);
    decorated.extend(headers);
    decorated
}
