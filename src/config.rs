/// Table-wide configuration.

use crate::error::TableError;
use crate::sorter::SortOrder;
use serde::{Deserialize, Serialize};

/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use tablepipe::TableConfig;
///
/// let config = TableConfig::from_json(r#"{"children_column_name": "items"}"#).unwrap();
/// assert_eq!(config.children_column_name, "items");
/// assert!(config.reset_page_on_sort);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Field holding a record's child rows
    pub children_column_name: String,
    /// Direction cycle for columns that don't declare their own
    pub sort_directions: Vec<SortOrder>,
    pub show_sorter_tooltip: bool,
    /// Prefix for the CSS hooks attached to decorated headers
    pub class_prefix: String,
    /// Jump back to page 1 when the sort changes
    pub reset_page_on_sort: bool,
    pub locale: TableLocale,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            children_column_name: "children".to_string(),
            sort_directions: vec![SortOrder::Ascend, SortOrder::Descend],
            show_sorter_tooltip: true,
            class_prefix: "table".to_string(),
            reset_page_on_sort: true,
            locale: TableLocale::default(),
        }
    }
}

impl TableConfig {
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// CSS hook with the configured prefix, e.g. `table-column-sort`.
    pub(crate) fn class(&self, suffix: &str) -> String {
        format!("{}-{}", self.class_prefix, suffix)
    }
}

/// Texts surfaced through the decorated headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLocale {
    pub trigger_asc: String,
    pub trigger_desc: String,
    pub cancel_sort: String,
    pub filter_title: String,
    pub filter_confirm: String,
    pub filter_reset: String,
    pub filter_empty_text: String,
    pub filter_check_all: String,
    pub filter_search_placeholder: String,
    pub select_all: String,
    pub select_invert: String,
    pub select_none: String,
}

impl Default for TableLocale {
    fn default() -> Self {
        TableLocale {
            trigger_asc: "Click to sort ascending".to_string(),
            trigger_desc: "Click to sort descending".to_string(),
            cancel_sort: "Click to cancel sorting".to_string(),
            filter_title: "Filter menu".to_string(),
            filter_confirm: "OK".to_string(),
            filter_reset: "Reset".to_string(),
            filter_empty_text: "No filters".to_string(),
            filter_check_all: "Select all items".to_string(),
            filter_search_placeholder: "Search in filters".to_string(),
            select_all: "Select current page".to_string(),
            select_invert: "Invert current page".to_string(),
            select_none: "Clear all data".to_string(),
        }
    }
}
