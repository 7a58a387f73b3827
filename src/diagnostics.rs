/// Development-time consistency warnings.
///
/// Warnings are advisory: they are logged through the `log` facade and
/// handed to an optional sink, and never alter what an engine returns.

use crate::record::Key;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// A data-consistency problem detected while recomputing table state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("{engine} state references column '{column}' which no longer exists; dropped")]
    StaleColumnState { engine: &'static str, column: String },

    #[error("column '{column}' mixes a prioritised multi-sort with a single sorter; its order was cleared")]
    MixedMultipleSort { column: String },

    #[error("columns should all contain `filtered_value` or none of them should")]
    MixedFilterControl,

    #[error("duplicate row key '{key}'; the last record with this key wins")]
    DuplicateRowKey { key: String },

    #[error("record at index {index} has no '{field}' field; falling back to its index as key")]
    MissingRowKey { field: String, index: usize },

    #[error(
        "data length {data_len} is less than pagination total {total} but larger than page size {page_size}; \
         slicing locally"
    )]
    AsyncPaginationMismatch {
        data_len: usize,
        total: usize,
        page_size: usize,
    },
}

/// Injectable receiver for warnings.
pub type WarningSink = Rc<dyn Fn(&Warning)>;

/// Warning channel shared by the engines.
#[derive(Clone)]
pub struct Diagnostics {
    enabled: bool,
    sink: Option<WarningSink>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            enabled: cfg!(debug_assertions),
            sink: None,
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.enabled)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Diagnostics {
    /// A channel that drops everything.
    pub fn silent() -> Self {
        Diagnostics {
            enabled: false,
            sink: None,
        }
    }

    /// Enabled channel forwarding every warning to `sink` as well as the log.
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&Warning) + 'static,
    {
        Diagnostics {
            enabled: true,
            sink: Some(Rc::new(sink)),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn warn(&self, warning: Warning) {
        if !self.enabled {
            return;
        }
        log::warn!("{}", warning);
        if let Some(sink) = &self.sink {
            sink(&warning);
        }
    }

    pub(crate) fn warn_duplicate_key(&self, key: &Key) {
        self.warn(Warning::DuplicateRowKey {
            key: key.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_sink_receives_warnings() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let captured = seen.clone();
        let diagnostics = Diagnostics::with_sink(move |w| captured.borrow_mut().push(w.clone()));

        diagnostics.warn(Warning::MixedFilterControl);
        assert_eq!(seen.borrow().as_slice(), &[Warning::MixedFilterControl]);
    }

    #[test]
    fn test_disabled_channel_is_quiet() {
        let seen = Rc::new(RefCell::new(0));
        let captured = seen.clone();
        let mut diagnostics = Diagnostics::with_sink(move |_| *captured.borrow_mut() += 1);
        diagnostics.set_enabled(false);

        diagnostics.warn(Warning::MixedFilterControl);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_warning_messages() {
        let w = Warning::DuplicateRowKey { key: "7".to_string() };
        assert_eq!(w.to_string(), "duplicate row key '7'; the last record with this key wins");
    }
}
