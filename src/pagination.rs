/// Pagination engine
///
/// Computes the page window over the sorted-and-filtered records. The page
/// number is always clamped into `[1, max_page]`, so a filter that shrinks
/// the result set never leaves the table on an empty page.
///
/// Declared totals larger than the local record count indicate server-driven
/// paging, where the caller already hands over only the current page. See
/// `PaginationConfig::server_side` for making that explicit.

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::TableError;
use crate::record::Record;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Caller-side pagination options. `Some` in `current`/`page_size` makes that
/// value controlled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub current: Option<usize>,
    pub page_size: Option<usize>,
    /// Declared total; defaults to the local record count
    pub total: Option<usize>,
    pub default_current: usize,
    pub default_page_size: usize,
    /// `Some(true)`: data is already windowed by the caller.
    /// `Some(false)`: always slice locally. `None`: infer from `total`.
    pub server_side: Option<bool>,
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            current: None,
            page_size: None,
            total: None,
            default_current: 1,
            default_page_size: DEFAULT_PAGE_SIZE,
            server_side: None,
            page_size_options: vec![10, 20, 50, 100],
        }
    }
}

impl PaginationConfig {
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn current(mut self, current: usize) -> Self {
        self.current = Some(current);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn server_side(mut self, server_side: bool) -> Self {
        self.server_side = Some(server_side);
        self
    }
}

/// Effective pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current: usize,
    pub page_size: usize,
    pub total: usize,
}

impl PaginationState {
    /// Last page with rows; 1 for an empty set.
    pub fn max_page(&self) -> usize {
        max_page(self.total, self.page_size)
    }

    /// Index range of the window, before clipping to the data length.
    pub fn window(&self) -> (usize, usize) {
        let start = (self.current.max(1) - 1) * self.page_size;
        (start, start + self.page_size)
    }
}

fn max_page(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    ((total + page_size - 1) / page_size).max(1)
}

/// Resolves the effective window for `data_total` records.
///
/// Controlled values take precedence over the internal ones; `current` is
/// clamped to the last page.
pub fn compute_pagination(
    data_total: usize,
    internal: &PaginationState,
    config: &PaginationConfig,
) -> PaginationState {
    let page_size = config.page_size.unwrap_or(internal.page_size).max(1);
    let total = config.total.unwrap_or(data_total);
    let current = config.current.unwrap_or(internal.current).max(1);
    PaginationState {
        current: current.min(max_page(total, page_size)),
        page_size,
        total,
    }
}

fn window(records: &[Record], state: &PaginationState) -> Vec<Record> {
    let (start, end) = state.window();
    let end = end.min(records.len());
    if start >= end {
        return Vec::new();
    }
    records[start..end].to_vec()
}

/// Cuts the current page out of `records`.
pub fn slice(
    records: &[Record],
    state: &PaginationState,
    config: &PaginationConfig,
    diagnostics: &Diagnostics,
) -> Vec<Record> {
    match config.server_side {
        Some(true) => records.to_vec(),
        Some(false) => window(records, state),
        None => match config.total {
            Some(total) if records.len() < total => {
                if records.len() > state.page_size {
                    diagnostics.warn(Warning::AsyncPaginationMismatch {
                        data_len: records.len(),
                        total,
                        page_size: state.page_size,
                    });
                    window(records, state)
                } else {
                    records.to_vec()
                }
            }
            _ => window(records, state),
        },
    }
}

/// Owns the internal (uncontrolled) page and page size.
#[derive(Debug, Clone)]
pub struct PaginationEngine {
    internal: PaginationState,
}

impl Default for PaginationEngine {
    fn default() -> Self {
        PaginationEngine::new(&PaginationConfig::default())
    }
}

impl PaginationEngine {
    pub fn new(config: &PaginationConfig) -> Self {
        PaginationEngine {
            internal: PaginationState {
                current: config.default_current.max(1),
                page_size: config.default_page_size.max(1),
                total: 0,
            },
        }
    }

    pub fn internal(&self) -> &PaginationState {
        &self.internal
    }

    /// Effective state for `data_total` records.
    pub fn state(&self, data_total: usize, config: &PaginationConfig) -> PaginationState {
        compute_pagination(data_total, &self.internal, config)
    }

    /// Writes back a clamped page so the next event reports it.
    pub fn sync(&mut self, effective: &PaginationState) {
        if self.internal.current != effective.current {
            log::debug!(
                "page {} out of range, clamped to {}",
                self.internal.current,
                effective.current
            );
            self.internal.current = effective.current;
        }
        self.internal.total = effective.total;
    }

    /// Moves to `current`, optionally with a new page size.
    pub fn change(&mut self, current: usize, page_size: Option<usize>) {
        self.internal.current = current.max(1);
        if let Some(size) = page_size {
            self.internal.page_size = size.max(1);
        }
    }

    /// Jumps back to `current` (page 1 by default).
    pub fn reset(&mut self, current: Option<usize>, page_size: Option<usize>) {
        self.change(current.unwrap_or(1), page_size);
    }
}
