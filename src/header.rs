/// Decorated header tree handed to the renderer.
///
/// Decoration is a chain of stages, each taking the previous header list and
/// returning a new one: sort affordances, then filter affordances, then the
/// selection column, then title resolution.

use crate::column::{column_pos, Column, ColumnKey, TitleContext};
use crate::filter::FilterAffordance;
use crate::selection::SelectionAffordance;
use crate::sorter::{SortAffordance, SortRequest};

/// One header cell of the decorated column tree.
#[derive(Debug, Clone)]
pub struct HeaderColumn {
    pub key: ColumnKey,
    /// Source column; `None` for columns the engine adds (the selection column)
    pub column: Option<Column>,
    pub title: String,
    /// Active-state CSS hooks
    pub class_names: Vec<String>,
    pub sort: Option<SortAffordance>,
    pub filter: Option<FilterAffordance>,
    pub selection: Option<SelectionAffordance>,
    pub children: Vec<HeaderColumn>,
}

impl HeaderColumn {
    pub(crate) fn synthetic(key: impl Into<ColumnKey>) -> Self {
        HeaderColumn {
            key: key.into(),
            column: None,
            title: String::new(),
            class_names: Vec::new(),
            sort: None,
            filter: None,
            selection: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && !matches!(self.column, Some(Column::Group(_)))
    }

    /// Request produced by clicking the header.
    pub fn on_click(&self) -> Option<SortRequest> {
        self.sort.as_ref().map(|sort| sort.request.clone())
    }

    /// Request produced by a key press on the focused header. Only Enter sorts.
    pub fn on_key(&self, key: &str) -> Option<SortRequest> {
        if key == "Enter" {
            self.on_click()
        } else {
            None
        }
    }

    /// Leaf headers in display order.
    pub fn leaves(headers: &[HeaderColumn]) -> Vec<&HeaderColumn> {
        let mut out = Vec::new();
        for header in headers {
            if header.children.is_empty() {
                out.push(header);
            } else {
                out.extend(HeaderColumn::leaves(&header.children));
            }
        }
        out
    }

    /// Depth-first search by key.
    pub fn find<'a>(headers: &'a [HeaderColumn], key: &str) -> Option<&'a HeaderColumn> {
        headers.iter().find_map(|header| {
            if header.key == key {
                Some(header)
            } else {
                HeaderColumn::find(&header.children, key)
            }
        })
    }
}

/// Undecorated headers mirroring the column tree.
pub fn from_columns(columns: &[Column]) -> Vec<HeaderColumn> {
    build(columns, None)
}

fn build(columns: &[Column], parent: Option<&str>) -> Vec<HeaderColumn> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let pos = column_pos(index, parent);
            let mut header = HeaderColumn::synthetic(column.resolve_key(&pos));
            if let Column::Group(group) = column {
                header.children = build(&group.children, Some(&pos));
            }
            header.column = Some(column.clone());
            header
        })
        .collect()
}

/// Last stage: render every title against the shared sort/filter context.
pub fn resolve_titles(headers: Vec<HeaderColumn>, ctx: &TitleContext) -> Vec<HeaderColumn> {
    headers
        .into_iter()
        .map(|mut header| {
            if let Some(column) = &header.column {
                header.title = column.title().resolve(ctx);
            }
            let children = std::mem::take(&mut header.children);
            header.children = resolve_titles(children, ctx);
            header
        })
        .collect()
}
