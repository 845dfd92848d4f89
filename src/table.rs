//! # Tabular Presentation
//!
//! [`Table`] renders rows from column descriptors. It keeps no row state: every
//! call to [`Table::render`] works from the items it is given.
//!
//! - Columns can be hidden and shown again, or restricted to users holding a
//!   permission from the [`ViewContext`] profile.
//! - Row actions (`cancel`, `edit`, ...) can depend on a per-row flag such as
//!   `can_cancel`, read through [`RowFlags`].
//! - [`Table::apply_local`] filters, sorts and paginates small static datasets on
//!   the client using the same [`ListState`] a server-backed list would send.

use crate::config::ViewContext;
use crate::filter::Predicate;
use crate::pagination::summary;
use crate::sort::SortDirection;
use crate::state::ListState;
use std::cmp::Ordering;
use std::fmt;

type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Row-level permission flags, e.g. `can_cancel` or `can_edit`.
pub trait RowFlags {
    fn flag(&self, name: &str) -> bool;
}

impl RowFlags for serde_json::Value {
    fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(serde_json::Value::as_bool).unwrap_or(false)
    }
}

pub struct Column<T> {
    key: String,
    title: String,
    cell: CellFn<T>,
    sortable: bool,
    visible: bool,
    permission: Option<String>,
}

impl<T> Column<T> {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            cell: Box::new(cell),
            sortable: false,
            visible: true,
            permission: None,
        }
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Only shown to users holding `permission`.
    #[must_use]
    pub fn requires(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    fn shown_to(&self, ctx: &ViewContext) -> bool {
        self.visible
            && self
                .permission
                .as_deref()
                .is_none_or(|p| ctx.profile.has_permission(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub name: String,
    /// Row flag that must be set for the action to be enabled
    pub flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAction {
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub cells: Vec<String>,
    pub actions: Vec<RenderedAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
    pub loading: bool,
    pub footer: Option<String>,
}

impl RenderedTable {
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_cells(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        if self.loading && self.rows.is_empty() {
            writeln!(f, "Loading...")?;
        }
        for row in &self.rows {
            write_cells(f, &row.cells, &widths)?;
        }
        if let Some(footer) = &self.footer {
            writeln!(f, "{footer}")?;
        }
        Ok(())
    }
}

fn write_cells(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{}", line.trim_end())
}

pub struct Table<T> {
    columns: Vec<Column<T>>,
    actions: Vec<RowAction>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn action(mut self, name: impl Into<String>, flag: Option<&str>) -> Self {
        self.actions.push(RowAction {
            name: name.into(),
            flag: flag.map(str::to_string),
        });
        self
    }

    /// Flip a column's visibility. Returns the new visibility, or `None` for an unknown key.
    pub fn toggle_column(&mut self, key: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|c| c.key == key)?;
        column.visible = !column.visible;
        Some(column.visible)
    }

    fn find(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Keys of the columns `ctx` may see, in display order.
    #[must_use]
    pub fn visible_columns(&self, ctx: &ViewContext) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.shown_to(ctx))
            .map(|c| c.key.as_str())
            .collect()
    }

    pub fn render(&self, items: &[T], ctx: &ViewContext, loading: bool) -> RenderedTable
    where
        T: RowFlags,
    {
        let columns: Vec<&Column<T>> = self.columns.iter().filter(|c| c.shown_to(ctx)).collect();
        let rows = items
            .iter()
            .map(|item| RenderedRow {
                cells: columns.iter().map(|c| (c.cell)(item)).collect(),
                actions: self
                    .actions
                    .iter()
                    .map(|action| RenderedAction {
                        name: action.name.clone(),
                        enabled: action.flag.as_deref().is_none_or(|flag| item.flag(flag)),
                    })
                    .collect(),
            })
            .collect();
        RenderedTable {
            headers: columns.iter().map(|c| c.title.clone()).collect(),
            rows,
            loading,
            footer: None,
        }
    }

    /// Render one page of a static dataset: filter, sort and paginate `items` by
    /// `state`, then add a `resource offset-last/total` footer.
    pub fn render_local(
        &self,
        items: &[T],
        state: &ListState,
        ctx: &ViewContext,
        resource_name: &str,
    ) -> RenderedTable
    where
        T: RowFlags + Clone,
    {
        let (page, total) = self.apply_local(items, state);
        let page: Vec<T> = page.into_iter().cloned().collect();
        let footer = summary(state.offset(), page.len() as u64, total, resource_name);
        self.render(&page, ctx, false).with_footer(footer)
    }

    /// Client-side filter, search, sort and paginate. Returns the page and the
    /// total number of matching rows.
    ///
    /// Predicate fields and sort columns refer to column keys. Search matches any
    /// column case-insensitively. Sort columns that are unknown or not sortable are
    /// ignored.
    pub fn apply_local<'a>(&self, items: &'a [T], state: &ListState) -> (Vec<&'a T>, u64) {
        let needle = state.search().to_lowercase();
        let mut matching: Vec<&T> = items
            .iter()
            .filter(|item| state.filter().values().all(|p| self.matches(item, p)))
            .filter(|item| {
                needle.is_empty()
                    || self
                        .columns
                        .iter()
                        .any(|c| (c.cell)(item).to_lowercase().contains(&needle))
            })
            .collect();

        let sorters: Vec<(&Column<T>, SortDirection)> = state
            .sort_by()
            .iter()
            .filter_map(|d| {
                self.find(&d.column)
                    .filter(|c| c.sortable)
                    .map(|c| (c, d.direction))
            })
            .collect();
        if !sorters.is_empty() {
            matching.sort_by(|a, b| {
                sorters
                    .iter()
                    .map(|(column, direction)| {
                        let ord = compare_cells(&(column.cell)(a), &(column.cell)(b));
                        match direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(state.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(state.limit()).unwrap_or(usize::MAX))
            .collect();
        (page, total)
    }

    fn matches(&self, item: &T, predicate: &Predicate) -> bool {
        let cell = |field: &str| self.find(field).map(|c| (c.cell)(item));
        match predicate {
            Predicate::Equals { field, value } => cell(field).is_some_and(|v| v == *value),
            Predicate::In { field, values } => cell(field).is_some_and(|v| values.contains(&v)),
            Predicate::Contains { field, value } => cell(field)
                .is_some_and(|v| v.to_lowercase().contains(&value.to_lowercase())),
            Predicate::IsEmpty { field, empty } => {
                cell(field).is_some_and(|v| v.trim().is_empty() == *empty)
            }
            Predicate::AnyOf(members) => members.iter().any(|p| self.matches(item, p)),
        }
    }
}

/// Numeric cells compare as numbers, everything else as text.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}
