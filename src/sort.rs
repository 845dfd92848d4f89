use crate::filter::{escape_into, split_unescaped, unescape};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_SORT_ORDER: &str = "ASC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Convert sort order string to a direction. Anything other than ASC sorts descending.
fn parse_order(sort_order: &str) -> SortDirection {
    if sort_order.to_uppercase() == "ASC" {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    }
}

/// One `{column, direction}` entry of a sort sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDirective {
    pub column: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction.as_str())
    }
}

/// Render a sort sequence as `col:ASC,other:DESC`, primary sort first. Column
/// names are escaped like predicate fields.
#[must_use]
pub fn sort_to_wire(sort_by: &[SortDirective]) -> String {
    let mut out = String::new();
    for (i, directive) in sort_by.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(&directive.column, &mut out);
        out.push(':');
        out.push_str(directive.direction.as_str());
    }
    out
}

/// Parse `col:ASC,other:DESC`. Entries without a direction sort ascending, empty
/// column names are skipped.
#[must_use]
pub fn parse_sort(sort: &str) -> Vec<SortDirective> {
    split_unescaped(sort, ',')
        .into_iter()
        .filter_map(|entry| {
            let parts = split_unescaped(entry, ':');
            let (column, order) = match parts.as_slice() {
                [_] => (entry, DEFAULT_SORT_ORDER),
                [.., order] => (&entry[..entry.len() - order.len() - 1], *order),
                [] => return None,
            };
            let column = unescape(column.trim());
            if column.is_empty() {
                return None;
            }
            Some(SortDirective {
                column,
                direction: parse_order(order.trim()),
            })
        })
        .collect()
}

/// Toggle a column the way a grid header click does: a new column becomes the
/// primary ascending sort, clicking the primary column again flips its direction.
#[must_use]
pub fn toggle_column(sort_by: &[SortDirective], column: &str) -> Vec<SortDirective> {
    match sort_by.first() {
        Some(primary) if primary.column == column => {
            let mut next = sort_by.to_vec();
            next[0].direction = primary.direction.reversed();
            next
        }
        _ => {
            let mut next = vec![SortDirective::asc(column)];
            next.extend(sort_by.iter().filter(|d| d.column != column).cloned());
            next
        }
    }
}
