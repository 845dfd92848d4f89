//! # List Query Adapter
//!
//! Turns a [`ListState`] plus a whitelist of searchable fields into the query
//! parameters a list endpoint expects:
//!
//! ```text
//! GET /employees?offset=0&limit=20
//!               &filter=status:VALID
//!               &filter=name___icontains:bob|email___icontains:bob
//!               &sort_by=name:ASC,hired_at:DESC
//! ```
//!
//! - Facet predicates are copied unchanged, in facet-key order.
//! - A non-empty search becomes one OR predicate over the whitelist. With an empty
//!   whitelist the search text is dropped.
//! - The sort sequence keeps its order, primary sort first.
//!
//! [`build_query_params`] is pure: identical inputs always produce identical
//! parameters, and [`QueryParams::identity`] is what the list cache keys on.

use crate::filter::Predicate;
use crate::sort::sort_to_wire;
use crate::state::ListState;
use url::form_urlencoded;

const CONTAINS_SUFFIX: &str = "___icontains";

/// Ordered `(name, value)` pairs sent with a list request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All values for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            query.append_pair(name, value);
        }
        query.finish()
    }

    /// Cache identity of this parameter set. Two parameter sets share an identity
    /// exactly when they encode to the same query string.
    #[must_use]
    pub fn identity(&self) -> String {
        self.to_query_string()
    }
}

/// Build the outgoing parameters for `state`.
///
/// Whitelist entries may be bare field names (`name`) or already carry the
/// contains operator (`name___icontains`); both search the same field.
#[must_use]
pub fn build_query_params<S: AsRef<str>>(state: &ListState, searchable_fields: &[S]) -> QueryParams {
    let mut params = QueryParams::default();
    params.push("offset", state.offset().to_string());
    params.push("limit", state.limit().to_string());

    for predicate in state.filter().values() {
        params.push("filter", predicate.to_wire());
    }

    if let Some(search) = search_predicate(state.search(), searchable_fields) {
        params.push("filter", search.to_wire());
    }

    if !state.sort_by().is_empty() {
        params.push("sort_by", sort_to_wire(state.sort_by()));
    }

    params
}

fn search_predicate<S: AsRef<str>>(search: &str, searchable_fields: &[S]) -> Option<Predicate> {
    if search.is_empty() || searchable_fields.is_empty() {
        return None;
    }
    let members = searchable_fields
        .iter()
        .map(|field| {
            let field = field.as_ref();
            let field = field.strip_suffix(CONTAINS_SUFFIX).unwrap_or(field);
            Predicate::contains(field, search)
        })
        .collect();
    Some(Predicate::AnyOf(members))
}
