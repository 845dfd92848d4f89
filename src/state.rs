//! # List State
//!
//! [`ListState`] is the filter/sort/pagination/search descriptor behind one list
//! view. It is only changed through named transitions, each of which returns a new
//! value and leaves the receiver untouched:
//!
//! | transition | effect | offset |
//! |---|---|---|
//! | [`ListState::set_search`] | replace the free-text search | reset to 0 |
//! | [`ListState::set_filter_facet`] | add or replace one facet | reset to 0 |
//! | [`ListState::clear_filter_facet`] | remove one facet | reset to 0 if the facet existed |
//! | [`ListState::set_sort`] | replace the sort sequence | kept |
//! | [`ListState::set_page`] | move to a 1-based page | `limit * (page - 1)` |
//!
//! Sorting keeps the offset so the user stays on the same page of the re-ordered
//! result set.
//!
//! ## Bookmarkable views
//!
//! [`ListState::to_query`] and [`ListState::from_query`] round-trip the state
//! through a URL query string:
//!
//! ```text
//! offset=40&limit=20&search=alice&sort_by=name:ASC&f.status=status:VALID
//! ```

use crate::config::ListConfig;
use crate::errors::ListError;
use crate::filter::Predicate;
use crate::pagination::{offset_to_page, page_to_offset};
use crate::sort::{SortDirective, parse_sort, sort_to_wire};
use std::collections::BTreeMap;
use url::form_urlencoded;

const FACET_PREFIX: &str = "f.";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListState {
    offset: u64,
    limit: u64,
    search: String,
    filter: BTreeMap<String, Predicate>,
    sort_by: Vec<SortDirective>,
}

impl ListState {
    /// Empty state on the first page.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidLimit`] when `limit` is zero.
    pub fn new(limit: u64) -> Result<Self, ListError> {
        if limit == 0 {
            return Err(ListError::InvalidLimit { limit });
        }
        Ok(Self::with_limit(limit))
    }

    /// Empty state using the configured page size, clamped into the allowed range.
    #[must_use]
    pub fn from_config(config: &ListConfig) -> Self {
        Self::with_limit(config.clamp_limit(config.page_size))
    }

    fn with_limit(limit: u64) -> Self {
        Self {
            offset: 0,
            limit,
            search: String::new(),
            filter: BTreeMap::new(),
            sort_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn filter(&self) -> &BTreeMap<String, Predicate> {
        &self.filter
    }

    #[must_use]
    pub fn facet(&self, key: &str) -> Option<&Predicate> {
        self.filter.get(key)
    }

    #[must_use]
    pub fn sort_by(&self) -> &[SortDirective] {
        &self.sort_by
    }

    /// The 1-based page number matching the current offset.
    #[must_use]
    pub fn page(&self) -> u64 {
        offset_to_page(self.offset, self.limit)
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    #[must_use]
    pub fn set_search(&self, text: impl Into<String>) -> Self {
        Self {
            offset: 0,
            search: text.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn set_filter_facet(&self, key: impl Into<String>, predicate: Predicate) -> Self {
        let mut next = self.clone();
        next.filter.insert(key.into(), predicate);
        next.offset = 0;
        next
    }

    /// Remove a facet entirely. Clearing a facet that is not set changes nothing.
    #[must_use]
    pub fn clear_filter_facet(&self, key: &str) -> Self {
        if !self.filter.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        next.filter.remove(key);
        next.offset = 0;
        next
    }

    #[must_use]
    pub fn set_sort(&self, sort_by: Vec<SortDirective>) -> Self {
        Self {
            sort_by,
            ..self.clone()
        }
    }

    /// Move to a 1-based page.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidPage`] for pages below 1 and for pages whose
    /// offset would not fit in a `u64`.
    pub fn set_page(&self, page: i64) -> Result<Self, ListError> {
        let offset = u64::try_from(page)
            .ok()
            .and_then(|p| page_to_offset(p, self.limit))
            .ok_or(ListError::InvalidPage { page })?;
        Ok(Self {
            offset,
            ..self.clone()
        })
    }

    // ============================================================================
    // URL round-trip
    // ============================================================================

    /// Encode as a URL query string (without the leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("offset", &self.offset.to_string());
        query.append_pair("limit", &self.limit.to_string());
        if !self.search.is_empty() {
            query.append_pair("search", &self.search);
        }
        if !self.sort_by.is_empty() {
            query.append_pair("sort_by", &sort_to_wire(&self.sort_by));
        }
        for (key, predicate) in &self.filter {
            query.append_pair(&format!("{FACET_PREFIX}{key}"), &predicate.to_wire());
        }
        query.finish()
    }

    /// Rebuild a state from a URL query string.
    ///
    /// Unparseable numbers fall back to defaults, a zero or oversized limit is
    /// clamped through `config`, and the offset is snapped to the start of its page
    /// so that page number and offset always agree. `page` is accepted as an
    /// alternative to `offset`.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidPredicate`] when a facet value is not a valid predicate.
    pub fn from_query(query: &str, config: &ListConfig) -> Result<Self, ListError> {
        let mut state = Self::from_config(config);
        let mut offset = None;
        let mut page = None;

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "offset" => offset = value.parse::<u64>().ok(),
                "page" => page = value.parse::<u64>().ok().filter(|p| *p >= 1),
                "limit" => {
                    if let Ok(limit) = value.parse::<u64>() {
                        state.limit = if limit == 0 {
                            config.clamp_limit(config.page_size)
                        } else {
                            config.clamp_limit(limit)
                        };
                    }
                }
                "search" => state.search = value.into_owned(),
                "sort_by" => state.sort_by = parse_sort(&value),
                other => {
                    if let Some(facet) = other.strip_prefix(FACET_PREFIX) {
                        if !facet.is_empty() {
                            state.filter.insert(facet.to_string(), value.parse()?);
                        }
                    }
                }
            }
        }

        state.offset = match (offset, page) {
            (Some(offset), _) => offset - offset % state.limit,
            (None, Some(page)) => page_to_offset(page, state.limit).unwrap_or(0),
            (None, None) => 0,
        };
        Ok(state)
    }
}
