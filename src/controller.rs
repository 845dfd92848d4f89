//! # List View Controller
//!
//! [`ListController`] ties one page together: it owns the [`ListState`], turns it
//! into query parameters on demand, fetches through a [`RemoteListResource`] and
//! keeps the rows the page should display.
//!
//! ## Last request wins
//!
//! [`ListController::begin_load`] records the identity of the current query as the
//! one the view wants and hands back a [`PendingLoad`]. Loads may resolve in any
//! order; a load only updates the displayed rows if its identity is still the
//! wanted one when it resolves.
//!
//! ```rust,ignore
//! let first = controller.begin_load();
//! controller.set_search("alice");
//! let second = controller.begin_load();
//! // even if `first` resolves last, the rows shown are those of `second`
//! tokio::join!(first.resolve(), second.resolve());
//! ```
//!
//! ## Stale while error
//!
//! A failed load keeps the previously displayed rows and records the error in
//! [`ListView::error`] for the page to show as a notification.

use crate::config::ViewContext;
use crate::errors::ListError;
use crate::events::MutationEvent;
use crate::filter::Predicate;
use crate::models::ListPage;
use crate::pagination::page_count;
use crate::query::{QueryParams, build_query_params};
use crate::resource::{QueryKey, RemoteListResource};
use crate::sort::{SortDirective, toggle_column};
use crate::state::ListState;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

struct Displayed<T> {
    wanted: Option<QueryKey>,
    shown: Option<QueryKey>,
    page: Arc<ListPage<T>>,
    error: Option<ListError>,
}

fn lock<T>(displayed: &Mutex<Displayed<T>>) -> MutexGuard<'_, Displayed<T>> {
    displayed.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a page renders from.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub items: Arc<ListPage<T>>,
    /// 1-based page of the current state
    pub page: u64,
    pub page_count: u64,
    pub is_loading: bool,
    pub is_fetching: bool,
    /// The rows belong to an earlier query than the current state
    pub is_stale: bool,
    pub error: Option<ListError>,
}

/// Outcome of resolving a [`PendingLoad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page is now displayed
    Applied,
    /// The view moved on to another query before this one resolved
    Superseded,
}

pub struct ListController<T> {
    resource: RemoteListResource<T>,
    searchable_fields: Vec<String>,
    state: ListState,
    context: ViewContext,
    displayed: Arc<Mutex<Displayed<T>>>,
}

impl<T> ListController<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new<I, S>(resource: RemoteListResource<T>, searchable_fields: I, context: ViewContext) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource,
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
            state: ListState::from_config(&context.config),
            context,
            displayed: Arc::new(Mutex::new(Displayed {
                wanted: None,
                shown: None,
                page: Arc::new(ListPage::empty()),
                error: None,
            })),
        }
    }

    /// Start from an existing state, e.g. one restored from the URL.
    #[must_use]
    pub fn with_state(mut self, state: ListState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn state(&self) -> &ListState {
        &self.state
    }

    #[must_use]
    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    #[must_use]
    pub fn resource(&self) -> &RemoteListResource<T> {
        &self.resource
    }

    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        build_query_params(&self.state, &self.searchable_fields)
    }

    // ============================================================================
    // User interactions
    // ============================================================================

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state = self.state.set_search(text);
    }

    pub fn set_filter_facet(&mut self, key: impl Into<String>, predicate: Predicate) {
        self.state = self.state.set_filter_facet(key, predicate);
    }

    pub fn clear_filter_facet(&mut self, key: &str) {
        self.state = self.state.clear_filter_facet(key);
    }

    pub fn set_sort(&mut self, sort_by: Vec<SortDirective>) {
        self.state = self.state.set_sort(sort_by);
    }

    /// Header click on a sortable column.
    pub fn toggle_sort(&mut self, column: &str) {
        self.state = self.state.set_sort(toggle_column(self.state.sort_by(), column));
    }

    /// Pagination widget moved to a 1-based page.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidPage`] for pages below 1; the state is unchanged.
    pub fn set_page(&mut self, page: i64) -> Result<(), ListError> {
        self.state = self.state.set_page(page)?;
        Ok(())
    }

    // ============================================================================
    // Loading
    // ============================================================================

    /// Mark the current query as the wanted one and return the load for it.
    #[must_use]
    pub fn begin_load(&self) -> PendingLoad<T> {
        let params = self.query_params();
        let key = self.resource.key(&params);
        lock(&self.displayed).wanted = Some(key.clone());
        PendingLoad {
            resource: self.resource.clone(),
            params,
            key,
            displayed: Arc::clone(&self.displayed),
        }
    }

    /// Load the current query and wait for it.
    ///
    /// # Errors
    /// The fetch error, if the load failed and was still wanted.
    pub async fn load(&self) -> Result<LoadOutcome, ListError> {
        self.begin_load().resolve().await
    }

    /// React to a mutation: when it concerns this list's resource, invalidate the
    /// cached pages and return a reload of the current query.
    #[must_use]
    pub fn handle_mutation(&self, event: &MutationEvent) -> Option<PendingLoad<T>> {
        if event.resource != self.resource.endpoint() {
            return None;
        }
        self.resource.invalidate();
        Some(self.begin_load())
    }

    /// Wait for the next mutation of this list's resource and return its reload.
    /// A lagged receiver reloads conservatively; a closed bus returns `None`.
    pub async fn next_mutation_reload(
        &self,
        events: &mut broadcast::Receiver<MutationEvent>,
    ) -> Option<PendingLoad<T>> {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(reload) = self.handle_mutation(&event) {
                        return Some(reload);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Mutation receiver lagged, reloading");
                    self.resource.invalidate();
                    return Some(self.begin_load());
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ListView<T> {
        let displayed = lock(&self.displayed);
        let current = self.resource.key(&self.query_params());
        let status = self.resource.cache().status(&current);
        ListView {
            items: Arc::clone(&displayed.page),
            page: self.state.page(),
            page_count: page_count(displayed.page.count, self.state.limit()),
            is_loading: status.is_loading,
            is_fetching: status.is_fetching,
            is_stale: displayed.shown.as_ref() != Some(&current),
            error: displayed.error.clone(),
        }
    }
}

/// A load started by [`ListController::begin_load`].
pub struct PendingLoad<T> {
    resource: RemoteListResource<T>,
    params: QueryParams,
    key: QueryKey,
    displayed: Arc<Mutex<Displayed<T>>>,
}

impl<T> PendingLoad<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Fetch and, if still wanted, display the result.
    ///
    /// # Errors
    /// The fetch error when this load is still the wanted one. Errors of superseded
    /// loads are dropped and reported as [`LoadOutcome::Superseded`].
    pub async fn resolve(self) -> Result<LoadOutcome, ListError> {
        let result = self.resource.fetch(&self.params).await;

        let mut displayed = lock(&self.displayed);
        if displayed.wanted.as_ref() != Some(&self.key) {
            tracing::debug!(query = %self.key.identity, "Discarding superseded list response");
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(page) => {
                displayed.page = page;
                displayed.shown = Some(self.key);
                displayed.error = None;
                Ok(LoadOutcome::Applied)
            }
            Err(err) => {
                displayed.error = Some(err.clone());
                Err(err)
            }
        }
    }
}
