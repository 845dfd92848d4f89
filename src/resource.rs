//! # Remote List Resource
//!
//! Fetches list pages through a [`ListTransport`] and caches them by query
//! identity.
//!
//! - Identical requests issued while one is in flight share that request and its
//!   result, success or error.
//! - A resolved page is served from the cache until its resource tag is
//!   invalidated. Invalidated entries keep their data visible while the refetch
//!   runs (`is_loading == false`, `is_fetching == true`).
//! - Failures are not retried and not cached; the next fetch of that identity
//!   goes back to the network.
//!
//! [`ListCache`] is a cheap-to-clone handle. Hand one clone to every resource of the
//! same row type to share entries across views; the entries live until the last
//! clone is dropped.

use crate::errors::ListError;
use crate::models::{ListPage, decode_list};
use crate::query::QueryParams;
use crate::transport::ListTransport;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

type FetchResult<T> = Result<Arc<ListPage<T>>, ListError>;
type InFlight<T> = Arc<OnceCell<FetchResult<T>>>;

/// Full identity of a list request: endpoint plus encoded parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: String,
    pub identity: String,
}

/// Request lifecycle flags for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchStatus {
    /// In flight with nothing cached yet
    pub is_loading: bool,
    /// Any request in flight, including refetches of cached data
    pub is_fetching: bool,
}

struct Entry<T> {
    data: Option<Arc<ListPage<T>>>,
    stale: bool,
    inflight: Option<InFlight<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            stale: false,
            inflight: None,
        }
    }
}

pub struct ListCache<T> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<T>>>>,
}

impl<T> Clone for ListCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn status(&self, key: &QueryKey) -> FetchStatus {
        self.lock().get(key).map_or_else(FetchStatus::default, |entry| {
            let is_fetching = entry.inflight.is_some();
            FetchStatus {
                is_loading: is_fetching && entry.data.is_none(),
                is_fetching,
            }
        })
    }

    /// Last resolved page for `key`, stale or not.
    #[must_use]
    pub fn cached(&self, key: &QueryKey) -> Option<Arc<ListPage<T>>> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    /// Mark every entry of `endpoint` stale. Returns how many entries were marked.
    ///
    /// Requests already in flight are detached: their callers still get their
    /// result, but it is not stored, and the next fetch sends a new request.
    pub fn invalidate(&self, endpoint: &str) -> usize {
        let mut entries = self.lock();
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if key.endpoint == endpoint {
                entry.stale = true;
                entry.inflight = None;
                marked += 1;
            }
        }
        entries.retain(|_, entry| entry.data.is_some() || entry.inflight.is_some());
        tracing::debug!(endpoint = %endpoint, marked, "Invalidated list cache");
        marked
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Fetcher for one list endpoint (e.g. `/employees`), backed by a shared cache.
pub struct RemoteListResource<T> {
    endpoint: String,
    transport: Arc<dyn ListTransport>,
    cache: ListCache<T>,
}

impl<T> Clone for RemoteListResource<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            transport: Arc::clone(&self.transport),
            cache: self.cache.clone(),
        }
    }
}

impl<T> RemoteListResource<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn ListTransport>,
        cache: ListCache<T>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            cache,
        }
    }

    /// The endpoint doubles as the resource tag used for invalidation.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn cache(&self) -> &ListCache<T> {
        &self.cache
    }

    #[must_use]
    pub fn key(&self, params: &QueryParams) -> QueryKey {
        QueryKey {
            endpoint: self.endpoint.clone(),
            identity: params.identity(),
        }
    }

    #[must_use]
    pub fn status(&self, params: &QueryParams) -> FetchStatus {
        self.cache.status(&self.key(params))
    }

    /// Invalidate every cached page of this endpoint.
    pub fn invalidate(&self) -> usize {
        self.cache.invalidate(&self.endpoint)
    }

    /// Fetch the page for `params`, from cache when fresh.
    ///
    /// # Errors
    /// Transport, status and malformed-response errors from the request. Callers
    /// joined onto the same in-flight request all receive the same error.
    pub async fn fetch(&self, params: &QueryParams) -> FetchResult<T> {
        let key = self.key(params);
        let cell = {
            let mut entries = self.cache.lock();
            let entry = entries.entry(key.clone()).or_default();
            if let Some(cell) = &entry.inflight {
                tracing::debug!(endpoint = %key.endpoint, query = %key.identity, "Joining in-flight list request");
                Arc::clone(cell)
            } else if let (Some(data), false) = (&entry.data, entry.stale) {
                tracing::debug!(endpoint = %key.endpoint, query = %key.identity, "List cache hit");
                return Ok(Arc::clone(data));
            } else {
                let cell: InFlight<T> = Arc::new(OnceCell::new());
                entry.inflight = Some(Arc::clone(&cell));
                cell
            }
        };

        let result = cell.get_or_init(|| self.request(params)).await.clone();
        self.settle(&key, &cell, &result);
        result
    }

    async fn request(&self, params: &QueryParams) -> FetchResult<T> {
        tracing::debug!(endpoint = %self.endpoint, query = %params.identity(), "Fetching list");
        let body = self
            .transport
            .get(&self.endpoint, params)
            .await
            .inspect_err(ListError::log_internal)?;
        let page = decode_list(&self.endpoint, &body).inspect_err(ListError::log_internal)?;
        Ok(Arc::new(page))
    }

    /// Move a resolved in-flight result into the entry. Only the first waiter of a
    /// given request does anything; later waiters, and requests detached by
    /// [`ListCache::invalidate`], find a different cell or none.
    fn settle(&self, key: &QueryKey, cell: &InFlight<T>, result: &FetchResult<T>) {
        let mut entries = self.cache.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !entry
            .inflight
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, cell))
        {
            return;
        }
        entry.inflight = None;
        match result {
            Ok(page) => {
                entry.data = Some(Arc::clone(page));
                entry.stale = false;
            }
            Err(_) if entry.data.is_none() => {
                entries.remove(key);
            }
            Err(_) => {}
        }
    }
}
