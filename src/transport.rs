use crate::config::ListConfig;
use crate::errors::ListError;
use crate::models::decode_one;
use crate::query::QueryParams;
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response, header};
use serde::de::DeserializeOwned;
use std::fmt;
use tower::{Service, ServiceExt};

/// Largest response body accepted from a list endpoint.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Issues GET requests against the REST backend.
#[async_trait]
pub trait ListTransport: Send + Sync {
    /// Fetch `endpoint` with `params` and return the raw response body.
    ///
    /// # Errors
    /// [`ListError::Transport`] when no response arrives, [`ListError::Status`] for
    /// non-success responses.
    async fn get(&self, endpoint: &str, params: &QueryParams) -> Result<Bytes, ListError>;
}

/// [`ListTransport`] over any `tower::Service` speaking `http` types: an axum
/// `Router` in tests, a hyper client service in production.
#[derive(Clone)]
pub struct ServiceTransport<S> {
    service: S,
    base_path: String,
}

impl<S> ServiceTransport<S> {
    pub fn new(service: S, base_path: impl Into<String>) -> Self {
        Self {
            service,
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    /// Use the configured `base_path` as the endpoint prefix.
    pub fn from_config(service: S, config: &ListConfig) -> Self {
        Self::new(service, config.base_path.clone())
    }

    fn uri(&self, endpoint: &str, params: &QueryParams) -> String {
        let query = params.to_query_string();
        if query.is_empty() {
            format!("{}{endpoint}", self.base_path)
        } else {
            format!("{}{endpoint}?{query}", self.base_path)
        }
    }
}

#[async_trait]
impl<S> ListTransport for ServiceTransport<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: fmt::Display + Send,
{
    async fn get(&self, endpoint: &str, params: &QueryParams) -> Result<Bytes, ListError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.uri(endpoint, params))
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .map_err(|e| ListError::transport(e.to_string()))?;

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ListError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListError::status(status, endpoint));
        }

        axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| ListError::transport(e.to_string()))
    }
}

/// Fetch a single entity from a `{ payload: T }` endpoint.
///
/// # Errors
/// Propagates transport errors and returns [`ListError::MalformedResponse`] for an
/// unexpected body.
pub async fn fetch_one<T: DeserializeOwned>(
    transport: &dyn ListTransport,
    endpoint: &str,
) -> Result<T, ListError> {
    let body = transport.get(endpoint, &QueryParams::default()).await?;
    decode_one(endpoint, &body)
}
