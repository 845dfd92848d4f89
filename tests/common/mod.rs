#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use listcrate::sort::{SortDirection, parse_sort};
use listcrate::{
    ListCache, ListConfig, ListController, ListError, ListTransport, Predicate, Profile,
    QueryParams, RemoteListResource, RowFlags, ServiceTransport, ViewContext,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;
use uuid::Uuid;

pub const SEARCHABLE: [&str; 2] = ["name___icontains", "email___icontains"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub team: String,
    pub status: String,
    pub manager: Option<String>,
    pub can_edit: bool,
}

impl Employee {
    pub fn new(name: &str, team: &str, status: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            team: team.to_string(),
            status: status.to_string(),
            manager: None,
            can_edit: status != "ARCHIVED",
        }
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "team" => Some(self.team.clone()),
            "status" => Some(self.status.clone()),
            "manager" => Some(self.manager.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

impl RowFlags for Employee {
    fn flag(&self, name: &str) -> bool {
        name == "can_edit" && self.can_edit
    }
}

pub fn sample_employees() -> Vec<Employee> {
    let mut employees = vec![
        Employee::new("Alice", "backend", "VALID"),
        Employee::new("Bob", "frontend", "VALID"),
        Employee::new("Carol", "backend", "ARCHIVED"),
        Employee::new("Dave", "design", "VALID"),
        Employee::new("Eve", "backend", "VALID"),
    ];
    employees[1].manager = Some("Alice".to_string());
    employees
}

/// In-memory backend answering like the portal REST API.
#[derive(Default)]
pub struct Backend {
    pub employees: RwLock<Vec<Employee>>,
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl Backend {
    pub fn with(employees: Vec<Employee>) -> Arc<Self> {
        Arc::new(Self {
            employees: RwLock::new(employees),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add(&self, employee: Employee) {
        self.employees.write().unwrap().push(employee);
    }
}

fn matches(employee: &Employee, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => employee.field(field).is_some_and(|v| v == *value),
        Predicate::In { field, values } => employee.field(field).is_some_and(|v| values.contains(&v)),
        Predicate::Contains { field, value } => employee
            .field(field)
            .is_some_and(|v| v.to_lowercase().contains(&value.to_lowercase())),
        Predicate::IsEmpty { field, empty } => {
            employee.field(field).is_some_and(|v| v.is_empty() == *empty)
        }
        Predicate::AnyOf(members) => members.iter().any(|p| matches(employee, p)),
    }
}

async fn list_employees(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    backend.calls.fetch_add(1, Ordering::SeqCst);
    if backend.failing.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let mut offset = 0usize;
    let mut limit = 25usize;
    let mut filters = Vec::new();
    let mut sort = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "offset" => offset = value.parse().unwrap_or(0),
            "limit" => limit = value.parse().unwrap_or(25),
            "filter" => match value.parse::<Predicate>() {
                Ok(predicate) => filters.push(predicate),
                Err(_) => return StatusCode::BAD_REQUEST.into_response(),
            },
            "sort_by" => sort = parse_sort(&value),
            _ => {}
        }
    }

    let mut matching: Vec<Employee> = backend
        .employees
        .read()
        .unwrap()
        .iter()
        .filter(|e| filters.iter().all(|p| matches(e, p)))
        .cloned()
        .collect();
    matching.sort_by(|a, b| {
        sort.iter()
            .map(|d| {
                let ord = a.field(&d.column).cmp(&b.field(&d.column));
                if d.direction == SortDirection::Desc {
                    ord.reverse()
                } else {
                    ord
                }
            })
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let count = matching.len();
    let items: Vec<Employee> = matching.into_iter().skip(offset).take(limit).collect();
    Json(json!({"payload": {"items": items, "count": count}})).into_response()
}

async fn get_employee(State(backend): State<Arc<Backend>>, Path(id): Path<Uuid>) -> Response {
    let employees = backend.employees.read().unwrap();
    match employees.iter().find(|e| e.id == id) {
        Some(employee) => Json(json!({"payload": employee})).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn broken_list() -> Json<serde_json::Value> {
    Json(json!({"data": [], "total": 3}))
}

pub fn setup_test_app(backend: Arc<Backend>) -> Router {
    let api = Router::new()
        .route("/employees", get(list_employees))
        .route("/employees/{id}", get(get_employee))
        .route("/broken", get(broken_list))
        .with_state(backend);

    Router::new().nest("/api/v1", api)
}

/// Route library logs to the test harness output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn setup_transport(backend: Arc<Backend>) -> Arc<dyn ListTransport> {
    init_tracing();
    Arc::new(ServiceTransport::new(setup_test_app(backend), "/api/v1"))
}

pub fn test_context() -> ViewContext {
    ViewContext::new(
        Profile::new(Uuid::new_v4(), "HR Admin").with_permission("employees.manage"),
        ListConfig {
            page_size: 2,
            ..ListConfig::default()
        },
    )
}

pub fn employee_controller(transport: Arc<dyn ListTransport>) -> ListController<Employee> {
    let resource = RemoteListResource::new("/employees", transport, ListCache::new());
    ListController::new(resource, SEARCHABLE, test_context())
}

/// Transport that holds every request until its identity's gate is opened.
pub struct GatedTransport {
    inner: Arc<dyn ListTransport>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub calls: AtomicUsize,
}

impl GatedTransport {
    pub fn new(inner: Arc<dyn ListTransport>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gates: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn gate(&self, identity: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(identity.to_string())
            .or_default()
            .clone()
    }

    pub fn open(&self, identity: &str) {
        self.gate(identity).notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListTransport for GatedTransport {
    async fn get(&self, endpoint: &str, params: &QueryParams) -> Result<Bytes, ListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate(&params.identity());
        gate.notified().await;
        self.inner.get(endpoint, params).await
    }
}

/// Yield until `condition` holds, giving spawned tasks a chance to run.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
