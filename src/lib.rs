//! List state, query building and cached list fetching for REST-backed admin
//! portals.
//!
//! A list page flows one way per interaction:
//!
//! ```text
//! user input -> ListState transition -> QueryParams -> RemoteListResource -> rows -> Table
//! ```
//!
//! See [`ListController`] for the piece that wires these together.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod dialog;
pub mod errors;
pub mod events;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod sort;
pub mod state;
pub mod table;
pub mod transport;

pub use config::{ListConfig, Profile, ViewContext};
pub use controller::{ListController, ListView, LoadOutcome, PendingLoad};
pub use debounce::Debouncer;
pub use dialog::{ActionDialog, DayOffAction, DialogState};
pub use errors::ListError;
pub use events::{MutationBus, MutationEvent, MutationKind};
pub use filter::Predicate;
pub use models::ListPage;
pub use query::{QueryParams, build_query_params};
pub use resource::{FetchStatus, ListCache, QueryKey, RemoteListResource};
pub use sort::{SortDirection, SortDirective};
pub use state::ListState;
pub use table::{Column, RenderedTable, RowFlags, Table};
pub use transport::{ListTransport, ServiceTransport, fetch_one};
