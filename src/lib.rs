//! Haulbook - the data layer for a transport party management dashboard.
//!
//! This crate talks to the Haulbook REST backend and keeps every view it
//! serves consistent: an authenticated HTTP transport with a uniform
//! error taxonomy and user-facing notices, a TTL response cache with
//! pattern invalidation and stale-write protection, the `/parties`
//! domain services built on both, and a tabular view engine (search,
//! stable sort, clamped pagination, selection, CSV export) for rendering
//! the results.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod notify;
pub mod service;
pub mod table;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::ResponseCache;
pub use config::Config;
pub use notify::{Notice, NoticeKind, NoticeSink, SharedSink, TracingSink};
pub use service::{
    request_key, validate_party_data, AuthService, PartyService, SearchParams, Validation,
};
pub use table::{Column, Selection, SelectionMode, SortDirection, TableView};
