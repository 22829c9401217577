//! Domain services over the transport and cache layers.
//!
//! - `PartyService`: the `/parties` resource family - cached reads,
//!   write-then-invalidate, bulk operations, server-side export
//! - `AuthService`: login/register/refresh/logout
//! - `validate_party_data`: pure form validation, no I/O

pub mod auth;
pub mod party;
pub mod validate;

pub use auth::AuthService;
pub use party::{request_key, PartyService, SearchParams};
pub use validate::{validate_party_data, Validation};
