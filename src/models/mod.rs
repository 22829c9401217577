//! Data models for Haulbook entities.
//!
//! - `Party`, `PartyDraft`, `PartyHistoryEntry`: the transport party
//!   resource family and its write payloads
//! - `Stats`: aggregate dashboard numbers
//! - `User` and the auth request/response payloads

pub mod party;
pub mod stats;
pub mod user;

pub use party::{BulkOutcome, BulkSummary, Party, PartyDraft, PartyHistoryEntry};
pub use stats::{PlaceCount, Stats};
pub use user::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest, User};
