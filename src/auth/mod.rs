//! Authentication primitives: the shared bearer-token store read by the
//! transport layer, and the on-disk session record.
//!
//! Sessions are persisted to disk and tokens expire after 60 minutes.

pub mod session;
pub mod token;

pub use session::{Session, SessionData};
pub use token::TokenStore;
