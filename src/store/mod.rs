//! Document-store abstraction. The traits the core depends on live next to
//! the modules that own them ([`crate::jobs::JobStore`],
//! [`crate::applications::ApplicationRepository`],
//! [`crate::users::UserDirectory`]); this module holds the shared error type
//! and the in-memory implementation the server binary and tests run on.

mod memory;

pub use memory::InMemoryStore;

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique-index violation, e.g. a second application for the same
    /// (job, applicant) pair.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
