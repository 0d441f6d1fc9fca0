//! Application lifecycle: submission, the status state machine with its
//! append-only history, withdrawal and follow-up rules, and per-user funnel
//! statistics.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatus, FieldViolation,
    InterviewDetails, InterviewMode, NoticePeriod, StatusChange, COVER_LETTER_MAX_CHARS,
    COVER_LETTER_MIN_CHARS, PERSONAL_NOTES_MAX_CHARS,
};
pub use lifecycle::{
    needs_follow_up, stalled_in_listing, TransitionError, ACTIVE_STATUSES,
    DEFAULT_FOLLOW_UP_THRESHOLD_DAYS,
};
pub use repository::{ApplicationFilters, ApplicationRepository};
pub use router::application_router;
pub use service::{
    ApplicationError, ApplicationService, UserApplicationStats, DEFAULT_WITHDRAWAL_NOTE,
};
