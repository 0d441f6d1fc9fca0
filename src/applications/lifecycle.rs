//! The status state machine and follow-up rules.
//!
//! Moves are table-driven rather than scattered through handlers: terminal
//! states admit nothing, `Withdrawn` is reachable only from the three early
//! states, and everything else is an employer-driven move that may skip or
//! revisit the typical progression.

use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationStatus, StatusChange};

/// Days of silence before an application is considered stalled.
pub const DEFAULT_FOLLOW_UP_THRESHOLD_DAYS: i64 = 14;

/// Statuses still in play; anything else never needs a follow-up.
pub const ACTIVE_STATUSES: [ApplicationStatus; 4] = [
    ApplicationStatus::Submitted,
    ApplicationStatus::UnderReview,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::Interview,
];

pub const fn is_terminal(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::Selected | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
    )
}

/// Withdrawal is open only before an interview is in flight.
pub const fn can_withdraw_from(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::Submitted
            | ApplicationStatus::UnderReview
            | ApplicationStatus::Shortlisted
    )
}

/// Why a requested move was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is already {}", .0.label())]
    AlreadyTerminal(ApplicationStatus),
    #[error("application is already {}", .0.label())]
    NoChange(ApplicationStatus),
    #[error("cannot withdraw at this stage")]
    WithdrawNotAllowed,
    #[error("cannot return an application to submitted")]
    ReturnToSubmitted,
}

/// The transition table. `Ok(())` means the move may be applied.
pub fn check_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), TransitionError> {
    if is_terminal(from) {
        return Err(TransitionError::AlreadyTerminal(from));
    }
    if to == from {
        return Err(TransitionError::NoChange(from));
    }
    match to {
        ApplicationStatus::Withdrawn => {
            if can_withdraw_from(from) {
                Ok(())
            } else {
                Err(TransitionError::WithdrawNotAllowed)
            }
        }
        ApplicationStatus::Submitted => Err(TransitionError::ReturnToSubmitted),
        _ => Ok(()),
    }
}

/// Apply an already-checked move: set the status, append the history entry,
/// and stamp `response_date` on the first move away from `Submitted`.
pub fn apply_transition(
    application: &mut Application,
    to: ApplicationStatus,
    notes: Option<String>,
    now: DateTime<Utc>,
) {
    application.status = to;
    application.status_history.push(StatusChange {
        status: to,
        changed_at: now,
        notes,
    });

    if to != ApplicationStatus::Submitted && application.response_date.is_none() {
        application.response_date = Some(now);
    }
}

/// Canonical follow-up predicate: false once the application is settled,
/// otherwise true when the last signal (employer response, own follow-up, or
/// the submission itself) is at least `threshold_days` old.
pub fn needs_follow_up(
    application: &Application,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> bool {
    if is_terminal(application.status) {
        return false;
    }

    let reference = application
        .response_date
        .or(application.last_follow_up)
        .unwrap_or(application.submitted_at);

    (now - reference).num_days() >= threshold_days
}

/// The listing-filter expansion of "needs follow-up". It differs from
/// [`needs_follow_up`] in one corner: the post-response branch only fires
/// once at least one follow-up has been recorded. The method-level predicate
/// above is the source of truth for per-application checks; this shape is
/// what the stalled-applications listing promises.
pub fn stalled_in_listing(
    application: &Application,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> bool {
    if !ACTIVE_STATUSES.contains(&application.status) {
        return false;
    }

    let cutoff = now - chrono::Duration::days(threshold_days);
    match application.response_date {
        None => application.submitted_at <= cutoff,
        Some(responded) => {
            responded <= cutoff
                && application
                    .last_follow_up
                    .is_some_and(|followed| followed <= cutoff)
        }
    }
}
