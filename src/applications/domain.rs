use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::JobId;
use crate::users::UserId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Where an application sits in the hiring funnel. Progression through the
/// middle states is typical, not enforced; see `lifecycle` for the table of
/// allowed moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    Interview,
    Selected,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under-review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "submitted" => Some(ApplicationStatus::Submitted),
            "under-review" => Some(ApplicationStatus::UnderReview),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "interview" => Some(ApplicationStatus::Interview),
            "selected" => Some(ApplicationStatus::Selected),
            "rejected" => Some(ApplicationStatus::Rejected),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Candidate-facing wording used by activity feeds.
    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Interview => "Interview Scheduled",
            ApplicationStatus::Selected => "Selected",
            ApplicationStatus::Rejected => "Not Selected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }
}

/// One entry in the append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub changed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticePeriod {
    #[serde(rename = "Immediate")]
    Immediate,
    #[serde(rename = "15 days")]
    FifteenDays,
    #[serde(rename = "1 month")]
    OneMonth,
    #[serde(rename = "2 months")]
    TwoMonths,
    #[serde(rename = "3 months")]
    ThreeMonths,
    #[serde(rename = "Other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewMode {
    #[serde(rename = "In-person")]
    InPerson,
    #[serde(rename = "Video Call")]
    VideoCall,
    #[serde(rename = "Phone Call")]
    PhoneCall,
}

/// Interview sub-record, populated by the employer side and read-only to the
/// applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewDetails {
    #[serde(default)]
    pub scheduled: bool,
    pub date_time: Option<DateTime<Utc>>,
    pub mode: Option<InterviewMode>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub instructions: Option<String>,
    pub feedback: Option<String>,
}

pub const COVER_LETTER_MIN_CHARS: usize = 50;
pub const COVER_LETTER_MAX_CHARS: usize = 1500;
pub const PERSONAL_NOTES_MAX_CHARS: usize = 1000;

/// Applicant-supplied fields of a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    pub cover_letter: String,
    pub resume: Option<String>,
    pub expected_salary: Option<u32>,
    pub available_from: Option<DateTime<Utc>>,
    pub notice_period: Option<NoticePeriod>,
    pub personal_notes: Option<String>,
}

/// A single field constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ApplicationDetails {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), FieldViolation> {
        let letter_len = self.cover_letter.chars().count();
        if letter_len < COVER_LETTER_MIN_CHARS {
            return Err(FieldViolation::new(
                "cover_letter",
                format!("must be at least {COVER_LETTER_MIN_CHARS} characters"),
            ));
        }
        if letter_len > COVER_LETTER_MAX_CHARS {
            return Err(FieldViolation::new(
                "cover_letter",
                format!("cannot exceed {COVER_LETTER_MAX_CHARS} characters"),
            ));
        }

        if let Some(available_from) = self.available_from {
            if available_from < now {
                return Err(FieldViolation::new(
                    "available_from",
                    "cannot be in the past",
                ));
            }
        }

        if let Some(notes) = &self.personal_notes {
            validate_personal_notes(notes)?;
        }

        Ok(())
    }
}

pub(crate) fn validate_personal_notes(notes: &str) -> Result<(), FieldViolation> {
    if notes.chars().count() > PERSONAL_NOTES_MAX_CHARS {
        return Err(FieldViolation::new(
            "personal_notes",
            format!("cannot exceed {PERSONAL_NOTES_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

/// An application record. Never physically deleted; every status move is
/// appended to `status_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job: JobId,
    pub applicant: UserId,
    pub cover_letter: String,
    pub resume: Option<String>,
    pub expected_salary: Option<u32>,
    pub available_from: Option<DateTime<Utc>>,
    pub notice_period: Option<NoticePeriod>,
    pub status: ApplicationStatus,
    pub status_history: Vec<StatusChange>,
    #[serde(default)]
    pub interview: InterviewDetails,
    #[serde(default)]
    pub viewed_by_employer: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    /// Set exactly once, on the first transition away from `Submitted`.
    pub response_date: Option<DateTime<Utc>>,
    pub last_follow_up: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_count: u32,
    pub personal_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    /// Build a fresh record with the initial `Submitted` history entry.
    /// `details` must already be validated.
    pub fn new(
        id: ApplicationId,
        job: JobId,
        applicant: UserId,
        details: ApplicationDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job,
            applicant,
            cover_letter: details.cover_letter,
            resume: details.resume,
            expected_salary: details.expected_salary,
            available_from: details.available_from,
            notice_period: details.notice_period,
            status: ApplicationStatus::Submitted,
            status_history: vec![StatusChange {
                status: ApplicationStatus::Submitted,
                changed_at: now,
                notes: None,
            }],
            interview: InterviewDetails::default(),
            viewed_by_employer: false,
            viewed_at: None,
            response_date: None,
            last_follow_up: None,
            follow_up_count: 0,
            personal_notes: details.personal_notes,
            submitted_at: now,
        }
    }

    pub fn latest_change(&self) -> Option<&StatusChange> {
        self.status_history.last()
    }
}
