use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a resume or cover letter cannot be resolved.
pub const NONE_SENTINEL: &str = "None";

/// Owning account of a set of applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverLetterId(pub u64);

/// Where an application currently stands with the employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Waitlist,
    Rejected,
    NotAnswered,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Waitlist,
        ApplicationStatus::Rejected,
        ApplicationStatus::NotAnswered,
        ApplicationStatus::Accepted,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Waitlist => "waitlist",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::NotAnswered => "not_answered",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    /// Accepts the stored label plus the spaced and hyphenated spellings used by forms.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

/// Application row as stored, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub application_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub source: String,
    pub resume_id: Option<ResumeId>,
    pub cover_letter_id: Option<CoverLetterId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    pub id: ResumeId,
    pub user_id: UserId,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub id: CoverLetterId,
    pub user_id: UserId,
    pub file_name: String,
}

/// Application decorated with display names of its attached documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedApplication {
    #[serde(flatten)]
    pub application: ApplicationRecord,
    pub resume_name: String,
    pub cover_letter_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_form_spellings() {
        assert_eq!(
            ApplicationStatus::parse("Not Answered"),
            Some(ApplicationStatus::NotAnswered)
        );
        assert_eq!(
            ApplicationStatus::parse("not-answered"),
            Some(ApplicationStatus::NotAnswered)
        );
        assert_eq!(
            ApplicationStatus::parse(" WAITLIST "),
            Some(ApplicationStatus::Waitlist)
        );
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
    }

    #[test]
    fn status_serializes_as_label() {
        for status in ApplicationStatus::ALL {
            let json = serde_json::to_value(status).expect("serializes");
            assert_eq!(json, serde_json::Value::String(status.label().to_string()));
        }
    }
}
