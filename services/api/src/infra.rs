use applytrack::tracking::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CoverLetter, CoverLetterId,
    InMemoryApplicationStore, Resume, ResumeId, UserId,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn demo_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Populates `store` with two demo users and a handful of applications.
///
/// User 43 has an application whose resume was deleted after submission.
pub(crate) fn seed_demo_store(store: &InMemoryApplicationStore) {
    let rows = [
        (1, 42, "Acme", "Backend Engineer", ApplicationStatus::Waitlist, demo_day(2024, 1, 10), None, "LinkedIn", Some(1), Some(1)),
        (2, 42, "Globex", "Backend Engineer", ApplicationStatus::Waitlist, demo_day(2024, 2, 1), Some(demo_day(2024, 2, 20)), "Referral", Some(1), None),
        (3, 42, "Acme", "Site Reliability Engineer", ApplicationStatus::Rejected, demo_day(2024, 3, 1), None, "Job board", Some(2), Some(2)),
        (4, 43, "Initech", "Data Analyst", ApplicationStatus::NotAnswered, demo_day(2024, 4, 2), Some(demo_day(2024, 4, 30)), "Career fair", Some(7), None),
        (5, 43, "Hooli", "Data Analyst", ApplicationStatus::Accepted, demo_day(2024, 4, 18), None, "Referral", None, None),
    ];

    for (id, user, company, position, status, applied_on, deadline, source, resume, cover_letter) in rows {
        store.insert_application(ApplicationRecord {
            id: ApplicationId(id),
            user_id: UserId(user),
            company: company.to_string(),
            position: position.to_string(),
            status,
            application_date: applied_on,
            deadline,
            source: source.to_string(),
            resume_id: resume.map(ResumeId),
            cover_letter_id: cover_letter.map(CoverLetterId),
        });
    }

    for (id, file_name) in [(1, "backend-resume.pdf"), (2, "sre-resume.pdf")] {
        store.insert_resume(Resume {
            id: ResumeId(id),
            user_id: UserId(42),
            file_name: file_name.to_string(),
        });
    }
    for (id, file_name) in [(1, "acme-cover-letter.pdf"), (2, "acme-sre-cover-letter.pdf")] {
        store.insert_cover_letter(CoverLetter {
            id: CoverLetterId(id),
            user_id: UserId(42),
            file_name: file_name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_offending_input() {
        assert_eq!(parse_date(" 2024-02-01 "), Ok(demo_day(2024, 2, 1)));
        let err = parse_date("02/01/2024").expect_err("slashes are rejected");
        assert!(err.contains("02/01/2024"));
    }

    #[test]
    fn seeding_registers_every_row() {
        let store = InMemoryApplicationStore::default();
        seed_demo_store(&store);
        assert_eq!(store.application_count(), 5);
    }
}
