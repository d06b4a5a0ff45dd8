use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Barrier;

use crate::tracking::criteria::{FilterCriterion, FilterField};
use crate::tracking::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CoverLetter, CoverLetterId, Resume,
    ResumeId, UserId,
};
use crate::tracking::lookup::{ApplicationLookup, LookupError};
use crate::tracking::memory::InMemoryApplicationStore;
use crate::tracking::{application_router, ApplicationListingService};

pub(super) const SCENARIO_USER: UserId = UserId(42);
pub(super) const DOCUMENT_USER: UserId = UserId(43);
pub(super) const UNKNOWN_USER: UserId = UserId(99);

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn application(
    id: u64,
    user_id: UserId,
    status: ApplicationStatus,
    company: &str,
    applied_on: NaiveDate,
) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(id),
        user_id,
        company: company.to_string(),
        position: "Backend Engineer".to_string(),
        status,
        application_date: applied_on,
        deadline: None,
        source: "LinkedIn".to_string(),
        resume_id: None,
        cover_letter_id: None,
    }
}

/// User 42 owns A (waitlist, Acme), B (waitlist, Globex) and C (rejected, Acme).
/// User 43 owns D, whose resume 7 has been deleted while cover letter 8 remains.
pub(super) fn scenario_store() -> InMemoryApplicationStore {
    let store = InMemoryApplicationStore::default();
    store.insert_application(application(
        1,
        SCENARIO_USER,
        ApplicationStatus::Waitlist,
        "Acme",
        day(2024, 1, 10),
    ));
    store.insert_application(application(
        2,
        SCENARIO_USER,
        ApplicationStatus::Waitlist,
        "Globex",
        day(2024, 2, 1),
    ));
    store.insert_application(application(
        3,
        SCENARIO_USER,
        ApplicationStatus::Rejected,
        "Acme",
        day(2024, 3, 1),
    ));

    let mut with_documents = application(
        4,
        DOCUMENT_USER,
        ApplicationStatus::NotAnswered,
        "Initech",
        day(2024, 4, 2),
    );
    with_documents.resume_id = Some(ResumeId(7));
    with_documents.cover_letter_id = Some(CoverLetterId(8));
    store.insert_application(with_documents);
    store.insert_resume(Resume {
        id: ResumeId(7),
        user_id: DOCUMENT_USER,
        file_name: "resume-2024.pdf".to_string(),
    });
    store.insert_cover_letter(CoverLetter {
        id: CoverLetterId(8),
        user_id: DOCUMENT_USER,
        file_name: "initech-cover.pdf".to_string(),
    });
    store.remove_resume(ResumeId(7));

    store
}

pub(super) fn ids(applications: &[crate::tracking::EnrichedApplication]) -> Vec<u64> {
    applications
        .iter()
        .map(|enriched| enriched.application.id.0)
        .collect()
}

/// Lookup double wrapping the scenario store with scripted failures and call counters.
#[derive(Default)]
pub(super) struct ScriptedLookup {
    pub(super) store: InMemoryApplicationStore,
    pub(super) failing_fields: Vec<FilterField>,
    pub(super) slow_fields: Vec<FilterField>,
    pub(super) fail_unfiltered: bool,
    pub(super) fail_documents: bool,
    pub(super) barrier: Option<Arc<Barrier>>,
    pub(super) criterion_calls: AtomicUsize,
    pub(super) unfiltered_calls: AtomicUsize,
    pub(super) settled: AtomicUsize,
}

impl ScriptedLookup {
    pub(super) fn over(store: InMemoryApplicationStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub(super) fn criterion_calls(&self) -> usize {
        self.criterion_calls.load(Ordering::SeqCst)
    }

    pub(super) fn unfiltered_calls(&self) -> usize {
        self.unfiltered_calls.load(Ordering::SeqCst)
    }

    pub(super) fn settled(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }
}

impl ApplicationLookup for ScriptedLookup {
    async fn find_by_criterion(
        &self,
        user_id: UserId,
        criterion: &FilterCriterion,
    ) -> Result<Vec<ApplicationRecord>, LookupError> {
        self.criterion_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.slow_fields.contains(&criterion.field()) {
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
        }

        let result = if self.failing_fields.contains(&criterion.field()) {
            Err(LookupError::Unavailable("database offline".to_string()))
        } else {
            self.store.find_by_criterion(user_id, criterion).await
        };
        self.settled.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<ApplicationRecord>, LookupError> {
        self.unfiltered_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unfiltered {
            return Err(LookupError::Unavailable("database offline".to_string()));
        }
        self.store.find_all_by_user(user_id).await
    }

    async fn find_application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, LookupError> {
        self.store.find_application(user_id, application_id).await
    }

    async fn find_resume(&self, resume_id: ResumeId) -> Result<Option<Resume>, LookupError> {
        if self.fail_documents {
            return Err(LookupError::Unavailable("file index offline".to_string()));
        }
        self.store.find_resume(resume_id).await
    }

    async fn find_cover_letter(
        &self,
        cover_letter_id: CoverLetterId,
    ) -> Result<Option<CoverLetter>, LookupError> {
        if self.fail_documents {
            return Err(LookupError::Unavailable("file index offline".to_string()));
        }
        self.store.find_cover_letter(cover_letter_id).await
    }
}

pub(super) fn scenario_router() -> axum::Router {
    let service = ApplicationListingService::new(Arc::new(scenario_store()));
    application_router(Arc::new(service))
}

pub(super) fn router_over(lookup: ScriptedLookup) -> axum::Router {
    let service = ApplicationListingService::new(Arc::new(lookup));
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
