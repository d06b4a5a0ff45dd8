//! Conjunctive filtering over a user's applications.
//!
//! Each active criterion is looked up independently and concurrently; the engine waits for
//! every lookup to settle, fails the whole call if any of them failed, and otherwise
//! intersects the results by application id. Survivors are sorted newest first and
//! decorated with the names of their resume and cover letter.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::criteria::{FilterCriteria, FilterCriterion};
use super::domain::{
    ApplicationId, ApplicationRecord, CoverLetterId, EnrichedApplication, ResumeId, UserId,
    NONE_SENTINEL,
};
use super::lookup::{ApplicationLookup, LookupError};

/// Stateless filter engine over an injected lookup handle.
pub struct FilterEngine<L> {
    lookup: Arc<L>,
}

impl<L> Clone for FilterEngine<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<L> FilterEngine<L>
where
    L: ApplicationLookup + 'static,
{
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    /// Applications owned by `user_id` satisfying every criterion, newest first.
    ///
    /// With no criteria this is the user's full listing.
    pub async fn filtered_applications(
        &self,
        user_id: UserId,
        criteria: &FilterCriteria,
    ) -> Result<Vec<EnrichedApplication>, FilterError> {
        ensure_positive(user_id)?;

        if criteria.is_empty() {
            return self.all_applications(user_id).await;
        }

        let results = self.fan_out(user_id, criteria).await?;
        let survivors = intersect(results);
        debug!(
            user = %user_id,
            criteria = criteria.len(),
            survivors = survivors.len(),
            "filters intersected"
        );

        Ok(self.enrich(sort_newest_first(survivors)).await)
    }

    /// Unfiltered listing, newest first.
    pub async fn all_applications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<EnrichedApplication>, FilterError> {
        ensure_positive(user_id)?;

        let records = self
            .lookup
            .find_all_by_user(user_id)
            .await
            .map_err(|source| FilterError::from_lookup("all applications", source))?;

        Ok(self.enrich(sort_newest_first(records)).await)
    }

    /// A single application owned by `user_id`.
    pub async fn application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<EnrichedApplication, FilterError> {
        ensure_positive(user_id)?;

        let record = self
            .lookup
            .find_application(user_id, application_id)
            .await
            .map_err(|source| FilterError::from_lookup("application", source))?
            .ok_or(FilterError::ApplicationNotFound(application_id))?;

        let mut enriched = self.enrich(vec![record]).await;
        enriched
            .pop()
            .ok_or(FilterError::ApplicationNotFound(application_id))
    }

    /// Issues one lookup per criterion and waits for all of them before inspecting
    /// failures. Results come back in criterion order.
    async fn fan_out(
        &self,
        user_id: UserId,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Vec<ApplicationRecord>>, FilterError> {
        let mut tasks = JoinSet::new();
        for (index, criterion) in criteria.iter().cloned().enumerate() {
            let lookup = Arc::clone(&self.lookup);
            tasks.spawn(async move {
                let result = lookup.find_by_criterion(user_id, &criterion).await;
                (index, criterion, result)
            });
        }
        debug!(user = %user_id, lookups = criteria.len(), "filter lookups issued");

        let mut settled: Vec<Option<Vec<ApplicationRecord>>> = vec![None; criteria.len()];
        let mut failures: Vec<(usize, FilterError)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(records))) => settled[index] = Some(records),
                Ok((index, criterion, Err(source))) => {
                    warn!(user = %user_id, %criterion, error = %source, "filter lookup failed");
                    failures.push((index, FilterError::from_lookup(criterion.to_string(), source)));
                }
                Err(err) => {
                    warn!(user = %user_id, error = %err, "filter lookup task aborted");
                    failures.push((
                        usize::MAX,
                        FilterError::LookupFailure {
                            scope: "filter lookup task".to_string(),
                            source: LookupError::Unavailable(err.to_string()),
                        },
                    ));
                }
            }
        }

        if !failures.is_empty() {
            failures.sort_by_key(|(index, _)| *index);
            let position = failures
                .iter()
                .position(|(_, error)| error.is_not_found())
                .unwrap_or(0);
            return Err(failures.swap_remove(position).1);
        }

        Ok(settled.into_iter().flatten().collect())
    }

    async fn enrich(&self, records: Vec<ApplicationRecord>) -> Vec<EnrichedApplication> {
        let mut names = vec![DocumentNames::default(); records.len()];
        let mut tasks = JoinSet::new();

        for (index, record) in records.iter().enumerate() {
            if record.resume_id.is_none() && record.cover_letter_id.is_none() {
                continue;
            }
            let lookup = Arc::clone(&self.lookup);
            let application_id = record.id;
            let resume_id = record.resume_id;
            let cover_letter_id = record.cover_letter_id;
            tasks.spawn(async move {
                let (resume, cover_letter) = tokio::join!(
                    resume_name(lookup.as_ref(), application_id, resume_id),
                    cover_letter_name(lookup.as_ref(), application_id, cover_letter_id),
                );
                (
                    index,
                    DocumentNames {
                        resume,
                        cover_letter,
                    },
                )
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, resolved)) => names[index] = resolved,
                Err(err) => warn!(error = %err, "enrichment task aborted, keeping placeholders"),
            }
        }

        records
            .into_iter()
            .zip(names)
            .map(|(application, names)| EnrichedApplication {
                application,
                resume_name: names.resume,
                cover_letter_name: names.cover_letter,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct DocumentNames {
    resume: String,
    cover_letter: String,
}

impl Default for DocumentNames {
    fn default() -> Self {
        Self {
            resume: NONE_SENTINEL.to_string(),
            cover_letter: NONE_SENTINEL.to_string(),
        }
    }
}

async fn resume_name<L: ApplicationLookup>(
    lookup: &L,
    application_id: ApplicationId,
    resume_id: Option<ResumeId>,
) -> String {
    let Some(resume_id) = resume_id else {
        return NONE_SENTINEL.to_string();
    };
    match lookup.find_resume(resume_id).await {
        Ok(Some(resume)) => resume.file_name,
        Ok(None) => {
            debug!(application = %application_id, resume = resume_id.0, "resume missing");
            NONE_SENTINEL.to_string()
        }
        Err(error) => {
            warn!(application = %application_id, resume = resume_id.0, %error, "resume lookup failed");
            NONE_SENTINEL.to_string()
        }
    }
}

async fn cover_letter_name<L: ApplicationLookup>(
    lookup: &L,
    application_id: ApplicationId,
    cover_letter_id: Option<CoverLetterId>,
) -> String {
    let Some(cover_letter_id) = cover_letter_id else {
        return NONE_SENTINEL.to_string();
    };
    match lookup.find_cover_letter(cover_letter_id).await {
        Ok(Some(cover_letter)) => cover_letter.file_name,
        Ok(None) => {
            debug!(
                application = %application_id,
                cover_letter = cover_letter_id.0,
                "cover letter missing"
            );
            NONE_SENTINEL.to_string()
        }
        Err(error) => {
            warn!(
                application = %application_id,
                cover_letter = cover_letter_id.0,
                %error,
                "cover letter lookup failed"
            );
            NONE_SENTINEL.to_string()
        }
    }
}

fn ensure_positive(user_id: UserId) -> Result<(), FilterError> {
    if user_id.0 == 0 {
        Err(FilterError::InvalidUser)
    } else {
        Ok(())
    }
}

/// Intersects per-criterion results by application id.
///
/// The first result seeds the survivors and fixes their order; a record that shows up in
/// several results is represented by its copy from the first one.
pub fn intersect(results: Vec<Vec<ApplicationRecord>>) -> Vec<ApplicationRecord> {
    let mut results = results.into_iter();
    let Some(seed) = results.next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut survivors: Vec<ApplicationRecord> = seed
        .into_iter()
        .filter(|record| seen.insert(record.id))
        .collect();

    for result in results {
        if survivors.is_empty() {
            break;
        }
        let ids: HashSet<ApplicationId> = result.iter().map(|record| record.id).collect();
        survivors.retain(|record| ids.contains(&record.id));
    }

    survivors
}

/// Stable sort by application date, newest first.
pub fn sort_newest_first(mut records: Vec<ApplicationRecord>) -> Vec<ApplicationRecord> {
    records.sort_by(|a, b| b.application_date.cmp(&a.application_date));
    records
}

/// Error raised by the filter engine.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("user id must be a positive integer")]
    InvalidUser,
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("lookup failed for {scope}: {source}")]
    LookupFailure {
        scope: String,
        #[source]
        source: LookupError,
    },
}

impl FilterError {
    fn from_lookup(scope: impl Into<String>, source: LookupError) -> Self {
        match source {
            LookupError::UserNotFound(user_id) => FilterError::UserNotFound(user_id),
            other => FilterError::LookupFailure {
                scope: scope.into(),
                source: other,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FilterError::UserNotFound(_) | FilterError::ApplicationNotFound(_)
        )
    }
}
