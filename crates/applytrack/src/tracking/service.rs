use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::criteria::{CriterionError, FilterCriteria};
use super::domain::{ApplicationId, EnrichedApplication, UserId};
use super::engine::{FilterEngine, FilterError};
use super::lookup::ApplicationLookup;

/// Listing handed to the presentation layer.
///
/// `filtered` is false when the criteria could not be applied and the unfiltered listing
/// was served instead. `error` is set only when nothing could be fetched at all.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListing {
    pub applications: Vec<EnrichedApplication>,
    pub filtered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplicationListing {
    fn unavailable(error: &FilterError) -> Self {
        Self {
            applications: Vec::new(),
            filtered: false,
            error: Some(format!("applications are unavailable right now ({error})")),
        }
    }
}

/// Service applying the fallback policy around the filter engine.
pub struct ApplicationListingService<L> {
    engine: FilterEngine<L>,
}

impl<L> ApplicationListingService<L>
where
    L: ApplicationLookup + 'static,
{
    pub fn new(lookup: Arc<L>) -> Self {
        Self {
            engine: FilterEngine::new(lookup),
        }
    }

    /// Parses raw query pairs and lists matching applications.
    pub async fn list_from_pairs<I, K, V>(
        &self,
        user_id: UserId,
        pairs: I,
    ) -> Result<ApplicationListing, ListingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let criteria = FilterCriteria::from_pairs(pairs)?;
        self.list(user_id, &criteria).await
    }

    /// Lists matching applications, falling back once to the unfiltered listing when a
    /// filter lookup fails. Unknown users and invalid ids are always errors.
    pub async fn list(
        &self,
        user_id: UserId,
        criteria: &FilterCriteria,
    ) -> Result<ApplicationListing, ListingError> {
        let error = match self.engine.filtered_applications(user_id, criteria).await {
            Ok(applications) => {
                return Ok(ApplicationListing {
                    applications,
                    filtered: !criteria.is_empty(),
                    error: None,
                })
            }
            Err(error @ FilterError::LookupFailure { .. }) => error,
            Err(other) => return Err(other.into()),
        };

        if criteria.is_empty() {
            warn!(user = %user_id, %error, "application listing unavailable");
            return Ok(ApplicationListing::unavailable(&error));
        }

        warn!(user = %user_id, %error, "filtered listing failed, serving unfiltered applications");
        match self.engine.all_applications(user_id).await {
            Ok(applications) => Ok(ApplicationListing {
                applications,
                filtered: false,
                error: None,
            }),
            Err(fallback @ FilterError::LookupFailure { .. }) => {
                warn!(user = %user_id, error = %fallback, "unfiltered fallback failed");
                Ok(ApplicationListing::unavailable(&fallback))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn get(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<EnrichedApplication, ListingError> {
        Ok(self.engine.application(user_id, application_id).await?)
    }
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Criteria(#[from] CriterionError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
