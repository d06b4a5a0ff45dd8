use std::future::Future;

use super::criteria::FilterCriterion;
use super::domain::{
    ApplicationId, ApplicationRecord, CoverLetter, CoverLetterId, Resume, ResumeId, UserId,
};

/// Read-side storage abstraction the filter engine is built on.
///
/// Every method is a suspension point; implementations report an unknown user with
/// [`LookupError::UserNotFound`] rather than an empty result.
pub trait ApplicationLookup: Send + Sync {
    fn find_by_criterion(
        &self,
        user_id: UserId,
        criterion: &FilterCriterion,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, LookupError>> + Send;

    fn find_all_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ApplicationRecord>, LookupError>> + Send;

    fn find_application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> impl Future<Output = Result<Option<ApplicationRecord>, LookupError>> + Send;

    fn find_resume(
        &self,
        resume_id: ResumeId,
    ) -> impl Future<Output = Result<Option<Resume>, LookupError>> + Send;

    fn find_cover_letter(
        &self,
        cover_letter_id: CoverLetterId,
    ) -> impl Future<Output = Result<Option<CoverLetter>, LookupError>> + Send;
}

/// Error enumeration for lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
