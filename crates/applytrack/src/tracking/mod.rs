//! Job-application tracking: typed filter criteria, the intersection engine, and the
//! listing service and HTTP routes built on top of it.

pub mod criteria;
pub mod domain;
pub mod engine;
pub mod lookup;
pub mod memory;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use criteria::{CriterionError, FilterCriteria, FilterCriterion, FilterField};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CoverLetter, CoverLetterId,
    EnrichedApplication, Resume, ResumeId, UserId, NONE_SENTINEL,
};
pub use engine::{intersect, sort_newest_first, FilterEngine, FilterError};
pub use lookup::{ApplicationLookup, LookupError};
pub use memory::InMemoryApplicationStore;
pub use router::application_router;
pub use service::{ApplicationListing, ApplicationListingService, ListingError};
