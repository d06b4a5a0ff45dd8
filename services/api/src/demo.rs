use crate::infra::seed_demo_store;
use applytrack::error::AppError;
use applytrack::tracking::{
    ApplicationListing, ApplicationListingService, ApplicationStatus, CriterionError,
    FilterCriteria, FilterCriterion, InMemoryApplicationStore, ListingError, UserId,
};
use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Owner of the applications to list
    #[arg(long)]
    pub(crate) user: u64,
    /// Keep applications with this status (waitlist, rejected, not_answered, accepted)
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Keep applications sent to this company
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Keep applications for this position title
    #[arg(long)]
    pub(crate) position: Option<String>,
    /// Keep applications found through this source
    #[arg(long)]
    pub(crate) source: Option<String>,
    /// Keep applications submitted on this date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Keep applications due on this date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) deadline: Option<NaiveDate>,
}

impl ListArgs {
    fn criteria(&self) -> Result<FilterCriteria, CriterionError> {
        let mut criteria = FilterCriteria::default();
        if let Some(raw) = &self.status {
            let status = ApplicationStatus::parse(raw)
                .ok_or_else(|| CriterionError::InvalidStatus(raw.clone()))?;
            criteria.push(FilterCriterion::Status(status));
        }
        if let Some(company) = &self.company {
            criteria.push(FilterCriterion::Company(company.clone()));
        }
        if let Some(position) = &self.position {
            criteria.push(FilterCriterion::Position(position.clone()));
        }
        if let Some(source) = &self.source {
            criteria.push(FilterCriterion::Source(source.clone()));
        }
        if let Some(date) = self.date {
            criteria.push(FilterCriterion::Date(date));
        }
        if let Some(deadline) = self.deadline {
            criteria.push(FilterCriterion::Deadline(deadline));
        }
        Ok(criteria)
    }
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let criteria = args.criteria().map_err(ListingError::from)?;

    let store = InMemoryApplicationStore::default();
    seed_demo_store(&store);
    let service = ApplicationListingService::new(Arc::new(store));

    let listing = service.list(UserId(args.user), &criteria).await?;
    render_listing(args.user, &criteria, &listing);
    Ok(())
}

fn render_listing(user: u64, criteria: &FilterCriteria, listing: &ApplicationListing) {
    if criteria.is_empty() {
        println!("Applications for user {user}");
    } else {
        let filters: Vec<String> = criteria.iter().map(ToString::to_string).collect();
        println!("Applications for user {user} ({})", filters.join(", "));
    }

    if let Some(error) = &listing.error {
        println!("  {error}");
        return;
    }
    if !criteria.is_empty() && !listing.filtered {
        println!("  Filters could not be applied; showing every application.");
    }
    if listing.applications.is_empty() {
        println!("  No matching applications.");
        return;
    }

    for enriched in &listing.applications {
        let application = &enriched.application;
        let deadline = application
            .deadline
            .map(|deadline| deadline.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "- #{} {} at {} [{}] applied {} (deadline {}, via {})",
            application.id,
            application.position,
            application.company,
            application.status.label(),
            application.application_date,
            deadline,
            application.source
        );
        println!(
            "    resume: {} | cover letter: {}",
            enriched.resume_name, enriched.cover_letter_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(user: u64) -> ListArgs {
        ListArgs {
            user,
            status: None,
            company: None,
            position: None,
            source: None,
            date: None,
            deadline: None,
        }
    }

    #[test]
    fn criteria_follow_flag_order() {
        let mut list = args(42);
        list.company = Some("Acme".to_string());
        list.status = Some("not answered".to_string());

        let criteria = list.criteria().expect("valid flags");
        let collected: Vec<_> = criteria.iter().cloned().collect();
        assert_eq!(
            collected,
            vec![
                FilterCriterion::Status(ApplicationStatus::NotAnswered),
                FilterCriterion::Company("Acme".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_status_flag_is_an_error() {
        let mut list = args(42);
        list.status = Some("ghosted".to_string());
        assert!(matches!(
            list.criteria(),
            Err(CriterionError::InvalidStatus(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_surfaces_listing_error() {
        match run_list(args(99)).await {
            Err(AppError::Listing(ListingError::Filter(_))) => {}
            other => panic!("expected listing error, got {other:?}"),
        }
    }
}
