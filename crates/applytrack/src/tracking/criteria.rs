//! Typed filter criteria over a user's applications.
//!
//! Raw query pairs are mapped onto a closed set of fields here, so the engine only
//! ever sees predicates it knows how to evaluate.

use std::fmt;

use chrono::NaiveDate;

use super::domain::{ApplicationRecord, ApplicationStatus};

/// Fields an application listing can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Status,
    Company,
    Position,
    Source,
    Date,
    Deadline,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Status,
        FilterField::Company,
        FilterField::Position,
        FilterField::Source,
        FilterField::Date,
        FilterField::Deadline,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            FilterField::Status => "status",
            FilterField::Company => "company",
            FilterField::Position => "position",
            FilterField::Source => "source",
            FilterField::Date => "date",
            FilterField::Deadline => "deadline",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single field/value predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    Status(ApplicationStatus),
    Company(String),
    Position(String),
    Source(String),
    Date(NaiveDate),
    Deadline(NaiveDate),
}

impl FilterCriterion {
    pub fn field(&self) -> FilterField {
        match self {
            FilterCriterion::Status(_) => FilterField::Status,
            FilterCriterion::Company(_) => FilterField::Company,
            FilterCriterion::Position(_) => FilterField::Position,
            FilterCriterion::Source(_) => FilterField::Source,
            FilterCriterion::Date(_) => FilterField::Date,
            FilterCriterion::Deadline(_) => FilterField::Deadline,
        }
    }

    /// Parses `raw` as a value for `field`. Returns `Ok(None)` for a blank value.
    pub fn parse(field: FilterField, raw: &str) -> Result<Option<Self>, CriterionError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let criterion = match field {
            FilterField::Status => ApplicationStatus::parse(value)
                .map(FilterCriterion::Status)
                .ok_or_else(|| CriterionError::InvalidStatus(value.to_string()))?,
            FilterField::Company => FilterCriterion::Company(value.to_string()),
            FilterField::Position => FilterCriterion::Position(value.to_string()),
            FilterField::Source => FilterCriterion::Source(value.to_string()),
            FilterField::Date => FilterCriterion::Date(parse_day(field, value)?),
            FilterField::Deadline => FilterCriterion::Deadline(parse_day(field, value)?),
        };
        Ok(Some(criterion))
    }

    /// Evaluates the predicate against a stored record.
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        match self {
            FilterCriterion::Status(status) => record.status == *status,
            FilterCriterion::Company(company) => record.company == *company,
            FilterCriterion::Position(position) => record.position == *position,
            FilterCriterion::Source(source) => record.source == *source,
            FilterCriterion::Date(date) => record.application_date == *date,
            FilterCriterion::Deadline(deadline) => record.deadline == Some(*deadline),
        }
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCriterion::Status(status) => write!(f, "status={}", status.label()),
            FilterCriterion::Company(value) => write!(f, "company={value}"),
            FilterCriterion::Position(value) => write!(f, "position={value}"),
            FilterCriterion::Source(value) => write!(f, "source={value}"),
            FilterCriterion::Date(value) => write!(f, "date={value}"),
            FilterCriterion::Deadline(value) => write!(f, "deadline={value}"),
        }
    }
}

fn parse_day(field: FilterField, value: &str) -> Result<NaiveDate, CriterionError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CriterionError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Active criteria in the order the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    criteria: Vec<FilterCriterion>,
}

impl FilterCriteria {
    pub fn new(criteria: Vec<FilterCriterion>) -> Self {
        Self { criteria }
    }

    /// Builds criteria from raw key/value pairs, skipping unknown keys and blank values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CriterionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Vec::new();
        for (key, value) in pairs {
            let Some(field) = FilterField::from_key(key.as_ref()) else {
                continue;
            };
            if let Some(criterion) = FilterCriterion::parse(field, value.as_ref())? {
                criteria.push(criterion);
            }
        }
        Ok(Self { criteria })
    }

    pub fn push(&mut self, criterion: FilterCriterion) {
        self.criteria.push(criterion);
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterCriterion> {
        self.criteria.iter()
    }
}

/// Raised when a recognised field carries a value it cannot hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriterionError {
    #[error("unknown application status '{0}'")]
    InvalidStatus(String),
    #[error("{field} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { field: FilterField, value: String },
}
