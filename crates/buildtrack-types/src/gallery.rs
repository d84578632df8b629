//! Year/month filtering and ordering of project photo collections.
//!
//! Filters are evaluated against `created_at` in UTC. Both sides of a
//! [`PeriodFilter`] accept `"all"` to mean no constraint.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Datelike;
use thiserror::Error;

use crate::models::ProjectImage;

const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid year '{0}'")]
    Year(String),
    #[error("invalid month '{0}', expected 1-12 or 'all'")]
    Month(String),
}

/// A (year, month) pair where `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodFilter {
    pub fn new(year: Option<i32>, month: Option<u32>) -> Self {
        Self { year, month }
    }

    /// Parse the query-string form. Absent, empty and `"all"` are unconstrained.
    pub fn parse(year: Option<&str>, month: Option<&str>) -> Result<Self, FilterError> {
        let year = match year.map(str::trim) {
            None | Some("") | Some(ALL) => None,
            Some(y) => Some(i32::from_str(y).map_err(|_| FilterError::Year(y.to_string()))?),
        };
        let month = match month.map(str::trim) {
            None | Some("") | Some(ALL) => None,
            Some(m) => {
                let parsed = u32::from_str(m).map_err(|_| FilterError::Month(m.to_string()))?;
                if !(1..=12).contains(&parsed) {
                    return Err(FilterError::Month(m.to_string()));
                }
                Some(parsed)
            }
        };
        Ok(Self { year, month })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.year.is_none() && self.month.is_none()
    }

    pub fn matches(&self, image: &ProjectImage) -> bool {
        let at = image.created_at;
        self.year.is_none_or(|y| at.year() == y) && self.month.is_none_or(|m| at.month() == m)
    }
}

/// Images matching both sides of the filter, in input order.
pub fn filter_images(images: &[ProjectImage], filter: &PeriodFilter) -> Vec<ProjectImage> {
    if filter.is_unconstrained() {
        return images.to_vec();
    }
    images.iter().filter(|img| filter.matches(img)).cloned().collect()
}

/// Stable sort, newest `created_at` first.
pub fn sort_newest_first(images: &mut [ProjectImage]) {
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Distinct years present, newest first.
pub fn available_years(images: &[ProjectImage]) -> Vec<i32> {
    let years: BTreeSet<i32> = images.iter().map(|img| img.created_at.year()).collect();
    years.into_iter().rev().collect()
}

/// Distinct months (1-12) present in `year`, ascending.
pub fn available_months(images: &[ProjectImage], year: i32) -> Vec<u32> {
    let months: BTreeSet<u32> = images
        .iter()
        .filter(|img| img.created_at.year() == year)
        .map(|img| img.created_at.month())
        .collect();
    months.into_iter().collect()
}
