use super::possession::{possession_bucket, PossessionStatus};
use crate::models::{ListingType, Property};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Fixed price bands offered by the search form.
///
/// Each band includes its lower bound and excludes its upper bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriceBand {
    Under50L,
    From50LTo1Cr,
    From1CrTo2Cr,
    From2CrTo5Cr,
    Above5Cr,
}

impl PriceBand {
    pub const ALL: [PriceBand; 5] = [
        Self::Under50L,
        Self::From50LTo1Cr,
        Self::From1CrTo2Cr,
        Self::From2CrTo5Cr,
        Self::Above5Cr,
    ];

    /// `(inclusive lower, exclusive upper)` bounds.
    ///
    /// Upper bounds are exclusive so a boundary price falls in exactly one
    /// band. Exactly 5Cr is therefore "Above 5Cr", not "2Cr - 5Cr".
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Under50L => (None, Some(50.0 * LAKH)),
            Self::From50LTo1Cr => (Some(50.0 * LAKH), Some(CRORE)),
            Self::From1CrTo2Cr => (Some(CRORE), Some(2.0 * CRORE)),
            Self::From2CrTo5Cr => (Some(2.0 * CRORE), Some(5.0 * CRORE)),
            Self::Above5Cr => (Some(5.0 * CRORE), None),
        }
    }

    pub fn contains(self, price: f64) -> bool {
        let (lower, upper) = self.bounds();
        lower.map_or(true, |lo| price >= lo) && upper.map_or(true, |hi| price < hi)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under50L => "Under 50L",
            Self::From50LTo1Cr => "50L - 1Cr",
            Self::From1CrTo2Cr => "1Cr - 2Cr",
            Self::From2CrTo5Cr => "2Cr - 5Cr",
            Self::Above5Cr => "Above 5Cr",
        }
    }

    /// Parse a band label, ignoring case and spacing
    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL.into_iter().find(|band| {
            let label: String = band.label().chars().filter(|c| !c.is_whitespace()).collect();
            label.eq_ignore_ascii_case(&wanted)
        })
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Search state of the listing view. `None` or blank fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingFilter {
    /// Exact, case-sensitive city match
    pub city: Option<String>,
    /// Exact match on the resolved type name
    pub property_type: Option<String>,
    pub price_band: Option<PriceBand>,
    pub possession: Option<PossessionStatus>,
    pub listing_type: Option<ListingType>,
    /// Case-insensitive substring of name, address or description
    pub query: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        active(&self.city).is_none()
            && active(&self.property_type).is_none()
            && self.price_band.is_none()
            && self.possession.is_none()
            && self.listing_type.is_none()
            && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }

    pub fn matches(&self, property: &Property, now: DateTime<Utc>) -> bool {
        self.matches_city(property)
            && self.matches_type(property)
            && self.matches_price(property)
            && self.matches_possession(property, now)
            && self.matches_listing_type(property)
            && self.matches_query(property)
    }

    /// Apply the whole chain, preserving input order
    pub fn apply<'a>(&self, properties: &'a [Property], now: DateTime<Utc>) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p, now)).collect()
    }

    fn matches_city(&self, property: &Property) -> bool {
        active(&self.city).map_or(true, |city| property.city == city)
    }

    fn matches_type(&self, property: &Property) -> bool {
        active(&self.property_type).map_or(true, |name| property.property_type == name)
    }

    fn matches_price(&self, property: &Property) -> bool {
        self.price_band.map_or(true, |band| band.contains(property.price))
    }

    fn matches_possession(&self, property: &Property, now: DateTime<Utc>) -> bool {
        self.possession
            .map_or(true, |wanted| possession_bucket(property.listed_date, now) == wanted)
    }

    fn matches_listing_type(&self, property: &Property) -> bool {
        self.listing_type
            .map_or(true, |wanted| property.listing_type == Some(wanted))
    }

    fn matches_query(&self, property: &Property) -> bool {
        let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) else {
            return true;
        };
        let query = query.to_lowercase();
        [&property.name, &property.address, &property.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Distinct non-empty cities in first-seen order
pub fn distinct_cities(properties: &[Property]) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for property in properties {
        if !property.city.is_empty() && !cities.contains(&property.city) {
            cities.push(property.city.clone());
        }
    }
    cities
}
