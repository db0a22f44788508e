pub mod document;
pub mod entities;
pub mod serde_utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use document::PropertyDocument;
pub use entities::{Resource, Validate};

/// Commercial status of a listing as sent by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyStatus {
    #[serde(rename = "FOR SALE")]
    ForSale,
    #[serde(rename = "FOR RENT")]
    ForRent,
    #[serde(rename = "RENT")]
    Rent,
    #[serde(rename = "LEASE")]
    Lease,
}

impl PropertyStatus {
    /// Parse a backend status string, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "FOR SALE" => Some(Self::ForSale),
            "FOR RENT" => Some(Self::ForRent),
            "RENT" => Some(Self::Rent),
            "LEASE" => Some(Self::Lease),
            _ => None,
        }
    }

    pub fn listing_type(self) -> ListingType {
        match self {
            Self::ForSale => ListingType::Sale,
            Self::ForRent | Self::Rent | Self::Lease => ListingType::Rent,
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ForSale => "FOR SALE",
            Self::ForRent => "FOR RENT",
            Self::Rent => "RENT",
            Self::Lease => "LEASE",
        };
        f.write_str(label)
    }
}

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingType {
    Sale,
    Rent,
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => f.write_str("Sale"),
            Self::Rent => f.write_str("Rent"),
        }
    }
}

/// Property record flattened for the listing view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub status: Option<PropertyStatus>,
    pub listing_type: Option<ListingType>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<f64>,
    pub listed_date: Option<DateTime<Utc>>,
}

/// Response shape shared by every backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: Option<String>,
    pub data: Option<T>,
    pub count: Option<u64>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            message: None,
            data: None,
            count: None,
        }
    }
}
