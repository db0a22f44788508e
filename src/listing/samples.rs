use crate::models::{Property, PropertyStatus};
use chrono::{DateTime, Duration, Utc};

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    name: &str,
    property_type: &str,
    address: &str,
    city: &str,
    price: f64,
    status: PropertyStatus,
    bedrooms: u32,
    area: f64,
    listed_date: Option<DateTime<Utc>>,
) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} in {}, {}. {} BHK, {} sq ft.", property_type, address, city, bedrooms, area),
        property_type: property_type.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        price,
        status: Some(status),
        listing_type: Some(status.listing_type()),
        bedrooms: Some(bedrooms),
        bathrooms: Some(bedrooms.saturating_sub(1).max(1)),
        area: Some(area),
        listed_date,
    }
}

/// Catalogue shown while demo mode is on.
///
/// Listing dates are relative to `now` so every possession bucket stays populated.
pub fn sample_listings(now: DateTime<Utc>) -> Vec<Property> {
    vec![
        sample(
            "demo_1",
            "Sea Breeze Residency",
            "Apartment",
            "Carter Road, Bandra West",
            "Mumbai",
            42_500_000.0,
            PropertyStatus::ForSale,
            3,
            1450.0,
            Some(now - Duration::days(90)),
        ),
        sample(
            "demo_2",
            "Koregaon Greens",
            "Apartment",
            "Lane 5, Koregaon Park",
            "Pune",
            9_800_000.0,
            PropertyStatus::ForSale,
            2,
            980.0,
            Some(now + Duration::days(60)),
        ),
        sample(
            "demo_3",
            "Whitefield Towers",
            "Apartment",
            "ITPL Main Road, Whitefield",
            "Bengaluru",
            16_500_000.0,
            PropertyStatus::ForSale,
            3,
            1600.0,
            Some(now + Duration::days(270)),
        ),
        sample(
            "demo_4",
            "Palm Grove Villa",
            "Villa",
            "Candolim Beach Road",
            "Goa",
            65_000_000.0,
            PropertyStatus::ForSale,
            4,
            3200.0,
            Some(now + Duration::days(500)),
        ),
        sample(
            "demo_5",
            "Baner Studio",
            "Studio",
            "Baner Road, Baner",
            "Pune",
            3_500_000.0,
            PropertyStatus::ForRent,
            1,
            420.0,
            None,
        ),
    ]
}
