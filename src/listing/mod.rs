pub mod filter;
pub mod possession;
pub mod samples;

use crate::api::{self, ApiRequest};
use crate::models::entities::PropertyType;
use crate::models::{ListingType, Property, PropertyDocument, Resource};
use crate::store::{Session, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub use filter::{distinct_cities, ListingFilter, PriceBand};
pub use possession::{possession_bucket, possession_status, PossessionStatus};

const PROPERTIES_PATH: &str = "/properties";

/// Server-side search parameters sent when the view refetches
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingQuery {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<ListingType>,
}

impl ListingQuery {
    fn into_request(self) -> ApiRequest {
        let mut request = ApiRequest::get(PROPERTIES_PATH);
        if let Some(city) = self.city.filter(|c| !c.is_empty()) {
            request = request.with_query("city", city);
        }
        if let Some(kind) = self.property_type.filter(|t| !t.is_empty()) {
            request = request.with_query("type", kind);
        }
        if let Some(listing_type) = self.listing_type {
            request = request.with_query("listingType", listing_type.to_string());
        }
        request
    }
}

/// A property together with the label its card shows
#[derive(Debug, Clone, Serialize)]
pub struct ListingCard<'a> {
    #[serde(flatten)]
    pub property: &'a Property,
    pub possession_status: PossessionStatus,
}

/// Public browse/search view over the property catalogue
pub struct ListingView {
    session: Session,
    properties: Vec<Property>,
    cities: Vec<String>,
    loading: bool,
    pub filter: ListingFilter,
}

impl ListingView {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            properties: Vec::new(),
            cities: Vec::new(),
            loading: false,
            filter: ListingFilter::default(),
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the catalogue and rebuild the city list.
    ///
    /// In demo mode the built-in sample catalogue is used instead.
    pub async fn refresh(&mut self, query: ListingQuery, now: DateTime<Utc>) -> Result<(), StoreError> {
        if self.session.demo_mode {
            info!("Demo mode: serving sample listings");
            self.replace(samples::sample_listings(now));
            return Ok(());
        }

        self.loading = true;
        let type_names = self.type_names().await;
        let result = api::fetch::<Vec<PropertyDocument>>(
            self.session.transport.as_ref(),
            query.into_request(),
        )
        .await;
        self.loading = false;

        let envelope = result.map_err(|e| self.session.report(e))?;
        let properties = envelope
            .data
            .unwrap_or_default()
            .iter()
            .map(|doc| doc.flatten(&type_names))
            .collect();
        self.replace(properties);
        Ok(())
    }

    /// Properties passing the current filter, in catalogue order
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<ListingCard<'_>> {
        self.filter
            .apply(&self.properties, now)
            .into_iter()
            .map(|property| ListingCard {
                property,
                possession_status: possession_status(property.listed_date, now),
            })
            .collect()
    }

    fn replace(&mut self, properties: Vec<Property>) {
        self.cities = distinct_cities(&properties);
        self.properties = properties;
        debug!(
            "Listing view holds {} properties across {} cities",
            self.properties.len(),
            self.cities.len()
        );
    }

    /// id to display-name lookup for bare type references.
    /// A failure here only costs type names, so it is logged, not raised.
    async fn type_names(&self) -> HashMap<String, String> {
        match api::fetch::<Vec<PropertyType>>(
            self.session.transport.as_ref(),
            ApiRequest::get(PropertyType::PATH),
        )
        .await
        {
            Ok(envelope) => envelope
                .data
                .unwrap_or_default()
                .into_iter()
                .filter_map(|kind| kind.id.clone().map(|id| (id, kind.name)))
                .collect(),
            Err(err) => {
                warn!("Could not load property types: {}", err);
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Transport};
    use crate::store::notify::{Notice, RecordingNotifier};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Answers by path so the order of the two fetches does not matter
    struct RoutedTransport {
        routes: HashMap<&'static str, Result<Value, ApiError>>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for RoutedTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
            let reply = self
                .routes
                .get(request.path.as_str())
                .cloned()
                .unwrap_or(Err(ApiError::Http { status: 404, body: None }));
            self.seen.lock().unwrap().push(request);
            reply
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn view(routes: HashMap<&'static str, Result<Value, ApiError>>) -> (ListingView, Arc<RoutedTransport>, Arc<RecordingNotifier>) {
        let transport = Arc::new(RoutedTransport {
            routes,
            seen: Mutex::default(),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Session::new(transport.clone(), notifier.clone());
        (ListingView::new(session), transport, notifier)
    }

    #[tokio::test]
    async fn refresh_resolves_types_and_derives_cities() {
        let (mut view, transport, _) = view(HashMap::from([
            (
                "/propertytypes",
                Ok(json!({"data": [{"_id": "t1", "name": "Villa"}]})),
            ),
            (
                "/properties",
                Ok(json!({"data": [
                    {"_id": "a", "name": "Palm Villa", "type": "t1", "city": "Goa", "price": 12000000},
                    {"_id": "b", "name": "Hill Flat", "type": {"_id": "t2", "name": "Apartment"}, "city": "Pune", "price": 4000000},
                    {"_id": "c", "name": "Beach Flat", "city": "Goa", "price": 6000000}
                ]})),
            ),
        ]));

        let query = ListingQuery {
            city: Some("Goa".to_string()),
            ..Default::default()
        };
        view.refresh(query, now()).await.unwrap();

        assert_eq!(view.cities().to_vec(), vec!["Goa".to_string(), "Pune".to_string()]);
        assert_eq!(view.properties()[0].property_type, "Villa");
        assert_eq!(view.properties()[1].property_type, "Apartment");
        assert!(!view.is_loading());

        let seen = transport.seen.lock().unwrap();
        let fetch = seen.iter().find(|r| r.path == "/properties").unwrap();
        assert_eq!(fetch.query, vec![("city".to_string(), "Goa".to_string())]);
    }

    #[tokio::test]
    async fn visible_applies_filter_and_labels_cards() {
        let (mut view, _, _) = view(HashMap::from([
            ("/propertytypes", Ok(json!({"data": []}))),
            (
                "/properties",
                Ok(json!({"data": [
                    {"_id": "a", "name": "Ready Home", "city": "Pune", "price": 3000000},
                    {"_id": "b", "name": "Tower B", "city": "Pune", "price": 8000000, "listedDate": "2024-07-01T00:00:00Z"}
                ]})),
            ),
        ]));
        view.refresh(ListingQuery::default(), now()).await.unwrap();

        view.filter.price_band = Some(PriceBand::From50LTo1Cr);
        let cards = view.visible(now());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].property.id, "b");
        assert_eq!(cards[0].possession_status, PossessionStatus::NewLaunch);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_catalogue_and_notifies() {
        let (mut view, _, notifier) = view(HashMap::from([(
            "/properties",
            Err(ApiError::Timeout),
        )]));

        assert!(view.refresh(ListingQuery::default(), now()).await.is_err());
        assert!(view.properties().is_empty());
        assert!(!view.is_loading());
        assert_eq!(
            notifier.last(),
            Some(Notice::error("The request timed out. Please try again."))
        );
    }

    #[tokio::test]
    async fn demo_mode_serves_samples_without_requests() {
        let (view, transport, _) = view(HashMap::new());
        let mut view = ListingView::new(view.session.with_demo_mode(true));

        view.refresh(ListingQuery::default(), now()).await.unwrap();
        assert!(!view.properties().is_empty());
        assert!(!view.cities().is_empty());
        assert!(transport.seen.lock().unwrap().is_empty());
    }
}
