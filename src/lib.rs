pub mod api;
pub mod config;
pub mod listing;
pub mod models;
pub mod settings;
pub mod store;

pub use api::{ApiError, MessageTable, RestClient, Transport};
pub use config::Config;
pub use listing::{ListingFilter, ListingQuery, ListingView, PossessionStatus, PriceBand};
pub use models::{ListingType, Property, PropertyStatus};
pub use store::{EntityStore, Session, StoreError};
