use super::serde_utils::flexible_datetime;
use super::{Property, PropertyStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference to a property type, either populated by the backend or a bare id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TypeRef {
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Id(String),
}

/// Nested location block some endpoints send instead of top-level fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationBlock {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Property as stored by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub type_ref: Option<TypeRef>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub location: Option<LocationBlock>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub property_status: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub listed_date: Option<DateTime<Utc>>,
}

impl PropertyDocument {
    /// Resolve the display name of this document's type.
    ///
    /// A populated reference wins; a bare id is looked up in `type_names`.
    pub fn type_name(&self, type_names: &HashMap<String, String>) -> String {
        match &self.type_ref {
            Some(TypeRef::Populated { name: Some(name), .. }) => name.clone(),
            Some(TypeRef::Populated { id: Some(id), name: None }) | Some(TypeRef::Id(id)) => {
                type_names.get(id).cloned().unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    /// Flatten into the record the listing view filters on
    pub fn flatten(&self, type_names: &HashMap<String, String>) -> Property {
        let nested = self.location.clone().unwrap_or_default();
        let status = self
            .property_status
            .as_deref()
            .and_then(PropertyStatus::parse);

        Property {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            property_type: self.type_name(type_names),
            address: self.address.clone().or(nested.address).unwrap_or_default(),
            city: self.city.clone().or(nested.city).unwrap_or_default(),
            price: self.price.unwrap_or(0.0),
            status,
            listing_type: status.map(PropertyStatus::listing_type),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            listed_date: self.listed_date,
        }
    }
}
