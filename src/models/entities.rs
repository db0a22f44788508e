//! Back-office entities managed through [`crate::store::EntityStore`].
//!
//! Every entity keeps fields it does not model in `extra`, so an update
//! sends back whatever the backend attached to the record.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_utils::{flexible_datetime, null_as_default, optional_ref, required_ref};

/// A backend collection reachable under one base path
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Base path, e.g. `/leads`
    const PATH: &'static str;
    /// Singular name used in notices
    const LABEL: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);
}

/// Required-field check run before a draft reaches the backend
pub trait Validate {
    fn missing_fields(&self) -> Vec<&'static str>;
}

macro_rules! resource {
    ($ty:ident, $path:literal, $label:literal, required: [$($field:ident),* $(,)?]) => {
        impl Resource for $ty {
            const PATH: &'static str = $path;
            const LABEL: &'static str = $label;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: String) {
                self.id = Some(id);
            }
        }

        impl Validate for $ty {
            fn missing_fields(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if self.$field.trim().is_empty() {
                        missing.push(stringify!($field));
                    }
                )*
                missing
            }
        }
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "optional_ref")]
    pub reference_source: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "optional_ref")]
    pub property_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Lead, "/leads", "Lead", required: [name, phone]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_ref")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(User, "/users", "User", required: [name, email]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Role {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Role, "/roles", "Role", required: [name]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "optional_ref")]
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Document, "/documents", "Document", required: [title, file_url]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "optional_ref")]
    pub lead_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Meeting, "/meetings", "Meeting", required: [title]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyType {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(PropertyType, "/propertytypes", "Property type", required: [name]);

/// Property as edited in the back office, before flattening
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "optional_ref")]
    pub type_id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub property_status: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub listed_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(PropertyRecord, "/properties", "Property", required: [name, address, city]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "required_ref")]
    pub property_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buyer_name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Sale, "/sales", "Sale", required: [property_id, buyer_name]);

/// Where a lead heard about the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSource {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(ReferenceSource, "/referancesource", "Reference source", required: [name]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Testimonial, "/testimonials", "Testimonial", required: [author, message]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(Banner, "/banners", "Banner", required: [title, image_url]);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePicture {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "required_ref")]
    pub user_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

resource!(ProfilePicture, "/file/userprofilepicture", "Profile picture", required: [user_id]);
