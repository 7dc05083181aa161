//! Domain DTOs for the Freshservice contacts resource.
//!
//! # Design
//! Only the fields this client needs are modelled; more are added as callers
//! need them. Every field is optional on the wire: zero values (empty
//! strings, `false`, `0`, empty lists) are skipped on serialization so a
//! partially filled `Contact` can be sent as a create or update body without
//! clobbering server-side values.
//!
//! The mock-server crate defines its own copy of this schema; integration
//! tests catch drift between the two.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// The server sends `null` for unset fields; read it as the zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A requester contact. See the `contact_attributes` section of the
/// Freshservice v2 API reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "is_false", deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    pub company_id: u64,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "null_as_default")]
    pub view_all_tickets: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_default")]
    pub custom_fields: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "null_as_default")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub mobile: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub other_emails: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub time_zone: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub twitter_id: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub unique_external_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub other_companies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// True if at least one field the server accepts as a way of reaching
    /// the contact is set.
    pub fn has_contact_method(&self) -> bool {
        [
            &self.email,
            &self.phone,
            &self.mobile,
            &self.twitter_id,
            &self.unique_external_id,
        ]
        .iter()
        .any(|s| !s.is_empty())
    }

    /// Checks the two fields the server requires on create.
    pub fn validate_for_create(&self) -> Result<(), ApiError> {
        if self.name.is_empty() {
            return Err(ApiError::Validation(
                "name is a required field for new contacts".to_string(),
            ));
        }
        if !self.has_contact_method() {
            return Err(ApiError::Validation(
                "at least one of email, phone, mobile, twitter_id, unique_external_id must be provided"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_for_update(&self) -> Result<(), ApiError> {
        if self.id == 0 {
            return Err(ApiError::Validation(
                "id is required to update a contact".to_string(),
            ));
        }
        Ok(())
    }
}

/// Envelope returned by the search endpoint. Only `results` is handed to
/// callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    pub results: Vec<Contact>,
}

/// Single-record responses arrive either bare or wrapped as
/// `{"contact": {...}}` depending on the endpoint.
///
/// A `contact` key selects the wrapped form and its value must decode. A
/// bare record must carry an `id`; any other object is an error rather than
/// an empty `Contact`.
#[derive(Debug)]
pub(crate) struct ContactEnvelope(Contact);

impl<'de> Deserialize<'de> for ContactEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        let Some(object) = value.as_object_mut() else {
            return Err(DeError::custom("expected a contact object"));
        };
        let record = match object.remove("contact") {
            Some(inner) => inner,
            None if object.contains_key("id") => value,
            None => return Err(DeError::custom("missing field `contact` or `id`")),
        };
        Contact::deserialize(record)
            .map(ContactEnvelope)
            .map_err(DeError::custom)
    }
}

impl ContactEnvelope {
    pub(crate) fn into_contact(self) -> Contact {
        self.0
    }
}
