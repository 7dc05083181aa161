//! Stateless HTTP request builder and response parser for the contacts API.
//!
//! # Design
//! `ContactClient` holds only the base URL and the precomputed auth header.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The convenience methods without a prefix run build → `Transport` → parse
//! in one call; local validation always happens before the transport is
//! touched.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::{FilterCondition, QueryBatch, QueryBatcher};
use crate::types::{Contact, ContactEnvelope, SearchResults};

const CONTACTS_PATH: &str = "/api/v2/contacts";
const SEARCH_CONTACTS_PATH: &str = "/api/v2/search/contacts";

/// Synchronous, stateless client for the Freshservice contacts resource.
#[derive(Debug, Clone)]
pub struct ContactClient {
    base_url: String,
    authorization: Option<String>,
}

impl ContactClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: None,
        }
    }

    /// Freshservice authenticates API keys as basic auth with `X` as the
    /// password.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        let token = STANDARD.encode(format!("{api_key}:X"));
        self.authorization = Some(format!("Basic {token}"));
        self
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(&config.base_url);
        match &config.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(auth) = &self.authorization {
            headers.push(("authorization".to_string(), auth.clone()));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        debug!(method = method.as_str(), %path, "built request");
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }

    // --- build ---

    pub fn build_list_contacts(&self) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{}{CONTACTS_PATH}", self.base_url),
            None,
        )
    }

    pub fn build_get_contact(&self, id: u64) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{}{CONTACTS_PATH}/{id}", self.base_url),
            None,
        )
    }

    /// Search for contacts matching any clause of `query`.
    pub fn build_filter_contacts(&self, query: &QueryBatch) -> HttpRequest {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("query", query.as_str())
            .finish();
        self.request(
            HttpMethod::Get,
            format!("{}{SEARCH_CONTACTS_PATH}?{encoded}", self.base_url),
            None,
        )
    }

    pub fn build_create_contact(&self, contact: &Contact) -> Result<HttpRequest, ApiError> {
        contact.validate_for_create().inspect_err(|e| {
            warn!(error = %e, "rejected contact before create");
        })?;
        let body = to_json(contact)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}{CONTACTS_PATH}", self.base_url),
            Some(body),
        ))
    }

    pub fn build_update_contact(&self, contact: &Contact) -> Result<HttpRequest, ApiError> {
        contact.validate_for_update().inspect_err(|e| {
            warn!(error = %e, "rejected contact before update");
        })?;
        let body = to_json(contact)?;
        Ok(self.request(
            HttpMethod::Put,
            format!("{}{CONTACTS_PATH}/{}", self.base_url, contact.id),
            Some(body),
        ))
    }

    // --- parse ---

    pub fn parse_list_contacts(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response.body)
    }

    pub fn parse_get_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        check_status(&response, &[200])?;
        from_json::<ContactEnvelope>(&response.body).map(ContactEnvelope::into_contact)
    }

    pub fn parse_filter_contacts(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        check_status(&response, &[200])?;
        let envelope: SearchResults = from_json(&response.body)?;
        Ok(envelope.results)
    }

    pub fn parse_create_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        check_status(&response, &[200, 201])?;
        from_json::<ContactEnvelope>(&response.body).map(ContactEnvelope::into_contact)
    }

    pub fn parse_update_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        check_status(&response, &[200])?;
        from_json::<ContactEnvelope>(&response.body).map(ContactEnvelope::into_contact)
    }

    // --- round-trips ---

    pub fn list_contacts<T: Transport>(&self, transport: &T) -> Result<Vec<Contact>, ApiError> {
        let response = transport.execute(self.build_list_contacts())?;
        self.parse_list_contacts(response)
    }

    pub fn get_contact<T: Transport>(&self, transport: &T, id: u64) -> Result<Contact, ApiError> {
        let response = transport.execute(self.build_get_contact(id))?;
        self.parse_get_contact(response)
    }

    pub fn filter_contacts<T: Transport>(
        &self,
        transport: &T,
        query: &QueryBatch,
    ) -> Result<Vec<Contact>, ApiError> {
        let response = transport.execute(self.build_filter_contacts(query))?;
        self.parse_filter_contacts(response)
    }

    /// Run one search per batch until every condition has been sent, and
    /// concatenate the results in batch order. Stops at the first error.
    ///
    /// A contact matching clauses in two different batches appears twice.
    pub fn filter_all_contacts<T: Transport>(
        &self,
        transport: &T,
        batcher: &QueryBatcher,
        conditions: &[FilterCondition],
    ) -> Result<Vec<Contact>, ApiError> {
        let mut contacts = Vec::new();
        for batch in batcher.batches(conditions) {
            contacts.extend(self.filter_contacts(transport, &batch)?);
        }
        Ok(contacts)
    }

    pub fn create_contact<T: Transport>(
        &self,
        transport: &T,
        contact: &Contact,
    ) -> Result<Contact, ApiError> {
        let request = self.build_create_contact(contact)?;
        self.parse_create_contact(transport.execute(request)?)
    }

    pub fn update_contact<T: Transport>(
        &self,
        transport: &T,
        contact: &Contact,
    ) -> Result<Contact, ApiError> {
        let request = self.build_update_contact(contact)?;
        self.parse_update_contact(transport.execute(request)?)
    }
}

fn to_json(contact: &Contact) -> Result<String, ApiError> {
    serde_json::to_string(contact).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
