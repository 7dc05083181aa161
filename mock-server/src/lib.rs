//! In-memory stand-in for the Freshservice contacts endpoints.
//!
//! Serves `/api/v2/contacts` and `/api/v2/search/contacts` with the same
//! shapes and the same create-time validation as the real service, closely
//! enough for the client's integration tests.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// Server-side cap on the `query` parameter of the search endpoint.
pub const QUERY_LIMIT: usize = 512;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create and update requests. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub twitter_id: Option<String>,
    pub unique_external_id: Option<String>,
    pub job_title: Option<String>,
    pub company_id: Option<u64>,
}

impl ContactInput {
    fn validate_for_create(&self) -> Result<(), String> {
        if self.name.as_deref().unwrap_or("").is_empty() {
            return Err("name: missing".to_string());
        }
        let has_method = [
            &self.email,
            &self.phone,
            &self.mobile,
            &self.twitter_id,
            &self.unique_external_id,
        ]
        .iter()
        .any(|v| v.as_deref().is_some_and(|s| !s.is_empty()));
        if !has_method {
            return Err("email: at least one contact method is required".to_string());
        }
        Ok(())
    }

    fn apply(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(active) = self.active {
            contact.active = active;
        }
        for (slot, value) in [
            (&mut contact.email, self.email),
            (&mut contact.phone, self.phone),
            (&mut contact.mobile, self.mobile),
            (&mut contact.twitter_id, self.twitter_id),
            (&mut contact.unique_external_id, self.unique_external_id),
            (&mut contact.job_title, self.job_title),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        if self.company_id.is_some() {
            contact.company_id = self.company_id;
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    contacts: BTreeMap<u64, Contact>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/v2/contacts", get(list_contacts).post(create_contact))
        .route("/api/v2/contacts/{id}", get(get_contact).put(update_contact))
        .route("/api/v2/search/contacts", get(search_contacts))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "description": "Validation failed", "errors": [message] })),
    )
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Record not found" })))
}

async fn list_contacts(State(db): State<Db>) -> Json<Vec<Contact>> {
    let store = db.read().await;
    Json(store.contacts.values().cloned().collect())
}

async fn create_contact(State(db): State<Db>, Json(input): Json<ContactInput>) -> ApiResult {
    input.validate_for_create().map_err(bad_request)?;

    let mut store = db.write().await;
    store.next_id += 1;
    let now = Utc::now();
    let mut contact = Contact {
        id: store.next_id,
        active: true,
        created_at: Some(now),
        updated_at: Some(now),
        ..Default::default()
    };
    input.apply(&mut contact);
    store.contacts.insert(contact.id, contact.clone());
    info!(id = contact.id, "created contact");
    Ok((StatusCode::CREATED, Json(json!({ "contact": contact }))))
}

async fn get_contact(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let store = db.read().await;
    let contact = store.contacts.get(&id).ok_or_else(not_found)?;
    Ok((StatusCode::OK, Json(json!({ "contact": contact }))))
}

async fn update_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ContactInput>,
) -> ApiResult {
    let mut store = db.write().await;
    let contact = store.contacts.get_mut(&id).ok_or_else(not_found)?;
    input.apply(contact);
    contact.updated_at = Some(Utc::now());
    info!(id, "updated contact");
    Ok((StatusCode::OK, Json(json!({ "contact": contact }))))
}

async fn search_contacts(State(db): State<Db>, Query(params): Query<SearchParams>) -> ApiResult {
    if params.query.len() > QUERY_LIMIT {
        return Err(bad_request(format!(
            "query: exceeds {QUERY_LIMIT} characters"
        )));
    }
    let clauses = parse_query(&params.query).map_err(bad_request)?;
    debug!(clauses = clauses.len(), "search");

    let store = db.read().await;
    let results: Vec<&Contact> = store
        .contacts
        .values()
        .filter(|c| clauses.iter().any(|clause| clause.matches(c)))
        .collect();
    Ok((
        StatusCode::OK,
        Json(json!({ "total": results.len(), "results": results })),
    ))
}

/// One `field: value` clause of a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    /// The value with surrounding single quotes removed.
    pub value: String,
}

impl Clause {
    fn matches(&self, contact: &Contact) -> bool {
        let actual = match self.field.as_str() {
            "id" => Some(contact.id.to_string()),
            "name" => Some(contact.name.clone()),
            "active" => Some(contact.active.to_string()),
            "company_id" => contact.company_id.map(|n| n.to_string()),
            "email" => contact.email.clone(),
            "phone" => contact.phone.clone(),
            "mobile" => contact.mobile.clone(),
            "job_title" => contact.job_title.clone(),
            _ => None,
        };
        actual.as_deref() == Some(self.value.as_str())
    }
}

const SEARCHABLE: &[&str] = &[
    "id",
    "name",
    "active",
    "company_id",
    "email",
    "phone",
    "mobile",
    "job_title",
];

/// Parse `"f: v OR f: 'v'"` into clauses.
pub fn parse_query(query: &str) -> Result<Vec<Clause>, String> {
    let inner = query
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "query: must be a non-empty double-quoted string".to_string())?;

    inner
        .split(" OR ")
        .map(|part| {
            let (field, raw) = part
                .split_once(": ")
                .ok_or_else(|| format!("query: malformed clause {part:?}"))?;
            if !SEARCHABLE.contains(&field) {
                return Err(format!("query: unsupported field {field:?}"));
            }
            let value = raw
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(raw);
            Ok(Clause {
                field: field.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}
