use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Contact};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_contacts_empty() {
    let resp = app().oneshot(get("/api/v2/contacts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let contacts: Vec<Contact> = body_json(resp).await;
    assert!(contacts.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_contact_returns_201_wrapped() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v2/contacts",
            r#"{"name":"Ada","email":"ada@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["contact"]["id"], 1);
    assert_eq!(body["contact"]["name"], "Ada");
    assert_eq!(body["contact"]["active"], true);
}

#[tokio::test]
async fn create_contact_without_method_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v2/contacts", r#"{"name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["description"], "Validation failed");
}

// --- get / update ---

#[tokio::test]
async fn get_contact_not_found() {
    let resp = app().oneshot(get("/api/v2/contacts/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_contact_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/v2/contacts/not-a-number")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_contact_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v2/contacts/99", r#"{"name":"Nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- search ---

#[tokio::test]
async fn search_without_quotes_returns_400() {
    let resp = app()
        .oneshot(get("/api/v2/search/contacts?query=email%3A+%27a%40x.com%27"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_over_limit_returns_400() {
    let long = "x".repeat(600);
    let uri = format!("/api/v2/search/contacts?query=%22name%3A+%27{long}%27%22");
    let resp = app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full lifecycle ---

#[tokio::test]
async fn create_update_search_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    for body in [
        r#"{"name":"Ada","email":"ada@example.com"}"#,
        r#"{"name":"Grace","mobile":"555-0100"}"#,
        r#"{"name":"Linus","email":"linus@example.com"}"#,
    ] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/api/v2/contacts", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // partial update of job_title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/api/v2/contacts/2", r#"{"job_title":"Admiral"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["contact"]["name"], "Grace"); // unchanged
    assert_eq!(body["contact"]["job_title"], "Admiral");

    // search: email OR job_title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(
            "/api/v2/search/contacts?query=%22email%3A+%27ada%40example.com%27+OR+job_title%3A+%27Admiral%27%22",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["total"], 2);
    let ids: Vec<u64> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    // search: numeric id clause
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v2/search/contacts?query=%22id%3A+3%22"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["results"][0]["name"], "Linus");

    // list: all three
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v2/contacts"))
        .await
        .unwrap();
    let contacts: Vec<Contact> = body_json(resp).await;
    assert_eq!(contacts.len(), 3);
}
