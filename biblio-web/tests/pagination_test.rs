//! End-to-end tests for the catalog CRUD and the response enrichment

use axum::body::Body;
use axum::http::header::LINK;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use biblio_web::pagination::{PAGE_COUNT_HEADER, TOTAL_COUNT_HEADER};
use biblio_web::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    create_app(AppState::new(WebConfig::default()).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn link_rels(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(LINK)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn has_rel(links: &[String], rel: &str) -> bool {
    links.iter().any(|link| link.ends_with(&format!("rel=\"{}\"", rel)))
}

#[tokio::test]
async fn first_page_links_forward_only() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init/25", None).await;

    let response = send(&app, Method::GET, "/authors/page?pageSize=10&page=1", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(response.headers()[TOTAL_COUNT_HEADER], "25");
    assert_eq!(response.headers()[PAGE_COUNT_HEADER], "2");

    let links = link_rels(&response);
    assert!(has_rel(&links, "next"));
    assert!(has_rel(&links, "last"));
    assert!(!has_rel(&links, "previous"));
    assert!(!has_rel(&links, "first"));

    // The envelope is stripped: the body is the bare content list.
    let json = body_json(response).await;
    let content = json.as_array().expect("body should be a plain array");
    assert_eq!(content.len(), 10);
}

#[tokio::test]
async fn last_page_links_backward_only() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init/25", None).await;

    let response = send(&app, Method::GET, "/authors/page?pageSize=10&page=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let links = link_rels(&response);
    assert!(has_rel(&links, "previous"));
    assert!(has_rel(&links, "first"));
    assert!(!has_rel(&links, "next"));
    assert!(!has_rel(&links, "last"));
}

#[tokio::test]
async fn middle_page_links_both_ways() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init/30", None).await;

    let response = send(&app, Method::GET, "/authors/page?pageSize=10&page=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[PAGE_COUNT_HEADER], "3");

    let links = link_rels(&response);
    for rel in ["previous", "first", "next", "last"] {
        assert!(has_rel(&links, rel), "missing rel {}", rel);
    }

    // Links reproduce the request URI with only the page parameter changed.
    assert!(links
        .iter()
        .any(|link| link.starts_with("</authors/page?pageSize=10&page=3>")));
    assert!(links
        .iter()
        .any(|link| link.starts_with("</authors/page?pageSize=10&page=1>")));
}

#[tokio::test]
async fn out_of_range_page_is_not_found() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init/25", None).await;

    let response = send(&app, Method::GET, "/authors/page?pageSize=10&page=3", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // An empty catalog has no addressable page at all.
    send(&app, Method::DELETE, "/authors", None).await;
    let response = send(&app, Method::GET, "/authors/page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_page_size_is_invalid_input() {
    let app = test_app();
    let response = send(&app, Method::GET, "/authors/page?pageSize=0", None).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn non_paged_responses_pass_through_untouched() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init", None).await;

    let response = send(&app, Method::GET, "/authors", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(TOTAL_COUNT_HEADER).is_none());
    assert!(response.headers().get(LINK).is_none());

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn creation_answers_with_the_declared_status() {
    let app = test_app();

    let response = send(
        &app,
        Method::POST,
        "/authors",
        Some(json!({"name": "Smith", "firstname": "John", "biography": "My life"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Smith");

    // The declared 201 never overrides a non-OK outcome.
    let response = send(
        &app,
        Method::POST,
        "/authors",
        Some(json!({"id": 7, "name": "Smith", "firstname": "John"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn catalog_crud_round_trip() {
    let app = test_app();

    let response = send(&app, Method::PUT, "/setup/init", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(2));

    let response = send(&app, Method::GET, "/authors/1", None).await;
    let author = body_json(response).await;
    assert_eq!(author["firstname"], "Alfred");
    assert_eq!(author["name"], "Martin");

    let response = send(&app, Method::GET, "/authors/10", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Method::PUT,
        "/authors/1",
        Some(json!({"name": "Doe", "firstname": "Jim", "biography": "My weird life"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["firstname"], "Jim");

    // A client-supplied id on update is invalid input.
    let response = send(
        &app,
        Method::PUT,
        "/authors/1",
        Some(json!({"id": 1, "name": "Doe", "firstname": "Jim"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let response = send(&app, Method::DELETE, "/authors/1", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, "/authors", None).await;
    let remaining = body_json(response).await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_eq!(remaining[0]["id"], 2);
}

#[tokio::test]
async fn filter_matches_exactly() {
    let app = test_app();
    send(&app, Method::PUT, "/setup/init", None).await;

    let response = send(&app, Method::GET, "/authors/filter?firstname=Marie", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let authors = body_json(response).await;
    assert_eq!(authors.as_array().unwrap().len(), 1);
    assert_eq!(authors[0]["firstname"], "Marie");

    let response = send(&app, Method::GET, "/authors/filter?sortKey=shoe-size", None).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}
