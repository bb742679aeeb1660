//! Paged collections and response-side pagination links
//!
//! Handlers return a [`Page`]; the envelope never reaches the wire. A
//! response-side middleware strips it down to the bare content list and
//! communicates the envelope through `Link` and count headers instead. An
//! out-of-range page number is a client addressing error and turns the
//! whole response into a 404, even though the data fetch succeeded.

use crate::error::ApiError;
use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, LINK};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::debug;

/// Header carrying the filtered element total.
pub const TOTAL_COUNT_HEADER: &str = "biblio-total-count";
/// Header carrying the page total.
pub const PAGE_COUNT_HEADER: &str = "biblio-page-count";
/// Query parameter rewritten in the navigation links.
pub const PAGE_QUERY_PARAM: &str = "page";

const PREV_REL: &str = "previous";
const NEXT_REL: &str = "next";
const FIRST_REL: &str = "first";
const LAST_REL: &str = "last";
const FIRST_PAGE: u64 = 1;

/// One page of a collection
///
/// `page_total` is the floor of `element_total / page_size`; the
/// out-of-range check uses the same flooring so the two stay consistent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_size: u64,
    pub page_number: u64,
    pub element_total: u64,
    pub page_total: u64,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page. `page_size` must be non-zero (callers validate
    /// inbound query parameters before building one).
    pub fn new(page_size: u64, page_number: u64, element_total: u64, content: Vec<T>) -> Self {
        Self {
            page_size,
            page_number,
            element_total,
            page_total: element_total / page_size,
            content,
        }
    }
}

/// Marker stashed in response extensions so the middleware recognizes a
/// paged body without sniffing arbitrary payloads.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    pub page_number: u64,
    pub element_total: u64,
    pub page_total: u64,
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let meta = PageMeta {
            page_number: self.page_number,
            element_total: self.element_total,
            page_total: self.page_total,
        };
        let mut response = Json(self).into_response();
        response.extensions_mut().insert(meta);
        response
    }
}

/// Response-side enrichment for paged collections
///
/// Applies only to successful responses carrying the [`PageMeta`] marker;
/// everything else passes through untouched.
pub async fn enrich_paged_response(request: Request, next: Next) -> Response {
    let uri = request.uri().clone();
    let response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }
    let Some(meta) = response.extensions().get::<PageMeta>().copied() else {
        return response;
    };

    debug!("Paged response: page {}/{}", meta.page_number, meta.page_total);
    if meta.page_number > meta.page_total {
        return ApiError::PageOutOfRange.into_response();
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    // The envelope is replaced by its bare content list.
    let content = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(mut envelope) => envelope
            .get_mut("content")
            .map(serde_json::Value::take)
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let body = serde_json::to_vec(&content).unwrap_or_default();

    if meta.page_number > FIRST_PAGE {
        append_link(&mut parts.headers, &uri, meta.page_number - 1, PREV_REL);
        append_link(&mut parts.headers, &uri, FIRST_PAGE, FIRST_REL);
    }
    if meta.page_number < meta.page_total {
        append_link(&mut parts.headers, &uri, meta.page_number + 1, NEXT_REL);
        append_link(&mut parts.headers, &uri, meta.page_total, LAST_REL);
    }

    parts.headers.insert(
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        HeaderValue::from(meta.element_total),
    );
    parts.headers.insert(
        HeaderName::from_static(PAGE_COUNT_HEADER),
        HeaderValue::from(meta.page_total),
    );
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len() as u64));

    Response::from_parts(parts, Body::from(body))
}

fn append_link(headers: &mut axum::http::HeaderMap, uri: &Uri, page: u64, rel: &str) {
    let link = format!("<{}>; rel=\"{}\"", with_page_param(uri, page), rel);
    if let Ok(value) = HeaderValue::from_str(&link) {
        headers.append(LINK, value);
    }
}

/// Reproduce the request URI with only the `page` parameter replaced.
fn with_page_param(uri: &Uri, page: u64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;
    if let Some(query) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == PAGE_QUERY_PARAM {
                serializer.append_pair(&key, &page.to_string());
                replaced = true;
            } else {
                serializer.append_pair(&key, &value);
            }
        }
    }
    if !replaced {
        serializer.append_pair(PAGE_QUERY_PARAM, &page.to_string());
    }
    format!("{}?{}", uri.path(), serializer.finish())
}
