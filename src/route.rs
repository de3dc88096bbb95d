//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::get;
use axum::Router;

use crate::handler::{api_docs, create_short_url, delete_short_url, list_urls, redirect_url};
use crate::service::UrlService;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: UrlService,
}

/// Creates the Axum application router
///
/// # Route Definitions
///
/// - `GET /` - Lists every stored mapping
/// - `POST /` - Creates a new short URL (`key` in the body)
/// - `GET /{id}` - Redirects to the original URL
/// - `DELETE /{id}` - Deletes a short URL (`key` query param)
/// - `GET /api-docs` - OpenAPI description of the routes above
///
/// ```no_run
/// # use std::sync::Arc;
/// # use shortlink::config::ApiKeys;
/// # use shortlink::database::RedbRepository;
/// # use shortlink::route::{create_app, AppState};
/// # use shortlink::service::UrlService;
/// let repository = Arc::new(RedbRepository::open("data.db").unwrap());
/// let service = UrlService::new(repository, ApiKeys::parse("secret"), "http://localhost:3000");
/// let app = create_app(AppState { service });
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_urls).post(create_short_url))
        // Static segment takes priority over the `{id}` capture
        .route("/api-docs", get(api_docs))
        .route("/{id}", get(redirect_url).delete(delete_short_url))
        .with_state(state)
}
