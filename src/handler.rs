//! HTTP request handlers for the URL shortener API
//!
//! Handlers validate path and body shape, call into [`UrlService`](crate::service::UrlService)
//! and let [`AppError`] pick the status code.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result, StoreError};
use crate::model::{CreateRequest, CreateResponse, DeleteParams, MessageResponse, ShortMapping};
use crate::openapi;
use crate::route::AppState;

/// Creates a new short URL
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "key": "my-api-key",
///   "expiration": "2030-01-01T00:00:00.000Z"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - `{"shortUrl": "http://localhost:3000/<uuid>"}`
/// - **400 Bad Request** - Malformed body, URL or expiration
/// - **403 Forbidden** - Key not in the allow-list
pub async fn create_short_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>)> {
    // axum answers 415/422 on its own; this API reports every malformed body as 400
    let Json(payload) =
        payload.map_err(|rejection| AppError::invalid("body", rejection.body_text()))?;

    let short_url = state
        .service
        .create(&payload.url, &payload.key, payload.expiration.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(CreateResponse { short_url })))
}

/// Redirects a short URL to its original destination
///
/// - **302 Found** - `Location` points at the original URL
/// - **400 Bad Request** - `id` is not a UUID
/// - **404 Not Found** - No mapping with this id
/// - **410 Gone** - Mapping expired
pub async fn redirect_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let target = state.service.resolve(&id).await?;

    // Stored rows are trusted as-is; never answer 302 without a usable Location
    let location = HeaderValue::from_str(&target).map_err(|_| {
        AppError::Storage(StoreError::Backend(format!(
            "stored url for {id} is not a valid Location header"
        )))
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Lists every stored mapping, expired ones included
pub async fn list_urls(State(state): State<AppState>) -> Result<Json<Vec<ShortMapping>>> {
    Ok(Json(state.service.list_all().await?))
}

/// Deletes a short URL
///
/// `DELETE /{id}?key=my-api-key`
///
/// - **200 OK** - `{"message": "URL deleted successfully"}`
/// - **400 Bad Request** - `id` is not a UUID or `key` is missing
/// - **403 Forbidden** - Key not in the allow-list
/// - **404 Not Found** - No mapping with this id
pub async fn delete_short_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
    params: std::result::Result<Query<DeleteParams>, QueryRejection>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let Query(params) =
        params.map_err(|rejection| AppError::invalid("key", rejection.body_text()))?;
    let key = params
        .key
        .ok_or_else(|| AppError::invalid("key", "missing `key` query parameter"))?;

    state.service.delete(&id, &key).await?;

    Ok(Json(MessageResponse {
        message: "URL deleted successfully".to_string(),
    }))
}

/// Serves the OpenAPI description of this API
pub async fn api_docs(State(state): State<AppState>) -> impl IntoResponse {
    Json(openapi::document(state.service.public_url()))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid("id", format!("not a UUID: {raw}")))
}
