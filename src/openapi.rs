//! Machine-readable description of the HTTP API, served at `GET /api-docs`

use serde_json::{json, Value};

/// Builds the OpenAPI 3 document with `public_url` as the server entry.
pub fn document(public_url: &str) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Shortlink",
            "description": "URL shortener with optional link expiration",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "servers": [{ "url": public_url }],
        "paths": {
            "/": { "get": list_operation(), "post": create_operation() },
            "/{id}": { "get": redirect_operation(), "delete": delete_operation() },
        },
        "components": { "schemas": schemas() },
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn id_param() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    })
}

fn list_operation() -> Value {
    let items = json!({ "$ref": "#/components/schemas/ShortMapping" });
    json!({
        "summary": "List every stored short URL, expired ones included",
        "responses": {
            "200": json_response("All mappings", json!({ "type": "array", "items": items })),
            "500": error_response("Storage error"),
        }
    })
}

fn create_operation() -> Value {
    let body = json!({
        "type": "object",
        "required": ["url", "key"],
        "properties": {
            "url": { "type": "string", "format": "uri" },
            "key": { "type": "string" },
            "expiration": { "type": "string", "format": "date-time" }
        }
    });
    let created = json!({
        "type": "object",
        "properties": { "shortUrl": { "type": "string", "format": "uri" } }
    });

    json!({
        "summary": "Create a short URL",
        "requestBody": { "required": true, "content": { "application/json": { "schema": body } } },
        "responses": {
            "201": json_response("Short URL created", created),
            "400": error_response("Malformed input"),
            "403": error_response("Invalid API key"),
            "500": error_response("Storage error"),
        }
    })
}

fn redirect_operation() -> Value {
    json!({
        "summary": "Redirect to the original URL",
        "parameters": [id_param()],
        "responses": {
            "302": { "description": "Redirect to the original URL" },
            "400": error_response("Malformed id"),
            "404": error_response("Not found"),
            "410": error_response("Expired"),
            "500": error_response("Storage error"),
        }
    })
}

fn delete_operation() -> Value {
    let key_param = json!({
        "name": "key",
        "in": "query",
        "required": true,
        "schema": { "type": "string" }
    });
    let deleted = json!({
        "type": "object",
        "properties": { "message": { "type": "string" } }
    });

    json!({
        "summary": "Delete a short URL",
        "parameters": [id_param(), key_param],
        "responses": {
            "200": json_response("Deleted", deleted),
            "400": error_response("Malformed id or missing key"),
            "403": error_response("Invalid API key"),
            "404": error_response("Not found"),
            "500": error_response("Storage error"),
        }
    })
}

fn schemas() -> Value {
    let mapping = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "original_url": { "type": "string", "format": "uri" },
            "short_url": { "type": "string", "format": "uri" },
            "expires_at": { "type": "string", "format": "date-time", "nullable": true }
        }
    });
    let error = json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "field": { "type": "string" },
            "message": { "type": "string" }
        }
    });

    json!({ "ShortMapping": mapping, "Error": error })
}
