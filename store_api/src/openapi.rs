//! OpenAPI 3 description of the HTTP surface, served at `/openapi.json`.

use serde_json::{json, Value};

/// The API contract as a JSON document.
pub fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Store API",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/stores": {
                "get": list_operation(),
                "post": create_operation(),
            },
            "/stores/{id}": {
                "get": read_operation(),
            },
        },
        "components": {
            "schemas": {
                "Store": store_schema(),
                "Error": error_schema(),
            },
        },
    })
}

fn list_operation() -> Value {
    let items = json!({
        "type": "array",
        "items": { "$ref": "#/components/schemas/Store" },
    });

    json!({
        "operationId": "stores.list",
        "parameters": [{
            "name": "filter",
            "in": "query",
            "required": false,
            "description": "Substring the store name must contain",
            "schema": { "type": "string" },
        }],
        "responses": {
            "200": json_response("Matching stores, in no particular order", items),
        },
    })
}

fn create_operation() -> Value {
    let mut created = json_response("The stored value, echoed", store_ref());
    created["headers"] = json!({
        "Location": {
            "description": "Path of the new store, ending in its generated id",
            "schema": { "type": "string" },
        },
    });

    json!({
        "operationId": "stores.create",
        "requestBody": {
            "required": true,
            "content": { "application/json": { "schema": store_ref() } },
        },
        "responses": {
            "201": created,
            "422": error_response("The body is not a valid Store"),
        },
    })
}

fn read_operation() -> Value {
    json!({
        "operationId": "stores.read",
        "parameters": [{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string", "format": "uuid" },
        }],
        "responses": {
            "200": json_response("The store", store_ref()),
            "404": error_response("No store has this id"),
        },
    })
}

fn store_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": { "name": { "type": "string" } },
        "additionalProperties": true,
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error", "message"],
        "properties": {
            "error": { "type": "string" },
            "message": { "type": "string" },
        },
    })
}

fn store_ref() -> Value {
    json!({ "$ref": "#/components/schemas/Store" })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } },
    })
}

fn error_response(description: &str) -> Value {
    json_response(description, json!({ "$ref": "#/components/schemas/Error" }))
}
