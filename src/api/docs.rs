//! API documentation: an OpenAPI description and a small HTML page.

use std::sync::Arc;

use axum::{extract::State, response::Html, Json};
use serde_json::{json, Value};

use super::routes::AppState;

struct RouteDoc {
    method: &'static str,
    path: &'static str,
    summary: &'static str,
}

const ROUTES: &[RouteDoc] = &[
    RouteDoc {
        method: "get",
        path: "/",
        summary: "Agent metadata and status",
    },
    RouteDoc {
        method: "get",
        path: "/health",
        summary: "Liveness check",
    },
    RouteDoc {
        method: "post",
        path: "/run",
        summary: "Send one message to the agent and receive its reply",
    },
    RouteDoc {
        method: "get",
        path: "/.well-known/agent.json",
        summary: "A2A discovery document",
    },
    RouteDoc {
        method: "get",
        path: "/openapi.json",
        summary: "This API description",
    },
    RouteDoc {
        method: "get",
        path: "/docs",
        summary: "Human-readable API documentation",
    },
];

fn run_request_schema() -> Value {
    json!({
        "type": "object",
        "required": ["appName", "userId", "sessionId", "newMessage"],
        "properties": {
            "appName": {"type": "string", "description": "Agent name"},
            "userId": {"type": "string"},
            "sessionId": {"type": "string"},
            "newMessage": {
                "type": "object",
                "required": ["parts"],
                "properties": {
                    "role": {"type": "string", "example": "user"},
                    "parts": {
                        "type": "array",
                        "items": {"type": "object", "properties": {"text": {"type": "string"}}}
                    }
                }
            },
            "streaming": {"type": "boolean", "default": false}
        }
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "message": {"type": "string"},
                    "type": {"type": "string"}
                }
            }
        }
    })
}

/// OpenAPI 3 description of the route table.
pub fn openapi_document(title: &str, description: &str) -> Value {
    let mut paths = serde_json::Map::new();
    for route in ROUTES {
        let mut operation = json!({
            "summary": route.summary,
            "responses": {"200": {"description": "Success"}}
        });
        if route.path == "/run" {
            operation["requestBody"] = json!({
                "required": true,
                "content": {"application/json": {"schema": run_request_schema()}}
            });
            let error = json!({"content": {"application/json": {"schema": error_schema()}}});
            let responses = &mut operation["responses"];
            responses["400"] = with_description(&error, "Malformed request");
            responses["404"] = with_description(&error, "Unknown app name");
            responses["500"] = with_description(&error, "Agent failure");
            responses["502"] = with_description(&error, "Model API failure");
        }
        let mut item = serde_json::Map::new();
        item.insert(route.method.to_string(), operation);
        paths.insert(route.path.to_string(), Value::Object(item));
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": title,
            "description": description,
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": paths
    })
}

fn with_description(base: &Value, description: &str) -> Value {
    let mut value = base.clone();
    value["description"] = json!(description);
    value
}

/// GET /openapi.json
pub async fn openapi_spec(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(openapi_document(
        &state.display_name,
        state.agent.description(),
    ))
}

/// GET /docs
pub async fn docs_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let rows: String = ROUTES
        .iter()
        .map(|r| {
            format!(
                "<tr><td><code>{}</code></td><td><code>{}</code></td><td>{}</td></tr>\n",
                r.method.to_uppercase(),
                r.path,
                r.summary
            )
        })
        .collect();

    let example = serde_json::to_string_pretty(&json!({
        "appName": state.agent.name(),
        "userId": "user-1",
        "sessionId": "session-1",
        "newMessage": {"role": "user", "parts": [{"text": "Hello!"}]}
    }))
    .unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title} API</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }}
pre {{ background: #f6f8fa; padding: 1rem; overflow-x: auto; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>{description}</p>
<table>
<tr><th>Method</th><th>Path</th><th>Summary</th></tr>
{rows}</table>
<h2>Example <code>POST /run</code> body</h2>
<pre>{example}</pre>
<p>Machine-readable description: <a href="/openapi.json">/openapi.json</a></p>
</body>
</html>
"#,
        title = escape_html(&state.display_name),
        description = escape_html(state.agent.description()),
        rows = rows,
        example = escape_html(&example),
    ))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
