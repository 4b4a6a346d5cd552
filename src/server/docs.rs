//! OpenAPI document and Swagger UI page for the HTTP API

use serde_json::{json, Value};

pub const SWAGGER_INDEX: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Currency Hub API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/swagger/doc.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

fn text_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "text/plain": { "schema": { "type": "string" } } }
    })
}

pub fn openapi_doc() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Currency Hub API",
            "description": "Cryptocurrency rates collected from CoinGecko",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/rates": {
                "get": {
                    "summary": "Latest rates for every observed coin",
                    "responses": {
                        "200": text_response("Rate records separated by a blank line"),
                        "500": text_response("Storage failure")
                    }
                }
            },
            "/rates/{currency}": {
                "get": {
                    "summary": "Latest rate for one coin",
                    "parameters": [{
                        "name": "currency",
                        "in": "path",
                        "required": true,
                        "description": "CoinGecko coin id, e.g. bitcoin",
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": text_response("Rate record"),
                        "404": text_response("Unsupported or not yet observed coin"),
                        "500": text_response("Storage failure")
                    }
                }
            },
            "/metrics": {
                "get": {
                    "summary": "Prometheus metrics",
                    "responses": { "200": text_response("Prometheus text exposition") }
                }
            }
        }
    })
}
