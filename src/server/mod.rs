/*!
 * Tool dispatch over newline-delimited JSON-RPC 2.0.
 *
 * One JSON message per line on the input, one response per line on the
 * output. Notifications get no response. Logging must not go to the output
 * stream; the binary logs to stderr.
 */

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::service::{CaptionService, ToolName};

pub mod protocol;
pub mod tools;

use self::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use self::tools::{CallToolParams, tool_definitions};

pub const SERVER_NAME: &str = "captionkit";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Dispatches protocol messages to the caption service
pub struct McpServer {
    service: CaptionService,
    default_language: String,
}

impl McpServer {
    pub fn new(service: CaptionService, default_language: impl Into<String>) -> Self {
        Self {
            service,
            default_language: default_language.into(),
        }
    }

    pub fn service(&self) -> &CaptionService {
        &self.service
    }

    /// Handle one raw line; returns the serialized response, if any
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => {
                warn!("Discarding malformed message: {}", e);
                Some(JsonRpcResponse::failure(Value::Null, JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e))))
            }
            Ok(message) => match serde_json::from_value::<JsonRpcRequest>(message.clone()) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    let id = message.get("id").cloned().unwrap_or(Value::Null);
                    Some(JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))))
                }
            },
        };

        response.and_then(|r| match serde_json::to_string(&r) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                error!("Failed to encode response: {}", e);
                None
            }
        })
    }

    /// Handle one decoded request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            debug!("Request without jsonrpc 2.0 marker: {}", request.method);
        }

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions(&self.default_language) })),
            "tools/call" => self.call_tool(request.params.clone()).await,
            method if method.starts_with("notifications/") => {
                debug!("Notification: {}", method);
                return None;
            }
            method => Err(JsonRpcError::method_not_found(method)),
        };

        let id = request.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize_result(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid tools/call params: {}", e)))?;

        let tool = ToolName::from_name(&params.name)
            .ok_or_else(|| JsonRpcError::new(METHOD_NOT_FOUND, format!("Unknown tool: {}", params.name)))?;

        debug!("Calling tool {}", tool);
        let result = self.service.call(tool, &params.arguments).await.map_err(|e| {
            warn!("Tool {} failed: {}", tool, e);
            JsonRpcError::from(e)
        })?;

        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| JsonRpcError::from(crate::errors::ToolError::from(e)))?;

        Ok(json!({
            "content": [{ "type": "text", "text": text }]
        }))
    }

    /// Serve until the reader reaches EOF
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read from input")? {
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await.context("Failed to write response")?;
                writer.write_all(b"\n").await.context("Failed to write response")?;
                writer.flush().await.context("Failed to flush output")?;
            }
        }

        info!("Input closed, stopping server");
        Ok(())
    }

    /// Serve on the process's stdin/stdout
    pub async fn serve_stdio(&self) -> Result<()> {
        info!("{} running on stdio", SERVER_NAME);
        self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }
}
