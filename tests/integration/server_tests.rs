/*!
 * JSON-RPC dispatch tests over in-memory streams
 */

use serde_json::{Value, json};

use captionkit::server::McpServer;
use captionkit::server::protocol::{INTERNAL_ERROR, METHOD_NOT_FOUND, PARSE_ERROR};

use crate::common::{self, TEST_VIDEO_ID};

fn server() -> McpServer {
    McpServer::new(common::service_with(common::populated_mock_client()), "en")
}

async fn request(server: &McpServer, message: Value) -> Value {
    let line = server.handle_line(&message.to_string()).await.expect("expected a response");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn test_initialize_shouldAdvertiseServerInfoAndTools() {
    let response = request(
        &server(),
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": { "protocolVersion": "2024-11-05" } }),
    )
    .await;

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "captionkit");
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_toolsList_shouldDescribeAllFourTools() {
    let response = request(&server(), json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" })).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["get_video_info", "get_captions_list", "download_captions", "search_videos_with_captions"]
    );

    let download = &tools[2]["inputSchema"];
    assert_eq!(download["required"], json!(["video_id", "lang"]));
    assert_eq!(download["properties"]["format"]["enum"], json!(["raw", "srt", "vtt"]));
    assert_eq!(download["properties"]["lang"]["default"], "en");

    let search = &tools[3]["inputSchema"];
    assert_eq!(search["properties"]["limit"]["maximum"], 50);
    assert_eq!(search["properties"]["limit"]["default"], 10);
}

#[tokio::test]
async fn test_toolsCall_withValidArguments_shouldReturnTextContent() {
    let response = request(
        &server(),
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "get_video_info", "arguments": { "video_id": TEST_VIDEO_ID } }
        }),
    )
    .await;

    let content = &response["result"]["content"][0];
    assert_eq!(content["type"], "text");
    let payload: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["id"], TEST_VIDEO_ID);
    assert_eq!(payload["title"], "Sample video");
}

#[tokio::test]
async fn test_toolsCall_withToolError_shouldReturnTaggedErrorData() {
    let response = request(
        &server(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": { "name": "download_captions", "arguments": { "video_id": "bad" } }
        }),
    )
    .await;

    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], INTERNAL_ERROR);
    assert_eq!(response["error"]["data"]["type"], "VALIDATION_ERROR");
    assert_eq!(response["error"]["data"]["details"]["errors"][0]["path"], "video_id");
}

#[tokio::test]
async fn test_toolsCall_withUnknownTool_shouldReturnMethodNotFound() {
    let response = request(
        &server(),
        json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": { "name": "translate" } }),
    )
    .await;
    assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_unknownMethod_shouldReturnMethodNotFound() {
    let response = request(&server(), json!({ "jsonrpc": "2.0", "id": 4, "method": "resources/list" })).await;
    assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_ping_shouldReturnEmptyResult() {
    let response = request(&server(), json!({ "jsonrpc": "2.0", "id": 5, "method": "ping" })).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_notification_shouldNotProduceResponse() {
    let server = server();
    let line = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
    assert!(server.handle_line(&line).await.is_none());

    let line = json!({ "jsonrpc": "2.0", "method": "tools/list" }).to_string();
    assert!(server.handle_line(&line).await.is_none());
}

#[tokio::test]
async fn test_request_withNullId_shouldStillReply() {
    let response = request(&server(), json!({ "jsonrpc": "2.0", "id": null, "method": "ping" })).await;
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_malformedJson_shouldReturnParseError() {
    let line = server().handle_line("{ not json").await.unwrap();
    let response: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(response["error"]["code"], PARSE_ERROR);
    assert_eq!(response["id"], Value::Null);
}

#[tokio::test]
async fn test_run_shouldAnswerEachLineUntilEof() {
    let server = server();
    let input = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }).to_string(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        String::new(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": { "name": "download_captions", "arguments": { "video_id": TEST_VIDEO_ID, "format": "vtt" } }
        })
        .to_string(),
    ]
    .join("\n");

    let mut output: Vec<u8> = Vec::new();
    server.run(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);

    let text = responses[1]["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();
    assert!(payload["formattedContent"].as_str().unwrap().starts_with("WEBVTT\n\n"));
}
