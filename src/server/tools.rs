//! Tool definitions advertised by `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::service::ToolName;
use crate::validators::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, MIN_SEARCH_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/call` parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

fn video_id_property() -> Value {
    json!({
        "type": "string",
        "description": "YouTube video ID or URL"
    })
}

/// Definition for one tool
pub fn tool_definition(tool: ToolName, default_language: &str) -> ToolDefinition {
    let (description, input_schema) = match tool {
        ToolName::GetVideoInfo => (
            "Get basic information of a YouTube video",
            json!({
                "type": "object",
                "properties": { "video_id": video_id_property() },
                "required": ["video_id"]
            }),
        ),
        ToolName::GetCaptionsList => (
            "Get list of available captions for a video",
            json!({
                "type": "object",
                "properties": { "video_id": video_id_property() },
                "required": ["video_id"]
            }),
        ),
        ToolName::DownloadCaptions => (
            "Download captions for the specified video",
            json!({
                "type": "object",
                "properties": {
                    "video_id": video_id_property(),
                    "lang": {
                        "type": "string",
                        "description": "Caption language code (e.g., ja, en)",
                        "default": default_language
                    },
                    "format": {
                        "type": "string",
                        "enum": ["raw", "srt", "vtt"],
                        "description": "Caption output format",
                        "default": "raw"
                    }
                },
                "required": ["video_id", "lang"]
            }),
        ),
        ToolName::SearchVideosWithCaptions => (
            "Search for videos with captions",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "lang": {
                        "type": "string",
                        "description": "Caption language filter (e.g., ja, en)"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of search results",
                        "minimum": MIN_SEARCH_LIMIT,
                        "maximum": MAX_SEARCH_LIMIT,
                        "default": DEFAULT_SEARCH_LIMIT
                    }
                },
                "required": ["query"]
            }),
        ),
    };

    ToolDefinition {
        name: tool.as_str().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Definitions for every tool, in a stable order
pub fn tool_definitions(default_language: &str) -> Vec<ToolDefinition> {
    ToolName::ALL
        .into_iter()
        .map(|tool| tool_definition(tool, default_language))
        .collect()
}
