//! Stdio JSON-RPC transport (SPEC_FULL.md §1.1, §6.1). The JSON-RPC
//! plumbing (`JsonRpcRequest`/`JsonRpcResponse`/`JsonRpcError`,
//! `initialize`, `tools/list`, `tools/call` dispatch) is carried over
//! essentially unchanged from the teacher's MIDI server, since it is pure
//! ambient transport, not part of the synthesis pipeline itself. The tool
//! surface it exposes is a single `render` tool that accepts a `RenderPlan`
//! JSON document and returns a `RenderResult` summary, instead of the
//! teacher's MIDI/SNES/R2D2 tools.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::engine::VoiceEngine;
use crate::mixer::MixerOptions;
use crate::model::plan::RenderPlan;
use crate::provider::{BasicProvider, EmotiveProvider};

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(serialize_with = "serialize_id")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

fn serialize_id<S>(id: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    match id {
        Some(val) => val.serialize(serializer),
        None => "unknown".serialize(serializer),
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    arguments: Value,
}

fn error_response(id: Option<Value>, code: i32, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        }),
    }
}

fn ok_response(id: Option<Value>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: Some(result),
        error: None,
    }
}

fn handle_initialize(_params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
    tracing::info!("Handling initialize request");

    let server_capabilities = json!({
        "tools": { "listChanged": false },
        "resources": { "subscribe": false, "listChanged": false },
        "prompts": { "listChanged": false }
    });
    let server_info = json!({ "name": "voxline", "version": "0.1.0" });

    ok_response(
        id,
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": server_capabilities,
            "serverInfo": server_info
        }),
    )
}

fn handle_tools_list(id: Option<Value>) -> JsonRpcResponse {
    tracing::info!("Handling tools/list request");

    let tools = json!([
        {
            "name": "render",
            "description": "Render a RenderPlan (characters, lines, global settings — spec.md §3) into synchronized multi-character speech audio. Returns per-character track durations, render statistics, and a base64-encoded WAV master mix.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "plan": {
                        "type": "object",
                        "description": "A RenderPlan document: { characters: [...], lines: [...], global_settings: {...}, metadata: {...} }"
                    }
                },
                "required": ["plan"]
            }
        }
    ]);

    ok_response(id, json!({ "tools": tools }))
}

fn handle_resources_list(id: Option<Value>) -> JsonRpcResponse {
    ok_response(id, json!({ "resources": [] }))
}

fn handle_prompts_list(id: Option<Value>) -> JsonRpcResponse {
    ok_response(id, json!({ "prompts": [] }))
}

/// Runs one `render` tool call to completion (spec.md §6.1): parses the
/// `RenderPlan`, drives the scheduler + mixer, and reports a JSON summary
/// plus the base64-encoded WAV master.
async fn run_render(plan: RenderPlan, engine: &VoiceEngine) -> Result<Value, String> {
    let result = crate::render(
        &plan,
        engine,
        &MixerOptions::default(),
        CancellationToken::new(),
    )
    .await
    .map_err(|e| e.to_string())?;

    let tracks: Vec<Value> = result
        .tracks
        .iter()
        .map(|t| {
            json!({
                "character_id": t.character_id,
                "duration_ms": t.pcm.duration_ms(),
                "segment_count": t.segments.len(),
            })
        })
        .collect();

    let master_wav_base64 = match &result.master {
        Some(master) => {
            let encoded = crate::codec::WavCodec
                .encode(master)
                .map_err(|e| e.to_string())?;
            Some(BASE64.encode(encoded))
        }
        None => None,
    };

    Ok(json!({
        "tracks": tracks,
        "statistics": {
            "total_ms": result.statistics.total_ms,
            "overlapping_line_count": result.statistics.overlapping_line_count,
            "silence_ms": result.statistics.silence_ms,
            "failed_segments": result.statistics.failed_segments,
        },
        "master_wav_base64": master_wav_base64,
    }))
}

fn handle_render_tool(
    arguments: Value,
    id: Option<Value>,
    rt: &tokio::runtime::Runtime,
    engine: &VoiceEngine,
) -> JsonRpcResponse {
    let plan_value = match arguments.get("plan") {
        Some(v) => v.clone(),
        None => return error_response(id, -32602, "missing required argument 'plan'"),
    };
    let plan: RenderPlan = match serde_json::from_value(plan_value) {
        Ok(p) => p,
        Err(e) => return error_response(id, -32602, format!("invalid render plan: {e}")),
    };

    match rt.block_on(run_render(plan, engine)) {
        Ok(result) => ok_response(id, result),
        Err(reason) => error_response(id, -32000, reason),
    }
}

fn handle_tool_call(
    params: Option<Value>,
    id: Option<Value>,
    rt: &tokio::runtime::Runtime,
    engine: &VoiceEngine,
) -> JsonRpcResponse {
    tracing::info!("Handling tools/call request");

    let params = match params {
        Some(p) => p,
        None => return error_response(id, -32602, "Invalid params"),
    };
    let tool_params: ToolCallParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => return error_response(id, -32602, format!("Invalid tool call params: {e}")),
    };

    match tool_params.name.as_str() {
        "render" => handle_render_tool(tool_params.arguments, id, rt, engine),
        other => error_response(id, -32601, format!("Unknown tool: {other}")),
    }
}

/// Builds the process-wide provider set once, at startup (spec.md §5
/// Shared resources: "the set of registered providers is process-wide,
/// initialized once, and read-only after initialization").
fn build_engine(rt: &tokio::runtime::Runtime) -> VoiceEngine {
    let config = PipelineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load pipeline config; using defaults");
        PipelineConfig::default()
    });
    rt.block_on(VoiceEngine::initialize(vec![
        Box::new(BasicProvider::new()),
        Box::new(EmotiveProvider::new()),
    ]))
    .with_provider_order(config.default_provider_order)
}

pub fn run_stdio_server() {
    tracing::info!("Voxline MCP server starting");

    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    let engine = build_engine(&rt);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) if !line.trim().is_empty() => {
                tracing::debug!("Received: {}", line);

                let request: JsonRpcRequest = match serde_json::from_str(&line) {
                    Ok(req) => req,
                    Err(e) => {
                        tracing::error!("Failed to parse JSON-RPC request: {}", e);
                        let response = error_response(None, -32700, "Parse error");
                        if let Ok(response_json) = serde_json::to_string(&response) {
                            let _ = writeln!(stdout, "{response_json}");
                            let _ = stdout.flush();
                        }
                        continue;
                    }
                };

                let response = match request.method.as_str() {
                    "initialize" => handle_initialize(request.params, request.id),
                    "notifications/initialized" => {
                        tracing::info!("Client initialized");
                        continue;
                    }
                    "tools/list" => handle_tools_list(request.id),
                    "resources/list" => handle_resources_list(request.id),
                    "prompts/list" => handle_prompts_list(request.id),
                    "tools/call" => handle_tool_call(request.params, request.id, &rt, &engine),
                    _ => error_response(request.id, -32601, "Method not found"),
                };

                match serde_json::to_string(&response) {
                    Ok(response_json) => {
                        tracing::debug!("Sending: {}", response_json);
                        let _ = writeln!(stdout, "{response_json}");
                        let _ = stdout.flush();
                    }
                    Err(e) => tracing::error!("Failed to serialize response: {}", e),
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Error reading from stdin: {}", e);
                break;
            }
        }
    }

    tracing::info!("Voxline MCP server shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_list_advertises_render_tool() {
        let response = handle_tools_list(Some(json!(1)));
        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "render");
    }

    #[test]
    fn missing_plan_argument_is_an_error() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let engine = build_engine(&rt);
        let response = handle_render_tool(json!({}), Some(json!(1)), &rt, &engine);
        assert!(response.error.is_some());
    }
}
