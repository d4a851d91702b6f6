//! MCP Server for splitbill
//!
//! Exposes the in-memory friend ledger via Model Context Protocol (MCP) so an
//! assistant or a script can add friends and record bill splits.
//!
//! Run: ./target/release/splitbill-mcp
//!
//! Environment variables:
//!   SPLITBILL_MCP_EMPTY - Start with no friends instead of the default roster
//!   SPLITBILL_LOG - Tracing filter for diagnostics on stderr (e.g. `debug`)
//!
//! Tools exposed:
//! - get_state / list_friends: Roster, current selection and add-form state
//! - add_friend: Append a friend with a zero balance
//! - toggle_add_form: Open or close the add-friend form
//! - select_friend: Select a friend, or deselect if already selected
//! - apply_split: Add a signed pence delta to the selected friend
//! - split_bill: Compute the delta from a bill and apply it
//!
//! Configure as a stdio MCP server. State lasts as long as the process.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use splitbill_core::{
    describe_balance, format_amount, parse_amount, Friend, FriendId, Ledger, NewFriend, Payer,
    Snapshot, SplitBill, DEFAULT_CURRENCY, DEFAULT_IMAGE,
};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MCP Protocol Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

// ============================================================================
// Ledger tools
// ============================================================================

fn friend_json(friend: &Friend) -> Value {
    json!({
        "id": friend.id,
        "name": friend.name,
        "image": friend.image,
        "balance": format_amount(friend.balance),
        "balance_pence": friend.balance,
        "summary": describe_balance(&friend.name, friend.balance, DEFAULT_CURRENCY),
    })
}

fn snapshot_json(snapshot: &Snapshot) -> Value {
    json!({
        "friends": snapshot.roster.iter().map(friend_json).collect::<Vec<_>>(),
        "selected": snapshot.selected,
        "selected_name": snapshot.selected_friend().map(|f| f.name.as_str()),
        "add_form_open": snapshot.add_form_open,
    })
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Reads an amount given either as text ("12.50") or as a JSON number.
fn amount_arg(args: &Value, key: &str, field: &'static str) -> Result<i64> {
    let text = match args.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(parse_amount(field, &text)?)
}

fn payer_arg(args: &Value) -> Result<Payer> {
    match str_arg(args, "who_is_paying").unwrap_or("user") {
        "user" => Ok(Payer::User),
        "friend" => Ok(Payer::Friend),
        other => Err(anyhow!("who_is_paying must be \"user\" or \"friend\", got {:?}", other)),
    }
}

fn handle_tool_call(ledger: &mut Ledger, name: &str, args: &Value) -> Result<Value> {
    match name {
        "get_state" | "list_friends" => Ok(snapshot_json(&ledger.snapshot())),

        "add_friend" => {
            let friend_name = str_arg(args, "name").unwrap_or("").trim();
            let image = str_arg(args, "image").unwrap_or(DEFAULT_IMAGE).trim();
            if friend_name.is_empty() {
                return Err(anyhow!("name must not be empty"));
            }
            if image.is_empty() {
                return Err(anyhow!("image must not be empty"));
            }
            let friend = NewFriend::with_random_id(friend_name, image);
            let id = friend.id.clone();
            let snapshot = ledger.add_friend(friend)?;
            Ok(json!({
                "id": id,
                "message": format!("Friend '{}' added", friend_name),
                "state": snapshot_json(&snapshot),
            }))
        }

        "toggle_add_form" => Ok(snapshot_json(&ledger.toggle_add_form())),

        "select_friend" => {
            let id = FriendId::from(str_arg(args, "friend_id").unwrap_or(""));
            let snapshot = ledger.select_friend(&id)?;
            Ok(snapshot_json(&snapshot))
        }

        "apply_split" => {
            let delta = args
                .get("delta_pence")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| anyhow!("delta_pence must be an integer"))?;
            let snapshot = ledger.apply_split(delta)?;
            Ok(snapshot_json(&snapshot))
        }

        "split_bill" => {
            let bill = amount_arg(args, "bill", "bill")?;
            let paid_by_user = amount_arg(args, "your_expense", "your expense")?;
            let split = SplitBill::new(bill, paid_by_user, payer_arg(args)?);
            let friend = ledger.selected().cloned();
            let snapshot = ledger.split_bill(split)?;
            let delta = split.delta()?;
            Ok(json!({
                "friend_id": friend,
                "delta": format_amount(delta),
                "delta_pence": delta,
                "state": snapshot_json(&snapshot),
            }))
        }

        _ => Err(anyhow!("Unknown tool: {}", name)),
    }
}

// ============================================================================
// Server metadata
// ============================================================================

fn get_server_info() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "splitbill-mcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn get_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": "get_state",
                "description": "Get the friend roster with balances, the selected friend and whether the add-friend form is open.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "list_friends",
                "description": "Alias of get_state.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "add_friend",
                "description": "Add a friend with a zero balance. Closes the add-friend form.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Friend's display name"
                        },
                        "image": {
                            "type": "string",
                            "description": "Optional: avatar URL (default https://i.pravatar.cc/48)"
                        }
                    },
                    "required": ["name"]
                }
            },
            {
                "name": "toggle_add_form",
                "description": "Open the add-friend form if closed, close it if open.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "select_friend",
                "description": "Select a friend to split a bill with. Selecting the already selected friend deselects them.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "friend_id": {
                            "type": "string",
                            "description": "Friend ID (e.g., '118836')"
                        }
                    },
                    "required": ["friend_id"]
                }
            },
            {
                "name": "apply_split",
                "description": "Add a signed amount in pence to the selected friend's balance, then clear the selection.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "delta_pence": {
                            "type": "integer",
                            "description": "Positive: friend owes you more. Negative: you owe the friend more."
                        }
                    },
                    "required": ["delta_pence"]
                }
            },
            {
                "name": "split_bill",
                "description": "Split a bill with the selected friend. If you pay, the friend owes their share; if the friend pays, you owe your share.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "bill": {
                            "type": "string",
                            "description": "Bill total (e.g., '20' or '12.50')"
                        },
                        "your_expense": {
                            "type": "string",
                            "description": "Your part of the bill, not more than the total"
                        },
                        "who_is_paying": {
                            "type": "string",
                            "enum": ["user", "friend"],
                            "description": "Who paid the bill (default 'user')"
                        }
                    },
                    "required": ["bill", "your_expense"]
                }
            }
        ]
    })
}

fn handle_request(ledger: &mut Ledger, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    // Notifications don't get responses
    if request.method.starts_with("notifications/") {
        return None;
    }

    let id = request.id.unwrap_or(Value::Null);
    debug!(method = %request.method, "request");

    let result = match request.method.as_str() {
        "initialize" => Ok(get_server_info()),
        "tools/list" => Ok(get_tools_list()),
        "tools/call" => {
            if let Some(params) = request.params {
                let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                let empty_args = json!({});
                let args = params.get("arguments").unwrap_or(&empty_args);
                match handle_tool_call(ledger, name, args) {
                    Ok(result) => Ok(json!({
                        "content": [{
                            "type": "text",
                            "text": serde_json::to_string_pretty(&result).unwrap_or_default()
                        }]
                    })),
                    Err(e) => Ok(json!({
                        "content": [{
                            "type": "text",
                            "text": format!("Error: {}", e)
                        }],
                        "isError": true
                    })),
                }
            } else {
                Err((INVALID_PARAMS, "Missing params"))
            }
        }
        _ => Err((METHOD_NOT_FOUND, "Method not found")),
    };

    Some(match result {
        Ok(r) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(r),
            error: None,
        },
        Err((code, msg)) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: msg.to_string(),
            }),
        },
    })
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    let filter = EnvFilter::try_from_env("SPLITBILL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(io::stderr)
        .try_init();

    let mut ledger = if std::env::var("SPLITBILL_MCP_EMPTY").is_ok() {
        Ledger::new()
    } else {
        Ledger::seeded()
    };
    info!(friends = ledger.roster().len(), "splitbill MCP server starting");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => {
                // Only send response if not a notification
                if let Some(response) = handle_request(&mut ledger, request) {
                    let response_json = serde_json::to_string(&response)?;
                    writeln!(stdout, "{}", response_json)?;
                    stdout.flush()?;
                }
            }
            Err(e) => {
                // Return JSON-RPC error
                let error_response = JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id: Value::Null,
                    result: None,
                    error: Some(JsonRpcError {
                        code: PARSE_ERROR,
                        message: format!("Parse error: {}", e),
                    }),
                };
                let response_json = serde_json::to_string(&error_response)?;
                writeln!(stdout, "{}", response_json)?;
                stdout.flush()?;
            }
        }
    }

    Ok(())
}
