/// Request parsing and dispatch for the main request loop.
use crate::listing::AsmReference;
use crate::protocol::LookupRequest;
use crate::requests::*;
use serde_json::Value;
use std::sync::mpsc::Sender;

/// Parse and dispatch a frontend request based on the 'req' discriminant.
///
/// All requests have a 'req' field that identifies the request type. We peek
/// at this field, deserialize into the appropriate typed struct, and forward
/// the decoded form to the listing worker. Returns false when the request
/// could not be understood or forwarded.
pub fn dispatch_request(msg: &Value, req_tx: &Sender<LookupRequest>) -> bool {
    let req_type = msg.get("req").and_then(|v| v.as_str());

    match req_type {
        Some("resolveTarget") | Some("resolve") => handle_resolve_target(msg, req_tx),
        Some("selectFunction") | Some("select") => handle_select_function(msg, req_tx),
        Some("operandRuns") | Some("runs") => handle_operand_runs(msg, req_tx),
        Some("listing") => handle_listing(msg, req_tx),
        _ => {
            log::warn!("Unknown request type: {:?}", req_type);
            false
        }
    }
}

fn forward(request: LookupRequest, req_tx: &Sender<LookupRequest>) -> bool {
    if req_tx.send(request).is_err() {
        log::warn!("Failed to send request to worker");
        return false;
    }
    true
}

fn handle_resolve_target(msg: &Value, req_tx: &Sender<LookupRequest>) -> bool {
    match serde_json::from_value::<ResolveTargetRequest>(msg.clone()) {
        Ok(typed_req) => {
            let Some(relative_offset) = parse_hex_address(&typed_req.offset) else {
                log::warn!("resolveTarget with bad offset: {:?}", typed_req.offset);
                return false;
            };
            forward(
                LookupRequest::ResolveTarget {
                    seq_id: typed_req.seq,
                    reference: AsmReference {
                        name: typed_req.name,
                        relative_offset,
                    },
                },
                req_tx,
            )
        }
        Err(e) => {
            log::warn!("Failed to parse ResolveTargetRequest: {}", e);
            false
        }
    }
}

fn handle_select_function(msg: &Value, req_tx: &Sender<LookupRequest>) -> bool {
    match serde_json::from_value::<SelectFunctionRequest>(msg.clone()) {
        Ok(typed_req) => forward(
            LookupRequest::SelectFunction {
                seq_id: typed_req.seq,
                name: typed_req.name,
            },
            req_tx,
        ),
        Err(e) => {
            log::warn!("Failed to parse SelectFunctionRequest: {}", e);
            false
        }
    }
}

fn handle_operand_runs(msg: &Value, req_tx: &Sender<LookupRequest>) -> bool {
    match serde_json::from_value::<OperandRunsRequest>(msg.clone()) {
        Ok(typed_req) => forward(
            LookupRequest::OperandRuns {
                seq_id: typed_req.seq,
                operands: typed_req.operands,
            },
            req_tx,
        ),
        Err(e) => {
            log::warn!("Failed to parse OperandRunsRequest: {}", e);
            false
        }
    }
}

fn handle_listing(msg: &Value, req_tx: &Sender<LookupRequest>) -> bool {
    match serde_json::from_value::<ListingRequest>(msg.clone()) {
        Ok(typed_req) => forward(LookupRequest::Listing { seq_id: typed_req.seq }, req_tx),
        Err(e) => {
            log::warn!("Failed to parse ListingRequest: {}", e);
            false
        }
    }
}

/// Parse a hex address/offset from a string ("0x1234" or "1234").
fn parse_hex_address(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    u64::from_str_radix(hex_str, 16).ok()
}
