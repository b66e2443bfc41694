/// Protocol helpers for the helper ↔ frontend communication.
use crate::listing::AsmReference;
use crate::requests::HelperEvent;
use serde_json::{json, Value};

/// Request from the main thread to the listing worker. This is our internal
/// representation after the wire-level structs have been parsed and hex
/// strings decoded.
#[derive(Debug)]
pub enum LookupRequest {
    /// Resolve a branch/call reference to an instruction locator.
    ResolveTarget { seq_id: u64, reference: AsmReference },
    /// Correlate a source-level declaration name to a parsed function.
    SelectFunction { seq_id: u64, name: String },
    /// Tokenize an operand string into display runs.
    OperandRuns { seq_id: u64, operands: String },
    /// Dump the finalized listing in the compact chunk format.
    Listing { seq_id: u64 },
}

/// Wrap an event in a JSON-RPC notification envelope for the frontend.
pub fn wrap_event_as_notification(event: &HelperEvent) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "HelperEvent",
        "params": event
    })
}

/// Build a ListingReady event notification.
pub fn listing_ready_notification(
    session_id: &str,
    function_count: u64,
    instruction_count: u64,
) -> Value {
    let event = HelperEvent::ListingReady {
        session_id: session_id.to_string(),
        function_count,
        instruction_count,
    };
    wrap_event_as_notification(&event)
}

/// Build an Error event notification.
pub fn error_notification(session_id: &str, message: &str) -> Value {
    let event = HelperEvent::Error {
        session_id: session_id.to_string(),
        message: message.to_string(),
        details: None,
    };
    wrap_event_as_notification(&event)
}
