// Copyright (c) 2026 Realtime-Asm Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Listing worker thread - consumes the line stream and serves lookups.
use crate::listing::{instruction_at, AsmFunction};
use crate::listing_parser::ListingParser;
use crate::operand_runs::tokenize_operands;
use crate::protocol::{self, LookupRequest};
use crate::requests::{
    OperandRunsResponse, ResolveTargetResponse, SelectFunctionResponse, SerRun,
};
use crate::resolver;
use crate::run_gate::RunGate;
use crate::serializer::serialize_compact_listing;
use crate::transport;
use serde_json::Value;
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// Run one parse: drain `line_rx` through the parser, finalize at channel
/// close (the producer's end-of-stream signal), announce ListingReady, then
/// answer lookup requests until `req_rx` closes.
///
/// The gate rejects a second concurrent run outright; the caller gets an
/// Error notification instead of two runs interleaving their state.
pub fn run_listing_worker(
    gate: &RunGate,
    line_rx: Receiver<String>,
    req_rx: Receiver<LookupRequest>,
) {
    let Some(_token) = gate.try_begin() else {
        log::warn!("Parse run rejected: another run is active");
        let notify = protocol::error_notification("local-session", "a parse run is already active");
        if let Err(e) = transport::write_json_locked(&notify) {
            log::warn!("Failed to write Error notification: {}", e);
        }
        return;
    };

    let now = Instant::now();
    let parser = ListingParser::new();
    for line in line_rx.iter() {
        parser.process_line(&line);
    }
    let functions = parser.finalize();

    let instruction_count: usize = functions.iter().map(|f| f.instructions.len()).sum();
    log::info!(
        "Listing parsed: {} functions, {} instructions in {:.2?}",
        functions.len(),
        instruction_count,
        now.elapsed()
    );

    let notify = protocol::listing_ready_notification(
        "local-session",
        functions.len() as u64,
        instruction_count as u64,
    );
    if let Err(e) = transport::write_json_locked(&notify) {
        log::warn!("Failed to write ListingReady: {}", e);
    }

    serve_lookup_requests(functions, req_rx);
}

/// Process incoming lookup requests over the finalized model and send
/// responses. The model is read-only from here on.
fn serve_lookup_requests(functions: Vec<AsmFunction>, req_rx: Receiver<LookupRequest>) {
    while let Ok(req) = req_rx.recv() {
        log::debug!("Worker processing request: {:?}", req);
        let response = match req {
            LookupRequest::ResolveTarget { seq_id, reference } => {
                let locator = resolver::resolve_target(&functions, &reference);
                let address = locator
                    .and_then(|loc| instruction_at(&functions, loc))
                    .map(|i| format!("0x{:x}", i.offset));
                to_value(&ResolveTargetResponse {
                    req: "resolveTarget".to_string(),
                    seq: seq_id,
                    found: locator.is_some(),
                    function_index: locator.map(|loc| loc.function_index),
                    instruction_index: locator.map(|loc| loc.instruction_index),
                    address,
                })
            }
            LookupRequest::SelectFunction { seq_id, name } => {
                let index = resolver::match_function_by_source_name(&name, &functions);
                to_value(&SelectFunctionResponse {
                    req: "selectFunction".to_string(),
                    seq: seq_id,
                    found: index.is_some(),
                    function_index: index,
                    function_name: index.map(|i| functions[i].name.clone()),
                })
            }
            LookupRequest::OperandRuns { seq_id, operands } => {
                let runs = tokenize_operands(&operands);
                to_value(&OperandRunsResponse {
                    req: "operandRuns".to_string(),
                    seq: seq_id,
                    runs: runs.iter().map(SerRun::from).collect(),
                })
            }
            LookupRequest::Listing { seq_id } => {
                Some(serialize_compact_listing(&functions, seq_id, true))
            }
        };

        let Some(response) = response else { continue };
        if let Err(e) = transport::write_json_locked(&response) {
            log::warn!("Worker failed to write lookup response: {}", e);
        }
    }
}

fn to_value<T: serde::Serialize>(response: &T) -> Option<Value> {
    match serde_json::to_value(response) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Failed to serialize response: {}", e);
            None
        }
    }
}
