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

use serde::{Deserialize, Serialize};

use crate::operand_runs::{OperandRun, RunKind};

// Request and response types for the helper ↔ IDE-frontend communication.
// Every request carries a 'req' string discriminant and a 'seq' id that is
// echoed back in the response. Addresses and offsets are hex strings on the
// wire to stay safe for JavaScript number handling; the helper parses them
// into u64 internally and renders u64 back into hex strings on the way out.

/// Resolve a branch/call reference (symbol name + relative offset) to a
/// concrete instruction of the parsed listing.
#[derive(Serialize, Deserialize, Debug)]
pub struct ResolveTargetRequest {
    pub req: String, // "resolveTarget"
    pub seq: u64,
    pub name: String,
    /// Offset relative to the target function's first instruction,
    /// "0x..." or bare hex.
    pub offset: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResolveTargetResponse {
    pub req: String, // "resolveTarget"
    pub seq: u64,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_index: Option<usize>,
    /// Absolute address of the resolved instruction, hex string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Correlate a source-level declaration name (possibly with a return type
/// prefix) to a parsed assembly function, suffix-matched case-insensitively.
#[derive(Serialize, Deserialize, Debug)]
pub struct SelectFunctionRequest {
    pub req: String, // "selectFunction"
    pub seq: u64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SelectFunctionResponse {
    pub req: String, // "selectFunction"
    pub seq: u64,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_index: Option<usize>,
    /// The assembly symbol that matched, as printed by the disassembler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

/// Tokenize one operand string into typed runs for highlighting.
#[derive(Serialize, Deserialize, Debug)]
pub struct OperandRunsRequest {
    pub req: String, // "operandRuns"
    pub seq: u64,
    pub operands: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OperandRunsResponse {
    pub req: String, // "operandRuns"
    pub seq: u64,
    pub runs: Vec<SerRun>,
}

/// Request the full parsed listing in the compact chunk format.
#[derive(Serialize, Deserialize, Debug)]
pub struct ListingRequest {
    pub req: String, // "listing"
    pub seq: u64,
}

/// Compact run representation: text plus a one-letter kind code, to keep
/// per-instruction responses small.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SerRun {
    pub t: String,
    pub k: String, // "s" | "l" | "r"
}

impl From<&OperandRun> for SerRun {
    fn from(run: &OperandRun) -> Self {
        let k = match run.kind {
            RunKind::Symbol => "s",
            RunKind::Literal => "l",
            RunKind::Register => "r",
        };
        Self {
            t: run.text.clone(),
            k: k.to_string(),
        }
    }
}

/// Events generated by the helper process and pushed to the frontend.
/// Internally-tagged so each variant carries a 'type' discriminant.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum HelperEvent {
    /// A parse run finished; the model is finalized and lookups can be served
    ListingReady {
        session_id: String,
        function_count: u64,
        instruction_count: u64,
    },

    /// Something went wrong at run level (e.g. a run was rejected because
    /// one is already active). Never fatal to the process.
    Error {
        session_id: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand_runs::tokenize_operands;

    #[test]
    fn ser_run_kind_codes() {
        let runs = tokenize_operands("%eax,%ebx");
        let ser: Vec<SerRun> = runs.iter().map(SerRun::from).collect();
        assert_eq!(
            ser,
            vec![
                SerRun { t: "%eax".to_string(), k: "r".to_string() },
                SerRun { t: ", ".to_string(), k: "s".to_string() },
                SerRun { t: "%ebx".to_string(), k: "r".to_string() },
            ]
        );
    }

    #[test]
    fn absent_optionals_are_omitted_on_the_wire() {
        let response = ResolveTargetResponse {
            req: "resolveTarget".to_string(),
            seq: 3,
            found: false,
            function_index: None,
            instruction_index: None,
            address: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("address"));
        assert!(json.contains("\"found\":false"));
    }
}
