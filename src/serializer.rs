use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::listing::AsmFunction;
use crate::utils::canonicalize_path;

/// Interning table for the source files named by location markers. The
/// compact listing format refers to files by id so a path is transmitted
/// once no matter how many instructions map to it.
pub struct SourceFileTable {
    files_by_id: BTreeMap<u32, String>,
    id_by_file: BTreeMap<String, u32>,
    next_id: u32,
}

impl Default for SourceFileTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFileTable {
    pub fn new() -> Self {
        Self {
            files_by_id: BTreeMap::new(),
            id_by_file: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn intern(&mut self, path: &str) -> u32 {
        let fp = canonicalize_path(path);
        if let Some(&id) = self.id_by_file.get(&fp) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.files_by_id.insert(id, fp.clone());
        self.id_by_file.insert(fp, id);
        id
    }

    pub fn get_by_id(&self, id: u32) -> Option<&String> {
        self.files_by_id.get(&id)
    }

    fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .files_by_id
            .iter()
            .map(|(id, path)| (id.to_string(), Value::String(path.clone())))
            .collect();
        Value::Object(map)
    }
}

/// Serialize a finalized listing into a compact JSON message.
/// Format:
/// {
///   "t": "listing_chunk",
///   "id": <seq id>,
///   "final": bool,
///   "file_table": { "<file id>": "<path>", ... },
///   "functions": [
///     { "name": ..., "line": <header ordinal>, "instructions":
///       [ [addr_hex, bytes, mnemonic, operands, file_id, src_line, ref], ... ] }
///   ]
/// }
/// Addresses are hex strings for JS-safe handling; `file_id` and `src_line`
/// are 0 when no location marker applied; `ref` is null or
/// { "n": name, "o": "0x..." }.
pub fn serialize_compact_listing(functions: &[AsmFunction], seq_id: u64, final_chunk: bool) -> Value {
    let mut file_table = SourceFileTable::new();

    let mut rendered: Vec<Value> = Vec::with_capacity(functions.len());
    for function in functions {
        let mut instrs: Vec<Value> = Vec::with_capacity(function.instructions.len());
        for instr in &function.instructions {
            let file_id = instr
                .source_file
                .as_deref()
                .map(|p| file_table.intern(p))
                .unwrap_or(0);
            let reference = instr.reference.as_ref().map(|r| {
                json!({ "n": r.name, "o": format!("0x{:x}", r.relative_offset) })
            });
            instrs.push(json!([
                format!("0x{:x}", instr.offset),
                instr.machine_code,
                instr.mnemonic,
                instr.operand_text,
                file_id,
                instr.source_line.unwrap_or(0),
                reference,
            ]));
        }
        rendered.push(json!({
            "name": function.name,
            "line": function.start_line,
            "instructions": Value::Array(instrs),
        }));
    }

    json!({
        "t": "listing_chunk",
        "id": seq_id,
        "final": final_chunk,
        "file_table": file_table.to_json(),
        "functions": Value::Array(rendered),
    })
}
