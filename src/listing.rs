/// In-memory model of a parsed disassembly listing.
///
/// Everything here is built by the `ListingParser` in a single-writer pass
/// over the listing stream and is read-only afterwards. The resolver and the
/// operand tokenizer never mutate it, so once a run is finalized the model
/// can be shared freely across threads.

/// Symbolic branch/call target as printed by the disassembler,
/// e.g. `<_Z3barv+0x1c>`. The offset is relative to the target function's
/// first instruction, not an absolute address.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AsmReference {
    pub name: String,
    pub relative_offset: u64,
}

/// One decoded machine instruction from the listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AsmInstruction {
    /// Address as decoded from the hexadecimal text, no sign extension.
    pub offset: u64,
    pub mnemonic: String,
    pub operand_text: String,
    /// Raw encoded-byte text. Opaque, we never decode it further.
    pub machine_code: String,
    /// Trailing `#` annotation, empty when the line carried none.
    pub comment: String,
    /// Sticky source location: the most recent location marker seen before
    /// this instruction was parsed. None until the first marker.
    pub source_file: Option<String>,
    pub source_line: Option<u32>,
    /// Present only when the line carried a bracketed `<name+0xHEX>` target.
    pub reference: Option<AsmReference>,
}

/// One disassembled routine: a name and its instructions in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AsmFunction {
    pub name: String,
    /// Ordinal of the stream line where the header was recognized. This is a
    /// diagnostic/ordering aid, not an address.
    pub start_line: usize,
    pub instructions: Vec<AsmInstruction>,
}

impl AsmFunction {
    pub fn new(name: String, start_line: usize) -> Self {
        Self {
            name,
            start_line,
            instructions: Vec::new(),
        }
    }

    /// Base address used when resolving relative references: the offset of
    /// the first parsed instruction, 0 for an empty function. This assumes
    /// the first parsed instruction is also the lowest address, which holds
    /// for the listing dialects we consume.
    pub fn base_offset(&self) -> u64 {
        self.instructions.first().map(|i| i.offset).unwrap_or(0)
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

/// Opaque handle to one instruction within one function of a parsed listing.
/// Plain indices so the presentation layer never has to re-derive structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct InstructionLocator {
    pub function_index: usize,
    pub instruction_index: usize,
}

/// Index-based accessor for a locator produced by the resolver.
pub fn instruction_at(
    functions: &[AsmFunction],
    locator: InstructionLocator,
) -> Option<&AsmInstruction> {
    functions
        .get(locator.function_index)
        .and_then(|f| f.instructions.get(locator.instruction_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(offset: u64) -> AsmInstruction {
        AsmInstruction {
            offset,
            mnemonic: "nop".to_string(),
            operand_text: String::new(),
            machine_code: "90".to_string(),
            comment: String::new(),
            source_file: None,
            source_line: None,
            reference: None,
        }
    }

    #[test]
    fn base_offset_of_empty_function_is_zero() {
        let f = AsmFunction::new("empty".to_string(), 0);
        assert_eq!(f.base_offset(), 0);
    }

    #[test]
    fn base_offset_is_first_instruction() {
        let mut f = AsmFunction::new("f".to_string(), 0);
        f.instructions.push(instr(0x1000));
        f.instructions.push(instr(0x0800)); // out of order, still first wins
        assert_eq!(f.base_offset(), 0x1000);
    }

    #[test]
    fn instruction_at_checks_both_indices() {
        let mut f = AsmFunction::new("f".to_string(), 0);
        f.instructions.push(instr(0x1000));
        let functions = vec![f];

        let ok = InstructionLocator {
            function_index: 0,
            instruction_index: 0,
        };
        assert_eq!(instruction_at(&functions, ok).map(|i| i.offset), Some(0x1000));

        let bad_fn = InstructionLocator {
            function_index: 1,
            instruction_index: 0,
        };
        assert!(instruction_at(&functions, bad_fn).is_none());

        let bad_instr = InstructionLocator {
            function_index: 0,
            instruction_index: 5,
        };
        assert!(instruction_at(&functions, bad_instr).is_none());
    }
}
