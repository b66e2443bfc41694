use crate::listing::{AsmFunction, AsmReference, InstructionLocator};

/// Reference resolution over a finalized listing.
///
/// Both lookups are read-only and total: every miss, including degenerate
/// input, comes back as None. The hosting UI treats "no match" and "error"
/// identically, so nothing here is allowed to surface a fault.

/// Locate the instruction a branch/call reference points at.
///
/// Only the first function whose name exactly equals the reference name is
/// searched. The reference offset is relative to that function's base (its
/// first instruction's offset; see `AsmFunction::base_offset`), so the
/// absolute target is `base + relative_offset` and the first instruction
/// with that exact offset wins.
pub fn resolve_target(
    functions: &[AsmFunction],
    reference: &AsmReference,
) -> Option<InstructionLocator> {
    let (function_index, function) = functions
        .iter()
        .enumerate()
        .find(|(_, f)| f.name == reference.name)?;

    let target = function.base_offset().checked_add(reference.relative_offset)?;
    let instruction_index = function
        .instructions
        .iter()
        .position(|i| i.offset == target)?;

    Some(InstructionLocator {
        function_index,
        instruction_index,
    })
}

/// Correlate a source-level declaration name with a parsed assembly symbol.
///
/// The declaration side may carry a return type and arbitrary whitespace or
/// case ("void Foo::Bar "), the assembly side may carry namespace/mangling
/// prefixes, so both are normalized (drop "void", trim, lower-case) and the
/// assembly name only has to end with the candidate. First match in listing
/// order; None for anything that does not match, empty candidates included.
pub fn match_function_by_source_name(candidate: &str, functions: &[AsmFunction]) -> Option<usize> {
    let needle = normalize_symbol(candidate);
    if needle.is_empty() {
        return None;
    }
    functions
        .iter()
        .position(|f| normalize_symbol(&f.name).ends_with(&needle))
}

fn normalize_symbol(name: &str) -> String {
    name.replace("void", "").trim().to_lowercase()
}
