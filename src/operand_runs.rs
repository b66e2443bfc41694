/// Operand tokenizer: splits an operand string into typed runs so the
/// frontend can color registers, numeric literals, and punctuation/symbols
/// separately. Pure and stateless; called per displayed instruction.

/// Classification of one run of operand text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RunKind {
    Symbol,
    Literal,
    Register,
}

/// A maximal substring of the operand sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OperandRun {
    pub text: String,
    pub kind: RunKind,
}

// Characters that start (or continue) a numeric literal besides decimal
// digits: the immediate marker, a sign, and hex digit letters.
const LITERAL_CHARS: &str = "$-abcdefABCDEF";

/// Scan `operands` left to right and emit runs.
///
/// Classification priority per character: register start/continue, symbol
/// start, literal start. Letters outside the literal set that do not extend
/// a register run (`g`..`z` and so on) start nothing by themselves; they are
/// absorbed into whatever run is open. A comma gets a space appended right
/// after it, which normalizes operand-list separators for display. The
/// frontend's rendering depends on the exact run split and separator
/// spacing, so both quirks are load-bearing.
pub fn tokenize_operands(operands: &str) -> Vec<OperandRun> {
    let mut runs = Vec::new();
    let mut buf = String::new();
    let mut kind: Option<RunKind> = None;

    for c in operands.chars() {
        let next = if c == '%' || (kind == Some(RunKind::Register) && c.is_alphanumeric()) {
            Some(RunKind::Register)
        } else if !c.is_alphanumeric() && !LITERAL_CHARS.contains(c) {
            Some(RunKind::Symbol)
        } else if c.is_numeric() || LITERAL_CHARS.contains(c) {
            Some(RunKind::Literal)
        } else {
            None
        };

        if let Some(next) = next {
            if let Some(prev) = kind {
                if prev != next {
                    runs.push(OperandRun {
                        text: std::mem::take(&mut buf),
                        kind: prev,
                    });
                }
            }
            kind = Some(next);
        }

        buf.push(c);
        if c == ',' {
            buf.push(' ');
        }
    }

    if let Some(kind) = kind {
        runs.push(OperandRun { text: buf, kind });
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, kind: RunKind) -> OperandRun {
        OperandRun {
            text: text.to_string(),
            kind,
        }
    }

    #[test]
    fn empty_operand_has_no_runs() {
        assert!(tokenize_operands("").is_empty());
    }

    #[test]
    fn register_pair_splits_into_three_runs() {
        // The comma is a symbol run and carries the injected space.
        assert_eq!(
            tokenize_operands("%eax,%ebx"),
            vec![
                run("%eax", RunKind::Register),
                run(", ", RunKind::Symbol),
                run("%ebx", RunKind::Register),
            ]
        );
    }

    #[test]
    fn immediate_is_one_literal_run() {
        assert_eq!(
            tokenize_operands("$0x10"),
            vec![run("$0x10", RunKind::Literal)]
        );
    }

    #[test]
    fn plain_word_is_absorbed_into_literal_run() {
        // 'f' starts a literal run (hex digit letter); the following 'o's
        // match nothing and are absorbed into it.
        assert_eq!(tokenize_operands("foo"), vec![run("foo", RunKind::Literal)]);
    }

    #[test]
    fn memory_operand_with_displacement() {
        assert_eq!(
            tokenize_operands("-0x8(%rbp)"),
            vec![
                run("-0x8", RunKind::Literal),
                run("(", RunKind::Symbol),
                run("%rbp", RunKind::Register),
                run(")", RunKind::Symbol),
            ]
        );
    }

    #[test]
    fn register_run_continues_through_digits() {
        assert_eq!(
            tokenize_operands("%r10d"),
            vec![run("%r10d", RunKind::Register)]
        );
    }

    #[test]
    fn tokenize_is_deterministic() {
        let a = tokenize_operands("$0x1,%eax,8(%rsp)");
        let b = tokenize_operands("$0x1,%eax,8(%rsp)");
        assert_eq!(a, b);
    }
}
