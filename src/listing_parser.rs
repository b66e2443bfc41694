use crate::listing::{AsmFunction, AsmInstruction, AsmReference};
use regex::Regex;
use std::sync::{Mutex, MutexGuard};

/// Streaming parser for `objdump -C -l -d` style listing output.
///
/// The disassembler's stdout is delivered to us one line at a time, usually
/// from the process-output callback thread, while the eventual consumer sits
/// on another thread. All mutable parse state therefore lives behind a single
/// mutex and `process_line` / `finalize` are its only mutators.
///
/// Three line shapes matter; everything else (banners, blank lines, section
/// headers) is skipped without complaint:
///
/// - function header: `12 <_Z3foov>:`
/// - instruction:     `  1000:\t55 \tpush   %rbp  # frame  <_Z3barv+0x4>`
/// - location marker: `/home/user/foo.cpp:42`
pub struct ListingParser {
    function_pattern: Regex,
    instruction_pattern: Regex,
    location_pattern: Regex,
    state: Mutex<ParserState>,
}

#[derive(Default)]
struct ParserState {
    functions: Vec<AsmFunction>,
    current_function: Option<AsmFunction>,
    // Sticky location: applies to every instruction until the next marker.
    current_source_file: Option<String>,
    current_source_line: Option<u32>,
    line_no: usize,
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser {
    pub fn new() -> Self {
        Self {
            // A decimal line number, a bracketed symbol, a colon, then only
            // whitespace. objdump -C prints the demangled symbol inside <>.
            function_pattern: Regex::new(r"^(\d+) <(.*)>:\s*$")
                .expect("function header pattern is valid"),
            // Address, machine-code text up to the last tab, mnemonic,
            // operand remainder, optional # comment, optional <name+0xHEX>
            // reference. The +0xHEX part may be absent (offset 0).
            instruction_pattern: Regex::new(
                r"^\s*([0-9A-Fa-f]+):\s*(.*)\t\s*([^<#\s]*)([^<#]*)?\s*(#.*)?\s*(?:<([^+]*)(?:\+0x([0-9A-Fa-f]+))?>)?\s*$",
            )
            .expect("instruction pattern is valid"),
            // A file-path-like token (optional Windows drive prefix), a
            // colon, a decimal line number, nothing else.
            location_pattern: Regex::new(r"^((?:[A-Z]:\\)?[^:]+):(\d+)\s*$")
                .expect("location pattern is valid"),
            state: Mutex::new(ParserState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ParserState> {
        // A poisoned lock only means another thread panicked mid-line; the
        // accumulated model is still usable, so keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Consume one line of listing output, in stream order.
    ///
    /// Lines that match no known shape, instruction lines arriving before any
    /// function header, and lines whose numeric fields fail to decode are all
    /// skipped silently. Nothing here aborts a run.
    pub fn process_line(&self, line: &str) {
        let mut st = self.state();

        if let Some(caps) = self.function_pattern.captures(line) {
            // A new header closes the open function, even an empty one.
            if let Some(done) = st.current_function.take() {
                st.functions.push(done);
            }
            let start_line = st.line_no;
            st.current_function = Some(AsmFunction::new(caps[2].to_string(), start_line));
        } else if st.current_function.is_some() {
            if let Some(caps) = self.instruction_pattern.captures(line) {
                if let Some(instr) = build_instruction(&caps, &st) {
                    if let Some(function) = st.current_function.as_mut() {
                        function.instructions.push(instr);
                    }
                }
            } else if let Some(caps) = self.location_pattern.captures(line) {
                if let Ok(line_num) = caps[2].parse::<u32>() {
                    st.current_source_file = Some(caps[1].to_string());
                    st.current_source_line = Some(line_num);
                }
            }
        }

        st.line_no += 1;
    }

    /// Number of functions completed so far. Safe to call mid-run from
    /// another thread; the function currently being filled is not counted.
    pub fn completed_count(&self) -> usize {
        self.state().functions.len()
    }

    /// Flush the open function and hand over the completed listing in header
    /// order. This consumes the run: a second call without new input yields
    /// an empty list, and the parser is ready for a fresh stream.
    pub fn finalize(&self) -> Vec<AsmFunction> {
        let mut st = self.state();
        if let Some(done) = st.current_function.take() {
            st.functions.push(done);
        }
        st.current_source_file = None;
        st.current_source_line = None;
        st.line_no = 0;
        std::mem::take(&mut st.functions)
    }
}

/// Turn the captured groups of an instruction line into a model instruction.
/// Returns None when a hex field does not decode (that line is dropped).
fn build_instruction(caps: &regex::Captures<'_>, st: &ParserState) -> Option<AsmInstruction> {
    let offset = u64::from_str_radix(&caps[1], 16).ok()?;

    let reference = match caps.get(6) {
        Some(name) => {
            let relative_offset = match caps.get(7) {
                Some(m) => u64::from_str_radix(m.as_str(), 16).ok()?,
                None => 0,
            };
            Some(AsmReference {
                name: name.as_str().to_string(),
                relative_offset,
            })
        }
        None => None,
    };

    Some(AsmInstruction {
        offset,
        machine_code: caps[2].trim().to_string(),
        mnemonic: caps[3].trim().to_string(),
        operand_text: caps.get(4).map_or("", |m| m.as_str()).trim().to_string(),
        comment: caps.get(5).map_or("", |m| m.as_str()).to_string(),
        source_file: st.current_source_file.clone(),
        source_line: st.current_source_line,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> Vec<AsmFunction> {
        let parser = ListingParser::new();
        for line in lines {
            parser.process_line(line);
        }
        parser.finalize()
    }

    #[test]
    fn instruction_fields_are_extracted() {
        let functions = parse(&[
            "0 <main>:",
            "   4004f6:\t55                   \tpush   %rbp",
        ]);
        assert_eq!(functions.len(), 1);
        let instr = &functions[0].instructions[0];
        assert_eq!(instr.offset, 0x4004f6);
        assert_eq!(instr.machine_code, "55");
        assert_eq!(instr.mnemonic, "push");
        assert_eq!(instr.operand_text, "%rbp");
        assert_eq!(instr.comment, "");
        assert!(instr.reference.is_none());
    }

    #[test]
    fn header_then_n_instructions_yields_one_function() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\t55\tpush   %rbp",
            "   1001:\t48 89 e5\tmov    %rsp,%rbp",
            "   1004:\tc3\tretq",
        ]);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "main");
        assert_eq!(functions[0].instructions.len(), 3);
        // Arrival order is preserved
        assert_eq!(functions[0].instructions[0].offset, 0x1000);
        assert_eq!(functions[0].instructions[2].offset, 0x1004);
    }

    #[test]
    fn consecutive_headers_yield_empty_function() {
        let functions = parse(&["3 <empty>:", "7 <full>:", "   2000:\t90\tnop"]);
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "empty");
        assert!(functions[0].instructions.is_empty());
        assert_eq!(functions[1].name, "full");
        assert_eq!(functions[1].instructions.len(), 1);
    }

    #[test]
    fn start_line_is_stream_ordinal() {
        let functions = parse(&[
            "banner line",
            "",
            "2 <first>:",
            "   1000:\t90\tnop",
            "9 <second>:",
        ]);
        assert_eq!(functions[0].start_line, 2);
        assert_eq!(functions[1].start_line, 4);
    }

    #[test]
    fn location_marker_is_sticky() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\t90\tnop",
            "/home/user/foo.cpp:12",
            "   1001:\t90\tnop",
            "   1002:\t90\tnop",
            "/home/user/bar.cpp:3",
            "   1003:\t90\tnop",
        ]);
        let instrs = &functions[0].instructions;
        assert_eq!(instrs[0].source_file, None);
        assert_eq!(instrs[0].source_line, None);
        assert_eq!(instrs[1].source_file.as_deref(), Some("/home/user/foo.cpp"));
        assert_eq!(instrs[1].source_line, Some(12));
        assert_eq!(instrs[2].source_file.as_deref(), Some("/home/user/foo.cpp"));
        assert_eq!(instrs[3].source_file.as_deref(), Some("/home/user/bar.cpp"));
        assert_eq!(instrs[3].source_line, Some(3));
    }

    #[test]
    fn windows_style_location_marker() {
        let functions = parse(&[
            "0 <main>:",
            r"C:\work\src\main.cpp:77",
            "   1000:\t90\tnop",
        ]);
        let instr = &functions[0].instructions[0];
        assert_eq!(instr.source_file.as_deref(), Some(r"C:\work\src\main.cpp"));
        assert_eq!(instr.source_line, Some(77));
    }

    #[test]
    fn reference_with_offset_is_captured() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\t74 08\tje     100a <main+0xa>",
        ]);
        let instr = &functions[0].instructions[0];
        assert_eq!(instr.mnemonic, "je");
        assert_eq!(instr.operand_text, "100a");
        assert_eq!(
            instr.reference,
            Some(AsmReference {
                name: "main".to_string(),
                relative_offset: 0xa,
            })
        );
    }

    #[test]
    fn reference_without_offset_defaults_to_zero() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\te8 0b 00 00 00\tcallq  1010 <_Z3foov>",
        ]);
        let reference = functions[0].instructions[0].reference.as_ref().unwrap();
        assert_eq!(reference.name, "_Z3foov");
        assert_eq!(reference.relative_offset, 0);
    }

    #[test]
    fn templated_reference_target_is_captured() {
        // Demangled template symbols carry their own <> brackets; the
        // reference name runs to the line's closing bracket, not the first.
        let functions = parse(&[
            "0 <main>:",
            "   1000:\te8 0b 00 00 00\tcallq  2000 <std::vector<int>::push_back(int&&)+0x1c>",
        ]);
        assert_eq!(functions[0].instructions.len(), 1);
        assert_eq!(
            functions[0].instructions[0].reference,
            Some(AsmReference {
                name: "std::vector<int>::push_back(int&&)".to_string(),
                relative_offset: 0x1c,
            })
        );
    }

    #[test]
    fn templated_reference_without_offset() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\te8 0b 00 00 00\tcallq  2000 <std::vector<int>::clear()>",
        ]);
        let reference = functions[0].instructions[0].reference.as_ref().unwrap();
        assert_eq!(reference.name, "std::vector<int>::clear()");
        assert_eq!(reference.relative_offset, 0);
    }

    #[test]
    fn comment_is_kept_verbatim() {
        let functions = parse(&[
            "0 <main>:",
            "   1000:\t8b 05 00 00 00 00\tmov    0x0(%rip),%eax        # counter",
        ]);
        let instr = &functions[0].instructions[0];
        assert_eq!(instr.comment, "# counter");
        assert_eq!(instr.operand_text, "0x0(%rip),%eax");
    }

    #[test]
    fn unrecognized_lines_are_ignored() {
        let functions = parse(&[
            "obj.o:     file format elf64-x86-64",
            "",
            "Disassembly of section .text:",
            "0 <main>:",
            "garbage in the middle",
            "   1000:\t90\tnop",
        ]);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].instructions.len(), 1);
    }

    #[test]
    fn instruction_before_any_header_is_dropped() {
        let functions = parse(&["   1000:\t90\tnop", "0 <main>:", "   1001:\t90\tnop"]);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].instructions.len(), 1);
        assert_eq!(functions[0].instructions[0].offset, 0x1001);
    }

    #[test]
    fn location_marker_before_any_header_is_dropped() {
        let functions = parse(&["/home/user/foo.cpp:1", "0 <main>:", "   1000:\t90\tnop"]);
        assert_eq!(functions[0].instructions[0].source_file, None);
    }

    #[test]
    fn overflowing_address_skips_only_that_line() {
        let functions = parse(&[
            "0 <main>:",
            "   fffffffffffffffff:\t90\tnop", // 17 hex digits, does not fit u64
            "   1000:\t90\tnop",
        ]);
        assert_eq!(functions[0].instructions.len(), 1);
        assert_eq!(functions[0].instructions[0].offset, 0x1000);
    }

    #[test]
    fn finalize_flushes_open_function_once() {
        let parser = ListingParser::new();
        parser.process_line("0 <main>:");
        parser.process_line("   1000:\t90\tnop");
        assert_eq!(parser.completed_count(), 0);

        let first = parser.finalize();
        assert_eq!(first.len(), 1);

        // The open-function state was consumed.
        let second = parser.finalize();
        assert!(second.is_empty());
    }

    #[test]
    fn completed_count_tracks_closed_functions() {
        let parser = ListingParser::new();
        parser.process_line("0 <one>:");
        parser.process_line("1 <two>:");
        assert_eq!(parser.completed_count(), 1);
        parser.process_line("2 <three>:");
        assert_eq!(parser.completed_count(), 2);
    }
}
