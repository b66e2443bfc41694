// Crate root: declare modules and control visibility
pub mod listing;
pub mod listing_parser;
pub mod listing_worker;
pub mod operand_runs;
pub mod protocol;
pub mod request_handler;
pub mod requests;
pub mod resolver;
pub mod run_gate;
pub mod serializer;
pub mod transport;
pub mod utils;

// Re-export commonly used API from the library for binaries/tests
pub use listing::{instruction_at, AsmFunction, AsmInstruction, AsmReference, InstructionLocator};
pub use listing_parser::ListingParser;
pub use operand_runs::{tokenize_operands, OperandRun, RunKind};
pub use resolver::{match_function_by_source_name, resolve_target};
