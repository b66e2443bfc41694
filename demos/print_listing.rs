use realtime_asm_helper::serializer::serialize_compact_listing;
use realtime_asm_helper::ListingParser;

fn main() {
    let parser = ListingParser::new();
    for line in [
        "0 <main>:",
        "/src/demo.cpp:3",
        "   1000:\t55                   \tpush   %rbp",
        "   1001:\t48 89 e5             \tmov    %rsp,%rbp",
        "   1004:\te8 07 00 00 00       \tcallq  1010 <helper>",
        "   1009:\tc3                   \tretq",
        "6 <helper>:",
        "/src/demo.cpp:8",
        "   1010:\t90                   \tnop",
        "   1011:\tc3                   \tretq",
    ] {
        parser.process_line(line);
    }
    let functions = parser.finalize();

    let v = serialize_compact_listing(&functions, 1, true);
    eprintln!("{}", serde_json::to_string_pretty(&v).unwrap());
}
