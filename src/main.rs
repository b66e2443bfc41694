use anyhow::{bail, Context, Result};
use clap::Parser;
use realtime_asm_helper::protocol::LookupRequest;
use realtime_asm_helper::run_gate::RunGate;
use realtime_asm_helper::{listing_worker, request_handler, transport};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::mpsc;
use std::thread;

/// Parse disassembler listing output into a queryable model and serve
/// lookup requests for an IDE assembly viewer.
#[derive(Parser, Debug)]
#[command(name = "realtime-asm-helper")]
struct Cli {
    /// Listing file to parse; "-" reads the listing from stdin
    listing: String,

    /// After parsing, serve lookup requests (NDJSON on stdin) until EOF.
    /// Requires the listing to come from a file.
    #[arg(long)]
    serve: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

static GATE: RunGate = RunGate::new();

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let _logger = flexi_logger::Logger::try_with_env_or_str(default_level)
        .context("invalid log spec")?
        .start()
        .context("failed to start logger")?;

    if cli.serve && cli.listing == "-" {
        bail!("--serve needs stdin for requests; pass the listing as a file");
    }

    let (line_tx, line_rx) = mpsc::channel::<String>();
    let (req_tx, req_rx) = mpsc::channel::<LookupRequest>();

    let worker = thread::spawn(move || listing_worker::run_listing_worker(&GATE, line_rx, req_rx));

    // Producer side: feed the stream line by line, then drop the sender to
    // signal end-of-stream. Any reader error just ends the stream early;
    // whatever was parsed so far still becomes the model.
    let producer = {
        let listing = cli.listing.clone();
        thread::spawn(move || {
            if let Err(e) = feed_lines(&listing, line_tx) {
                log::warn!("Listing stream ended early: {}", e);
            }
        })
    };

    if cli.serve {
        let mut stdin = transport::StdioTransport::new();
        while let Some(msg) = stdin
            .read_message()
            .map_err(|e| anyhow::anyhow!("request stream failed: {}", e))?
        {
            request_handler::dispatch_request(&msg, &req_tx);
        }
    } else {
        // One-shot mode: dump the parsed model and exit.
        if req_tx.send(LookupRequest::Listing { seq_id: 0 }).is_err() {
            log::warn!("Worker exited before the listing could be requested");
        }
    }
    drop(req_tx);

    producer.join().ok();
    worker.join().ok();
    Ok(())
}

fn feed_lines(listing: &str, line_tx: mpsc::Sender<String>) -> Result<()> {
    let reader: Box<dyn BufRead> = if listing == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file =
            File::open(listing).with_context(|| format!("cannot open listing {:?}", listing))?;
        Box::new(BufReader::new(file))
    };

    for line in reader.lines() {
        let line = line.context("listing read failed")?;
        if line_tx.send(line).is_err() {
            // Worker is gone; nothing left to feed.
            break;
        }
    }
    Ok(())
}
