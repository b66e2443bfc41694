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

use serde_json::Value;
use std::error::Error;
use std::io::{self, BufRead, BufReader, Write};

/// Newline-delimited JSON over stdio.
///
/// Each message is one JSON object on one line. That keeps framing trivial
/// for the host IDE extension: no Content-Length headers, and a broken line
/// never desynchronizes the stream (it is skipped and reported).
///
/// Generic over the underlying reader so the framing can be driven from any
/// buffered byte stream; the process wires it to stdin via `new`.
pub struct StdioTransport<R = BufReader<io::Stdin>> {
    reader: R,
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(io::stdin()),
        }
    }
}

impl<R: BufRead> StdioTransport<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next message. Blank lines are skipped; lines that are not
    /// valid JSON are skipped with a warning. Ok(None) means EOF, i.e. the
    /// host closed our stdin.
    pub fn read_message(&mut self) -> Result<Option<Value>, Box<dyn Error + Send + Sync>> {
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(v) => return Ok(Some(v)),
                Err(e) => log::warn!("Skipping malformed request line: {}", e),
            }
        }
    }
}

/// Write a JSON `Value` to stdout as one line, using stdout's built-in lock.
///
/// The message is serialized before the lock is taken so the critical
/// section covers only the write and flush. Process-wide locking keeps
/// worker and main-thread messages from interleaving.
pub fn write_json_locked(msg: &Value) -> Result<(), Box<dyn Error + Send + Sync>> {
    let body = serde_json::to_vec(msg)?;
    let stdout = io::stdout();
    let mut w = stdout.lock();
    w.write_all(&body)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}
