// Copyright 2026 Daniel Pelikan
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

//! Line assembly for the dial device's text protocol.
//!
//! The session delivers raw chunks with arbitrary boundaries. The device
//! terminates each message with `\n` (some firmware sends `\r\n`).

use tracing::warn;

/// Longest line accepted before the buffer is discarded.
pub const MAX_LINE_LENGTH: usize = 256;

/// Accumulates received bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Feed one received chunk. Returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in chunk {
            match byte {
                b'\n' | b'\r' => {
                    if !self.buffer.is_empty() {
                        lines.push(String::from_utf8_lossy(&self.buffer).into_owned());
                        self.buffer.clear();
                    }
                }
                _ => {
                    if self.buffer.len() >= MAX_LINE_LENGTH {
                        warn!("Line exceeds {} bytes, discarding", MAX_LINE_LENGTH);
                        self.buffer.clear();
                    }
                    self.buffer.push(byte);
                }
            }
        }

        lines
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
