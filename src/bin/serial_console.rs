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

//! Raw serial console for bench testing a dial device.
//!
//! Usage: cargo run --bin serial_console -- <ADDRESS>
//!
//! Prints every received chunk and sends each stdin line as typed (without
//! the newline), e.g. `s` to request the handset state.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use dialphone::bluetooth::{RfcommConnector, SessionListener, SessionManager, DEFAULT_RFCOMM_CHANNEL};
use dialphone::SessionState;

struct Console;

impl SessionListener for Console {
    fn on_data_received(&self, data: &[u8]) {
        let hex: Vec<String> = data.iter().map(|b| format!("{:02X}", b)).collect();
        println!("<< {:<24} {:?}", hex.join(" "), String::from_utf8_lossy(data));
    }

    fn on_error(&self, message: &str) {
        println!("!! {}", message);
    }

    fn on_state_change(&self, state: SessionState) {
        println!("-- {}", state);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let address = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Usage: serial_console <ADDRESS>"))?;

    let connector = Arc::new(RfcommConnector::new(DEFAULT_RFCOMM_CHANNEL).await?);
    let session = SessionManager::new(connector);
    let console = Arc::new(Console);
    session.set_listener(&console);

    session.start();
    session.connect(&address);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        session.send(line.as_bytes());
    }

    session.stop();
    Ok(())
}
