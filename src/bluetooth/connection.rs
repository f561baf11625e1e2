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

//! Per-connection tasks: the receive loop and the writer.
//!
//! Both are bound to one transport generation. They report back through
//! [`Shared`], which drops anything coming from a generation that is no
//! longer live. Only a weak reference is held, so dropping the last
//! manager drops the link and ends both tasks.

use std::sync::Weak;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::error::SessionError;
use super::session::Shared;
use super::transport::{BoxedReader, BoxedWriter};

/// Read chunks until end-of-stream, an I/O error, or a stop signal.
///
/// The stop signal fires when the sender is dropped, which happens whenever
/// the session tears down this generation's link or is itself dropped.
pub(crate) async fn receive_loop(
    shared: Weak<Shared>,
    generation: u64,
    mut reader: BoxedReader,
    mut stop: oneshot::Receiver<()>,
    buffer_size: usize,
) {
    debug!("Receive loop {} started", generation);
    let mut buf = vec![0u8; buffer_size.max(1)];

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => {
                debug!("Receive loop {} stopped", generation);
                break;
            }
            result = reader.read(&mut buf) => match result {
                Ok(0) => {
                    info!("Connection closed by remote");
                    if let Some(shared) = shared.upgrade() {
                        shared.link_closed(generation, None);
                    }
                    break;
                }
                Ok(n) => {
                    let delivered = shared
                        .upgrade()
                        .is_some_and(|shared| shared.deliver_data(generation, &buf[..n]));
                    if !delivered {
                        debug!("Receive loop {} superseded, discarding {} bytes", generation, n);
                        break;
                    }
                }
                Err(e) => {
                    error!("Read error: {}", e);
                    if let Some(shared) = shared.upgrade() {
                        shared.link_closed(generation, Some(SessionError::Read(e)));
                    }
                    break;
                }
            }
        }
    }
}

/// Write queued buffers in order. Ends when the session drops the queue,
/// then shuts the write half down.
pub(crate) async fn write_loop(
    shared: Weak<Shared>,
    generation: u64,
    mut writer: BoxedWriter,
    mut outgoing: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    while let Some(data) = outgoing.recv().await {
        if let Err(e) = write_chunk(&mut writer, &data).await {
            warn!("Write of {} bytes failed: {}", data.len(), e);
            if let Some(shared) = shared.upgrade() {
                shared.write_failed(generation, SessionError::Write(e));
            }
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Write half shutdown for generation {}: {}", generation, e);
    }
}

async fn write_chunk(writer: &mut BoxedWriter, data: &[u8]) -> std::io::Result<()> {
    writer.write_all(data).await?;
    writer.flush().await
}
