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

//! Transport contract consumed by the session manager.
//!
//! A [`Connector`] opens a duplex byte channel to a device address. The
//! resulting [`Transport`] is split into a read half (owned by the receive
//! loop) and a write half (owned by the writer task). Dropping both halves
//! closes the channel.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};

use super::error::{Result, SessionError};

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Address of a remote endpoint. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(SessionError::InvalidArgument("address is empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DeviceAddress {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live duplex channel to a device.
pub struct Transport {
    name: String,
    reader: BoxedReader,
    writer: BoxedWriter,
}

impl Transport {
    pub fn new(name: impl Into<String>, reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self {
            name: name.into(),
            reader,
            writer,
        }
    }

    /// Wrap a bidirectional stream (RFCOMM socket, in-memory duplex, ...).
    pub fn from_stream<S>(name: impl Into<String>, stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self::new(name, Box::new(reader), Box::new(writer))
    }

    /// Human-readable name of the remote device.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, BoxedReader, BoxedWriter) {
        (self.name, self.reader, self.writer)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").field("name", &self.name).finish()
    }
}

/// Opens transports to device addresses.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Cheap synchronous check run before any state change.
    ///
    /// Reject addresses this connector can never reach here so that
    /// `connect` fails fast without entering `Connecting`.
    fn validate(&self, _address: &DeviceAddress) -> Result<()> {
        Ok(())
    }

    /// Perform the handshake. May take arbitrarily long; the session manager
    /// applies its own timeout.
    async fn open(&self, address: &DeviceAddress) -> Result<Transport>;
}
