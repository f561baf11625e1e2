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

//! Bluetooth serial link.
//!
//! Session management over an RFCOMM (serial port profile) connection: the
//! connector contract, the receive loop, and the session manager façade.

mod connection;
mod error;
mod listener;
mod rfcomm;
mod session;
mod transport;

pub use error::{Result, SessionError};
pub use listener::SessionListener;
pub use rfcomm::{parse_address, PairedDevice, RfcommConnector, DEFAULT_RFCOMM_CHANNEL, SPP_UUID};
pub use session::{
    SessionManager, SessionOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_BUFFER_SIZE,
};
pub use transport::{BoxedReader, BoxedWriter, Connector, DeviceAddress, Transport};
