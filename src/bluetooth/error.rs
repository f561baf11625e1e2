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

//! Session error taxonomy.
//!
//! None of these escape the session manager as `Err` values: they are
//! rendered with `Display` and handed to the listener's `on_error`.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid device address: {0}")]
    InvalidArgument(String),

    #[error("Session not started")]
    NotStarted,

    #[error("Not connected")]
    NotConnected,

    #[error("Unable to connect device: {0}")]
    Connect(String),

    #[error("Unable to connect device: timed out after {}s", .0.as_secs())]
    ConnectTimeout(Duration),

    #[error("Device connection was lost: {0}")]
    Read(#[source] std::io::Error),

    #[error("Write failed: {0}")]
    Write(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
