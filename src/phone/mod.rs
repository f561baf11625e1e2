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

//! Dial device protocol.
//!
//! The device sends newline-terminated text messages (`DIAL<digits>`,
//! `HANGUP`, `PICKUP`) and accepts single-byte commands.

mod framing;
mod number;
mod protocol;
mod service;

pub use framing::{LineAssembler, MAX_LINE_LENGTH};
pub use number::{DialNumber, DEFAULT_NUMBER_LENGTH};
pub use protocol::{PhoneCommand, PhoneEvent};
pub use service::{PhoneListener, PhoneService};
