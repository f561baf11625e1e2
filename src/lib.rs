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

//! DialPhone: drive a Bluetooth rotary dial over a serial link.
//!
//! [`bluetooth::SessionManager`] owns the connection lifecycle and reports
//! raw data, errors and state changes to one listener.
//! [`phone::PhoneService`] speaks the dial device's protocol on top of it.

pub mod bluetooth;
pub mod config;
pub mod phone;
pub mod state;

pub use state::SessionState;
