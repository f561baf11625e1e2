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

//! Subscriber interface for session events.

use crate::state::SessionState;

/// Receives session events. At most one listener is registered at a time.
///
/// Callbacks are delivered one at a time and in generation order. They may
/// run on a runtime worker thread, and may call back into the session
/// manager (for example `send` from `on_state_change`).
pub trait SessionListener: Send + Sync {
    /// A raw chunk exactly as returned by one transport read.
    fn on_data_received(&self, data: &[u8]);

    fn on_error(&self, message: &str);

    fn on_state_change(&self, state: SessionState);
}
