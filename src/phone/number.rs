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

//! Phone number assembly from dialled digits.

use tracing::{debug, warn};

/// Digits that make up a complete number by default.
pub const DEFAULT_NUMBER_LENGTH: usize = 9;

/// Display grouping, e.g. `612 34 56 78`.
const GROUPS: [usize; 4] = [3, 2, 2, 2];

/// Collects digits until a number of the configured length is complete.
#[derive(Debug, Clone)]
pub struct DialNumber {
    digits: String,
    length: usize,
}

impl Default for DialNumber {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_LENGTH)
    }
}

impl DialNumber {
    pub fn new(length: usize) -> Self {
        Self {
            digits: String::with_capacity(length),
            length: length.max(1),
        }
    }

    /// Append dialled digits.
    ///
    /// Returns the complete number when this push completes it. Non-digit
    /// characters are ignored, as is anything dialled once the number is
    /// already complete.
    pub fn push(&mut self, digits: &str) -> Option<String> {
        if self.is_complete() {
            debug!("Number already complete, ignoring '{}'", digits);
            return None;
        }

        for c in digits.chars() {
            if !c.is_ascii_digit() {
                warn!("Ignoring non-digit '{}'", c);
                continue;
            }
            self.digits.push(c);
            if self.is_complete() {
                return Some(self.digits.clone());
            }
        }

        None
    }

    pub fn delete_last(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() >= self.length
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Number grouped for display.
    pub fn formatted(&self) -> String {
        let mut groups = Vec::with_capacity(GROUPS.len());
        let mut rest = self.digits.as_str();

        for size in GROUPS {
            if rest.is_empty() {
                break;
            }
            let (head, tail) = rest.split_at(size.min(rest.len()));
            groups.push(head);
            rest = tail;
        }

        let mut formatted = groups.join(" ");
        formatted.push_str(rest);
        formatted
    }
}
