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

//! Dial device message definitions.

/// Messages sent by the dial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneEvent {
    /// One or more digits were dialled.
    Dial(String),
    /// Handset put down.
    HangUp,
    /// Handset lifted.
    PickUp,
}

impl PhoneEvent {
    /// Parse one line. Unknown messages yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(digits) = line.strip_prefix("DIAL") {
            return Some(Self::Dial(digits.to_string()));
        }
        match line {
            "HANGUP" => Some(Self::HangUp),
            "PICKUP" => Some(Self::PickUp),
            _ => None,
        }
    }
}

/// Commands written to the dial device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneCommand {
    /// Ask the device to report its handset state.
    RequestState,
    StartRinging,
    StopRinging,
}

impl PhoneCommand {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::RequestState => b"s",
            Self::StartRinging => b"r",
            Self::StopRinging => b"o",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dial() {
        assert_eq!(PhoneEvent::parse("DIAL5"), Some(PhoneEvent::Dial("5".into())));
        assert_eq!(
            PhoneEvent::parse("DIAL0123"),
            Some(PhoneEvent::Dial("0123".into()))
        );
    }

    #[test]
    fn test_parse_handset() {
        assert_eq!(PhoneEvent::parse("HANGUP"), Some(PhoneEvent::HangUp));
        assert_eq!(PhoneEvent::parse("PICKUP\r"), Some(PhoneEvent::PickUp));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(PhoneEvent::parse("RING"), None);
        assert_eq!(PhoneEvent::parse("hangup"), None);
        assert_eq!(PhoneEvent::parse(""), None);
    }

    #[test]
    fn test_command_bytes() {
        assert_eq!(PhoneCommand::RequestState.as_bytes(), b"s");
        assert_eq!(PhoneCommand::StartRinging.as_bytes(), b"r");
        assert_eq!(PhoneCommand::StopRinging.as_bytes(), b"o");
    }
}
