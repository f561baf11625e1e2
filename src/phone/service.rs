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

//! Phone service: the dial device protocol on top of a serial session.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use super::framing::LineAssembler;
use super::protocol::{PhoneCommand, PhoneEvent};
use crate::bluetooth::{SessionListener, SessionManager};
use crate::state::SessionState;

/// Receives dial device events.
pub trait PhoneListener: Send + Sync {
    fn on_dial(&self, digits: &str);

    fn on_hang_up(&self);

    fn on_pick_up(&self);

    fn on_error(&self, error: &str);

    fn on_state_change(&self, state: SessionState);
}

/// Talks to the dial device over a [`SessionManager`].
///
/// Registers itself as the session's listener on construction.
pub struct PhoneService {
    session: SessionManager,
    listener: Arc<dyn PhoneListener>,
    lines: Mutex<LineAssembler>,
}

impl PhoneService {
    pub fn new(session: SessionManager, listener: Arc<dyn PhoneListener>) -> Arc<Self> {
        let service = Arc::new(Self {
            session,
            listener,
            lines: Mutex::new(LineAssembler::new()),
        });
        service.session.set_listener(&service);
        service
    }

    pub fn start(&self) {
        self.session.start();
    }

    /// Connect unless a connection or attempt is already in progress.
    pub fn connect(&self, address: &str) {
        let state = self.session.state();
        if state == SessionState::None {
            self.session.connect(address);
        } else {
            debug!("Ignoring connect to {}: session is {:?}", address, state);
        }
    }

    pub fn disconnect(&self) {
        self.session.stop();
    }

    pub fn start_ringing(&self) {
        self.send_command(PhoneCommand::StartRinging);
    }

    pub fn stop_ringing(&self) {
        self.send_command(PhoneCommand::StopRinging);
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn device_name(&self) -> Option<String> {
        self.session.device_name()
    }

    fn send_command(&self, command: PhoneCommand) {
        debug!("Sending {:?}", command);
        self.session.send(command.as_bytes());
    }

    fn dispatch(&self, event: PhoneEvent) {
        match event {
            PhoneEvent::Dial(digits) => self.listener.on_dial(&digits),
            PhoneEvent::HangUp => self.listener.on_hang_up(),
            PhoneEvent::PickUp => self.listener.on_pick_up(),
        }
    }
}

impl SessionListener for PhoneService {
    fn on_data_received(&self, data: &[u8]) {
        let lines = self.lines.lock().push(data);
        for line in lines {
            match PhoneEvent::parse(&line) {
                Some(event) => self.dispatch(event),
                None => debug!("Ignoring unknown message: {}", line),
            }
        }
    }

    fn on_error(&self, message: &str) {
        self.listener.on_error(message);
    }

    fn on_state_change(&self, state: SessionState) {
        match state {
            SessionState::Connected => {
                self.lines.lock().reset();
                if let Some(name) = self.session.device_name() {
                    info!("Dial device connected: {}", name);
                }
                self.send_command(PhoneCommand::RequestState);
            }
            SessionState::None => self.lines.lock().reset(),
            SessionState::Connecting => {}
        }
        self.listener.on_state_change(state);
    }
}
