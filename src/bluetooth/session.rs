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

//! Serial session manager.
//!
//! Owns the state machine, the active transport and the listener. Public
//! operations are synchronous and never block on I/O: the handshake runs on
//! a spawned task, and so do the receive loop and the writer.
//!
//! Two locks are involved:
//! - `inner` guards state, link and listener and is never held while a
//!   callback runs.
//! - `delivery` is a reentrant lock held for the whole "mutate, then notify"
//!   sequence. It serializes callbacks so that events of one generation can
//!   never interleave with those of the next, while still letting a listener
//!   call back into the manager from inside a callback.

use parking_lot::{Mutex, ReentrantMutex};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::connection::{receive_loop, write_loop};
use super::error::SessionError;
use super::listener::SessionListener;
use super::transport::{Connector, DeviceAddress, Transport};
use crate::state::{SessionState, StateMachine, Transition};

/// Default size of a single transport read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Default handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a session manager.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub read_buffer_size: usize,
    pub connect_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// The live connection of one generation.
///
/// Dropping it stops the receive loop and ends the writer, which closes the
/// transport.
struct Link {
    name: String,
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    _stop: oneshot::Sender<()>,
}

#[derive(Default)]
struct Inner {
    started: bool,
    machine: StateMachine,
    link: Option<Link>,
    pending: Option<JoinHandle<()>>,
    listener: Option<Weak<dyn SessionListener>>,
}

impl Inner {
    fn listener(&self) -> Option<Arc<dyn SessionListener>> {
        self.listener.as_ref().and_then(Weak::upgrade)
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

pub(crate) struct Shared {
    connector: Arc<dyn Connector>,
    options: SessionOptions,
    runtime: Handle,
    inner: Mutex<Inner>,
    delivery: ReentrantMutex<()>,
}

impl Shared {
    fn report_error(&self, err: &SessionError) {
        let _delivery = self.delivery.lock();
        let listener = self.inner.lock().listener();
        if let Some(listener) = listener {
            listener.on_error(&err.to_string());
        }
    }

    fn begin_connect(self: &Arc<Self>, address: DeviceAddress) {
        let _delivery = self.delivery.lock();

        let (generation, listener) = {
            let mut inner = self.inner.lock();
            if !inner.started {
                drop(inner);
                warn!("connect({}) before start()", address);
                self.report_error(&SessionError::NotStarted);
                return;
            }

            inner.cancel_pending();
            if let Some(link) = inner.link.take() {
                info!("Closing connection to {} for new connection", link.name);
            }
            (inner.machine.begin_attempt(), inner.listener())
        };

        info!("Connecting to {} (generation {})", address, generation);
        if let Some(listener) = listener {
            listener.on_state_change(SessionState::Connecting);
        }

        // The listener may have called `stop` or `connect` from the callback.
        if !self.inner.lock().machine.is_current(generation) {
            return;
        }

        let shared = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let timeout = shared.options.connect_timeout;
            let result = match tokio::time::timeout(timeout, shared.connector.open(&address)).await
            {
                Ok(result) => result,
                Err(_) => Err(SessionError::ConnectTimeout(timeout)),
            };
            shared.complete_connect(generation, result);
        });

        // The task cannot finish before this point: completion needs the
        // delivery lock we are still holding.
        let mut inner = self.inner.lock();
        if inner.machine.is_current(generation) {
            inner.pending = Some(task);
        }
    }

    fn complete_connect(self: &Arc<Self>, generation: u64, result: Result<Transport, SessionError>) {
        let _delivery = self.delivery.lock();
        let mut inner = self.inner.lock();

        if !inner.machine.is_current(generation) {
            debug!("Discarding result of superseded connect (generation {})", generation);
            return;
        }
        inner.pending = None;

        match result {
            Ok(transport) => {
                if inner.machine.transition(generation, SessionState::Connected)
                    != Transition::Applied
                {
                    return;
                }

                let (name, reader, writer) = transport.into_parts();
                let (stop_tx, stop_rx) = oneshot::channel();
                let (out_tx, out_rx) = mpsc::unbounded_channel();
                inner.link = Some(Link {
                    name: name.clone(),
                    outgoing: out_tx,
                    _stop: stop_tx,
                });
                let listener = inner.listener();
                drop(inner);

                info!("Connected to {}", name);
                if let Some(listener) = listener {
                    listener.on_state_change(SessionState::Connected);
                }

                // Spawned while still holding `delivery`, so nothing the
                // loops report can overtake the Connected notification.
                self.runtime.spawn(receive_loop(
                    Arc::downgrade(self),
                    generation,
                    reader,
                    stop_rx,
                    self.options.read_buffer_size,
                ));
                self.runtime
                    .spawn(write_loop(Arc::downgrade(self), generation, writer, out_rx));
            }
            Err(e) => {
                inner.machine.transition(generation, SessionState::None);
                let listener = inner.listener();
                drop(inner);

                error!("Connect failed: {}", e);
                if let Some(listener) = listener {
                    listener.on_error(&e.to_string());
                    listener.on_state_change(SessionState::None);
                }
            }
        }
    }

    /// Forward a received chunk. Returns `false` once the generation is no
    /// longer live, telling the receive loop to exit.
    pub(crate) fn deliver_data(&self, generation: u64, data: &[u8]) -> bool {
        let _delivery = self.delivery.lock();
        let listener = {
            let inner = self.inner.lock();
            if !inner.machine.is_live(generation) {
                return false;
            }
            inner.listener()
        };

        if let Some(listener) = listener {
            listener.on_data_received(data);
        }
        true
    }

    /// End of stream (`error == None`) or read failure for `generation`.
    pub(crate) fn link_closed(&self, generation: u64, error: Option<SessionError>) {
        let _delivery = self.delivery.lock();
        let listener = {
            let mut inner = self.inner.lock();
            if !inner.machine.is_live(generation) {
                return;
            }
            inner.link = None;
            inner.machine.transition(generation, SessionState::None);
            inner.listener()
        };

        info!("Connection lost (generation {})", generation);
        if let Some(listener) = listener {
            if let Some(e) = error {
                listener.on_error(&e.to_string());
            }
            listener.on_state_change(SessionState::None);
        }
    }

    pub(crate) fn write_failed(&self, generation: u64, err: SessionError) {
        let _delivery = self.delivery.lock();
        let listener = {
            let inner = self.inner.lock();
            if !inner.machine.is_live(generation) {
                return;
            }
            inner.listener()
        };

        if let Some(listener) = listener {
            listener.on_error(&err.to_string());
        }
    }
}

/// Connection façade handed to the application.
///
/// Cloning is cheap; all clones drive the same session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Create a manager on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_runtime(connector, Handle::current(), SessionOptions::default())
    }

    pub fn with_runtime(
        connector: Arc<dyn Connector>,
        runtime: Handle,
        options: SessionOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                options,
                runtime,
                inner: Mutex::new(Inner::default()),
                delivery: ReentrantMutex::new(()),
            }),
        }
    }

    /// Accept `connect` calls. No-op if already started.
    pub fn start(&self) {
        let mut inner = self.shared.inner.lock();
        if !inner.started {
            inner.started = true;
            debug!("Session manager started");
        }
    }

    /// Close any live transport, abandon any in-flight connect and force the
    /// state to `None`. Requires `start()` again before the next `connect`.
    pub fn stop(&self) {
        let _delivery = self.shared.delivery.lock();
        let (changed, listener) = {
            let mut inner = self.shared.inner.lock();
            inner.started = false;
            inner.cancel_pending();
            if let Some(link) = inner.link.take() {
                info!("Closing connection to {}", link.name);
            }
            (inner.machine.reset(), inner.listener())
        };

        if changed {
            info!("Session stopped");
            if let Some(listener) = listener {
                listener.on_state_change(SessionState::None);
            }
        }
    }

    /// Start connecting to `address`, replacing any current connection or
    /// attempt. Returns immediately; progress arrives through the listener.
    pub fn connect(&self, address: &str) {
        let address = match DeviceAddress::new(address)
            .and_then(|a| self.shared.connector.validate(&a).map(|_| a))
        {
            Ok(address) => address,
            Err(e) => {
                warn!("Rejected connect request: {}", e);
                self.shared.report_error(&e);
                return;
            }
        };

        self.shared.begin_connect(address);
    }

    /// Queue `data` for the current transport. Reports `NotConnected` via
    /// `on_error` when there is no connected transport.
    pub fn send(&self, data: &[u8]) {
        let queued = {
            let inner = self.shared.inner.lock();
            match &inner.link {
                Some(link) if inner.machine.state() == SessionState::Connected => {
                    link.outgoing.send(data.to_vec()).is_ok()
                }
                _ => false,
            }
        };

        if !queued {
            debug!("Dropping {} bytes: not connected", data.len());
            self.shared.report_error(&SessionError::NotConnected);
        }
    }

    /// Register the single subscriber, replacing any previous one.
    ///
    /// Only a weak reference is kept: the caller owns the listener.
    pub fn set_listener<L>(&self, listener: &Arc<L>)
    where
        L: SessionListener + 'static,
    {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn SessionListener> = weak;
        let _delivery = self.shared.delivery.lock();
        self.shared.inner.lock().listener = Some(weak);
    }

    pub fn clear_listener(&self) {
        let _delivery = self.shared.delivery.lock();
        self.shared.inner.lock().listener = None;
    }

    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().machine.state()
    }

    /// Name of the connected device, `None` unless connected.
    pub fn device_name(&self) -> Option<String> {
        let inner = self.shared.inner.lock();
        match (&inner.link, inner.machine.state()) {
            (Some(link), SessionState::Connected) => Some(link.name.clone()),
            _ => None,
        }
    }

    /// Whether a transport handle is currently held.
    pub fn is_transport_open(&self) -> bool {
        self.shared.inner.lock().link.is_some()
    }
}
