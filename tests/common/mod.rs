//! Shared test doubles: a scripted connector and a recording listener.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tokio::sync::{mpsc, oneshot};

use dialphone::bluetooth::{Connector, DeviceAddress, SessionError, Transport};
use dialphone::SessionState;

pub const WAIT: Duration = Duration::from_secs(2);

/// What the connector does for one `open` call.
pub enum Outcome {
    /// Hand out this end of a duplex pair.
    Link(DuplexStream),
    /// Like `Link`, but end-of-stream on read surfaces as an I/O error.
    ResetOnClose(DuplexStream),
    /// Reads work, every write fails.
    BrokenWriter(DuplexStream),
    Fail(String),
    /// Never completes.
    Hang,
    /// Wait for the gate, then resolve to the inner outcome.
    Gated(oneshot::Receiver<()>, Box<Outcome>),
    /// Hand out a prebuilt transport.
    Ready(Transport),
}

/// A connector whose results are scripted per address.
#[derive(Default)]
pub struct ScriptedConnector {
    outcomes: Mutex<HashMap<String, VecDeque<Outcome>>>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, address: &str, outcome: Outcome) {
        self.outcomes
            .lock()
            .entry(address.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Script a successful link and return the remote end.
    pub fn link(&self, address: &str) -> DuplexStream {
        let (local, remote) = tokio::io::duplex(1024);
        self.script(address, Outcome::Link(local));
        remote
    }

    /// Script a successful link that only completes once the returned gate
    /// is fired.
    pub fn gated_link(&self, address: &str) -> (oneshot::Sender<()>, DuplexStream) {
        let (local, remote) = tokio::io::duplex(1024);
        let (gate_tx, gate_rx) = oneshot::channel();
        self.script(address, Outcome::Gated(gate_rx, Box::new(Outcome::Link(local))));
        (gate_tx, remote)
    }
}

pub fn device_name(address: &str) -> String {
    format!("device-{}", address)
}

async fn resolve(address: &DeviceAddress, outcome: Outcome) -> Result<Transport, SessionError> {
    let mut outcome = outcome;
    loop {
        let name = device_name(address.as_str());
        return match outcome {
            Outcome::Link(stream) => Ok(Transport::from_stream(name, stream)),
            Outcome::ResetOnClose(stream) => {
                let (reader, writer) = tokio::io::split(stream);
                Ok(Transport::new(
                    name,
                    Box::new(ResetOnEof(reader)),
                    Box::new(writer),
                ))
            }
            Outcome::BrokenWriter(stream) => {
                let (reader, _writer) = tokio::io::split(stream);
                Ok(Transport::new(name, Box::new(reader), Box::new(FailingWriter)))
            }
            Outcome::Ready(transport) => Ok(transport),
            Outcome::Fail(cause) => Err(SessionError::Connect(cause)),
            Outcome::Hang => std::future::pending().await,
            Outcome::Gated(gate, next) => {
                let _ = gate.await;
                outcome = *next;
                continue;
            }
        };
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn open(&self, address: &DeviceAddress) -> Result<Transport, SessionError> {
        let outcome = self
            .outcomes
            .lock()
            .get_mut(address.as_str())
            .and_then(VecDeque::pop_front);

        match outcome {
            Some(outcome) => resolve(address, outcome).await,
            None => Err(SessionError::Connect(format!("{} unreachable", address))),
        }
    }
}

/// Turns a clean end-of-stream into a connection reset.
struct ResetOnEof<R>(R);

impl<R: AsyncRead + Unpin> AsyncRead for ResetOnEof<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        match Pin::new(&mut self.0).poll_read(cx, buf) {
            Poll::Ready(Ok(())) if buf.filled().len() == before => Poll::Ready(Err(
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            )),
            other => other,
        }
    }
}

type Hook = Box<dyn FnOnce() + Send>;

/// Yields scripted chunks, optionally running a hook right before a chunk is
/// returned. Once the script is exhausted, reads never complete.
#[derive(Default)]
pub struct ScriptedReader {
    chunks: VecDeque<(Option<Hook>, Vec<u8>)>,
}

impl ScriptedReader {
    pub fn chunk(mut self, data: &[u8]) -> Self {
        self.chunks.push_back((None, data.to_vec()));
        self
    }

    pub fn chunk_after(mut self, hook: impl FnOnce() + Send + 'static, data: &[u8]) -> Self {
        self.chunks.push_back((Some(Box::new(hook)), data.to_vec()));
        self
    }
}

impl AsyncRead for ScriptedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.chunks.pop_front() {
            Some((hook, data)) => {
                if let Some(hook) = hook {
                    hook();
                }
                buf.put_slice(&data);
                Poll::Ready(Ok(()))
            }
            None => Poll::Pending,
        }
    }
}

struct FailingWriter;

impl AsyncWrite for FailingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// One listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Data(Vec<u8>),
    Error(String),
    State(SessionState),
}

/// Records every callback and lets tests await them in order.
pub struct RecordingListener {
    tx: mpsc::UnboundedSender<Event>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Event>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        })
    }

    pub fn record(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Next event, panicking if none arrives in time.
    pub async fn next(&self) -> Event {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for listener event")
            .expect("listener channel closed")
    }

    /// Assert nothing arrives within `window`.
    pub async fn expect_quiet(&self, window: Duration) {
        let mut rx = self.rx.lock().await;
        if let Ok(Some(event)) = tokio::time::timeout(window, rx.recv()).await {
            panic!("unexpected event: {:?}", event);
        }
    }
}

impl dialphone::bluetooth::SessionListener for RecordingListener {
    fn on_data_received(&self, data: &[u8]) {
        self.record(Event::Data(data.to_vec()));
    }

    fn on_error(&self, message: &str) {
        self.record(Event::Error(message.to_string()));
    }

    fn on_state_change(&self, state: SessionState) {
        self.record(Event::State(state));
    }
}
