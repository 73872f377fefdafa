//! WebSocket client for the relay.
//!
//! A background thread owns the socket; the caller drives everything through
//! non-blocking `send` and `poll_events` so the client drops into a UI frame
//! loop without an async runtime.

use crate::protocol::WireEvent;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::{Message, connect};
use url::Url;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events surfaced by `poll_events`.
#[derive(Debug, Clone)]
pub enum NetEvent {
    /// Connected to the relay
    Connected,
    /// Disconnected from the relay
    Disconnected,
    /// A decoded inbound event
    Event(WireEvent),
    /// Error occurred
    Error { message: String },
}

/// Commands sent to the socket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// First ~100 bytes of a message for log lines, clamped back to a char
/// boundary so multi-byte text cannot panic the slice.
fn preview(text: &str) -> &str {
    let mut end = text.len().min(100);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Relay client for native platforms.
pub struct RelayClient {
    state: ConnectionState,
    events: Vec<NetEvent>,
    /// Channel to send commands to the socket thread.
    cmd_tx: Option<Sender<WsCommand>>,
    /// Channel to receive events from the socket thread.
    event_rx: Option<Receiver<NetEvent>>,
    /// Handle to the socket thread.
    _thread: Option<JoinHandle<()>>,
}

impl RelayClient {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            events: Vec::new(),
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Connect to a relay server.
    pub fn connect(&mut self, url: &str) -> Result<(), String> {
        if self.cmd_tx.is_some() {
            return Err("Already connected".to_string());
        }

        let parsed_url = Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;
        if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
            return Err(format!("Invalid WebSocket URL scheme: {}", parsed_url.scheme()));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<NetEvent>();

        let url = url.to_string();

        let handle = thread::spawn(move || {
            log::info!("socket thread: connecting to {}", url);

            match connect(&url) {
                Ok((mut socket, response)) => {
                    log::info!("relay connected, status: {}", response.status());
                    let _ = event_tx.send(NetEvent::Connected);

                    // Short read timeout on the underlying TCP stream so the
                    // loop can interleave reads with outbound commands
                    {
                        let stream = socket.get_mut();
                        match stream {
                            tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
                                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                            }
                            #[allow(unreachable_patterns)]
                            _ => {
                                log::debug!("TLS or other stream - using default timeout handling");
                            }
                        }
                    }

                    loop {
                        // Check for commands (non-blocking)
                        match cmd_rx.try_recv() {
                            Ok(WsCommand::Send(msg)) => {
                                log::debug!("relay sending: {}", preview(&msg));
                                if let Err(e) = socket.send(Message::Text(msg)) {
                                    log::error!("relay send error: {}", e);
                                    break;
                                }
                            }
                            Ok(WsCommand::Close) => {
                                log::info!("relay close requested");
                                let _ = socket.close(None);
                                break;
                            }
                            Err(TryRecvError::Disconnected) => {
                                log::info!("relay command channel disconnected");
                                break;
                            }
                            Err(TryRecvError::Empty) => {}
                        }

                        // Check for incoming messages (with timeout)
                        match socket.read() {
                            Ok(Message::Text(txt)) => {
                                log::debug!("relay received: {}", preview(&txt));
                                match WireEvent::decode(&txt) {
                                    Ok(event) => {
                                        let _ = event_tx.send(NetEvent::Event(event));
                                    }
                                    Err(e) => {
                                        log::warn!("dropping malformed relay message: {}", e);
                                    }
                                }
                            }
                            Ok(Message::Ping(data)) => {
                                let _ = socket.send(Message::Pong(data));
                            }
                            Ok(Message::Close(_)) => {
                                log::info!("relay sent close frame");
                                break;
                            }
                            Ok(_) => {} // Ignore binary, pong
                            Err(tungstenite::Error::Io(ref e))
                                if e.kind() == std::io::ErrorKind::WouldBlock
                                    || e.kind() == std::io::ErrorKind::TimedOut =>
                            {
                                continue;
                            }
                            Err(e) => {
                                log::error!("relay read error: {}", e);
                                break;
                            }
                        }
                    }

                    log::info!("socket thread exiting");
                    let _ = event_tx.send(NetEvent::Disconnected);
                }
                Err(e) => {
                    log::error!("relay connection failed: {}", e);
                    let _ = event_tx.send(NetEvent::Error {
                        message: format!("Connection failed: {}", e),
                    });
                }
            }
        });

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);

        Ok(())
    }

    /// Disconnect from the relay.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Send one event to the relay.
    pub fn send(&self, event: &WireEvent) -> Result<(), String> {
        let json = event.encode().map_err(|e| format!("Encode failed: {}", e))?;
        self.send_raw(json)
    }

    fn send_raw(&self, msg: String) -> Result<(), String> {
        if let Some(ref tx) = self.cmd_tx {
            tx.send(WsCommand::Send(msg))
                .map_err(|e| format!("Send failed: {}", e))
        } else {
            Err("Not connected".to_string())
        }
    }

    /// Poll for pending events (non-blocking).
    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    NetEvent::Connected => self.state = ConnectionState::Connected,
                    NetEvent::Disconnected => self.state = ConnectionState::Disconnected,
                    NetEvent::Error { .. } => self.state = ConnectionState::Error,
                    NetEvent::Event(_) => {}
                }
                self.events.push(event);
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}
