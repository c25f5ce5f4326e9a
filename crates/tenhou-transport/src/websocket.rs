//! WebSocket client connection using `tokio-tungstenite`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HOST, ORIGIN};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, TransportError, DEFAULT_RECV_TIMEOUT};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Overrides the `Host` header. Empty means derive it from `url`.
    pub host: String,
    /// Sets the `Origin` header. Empty means send none.
    pub origin: String,
    /// Upper bound for a single [`Connection::recv`] call.
    pub recv_timeout: Duration,
}

impl ConnectOptions {
    /// Options for `url` with no header overrides and the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            host: String::new(),
            origin: String::new(),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }
}

/// A client-side WebSocket connection.
///
/// The stream is split so the keep-alive task can write while the session
/// loop is parked in `recv`. Each half has its own lock; a write holds the
/// writer lock for exactly one frame.
pub struct WebSocketConnection {
    writer: Mutex<SplitSink<WsStream, Message>>,
    reader: Mutex<SplitStream<WsStream>>,
    recv_timeout: Duration,
    closed: AtomicBool,
}

impl WebSocketConnection {
    /// Connects to the endpoint described by `options`.
    pub async fn open(options: &ConnectOptions) -> Result<Self, TransportError> {
        let connect_failed = |e: std::io::Error| TransportError::ConnectFailed {
            url: options.url.clone(),
            source: e,
        };

        let mut request = options
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| connect_failed(invalid_input(e)))?;

        if !options.host.is_empty() {
            let value = HeaderValue::from_str(&options.host)
                .map_err(|e| connect_failed(invalid_input(e)))?;
            request.headers_mut().insert(HOST, value);
        }
        if !options.origin.is_empty() {
            let value = HeaderValue::from_str(&options.origin)
                .map_err(|e| connect_failed(invalid_input(e)))?;
            request.headers_mut().insert(ORIGIN, value);
        }

        let (ws, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| {
                connect_failed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        tracing::info!(url = %options.url, "WebSocket connection established");

        let (writer, reader) = ws.split();
        Ok(Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            recv_timeout: options.recv_timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// Whether [`close`](Connection::close) ran or the server closed on us.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Connection for WebSocketConnection {
    async fn send(&self, line: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed(
                "send after close".into(),
            ));
        }
        self.writer
            .lock()
            .await
            .send(Message::Text(line.to_owned().into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed(
                "recv after close".into(),
            ));
        }

        let deadline = tokio::time::Instant::now() + self.recv_timeout;
        let mut reader = self.reader.lock().await;
        loop {
            let Ok(next) = tokio::time::timeout_at(deadline, reader.next()).await
            else {
                return Ok(None);
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data.to_vec()).map(Some).map_err(
                        |e| {
                            TransportError::ReceiveFailed(std::io::Error::new(
                                std::io::ErrorKind::InvalidData,
                                e,
                            ))
                        },
                    );
                }
                Some(Ok(Message::Close(frame))) => {
                    self.closed.store(true, Ordering::Release);
                    let reason = frame
                        .map(|f| f.reason.as_str().to_owned())
                        .unwrap_or_default();
                    return Err(TransportError::ConnectionClosed(format!(
                        "closed by server: {reason}"
                    )));
                }
                None => {
                    self.closed.store(true, Ordering::Release);
                    return Err(TransportError::ConnectionClosed(
                        "stream ended".into(),
                    ));
                }
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match self.writer.lock().await.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                tracing::debug!("WebSocket connection closed");
                Ok(())
            }
            Err(e) => Err(TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))),
        }
    }
}

fn invalid_input(
    e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
}
